// =============================================================================
// SIMULATED ENGINE - FRAME CLOCK ON A BACKGROUND THREAD
// =============================================================================
//
// Stands in for a real decoder. A dedicated thread owns the playhead and
// advances it in real time while playing, pushing a FrameUpdate for every
// displayed frame. The coordination thread drains those notifications and
// feeds them to the TransportController.
//
// =============================================================================

use std::sync::mpsc;
use std::sync::Mutex;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::{EngineNotification, FrameUpdate, MediaEngine, ProducerInfo};

/// Commands sent to the frame clock thread
#[derive(Debug)]
enum ClockCommand {
    Open(ProducerInfo),
    Play(f64),
    Pause,
    Stop,
    Seek(i32),
    SetCapturing(bool),
    Shutdown,
}

struct ClockState {
    length: i32,
    fps: f64,
    in_point: i32,
    out_point: i32,
    /// Fractional so that slow and reverse speeds accumulate correctly.
    position: f64,
    speed: f64,
    is_playing: bool,
    last_tick: Option<Instant>,
    last_reported: Option<i32>,
}

impl ClockState {
    fn new() -> Self {
        Self {
            length: 0,
            fps: 25.0,
            in_point: 0,
            out_point: 0,
            position: 0.0,
            speed: 0.0,
            is_playing: false,
            last_tick: None,
            last_reported: None,
        }
    }

    fn open(&mut self, info: &ProducerInfo) {
        let last = (info.length - 1).max(0);
        self.length = info.length.max(0);
        self.fps = if info.fps.is_finite() && info.fps > 0.0 { info.fps } else { 25.0 };
        self.in_point = info.in_point.unwrap_or(0).clamp(0, last);
        self.out_point = info.out_point.unwrap_or(last).clamp(self.in_point, last);
        self.position = self.in_point as f64;
        self.speed = 0.0;
        self.is_playing = false;
        self.last_tick = None;
        self.last_reported = None;
    }

    fn frame(&self) -> FrameUpdate {
        FrameUpdate {
            position: self.position.round() as i32,
            fps: self.fps,
            in_point: self.in_point,
            out_point: self.out_point,
            length: self.length,
            is_playing: self.is_playing,
        }
    }

    fn halt(&mut self) {
        self.is_playing = false;
        self.speed = 0.0;
        self.last_tick = None;
    }

    /// Advances the playhead; returns true when a boundary was reached.
    fn tick(&mut self, now: Instant) -> bool {
        let Some(last_tick) = self.last_tick else {
            self.last_tick = Some(now);
            return false;
        };
        let elapsed = now.duration_since(last_tick).as_secs_f64();
        self.last_tick = Some(now);

        let lower = self.in_point as f64;
        let upper = self.out_point as f64;
        let next = self.position + elapsed * self.fps * self.speed;

        if self.speed > 0.0 && next >= upper {
            self.position = upper;
            self.halt();
            true
        } else if self.speed < 0.0 && next <= lower {
            self.position = lower;
            self.halt();
            true
        } else {
            self.position = next.clamp(lower, upper);
            false
        }
    }
}

fn send_frame(state: &mut ClockState, notify_tx: &mpsc::Sender<EngineNotification>, force: bool) {
    let frame = state.frame();
    if force || state.last_reported != Some(frame.position) {
        state.last_reported = Some(frame.position);
        let _ = notify_tx.send(EngineNotification::Frame(frame));
    }
}

fn clock_thread(cmd_rx: mpsc::Receiver<ClockCommand>, notify_tx: mpsc::Sender<EngineNotification>) {
    let mut state = ClockState::new();

    loop {
        let timeout = if state.is_playing {
            Duration::from_secs_f64(1.0 / state.fps.max(1.0))
        } else {
            Duration::from_millis(50)
        };

        match cmd_rx.recv_timeout(timeout) {
            Ok(ClockCommand::Open(info)) => {
                log::info!(
                    "Simulated engine: opened source ({} frames at {:.2} fps)",
                    info.length,
                    info.fps
                );
                state.open(&info);
                send_frame(&mut state, &notify_tx, true);
            }
            Ok(ClockCommand::Play(speed)) => {
                if state.length == 0 || speed == 0.0 {
                    continue;
                }
                log::debug!(
                    "Simulated engine: play at {:.2}x from frame {}",
                    speed,
                    state.position as i32
                );
                state.speed = speed;
                state.is_playing = true;
                state.last_tick = Some(Instant::now());
                send_frame(&mut state, &notify_tx, true);
            }
            Ok(ClockCommand::Pause) => {
                state.halt();
                state.position = state.position.round();
                send_frame(&mut state, &notify_tx, true);
            }
            Ok(ClockCommand::Stop) => {
                state.halt();
                state.position = state.in_point as f64;
                send_frame(&mut state, &notify_tx, true);
            }
            Ok(ClockCommand::Seek(position)) => {
                let last = (state.length - 1).max(0);
                state.position = position.clamp(0, last) as f64;
                if state.is_playing {
                    state.last_tick = Some(Instant::now());
                }
                send_frame(&mut state, &notify_tx, true);
            }
            Ok(ClockCommand::SetCapturing(active)) => {
                if active {
                    state.halt();
                }
                let _ = notify_tx.send(EngineNotification::CaptureStateChanged(active));
            }
            Ok(ClockCommand::Shutdown) => {
                log::debug!("Simulated engine: shutting down frame clock");
                break;
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                if state.is_playing {
                    let reached_end = state.tick(Instant::now());
                    send_frame(&mut state, &notify_tx, reached_end);
                    if reached_end {
                        let _ = notify_tx.send(EngineNotification::EndOfStream);
                    }
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
}

pub struct SimulatedEngine {
    command_sender: mpsc::Sender<ClockCommand>,
    notification_receiver: Mutex<mpsc::Receiver<EngineNotification>>,
    thread_handle: Option<JoinHandle<()>>,
    volume: Mutex<f64>,
}

impl SimulatedEngine {
    pub fn spawn() -> anyhow::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (notify_tx, notify_rx) = mpsc::channel();

        let thread_handle = thread::Builder::new()
            .name("frame-clock".to_string())
            .spawn(move || clock_thread(cmd_rx, notify_tx))?;

        Ok(Self {
            command_sender: cmd_tx,
            notification_receiver: Mutex::new(notify_rx),
            thread_handle: Some(thread_handle),
            volume: Mutex::new(1.0),
        })
    }

    /// Loads a new source; the engine answers with an initial frame.
    pub fn open(&self, info: ProducerInfo) {
        self.send(ClockCommand::Open(info));
    }

    pub fn set_capturing(&self, active: bool) {
        self.send(ClockCommand::SetCapturing(active));
    }

    /// Takes every notification queued since the last call.
    pub fn drain_notifications(&self) -> Vec<EngineNotification> {
        match self.notification_receiver.lock() {
            Ok(receiver) => receiver.try_iter().collect(),
            Err(_) => Vec::new(),
        }
    }

    fn send(&self, command: ClockCommand) {
        if let Err(e) = self.command_sender.send(command) {
            log::warn!("Simulated engine: frame clock is gone, dropping {:?}", e.0);
        }
    }
}

impl MediaEngine for SimulatedEngine {
    fn play(&self, speed: f64) {
        self.send(ClockCommand::Play(speed));
    }

    fn pause(&self) {
        self.send(ClockCommand::Pause);
    }

    fn stop(&self) {
        self.send(ClockCommand::Stop);
    }

    fn seek(&self, position: i32) {
        self.send(ClockCommand::Seek(position));
    }

    fn set_volume(&self, volume: f64) {
        if let Ok(mut current) = self.volume.lock() {
            *current = volume.clamp(0.0, 1.0);
        }
    }

    fn current_volume(&self) -> f64 {
        self.volume.lock().map(|v| *v).unwrap_or(1.0)
    }
}

impl Drop for SimulatedEngine {
    fn drop(&mut self) {
        log::debug!("SimulatedEngine dropping");
        let _ = self.command_sender.send(ClockCommand::Shutdown);

        if let Some(handle) = self.thread_handle.take() {
            // Wait briefly for clean shutdown
            for _ in 0..10 {
                if handle.is_finished() {
                    let _ = handle.join();
                    return;
                }
                thread::sleep(Duration::from_millis(20));
            }
            log::warn!("Frame clock thread did not shut down cleanly");
        }
    }
}
