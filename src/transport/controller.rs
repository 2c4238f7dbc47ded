// =============================================================================
// TRANSPORT CONTROLLER
// =============================================================================
//
// Coordinates the player's transport on a single thread. UI input calls into
// the controller, which updates TransportState, forwards fire-and-forget
// commands to the media engine, and broadcasts TransportEvents. The engine's
// frame clock reports back through handle_notification(), where ViewSync
// reconciles the state with what is actually on screen.
//
// =============================================================================

use std::sync::{Arc, Weak};

use tokio::sync::broadcast;

use crate::core::{format_timecode, PlayerConfig};
use crate::engine::{EngineNotification, FrameUpdate, MediaEngine, ProducerInfo, VideoSize};
use crate::transport::{EventBus, TransportEvent, TransportState};
use crate::view::{TabGate, TabMode, ViewSync, ZoomIcon, ZoomState};

pub struct TransportController {
    config: Arc<PlayerConfig>,
    state: TransportState,
    view: ViewSync,
    tabs: TabGate,
    events: EventBus,
    engine: Option<Weak<dyn MediaEngine>>,
    monitor_screen: Option<usize>,
}

impl TransportController {
    pub fn new(config: Arc<PlayerConfig>) -> Self {
        Self {
            state: TransportState::new(config.default_volume),
            view: ViewSync::new(config.clone()),
            tabs: TabGate::new(),
            events: EventBus::new(config.event_capacity),
            engine: None,
            monitor_screen: None,
            config,
        }
    }

    /// Points the controller at an engine without taking ownership of it.
    pub fn connect_transport<E: MediaEngine + 'static>(&mut self, engine: &Arc<E>) {
        let engine: Arc<dyn MediaEngine> = engine.clone();
        self.engine = Some(Arc::downgrade(&engine));
        log::debug!("Transport connected to media engine");
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TransportEvent> {
        self.events.subscribe()
    }

    fn with_engine<F>(&self, action: &str, f: F)
    where
        F: FnOnce(&dyn MediaEngine),
    {
        match self.engine.as_ref().and_then(Weak::upgrade) {
            Some(engine) => f(engine.as_ref()),
            None => log::warn!("No media engine connected, skipping {}", action),
        }
    }

    fn can_seek(&self) -> bool {
        if self.state.is_capturing {
            log::debug!("Transport disabled while capturing");
            return false;
        }
        if !self.state.is_seekable {
            log::debug!("Source is not seekable");
            return false;
        }
        true
    }

    fn status(&self, message: String) {
        self.events.emit(TransportEvent::StatusMessage(message));
    }

    // =========================================================================
    // PLAYBACK
    // =========================================================================

    pub fn play(&mut self, speed: f64) {
        if self.start(speed) {
            self.status(self.config.labels.play.clone());
        }
    }

    /// Issues play at `speed`; returns false when nothing changed.
    fn start(&mut self, speed: f64) -> bool {
        if self.state.is_capturing {
            log::debug!("Ignoring play while capturing");
            return false;
        }
        if !speed.is_finite() {
            return false;
        }
        if speed == 0.0 {
            self.pause();
            return false;
        }
        self.state.pause_after_play = false;
        let max_speed = self.config.max_speed;
        let speed = speed.clamp(-max_speed, max_speed);
        if !self.state.is_paused && self.state.speed == speed {
            return false;
        }

        log::info!("Transport: play at {:.2}x from frame {}", speed, self.state.position);
        self.with_engine("play", |engine| engine.play(speed));
        self.state.is_paused = false;
        self.state.speed = speed;
        self.events.emit(TransportEvent::Played { speed });
        if !self.view.is_showing_playing() {
            self.view.show_playing(&self.events);
        }
        true
    }

    pub fn pause(&mut self) {
        if self.state.is_capturing {
            log::debug!("Ignoring pause while capturing");
            return;
        }

        log::info!("Transport: pause at frame {}", self.state.position);
        self.with_engine("pause", |engine| engine.pause());
        self.state.is_paused = true;
        self.state.speed = 0.0;
        self.state.pause_after_play = false;
        self.events.emit(TransportEvent::Paused);
        if self.view.is_showing_playing() {
            self.view.show_paused(&self.events);
        }
        self.status(self.config.labels.pause.clone());
    }

    pub fn stop(&mut self) {
        log::info!("Transport: stop");
        self.with_engine("stop", |engine| engine.stop());
        self.state.is_paused = true;
        self.state.speed = 0.0;
        self.state.pending_seek = None;
        self.state.pause_after_play = false;
        self.state.position = self.state.in_point();
        self.events.emit(TransportEvent::Stopped);
        if self.view.is_showing_playing() {
            self.view.show_paused(&self.events);
        }
        self.status(self.config.labels.stop.clone());
    }

    pub fn toggle_play_paused(&mut self) {
        if self.state.is_paused {
            self.play(1.0);
        } else {
            self.pause();
        }
    }

    pub fn seek(&mut self, position: i32) {
        if !self.can_seek() {
            return;
        }
        let target = self.state.clamp_to_range(position);
        if target == self.state.position {
            return;
        }

        log::debug!("Transport: seek to frame {} (requested {})", target, position);
        self.with_engine("seek", |engine| engine.seek(target));
        self.state.begin_seek(target);
        self.events.emit(TransportEvent::Seeked { position: target });
    }

    pub fn rewind(&mut self) {
        if !self.can_seek() {
            return;
        }
        let speed = if !self.state.is_paused && self.state.speed < 0.0 {
            self.state.speed * self.config.speed_step
        } else {
            -1.0
        };
        self.start(speed);
        self.events.emit(TransportEvent::Rewound);
        self.status(self.config.labels.rewind.clone());
    }

    pub fn fast_forward(&mut self) {
        if !self.can_seek() {
            return;
        }
        let speed = if !self.state.is_paused && self.state.speed > 0.0 {
            self.state.speed * self.config.speed_step
        } else {
            1.0
        };
        self.start(speed);
        self.events.emit(TransportEvent::FastForwarded);
        self.status(self.config.labels.fast_forward.clone());
    }

    /// Seeks to the next marker, or to the out point past the last one.
    ///
    /// Emits nothing when the playhead is already there.
    pub fn skip_next(&mut self) {
        if !self.can_seek() {
            return;
        }
        let from = self.state.position;
        let event = match self.state.next_marker(from) {
            Some(marker) => {
                self.seek(marker);
                TransportEvent::NextSoughtFrom { position: from }
            }
            None => {
                self.seek(self.state.out_point());
                TransportEvent::NextSought
            }
        };
        if self.state.position == from {
            return;
        }
        self.events.emit(event);
        self.status(format!(
            "{} ({})",
            self.config.labels.skip_next,
            format_timecode(self.state.position, self.state.fps)
        ));
    }

    pub fn skip_previous(&mut self) {
        if !self.can_seek() {
            return;
        }
        let from = self.state.position;
        let event = match self.state.previous_marker(from) {
            Some(marker) => {
                self.seek(marker);
                TransportEvent::PreviousSoughtFrom { position: from }
            }
            None => {
                self.seek(self.state.in_point());
                TransportEvent::PreviousSought
            }
        };
        if self.state.position == from {
            return;
        }
        self.events.emit(event);
        self.status(format!(
            "{} ({})",
            self.config.labels.skip_previous,
            format_timecode(self.state.position, self.state.fps)
        ));
    }

    // =========================================================================
    // RANGE AND MARKERS
    // =========================================================================

    pub fn set_in(&mut self, position: i32) {
        let (old_in, old_out) = (self.state.in_point(), self.state.out_point());
        let in_point = position.clamp(0, self.state.last_frame());
        self.state.in_point = Some(in_point);
        if let Some(out_point) = self.state.out_point {
            if out_point < in_point {
                self.state.out_point = Some(in_point);
            }
        }

        self.emit_range_changes(old_in, old_out);
    }

    pub fn set_out(&mut self, position: i32) {
        let (old_in, old_out) = (self.state.in_point(), self.state.out_point());
        let out_point = position.clamp(self.state.in_point(), self.state.last_frame());
        self.state.out_point = Some(out_point);
        self.emit_range_changes(old_in, old_out);
    }

    /// Announces whichever bounds moved, followed by the new selection.
    fn emit_range_changes(&self, old_in: i32, old_out: i32) {
        let (in_point, out_point) = (self.state.in_point(), self.state.out_point());
        if in_point != old_in {
            self.events.emit(TransportEvent::InChanged(in_point));
        }
        if out_point != old_out {
            self.events.emit(TransportEvent::OutChanged(out_point));
        }
        if in_point != old_in || out_point != old_out {
            self.update_selection();
        }
    }

    fn update_selection(&self) {
        self.events.emit(TransportEvent::SelectionChanged {
            in_point: self.state.in_point(),
            duration: self.state.selection_duration(),
        });
    }

    pub fn set_markers(&mut self, markers: &[i32]) {
        self.state.replace_markers(markers);
    }

    // =========================================================================
    // SOURCE LIFECYCLE
    // =========================================================================

    /// Resets the transport for a newly opened source.
    pub fn on_producer_opened(&mut self, info: ProducerInfo, play: bool) {
        log::info!(
            "Transport: opened source of {} frames at {:.2} fps (seekable: {})",
            info.length,
            info.fps,
            info.seekable
        );
        self.state.in_point = info.in_point;
        self.state.out_point = info.out_point;
        self.state.apply_duration(info.length);
        if info.fps.is_finite() && info.fps > 0.0 {
            self.state.fps = info.fps;
        }
        self.state.is_seekable = info.seekable;
        self.state.markers.clear();
        self.state.pending_seek = None;
        self.state.pause_after_play = false;
        self.state.position = self.state.in_point();
        self.state.speed = 0.0;
        self.state.is_paused = true;
        self.view.reset_frame(self.state.in_point(), self.state.out_point());

        if self.view.set_video_size(info.video_size, &self.events) {
            self.events.emit(TransportEvent::ProfileChanged);
        }
        self.events.emit(TransportEvent::InChanged(self.state.in_point()));
        self.events.emit(TransportEvent::OutChanged(self.state.out_point()));
        self.update_selection();

        if play {
            self.play(1.0);
        } else if self.config.preview_on_open && self.start(1.0) {
            log::debug!("Transport: previewing first frame before pausing");
            self.state.pause_after_play = true;
        } else {
            self.pause();
        }
    }

    /// Asks the engine to show the frame under the playhead of a freshly
    /// opened source.
    pub fn post_producer_opened(&mut self) {
        if self.state.is_capturing || !self.state.is_seekable {
            return;
        }
        let position = self.state.position;
        log::debug!("Transport: showing frame {} of opened source", position);
        self.with_engine("seek", |engine| engine.seek(position));
        self.state.begin_seek(position);
    }

    /// Applies a new video profile and re-fits the view even if the size is unchanged.
    pub fn reset_profile(&mut self, video_size: VideoSize) {
        log::info!("Transport: profile reset to {}x{}", video_size.width, video_size.height);
        if !self.view.set_video_size(video_size, &self.events) {
            let (width, height) = (self.view.viewport().width, self.view.viewport().height);
            self.view.resize(width, height, &self.events);
        }
        self.events.emit(TransportEvent::ProfileChanged);
    }

    /// Re-clamps everything after the current source changed length.
    pub fn on_producer_modified(&mut self, length: i32) {
        let (old_in, old_out) = (self.state.in_point(), self.state.out_point());
        self.state.apply_duration(length);
        let last = self.state.last_frame();
        if let Some(pending) = self.state.pending_seek.as_mut() {
            pending.target = pending.target.min(last);
            pending.origin = pending.origin.min(last);
        }
        self.emit_range_changes(old_in, old_out);
    }

    pub fn set_seekable(&mut self, seekable: bool) {
        if self.state.is_seekable == seekable {
            return;
        }
        self.state.is_seekable = seekable;
        if !seekable {
            self.state.pending_seek = None;
            self.status(self.config.labels.not_seekable.clone());
        }
    }

    pub fn on_capture_state_changed(&mut self, active: bool) {
        if self.state.is_capturing == active {
            return;
        }
        log::info!("Transport: capture {}", if active { "started" } else { "stopped" });
        self.state.is_capturing = active;
        if active {
            self.state.pending_seek = None;
            self.state.is_paused = true;
            self.state.speed = 0.0;
            if self.view.is_showing_playing() {
                self.view.show_paused(&self.events);
            }
            self.status(self.config.labels.capture_active.clone());
        }
    }

    // =========================================================================
    // VOLUME
    // =========================================================================

    pub fn on_volume_changed(&mut self, percent: i32) {
        let volume = percent.clamp(0, 100) as f64 / 100.0;
        self.state.volume = volume;
        if self.state.is_muted {
            // Applied on unmute
            self.state.saved_volume = volume;
            return;
        }
        self.with_engine("set_volume", |engine| engine.set_volume(volume));
        self.events.emit(TransportEvent::VolumeChanged(volume));
    }

    pub fn on_mute_toggled(&mut self, muted: bool) {
        if self.state.is_muted == muted {
            return;
        }
        if muted {
            let mut saved = self.state.volume;
            self.with_engine("current_volume", |engine| saved = engine.current_volume());
            self.state.saved_volume = saved.clamp(0.0, 1.0);
            self.with_engine("set_volume", |engine| engine.set_volume(0.0));
            self.state.is_muted = true;
            self.events.emit(TransportEvent::VolumeChanged(0.0));
        } else {
            let restored = self.state.saved_volume;
            self.with_engine("set_volume", |engine| engine.set_volume(restored));
            self.state.volume = restored;
            self.state.is_muted = false;
            self.events.emit(TransportEvent::VolumeChanged(restored));
        }
    }

    // =========================================================================
    // ENGINE NOTIFICATIONS
    // =========================================================================

    pub fn on_show_frame(
        &mut self,
        position: i32,
        fps: f64,
        in_point: i32,
        out_point: i32,
        length: i32,
        is_playing: bool,
    ) {
        self.on_frame(FrameUpdate {
            position,
            fps,
            in_point,
            out_point,
            length,
            is_playing,
        });
    }

    pub fn on_frame(&mut self, frame: FrameUpdate) {
        let (old_in, old_out) = (self.state.in_point(), self.state.out_point());
        if !self.view.on_show_frame(&mut self.state, frame, &self.events) {
            return;
        }
        if self.state.in_point() != old_in || self.state.out_point() != old_out {
            self.update_selection();
        }
        if self.state.pause_after_play && frame.is_playing {
            log::debug!("Transport: first frame shown, pausing at {}", self.state.position);
            self.pause();
        }
    }

    pub fn handle_notification(&mut self, notification: EngineNotification) {
        match notification {
            EngineNotification::Frame(frame) => self.on_frame(frame),
            EngineNotification::EndOfStream => {
                log::debug!("Transport: end of stream at frame {}", self.state.position);
                self.state.is_paused = true;
                self.state.speed = 0.0;
                self.events.emit(TransportEvent::EndOfStream);
            }
            EngineNotification::CaptureStateChanged(active) => {
                self.on_capture_state_changed(active)
            }
            EngineNotification::AudioLevels(levels) => {
                self.events.emit(TransportEvent::AudioLevels(levels));
            }
        }
    }

    pub fn pump<I>(&mut self, notifications: I)
    where
        I: IntoIterator<Item = EngineNotification>,
    {
        for notification in notifications {
            self.handle_notification(notification);
        }
    }

    // =========================================================================
    // VIEW
    // =========================================================================

    pub fn video_size(&self) -> VideoSize {
        self.view.video_size()
    }

    /// Asks the windowing layer to show the video on another screen.
    pub fn move_video_to_screen(&mut self, screen: Option<usize>) {
        self.monitor_screen = screen;
        self.events.emit(TransportEvent::MoveToScreenRequested(screen));
    }

    pub fn monitor_screen(&self) -> Option<usize> {
        self.monitor_screen
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.view.resize(width, height, &self.events);
    }

    pub fn set_zoom(&mut self, factor: f64, icon: ZoomIcon) {
        self.view.set_zoom(factor, icon, &self.events);
    }

    pub fn zoom_fit(&mut self) {
        self.view.zoom_fit(&self.events);
    }

    pub fn zoom_original(&mut self) {
        self.view.zoom_original(&self.events);
    }

    pub fn zoom_in(&mut self) {
        self.view.zoom_in(&self.events);
    }

    pub fn zoom_out(&mut self) {
        self.view.zoom_out(&self.events);
    }

    pub fn toggle_zoom(&mut self, checked: bool) {
        self.view.toggle_zoom(checked, &self.events);
    }

    pub fn scroll_horizontally(&mut self, x: i32) {
        self.view.scroll_horizontally(x, &self.events);
    }

    pub fn scroll_vertically(&mut self, y: i32) {
        self.view.scroll_vertically(y, &self.events);
    }

    pub fn switch_to_tab(&mut self, tab: TabMode) -> bool {
        self.tabs.switch_to_tab(tab)
    }

    pub fn enable_tab(&mut self, tab: TabMode, enabled: bool) {
        self.tabs.enable_tab(tab, enabled);
    }

    pub fn on_tab_bar_clicked(&mut self, index: usize) -> bool {
        self.tabs.on_tab_bar_clicked(index)
    }

    // =========================================================================
    // STATE QUERIES
    // =========================================================================

    pub fn state(&self) -> &TransportState {
        &self.state
    }

    pub fn position(&self) -> i32 {
        self.state.position
    }

    pub fn zoom(&self) -> &ZoomState {
        self.view.zoom()
    }

    pub fn view(&self) -> &ViewSync {
        &self.view
    }

    pub fn tabs(&self) -> &TabGate {
        &self.tabs
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }
}
