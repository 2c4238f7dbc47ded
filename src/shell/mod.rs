pub mod command;

pub use command::*;

use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;

use crate::core::format_timecode;
use crate::engine::{ProducerInfo, SimulatedEngine};
use crate::transport::{drain_events, TransportController, TransportEvent};

const HELP: &str = "\
commands:
  open <frames> [fps]        load a synthetic source
  play [speed] | pause | stop | toggle
  seek <pos> | rewind | ff | next | prev
  in <pos> | out <pos> | markers <p,p,...>
  volume <0-100> | mute | unmute
  zoom fit|original|in|out|<factor> | zoom toggle on|off
  resize <w> <h> | hscroll <x> | vscroll <y>
  tab <source|program> | enable-tab <tab> on|off | screen [n]
  seekable on|off | capture on|off
  wait <ms> | status | help | quit
positions accept frame numbers or HH:MM:SS:FF";

/// Drives a TransportController against the simulated engine from text input.
pub struct Shell {
    controller: TransportController,
    engine: Arc<SimulatedEngine>,
    events: broadcast::Receiver<TransportEvent>,
}

impl Shell {
    pub fn new(mut controller: TransportController, engine: Arc<SimulatedEngine>) -> Self {
        controller.connect_transport(&engine);
        let events = controller.subscribe();
        Self {
            controller,
            engine,
            events,
        }
    }

    pub fn controller(&self) -> &TransportController {
        &self.controller
    }

    pub fn run<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> anyhow::Result<()> {
        writeln!(output, "type 'help' for commands")?;
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            match ShellCommand::parse(&line, self.controller.state().fps()) {
                Ok(command) => {
                    if !self.execute(command, output)? {
                        break;
                    }
                }
                Err(e) => writeln!(output, "error: {}", e)?,
            }
        }
        Ok(())
    }

    /// Returns false when the shell should exit.
    pub fn execute<W: Write>(
        &mut self,
        command: ShellCommand,
        output: &mut W,
    ) -> anyhow::Result<bool> {
        log::debug!("Shell: {:?}", command);
        match command {
            ShellCommand::Open { frames, fps } => {
                let info = ProducerInfo::new(frames, fps);
                self.engine.open(info.clone());
                self.controller.on_producer_opened(info, false);
            }
            ShellCommand::Play(speed) => self.controller.play(speed),
            ShellCommand::Pause => self.controller.pause(),
            ShellCommand::Stop => self.controller.stop(),
            ShellCommand::Toggle => self.controller.toggle_play_paused(),
            ShellCommand::Seek(position) => self.controller.seek(position),
            ShellCommand::Rewind => self.controller.rewind(),
            ShellCommand::FastForward => self.controller.fast_forward(),
            ShellCommand::Next => self.controller.skip_next(),
            ShellCommand::Previous => self.controller.skip_previous(),
            ShellCommand::In(position) => self.controller.set_in(position),
            ShellCommand::Out(position) => self.controller.set_out(position),
            ShellCommand::Markers(markers) => self.controller.set_markers(&markers),
            ShellCommand::Volume(percent) => self.controller.on_volume_changed(percent),
            ShellCommand::Mute(muted) => self.controller.on_mute_toggled(muted),
            ShellCommand::Zoom(request) => match request {
                ZoomRequest::Fit => self.controller.zoom_fit(),
                ZoomRequest::Original => self.controller.zoom_original(),
                ZoomRequest::In => self.controller.zoom_in(),
                ZoomRequest::Out => self.controller.zoom_out(),
                ZoomRequest::Toggle(checked) => self.controller.toggle_zoom(checked),
                ZoomRequest::Factor(factor) => {
                    self.controller.set_zoom(factor, crate::view::ZoomIcon::for_factor(factor))
                }
            },
            ShellCommand::Resize { width, height } => self.controller.resize(width, height),
            ShellCommand::ScrollX(x) => self.controller.scroll_horizontally(x),
            ShellCommand::ScrollY(y) => self.controller.scroll_vertically(y),
            ShellCommand::Tab(index) => {
                if !self.controller.on_tab_bar_clicked(index) {
                    writeln!(output, "tab {} is disabled", index)?;
                }
            }
            ShellCommand::EnableTab { tab, enabled } => self.controller.enable_tab(tab, enabled),
            ShellCommand::Screen(screen) => self.controller.move_video_to_screen(screen),
            ShellCommand::Seekable(seekable) => self.controller.set_seekable(seekable),
            ShellCommand::Capture(active) => self.engine.set_capturing(active),
            ShellCommand::Wait(ms) => self.wait(Duration::from_millis(ms)),
            ShellCommand::Status => self.print_status(output)?,
            ShellCommand::Help => writeln!(output, "{}", HELP)?,
            ShellCommand::Quit => return Ok(false),
        }
        self.pump();
        self.print_events(output)?;
        Ok(true)
    }

    fn pump(&mut self) {
        let notifications = self.engine.drain_notifications();
        self.controller.pump(notifications);
    }

    fn wait(&mut self, duration: Duration) {
        let deadline = Instant::now() + duration;
        while Instant::now() < deadline {
            self.pump();
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    fn print_events<W: Write>(&mut self, output: &mut W) -> anyhow::Result<()> {
        let fps = self.controller.state().fps();
        for event in drain_events(&mut self.events) {
            match event {
                // Too chatty while playing
                TransportEvent::FrameShown { .. } => {}
                TransportEvent::Seeked { position } => {
                    writeln!(output, "  seeked to {}", format_timecode(position, fps))?
                }
                TransportEvent::StatusMessage(message) => writeln!(output, "  {}", message)?,
                other => writeln!(output, "  {:?}", other)?,
            }
        }
        Ok(())
    }

    fn print_status<W: Write>(&self, output: &mut W) -> anyhow::Result<()> {
        let state = self.controller.state();
        let zoom = self.controller.zoom();
        let view = self.controller.view();
        let icon = zoom.icon().name(&self.controller.config().icons);
        writeln!(
            output,
            "position {} ({}) of {} | in {} out {} ({} selected) | {} at {:.2}x",
            state.position(),
            format_timecode(state.position(), state.fps()),
            format_timecode(state.duration(), state.fps()),
            state.in_point(),
            state.out_point(),
            format_timecode(state.selection_duration(), state.fps()),
            if state.is_paused() { "paused" } else { "playing" },
            state.speed(),
        )?;
        writeln!(
            output,
            "scrub {:.3} | seekable {} | capturing {} | volume {:.2}{} | markers {:?}",
            state.scrub_fraction(),
            state.is_seekable(),
            state.is_capturing(),
            state.volume(),
            if state.is_muted() { " (muted)" } else { "" },
            state.markers(),
        )?;
        writeln!(
            output,
            "zoom {:.0}% [{}] | scroll {}/{}, {}/{} | tab {:?}",
            zoom.factor() * 100.0,
            icon,
            view.horizontal_scroll().value,
            view.horizontal_scroll().maximum,
            view.vertical_scroll().value,
            view.vertical_scroll().maximum,
            self.controller.tabs().active(),
        )?;
        Ok(())
    }
}
