use std::sync::Arc;

use crate::core::PlayerConfig;
use crate::engine::{FrameUpdate, VideoSize};
use crate::transport::{EventBus, TransportEvent, TransportState};
use crate::view::{fit_factor, ScrollBar, ZoomIcon, ZoomState};

/// Derived presentation state: scrub position, play indicator, zoom, scroll.
pub struct ViewSync {
    config: Arc<PlayerConfig>,
    zoom: ZoomState,
    viewport: VideoSize,
    video_size: VideoSize,
    horizontal: ScrollBar,
    vertical: ScrollBar,
    last_frame: Option<FrameUpdate>,
    /// Bounds the engine reported last; only a change overrides local edits.
    previous_in: Option<i32>,
    previous_out: Option<i32>,
    showing_playing: Option<bool>,
}

impl ViewSync {
    pub fn new(config: Arc<PlayerConfig>) -> Self {
        let zoom = ZoomState::new(config.default_toggle_zoom);
        Self {
            config,
            zoom,
            viewport: VideoSize::default(),
            video_size: VideoSize::default(),
            horizontal: ScrollBar::default(),
            vertical: ScrollBar::default(),
            last_frame: None,
            previous_in: None,
            previous_out: None,
            showing_playing: None,
        }
    }

    pub fn zoom(&self) -> &ZoomState {
        &self.zoom
    }

    pub fn video_size(&self) -> VideoSize {
        self.video_size
    }

    pub fn viewport(&self) -> VideoSize {
        self.viewport
    }

    pub fn horizontal_scroll(&self) -> ScrollBar {
        self.horizontal
    }

    pub fn vertical_scroll(&self) -> ScrollBar {
        self.vertical
    }

    pub fn is_showing_playing(&self) -> bool {
        self.showing_playing.unwrap_or(false)
    }

    /// Forgets the last frame after a new source was opened with these bounds.
    pub fn reset_frame(&mut self, in_point: i32, out_point: i32) {
        self.last_frame = None;
        self.previous_in = Some(in_point);
        self.previous_out = Some(out_point);
    }

    /// Reconciles transport state with a frame the engine displayed.
    ///
    /// Returns false when the frame repeats the previous one. A repeat that
    /// lands on a pending seek target still confirms the seek.
    pub fn on_show_frame(
        &mut self,
        state: &mut TransportState,
        frame: FrameUpdate,
        events: &EventBus,
    ) -> bool {
        if self.last_frame == Some(frame) && state.pending_seek() != Some(frame.position) {
            return false;
        }
        self.last_frame = Some(frame);

        if frame.length != state.duration {
            state.apply_duration(frame.length);
        }
        if frame.fps.is_finite() && frame.fps > 0.0 {
            state.fps = frame.fps;
        }
        self.apply_engine_bounds(state, frame, events);

        let last = state.last_frame();
        let position = frame.position.clamp(0, last);
        match state.pending_seek {
            Some(pending) => {
                let passed = frame.is_playing && pending.is_passed_by(position, state.speed);
                if position == pending.target || passed {
                    state.pending_seek = None;
                    state.position = position;
                    events.emit(TransportEvent::SeekCompleted);
                } else {
                    log::trace!(
                        "Frame {} arrived while seek to {} is pending",
                        position,
                        pending.target
                    );
                }
            }
            None => state.position = position,
        }

        events.emit(TransportEvent::FrameShown {
            position: state.position,
            fraction: state.scrub_fraction(),
        });

        if self.showing_playing != Some(frame.is_playing) {
            self.showing_playing = Some(frame.is_playing);
            if frame.is_playing {
                self.show_playing(events);
            } else {
                self.show_paused(events);
            }
        }
        true
    }

    fn apply_engine_bounds(
        &mut self,
        state: &mut TransportState,
        frame: FrameUpdate,
        events: &EventBus,
    ) {
        let last = state.last_frame();
        if self.previous_in != Some(frame.in_point) {
            self.previous_in = Some(frame.in_point);
            let in_point = frame.in_point.clamp(0, last);
            let before = state.in_point();
            state.in_point = (in_point > 0).then_some(in_point);
            if state.in_point() != before {
                events.emit(TransportEvent::InChanged(state.in_point()));
            }
        }
        if self.previous_out != Some(frame.out_point) {
            self.previous_out = Some(frame.out_point);
            let out_point = frame.out_point.clamp(state.in_point(), last);
            let before = state.out_point();
            state.out_point = (out_point < last).then_some(out_point);
            if state.out_point() != before {
                events.emit(TransportEvent::OutChanged(state.out_point()));
            }
        }
    }

    pub fn show_playing(&mut self, events: &EventBus) {
        self.showing_playing = Some(true);
        events.emit(TransportEvent::ShowPlaying);
    }

    pub fn show_paused(&mut self, events: &EventBus) {
        self.showing_playing = Some(false);
        events.emit(TransportEvent::ShowPaused);
    }

    // =========================================================================
    // ZOOM AND SCROLL
    // =========================================================================

    /// Returns true when the size differs from the previous one.
    pub fn set_video_size(&mut self, size: VideoSize, events: &EventBus) -> bool {
        if size == self.video_size {
            return false;
        }
        self.video_size = size;
        self.relayout(events);
        true
    }

    pub fn resize(&mut self, width: u32, height: u32, events: &EventBus) {
        self.viewport = VideoSize::new(width, height);
        self.relayout(events);
    }

    fn relayout(&mut self, events: &EventBus) {
        if self.zoom.fit {
            let factor = self.clamp_zoom(fit_factor(self.video_size, self.viewport));
            if factor != self.zoom.factor {
                self.zoom.factor = factor;
                events.emit(TransportEvent::ZoomChanged(factor));
            }
        }
        let (h, v) = (self.horizontal.fraction(), self.vertical.fraction());
        self.adjust_scroll_bars(h, v, events);
    }

    fn clamp_zoom(&self, factor: f64) -> f64 {
        factor.clamp(self.config.min_zoom, self.config.max_zoom)
    }

    /// Stores an explicit zoom factor and remembers it for `toggle_zoom`.
    pub fn set_zoom(&mut self, factor: f64, icon: ZoomIcon, events: &EventBus) {
        if !factor.is_finite() || factor <= 0.0 {
            log::debug!("Ignoring invalid zoom factor {}", factor);
            return;
        }
        let factor = self.clamp_zoom(factor);
        self.zoom.toggle_factor = factor;
        self.apply_zoom(factor, false, icon, events);
    }

    fn apply_zoom(&mut self, factor: f64, fit: bool, icon: ZoomIcon, events: &EventBus) {
        let (h, v) = (self.horizontal.fraction(), self.vertical.fraction());
        self.zoom.factor = factor;
        self.zoom.fit = fit;
        self.zoom.icon = icon;
        log::debug!("Zoom set to {:.0}% ({})", factor * 100.0, icon.name(&self.config.icons));
        events.emit(TransportEvent::ZoomChanged(factor));
        self.adjust_scroll_bars(h, v, events);
    }

    pub fn zoom_fit(&mut self, events: &EventBus) {
        let factor = self.clamp_zoom(fit_factor(self.video_size, self.viewport));
        self.apply_zoom(factor, true, ZoomIcon::Fit, events);
    }

    pub fn zoom_original(&mut self, events: &EventBus) {
        self.set_zoom(1.0, ZoomIcon::Original, events);
    }

    pub fn zoom_in(&mut self, events: &EventBus) {
        let factor = self.zoom.factor * 2.0;
        self.set_zoom(factor, ZoomIcon::ZoomIn, events);
    }

    pub fn zoom_out(&mut self, events: &EventBus) {
        let factor = self.zoom.factor / 2.0;
        self.set_zoom(factor, ZoomIcon::ZoomOut, events);
    }

    pub fn toggle_zoom(&mut self, checked: bool, events: &EventBus) {
        if checked {
            if self.zoom.untoggled.is_none() {
                self.zoom.untoggled = Some(self.zoom.snapshot());
            }
            let factor = self.clamp_zoom(self.zoom.toggle_factor);
            self.apply_zoom(factor, false, ZoomIcon::for_factor(factor), events);
        } else {
            match self.zoom.untoggled.take() {
                Some(snapshot) if snapshot.fit => self.zoom_fit(events),
                Some(snapshot) => self.apply_zoom(snapshot.factor, false, snapshot.icon, events),
                None => self.zoom_fit(events),
            }
        }
    }

    /// Resizes both scroll ranges to the zoomed video, keeping each fraction.
    pub fn adjust_scroll_bars(&mut self, horizontal: f64, vertical: f64, events: &EventBus) {
        let before = (self.horizontal.value, self.vertical.value);
        let content_width = self.video_size.width as f64 * self.zoom.factor;
        let content_height = self.video_size.height as f64 * self.zoom.factor;
        self.horizontal.adjust(content_width, self.viewport.width, horizontal);
        self.vertical.adjust(content_height, self.viewport.height, vertical);

        if self.horizontal.value != before.0 {
            events.emit(TransportEvent::ScrolledHorizontally(self.horizontal.value));
        }
        if self.vertical.value != before.1 {
            events.emit(TransportEvent::ScrolledVertically(self.vertical.value));
        }
    }

    pub fn scroll_horizontally(&mut self, x: i32, events: &EventBus) {
        if let Some(x) = self.horizontal.scroll_to(x) {
            events.emit(TransportEvent::ScrolledHorizontally(x));
        }
    }

    pub fn scroll_vertically(&mut self, y: i32, events: &EventBus) {
        if let Some(y) = self.vertical.scroll_to(y) {
            events.emit(TransportEvent::ScrolledVertically(y));
        }
    }
}
