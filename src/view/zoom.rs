use crate::core::ZoomIcons;
use crate::engine::VideoSize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomIcon {
    Fit,
    Original,
    ZoomIn,
    ZoomOut,
}

impl ZoomIcon {
    pub fn for_factor(factor: f64) -> Self {
        if (factor - 1.0).abs() < f64::EPSILON {
            ZoomIcon::Original
        } else if factor > 1.0 {
            ZoomIcon::ZoomIn
        } else {
            ZoomIcon::ZoomOut
        }
    }

    pub fn name<'a>(&self, icons: &'a ZoomIcons) -> &'a str {
        match self {
            ZoomIcon::Fit => &icons.fit,
            ZoomIcon::Original => &icons.original,
            ZoomIcon::ZoomIn => &icons.zoom_in,
            ZoomIcon::ZoomOut => &icons.zoom_out,
        }
    }
}

/// A zoom level as it was before `toggle_zoom(true)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ZoomSnapshot {
    pub factor: f64,
    pub fit: bool,
    pub icon: ZoomIcon,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZoomState {
    pub(crate) factor: f64,
    /// Last explicitly chosen zoom; the target of `toggle_zoom(true)`.
    pub(crate) toggle_factor: f64,
    pub(crate) untoggled: Option<ZoomSnapshot>,
    pub(crate) icon: ZoomIcon,
    pub(crate) fit: bool,
}

impl ZoomState {
    pub fn new(toggle_factor: f64) -> Self {
        Self {
            factor: 1.0,
            toggle_factor,
            untoggled: None,
            icon: ZoomIcon::Fit,
            fit: true,
        }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn toggle_factor(&self) -> f64 {
        self.toggle_factor
    }

    pub fn icon(&self) -> ZoomIcon {
        self.icon
    }

    pub fn is_fit(&self) -> bool {
        self.fit
    }

    pub(crate) fn snapshot(&self) -> ZoomSnapshot {
        ZoomSnapshot {
            factor: self.factor,
            fit: self.fit,
            icon: self.icon,
        }
    }
}

/// Largest factor at which the whole video is visible in the viewport.
pub fn fit_factor(video: VideoSize, viewport: VideoSize) -> f64 {
    if video.is_empty() || viewport.is_empty() {
        return 1.0;
    }
    let horizontal = viewport.width as f64 / video.width as f64;
    let vertical = viewport.height as f64 / video.height as f64;
    horizontal.min(vertical)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollBar {
    pub maximum: i32,
    pub value: i32,
}

impl ScrollBar {
    /// Current value as a fraction of the range, centered when there is no range.
    pub fn fraction(&self) -> f64 {
        if self.maximum > 0 {
            self.value as f64 / self.maximum as f64
        } else {
            0.5
        }
    }

    /// Recomputes the range for scaled content, keeping the given fraction.
    pub fn adjust(&mut self, content: f64, viewport: u32, fraction: f64) {
        self.maximum = (content - viewport as f64).round().max(0.0) as i32;
        let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.5 };
        self.value = (fraction * self.maximum as f64).round() as i32;
    }

    /// Moves within the range; returns the new value if it changed.
    pub fn scroll_to(&mut self, value: i32) -> Option<i32> {
        let value = value.clamp(0, self.maximum);
        if value == self.value {
            None
        } else {
            self.value = value;
            Some(value)
        }
    }
}
