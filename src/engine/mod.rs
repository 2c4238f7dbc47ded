pub mod simulated;

pub use simulated::*;

/// Width and height of the video being shown, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VideoSize {
    pub width: u32,
    pub height: u32,
}

impl VideoSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Describes a freshly opened source.
#[derive(Debug, Clone, PartialEq)]
pub struct ProducerInfo {
    /// Length in frames.
    pub length: i32,
    pub fps: f64,
    pub in_point: Option<i32>,
    pub out_point: Option<i32>,
    pub seekable: bool,
    pub video_size: VideoSize,
}

impl ProducerInfo {
    pub fn new(length: i32, fps: f64) -> Self {
        Self {
            length,
            fps,
            in_point: None,
            out_point: None,
            seekable: true,
            video_size: VideoSize::new(1920, 1080),
        }
    }
}

/// One displayed frame as reported by the engine's frame clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUpdate {
    pub position: i32,
    pub fps: f64,
    pub in_point: i32,
    pub out_point: i32,
    pub length: i32,
    pub is_playing: bool,
}

/// Notifications pushed from the engine back to the coordination thread.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineNotification {
    Frame(FrameUpdate),
    EndOfStream,
    CaptureStateChanged(bool),
    AudioLevels(Vec<f64>),
}

/// Commands the transport forwards to a media engine.
///
/// All calls are fire-and-forget; their effect is observed later through
/// [`EngineNotification::Frame`].
pub trait MediaEngine {
    fn play(&self, speed: f64);
    fn pause(&self);
    fn stop(&self);
    fn seek(&self, position: i32);
    fn set_volume(&self, volume: f64);
    fn current_volume(&self) -> f64;
}
