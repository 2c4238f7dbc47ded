/// A seek the engine has not yet confirmed with a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingSeek {
    pub target: i32,
    /// Playhead when the seek was issued; frames still in flight come from here.
    pub origin: i32,
}

impl PendingSeek {
    /// Whether a frame shown while playing at `speed` lies beyond the target.
    ///
    /// Frames on the far side of `origin` predate the seek and never count.
    pub fn is_passed_by(&self, position: i32, speed: f64) -> bool {
        if speed > 0.0 {
            position > self.target && (self.origin <= self.target || position < self.origin)
        } else if speed < 0.0 {
            position < self.target && (self.origin >= self.target || position > self.origin)
        } else {
            false
        }
    }
}

/// Playback state owned by the transport controller.
///
/// Positions are frame numbers. `duration` is the source length in frames, so
/// the last addressable frame is `duration - 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportState {
    pub(crate) position: i32,
    pub(crate) in_point: Option<i32>,
    pub(crate) out_point: Option<i32>,
    pub(crate) duration: i32,
    pub(crate) fps: f64,
    /// Zero while paused or stopped; negative while playing backwards.
    pub(crate) speed: f64,
    pub(crate) is_paused: bool,
    pub(crate) is_seekable: bool,
    pub(crate) is_capturing: bool,
    pub(crate) volume: f64,
    pub(crate) saved_volume: f64,
    pub(crate) is_muted: bool,
    pub(crate) markers: Vec<i32>,
    pub(crate) pending_seek: Option<PendingSeek>,
    /// Pause as soon as the engine shows a playing frame.
    pub(crate) pause_after_play: bool,
}

impl TransportState {
    pub fn new(volume: f64) -> Self {
        let volume = volume.clamp(0.0, 1.0);
        Self {
            position: 0,
            in_point: None,
            out_point: None,
            duration: 0,
            fps: 25.0,
            speed: 0.0,
            is_paused: true,
            is_seekable: true,
            is_capturing: false,
            volume,
            saved_volume: volume,
            is_muted: false,
            markers: Vec::new(),
            pending_seek: None,
            pause_after_play: false,
        }
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn duration(&self) -> i32 {
        self.duration
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn is_playing(&self) -> bool {
        !self.is_paused
    }

    pub fn is_seekable(&self) -> bool {
        self.is_seekable
    }

    pub fn is_capturing(&self) -> bool {
        self.is_capturing
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn saved_volume(&self) -> f64 {
        self.saved_volume
    }

    pub fn is_muted(&self) -> bool {
        self.is_muted
    }

    pub fn markers(&self) -> &[i32] {
        &self.markers
    }

    pub fn pending_seek(&self) -> Option<i32> {
        self.pending_seek.map(|pending| pending.target)
    }

    pub fn is_pausing_after_play(&self) -> bool {
        self.pause_after_play
    }

    pub fn last_frame(&self) -> i32 {
        (self.duration - 1).max(0)
    }

    pub fn in_point(&self) -> i32 {
        self.in_point.unwrap_or(0).clamp(0, self.last_frame())
    }

    pub fn out_point(&self) -> i32 {
        self.out_point
            .unwrap_or_else(|| self.last_frame())
            .clamp(self.in_point(), self.last_frame())
    }

    /// Length of the in..=out selection in frames, 0 for empty media.
    pub fn selection_duration(&self) -> i32 {
        if self.duration <= 0 {
            0
        } else {
            self.out_point() - self.in_point() + 1
        }
    }

    /// Moves the playhead ahead of the engine and waits for it to catch up.
    pub(crate) fn begin_seek(&mut self, target: i32) {
        self.pending_seek = Some(PendingSeek {
            target,
            origin: self.position,
        });
        self.position = target;
    }

    /// Clamps a requested playhead into the playable range.
    pub fn clamp_to_range(&self, position: i32) -> i32 {
        position.clamp(self.in_point(), self.out_point())
    }

    /// Fraction of the source covered by the playhead, for the scrub bar.
    pub fn scrub_fraction(&self) -> f64 {
        if self.duration <= 0 {
            0.0
        } else {
            self.position as f64 / self.duration as f64
        }
    }

    /// Accepts markers inside the source, sorted and without duplicates.
    pub(crate) fn replace_markers(&mut self, markers: &[i32]) {
        let last = self.last_frame();
        let mut accepted: Vec<i32> = markers
            .iter()
            .copied()
            .filter(|&m| m >= 0 && m <= last)
            .collect();
        accepted.sort_unstable();
        accepted.dedup();
        if accepted.len() != markers.len() {
            let ignored = markers.len() - accepted.len();
            log::debug!("Ignored {} marker(s) outside 0..={}", ignored, last);
        }
        self.markers = accepted;
    }

    pub fn next_marker(&self, position: i32) -> Option<i32> {
        self.markers.iter().copied().find(|&m| m > position)
    }

    pub fn previous_marker(&self, position: i32) -> Option<i32> {
        self.markers.iter().copied().rev().find(|&m| m < position)
    }

    /// Re-establishes the range invariants after the duration changed.
    pub(crate) fn apply_duration(&mut self, duration: i32) {
        self.duration = duration.max(0);
        let last = self.last_frame();
        if let Some(in_point) = self.in_point.as_mut() {
            *in_point = (*in_point).clamp(0, last);
        }
        let in_point = self.in_point();
        if let Some(out_point) = self.out_point.as_mut() {
            *out_point = (*out_point).clamp(in_point, last);
        }
        self.position = self.position.clamp(0, last);
        self.markers.retain(|&m| m <= last);
    }
}
