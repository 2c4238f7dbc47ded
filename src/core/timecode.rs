/// Formats a frame number as `HH:MM:SS:FF` at the given frame rate.
pub fn format_timecode(frame: i32, fps: f64) -> String {
    let fps = if fps.is_finite() && fps >= 1.0 { fps.round() as i64 } else { 25 };
    let frame = frame.max(0) as i64;

    let frames = frame % fps;
    let total_seconds = frame / fps;
    let seconds = total_seconds % 60;
    let minutes = (total_seconds / 60) % 60;
    let hours = total_seconds / 3600;

    format!("{:02}:{:02}:{:02}:{:02}", hours, minutes, seconds, frames)
}

/// Parses either a plain frame number or an `HH:MM:SS:FF` timecode.
pub fn parse_timecode(text: &str, fps: f64) -> Option<i32> {
    let text = text.trim();
    if let Ok(frame) = text.parse::<i32>() {
        return Some(frame);
    }

    let fps = if fps.is_finite() && fps >= 1.0 { fps.round() as i64 } else { 25 };
    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() != 4 {
        return None;
    }

    let mut values = [0i64; 4];
    for (value, part) in values.iter_mut().zip(&parts) {
        *value = part.parse().ok()?;
        if *value < 0 {
            return None;
        }
    }
    let [hours, minutes, seconds, frames] = values;
    let total = ((hours * 60 + minutes) * 60 + seconds) * fps + frames;
    i32::try_from(total).ok()
}
