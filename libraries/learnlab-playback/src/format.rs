//! Display formatting for positions and durations

/// Whole seconds, negative and non-finite values read as zero
fn whole_seconds(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    }
}

/// Player clock, `m:ss` (minutes are not wrapped into hours)
///
/// ```
/// use learnlab_playback::format::format_clock;
///
/// assert_eq!(format_clock(75.9), "1:15");
/// assert_eq!(format_clock(3725.0), "62:05");
/// ```
pub fn format_clock(seconds: f64) -> String {
    let total = whole_seconds(seconds);
    format!("{}:{:02}", total / 60, total % 60)
}

/// Transcript timestamp, `hh:mm:ss`
pub fn format_timestamp(seconds: f64) -> String {
    let total = whole_seconds(seconds);
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Coarse duration, `1h 5m` or `5m`
pub fn format_duration(seconds: f64) -> String {
    let total = whole_seconds(seconds);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}
