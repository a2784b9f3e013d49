//! Playback time labels

/// Format elapsed milliseconds as `mm:ss`.
///
/// Minutes are not wrapped at an hour, so 65 minutes renders as `65:00`.
pub fn format_time(millis: u64) -> String {
    let total_secs = millis / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
