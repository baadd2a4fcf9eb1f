/// Render a countdown as `m:ss`.
///
/// Minutes are unpadded and never roll over into hours, so a full hour
/// reads `60:00`.
pub fn format_display(seconds_remaining: u32) -> String {
    format!("{}:{:02}", seconds_remaining / 60, seconds_remaining % 60)
}

/// Label used for a duration choice, e.g. `5 min`.
pub fn format_minutes_label(minutes: u32) -> String {
    format!("{minutes} min")
}
