//! Time formatting shared by run reports and progress logging.

/// Format elapsed seconds into human-readable time (days, hours, minutes, seconds)
pub fn format_elapsed_time(elapsed_secs: f64) -> String {
    if elapsed_secs < 60.0 {
        // Less than a minute - show seconds only
        format!("{:.1}s", elapsed_secs)
    } else if elapsed_secs < 3600.0 {
        // Less than an hour - show minutes and seconds
        let minutes = (elapsed_secs / 60.0).floor();
        let seconds = elapsed_secs % 60.0;
        format!("{}m {:.0}s ({:.1}s)", minutes, seconds, elapsed_secs)
    } else if elapsed_secs < 86400.0 {
        // Less than a day - show hours, minutes, seconds
        let hours = (elapsed_secs / 3600.0).floor();
        let remaining = elapsed_secs % 3600.0;
        let minutes = (remaining / 60.0).floor();
        let seconds = remaining % 60.0;
        format!(
            "{}h {}m {:.0}s ({:.1}s)",
            hours, minutes, seconds, elapsed_secs
        )
    } else {
        // More than a day - show days, hours, minutes, seconds
        let days = (elapsed_secs / 86400.0).floor();
        let remaining = elapsed_secs % 86400.0;
        let hours = (remaining / 3600.0).floor();
        let remaining = remaining % 3600.0;
        let minutes = (remaining / 60.0).floor();
        let seconds = remaining % 60.0;
        format!(
            "{}d {}h {}m {:.0}s ({:.1}s)",
            days, hours, minutes, seconds, elapsed_secs
        )
    }
}
