//! Stage Timing
//!
//! Wraps each benchmark stage in a spinner and reports its wall-clock time on stderr.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

/// Run `stage`, then print `"<desc>: <elapsed>"` to stderr.
pub fn timed<T>(desc: &str, stage: impl FnOnce() -> T) -> T {
    let pb = create_spinner(desc);
    let start = Instant::now();
    let result = stage();
    pb.finish_and_clear();
    eprintln!("{}: {}", desc, format_elapsed(start.elapsed()));
    result
}

/// Milliseconds below ten seconds, whole seconds from there on.
pub fn format_elapsed(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    if millis >= 10_000 {
        format!("{}s", millis / 1000)
    } else {
        format!("{}ms", millis)
    }
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} ...") {
        pb.set_style(
            style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(0)), "0ms");
        assert_eq!(format_elapsed(Duration::from_millis(9_999)), "9999ms");
        assert_eq!(format_elapsed(Duration::from_millis(10_000)), "10s");
        assert_eq!(format_elapsed(Duration::from_millis(61_500)), "61s");
    }

    #[test]
    fn test_timed_returns_stage_result() {
        let value = timed("Adding", || 2 + 2);
        assert_eq!(value, 4);
    }
}
