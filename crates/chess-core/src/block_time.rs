//! Block-count durations rendered as wall-clock estimates.

/// Approximate block time of the target chain.
pub const DEFAULT_SECONDS_PER_BLOCK: f64 = 6.0;

const DAY: f64 = 86_400.0;
const HOUR: f64 = 3_600.0;
const MINUTE: f64 = 60.0;

/// Format a block limit as `"{blocks} (~1d2h)"`, or `"none"` when absent.
///
/// At most the two largest components are guaranteed; seconds only appear
/// when fewer than two larger components were emitted.
pub fn format_block_time(num_blocks: Option<u64>, seconds_per_block: f64) -> String {
    let Some(num_blocks) = num_blocks else {
        return "none".to_string();
    };

    let mut out = Vec::new();
    let mut seconds = num_blocks as f64 * seconds_per_block;

    for (unit, suffix) in [(DAY, "d"), (HOUR, "h"), (MINUTE, "m")] {
        if seconds >= unit {
            let count = (seconds / unit).floor() as u64;
            seconds %= unit;
            out.push(format!("{count}{suffix}"));
        }
    }

    if (out.len() < 2 && seconds > 0.0) || out.is_empty() {
        out.push(format!("{}s", seconds.round() as u64));
    }

    format!("{num_blocks} (~{})", out.join(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(blocks: Option<u64>) -> String {
        format_block_time(blocks, DEFAULT_SECONDS_PER_BLOCK)
    }

    #[test]
    fn test_absent_limit() {
        assert_eq!(fmt(None), "none");
    }

    #[test]
    fn test_zero_blocks() {
        assert_eq!(fmt(Some(0)), "0 (~0s)");
    }

    #[test]
    fn test_seconds_only() {
        assert_eq!(fmt(Some(5)), "5 (~30s)");
    }

    #[test]
    fn test_minutes_with_seconds() {
        assert_eq!(fmt(Some(11)), "11 (~1m6s)");
        assert_eq!(fmt(Some(100)), "100 (~10m)");
    }

    #[test]
    fn test_hours_and_minutes() {
        assert_eq!(fmt(Some(1000)), "1000 (~1h40m)");
    }

    #[test]
    fn test_days_hours() {
        assert_eq!(fmt(Some(15_000)), "15000 (~1d1h)");
    }

    #[test]
    fn test_custom_block_time() {
        assert_eq!(format_block_time(Some(10), 1.5), "10 (~15s)");
    }
}
