//! Elapsed-time formatting for log lines and the batch summary.

use std::time::Duration;

const SECS_PER_DAY: u64 = 86_400;
const SECS_PER_HOUR: u64 = 3_600;
const SECS_PER_MINUTE: u64 = 60;

/// Formats a number of seconds as `DDd:HHh:MMm:SSs`.
///
/// Days are not capped, so runs longer than 99 days simply widen the field.
pub fn format_elapsed(total_secs: u64) -> String {
    let days = total_secs / SECS_PER_DAY;
    let hours = (total_secs % SECS_PER_DAY) / SECS_PER_HOUR;
    let minutes = (total_secs % SECS_PER_HOUR) / SECS_PER_MINUTE;
    let seconds = total_secs % SECS_PER_MINUTE;

    format!("{:02}d:{:02}h:{:02}m:{:02}s", days, hours, minutes, seconds)
}

/// Formats a duration, truncated to whole seconds.
pub fn format_duration(elapsed: Duration) -> String {
    format_elapsed(elapsed.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_format_elapsed_examples() {
        assert_eq!(format_elapsed(0), "00d:00h:00m:00s");
        assert_eq!(format_elapsed(3661), "00d:01h:01m:01s");
        assert_eq!(format_elapsed(90000), "01d:01h:00m:00s");
        assert_eq!(format_elapsed(59), "00d:00h:00m:59s");
        assert_eq!(format_elapsed(86_399), "00d:23h:59m:59s");
    }

    #[test]
    fn test_format_duration_truncates_subsecond() {
        assert_eq!(format_duration(Duration::from_millis(61_999)), "00d:00h:01m:01s");
    }

    fn parse_field(part: &str, suffix: char) -> u64 {
        part.trim_end_matches(suffix).parse().unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        // Decomposition recombines to the input and every sub-day field stays in range
        #[test]
        fn prop_format_elapsed_decomposes(total in 0u64..(SECS_PER_DAY * 99)) {
            let formatted = format_elapsed(total);
            let parts: Vec<&str> = formatted.split(':').collect();
            prop_assert_eq!(parts.len(), 4);

            let days = parse_field(parts[0], 'd');
            let hours = parse_field(parts[1], 'h');
            let minutes = parse_field(parts[2], 'm');
            let seconds = parse_field(parts[3], 's');

            prop_assert!(hours < 24 && minutes < 60 && seconds < 60);
            prop_assert_eq!(
                days * SECS_PER_DAY + hours * SECS_PER_HOUR + minutes * SECS_PER_MINUTE + seconds,
                total
            );
            prop_assert_eq!(formatted.len(), "00d:00h:00m:00s".len());
        }
    }
}
