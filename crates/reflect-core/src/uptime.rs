// ── Uptime formatting ──
//
// The wire reports uptime either as a started-at timestamp or as a raw
// seconds duration, sometimes with a fractional part. Consumers always
// see the human-readable form.

use crate::model::NONE_VALUE;

/// Format an elapsed duration in seconds as
/// `"D day(s) H hour(s) M minute(s) S second(s)"`.
///
/// Zero-valued segments are omitted entirely. A non-positive duration
/// formats as `"None"`. Decomposition uses integer floor division:
/// seconds `total % 60`, minutes `(total % 3600) / 60`, hours
/// `(total % 86400) / 3600`, days `total / 86400`.
pub fn normalize_elapsed(total_seconds: i64) -> String {
    if total_seconds <= 0 {
        return NONE_VALUE.to_string();
    }

    let seconds = total_seconds % 60;
    let minutes = total_seconds % 3600 / 60;
    let hours = total_seconds % 86400 / 3600;
    let days = total_seconds / 86400;

    let mut segments = Vec::with_capacity(4);
    if days > 0 {
        segments.push(format!("{days} day(s)"));
    }
    if hours > 0 {
        segments.push(format!("{hours} hour(s)"));
    }
    if minutes > 0 {
        segments.push(format!("{minutes} minute(s)"));
    }
    if seconds > 0 {
        segments.push(format!("{seconds} second(s)"));
    }
    segments.join(" ")
}

/// Parse a raw uptime property value into whole seconds.
///
/// The value may carry a fractional part; it is truncated toward zero
/// after parsing, matching the integer decomposition above.
pub(crate) fn parse_seconds(raw: &str) -> Option<i64> {
    if let Ok(whole) = raw.parse::<i64>() {
        return Some(whole);
    }
    #[allow(clippy::cast_possible_truncation)]
    raw.parse::<f64>().ok().map(|value| value as i64)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn full_decomposition() {
        assert_eq!(
            normalize_elapsed(90061),
            "1 day(s) 1 hour(s) 1 minute(s) 1 second(s)"
        );
    }

    #[test]
    fn zero_segments_are_omitted() {
        assert_eq!(normalize_elapsed(59), "59 second(s)");
        assert_eq!(normalize_elapsed(3600), "1 hour(s)");
        assert_eq!(normalize_elapsed(86400 + 59), "1 day(s) 59 second(s)");
    }

    #[test]
    fn non_positive_yields_none() {
        assert_eq!(normalize_elapsed(0), "None");
        assert_eq!(normalize_elapsed(-42), "None");
    }

    #[test]
    fn decomposition_is_lossless_for_positive_inputs() {
        // Round-trip the floor decomposition for a spread of values.
        for total in [1_i64, 60, 61, 3599, 3661, 86399, 86401, 90061, 1_234_567] {
            let seconds = total % 60;
            let minutes = total % 3600 / 60;
            let hours = total % 86400 / 3600;
            let days = total / 86400;
            assert_eq!(days * 86400 + hours * 3600 + minutes * 60 + seconds, total);
        }
    }

    #[test]
    fn fractional_values_truncate() {
        assert_eq!(parse_seconds("61.9"), Some(61));
        assert_eq!(parse_seconds("61"), Some(61));
        assert_eq!(parse_seconds("junk"), None);
    }
}
