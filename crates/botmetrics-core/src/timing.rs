//! Response time derivation

use chrono::{NaiveTime, Timelike};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Seconds from question to answer, both given as time of day.
///
/// An answer earlier than its question is taken to fall on the next day.
/// Returns `None` when either time is missing so that an unknown duration is
/// never confused with a real zero-second answer.
pub fn compute_response_time(question: Option<NaiveTime>, answer: Option<NaiveTime>) -> Option<u32> {
    let (question, answer) = (question?, answer?);

    let mut elapsed =
        i64::from(answer.num_seconds_from_midnight()) - i64::from(question.num_seconds_from_midnight());
    if elapsed < 0 {
        elapsed += SECONDS_PER_DAY;
    }

    u32::try_from(elapsed).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32, s: u32) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(h, m, s)
    }

    #[test]
    fn test_same_day() {
        assert_eq!(compute_response_time(t(9, 0, 0), t(9, 1, 30)), Some(90));
    }

    #[test]
    fn test_identical_times_is_zero() {
        assert_eq!(compute_response_time(t(12, 0, 0), t(12, 0, 0)), Some(0));
    }

    #[test]
    fn test_midnight_rollover() {
        assert_eq!(compute_response_time(t(23, 59, 59), t(0, 0, 1)), Some(2));
    }

    #[test]
    fn test_missing_time_is_unknown() {
        assert_eq!(compute_response_time(None, t(0, 0, 1)), None);
        assert_eq!(compute_response_time(t(0, 0, 1), None), None);
    }

    #[test]
    fn test_never_negative_over_full_day() {
        let question = t(13, 17, 42);
        for minute in 0..24 * 60 {
            let answer = NaiveTime::from_num_seconds_from_midnight_opt(minute * 60, 0);
            let elapsed = compute_response_time(question, answer).unwrap();
            assert!(i64::from(elapsed) < SECONDS_PER_DAY);
        }
    }
}
