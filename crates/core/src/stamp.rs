//! Submission timestamps.
//!
//! The tenth appended column records when a batch left this machine, in the
//! Korean locale's short date-time form: `2024. 1. 15. 오후 3:04:05`.

use chrono::{Local, NaiveDateTime, Timelike};

/// Format `at` as `Y. M. D. 오전|오후 h:mm:ss` (12-hour clock, no padding
/// on month, day or hour).
pub fn korean_timestamp(at: &NaiveDateTime) -> String {
    let (pm, hour) = at.hour12();
    let meridiem = if pm { "오후" } else { "오전" };
    format!(
        "{}. {} {}:{:02}:{:02}",
        at.format("%Y. %-m. %-d"),
        meridiem,
        hour,
        at.minute(),
        at.second()
    )
}

/// Local wall-clock time, formatted for submission.
pub fn now() -> String {
    korean_timestamp(&Local::now().naive_local())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn afternoon() {
        assert_eq!(korean_timestamp(&at(2024, 1, 15, 15, 4, 5)), "2024. 1. 15. 오후 3:04:05");
    }

    #[test]
    fn midnight_and_noon() {
        assert_eq!(korean_timestamp(&at(2024, 12, 3, 0, 0, 9)), "2024. 12. 3. 오전 12:00:09");
        assert_eq!(korean_timestamp(&at(2024, 12, 3, 12, 30, 0)), "2024. 12. 3. 오후 12:30:00");
    }

    #[test]
    fn morning() {
        assert_eq!(korean_timestamp(&at(2025, 6, 30, 9, 59, 59)), "2025. 6. 30. 오전 9:59:59");
    }

    #[test]
    fn now_has_meridiem() {
        let s = now();
        assert!(s.contains("오전") || s.contains("오후"));
    }
}
