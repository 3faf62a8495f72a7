//! Accounting-month arithmetic over simulated day numbers
//!
//! Days are 1-based and run continuously; months are fixed-length windows
//! used for payroll settlement and tracker resets.

use crate::core::types::Day;

/// 1-based position of `day` within its accounting month.
pub fn month_day_index(day: Day, month_len_days: u32) -> u32 {
    let len = month_len_days.max(1);
    ((day.max(1) - 1) % len) + 1
}

/// True on the settlement day (the last day of a month).
pub fn is_month_end(day: Day, month_len_days: u32) -> bool {
    month_day_index(day, month_len_days) == month_len_days.max(1)
}

/// 1-based month number containing `day`.
pub fn month_number(day: Day, month_len_days: u32) -> u32 {
    let len = month_len_days.max(1);
    ((day.max(1) - 1) / len) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_day_index_wraps() {
        assert_eq!(month_day_index(1, 30), 1);
        assert_eq!(month_day_index(30, 30), 30);
        assert_eq!(month_day_index(31, 30), 1);
        assert_eq!(month_day_index(61, 30), 1);
    }

    #[test]
    fn test_month_end_detection() {
        assert!(!is_month_end(1, 30));
        assert!(is_month_end(30, 30));
        assert!(is_month_end(60, 30));
        assert!(!is_month_end(31, 30));
    }

    #[test]
    fn test_month_number() {
        assert_eq!(month_number(1, 30), 1);
        assert_eq!(month_number(30, 30), 1);
        assert_eq!(month_number(31, 30), 2);
        assert_eq!(month_number(90, 30), 3);
    }
}
