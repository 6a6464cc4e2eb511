use chrono::{Local, NaiveTime, Timelike};

use crate::models::{Availability, WorkingHours};

/// Evaluates a working window against a wall-clock time.
///
/// Both ends are inclusive and compared in minutes since midnight. A window
/// whose end is before its start (overnight) is never available; the
/// comparison is deliberately not wrapped around midnight.
pub fn evaluate(working_hours: Option<&WorkingHours>, now: NaiveTime) -> Availability {
    let Some(hours) = working_hours else {
        return Availability::NoSchedule;
    };
    if hours.start.trim().is_empty() || hours.end.trim().is_empty() {
        return Availability::NoSchedule;
    }

    let (Some(start), Some(end)) = (clock_minutes(&hours.start), clock_minutes(&hours.end)) else {
        return Availability::Unavailable;
    };
    let current = minutes_since_midnight(now);

    if start <= current && current <= end {
        Availability::Available
    } else {
        Availability::Unavailable
    }
}

/// `evaluate` against the viewer's local clock.
pub fn is_available_now(working_hours: Option<&WorkingHours>) -> Availability {
    evaluate(working_hours, Local::now().time())
}

/// Parses `"HH:MM"` into minutes since midnight. Extra `:SS` is ignored.
pub fn clock_minutes(value: &str) -> Option<u32> {
    let mut parts = value.trim().split(':');
    let hours: u32 = parts.next()?.trim().parse().ok()?;
    let minutes: u32 = parts.next()?.trim().parse().ok()?;
    hours.checked_mul(60)?.checked_add(minutes)
}

pub fn minutes_since_midnight(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn window_is_inclusive_at_both_ends() {
        let hours = WorkingHours::new("09:00", "17:00");
        assert_eq!(evaluate(Some(&hours), at(9, 0)), Availability::Available);
        assert_eq!(evaluate(Some(&hours), at(17, 0)), Availability::Available);
        assert_eq!(evaluate(Some(&hours), at(8, 59)), Availability::Unavailable);
        assert_eq!(evaluate(Some(&hours), at(17, 1)), Availability::Unavailable);
    }

    #[test]
    fn seconds_do_not_push_past_the_end() {
        let hours = WorkingHours::new("09:00", "17:00");
        let late = NaiveTime::from_hms_opt(17, 0, 59).unwrap();
        assert_eq!(evaluate(Some(&hours), late), Availability::Available);
    }

    #[test]
    fn missing_schedule_is_not_unavailable() {
        let result = evaluate(None, at(12, 0));
        assert_eq!(result, Availability::NoSchedule);
        assert!(!result.shows_badge());
        assert_eq!(evaluate(Some(&WorkingHours::new("", "17:00")), at(12, 0)), Availability::NoSchedule);
    }

    #[test]
    fn overnight_window_reports_unavailable() {
        let hours = WorkingHours::new("22:00", "06:00");
        assert_eq!(evaluate(Some(&hours), at(23, 0)), Availability::Unavailable);
        assert_eq!(evaluate(Some(&hours), at(2, 0)), Availability::Unavailable);
    }

    #[test]
    fn degenerate_window_matches_only_its_instant() {
        let hours = WorkingHours::new("12:00", "12:00");
        assert_eq!(evaluate(Some(&hours), at(12, 0)), Availability::Available);
        assert_eq!(evaluate(Some(&hours), at(12, 1)), Availability::Unavailable);
    }

    #[test]
    fn malformed_times_show_unavailable() {
        let hours = WorkingHours::new("nine", "17:00");
        let result = evaluate(Some(&hours), at(12, 0));
        assert_eq!(result, Availability::Unavailable);
        assert_eq!(result.badge_label(), Some("Unavailable"));
    }

    #[test]
    fn parses_clock_strings() {
        assert_eq!(clock_minutes("09:30"), Some(570));
        assert_eq!(clock_minutes("9:05"), Some(545));
        assert_eq!(clock_minutes("17:00:00"), Some(1020));
        assert_eq!(clock_minutes("17"), None);
        assert_eq!(clock_minutes("ab:cd"), None);
    }
}
