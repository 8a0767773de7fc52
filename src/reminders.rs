//! Reminder evaluation and the periodic notification check.
//!
//! Everything here works on in-memory collections and an injected "today" or
//! "now"; persisting the result is the caller's job.

use chrono::{DateTime, Days, Duration, Local, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::models::{Event, Notification, ReminderLeadTime};
use crate::utils::calendar_date;

/// Whether `event` is due a `lead_time` reminder on `today`.
///
/// False unless the event opted into `lead_time`. Otherwise true exactly when
/// the event's local calendar day minus the lead offset equals `today`; past
/// trigger days never match again.
pub fn needs_reminder(event: &Event, lead_time: ReminderLeadTime, today: NaiveDate) -> bool {
    if !event.has_lead_time(lead_time) {
        return false;
    }

    let Some(event_date) = calendar_date(&event.date) else {
        return false;
    };

    event_date
        .checked_sub_days(Days::new(lead_time.days_before() as u64))
        .is_some_and(|trigger| trigger == today)
}

pub fn reminder_title(event: &Event) -> String {
    format!("Reminder: {}", event.title)
}

pub fn reminder_message(event: &Event, lead_time: ReminderLeadTime) -> String {
    match lead_time {
        ReminderLeadTime::SameDay => format!("Today is {}!", event.title),
        ReminderLeadTime::Day => format!("{} is tomorrow!", event.title),
        ReminderLeadTime::Week => format!("{} is in a week!", event.title),
    }
}

/// Reminders due on `today` that `existing` does not already hold.
///
/// Returned newest-first, ready to be prepended to the notification list.
/// Duplicates are keyed on (event id, message), both against `existing` and
/// within the batch itself.
pub fn pending_reminders(
    events: &[Event],
    existing: &[Notification],
    today: NaiveDate,
) -> Vec<Notification> {
    let mut created: Vec<Notification> = Vec::new();

    for lead_time in ReminderLeadTime::ALL {
        for event in events {
            if !needs_reminder(event, lead_time, today) {
                continue;
            }

            let message = reminder_message(event, lead_time);
            let already_held = existing
                .iter()
                .chain(created.iter())
                .any(|n| n.event_id.as_deref() == Some(event.id.as_str()) && n.message == message);
            if already_held {
                continue;
            }

            log::info!("reminder for '{}' ({})", event.title, lead_time);
            created.push(Notification::for_event(reminder_title(event), message, &event.id));
        }
    }

    created.reverse();
    created
}

/// When the recurring reminder check fires
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReminderSchedule {
    /// Rolling timer of a fixed number of hours
    Interval,
    /// Next local midnight
    #[default]
    DayRollover,
}

/// Delay from `now` until the next reminder check.
pub fn next_check_delay<Tz: TimeZone>(
    now: &DateTime<Tz>,
    schedule: ReminderSchedule,
    interval_hours: u32,
) -> std::time::Duration {
    let delay = match schedule {
        ReminderSchedule::Interval => Duration::hours(i64::from(interval_hours.max(1))),
        ReminderSchedule::DayRollover => until_next_midnight(now),
    };
    delay.to_std().unwrap_or(std::time::Duration::from_secs(60))
}

fn until_next_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> Duration {
    let tz = now.timezone();
    let tomorrow = now.date_naive().succ_opt().unwrap_or(NaiveDate::MAX);
    let midnight = tomorrow.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight).earliest() {
        Some(next) => next.signed_duration_since(now.clone()),
        // Midnight skipped by a DST jump; the hour after is close enough
        None => Duration::hours(1) + midnight.signed_duration_since(now.naive_local()),
    }
}

/// Convenience wrapper over [`next_check_delay`] for the local clock
pub fn next_local_check_delay(schedule: ReminderSchedule, interval_hours: u32) -> std::time::Duration {
    next_check_delay(&Local::now(), schedule, interval_hours)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventType;
    use chrono::Utc;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event_on(date: NaiveDate, leads: &[ReminderLeadTime]) -> Event {
        let mut e = Event::new(
            "Mom's Birthday".to_string(),
            EventType::Birthday,
            date.format("%Y-%m-%d").to_string(),
        );
        e.reminder_lead_times = leads.to_vec();
        e
    }

    #[test]
    fn lead_time_must_be_opted_into() {
        let today = day(2026, 5, 1);
        let e = event_on(today, &[ReminderLeadTime::Week]);
        assert!(!needs_reminder(&e, ReminderLeadTime::SameDay, today));
    }

    #[test]
    fn each_lead_time_fires_only_on_its_trigger_day() {
        let event_day = day(2026, 5, 10);
        let e = event_on(event_day, &ReminderLeadTime::ALL);

        for offset in -3i64..=10 {
            let today = event_day - Duration::days(offset);
            for lead in ReminderLeadTime::ALL {
                let expected = offset == lead.days_before();
                assert_eq!(needs_reminder(&e, lead, today), expected, "offset {} lead {}", offset, lead);
            }
        }
    }

    #[test]
    fn unparseable_dates_never_trigger() {
        let mut e = event_on(day(2026, 5, 10), &ReminderLeadTime::ALL);
        e.date = "someday".to_string();
        assert!(!needs_reminder(&e, ReminderLeadTime::SameDay, day(2026, 5, 10)));
    }

    #[test]
    fn week_out_event_gets_week_reminder_now_and_day_reminder_on_day_six() {
        let today = day(2026, 10, 14);
        let e = event_on(day(2026, 10, 21), &[ReminderLeadTime::Week, ReminderLeadTime::Day]);
        let events = vec![e];

        let first = pending_reminders(&events, &[], today);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].message, "Mom's Birthday is in a week!");
        assert_eq!(first[0].title, "Reminder: Mom's Birthday");

        let mut held = first.clone();
        for offset in 1..6 {
            let later = today + Duration::days(offset);
            assert!(pending_reminders(&events, &held, later).is_empty(), "day {}", offset);
        }

        let day_six = pending_reminders(&events, &held, today + Duration::days(6));
        assert_eq!(day_six.len(), 1);
        assert_eq!(day_six[0].message, "Mom's Birthday is tomorrow!");
        held.insert(0, day_six[0].clone());
        assert_eq!(held.len(), 2);
    }

    #[test]
    fn repeated_checks_do_not_duplicate() {
        let today = day(2026, 1, 1);
        let events = vec![event_on(today, &[ReminderLeadTime::SameDay])];

        let mut held = pending_reminders(&events, &[], today);
        assert_eq!(held.len(), 1);
        let again = pending_reminders(&events, &held, today);
        assert!(again.is_empty());
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].event_id.as_deref(), Some(events[0].id.as_str()));
    }

    #[test]
    fn batch_is_newest_first() {
        let today = day(2026, 1, 1);
        let a = event_on(day(2026, 1, 8), &[ReminderLeadTime::Week]);
        let mut b = event_on(today, &[ReminderLeadTime::SameDay]);
        b.title = "Launch".to_string();

        let created = pending_reminders(&[a, b], &[], today);
        let messages: Vec<&str> = created.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["Today is Launch!", "Mom's Birthday is in a week!"]);
    }

    #[test]
    fn day_rollover_waits_until_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 10, 14, 22, 30, 0).unwrap();
        let delay = next_check_delay(&now, ReminderSchedule::DayRollover, 24);
        assert_eq!(delay, std::time::Duration::from_secs(90 * 60));
    }

    #[test]
    fn interval_schedule_uses_configured_hours() {
        let now = Utc.with_ymd_and_hms(2026, 10, 14, 22, 30, 0).unwrap();
        assert_eq!(
            next_check_delay(&now, ReminderSchedule::Interval, 24),
            std::time::Duration::from_secs(24 * 3600)
        );
        assert_eq!(
            next_check_delay(&now, ReminderSchedule::Interval, 0),
            std::time::Duration::from_secs(3600)
        );
    }
}
