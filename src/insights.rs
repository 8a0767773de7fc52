use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Days, Local, NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::{ChartPoint, Event, Mood, MoodEntry, Notification};
use crate::utils::{calendar_date, parse_date};

/// Entries shown in the recent mood trend
pub const TREND_WINDOW: usize = 14;

/// Numeric score used for trend series, 5 (happy) down to 1 (angry)
pub fn mood_to_value(mood: Mood) -> u8 {
    match mood {
        Mood::Happy => 5,
        Mood::Content => 4,
        Mood::Neutral => 3,
        Mood::Sad => 2,
        Mood::Angry => 1,
    }
}

pub fn mood_emoji(mood: Mood) -> &'static str {
    match mood {
        Mood::Happy => "😄",
        Mood::Content => "🙂",
        Mood::Neutral => "😐",
        Mood::Sad => "😔",
        Mood::Angry => "😠",
    }
}

/// Encouragement attached to the "Mood Logged" notification
pub fn mood_message(mood: Mood) -> &'static str {
    match mood {
        Mood::Happy => "Great to see you're feeling happy today! Keep up the positive energy!",
        Mood::Content => "Feeling content is wonderful. Enjoy the peaceful state of mind!",
        Mood::Neutral => "Neutral days are important too. Take some time for self-care.",
        Mood::Sad => "Sorry to hear you're feeling sad. Remember to be kind to yourself today.",
        Mood::Angry => "Anger is a normal emotion. Try some deep breathing to help calm down.",
    }
}

/// Long display form of a stored date, e.g. "October 14, 2026"
pub fn format_date(value: &str) -> String {
    match calendar_date(value) {
        Some(date) => date.format("%B %-d, %Y").to_string(),
        None => value.to_string(),
    }
}

/// Mood trend series, oldest first. Entries with unreadable dates are skipped.
pub fn mood_chart_data(entries: &[MoodEntry]) -> Vec<ChartPoint> {
    let mut dated: Vec<(NaiveDate, &MoodEntry)> = entries
        .iter()
        .filter_map(|e| calendar_date(&e.date).map(|d| (d, e)))
        .collect();
    // Stable, so same-day entries keep their stored order
    dated.sort_by_key(|(d, _)| *d);

    dated
        .into_iter()
        .map(|(d, e)| ChartPoint {
            date: d.format("%b %-d").to_string(),
            value: mood_to_value(e.mood),
        })
        .collect()
}

/// Trend series over the `window` most recent entries, oldest first
pub fn recent_mood_chart_data(entries: &[MoodEntry], window: usize) -> Vec<ChartPoint> {
    let mut newest: Vec<MoodEntry> = entries.to_vec();
    newest.sort_by_key(|e| std::cmp::Reverse(local_datetime(&e.date)));
    newest.truncate(window);
    mood_chart_data(&newest)
}

/// Heading a mood entry is listed under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoodSection {
    Today,
    Yesterday,
    ThisWeek,
    Earlier,
}

impl MoodSection {
    pub const ALL: [MoodSection; 4] =
        [MoodSection::Today, MoodSection::Yesterday, MoodSection::ThisWeek, MoodSection::Earlier];

    pub fn label(&self) -> &'static str {
        match self {
            MoodSection::Today => "Today",
            MoodSection::Yesterday => "Yesterday",
            MoodSection::ThisWeek => "This Week",
            MoodSection::Earlier => "Earlier",
        }
    }
}

/// Section for `entry` relative to `today`. Anything within the last seven
/// days that is neither today nor yesterday, including future dates, is
/// "This Week"; unreadable dates land in "Earlier".
pub fn mood_section(entry: &MoodEntry, today: NaiveDate) -> MoodSection {
    let Some(day) = calendar_date(&entry.date) else {
        return MoodSection::Earlier;
    };
    let week_ago = today.checked_sub_days(Days::new(7)).unwrap_or(NaiveDate::MIN);

    if day == today {
        MoodSection::Today
    } else if today.pred_opt() == Some(day) {
        MoodSection::Yesterday
    } else if day >= week_ago {
        MoodSection::ThisWeek
    } else {
        MoodSection::Earlier
    }
}

/// Entries grouped into non-empty sections, each newest first
pub fn group_mood_entries(entries: &[MoodEntry], today: NaiveDate) -> Vec<(MoodSection, Vec<&MoodEntry>)> {
    MoodSection::ALL
        .iter()
        .filter_map(|section| {
            let mut members: Vec<&MoodEntry> =
                entries.iter().filter(|e| mood_section(e, today) == *section).collect();
            if members.is_empty() {
                return None;
            }
            members.sort_by_key(|e| std::cmp::Reverse(local_datetime(&e.date)));
            Some((*section, members))
        })
        .collect()
}

/// Events grouped by month ("October 2026"), months in calendar order and
/// events soonest first within each. Undated events trail under "Undated".
pub fn group_events_by_month(events: &[Event]) -> Vec<(String, Vec<&Event>)> {
    let mut months: BTreeMap<(i32, u32), Vec<(NaiveDateTime, &Event)>> = BTreeMap::new();
    let mut undated: Vec<&Event> = Vec::new();

    for event in events {
        match local_datetime(&event.date) {
            Some(at) => months.entry((at.year(), at.month())).or_default().push((at, event)),
            None => undated.push(event),
        }
    }

    let mut groups: Vec<(String, Vec<&Event>)> = months
        .into_values()
        .map(|mut members| {
            members.sort_by_key(|(at, _)| *at);
            let label = members[0].0.format("%B %Y").to_string();
            (label, members.into_iter().map(|(_, e)| e).collect())
        })
        .collect();
    if !undated.is_empty() {
        groups.push(("Undated".to_string(), undated));
    }
    groups
}

/// Local wall-clock time of a stored date; bare days read as midnight
fn local_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    parse_date(value).ok().map(|d| d.and_time(NaiveTime::MIN))
}

/// Average mood score, or `None` with no entries
pub fn average_mood(entries: &[MoodEntry]) -> Option<f64> {
    if entries.is_empty() {
        return None;
    }
    let total: u32 = entries.iter().map(|e| u32::from(mood_to_value(e.mood))).sum();
    Some(f64::from(total) / entries.len() as f64)
}

/// Events on or after `today`, soonest first, at most `limit` of them
pub fn upcoming_events(events: &[Event], today: NaiveDate, limit: usize) -> Vec<&Event> {
    let mut upcoming: Vec<(NaiveDate, &Event)> = events
        .iter()
        .filter_map(|e| calendar_date(&e.date).map(|d| (d, e)))
        .filter(|(d, _)| *d >= today)
        .collect();
    upcoming.sort_by_key(|(d, _)| *d);
    upcoming.into_iter().take(limit).map(|(_, e)| e).collect()
}

/// Whole days from `today` until `event`, negative once it has passed
pub fn days_until(event: &Event, today: NaiveDate) -> Option<i64> {
    calendar_date(&event.date).map(|d| (d - today).num_days())
}

pub fn unread_count(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|n| !n.read).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventType, NotificationKind};

    fn entry(date: &str, mood: Mood) -> MoodEntry {
        let mut e = MoodEntry::new(mood);
        e.date = date.to_string();
        e
    }

    #[test]
    fn chart_is_sorted_oldest_first() {
        let entries = vec![
            entry("2026-03-05", Mood::Happy),
            entry("2026-03-01", Mood::Angry),
            entry("2026-03-03", Mood::Neutral),
        ];
        let points = mood_chart_data(&entries);
        let labels: Vec<&str> = points.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(labels, vec!["Mar 1", "Mar 3", "Mar 5"]);
        assert_eq!(points.iter().map(|p| p.value).collect::<Vec<_>>(), vec![1, 3, 5]);
    }

    #[test]
    fn upcoming_skips_past_and_limits() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let events: Vec<Event> = ["2026-10-13", "2026-10-20", "2026-10-14", "2026-11-01"]
            .iter()
            .map(|d| Event::new(format!("e{}", d), EventType::Other, d.to_string()))
            .collect();

        let upcoming = upcoming_events(&events, today, 2);
        let dates: Vec<&str> = upcoming.iter().map(|e| e.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-10-14", "2026-10-20"]);
        assert_eq!(days_until(upcoming[1], today), Some(6));
    }

    #[test]
    fn unread_counts_only_unread() {
        let mut a = Notification::new("a".into(), "a".into(), NotificationKind::Mood);
        let b = Notification::new("b".into(), "b".into(), NotificationKind::Mood);
        a.read = true;
        assert_eq!(unread_count(&[a, b]), 1);
    }

    #[test]
    fn average_of_scores() {
        let entries = vec![entry("2026-01-01", Mood::Happy), entry("2026-01-02", Mood::Sad)];
        assert_eq!(average_mood(&entries), Some(3.5));
        assert_eq!(average_mood(&[]), None);
    }

    #[test]
    fn trend_keeps_only_the_most_recent_window() {
        let start = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        // Stored newest first, as the store prepends
        let entries: Vec<MoodEntry> = (0..20u64)
            .rev()
            .map(|n| entry(&(start + Days::new(n)).format("%Y-%m-%d").to_string(), Mood::Neutral))
            .collect();

        let points = recent_mood_chart_data(&entries, TREND_WINDOW);
        assert_eq!(points.len(), 14);
        assert_eq!(points[0].date, "Sep 7");
        assert_eq!(points[13].date, "Sep 20");

        assert_eq!(recent_mood_chart_data(&entries[..3], TREND_WINDOW).len(), 3);
    }

    #[test]
    fn backdated_entries_fall_out_of_the_window() {
        let mut entries = vec![entry("2026-01-01", Mood::Angry)];
        entries.extend((10..=23).map(|d| entry(&format!("2026-03-{}", d), Mood::Happy)));

        let points = recent_mood_chart_data(&entries, TREND_WINDOW);
        assert_eq!(points.len(), 14);
        assert!(points.iter().all(|p| p.value == 5));
    }

    #[test]
    fn mood_sections_follow_the_calendar() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let section = |d: &str| mood_section(&entry(d, Mood::Happy), today);

        assert_eq!(section("2026-10-14"), MoodSection::Today);
        assert_eq!(section("2026-10-13"), MoodSection::Yesterday);
        assert_eq!(section("2026-10-07"), MoodSection::ThisWeek);
        assert_eq!(section("2026-10-20"), MoodSection::ThisWeek);
        assert_eq!(section("2026-10-06"), MoodSection::Earlier);
        assert_eq!(section("whenever"), MoodSection::Earlier);
    }

    #[test]
    fn grouped_entries_skip_empty_sections_and_sort_newest_first() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let entries = vec![
            entry("2026-10-09", Mood::Sad),
            entry("2026-09-01", Mood::Angry),
            entry("2026-10-14", Mood::Happy),
            entry("2026-10-11", Mood::Content),
        ];

        let groups = group_mood_entries(&entries, today);
        let sections: Vec<MoodSection> = groups.iter().map(|(s, _)| *s).collect();
        assert_eq!(sections, vec![MoodSection::Today, MoodSection::ThisWeek, MoodSection::Earlier]);

        let this_week: Vec<&str> = groups[1].1.iter().map(|e| e.date.as_str()).collect();
        assert_eq!(this_week, vec!["2026-10-11", "2026-10-09"]);
        assert_eq!(groups[0].0.label(), "Today");
    }

    #[test]
    fn events_group_by_month_in_date_order() {
        let events: Vec<Event> = ["2026-11-03", "2026-10-21", "someday", "2026-10-05", "2027-01-02"]
            .iter()
            .map(|d| Event::new(format!("e{}", d), EventType::Other, d.to_string()))
            .collect();

        let groups = group_events_by_month(&events);
        let labels: Vec<&str> = groups.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["October 2026", "November 2026", "January 2027", "Undated"]);

        let october: Vec<&str> = groups[0].1.iter().map(|e| e.date.as_str()).collect();
        assert_eq!(october, vec!["2026-10-05", "2026-10-21"]);
        assert_eq!(groups[3].1[0].title, "esomeday");
    }

    #[test]
    fn long_date_format() {
        assert_eq!(format_date("2026-10-04"), "October 4, 2026");
        assert_eq!(format_date("garbage"), "garbage");
    }
}
