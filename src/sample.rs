//! Starter data written on first launch so a new profile has something to show.

use chrono::{Days, NaiveDate};

use crate::models::{Event, EventType, Mood, MoodEntry, Notification, NotificationKind, ReminderLeadTime};
use crate::utils::date_to_timestamp;

/// Six days of mood history ending the day before `today`
pub fn mood_entries(today: NaiveDate) -> Vec<MoodEntry> {
    let samples = [
        (6, Mood::Content, &["work", "productive"][..], "Had a productive day at work."),
        (5, Mood::Happy, &["friends", "outdoors"][..], "Went hiking with friends. Beautiful day!"),
        (4, Mood::Neutral, &["routine"][..], "Normal day, nothing special."),
        (3, Mood::Sad, &["stress", "work"][..], "Deadline pressure is getting to me."),
        (2, Mood::Angry, &["conflict", "misunderstanding"][..], "Had an argument with a colleague."),
        (1, Mood::Content, &["relax", "weekend"][..], "Relaxing weekend at home."),
    ];

    samples
        .iter()
        .map(|(days_ago, mood, tags, notes)| {
            let mut entry = MoodEntry::new(*mood);
            let date = today.checked_sub_days(Days::new(*days_ago)).unwrap_or(today);
            entry.date = date_to_timestamp(date);
            entry.tags = tags.iter().map(|t| t.to_string()).collect();
            entry.notes = notes.to_string();
            entry
        })
        .collect()
}

/// A few events in the coming two weeks, relative to `today`
pub fn events(today: NaiveDate) -> Vec<Event> {
    use ReminderLeadTime::*;

    let samples = [
        ("Mom's Birthday", EventType::Birthday, 5, "Buy a cake and flowers", &[Week, Day, SameDay][..]),
        ("Wedding Anniversary", EventType::Anniversary, 12, "Plan dinner at favorite restaurant", &[Week, Day][..]),
        ("Job Promotion", EventType::Milestone, 2, "Celebrate with team", &[Day, SameDay][..]),
    ];

    samples
        .iter()
        .map(|(title, event_type, days_ahead, notes, leads)| {
            let date = today.checked_add_days(Days::new(*days_ahead)).unwrap_or(today);
            let mut event = Event::new(title.to_string(), *event_type, date_to_timestamp(date));
            event.notes = notes.to_string();
            event.reminder_lead_times = leads.to_vec();
            event
        })
        .collect()
}

pub fn notifications() -> Vec<Notification> {
    vec![Notification::new(
        "Welcome to MoodSync!".to_string(),
        "Start tracking your mood and never miss important dates.".to_string(),
        NotificationKind::Mood,
    )]
}
