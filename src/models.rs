use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::{generate_id, get_current_timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Content,
    Neutral,
    Sad,
    Angry,
}

impl Mood {
    pub const ALL: [Mood; 5] = [Mood::Happy, Mood::Content, Mood::Neutral, Mood::Sad, Mood::Angry];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Content => "content",
            Mood::Neutral => "neutral",
            Mood::Sad => "sad",
            Mood::Angry => "angry",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown mood '{}' (expected happy, content, neutral, sad or angry)", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Birthday,
    Anniversary,
    Milestone,
    Other,
}

impl EventType {
    pub const ALL: [EventType; 4] = [
        EventType::Birthday,
        EventType::Anniversary,
        EventType::Milestone,
        EventType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Birthday => "birthday",
            EventType::Anniversary => "anniversary",
            EventType::Milestone => "milestone",
            EventType::Other => "other",
        }
    }

    /// Default display color (hex) for events of this type
    pub fn default_color(&self) -> &'static str {
        match self {
            EventType::Birthday => "#f97316",
            EventType::Anniversary => "#8b5cf6",
            EventType::Milestone => "#22c55e",
            EventType::Other => "#737373",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown event type '{}' (expected birthday, anniversary, milestone or other)", s))
    }
}

/// How long before an event its reminder fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReminderLeadTime {
    Week,
    Day,
    SameDay,
}

impl ReminderLeadTime {
    /// Evaluation order used by the reminder check
    pub const ALL: [ReminderLeadTime; 3] = [
        ReminderLeadTime::Week,
        ReminderLeadTime::Day,
        ReminderLeadTime::SameDay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderLeadTime::Week => "week",
            ReminderLeadTime::Day => "day",
            ReminderLeadTime::SameDay => "same-day",
        }
    }

    /// Number of days between the trigger date and the event date
    pub fn days_before(&self) -> i64 {
        match self {
            ReminderLeadTime::Week => 7,
            ReminderLeadTime::Day => 1,
            ReminderLeadTime::SameDay => 0,
        }
    }
}

impl fmt::Display for ReminderLeadTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderLeadTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(ReminderLeadTime::Week),
            "day" => Ok(ReminderLeadTime::Day),
            "same-day" | "sameday" | "same_day" => Ok(ReminderLeadTime::SameDay),
            other => Err(format!("unknown reminder '{}' (expected week, day or same-day)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    pub id: String,
    pub date: String, // ISO 8601
    pub mood: Mood,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

impl MoodEntry {
    /// Build an entry for "now" with a fresh id
    pub fn new(mood: Mood) -> Self {
        Self {
            id: generate_id(),
            date: get_current_timestamp(),
            mood,
            tags: Vec::new(),
            notes: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub date: String, // ISO 8601
    #[serde(default)]
    pub notes: String,
    #[serde(rename = "reminderFrequency", default)]
    pub reminder_lead_times: Vec<ReminderLeadTime>,
    #[serde(default)]
    pub color: String,
}

impl Event {
    pub fn new(title: String, event_type: EventType, date: String) -> Self {
        Self {
            id: generate_id(),
            title,
            event_type,
            date,
            notes: String::new(),
            reminder_lead_times: Vec::new(),
            color: event_type.default_color().to_string(),
        }
    }

    pub fn has_lead_time(&self, lead_time: ReminderLeadTime) -> bool {
        self.reminder_lead_times.contains(&lead_time)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Event,
    Mood,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Event => f.write_str("event"),
            NotificationKind::Mood => f.write_str("mood"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(default)]
    pub read: bool,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

impl Notification {
    /// Build an unread notification stamped with the current time
    pub fn new(title: String, message: String, kind: NotificationKind) -> Self {
        Self {
            id: generate_id(),
            title,
            message,
            kind,
            read: false,
            date: get_current_timestamp(),
            event_id: None,
        }
    }

    pub fn for_event(title: String, message: String, event_id: &str) -> Self {
        let mut notification = Self::new(title, message, NotificationKind::Event);
        notification.event_id = Some(event_id.to_string());
        notification
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
    pub created_at: String,
}

impl User {
    pub fn new(email: String, name: String) -> Self {
        Self {
            id: generate_id(),
            email,
            name,
            profile_pic: None,
            created_at: get_current_timestamp(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub user: Option<User>,
    pub is_authenticated: bool,
}

/// Partial update applied by `Auth::update_profile`
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub profile_pic: Option<String>,
}

impl ProfileUpdate {
    pub fn apply_to(&self, user: &mut User) {
        if let Some(ref name) = self.name {
            user.name = name.clone();
        }
        if let Some(ref email) = self.email {
            user.email = email.clone();
        }
        if let Some(ref pic) = self.profile_pic {
            user.profile_pic = Some(pic.clone());
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            other => Err(format!("unknown theme '{}' (expected light or dark)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default)]
    pub theme: ThemeMode,
    #[serde(default = "default_true")]
    pub show_avatar: bool,
    #[serde(default = "default_true")]
    pub enable_notifications: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            theme: ThemeMode::Light,
            show_avatar: true,
            enable_notifications: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// One point of the mood trend series
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub date: String,
    pub value: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serializes_with_original_field_names() {
        let mut event = Event::new("Launch".to_string(), EventType::Milestone, "2026-01-02".to_string());
        event.reminder_lead_times = vec![ReminderLeadTime::Week, ReminderLeadTime::SameDay];

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "milestone");
        assert_eq!(json["reminderFrequency"], serde_json::json!(["week", "same-day"]));
        assert_eq!(json["color"], "#22c55e");
    }

    #[test]
    fn notification_without_event_omits_backlink() {
        let n = Notification::new("Hi".to_string(), "there".to_string(), NotificationKind::Mood);
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "mood");
        assert!(json.get("eventId").is_none());
        assert_eq!(json["read"], false);
    }

    #[test]
    fn parses_enum_values_case_insensitively() {
        assert_eq!("Happy".parse::<Mood>().unwrap(), Mood::Happy);
        assert_eq!("SAME-DAY".parse::<ReminderLeadTime>().unwrap(), ReminderLeadTime::SameDay);
        assert_eq!("other".parse::<EventType>().unwrap(), EventType::Other);
        assert!("ecstatic".parse::<Mood>().is_err());
        assert!("month".parse::<ReminderLeadTime>().is_err());
    }

    #[test]
    fn preferences_fill_missing_fields() {
        let prefs: UserPreferences = serde_json::from_str(r#"{"theme":"dark"}"#).unwrap();
        assert_eq!(prefs.theme, ThemeMode::Dark);
        assert!(prefs.show_avatar);
        assert!(prefs.enable_notifications);
    }
}
