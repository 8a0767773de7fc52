use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::insights::mood_message;
use crate::models::{Event, MoodEntry, Notification, NotificationKind, UserPreferences};
use crate::reminders::pending_reminders;
use crate::sample;
use crate::storage::{Storage, StorageError, keys};
use crate::utils::generate_id;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
    #[error("No mood entry with id {0}")]
    MoodEntryNotFound(String),
    #[error("No event with id {0}")]
    EventNotFound(String),
    #[error("No notification with id {0}")]
    NotificationNotFound(String),
    #[error("Event title must not be empty")]
    EmptyTitle,
}

/// In-memory application state mirrored to `Storage`.
///
/// Every mutating method writes the collections it touched before returning,
/// so a successful call is durable and a failed write surfaces as an error.
pub struct DataStore<'a> {
    storage: &'a Storage,
    seed_sample_data: bool,
    mood_entries: Vec<MoodEntry>,
    events: Vec<Event>,
    notifications: Vec<Notification>,
    preferences: UserPreferences,
}

impl<'a> DataStore<'a> {
    /// Load every collection from `storage`.
    ///
    /// Missing or malformed collections are replaced by sample data (or empty
    /// lists when `seed_sample_data` is off) and written back immediately.
    pub fn load(storage: &'a Storage, seed_sample_data: bool, today: NaiveDate) -> Result<Self, DataError> {
        let mut store = DataStore {
            storage,
            seed_sample_data,
            mood_entries: Vec::new(),
            events: Vec::new(),
            notifications: Vec::new(),
            preferences: UserPreferences::default(),
        };
        store.reload(today)?;
        Ok(store)
    }

    /// Re-read state from storage, picking up writes made by other processes
    pub fn reload(&mut self, today: NaiveDate) -> Result<(), DataError> {
        let seed = self.seed_sample_data;
        self.mood_entries = load_or_default(self.storage, keys::MOOD_ENTRIES, || {
            if seed { sample::mood_entries(today) } else { Vec::new() }
        })?;
        self.events = load_or_default(self.storage, keys::EVENTS, || {
            if seed { sample::events(today) } else { Vec::new() }
        })?;
        self.notifications = load_or_default(self.storage, keys::NOTIFICATIONS, || {
            if seed { sample::notifications() } else { Vec::new() }
        })?;
        self.preferences = load_or_default(self.storage, keys::USER_PREFERENCES, UserPreferences::default)?;
        Ok(())
    }

    pub fn mood_entries(&self) -> &[MoodEntry] {
        &self.mood_entries
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn preferences(&self) -> &UserPreferences {
        &self.preferences
    }

    pub fn get_mood_entry(&self, id: &str) -> Option<&MoodEntry> {
        self.mood_entries.iter().find(|e| e.id == id)
    }

    pub fn get_event(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Store `entry` under a fresh id and post a "Mood Logged" notification.
    /// Returns the new id.
    pub fn add_mood_entry(&mut self, mut entry: MoodEntry) -> Result<String, DataError> {
        entry.id = generate_id();
        let id = entry.id.clone();
        let mood = entry.mood;

        self.mood_entries.insert(0, entry);
        self.persist_mood_entries()?;

        self.push_notification(Notification::new(
            "Mood Logged".to_string(),
            mood_message(mood).to_string(),
            NotificationKind::Mood,
        ))?;
        Ok(id)
    }

    pub fn update_mood_entry(&mut self, entry: MoodEntry) -> Result<(), DataError> {
        let slot = self
            .mood_entries
            .iter_mut()
            .find(|e| e.id == entry.id)
            .ok_or_else(|| DataError::MoodEntryNotFound(entry.id.clone()))?;
        *slot = entry;
        self.persist_mood_entries()
    }

    pub fn delete_mood_entry(&mut self, id: &str) -> Result<(), DataError> {
        let before = self.mood_entries.len();
        self.mood_entries.retain(|e| e.id != id);
        if self.mood_entries.len() == before {
            return Err(DataError::MoodEntryNotFound(id.to_string()));
        }
        self.persist_mood_entries()
    }

    /// Store `event` under a fresh id and post a "New Event Added"
    /// notification linked to it. Returns the new id.
    pub fn add_event(&mut self, mut event: Event) -> Result<String, DataError> {
        if event.title.trim().is_empty() {
            return Err(DataError::EmptyTitle);
        }
        event.id = generate_id();
        let id = event.id.clone();
        let message = format!("You've added {} to your calendar.", event.title);

        self.events.insert(0, event);
        self.persist_events()?;

        self.push_notification(Notification::for_event("New Event Added".to_string(), message, &id))?;
        Ok(id)
    }

    pub fn update_event(&mut self, event: Event) -> Result<(), DataError> {
        if event.title.trim().is_empty() {
            return Err(DataError::EmptyTitle);
        }
        let slot = self
            .events
            .iter_mut()
            .find(|e| e.id == event.id)
            .ok_or_else(|| DataError::EventNotFound(event.id.clone()))?;
        *slot = event;
        self.persist_events()
    }

    /// Remove the event and every notification linked to it.
    /// Returns how many notifications went with it.
    pub fn delete_event(&mut self, id: &str) -> Result<usize, DataError> {
        let before = self.events.len();
        self.events.retain(|e| e.id != id);
        if self.events.len() == before {
            return Err(DataError::EventNotFound(id.to_string()));
        }
        self.persist_events()?;

        let before = self.notifications.len();
        self.notifications.retain(|n| n.event_id.as_deref() != Some(id));
        let removed = before - self.notifications.len();
        if removed > 0 {
            self.persist_notifications()?;
        }
        Ok(removed)
    }

    pub fn mark_notification_read(&mut self, id: &str) -> Result<(), DataError> {
        let notification = self
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| DataError::NotificationNotFound(id.to_string()))?;
        notification.read = true;
        self.persist_notifications()
    }

    pub fn mark_all_notifications_read(&mut self) -> Result<usize, DataError> {
        let mut changed = 0;
        for n in self.notifications.iter_mut().filter(|n| !n.read) {
            n.read = true;
            changed += 1;
        }
        if changed > 0 {
            self.persist_notifications()?;
        }
        Ok(changed)
    }

    pub fn clear_all_notifications(&mut self) -> Result<(), DataError> {
        self.notifications.clear();
        self.persist_notifications()
    }

    /// Run the reminder check for `today` and prepend whatever it produced.
    /// Does nothing while notifications are disabled in preferences.
    pub fn check_reminders(&mut self, today: NaiveDate) -> Result<usize, DataError> {
        if !self.preferences.enable_notifications {
            log::debug!("notifications disabled, skipping reminder check");
            return Ok(0);
        }

        let created = pending_reminders(&self.events, &self.notifications, today);
        let count = created.len();
        if count > 0 {
            let mut merged = created;
            merged.append(&mut self.notifications);
            self.notifications = merged;
            self.persist_notifications()?;
        }
        Ok(count)
    }

    pub fn set_preferences(&mut self, preferences: UserPreferences) -> Result<(), DataError> {
        self.preferences = preferences;
        self.storage.set_json(keys::USER_PREFERENCES, &self.preferences)?;
        Ok(())
    }

    fn push_notification(&mut self, notification: Notification) -> Result<(), DataError> {
        self.notifications.insert(0, notification);
        self.persist_notifications()
    }

    fn persist_mood_entries(&self) -> Result<(), DataError> {
        self.storage.set_json(keys::MOOD_ENTRIES, &self.mood_entries)?;
        Ok(())
    }

    fn persist_events(&self) -> Result<(), DataError> {
        self.storage.set_json(keys::EVENTS, &self.events)?;
        Ok(())
    }

    fn persist_notifications(&self) -> Result<(), DataError> {
        self.storage.set_json(keys::NOTIFICATIONS, &self.notifications)?;
        Ok(())
    }
}

/// Decode `key`, falling back to `default()` (and persisting it) when the key
/// is missing or holds malformed JSON.
///
/// A malformed blob is copied to `keys::malformed(key)` before the default
/// replaces it.
fn load_or_default<T, F>(storage: &Storage, key: &str, default: F) -> Result<T, DataError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> T,
{
    match storage.get_json::<T>(key) {
        Ok(Some(value)) => return Ok(value),
        Ok(None) => {}
        Err(StorageError::MalformedValue { source, .. }) => {
            let backup = keys::malformed(key);
            if let Some(raw) = storage.get_item(key)? {
                storage.set_item(&backup, &raw)?;
            }
            log::warn!("malformed '{}' ({}), saved as '{}' and using defaults", key, source, backup);
        }
        Err(e) => return Err(e.into()),
    }

    let value = default();
    storage.set_json(key, &value)?;
    Ok(value)
}
