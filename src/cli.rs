use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::auth::{Auth, AuthError};
use crate::config::Config;
use crate::data::{DataError, DataStore};
use crate::insights::{
    TREND_WINDOW, average_mood, days_until, format_date, group_events_by_month, group_mood_entries,
    mood_chart_data, mood_emoji, recent_mood_chart_data, unread_count, upcoming_events,
};
use crate::models::{
    Event, EventType, Mood, MoodEntry, Notification, ProfileUpdate, ReminderLeadTime, ThemeMode,
};
use crate::reminders::next_local_check_delay;
use crate::storage::{Storage, StorageError};
use crate::utils::{date_to_timestamp, get_current_date_string, parse_date, parse_tags, today};

#[derive(Parser)]
#[command(name = "moodsync")]
#[command(about = "MoodSync - track your mood and never miss important dates")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a local account and log into it
    Register {
        email: String,
        name: String,
        #[arg(long)]
        password: String,
    },
    /// Log into an existing account
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },
    /// End the current session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Update the logged-in user's profile
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Profile picture URL or path
        #[arg(long)]
        picture: Option<String>,
    },
    /// Log and review moods
    #[command(subcommand)]
    Mood(MoodCommand),
    /// Manage events and their reminders
    #[command(subcommand)]
    Event(EventCommand),
    /// Review notifications
    #[command(subcommand)]
    Notifications(NotificationCommand),
    /// Show or change preferences
    #[command(subcommand)]
    Prefs(PrefsCommand),
    /// Check reminders and print a summary
    Dashboard,
    /// Keep running and check reminders on the configured schedule
    Watch {
        /// Run a single check and exit
        #[arg(long)]
        once: bool,
    },
}

#[derive(Subcommand)]
pub enum MoodCommand {
    /// Log a mood (happy, content, neutral, sad, angry)
    Add {
        mood: String,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Day of the entry (YYYY-MM-DD), defaults to now
        #[arg(long)]
        date: Option<String>,
    },
    /// Change an existing entry
    Update {
        id: String,
        #[arg(long)]
        mood: Option<String>,
        /// Comma-separated tags, replacing the current ones
        #[arg(long)]
        tags: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },
    Delete {
        id: String,
    },
    List,
    /// Print the mood trend series over the most recent entries
    Trend {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Chart every entry instead of the recent window
        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand)]
pub enum EventCommand {
    /// Add an event
    Add {
        title: String,
        /// Event day (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// birthday, anniversary, milestone or other
        #[arg(long = "type", default_value = "other")]
        event_type: String,
        #[arg(long)]
        notes: Option<String>,
        /// Comma-separated reminders: week, day, same-day
        #[arg(long)]
        remind: Option<String>,
        /// Hex color, defaults by event type
        #[arg(long)]
        color: Option<String>,
    },
    /// Change an existing event
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long = "type")]
        event_type: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Comma-separated reminders, replacing the current ones ("none" clears)
        #[arg(long)]
        remind: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete an event and its notifications
    Delete {
        id: String,
    },
    List,
    /// Events from today on, soonest first
    Upcoming,
}

#[derive(Subcommand)]
pub enum NotificationCommand {
    List {
        /// Only unread notifications
        #[arg(long)]
        unread: bool,
    },
    /// Mark one notification (or all with --all) as read
    Read {
        id: Option<String>,
        #[arg(long)]
        all: bool,
    },
    /// Remove every notification
    Clear,
    /// Run the reminder check now
    Check,
}

#[derive(Subcommand)]
pub enum PrefsCommand {
    Show,
    Set {
        /// light or dark
        #[arg(long)]
        theme: Option<String>,
        #[arg(long)]
        show_avatar: Option<bool>,
        #[arg(long)]
        notifications: Option<bool>,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
    #[error("{0}")]
    DataError(#[from] DataError),
    #[error("{0}")]
    AuthError(#[from] AuthError),
    #[error("Failed to parse date: {0}")]
    DateParseError(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Failed to encode output: {0}")]
    OutputError(#[from] serde_json::Error),
}

/// Dispatch a parsed command.
///
/// Everything except `register` and `login` needs a logged-in session.
pub fn run(command: Commands, config: &Config, storage: &Storage) -> Result<(), CliError> {
    let mut auth = Auth::load(storage)?;

    let command = match command {
        Commands::Register { email, name, password } => return handle_register(email, name, password, &mut auth),
        Commands::Login { email, password } => return handle_login(email, password, &mut auth),
        other => other,
    };
    auth.require_user()?;

    match command {
        Commands::Logout => {
            auth.logout()?;
            println!("Logged out");
            Ok(())
        }
        Commands::Whoami => handle_whoami(&auth),
        Commands::Profile { name, email, picture } => {
            let update = ProfileUpdate { name, email, profile_pic: picture };
            handle_profile(&update, &mut auth)
        }
        Commands::Mood(cmd) => handle_mood(cmd, &mut load_store(config, storage)?),
        Commands::Event(cmd) => handle_event(cmd, config, &mut load_store(config, storage)?),
        Commands::Notifications(cmd) => handle_notifications(cmd, &mut load_store(config, storage)?),
        Commands::Prefs(cmd) => handle_prefs(cmd, &mut load_store(config, storage)?),
        Commands::Dashboard => handle_dashboard(config, &auth, &mut load_store(config, storage)?),
        Commands::Watch { once } => handle_watch(once, config, &mut load_store(config, storage)?),
        Commands::Register { .. } | Commands::Login { .. } => Ok(()),
    }
}

fn load_store<'a>(config: &Config, storage: &'a Storage) -> Result<DataStore<'a>, CliError> {
    Ok(DataStore::load(storage, config.seed_sample_data, today())?)
}

/// Handle the register command
pub fn handle_register(email: String, name: String, password: String, auth: &mut Auth) -> Result<(), CliError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(CliError::InvalidArgument("email and password are required".to_string()));
    }
    let user = auth.register(email.trim(), &password, name.trim())?;
    println!("Welcome, {}! You're now logged in.", user.name);
    Ok(())
}

/// Handle the login command
pub fn handle_login(email: String, password: String, auth: &mut Auth) -> Result<(), CliError> {
    let user = auth.login(email.trim(), &password)?;
    println!("Logged in as {} <{}>", user.name, user.email);
    Ok(())
}

fn handle_whoami(auth: &Auth) -> Result<(), CliError> {
    let user = auth.require_user()?;
    println!("{} <{}>", user.name, user.email);
    println!("Member since {}", format_date(&user.created_at));
    if let Some(ref pic) = user.profile_pic {
        println!("Picture: {}", pic);
    }
    Ok(())
}

fn handle_profile(update: &ProfileUpdate, auth: &mut Auth) -> Result<(), CliError> {
    auth.update_profile(update)?;
    let user = auth.require_user()?;
    println!("Profile updated: {} <{}>", user.name, user.email);
    Ok(())
}

/// Handle the mood subcommands
pub fn handle_mood(cmd: MoodCommand, store: &mut DataStore) -> Result<(), CliError> {
    match cmd {
        MoodCommand::Add { mood, tags, notes, date } => {
            let mut entry = MoodEntry::new(parse_mood(&mood)?);
            if let Some(date) = date {
                entry.date = parse_day(&date)?;
            }
            entry.tags = tags.as_deref().map(parse_tags).unwrap_or_default();
            entry.notes = notes.unwrap_or_default();

            let id = store.add_mood_entry(entry)?;
            println!("Mood logged (ID: {})", id);
            if let Some(n) = store.notifications().first() {
                println!("{}", n.message);
            }
        }
        MoodCommand::Update { id, mood, tags, notes, date } => {
            let mut entry = store
                .get_mood_entry(&id)
                .cloned()
                .ok_or_else(|| DataError::MoodEntryNotFound(id.clone()))?;
            if let Some(mood) = mood {
                entry.mood = parse_mood(&mood)?;
            }
            if let Some(tags) = tags {
                entry.tags = parse_tags(&tags);
            }
            if let Some(notes) = notes {
                entry.notes = notes;
            }
            if let Some(date) = date {
                entry.date = parse_day(&date)?;
            }
            store.update_mood_entry(entry)?;
            println!("Mood entry updated (ID: {})", id);
        }
        MoodCommand::Delete { id } => {
            store.delete_mood_entry(&id)?;
            println!("Mood entry deleted (ID: {})", id);
        }
        MoodCommand::List => {
            if store.mood_entries().is_empty() {
                println!("No mood entries yet");
            }
            for (section, entries) in group_mood_entries(store.mood_entries(), today()) {
                println!("{}", section.label());
                for entry in entries {
                    println!(
                        "  {}  {}  {} {}",
                        entry.id,
                        format_date(&entry.date),
                        mood_emoji(entry.mood),
                        entry.mood
                    );
                    if !entry.tags.is_empty() {
                        println!("      tags: {}", entry.tags.join(", "));
                    }
                    if !entry.notes.is_empty() {
                        println!("      {}", entry.notes);
                    }
                }
            }
        }
        MoodCommand::Trend { json, all } => {
            let points = if all {
                mood_chart_data(store.mood_entries())
            } else {
                recent_mood_chart_data(store.mood_entries(), TREND_WINDOW)
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&points)?);
            } else {
                for point in &points {
                    println!("{:<8}{}", point.date, point.value);
                }
                if let Some(avg) = average_mood(store.mood_entries()) {
                    println!("average {:.1}", avg);
                }
            }
        }
    }
    Ok(())
}

/// Handle the event subcommands
pub fn handle_event(cmd: EventCommand, config: &Config, store: &mut DataStore) -> Result<(), CliError> {
    match cmd {
        EventCommand::Add { title, date, event_type, notes, remind, color } => {
            let event_type = parse_event_type(&event_type)?;
            let mut event = Event::new(title, event_type, parse_day(&date)?);
            event.notes = notes.unwrap_or_default();
            event.reminder_lead_times = match remind {
                Some(raw) => parse_lead_times(&raw)?,
                None => Vec::new(),
            };
            if let Some(color) = color {
                event.color = color;
            }

            let id = store.add_event(event)?;
            println!("Event created successfully (ID: {})", id);
        }
        EventCommand::Update { id, title, date, event_type, notes, remind, color } => {
            let mut event = store
                .get_event(&id)
                .cloned()
                .ok_or_else(|| DataError::EventNotFound(id.clone()))?;
            if let Some(title) = title {
                event.title = title;
            }
            if let Some(date) = date {
                event.date = parse_day(&date)?;
            }
            if let Some(event_type) = event_type {
                event.event_type = parse_event_type(&event_type)?;
            }
            if let Some(notes) = notes {
                event.notes = notes;
            }
            if let Some(raw) = remind {
                event.reminder_lead_times = parse_lead_times(&raw)?;
            }
            if let Some(color) = color {
                event.color = color;
            }
            store.update_event(event)?;
            println!("Event updated (ID: {})", id);
        }
        EventCommand::Delete { id } => {
            let removed = store.delete_event(&id)?;
            println!("Event deleted (ID: {}), {} notification(s) removed", id, removed);
        }
        EventCommand::List => {
            if store.events().is_empty() {
                println!("No events yet");
            }
            for (month, events) in group_events_by_month(store.events()) {
                println!("{}", month);
                for event in events {
                    print_event(event);
                }
            }
        }
        EventCommand::Upcoming => {
            let today = today();
            let upcoming = upcoming_events(store.events(), today, config.upcoming_limit);
            if upcoming.is_empty() {
                println!("Nothing coming up");
            }
            for event in upcoming {
                let when = match days_until(event, today) {
                    Some(0) => "today".to_string(),
                    Some(1) => "tomorrow".to_string(),
                    Some(n) => format!("in {} days", n),
                    None => "unknown".to_string(),
                };
                println!("{:<12} {} ({})", when, event.title, event.event_type);
            }
        }
    }
    Ok(())
}

fn print_event(event: &Event) {
    let reminders: Vec<&str> = event.reminder_lead_times.iter().map(|l| l.as_str()).collect();
    println!(
        "  {}  {}  {} [{}] {}",
        event.id,
        format_date(&event.date),
        event.title,
        event.event_type,
        event.color
    );
    if !reminders.is_empty() {
        println!("      reminders: {}", reminders.join(", "));
    }
    if !event.notes.is_empty() {
        println!("      {}", event.notes);
    }
}

/// Handle the notification subcommands
pub fn handle_notifications(cmd: NotificationCommand, store: &mut DataStore) -> Result<(), CliError> {
    match cmd {
        NotificationCommand::List { unread } => {
            let shown: Vec<&Notification> = store
                .notifications()
                .iter()
                .filter(|n| !unread || !n.read)
                .collect();
            if shown.is_empty() {
                println!("No notifications");
            }
            for n in shown {
                print_notification(n);
            }
        }
        NotificationCommand::Read { id, all } => match (id, all) {
            (_, true) => {
                let changed = store.mark_all_notifications_read()?;
                println!("{} notification(s) marked as read", changed);
            }
            (Some(id), false) => {
                store.mark_notification_read(&id)?;
                println!("Notification marked as read");
            }
            (None, false) => {
                return Err(CliError::InvalidArgument("pass a notification id or --all".to_string()));
            }
        },
        NotificationCommand::Clear => {
            store.clear_all_notifications()?;
            println!("All notifications cleared");
        }
        NotificationCommand::Check => {
            let created = store.check_reminders(today())?;
            println!("{} new reminder(s)", created);
            for n in store.notifications().iter().take(created) {
                print_notification(n);
            }
        }
    }
    Ok(())
}

fn print_notification(n: &Notification) {
    let marker = if n.read { " " } else { "*" };
    println!("{} {}  [{}] {}: {}", marker, n.id, n.kind, n.title, n.message);
}

/// Handle the preference subcommands
pub fn handle_prefs(cmd: PrefsCommand, store: &mut DataStore) -> Result<(), CliError> {
    match cmd {
        PrefsCommand::Show => {}
        PrefsCommand::Set { theme, show_avatar, notifications } => {
            let mut prefs = store.preferences().clone();
            if let Some(theme) = theme {
                prefs.theme = theme.parse::<ThemeMode>().map_err(CliError::InvalidArgument)?;
            }
            if let Some(show) = show_avatar {
                prefs.show_avatar = show;
            }
            if let Some(enabled) = notifications {
                prefs.enable_notifications = enabled;
            }
            store.set_preferences(prefs)?;
        }
    }

    let prefs = store.preferences();
    println!("theme: {}", prefs.theme.as_str());
    println!("show avatar: {}", prefs.show_avatar);
    println!("notifications: {}", if prefs.enable_notifications { "enabled" } else { "disabled" });
    Ok(())
}

fn handle_dashboard(config: &Config, auth: &Auth, store: &mut DataStore) -> Result<(), CliError> {
    let today = today();
    store.check_reminders(today)?;

    if let Some(user) = auth.current_user() {
        println!("Hello, {}! Today is {}.", user.name, format_date(&get_current_date_string()));
    }
    println!("{} unread notification(s)", unread_count(store.notifications()));

    if let Some(latest) = store.mood_entries().first() {
        println!("Last mood: {} {} ({})", mood_emoji(latest.mood), latest.mood, format_date(&latest.date));
    }
    let recent: Vec<MoodEntry> = store.mood_entries().iter().take(7).cloned().collect();
    if let Some(avg) = average_mood(&recent) {
        println!("Recent average: {:.1} / 5", avg);
    }
    let trend = recent_mood_chart_data(store.mood_entries(), TREND_WINDOW);
    if !trend.is_empty() {
        let line: Vec<String> = trend.iter().map(|p| format!("{} {}", p.date, p.value)).collect();
        println!("Trend: {}", line.join(" | "));
    }

    let upcoming = upcoming_events(store.events(), today, config.upcoming_limit);
    if !upcoming.is_empty() {
        println!("Upcoming:");
        for event in upcoming {
            println!("  {}  {}", format_date(&event.date), event.title);
        }
    }
    Ok(())
}

fn handle_watch(once: bool, config: &Config, store: &mut DataStore) -> Result<(), CliError> {
    loop {
        let today = today();
        store.reload(today)?;
        let created = store.check_reminders(today)?;
        for n in store.notifications().iter().take(created) {
            println!("{}: {}", n.title, n.message);
        }

        if once {
            return Ok(());
        }

        let delay = next_local_check_delay(config.reminder_schedule, config.reminder_interval_hours);
        log::info!("next reminder check in {}s", delay.as_secs());
        std::thread::sleep(delay);
    }
}

fn parse_mood(raw: &str) -> Result<Mood, CliError> {
    raw.parse().map_err(CliError::InvalidArgument)
}

fn parse_event_type(raw: &str) -> Result<EventType, CliError> {
    raw.parse().map_err(CliError::InvalidArgument)
}

/// Parse a comma-separated reminder list; "none" or an empty string clears it
pub fn parse_lead_times(raw: &str) -> Result<Vec<ReminderLeadTime>, CliError> {
    if raw.trim().eq_ignore_ascii_case("none") {
        return Ok(Vec::new());
    }
    let mut leads = Vec::new();
    for tag in parse_tags(raw) {
        let lead: ReminderLeadTime = tag.parse().map_err(CliError::InvalidArgument)?;
        if !leads.contains(&lead) {
            leads.push(lead);
        }
    }
    Ok(leads)
}

/// Validate a YYYY-MM-DD argument and store it as that day's local midnight
fn parse_day(raw: &str) -> Result<String, CliError> {
    let date = parse_date(raw)
        .map_err(|e| CliError::DateParseError(format!("Invalid date format '{}': {}", raw, e)))?;
    Ok(date_to_timestamp(date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::calendar_date;

    #[test]
    fn lead_time_lists() {
        assert_eq!(
            parse_lead_times("week, same-day,week").unwrap(),
            vec![ReminderLeadTime::Week, ReminderLeadTime::SameDay]
        );
        assert!(parse_lead_times("none").unwrap().is_empty());
        assert!(matches!(parse_lead_times("week,month"), Err(CliError::InvalidArgument(_))));
    }

    #[test]
    fn day_arguments_keep_their_calendar_day() {
        let stored = parse_day("2026-12-25").unwrap();
        assert_eq!(calendar_date(&stored), Some(chrono::NaiveDate::from_ymd_opt(2026, 12, 25).unwrap()));
        assert!(matches!(parse_day("25/12/2026"), Err(CliError::DateParseError(_))));
    }

    #[test]
    fn commands_other_than_login_require_a_session() {
        let storage = Storage::in_memory().unwrap();
        let config = Config { seed_sample_data: false, ..Config::default() };

        let err = run(Commands::Mood(MoodCommand::List), &config, &storage).unwrap_err();
        assert!(matches!(err, CliError::AuthError(AuthError::NotAuthenticated)));

        run(
            Commands::Register {
                email: "a@b.c".to_string(),
                name: "A".to_string(),
                password: "pw".to_string(),
            },
            &config,
            &storage,
        )
        .unwrap();
        run(
            Commands::Mood(MoodCommand::Add {
                mood: "happy".to_string(),
                tags: Some("sun".to_string()),
                notes: None,
                date: None,
            }),
            &config,
            &storage,
        )
        .unwrap();

        let store = DataStore::load(&storage, false, today()).unwrap();
        assert_eq!(store.mood_entries().len(), 1);
        assert_eq!(store.mood_entries()[0].tags, vec!["sun"]);
    }

    #[test]
    fn trend_defaults_to_the_recent_window() {
        let cli = Cli::try_parse_from(["moodsync", "mood", "trend"]).unwrap();
        assert!(matches!(cli.command, Commands::Mood(MoodCommand::Trend { json: false, all: false })));

        let cli = Cli::try_parse_from(["moodsync", "mood", "trend", "--all", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Mood(MoodCommand::Trend { json: true, all: true })));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
