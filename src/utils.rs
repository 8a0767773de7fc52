use chrono::{DateTime, Local, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Profile mode for the application (dev or prod)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Dev,
    Prod,
}

impl Profile {
    fn app_name(&self) -> &'static str {
        match self {
            Profile::Dev => "moodsync-dev",
            Profile::Prod => "moodsync",
        }
    }
}

/// Get the configuration directory path for MoodSync
/// If profile is Dev, uses "moodsync-dev" instead of "moodsync"
pub fn get_config_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "moodsync", profile.app_name())
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the data directory path for MoodSync
/// If profile is Dev, uses "moodsync-dev" instead of "moodsync"
pub fn get_data_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "moodsync", profile.app_name())
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Expand `~` in a path string to the user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Parse a date string in ISO 8601 format (YYYY-MM-DD)
pub fn parse_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
}

/// Today's date in the local time zone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Get the current date as an ISO 8601 string (YYYY-MM-DD), local time
pub fn get_current_date_string() -> String {
    today().format("%Y-%m-%d").to_string()
}

/// Current instant as an RFC 3339 UTC timestamp with millisecond precision
pub fn get_current_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Local midnight of `date`, as an RFC 3339 UTC timestamp
pub fn date_to_timestamp(date: NaiveDate) -> String {
    let midnight = date.and_time(NaiveTime::MIN);
    let instant = match Local.from_local_datetime(&midnight).earliest() {
        Some(local) => local.with_timezone(&Utc),
        // No local midnight that day (DST gap); fall back to UTC midnight
        None => Utc.from_utc_datetime(&midnight),
    };
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Resolve a stored date string to a local calendar day.
///
/// Accepts full RFC 3339 timestamps (converted to the local zone first) and
/// bare `YYYY-MM-DD` dates (taken verbatim). Returns `None` for anything else.
pub fn calendar_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Local).date_naive());
    }
    parse_date(value).ok()
}

/// Generate a fresh unique record id
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Split a comma-separated tag string, trimming blanks and dropping duplicates
pub fn parse_tags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_trimmed_and_deduplicated() {
        assert_eq!(parse_tags(" work, friends ,,work"), vec!["work", "friends"]);
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn bare_dates_resolve_verbatim() {
        let d = calendar_date("2026-03-01").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert!(calendar_date("not a date").is_none());
    }

    #[test]
    fn local_midnight_timestamp_maps_back_to_same_day() {
        let d = NaiveDate::from_ymd_opt(2026, 7, 15).unwrap();
        assert_eq!(calendar_date(&date_to_timestamp(d)), Some(d));
    }

    #[test]
    fn expand_path_leaves_absolute_paths_alone() {
        assert_eq!(expand_path("/tmp/app.db"), PathBuf::from("/tmp/app.db"));
    }
}
