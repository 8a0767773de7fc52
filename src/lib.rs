pub mod auth;
pub mod cli;
pub mod config;
pub mod data;
pub mod insights;
pub mod models;
pub mod reminders;
pub mod sample;
pub mod storage;
pub mod utils;

pub use auth::Auth;
pub use config::Config;
pub use data::DataStore;
pub use models::{Event, MoodEntry, Notification};
pub use storage::Storage;
pub use utils::Profile;
