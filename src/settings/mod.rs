//! Narrow key-value settings access plus the persisted recent-files list.
//!
//! The chart core never reaches for process-wide state: hosts hand a
//! [`SettingsProvider`] to the session, and the session snapshots it once per
//! chart build.

mod recent_files;
mod store;

pub use recent_files::{DEFAULT_RECENT_FILES_CAPACITY, RecentFiles};
pub use store::JsonSettingsStore;

use serde::{Deserialize, Serialize};

use crate::core::StartDatePolicy;

pub const START_FROM_LAUNCH_DATE_KEY: &str = "start_from_launch_date";
pub const AUTO_LOAD_LAST_FILE_KEY: &str = "auto_load_last_file";

/// Read access to host-owned settings.
pub trait SettingsProvider {
    fn get_bool(&self, key: &str) -> Option<bool>;
}

/// Typed snapshot of the settings the viewer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub start_from_launch_date: bool,
    pub auto_load_last_file: bool,
}

impl ViewerSettings {
    /// Reads known keys from `provider`; missing keys keep their defaults.
    #[must_use]
    pub fn from_provider(provider: &dyn SettingsProvider) -> Self {
        let defaults = Self::default();
        Self {
            start_from_launch_date: provider
                .get_bool(START_FROM_LAUNCH_DATE_KEY)
                .unwrap_or(defaults.start_from_launch_date),
            auto_load_last_file: provider
                .get_bool(AUTO_LOAD_LAST_FILE_KEY)
                .unwrap_or(defaults.auto_load_last_file),
        }
    }

    #[must_use]
    pub const fn start_date_policy(self) -> StartDatePolicy {
        StartDatePolicy::from_flag(self.start_from_launch_date)
    }
}

impl SettingsProvider for ViewerSettings {
    fn get_bool(&self, key: &str) -> Option<bool> {
        match key {
            START_FROM_LAUNCH_DATE_KEY => Some(self.start_from_launch_date),
            AUTO_LOAD_LAST_FILE_KEY => Some(self.auto_load_last_file),
            _ => None,
        }
    }
}

impl StartDatePolicy {
    #[must_use]
    pub fn from_settings(provider: &dyn SettingsProvider) -> Self {
        ViewerSettings::from_provider(provider).start_date_policy()
    }
}
