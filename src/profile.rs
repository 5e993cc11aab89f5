//! Display identity of the person using the client
//!
//! The profile is fetched once at startup and never changes afterwards.

use serde::{Deserialize, Serialize};

/// Display name used when the profile cannot be fetched
pub const DEFAULT_PROFILE_NAME: &str = "User";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub tech: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: DEFAULT_PROFILE_NAME.to_string(),
            role: String::new(),
            tech: String::new(),
        }
    }
}

impl Profile {
    /// First character of the name, used as the avatar label
    pub fn initial(&self) -> String {
        self.name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "?".to_string())
    }

    /// Opening assistant line addressed to this profile
    pub fn greeting(&self, assistant_name: &str) -> String {
        format!(
            "Hello {}, I'm {}. How can I help you today?",
            self.name, assistant_name
        )
    }
}

/// Whether the startup profile fetch has resolved yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileState {
    /// `initialize()` has not run yet
    #[default]
    NotRequested,
    /// Fetch in progress
    Loading,
    /// Fetched from the backend
    Loaded,
    /// Fetch failed; the default profile is used
    Unavailable,
}
