use serde::{Deserialize, Serialize};

fn enabled() -> bool {
    true
}

/// Preferences collected during onboarding and edited from the account screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub dark_mode_enabled: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub weather_preference: String,
    #[serde(default = "enabled")]
    pub notifications_enabled: bool,
    #[serde(default = "enabled")]
    pub email_notifications_enabled: bool,
    #[serde(default)]
    pub pinterest_connected: bool,
    #[serde(default)]
    pub pinterest_username: String,
    #[serde(default, rename = "profileImageURL")]
    pub profile_image_url: String,
    #[serde(default)]
    pub preferred_climate: String,
    #[serde(default)]
    pub preferred_trip_type: String,
    #[serde(default)]
    pub budget: String,
    #[serde(default)]
    pub preferred_activities: Vec<String>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            dark_mode_enabled: false,
            name: String::new(),
            gender: String::new(),
            age: 0,
            email: String::new(),
            weather_preference: String::new(),
            notifications_enabled: true,
            email_notifications_enabled: true,
            pinterest_connected: false,
            pinterest_username: String::new(),
            profile_image_url: String::new(),
            preferred_climate: String::new(),
            preferred_trip_type: String::new(),
            budget: String::new(),
            preferred_activities: Vec::new(),
        }
    }
}

impl UserProfile {
    pub fn is_anonymous(&self) -> bool {
        self.name.trim().is_empty() && self.email.trim().is_empty()
    }
}
