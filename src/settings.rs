//! Form settings
//!
//! Read from LocalStorage, under its own key, at startup. Every field has a
//! default, so a partial settings object is accepted.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::form::MirrorRule;
use crate::notify::NotificationTiming;
use crate::platform::time::Millis;

/// Tunable durations, storage names and rule tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Autosave ===
    /// Quiet period before an autosave commit
    pub autosave_delay_ms: Millis,
    /// How long the saved/error indicator stays up
    pub saved_display_ms: Millis,

    // === Notifications ===
    pub notification_show_delay_ms: Millis,
    pub notification_display_ms: Millis,
    pub notification_teardown_ms: Millis,

    // === Printing ===
    /// Delay between switching to the print layout and printing
    pub print_delay_ms: Millis,

    // === Storage ===
    pub storage_key: String,
    pub export_prefix: String,

    // === Form rules ===
    pub required_fields: Vec<String>,
    pub mirror_rules: Vec<MirrorRule>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            autosave_delay_ms: AUTOSAVE_DELAY_MS,
            saved_display_ms: SAVED_DISPLAY_MS,

            notification_show_delay_ms: NOTIFICATION_SHOW_DELAY_MS,
            notification_display_ms: NOTIFICATION_DISPLAY_MS,
            notification_teardown_ms: NOTIFICATION_TEARDOWN_MS,

            print_delay_ms: PRINT_DELAY_MS,

            storage_key: STORAGE_KEY.to_string(),
            export_prefix: EXPORT_PREFIX.to_string(),

            required_fields: REQUIRED_FIELDS.iter().map(|s| s.to_string()).collect(),
            mirror_rules: VEHICLE_MIRRORS
                .iter()
                .map(|(source, target)| MirrorRule::new(*source, *target))
                .collect(),
        }
    }
}

impl Settings {
    /// Parse a settings object; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn notification_timing(&self) -> NotificationTiming {
        NotificationTiming {
            show_delay: self.notification_show_delay_ms,
            display: self.notification_display_ms,
            teardown: self.notification_teardown_ms,
        }
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "foxcars_inspection_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native runs have no settings store
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
