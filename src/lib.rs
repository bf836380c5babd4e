//! FOXCARS Préachat - inspection form engine
//!
//! Core modules:
//! - `form`: Deterministic form model (fields, mirrors, autosave, validation)
//! - `persistence`: Durable snapshot storage, JSON export/import
//! - `session`: Form session owning all state, one handler per event
//! - `notify`: Single-slot transient notifications
//! - `platform`: Browser/native platform abstraction
//! - `settings`: Tunable durations, keys and rule tables
//! - `summary`: Data summary, completion and date formatting

pub mod form;
pub mod notify;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod summary;

pub use form::{FieldKind, FieldRegistry, FieldSnapshot, MirrorRule};
pub use notify::{NotificationKind, Notifier};
pub use persistence::{ExportFile, PersistedDocument, PersistenceError, PersistenceStore};
pub use session::{FormEvent, FormSession};
pub use settings::Settings;

/// Form configuration constants
pub mod consts {
    /// Durable storage key for the report snapshot
    pub const STORAGE_KEY: &str = "foxcars_inspection_report";
    /// Reserved snapshot key holding the capture timestamp
    pub const SAVED_AT_KEY: &str = "_savedAt";
    /// Exported file name prefix (`<prefix>-<epoch-millis>.json`)
    pub const EXPORT_PREFIX: &str = "foxcars-inspection";

    /// Quiet period before an autosave commit (ms)
    pub const AUTOSAVE_DELAY_MS: u64 = 3000;
    /// How long the "saved" indicator stays up (ms)
    pub const SAVED_DISPLAY_MS: u64 = 2000;

    /// Delay between inserting a notification and showing it (ms)
    pub const NOTIFICATION_SHOW_DELAY_MS: u64 = 100;
    /// Time from insertion until a notification starts leaving (ms)
    pub const NOTIFICATION_DISPLAY_MS: u64 = 3000;
    /// Leave transition before removal (ms)
    pub const NOTIFICATION_TEARDOWN_MS: u64 = 400;

    /// Delay between preparing the print layout and printing (ms)
    pub const PRINT_DELAY_MS: u64 = 500;

    /// Field pre-filled with today's date on a fresh report
    pub const DATE_FIELD: &str = "inspection-date";
    /// Field pre-filled with the current time on a fresh report
    pub const TIME_FIELD: &str = "inspection-time";

    /// Fields that must be filled in for a report to validate
    pub const REQUIRED_FIELDS: [&str; 4] = [
        "inspection-date",
        "inspection-client",
        "vehicle-immat",
        "vehicle-marque",
    ];

    /// Vehicle fields copied into the certificate section (source, target)
    pub const VEHICLE_MIRRORS: [(&str, &str); 6] = [
        ("vehicle-immat", "cert-immat-a"),
        ("vehicle-vin", "cert-vin"),
        ("vehicle-marque", "cert-marque"),
        ("vehicle-modele", "cert-modele"),
        ("vehicle-energie", "cert-energie"),
        ("vehicle-places", "cert-places"),
    ];
}

/// User-facing messages (the form is French-language)
pub mod messages {
    pub const SAVED: &str = "Rapport sauvegardé avec succès!";
    pub const LOADED: &str = "Rapport chargé avec succès!";
    pub const LOAD_FILE_ERROR: &str = "Erreur lors du chargement du fichier";
    pub const RESTORE_ERROR: &str = "Erreur lors du chargement des données";
    pub const SAVE_ERROR: &str = "Erreur lors de la sauvegarde";
    pub const CLEAR_CONFIRM: &str =
        "Voulez-vous vraiment effacer toutes les données et créer un nouveau rapport?";
    pub const CLEARED: &str = "Nouveau rapport créé";
    pub const CLEAR_ERROR: &str = "Erreur lors de la suppression des données";
    pub const GENERATING: &str = "Génération du PDF...";
    pub const EXPORTED: &str = "Rapport exporté en JSON";
    pub const EXPORTED_UNSAVED: &str = "Rapport exporté en JSON, mais non sauvegardé";
    pub const NOT_FILLED: &str = "Non renseigné";

    /// "Données restaurées (<date>)"
    pub fn restored(formatted_date: &str) -> String {
        format!("Données restaurées ({})", formatted_date)
    }

    /// "Champs requis manquants: a, b"
    pub fn missing_fields(labels: &[String]) -> String {
        format!("Champs requis manquants: {}", labels.join(", "))
    }

    /// "Formulaire complété à N%"
    pub fn progress(percent: u32) -> String {
        format!("Formulaire complété à {}%", percent)
    }
}
