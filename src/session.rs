//! Form session
//!
//! Owns everything one open inspection form needs: live fields, mirror
//! rules, the autosave timer, the store, the notifier and the snapshot
//! cache. Drivers feed it events and the current time; it never reads the
//! clock or touches the DOM itself.

use crate::form::{
    AutosaveScheduler, FieldRegistry, FieldSnapshot, MirrorSynchronizer, SaveStatus,
    ValidationError, validate,
};
use crate::messages;
use crate::notify::{Notification, NotificationKind, Notifier};
use crate::persistence::{ExportFile, PersistedDocument, PersistenceError, PersistenceStore};
use crate::platform::input::Shortcut;
use crate::platform::print::DocumentRenderer;
use crate::platform::storage::KeyValueStore;
use crate::platform::time::Millis;
use crate::settings::Settings;
use crate::summary::{self, DataSummary};

/// What an input event did to its field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    /// New value of a text field or select
    Value(String),
    /// A radio button or checkbox was toggled
    Checked { member: String, checked: bool },
}

/// Events dispatched by the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// Value is changing (every keystroke, every toggle)
    Input { field: String, edit: FieldEdit },
    /// Edit completed (blur after a change, discrete selection)
    Change { field: String },
    /// Global keyboard shortcut
    Shortcut(Shortcut),
}

impl FormEvent {
    pub fn input(field: impl Into<String>, value: impl Into<String>) -> Self {
        FormEvent::Input {
            field: field.into(),
            edit: FieldEdit::Value(value.into()),
        }
    }

    pub fn toggle(field: impl Into<String>, member: impl Into<String>, checked: bool) -> Self {
        FormEvent::Input {
            field: field.into(),
            edit: FieldEdit::Checked {
                member: member.into(),
                checked,
            },
        }
    }

    pub fn change(field: impl Into<String>) -> Self {
        FormEvent::Change {
            field: field.into(),
        }
    }
}

/// One open inspection form
pub struct FormSession<S: KeyValueStore, R: DocumentRenderer> {
    settings: Settings,
    registry: FieldRegistry,
    mirrors: MirrorSynchronizer,
    autosave: AutosaveScheduler,
    store: PersistenceStore<S>,
    notifier: Notifier,
    renderer: R,
    /// Last committed or restored snapshot
    cache: FieldSnapshot,
    /// Snapshot whose commit failed, kept until a commit succeeds
    unsaved: Option<FieldSnapshot>,
    /// When the prepared print layout should be printed
    print_at: Option<Millis>,
    /// Export requested by a shortcut, waiting for the driver
    download: Option<ExportFile>,
}

impl<S: KeyValueStore, R: DocumentRenderer> FormSession<S, R> {
    pub fn new(registry: FieldRegistry, backend: S, renderer: R, settings: Settings) -> Self {
        let mirrors = MirrorSynchronizer::new(settings.mirror_rules.iter().cloned(), &registry);
        let autosave = AutosaveScheduler::new(settings.autosave_delay_ms, settings.saved_display_ms);
        let store = PersistenceStore::with_names(backend, &settings.storage_key, &settings.export_prefix);
        let notifier = Notifier::new(settings.notification_timing());

        Self {
            settings,
            registry,
            mirrors,
            autosave,
            store,
            notifier,
            renderer,
            cache: FieldSnapshot::new(),
            unsaved: None,
            print_at: None,
            download: None,
        }
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn store(&self) -> &PersistenceStore<S> {
        &self.store
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Autosave indicator at `now`
    pub fn status(&self, now: Millis) -> SaveStatus {
        self.autosave.status(now)
    }

    /// Notification in the page at `now`
    pub fn notification(&self, now: Millis) -> Option<&Notification> {
        self.notifier.current(now)
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Last committed or restored snapshot
    pub fn current_snapshot(&self) -> &FieldSnapshot {
        &self.cache
    }

    /// Snapshot still waiting for a successful commit
    pub fn unsaved_snapshot(&self) -> Option<&FieldSnapshot> {
        self.unsaved.as_ref()
    }

    /// Export produced by a shortcut, for the driver to offer as a download
    pub fn take_download(&mut self) -> Option<ExportFile> {
        self.download.take()
    }

    /// Startup: fill defaults, then re-apply the stored report if any
    pub fn restore(&mut self, now: Millis) {
        self.registry.fill_defaults(now);

        match self.store.load() {
            Ok(Some(doc)) => self.apply_document(doc, now),
            Ok(None) => log::info!("No saved report, starting fresh"),
            Err(e) => {
                log::warn!("Error loading saved data: {}", e);
                self.notifier.error(messages::RESTORE_ERROR, now);
            }
        }
    }

    fn apply_document(&mut self, doc: PersistedDocument, now: Millis) {
        let snapshot = doc.into_snapshot();
        let applied = self.registry.apply_snapshot(&snapshot);
        log::info!("Restored {} fields", applied);

        if let Some(saved_at) = snapshot.saved_at_time() {
            let when = summary::format_saved_at(saved_at);
            self.notifier.success(messages::restored(&when), now);
        }
        self.cache = snapshot;
    }

    /// Dispatch one event
    pub fn handle(&mut self, event: FormEvent, now: Millis) {
        match event {
            FormEvent::Input { field, edit } => self.on_input(&field, edit, now),
            FormEvent::Change { field } => {
                log::debug!("Change on '{}'", field);
                self.autosave.on_change(now);
                let result = self.commit(now);
                self.autosave.finish(result.is_ok(), now);
            }
            FormEvent::Shortcut(shortcut) => match shortcut {
                Shortcut::Save => self.save(now),
                Shortcut::Print => self.generate_document(now),
                Shortcut::Export => self.download = self.export(now),
            },
        }
    }

    fn on_input(&mut self, name: &str, edit: FieldEdit, now: Millis) {
        let written = match &edit {
            FieldEdit::Value(value) => self.registry.set_value(name, value),
            FieldEdit::Checked { member, checked } => {
                self.registry.set_checked(name, member, *checked)
            }
        };
        if !written {
            log::debug!("Input on '{}' did not map to a known field value", name);
        }

        if let Some(field) = self.registry.get_mut(name) {
            if field.invalid && field.is_filled() {
                field.invalid = false;
            }
        }

        if self.mirrors.is_source(name) {
            self.mirrors.propagate(name, &mut self.registry);
        }

        // Any input in the form restarts the quiet period
        self.autosave.on_input(now);
    }

    /// Fire due timers
    pub fn tick(&mut self, now: Millis) {
        if self.autosave.poll(now).is_some() {
            log::debug!("Autosave timer fired");
            let result = self.commit(now);
            self.autosave.finish(result.is_ok(), now);
        }

        if self.print_at.is_some_and(|at| now >= at) {
            self.print_at = None;
            self.renderer.print();
        }

        self.notifier.poll(now);
    }

    /// Earliest time `tick` has work to do
    pub fn next_deadline(&self, now: Millis) -> Option<Millis> {
        [
            self.autosave.next_deadline(),
            self.notifier.next_deadline(now),
            self.print_at,
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Capture the live fields and write them to the store
    fn commit(&mut self, now: Millis) -> Result<(), PersistenceError> {
        let snapshot = self.registry.capture_snapshot();
        match self.store.commit(&snapshot, now) {
            Ok(doc) => {
                self.cache = doc.into_snapshot();
                self.unsaved = None;
                Ok(())
            }
            Err(e) => {
                log::warn!("Save failed: {}", e);
                self.unsaved = Some(snapshot);
                self.notifier.error(messages::SAVE_ERROR, now);
                Err(e)
            }
        }
    }

    /// Commit outside the debounce: drop the pending timer and show the
    /// outcome on the indicator
    fn commit_now(&mut self, now: Millis) -> Result<(), PersistenceError> {
        self.autosave.cancel();
        let result = self.commit(now);
        self.autosave.finish(result.is_ok(), now);
        result
    }

    /// Manual save
    pub fn save(&mut self, now: Millis) {
        if self.commit_now(now).is_ok() {
            self.notifier.success(messages::SAVED, now);
        }
    }

    /// Replace the stored report with an uploaded one and show it.
    /// Malformed files leave both the store and the form untouched.
    pub fn import_report(&mut self, contents: &str, now: Millis) -> bool {
        match self.store.import_file(contents) {
            Ok(doc) => {
                self.unsaved = None;
                self.apply_document(doc, now);
                self.notifier.success(messages::LOADED, now);
                true
            }
            Err(e) => {
                log::warn!("Error loading report: {}", e);
                self.notifier.error(messages::LOAD_FILE_ERROR, now);
                false
            }
        }
    }

    /// Start a new report after confirmation: reset fields, drop the
    /// stored report, fill defaults. Returns false when declined.
    pub fn clear(&mut self, confirm: impl FnOnce(&str) -> bool, now: Millis) -> bool {
        if !confirm(messages::CLEAR_CONFIRM) {
            return false;
        }

        self.autosave.cancel();
        self.registry.reset();
        self.cache = FieldSnapshot::new();
        self.unsaved = None;
        self.registry.fill_defaults(now);

        match self.store.clear() {
            Ok(()) => {
                self.notifier.success(messages::CLEARED, now);
            }
            Err(e) => {
                log::warn!("Could not remove saved report: {}", e);
                self.notifier.error(messages::CLEAR_ERROR, now);
            }
        }
        true
    }

    /// Save, then print after the print layout has had time to apply.
    /// A failed save still prints, with its error left on screen.
    pub fn generate_document(&mut self, now: Millis) {
        if self.commit_now(now).is_ok() {
            self.notifier.success(messages::GENERATING, now);
        }
        self.renderer.prepare();
        self.print_at = Some(now + self.settings.print_delay_ms);
    }

    /// Save, then export the cached snapshot (the unsaved one if the save
    /// failed) as a JSON file
    pub fn export(&mut self, now: Millis) -> Option<ExportFile> {
        let saved = self.commit_now(now).is_ok();

        let snapshot = self.unsaved.as_ref().unwrap_or(&self.cache);
        match self.store.export_file(snapshot, now) {
            Ok(file) if saved => {
                self.notifier.success(messages::EXPORTED, now);
                Some(file)
            }
            Ok(file) => {
                self.notifier.error(messages::EXPORTED_UNSAVED, now);
                Some(file)
            }
            Err(e) => {
                log::warn!("Export failed: {}", e);
                self.notifier.error(messages::SAVE_ERROR, now);
                None
            }
        }
    }

    /// Check required fields, marking the missing ones
    pub fn validate(&mut self, now: Millis) -> Result<(), ValidationError> {
        let result = validate(&mut self.registry, &self.settings.required_fields);
        if let Err(e) = &result {
            self.notifier
                .notify(messages::missing_fields(&e.missing), NotificationKind::Error, now);
        }
        result
    }

    /// Headline values of the cached snapshot
    pub fn summary(&self) -> DataSummary {
        let summary = DataSummary::from_snapshot(&self.cache);
        log::info!("Report summary:\n{}", summary);
        summary
    }

    /// Completion percentage, also shown as a notification
    pub fn progress(&mut self, now: Millis) -> u32 {
        let percent = summary::completion_percent(&self.registry);
        self.notifier.success(messages::progress(percent), now);
        percent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Field;
    use crate::platform::storage::{MemoryStore, StorageError};

    const NOW: Millis = 1_714_557_600_000;

    #[derive(Debug, Default)]
    struct RecordingRenderer {
        calls: Vec<&'static str>,
    }

    impl DocumentRenderer for RecordingRenderer {
        fn prepare(&mut self) {
            self.calls.push("prepare");
        }

        fn print(&mut self) {
            self.calls.push("print");
        }
    }

    fn inspection_form() -> FieldRegistry {
        FieldRegistry::new()
            .with(Field::text("inspection-date").with_label("Date"))
            .with(Field::text("inspection-time"))
            .with(Field::text("inspection-client").with_label("Client"))
            .with(Field::text("vehicle-immat").with_label("Immatriculation"))
            .with(Field::text("vehicle-marque").with_label("Marque"))
            .with(Field::text("vehicle-modele"))
            .with(Field::select("vehicle-energie", ["Essence", "Diesel"]))
            .with(Field::radio_group("etat-pneus", ["bon", "usé"]))
            .with(Field::text("cert-immat-a"))
            .with(Field::text("cert-marque"))
            .with(Field::text("cert-modele"))
            .with(Field::text("cert-energie"))
    }

    fn session_with(backend: MemoryStore) -> FormSession<MemoryStore, RecordingRenderer> {
        FormSession::new(
            inspection_form(),
            backend,
            RecordingRenderer::default(),
            Settings::default(),
        )
    }

    fn session() -> FormSession<MemoryStore, RecordingRenderer> {
        session_with(MemoryStore::new())
    }

    /// Store whose entries cannot be removed
    #[derive(Debug, Default)]
    struct LockedStore(MemoryStore);

    impl KeyValueStore for LockedStore {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get_item(key)
        }

        fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            self.0.set_item(key, value)
        }

        fn remove_item(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Backend("locked".to_string()))
        }
    }

    fn stored(session: &FormSession<MemoryStore, RecordingRenderer>) -> Option<FieldSnapshot> {
        session.store().load().unwrap().map(PersistedDocument::into_snapshot)
    }

    #[test]
    fn test_input_mirrors_and_debounces() {
        let mut s = session();
        s.restore(NOW);

        s.handle(FormEvent::input("vehicle-marque", "Renault"), NOW);
        assert_eq!(s.registry().value("cert-marque"), Some("Renault"));
        assert_eq!(s.status(NOW), SaveStatus::Saving);
        assert_eq!(s.next_deadline(NOW), Some(NOW + 3000));

        s.tick(NOW + 2999);
        assert!(stored(&s).is_none());

        s.tick(NOW + 3000);
        let doc = stored(&s).unwrap();
        assert_eq!(doc.get("vehicle-marque"), Some("Renault"));
        assert_eq!(doc.get("cert-marque"), Some("Renault"));
        assert_eq!(s.status(NOW + 3000), SaveStatus::Saved);
        assert_eq!(s.status(NOW + 5000), SaveStatus::Idle);
        assert_eq!(s.current_snapshot(), &doc);
    }

    #[test]
    fn test_change_commits_once() {
        let mut s = session();
        s.handle(FormEvent::input("vehicle-immat", "AB-1"), NOW);
        s.handle(FormEvent::input("vehicle-immat", "AB-123-CD"), NOW + 500);
        s.handle(FormEvent::change("vehicle-immat"), NOW + 800);

        let first = stored(&s).unwrap();
        assert_eq!(first.get("vehicle-immat"), Some("AB-123-CD"));
        assert_eq!(first.saved_at(), Some("2024-05-01T10:00:00.800Z"));

        // The debounce deadline (NOW + 3500) was cancelled
        s.tick(NOW + 3500);
        s.tick(NOW + 10_000);
        assert_eq!(stored(&s).unwrap().saved_at(), first.saved_at());
    }

    #[test]
    fn test_commit_sees_state_at_firing_time() {
        let mut s = session();
        s.handle(FormEvent::input("vehicle-modele", "Cl"), NOW);
        s.handle(FormEvent::input("vehicle-modele", "Clio"), NOW + 1000);
        s.tick(NOW + 4000);
        assert_eq!(stored(&s).unwrap().get("vehicle-modele"), Some("Clio"));
    }

    #[test]
    fn test_mirror_target_edit_stays_local() {
        let mut s = session();
        s.handle(FormEvent::input("vehicle-immat", "AB-123-CD"), NOW);
        s.handle(FormEvent::input("cert-immat-a", "corrigé"), NOW + 10);
        assert_eq!(s.registry().value("vehicle-immat"), Some("AB-123-CD"));

        s.handle(FormEvent::input("vehicle-immat", "AB-123-CE"), NOW + 20);
        assert_eq!(s.registry().value("cert-immat-a"), Some("AB-123-CE"));
    }

    #[test]
    fn test_toggle_group_member() {
        let mut s = session();
        s.handle(FormEvent::toggle("etat-pneus", "usé", true), NOW);
        s.handle(FormEvent::change("etat-pneus"), NOW);
        assert_eq!(stored(&s).unwrap().get("etat-pneus"), Some("usé"));
    }

    #[test]
    fn test_restore_scenario() {
        let mut backend = MemoryStore::new();
        {
            let mut store = PersistenceStore::new(&mut backend);
            let snap: FieldSnapshot = [("vehicle-marque", "Renault"), ("vehicle-immat", "AB-123-CD")]
                .into_iter()
                .collect();
            store.commit(&snap, NOW).unwrap();
        }

        let mut s = session_with(backend);
        s.restore(NOW + 60_000);
        assert_eq!(s.registry().value("vehicle-marque"), Some("Renault"));
        assert_eq!(s.current_snapshot().get("vehicle-immat"), Some("AB-123-CD"));

        let note = s.notification(NOW + 60_000).unwrap();
        assert_eq!(note.kind, NotificationKind::Success);
        assert!(note.message.starts_with("Données restaurées ("));
    }

    #[test]
    fn test_restore_fresh_fills_defaults_silently() {
        let mut s = session();
        s.restore(NOW);
        assert_eq!(s.registry().value("inspection-date"), Some("2024-05-01"));
        assert!(s.registry().value("inspection-time").is_some_and(|t| t.len() == 5));
        assert!(s.notification(NOW).is_none());
    }

    #[test]
    fn test_restore_corrupt_store_reports_error() {
        let mut backend = MemoryStore::new();
        backend.set_item("foxcars_inspection_report", "{{{").unwrap();

        let mut s = session_with(backend);
        s.restore(NOW);
        assert_eq!(s.registry().value("inspection-date"), Some("2024-05-01"));
        assert!(s.current_snapshot().is_empty());
        let note = s.notification(NOW).unwrap();
        assert_eq!(note.kind, NotificationKind::Error);
        assert_eq!(note.message, messages::RESTORE_ERROR);
    }

    #[test]
    fn test_import_applies_and_replaces() {
        let mut s = session();
        s.handle(FormEvent::input("vehicle-modele", "Twingo"), NOW);
        s.save(NOW);

        assert!(s.import_report(r#"{"vehicle-marque": "Peugeot", "_savedAt": "2024-04-01T08:00:00.000Z"}"#, NOW + 1));
        assert_eq!(s.registry().value("vehicle-marque"), Some("Peugeot"));
        assert_eq!(stored(&s).unwrap().get("vehicle-modele"), None);
        assert_eq!(s.notification(NOW + 1).unwrap().message, messages::LOADED);
    }

    #[test]
    fn test_malformed_import_changes_nothing() {
        let mut s = session();
        s.handle(FormEvent::input("vehicle-marque", "Renault"), NOW);
        s.save(NOW);
        let before = stored(&s);

        assert!(!s.import_report("not json at all", NOW + 1));
        assert_eq!(stored(&s), before);
        assert_eq!(s.registry().value("vehicle-marque"), Some("Renault"));
        let note = s.notification(NOW + 1).unwrap();
        assert_eq!(note.kind, NotificationKind::Error);
        assert_eq!(note.message, messages::LOAD_FILE_ERROR);
    }

    #[test]
    fn test_clear_declined_keeps_everything() {
        let mut s = session();
        s.handle(FormEvent::input("vehicle-marque", "Renault"), NOW);
        s.save(NOW);

        let mut asked = None;
        assert!(!s.clear(
            |msg| {
                asked = Some(msg.to_string());
                false
            },
            NOW
        ));
        assert_eq!(asked.as_deref(), Some(messages::CLEAR_CONFIRM));
        assert!(stored(&s).is_some());
    }

    #[test]
    fn test_clear_removes_store_entry() {
        let mut s = session();
        s.handle(FormEvent::input("vehicle-marque", "Renault"), NOW);
        s.save(NOW);

        assert!(s.clear(|_| true, NOW + 1000));
        assert!(stored(&s).is_none());
        assert_eq!(s.registry().value("vehicle-marque"), Some(""));
        assert_eq!(s.registry().value("inspection-date"), Some("2024-05-01"));
        assert!(s.current_snapshot().is_empty());
        assert_eq!(s.notification(NOW + 1000).unwrap().message, messages::CLEARED);
    }

    #[test]
    fn test_clear_failure_reports_removal_error() {
        let mut s = FormSession::new(
            inspection_form(),
            LockedStore::default(),
            RecordingRenderer::default(),
            Settings::default(),
        );
        s.handle(FormEvent::input("vehicle-marque", "Renault"), NOW);
        s.save(NOW);

        assert!(s.clear(|_| true, NOW + 1000));
        assert!(s.store().load().unwrap().is_some());
        assert_eq!(s.registry().value("vehicle-marque"), Some(""));
        let note = s.notification(NOW + 1000).unwrap();
        assert_eq!(note.kind, NotificationKind::Error);
        assert_eq!(note.message, messages::CLEAR_ERROR);
    }

    #[test]
    fn test_clear_cancels_pending_autosave() {
        let mut s = session();
        s.handle(FormEvent::input("vehicle-marque", "Renault"), NOW);
        s.clear(|_| true, NOW + 100);
        s.tick(NOW + 5000);
        assert!(stored(&s).is_none());
    }

    #[test]
    fn test_generate_document_prints_after_delay() {
        let mut s = session();
        s.handle(FormEvent::input("vehicle-marque", "Renault"), NOW);
        s.generate_document(NOW + 10);

        assert!(stored(&s).is_some());
        assert_eq!(s.renderer().calls, vec!["prepare"]);
        assert_eq!(s.notification(NOW + 10).unwrap().message, messages::GENERATING);

        s.tick(NOW + 509);
        assert_eq!(s.renderer().calls, vec!["prepare"]);
        s.tick(NOW + 510);
        assert_eq!(s.renderer().calls, vec!["prepare", "print"]);
        s.tick(NOW + 2000);
        assert_eq!(s.renderer().calls.len(), 2);
    }

    #[test]
    fn test_export_carries_latest_edit_and_timestamp() {
        let mut s = session();
        s.handle(FormEvent::input("vehicle-marque", "Dacia"), NOW);
        let file = s.export(NOW + 100).unwrap();

        assert_eq!(file.file_name, format!("foxcars-inspection-{}.json", NOW + 100));
        let json: serde_json::Value = serde_json::from_str(&file.contents).unwrap();
        assert_eq!(json["vehicle-marque"], "Dacia");
        assert_eq!(json["_savedAt"], "2024-05-01T10:00:00.100Z");
    }

    #[test]
    fn test_export_shortcut_queues_download() {
        let mut s = session();
        s.handle(FormEvent::Shortcut(Shortcut::Export), NOW);
        assert!(s.take_download().is_some());
        assert!(s.take_download().is_none());
    }

    #[test]
    fn test_save_shortcut() {
        let mut s = session();
        s.handle(FormEvent::input("vehicle-marque", "Renault"), NOW);
        s.handle(FormEvent::Shortcut(Shortcut::Save), NOW + 5);
        assert!(stored(&s).is_some());
        assert_eq!(s.notification(NOW + 5).unwrap().message, messages::SAVED);
        // Manual save drops the pending autosave
        assert_eq!(s.next_deadline(NOW + 5), Some(NOW + 105));
    }

    #[test]
    fn test_storage_failure_keeps_unsaved_snapshot() {
        let mut s = session_with(MemoryStore::with_quota(32));
        s.handle(FormEvent::input("vehicle-marque", "Renault"), NOW);
        s.tick(NOW + 3000);

        assert_eq!(s.status(NOW + 3000), SaveStatus::Error);
        assert_eq!(
            s.unsaved_snapshot().and_then(|u| u.get("vehicle-marque")),
            Some("Renault")
        );
        assert!(stored(&s).is_none());
        assert_eq!(s.notification(NOW + 3000).unwrap().message, messages::SAVE_ERROR);
    }

    #[test]
    fn test_manual_save_failure_shows_error_status() {
        let mut s = session_with(MemoryStore::with_quota(8));
        s.handle(FormEvent::input("vehicle-marque", "Renault"), NOW);
        s.save(NOW + 100);

        assert_eq!(s.status(NOW + 100), SaveStatus::Error);
        assert_eq!(s.status(NOW + 2100), SaveStatus::Idle);
        let note = s.notification(NOW + 100).unwrap();
        assert_eq!(note.kind, NotificationKind::Error);
        assert_eq!(note.message, messages::SAVE_ERROR);
        assert!(stored(&s).is_none());
    }

    #[test]
    fn test_export_after_failed_save_warns() {
        let mut s = session_with(MemoryStore::with_quota(8));
        s.handle(FormEvent::input("vehicle-marque", "Renault"), NOW);
        let file = s.export(NOW + 100).unwrap();

        let json: serde_json::Value = serde_json::from_str(&file.contents).unwrap();
        assert_eq!(json["vehicle-marque"], "Renault");
        assert!(stored(&s).is_none());
        assert_eq!(s.status(NOW + 100), SaveStatus::Error);
        let note = s.notification(NOW + 100).unwrap();
        assert_eq!(note.kind, NotificationKind::Error);
        assert_eq!(note.message, messages::EXPORTED_UNSAVED);
    }

    #[test]
    fn test_generate_after_failed_save_keeps_error() {
        let mut s = session_with(MemoryStore::with_quota(8));
        s.handle(FormEvent::input("vehicle-marque", "Renault"), NOW);
        s.generate_document(NOW + 10);

        assert_eq!(s.status(NOW + 10), SaveStatus::Error);
        let note = s.notification(NOW + 10).unwrap();
        assert_eq!(note.kind, NotificationKind::Error);
        assert_eq!(note.message, messages::SAVE_ERROR);

        s.tick(NOW + 510);
        assert_eq!(s.renderer().calls, vec!["prepare", "print"]);
    }

    #[test]
    fn test_manual_save_shows_saved_status() {
        let mut s = session();
        s.handle(FormEvent::input("vehicle-marque", "Renault"), NOW);
        s.save(NOW + 100);
        assert_eq!(s.status(NOW + 100), SaveStatus::Saved);
    }

    #[test]
    fn test_validate_marks_until_corrected() {
        let mut s = session();
        s.restore(NOW);
        let err = s.validate(NOW).unwrap_err();
        assert_eq!(err.missing, vec!["Client", "Immatriculation", "Marque"]);
        assert_eq!(
            s.notification(NOW).unwrap().message,
            "Champs requis manquants: Client, Immatriculation, Marque"
        );

        s.handle(FormEvent::input("inspection-client", "M. Martin"), NOW + 10);
        assert!(!s.registry().get("inspection-client").unwrap().invalid);
        assert!(s.registry().get("vehicle-marque").unwrap().invalid);
    }

    #[test]
    fn test_progress_and_summary() {
        let mut s = session();
        s.handle(FormEvent::input("vehicle-marque", "Renault"), NOW);
        s.save(NOW);

        // marque + cert-marque mirror + energie select default
        let percent = s.progress(NOW + 1);
        assert_eq!(percent, 25);
        assert_eq!(s.notification(NOW + 1).unwrap().message, "Formulaire complété à 25%");

        let summary = s.summary();
        assert_eq!(summary.get("Marque"), Some("Renault"));
        assert_eq!(summary.get("Client"), None);
    }
}
