//! Mirror fields
//!
//! Some values are typed once and shown in two sections of the report
//! (vehicle identification and the certificate). A mirror rule copies the
//! source value into the target on every edit of the source. Edits to the
//! target never flow back.

use serde::{Deserialize, Serialize};

use super::field::FieldRegistry;

/// Target must equal source after any edit to source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorRule {
    pub source: String,
    pub target: String,
}

impl MirrorRule {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Rule table, fixed at session start
#[derive(Debug, Clone, Default)]
pub struct MirrorSynchronizer {
    rules: Vec<MirrorRule>,
}

impl MirrorSynchronizer {
    /// Keep only the rules whose endpoints are both single-value fields
    /// of `registry`; the rest are skipped silently.
    pub fn new(rules: impl IntoIterator<Item = MirrorRule>, registry: &FieldRegistry) -> Self {
        let rules = rules
            .into_iter()
            .filter(|rule| {
                let usable = [&rule.source, &rule.target].iter().all(|name| {
                    registry.get(name).is_some_and(|f| f.is_single_value())
                });
                if !usable {
                    log::debug!("Skipping mirror {} -> {}", rule.source, rule.target);
                }
                usable
            })
            .collect();
        Self { rules }
    }

    pub fn rules(&self) -> &[MirrorRule] {
        &self.rules
    }

    pub fn is_source(&self, name: &str) -> bool {
        self.rules.iter().any(|r| r.source == name)
    }

    /// Copy `source`'s current value into each of its targets.
    /// Returns the names of the targets written.
    pub fn propagate(&self, source: &str, registry: &mut FieldRegistry) -> Vec<String> {
        let Some(value) = registry.value(source).map(str::to_owned) else {
            return Vec::new();
        };

        let mut written = Vec::new();
        for rule in self.rules.iter().filter(|r| r.source == source) {
            if registry.set_value(&rule.target, &value) {
                written.push(rule.target.clone());
            }
        }
        written
    }
}
