//! Report summary and completion tracking

use std::fmt;

use chrono::{DateTime, Utc};

use crate::form::{FieldRegistry, FieldSnapshot};
use crate::messages::NOT_FILLED;
use crate::platform::time;

/// Headline fields shown by the summary (field name, label)
pub const SUMMARY_FIELDS: [(&str, &str); 6] = [
    ("inspection-date", "Date"),
    ("inspection-client", "Client"),
    ("vehicle-immat", "Immatriculation"),
    ("vehicle-marque", "Marque"),
    ("vehicle-modele", "Modèle"),
    ("vehicle-km", "Kilométrage"),
];

/// One summary line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryEntry {
    pub label: &'static str,
    /// Field value, or `None` when not filled in
    pub value: Option<String>,
}

/// Headline values of a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSummary {
    pub entries: Vec<SummaryEntry>,
}

impl DataSummary {
    /// Summarize a snapshot; empty values count as not filled
    pub fn from_snapshot(snapshot: &FieldSnapshot) -> Self {
        let entries = SUMMARY_FIELDS
            .iter()
            .map(|&(name, label)| SummaryEntry {
                label,
                value: snapshot
                    .get(name)
                    .filter(|v| !v.is_empty())
                    .map(str::to_owned),
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .and_then(|e| e.value.as_deref())
    }
}

impl fmt::Display for DataSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.entries.iter().map(|e| e.label.chars().count()).max().unwrap_or(0);
        for entry in &self.entries {
            let pad = width - entry.label.chars().count();
            writeln!(
                f,
                "{}{} : {}",
                entry.label,
                " ".repeat(pad),
                entry.value.as_deref().unwrap_or(NOT_FILLED)
            )?;
        }
        Ok(())
    }
}

/// Percentage of fields filled in, rounded. Each radio/checkbox group
/// counts as one field; an empty form is 0%.
pub fn completion_percent(registry: &FieldRegistry) -> u32 {
    let total = registry.len();
    if total == 0 {
        return 0;
    }
    let filled = registry.iter().filter(|f| f.is_filled()).count();
    ((filled as f64 / total as f64) * 100.0).round() as u32
}

/// Capture time for display, `dd/mm/yyyy HH:MM:SS` in local time
pub fn format_saved_at(saved_at: DateTime<Utc>) -> String {
    time::local_fr(saved_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Field;

    #[test]
    fn test_summary_marks_missing() {
        let snap: FieldSnapshot = [("vehicle-marque", "Renault"), ("vehicle-modele", "")]
            .into_iter()
            .collect();
        let summary = DataSummary::from_snapshot(&snap);
        assert_eq!(summary.entries.len(), 6);
        assert_eq!(summary.get("Marque"), Some("Renault"));
        assert_eq!(summary.get("Modèle"), None);

        let text = summary.to_string();
        assert!(text.contains("Marque          : Renault"));
        assert!(text.contains("Client          : Non renseigné"));
    }

    #[test]
    fn test_completion_counts_groups_once() {
        let mut reg = FieldRegistry::new()
            .with(Field::text("a"))
            .with(Field::text("b"))
            .with(Field::radio_group("c", ["x", "y", "z"]));
        assert_eq!(completion_percent(&reg), 0);

        reg.set_value("a", "rempli");
        reg.set_checked("c", "y", true);
        assert_eq!(completion_percent(&reg), 67);
    }

    #[test]
    fn test_completion_empty_form() {
        assert_eq!(completion_percent(&FieldRegistry::new()), 0);
    }
}
