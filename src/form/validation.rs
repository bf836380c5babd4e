//! Required-field validation

use super::field::FieldRegistry;

/// Required fields left empty, by display name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("required fields missing: {}", .missing.join(", "))]
pub struct ValidationError {
    pub missing: Vec<String>,
}

/// Check that every required field has a non-blank value.
///
/// Missing fields get their invalid mark set; filled ones have it cleared.
/// Required names with no matching field are ignored.
pub fn validate<S: AsRef<str>>(registry: &mut FieldRegistry, required: &[S]) -> Result<(), ValidationError> {
    let mut missing = Vec::new();

    for name in required {
        let Some(field) = registry.get_mut(name.as_ref()) else {
            continue;
        };
        let empty = !field.is_filled();
        field.invalid = empty;
        if empty {
            missing.push(field.display_name().to_string());
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::REQUIRED_FIELDS;
    use crate::form::Field;

    fn registry() -> FieldRegistry {
        FieldRegistry::new()
            .with(Field::text("inspection-date").with_label("Date"))
            .with(Field::text("inspection-client").with_label("Client"))
            .with(Field::text("vehicle-immat"))
            .with(Field::text("vehicle-marque").with_label("Marque"))
    }

    #[test]
    fn test_all_missing() {
        let mut reg = registry();
        let err = validate(&mut reg, &REQUIRED_FIELDS).unwrap_err();
        assert_eq!(err.missing, vec!["Date", "Client", "vehicle-immat", "Marque"]);
        assert!(reg.iter().all(|f| f.invalid));
    }

    #[test]
    fn test_whitespace_counts_as_missing() {
        let mut reg = registry();
        reg.set_value("inspection-date", "2024-05-01");
        reg.set_value("inspection-client", "   ");
        reg.set_value("vehicle-immat", "AB-123-CD");
        reg.set_value("vehicle-marque", "Renault");

        let err = validate(&mut reg, &REQUIRED_FIELDS).unwrap_err();
        assert_eq!(err.missing, vec!["Client"]);
        assert!(!reg.get("inspection-date").unwrap().invalid);
        assert!(reg.get("inspection-client").unwrap().invalid);
    }

    #[test]
    fn test_correcting_clears_mark() {
        let mut reg = registry();
        assert!(validate(&mut reg, &REQUIRED_FIELDS).is_err());
        for name in REQUIRED_FIELDS {
            reg.set_value(name, "ok");
        }
        assert!(validate(&mut reg, &REQUIRED_FIELDS).is_ok());
        assert!(reg.iter().all(|f| !f.invalid));
    }

    #[test]
    fn test_unknown_required_ignored() {
        let mut reg = FieldRegistry::new();
        assert!(validate(&mut reg, &["nope"]).is_ok());
    }
}
