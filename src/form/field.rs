//! Field registry
//!
//! Live values of every named form control. Single-value controls (text
//! inputs, textareas, selects) and grouped controls (radio buttons and
//! checkboxes sharing a name) are both addressed by name.

use std::collections::HashMap;

use super::snapshot::FieldSnapshot;
use crate::consts::{DATE_FIELD, TIME_FIELD};
use crate::platform::time::{self, Millis};

/// One radio button or checkbox inside a named group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMember {
    pub value: String,
    pub checked: bool,
    /// Checked state restored by `reset`
    pub default_checked: bool,
}

impl GroupMember {
    pub fn new(value: impl Into<String>, checked: bool) -> Self {
        Self {
            value: value.into(),
            checked,
            default_checked: checked,
        }
    }
}

/// Kind of control behind a field name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text (input, textarea, date/time inputs)
    Text { value: String, default: String },
    /// Single-choice select
    Select {
        options: Vec<String>,
        selected: Option<usize>,
        default: Option<usize>,
    },
    /// Radio buttons: at most one member checked
    RadioGroup { members: Vec<GroupMember> },
    /// Checkboxes sharing a name
    CheckboxGroup { members: Vec<GroupMember> },
}

/// A named field of the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    /// Visible label, used in validation messages
    pub label: Option<String>,
    pub kind: FieldKind,
    /// Marked as missing by the last validation
    pub invalid: bool,
}

impl Field {
    pub fn text(name: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            FieldKind::Text {
                value: String::new(),
                default: String::new(),
            },
        )
    }

    /// Select whose first option is selected by default (browser behavior)
    pub fn select<S: Into<String>>(name: impl Into<String>, options: impl IntoIterator<Item = S>) -> Self {
        let options: Vec<String> = options.into_iter().map(Into::into).collect();
        let default = if options.is_empty() { None } else { Some(0) };
        Self::with_kind(
            name,
            FieldKind::Select {
                options,
                selected: default,
                default,
            },
        )
    }

    pub fn radio_group<S: Into<String>>(name: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        let members = values.into_iter().map(|v| GroupMember::new(v, false)).collect();
        Self::with_kind(name, FieldKind::RadioGroup { members })
    }

    pub fn checkbox_group<S: Into<String>>(name: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        let members = values.into_iter().map(|v| GroupMember::new(v, false)).collect();
        Self::with_kind(name, FieldKind::CheckboxGroup { members })
    }

    fn with_kind(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: None,
            kind,
            invalid: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the initial (and reset) value of a text field or select
    pub fn with_default(mut self, value: &str) -> Self {
        match &mut self.kind {
            FieldKind::Text { value: v, default } => {
                *v = value.to_string();
                *default = value.to_string();
            }
            FieldKind::Select {
                options,
                selected,
                default,
            } => {
                *selected = options.iter().position(|o| o == value);
                *default = *selected;
            }
            FieldKind::RadioGroup { members } | FieldKind::CheckboxGroup { members } => {
                for m in members.iter_mut() {
                    m.checked = m.value == value;
                    m.default_checked = m.checked;
                }
            }
        }
        self
    }

    /// Label if known, otherwise the field name
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Text and select fields hold one value; groups don't
    pub fn is_single_value(&self) -> bool {
        matches!(self.kind, FieldKind::Text { .. } | FieldKind::Select { .. })
    }

    /// Current value. `None` for a group with nothing selected.
    pub fn value(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::Text { value, .. } => Some(value),
            FieldKind::Select {
                options, selected, ..
            } => Some(
                selected
                    .and_then(|i| options.get(i))
                    .map(String::as_str)
                    .unwrap_or(""),
            ),
            // Last checked member in document order wins
            FieldKind::RadioGroup { members } | FieldKind::CheckboxGroup { members } => members
                .iter()
                .rev()
                .find(|m| m.checked)
                .map(|m| m.value.as_str()),
        }
    }

    /// Whether the field counts as filled in
    pub fn is_filled(&self) -> bool {
        self.value().is_some_and(|v| !v.trim().is_empty())
    }

    /// Write a value following the kind's apply rule.
    /// Returns false when a group has no member with that value.
    pub fn apply_value(&mut self, new_value: &str) -> bool {
        match &mut self.kind {
            FieldKind::Text { value, .. } => {
                *value = new_value.to_string();
                true
            }
            FieldKind::Select {
                options, selected, ..
            } => {
                // Unknown option leaves the select with no selection
                *selected = options.iter().position(|o| o == new_value);
                selected.is_some()
            }
            FieldKind::RadioGroup { members } => {
                if !members.iter().any(|m| m.value == new_value) {
                    return false;
                }
                for m in members.iter_mut() {
                    m.checked = m.value == new_value;
                }
                true
            }
            FieldKind::CheckboxGroup { members } => {
                match members.iter_mut().find(|m| m.value == new_value) {
                    Some(m) => {
                        m.checked = true;
                        true
                    }
                    None => false,
                }
            }
        }
    }

    /// Toggle one group member, as a click on it would.
    /// Returns false for single-value fields or unknown members.
    pub fn set_checked(&mut self, member_value: &str, checked: bool) -> bool {
        match &mut self.kind {
            FieldKind::RadioGroup { members } => {
                if !members.iter().any(|m| m.value == member_value) {
                    return false;
                }
                for m in members.iter_mut() {
                    if m.value == member_value {
                        m.checked = checked;
                    } else if checked {
                        m.checked = false;
                    }
                }
                true
            }
            FieldKind::CheckboxGroup { members } => {
                match members.iter_mut().find(|m| m.value == member_value) {
                    Some(m) => {
                        m.checked = checked;
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }

    /// Restore the declared default state
    pub fn reset(&mut self) {
        match &mut self.kind {
            FieldKind::Text { value, default } => *value = default.clone(),
            FieldKind::Select {
                selected, default, ..
            } => *selected = *default,
            FieldKind::RadioGroup { members } | FieldKind::CheckboxGroup { members } => {
                for m in members.iter_mut() {
                    m.checked = m.default_checked;
                }
            }
        }
        self.invalid = false;
    }
}

/// All named fields of one form, in document order
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: Vec<Field>,
    index: HashMap<String, usize>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, replacing any field with the same name
    pub fn insert(&mut self, field: Field) {
        match self.index.get(&field.name) {
            Some(&i) => self.fields[i] = field,
            None => {
                self.index.insert(field.name.clone(), self.fields.len());
                self.fields.push(field);
            }
        }
    }

    /// Builder-style `insert`
    pub fn with(mut self, field: Field) -> Self {
        self.insert(field);
        self
    }

    /// Append one radio/checkbox control, creating its group on first sight
    pub fn add_group_member(&mut self, name: &str, radio: bool, value: &str, checked: bool) {
        if let Some(field) = self.get_mut(name) {
            match &mut field.kind {
                FieldKind::RadioGroup { members } | FieldKind::CheckboxGroup { members } => {
                    members.push(GroupMember::new(value, checked));
                }
                _ => log::warn!("Field '{}' mixes single and grouped controls", name),
            }
            return;
        }

        let members = vec![GroupMember::new(value, checked)];
        let kind = if radio {
            FieldKind::RadioGroup { members }
        } else {
            FieldKind::CheckboxGroup { members }
        };
        self.insert(Field::with_kind(name, kind));
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Field> {
        match self.index.get(name) {
            Some(&i) => Some(&mut self.fields[i]),
            None => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Current value of a field (see `Field::value`)
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Field::value)
    }

    /// Write a value into a field; false if the field is unknown or
    /// the value does not fit it
    pub fn set_value(&mut self, name: &str, value: &str) -> bool {
        self.get_mut(name).is_some_and(|f| f.apply_value(value))
    }

    /// Toggle a group member
    pub fn set_checked(&mut self, name: &str, member_value: &str, checked: bool) -> bool {
        self.get_mut(name)
            .is_some_and(|f| f.set_checked(member_value, checked))
    }

    /// Read every named field into a snapshot (no timestamp)
    pub fn capture_snapshot(&self) -> FieldSnapshot {
        let mut snapshot = FieldSnapshot::new();
        for field in &self.fields {
            if let Some(value) = field.value() {
                snapshot.insert(field.name.clone(), value);
            }
        }
        snapshot
    }

    /// Write snapshot values back into the live fields.
    ///
    /// Fields missing from the snapshot are left alone, as are snapshot
    /// keys with no matching field. Returns the number of fields written.
    pub fn apply_snapshot(&mut self, snapshot: &FieldSnapshot) -> usize {
        let mut applied = 0;
        for (name, value) in snapshot.fields() {
            let Some(field) = self.get_mut(name) else {
                continue;
            };
            if field.apply_value(value) {
                applied += 1;
            }
        }
        applied
    }

    /// Reset every field to its declared default
    pub fn reset(&mut self) {
        for field in self.fields.iter_mut() {
            field.reset();
        }
    }

    /// Pre-fill an empty date field with today's date and an empty
    /// time field with the current local time
    pub fn fill_defaults(&mut self, now: Millis) {
        if let Some(field) = self.get_mut(DATE_FIELD) {
            if field.is_single_value() && field.value().is_some_and(str::is_empty) {
                field.apply_value(&time::iso_date(now));
            }
        }
        if let Some(field) = self.get_mut(TIME_FIELD) {
            if field.is_single_value() && field.value().is_some_and(str::is_empty) {
                field.apply_value(&time::local_hh_mm(now));
            }
        }
    }

    pub fn set_invalid(&mut self, name: &str, invalid: bool) {
        if let Some(field) = self.get_mut(name) {
            field.invalid = invalid;
        }
    }
}
