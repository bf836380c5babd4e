//! Deterministic form model
//!
//! Everything the inspection form knows about its own state lives here.
//! This module must stay free of DOM and storage dependencies:
//! - Time only arrives as an explicit `now` argument
//! - Field order is document order
//! - Capture/apply are pure functions of the registry

pub mod autosave;
pub mod field;
pub mod mirror;
pub mod snapshot;
pub mod validation;

pub use autosave::{AutosaveScheduler, AutosaveState, CommitTrigger, SaveStatus};
pub use field::{Field, FieldKind, FieldRegistry, GroupMember};
pub use mirror::{MirrorRule, MirrorSynchronizer};
pub use snapshot::FieldSnapshot;
pub use validation::{ValidationError, validate};
