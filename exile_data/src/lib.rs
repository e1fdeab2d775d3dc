//! Shared data model for Exile Progression routes.

pub mod defs;
pub mod language;
pub mod reference;
pub mod validate;

pub use defs::*;
pub use language::{FragmentKind, FragmentParameter, FragmentVariant};
pub use reference::*;
pub use validate::{ValidationError, validate_reference_data};
