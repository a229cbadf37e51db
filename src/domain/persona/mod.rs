//! Persona domain - the debate opponent catalog.
//!
//! Personas are loaded once at startup into an immutable catalog that is
//! injected wherever it is needed; lookup by id is total (unknown ids
//! resolve to the default persona) so callers never handle a miss.

mod catalog;
mod defaults;

pub use catalog::{Persona, PersonaCatalog};
