//! Immutable persona table with total lookup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::defaults;

/// A predefined debate opponent.
///
/// `system_prompt` shapes the completion provider's tone and is never
/// serialized to the client; presentation DTOs carry only id, display
/// name, and avatar reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    id: String,
    display_name: String,
    avatar_ref: String,
    system_prompt: String,
}

impl Persona {
    /// Creates a persona.
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        avatar_ref: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            avatar_ref: avatar_ref.into(),
            system_prompt: system_prompt.into(),
        }
    }

    /// Returns the lookup key.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the human-readable name.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the avatar asset reference.
    pub fn avatar_ref(&self) -> &str {
        &self.avatar_ref
    }

    /// Returns the system prompt. Server-side use only.
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}

/// Immutable table of debate opponents.
///
/// Read-only shared state: safe for unlimited concurrent reads with no
/// synchronization. Iteration order is the insertion order of the table.
#[derive(Debug, Clone)]
pub struct PersonaCatalog {
    personas: Vec<Persona>,
    by_id: HashMap<String, usize>,
    default_index: usize,
}

impl PersonaCatalog {
    /// Builds a catalog from a persona list and a default id.
    ///
    /// Returns `None` when the list is empty or the default id is not in
    /// the list; a catalog without a reachable default could not honor
    /// the total-lookup contract.
    pub fn new(personas: Vec<Persona>, default_id: &str) -> Option<Self> {
        let by_id: HashMap<String, usize> = personas
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();
        let default_index = *by_id.get(default_id)?;

        Some(Self {
            personas,
            by_id,
            default_index,
        })
    }

    /// The built-in opponent table.
    pub fn built_in() -> Self {
        defaults::built_in_catalog()
    }

    /// Looks up a persona by id, falling back to the default.
    ///
    /// Total: any input yields a valid persona, never an error.
    pub fn get(&self, id: &str) -> &Persona {
        let index = self.by_id.get(id).copied().unwrap_or(self.default_index);
        &self.personas[index]
    }

    /// Returns all personas in stable insertion order.
    pub fn all(&self) -> &[Persona] {
        &self.personas
    }

    /// Returns the default persona's id.
    pub fn default_id(&self) -> &str {
        &self.personas[self.default_index].id
    }
}
