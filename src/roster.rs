// 👥 Roster - People declared up front for a session
// Lets a host offer multi-selection plus an "everyone" shortcut

use crate::input::{ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};

/// One item of a roster multi-selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterChoice {
    /// Sentinel: the entire roster
    Everyone,
    Person(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    names: Vec<String>,
}

impl Roster {
    /// Build a roster from declared names: trimmed, non-empty, unique.
    pub fn new(names: Vec<String>) -> ValidationResult<Self> {
        let mut errors = Vec::new();
        let mut declared: Vec<String> = Vec::with_capacity(names.len());

        for (i, raw) in names.iter().enumerate() {
            let name = raw.trim();
            if name.is_empty() {
                errors.push(ValidationError::new(
                    format!("roster[{}]", i),
                    "Required field is empty",
                ));
            } else if declared.iter().any(|d| d == name) {
                errors.push(ValidationError::new(
                    format!("roster[{}]", i),
                    format!("'{}' is already on the roster", name),
                ));
            } else {
                declared.push(name.to_string());
            }
        }

        if errors.is_empty() {
            Ok(Roster { names: declared })
        } else {
            Err(errors)
        }
    }

    pub fn empty() -> Self {
        Roster { names: Vec::new() }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Expand a selection into participant names, in roster order.
    pub fn resolve(&self, selected: &[RosterChoice]) -> Result<Vec<String>, ValidationError> {
        if selected.is_empty() {
            return Ok(Vec::new());
        }

        if self.is_empty() {
            return Err(ValidationError::new(
                "participants.selected",
                "No roster has been declared",
            ));
        }

        if selected.contains(&RosterChoice::Everyone) {
            return Ok(self.names.clone());
        }

        let picked: Vec<&str> = selected
            .iter()
            .filter_map(|choice| match choice {
                RosterChoice::Person(name) => Some(name.trim()),
                RosterChoice::Everyone => None,
            })
            .collect();

        let unknown: Vec<&str> = picked
            .iter()
            .copied()
            .filter(|name| !self.contains(name))
            .collect();
        if !unknown.is_empty() {
            return Err(ValidationError::new(
                "participants.selected",
                format!("Not on the roster: {}", unknown.join(", ")),
            ));
        }

        Ok(self
            .names
            .iter()
            .filter(|n| picked.contains(&n.as_str()))
            .cloned()
            .collect())
    }
}
