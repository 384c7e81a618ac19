// 📝 Input Layer - Validation contract for new entries
// Every capture form reduces to the same `participants: Vec<String>` shape
// before anything reaches the Ledger

use crate::ledger::DishEntry;
use crate::roster::{Roster, RosterChoice};
use serde::{Deserialize, Serialize};

// ============================================================================
// VALIDATION ERROR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// All problems with a form are reported together
pub type ValidationResult<T> = Result<T, Vec<ValidationError>>;

// ============================================================================
// NAME PARSING
// ============================================================================

/// Split a comma-separated name list and trim each name.
///
/// Empty names are kept as empty strings so the caller can reject them;
/// `"Jason, Celia"` gives `["Jason", "Celia"]`.
pub fn parse_names(raw: &str) -> Vec<String> {
    raw.split(',').map(|name| name.trim().to_string()).collect()
}

fn check_names(field: &str, names: &[String], errors: &mut Vec<ValidationError>) {
    if names.iter().any(|n| n.is_empty()) {
        errors.push(ValidationError::new(
            field,
            "Names must be separated by single commas and must not be blank",
        ));
    }
}

// ============================================================================
// PARTICIPANT INPUT
// ============================================================================

/// The three ways participants get captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParticipantInput {
    /// A head count plus a comma-separated list. Extra names beyond `count`
    /// are dropped; missing names leave empty slots that take no share.
    FixedCount { count: usize, names: String },

    /// A comma-separated list of any length
    FreeForm { names: String },

    /// Picks from the declared roster
    Roster { selected: Vec<RosterChoice> },
}

impl ParticipantInput {
    /// Reduce to an ordered participant list.
    pub fn resolve(&self, party_size: usize, roster: &Roster) -> ValidationResult<Vec<String>> {
        let mut errors = Vec::new();

        let names = match self {
            ParticipantInput::FixedCount { count, names } => {
                if *count == 0 || *count > party_size {
                    errors.push(ValidationError::new(
                        "participants.count",
                        format!("Must be between 1 and {}, got {}", party_size, count),
                    ));
                }

                let mut names = if names.trim().is_empty() {
                    Vec::new()
                } else {
                    parse_names(names)
                };
                names.truncate(*count);
                check_names("participants.names", &names, &mut errors);
                names
            }
            ParticipantInput::FreeForm { names } => {
                if names.trim().is_empty() {
                    Vec::new()
                } else {
                    let names = parse_names(names);
                    check_names("participants.names", &names, &mut errors);
                    names
                }
            }
            ParticipantInput::Roster { selected } => match roster.resolve(selected) {
                Ok(names) => names,
                Err(e) => {
                    errors.push(e);
                    Vec::new()
                }
            },
        };

        if errors.is_empty() && names.is_empty() {
            errors.push(ValidationError::new(
                "participants",
                "At least one person must split the dish",
            ));
        }

        if errors.is_empty() {
            Ok(names)
        } else {
            Err(errors)
        }
    }
}

// ============================================================================
// NEW ENTRY FORM
// ============================================================================

/// A new-entry submission as it arrives from a host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEntryForm {
    pub name: String,
    pub price: f64,
    pub participants: ParticipantInput,
}

impl NewEntryForm {
    /// Check the form and turn it into a ledger entry.
    pub fn validate(&self, party_size: usize, roster: &Roster) -> ValidationResult<DishEntry> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::new("name", "Required field is empty"));
        }

        if !self.price.is_finite() {
            errors.push(ValidationError::new("price", "Must be a number"));
        } else if self.price <= 0.0 {
            errors.push(ValidationError::new(
                "price",
                format!("Must be greater than zero, got {}", self.price),
            ));
        }

        let participants = match self.participants.resolve(party_size, roster) {
            Ok(names) => names,
            Err(mut e) => {
                errors.append(&mut e);
                Vec::new()
            }
        };

        if errors.is_empty() {
            Ok(DishEntry::new(name, self.price, participants))
        } else {
            Err(errors)
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn free_form(name: &str, price: f64, names: &str) -> NewEntryForm {
        NewEntryForm {
            name: name.to_string(),
            price,
            participants: ParticipantInput::FreeForm {
                names: names.to_string(),
            },
        }
    }

    fn fields(errors: &[ValidationError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn test_parse_names_trims() {
        assert_eq!(parse_names(" Jason ,Celia"), vec!["Jason", "Celia"]);
        assert_eq!(parse_names("A,,B"), vec!["A", "", "B"]);
    }

    #[test]
    fn test_free_form_entry() {
        let entry = free_form("  Pad Thai ", 14.5, "Jason, Celia")
            .validate(1, &Roster::empty())
            .unwrap();

        assert_eq!(entry.name, "Pad Thai");
        assert_eq!(entry.price, 14.5);
        assert_eq!(entry.participants, vec!["Jason", "Celia"]);
    }

    #[test]
    fn test_duplicate_names_are_kept() {
        let entry = free_form("Fries", 6.0, "A, A")
            .validate(1, &Roster::empty())
            .unwrap();
        assert_eq!(entry.participants, vec!["A", "A"]);
    }

    #[test]
    fn test_reports_every_problem() {
        let errors = free_form("   ", 0.0, "").validate(1, &Roster::empty()).unwrap_err();
        assert_eq!(fields(&errors), vec!["name", "price", "participants"]);
    }

    #[test]
    fn test_negative_and_nan_price() {
        let errors = free_form("Tea", -2.0, "A").validate(1, &Roster::empty()).unwrap_err();
        assert_eq!(fields(&errors), vec!["price"]);

        let errors = free_form("Tea", f64::NAN, "A").validate(1, &Roster::empty()).unwrap_err();
        assert_eq!(errors[0].message, "Must be a number");
    }

    #[test]
    fn test_blank_name_in_list() {
        let errors = free_form("Tea", 2.0, "A,,B").validate(1, &Roster::empty()).unwrap_err();
        assert_eq!(fields(&errors), vec!["participants.names"]);
    }

    #[test]
    fn test_fixed_count_truncates() {
        let input = ParticipantInput::FixedCount {
            count: 2,
            names: "A, B, C".to_string(),
        };
        assert_eq!(input.resolve(4, &Roster::empty()).unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn test_fixed_count_pads_with_missing_slots() {
        let input = ParticipantInput::FixedCount {
            count: 3,
            names: "A".to_string(),
        };
        assert_eq!(input.resolve(4, &Roster::empty()).unwrap(), vec!["A"]);
    }

    #[test]
    fn test_fixed_count_bounded_by_party_size() {
        let input = ParticipantInput::FixedCount {
            count: 5,
            names: "A, B".to_string(),
        };
        let errors = input.resolve(4, &Roster::empty()).unwrap_err();
        assert_eq!(fields(&errors), vec!["participants.count"]);
        assert_eq!(errors[0].to_string(), "participants.count: Must be between 1 and 4, got 5");

        let zero = ParticipantInput::FixedCount {
            count: 0,
            names: "A".to_string(),
        };
        assert!(zero.resolve(4, &Roster::empty()).is_err());
    }

    #[test]
    fn test_roster_selection() {
        let roster = Roster::new(vec!["Jason".to_string(), "Celia".to_string()]).unwrap();

        let everyone = ParticipantInput::Roster {
            selected: vec![RosterChoice::Everyone],
        };
        assert_eq!(everyone.resolve(2, &roster).unwrap(), vec!["Jason", "Celia"]);

        let nobody = ParticipantInput::Roster { selected: vec![] };
        let errors = nobody.resolve(2, &roster).unwrap_err();
        assert_eq!(fields(&errors), vec!["participants"]);
    }

    #[test]
    fn test_participant_input_json_shape() {
        let input: ParticipantInput =
            serde_json::from_str(r#"{"kind":"free_form","names":"A, B"}"#).unwrap();
        assert_eq!(
            input,
            ParticipantInput::FreeForm {
                names: "A, B".to_string()
            }
        );

        let input: ParticipantInput =
            serde_json::from_str(r#"{"kind":"roster","selected":["everyone",{"person":"A"}]}"#)
                .unwrap();
        assert_eq!(
            input,
            ParticipantInput::Roster {
                selected: vec![RosterChoice::Everyone, RosterChoice::Person("A".to_string())]
            }
        );
    }
}
