// Bill Splitter - Core Library
// Exposes all modules for use in the CLI, the API server, and tests

pub mod ledger;      // Dish entries, append / remove-by-position
pub mod calculator;  // Subtotal, tax, tip and per-person shares
pub mod input;       // Validation contract for new entries
pub mod roster;      // Declared people + "everyone" selection
pub mod format;      // Currency and text rendering
pub mod session;     // Session-owned ledger and the session store
pub mod config;      // TOML configuration

// Re-export commonly used types
pub use ledger::{DishEntry, Ledger, LedgerError};
pub use calculator::{BillSummary, Rates, ShareCalculator};
pub use input::{parse_names, NewEntryForm, ParticipantInput, ValidationError, ValidationResult};
pub use roster::{Roster, RosterChoice};
pub use format::{format_currency, render_entries, render_summary, row_label};
pub use session::{Session, SessionStore};
pub use config::{Config, ServerConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
