// 🍽️ Session - The context that owns a ledger for one group of diners
// Nothing derived is cached: every summary is recomputed from the ledger

use crate::calculator::{BillSummary, Rates, ShareCalculator};
use crate::input::{NewEntryForm, ValidationError, ValidationResult};
use crate::ledger::{DishEntry, Ledger, LedgerError};
use crate::roster::Roster;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

// ============================================================================
// SESSION
// ============================================================================

#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,

    /// How many people split the whole bill; caps a fixed-count selection
    party_size: usize,

    roster: Roster,
    ledger: Ledger,
}

impl Session {
    pub fn new(party_size: usize) -> Self {
        Session {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            party_size: party_size.max(1),
            roster: Roster::empty(),
            ledger: Ledger::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn party_size(&self) -> usize {
        self.party_size
    }

    pub fn set_party_size(&mut self, party_size: usize) -> Result<(), ValidationError> {
        if party_size == 0 {
            return Err(ValidationError::new("party_size", "Must be at least 1"));
        }
        self.party_size = party_size;
        Ok(())
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Replace the declared roster. The party grows to fit it.
    pub fn declare_roster(&mut self, names: Vec<String>) -> ValidationResult<()> {
        let roster = Roster::new(names)?;
        self.party_size = self.party_size.max(roster.len());
        self.roster = roster;
        Ok(())
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Validate a submission and append it. Returns the entry's position.
    pub fn add_dish(&mut self, form: &NewEntryForm) -> ValidationResult<usize> {
        let entry = form.validate(self.party_size, &self.roster)?;
        self.ledger.append(entry);
        Ok(self.ledger.len() - 1)
    }

    pub fn remove_dish(&mut self, index: usize) -> Result<DishEntry, LedgerError> {
        self.ledger.remove(index)
    }

    /// Totals for the current ledger at the given rates.
    pub fn summary(&self, tax_percent: f64, tip_percent: f64) -> ValidationResult<BillSummary> {
        let rates = Rates::new(tax_percent, tip_percent)?;
        Ok(ShareCalculator::compute_with(self.ledger.entries(), &rates))
    }
}

// ============================================================================
// SESSION STORE
// ============================================================================

/// Live sessions by id. Sessions end when discarded; nothing is persisted.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<Uuid, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        SessionStore {
            sessions: HashMap::new(),
        }
    }

    pub fn create(&mut self, party_size: usize) -> &mut Session {
        let session = Session::new(party_size);
        let id = session.id();
        info!(session = %id, party_size = session.party_size(), "session started");
        self.sessions.entry(id).or_insert(session)
    }

    pub fn get(&self, id: &Uuid) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &Uuid) -> Option<&mut Session> {
        self.sessions.get_mut(id)
    }

    /// Discard a session and its ledger
    pub fn end(&mut self, id: &Uuid) -> Option<Session> {
        let ended = self.sessions.remove(id);
        if ended.is_some() {
            debug!(session = %id, "session ended");
        }
        ended
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ParticipantInput;
    use crate::roster::RosterChoice;

    fn form(name: &str, price: f64, participants: ParticipantInput) -> NewEntryForm {
        NewEntryForm {
            name: name.to_string(),
            price,
            participants,
        }
    }

    fn free(names: &str) -> ParticipantInput {
        ParticipantInput::FreeForm {
            names: names.to_string(),
        }
    }

    #[test]
    fn test_session_defaults() {
        let session = Session::new(0);
        assert_eq!(session.party_size(), 1);
        assert!(session.ledger().is_empty());
        assert!(session.roster().is_empty());
    }

    #[test]
    fn test_add_and_remove_dishes() {
        let mut session = Session::new(2);
        assert_eq!(session.add_dish(&form("Pizza", 24.0, free("Jason, Celia"))).unwrap(), 0);
        assert_eq!(session.add_dish(&form("Soda", 3.0, free("Jason"))).unwrap(), 1);

        let removed = session.remove_dish(0).unwrap();
        assert_eq!(removed.name, "Pizza");
        assert_eq!(session.ledger().entries()[0].name, "Soda");

        assert!(session.remove_dish(4).is_err());
        assert_eq!(session.ledger().len(), 1);
    }

    #[test]
    fn test_invalid_dish_never_reaches_ledger() {
        let mut session = Session::new(2);
        let errors = session.add_dish(&form("", 24.0, free("Jason"))).unwrap_err();

        assert_eq!(errors[0].field, "name");
        assert!(session.ledger().is_empty());
    }

    #[test]
    fn test_fixed_count_uses_party_size() {
        let mut session = Session::new(2);
        let three = ParticipantInput::FixedCount {
            count: 3,
            names: "A, B, C".to_string(),
        };
        assert!(session.add_dish(&form("Cake", 9.0, three.clone())).is_err());

        session.set_party_size(3).unwrap();
        assert!(session.add_dish(&form("Cake", 9.0, three)).is_ok());
        assert!(session.set_party_size(0).is_err());
    }

    #[test]
    fn test_roster_selection_through_session() {
        let mut session = Session::new(1);
        session
            .declare_roster(vec!["Jason".to_string(), "Celia".to_string(), "Mo".to_string()])
            .unwrap();
        assert_eq!(session.party_size(), 3);

        let everyone = ParticipantInput::Roster {
            selected: vec![RosterChoice::Everyone],
        };
        session.add_dish(&form("Nachos", 12.0, everyone)).unwrap();

        let summary = session.summary(0.0, 0.0).unwrap();
        assert_eq!(summary.shares.len(), 3);
        assert!((summary.share_of("Mo").unwrap() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_validates_rates() {
        let session = Session::new(1);
        let errors = session.summary(-5.0, 10.0).unwrap_err();
        assert_eq!(errors[0].field, "tax_percent");
    }

    #[test]
    fn test_summary_reflects_latest_ledger() {
        let mut session = Session::new(2);
        session.add_dish(&form("Pizza", 20.0, free("A"))).unwrap();
        assert_eq!(session.summary(0.0, 0.0).unwrap().subtotal, 20.0);

        session.remove_dish(0).unwrap();
        assert_eq!(session.summary(0.0, 0.0).unwrap().subtotal, 0.0);
    }

    #[test]
    fn test_store_lifecycle() {
        let mut store = SessionStore::new();
        let id = store.create(4).id();
        let other = store.create(2).id();

        assert_ne!(id, other);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&id).map(|s| s.party_size()), Some(4));

        store
            .get_mut(&id)
            .unwrap()
            .add_dish(&form("Tea", 3.0, free("A")))
            .unwrap();
        assert!(store.get(&other).unwrap().ledger().is_empty());

        assert!(store.end(&id).is_some());
        assert!(store.end(&id).is_none());
        assert!(store.get(&id).is_none());
    }
}
