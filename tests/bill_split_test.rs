// Integration tests: ledger + share calculator through the public API

use bill_splitter::{
    format_currency, render_summary, DishEntry, Ledger, LedgerError, NewEntryForm,
    ParticipantInput, Roster, Session, ShareCalculator,
};

const EPS: f64 = 1e-9;

fn dish(name: &str, price: f64, people: &[&str]) -> DishEntry {
    DishEntry::new(name, price, people.iter().map(|p| p.to_string()).collect())
}

fn names(ledger: &Ledger) -> Vec<String> {
    ledger.entries().iter().map(|e| e.name.clone()).collect()
}

#[test]
fn test_append_remove_identity() {
    let mut ledger = Ledger::new();
    ledger.append(dish("A", 1.0, &["x"]));
    ledger.append(dish("B", 2.0, &["x"]));
    ledger.append(dish("C", 3.0, &["x"]));

    ledger.remove(1).unwrap();
    assert_eq!(names(&ledger), vec!["A", "C"]);

    ledger.remove(1).unwrap();
    assert_eq!(names(&ledger), vec!["A"]);
}

#[test]
fn test_out_of_range_removal() {
    let mut ledger = Ledger::new();
    ledger.append(dish("A", 1.0, &["x"]));
    ledger.append(dish("B", 2.0, &["x"]));

    assert_eq!(
        ledger.remove(5),
        Err(LedgerError::OutOfRange { index: 5, len: 2 })
    );
    assert_eq!(names(&ledger), vec!["A", "B"]);
}

#[test]
fn test_subtotal_is_sum_of_prices_regardless_of_rates() {
    let entries = vec![
        dish("Ramen", 15.5, &["A"]),
        dish("Gyoza", 7.25, &["A", "B"]),
        dish("Tea", 0.0, &[]),
        dish("Mochi", 4.75, &["B", "C", "D"]),
    ];
    let expected: f64 = entries.iter().map(|e| e.price).sum();

    for (tax, tip) in [(0.0, 0.0), (8.875, 18.0), (25.0, 0.0), (0.0, 30.0)] {
        let summary = ShareCalculator::compute(&entries, tax, tip);
        assert!((summary.subtotal - expected).abs() < EPS);
    }
}

#[test]
fn test_split_evenness() {
    let summary = ShareCalculator::compute(&[dish("Platter", 90.0, &["A", "B", "C"])], 0.0, 0.0);
    for person in ["A", "B", "C"] {
        assert!((summary.share_of(person).unwrap() - 30.0).abs() < EPS);
    }
    assert_eq!(format_currency(summary.share_of("A").unwrap()), "$30.00");
}

#[test]
fn test_compounding_order() {
    let summary = ShareCalculator::compute(&[dish("Feast", 100.0, &["A", "B"])], 10.0, 20.0);

    assert!((summary.subtotal - 100.0).abs() < EPS);
    assert!((summary.tax_amount - 10.0).abs() < EPS);
    assert!((summary.taxed_subtotal() - 110.0).abs() < EPS);
    assert!((summary.tip_amount - 22.0).abs() < EPS);
    assert!((summary.grand_total - 132.0).abs() < EPS);
}

#[test]
fn test_per_dish_adjustment_single_participant() {
    let summary = ShareCalculator::compute(&[dish("Steak", 100.0, &["A"])], 10.0, 20.0);

    assert!((summary.share_of("A").unwrap() - 132.0).abs() < EPS);
    assert!(summary.discrepancy().abs() < EPS);
}

#[test]
fn test_shares_diverge_from_grand_total_with_unassigned_dish() {
    let entries = vec![dish("Steak", 100.0, &["A"]), dish("Bread", 10.0, &[])];
    let summary = ShareCalculator::compute(&entries, 10.0, 20.0);

    // Bread is billed (110 * 1.1 * 1.2 = 145.2) but nobody owes it
    assert!((summary.grand_total - 145.2).abs() < EPS);
    assert!((summary.shares_total() - 132.0).abs() < EPS);
    assert!((summary.discrepancy() - 13.2).abs() < EPS);
}

#[test]
fn test_shares_across_uneven_splits() {
    let entries = vec![
        dish("Pizza", 30.0, &["A", "B", "C"]),
        dish("Wine", 40.0, &["A", "B"]),
        dish("Salad", 12.0, &["C"]),
    ];
    let summary = ShareCalculator::compute(&entries, 10.0, 20.0);
    let factor = 1.1 * 1.2;

    assert!((summary.share_of("A").unwrap() - (10.0 + 20.0) * factor).abs() < EPS);
    assert!((summary.share_of("B").unwrap() - (10.0 + 20.0) * factor).abs() < EPS);
    assert!((summary.share_of("C").unwrap() - (10.0 + 12.0) * factor).abs() < EPS);
    assert_eq!(summary.shares.keys().collect::<Vec<_>>(), vec!["A", "B", "C"]);
}

#[test]
fn test_empty_ledger() {
    let summary = ShareCalculator::compute(&[], 8.0, 15.0);

    assert_eq!(summary.subtotal, 0.0);
    assert_eq!(summary.tax_amount, 0.0);
    assert_eq!(summary.tip_amount, 0.0);
    assert_eq!(summary.grand_total, 0.0);
    assert!(summary.shares.is_empty());
}

#[test]
fn test_idempotent_compute() {
    let mut session = Session::new(3);
    for (name, price, names) in [("Pizza", 24.0, "Jason, Celia"), ("Soda", 3.0, "Jason")] {
        session
            .add_dish(&NewEntryForm {
                name: name.to_string(),
                price,
                participants: ParticipantInput::FreeForm {
                    names: names.to_string(),
                },
            })
            .unwrap();
    }

    let first = session.summary(8.0, 15.0).unwrap();
    let second = session.summary(8.0, 15.0).unwrap();
    assert_eq!(first, second);
    assert_eq!(render_summary(&first), render_summary(&second));
}

#[test]
fn test_capture_forms_reduce_to_same_participants() {
    let roster = Roster::new(vec!["Jason".to_string(), "Celia".to_string()]).unwrap();
    let forms = [
        ParticipantInput::FixedCount {
            count: 2,
            names: "Jason, Celia, Mo".to_string(),
        },
        ParticipantInput::FreeForm {
            names: " Jason ,Celia ".to_string(),
        },
        ParticipantInput::Roster {
            selected: vec![bill_splitter::RosterChoice::Everyone],
        },
    ];

    for participants in forms {
        let entry = NewEntryForm {
            name: "Pizza".to_string(),
            price: 24.0,
            participants,
        }
        .validate(2, &roster)
        .unwrap();
        assert_eq!(entry.participants, vec!["Jason", "Celia"]);
    }
}
