use tally_core::db::open_db_in_memory;
use tally_core::{BillValidationError, LedgerError, LedgerService, SqliteKvRepository};

const DAY: &str = "2024-01-01";

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn dinner_split_between_two_payers() {
    let conn = open_db_in_memory().unwrap();
    let mut ledger = LedgerService::open(SqliteKvRepository::new(&conn)).unwrap();

    let id = ledger.add_bill("Dinner", 100.0, Some(DAY)).unwrap();
    assert!(ledger.add_payer_to_bill(id, "Alice").unwrap());
    assert!(ledger.add_payer_to_bill(id, "Bob").unwrap());

    let amounts = ledger.payer_amounts();
    assert_eq!(amounts.len(), 2);
    assert_eq!(amounts["Alice"][DAY], 50.0);
    assert_eq!(amounts["Bob"][DAY], 50.0);
    assert_eq!(ledger.total_amount(), 100.0);
}

#[test]
fn toggling_the_only_owed_date_marks_person_paid() {
    let conn = open_db_in_memory().unwrap();
    let mut ledger = LedgerService::open(SqliteKvRepository::new(&conn)).unwrap();
    ledger.add_person("Alice").unwrap();
    ledger.add_person("Bob").unwrap();
    let id = ledger.add_bill("Dinner", 100.0, Some(DAY)).unwrap();
    ledger.add_payer_to_bill(id, "Alice").unwrap();
    ledger.add_payer_to_bill(id, "Bob").unwrap();

    assert_eq!(ledger.toggle_paid_status("Alice", DAY).unwrap(), Some(true));

    assert!(ledger.person("Alice").unwrap().paid);
    assert!(!ledger.person("Bob").unwrap().paid);
    assert!(ledger.get_paid_status_by_date("Alice", DAY));
    assert!(!ledger.get_paid_status_by_date("Bob", DAY));
}

#[test]
fn removing_bill_resets_payers_and_clears_obligations() {
    let conn = open_db_in_memory().unwrap();
    let mut ledger = LedgerService::open(SqliteKvRepository::new(&conn)).unwrap();
    ledger.add_person("Alice").unwrap();
    ledger.add_person("Bob").unwrap();
    let id = ledger.add_bill("Dinner", 100.0, Some(DAY)).unwrap();
    ledger.add_payer_to_bill(id, "Alice").unwrap();
    ledger.add_payer_to_bill(id, "Bob").unwrap();
    ledger.toggle_paid_status("Alice", DAY).unwrap();

    let removed = ledger.remove_bill(id).unwrap().expect("bill should exist");
    assert_eq!(removed.id, id);

    assert!(ledger.payer_amounts().is_empty());
    let alice = ledger.person("Alice").unwrap();
    assert_eq!(alice.dates.get(DAY), Some(&false));
    assert!(alice.paid, "owing nothing is vacuously paid");
    let bob = ledger.person("Bob").unwrap();
    assert_eq!(bob.dates.get(DAY), Some(&false));
    assert!(bob.paid);
}

#[test]
fn removing_person_drops_them_from_every_bill() {
    let conn = open_db_in_memory().unwrap();
    let mut ledger = LedgerService::open(SqliteKvRepository::new(&conn)).unwrap();
    ledger.add_person("Alice").unwrap();
    ledger.add_person("Carol").unwrap();
    let first = ledger.add_bill("Dinner", 90.0, Some(DAY)).unwrap();
    let second = ledger.add_bill("Taxi", 12.0, Some("2024-01-02")).unwrap();
    for bill_id in [first, second] {
        ledger.add_payer_to_bill(bill_id, "Alice").unwrap();
        ledger.add_payer_to_bill(bill_id, "Carol").unwrap();
    }

    let index = ledger
        .list_with_status()
        .iter()
        .position(|person| person.name == "Carol")
        .unwrap();
    let removed = ledger.remove_person(index).unwrap().unwrap();
    assert_eq!(removed.name, "Carol");

    for bill_id in [first, second] {
        assert!(!ledger.bill(bill_id).unwrap().has_payer("Carol"));
        assert!(ledger.bill(bill_id).unwrap().has_payer("Alice"));
    }
    assert!(!ledger.payer_amounts().contains_key("Carol"));
    assert_eq!(ledger.payer_amounts()["Alice"][DAY], 90.0);

    assert_eq!(ledger.remove_payer_from_all_bills("Carol").unwrap(), 0);
}

#[test]
fn remove_person_out_of_range_is_noop() {
    let conn = open_db_in_memory().unwrap();
    let mut ledger = LedgerService::open(SqliteKvRepository::new(&conn)).unwrap();
    ledger.add_person("Alice").unwrap();

    assert!(ledger.remove_person(5).unwrap().is_none());
    assert_eq!(ledger.list_with_status().len(), 1);
}

#[test]
fn remove_person_by_name_matches_exactly() {
    let conn = open_db_in_memory().unwrap();
    let mut ledger = LedgerService::open(SqliteKvRepository::new(&conn)).unwrap();
    ledger.add_person("Alice").unwrap();

    assert!(ledger.remove_person_by_name("alice").unwrap().is_none());
    assert!(ledger.remove_person_by_name("Alice").unwrap().is_some());
    assert!(ledger.list_with_status().is_empty());
}

#[test]
fn duplicates_leave_collections_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let mut ledger = LedgerService::open(SqliteKvRepository::new(&conn)).unwrap();

    assert!(ledger.add_person("Alice").unwrap());
    assert!(!ledger.add_person("Alice").unwrap());
    assert_eq!(ledger.list_with_status().len(), 1);

    let id = ledger.add_bill("Dinner", 10.0, Some(DAY)).unwrap();
    assert!(ledger.add_payer_to_bill(id, "Alice").unwrap());
    assert!(!ledger.add_payer_to_bill(id, "Alice").unwrap());
    assert_eq!(ledger.bill(id).unwrap().payers.len(), 1);
}

#[test]
fn missing_targets_are_silent_noops() {
    let conn = open_db_in_memory().unwrap();
    let mut ledger = LedgerService::open(SqliteKvRepository::new(&conn)).unwrap();

    assert!(ledger.remove_bill(404).unwrap().is_none());
    assert!(!ledger.add_payer_to_bill(404, "Alice").unwrap());
    assert!(!ledger.remove_payer_from_bill(404, "Alice").unwrap());
    assert_eq!(ledger.toggle_payer_status(404, "Alice").unwrap(), None);
    assert!(!ledger.update_bill(404, "x", 1.0, DAY).unwrap());
    assert!(!ledger.remove_all_payers_from_bill(404).unwrap());
    assert_eq!(ledger.toggle_paid_status("Ghost", DAY).unwrap(), None);
    assert_eq!(ledger.reset_paid_status(&names(&["Ghost"]), DAY, true).unwrap(), 0);
    assert!(!ledger.get_paid_status_by_date("Ghost", DAY));
}

#[test]
fn adding_a_payer_on_an_unpaid_date_clears_paid_summary() {
    let conn = open_db_in_memory().unwrap();
    let mut ledger = LedgerService::open(SqliteKvRepository::new(&conn)).unwrap();
    ledger.add_person("Alice").unwrap();
    let dinner = ledger.add_bill("Dinner", 40.0, Some(DAY)).unwrap();
    ledger.add_payer_to_bill(dinner, "Alice").unwrap();
    ledger.toggle_paid_status("Alice", DAY).unwrap();
    assert!(ledger.person("Alice").unwrap().paid);

    let lunch = ledger.add_bill("Lunch", 15.0, Some("2024-01-03")).unwrap();
    ledger.add_payer_to_bill(lunch, "Alice").unwrap();
    assert!(!ledger.person("Alice").unwrap().paid);

    ledger.remove_payer_from_bill(lunch, "Alice").unwrap();
    assert!(ledger.person("Alice").unwrap().paid);
}

#[test]
fn moving_a_bill_to_a_new_date_reconciles_payers() {
    let conn = open_db_in_memory().unwrap();
    let mut ledger = LedgerService::open(SqliteKvRepository::new(&conn)).unwrap();
    ledger.add_person("Alice").unwrap();
    let id = ledger.add_bill("Dinner", 40.0, Some(DAY)).unwrap();
    ledger.add_payer_to_bill(id, "Alice").unwrap();
    ledger.toggle_paid_status("Alice", DAY).unwrap();
    assert!(ledger.person("Alice").unwrap().paid);

    assert!(ledger.update_bill(id, "Late dinner", 44.0, "2024-01-02").unwrap());

    assert!(!ledger.person("Alice").unwrap().paid);
    assert_eq!(ledger.payer_amounts()["Alice"]["2024-01-02"], 44.0);
    assert!(ledger.get_paid_status_by_date("Alice", DAY));
}

#[test]
fn paid_summary_ignores_flags_on_dates_without_obligation() {
    let conn = open_db_in_memory().unwrap();
    let mut ledger = LedgerService::open(SqliteKvRepository::new(&conn)).unwrap();
    ledger.add_person("Alice").unwrap();
    let id = ledger.add_bill("Dinner", 40.0, Some(DAY)).unwrap();
    ledger.add_payer_to_bill(id, "Alice").unwrap();

    ledger
        .reset_paid_status(&names(&["Alice"]), "2023-12-25", true)
        .unwrap();
    let alice = ledger.person("Alice").unwrap();
    assert!(!alice.paid);
    assert_eq!(alice.dates.get("2023-12-25"), Some(&true));
}

#[test]
fn clearing_bills_makes_everyone_vacuously_paid() {
    let conn = open_db_in_memory().unwrap();
    let mut ledger = LedgerService::open(SqliteKvRepository::new(&conn)).unwrap();
    ledger.add_person("Alice").unwrap();
    ledger.add_person("Bob").unwrap();
    let id = ledger.add_bill("Dinner", 40.0, Some(DAY)).unwrap();
    ledger.add_payer_to_bill(id, "Alice").unwrap();
    ledger.add_payer_to_bill(id, "Bob").unwrap();

    assert_eq!(ledger.clear_all_bills().unwrap(), 1);

    assert!(ledger.bills().is_empty());
    assert_eq!(ledger.total_amount(), 0.0);
    assert!(ledger.person("Alice").unwrap().paid);
    assert!(ledger.person("Bob").unwrap().paid);
}

#[test]
fn remove_all_payers_keeps_the_bill() {
    let conn = open_db_in_memory().unwrap();
    let mut ledger = LedgerService::open(SqliteKvRepository::new(&conn)).unwrap();
    let id = ledger.add_bill("Dinner", 40.0, Some(DAY)).unwrap();
    ledger.add_payer_to_bill(id, "Alice").unwrap();
    ledger.add_payer_to_bill(id, "Bob").unwrap();

    assert!(ledger.remove_all_payers_from_bill(id).unwrap());
    assert!(ledger.bill(id).unwrap().payers.is_empty());
    assert!(ledger.payer_amounts().is_empty());
    assert_eq!(ledger.total_amount(), 40.0);
}

#[test]
fn legacy_payer_flag_is_independent_of_dates() {
    let conn = open_db_in_memory().unwrap();
    let mut ledger = LedgerService::open(SqliteKvRepository::new(&conn)).unwrap();
    ledger.add_person("Alice").unwrap();
    let id = ledger.add_bill("Dinner", 40.0, Some(DAY)).unwrap();
    ledger.add_payer_to_bill(id, "Alice").unwrap();

    assert_eq!(ledger.toggle_payer_status(id, "Alice").unwrap(), Some(true));
    assert!(ledger.bill(id).unwrap().payers[0].paid);
    assert!(!ledger.get_paid_status_by_date("Alice", DAY));
}

#[test]
fn three_way_split_recovers_the_bill_amount() {
    let conn = open_db_in_memory().unwrap();
    let mut ledger = LedgerService::open(SqliteKvRepository::new(&conn)).unwrap();
    let id = ledger.add_bill("Groceries", 100.0, Some(DAY)).unwrap();
    for name in ["Alice", "Bob", "Carol"] {
        ledger.add_payer_to_bill(id, name).unwrap();
    }

    let total: f64 = ledger
        .payer_amounts()
        .values()
        .map(|by_date| by_date[DAY])
        .sum();
    assert!((total - 100.0).abs() < 1e-9);
}

#[test]
fn snapshot_reflects_current_state() {
    let conn = open_db_in_memory().unwrap();
    let mut ledger = LedgerService::open(SqliteKvRepository::new(&conn)).unwrap();
    ledger.add_person("Alice").unwrap();
    let id = ledger.add_bill("Dinner", 25.0, Some(DAY)).unwrap();
    ledger.add_payer_to_bill(id, "Alice").unwrap();

    let snapshot = ledger.snapshot();
    assert_eq!(snapshot.people.len(), 1);
    assert_eq!(snapshot.bills.len(), 1);
    assert_eq!(snapshot.payer_amounts["Alice"][DAY], 25.0);
    assert_eq!(snapshot.total_amount, 25.0);
    assert_eq!(ledger.owed_dates("Alice"), vec![DAY.to_string()]);
}

#[test]
fn amounts_beyond_exact_cents_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let mut ledger = LedgerService::open(SqliteKvRepository::new(&conn)).unwrap();

    let err = ledger.add_bill("Big", 1e17, Some(DAY)).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::InvalidBill(BillValidationError::AmountOutOfRange(_))
    ));
    let err = ledger.add_bill("Fee", 0.004, Some(DAY)).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::InvalidBill(BillValidationError::AmountNotWholeCents(_))
    ));
    assert!(ledger.bills().is_empty());

    let id = ledger.add_bill("Dinner", 60_000_000_000_000.0, Some(DAY)).unwrap();
    ledger.add_bill("Dinner", 60_000_000_000_000.0, Some(DAY)).unwrap();
    assert_eq!(ledger.total_amount(), 120_000_000_000_000.0);

    let err = ledger.update_bill(id, "Dinner", 6e16, DAY).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::InvalidBill(BillValidationError::AmountOutOfRange(_))
    ));
    assert_eq!(ledger.bill(id).unwrap().amount, 60_000_000_000_000.0);
}

#[test]
fn amount_only_update_keeps_paid_summary() {
    let conn = open_db_in_memory().unwrap();
    let mut ledger = LedgerService::open(SqliteKvRepository::new(&conn)).unwrap();
    ledger.add_person("Alice").unwrap();
    let id = ledger.add_bill("Dinner", 40.0, Some(DAY)).unwrap();
    ledger.add_payer_to_bill(id, "Alice").unwrap();
    ledger.toggle_paid_status("Alice", DAY).unwrap();
    assert!(ledger.person("Alice").unwrap().paid);

    assert!(ledger.update_bill(id, "Dinner and drinks", 75.5, DAY).unwrap());
    assert!(ledger.person("Alice").unwrap().paid);
    assert_eq!(ledger.payer_amounts()["Alice"][DAY], 75.5);

    assert!(ledger.update_bill(id, "Free dinner", 0.0, DAY).unwrap());
    assert!(ledger.person("Alice").unwrap().paid);
    assert_eq!(ledger.payer_amounts()["Alice"][DAY], 0.0);
}
