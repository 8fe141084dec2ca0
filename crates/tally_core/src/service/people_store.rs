//! In-memory roster and paid-status reconciliation.
//!
//! # Responsibility
//! - Own the ordered list of people and their per-date paid flags.
//! - Recompute each person's overall `paid` summary against derived
//!   obligations handed in by the caller.
//!
//! # Invariants
//! - Names are unique (exact, case-sensitive match).
//! - `Person::paid` changes only through `update_overall_paid_status`.
//! - Per-date flags for dates a person owes nothing on are kept but do not
//!   influence the summary.

use crate::model::person::Person;
use crate::service::bill_store::PayerAmounts;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeopleStore {
    people: Vec<Person>,
}

impl PeopleStore {
    pub fn new(people: Vec<Person>) -> Self {
        Self { people }
    }

    /// Public view of the roster with each person's status.
    pub fn list_with_status(&self) -> &[Person] {
        &self.people
    }

    pub fn get(&self, name: &str) -> Option<&Person> {
        self.people.iter().find(|person| person.name == name)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Person> {
        self.people.iter_mut().find(|person| person.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.people.iter().position(|person| person.name == name)
    }

    /// Inserts an unpaid person; returns `false` for a duplicate name.
    pub fn add(&mut self, name: &str) -> bool {
        if self.get(name).is_some() {
            return false;
        }
        self.people.push(Person::new(name));
        true
    }

    /// Removes the person at `index`; out-of-range indexes are a no-op.
    pub fn remove(&mut self, index: usize) -> Option<Person> {
        if index >= self.people.len() {
            return None;
        }
        Some(self.people.remove(index))
    }

    /// Flips the flag for `date` and returns its new value.
    pub fn toggle_paid_status(
        &mut self,
        name: &str,
        date: &str,
        amounts: &PayerAmounts,
    ) -> Option<bool> {
        let person = self.get_mut(name)?;
        let flag = person.dates.entry(date.to_string()).or_insert(false);
        *flag = !*flag;
        let value = *flag;
        update_overall_paid_status(person, amounts);
        Some(value)
    }

    /// Force-sets the flag for `date` on every listed person.
    ///
    /// Unknown names are skipped. Returns how many people were updated.
    pub fn reset_paid_status(
        &mut self,
        names: &[String],
        date: &str,
        value: bool,
        amounts: &PayerAmounts,
    ) -> usize {
        let mut updated = 0;
        for name in names {
            if let Some(person) = self.get_mut(name) {
                person.dates.insert(date.to_string(), value);
                update_overall_paid_status(person, amounts);
                updated += 1;
            }
        }
        updated
    }

    pub fn get_paid_status_by_date(&self, name: &str, date: &str) -> bool {
        self.get(name).is_some_and(|person| person.paid_on(date))
    }

    /// Recomputes the summary flag of the listed people after their
    /// obligations changed. Returns `true` if any summary flipped.
    pub fn reconcile(&mut self, names: &[String], amounts: &PayerAmounts) -> bool {
        let mut changed = false;
        for name in names {
            if let Some(person) = self.get_mut(name) {
                let before = person.paid;
                update_overall_paid_status(person, amounts);
                changed |= person.paid != before;
            }
        }
        changed
    }
}

/// `paid` holds iff every date with a derived obligation is flagged paid.
fn update_overall_paid_status(person: &mut Person, amounts: &PayerAmounts) {
    let paid = match amounts.get(&person.name) {
        Some(by_date) => by_date.keys().all(|date| person.paid_on(date)),
        None => true,
    };
    person.paid = paid;
}

#[cfg(test)]
mod tests {
    use super::PeopleStore;
    use crate::service::bill_store::PayerAmounts;
    use std::collections::BTreeMap;

    fn owes(entries: &[(&str, &str, f64)]) -> PayerAmounts {
        let mut amounts = PayerAmounts::new();
        for (name, date, amount) in entries {
            amounts
                .entry(name.to_string())
                .or_insert_with(BTreeMap::new)
                .insert(date.to_string(), *amount);
        }
        amounts
    }

    #[test]
    fn add_rejects_exact_duplicates_only() {
        let mut store = PeopleStore::default();
        assert!(store.add("Alice"));
        assert!(!store.add("Alice"));
        assert!(store.add("alice"));
        assert_eq!(store.list_with_status().len(), 2);
    }

    #[test]
    fn remove_out_of_range_is_noop() {
        let mut store = PeopleStore::default();
        store.add("Alice");
        assert!(store.remove(3).is_none());
        assert_eq!(store.list_with_status().len(), 1);
        assert_eq!(store.remove(0).unwrap().name, "Alice");
    }

    #[test]
    fn toggle_marks_paid_once_every_owed_date_is_flagged() {
        let mut store = PeopleStore::default();
        store.add("Alice");
        let amounts = owes(&[("Alice", "2024-01-01", 50.0), ("Alice", "2024-01-02", 5.0)]);

        assert_eq!(
            store.toggle_paid_status("Alice", "2024-01-01", &amounts),
            Some(true)
        );
        assert!(!store.get("Alice").unwrap().paid);

        store.toggle_paid_status("Alice", "2024-01-02", &amounts);
        assert!(store.get("Alice").unwrap().paid);

        assert_eq!(
            store.toggle_paid_status("Alice", "2024-01-02", &amounts),
            Some(false)
        );
        assert!(!store.get("Alice").unwrap().paid);
    }

    #[test]
    fn flags_on_dates_without_obligation_are_kept_but_ignored() {
        let mut store = PeopleStore::default();
        store.add("Bob");
        let amounts = owes(&[("Bob", "2024-01-01", 10.0)]);

        store.toggle_paid_status("Bob", "2023-12-31", &amounts);
        let bob = store.get("Bob").unwrap();
        assert!(!bob.paid);
        assert_eq!(bob.dates.get("2023-12-31"), Some(&true));
    }

    #[test]
    fn person_owing_nothing_is_paid_after_recompute() {
        let mut store = PeopleStore::default();
        store.add("Carol");
        store.reset_paid_status(&["Carol".to_string()], "2024-01-01", false, &PayerAmounts::new());
        assert!(store.get("Carol").unwrap().paid);
    }

    #[test]
    fn reset_skips_unknown_names() {
        let mut store = PeopleStore::default();
        store.add("Alice");
        let names = vec!["Alice".to_string(), "Ghost".to_string()];
        assert_eq!(
            store.reset_paid_status(&names, "2024-01-01", true, &PayerAmounts::new()),
            1
        );
        assert!(store.get_paid_status_by_date("Alice", "2024-01-01"));
        assert!(!store.get_paid_status_by_date("Ghost", "2024-01-01"));
    }

    #[test]
    fn reconcile_reports_flipped_summaries() {
        let mut store = PeopleStore::default();
        store.add("Alice");
        let names = vec!["Alice".to_string()];
        assert!(store.reconcile(&names, &PayerAmounts::new()));
        assert!(!store.reconcile(&names, &PayerAmounts::new()));

        let amounts = owes(&[("Alice", "2024-05-05", 3.0)]);
        assert!(store.reconcile(&names, &amounts));
        assert!(!store.get("Alice").unwrap().paid);
    }
}
