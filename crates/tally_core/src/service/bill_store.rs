//! In-memory bill collection and derived obligations.
//!
//! # Responsibility
//! - Own the ordered bill list and every mutation on it.
//! - Derive per-person, per-date owed amounts and the overall total.
//!
//! # Invariants
//! - Bill ids are unique within the collection.
//! - A bill's payers never contain the same name twice.
//! - Derived values are pure functions of the current bills; nothing is
//!   cached between reads.
//! - Missing ids and names are no-ops reported through return values.

use crate::model::bill::{Bill, BillId, Payer};
use crate::model::money::{from_cents, split_cents, to_cents, CentsSum};
use std::collections::BTreeMap;

/// Owed amount per person name, then per ISO date, in currency units.
pub type PayerAmounts = BTreeMap<String, BTreeMap<String, f64>>;

/// Running owed total: exact cents plus any share that had no exact cents.
#[derive(Debug, Clone, Copy, Default)]
struct Owed {
    cents: CentsSum,
    inexact: f64,
}

impl Owed {
    fn add(&mut self, share: Owed) {
        self.cents += share.cents;
        self.inexact += share.inexact;
    }

    fn amount(self) -> f64 {
        from_cents(self.cents) + self.inexact
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillStore {
    bills: Vec<Bill>,
}

impl BillStore {
    pub fn new(bills: Vec<Bill>) -> Self {
        Self { bills }
    }

    pub fn bills(&self) -> &[Bill] {
        &self.bills
    }

    pub fn get(&self, bill_id: BillId) -> Option<&Bill> {
        self.bills.iter().find(|bill| bill.id == bill_id)
    }

    fn get_mut(&mut self, bill_id: BillId) -> Option<&mut Bill> {
        self.bills.iter_mut().find(|bill| bill.id == bill_id)
    }

    /// Returns `candidate` unless an existing bill already uses an id at or
    /// above it, in which case the next free id is returned.
    pub fn next_id(&self, candidate: BillId) -> BillId {
        match self.bills.iter().map(|bill| bill.id).max() {
            Some(max_id) if max_id >= candidate => max_id + 1,
            _ => candidate,
        }
    }

    /// Appends a new payer-less bill and returns its id.
    pub fn add_bill(
        &mut self,
        bill_id: BillId,
        description: impl Into<String>,
        amount: f64,
        date: impl Into<String>,
    ) -> BillId {
        let id = self.next_id(bill_id);
        self.bills.push(Bill::new(id, description, amount, date));
        id
    }

    /// Removes and returns the bill with `bill_id`.
    pub fn remove_bill(&mut self, bill_id: BillId) -> Option<Bill> {
        let index = self.bills.iter().position(|bill| bill.id == bill_id)?;
        Some(self.bills.remove(index))
    }

    /// Returns `true` when the payer was appended.
    pub fn add_payer_to_bill(&mut self, bill_id: BillId, payer_name: &str) -> bool {
        match self.get_mut(bill_id) {
            Some(bill) if !bill.has_payer(payer_name) => {
                bill.payers.push(Payer::new(payer_name));
                true
            }
            _ => false,
        }
    }

    /// Returns `true` when a payer entry was removed.
    pub fn remove_payer_from_bill(&mut self, bill_id: BillId, payer_name: &str) -> bool {
        let Some(bill) = self.get_mut(bill_id) else {
            return false;
        };
        let before = bill.payers.len();
        bill.payers.retain(|payer| payer.name != payer_name);
        bill.payers.len() != before
    }

    /// Removes `payer_name` from every bill; returns how many bills changed.
    pub fn remove_payer_from_all_bills(&mut self, payer_name: &str) -> usize {
        let mut touched = 0;
        for bill in &mut self.bills {
            let before = bill.payers.len();
            bill.payers.retain(|payer| payer.name != payer_name);
            if bill.payers.len() != before {
                touched += 1;
            }
        }
        touched
    }

    /// Flips the legacy per-bill flag; returns the new value.
    pub fn toggle_payer_status(&mut self, bill_id: BillId, payer_name: &str) -> Option<bool> {
        let payer = self
            .get_mut(bill_id)?
            .payers
            .iter_mut()
            .find(|payer| payer.name == payer_name)?;
        payer.paid = !payer.paid;
        Some(payer.paid)
    }

    /// Overwrites description, amount and date; returns the previous bill.
    pub fn update_bill(
        &mut self,
        bill_id: BillId,
        description: impl Into<String>,
        amount: f64,
        date: impl Into<String>,
    ) -> Option<Bill> {
        let bill = self.get_mut(bill_id)?;
        let previous = bill.clone();
        bill.description = description.into();
        bill.amount = amount;
        bill.date = date.into();
        Some(previous)
    }

    /// Empties a bill's payer list; returns the removed payer names.
    pub fn remove_all_payers_from_bill(&mut self, bill_id: BillId) -> Option<Vec<String>> {
        let bill = self.get_mut(bill_id)?;
        let names = bill.payer_names();
        bill.payers.clear();
        Some(names)
    }

    /// Drops every bill and returns them.
    pub fn clear_all_bills(&mut self) -> Vec<Bill> {
        std::mem::take(&mut self.bills)
    }

    /// Sums each payer's share of every bill, grouped by bill date.
    ///
    /// A bill without payers contributes nothing. Shares are split in whole
    /// cents so the shares of one bill always add up to its amount; sums are
    /// widened to `i128` so no number of bills can overflow them. A bill
    /// whose amount has no exact cents (only possible for records built
    /// outside the ledger's validation) is split by plain division.
    pub fn payer_amounts(&self) -> PayerAmounts {
        let mut owed: BTreeMap<&str, BTreeMap<&str, Owed>> = BTreeMap::new();

        for bill in &self.bills {
            if bill.payers.is_empty() {
                continue;
            }
            let shares: Vec<Owed> = match to_cents(bill.amount) {
                Ok(cents) => split_cents(cents, bill.payers.len())
                    .into_iter()
                    .map(|share| Owed {
                        cents: CentsSum::from(share),
                        inexact: 0.0,
                    })
                    .collect(),
                Err(_) => {
                    let share = bill.amount / bill.payers.len() as f64;
                    vec![
                        Owed {
                            cents: 0,
                            inexact: share,
                        };
                        bill.payers.len()
                    ]
                }
            };

            for (payer, share) in bill.payers.iter().zip(shares) {
                owed.entry(payer.name.as_str())
                    .or_default()
                    .entry(bill.date.as_str())
                    .or_default()
                    .add(share);
            }
        }

        owed.into_iter()
            .map(|(name, by_date)| {
                let by_date = by_date
                    .into_iter()
                    .map(|(date, total)| (date.to_string(), total.amount()))
                    .collect();
                (name.to_string(), by_date)
            })
            .collect()
    }

    /// Sum of all bill amounts, as stored.
    pub fn total_amount(&self) -> f64 {
        self.bills.iter().map(|bill| bill.amount).sum()
    }

    /// Dates on which `payer_name` is a payer of at least one bill.
    pub fn owed_dates(&self, payer_name: &str) -> Vec<String> {
        let mut dates: Vec<String> = self
            .bills
            .iter()
            .filter(|bill| bill.has_payer(payer_name))
            .map(|bill| bill.date.clone())
            .collect();
        dates.sort();
        dates.dedup();
        dates
    }
}
