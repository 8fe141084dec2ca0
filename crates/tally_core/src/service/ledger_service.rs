//! Ledger use-case service.
//!
//! # Responsibility
//! - Own the bill and people collections together with their storage.
//! - Persist every mutated collection in full after each mutation.
//! - Keep references consistent across collections:
//!   removing a bill un-marks its payers for that date, removing a person
//!   drops them from every bill, and any change to who owes what on which
//!   date re-derives the affected people's overall `paid` flag.
//!
//! # Invariants
//! - Not-found and duplicate inputs are `Ok` no-ops; nothing is persisted.
//! - A storage failure leaves the in-memory mutation applied and is
//!   returned to the caller as `LedgerError::Storage`.
//! - Log lines carry ids, dates and counts only, never names or
//!   descriptions.

use crate::config::LedgerConfig;
use crate::model::bill::{
    validate_amount, validate_date, Bill, BillId, BillValidationError, DATE_FORMAT,
};
use crate::model::person::Person;
use crate::repo::collection::{load_collection, save_collection};
use crate::repo::kv_repo::{KvRepository, StorageError, StorageResult};
use crate::service::bill_store::{BillStore, PayerAmounts};
use crate::service::people_store::PeopleStore;
use chrono::{Local, Utc};
use log::{debug, error, info};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors from ledger operations.
#[derive(Debug)]
pub enum LedgerError {
    /// Bill input cannot be stored.
    InvalidBill(BillValidationError),
    /// Storage keys are unusable.
    InvalidConfig(String),
    /// Loading or persisting a collection failed.
    Storage(StorageError),
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBill(err) => write!(f, "{err}"),
            Self::InvalidConfig(message) => write!(f, "invalid ledger config: {message}"),
            Self::Storage(err) => write!(f, "ledger storage failed: {err}"),
        }
    }
}

impl Error for LedgerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidBill(err) => Some(err),
            Self::InvalidConfig(_) => None,
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<BillValidationError> for LedgerError {
    fn from(value: BillValidationError) -> Self {
        Self::InvalidBill(value)
    }
}

impl From<StorageError> for LedgerError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Read projection of the whole ledger for display layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerSnapshot {
    pub people: Vec<Person>,
    pub bills: Vec<Bill>,
    pub payer_amounts: PayerAmounts,
    pub total_amount: f64,
}

/// Which collections a mutation touched.
#[derive(Debug, Clone, Copy)]
struct Dirty {
    bills: bool,
    people: bool,
}

/// Single owner of both ledger collections.
pub struct LedgerService<R: KvRepository> {
    repo: R,
    config: LedgerConfig,
    bills: BillStore,
    people: PeopleStore,
}

impl<R: KvRepository> LedgerService<R> {
    /// Loads both collections using the default storage keys.
    pub fn open(repo: R) -> LedgerResult<Self> {
        Self::open_with_config(repo, LedgerConfig::default())
    }

    /// Loads both collections under the configured storage keys.
    ///
    /// # Errors
    /// - `InvalidConfig` when the keys are blank or shared.
    /// - `Storage(Malformed)` when a stored collection is not valid JSON.
    /// - `Storage(InvalidRecord)` when a stored bill fails validation.
    pub fn open_with_config(repo: R, config: LedgerConfig) -> LedgerResult<Self> {
        config.validate().map_err(LedgerError::InvalidConfig)?;

        let bills: Vec<Bill> = load_collection(&repo, &config.bills_key).map_err(|err| {
            error!("event=ledger_load module=ledger status=error collection=bills error={err}");
            err
        })?;
        if let Some((bill_id, source)) = bills
            .iter()
            .find_map(|bill| bill.validate().err().map(|err| (bill.id, err)))
        {
            error!(
                "event=ledger_load module=ledger status=error collection=bills bill_id={bill_id} error={source}"
            );
            return Err(StorageError::InvalidRecord {
                key: config.bills_key.clone(),
                bill_id,
                source,
            }
            .into());
        }
        let people: Vec<Person> = load_collection(&repo, &config.people_key).map_err(|err| {
            error!("event=ledger_load module=ledger status=error collection=people error={err}");
            err
        })?;

        info!(
            "event=ledger_load module=ledger status=ok bills={} people={}",
            bills.len(),
            people.len()
        );

        Ok(Self {
            repo,
            config,
            bills: BillStore::new(bills),
            people: PeopleStore::new(people),
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn bills(&self) -> &[Bill] {
        self.bills.bills()
    }

    pub fn bill(&self, bill_id: BillId) -> Option<&Bill> {
        self.bills.get(bill_id)
    }

    pub fn list_with_status(&self) -> &[Person] {
        self.people.list_with_status()
    }

    pub fn person(&self, name: &str) -> Option<&Person> {
        self.people.get(name)
    }

    /// Owed amount per person per date, derived from the current bills.
    pub fn payer_amounts(&self) -> PayerAmounts {
        self.bills.payer_amounts()
    }

    pub fn total_amount(&self) -> f64 {
        self.bills.total_amount()
    }

    pub fn get_paid_status_by_date(&self, name: &str, date: &str) -> bool {
        self.people.get_paid_status_by_date(name, date)
    }

    pub fn owed_dates(&self, name: &str) -> Vec<String> {
        self.bills.owed_dates(name)
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            people: self.people.list_with_status().to_vec(),
            bills: self.bills.bills().to_vec(),
            payer_amounts: self.bills.payer_amounts(),
            total_amount: self.bills.total_amount(),
        }
    }

    /// Appends a bill dated `date`, or today when `None`.
    ///
    /// The id is derived from the creation time and is unique within the
    /// ledger.
    pub fn add_bill(
        &mut self,
        description: impl Into<String>,
        amount: f64,
        date: Option<&str>,
    ) -> LedgerResult<BillId> {
        let date = date.map_or_else(today, str::to_string);
        validate_amount(amount)?;
        validate_date(&date)?;

        let bill_id = self
            .bills
            .add_bill(Utc::now().timestamp_millis(), description, amount, date.as_str());
        info!("event=bill_add module=ledger status=ok bill_id={bill_id} date={date}");

        self.persist_dirty(Dirty {
            bills: true,
            people: false,
        })?;
        Ok(bill_id)
    }

    /// Removes a bill and resets its payers' flag for the bill's date.
    pub fn remove_bill(&mut self, bill_id: BillId) -> LedgerResult<Option<Bill>> {
        let Some(bill) = self.bills.remove_bill(bill_id) else {
            debug!("event=bill_remove module=ledger status=noop bill_id={bill_id}");
            return Ok(None);
        };

        let payers = bill.payer_names();
        let amounts = self.bills.payer_amounts();
        let reset = self
            .people
            .reset_paid_status(&payers, &bill.date, false, &amounts);
        info!(
            "event=bill_remove module=ledger status=ok bill_id={bill_id} date={} payers_reset={reset}",
            bill.date
        );

        self.persist_dirty(Dirty {
            bills: true,
            people: reset > 0,
        })?;
        Ok(Some(bill))
    }

    /// Adds `payer_name` to a bill; `false` when the bill is missing or the
    /// payer is already present.
    pub fn add_payer_to_bill(&mut self, bill_id: BillId, payer_name: &str) -> LedgerResult<bool> {
        if !self.bills.add_payer_to_bill(bill_id, payer_name) {
            debug!("event=payer_add module=ledger status=noop bill_id={bill_id}");
            return Ok(false);
        }
        info!("event=payer_add module=ledger status=ok bill_id={bill_id}");

        let people = self.reconcile(&[payer_name.to_string()]);
        self.persist_dirty(Dirty {
            bills: true,
            people,
        })?;
        Ok(true)
    }

    pub fn remove_payer_from_bill(
        &mut self,
        bill_id: BillId,
        payer_name: &str,
    ) -> LedgerResult<bool> {
        if !self.bills.remove_payer_from_bill(bill_id, payer_name) {
            debug!("event=payer_remove module=ledger status=noop bill_id={bill_id}");
            return Ok(false);
        }
        info!("event=payer_remove module=ledger status=ok bill_id={bill_id}");

        let people = self.reconcile(&[payer_name.to_string()]);
        self.persist_dirty(Dirty {
            bills: true,
            people,
        })?;
        Ok(true)
    }

    /// Drops `payer_name` from every bill; returns how many bills changed.
    pub fn remove_payer_from_all_bills(&mut self, payer_name: &str) -> LedgerResult<usize> {
        let touched = self.bills.remove_payer_from_all_bills(payer_name);
        if touched == 0 {
            debug!("event=payer_remove_all module=ledger status=noop");
            return Ok(0);
        }
        info!("event=payer_remove_all module=ledger status=ok bills={touched}");

        let people = self.reconcile(&[payer_name.to_string()]);
        self.persist_dirty(Dirty {
            bills: true,
            people,
        })?;
        Ok(touched)
    }

    /// Flips the legacy per-bill paid flag. Does not affect `Person::dates`.
    pub fn toggle_payer_status(
        &mut self,
        bill_id: BillId,
        payer_name: &str,
    ) -> LedgerResult<Option<bool>> {
        let Some(paid) = self.bills.toggle_payer_status(bill_id, payer_name) else {
            debug!("event=payer_toggle module=ledger status=noop bill_id={bill_id}");
            return Ok(None);
        };
        info!("event=payer_toggle module=ledger status=ok bill_id={bill_id} paid={paid}");

        self.persist_dirty(Dirty {
            bills: true,
            people: false,
        })?;
        Ok(Some(paid))
    }

    /// Overwrites description, amount and date of an existing bill.
    pub fn update_bill(
        &mut self,
        bill_id: BillId,
        description: impl Into<String>,
        amount: f64,
        date: &str,
    ) -> LedgerResult<bool> {
        validate_amount(amount)?;
        validate_date(date)?;

        let Some(previous) = self.bills.update_bill(bill_id, description, amount, date) else {
            debug!("event=bill_update module=ledger status=noop bill_id={bill_id}");
            return Ok(false);
        };
        info!("event=bill_update module=ledger status=ok bill_id={bill_id} date={date}");

        // A zero amount still leaves an obligation date, so only a date move
        // can change which dates the payers owe on.
        let people = if previous.date != date {
            self.reconcile(&previous.payer_names())
        } else {
            false
        };
        self.persist_dirty(Dirty {
            bills: true,
            people,
        })?;
        Ok(true)
    }

    pub fn remove_all_payers_from_bill(&mut self, bill_id: BillId) -> LedgerResult<bool> {
        let Some(former) = self.bills.remove_all_payers_from_bill(bill_id) else {
            debug!("event=payer_clear module=ledger status=noop bill_id={bill_id}");
            return Ok(false);
        };
        info!(
            "event=payer_clear module=ledger status=ok bill_id={bill_id} payers={}",
            former.len()
        );

        let people = self.reconcile(&former);
        self.persist_dirty(Dirty {
            bills: true,
            people,
        })?;
        Ok(true)
    }

    /// Removes every bill; returns how many were dropped.
    pub fn clear_all_bills(&mut self) -> LedgerResult<usize> {
        let removed = self.bills.clear_all_bills();
        info!(
            "event=bill_clear module=ledger status=ok bills={}",
            removed.len()
        );

        let mut former: Vec<String> = removed.iter().flat_map(Bill::payer_names).collect();
        former.sort();
        former.dedup();
        let people = self.reconcile(&former);
        self.persist_dirty(Dirty {
            bills: true,
            people,
        })?;
        Ok(removed.len())
    }

    /// Adds a person; `false` when the exact name already exists.
    pub fn add_person(&mut self, name: &str) -> LedgerResult<bool> {
        if !self.people.add(name) {
            debug!("event=person_add module=ledger status=noop");
            return Ok(false);
        }
        info!(
            "event=person_add module=ledger status=ok people={}",
            self.people.list_with_status().len()
        );

        self.persist_dirty(Dirty {
            bills: false,
            people: true,
        })?;
        Ok(true)
    }

    /// Removes the person at `index` and drops them from every bill.
    ///
    /// An out-of-range `index` is a no-op returning `Ok(None)`.
    pub fn remove_person(&mut self, index: usize) -> LedgerResult<Option<Person>> {
        let Some(person) = self.people.remove(index) else {
            debug!("event=person_remove module=ledger status=noop index={index}");
            return Ok(None);
        };

        let touched = self.bills.remove_payer_from_all_bills(&person.name);
        info!("event=person_remove module=ledger status=ok index={index} bills={touched}");

        self.persist_dirty(Dirty {
            bills: touched > 0,
            people: true,
        })?;
        Ok(Some(person))
    }

    /// Name-addressed variant of `remove_person`.
    pub fn remove_person_by_name(&mut self, name: &str) -> LedgerResult<Option<Person>> {
        match self.people.position(name) {
            Some(index) => self.remove_person(index),
            None => {
                debug!("event=person_remove module=ledger status=noop");
                Ok(None)
            }
        }
    }

    /// Flips `name`'s flag for `date`; returns the new flag.
    pub fn toggle_paid_status(&mut self, name: &str, date: &str) -> LedgerResult<Option<bool>> {
        let amounts = self.bills.payer_amounts();
        let Some(paid) = self.people.toggle_paid_status(name, date, &amounts) else {
            debug!("event=paid_toggle module=ledger status=noop date={date}");
            return Ok(None);
        };
        info!("event=paid_toggle module=ledger status=ok date={date} paid={paid}");

        self.persist_dirty(Dirty {
            bills: false,
            people: true,
        })?;
        Ok(Some(paid))
    }

    /// Force-sets the flag for `date` on each named person.
    pub fn reset_paid_status(
        &mut self,
        names: &[String],
        date: &str,
        value: bool,
    ) -> LedgerResult<usize> {
        let amounts = self.bills.payer_amounts();
        let updated = self.people.reset_paid_status(names, date, value, &amounts);
        if updated == 0 {
            debug!("event=paid_reset module=ledger status=noop date={date}");
            return Ok(0);
        }
        info!("event=paid_reset module=ledger status=ok date={date} value={value} people={updated}");

        self.persist_dirty(Dirty {
            bills: false,
            people: true,
        })?;
        Ok(updated)
    }

    /// Rewrites both collections to storage.
    pub fn persist(&self) -> LedgerResult<()> {
        self.persist_dirty(Dirty {
            bills: true,
            people: true,
        })
    }

    fn reconcile(&mut self, names: &[String]) -> bool {
        let amounts = self.bills.payer_amounts();
        self.people.reconcile(names, &amounts)
    }

    /// Saves each touched collection, attempting all of them before
    /// reporting the first failure.
    fn persist_dirty(&self, dirty: Dirty) -> LedgerResult<()> {
        let bills_result = if dirty.bills {
            self.save(&self.config.bills_key, self.bills.bills())
        } else {
            Ok(())
        };
        let people_result = if dirty.people {
            self.save(&self.config.people_key, self.people.list_with_status())
        } else {
            Ok(())
        };

        bills_result.and(people_result).map_err(LedgerError::from)
    }

    fn save<T: Serialize>(&self, key: &str, items: &[T]) -> StorageResult<()> {
        save_collection(&self.repo, key, items).map_err(|err| {
            error!(
                "event=ledger_persist module=ledger status=error key={key} items={} error={err}",
                items.len()
            );
            err
        })
    }
}

fn today() -> String {
    Local::now().date_naive().format(DATE_FORMAT).to_string()
}
