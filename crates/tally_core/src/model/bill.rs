//! Bill domain model.
//!
//! # Responsibility
//! - Define the persisted bill record and its payer list.
//! - Validate fields that must survive a JSON round-trip.
//!
//! # Invariants
//! - `payers` never holds two entries with the same `name`.
//! - `date` is an ISO `YYYY-MM-DD` calendar date.
//! - `amount` is a finite whole number of cents within `money::MAX_CENTS`.

use crate::model::money::{to_cents, CentsError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Creation-time derived identifier of a bill.
pub type BillId = i64;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A person splitting a bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payer {
    pub name: String,
    /// Legacy per-bill flag; the authoritative status is `Person::dates`.
    pub paid: bool,
}

impl Payer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            paid: false,
        }
    }
}

/// One shared expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: BillId,
    pub description: String,
    /// Total cost in currency units.
    pub amount: f64,
    /// ISO `YYYY-MM-DD`.
    pub date: String,
    #[serde(default)]
    pub payers: Vec<Payer>,
}

/// Validation failure for bill fields.
#[derive(Debug, Clone, PartialEq)]
pub enum BillValidationError {
    /// NaN and infinities cannot be represented in persisted JSON.
    NonFiniteAmount(f64),
    /// Cents would not be exactly representable.
    AmountOutOfRange(f64),
    /// Amount carries a fraction of a cent.
    AmountNotWholeCents(f64),
    InvalidDate(String),
}

impl Display for BillValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFiniteAmount(amount) => write!(f, "bill amount must be finite, got {amount}"),
            Self::AmountOutOfRange(amount) => write!(f, "bill amount {amount} is out of range"),
            Self::AmountNotWholeCents(amount) => {
                write!(f, "bill amount {amount} is not a whole number of cents")
            }
            Self::InvalidDate(date) => {
                write!(f, "bill date must be formatted as YYYY-MM-DD, got `{date}`")
            }
        }
    }
}

impl Error for BillValidationError {}

impl Bill {
    /// Creates a bill with no payers.
    pub fn new(
        id: BillId,
        description: impl Into<String>,
        amount: f64,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id,
            description: description.into(),
            amount,
            date: date.into(),
            payers: Vec::new(),
        }
    }

    /// Checks that the amount has exact cents and the date is ISO.
    pub fn validate(&self) -> Result<(), BillValidationError> {
        validate_amount(self.amount)?;
        validate_date(&self.date)
    }

    pub fn has_payer(&self, name: &str) -> bool {
        self.payers.iter().any(|payer| payer.name == name)
    }

    pub fn payer_names(&self) -> Vec<String> {
        self.payers.iter().map(|payer| payer.name.clone()).collect()
    }
}

pub fn validate_amount(amount: f64) -> Result<(), BillValidationError> {
    match to_cents(amount) {
        Ok(_) => Ok(()),
        Err(CentsError::NonFinite) => Err(BillValidationError::NonFiniteAmount(amount)),
        Err(CentsError::OutOfRange) => Err(BillValidationError::AmountOutOfRange(amount)),
        Err(CentsError::FractionalCents) => {
            Err(BillValidationError::AmountNotWholeCents(amount))
        }
    }
}

pub fn validate_date(date: &str) -> Result<(), BillValidationError> {
    // `%Y` alone would also accept unpadded or signed years.
    let well_formed = date.len() == 10
        && date.is_ascii()
        && NaiveDate::parse_from_str(date, DATE_FORMAT).is_ok();
    if well_formed {
        Ok(())
    } else {
        Err(BillValidationError::InvalidDate(date.to_string()))
    }
}
