use super::account::{AccountId, to_money_scale};
use crate::error::{LedgerError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned transfer identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferId(pub u64);

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strictly positive transfer amount with 2 decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value <= Decimal::ZERO {
            return Err(LedgerError::validation(
                "Transaction value must be positive",
            ));
        }
        Ok(Self(to_money_scale(value, "Transaction value")?))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An append-only record of money moved from `payer` to `payee`.
///
/// The account references are non-owning: a transfer survives the deletion
/// of either account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: TransferId,
    pub amount: Amount,
    pub payer: AccountId,
    pub payee: AccountId,
    pub created_at: DateTime<Utc>,
}

/// A transfer ready to be persisted. `created_at` is honored when supplied,
/// otherwise the store stamps the record when it is inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransfer {
    pub amount: Amount,
    pub payer: AccountId,
    pub payee: AccountId,
    pub created_at: Option<DateTime<Utc>>,
}

impl NewTransfer {
    pub fn into_transfer(self, id: TransferId) -> Transfer {
        Transfer {
            id,
            amount: self.amount,
            payer: self.payer,
            payee: self.payee,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        }
    }
}

/// Caller input for a transfer. Authorization (who may act as `payer`) has
/// already been decided by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub amount: Option<Decimal>,
    pub payer: AccountId,
    pub payee: AccountId,
    pub requested_at: Option<DateTime<Utc>>,
}

impl TransferRequest {
    pub fn new(amount: Decimal, payer: AccountId, payee: AccountId) -> Self {
        Self {
            amount: Some(amount),
            payer,
            payee,
            requested_at: None,
        }
    }
}
