use super::transfer::Amount;
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of decimal places every stored monetary value carries.
pub const MONEY_SCALE: u32 = 2;

/// Store-assigned account identifier. Immutable once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub u64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Largest monetary value the ledger stores: 13 significant digits, 2 of
/// them decimal places.
pub const MAX_MONEY: Decimal = dec!(99999999999.99);

/// Normalizes a monetary value to [`MONEY_SCALE`] decimal places, rejecting
/// values that would lose precision or exceed [`MAX_MONEY`].
pub(crate) fn to_money_scale(value: Decimal, field: &str) -> Result<Decimal> {
    if value.normalize().scale() > MONEY_SCALE {
        return Err(LedgerError::validation(format!(
            "{field} must have at most {MONEY_SCALE} decimal places"
        )));
    }
    if value.abs() > MAX_MONEY {
        return Err(LedgerError::validation(format!(
            "{field} must not exceed {MAX_MONEY}"
        )));
    }
    let mut scaled = value;
    scaled.rescale(MONEY_SCALE);
    if scaled.scale() != MONEY_SCALE {
        return Err(LedgerError::validation(format!(
            "{field} cannot be represented with {MONEY_SCALE} decimal places"
        )));
    }
    Ok(scaled)
}

/// Non-negative account balance with 2 decimal places.
///
/// Wraps `rust_decimal::Decimal` so a balance can only be built through
/// validation, and can only move through [`Balance::debit`] / [`Balance::credit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Balance(Decimal);

impl Balance {
    pub const ZERO: Self = Self(Decimal::from_parts(0, 0, 0, false, MONEY_SCALE));

    pub fn new(value: Decimal) -> Result<Self> {
        if value < Decimal::ZERO {
            return Err(LedgerError::validation("Balance must not be negative"));
        }
        Ok(Self(to_money_scale(value, "Balance")?))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Subtracts `amount`, or returns `None` when the balance does not cover it.
    pub fn debit(self, amount: Amount) -> Option<Self> {
        if self.0 >= amount.value() {
            self.0.checked_sub(amount.value()).map(Self)
        } else {
            None
        }
    }

    /// Adds `amount` exactly. Fails when the result would exceed [`MAX_MONEY`].
    pub fn credit(self, amount: Amount) -> Result<Self> {
        match self.0.checked_add(amount.value()) {
            Some(total) if total <= MAX_MONEY => Ok(Self(total)),
            _ => Err(LedgerError::validation(format!(
                "Balance must not exceed {MAX_MONEY}"
            ))),
        }
    }
}

impl Default for Balance {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Balance> for Decimal {
    fn from(balance: Balance) -> Self {
        balance.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Common,
    Merchant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Common => "COMMON",
            Role::Merchant => "MERCHANT",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = LedgerError;

    fn from_str(value: &str) -> Result<Self> {
        if value.eq_ignore_ascii_case("common") {
            Ok(Role::Common)
        } else if value.eq_ignore_ascii_case("merchant") {
            Ok(Role::Merchant)
        } else {
            Err(LedgerError::validation(format!("Invalid role: {value}")))
        }
    }
}

/// A stored account.
///
/// `document` is always canonical and unique, `email` is unique. The password
/// is an opaque credential stored as given; hashing happens before it gets here.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub document: String,
    pub email: String,
    pub password: String,
    pub balance: Balance,
    pub role: Role,
}

// Hand-written so credentials never end up in logs.
impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("document", &self.document)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("balance", &self.balance)
            .field("role", &self.role)
            .finish()
    }
}

/// Input for account creation. Every field is optional so that a missing
/// field is reported as a validation failure rather than a type error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewAccount {
    pub name: Option<String>,
    pub document: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub balance: Option<Decimal>,
    pub role: Option<Role>,
}

/// A validated account waiting for the store to assign its identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountDraft {
    pub name: String,
    pub document: String,
    pub email: String,
    pub password: String,
    pub balance: Balance,
    pub role: Role,
}

impl AccountDraft {
    pub fn into_account(self, id: AccountId) -> Account {
        Account {
            id,
            name: self.name,
            document: self.document,
            email: self.email,
            password: self.password,
            balance: self.balance,
            role: self.role,
        }
    }
}

/// Merge-patch for an existing account.
///
/// `None` means "leave untouched". There is no way to clear a field.
/// `id`, when present, must match the account being updated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountPatch {
    pub id: Option<AccountId>,
    pub name: Option<String>,
    pub document: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub balance: Option<Decimal>,
    pub role: Option<Role>,
}

impl AccountPatch {
    pub fn with_balance(balance: Balance) -> Self {
        Self {
            balance: Some(balance.value()),
            ..Self::default()
        }
    }
}
