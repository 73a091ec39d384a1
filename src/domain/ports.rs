use super::account::{Account, AccountDraft, AccountId};
use super::transfer::{NewTransfer, Transfer, TransferId};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Keyed access to account records inside a unit of work.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn get_account(&self, id: AccountId) -> Result<Option<Account>>;
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>>;
    async fn email_exists(&self, email: &str) -> Result<bool>;
    async fn document_exists(&self, document: &str) -> Result<bool>;
    async fn list_accounts(&self) -> Result<Vec<Account>>;
    /// Persists a new account, assigning its identifier.
    async fn insert_account(&mut self, draft: AccountDraft) -> Result<Account>;
    /// Overwrites an existing account.
    async fn save_account(&mut self, account: Account) -> Result<Account>;
    async fn delete_account(&mut self, id: AccountId) -> Result<()>;
}

/// Append-only access to transfer records inside a unit of work.
#[async_trait]
pub trait TransferStore: Send + Sync {
    /// Persists a new transfer, assigning its identifier and, when absent,
    /// its creation timestamp.
    async fn insert_transfer(&mut self, transfer: NewTransfer) -> Result<Transfer>;
    async fn get_transfer(&self, id: TransferId) -> Result<Option<Transfer>>;
    async fn list_transfers(&self) -> Result<Vec<Transfer>>;
}

/// One atomic unit over both stores.
///
/// Writes stay invisible to other units until [`UnitOfWork::commit`].
/// Dropping the unit without committing discards them.
#[async_trait]
pub trait UnitOfWork: AccountStore + TransferStore {
    async fn commit(self: Box<Self>) -> Result<()>;
}

/// A durable store able to open units of work.
///
/// Implementations serialize units that may touch the same records, so a
/// read-check-write sequence inside one unit never races another.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn begin(&self) -> Result<UnitOfWorkBox>;
}

pub type UnitOfWorkBox = Box<dyn UnitOfWork>;
pub type SharedLedgerStore = Arc<dyn LedgerStore>;
