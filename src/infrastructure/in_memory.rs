use crate::domain::account::{Account, AccountDraft, AccountId};
use crate::domain::ports::{AccountStore, LedgerStore, TransferStore, UnitOfWork, UnitOfWorkBox};
use crate::domain::transfer::{NewTransfer, Transfer, TransferId};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Clone, Default)]
struct LedgerState {
    accounts: BTreeMap<AccountId, Account>,
    transfers: BTreeMap<TransferId, Transfer>,
    last_account_id: u64,
    last_transfer_id: u64,
}

/// A thread-safe in-memory ledger store.
///
/// Uses `Arc<Mutex<LedgerState>>` so clones share the same data. A unit of
/// work holds the lock for its whole lifetime, which makes units fully
/// serial. Ideal for testing or small datasets where persistence is not
/// required.
#[derive(Default, Clone)]
pub struct InMemoryLedgerStore {
    state: Arc<Mutex<LedgerState>>,
}

impl InMemoryLedgerStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn begin(&self) -> Result<UnitOfWorkBox> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        Ok(Box::new(InMemoryUnitOfWork {
            guard,
            working: None,
        }))
    }
}

/// Unit of work over [`InMemoryLedgerStore`].
///
/// Reads go to the committed state until the first write, which takes a
/// private working copy. Commit swaps the copy in.
pub struct InMemoryUnitOfWork {
    guard: OwnedMutexGuard<LedgerState>,
    working: Option<LedgerState>,
}

impl InMemoryUnitOfWork {
    fn state(&self) -> &LedgerState {
        self.working.as_ref().unwrap_or(&*self.guard)
    }

    fn state_mut(&mut self) -> &mut LedgerState {
        let committed = &self.guard;
        self.working.get_or_insert_with(|| LedgerState::clone(committed))
    }
}

#[async_trait]
impl AccountStore for InMemoryUnitOfWork {
    async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        Ok(self.state().accounts.get(&id).cloned())
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        Ok(self
            .state()
            .accounts
            .values()
            .find(|account| account.email == email)
            .cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        Ok(self
            .state()
            .accounts
            .values()
            .any(|account| account.email == email))
    }

    async fn document_exists(&self, document: &str) -> Result<bool> {
        Ok(self
            .state()
            .accounts
            .values()
            .any(|account| account.document == document))
    }

    async fn list_accounts(&self) -> Result<Vec<Account>> {
        Ok(self.state().accounts.values().cloned().collect())
    }

    async fn insert_account(&mut self, draft: AccountDraft) -> Result<Account> {
        let state = self.state_mut();
        state.last_account_id += 1;
        let account = draft.into_account(AccountId(state.last_account_id));
        state.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn save_account(&mut self, account: Account) -> Result<Account> {
        let state = self.state_mut();
        if !state.accounts.contains_key(&account.id) {
            return Err(LedgerError::not_found("account", account.id));
        }
        state.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn delete_account(&mut self, id: AccountId) -> Result<()> {
        self.state_mut().accounts.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl TransferStore for InMemoryUnitOfWork {
    async fn insert_transfer(&mut self, transfer: NewTransfer) -> Result<Transfer> {
        let state = self.state_mut();
        state.last_transfer_id += 1;
        let transfer = transfer.into_transfer(TransferId(state.last_transfer_id));
        state.transfers.insert(transfer.id, transfer.clone());
        Ok(transfer)
    }

    async fn get_transfer(&self, id: TransferId) -> Result<Option<Transfer>> {
        Ok(self.state().transfers.get(&id).cloned())
    }

    async fn list_transfers(&self) -> Result<Vec<Transfer>> {
        Ok(self.state().transfers.values().cloned().collect())
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<()> {
        let InMemoryUnitOfWork { mut guard, working } = *self;
        if let Some(working) = working {
            *guard = working;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::{Balance, Role};
    use crate::domain::transfer::Amount;
    use rust_decimal_macros::dec;

    fn draft(email: &str, document: &str) -> AccountDraft {
        AccountDraft {
            name: "Test".to_string(),
            document: document.to_string(),
            email: email.to_string(),
            password: "secret".to_string(),
            balance: Balance::new(dec!(100.0)).unwrap(),
            role: Role::Common,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = InMemoryLedgerStore::new();
        let mut uow = store.begin().await.unwrap();

        let first = uow.insert_account(draft("a@x.com", "52998224725")).await.unwrap();
        let second = uow.insert_account(draft("b@x.com", "11144477735")).await.unwrap();
        uow.commit().await.unwrap();

        assert_eq!(first.id, AccountId(1));
        assert_eq!(second.id, AccountId(2));
    }

    #[tokio::test]
    async fn test_lookups() {
        let store = InMemoryLedgerStore::new();
        let mut uow = store.begin().await.unwrap();
        let account = uow.insert_account(draft("a@x.com", "52998224725")).await.unwrap();

        assert_eq!(uow.get_account(account.id).await.unwrap(), Some(account.clone()));
        assert_eq!(
            uow.find_account_by_email("a@x.com").await.unwrap(),
            Some(account)
        );
        assert!(uow.email_exists("a@x.com").await.unwrap());
        assert!(!uow.email_exists("b@x.com").await.unwrap());
        assert!(uow.document_exists("52998224725").await.unwrap());
        assert!(!uow.document_exists("11144477735").await.unwrap());
        assert!(uow.get_account(AccountId(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dropped_unit_is_rolled_back() {
        let store = InMemoryLedgerStore::new();
        {
            let mut uow = store.begin().await.unwrap();
            uow.insert_account(draft("a@x.com", "52998224725")).await.unwrap();
            // dropped without commit
        }

        let uow = store.begin().await.unwrap();
        assert!(uow.list_accounts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_commit_publishes_writes() {
        let store = InMemoryLedgerStore::new();
        let mut uow = store.begin().await.unwrap();
        let mut account = uow.insert_account(draft("a@x.com", "52998224725")).await.unwrap();
        account.name = "Renamed".to_string();
        uow.save_account(account.clone()).await.unwrap();
        uow.commit().await.unwrap();

        let uow = store.begin().await.unwrap();
        let stored = uow.get_account(account.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Renamed");
    }

    #[tokio::test]
    async fn test_save_unknown_account_fails() {
        let store = InMemoryLedgerStore::new();
        let mut uow = store.begin().await.unwrap();
        let ghost = draft("a@x.com", "52998224725").into_account(AccountId(5));

        let result = uow.save_account(ghost).await;
        assert!(matches!(result, Err(LedgerError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_transfer_store() {
        let store = InMemoryLedgerStore::new();
        let mut uow = store.begin().await.unwrap();
        let transfer = uow
            .insert_transfer(NewTransfer {
                amount: Amount::new(dec!(10)).unwrap(),
                payer: AccountId(1),
                payee: AccountId(2),
                created_at: None,
            })
            .await
            .unwrap();
        uow.commit().await.unwrap();

        let uow = store.begin().await.unwrap();
        assert_eq!(transfer.id, TransferId(1));
        assert_eq!(
            uow.get_transfer(TransferId(1)).await.unwrap(),
            Some(transfer)
        );
        assert_eq!(uow.list_transfers().await.unwrap().len(), 1);
        assert!(uow.get_transfer(TransferId(2)).await.unwrap().is_none());
    }
}
