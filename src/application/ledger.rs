use super::{AccountManager, TransferEngine};
use crate::domain::ports::SharedLedgerStore;

/// Both services wired over one store.
#[derive(Clone)]
pub struct Ledger {
    pub accounts: AccountManager,
    pub transfers: TransferEngine,
}

impl Ledger {
    pub fn new(store: SharedLedgerStore) -> Self {
        let accounts = AccountManager::new(store.clone());
        let transfers = TransferEngine::new(store, accounts.clone());
        Self {
            accounts,
            transfers,
        }
    }
}
