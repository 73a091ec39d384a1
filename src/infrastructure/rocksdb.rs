use crate::domain::account::{Account, AccountDraft, AccountId};
use crate::domain::ports::{AccountStore, LedgerStore, TransferStore, UnitOfWork, UnitOfWorkBox};
use crate::domain::transfer::{NewTransfer, Transfer, TransferId};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Column Family for account records, keyed by account id.
pub const CF_ACCOUNTS: &str = "accounts";
/// Column Family for transfer records, keyed by transfer id.
pub const CF_TRANSFERS: &str = "transfers";
/// Uniqueness index: email -> account id.
pub const CF_EMAILS: &str = "emails";
/// Uniqueness index: canonical document -> account id.
pub const CF_DOCUMENTS: &str = "documents";
/// Identifier sequences.
pub const CF_META: &str = "meta";

const SEQ_ACCOUNTS: &[u8] = b"seq:accounts";
const SEQ_TRANSFERS: &[u8] = b"seq:transfers";

/// A persistent ledger store backed by RocksDB.
///
/// Accounts and transfers live in separate Column Families, next to two
/// index families that back the email/document uniqueness checks. Units of
/// work are serialized by a store-wide writer lock and committed with a
/// single `WriteBatch`, so either every write of a unit lands or none does.
///
/// `Clone` shares the underlying `Arc<DB>` and lock.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    writer: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating
    /// missing column families.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_ACCOUNTS, CF_TRANSFERS, CF_EMAILS, CF_DOCUMENTS, CF_META]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;
        tracing::debug!("RocksDB ledger store opened");

        Ok(Self {
            db: Arc::new(db),
            writer: Arc::new(Mutex::new(())),
        })
    }
}

#[async_trait]
impl LedgerStore for RocksDBStore {
    async fn begin(&self) -> Result<UnitOfWorkBox> {
        let guard = Arc::clone(&self.writer).lock_owned().await;
        let last_account_id = read_sequence(&self.db, SEQ_ACCOUNTS)?;
        let last_transfer_id = read_sequence(&self.db, SEQ_TRANSFERS)?;

        Ok(Box::new(RocksDBUnitOfWork {
            db: Arc::clone(&self.db),
            _writer: guard,
            accounts: BTreeMap::new(),
            transfers: BTreeMap::new(),
            last_account_id,
            last_transfer_id,
        }))
    }
}

fn cf<'a>(db: &'a DB, name: &str) -> Result<&'a ColumnFamily> {
    db.cf_handle(name)
        .ok_or_else(|| LedgerError::storage(format!("Column family '{name}' not found")))
}

fn read_json<T: DeserializeOwned>(db: &DB, family: &str, key: &[u8]) -> Result<Option<T>> {
    match db.get_cf(cf(db, family)?, key)? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

fn read_all_json<T: DeserializeOwned>(db: &DB, family: &str) -> Result<Vec<T>> {
    let mut records = Vec::new();
    for item in db.iterator_cf(cf(db, family)?, IteratorMode::Start) {
        let (_key, value) = item?;
        records.push(serde_json::from_slice(&value)?);
    }
    Ok(records)
}

fn read_id(bytes: &[u8]) -> Result<u64> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| LedgerError::storage("Corrupted id in RocksDB"))?;
    Ok(u64::from_be_bytes(raw))
}

fn read_sequence(db: &DB, key: &[u8]) -> Result<u64> {
    match db.get_cf(cf(db, CF_META)?, key)? {
        Some(bytes) => read_id(&bytes),
        None => Ok(0),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

/// Unit of work over [`RocksDBStore`].
///
/// Writes are staged in memory and read back through the overlay; `None`
/// marks a staged deletion. Nothing touches the database before `commit`.
pub struct RocksDBUnitOfWork {
    db: Arc<DB>,
    _writer: OwnedMutexGuard<()>,
    accounts: BTreeMap<AccountId, Option<Account>>,
    transfers: BTreeMap<TransferId, Transfer>,
    last_account_id: u64,
    last_transfer_id: u64,
}

impl RocksDBUnitOfWork {
    fn committed_account(&self, id: AccountId) -> Result<Option<Account>> {
        read_json(&self.db, CF_ACCOUNTS, &id.0.to_be_bytes())
    }

    /// Resolves a unique-index lookup, letting staged writes shadow the
    /// committed index.
    fn find_indexed(
        &self,
        family: &str,
        key: &str,
        field: impl Fn(&Account) -> &str,
    ) -> Result<Option<Account>> {
        if let Some(staged) = self
            .accounts
            .values()
            .flatten()
            .find(|account| field(account) == key)
        {
            return Ok(Some(staged.clone()));
        }

        let Some(bytes) = self.db.get_cf(cf(&self.db, family)?, key.as_bytes())? else {
            return Ok(None);
        };
        let id = AccountId(read_id(&bytes)?);
        if self.accounts.contains_key(&id) {
            // The staged version no longer carries this value.
            return Ok(None);
        }
        self.committed_account(id)
    }
}

#[async_trait]
impl AccountStore for RocksDBUnitOfWork {
    async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        match self.accounts.get(&id) {
            Some(staged) => Ok(staged.clone()),
            None => self.committed_account(id),
        }
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        self.find_indexed(CF_EMAILS, email, |account| &account.email)
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        Ok(self.find_account_by_email(email).await?.is_some())
    }

    async fn document_exists(&self, document: &str) -> Result<bool> {
        Ok(self
            .find_indexed(CF_DOCUMENTS, document, |account| &account.document)?
            .is_some())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>> {
        let mut accounts: BTreeMap<AccountId, Account> =
            read_all_json::<Account>(&self.db, CF_ACCOUNTS)?
                .into_iter()
                .map(|account| (account.id, account))
                .collect();
        for (id, staged) in &self.accounts {
            match staged {
                Some(account) => accounts.insert(*id, account.clone()),
                None => accounts.remove(id),
            };
        }
        Ok(accounts.into_values().collect())
    }

    async fn insert_account(&mut self, draft: AccountDraft) -> Result<Account> {
        self.last_account_id += 1;
        let account = draft.into_account(AccountId(self.last_account_id));
        self.accounts.insert(account.id, Some(account.clone()));
        Ok(account)
    }

    async fn save_account(&mut self, account: Account) -> Result<Account> {
        if self.get_account(account.id).await?.is_none() {
            return Err(LedgerError::not_found("account", account.id));
        }
        self.accounts.insert(account.id, Some(account.clone()));
        Ok(account)
    }

    async fn delete_account(&mut self, id: AccountId) -> Result<()> {
        self.accounts.insert(id, None);
        Ok(())
    }
}

#[async_trait]
impl TransferStore for RocksDBUnitOfWork {
    async fn insert_transfer(&mut self, transfer: NewTransfer) -> Result<Transfer> {
        self.last_transfer_id += 1;
        let transfer = transfer.into_transfer(TransferId(self.last_transfer_id));
        self.transfers.insert(transfer.id, transfer.clone());
        Ok(transfer)
    }

    async fn get_transfer(&self, id: TransferId) -> Result<Option<Transfer>> {
        if let Some(staged) = self.transfers.get(&id) {
            return Ok(Some(staged.clone()));
        }
        read_json(&self.db, CF_TRANSFERS, &id.0.to_be_bytes())
    }

    async fn list_transfers(&self) -> Result<Vec<Transfer>> {
        let mut transfers = read_all_json::<Transfer>(&self.db, CF_TRANSFERS)?;
        transfers.extend(self.transfers.values().cloned());
        Ok(transfers)
    }
}

#[async_trait]
impl UnitOfWork for RocksDBUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<()> {
        let db = &self.db;
        let (cf_accounts, cf_transfers) = (cf(db, CF_ACCOUNTS)?, cf(db, CF_TRANSFERS)?);
        let (cf_emails, cf_documents) = (cf(db, CF_EMAILS)?, cf(db, CF_DOCUMENTS)?);
        let cf_meta = cf(db, CF_META)?;

        let mut batch = WriteBatch::default();

        // Drop every stale index entry before adding new ones, so an email
        // or document handed from one account to another in the same unit
        // ends up pointing at its new owner.
        for id in self.accounts.keys() {
            if let Some(previous) = self.committed_account(*id)? {
                batch.delete_cf(cf_emails, previous.email.as_bytes());
                batch.delete_cf(cf_documents, previous.document.as_bytes());
            }
        }

        for (id, staged) in &self.accounts {
            let key = id.0.to_be_bytes();
            match staged {
                Some(account) => {
                    batch.put_cf(cf_accounts, key, to_json(account)?);
                    batch.put_cf(cf_emails, account.email.as_bytes(), key);
                    batch.put_cf(cf_documents, account.document.as_bytes(), key);
                }
                None => batch.delete_cf(cf_accounts, key),
            }
        }

        for (id, transfer) in &self.transfers {
            batch.put_cf(cf_transfers, id.0.to_be_bytes(), to_json(transfer)?);
        }

        batch.put_cf(cf_meta, SEQ_ACCOUNTS, self.last_account_id.to_be_bytes());
        batch.put_cf(cf_meta, SEQ_TRANSFERS, self.last_transfer_id.to_be_bytes());

        db.write(batch)?;
        Ok(())
    }
}
