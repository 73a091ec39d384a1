use crate::domain::account::{Account, AccountDraft, AccountId, AccountPatch, Balance, NewAccount};
use crate::domain::document;
use crate::domain::ports::{SharedLedgerStore, UnitOfWork};
use crate::error::{LedgerError, Result};
use tracing::{debug, info, instrument, warn};

/// Creates, updates, deletes and looks up accounts.
///
/// Every public operation runs in its own unit of work. The `*_in` variants
/// run inside a unit owned by the caller, which is how the transfer engine
/// folds balance updates into its own atomic unit.
#[derive(Clone)]
pub struct AccountManager {
    store: SharedLedgerStore,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| LedgerError::validation(format!("Account {field} must not be null")))
}

impl AccountManager {
    pub fn new(store: SharedLedgerStore) -> Self {
        Self { store }
    }

    /// Validates and persists a new account.
    ///
    /// The document is canonicalized before the uniqueness and checksum
    /// checks. A missing balance defaults to zero.
    #[instrument(skip_all)]
    pub async fn create(&self, input: NewAccount) -> Result<Account> {
        let name = required(input.name, "name")?;
        let raw_document = required(input.document, "document")?;
        let email = required(input.email, "email")?;
        let password = required(input.password, "password")?;
        let role = required(input.role, "role")?;
        let balance = input
            .balance
            .map(Balance::new)
            .transpose()?
            .unwrap_or(Balance::ZERO);

        let document = document::canonicalize(&raw_document);

        let mut uow = self.store.begin().await?;
        if uow.email_exists(&email).await? {
            warn!(%email, "Rejected account: email already exists");
            return Err(LedgerError::conflict("The email already exists"));
        }
        if uow.document_exists(&document).await? {
            warn!(%email, "Rejected account: document already exists");
            return Err(LedgerError::conflict("The document already exists"));
        }
        if !document::validate(&document) {
            warn!(%email, "Rejected account: invalid document");
            return Err(LedgerError::validation("Invalid document"));
        }

        let account = uow
            .insert_account(AccountDraft {
                name,
                document,
                email,
                password,
                balance,
                role,
            })
            .await?;
        uow.commit().await?;

        info!(account_id = %account.id, role = %account.role, balance = %account.balance, "Account created");
        Ok(account)
    }

    /// Applies a merge-patch to an existing account in its own unit of work.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: AccountId, patch: AccountPatch) -> Result<Account> {
        let mut uow = self.store.begin().await?;
        let account = self.update_in(&mut *uow, id, patch).await?;
        uow.commit().await?;

        info!(account_id = %account.id, "Account updated");
        Ok(account)
    }

    /// Applies a merge-patch inside the caller's unit of work.
    ///
    /// Absent fields, and fields equal to the stored value, are left alone.
    /// A changed document is canonicalized, then checked for uniqueness and
    /// checksum before it replaces the stored one.
    pub(crate) async fn update_in(
        &self,
        uow: &mut dyn UnitOfWork,
        id: AccountId,
        patch: AccountPatch,
    ) -> Result<Account> {
        let mut account = Self::find_in(uow, id).await?;

        if let Some(patch_id) = patch.id
            && patch_id != id
        {
            warn!(account_id = %id, %patch_id, "Rejected update: mismatched ids");
            return Err(LedgerError::validation("Update IDs must be the same"));
        }

        if let Some(name) = patch.name
            && name != account.name
        {
            account.name = name;
        }

        if let Some(raw_document) = patch.document {
            let canonical = document::canonicalize(&raw_document);
            if canonical != account.document {
                if uow.document_exists(&canonical).await? {
                    warn!(account_id = %id, "Rejected update: document already exists");
                    return Err(LedgerError::conflict("The document already exists"));
                }
                if !document::validate(&canonical) {
                    warn!(account_id = %id, "Rejected update: invalid document");
                    return Err(LedgerError::validation("Invalid document"));
                }
                account.document = canonical;
            }
        }

        if let Some(email) = patch.email
            && email != account.email
        {
            if uow.email_exists(&email).await? {
                warn!(account_id = %id, "Rejected update: email already exists");
                return Err(LedgerError::conflict("The email already exists"));
            }
            account.email = email;
        }

        if let Some(password) = patch.password
            && password != account.password
        {
            account.password = password;
        }

        if let Some(balance) = patch.balance {
            let balance = Balance::new(balance)?;
            if balance != account.balance {
                account.balance = balance;
            }
        }

        if let Some(role) = patch.role
            && role != account.role
        {
            account.role = role;
        }

        uow.save_account(account).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: AccountId) -> Result<()> {
        let mut uow = self.store.begin().await?;
        Self::find_in(&*uow, id).await?;
        uow.delete_account(id).await?;
        uow.commit().await?;

        info!(account_id = %id, "Account deleted");
        Ok(())
    }

    pub async fn find_by_id(&self, id: AccountId) -> Result<Account> {
        let uow = self.store.begin().await?;
        Self::find_in(&*uow, id).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Account> {
        self.find_by_email_optional(email)
            .await?
            .ok_or_else(|| LedgerError::not_found("account", email))
    }

    /// Like [`AccountManager::find_by_email`], but "not found" is `Ok(None)`.
    pub async fn find_by_email_optional(&self, email: &str) -> Result<Option<Account>> {
        let uow = self.store.begin().await?;
        debug!(%email, "Looking up account by email");
        uow.find_account_by_email(email).await
    }

    pub async fn find_all(&self) -> Result<Vec<Account>> {
        let uow = self.store.begin().await?;
        uow.list_accounts().await
    }

    pub(crate) async fn find_in(uow: &dyn UnitOfWork, id: AccountId) -> Result<Account> {
        debug!(account_id = %id, "Looking up account");
        uow.get_account(id)
            .await?
            .ok_or_else(|| LedgerError::not_found("account", id))
    }
}
