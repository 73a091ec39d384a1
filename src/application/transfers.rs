use super::accounts::AccountManager;
use crate::domain::account::{AccountPatch, Role};
use crate::domain::ports::SharedLedgerStore;
use crate::domain::transfer::{Amount, NewTransfer, Transfer, TransferId, TransferRequest};
use crate::error::{LedgerError, Result};
use tracing::{debug, info, instrument, warn};

/// Moves money between accounts and keeps the append-only transfer log.
///
/// `TransferEngine` owns neither store. It opens one unit of work per
/// transfer and writes both balances (through [`AccountManager`]) and the
/// transfer record inside it, so a failure at any step leaves nothing behind.
#[derive(Clone)]
pub struct TransferEngine {
    store: SharedLedgerStore,
    accounts: AccountManager,
}

impl TransferEngine {
    /// Creates a new `TransferEngine`.
    ///
    /// # Arguments
    ///
    /// * `store` - The store transfers are recorded in.
    /// * `accounts` - The account manager used to persist balance changes.
    pub fn new(store: SharedLedgerStore, accounts: AccountManager) -> Self {
        Self { store, accounts }
    }

    /// Debits the payer, credits the payee and records the transfer.
    ///
    /// Checks run in order: amount present and valid, both accounts exist,
    /// payer and payee differ, payer is not a merchant, payer covers the
    /// amount. The caller must already have authorized the payer.
    #[instrument(skip(self, request), fields(payer = %request.payer, payee = %request.payee))]
    pub async fn execute(&self, request: TransferRequest) -> Result<Transfer> {
        let amount = request
            .amount
            .ok_or_else(|| LedgerError::validation("Transaction value must not be null"))?;
        let amount = Amount::new(amount)?;

        let mut uow = self.store.begin().await?;
        let payer = AccountManager::find_in(&*uow, request.payer).await?;
        let payee = AccountManager::find_in(&*uow, request.payee).await?;

        if payer.id == payee.id {
            warn!(%amount, "Rejected transfer: payer and payee are the same account");
            return Err(LedgerError::validation(
                "Payer and payee must be different accounts",
            ));
        }

        if payer.role == Role::Merchant {
            warn!(%amount, "Rejected transfer: payer is a merchant");
            return Err(LedgerError::validation(
                "Merchants may not initiate transfers",
            ));
        }

        let Some(payer_balance) = payer.balance.debit(amount) else {
            warn!(%amount, balance = %payer.balance, "Rejected transfer: insufficient funds");
            return Err(LedgerError::validation("Insufficient funds"));
        };
        let payee_balance = match payee.balance.credit(amount) {
            Ok(balance) => balance,
            Err(e) => {
                warn!(%amount, balance = %payee.balance, "Rejected transfer: payee balance out of range");
                return Err(e);
            }
        };

        self.accounts
            .update_in(&mut *uow, payer.id, AccountPatch::with_balance(payer_balance))
            .await?;
        self.accounts
            .update_in(&mut *uow, payee.id, AccountPatch::with_balance(payee_balance))
            .await?;

        let transfer = uow
            .insert_transfer(NewTransfer {
                amount,
                payer: payer.id,
                payee: payee.id,
                created_at: request.requested_at,
            })
            .await?;
        uow.commit().await?;

        info!(transfer_id = %transfer.id, %amount, "Transfer committed");
        Ok(transfer)
    }

    /// Transfers are immutable; this always fails.
    pub async fn update(&self, id: TransferId, _changes: TransferRequest) -> Result<Transfer> {
        warn!(transfer_id = %id, "Rejected attempt to modify a transfer");
        Err(LedgerError::validation("Transfers are immutable"))
    }

    /// Accepts the request and does nothing: the transfer log is append-only.
    pub async fn delete(&self, id: TransferId) -> Result<()> {
        debug!(transfer_id = %id, "Ignoring transfer deletion");
        Ok(())
    }

    pub async fn find_all(&self) -> Result<Vec<Transfer>> {
        let uow = self.store.begin().await?;
        uow.list_transfers().await
    }

    pub async fn find_by_id(&self, id: TransferId) -> Result<Transfer> {
        let uow = self.store.begin().await?;
        uow.get_transfer(id)
            .await?
            .ok_or_else(|| LedgerError::not_found("transfer", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::log_capture::CapturedLogs;
    use crate::domain::account::{AccountId, Balance, MAX_MONEY, NewAccount};
    use crate::infrastructure::in_memory::InMemoryLedgerStore;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn setup() -> (AccountManager, TransferEngine) {
        let store: SharedLedgerStore = Arc::new(InMemoryLedgerStore::new());
        let accounts = AccountManager::new(store.clone());
        let transfers = TransferEngine::new(store, accounts.clone());
        (accounts, transfers)
    }

    async fn open(
        accounts: &AccountManager,
        email: &str,
        document: &str,
        balance: Decimal,
        role: Role,
    ) -> AccountId {
        accounts
            .create(NewAccount {
                name: Some(email.to_string()),
                document: Some(document.to_string()),
                email: Some(email.to_string()),
                password: Some("secret".to_string()),
                balance: Some(balance),
                role: Some(role),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_missing_amount_is_rejected() {
        let (accounts, transfers) = setup();
        let payer = open(&accounts, "a@x.com", "52998224725", dec!(10), Role::Common).await;
        let payee = open(&accounts, "b@x.com", "11144477735", dec!(0), Role::Common).await;

        let result = transfers
            .execute(TransferRequest {
                amount: None,
                payer,
                payee,
                requested_at: None,
            })
            .await;
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }

    #[tokio::test]
    async fn test_unknown_account_is_not_found() {
        let (accounts, transfers) = setup();
        let payer = open(&accounts, "a@x.com", "52998224725", dec!(10), Role::Common).await;

        let result = transfers
            .execute(TransferRequest::new(dec!(1), payer, AccountId(404)))
            .await;
        assert!(matches!(result, Err(LedgerError::NotFound { .. })));

        let result = transfers
            .execute(TransferRequest::new(dec!(1), AccountId(404), payer))
            .await;
        assert!(matches!(result, Err(LedgerError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_self_transfer_is_rejected() {
        let (accounts, transfers) = setup();
        let payer = open(&accounts, "a@x.com", "52998224725", dec!(10), Role::Common).await;

        let result = transfers
            .execute(TransferRequest::new(dec!(1), payer, payer))
            .await;
        assert!(matches!(result, Err(LedgerError::Validation(_))));
        assert_eq!(
            accounts.find_by_id(payer).await.unwrap().balance,
            Balance::new(dec!(10)).unwrap()
        );
    }

    #[tokio::test]
    async fn test_self_transfer_rejection_is_logged() {
        let (logs, _guard) = CapturedLogs::install();
        let (accounts, transfers) = setup();
        let payer = open(&accounts, "a@x.com", "52998224725", dec!(10), Role::Common).await;

        assert!(
            transfers
                .execute(TransferRequest::new(dec!(1), payer, payer))
                .await
                .is_err()
        );
        assert!(logs.contents().contains("Rejected transfer: payer and payee are the same account"));
    }

    #[tokio::test]
    async fn test_credit_beyond_money_range_changes_nothing() {
        let (accounts, transfers) = setup();
        let payer = open(&accounts, "a@x.com", "52998224725", dec!(10), Role::Common).await;
        let payee = open(&accounts, "b@x.com", "11144477735", MAX_MONEY, Role::Common).await;

        let result = transfers
            .execute(TransferRequest::new(dec!(1.00), payer, payee))
            .await;
        assert!(matches!(result, Err(LedgerError::Validation(_))));

        assert_eq!(
            accounts.find_by_id(payer).await.unwrap().balance,
            Balance::new(dec!(10)).unwrap()
        );
        assert_eq!(
            accounts.find_by_id(payee).await.unwrap().balance,
            Balance::new(MAX_MONEY).unwrap()
        );
        assert!(transfers.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_successful_transfer() {
        let (accounts, transfers) = setup();
        let payer = open(&accounts, "a@x.com", "52998224725", dec!(100), Role::Common).await;
        let payee = open(&accounts, "b@x.com", "11144477735", dec!(0), Role::Merchant).await;

        let transfer = transfers
            .execute(TransferRequest::new(dec!(40), payer, payee))
            .await
            .unwrap();

        assert_eq!(transfer.payer, payer);
        assert_eq!(transfer.payee, payee);
        assert_eq!(transfer.amount, Amount::new(dec!(40)).unwrap());
        assert_eq!(transfers.find_by_id(transfer.id).await.unwrap(), transfer);
    }

    #[tokio::test]
    async fn test_update_is_always_rejected() {
        let (accounts, transfers) = setup();
        let payer = open(&accounts, "a@x.com", "52998224725", dec!(100), Role::Common).await;
        let payee = open(&accounts, "b@x.com", "11144477735", dec!(0), Role::Common).await;
        let transfer = transfers
            .execute(TransferRequest::new(dec!(1), payer, payee))
            .await
            .unwrap();

        let result = transfers
            .update(transfer.id, TransferRequest::new(dec!(2), payer, payee))
            .await;
        assert!(matches!(result, Err(LedgerError::Validation(msg)) if msg == "Transfers are immutable"));
        assert_eq!(transfers.find_by_id(transfer.id).await.unwrap(), transfer);
    }

    #[tokio::test]
    async fn test_delete_is_a_no_op() {
        let (accounts, transfers) = setup();
        let payer = open(&accounts, "a@x.com", "52998224725", dec!(100), Role::Common).await;
        let payee = open(&accounts, "b@x.com", "11144477735", dec!(0), Role::Common).await;
        let transfer = transfers
            .execute(TransferRequest::new(dec!(1), payer, payee))
            .await
            .unwrap();

        transfers.delete(transfer.id).await.unwrap();
        transfers.delete(TransferId(999)).await.unwrap();
        assert_eq!(transfers.find_all().await.unwrap(), vec![transfer]);
    }

    #[tokio::test]
    async fn test_find_by_id_unknown() {
        let (_, transfers) = setup();
        assert!(matches!(
            transfers.find_by_id(TransferId(1)).await,
            Err(LedgerError::NotFound { .. })
        ));
    }
}
