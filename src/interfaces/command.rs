use crate::application::Ledger;
use crate::domain::account::{AccountPatch, NewAccount, Role};
use crate::domain::transfer::TransferRequest;
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    Create,
    Update,
    Delete,
    Transfer,
}

/// One row of a batch file.
///
/// Accounts are addressed by email. Blank columns are absent values, which
/// for `update` means "leave untouched".
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct LedgerCommand {
    pub command: CommandType,
    pub name: Option<String>,
    pub document: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub balance: Option<Decimal>,
    pub role: Option<String>,
    pub payer: Option<String>,
    pub payee: Option<String>,
    pub amount: Option<Decimal>,
}

fn parse_role(role: Option<String>) -> Result<Option<Role>> {
    role.map(|role| role.parse()).transpose()
}

fn required(value: Option<String>, field: &str, command: &str) -> Result<String> {
    value.ok_or_else(|| LedgerError::validation(format!("{command} command requires {field}")))
}

impl LedgerCommand {
    pub async fn apply(self, ledger: &Ledger) -> Result<()> {
        match self.command {
            CommandType::Create => {
                ledger
                    .accounts
                    .create(NewAccount {
                        name: self.name,
                        document: self.document,
                        email: self.email,
                        password: self.password,
                        balance: self.balance,
                        role: parse_role(self.role)?,
                    })
                    .await?;
            }
            CommandType::Update => {
                let email = required(self.email, "an email", "update")?;
                let account = ledger.accounts.find_by_email(&email).await?;
                ledger
                    .accounts
                    .update(
                        account.id,
                        AccountPatch {
                            id: None,
                            name: self.name,
                            document: self.document,
                            email: None,
                            password: self.password,
                            balance: self.balance,
                            role: parse_role(self.role)?,
                        },
                    )
                    .await?;
            }
            CommandType::Delete => {
                let email = required(self.email, "an email", "delete")?;
                let account = ledger.accounts.find_by_email(&email).await?;
                ledger.accounts.delete(account.id).await?;
            }
            CommandType::Transfer => {
                let payer = required(self.payer, "a payer", "transfer")?;
                let payee = required(self.payee, "a payee", "transfer")?;
                let payer = ledger.accounts.find_by_email(&payer).await?;
                let payee = ledger.accounts.find_by_email(&payee).await?;
                ledger
                    .transfers
                    .execute(TransferRequest {
                        amount: self.amount,
                        payer: payer.id,
                        payee: payee.id,
                        requested_at: None,
                    })
                    .await?;
            }
        }
        Ok(())
    }
}
