use crate::domain::account::{Account, Role};
use crate::domain::transfer::Transfer;
use crate::error::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct AccountRow<'a> {
    id: u64,
    name: &'a str,
    document: &'a str,
    email: &'a str,
    balance: Decimal,
    role: Role,
}

#[derive(Serialize)]
struct TransferRow {
    id: u64,
    amount: Decimal,
    payer: u64,
    payee: u64,
    created_at: DateTime<Utc>,
}

/// Writes ledger state as CSV. Credentials are never written.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_accounts(&mut self, accounts: &[Account]) -> Result<()> {
        if accounts.is_empty() {
            self.writer
                .write_record(["id", "name", "document", "email", "balance", "role"])?;
        }
        for account in accounts {
            self.writer.serialize(AccountRow {
                id: account.id.0,
                name: &account.name,
                document: &account.document,
                email: &account.email,
                balance: account.balance.value(),
                role: account.role,
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_transfers(&mut self, transfers: &[Transfer]) -> Result<()> {
        if transfers.is_empty() {
            self.writer
                .write_record(["id", "amount", "payer", "payee", "created_at"])?;
        }
        for transfer in transfers {
            self.writer.serialize(TransferRow {
                id: transfer.id.0,
                amount: transfer.amount.value(),
                payer: transfer.payer.0,
                payee: transfer.payee.0,
                created_at: transfer.created_at,
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
