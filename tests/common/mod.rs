#![allow(dead_code)]

use p2p_ledger::Ledger;
use p2p_ledger::domain::account::{Account, NewAccount, Role};
use p2p_ledger::infrastructure::in_memory::InMemoryLedgerStore;
use rust_decimal::Decimal;
use std::io::Error;
use std::path::Path;
use std::sync::Arc;

pub const COMMAND_HEADER: [&str; 10] = [
    "command", "name", "document", "email", "password", "balance", "role", "payer", "payee",
    "amount",
];

/// Documents with valid check digits, usable as distinct account keys.
pub const DOCUMENTS: [&str; 5] = [
    "52998224725",
    "11144477735",
    "12345678909",
    "39053344705",
    "11222333000181",
];

pub fn in_memory_ledger() -> Ledger {
    Ledger::new(Arc::new(InMemoryLedgerStore::new()))
}

pub fn new_account(email: &str, document: &str, balance: Decimal, role: Role) -> NewAccount {
    NewAccount {
        name: Some(email.to_string()),
        document: Some(document.to_string()),
        email: Some(email.to_string()),
        password: Some("secret".to_string()),
        balance: Some(balance),
        role: Some(role),
    }
}

pub async fn open_account(
    ledger: &Ledger,
    email: &str,
    document: &str,
    balance: Decimal,
    role: Role,
) -> Account {
    ledger
        .accounts
        .create(new_account(email, document, balance, role))
        .await
        .unwrap()
}

/// Writes a command batch funding one payer and paying `rows` transfers of
/// 1.00 each to a single payee.
pub fn generate_csv(path: &Path, rows: usize) -> Result<(), Error> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(COMMAND_HEADER)?;
    wtr.write_record([
        "create", "Payer", DOCUMENTS[0], "payer@example.com", "pw", "1000000", "common", "", "",
        "",
    ])?;
    wtr.write_record([
        "create", "Payee", DOCUMENTS[1], "payee@example.com", "pw", "0", "common", "", "", "",
    ])?;
    for _ in 0..rows {
        wtr.write_record([
            "transfer",
            "",
            "",
            "",
            "",
            "",
            "",
            "payer@example.com",
            "payee@example.com",
            "1.00",
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
