//! Ledger facade that owns transaction boundaries
//!
//! Engines operate against a caller-supplied unit of work; this facade is
//! the convenience path that begins a transaction per public operation,
//! commits on success, and rolls back on any error. Callers who need to
//! compose several operations atomically begin their own transaction and
//! drive the engines directly.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::closing;
use crate::ledger::alias;
use crate::ledger::directory::{self, AccountDirectory};
use crate::ledger::posting::{PostingEngine, Voucher};
use crate::traits::{LedgerStore, LedgerTx};
use crate::types::*;

/// Main entry point for ledger operations over a storage backend
pub struct Ledger<S: LedgerStore> {
    store: S,
}

impl<S: LedgerStore> Ledger<S> {
    /// Create a ledger over the given storage backend
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store, for callers composing their own units of work
    pub fn store(&self) -> &S {
        &self.store
    }

    // -- chart of accounts --

    /// Create a new account
    pub async fn create_account(
        &mut self,
        id: AccountId,
        name: impl Into<String>,
        side: Side,
        class: AccountClass,
    ) -> LedgerResult<Account> {
        let mut tx = self.store.begin().await?;
        match AccountDirectory::new(&mut tx)
            .create_account(id, name, side, class)
            .await
        {
            Ok(account) => {
                tx.commit().await?;
                Ok(account)
            }
            Err(err) => {
                tx.rollback().await?;
                Err(err)
            }
        }
    }

    /// Get an account by identity
    pub async fn get_account(&self, id: &AccountId) -> LedgerResult<Option<Account>> {
        let tx = self.store.begin().await?;
        let result = tx.get_account(id).await;
        tx.rollback().await?;
        result
    }

    /// List all accounts
    pub async fn list_accounts(&self) -> LedgerResult<Vec<Account>> {
        let tx = self.store.begin().await?;
        let result = tx.list_accounts(None).await;
        tx.rollback().await?;
        result
    }

    /// List accounts of one class
    pub async fn list_accounts_by_class(&self, class: AccountClass) -> LedgerResult<Vec<Account>> {
        let tx = self.store.begin().await?;
        let result = tx.list_accounts(Some(class)).await;
        tx.rollback().await?;
        result
    }

    /// Update an account's name, side, or class
    pub async fn update_account(&mut self, account: &Account) -> LedgerResult<()> {
        let mut tx = self.store.begin().await?;
        match AccountDirectory::new(&mut tx).update_account(account).await {
            Ok(()) => tx.commit().await,
            Err(err) => {
                tx.rollback().await?;
                Err(err)
            }
        }
    }

    /// Delete an unreferenced account
    pub async fn delete_account(&mut self, id: &AccountId) -> LedgerResult<()> {
        let mut tx = self.store.begin().await?;
        match AccountDirectory::new(&mut tx).delete_account(id).await {
            Ok(()) => tx.commit().await,
            Err(err) => {
                tx.rollback().await?;
                Err(err)
            }
        }
    }

    /// Seed a minimal standard chart of accounts
    pub async fn seed_standard_chart(&mut self) -> LedgerResult<Vec<Account>> {
        let mut tx = self.store.begin().await?;
        match directory::seed_chart(&mut tx).await {
            Ok(accounts) => {
                tx.commit().await?;
                Ok(accounts)
            }
            Err(err) => {
                tx.rollback().await?;
                Err(err)
            }
        }
    }

    // -- aliases --

    /// Map a transactional code to a canonical identity
    pub async fn set_alias(&mut self, code: &AccountCode, id: &AccountId) -> LedgerResult<()> {
        let mut tx = self.store.begin().await?;
        match AccountDirectory::new(&mut tx).set_alias(code, id).await {
            Ok(()) => tx.commit().await,
            Err(err) => {
                tx.rollback().await?;
                Err(err)
            }
        }
    }

    /// Remove an alias mapping
    pub async fn remove_alias(&mut self, code: &AccountCode) -> LedgerResult<()> {
        let mut tx = self.store.begin().await?;
        match AccountDirectory::new(&mut tx).remove_alias(code).await {
            Ok(()) => tx.commit().await,
            Err(err) => {
                tx.rollback().await?;
                Err(err)
            }
        }
    }

    /// Resolve a transactional code to its canonical identity
    pub async fn resolve_account(&self, code: &AccountCode) -> LedgerResult<AccountId> {
        let tx = self.store.begin().await?;
        let result = alias::resolve_account(&tx, code).await;
        tx.rollback().await?;
        result
    }

    // -- journal --

    /// Create a journal header
    pub async fn create_header(&mut self, header: JournalHeader) -> LedgerResult<JournalHeader> {
        let mut tx = self.store.begin().await?;
        match PostingEngine::new(&mut tx).create_header(header).await {
            Ok(header) => {
                tx.commit().await?;
                Ok(header)
            }
            Err(err) => {
                tx.rollback().await?;
                Err(err)
            }
        }
    }

    /// Update a header's date, memo, and kind, re-posting owned lines
    /// when the period changes
    pub async fn update_header(
        &mut self,
        transaction_no: &str,
        date: NaiveDate,
        memo: impl Into<String>,
        kind: JournalKind,
    ) -> LedgerResult<JournalHeader> {
        let mut tx = self.store.begin().await?;
        match PostingEngine::new(&mut tx)
            .update_header(transaction_no, date, memo, kind)
            .await
        {
            Ok(header) => {
                tx.commit().await?;
                Ok(header)
            }
            Err(err) => {
                tx.rollback().await?;
                Err(err)
            }
        }
    }

    /// Delete a header that owns no lines
    pub async fn delete_header(&mut self, transaction_no: &str) -> LedgerResult<()> {
        let mut tx = self.store.begin().await?;
        match PostingEngine::new(&mut tx).delete_header(transaction_no).await {
            Ok(()) => tx.commit().await,
            Err(err) => {
                tx.rollback().await?;
                Err(err)
            }
        }
    }

    /// Get a header by transaction number
    pub async fn get_header(&self, transaction_no: &str) -> LedgerResult<Option<JournalHeader>> {
        let tx = self.store.begin().await?;
        let result = tx.get_header(transaction_no).await;
        tx.rollback().await?;
        result
    }

    /// All lines owned by a header
    pub async fn lines_for_header(&self, transaction_no: &str) -> LedgerResult<Vec<JournalLine>> {
        let tx = self.store.begin().await?;
        let result = tx.lines_for_header(transaction_no).await;
        tx.rollback().await?;
        result
    }

    /// Insert a journal line, posting its balance effect
    pub async fn insert_line(&mut self, new: NewJournalLine) -> LedgerResult<JournalLine> {
        let mut tx = self.store.begin().await?;
        match PostingEngine::new(&mut tx).insert_line(new).await {
            Ok(line) => {
                tx.commit().await?;
                Ok(line)
            }
            Err(err) => {
                tx.rollback().await?;
                Err(err)
            }
        }
    }

    /// Update a journal line, correcting buckets and header totals
    pub async fn update_line(&mut self, id: LineId, values: LineValues) -> LedgerResult<JournalLine> {
        let mut tx = self.store.begin().await?;
        match PostingEngine::new(&mut tx).update_line(id, values).await {
            Ok(line) => {
                tx.commit().await?;
                Ok(line)
            }
            Err(err) => {
                tx.rollback().await?;
                Err(err)
            }
        }
    }

    /// Delete a journal line, reversing its balance effect
    pub async fn delete_line(&mut self, id: LineId) -> LedgerResult<()> {
        let mut tx = self.store.begin().await?;
        match PostingEngine::new(&mut tx).delete_line(id).await {
            Ok(()) => tx.commit().await,
            Err(err) => {
                tx.rollback().await?;
                Err(err)
            }
        }
    }

    /// Get a line by identifier
    pub async fn get_line(&self, id: LineId) -> LedgerResult<Option<JournalLine>> {
        let tx = self.store.begin().await?;
        let result = tx.get_line(id).await;
        tx.rollback().await?;
        result
    }

    /// Bulk save of a brand-new voucher: header plus all legs
    pub async fn record_voucher(&mut self, voucher: Voucher) -> LedgerResult<Vec<JournalLine>> {
        let mut tx = self.store.begin().await?;
        match PostingEngine::new(&mut tx).record_voucher(voucher).await {
            Ok(lines) => {
                tx.commit().await?;
                Ok(lines)
            }
            Err(err) => {
                tx.rollback().await?;
                Err(err)
            }
        }
    }

    // -- balances --

    /// Get the balance bucket for (account, year, month)
    pub async fn get_bucket(
        &self,
        account: &AccountId,
        year: i32,
        month: u32,
    ) -> LedgerResult<Option<BalanceBucket>> {
        let tx = self.store.begin().await?;
        let result = tx.get_bucket(account, year, month).await;
        tx.rollback().await?;
        result
    }

    /// All buckets of a fiscal year
    pub async fn buckets_for_year(&self, year: i32) -> LedgerResult<Vec<BalanceBucket>> {
        let tx = self.store.begin().await?;
        let result = tx.buckets_for_year(year).await;
        tx.rollback().await?;
        result
    }

    /// Ending balance of an account for (year, month); zero when the
    /// bucket does not exist
    pub async fn ending_balance(
        &self,
        account: &AccountId,
        year: i32,
        month: u32,
    ) -> LedgerResult<BigDecimal> {
        let tx = self.store.begin().await?;
        let result = async {
            let stored = tx
                .get_account(account)
                .await?
                .ok_or_else(|| LedgerError::UnknownAccount(account.clone()))?;
            Ok(match tx.get_bucket(account, year, month).await? {
                Some(bucket) => bucket.ending_balance(stored.side),
                None => BigDecimal::from(0),
            })
        }
        .await;
        tx.rollback().await?;
        result
    }

    // -- period closing --

    /// Rebuild a year's buckets from the journal store
    pub async fn repost_year(&mut self, year: i32) -> LedgerResult<()> {
        let mut tx = self.store.begin().await?;
        match closing::repost_year(&mut tx, year).await {
            Ok(()) => tx.commit().await,
            Err(err) => {
                tx.rollback().await?;
                Err(err)
            }
        }
    }

    /// Advance one month's ending balances into the next month
    pub async fn close_month(&mut self, year: i32, month: u32) -> LedgerResult<()> {
        let mut tx = self.store.begin().await?;
        match closing::close_month(&mut tx, year, month).await {
            Ok(()) => tx.commit().await,
            Err(err) => {
                tx.rollback().await?;
                Err(err)
            }
        }
    }

    /// Advance December balances into the next fiscal year
    pub async fn close_year(
        &mut self,
        year: i32,
        accounts: &closing::ClosingAccounts,
    ) -> LedgerResult<()> {
        let mut tx = self.store.begin().await?;
        match closing::close_year(&mut tx, year, accounts).await {
            Ok(()) => tx.commit().await,
            Err(err) => {
                tx.rollback().await?;
                Err(err)
            }
        }
    }
}
