//! In-memory storage backend for testing and development

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Datelike;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use crate::ledger::alias::DEFAULT_SUBACCOUNT;
use crate::traits::{LedgerStore, LedgerTx};
use crate::types::*;

#[derive(Debug, Clone, Default)]
struct State {
    accounts: HashMap<AccountId, Account>,
    aliases: HashMap<AccountCode, AccountId>,
    buckets: HashMap<(AccountId, i32, u32), BalanceBucket>,
    headers: HashMap<String, JournalHeader>,
    lines: HashMap<LineId, JournalLine>,
}

fn lock_poisoned<T>(_: PoisonError<T>) -> LedgerError {
    LedgerError::Storage("memory store lock poisoned".to_string())
}

/// In-memory ledger store.
///
/// A transaction stages its changes on a snapshot of the whole state and
/// swaps it in at commit; dropping the transaction discards the staging.
/// Concurrent transactions are last-commit-wins, which is acceptable for
/// tests and development. A relational backend maps [`LedgerTx`] onto a
/// real database transaction with row locking instead.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    /// Create a new, empty memory store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> LedgerResult<Self::Tx> {
        let staged = self.state.read().map_err(lock_poisoned)?.clone();
        Ok(MemoryTx {
            base: Arc::clone(&self.state),
            staged,
        })
    }
}

/// Unit of work over a [`MemoryStore`] snapshot
#[derive(Debug)]
pub struct MemoryTx {
    base: Arc<RwLock<State>>,
    staged: State,
}

#[async_trait]
impl LedgerTx for MemoryTx {
    async fn insert_account(&mut self, account: &Account) -> LedgerResult<()> {
        if self.staged.accounts.contains_key(&account.id) {
            return Err(LedgerError::Storage(format!(
                "duplicate account '{}'",
                account.id
            )));
        }
        self.staged
            .accounts
            .insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn get_account(&self, id: &AccountId) -> LedgerResult<Option<Account>> {
        Ok(self.staged.accounts.get(id).cloned())
    }

    async fn update_account(&mut self, account: &Account) -> LedgerResult<()> {
        if !self.staged.accounts.contains_key(&account.id) {
            return Err(LedgerError::UnknownAccount(account.id.clone()));
        }
        self.staged
            .accounts
            .insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn delete_account(&mut self, id: &AccountId) -> LedgerResult<()> {
        self.staged
            .accounts
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| LedgerError::UnknownAccount(id.clone()))
    }

    async fn list_accounts(&self, class: Option<AccountClass>) -> LedgerResult<Vec<Account>> {
        let mut accounts: Vec<Account> = self
            .staged
            .accounts
            .values()
            .filter(|account| class.is_none_or(|c| account.class == c))
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(accounts)
    }

    async fn account_is_referenced(&self, id: &AccountId) -> LedgerResult<bool> {
        if self
            .staged
            .buckets
            .keys()
            .any(|(account, _, _)| account == id)
        {
            return Ok(true);
        }
        for line in self.staged.lines.values() {
            let resolved = match self.staged.aliases.get(&line.account) {
                Some(mapped) => mapped.clone(),
                None => line.account.with_subaccount(DEFAULT_SUBACCOUNT)?,
            };
            if &resolved == id {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn get_alias(&self, code: &AccountCode) -> LedgerResult<Option<AccountId>> {
        Ok(self.staged.aliases.get(code).cloned())
    }

    async fn put_alias(&mut self, code: &AccountCode, id: &AccountId) -> LedgerResult<()> {
        self.staged.aliases.insert(code.clone(), id.clone());
        Ok(())
    }

    async fn remove_alias(&mut self, code: &AccountCode) -> LedgerResult<()> {
        self.staged.aliases.remove(code);
        Ok(())
    }

    async fn get_bucket(
        &self,
        account: &AccountId,
        year: i32,
        month: u32,
    ) -> LedgerResult<Option<BalanceBucket>> {
        Ok(self
            .staged
            .buckets
            .get(&(account.clone(), year, month))
            .cloned())
    }

    async fn put_bucket(&mut self, bucket: &BalanceBucket) -> LedgerResult<()> {
        self.staged.buckets.insert(
            (bucket.account.clone(), bucket.year, bucket.month),
            bucket.clone(),
        );
        Ok(())
    }

    async fn buckets_for_year(&self, year: i32) -> LedgerResult<Vec<BalanceBucket>> {
        let mut buckets: Vec<BalanceBucket> = self
            .staged
            .buckets
            .values()
            .filter(|bucket| bucket.year == year)
            .cloned()
            .collect();
        buckets.sort_by(|a, b| (&a.account, a.month).cmp(&(&b.account, b.month)));
        Ok(buckets)
    }

    async fn buckets_for_month(&self, year: i32, month: u32) -> LedgerResult<Vec<BalanceBucket>> {
        let mut buckets: Vec<BalanceBucket> = self
            .staged
            .buckets
            .values()
            .filter(|bucket| bucket.year == year && bucket.month == month)
            .cloned()
            .collect();
        buckets.sort_by(|a, b| a.account.cmp(&b.account));
        Ok(buckets)
    }

    async fn insert_header(&mut self, header: &JournalHeader) -> LedgerResult<()> {
        if self.staged.headers.contains_key(&header.transaction_no) {
            return Err(LedgerError::Storage(format!(
                "duplicate journal header '{}'",
                header.transaction_no
            )));
        }
        self.staged
            .headers
            .insert(header.transaction_no.clone(), header.clone());
        Ok(())
    }

    async fn get_header(&self, transaction_no: &str) -> LedgerResult<Option<JournalHeader>> {
        Ok(self.staged.headers.get(transaction_no).cloned())
    }

    async fn update_header(&mut self, header: &JournalHeader) -> LedgerResult<()> {
        if !self.staged.headers.contains_key(&header.transaction_no) {
            return Err(LedgerError::HeaderNotFound(header.transaction_no.clone()));
        }
        self.staged
            .headers
            .insert(header.transaction_no.clone(), header.clone());
        Ok(())
    }

    async fn delete_header(&mut self, transaction_no: &str) -> LedgerResult<()> {
        self.staged
            .headers
            .remove(transaction_no)
            .map(|_| ())
            .ok_or_else(|| LedgerError::HeaderNotFound(transaction_no.to_string()))
    }

    async fn insert_line(&mut self, line: &JournalLine) -> LedgerResult<()> {
        if self.staged.lines.contains_key(&line.id) {
            return Err(LedgerError::Storage(format!(
                "duplicate journal line '{}'",
                line.id
            )));
        }
        self.staged.lines.insert(line.id, line.clone());
        Ok(())
    }

    async fn get_line(&self, id: LineId) -> LedgerResult<Option<JournalLine>> {
        Ok(self.staged.lines.get(&id).cloned())
    }

    async fn update_line(&mut self, line: &JournalLine) -> LedgerResult<()> {
        if !self.staged.lines.contains_key(&line.id) {
            return Err(LedgerError::LineNotFound(line.id));
        }
        self.staged.lines.insert(line.id, line.clone());
        Ok(())
    }

    async fn delete_line(&mut self, id: LineId) -> LedgerResult<()> {
        self.staged
            .lines
            .remove(&id)
            .map(|_| ())
            .ok_or(LedgerError::LineNotFound(id))
    }

    async fn lines_for_header(&self, transaction_no: &str) -> LedgerResult<Vec<JournalLine>> {
        let mut lines: Vec<JournalLine> = self
            .staged
            .lines
            .values()
            .filter(|line| line.header_no == transaction_no)
            .cloned()
            .collect();
        lines.sort_by_key(|line| line.id);
        Ok(lines)
    }

    async fn aggregate_year_movements(&self, year: i32) -> LedgerResult<Vec<MovementAggregate>> {
        let mut sums: BTreeMap<(AccountCode, u32, Side), BigDecimal> = BTreeMap::new();
        for line in self.staged.lines.values() {
            let Some(header) = self.staged.headers.get(&line.header_no) else {
                continue;
            };
            if header.date.year() != year {
                continue;
            }
            *sums
                .entry((line.account.clone(), header.date.month(), line.side))
                .or_insert_with(|| BigDecimal::from(0)) += &line.amount;
        }
        Ok(sums
            .into_iter()
            .map(|((account, month, side), total)| MovementAggregate {
                account,
                month,
                side,
                total,
            })
            .collect())
    }

    async fn commit(self) -> LedgerResult<()> {
        *self.base.write().map_err(lock_poisoned)? = self.staged;
        Ok(())
    }

    async fn rollback(self) -> LedgerResult<()> {
        Ok(())
    }
}
