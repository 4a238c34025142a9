//! Storage abstraction for the ledger engine
//!
//! All reads and writes go through a [`LedgerTx`] unit of work obtained
//! from a [`LedgerStore`]. Engines borrow a caller-supplied transaction
//! and never manage commit/rollback themselves; the [`Ledger`](crate::Ledger)
//! facade owns that plumbing. Nothing staged inside a transaction is
//! visible to other transactions until commit.

use async_trait::async_trait;

use crate::types::*;

/// Handle to a ledger storage backend (PostgreSQL, SQLite, in-memory, ...).
///
/// The only way to touch data is to begin a unit of work.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// The backend's unit-of-work type
    type Tx: LedgerTx;

    /// Begin a new unit of work
    async fn begin(&self) -> LedgerResult<Self::Tx>;
}

/// One atomic unit of work against ledger storage.
///
/// Serialization of concurrent writers to the same balance bucket is the
/// backend's responsibility (row locks in a relational backend). Dropping
/// a transaction without committing discards every staged change.
#[async_trait]
pub trait LedgerTx: Send {
    // -- chart of accounts --

    /// Insert a new account; the identity must not already exist
    async fn insert_account(&mut self, account: &Account) -> LedgerResult<()>;

    /// Get an account by identity
    async fn get_account(&self, id: &AccountId) -> LedgerResult<Option<Account>>;

    /// Update an existing account's name, side, or class
    async fn update_account(&mut self, account: &Account) -> LedgerResult<()>;

    /// Remove an account row. Referential guards live in the directory,
    /// not here.
    async fn delete_account(&mut self, id: &AccountId) -> LedgerResult<()>;

    /// List accounts, optionally filtered by class
    async fn list_accounts(&self, class: Option<AccountClass>) -> LedgerResult<Vec<Account>>;

    /// Whether any balance bucket or journal line references the account.
    /// Lines reference accounts through their transactional code, so the
    /// check resolves codes the same way posting does.
    async fn account_is_referenced(&self, id: &AccountId) -> LedgerResult<bool>;

    // -- alias mappings --

    /// Look up the explicit alias for a transactional code
    async fn get_alias(&self, code: &AccountCode) -> LedgerResult<Option<AccountId>>;

    /// Create or replace an alias mapping
    async fn put_alias(&mut self, code: &AccountCode, id: &AccountId) -> LedgerResult<()>;

    /// Remove an alias mapping; removing an absent mapping is a no-op
    async fn remove_alias(&mut self, code: &AccountCode) -> LedgerResult<()>;

    // -- balance buckets --

    /// Get the bucket for (account, year, month)
    async fn get_bucket(
        &self,
        account: &AccountId,
        year: i32,
        month: u32,
    ) -> LedgerResult<Option<BalanceBucket>>;

    /// Create or replace a bucket
    async fn put_bucket(&mut self, bucket: &BalanceBucket) -> LedgerResult<()>;

    /// All buckets of a fiscal year, in deterministic order
    async fn buckets_for_year(&self, year: i32) -> LedgerResult<Vec<BalanceBucket>>;

    /// All buckets of one (year, month), in deterministic order
    async fn buckets_for_month(&self, year: i32, month: u32) -> LedgerResult<Vec<BalanceBucket>>;

    // -- journal headers --

    /// Insert a new header; the transaction number must not already exist
    async fn insert_header(&mut self, header: &JournalHeader) -> LedgerResult<()>;

    /// Get a header by transaction number
    async fn get_header(&self, transaction_no: &str) -> LedgerResult<Option<JournalHeader>>;

    /// Update an existing header
    async fn update_header(&mut self, header: &JournalHeader) -> LedgerResult<()>;

    /// Remove a header row. The lines-exist guard lives in the posting
    /// engine, not here.
    async fn delete_header(&mut self, transaction_no: &str) -> LedgerResult<()>;

    // -- journal lines --

    /// Insert a new line
    async fn insert_line(&mut self, line: &JournalLine) -> LedgerResult<()>;

    /// Get a line by identifier
    async fn get_line(&self, id: LineId) -> LedgerResult<Option<JournalLine>>;

    /// Update an existing line
    async fn update_line(&mut self, line: &JournalLine) -> LedgerResult<()>;

    /// Remove a line
    async fn delete_line(&mut self, id: LineId) -> LedgerResult<()>;

    /// All lines owned by a header, in deterministic order
    async fn lines_for_header(&self, transaction_no: &str) -> LedgerResult<Vec<JournalLine>>;

    // -- aggregation --

    /// Sum journal lines whose header date falls in `year`, grouped by
    /// (transactional account code, header month, side), in deterministic
    /// order
    async fn aggregate_year_movements(&self, year: i32) -> LedgerResult<Vec<MovementAggregate>>;

    // -- transaction control --

    /// Commit every staged change
    async fn commit(self) -> LedgerResult<()>;

    /// Discard every staged change
    async fn rollback(self) -> LedgerResult<()>;
}
