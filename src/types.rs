//! Core types and data structures for the general-ledger engine

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

fn is_segmented_code(value: &str, segments: usize) -> bool {
    let parts: Vec<&str> = value.split('.').collect();
    parts.len() == segments
        && parts
            .iter()
            .all(|part| part.len() == 3 && part.chars().all(|c| c.is_ascii_digit()))
}

/// Canonical ledger account identity: three dot-separated 3-digit segments
/// (e.g. `020.001.001`).
///
/// Identity is immutable once an account is created; edits may change the
/// account's name, side, or class, never its identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// The identity as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccountId {
    type Err = LedgerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if is_segmented_code(value, 3) {
            Ok(Self(value.to_string()))
        } else {
            Err(LedgerError::Validation(format!(
                "Account identity '{value}' must be three dot-separated 3-digit segments"
            )))
        }
    }
}

impl TryFrom<String> for AccountId {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Short transactional account code: two dot-separated 3-digit segments
/// (e.g. `020.001`), as entered on journal lines.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountCode(String);

impl AccountCode {
    /// The code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append a subaccount segment, producing a canonical identity
    pub fn with_subaccount(&self, subaccount: &str) -> LedgerResult<AccountId> {
        format!("{}.{}", self.0, subaccount).parse()
    }
}

impl FromStr for AccountCode {
    type Err = LedgerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if is_segmented_code(value, 2) {
            Ok(Self(value.to_string()))
        } else {
            Err(LedgerError::Validation(format!(
                "Account code '{value}' must be two dot-separated 3-digit segments"
            )))
        }
    }
}

impl TryFrom<String> for AccountCode {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AccountCode> for String {
    fn from(code: AccountCode) -> Self {
        code.0
    }
}

impl fmt::Display for AccountCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two sides of a double-entry posting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Debit entry - increases Debit-normal balances, decreases Credit-normal ones
    Debit,
    /// Credit entry - increases Credit-normal balances, decreases Debit-normal ones
    Credit,
}

impl Side {
    /// The opposing side
    pub fn opposite(self) -> Side {
        match self {
            Side::Debit => Side::Credit,
            Side::Credit => Side::Debit,
        }
    }
}

/// Account classes following standard accounting principles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountClass {
    /// Assets - what the business owns
    Asset,
    /// Liabilities - what the business owes
    Liability,
    /// Equity - owner's interest in the business
    Equity,
    /// Revenue - money earned during a period
    Revenue,
    /// Expenses - costs incurred during a period
    Expense,
}

impl AccountClass {
    /// Returns the side on which accounts of this class naturally increase.
    /// Assets and Expenses normally carry debit balances; Liabilities,
    /// Equity, and Revenue normally carry credit balances.
    pub fn normal_side(self) -> Side {
        match self {
            AccountClass::Asset | AccountClass::Expense => Side::Debit,
            AccountClass::Liability | AccountClass::Equity | AccountClass::Revenue => Side::Credit,
        }
    }

    /// Flow accounts are measured per period and reset at closings;
    /// balance-sheet accounts carry forward.
    pub fn is_flow(self) -> bool {
        matches!(self, AccountClass::Revenue | AccountClass::Expense)
    }
}

/// A ledger account in the chart of accounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Canonical identity, unique and immutable
    pub id: AccountId,
    /// Human-readable account name
    pub name: String,
    /// Normal balance side
    pub side: Side,
    /// Account class
    pub class: AccountClass,
}

impl Account {
    /// Create a new account with the class's normal side
    pub fn new(id: AccountId, name: impl Into<String>, class: AccountClass) -> Self {
        Self {
            id,
            name: name.into(),
            side: class.normal_side(),
            class,
        }
    }
}

/// Per-account, per-period balance record.
///
/// Month 0 is the year-opening snapshot; months 1-12 are calendar months.
/// A bucket holds the period's opening balance plus the debit and credit
/// movement accumulated within the period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceBucket {
    pub account: AccountId,
    pub year: i32,
    /// Period month, 0..=12
    pub month: u32,
    /// Opening balance carried into the period
    pub opening: BigDecimal,
    /// Accumulated debit movement within the period
    pub debit: BigDecimal,
    /// Accumulated credit movement within the period
    pub credit: BigDecimal,
}

impl BalanceBucket {
    /// A fresh bucket with all amounts zero
    pub fn zeroed(account: AccountId, year: i32, month: u32) -> Self {
        Self {
            account,
            year,
            month,
            opening: BigDecimal::from(0),
            debit: BigDecimal::from(0),
            credit: BigDecimal::from(0),
        }
    }

    /// Ending balance of the period for an account with the given normal side
    pub fn ending_balance(&self, side: Side) -> BigDecimal {
        match side {
            Side::Debit => &self.opening + &self.debit - &self.credit,
            Side::Credit => &self.opening + &self.credit - &self.debit,
        }
    }

    /// Add a movement to the accumulator for the given side
    pub fn add_movement(&mut self, side: Side, amount: &BigDecimal) {
        match side {
            Side::Debit => self.debit += amount,
            Side::Credit => self.credit += amount,
        }
    }

    /// Remove a movement from the accumulator for the given side.
    /// Exact negation of [`BalanceBucket::add_movement`].
    pub fn subtract_movement(&mut self, side: Side, amount: &BigDecimal) {
        match side {
            Side::Debit => self.debit -= amount,
            Side::Credit => self.credit -= amount,
        }
    }
}

/// Journal transaction kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JournalKind {
    /// Ordinary journal entry
    Ordinary,
    /// Adjusting (memorial) entry
    Adjusting,
}

impl JournalKind {
    /// Single-letter code used by external producers ("J" / "M")
    pub fn code(self) -> &'static str {
        match self {
            JournalKind::Ordinary => "J",
            JournalKind::Adjusting => "M",
        }
    }

    /// Parse the single-letter code
    pub fn from_code(code: &str) -> LedgerResult<Self> {
        match code {
            "J" => Ok(JournalKind::Ordinary),
            "M" => Ok(JournalKind::Adjusting),
            other => Err(LedgerError::Validation(format!(
                "Unknown journal kind code '{other}'"
            ))),
        }
    }
}

/// Journal transaction header, one per voucher.
///
/// The aggregate totals always equal the sum of the header's existing
/// lines per side; they are maintained inside the same unit of work as
/// every line mutation, never recomputed lazily.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalHeader {
    /// Caller-assigned unique transaction number
    pub transaction_no: String,
    /// Transaction date; determines the posting period
    pub date: NaiveDate,
    /// Free-text memo
    pub memo: String,
    pub kind: JournalKind,
    /// Sum of debit legs
    pub total_debit: BigDecimal,
    /// Sum of credit legs
    pub total_credit: BigDecimal,
}

impl JournalHeader {
    /// Create a header with zero totals
    pub fn new(
        transaction_no: impl Into<String>,
        date: NaiveDate,
        memo: impl Into<String>,
        kind: JournalKind,
    ) -> Self {
        Self {
            transaction_no: transaction_no.into(),
            date,
            memo: memo.into(),
            kind,
            total_debit: BigDecimal::from(0),
            total_credit: BigDecimal::from(0),
        }
    }
}

/// Generated journal-line identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineId(Uuid);

impl LineId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LineId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A single debit or credit leg of a journal transaction.
///
/// Header ownership is fixed at insert; account, side, amount, and
/// narration are mutable afterwards, with the posting engine correcting
/// the affected buckets and header totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalLine {
    pub id: LineId,
    /// Owning header's transaction number
    pub header_no: String,
    /// Short transactional account code
    pub account: AccountCode,
    pub side: Side,
    /// Non-negative amount
    pub amount: BigDecimal,
    /// Free-text narration
    pub narration: String,
}

/// Payload for inserting a new journal line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewJournalLine {
    pub header_no: String,
    pub account: AccountCode,
    pub side: Side,
    pub amount: BigDecimal,
    pub narration: String,
}

/// Payload for updating an existing journal line.
///
/// Carries no header field: a line cannot be reassigned to a different
/// header once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineValues {
    pub account: AccountCode,
    pub side: Side,
    pub amount: BigDecimal,
    pub narration: String,
}

/// One row of the year-movement aggregation: the summed amount posted to
/// a transactional account code in a month, per side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementAggregate {
    pub account: AccountCode,
    pub month: u32,
    pub side: Side,
    pub total: BigDecimal,
}

/// Errors that can occur in the ledger engine
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Journal header not found: {0}")]
    HeaderNotFound(String),
    #[error("Journal line not found: {0}")]
    LineNotFound(LineId),
    #[error("Unknown account: {0}")]
    UnknownAccount(AccountId),
    #[error("Invalid closing period: month {0}")]
    InvalidPeriod(u32),
    #[error("Unbalanced journal: debits = {debit}, credits = {credit}")]
    UnbalancedInput {
        debit: BigDecimal,
        credit: BigDecimal,
    },
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
