//! # GL Core
//!
//! A general-ledger bookkeeping engine providing double-entry journal
//! posting, per-period balance buckets, and fiscal-period closing.
//!
//! ## Features
//!
//! - **Chart of accounts**: canonical 3-segment account identities with
//!   normal balance side and account class
//! - **Alias resolution**: short 2-segment transactional codes resolve to
//!   canonical accounts, with a deterministic fallback
//! - **Real-time posting**: balance buckets mirror the journal as lines
//!   are inserted, edited, or deleted, with header totals kept exact
//! - **Reposting**: full rebuild of a year's buckets from the journal,
//!   the recovery path after bulk import
//! - **Period closing**: month and year-end advancement with
//!   class-specific reset/carry-forward rules
//! - **Storage abstraction**: engines run against any backend that
//!   implements the [`LedgerStore`]/[`LedgerTx`] unit-of-work traits
//!
//! ## Quick Start
//!
//! ```rust
//! use gl_core::{Ledger, VoucherBuilder, utils::MemoryStore};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> gl_core::LedgerResult<()> {
//! let mut ledger = Ledger::new(MemoryStore::new());
//! ledger.seed_standard_chart().await?;
//!
//! let voucher = VoucherBuilder::new(
//!     "V-001",
//!     NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
//!     "Cash sale",
//! )
//! .debit("001.000".parse()?, BigDecimal::from(1000), "")
//! .credit("020.001".parse()?, BigDecimal::from(1000), "")
//! .build()?;
//! ledger.record_voucher(voucher).await?;
//! # Ok(())
//! # }
//! ```

pub mod closing;
pub mod ledger;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use closing::*;
pub use ledger::*;
pub use traits::*;
pub use types::*;
