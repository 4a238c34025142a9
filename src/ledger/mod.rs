//! Ledger module: chart of accounts, alias resolution, real-time posting,
//! and the transaction-owning facade

pub mod alias;
pub mod core;
pub mod directory;
pub mod posting;

pub use alias::*;
pub use core::*;
pub use directory::*;
pub use posting::*;
