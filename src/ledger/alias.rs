//! Resolution of short transactional account codes to canonical identities

use crate::traits::LedgerTx;
use crate::types::*;

/// Subaccount segment appended when no explicit alias exists
pub const DEFAULT_SUBACCOUNT: &str = "001";

/// Resolve a 2-segment transactional code to its canonical 3-segment
/// account identity.
///
/// A missing alias is not an error: the identity is synthesized by
/// appending [`DEFAULT_SUBACCOUNT`], so every syntactically valid code
/// resolves. Only storage failures propagate. No side effects; a miss
/// does not write an alias row.
pub async fn resolve_account<T: LedgerTx>(tx: &T, code: &AccountCode) -> LedgerResult<AccountId> {
    match tx.get_alias(code).await? {
        Some(id) => Ok(id),
        None => code.with_subaccount(DEFAULT_SUBACCOUNT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::LedgerStore;
    use crate::utils::memory_store::MemoryStore;

    #[tokio::test]
    async fn falls_back_to_default_subaccount() {
        let store = MemoryStore::new();
        let tx = store.begin().await.unwrap();

        let code: AccountCode = "110.001".parse().unwrap();
        let resolved = resolve_account(&tx, &code).await.unwrap();
        assert_eq!(resolved.as_str(), "110.001.001");
    }

    #[tokio::test]
    async fn prefers_explicit_alias() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        let code: AccountCode = "110.001".parse().unwrap();
        let target: AccountId = "110.009.002".parse().unwrap();
        tx.put_alias(&code, &target).await.unwrap();

        let resolved = resolve_account(&tx, &code).await.unwrap();
        assert_eq!(resolved, target);
    }
}
