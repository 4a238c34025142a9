//! Reposting: full rebuild of a year's balance buckets from the journal

use std::collections::{BTreeMap, BTreeSet};

use bigdecimal::BigDecimal;
use tracing::{info, warn};

use crate::ledger::alias::resolve_account;
use crate::traits::LedgerTx;
use crate::types::*;

/// Discard incremental movement state for `year` and rebuild it purely
/// from the journal store, then roll balances forward month by month.
///
/// Opening balances (the month-0 snapshot included) are never touched:
/// they carry prior-year or migration state that is not derivable from
/// this year's journal. Accounts referenced by historical buckets but
/// missing from the directory are skipped with a warning during the
/// roll; everywhere else a missing account is fatal.
///
/// This is the recovery path after bulk journal import, since real-time
/// posting assumes buckets already reflect reality. Running it twice
/// with no intervening journal changes yields identical buckets.
pub async fn repost_year<T: LedgerTx>(tx: &mut T, year: i32) -> LedgerResult<()> {
    info!(year, "reposting year from journal");

    // discard incremental movement state; openings stay
    let mut accounts = BTreeSet::new();
    for mut bucket in tx.buckets_for_year(year).await? {
        accounts.insert(bucket.account.clone());
        bucket.debit = BigDecimal::from(0);
        bucket.credit = BigDecimal::from(0);
        tx.put_bucket(&bucket).await?;
    }

    // rebuild movements from the typed year aggregation; two codes may
    // resolve to the same canonical account, so merge after resolving
    let mut merged: BTreeMap<(AccountId, u32), (BigDecimal, BigDecimal)> = BTreeMap::new();
    for row in tx.aggregate_year_movements(year).await? {
        let account = resolve_account(tx, &row.account).await?;
        let sums = merged
            .entry((account, row.month))
            .or_insert_with(|| (BigDecimal::from(0), BigDecimal::from(0)));
        match row.side {
            Side::Debit => sums.0 += &row.total,
            Side::Credit => sums.1 += &row.total,
        }
    }

    let rebuilt = merged.len();
    for ((account, month), (debit, credit)) in merged {
        let mut bucket = tx
            .get_bucket(&account, year, month)
            .await?
            .unwrap_or_else(|| BalanceBucket::zeroed(account.clone(), year, month));
        bucket.debit = debit;
        bucket.credit = credit;
        tx.put_bucket(&bucket).await?;
        accounts.insert(account);
    }

    // roll balances forward: ending of month m becomes opening of m+1
    for account in &accounts {
        let Some(stored) = tx.get_account(account).await? else {
            warn!(account = %account, "account missing from directory; skipping balance roll");
            continue;
        };
        for month in 1..=11 {
            let bucket = tx
                .get_bucket(account, year, month)
                .await?
                .unwrap_or_else(|| BalanceBucket::zeroed(account.clone(), year, month));
            let ending = bucket.ending_balance(stored.side);

            let mut next = tx
                .get_bucket(account, year, month + 1)
                .await?
                .unwrap_or_else(|| BalanceBucket::zeroed(account.clone(), year, month + 1));
            next.opening = ending;
            tx.put_bucket(&next).await?;
        }
    }

    info!(year, buckets = rebuilt, accounts = accounts.len(), "repost complete");
    Ok(())
}
