//! Monthly closing: advance one month's ending balances into the next

use bigdecimal::BigDecimal;
use tracing::{debug, info};

use crate::traits::LedgerTx;
use crate::types::*;

/// Advance the ending balance of every account with a bucket in
/// (`year`, `month`) into the opening balance of (`year`, `month + 1`).
///
/// `month` must lie in 1..=11; month 12 is explicitly rejected because
/// crossing a year boundary is the stronger
/// [`close_year`](crate::closing::year_end::close_year) operation.
///
/// Revenue and Expense accounts are flow accounts measured per period:
/// their next opening resets to zero. Asset, Liability, and Equity
/// accounts carry their ending balance forward. An account missing from
/// the directory is fatal here, unlike the reposting roll.
pub async fn close_month<T: LedgerTx>(tx: &mut T, year: i32, month: u32) -> LedgerResult<()> {
    if !(1..=11).contains(&month) {
        return Err(LedgerError::InvalidPeriod(month));
    }

    let buckets = tx.buckets_for_month(year, month).await?;
    info!(year, month, accounts = buckets.len(), "monthly closing");

    for bucket in buckets {
        let account = tx
            .get_account(&bucket.account)
            .await?
            .ok_or_else(|| LedgerError::UnknownAccount(bucket.account.clone()))?;

        let opening = if account.class.is_flow() {
            BigDecimal::from(0)
        } else {
            bucket.ending_balance(account.side)
        };
        debug!(account = %bucket.account, %opening, "advancing opening balance");

        let mut next = tx
            .get_bucket(&bucket.account, year, month + 1)
            .await?
            .unwrap_or_else(|| BalanceBucket::zeroed(bucket.account.clone(), year, month + 1));
        next.opening = opening;
        tx.put_bucket(&next).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::directory::seed_chart;
    use crate::ledger::posting::{PostingEngine, VoucherBuilder};
    use crate::traits::LedgerStore;
    use crate::utils::memory_store::MemoryStore;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn revenue_resets_and_asset_carries() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        seed_chart(&mut tx).await.unwrap();

        let mut engine = PostingEngine::new(&mut tx);
        let sale = VoucherBuilder::new("V-001", date(2024, 1, 15), "January sale")
            .debit("001.000".parse().unwrap(), BigDecimal::from(1_000_000), "")
            .credit("020.001".parse().unwrap(), BigDecimal::from(1_000_000), "")
            .build()
            .unwrap();
        engine.record_voucher(sale).await.unwrap();

        close_month(&mut tx, 2024, 1).await.unwrap();

        let revenue: AccountId = "020.001.001".parse().unwrap();
        let cash: AccountId = "001.000.001".parse().unwrap();

        let revenue_january = tx.get_bucket(&revenue, 2024, 1).await.unwrap().unwrap();
        assert_eq!(
            revenue_january.ending_balance(Side::Credit),
            BigDecimal::from(1_000_000)
        );

        // flow account: February opening resets to zero
        let revenue_february = tx.get_bucket(&revenue, 2024, 2).await.unwrap().unwrap();
        assert_eq!(revenue_february.opening, BigDecimal::from(0));

        // balance-sheet account: ending carries forward
        let cash_february = tx.get_bucket(&cash, 2024, 2).await.unwrap().unwrap();
        assert_eq!(cash_february.opening, BigDecimal::from(1_000_000));
    }

    #[tokio::test]
    async fn existing_next_month_movements_survive() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        seed_chart(&mut tx).await.unwrap();

        let mut engine = PostingEngine::new(&mut tx);
        for (no, month, amount) in [("V-001", 1u32, 300), ("V-002", 2u32, 70)] {
            let voucher = VoucherBuilder::new(no, date(2024, month, 10), "sale")
                .debit("001.000".parse().unwrap(), BigDecimal::from(amount), "")
                .credit("020.001".parse().unwrap(), BigDecimal::from(amount), "")
                .build()
                .unwrap();
            engine.record_voucher(voucher).await.unwrap();
        }

        close_month(&mut tx, 2024, 1).await.unwrap();

        let cash: AccountId = "001.000.001".parse().unwrap();
        let february = tx.get_bucket(&cash, 2024, 2).await.unwrap().unwrap();
        assert_eq!(february.opening, BigDecimal::from(300));
        assert_eq!(february.debit, BigDecimal::from(70));
        assert_eq!(february.ending_balance(Side::Debit), BigDecimal::from(370));
    }

    #[tokio::test]
    async fn rejects_months_outside_closing_range() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        for month in [0, 12, 13] {
            let err = close_month(&mut tx, 2024, month).await.unwrap_err();
            assert!(matches!(err, LedgerError::InvalidPeriod(m) if m == month));
        }
    }

    #[tokio::test]
    async fn unknown_account_is_fatal() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        let ghost: AccountId = "888.001.001".parse().unwrap();
        let mut bucket = BalanceBucket::zeroed(ghost, 2024, 3);
        bucket.debit = BigDecimal::from(10);
        tx.put_bucket(&bucket).await.unwrap();

        assert!(matches!(
            close_month(&mut tx, 2024, 3).await.unwrap_err(),
            LedgerError::UnknownAccount(_)
        ));
    }
}
