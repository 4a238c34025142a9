//! Year-end closing: advance December balances into the next fiscal year

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::traits::LedgerTx;
use crate::types::*;

/// Fallback retained-earnings account when none is configured
pub const DEFAULT_RETAINED_EARNINGS: &str = "300.001.001";
/// Fallback current-year-profit account when none is configured
pub const DEFAULT_CURRENT_YEAR_PROFIT: &str = "300.002.001";

/// The two equity accounts year-end closing needs to know about.
///
/// Supplied by the caller's configuration provider; [`Default`] falls
/// back to [`DEFAULT_RETAINED_EARNINGS`] and
/// [`DEFAULT_CURRENT_YEAR_PROFIT`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosingAccounts {
    pub retained_earnings: AccountId,
    pub current_year_profit: AccountId,
}

impl Default for ClosingAccounts {
    fn default() -> Self {
        Self {
            retained_earnings: DEFAULT_RETAINED_EARNINGS
                .parse()
                .expect("default retained-earnings identity is valid"),
            current_year_profit: DEFAULT_CURRENT_YEAR_PROFIT
                .parse()
                .expect("default current-year-profit identity is valid"),
        }
    }
}

/// Advance every December ending balance of `year` into the opening of
/// `year + 1`, writing both the month-0 snapshot and the month-1 bucket
/// identically.
///
/// Revenue and Expense accounts, and the configured current-year-profit
/// account, reset to zero. The retained-earnings account opens with its
/// own December ending plus the accumulated current-year profit. Every
/// other balance-sheet account carries its ending forward unchanged.
/// Movements already accumulated in next year's month-1 buckets survive;
/// only openings are written. An account missing from the directory is
/// fatal.
pub async fn close_year<T: LedgerTx>(
    tx: &mut T,
    year: i32,
    accounts: &ClosingAccounts,
) -> LedgerResult<()> {
    info!(year, "year-end closing");

    // Accumulated profit rolls into retained earnings, so its December
    // ending is computed up front. An absent bucket means zero activity,
    // which needs no directory lookup.
    let profit_ending = match tx
        .get_bucket(&accounts.current_year_profit, year, 12)
        .await?
    {
        Some(bucket) => {
            let profit = tx
                .get_account(&accounts.current_year_profit)
                .await?
                .ok_or_else(|| LedgerError::UnknownAccount(accounts.current_year_profit.clone()))?;
            bucket.ending_balance(profit.side)
        }
        None => BigDecimal::from(0),
    };

    // Profit must land somewhere even when retained earnings saw no
    // December activity of its own.
    if profit_ending != BigDecimal::from(0)
        && tx
            .get_bucket(&accounts.retained_earnings, year, 12)
            .await?
            .is_none()
    {
        tx.put_bucket(&BalanceBucket::zeroed(
            accounts.retained_earnings.clone(),
            year,
            12,
        ))
        .await?;
    }

    for bucket in tx.buckets_for_month(year, 12).await? {
        let account = tx
            .get_account(&bucket.account)
            .await?
            .ok_or_else(|| LedgerError::UnknownAccount(bucket.account.clone()))?;
        let ending = bucket.ending_balance(account.side);

        let opening = if account.class.is_flow() || bucket.account == accounts.current_year_profit
        {
            BigDecimal::from(0)
        } else if bucket.account == accounts.retained_earnings {
            &ending + &profit_ending
        } else {
            ending
        };
        debug!(account = %bucket.account, %opening, "opening next fiscal year");

        for month in [0, 1] {
            let mut next = tx
                .get_bucket(&bucket.account, year + 1, month)
                .await?
                .unwrap_or_else(|| BalanceBucket::zeroed(bucket.account.clone(), year + 1, month));
            next.opening = opening.clone();
            tx.put_bucket(&next).await?;
        }
    }

    Ok(())
}
