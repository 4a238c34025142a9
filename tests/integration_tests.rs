//! Integration tests for gl-core

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use gl_core::{
    utils::MemoryStore, AccountCode, AccountId, ClosingAccounts, JournalHeader, JournalKind,
    Ledger, LedgerError, LedgerStore, LedgerTx, LineValues, NewJournalLine, Side, VoucherBuilder,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn code(value: &str) -> AccountCode {
    value.parse().unwrap()
}

fn id(value: &str) -> AccountId {
    value.parse().unwrap()
}

#[tokio::test]
async fn complete_bookkeeping_workflow() {
    let mut ledger = Ledger::new(MemoryStore::new());

    // Set up the chart of accounts
    let accounts = ledger.seed_standard_chart().await.unwrap();
    assert!(!accounts.is_empty());

    // Record a January sale
    let sale = VoucherBuilder::new("V-001", date(2024, 1, 15), "Cash sale")
        .debit(code("001.000"), BigDecimal::from(1_000_000), "")
        .credit(code("020.001"), BigDecimal::from(1_000_000), "Invoice 42")
        .build()
        .unwrap();
    ledger.record_voucher(sale).await.unwrap();

    // Pay February rent
    let rent = VoucherBuilder::new("V-002", date(2024, 2, 1), "Office rent")
        .kind(JournalKind::Adjusting)
        .debit(code("500.001"), BigDecimal::from(400_000), "")
        .credit(code("001.000"), BigDecimal::from(400_000), "")
        .build()
        .unwrap();
    ledger.record_voucher(rent).await.unwrap();

    // Header totals mirror the lines
    let header = ledger.get_header("V-001").await.unwrap().unwrap();
    assert_eq!(header.total_debit, BigDecimal::from(1_000_000));
    assert_eq!(header.total_credit, BigDecimal::from(1_000_000));
    assert_eq!(header.kind, JournalKind::Ordinary);

    // Balances reflect real-time posting
    assert_eq!(
        ledger
            .ending_balance(&id("001.000.001"), 2024, 1)
            .await
            .unwrap(),
        BigDecimal::from(1_000_000)
    );
    assert_eq!(
        ledger
            .ending_balance(&id("001.000.001"), 2024, 2)
            .await
            .unwrap(),
        // February bucket has no opening until monthly closing runs
        BigDecimal::from(-400_000)
    );

    // Close January: cash carries, revenue resets
    ledger.close_month(2024, 1).await.unwrap();
    assert_eq!(
        ledger
            .ending_balance(&id("001.000.001"), 2024, 2)
            .await
            .unwrap(),
        BigDecimal::from(600_000)
    );
    let revenue_feb = ledger
        .get_bucket(&id("020.001.001"), 2024, 2)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(revenue_feb.opening, BigDecimal::from(0));
}

#[tokio::test]
async fn line_edits_keep_buckets_and_totals_exact() {
    let mut ledger = Ledger::new(MemoryStore::new());
    ledger.seed_standard_chart().await.unwrap();

    ledger
        .create_header(JournalHeader::new(
            "TX-100",
            date(2024, 3, 10),
            "Editable",
            JournalKind::Ordinary,
        ))
        .await
        .unwrap();

    let line = ledger
        .insert_line(NewJournalLine {
            header_no: "TX-100".to_string(),
            account: code("020.001"),
            side: Side::Credit,
            amount: BigDecimal::from(900),
            narration: "Initial".to_string(),
        })
        .await
        .unwrap();

    // Reclassify to a different account and amount
    ledger
        .update_line(
            line.id,
            LineValues {
                account: code("500.001"),
                side: Side::Debit,
                amount: BigDecimal::from(350),
                narration: "Corrected".to_string(),
            },
        )
        .await
        .unwrap();

    let header = ledger.get_header("TX-100").await.unwrap().unwrap();
    assert_eq!(header.total_debit, BigDecimal::from(350));
    assert_eq!(header.total_credit, BigDecimal::from(0));

    let revenue = ledger
        .get_bucket(&id("020.001.001"), 2024, 3)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(revenue.credit, BigDecimal::from(0));
    let expense = ledger
        .get_bucket(&id("500.001.001"), 2024, 3)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(expense.debit, BigDecimal::from(350));

    // Deleting restores the pre-insert state
    ledger.delete_line(line.id).await.unwrap();
    let expense = ledger
        .get_bucket(&id("500.001.001"), 2024, 3)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(expense.debit, BigDecimal::from(0));
    assert!(matches!(
        ledger.delete_line(line.id).await.unwrap_err(),
        LedgerError::LineNotFound(_)
    ));
}

#[tokio::test]
async fn bulk_import_then_repost_rebuilds_the_year() {
    let ledger_store = MemoryStore::new();
    let mut ledger = Ledger::new(ledger_store.clone());
    ledger.seed_standard_chart().await.unwrap();

    // A bulk producer writes headers and lines directly, without posting
    let mut tx = ledger_store.begin().await.unwrap();
    for (no, month, amount) in [("IMP-1", 1u32, 800), ("IMP-2", 1u32, 200), ("IMP-3", 4u32, 50)] {
        tx.insert_header(&JournalHeader::new(
            no,
            date(2024, month, 20),
            "Imported",
            JournalKind::Ordinary,
        ))
        .await
        .unwrap();
        let debit = gl_core::JournalLine {
            id: gl_core::LineId::new(),
            header_no: no.to_string(),
            account: code("001.000"),
            side: Side::Debit,
            amount: BigDecimal::from(amount),
            narration: String::new(),
        };
        let credit = gl_core::JournalLine {
            id: gl_core::LineId::new(),
            header_no: no.to_string(),
            account: code("020.001"),
            side: Side::Credit,
            amount: BigDecimal::from(amount),
            narration: String::new(),
        };
        tx.insert_line(&debit).await.unwrap();
        tx.insert_line(&credit).await.unwrap();
    }
    tx.commit().await.unwrap();

    // Buckets do not exist yet; reposting is the only recovery path
    assert!(ledger
        .get_bucket(&id("001.000.001"), 2024, 1)
        .await
        .unwrap()
        .is_none());

    ledger.repost_year(2024).await.unwrap();

    let january = ledger
        .get_bucket(&id("001.000.001"), 2024, 1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(january.debit, BigDecimal::from(1_000));

    // Roll-forward chains openings through the year
    let may = ledger
        .get_bucket(&id("001.000.001"), 2024, 5)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(may.opening, BigDecimal::from(1_050));

    // Reposting twice changes nothing
    let before = ledger.buckets_for_year(2024).await.unwrap();
    ledger.repost_year(2024).await.unwrap();
    assert_eq!(ledger.buckets_for_year(2024).await.unwrap(), before);
}

#[tokio::test]
async fn year_end_scenarios() {
    let mut ledger = Ledger::new(MemoryStore::new());
    ledger.seed_standard_chart().await.unwrap();
    let config = ClosingAccounts::default();

    // December activity: asset balance, revenue, and accumulated profit
    let sale = VoucherBuilder::new("V-010", date(2024, 12, 5), "December sale")
        .debit(code("001.000"), BigDecimal::from(5_000_000), "")
        .credit(code("020.001"), BigDecimal::from(5_000_000), "")
        .build()
        .unwrap();
    ledger.record_voucher(sale).await.unwrap();

    let accrue = VoucherBuilder::new("V-011", date(2024, 12, 31), "Profit accrual")
        .kind(JournalKind::Adjusting)
        .debit(code("020.001"), BigDecimal::from(2_000_000), "")
        .credit(code("300.002"), BigDecimal::from(2_000_000), "")
        .build()
        .unwrap();
    ledger.record_voucher(accrue).await.unwrap();

    // Seed retained earnings with a prior balance
    let store = ledger.store().clone();
    let mut tx = store.begin().await.unwrap();
    let mut retained = gl_core::BalanceBucket::zeroed(config.retained_earnings.clone(), 2024, 12);
    retained.opening = BigDecimal::from(10_000_000);
    tx.put_bucket(&retained).await.unwrap();
    tx.commit().await.unwrap();

    ledger.close_year(2024, &config).await.unwrap();

    // Asset carries forward into both opening buckets
    for month in [0, 1] {
        let bucket = ledger
            .get_bucket(&id("001.000.001"), 2025, month)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(bucket.opening, BigDecimal::from(5_000_000));
    }

    // Retained earnings absorbs the current-year profit
    let retained_next = ledger
        .get_bucket(&config.retained_earnings, 2025, 1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(retained_next.opening, BigDecimal::from(12_000_000));

    // The profit account and revenue reset
    let profit_next = ledger
        .get_bucket(&config.current_year_profit, 2025, 1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profit_next.opening, BigDecimal::from(0));
    let revenue_next = ledger
        .get_bucket(&id("020.001.001"), 2025, 0)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(revenue_next.opening, BigDecimal::from(0));
}

#[tokio::test]
async fn month_twelve_is_rejected_for_monthly_closing() {
    let mut ledger = Ledger::new(MemoryStore::new());
    assert!(matches!(
        ledger.close_month(2024, 12).await.unwrap_err(),
        LedgerError::InvalidPeriod(12)
    ));
}

#[tokio::test]
async fn closing_accounts_config_round_trips_as_json() {
    let config = ClosingAccounts::default();
    let json = serde_json::to_string(&config).unwrap();
    let back: ClosingAccounts = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);

    // a configuration provider cannot smuggle in malformed identities
    assert!(serde_json::from_str::<ClosingAccounts>(
        r#"{"retained_earnings":"300.001","current_year_profit":"300.002.001"}"#
    )
    .is_err());
}
