//! Real-time posting engine
//!
//! Keeps balance buckets an exact incremental mirror of journal lines:
//! every line mutation applies its balance effect at mutation time, inside
//! the same unit of work, instead of deferring to a recomputation. Header
//! aggregate totals are corrected in the same breath.

use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate};

use crate::ledger::alias::resolve_account;
use crate::traits::LedgerTx;
use crate::types::*;
use crate::utils::validation::{
    validate_amount, validate_memo, validate_narration, validate_transaction_no,
};

/// Posting operations over a caller-supplied unit of work.
///
/// The engine never commits or rolls back; any error returned here must
/// abort the surrounding transaction so that no partial bucket, line, or
/// header mutation becomes visible.
pub struct PostingEngine<'tx, T: LedgerTx> {
    tx: &'tx mut T,
}

impl<'tx, T: LedgerTx> PostingEngine<'tx, T> {
    /// Wrap a transaction
    pub fn new(tx: &'tx mut T) -> Self {
        Self { tx }
    }

    /// Apply one signed movement against the bucket for `date`'s period,
    /// creating the bucket if absent. The account must exist.
    ///
    /// This is the low-level primitive used when header and lines are
    /// managed by the caller, e.g. the bulk save of a brand-new voucher.
    pub async fn post(
        &mut self,
        date: NaiveDate,
        account: &AccountId,
        side: Side,
        amount: &BigDecimal,
    ) -> LedgerResult<()> {
        self.apply(date, account, side, amount, false).await
    }

    /// Exact negation of [`PostingEngine::post`]: subtract the movement
    /// instead of adding it. This is what makes edit and delete possible
    /// without a full recompute.
    pub async fn unpost(
        &mut self,
        date: NaiveDate,
        account: &AccountId,
        side: Side,
        amount: &BigDecimal,
    ) -> LedgerResult<()> {
        self.apply(date, account, side, amount, true).await
    }

    async fn apply(
        &mut self,
        date: NaiveDate,
        account: &AccountId,
        side: Side,
        amount: &BigDecimal,
        reverse: bool,
    ) -> LedgerResult<()> {
        if self.tx.get_account(account).await?.is_none() {
            return Err(LedgerError::UnknownAccount(account.clone()));
        }

        let (year, month) = (date.year(), date.month());
        let mut bucket = self
            .tx
            .get_bucket(account, year, month)
            .await?
            .unwrap_or_else(|| BalanceBucket::zeroed(account.clone(), year, month));

        if reverse {
            bucket.subtract_movement(side, amount);
        } else {
            bucket.add_movement(side, amount);
        }

        self.tx.put_bucket(&bucket).await
    }

    /// Create a journal header. Totals always start at zero; they are
    /// owned by line mutation from here on.
    pub async fn create_header(&mut self, header: JournalHeader) -> LedgerResult<JournalHeader> {
        validate_transaction_no(&header.transaction_no)?;
        validate_memo(&header.memo)?;

        if self.tx.get_header(&header.transaction_no).await?.is_some() {
            return Err(LedgerError::Validation(format!(
                "Journal header '{}' already exists",
                header.transaction_no
            )));
        }

        let header = JournalHeader {
            total_debit: BigDecimal::from(0),
            total_credit: BigDecimal::from(0),
            ..header
        };
        self.tx.insert_header(&header).await?;
        Ok(header)
    }

    /// Update a header's date, memo, and kind.
    ///
    /// When the date moves the header into a different (year, month),
    /// every owned line is unposted at the old period and posted at the
    /// new one, keeping the bucket mirror exact.
    pub async fn update_header(
        &mut self,
        transaction_no: &str,
        date: NaiveDate,
        memo: impl Into<String>,
        kind: JournalKind,
    ) -> LedgerResult<JournalHeader> {
        let mut header = self.get_header_required(transaction_no).await?;
        let memo = memo.into();
        validate_memo(&memo)?;

        let old_date = header.date;
        header.date = date;
        header.memo = memo;
        header.kind = kind;

        if (old_date.year(), old_date.month()) != (date.year(), date.month()) {
            for line in self.tx.lines_for_header(transaction_no).await? {
                let account = resolve_account(self.tx, &line.account).await?;
                self.unpost(old_date, &account, line.side, &line.amount)
                    .await?;
                self.post(date, &account, line.side, &line.amount).await?;
            }
        }

        self.tx.update_header(&header).await?;
        Ok(header)
    }

    /// Delete a header. Refused while the header still owns lines.
    pub async fn delete_header(&mut self, transaction_no: &str) -> LedgerResult<()> {
        self.get_header_required(transaction_no).await?;

        if !self.tx.lines_for_header(transaction_no).await?.is_empty() {
            return Err(LedgerError::Validation(format!(
                "Journal header '{transaction_no}' still owns lines"
            )));
        }

        self.tx.delete_header(transaction_no).await
    }

    /// Insert a journal line: post its effect against the header's
    /// period, bump the header totals, persist the line under a fresh id.
    pub async fn insert_line(&mut self, new: NewJournalLine) -> LedgerResult<JournalLine> {
        validate_amount(&new.amount)?;
        validate_narration(&new.narration)?;

        let mut header = self.get_header_required(&new.header_no).await?;
        let account = resolve_account(self.tx, &new.account).await?;
        self.post(header.date, &account, new.side, &new.amount)
            .await?;

        match new.side {
            Side::Debit => header.total_debit += &new.amount,
            Side::Credit => header.total_credit += &new.amount,
        }
        self.tx.update_header(&header).await?;

        let line = JournalLine {
            id: LineId::new(),
            header_no: new.header_no,
            account: new.account,
            side: new.side,
            amount: new.amount,
            narration: new.narration,
        };
        self.tx.insert_line(&line).await?;
        Ok(line)
    }

    /// Update a line's account, side, amount, or narration.
    ///
    /// Computed as two independent deltas, not a single diff: the stored
    /// effect is reversed in full against its bucket, then the new effect
    /// applied in full against its bucket - the two buckets differ when
    /// the account changed.
    pub async fn update_line(&mut self, id: LineId, values: LineValues) -> LedgerResult<JournalLine> {
        validate_amount(&values.amount)?;
        validate_narration(&values.narration)?;

        let old = self
            .tx
            .get_line(id)
            .await?
            .ok_or(LedgerError::LineNotFound(id))?;
        let mut header = self.get_header_required(&old.header_no).await?;

        let old_account = resolve_account(self.tx, &old.account).await?;
        self.unpost(header.date, &old_account, old.side, &old.amount)
            .await?;

        let new_account = resolve_account(self.tx, &values.account).await?;
        self.post(header.date, &new_account, values.side, &values.amount)
            .await?;

        match old.side {
            Side::Debit => header.total_debit -= &old.amount,
            Side::Credit => header.total_credit -= &old.amount,
        }
        match values.side {
            Side::Debit => header.total_debit += &values.amount,
            Side::Credit => header.total_credit += &values.amount,
        }
        self.tx.update_header(&header).await?;

        let line = JournalLine {
            id,
            header_no: old.header_no,
            account: values.account,
            side: values.side,
            amount: values.amount,
            narration: values.narration,
        };
        self.tx.update_line(&line).await?;
        Ok(line)
    }

    /// Delete a line: unpost its effect, drop it from the header totals,
    /// remove the row.
    pub async fn delete_line(&mut self, id: LineId) -> LedgerResult<()> {
        let line = self
            .tx
            .get_line(id)
            .await?
            .ok_or(LedgerError::LineNotFound(id))?;
        let mut header = self.get_header_required(&line.header_no).await?;

        let account = resolve_account(self.tx, &line.account).await?;
        self.unpost(header.date, &account, line.side, &line.amount)
            .await?;

        match line.side {
            Side::Debit => header.total_debit -= &line.amount,
            Side::Credit => header.total_credit -= &line.amount,
        }
        self.tx.update_header(&header).await?;

        self.tx.delete_line(id).await
    }

    /// Bulk save of a brand-new voucher: header plus all legs, posted
    /// through the [`PostingEngine::post`] primitive.
    ///
    /// Rejects vouchers whose legs do not sum debit = credit.
    pub async fn record_voucher(&mut self, voucher: Voucher) -> LedgerResult<Vec<JournalLine>> {
        let Voucher { header, lines } = voucher;
        validate_transaction_no(&header.transaction_no)?;
        validate_memo(&header.memo)?;

        let total_debit: BigDecimal = lines
            .iter()
            .filter(|leg| leg.side == Side::Debit)
            .map(|leg| &leg.amount)
            .sum();
        let total_credit: BigDecimal = lines
            .iter()
            .filter(|leg| leg.side == Side::Credit)
            .map(|leg| &leg.amount)
            .sum();
        if total_debit != total_credit {
            return Err(LedgerError::UnbalancedInput {
                debit: total_debit,
                credit: total_credit,
            });
        }

        if self.tx.get_header(&header.transaction_no).await?.is_some() {
            return Err(LedgerError::Validation(format!(
                "Journal header '{}' already exists",
                header.transaction_no
            )));
        }

        let header = JournalHeader {
            total_debit,
            total_credit,
            ..header
        };
        self.tx.insert_header(&header).await?;

        let mut saved = Vec::with_capacity(lines.len());
        for leg in lines {
            validate_amount(&leg.amount)?;
            validate_narration(&leg.narration)?;

            let account = resolve_account(self.tx, &leg.account).await?;
            self.post(header.date, &account, leg.side, &leg.amount)
                .await?;

            let line = JournalLine {
                id: LineId::new(),
                header_no: header.transaction_no.clone(),
                account: leg.account,
                side: leg.side,
                amount: leg.amount,
                narration: leg.narration,
            };
            self.tx.insert_line(&line).await?;
            saved.push(line);
        }
        Ok(saved)
    }

    async fn get_header_required(&self, transaction_no: &str) -> LedgerResult<JournalHeader> {
        self.tx
            .get_header(transaction_no)
            .await?
            .ok_or_else(|| LedgerError::HeaderNotFound(transaction_no.to_string()))
    }
}

/// A complete journal transaction ready for bulk save
#[derive(Debug, Clone, PartialEq)]
pub struct Voucher {
    pub header: JournalHeader,
    pub lines: Vec<LineValues>,
}

/// Fluent builder for vouchers
#[derive(Debug)]
pub struct VoucherBuilder {
    header: JournalHeader,
    lines: Vec<LineValues>,
}

impl VoucherBuilder {
    /// Start a voucher with the ordinary journal kind
    pub fn new(transaction_no: impl Into<String>, date: NaiveDate, memo: impl Into<String>) -> Self {
        Self {
            header: JournalHeader::new(transaction_no, date, memo, JournalKind::Ordinary),
            lines: Vec::new(),
        }
    }

    /// Set the journal kind
    pub fn kind(mut self, kind: JournalKind) -> Self {
        self.header.kind = kind;
        self
    }

    /// Add a debit leg
    pub fn debit(
        mut self,
        account: AccountCode,
        amount: BigDecimal,
        narration: impl Into<String>,
    ) -> Self {
        self.lines.push(LineValues {
            account,
            side: Side::Debit,
            amount,
            narration: narration.into(),
        });
        self
    }

    /// Add a credit leg
    pub fn credit(
        mut self,
        account: AccountCode,
        amount: BigDecimal,
        narration: impl Into<String>,
    ) -> Self {
        self.lines.push(LineValues {
            account,
            side: Side::Credit,
            amount,
            narration: narration.into(),
        });
        self
    }

    /// Add a custom leg
    pub fn leg(mut self, values: LineValues) -> Self {
        self.lines.push(values);
        self
    }

    /// Validate and build the voucher
    pub fn build(self) -> LedgerResult<Voucher> {
        validate_transaction_no(&self.header.transaction_no)?;
        validate_memo(&self.header.memo)?;

        if self.lines.len() < 2 {
            return Err(LedgerError::Validation(
                "Voucher must have at least two legs for double-entry bookkeeping".to_string(),
            ));
        }
        for leg in &self.lines {
            validate_amount(&leg.amount)?;
            validate_narration(&leg.narration)?;
        }

        let debit: BigDecimal = self
            .lines
            .iter()
            .filter(|leg| leg.side == Side::Debit)
            .map(|leg| &leg.amount)
            .sum();
        let credit: BigDecimal = self
            .lines
            .iter()
            .filter(|leg| leg.side == Side::Credit)
            .map(|leg| &leg.amount)
            .sum();
        if debit != credit {
            return Err(LedgerError::UnbalancedInput { debit, credit });
        }

        Ok(Voucher {
            header: self.header,
            lines: self.lines,
        })
    }
}
