//! Chart-of-accounts directory

use crate::traits::LedgerTx;
use crate::types::*;
use crate::utils::validation::validate_account_name;

/// Chart-of-accounts operations over a caller-supplied unit of work.
///
/// The directory owns identity uniqueness and the referential guard on
/// deletion; the surrounding transaction is begun and committed by the
/// caller (normally the [`Ledger`](crate::Ledger) facade).
pub struct AccountDirectory<'tx, T: LedgerTx> {
    tx: &'tx mut T,
}

impl<'tx, T: LedgerTx> AccountDirectory<'tx, T> {
    /// Wrap a transaction
    pub fn new(tx: &'tx mut T) -> Self {
        Self { tx }
    }

    /// Create a new account. The identity must not already exist.
    pub async fn create_account(
        &mut self,
        id: AccountId,
        name: impl Into<String>,
        side: Side,
        class: AccountClass,
    ) -> LedgerResult<Account> {
        let account = Account {
            id,
            name: name.into(),
            side,
            class,
        };
        validate_account_name(&account.name)?;

        if self.tx.get_account(&account.id).await?.is_some() {
            return Err(LedgerError::Validation(format!(
                "Account '{}' already exists",
                account.id
            )));
        }

        self.tx.insert_account(&account).await?;
        Ok(account)
    }

    /// Get an account by identity
    pub async fn get_account(&self, id: &AccountId) -> LedgerResult<Option<Account>> {
        self.tx.get_account(id).await
    }

    /// Get an account by identity, returning an error if not found
    pub async fn get_account_required(&self, id: &AccountId) -> LedgerResult<Account> {
        self.tx
            .get_account(id)
            .await?
            .ok_or_else(|| LedgerError::UnknownAccount(id.clone()))
    }

    /// Update an account's name, side, or class. Identity must exist.
    pub async fn update_account(&mut self, account: &Account) -> LedgerResult<()> {
        validate_account_name(&account.name)?;

        if self.tx.get_account(&account.id).await?.is_none() {
            return Err(LedgerError::UnknownAccount(account.id.clone()));
        }

        self.tx.update_account(account).await
    }

    /// Delete an account. Refused while any balance bucket or journal
    /// line still references the identity.
    pub async fn delete_account(&mut self, id: &AccountId) -> LedgerResult<()> {
        self.get_account_required(id).await?;

        if self.tx.account_is_referenced(id).await? {
            return Err(LedgerError::Validation(format!(
                "Account '{id}' is still referenced by balance buckets or journal lines"
            )));
        }

        self.tx.delete_account(id).await
    }

    /// List all accounts
    pub async fn list_accounts(&self) -> LedgerResult<Vec<Account>> {
        self.tx.list_accounts(None).await
    }

    /// List accounts of one class
    pub async fn list_accounts_by_class(&self, class: AccountClass) -> LedgerResult<Vec<Account>> {
        self.tx.list_accounts(Some(class)).await
    }

    /// Create or replace an alias from a transactional code to a
    /// canonical identity
    pub async fn set_alias(&mut self, code: &AccountCode, id: &AccountId) -> LedgerResult<()> {
        self.get_account_required(id).await?;
        self.tx.put_alias(code, id).await
    }

    /// Remove an alias mapping
    pub async fn remove_alias(&mut self, code: &AccountCode) -> LedgerResult<()> {
        self.tx.remove_alias(code).await
    }
}

/// Seed a minimal standard chart of accounts, with aliases for the
/// transactional codes. Intended for tests, demos, and fresh databases.
pub async fn seed_chart<T: LedgerTx>(tx: &mut T) -> LedgerResult<Vec<Account>> {
    let mut directory = AccountDirectory::new(tx);
    let chart: [(&str, &str, AccountClass); 8] = [
        ("001.000.001", "Cash", AccountClass::Asset),
        ("001.001.001", "Bank", AccountClass::Asset),
        ("110.001.001", "Accounts Receivable", AccountClass::Asset),
        ("200.001.001", "Accounts Payable", AccountClass::Liability),
        ("300.001.001", "Retained Earnings", AccountClass::Equity),
        ("300.002.001", "Current-Year Profit", AccountClass::Equity),
        ("020.001.001", "Sales Revenue", AccountClass::Revenue),
        ("500.001.001", "Operating Expenses", AccountClass::Expense),
    ];

    let mut accounts = Vec::with_capacity(chart.len());
    for (id, name, class) in chart {
        let id: AccountId = id.parse()?;
        let account = directory
            .create_account(id, name, class.normal_side(), class)
            .await?;
        accounts.push(account);
    }
    Ok(accounts)
}
