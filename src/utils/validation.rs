//! Validation utilities

use crate::types::*;
use bigdecimal::BigDecimal;

/// Validate that a posting amount is non-negative
pub fn validate_amount(amount: &BigDecimal) -> LedgerResult<()> {
    if *amount < BigDecimal::from(0) {
        Err(LedgerError::Validation(
            "Amount cannot be negative".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Validate that an account name is usable
pub fn validate_account_name(name: &str) -> LedgerResult<()> {
    if name.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Account name cannot be empty".to_string(),
        ));
    }
    if name.len() > 100 {
        return Err(LedgerError::Validation(
            "Account name cannot exceed 100 characters".to_string(),
        ));
    }
    Ok(())
}

/// Validate a caller-assigned transaction number
pub fn validate_transaction_no(transaction_no: &str) -> LedgerResult<()> {
    if transaction_no.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Transaction number cannot be empty".to_string(),
        ));
    }
    if transaction_no.len() > 50 {
        return Err(LedgerError::Validation(
            "Transaction number cannot exceed 50 characters".to_string(),
        ));
    }
    if transaction_no.chars().any(|c| c.is_control()) {
        return Err(LedgerError::Validation(
            "Transaction number cannot contain control characters".to_string(),
        ));
    }
    Ok(())
}

/// Validate a header memo; empty memos are allowed
pub fn validate_memo(memo: &str) -> LedgerResult<()> {
    if memo.len() > 500 {
        return Err(LedgerError::Validation(
            "Memo cannot exceed 500 characters".to_string(),
        ));
    }
    Ok(())
}

/// Validate a line narration; empty narrations are allowed
pub fn validate_narration(narration: &str) -> LedgerResult<()> {
    if narration.len() > 500 {
        return Err(LedgerError::Validation(
            "Narration cannot exceed 500 characters".to_string(),
        ));
    }
    Ok(())
}
