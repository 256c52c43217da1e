use std::str::FromStr;

use rust_decimal::Decimal;

use crate::Share;

/// How a bulk transaction treats shares it would drive negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostingPolicy {
    /// Refuse the whole submission while any share would go negative.
    #[default]
    None,
    /// Post to compliant shares only; noncompliant shares are left untouched.
    Skip,
    /// Post the full amount everywhere, letting shares go negative.
    Take,
}

pub const COMMENT_MAX_LEN: usize = 255;

/// Shares whose balance would drop below zero if `amount` were posted.
/// Only withdrawals can be noncompliant; a non-negative amount never is.
pub fn noncompliant_shares(shares: &[Share], amount: Decimal) -> Vec<&Share> {
    if amount >= Decimal::ZERO {
        return Vec::new();
    }
    shares
        .iter()
        .filter(|share| share.balance + amount < Decimal::ZERO)
        .collect()
}

/// The balance a share ends up with after the transaction is posted under
/// the given policy.
pub fn effective_balance(share: &Share, amount: Decimal, policy: PostingPolicy) -> Decimal {
    if amount < Decimal::ZERO
        && policy == PostingPolicy::Skip
        && share.balance + amount < Decimal::ZERO
    {
        return share.balance;
    }
    share.balance + amount
}

/// Parses a user-entered amount, rounded to cents. The error is a
/// display-ready validation message, not a fault.
pub fn parse_amount(raw: &str) -> Result<Decimal, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("Amount is a required field.".to_string());
    }
    Decimal::from_str(trimmed)
        .map(|amount| amount.round_dp(2))
        .map_err(|_| format!("'{trimmed}' is not a valid amount."))
}

/// Cross-field rules for a posting: a zero amount needs an explanation, and
/// the comment must fit the backend column.
pub fn validate_posting(amount: Decimal, comment: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if amount.round_dp(2).is_zero() && comment.trim().is_empty() {
        errors.push("A comment is required when the amount is zero.".to_string());
    }
    if comment.chars().count() > COMMENT_MAX_LEN {
        errors.push(format!(
            "Comment must be {COMMENT_MAX_LEN} characters or fewer."
        ));
    }
    errors
}
