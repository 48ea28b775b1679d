//! Helpers for validating and storing monetary amounts.
//!
//! Amounts are `rust_decimal::Decimal` values kept at currency scale (two
//! fractional digits). SQLite has no decimal column type, so amounts are
//! stored as TEXT and parsed back on read.

use std::str::FromStr;

use rusqlite::types::Type;
use rust_decimal::Decimal;

use crate::Error;

/// Check that `amount` is a valid amount of money for a transaction or
/// budget: at least one cent and at most two fractional digits.
///
/// # Errors
/// Returns an [Error::InvalidAmount] if the amount is out of range or not at
/// currency scale.
pub fn validate_amount(amount: Decimal) -> Result<Decimal, Error> {
    let one_cent = Decimal::new(1, 2);

    if amount < one_cent || amount.round_dp(2) != amount {
        return Err(Error::InvalidAmount(amount));
    }

    Ok(amount)
}

/// Parse an amount read from a TEXT column at `column_index`.
///
/// # Errors
/// Returns a [rusqlite::Error::FromSqlConversionFailure] if the stored text
/// is not a decimal number.
pub(crate) fn amount_from_column(
    column_index: usize,
    raw: String,
) -> Result<Decimal, rusqlite::Error> {
    Decimal::from_str(&raw).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(column_index, Type::Text, Box::new(error))
    })
}
