//! Monetary types for price representation.

use rust_decimal::Decimal;

use super::error::DomainError;

/// Price represented as a Decimal for precision.
pub type Price = Decimal;

/// Total price of `quantity` units at `price`.
///
/// Fails instead of panicking when the product does not fit in a decimal.
pub fn line_total(price: Price, quantity: u64) -> Result<Price, DomainError> {
    price
        .checked_mul(Decimal::from(quantity))
        .ok_or_else(|| DomainError::AmountOverflow(format!("{price} x {quantity}")))
}

/// Sum of `amounts`, failing on overflow.
pub fn checked_sum(amounts: impl IntoIterator<Item = Price>) -> Result<Price, DomainError> {
    amounts.into_iter().try_fold(Decimal::ZERO, |acc, amount| {
        acc.checked_add(amount)
            .ok_or_else(|| DomainError::AmountOverflow(format!("{acc} + {amount}")))
    })
}
