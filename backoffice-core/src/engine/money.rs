//! Money calculation for order totals, discount and payment status
//!
//! All arithmetic is done on `Decimal` internally, then converted to `f64`
//! for storage/serialization. The calculator is pure: it never touches
//! storage and can be exercised exhaustively in isolation.

use rust_decimal::prelude::*;
use shared::models::{OrderItemInput, OrderStatus, PaymentInput, PaymentStatus};

use crate::engine::error::EngineError;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed unit price (1,000,000)
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line
const MAX_QUANTITY: i32 = 9999;
/// Maximum allowed payment amount (1,000,000)
const MAX_PAYMENT_AMOUNT: f64 = 1_000_000.0;

/// Convert f64 to Decimal for precise arithmetic
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        // Decimal rounded to 2dp with inputs bounded at the validation
        // boundary is always representable as f64
        .expect("Decimal rounded to 2dp is always representable as f64")
}

/// Computed totals and derived statuses for an order
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTotals {
    pub total_quantity: i32,
    /// Before discount
    pub gross_amount: f64,
    /// After discount
    pub net_amount: f64,
    pub paid_amount: f64,
    pub remain_amount: f64,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
}

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
fn require_finite(value: f64, field_name: &str) -> Result<(), EngineError> {
    if !value.is_finite() {
        return Err(EngineError::InvalidAmount(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Validate an order line input before processing
pub fn validate_item(item: &OrderItemInput) -> Result<(), EngineError> {
    require_finite(item.unit_price, "unit_price")?;
    if item.unit_price < 0.0 {
        return Err(EngineError::InvalidAmount(format!(
            "unit_price must be non-negative, got {}",
            item.unit_price
        )));
    }
    if item.unit_price > MAX_PRICE {
        return Err(EngineError::InvalidAmount(format!(
            "unit_price exceeds maximum allowed ({}), got {}",
            MAX_PRICE, item.unit_price
        )));
    }
    if item.quantity <= 0 {
        return Err(EngineError::InvalidQuantity(format!(
            "quantity must be positive, got {}",
            item.quantity
        )));
    }
    if item.quantity > MAX_QUANTITY {
        return Err(EngineError::InvalidQuantity(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, item.quantity
        )));
    }
    Ok(())
}

/// Validate a payment input (finite, positive, within bounds)
pub fn validate_payment(payment: &PaymentInput) -> Result<(), EngineError> {
    require_finite(payment.amount, "payment amount")?;
    if payment.amount <= 0.0 {
        return Err(EngineError::InvalidAmount(format!(
            "payment amount must be positive, got {}",
            payment.amount
        )));
    }
    if payment.amount > MAX_PAYMENT_AMOUNT {
        return Err(EngineError::InvalidAmount(format!(
            "payment amount exceeds maximum allowed ({}), got {}",
            MAX_PAYMENT_AMOUNT, payment.amount
        )));
    }
    Ok(())
}

/// Validate a whole-order discount percent
pub fn validate_discount(discount_percent: f64) -> Result<(), EngineError> {
    if !discount_percent.is_finite() || !(0.0..=100.0).contains(&discount_percent) {
        return Err(EngineError::InvalidDiscount(discount_percent));
    }
    Ok(())
}

/// Compute order totals, discount application and derived statuses.
///
/// Overpayment is rejected, never clamped: the sum of payments may not
/// exceed the net amount beyond [`MONEY_TOLERANCE`]. An order is
/// `Completed`/`Paid` exactly when the remaining balance is zero within
/// tolerance; otherwise both statuses stay `Pending`.
pub fn compute(
    items: &[OrderItemInput],
    discount_percent: f64,
    payments: &[PaymentInput],
) -> Result<OrderTotals, EngineError> {
    if items.is_empty() {
        return Err(EngineError::EmptyItems);
    }
    for item in items {
        validate_item(item)?;
    }
    validate_discount(discount_percent)?;
    for payment in payments {
        validate_payment(payment)?;
    }

    let mut total_quantity: i32 = 0;
    let mut gross = Decimal::ZERO;
    for item in items {
        total_quantity += item.quantity;
        gross += to_decimal(item.unit_price) * Decimal::from(item.quantity);
    }

    let net = (gross * (Decimal::ONE_HUNDRED - to_decimal(discount_percent))
        / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);

    let paid: Decimal = payments.iter().map(|p| to_decimal(p.amount)).sum();
    let remain = net - paid;

    if remain < -MONEY_TOLERANCE {
        return Err(EngineError::Overpayment {
            paid: to_f64(paid),
            due: to_f64(net),
        });
    }

    let settled = remain.abs() <= MONEY_TOLERANCE;
    let (order_status, payment_status) = if settled {
        (OrderStatus::Completed, PaymentStatus::Paid)
    } else {
        (OrderStatus::Pending, PaymentStatus::Pending)
    };

    Ok(OrderTotals {
        total_quantity,
        gross_amount: to_f64(gross),
        net_amount: to_f64(net),
        paid_amount: to_f64(paid),
        remain_amount: if settled { 0.0 } else { to_f64(remain) },
        order_status,
        payment_status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::PaymentMethod;

    fn item(quantity: i32, unit_price: f64) -> OrderItemInput {
        OrderItemInput {
            product_id: 1,
            quantity,
            unit_price,
        }
    }

    fn cash(amount: f64) -> PaymentInput {
        PaymentInput {
            method: PaymentMethod::Cash,
            amount,
            note: None,
        }
    }

    #[test]
    fn test_to_decimal_precision() {
        // Classic floating point problem: 0.1 + 0.2 != 0.3
        let sum_f64 = 0.1_f64 + 0.2_f64;
        assert_ne!(sum_f64, 0.3);

        let sum_dec = to_decimal(0.1) + to_decimal(0.2);
        assert_eq!(to_f64(sum_dec), 0.3);
    }

    #[test]
    fn test_discount_math() {
        // items=[{qty:2, price:100}], discount=10 => gross 200, net 180
        let totals = compute(&[item(2, 100.0)], 10.0, &[]).unwrap();
        assert_eq!(totals.gross_amount, 200.0);
        assert_eq!(totals.net_amount, 180.0);
        assert_eq!(totals.total_quantity, 2);
        assert_eq!(totals.paid_amount, 0.0);
        assert_eq!(totals.remain_amount, 180.0);
        assert_eq!(totals.order_status, OrderStatus::Pending);
        assert_eq!(totals.payment_status, PaymentStatus::Pending);
    }

    #[test]
    fn test_full_payment_completes() {
        let totals = compute(&[item(2, 100.0)], 10.0, &[cash(180.0)]).unwrap();
        assert_eq!(totals.remain_amount, 0.0);
        assert_eq!(totals.order_status, OrderStatus::Completed);
        assert_eq!(totals.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn test_split_payment() {
        let totals = compute(
            &[item(3, 50.0)],
            0.0,
            &[cash(100.0), PaymentInput {
                method: PaymentMethod::Bank,
                amount: 50.0,
                note: None,
            }],
        )
        .unwrap();
        assert_eq!(totals.paid_amount, 150.0);
        assert_eq!(totals.remain_amount, 0.0);
        assert_eq!(totals.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn test_partial_payment_stays_pending() {
        let totals = compute(&[item(1, 100.0)], 0.0, &[cash(40.0)]).unwrap();
        assert_eq!(totals.paid_amount, 40.0);
        assert_eq!(totals.remain_amount, 60.0);
        assert_eq!(totals.order_status, OrderStatus::Pending);
        assert_eq!(totals.payment_status, PaymentStatus::Pending);
    }

    #[test]
    fn test_overpayment_rejected() {
        let err = compute(&[item(1, 100.0)], 0.0, &[cash(100.5)]).unwrap_err();
        assert!(matches!(err, EngineError::Overpayment { .. }));
    }

    #[test]
    fn test_discount_out_of_range() {
        assert!(matches!(
            compute(&[item(1, 10.0)], -1.0, &[]).unwrap_err(),
            EngineError::InvalidDiscount(_)
        ));
        assert!(matches!(
            compute(&[item(1, 10.0)], 100.5, &[]).unwrap_err(),
            EngineError::InvalidDiscount(_)
        ));
    }

    #[test]
    fn test_hundred_percent_discount_is_settled() {
        let totals = compute(&[item(2, 10.0)], 100.0, &[]).unwrap();
        assert_eq!(totals.net_amount, 0.0);
        assert_eq!(totals.order_status, OrderStatus::Completed);
        assert_eq!(totals.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn test_empty_items_rejected() {
        assert!(matches!(
            compute(&[], 0.0, &[]).unwrap_err(),
            EngineError::EmptyItems
        ));
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert!(matches!(
            compute(&[item(0, 10.0)], 0.0, &[]).unwrap_err(),
            EngineError::InvalidQuantity(_)
        ));
        assert!(matches!(
            compute(&[item(1, -5.0)], 0.0, &[]).unwrap_err(),
            EngineError::InvalidAmount(_)
        ));
        assert!(matches!(
            compute(&[item(1, f64::NAN)], 0.0, &[]).unwrap_err(),
            EngineError::InvalidAmount(_)
        ));
        assert!(matches!(
            compute(&[item(1, 10.0)], 0.0, &[cash(0.0)]).unwrap_err(),
            EngineError::InvalidAmount(_)
        ));
    }

    #[test]
    fn test_fractional_discount_rounds_half_up() {
        // 3 × 9.99 = 29.97, 15% off => 25.4745 => 25.47
        let totals = compute(&[item(3, 9.99)], 15.0, &[]).unwrap();
        assert_eq!(totals.gross_amount, 29.97);
        assert_eq!(totals.net_amount, 25.47);
    }
}
