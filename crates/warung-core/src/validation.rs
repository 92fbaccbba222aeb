//! # Validation Module
//!
//! Explicit input validation for workflow entry points.
//!
//! The original system hung validation off declarative request
//! annotations; here every rule is a plain function the workflow calls
//! before touching the store. The database adds its own layer underneath
//! (NOT NULL, CHECK, UNIQUE, FK constraints).

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a customer name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most 100 characters
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "customer_name".to_string(),
        });
    }

    if name.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "customer_name".to_string(),
            max: 100,
        });
    }

    Ok(())
}

/// Validates a line item quantity.
///
/// Quantities are per line; `MAX_ITEM_QUANTITY` guards against fat-finger
/// orders (1000 instead of 10).
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if quantity > crate::MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: crate::MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates that an order has at least one line item.
pub fn validate_items_not_empty<T>(items: &[T]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Empty {
            field: "items".to_string(),
        });
    }
    Ok(())
}

/// Validates a payment amount.
pub fn validate_payment_amount(amount_cents: i64) -> ValidationResult<()> {
    if amount_cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    Ok(())
}

/// Validates a product name.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a product price.
pub fn validate_price(price_cents: i64) -> ValidationResult<()> {
    if price_cents < 0 {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_name() {
        assert!(validate_customer_name("Budi").is_ok());
        assert!(validate_customer_name("  ").is_err());
        assert!(validate_customer_name(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_quantity_bounds() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(crate::MAX_ITEM_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(crate::MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_items_not_empty() {
        assert!(validate_items_not_empty(&[1, 2]).is_ok());
        let empty: [i32; 0] = [];
        assert!(validate_items_not_empty(&empty).is_err());
    }

    #[test]
    fn test_payment_amount() {
        assert!(validate_payment_amount(10_000).is_ok());
        assert!(validate_payment_amount(0).is_err());
        assert!(validate_payment_amount(-1).is_err());
    }

    #[test]
    fn test_price_non_negative() {
        assert!(validate_price(0).is_ok());
        assert!(validate_price(-1).is_err());
    }
}
