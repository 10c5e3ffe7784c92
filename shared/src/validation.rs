//! Validation utilities for the POS backend
//!
//! Input checks shared between services; order-line ranges mirror what the
//! pricing engine enforces so malformed requests are rejected at the boundary.

use rust_decimal::Decimal;

// ============================================================================
// Account validations
// ============================================================================

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    // Registrations come from Indonesian consumer domains; require a dot in
    // the domain part on top of the RFC check.
    let domain_has_dot = email
        .rsplit_once('@')
        .map(|(_, domain)| domain.contains('.'))
        .unwrap_or(false);

    if validator::validate_email(email) && domain_has_dot {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate password strength (minimum 8 characters, matching the UI rule)
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

/// Validate username: 3-30 characters, alphanumeric plus . _ -
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if username.len() < 3 {
        return Err("Username must be at least 3 characters");
    }
    if username.len() > 30 {
        return Err("Username must be at most 30 characters");
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-')
    {
        return Err("Username may only contain letters, digits, '.', '_' and '-'");
    }
    Ok(())
}

/// Validate Indonesian phone number format
/// Accepts: 08123456789, 0812-3456-789, +628123456789
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    // Local format: 9-13 digits starting with 0
    if (9..=13).contains(&digits.len()) && digits.starts_with('0') {
        return Ok(());
    }
    // International format with country code 62
    if (10..=14).contains(&digits.len()) && digits.starts_with("62") {
        return Ok(());
    }

    Err("Invalid Indonesian phone number format")
}

// ============================================================================
// Order validations
// ============================================================================

/// Validate a 6-digit OTP code
pub fn validate_otp_format(otp: &str) -> Result<(), &'static str> {
    if otp.len() == 6 && otp.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err("OTP must be 6 digits")
    }
}

/// Validate an order line's quantity
pub fn validate_quantity(quantity: i64) -> Result<(), &'static str> {
    if quantity < 1 {
        return Err("Quantity must be at least 1");
    }
    Ok(())
}

/// Validate a unit multiplier
pub fn validate_multiplier(multiplier: i64) -> Result<(), &'static str> {
    if multiplier < 1 {
        return Err("Multiplier must be at least 1");
    }
    Ok(())
}

/// Validate a discount/tax percentage (0-100)
pub fn validate_percent(percent: Decimal) -> Result<(), &'static str> {
    if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
        return Err("Percent must be between 0 and 100");
    }
    Ok(())
}

/// Validate a monetary amount is non-negative
pub fn validate_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount < Decimal::ZERO {
        return Err("Amount cannot be negative");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("kasir1@gmail.com").is_ok());
        assert!(validate_email("user.name@domain.co.id").is_ok());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("no@domain").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("Password123!").is_ok());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("kasir1").is_ok());
        assert!(validate_username("dihya.aufa").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("08123456789").is_ok());
        assert!(validate_phone("0812-3456-789").is_ok());
        assert!(validate_phone("+628123456789").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("abcdefghij").is_err());
    }

    #[test]
    fn test_validate_otp_format() {
        assert!(validate_otp_format("123456").is_ok());
        assert!(validate_otp_format("12345").is_err());
        assert!(validate_otp_format("12345a").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }

    #[test]
    fn test_validate_multiplier() {
        assert!(validate_multiplier(1).is_ok());
        assert!(validate_multiplier(40).is_ok());
        assert!(validate_multiplier(0).is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(Decimal::ZERO).is_ok());
        assert!(validate_amount(Decimal::from(50_000)).is_ok());
        assert!(validate_amount(Decimal::from(-1)).is_err());
    }

    #[test]
    fn test_validate_percent() {
        assert!(validate_percent(Decimal::ZERO).is_ok());
        assert!(validate_percent(Decimal::ONE_HUNDRED).is_ok());
        assert!(validate_percent(Decimal::from(101)).is_err());
        assert!(validate_percent(Decimal::from(-1)).is_err());
    }
}
