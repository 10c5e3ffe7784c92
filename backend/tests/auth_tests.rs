//! Authentication and input validation tests

use proptest::prelude::*;

use shared::validation::{
    validate_email, validate_otp_format, validate_password, validate_phone, validate_username,
};

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(validate_email("pelanggan@gmail.com").is_ok());
        assert!(validate_email("nama.belakang@toko.co.id").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a@b").is_err());
    }

    #[test]
    fn test_password_minimum_length() {
        assert!(validate_password("delapan8").is_ok());
        assert!(validate_password("tujuh77").is_err());
    }

    #[test]
    fn test_username_charset() {
        assert!(validate_username("kasir.satu").is_ok());
        assert!(validate_username("admin_01").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("nama spasi").is_err());
        assert!(validate_username(&"x".repeat(31)).is_err());
    }

    #[test]
    fn test_indonesian_phone_formats() {
        assert!(validate_phone("08123456789").is_ok());
        assert!(validate_phone("+628123456789").is_ok());
        assert!(validate_phone("0812-3456-7890").is_ok());
        assert!(validate_phone("12345").is_err());
    }

    /// The password-change flow verifies against the current hash, then
    /// replaces it; the old password must stop verifying afterwards
    #[test]
    fn test_password_change_invalidates_old_password() {
        let old_hash = bcrypt::hash("lama-rahasia1", 4).unwrap();
        assert!(bcrypt::verify("lama-rahasia1", &old_hash).unwrap());
        assert!(!bcrypt::verify("salah-tebakan", &old_hash).unwrap());

        let new_hash = bcrypt::hash("baru-rahasia1", 4).unwrap();
        assert!(bcrypt::verify("baru-rahasia1", &new_hash).unwrap());
        assert!(!bcrypt::verify("lama-rahasia1", &new_hash).unwrap());
    }

    #[test]
    fn test_otp_format() {
        assert!(validate_otp_format("000000").is_ok());
        assert!(validate_otp_format("123456").is_ok());
        assert!(validate_otp_format("1234567").is_err());
        assert!(validate_otp_format("12345x").is_err());
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Every 6-digit string passes OTP format validation
    #[test]
    fn prop_six_digit_otps_pass(n in 0u32..1_000_000) {
        let otp = format!("{:06}", n);
        prop_assert!(validate_otp_format(&otp).is_ok());
    }

    /// OTP validation rejects anything that is not exactly 6 digits
    #[test]
    fn prop_wrong_length_otps_fail(s in "[0-9]{1,5}|[0-9]{7,10}") {
        prop_assert!(validate_otp_format(&s).is_err());
    }

    /// Passwords of 8+ characters pass, shorter ones fail
    #[test]
    fn prop_password_length_boundary(s in ".{0,20}") {
        let result = validate_password(&s);
        if s.len() >= 8 {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(result.is_err());
        }
    }
}
