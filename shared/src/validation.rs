//! Validation utilities for pharmacy records
//!
//! Includes India-specific checks for HSN codes and phone numbers.

use rust_decimal::Decimal;

// ============================================================================
// Purchase Entry Validations
// ============================================================================

/// Validate a percentage is within 0-100
pub fn validate_percentage(value: Decimal) -> Result<(), &'static str> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err("Percentage must be between 0 and 100");
    }
    Ok(())
}

/// Validate an invoice number (non-blank, printable, at most 50 characters)
pub fn validate_invoice_number(invoice_number: &str) -> Result<(), &'static str> {
    let trimmed = invoice_number.trim();
    if trimmed.is_empty() {
        return Err("Invoice number is required");
    }
    if trimmed.chars().count() > 50 {
        return Err("Invoice number must be at most 50 characters");
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err("Invoice number contains invalid characters");
    }
    Ok(())
}

// ============================================================================
// India-Specific Validations
// ============================================================================

/// HSN code without the dots and spaces it is often printed with
pub fn normalize_hsn_code(hsn: &str) -> String {
    hsn.chars().filter(|c| *c != '.' && *c != ' ').collect()
}

/// Validate HSN code (4, 6 or 8 digits; dots and spaces ignored)
pub fn validate_hsn_code(hsn: &str) -> Result<(), &'static str> {
    let cleaned = normalize_hsn_code(hsn);
    if !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err("HSN code must contain digits only");
    }
    match cleaned.len() {
        4 | 6 | 8 => Ok(()),
        _ => Err("HSN code must be 4, 6 or 8 digits"),
    }
}

/// Indian mobile number: 10 digits starting 6-9, optional +91/0 prefix
pub fn validate_indian_phone(phone: &str) -> Result<(), &'static str> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    let local = match digits.len() {
        10 => digits.as_str(),
        11 if digits.starts_with('0') => &digits[1..],
        12 if digits.starts_with("91") => &digits[2..],
        _ => return Err("Invalid phone number format"),
    };
    if local.starts_with(|c: char| ('6'..='9').contains(&c)) {
        Ok(())
    } else {
        Err("Invalid phone number format")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_percentage() {
        assert!(validate_percentage(Decimal::ZERO).is_ok());
        assert!(validate_percentage(Decimal::from(100)).is_ok());
        assert!(validate_percentage(Decimal::new(125, 1)).is_ok());
        assert!(validate_percentage(Decimal::from(-1)).is_err());
        assert!(validate_percentage(Decimal::from(101)).is_err());
    }

    #[test]
    fn test_validate_invoice_number() {
        assert!(validate_invoice_number("INV-001").is_ok());
        assert!(validate_invoice_number("   ").is_err());
        assert!(validate_invoice_number(&"X".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_hsn_code() {
        assert!(validate_hsn_code("3004").is_ok());
        assert!(validate_hsn_code("300490").is_ok());
        assert!(validate_hsn_code("3004.90.99").is_ok());
        assert!(validate_hsn_code("30049").is_err());
        assert!(validate_hsn_code("30A4").is_err());
    }

    #[test]
    fn test_normalize_hsn_code() {
        assert_eq!(normalize_hsn_code("3004.90.99"), "30049099");
        assert_eq!(normalize_hsn_code(" 3004 90 "), "300490");
        assert_eq!(normalize_hsn_code("3004"), "3004");
    }

    #[test]
    fn test_validate_indian_phone() {
        assert!(validate_indian_phone("9876543210").is_ok());
        assert!(validate_indian_phone("+91 98765 43210").is_ok());
        assert!(validate_indian_phone("09876543210").is_ok());
        assert!(validate_indian_phone("1234567890").is_err());
        assert!(validate_indian_phone("12345").is_err());
    }
}
