use chrono::{Datelike, Utc};
use serde::Deserialize;

use super::ValidationError;
use crate::db_types::CardNetwork;

/// Card details as submitted at checkout. The number and CVV are validated and then discarded;
/// only the detected network and the last four digits are ever stored.
#[derive(Clone, Deserialize)]
pub struct CardDetails {
    pub number: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub cvv: String,
    pub holder_name: String,
}

impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CardDetails(**** {})", card_last4(&self.number))
    }
}

/// The storable outcome of a successful card validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCard {
    pub network: CardNetwork,
    pub last4: String,
}

fn strip_separators(number: &str) -> String {
    number.chars().filter(|c| !c.is_whitespace() && *c != '-').collect()
}

/// The last four digits of the card number, after stripping spaces and dashes.
pub fn card_last4(number: &str) -> String {
    let digits = strip_separators(number);
    digits[digits.len().saturating_sub(4)..].to_string()
}

/// Validates a card number: 13 to 19 digits (spaces and dashes are tolerated and stripped) and
/// a passing Luhn checksum.
pub fn validate_card_number(number: &str) -> Result<(), ValidationError> {
    let digits = strip_separators(number);
    if digits.is_empty() {
        return Err(ValidationError::InvalidCard("Card number is required".to_string()));
    }
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidCard(
            "Card number must contain only digits".to_string(),
        ));
    }
    if digits.len() < 13 || digits.len() > 19 {
        return Err(ValidationError::InvalidCard(
            "Card number must be between 13 and 19 digits".to_string(),
        ));
    }
    if !luhn_checksum_holds(&digits) {
        return Err(ValidationError::InvalidCard("Invalid card number".to_string()));
    }
    Ok(())
}

// Double every second digit from the right, subtract 9 when the doubling exceeds 9, and require
// the sum to be a multiple of 10.
fn luhn_checksum_holds(digits: &str) -> bool {
    let mut sum = 0u32;
    let mut double = false;
    for c in digits.chars().rev() {
        let mut digit = c.to_digit(10).unwrap_or(0);
        if double {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
        double = !double;
    }
    sum % 10 == 0
}

/// Classifies the card network from the number prefix. Purely informational; an unrecognized
/// prefix yields [`CardNetwork::Unknown`] and never blocks validity.
pub fn detect_card_network(number: &str) -> CardNetwork {
    let digits = strip_separators(number);
    if digits.starts_with('4') {
        return CardNetwork::Visa;
    }
    let first_two = match digits.get(0..2).and_then(|p| p.parse::<u32>().ok()) {
        Some(prefix) => prefix,
        None => return CardNetwork::Unknown,
    };
    match first_two {
        51..=55 => CardNetwork::Mastercard,
        34 | 37 => CardNetwork::Amex,
        60 | 65 | 81..=89 => CardNetwork::Rupay,
        _ => CardNetwork::Unknown,
    }
}

/// Validates the expiry date at month granularity: the card is good through the last day of its
/// expiry month. Two-digit years are interpreted as 20xx.
pub fn validate_expiry(month: &str, year: &str) -> Result<(), ValidationError> {
    if month.trim().is_empty() || year.trim().is_empty() {
        return Err(ValidationError::ExpiredCard("Expiry month and year are required".to_string()));
    }
    let month_num = month
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|m| (1..=12).contains(m))
        .ok_or_else(|| ValidationError::ExpiredCard("Invalid expiry month".to_string()))?;
    let mut year_num = year
        .trim()
        .parse::<i32>()
        .map_err(|_| ValidationError::ExpiredCard("Invalid expiry year".to_string()))?;
    if year_num < 100 {
        year_num += 2000;
    }
    let now = Utc::now();
    if year_num < now.year() || (year_num == now.year() && month_num < now.month()) {
        return Err(ValidationError::ExpiredCard("Card has expired".to_string()));
    }
    Ok(())
}

/// Validates the CVV. Amex nominally uses 4 digits and everything else 3, but the length check
/// accepts either for every network; tests pin this so the looseness stays visible.
pub fn validate_cvv(cvv: &str, network: CardNetwork) -> Result<(), ValidationError> {
    let digits: String = cvv.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.is_empty() {
        return Err(ValidationError::InvalidCard("CVV is required".to_string()));
    }
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidCard("CVV must contain only digits".to_string()));
    }
    let expected = if network == CardNetwork::Amex { 4 } else { 3 };
    if digits.len() != expected && digits.len() != 3 && digits.len() != 4 {
        return Err(ValidationError::InvalidCard("Invalid CVV length".to_string()));
    }
    Ok(())
}

/// Validates a complete card: number, then expiry, then CVV, then holder name, short-circuiting
/// on the first failure. Returns the network and last four digits for storage.
pub fn validate_card(card: &CardDetails) -> Result<ValidCard, ValidationError> {
    validate_card_number(&card.number)?;
    let network = detect_card_network(&card.number);
    validate_expiry(&card.expiry_month, &card.expiry_year)?;
    validate_cvv(&card.cvv, network)?;
    if card.holder_name.trim().is_empty() {
        return Err(ValidationError::InvalidCard("Card holder name is required".to_string()));
    }
    Ok(ValidCard { network, last4: card_last4(&card.number) })
}

#[cfg(test)]
mod test {
    use super::*;

    fn visa_card() -> CardDetails {
        CardDetails {
            number: "4111 1111 1111 1111".to_string(),
            expiry_month: "12".to_string(),
            expiry_year: "2099".to_string(),
            cvv: "123".to_string(),
            holder_name: "Alice Kumar".to_string(),
        }
    }

    #[test]
    fn a_luhn_valid_card_passes_end_to_end() {
        let valid = validate_card(&visa_card()).unwrap();
        assert_eq!(valid.network, CardNetwork::Visa);
        assert_eq!(valid.last4, "1111");
    }

    #[test]
    fn changing_one_digit_breaks_the_checksum() {
        assert!(validate_card_number("4111111111111111").is_ok());
        let err = validate_card_number("4111111111111112").unwrap_err();
        assert_eq!(err, ValidationError::InvalidCard("Invalid card number".to_string()));
    }

    #[test]
    fn separators_are_stripped_before_validation() {
        assert!(validate_card_number("5500-0000-0000-0004").is_ok());
        assert!(validate_card_number("5500 0000 0000 0004").is_ok());
    }

    #[test]
    fn length_bounds_are_enforced() {
        assert_eq!(
            validate_card_number("411111111111").unwrap_err(),
            ValidationError::InvalidCard("Card number must be between 13 and 19 digits".to_string())
        );
        assert_eq!(
            validate_card_number("41111111x1111111").unwrap_err(),
            ValidationError::InvalidCard("Card number must contain only digits".to_string())
        );
        assert_eq!(
            validate_card_number("").unwrap_err(),
            ValidationError::InvalidCard("Card number is required".to_string())
        );
    }

    #[test]
    fn network_detection_by_prefix() {
        assert_eq!(detect_card_network("4111111111111111"), CardNetwork::Visa);
        assert_eq!(detect_card_network("5500000000000004"), CardNetwork::Mastercard);
        assert_eq!(detect_card_network("340000000000009"), CardNetwork::Amex);
        assert_eq!(detect_card_network("370000000000002"), CardNetwork::Amex);
        assert_eq!(detect_card_network("6011000000000004"), CardNetwork::Rupay);
        assert_eq!(detect_card_network("6500000000000002"), CardNetwork::Rupay);
        assert_eq!(detect_card_network("8100000000000001"), CardNetwork::Rupay);
        assert_eq!(detect_card_network("9999999999999999"), CardNetwork::Unknown);
        assert_eq!(detect_card_network(""), CardNetwork::Unknown);
    }

    #[test]
    fn expiry_in_the_past_is_rejected() {
        assert_eq!(
            validate_expiry("12", "2020").unwrap_err(),
            ValidationError::ExpiredCard("Card has expired".to_string())
        );
        assert!(validate_expiry("12", "2099").is_ok());
        // 2-digit years are 20xx
        assert!(validate_expiry("6", "99").is_ok());
    }

    #[test]
    fn expiry_is_checked_at_month_granularity() {
        let now = Utc::now();
        assert!(validate_expiry(&now.month().to_string(), &now.year().to_string()).is_ok());
    }

    #[test]
    fn malformed_expiry_fields_are_rejected() {
        assert_eq!(
            validate_expiry("13", "2099").unwrap_err(),
            ValidationError::ExpiredCard("Invalid expiry month".to_string())
        );
        assert_eq!(
            validate_expiry("0", "2099").unwrap_err(),
            ValidationError::ExpiredCard("Invalid expiry month".to_string())
        );
        assert_eq!(
            validate_expiry("12", "twenty99").unwrap_err(),
            ValidationError::ExpiredCard("Invalid expiry year".to_string())
        );
        assert_eq!(
            validate_expiry("", "2099").unwrap_err(),
            ValidationError::ExpiredCard("Expiry month and year are required".to_string())
        );
    }

    #[test]
    fn cvv_must_be_numeric() {
        assert!(validate_cvv("123", CardNetwork::Visa).is_ok());
        assert_eq!(
            validate_cvv("12x", CardNetwork::Visa).unwrap_err(),
            ValidationError::InvalidCard("CVV must contain only digits".to_string())
        );
        assert_eq!(
            validate_cvv("", CardNetwork::Visa).unwrap_err(),
            ValidationError::InvalidCard("CVV is required".to_string())
        );
        assert_eq!(
            validate_cvv("12", CardNetwork::Visa).unwrap_err(),
            ValidationError::InvalidCard("Invalid CVV length".to_string())
        );
        assert_eq!(
            validate_cvv("12345", CardNetwork::Amex).unwrap_err(),
            ValidationError::InvalidCard("Invalid CVV length".to_string())
        );
    }

    #[test]
    fn cvv_length_is_not_enforced_per_network() {
        // A 4-digit CVV passes for visa and a 3-digit one for amex, matching the reference
        // gateway's permissive check.
        assert!(validate_cvv("1234", CardNetwork::Visa).is_ok());
        assert!(validate_cvv("123", CardNetwork::Amex).is_ok());
        assert!(validate_cvv("1234", CardNetwork::Amex).is_ok());
    }

    #[test]
    fn composite_validation_short_circuits_with_the_right_code() {
        let mut card = visa_card();
        card.expiry_year = "2019".to_string();
        assert_eq!(
            validate_card(&card).unwrap_err(),
            ValidationError::ExpiredCard("Card has expired".to_string())
        );

        let mut card = visa_card();
        card.holder_name = "   ".to_string();
        assert_eq!(
            validate_card(&card).unwrap_err(),
            ValidationError::InvalidCard("Card holder name is required".to_string())
        );

        let mut card = visa_card();
        card.number = "1234".to_string();
        assert!(matches!(validate_card(&card).unwrap_err(), ValidationError::InvalidCard(_)));
    }

    #[test]
    fn debug_output_never_contains_the_full_pan() {
        let rendered = format!("{:?}", visa_card());
        assert!(!rendered.contains("4111 1111"));
        assert!(rendered.contains("1111"));
    }
}
