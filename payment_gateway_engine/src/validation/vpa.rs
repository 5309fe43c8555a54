use super::ValidationError;

/// `local-part@domain`, where the local part allows letters, digits, dot, underscore and hyphen,
/// and the domain allows letters and digits only. Note that a dotted domain does not pass.
const VPA_FORMAT: &str = r"^[a-zA-Z0-9._-]+@[a-zA-Z0-9]+$";

/// Validates a UPI Virtual Payment Address.
pub fn validate_vpa(vpa: &str) -> Result<(), ValidationError> {
    if vpa.trim().is_empty() {
        return Err(ValidationError::InvalidVpa("VPA is required".to_string()));
    }
    let format = regex::Regex::new(VPA_FORMAT).unwrap();
    if !format.is_match(vpa) {
        return Err(ValidationError::InvalidVpa(
            "Invalid VPA format. VPA must be in format: username@bank".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn well_formed_addresses_pass() {
        assert!(validate_vpa("alice@upi").is_ok());
        assert!(validate_vpa("alice.b_c-d@okhdfc").is_ok());
        assert!(validate_vpa("9876543210@paytm").is_ok());
    }

    #[test]
    fn missing_separator_fails() {
        let err = validate_vpa("alice.upi").unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidVpa(
                "Invalid VPA format. VPA must be in format: username@bank".to_string()
            )
        );
    }

    #[test]
    fn empty_input_is_reported_as_required() {
        assert_eq!(
            validate_vpa("").unwrap_err(),
            ValidationError::InvalidVpa("VPA is required".to_string())
        );
    }

    #[test]
    fn dotted_domains_and_stray_characters_fail() {
        assert!(validate_vpa("alice@upi.bank").is_err());
        assert!(validate_vpa("@upi").is_err());
        assert!(validate_vpa("alice@").is_err());
        assert!(validate_vpa("ali ce@upi").is_err());
        assert!(validate_vpa("alice@upi@upi").is_err());
    }
}
