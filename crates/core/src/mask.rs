//! Account identifier redaction.
//!
//! Applied at every outward-facing edge (outbound envelope, audit listing,
//! log output). The value stored internally stays raw.

/// Mask an account identifier, keeping only the trailing digits.
///
/// Strips every non-digit character, then returns `"****"` followed by the
/// last four digits (or all of them when four or fewer remain). Total
/// function: any input, including one with no digits at all, produces a
/// masked string.
pub fn mask_account(acct: &str) -> String {
    let digits: String = acct.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() <= 4 {
        format!("****{digits}")
    } else {
        format!("****{}", &digits[digits.len() - 4..])
    }
}

/// Option-passing variant for serde boundaries where the field may be absent.
pub fn mask_account_opt(acct: Option<&str>) -> Option<String> {
    acct.map(mask_account)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_long_account() {
        assert_eq!(mask_account("1234567890"), "****7890");
    }

    #[test]
    fn test_mask_short_account() {
        assert_eq!(mask_account("12"), "****12");
    }

    #[test]
    fn test_mask_exactly_four_digits() {
        assert_eq!(mask_account("1234"), "****1234");
    }

    #[test]
    fn test_mask_strips_non_digits() {
        assert_eq!(mask_account("4111-1111-1111-1111"), "****1111");
        assert_eq!(mask_account("AC-42"), "****42");
    }

    #[test]
    fn test_mask_no_digits() {
        assert_eq!(mask_account("ACCT"), "****");
    }

    #[test]
    fn test_mask_opt() {
        assert_eq!(mask_account_opt(None), None);
        assert_eq!(mask_account_opt(Some("99887766")), Some("****7766".to_string()));
    }
}
