//! Phone number utilities
//!
//! All phone keys used by the verification engine are normalized to digits only,
//! so "010-1234-5678" and "01012345678" refer to the same subscriber.

use once_cell::sync::Lazy;
use regex::Regex;

// Korean mobile phone number regex (national format, digits only)
static KOREA_MOBILE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^01[016789]\d{7,8}$").expect("valid Korean mobile regex")
});

/// Korean country calling code
pub const KOREA_COUNTRY_CODE: &str = "82";

/// Normalize a phone number by stripping every non-digit character
pub fn normalize_phone_number(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Check if a phone number is a valid Korean mobile number
///
/// The number is normalized before matching, so formatting characters are ignored.
pub fn is_valid_korean_mobile(phone: &str) -> bool {
    let normalized = normalize_phone_number(phone);
    KOREA_MOBILE_REGEX.is_match(&normalized)
}

/// Convert a national-format Korean mobile number to E.164 (`+8210...`)
///
/// Returns `None` when the number is not a valid Korean mobile number.
pub fn to_e164(phone: &str) -> Option<String> {
    let normalized = normalize_phone_number(phone);
    if !KOREA_MOBILE_REGEX.is_match(&normalized) {
        return None;
    }
    Some(format!("+{}{}", KOREA_COUNTRY_CODE, &normalized[1..]))
}

/// Format a Korean mobile number for display (e.g., 010-1234-5678)
pub fn format_korean_mobile(phone: &str) -> Option<String> {
    let normalized = normalize_phone_number(phone);
    if !KOREA_MOBILE_REGEX.is_match(&normalized) {
        return None;
    }
    let middle_end = normalized.len() - 4;
    Some(format!(
        "{}-{}-{}",
        &normalized[0..3],
        &normalized[3..middle_end],
        &normalized[middle_end..]
    ))
}

/// Mask a phone number for logs and display (e.g., 010****5678)
pub fn mask_phone_number(phone: &str) -> String {
    let normalized = normalize_phone_number(phone);
    if normalized.len() >= 7 {
        format!(
            "{}****{}",
            &normalized[0..3],
            &normalized[normalized.len() - 4..]
        )
    } else {
        "****".to_string()
    }
}
