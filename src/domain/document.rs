//! National tax-id documents.
//!
//! Two formats carry a two-pass weighted mod-11 checksum: the 11-digit
//! individual document and the 14-digit organization document. Both end in
//! two check digits. Any other length is accepted as-is.

/// Weights for the second check digit. The first check digit uses the same
/// table without its leading weight.
const INDIVIDUAL_WEIGHTS: [u32; 10] = [11, 10, 9, 8, 7, 6, 5, 4, 3, 2];
const ORGANIZATION_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Individual,
    Organization,
    Unrecognized,
}

impl DocumentKind {
    pub fn of(document: &str) -> Self {
        match document.chars().count() {
            11 => DocumentKind::Individual,
            14 => DocumentKind::Organization,
            _ => DocumentKind::Unrecognized,
        }
    }
}

/// Strips everything but ASCII letters and digits, then uppercases.
pub fn canonicalize(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Checks the check digits of a canonical document.
///
/// Unrecognized lengths are accepted. A recognized length with
/// any non-digit character is rejected outright; letters are never folded
/// into the checksum by their character codes.
pub fn validate(document: &str) -> bool {
    let weights: &[u32] = match DocumentKind::of(document) {
        DocumentKind::Individual => &INDIVIDUAL_WEIGHTS,
        DocumentKind::Organization => &ORGANIZATION_WEIGHTS,
        DocumentKind::Unrecognized => return true,
    };

    let Some(digits) = document
        .chars()
        .map(|c| c.to_digit(10))
        .collect::<Option<Vec<u32>>>()
    else {
        return false;
    };

    let body = digits.len() - 2;
    check_digit(&digits[..body], &weights[1..]) == digits[body]
        && check_digit(&digits[..=body], weights) == digits[body + 1]
}

fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    match sum % 11 {
        r if r < 2 => 0,
        r => 11 - r,
    }
}
