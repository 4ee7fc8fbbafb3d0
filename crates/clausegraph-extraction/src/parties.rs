use std::sync::LazyLock;

use regex::Regex;

/// Closed list of contractual role nouns, in roster order.
pub const ROLE_NOUNS: [&str; 18] = [
    "Seller",
    "Buyer",
    "Company",
    "Employee",
    "Contractor",
    "Client",
    "Landlord",
    "Tenant",
    "Licensor",
    "Licensee",
    "Provider",
    "Customer",
    "Vendor",
    "Supplier",
    "Lessee",
    "Lessor",
    "Borrower",
    "Lender",
];

static ROLE_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    ROLE_NOUNS
        .iter()
        .map(|&noun| {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(noun));
            (noun, Regex::new(&pattern).expect("valid role noun regex"))
        })
        .collect()
});

/// Role nouns that occur anywhere in `text` as whole words, ignoring case.
/// Order follows [`ROLE_NOUNS`].
pub fn extract_parties(text: &str) -> Vec<String> {
    ROLE_PATTERNS
        .iter()
        .filter(|(_, pattern)| pattern.is_match(text))
        .map(|(noun, _)| noun.to_string())
        .collect()
}

/// First role noun, in list order, mentioned in `text`.
pub fn detect_target_party(text: &str) -> Option<&'static str> {
    ROLE_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(text))
        .map(|(noun, _)| *noun)
}
