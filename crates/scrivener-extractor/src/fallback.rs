//! Regex fallback scanner
//!
//! Used when the LLM path fails, returns malformed structure, or finds
//! nothing. Recognizes the fixed bracket conventions `[NAME]`, `{NAME}`,
//! and `<NAME>` where NAME is an uppercase/underscore token.

use crate::types::ExtractedField;
use regex::Regex;
use scrivener_domain::FieldType;
use std::collections::HashSet;
use std::sync::LazyLock;

static BRACKET_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\[([A-Z_][A-Z0-9_]*)\]",
        r"\{([A-Z_][A-Z0-9_]*)\}",
        r"<([A-Z_][A-Z0-9_]*)>",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("bracket pattern is valid"))
    .collect()
});

/// Scan a document body for bracketed placeholders
///
/// Deduplicates by literal placeholder string and assigns fill order by
/// first-seen sequence.
pub fn scan_placeholders(document_text: &str) -> Vec<ExtractedField> {
    let mut found = HashSet::new();
    let mut fields = Vec::new();

    for pattern in BRACKET_PATTERNS.iter() {
        for captures in pattern.captures_iter(document_text) {
            let placeholder = &captures[0];
            let token = &captures[1];

            if !found.insert(placeholder.to_string()) {
                continue;
            }

            fields.push(ExtractedField {
                name: display_name(token),
                placeholder: placeholder.to_string(),
                field_type: guess_type(token),
                fill_order: fields.len() as i64 + 1,
            });
        }
    }

    fields
}

/// Convert SNAKE_CASE to Title Case
fn display_name(token: &str) -> String {
    token
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Guess a field type from keyword substrings in the token
fn guess_type(token: &str) -> FieldType {
    if token.contains("DATE") || token.contains("TIME") {
        FieldType::Date
    } else if token.contains("EMAIL") {
        FieldType::Email
    } else if token.contains("PHONE") || token.contains("TEL") {
        FieldType::Phone
    } else if token.contains("ADDRESS") {
        FieldType::Address
    } else if ["AGE", "AMOUNT", "SALARY", "NUMBER"]
        .iter()
        .any(|kw| token.contains(kw))
    {
        FieldType::Number
    } else {
        FieldType::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_square_brackets() {
        let fields = scan_placeholders("Agreement between [COMPANY] and [EMPLOYEE].");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].placeholder, "[COMPANY]");
        assert_eq!(fields[0].name, "Company");
        assert_eq!(fields[1].placeholder, "[EMPLOYEE]");
        assert_eq!(fields[1].name, "Employee");
    }

    #[test]
    fn test_scan_all_bracket_styles() {
        let fields = scan_placeholders("[A_ONE] {B_TWO} <C_THREE>");
        let placeholders: Vec<&str> = fields.iter().map(|f| f.placeholder.as_str()).collect();
        assert!(placeholders.contains(&"[A_ONE]"));
        assert!(placeholders.contains(&"{B_TWO}"));
        assert!(placeholders.contains(&"<C_THREE>"));
    }

    #[test]
    fn test_scan_dedups_repeated_placeholders() {
        let fields = scan_placeholders("[NAME] appears here and [NAME] appears there");
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn test_scan_ignores_lowercase_tokens() {
        let fields = scan_placeholders("not a [placeholder] but [REAL_ONE] is");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].placeholder, "[REAL_ONE]");
    }

    #[test]
    fn test_scan_assigns_first_seen_order() {
        let fields = scan_placeholders("[B_FIELD] then [A_FIELD]");
        assert_eq!(fields[0].placeholder, "[B_FIELD]");
        assert_eq!(fields[0].fill_order, 1);
        assert_eq!(fields[1].placeholder, "[A_FIELD]");
        assert_eq!(fields[1].fill_order, 2);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("START_DATE"), "Start Date");
        assert_eq!(display_name("EMPLOYEE"), "Employee");
        assert_eq!(display_name("COMPANY_NAME_2"), "Company Name 2");
    }

    #[test]
    fn test_guess_type_keywords() {
        assert_eq!(guess_type("START_DATE"), FieldType::Date);
        assert_eq!(guess_type("SIGNING_TIME"), FieldType::Date);
        assert_eq!(guess_type("CONTACT_EMAIL"), FieldType::Email);
        assert_eq!(guess_type("PHONE_NUMBER"), FieldType::Phone);
        assert_eq!(guess_type("TEL_HOME"), FieldType::Phone);
        assert_eq!(guess_type("HOME_ADDRESS"), FieldType::Address);
        assert_eq!(guess_type("SALARY"), FieldType::Number);
        assert_eq!(guess_type("AGE"), FieldType::Number);
        assert_eq!(guess_type("COMPANY"), FieldType::Text);
    }

    #[test]
    fn test_scan_empty_text() {
        assert!(scan_placeholders("no placeholders here").is_empty());
    }
}
