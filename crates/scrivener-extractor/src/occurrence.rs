//! Occurrence indexing for duplicate placeholders
//!
//! Two fields may share identical placeholder text (e.g. two
//! `$[_____________]` blanks meaning different things). The occurrence
//! index, scoped to the exact placeholder string, is what lets rendering
//! target the right textual occurrence later.

use crate::types::{ExtractedField, IndexedField};
use std::collections::HashMap;

/// Annotate each field with its occurrence index
///
/// Maintains a running counter per placeholder text, processing fields in
/// their given order. Guarantees that for every placeholder text the
/// resulting indices are exactly `{0, 1, …, k-1}` where k is the number of
/// fields sharing that text.
///
/// Applied identically regardless of extraction source so downstream
/// rendering logic is extraction-agnostic.
pub fn assign_occurrence_indices(fields: Vec<ExtractedField>) -> Vec<IndexedField> {
    let mut counters: HashMap<String, u32> = HashMap::new();

    fields
        .into_iter()
        .map(|field| {
            let counter = counters.entry(field.placeholder.clone()).or_insert(0);
            let occurrence_index = *counter;
            *counter += 1;

            IndexedField {
                name: field.name,
                placeholder: field.placeholder,
                field_type: field.field_type,
                fill_order: field.fill_order,
                occurrence_index,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrivener_domain::FieldType;

    fn field(name: &str, placeholder: &str) -> ExtractedField {
        ExtractedField {
            name: name.to_string(),
            placeholder: placeholder.to_string(),
            field_type: FieldType::Text,
            fill_order: 0,
        }
    }

    #[test]
    fn test_unique_placeholders_all_zero() {
        let indexed = assign_occurrence_indices(vec![
            field("Company", "[COMPANY]"),
            field("Employee", "[EMPLOYEE]"),
            field("Start Date", "[START_DATE]"),
        ]);

        assert!(indexed.iter().all(|f| f.occurrence_index == 0));
    }

    #[test]
    fn test_duplicates_count_up() {
        let indexed = assign_occurrence_indices(vec![
            field("Rent", "$[___]"),
            field("Deposit", "$[___]"),
            field("Late Fee", "$[___]"),
            field("Tenant", "[TENANT]"),
        ]);

        assert_eq!(indexed[0].occurrence_index, 0);
        assert_eq!(indexed[1].occurrence_index, 1);
        assert_eq!(indexed[2].occurrence_index, 2);
        assert_eq!(indexed[3].occurrence_index, 0);
    }

    #[test]
    fn test_interleaved_duplicates() {
        let indexed = assign_occurrence_indices(vec![
            field("A1", "[A]"),
            field("B1", "[B]"),
            field("A2", "[A]"),
            field("B2", "[B]"),
        ]);

        assert_eq!(indexed[0].occurrence_index, 0);
        assert_eq!(indexed[1].occurrence_index, 0);
        assert_eq!(indexed[2].occurrence_index, 1);
        assert_eq!(indexed[3].occurrence_index, 1);
    }

    #[test]
    fn test_order_preserved() {
        let indexed = assign_occurrence_indices(vec![
            field("First", "[X]"),
            field("Second", "[Y]"),
        ]);
        assert_eq!(indexed[0].name, "First");
        assert_eq!(indexed[1].name, "Second");
    }
}
