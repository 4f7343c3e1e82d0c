//! Scrivener Text Renderer
//!
//! Occurrence-aware placeholder replacement for previews and final
//! document generation.
//!
//! # Why occurrence-aware
//!
//! Two fields can carry identical placeholder text (two `$[___]` blanks
//! meaning rent and deposit). A plain string replace would fill both with
//! the first value. Each field instead targets the single occurrence
//! matching its occurrence index, and every non-target occurrence is left
//! as the literal placeholder text until its own turn, so replacement
//! calls are independent of each other's order.

#![warn(missing_docs)]

use scrivener_domain::{Field, FieldStatus};
use tracing::warn;

/// Replace the Nth occurrence (zero-based) of `placeholder` in `text`
///
/// When fewer than `n + 1` occurrences exist the text is returned
/// unchanged: a defensive no-op for stale or inconsistent field data, not
/// an error.
pub fn replace_nth(text: &str, placeholder: &str, replacement: &str, n: u32) -> String {
    if placeholder.is_empty() {
        return text.to_string();
    }

    let parts: Vec<&str> = text.split(placeholder).collect();
    let occurrences = parts.len() - 1;
    let n = n as usize;

    if occurrences <= n {
        warn!(
            "Skipping replacement: occurrence {} of {:?} not present ({} found)",
            n, placeholder, occurrences
        );
        return text.to_string();
    }

    // Rejoin everything before the target with the placeholder intact,
    // splice in the replacement, then rejoin the rest intact
    let before = parts[..=n].join(placeholder);
    let after = parts[n + 1..].join(placeholder);

    let mut result = String::with_capacity(text.len() + replacement.len());
    result.push_str(&before);
    result.push_str(replacement);
    result.push_str(&after);
    result
}

/// Fields sorted highest occurrence index first
///
/// Invariant: replacing a higher occurrence leaves every lower occurrence
/// as literal placeholder text, so the numbering each later call targets
/// is still valid.
fn in_replacement_order(fields: &[Field]) -> Vec<&Field> {
    let mut ordered: Vec<&Field> = fields.iter().collect();
    ordered.sort_by(|a, b| b.occurrence_index.cmp(&a.occurrence_index));
    ordered
}

/// Render the completed document text
///
/// Applies every filled field's value at that field's own occurrence
/// index. Pending fields keep their placeholder text.
pub fn render_completed(text: &str, fields: &[Field]) -> String {
    let mut result = text.to_string();

    for field in in_replacement_order(fields) {
        if let Some(value) = &field.value {
            result = replace_nth(&result, &field.placeholder, value, field.occurrence_index);
        }
    }

    result
}

/// Render an HTML preview with filled and pending fields highlighted
///
/// Filled values get a green `filled-field` span, pending placeholders an
/// amber `pending-field` span. The body is wrapped in a `<pre>` shell that
/// preserves the document's whitespace.
pub fn render_preview(text: &str, fields: &[Field]) -> String {
    let mut body = text.to_string();

    for field in in_replacement_order(fields) {
        let replacement = match (&field.value, field.status) {
            (Some(value), FieldStatus::Filled) => format!(
                "<span class=\"filled-field\" style=\"background-color: #d1fae5; color: #047857; padding: 2px 6px; border-radius: 4px; font-weight: 500;\">{}</span>",
                value
            ),
            _ => format!(
                "<span class=\"pending-field\" style=\"background-color: #fef3c7; color: #92400e; padding: 2px 6px; border-radius: 4px; font-weight: 500; border: 1px solid #fbbf24;\">{}</span>",
                field.placeholder
            ),
        };
        body = replace_nth(&body, &field.placeholder, &replacement, field.occurrence_index);
    }

    format!(
        "<pre style='white-space: pre-wrap; font-family: inherit;'>{}</pre>",
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrivener_domain::{DocumentId, FieldType};

    fn field(placeholder: &str, occurrence: u32, value: Option<&str>) -> Field {
        let mut f = Field::new(
            DocumentId::new(),
            "Test",
            placeholder,
            FieldType::Text,
            1,
            occurrence,
        );
        if let Some(v) = value {
            f.value = Some(v.to_string());
            f.status = FieldStatus::Filled;
        }
        f
    }

    #[test]
    fn test_replace_first_occurrence() {
        assert_eq!(
            replace_nth("A [X] B [X] C", "[X]", "Y", 0),
            "A Y B [X] C"
        );
    }

    #[test]
    fn test_replace_second_occurrence() {
        assert_eq!(
            replace_nth("A [X] B [X] C", "[X]", "Y", 1),
            "A [X] B Y C"
        );
    }

    #[test]
    fn test_replace_out_of_range_is_noop() {
        let text = "A [X] B";
        assert_eq!(replace_nth(text, "[X]", "Y", 1), text);
        assert_eq!(replace_nth(text, "[X]", "Y", 7), text);
    }

    #[test]
    fn test_replace_missing_placeholder_is_noop() {
        let text = "no blanks here";
        assert_eq!(replace_nth(text, "[X]", "Y", 0), text);
    }

    #[test]
    fn test_replace_empty_placeholder_is_noop() {
        let text = "anything";
        assert_eq!(replace_nth(text, "", "Y", 0), text);
    }

    #[test]
    fn test_replacements_independent_of_order() {
        let text = "Rent: $[___] Deposit: $[___]";

        // Second occurrence first, then the first
        let step1 = replace_nth(text, "$[___]", "$2,000", 1);
        assert_eq!(step1, "Rent: $[___] Deposit: $2,000");
        let step2 = replace_nth(&step1, "$[___]", "$1,500", 0);
        assert_eq!(step2, "Rent: $1,500 Deposit: $2,000");

        // Same result the other way around
        let step1 = replace_nth(text, "$[___]", "$1,500", 0);
        let step2 = replace_nth(&step1, "$[___]", "$2,000", 1);
        assert_eq!(step2, "Rent: $1,500 Deposit: $2,000");
    }

    #[test]
    fn test_render_completed_fills_only_filled_fields() {
        let text = "Between [A] and [B].";
        let fields = vec![
            field("[A]", 0, Some("Acme Corp")),
            field("[B]", 0, None),
        ];

        assert_eq!(render_completed(text, &fields), "Between Acme Corp and [B].");
    }

    #[test]
    fn test_render_completed_duplicate_placeholders() {
        let text = "Rent: $[___] Deposit: $[___]";
        let fields = vec![
            field("$[___]", 0, Some("$1,500")),
            field("$[___]", 1, Some("$2,000")),
        ];

        assert_eq!(
            render_completed(text, &fields),
            "Rent: $1,500 Deposit: $2,000"
        );
    }

    #[test]
    fn test_render_completed_partial_duplicates() {
        // First blank filled, second still pending: the pending one keeps
        // its placeholder text at the right position
        let text = "Rent: $[___] Deposit: $[___]";
        let fields = vec![
            field("$[___]", 0, Some("$1,500")),
            field("$[___]", 1, None),
        ];

        assert_eq!(
            render_completed(text, &fields),
            "Rent: $1,500 Deposit: $[___]"
        );
    }

    #[test]
    fn test_render_preview_duplicate_mixed_status() {
        let text = "Rent: $[___] Deposit: $[___]";
        let fields = vec![
            field("$[___]", 0, Some("$1,500")),
            field("$[___]", 1, None),
        ];

        let html = render_preview(text, &fields);
        assert!(html.contains(">$1,500</span>"));
        // The pending blank is wrapped, not dropped
        assert!(html.contains("pending-field"));
        assert!(html.contains(">$[___]</span>"));
    }

    #[test]
    fn test_render_preview_spans() {
        let text = "Between [A] and [B].";
        let fields = vec![
            field("[A]", 0, Some("Acme Corp")),
            field("[B]", 0, None),
        ];

        let html = render_preview(text, &fields);
        assert!(html.starts_with("<pre"));
        assert!(html.contains("filled-field"));
        assert!(html.contains(">Acme Corp</span>"));
        assert!(html.contains("pending-field"));
        assert!(html.contains(">[B]</span>"));
    }
}
