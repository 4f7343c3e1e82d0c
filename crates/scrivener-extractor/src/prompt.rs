//! LLM prompt engineering for placeholder discovery

/// Build the structured-output extraction prompt for a document body
pub fn build_extraction_prompt(document_text: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(EXTRACTION_INSTRUCTIONS);
    prompt.push_str("\n\nDocument:\n---\n");
    prompt.push_str(document_text);
    prompt.push_str("\n---\n\n");
    prompt.push_str(OUTPUT_FORMAT_REMINDER);

    prompt
}

const EXTRACTION_INSTRUCTIONS: &str = r#"You are an expert legal document analyzer. Analyze the following document and identify ALL placeholders that need to be filled in.

Instructions:
1. Find all placeholders (usually in brackets like [PLACEHOLDER], {PLACEHOLDER}, or <PLACEHOLDER>)
2. For each placeholder, determine:
   - A clear, user-friendly name (e.g., "Start Date" for [START_DATE])
   - The exact placeholder text as it appears in the document
   - The field type (text, date, number, email, phone, address, name, currency, percentage, company)
   - A logical order for filling (most important/required first)

Rules:
- List every occurrence separately: if the same placeholder text appears twice with different meanings, emit two entries
- Preserve the exact placeholder format from the document, including brackets
- Order fields logically (e.g., names before dates, essential info first)
- Use proper field types (date for dates, email for emails, etc.)"#;

const OUTPUT_FORMAT_REMINDER: &str = r#"Output format (JSON array only, no additional text):
[
  {
    "name": "Field name in plain English",
    "placeholder": "[EXACT_PLACEHOLDER_TEXT]",
    "type": "text|date|number|email|phone|address|name|currency|percentage|company",
    "order": 1
  }
]

Remember: Return ONLY valid JSON, no markdown code blocks, no explanations."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_document() {
        let prompt = build_extraction_prompt("Agreement between [COMPANY] and [EMPLOYEE]");
        assert!(prompt.contains("Agreement between [COMPANY] and [EMPLOYEE]"));
    }

    #[test]
    fn test_prompt_includes_instructions() {
        let prompt = build_extraction_prompt("text");
        assert!(prompt.contains("identify ALL placeholders"));
        assert!(prompt.contains("exact placeholder text"));
        assert!(prompt.contains("JSON array only"));
    }

    #[test]
    fn test_prompt_requests_duplicate_entries() {
        let prompt = build_extraction_prompt("text");
        assert!(prompt.contains("List every occurrence separately"));
    }
}
