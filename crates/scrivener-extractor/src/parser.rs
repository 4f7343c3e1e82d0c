//! Parse LLM output into field descriptors

use crate::error::ExtractError;
use crate::types::ExtractedField;
use scrivener_domain::FieldType;
use serde_json::Value;
use tracing::warn;

/// Parse the LLM JSON response into field descriptors
///
/// Entries that are missing required parts are skipped with a warning
/// rather than failing the whole response.
pub fn parse_llm_response(response: &str) -> Result<Vec<ExtractedField>, ExtractError> {
    // LLMs sometimes wrap JSON in markdown code blocks
    let json_str = extract_json(response)?;

    let json: Value = serde_json::from_str(&json_str)
        .map_err(|e| ExtractError::InvalidFormat(format!("JSON parse error: {}", e)))?;

    let entries = json
        .as_array()
        .ok_or_else(|| ExtractError::InvalidFormat("Expected JSON array".to_string()))?;

    let mut fields = Vec::new();
    for (idx, entry) in entries.iter().enumerate() {
        match parse_field_json(entry, idx) {
            Ok(field) => fields.push(field),
            Err(e) => {
                warn!("Skipping placeholder entry {}: {}", idx, e);
            }
        }
    }

    Ok(fields)
}

/// Extract JSON from a response, handling markdown code blocks
fn extract_json(response: &str) -> Result<String, ExtractError> {
    let trimmed = response.trim();

    if trimmed.starts_with("```json") || trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(ExtractError::InvalidFormat("Empty code block".to_string()));
        }

        // Skip first line (```json or ```) and last line (```)
        let json_lines = &lines[1..lines.len().saturating_sub(1)];
        Ok(json_lines.join("\n"))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Parse a single field descriptor from JSON
fn parse_field_json(json: &Value, idx: usize) -> Result<ExtractedField, String> {
    let obj = json
        .as_object()
        .ok_or_else(|| "Entry is not a JSON object".to_string())?;

    let name = obj
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| "Missing or invalid 'name'".to_string())?
        .trim()
        .to_string();

    let placeholder = obj
        .get("placeholder")
        .and_then(|v| v.as_str())
        .ok_or_else(|| "Missing or invalid 'placeholder'".to_string())?
        .to_string();

    if name.is_empty() {
        return Err("'name' is empty".to_string());
    }
    if placeholder.is_empty() {
        return Err("'placeholder' is empty".to_string());
    }

    // Type defaults to text; order falls back to position
    let field_type = obj
        .get("type")
        .and_then(|v| v.as_str())
        .map(FieldType::parse)
        .unwrap_or(FieldType::Text);

    let fill_order = obj
        .get("order")
        .and_then(|v| v.as_i64())
        .unwrap_or(idx as i64 + 1);

    Ok(ExtractedField {
        name,
        placeholder,
        field_type,
        fill_order,
    })
}
