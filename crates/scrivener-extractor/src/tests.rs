//! End-to-end extractor tests with a mock provider

use crate::{ExtractorConfig, ExtractionSource, PlaceholderExtractor};
use scrivener_domain::FieldType;
use scrivener_llm::MockProvider;
use std::sync::Arc;

#[tokio::test]
async fn test_llm_path_preferred() {
    let llm = MockProvider::new(
        r#"[
            {"name": "Company Name", "placeholder": "[COMPANY]", "type": "company", "order": 1},
            {"name": "Employee Name", "placeholder": "[EMPLOYEE]", "type": "name", "order": 2}
        ]"#,
    );
    let extractor = PlaceholderExtractor::new(Arc::new(llm), ExtractorConfig::default());

    let outcome = extractor
        .extract("Agreement between [COMPANY] and [EMPLOYEE].")
        .await
        .unwrap();

    assert_eq!(outcome.source, ExtractionSource::Llm);
    assert_eq!(outcome.fields.len(), 2);
    assert_eq!(outcome.fields[0].name, "Company Name");
    assert_eq!(outcome.fields[0].field_type, FieldType::Company);
}

#[tokio::test]
async fn test_fallback_on_llm_error() {
    let llm = MockProvider::failing();
    let extractor = PlaceholderExtractor::new(Arc::new(llm), ExtractorConfig::default());

    let outcome = extractor
        .extract("Agreement between [COMPANY] and [EMPLOYEE]. Start: [START_DATE].")
        .await
        .unwrap();

    assert_eq!(outcome.source, ExtractionSource::Fallback);
    assert_eq!(outcome.fields.len(), 3);
    assert_eq!(outcome.fields[0].name, "Company");
    assert_eq!(outcome.fields[0].field_type, FieldType::Text);
    assert_eq!(outcome.fields[2].name, "Start Date");
    assert_eq!(outcome.fields[2].field_type, FieldType::Date);
    assert!(outcome.fields.iter().all(|f| f.occurrence_index == 0));
}

#[tokio::test]
async fn test_fallback_on_malformed_response() {
    let llm = MockProvider::new("Sorry, I cannot help with that.");
    let extractor = PlaceholderExtractor::new(Arc::new(llm), ExtractorConfig::default());

    let outcome = extractor.extract("Send to [CONTACT_EMAIL] please").await.unwrap();

    assert_eq!(outcome.source, ExtractionSource::Fallback);
    assert_eq!(outcome.fields.len(), 1);
    assert_eq!(outcome.fields[0].field_type, FieldType::Email);
}

#[tokio::test]
async fn test_fallback_on_empty_llm_result() {
    let llm = MockProvider::new("[]");
    let extractor = PlaceholderExtractor::new(Arc::new(llm), ExtractorConfig::default());

    let outcome = extractor.extract("Call {PHONE_NUMBER} today").await.unwrap();

    assert_eq!(outcome.source, ExtractionSource::Fallback);
    assert_eq!(outcome.fields[0].field_type, FieldType::Phone);
}

#[tokio::test]
async fn test_no_placeholders_anywhere() {
    let llm = MockProvider::new("[]");
    let extractor = PlaceholderExtractor::new(Arc::new(llm), ExtractorConfig::default());

    let result = extractor.extract("Nothing to fill in here.").await;
    assert!(matches!(result, Err(crate::ExtractError::NoPlaceholders)));
}

#[tokio::test]
async fn test_text_too_long() {
    let llm = MockProvider::new("[]");
    let extractor = PlaceholderExtractor::new(Arc::new(llm), ExtractorConfig::default());

    let long_text = "a".repeat(100_000);
    let result = extractor.extract(&long_text).await;
    assert!(matches!(result, Err(crate::ExtractError::TextTooLong(_, _))));
}

#[tokio::test]
async fn test_duplicate_placeholders_get_distinct_indices() {
    let llm = MockProvider::new(
        r#"[
            {"name": "Monthly Rent", "placeholder": "$[_____________]", "type": "currency", "order": 1},
            {"name": "Security Deposit", "placeholder": "$[_____________]", "type": "currency", "order": 2}
        ]"#,
    );
    let extractor = PlaceholderExtractor::new(Arc::new(llm), ExtractorConfig::default());

    let outcome = extractor
        .extract("Rent: $[_____________] Deposit: $[_____________]")
        .await
        .unwrap();

    assert_eq!(outcome.fields[0].occurrence_index, 0);
    assert_eq!(outcome.fields[1].occurrence_index, 1);
}
