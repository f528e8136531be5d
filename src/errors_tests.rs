//! Unit tests for error handling
//!
//! Tests error types, conversions, and error message formatting.

#[cfg(test)]
mod tests {
    use std::io;

    use crate::errors::HealthRagError;
    use crate::errors::Result;

    // ====== Error Type Tests ======

    #[test]
    fn test_invalid_input_error() {
        let error = HealthRagError::InvalidInput("question must not be empty".to_string());
        assert!(error.is_client_error());
        assert_eq!(
            error.to_string(),
            "Invalid input: question must not be empty"
        );
    }

    #[test]
    fn test_store_error_display() {
        let error = HealthRagError::store("memory", "dimension mismatch");
        assert!(matches!(error, HealthRagError::StoreError { .. }));
        assert_eq!(
            error.to_string(),
            "Vector store error (memory): dimension mismatch"
        );
        assert!(!error.is_client_error());
    }

    #[test]
    fn test_sanitized_errors_hide_details() {
        let query = HealthRagError::RetrievalFailed.to_string();
        let ingest = HealthRagError::IngestFailed.to_string();

        assert_eq!(query, "Query processing failed. Please try again.");
        assert_eq!(ingest, "Failed to add document. Please try again.");
        assert!(!HealthRagError::RetrievalFailed.is_client_error());
    }

    // ====== Error Conversion Tests ======

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let err: HealthRagError = io_err.into();

        assert!(matches!(err, HealthRagError::Io(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let parse_result: std::result::Result<serde_json::Value, _> =
            serde_json::from_str("{invalid json}");

        if let Err(json_err) = parse_result {
            let err: HealthRagError = json_err.into();
            assert!(matches!(err, HealthRagError::Serialization(_)));
        }
    }

    #[test]
    fn test_error_from_toml() {
        let parse_result: std::result::Result<toml::Value, _> = toml::from_str("key = ");
        let err: HealthRagError = parse_result.unwrap_err().into();
        assert!(matches!(err, HealthRagError::TomlParsing(_)));
    }

    #[test]
    fn test_result_question_mark() {
        fn parse(input: &str) -> Result<serde_json::Value> {
            Ok(serde_json::from_str(input)?)
        }

        assert!(parse("{\"ok\": true}").is_ok());
        assert!(parse("nope").is_err());
    }
}
