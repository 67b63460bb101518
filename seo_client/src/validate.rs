use crate::error::ValidationError;
use crate::AnalysisRequest;

/// Checks form input before anything is sent to the backend.
///
/// The scheme check runs on the raw input, so leading whitespace is rejected
/// rather than silently trimmed.
pub fn validate_url(input: &str) -> Result<AnalysisRequest, ValidationError> {
    if input.trim().is_empty() {
        return Err(ValidationError::Empty);
    }

    if !input.starts_with("http://") && !input.starts_with("https://") {
        return Err(ValidationError::MissingScheme);
    }

    Ok(AnalysisRequest { url: input.to_string() })
}
