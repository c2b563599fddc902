use thiserror::Error;

/// Errors surfaced to the user when a command fails.
///
/// Validation errors are raised before any request is sent. Lookup errors
/// carry enough context to name the identifier the user typed. Api errors
/// carry the message from the OData error envelope when Graph provides one.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    Validation(String),

    #[error("No {label} with {property} '{value}' found")]
    NotFound {
        label: String,
        property: String,
        value: String,
    },

    #[error("{message} Found: {}.", .ids.join(", "))]
    MultipleResults { message: String, ids: Vec<String> },

    #[error("Microsoft Graph request failed (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] inquire::InquireError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiple_results_message_lists_all_ids() {
        let error = CommandError::MultipleResults {
            message: "Multiple Microsoft Entra application registrations with name 'myapp' found."
                .to_string(),
            ids: vec!["A".to_string(), "B".to_string()],
        };

        assert_eq!(
            error.to_string(),
            "Multiple Microsoft Entra application registrations with name 'myapp' found. Found: A, B."
        );
    }

    #[test]
    fn test_not_found_names_the_identifier() {
        let error = CommandError::NotFound {
            label: "Microsoft Entra application registration".to_string(),
            property: "name".to_string(),
            value: "myapp".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "No Microsoft Entra application registration with name 'myapp' found"
        );
    }

    #[test]
    fn test_validation_message_passes_through() {
        let error = CommandError::Validation("Specify either id or name, but not both".to_string());
        assert_eq!(
            error.to_string(),
            "Specify either id or name, but not both"
        );
    }
}
