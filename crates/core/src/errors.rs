use thiserror::Error;

use crate::domain::product::ProductId;

/// Failure reported by a catalog client. The store never interprets these
/// beyond success/failure; the display text is what reaches the user.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("product {0} was not found")]
    NotFound(ProductId),
}

impl RemoteError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Transport(_) => "remote_transport",
            Self::Status { .. } => "remote_status",
            Self::Decode(_) => "remote_decode",
            Self::NotFound(_) => "remote_not_found",
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::product::ProductId;
    use crate::errors::RemoteError;

    #[test]
    fn status_errors_carry_code_and_body_in_message() {
        let error = RemoteError::Status { status: 503, body: "maintenance".to_owned() };

        assert_eq!(error.to_string(), "server responded with status 503: maintenance");
        assert_eq!(error.error_class(), "remote_status");
    }

    #[test]
    fn not_found_names_the_product() {
        let error = RemoteError::NotFound(ProductId::Numeric(9));

        assert_eq!(error.to_string(), "product 9 was not found");
        assert_eq!(error.error_class(), "remote_not_found");
    }

    #[test]
    fn transport_errors_keep_the_underlying_cause() {
        let error = RemoteError::Transport("connection refused".to_owned());

        assert_eq!(error.to_string(), "request failed: connection refused");
        assert_eq!(error.error_class(), "remote_transport");
    }
}
