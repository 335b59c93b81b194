//! Lookup failure classification.

use crate::domain::DomainError;
use crate::ups::UpsError;
use crate::vinoshipper::VinoshipperError;

/// Terminal failure of a lookup, classified for the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// Required request fields are absent
    #[error("Missing required fields")]
    Validation { missing_fields: Vec<&'static str> },

    /// Request is present but unusable
    #[error("{0}")]
    InvalidInput(String),

    /// Credentials missing, misconfigured or rejected
    #[error("{message}")]
    AuthUnavailable { message: String },

    /// Upstream answered with a client-style error
    #[error("{message}")]
    UpstreamRejected { status: u16, message: String },

    /// Anything else; the detail is for logs only
    #[error("Internal server error")]
    Internal(String),
}

impl LookupError {
    /// HTTP status this failure is reported with.
    pub fn status_code(&self) -> u16 {
        match self {
            LookupError::Validation { .. } | LookupError::InvalidInput(_) => 400,
            LookupError::AuthUnavailable { .. } => 503,
            LookupError::UpstreamRejected { status, .. } => *status,
            LookupError::Internal(_) => 500,
        }
    }

    pub(crate) fn ups_unavailable() -> Self {
        LookupError::AuthUnavailable {
            message: "UPS service temporarily unavailable".to_string(),
        }
    }

    pub(crate) fn vinoshipper_unavailable() -> Self {
        LookupError::AuthUnavailable {
            message: "Vinoshipper service temporarily unavailable".to_string(),
        }
    }

    /// Classify a locator search failure.
    ///
    /// Client-style statuses keep their code, except 401/403 which mean the
    /// token was refused. Server errors and unreadable bodies are internal.
    pub fn from_search(err: UpsError) -> Self {
        match err {
            UpsError::Api {
                status: 401 | 403, ..
            }
            | UpsError::Auth { .. }
            | UpsError::MissingCredentials => Self::ups_unavailable(),
            UpsError::Api { status, message } if (400..500).contains(&status) => {
                LookupError::UpstreamRejected {
                    status,
                    message: format!("UPS API Error: {message}"),
                }
            }
            other => LookupError::Internal(other.to_string()),
        }
    }

    /// Classify an access-point search failure.
    pub fn from_access_points(err: VinoshipperError) -> Self {
        match err {
            VinoshipperError::Unauthorized | VinoshipperError::NotConfigured(_) => {
                Self::vinoshipper_unavailable()
            }
            VinoshipperError::Api { status: 400, .. } => LookupError::UpstreamRejected {
                status: 400,
                message: "Vinoshipper API Error: Invalid address data provided to Vinoshipper"
                    .to_string(),
            },
            VinoshipperError::Api { status, .. } if status >= 500 => {
                Self::vinoshipper_unavailable()
            }
            VinoshipperError::Api { status, message, .. } => LookupError::UpstreamRejected {
                status: 400,
                message: format!("Vinoshipper API Error: {status} {message}"),
            },
            other => LookupError::Internal(other.to_string()),
        }
    }
}

impl From<DomainError> for LookupError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::MissingFields(missing_fields) => LookupError::Validation { missing_fields },
            other => LookupError::InvalidInput(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_failures() {
        let err = LookupError::from_search(UpsError::Api {
            status: 400,
            message: "Invalid postal code".into(),
        });
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "UPS API Error: Invalid postal code");

        let err = LookupError::from_search(UpsError::Api {
            status: 422,
            message: "x".into(),
        });
        assert_eq!(err.status_code(), 422);

        let err = LookupError::from_search(UpsError::Api {
            status: 401,
            message: "expired".into(),
        });
        assert_eq!(err.status_code(), 503);

        let err = LookupError::from_search(UpsError::Api {
            status: 502,
            message: "bad gateway".into(),
        });
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.to_string(), "Internal server error");

        let err = LookupError::from_search(UpsError::Json {
            message: "eof".into(),
            body: None,
        });
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn access_point_failures() {
        let api = |status| VinoshipperError::Api {
            status,
            message: String::new(),
            body: None,
        };

        assert_eq!(
            LookupError::from_access_points(VinoshipperError::Unauthorized).status_code(),
            503
        );
        assert_eq!(LookupError::from_access_points(api(400)).status_code(), 400);
        assert_eq!(LookupError::from_access_points(api(503)).status_code(), 503);
        assert_eq!(LookupError::from_access_points(api(404)).status_code(), 400);
    }

    #[test]
    fn domain_errors() {
        let err: LookupError = DomainError::MissingFields(vec!["postalCode"]).into();
        assert_eq!(
            err,
            LookupError::Validation {
                missing_fields: vec!["postalCode"]
            }
        );
        assert_eq!(err.status_code(), 400);

        let err: LookupError = DomainError::NotAnObject.into();
        assert_eq!(err.status_code(), 400);
    }
}
