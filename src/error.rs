use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("network error: {0}")]
    Transport(String),

    #[error("API error {status}: {message}")]
    Protocol { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl QuoteError {
    /// Short cause shown under the panel's error message.
    pub fn short_cause(&self) -> String {
        match self {
            QuoteError::Transport(_) => "network unavailable".to_string(),
            QuoteError::Protocol { status, message } => match *status {
                401 | 403 => "not authorized".to_string(),
                404 => "post not found".to_string(),
                // 200 with an errors array: the API's own explanation
                200 => message.clone(),
                429 => "rate limited, try again later".to_string(),
                s if s >= 500 => "service unavailable".to_string(),
                _ => self.to_string(),
            },
            QuoteError::Malformed(_) => "unexpected response".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for QuoteError {
    fn from(err: reqwest::Error) -> Self {
        QuoteError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for QuoteError {
    fn from(err: serde_json::Error) -> Self {
        QuoteError::Malformed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QuoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_status_maps_to_short_cause() {
        let err = QuoteError::Protocol {
            status: 429,
            message: "Too Many Requests".into(),
        };
        assert_eq!(err.short_cause(), "rate limited, try again later");

        let err = QuoteError::Protocol {
            status: 503,
            message: "down".into(),
        };
        assert_eq!(err.short_cause(), "service unavailable");
    }

    #[test]
    fn errors_in_ok_response_show_api_message() {
        let err = QuoteError::Protocol {
            status: 200,
            message: "Could not find tweet with id: [1].".into(),
        };
        assert_eq!(err.short_cause(), "Could not find tweet with id: [1].");
    }

    #[test]
    fn unknown_protocol_status_uses_display() {
        let err = QuoteError::Protocol {
            status: 400,
            message: "bad field".into(),
        };
        assert_eq!(err.short_cause(), "API error 400: bad field");
    }

    #[test]
    fn json_errors_are_malformed() {
        let err: QuoteError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, QuoteError::Malformed(_)));
    }
}
