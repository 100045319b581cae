use spin_sdk::http::Response;

#[derive(Debug, thiserror::Error)]
pub enum SocialError {
    #[error("Post not found")]
    NotFound,
    #[error("Forbidden")]
    Forbidden,
    #[error("Username already exists.")]
    DuplicateUsername,
    #[error("Incorrect username or password.")]
    InvalidCredentials,
    #[error("Not signed in")]
    Unauthorized,
    #[error("{0}")]
    Validation(String),
    #[error("Brainrot detected! You shall be reduced to atoms!")]
    ContentRejected,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl SocialError {
    pub fn validation(msg: impl Into<String>) -> Self {
        SocialError::Validation(msg.into())
    }

    pub fn status(&self) -> u16 {
        match self {
            SocialError::NotFound => 404,
            SocialError::Forbidden => 403,
            SocialError::DuplicateUsername => 409,
            SocialError::InvalidCredentials | SocialError::Unauthorized => 401,
            SocialError::Validation(_) => 400,
            SocialError::ContentRejected => 422,
            SocialError::Storage(_) => 500,
        }
    }
}

impl From<SocialError> for Response {
    fn from(err: SocialError) -> Self {
        let message = match &err {
            // Storage details stay in the log
            SocialError::Storage(e) => {
                tracing::error!(error = %e, "storage failure");
                "Internal error".to_string()
            }
            other => other.to_string(),
        };
        Response::builder()
            .status(err.status())
            .header("Content-Type", "application/json")
            .body(serde_json::json!({ "error": message }).to_string().into_bytes())
            .build()
    }
}
