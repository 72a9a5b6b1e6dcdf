use axum::{ http::StatusCode, response::{ IntoResponse, Response }, Json };
use log::error;
use std::error::Error as StdError;
use thiserror::Error;

use crate::llm::GenerationError;
use crate::models::chat::ErrorBody;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Method not allowed")]
    UnsupportedMethod,
    #[error("Messages array is required")]
    InvalidInput,
    #[error("Failed to generate response")]
    Upstream(#[from] GenerationError),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::UnsupportedMethod => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::InvalidInput => StatusCode::BAD_REQUEST,
            RelayError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        if let RelayError::Upstream(ref source) = self {
            error!("Chat API Error: {}", error_chain(source));
        }
        // Display never includes the upstream source.
        let body = ErrorBody { error: self.to_string() };
        (self.status(), Json(body)).into_response()
    }
}

/// Renders an error followed by every `source()` beneath it.
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut current = err.source();
    while let Some(cause) = current {
        rendered.push_str(": caused by: ");
        rendered.push_str(&cause.to_string());
        current = cause.source();
    }
    rendered
}
