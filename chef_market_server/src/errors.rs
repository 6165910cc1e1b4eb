use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use chef_market_engine::{DisputeError, OrderFlowError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Actor headers are missing. The upstream authentication proxy must supply them.")]
    Unauthenticated,
    #[error("Could not read actor headers: {0}")]
    CouldNotDeserializeActor(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("{0}")]
    OrderFlow(#[from] OrderFlowError),
    #[error("{0}")]
    Dispute(#[from] DisputeError),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::CouldNotDeserializeActor(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::OrderFlow(e) => match e {
                OrderFlowError::ValidationError { .. }
                | OrderFlowError::ScheduleConflict
                | OrderFlowError::TerminalState { .. }
                | OrderFlowError::NotRateable { .. }
                | OrderFlowError::OrderAlreadyExists(_) => StatusCode::BAD_REQUEST,
                OrderFlowError::OrderNotFound(_) | OrderFlowError::OrderIdNotFound(_) => StatusCode::NOT_FOUND,
                OrderFlowError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Dispute(e) => match e {
                DisputeError::NotOrderClient(_) => StatusCode::FORBIDDEN,
                DisputeError::DisputeNotFound(_) | DisputeError::OrderNotFound(_) => StatusCode::NOT_FOUND,
                DisputeError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            // Validation failures carry the offending field so clients can surface field-level errors.
            Self::OrderFlow(OrderFlowError::ValidationError { field, message }) => {
                serde_json::json!({ "error": message, "field": field })
            },
            _ => serde_json::json!({ "error": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).insert_header(ContentType::json()).body(body.to_string())
    }
}
