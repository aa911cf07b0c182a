use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use storefront_engine::{
    payments::PaymentError,
    traits::{CatalogError, PaymentLedgerError},
    vault::VaultError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Unauthorized. {0}")]
    Unauthorized(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("The requested file is unavailable. {0}")]
    AssetUnavailable(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::AssetUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<PaymentLedgerError> for ServerError {
    fn from(e: PaymentLedgerError) -> Self {
        match e {
            PaymentLedgerError::ValidationError(field) => {
                Self::InvalidRequestBody(format!("The {field} field is required"))
            },
            PaymentLedgerError::EmptyCart => Self::InvalidRequestBody("The cart is empty".to_string()),
            PaymentLedgerError::UnknownOrder(_) => Self::NoRecordFound("No order matches that reference".to_string()),
            PaymentLedgerError::OrderNotFound(id) => Self::NoRecordFound(format!("No order {id}")),
            PaymentLedgerError::TransitionForbidden { .. } => Self::InvalidRequestBody(e.to_string()),
            PaymentLedgerError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<CatalogError> for ServerError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::ProductNotFound(id) => Self::NoRecordFound(format!("No product '{id}'")),
            CatalogError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<VaultError> for ServerError {
    fn from(e: VaultError) -> Self {
        match e {
            VaultError::NotFound(h) => Self::NoRecordFound(format!("No stored file for handle '{h}'")),
            VaultError::InvalidKey => Self::ConfigurationError(e.to_string()),
            VaultError::Decryption | VaultError::Io(_) => Self::AssetUnavailable(e.to_string()),
        }
    }
}

impl From<PaymentError> for ServerError {
    fn from(e: PaymentError) -> Self {
        match e {
            PaymentError::SignatureInvalid => Self::Unauthorized(e.to_string()),
            PaymentError::MalformedPayload(m) => Self::InvalidRequestBody(m),
            PaymentError::BeginFailed(m) => Self::BackendError(m),
        }
    }
}
