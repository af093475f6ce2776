use filehash::RegistryError;
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("No entry for hash {0}")]
    EntryNotFound(String),
    #[error("Upload exceeds the {0} limit")]
    PayloadTooLarge(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::Registry(RegistryError::InvalidName(_)) => Status::BadRequest,
            ApiError::Registry(RegistryError::NotFound(_)) => Status::NotFound,
            ApiError::Registry(RegistryError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                Status::NotFound
            }
            ApiError::Registry(RegistryError::DigestMismatch { .. }) => Status::Conflict,
            ApiError::Registry(_) => Status::InternalServerError,
            ApiError::EntryNotFound(_) => Status::NotFound,
            ApiError::PayloadTooLarge(_) => Status::PayloadTooLarge,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Registry(RegistryError::InvalidName(_)) => "INVALID_NAME",
            ApiError::Registry(RegistryError::NotFound(_)) => "FILE_NOT_FOUND",
            ApiError::Registry(RegistryError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                "FILE_NOT_FOUND"
            }
            ApiError::Registry(RegistryError::Io(_)) => "IO_ERROR",
            ApiError::Registry(RegistryError::SizeMismatch { .. }) => "SIZE_MISMATCH",
            ApiError::Registry(RegistryError::DigestMismatch { .. }) => "DIGEST_MISMATCH",
            ApiError::Registry(RegistryError::Storage(_)) => "STORAGE_ERROR",
            ApiError::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        if status.code >= 500 {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: self.code(),
        });
        (status, body).respond_to(request)
    }
}
