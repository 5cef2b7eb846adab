use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Typed outcomes of the admission/workflow engine. The boundary layer
/// turns these into HTTP responses; the engine itself never produces
/// presentation text.
#[derive(Debug, Display)]
pub enum CoreError {
    #[display(fmt = "{}", _0)]
    Validation(String),
    #[display(fmt = "invalid transition: {}", _0)]
    InvalidTransition(&'static str),
    #[display(fmt = "outside every allowed zone")]
    OutOfRange,
    #[display(fmt = "no admin matches this admin code")]
    NoTenantAdmin,
    #[display(fmt = "vacation request already decided")]
    AlreadyDecided,
    #[display(fmt = "{} not found", _0)]
    NotFound(&'static str),
    #[display(fmt = "{}", _0)]
    Forbidden(&'static str),
    #[display(fmt = "{}", _0)]
    Conflict(&'static str),
    #[display(fmt = "storage error")]
    Storage(sqlx::Error),
}

impl From<sqlx::Error> for CoreError {
    fn from(e: sqlx::Error) -> Self {
        CoreError::Storage(e)
    }
}

impl ResponseError for CoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            CoreError::Validation(_) | CoreError::InvalidTransition(_) => StatusCode::BAD_REQUEST,
            CoreError::OutOfRange | CoreError::NoTenantAdmin => StatusCode::UNPROCESSABLE_ENTITY,
            CoreError::AlreadyDecided | CoreError::Conflict(_) => StatusCode::CONFLICT,
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
            CoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let CoreError::Storage(e) = self {
            tracing::error!(error = %e, "storage failure");
            return HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            }));
        }

        HttpResponse::build(self.status_code()).json(json!({
            "message": self.to_string()
        }))
    }
}
