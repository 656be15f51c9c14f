use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use derive_more::{Display, Error};

pub type Response = Result<HttpResponse, ControllerError>;

#[derive(Debug, Display, Error)]
pub enum ControllerError {
    #[display("Not found")]
    NotFound,
    #[error(ignore)]
    #[display("{_0}")]
    InternalServerError(anyhow::Error),
    #[error(ignore)]
    #[display("Invalid field {field}: {msg}")]
    InvalidInput { field: String, msg: String },
}

impl ControllerError {
    fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::InternalServerError(_) => "internal",
            Self::InvalidInput { .. } => "invalid_input",
        }
    }
}

impl From<anyhow::Error> for ControllerError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalServerError(err)
    }
}

impl From<actix::MailboxError> for ControllerError {
    fn from(err: actix::MailboxError) -> Self {
        Self::InternalServerError(err.into())
    }
}

impl actix_web::error::ResponseError for ControllerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            Self::InternalServerError(err) => log::error!("{err:?}"),
            err => log::warn!("{err:?}"),
        }
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.kind(),
            "message": self.to_string(),
        }))
    }
}

pub async fn not_found() -> Response {
    Err(ControllerError::NotFound)
}
