use salvo::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Collection '{0}' already exists.")]
    CollectionExists(String),

    #[error("No documents were inserted.")]
    NothingInserted,

    /// Failure reported by SQL Server or the TDS client. `context` names the
    /// statement or step that failed; the display is the driver's raw text.
    #[error("{source}")]
    SqlServer {
        context: String,
        #[source]
        source: tiberius::error::Error,
    },

    #[error("{0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl AppError {
    pub fn sql(context: impl Into<String>, source: tiberius::error::Error) -> Self {
        AppError::SqlServer {
            context: context.into(),
            source,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::BadRequest(_)
            | AppError::CollectionExists(_)
            | AppError::NothingInserted => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable tag rendered next to the message.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::BadRequest(_) => "bad_request",
            AppError::CollectionExists(_) => "collection_exists",
            AppError::NothingInserted => "nothing_inserted",
            AppError::SqlServer { .. } => "sqlserver",
            AppError::Mongo(_) => "mongodb",
            AppError::IoError(_) | AppError::InternalServerError(_) => "internal",
        }
    }
}

impl From<salvo::http::ParseError> for AppError {
    fn from(err: salvo::http::ParseError) -> Self {
        AppError::BadRequest(format!("Invalid request payload: {}", err))
    }
}

#[async_trait]
impl Writer for AppError {
    async fn write(self, _req: &mut Request, _depot: &mut Depot, res: &mut Response) {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), "{}", self);
        } else {
            tracing::warn!(kind = self.kind(), "{}", self);
        }
        res.status_code(status);
        res.render(Json(serde_json::json!({
            "error": self.to_string(),
            "kind": self.kind(),
        })));
    }
}
