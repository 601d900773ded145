use axum::{
    Json,
    extract::rejection::{BytesRejection, JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use snafu::Snafu;
use std::num::ParseIntError;

pub type RosterResult<T> = Result<T, RosterError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RosterError {
    #[snafu(display("Error opening database"))]
    OpenDatabase { source: sqlx::Error },
    #[snafu(display("Unable to parse database url {:?}", url))]
    ParseDatabaseUrl { source: sqlx::Error, url: String },
    #[snafu(display("Error getting db connection"))]
    GetDatabaseConnection { source: sqlx::Error },
    #[snafu(display("Error making SQL query"))]
    MakeQuery { source: sqlx::Error },
    #[snafu(display("Error creating DB schema"))]
    CreateSchema { source: sqlx::Error },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse env var `{}` from {:?}", name, original))]
    ParseEnvNumber {
        source: ParseIntError,
        name: &'static str,
        original: String,
    },
    #[snafu(display("Unable to find student with ID: {}", id))]
    MissingStudent { id: i64 },
    #[snafu(display("Unable to read request body: {}", source.body_text()))]
    ReadBody { source: BytesRejection },
    #[snafu(display("Invalid request body: {}", source.body_text()))]
    InvalidJson { source: JsonRejection },
    #[snafu(display("Invalid path: {}", source.body_text()))]
    InvalidPath { source: PathRejection },
    #[snafu(display("Invalid query: {}", source.body_text()))]
    InvalidQuery { source: QueryRejection },
}

impl From<BytesRejection> for RosterError {
    fn from(source: BytesRejection) -> Self {
        Self::ReadBody { source }
    }
}

impl From<JsonRejection> for RosterError {
    fn from(source: JsonRejection) -> Self {
        Self::InvalidJson { source }
    }
}

impl From<PathRejection> for RosterError {
    fn from(source: PathRejection) -> Self {
        Self::InvalidPath { source }
    }
}

impl From<QueryRejection> for RosterError {
    fn from(source: QueryRejection) -> Self {
        Self::InvalidQuery { source }
    }
}

/// Body sent back for every failed request.
#[derive(Serialize)]
struct ErrorBody {
    kind: &'static str,
    detail: String,
}

impl RosterError {
    fn kind(&self) -> &'static str {
        match self {
            Self::OpenDatabase { .. }
            | Self::GetDatabaseConnection { .. }
            | Self::MakeQuery { .. }
            | Self::CreateSchema { .. } => "storage_failure",
            Self::ParseDatabaseUrl { .. }
            | Self::BadEnvVar { .. }
            | Self::ParseEnvNumber { .. } => "configuration",
            Self::MissingStudent { .. } => "not_found",
            Self::ReadBody { .. }
            | Self::InvalidJson { .. }
            | Self::InvalidPath { .. }
            | Self::InvalidQuery { .. } => "invalid_input",
        }
    }

    fn status_code(&self) -> StatusCode {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BI: StatusCode = StatusCode::UNPROCESSABLE_ENTITY; //bad input

        match self {
            Self::OpenDatabase { .. } | Self::GetDatabaseConnection { .. } => ISE,
            Self::MakeQuery { .. } | Self::CreateSchema { .. } => ISE,
            Self::ParseDatabaseUrl { .. } | Self::BadEnvVar { .. } => ISE,
            Self::ParseEnvNumber { .. } => ISE,
            Self::MissingStudent { .. } => NF,
            // body never arrived in full, eg. over the size limit
            Self::ReadBody { source } => source.status(),
            Self::InvalidJson { .. } | Self::InvalidPath { .. } | Self::InvalidQuery { .. } => BI,
        }
    }
}

impl IntoResponse for RosterError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            error!(?self, "Error!");
        } else {
            debug!(?self, %status_code, "Rejected request");
        }

        let body = ErrorBody {
            kind: self.kind(),
            detail: self.to_string(),
        };
        (status_code, Json(body)).into_response()
    }
}
