use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Input that can never be committed, whatever the stored state is.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0}")]
    InvalidTimeOrder(&'static str),

    #[error("無効な時刻形式です: {0}")]
    InvalidTimeFormat(String),

    #[error("無効な日付形式です: {0}")]
    InvalidDateFormat(String),

    #[error("{0}")]
    MissingRequiredField(&'static str),

    /// clock_out / break events issued before the event they depend on
    #[error("{0}")]
    MissingPrecedingEvent(&'static str),

    #[error("無効なアクションです: {0}")]
    InvalidAction(String),

    #[error("無効な承認ステータスです: {0}")]
    InvalidDecision(String),

    #[error("申請日付と勤怠記録の日付が一致しません")]
    RecordDateMismatch,
}

/// The request is well formed but collides with what is already stored.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConflictError {
    #[error("既に出勤記録があります")]
    DuplicateClockIn,

    #[error("既に退勤記録があります")]
    DuplicateClockOut,

    #[error("{0}")]
    DuplicateBreakEvent(&'static str),

    #[error("同じ日付で未処理の修正申請が既に存在します")]
    DuplicatePendingRequest,

    #[error("既に処理済みの申請です")]
    AlreadyDecided,

    #[error("指定日の勤怠記録は既に存在します")]
    RecordAlreadyExists,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotFoundError {
    #[error("対象ユーザーが見つかりません")]
    UserNotFound,

    #[error("勤怠記録が見つかりません")]
    RecordNotFound,

    #[error("修正申請が見つかりません")]
    RequestNotFound,
}

/// Raised by the auth layer before any attendance logic runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthorizationError {
    #[error("管理者権限が必要です")]
    NotAdmin,

    #[error("{0}")]
    Unauthenticated(&'static str),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

pub type AppResult<T> = Result<T, AppError>;

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Authorization(AuthorizationError::NotAdmin) => StatusCode::FORBIDDEN,
            AppError::Authorization(AuthorizationError::Unauthenticated(_)) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Storage(e) => {
                tracing::error!(error = %e, "Storage failure");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}
