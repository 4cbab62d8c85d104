use actix_web::{http::header, http::StatusCode, HttpResponse, ResponseError};
use log::error;
use sea_orm::DbErr;
use thiserror::Error;

use crate::store::StoreError;
use crate::views;

#[derive(Debug, Error)]
pub enum AppError {
    /// No session user, or the session user may not touch the resource.
    /// The flash is queued by whoever raises it; the response only redirects.
    #[error("access unauthorized")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("database error: {0}")]
    Db(#[from] DbErr),
    #[error("{0}")]
    Store(#[from] StoreError),
    #[error("system_exception")]
    System,
}

impl AppError {
    pub fn system_exception() -> Self {
        Self::System
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::FOUND,
            Self::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            Self::Unauthorized => HttpResponse::Found()
                .insert_header((header::LOCATION, "/"))
                .finish(),
            Self::NotFound => HttpResponse::NotFound()
                .content_type(views::HTML)
                .body(views::not_found_page()),
            other => {
                error!("request failed: {}", other);
                HttpResponse::InternalServerError()
                    .content_type(views::HTML)
                    .body(views::error_page())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_redirects_home() {
        let resp = AppError::Unauthorized.error_response();
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
    }

    #[test]
    fn store_failures_are_server_errors() {
        let err = AppError::from(StoreError::InvalidPassword);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
    }
}
