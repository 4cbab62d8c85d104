//! Model operations over the sea-orm entities.

pub mod messages;
pub mod users;

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("password must not be empty")]
    InvalidPassword,
    #[error("message text must be 1 to {max} characters")]
    InvalidMessage { max: usize },
    #[error("integrity error: {0}")]
    Integrity(String),
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("database error: {0}")]
    Db(DbErr),
}

impl StoreError {
    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::Integrity(_))
    }
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg))
            | Some(SqlErr::ForeignKeyConstraintViolation(msg)) => Self::Integrity(msg),
            _ => {
                let msg = err.to_string();
                if msg.contains("UNIQUE") || msg.contains("duplicate key") || msg.contains("NOT NULL") {
                    Self::Integrity(msg)
                } else {
                    Self::Db(err)
                }
            }
        }
    }
}
