// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use hyper::StatusCode;
use juniper::{FieldError, IntoFieldError, ScalarValue, graphql_value};
use thiserror::Error;

use crate::db::models::TicketStatus;

/// Failure classes shared by every operation, independent of wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthenticated,
    NotAuthorized,
    NotFound,
    Conflict,
    CapacityExceeded,
    RegistrationClosed,
    Validation,
    SoldOut,
    Internal,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Unauthenticated => "UNAUTHENTICATED",
            ErrorKind::NotAuthorized => "NOT_AUTHORIZED",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::CapacityExceeded => "CAPACITY_EXCEEDED",
            ErrorKind::RegistrationClosed => "REGISTRATION_CLOSED",
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::SoldOut => "SOLD_OUT",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorKind::NotAuthorized => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict
            | ErrorKind::CapacityExceeded
            | ErrorKind::RegistrationClosed
            | ErrorKind::Validation
            | ErrorKind::SoldOut => StatusCode::BAD_REQUEST,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// User-facing failures. Messages are shown to players as-is.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Anda harus login terlebih dahulu")]
    Unauthenticated,
    #[error("Anda belum memiliki tim")]
    NoTeam,
    #[error("Hanya owner atau captain yang dapat mendaftarkan tim")]
    NotTeamLeader,
    #[error("Hanya owner atau captain yang dapat membatalkan pendaftaran tim")]
    NotTeamLeaderForUnregister,
    #[error("Turnamen tidak ditemukan")]
    TournamentNotFound,
    #[error("Event tidak ditemukan")]
    EventNotFound,
    #[error("Tiket tidak ditemukan")]
    TicketNotFound,
    #[error("Topik tidak ditemukan")]
    TopicNotFound,
    #[error("Anda tidak terdaftar")]
    NotRegistered,
    #[error("Pendaftaran sudah ditutup")]
    RegistrationClosed,
    #[error("Tidak dapat membatalkan pendaftaran setelah acara dimulai")]
    UnregistrationClosed,
    #[error("Anda sudah terdaftar")]
    AlreadyRegistered,
    #[error("Kuota peserta sudah penuh")]
    CapacityExceeded,
    #[error("Tim harus memiliki {required} anggota untuk format {format}")]
    TeamSizeMismatch { required: i64, format: String },
    #[error("Tipe tiket tidak valid")]
    InvalidTicketType,
    #[error("Jumlah tiket tidak valid")]
    InvalidQuantity,
    #[error("Tiket sudah habis")]
    SoldOut,
    #[error("Tiket ini bukan milik Anda")]
    NotTicketOwner,
    #[error("Tiket tidak dapat diubah dari {from:?} ke {to:?}")]
    InvalidTicketTransition { from: TicketStatus, to: TicketStatus },
    #[error("Tidak dapat mentransfer tiket ke diri sendiri")]
    SelfTransfer,
    #[error("Topik ini sudah dikunci")]
    TopicLocked,
    #[error("Balasan tidak boleh kosong")]
    EmptyReply,
    #[error("Permintaan tidak valid: {0}")]
    BadRequest(String),
    #[error("Terjadi kesalahan pada server")]
    Internal,
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Unauthenticated => ErrorKind::Unauthenticated,
            ServiceError::NotTeamLeader
            | ServiceError::NotTeamLeaderForUnregister
            | ServiceError::NotTicketOwner
            | ServiceError::TopicLocked => ErrorKind::NotAuthorized,
            ServiceError::TournamentNotFound
            | ServiceError::EventNotFound
            | ServiceError::TicketNotFound
            | ServiceError::TopicNotFound
            | ServiceError::NotRegistered => ErrorKind::NotFound,
            ServiceError::AlreadyRegistered => ErrorKind::Conflict,
            ServiceError::CapacityExceeded => ErrorKind::CapacityExceeded,
            ServiceError::RegistrationClosed | ServiceError::UnregistrationClosed => {
                ErrorKind::RegistrationClosed
            }
            ServiceError::NoTeam
            | ServiceError::TeamSizeMismatch { .. }
            | ServiceError::InvalidTicketType
            | ServiceError::InvalidQuantity
            | ServiceError::InvalidTicketTransition { .. }
            | ServiceError::SelfTransfer
            | ServiceError::EmptyReply
            | ServiceError::BadRequest(_) => ErrorKind::Validation,
            ServiceError::SoldOut => ErrorKind::SoldOut,
            ServiceError::Internal => ErrorKind::Internal,
        }
    }
}

impl<S: ScalarValue> IntoFieldError<S> for ServiceError {
    fn into_field_error(self) -> FieldError<S> {
        let code = self.kind().code();
        FieldError::new(self.to_string(), graphql_value!({ "code": code }))
    }
}

/// Failures reported by a [`crate::store::Store`].
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("unique constraint violated")]
    Conflict,
    #[error("capacity exhausted")]
    CapacityExceeded,
    #[error("ticket stock exhausted")]
    SoldOut,
    #[error("amount out of range")]
    AmountOverflow,
    #[error("row is not in the expected state")]
    InvalidTransition,
    #[error("row not found")]
    NotFound,
    #[error("store backend error: {0}")]
    Backend(String),
}

impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};
        match err {
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => StoreError::Conflict,
            Error::NotFound => StoreError::NotFound,
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Logs backend failures and hides their text from callers.
pub fn internal(context: &str, err: StoreError) -> ServiceError {
    tracing::error!("{context}: {err}");
    ServiceError::Internal
}
