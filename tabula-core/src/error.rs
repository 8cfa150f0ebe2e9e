use crate::response::Status;
use thiserror::Error;

/// Engine error taxonomy.
///
/// Validation variants are client-attributable and classify as
/// [`Status::BadRequest`]; execution variants are server-attributable and
/// classify as [`Status::InternalError`]. Execution variants carry fixed
/// messages: the underlying driver error is logged where it occurs and never
/// echoed to the caller.
#[derive(Error, Debug)]
pub enum Error {
    #[error("page {0} out of range: must be at least 1")]
    PageOutOfRange(i64),

    #[error("perPage {0} out of range: expected 10..=100")]
    PerPageOutOfRange(i64),

    #[error("unknown filter field: {0}")]
    UnknownFilterField(String),

    #[error("unknown sort field: {0}")]
    UnknownSortField(String),

    #[error("unknown projected field: {0}")]
    UnknownProjectedField(String),

    #[error("{requested} fields projected but the table only has {available}")]
    ProjectionTooWide { requested: usize, available: usize },

    #[error("malformed filter value: {0}")]
    MalformedFilterValue(String),

    #[error("invalid filter operation: {0}")]
    InvalidOperation(String),

    #[error("schema introspection failed: does the table exist?")]
    Introspection,

    #[error("count query failed")]
    CountQuery,

    #[error("data query failed")]
    DataQuery,

    #[error("row scan failed")]
    RowScan,

    #[error("cursor close failed")]
    CursorClose,

    /// Raw failure surfaced by a backend implementation. Callers of the engine
    /// never see this variant; the engine logs it and substitutes the
    /// classified stage error.
    #[error("backend error: {0}")]
    Backend(String),
}

impl Error {
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::PageOutOfRange(_)
                | Error::PerPageOutOfRange(_)
                | Error::UnknownFilterField(_)
                | Error::UnknownSortField(_)
                | Error::UnknownProjectedField(_)
                | Error::ProjectionTooWide { .. }
                | Error::MalformedFilterValue(_)
                | Error::InvalidOperation(_)
        )
    }

    pub fn status(&self) -> Status {
        if self.is_validation() {
            Status::BadRequest
        } else {
            Status::InternalError
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        assert_eq!(Error::PageOutOfRange(0).status(), Status::BadRequest);
        assert_eq!(
            Error::UnknownSortField("x".into()).status(),
            Status::BadRequest
        );
        assert_eq!(
            Error::ProjectionTooWide {
                requested: 5,
                available: 3
            }
            .status(),
            Status::BadRequest
        );
    }

    #[test]
    fn test_execution_classification() {
        assert_eq!(Error::Introspection.status(), Status::InternalError);
        assert_eq!(Error::CountQuery.status(), Status::InternalError);
        assert_eq!(Error::RowScan.status(), Status::InternalError);
        assert_eq!(Error::Backend("boom".into()).status(), Status::InternalError);
    }

    #[test]
    fn test_messages_name_offending_field() {
        let err = Error::UnknownFilterField("owner".into());
        assert!(err.to_string().contains("owner"));
        let err = Error::UnknownProjectedField("blob".into());
        assert!(err.to_string().contains("blob"));
    }
}
