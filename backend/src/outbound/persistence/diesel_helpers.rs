//! Shared error handling for the Diesel repositories.
//!
//! Every adapter classifies driver errors with [`classify`] and then maps the
//! constraint names it owns onto its port's domain variants. Anything it does
//! not recognise falls back to the port's `Connection` or `Query` variant via
//! [`StoreFailure::into_port`].

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::{debug, warn};

use super::models::RowConversionError;

/// A Diesel error reduced to what the adapters act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoreFailure {
    /// The connection dropped mid-operation.
    Connection(String),
    /// A unique or primary key constraint rejected the write.
    UniqueViolation {
        constraint: Option<String>,
        message: String,
    },
    /// A referenced row does not exist.
    ForeignKeyViolation {
        constraint: Option<String>,
        message: String,
    },
    /// A column check constraint rejected the write.
    CheckViolation {
        constraint: Option<String>,
        message: String,
    },
    /// A single-row query matched nothing.
    NotFound,
    /// Anything else.
    Query(String),
}

impl StoreFailure {
    /// Name of the violated constraint, when the server reported one.
    pub(crate) fn constraint(&self) -> Option<&str> {
        match self {
            Self::UniqueViolation { constraint, .. }
            | Self::ForeignKeyViolation { constraint, .. }
            | Self::CheckViolation { constraint, .. } => constraint.as_deref(),
            _ => None,
        }
    }

    /// Reports whether the failure violated `name`.
    pub(crate) fn violates(&self, name: &str) -> bool {
        self.constraint() == Some(name)
    }

    /// Fold into a port error through its generic constructors.
    pub(crate) fn into_port<E>(
        self,
        connection: impl FnOnce(String) -> E,
        query: impl FnOnce(String) -> E,
    ) -> E {
        match self {
            Self::Connection(message) => connection(message),
            Self::NotFound => query("record not found".to_owned()),
            Self::UniqueViolation { message, .. }
            | Self::ForeignKeyViolation { message, .. }
            | Self::CheckViolation { message, .. }
            | Self::Query(message) => query(message),
        }
    }
}

/// Classify a Diesel error and emit debug context.
pub(crate) fn classify(error: DieselError) -> StoreFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            error = %error,
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => StoreFailure::NotFound,
        DieselError::DatabaseError(kind, info) => {
            let constraint = info.constraint_name().map(str::to_owned);
            let message = info.message().to_owned();
            match kind {
                DatabaseErrorKind::UniqueViolation => StoreFailure::UniqueViolation {
                    constraint,
                    message,
                },
                DatabaseErrorKind::ForeignKeyViolation => StoreFailure::ForeignKeyViolation {
                    constraint,
                    message,
                },
                DatabaseErrorKind::CheckViolation => StoreFailure::CheckViolation {
                    constraint,
                    message,
                },
                DatabaseErrorKind::ClosedConnection => StoreFailure::Connection(message),
                _ => StoreFailure::Query(message),
            }
        }
        other => StoreFailure::Query(other.to_string()),
    }
}

/// Error type for transaction closures that may fail with a port error.
///
/// `AsyncConnection::transaction` needs `From<diesel::result::Error>`; the
/// `Port` arm carries domain failures detected mid-transaction so the
/// rollback still happens.
#[derive(Debug)]
pub(crate) enum TxError<E> {
    Diesel(DieselError),
    Port(E),
}

impl<E> From<DieselError> for TxError<E> {
    fn from(error: DieselError) -> Self {
        Self::Diesel(error)
    }
}

impl<E> TxError<E> {
    /// Collapse into the port error, mapping driver failures with `map`.
    pub(crate) fn resolve(self, map: impl FnOnce(DieselError) -> E) -> E {
        match self {
            Self::Diesel(error) => map(error),
            Self::Port(error) => error,
        }
    }
}

/// Convert a batch of rows, failing on the first invalid one.
pub(crate) fn convert_rows<R, T, E>(
    rows: Vec<R>,
    query: impl FnOnce(String) -> E,
) -> Result<Vec<T>, E>
where
    T: TryFrom<R, Error = RowConversionError>,
{
    rows.into_iter()
        .map(T::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| query(err.to_string()))
}

/// Log a foreign key violation no adapter mapping recognised.
pub(crate) fn log_unmapped_reference(failure: &StoreFailure) {
    if let StoreFailure::ForeignKeyViolation {
        constraint,
        message,
    } = failure
    {
        warn!(
            message,
            constraint = ?constraint,
            "unrecognised foreign key violation"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, PartialEq, Eq)]
    enum Demo {
        Connection(String),
        Query(String),
    }

    #[rstest]
    fn not_found_maps_to_query() {
        let failure = classify(DieselError::NotFound);
        assert_eq!(failure, StoreFailure::NotFound);
        assert_eq!(
            failure.into_port(Demo::Connection, Demo::Query),
            Demo::Query("record not found".to_owned())
        );
    }

    #[rstest]
    fn connection_failures_keep_their_message() {
        let failure = StoreFailure::Connection("gone".to_owned());
        assert_eq!(
            failure.into_port(Demo::Connection, Demo::Query),
            Demo::Connection("gone".to_owned())
        );
    }

    #[rstest]
    #[case(StoreFailure::UniqueViolation { constraint: Some("articles_slug_key".into()), message: String::new() }, true)]
    #[case(StoreFailure::UniqueViolation { constraint: Some("users_email_key".into()), message: String::new() }, false)]
    #[case(StoreFailure::UniqueViolation { constraint: None, message: String::new() }, false)]
    #[case(StoreFailure::NotFound, false)]
    fn violates_matches_constraint_names(#[case] failure: StoreFailure, #[case] expected: bool) {
        assert_eq!(failure.violates("articles_slug_key"), expected);
    }

    #[rstest]
    fn transaction_errors_resolve_port_failures_untouched() {
        let port: TxError<Demo> = TxError::Port(Demo::Query("domain".to_owned()));
        assert_eq!(
            port.resolve(|_| Demo::Query("driver".to_owned())),
            Demo::Query("domain".to_owned())
        );

        let driver: TxError<Demo> = DieselError::NotFound.into();
        assert_eq!(
            driver.resolve(|_| Demo::Query("driver".to_owned())),
            Demo::Query("driver".to_owned())
        );
    }
}
