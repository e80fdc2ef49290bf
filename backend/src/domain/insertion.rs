//! Outcome of idempotent get-or-create operations.

/// Result of a get-or-create call.
///
/// Seeding relies on the distinction to report how many rows a run added;
/// a repeated run sees only [`Insertion::Existing`].
///
/// # Examples
///
/// ```
/// use conduit_backend::domain::Insertion;
///
/// let created = Insertion::Created(7);
/// assert!(created.is_created());
/// assert_eq!(created.map(|value| value * 2).into_inner(), 14);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion<T> {
    /// The record did not exist and was inserted.
    Created(T),
    /// A record with the same natural key already existed.
    Existing(T),
}

impl<T> Insertion<T> {
    /// Reports whether the call inserted a new record.
    pub const fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    /// Borrow the record regardless of outcome.
    pub const fn value(&self) -> &T {
        match self {
            Self::Created(value) | Self::Existing(value) => value,
        }
    }

    /// Consume the outcome, returning the record.
    pub fn into_inner(self) -> T {
        match self {
            Self::Created(value) | Self::Existing(value) => value,
        }
    }

    /// Transform the record while keeping the outcome.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Insertion<U> {
        match self {
            Self::Created(value) => Insertion::Created(f(value)),
            Self::Existing(value) => Insertion::Existing(f(value)),
        }
    }

    /// Build an outcome from a flag, as returned by `ON CONFLICT DO NOTHING`.
    pub fn from_flag(created: bool, value: T) -> Self {
        if created {
            Self::Created(value)
        } else {
            Self::Existing(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(true, true)]
    #[case(false, false)]
    fn from_flag_matches_outcome(#[case] flag: bool, #[case] expected: bool) {
        let outcome = Insertion::from_flag(flag, "row");

        assert_eq!(outcome.is_created(), expected);
        assert_eq!(*outcome.value(), "row");
    }

    #[test]
    fn map_preserves_existing() {
        let outcome = Insertion::Existing(2).map(|value| value + 1);
        assert_eq!(outcome, Insertion::Existing(3));
    }
}
