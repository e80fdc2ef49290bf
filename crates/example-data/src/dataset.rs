//! Dataset selection for seeding runs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DatasetParseError;

/// A named slice of the catalogue that can be seeded independently.
///
/// Variants are declared in dependency order: each dataset only refers to
/// records created by the datasets before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    /// Accounts, profiles, statistics, and preferences.
    Users,
    /// Categories, tags, articles, and revision history.
    Articles,
    /// Threaded comments.
    Comments,
    /// User notifications.
    Notifications,
    /// The follow graph.
    Relationships,
}

impl Dataset {
    /// Every dataset in dependency order.
    pub const ALL: [Self; 5] = [
        Self::Users,
        Self::Articles,
        Self::Comments,
        Self::Notifications,
        Self::Relationships,
    ];

    /// Returns the lowercase name used on the command line and in config.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Articles => "articles",
            Self::Comments => "comments",
            Self::Notifications => "notifications",
            Self::Relationships => "relationships",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dataset {
    type Err = DatasetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|dataset| dataset.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| DatasetParseError {
                name: name.to_owned(),
            })
    }
}

/// The ordered list of datasets a seeding run applies.
///
/// # Example
///
/// ```
/// use example_data::{Dataset, SeedPlan};
///
/// let only = SeedPlan::new(Some(Dataset::Comments), false);
/// assert_eq!(only.datasets(), &[Dataset::Comments]);
///
/// let without_users = SeedPlan::new(None, true);
/// assert_eq!(without_users.datasets().len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedPlan {
    datasets: Vec<Dataset>,
}

impl SeedPlan {
    /// Builds a plan.
    ///
    /// `only` selects exactly one dataset and takes precedence over
    /// `skip_users`. Without it every dataset runs in dependency order,
    /// minus users when `skip_users` is set.
    #[must_use]
    pub fn new(only: Option<Dataset>, skip_users: bool) -> Self {
        let datasets = match only {
            Some(dataset) => vec![dataset],
            None => Dataset::ALL
                .into_iter()
                .filter(|dataset| !(skip_users && *dataset == Dataset::Users))
                .collect(),
        };
        Self { datasets }
    }

    /// Returns a plan covering every dataset.
    #[must_use]
    pub fn everything() -> Self {
        Self::new(None, false)
    }

    /// Returns the datasets in the order they will be applied.
    #[must_use]
    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    /// Reports whether the plan applies `dataset`.
    #[must_use]
    pub fn includes(&self, dataset: Dataset) -> bool {
        self.datasets.contains(&dataset)
    }
}

impl Default for SeedPlan {
    fn default() -> Self {
        Self::everything()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("users", Dataset::Users)]
    #[case("Articles", Dataset::Articles)]
    #[case(" relationships ", Dataset::Relationships)]
    fn parses_dataset_names(#[case] input: &str, #[case] expected: Dataset) {
        assert_eq!(input.parse::<Dataset>(), Ok(expected));
    }

    #[test]
    fn rejects_unknown_dataset() {
        let err = "badges".parse::<Dataset>().expect_err("unknown dataset");
        assert_eq!(err.name, "badges");
        assert!(err.to_string().contains("relationships"));
    }

    #[test]
    fn display_matches_as_str() {
        for dataset in Dataset::ALL {
            assert_eq!(dataset.to_string(), dataset.as_str());
        }
    }

    #[test]
    fn deserializes_lowercase_names() {
        let dataset: Dataset = serde_json::from_str("\"notifications\"").expect("deserialize");
        assert_eq!(dataset, Dataset::Notifications);
    }

    #[rstest]
    #[case::only_wins_over_skip(Some(Dataset::Users), true, vec![Dataset::Users])]
    #[case::only_single(Some(Dataset::Comments), false, vec![Dataset::Comments])]
    #[case::skip_users(None, true, Dataset::ALL[1..].to_vec())]
    #[case::everything(None, false, Dataset::ALL.to_vec())]
    fn builds_plans(
        #[case] only: Option<Dataset>,
        #[case] skip_users: bool,
        #[case] expected: Vec<Dataset>,
    ) {
        let plan = SeedPlan::new(only, skip_users);
        assert_eq!(plan.datasets(), expected.as_slice());
    }
}
