//! Dataset registry: loads all dataset definitions from embedded TOML
//! configs.
//!
//! Each `.toml` file in `packages/source/datasets/` is baked into the binary
//! at compile time via [`include_str!`]. Supporting another dataset vintage
//! is a matter of adding a TOML file and listing it below.

use crate::SourceError;
use crate::dataset_def::{DatasetDefinition, parse_dataset_toml};

/// TOML configs embedded at compile time.
const DATASET_TOMLS: &[(&str, &str)] = &[
    (
        "austin_crashes",
        include_str!("../datasets/austin_crashes.toml"),
    ),
    (
        "austin_crashes_csv",
        include_str!("../datasets/austin_crashes_csv.toml"),
    ),
];

/// Total number of configured datasets (used in tests).
#[cfg(test)]
const EXPECTED_DATASET_COUNT: usize = 2;

/// Returns all configured dataset definitions, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_datasets() -> Vec<DatasetDefinition> {
    DATASET_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_dataset_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up a dataset definition by id.
///
/// # Errors
///
/// Returns [`SourceError::UnknownDataset`] if no definition has that id.
pub fn find_dataset(id: &str) -> Result<DatasetDefinition, SourceError> {
    all_datasets()
        .into_iter()
        .find(|d| d.id == id)
        .ok_or_else(|| SourceError::UnknownDataset { id: id.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_all_datasets() {
        assert_eq!(all_datasets().len(), EXPECTED_DATASET_COUNT);
    }

    #[test]
    fn dataset_ids_are_unique() {
        let datasets = all_datasets();
        let mut ids: Vec<&str> = datasets.iter().map(|d| d.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), EXPECTED_DATASET_COUNT);
    }

    #[test]
    fn all_datasets_have_required_aliases() {
        for dataset in &all_datasets() {
            assert!(!dataset.name.is_empty(), "{}: name is empty", dataset.id);
            assert!(
                !dataset.fields.speed_limit.is_empty(),
                "{}: no speed_limit aliases",
                dataset.id
            );
            assert!(
                !dataset.fields.cost.is_empty(),
                "{}: no cost aliases",
                dataset.id
            );
        }
    }

    #[test]
    fn finds_dataset_by_id() {
        assert_eq!(find_dataset("austin_crashes").unwrap().city, "Austin");
        assert!(matches!(
            find_dataset("nope"),
            Err(SourceError::UnknownDataset { .. })
        ));
    }
}
