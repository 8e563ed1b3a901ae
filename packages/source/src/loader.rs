//! Dataset loading with stale-load protection.
//!
//! A load reads a dataset file from disk or over HTTP, parses it and
//! normalizes every record. Loads are tagged with a monotonically
//! increasing generation; when a newer load has begun by the time an
//! older one finishes, the older result is reported as
//! [`LoadOutcome::Superseded`] instead of being handed to the caller.
//!
//! A failed fetch never surfaces as an error to the caller: it is logged
//! and the load yields an empty dataset, so every downstream view renders
//! empty instead of failing.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crash_map_crash_models::NormalizedCrash;

use crate::normalize::NormalizeReport;
use crate::progress::ProgressCallback;
use crate::{CrashSource, SourceError};

/// Where a dataset file lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetLocation {
    /// A local file.
    Path(PathBuf),
    /// An `http://` or `https://` URL.
    Url(String),
}

impl From<&str> for DatasetLocation {
    fn from(value: &str) -> Self {
        let lower = value.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(value.to_string())
        } else {
            Self::Path(PathBuf::from(value))
        }
    }
}

impl fmt::Display for DatasetLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Reads the raw bytes of a dataset file.
///
/// # Errors
///
/// Returns [`SourceError::Io`] if a local file cannot be read, or
/// [`SourceError::Http`] if the request fails or returns a non-success
/// status.
pub async fn fetch_bytes(location: &DatasetLocation) -> Result<Vec<u8>, SourceError> {
    match location {
        DatasetLocation::Path(path) => Ok(tokio::fs::read(path).await?),
        DatasetLocation::Url(url) => {
            let response = reqwest::Client::new()
                .get(url)
                .send()
                .await?
                .error_for_status()?;
            Ok(response.bytes().await?.to_vec())
        }
    }
}

/// A completed, current load.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    /// Generation this load was started with.
    pub generation: u64,
    /// Id of the dataset definition used.
    pub dataset_id: String,
    /// Normalized records, in input order. Empty if the fetch failed.
    pub crashes: Vec<NormalizedCrash>,
    /// What the normalizer kept, dropped and defaulted.
    pub report: NormalizeReport,
}

/// Result of a load attempt.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// The load finished and is still the most recent one.
    Loaded(LoadedDataset),
    /// A newer load began before this one finished; its result was
    /// discarded.
    Superseded {
        /// Generation of the discarded load.
        generation: u64,
        /// Most recent generation at the time of discard.
        latest: u64,
    },
}

impl LoadOutcome {
    /// Returns the loaded dataset, or `None` if the load was superseded.
    #[must_use]
    pub fn into_loaded(self) -> Option<LoadedDataset> {
        match self {
            Self::Loaded(dataset) => Some(dataset),
            Self::Superseded { .. } => None,
        }
    }
}

/// Issues load generations and discards results from superseded loads.
#[derive(Debug, Default)]
pub struct DatasetLoader {
    latest: AtomicU64,
}

impl DatasetLoader {
    /// Creates a loader that has issued no generations yet.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            latest: AtomicU64::new(0),
        }
    }

    /// Starts a new generation, superseding every load in flight.
    pub fn begin(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Returns `true` if `generation` is still the most recent one.
    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == generation
    }

    /// Begins a new generation and loads `source` from `location`.
    pub async fn load(
        &self,
        source: &dyn CrashSource,
        location: &DatasetLocation,
        progress: &Arc<dyn ProgressCallback>,
    ) -> LoadOutcome {
        let generation = self.begin();
        self.load_generation(generation, source, location, progress)
            .await
    }

    /// Loads `source` under an already-issued generation.
    pub async fn load_generation(
        &self,
        generation: u64,
        source: &dyn CrashSource,
        location: &DatasetLocation,
        progress: &Arc<dyn ProgressCallback>,
    ) -> LoadOutcome {
        let label = source.id().to_string();
        log::info!("[{label}] Loading generation {generation} from {location}");
        progress.set_message(format!("fetching {location}"));

        let features = match source.fetch(location).await {
            Ok(features) => features,
            Err(e) => {
                log::error!("[{label}] Failed to load {location}: {e}");
                Vec::new()
            }
        };

        if let Some(outcome) = self.superseded(generation, &label) {
            return outcome;
        }

        progress.set_message("normalizing".to_string());
        let (crashes, report) = source.normalize(&features, progress);

        if let Some(outcome) = self.superseded(generation, &label) {
            return outcome;
        }

        LoadOutcome::Loaded(LoadedDataset {
            generation,
            dataset_id: label,
            crashes,
            report,
        })
    }

    fn superseded(&self, generation: u64, label: &str) -> Option<LoadOutcome> {
        let latest = self.latest.load(Ordering::SeqCst);
        if latest == generation {
            return None;
        }
        log::debug!("[{label}] Discarding generation {generation}; generation {latest} is newer");
        Some(LoadOutcome::Superseded { generation, latest })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::progress::null_progress;
    use crate::progress::tests::RecordingProgress;
    use crate::registry::find_dataset;

    const TWO_CRASHES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [-97.74, 30.27]},
                "properties": {"Speed Limit": "30", "tot_injry_cnt": "1"}
            },
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [-97.70, 30.30]},
                "properties": {"Speed Limit": "60", "death_cnt": "1"}
            }
        ]
    }"#;

    async fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "crash_map_loader_{}_{name}",
            std::process::id()
        ));
        tokio::fs::write(&path, contents).await.unwrap();
        path
    }

    #[test]
    fn classifies_locations() {
        assert_eq!(
            DatasetLocation::from("https://example.org/a.geojson"),
            DatasetLocation::Url("https://example.org/a.geojson".to_string())
        );
        assert_eq!(
            DatasetLocation::from("public/data/a.geojson"),
            DatasetLocation::Path(PathBuf::from("public/data/a.geojson"))
        );
        assert_eq!(
            DatasetLocation::from("HTTP://EXAMPLE.ORG/a.csv").to_string(),
            "HTTP://EXAMPLE.ORG/a.csv"
        );
    }

    #[test]
    fn generations_increase_and_supersede() {
        let loader = DatasetLoader::new();
        let first = loader.begin();
        assert!(loader.is_current(first));
        let second = loader.begin();
        assert!(second > first);
        assert!(!loader.is_current(first));
        assert!(loader.is_current(second));
    }

    #[tokio::test]
    async fn loads_geojson_file() {
        let path = write_temp("loads.geojson", TWO_CRASHES).await;
        let source = find_dataset("austin_crashes").unwrap();
        let loader = DatasetLoader::new();
        let progress = Arc::new(RecordingProgress::default());
        let progress_handle: Arc<dyn ProgressCallback> = progress.clone();

        let loaded = loader
            .load(&source, &DatasetLocation::Path(path.clone()), &progress_handle)
            .await
            .into_loaded()
            .unwrap();

        assert_eq!(loaded.generation, 1);
        assert_eq!(loaded.dataset_id, "austin_crashes");
        assert_eq!(loaded.crashes.len(), 2);
        assert_eq!(loaded.crashes[1].speed_limit, 60);
        assert_eq!(loaded.report.kept, 2);
        assert_eq!(progress.total.load(Ordering::SeqCst), 2);
        assert_eq!(progress.position.load(Ordering::SeqCst), 2);

        tokio::fs::remove_file(path).await.unwrap();
    }

    #[tokio::test]
    async fn missing_file_yields_empty_dataset() {
        let source = find_dataset("austin_crashes").unwrap();
        let loader = DatasetLoader::new();
        let location = DatasetLocation::from("/nonexistent/crash_map/missing.geojson");

        let loaded = loader
            .load(&source, &location, &null_progress())
            .await
            .into_loaded()
            .unwrap();

        assert!(loaded.crashes.is_empty());
        assert_eq!(loaded.report.features, 0);
    }

    #[tokio::test]
    async fn malformed_file_yields_empty_dataset() {
        let path = write_temp("malformed.geojson", "{not json").await;
        let source = find_dataset("austin_crashes").unwrap();
        let loader = DatasetLoader::new();

        let loaded = loader
            .load(&source, &DatasetLocation::Path(path.clone()), &null_progress())
            .await
            .into_loaded()
            .unwrap();

        assert!(loaded.crashes.is_empty());
        tokio::fs::remove_file(path).await.unwrap();
    }

    #[tokio::test]
    async fn stale_load_is_superseded() {
        let path = write_temp("stale.geojson", TWO_CRASHES).await;
        let source = find_dataset("austin_crashes").unwrap();
        let loader = DatasetLoader::new();
        let location = DatasetLocation::Path(path.clone());

        let stale = loader.begin();
        let fresh = loader.begin();

        let outcome = loader
            .load_generation(stale, &source, &location, &null_progress())
            .await;
        assert!(matches!(
            outcome,
            LoadOutcome::Superseded { generation, latest } if generation == stale && latest == fresh
        ));

        let current = loader
            .load_generation(fresh, &source, &location, &null_progress())
            .await
            .into_loaded()
            .unwrap();
        assert_eq!(current.crashes.len(), 2);

        tokio::fs::remove_file(path).await.unwrap();
    }
}
