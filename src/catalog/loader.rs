//! Catalog Loader
//!
//! Loads the lake dataset exactly once and shares the result with every
//! caller. A failed load degrades to an empty catalog instead of an error.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::catalog::{LakeCatalog, LakeRecord};
use crate::error::{AtlasError, Result};

/// Static dataset compiled into the binary.
const EMBEDDED_LAKES: &str = include_str!("../../data/lakes.json");

// == Dataset Source ==
/// Somewhere lake records can be read from.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    async fn load(&self) -> Result<Vec<LakeRecord>>;

    /// Short label for log lines.
    fn describe(&self) -> String;
}

/// The dataset shipped with the crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedDataset;

#[async_trait]
impl DatasetSource for EmbeddedDataset {
    async fn load(&self) -> Result<Vec<LakeRecord>> {
        parse_dataset(EMBEDDED_LAKES)
    }

    fn describe(&self) -> String {
        "embedded dataset".to_string()
    }
}

/// A JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileDataset {
    path: PathBuf,
}

impl FileDataset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DatasetSource for FileDataset {
    async fn load(&self) -> Result<Vec<LakeRecord>> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            AtlasError::Dataset(format!("cannot read {}: {}", self.path.display(), e))
        })?;
        parse_dataset(&raw)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// A JSON document fetched over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDataset {
    client: reqwest::Client,
    url: String,
}

impl HttpDataset {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AtlasError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl DatasetSource for HttpDataset {
    async fn load(&self) -> Result<Vec<LakeRecord>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AtlasError::Dataset(format!("HTTP error for {}: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AtlasError::Dataset(format!(
                "{} returned {}",
                self.url, status
            )));
        }

        let raw = response
            .text()
            .await
            .map_err(|e| AtlasError::Dataset(format!("cannot read body of {}: {e}", self.url)))?;
        parse_dataset(&raw)
    }

    fn describe(&self) -> String {
        format!("url {}", self.url)
    }
}

/// Picks a source from a config string: `embedded`, `http(s)://...`, or a path.
pub fn source_from_config(spec: &str, timeout: Duration) -> Result<Arc<dyn DatasetSource>> {
    let spec = spec.trim();
    if spec.is_empty() || spec.eq_ignore_ascii_case("embedded") {
        Ok(Arc::new(EmbeddedDataset))
    } else if spec.starts_with("http://") || spec.starts_with("https://") {
        Ok(Arc::new(HttpDataset::new(spec, timeout)?))
    } else {
        Ok(Arc::new(FileDataset::new(spec)))
    }
}

fn parse_dataset(raw: &str) -> Result<Vec<LakeRecord>> {
    serde_json::from_str(raw).map_err(|e| AtlasError::Dataset(format!("invalid lake JSON: {e}")))
}

// == Catalog Loader ==
/// Async "ensure loaded" gate over a dataset source.
pub struct CatalogLoader {
    source: Arc<dyn DatasetSource>,
    catalog: OnceCell<Arc<LakeCatalog>>,
}

impl CatalogLoader {
    pub fn new(source: Arc<dyn DatasetSource>) -> Self {
        Self {
            source,
            catalog: OnceCell::new(),
        }
    }

    /// Loads the catalog on first call; concurrent callers share the same load.
    ///
    /// Never fails: a broken source is logged and yields an empty catalog.
    pub async fn ensure_loaded(&self) -> Arc<LakeCatalog> {
        self.catalog
            .get_or_init(|| async {
                let label = self.source.describe();
                let loaded = match self.source.load().await {
                    Ok(records) => LakeCatalog::from_records(records),
                    Err(e) => Err(e),
                };
                match loaded {
                    Ok(catalog) => {
                        info!("Loaded {} lakes from {}", catalog.count(), label);
                        Arc::new(catalog)
                    }
                    Err(e) => {
                        error!("Failed to load lakes from {}: {}", label, e);
                        Arc::new(LakeCatalog::empty())
                    }
                }
            })
            .await
            .clone()
    }

    /// The catalog if a load has already settled.
    pub fn loaded(&self) -> Option<Arc<LakeCatalog>> {
        self.catalog.get().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl DatasetSource for CountingSource {
        async fn load(&self) -> Result<Vec<LakeRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            if self.fail {
                Err(AtlasError::Dataset("boom".to_string()))
            } else {
                parse_dataset(EMBEDDED_LAKES)
            }
        }

        fn describe(&self) -> String {
            "counting source".to_string()
        }
    }

    #[tokio::test]
    async fn test_embedded_dataset_loads() {
        let loader = CatalogLoader::new(Arc::new(EmbeddedDataset));
        let catalog = loader.ensure_loaded().await;
        assert_eq!(catalog.count(), 59);
        assert_eq!(catalog.free_fishing_count(), 3);
        assert!(catalog.by_id("zuerichsee").is_some());
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_load() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let loader = Arc::new(CatalogLoader::new(source.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let loader = loader.clone();
                tokio::spawn(async move { loader.ensure_loaded().await })
            })
            .collect();

        let mut catalogs = Vec::new();
        for handle in handles {
            catalogs.push(handle.await.unwrap());
        }

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(catalogs.iter().all(|c| Arc::ptr_eq(c, &catalogs[0])));
    }

    #[tokio::test]
    async fn test_failed_load_yields_empty_catalog() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let loader = CatalogLoader::new(source.clone());

        assert!(loader.loaded().is_none());
        let catalog = loader.ensure_loaded().await;
        assert!(catalog.is_empty());

        // Settled: no second attempt
        loader.ensure_loaded().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(loader.loaded().is_some());
    }

    #[tokio::test]
    async fn test_file_dataset() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name":"Blausee","coords":[46.53,7.66],"area":"0.0064 km²","maxDepth":"10 m","elevation":"887 m","cantons":"Bern","fishSpecies":["Forelle"],"freeFishing":false}}]"#
        )
        .unwrap();

        let loader = CatalogLoader::new(Arc::new(FileDataset::new(file.path())));
        let catalog = loader.ensure_loaded().await;
        assert_eq!(catalog.count(), 1);
        assert_eq!(catalog.by_id("blausee").unwrap().name, "Blausee");
    }

    #[tokio::test]
    async fn test_missing_file_yields_empty_catalog() {
        let loader = CatalogLoader::new(Arc::new(FileDataset::new("/nonexistent/lakes.json")));
        assert!(loader.ensure_loaded().await.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_json_yields_empty_catalog() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let loader = CatalogLoader::new(Arc::new(FileDataset::new(file.path())));
        assert!(loader.ensure_loaded().await.is_empty());
    }

    #[test]
    fn test_source_from_config() {
        let timeout = Duration::from_secs(5);
        assert_eq!(
            source_from_config("embedded", timeout).unwrap().describe(),
            "embedded dataset"
        );
        assert!(source_from_config("https://example.org/lakes.json", timeout)
            .unwrap()
            .describe()
            .starts_with("url "));
        assert!(source_from_config("./lakes.json", timeout)
            .unwrap()
            .describe()
            .starts_with("file "));
    }
}
