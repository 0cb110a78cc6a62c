//! Where endpoint documents come from.
//!
//! Fetching the pages from a live VRM is done by a separate scraper that leaves them in the data directory; this
//! module only reads what is there.

use std::{
    future::Future,
    io::ErrorKind,
    path::{
        Path,
        PathBuf,
    },
    pin::Pin,
};
use thiserror::Error;
use vrm_dashboard_config::EndpointConfig;
use vrm_report::EndpointDocuments;

pub const INDEX_FILE: &str = "index.mhtml";
pub const CAMERAS_FILE: &str = "showCameras.html";
pub const DEVICES_FILE: &str = "showDevices.html";
pub const TARGETS_FILE: &str = "showTargets.html";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no documents found in {0}")]
    NoDocuments(PathBuf),
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Supplies the documents of each configured endpoint.
pub trait DocumentSource {
    /// Endpoints in merge order.
    fn endpoints(&self) -> &[EndpointConfig];

    fn load<'a>(
        &'a self,
        endpoint: &'a EndpointConfig,
    ) -> Pin<Box<dyn Future<Output = Result<EndpointDocuments, SourceError>> + Send + 'a>>;
}

/// Paths of the four pages of one endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentPaths {
    pub index: Option<PathBuf>,
    pub cameras: Option<PathBuf>,
    pub devices: Option<PathBuf>,
    pub targets: Option<PathBuf>,
}

impl DocumentPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            index: Some(dir.join(INDEX_FILE)),
            cameras: Some(dir.join(CAMERAS_FILE)),
            devices: Some(dir.join(DEVICES_FILE)),
            targets: Some(dir.join(TARGETS_FILE)),
        }
    }

    /// Reads every listed file. With `tolerate_missing` a file that does not exist counts as absent, otherwise it is an
    /// error.
    async fn read(&self, tolerate_missing: bool) -> Result<EndpointDocuments, SourceError> {
        let index = read_bytes(self.index.as_deref(), tolerate_missing).await?;
        let text = |bytes: Option<Vec<u8>>| bytes.map(|b| String::from_utf8_lossy(&b).into_owned());
        Ok(EndpointDocuments {
            index,
            cameras: text(read_bytes(self.cameras.as_deref(), tolerate_missing).await?),
            devices: text(read_bytes(self.devices.as_deref(), tolerate_missing).await?),
            targets: text(read_bytes(self.targets.as_deref(), tolerate_missing).await?),
            unit: None,
        })
    }
}

async fn read_bytes(path: Option<&Path>, tolerate_missing: bool) -> Result<Option<Vec<u8>>, SourceError> {
    let Some(path) = path else {
        return Ok(None);
    };
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if tolerate_missing && err.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(SourceError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn has_any(documents: &EndpointDocuments) -> bool {
    documents.index.is_some() || documents.cameras.is_some() || documents.devices.is_some() || documents.targets.is_some()
}

/// Writes the repaired main page of an archive next to it, as `<name>.decoded.html`.
async fn dump_decoded(archive_path: &Path, raw: &[u8]) {
    let html = match vrm_report::unpack(raw) {
        Ok(archive) => archive.rendered_html(),
        Err(err) => {
            warn!(path = %archive_path.display(), %err, "Not dumping undecodable archive");
            return;
        }
    };
    let target = archive_path.with_extension("decoded.html");
    match tokio::fs::write(&target, html).await {
        Ok(()) => debug!(path = %target.display(), "Wrote decoded archive"),
        Err(err) => warn!(path = %target.display(), %err, "Failed to write decoded archive"),
    }
}

/// Reads each endpoint from `<data_dir>/<bvms>/<vrm or ip>/`.
pub struct DirectorySource {
    data_dir: PathBuf,
    endpoints: Vec<EndpointConfig>,
    dump_decoded: bool,
}

impl DirectorySource {
    pub fn new(data_dir: impl Into<PathBuf>, endpoints: Vec<EndpointConfig>, dump_decoded: bool) -> Self {
        Self {
            data_dir: data_dir.into(),
            endpoints,
            dump_decoded,
        }
    }
}

impl DocumentSource for DirectorySource {
    fn endpoints(&self) -> &[EndpointConfig] {
        &self.endpoints
    }

    fn load<'a>(
        &'a self,
        endpoint: &'a EndpointConfig,
    ) -> Pin<Box<dyn Future<Output = Result<EndpointDocuments, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let dir = endpoint.document_dir(&self.data_dir);
            let paths = DocumentPaths::in_dir(&dir);
            let mut documents = paths.read(true).await?;
            if !has_any(&documents) {
                return Err(SourceError::NoDocuments(dir));
            }
            if let (true, Some(path), Some(raw)) = (self.dump_decoded, &paths.index, &documents.index) {
                dump_decoded(path, raw).await;
            }
            documents.unit = Some(endpoint.unit());
            Ok(documents)
        })
    }
}

/// A single endpoint whose pages were handed in one by one, e.g. as uploads.
pub struct FileSource {
    endpoints: [EndpointConfig; 1],
    paths: DocumentPaths,
    dump_decoded: bool,
}

impl FileSource {
    pub fn new(endpoint: EndpointConfig, paths: DocumentPaths, dump_decoded: bool) -> Self {
        Self {
            endpoints: [endpoint],
            paths,
            dump_decoded,
        }
    }
}

impl DocumentSource for FileSource {
    fn endpoints(&self) -> &[EndpointConfig] {
        &self.endpoints
    }

    fn load<'a>(
        &'a self,
        endpoint: &'a EndpointConfig,
    ) -> Pin<Box<dyn Future<Output = Result<EndpointDocuments, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let mut documents = self.paths.read(false).await?;
            if let (true, Some(path), Some(raw)) = (self.dump_decoded, &self.paths.index, &documents.index) {
                dump_decoded(path, raw).await;
            }
            documents.unit = Some(endpoint.unit());
            Ok(documents)
        })
    }
}
