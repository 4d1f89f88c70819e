//! Resolution of labels against a package index JSON API.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use depot_utils::fs::copy_into;
use serde::Deserialize;
use tracing::{debug, warn};
use ureq::Agent;
use url::Url;

use crate::{
    download::Download,
    error::DownloadError,
    http::Http,
    http_client::ClientConfig,
    requirement::Requirement,
    traits::DistributionResolver,
    types::Progress,
    utils::bare_filename,
    version::ReleaseVersion,
};

/// Package types in order of preference.
const PACKAGE_TYPES: [&str; 3] = ["sdist", "bdist_wheel", "bdist_egg"];

/// File name suffixes the metadata extractor understands.
const SUPPORTED_SUFFIXES: [&str; 9] = [
    ".tar.gz", ".tgz", ".tar.bz2", ".tbz", ".tbz2", ".tar", ".zip", ".whl", ".egg",
];

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseFile {
    pub filename: String,
    pub url: String,
    #[serde(default)]
    pub packagetype: String,
    #[serde(default)]
    pub yanked: bool,
    #[serde(default)]
    pub size: Option<u64>,
}

impl ReleaseFile {
    fn rank(&self) -> Option<(bool, usize)> {
        let type_rank = PACKAGE_TYPES
            .iter()
            .position(|kind| *kind == self.packagetype)?;
        let name = self.filename.to_ascii_lowercase();
        let unsupported = !SUPPORTED_SUFFIXES.iter().any(|s| name.ends_with(s));
        Some((unsupported, type_rank))
    }

    /// Where this file lands inside `dest_dir`. The index-provided name is
    /// reduced to its last segment so it cannot point outside `dest_dir`.
    pub fn target_in(&self, dest_dir: &Path) -> Result<PathBuf, DownloadError> {
        bare_filename(&self.filename)
            .map(|name| dest_dir.join(name))
            .ok_or(DownloadError::NoFilename)
    }
}

/// The `/pypi/<name>/json` document.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectDocument {
    pub info: ProjectInfo,
    #[serde(default)]
    pub releases: HashMap<String, Vec<ReleaseFile>>,
    /// Files of `info.version`.
    #[serde(default)]
    pub urls: Vec<ReleaseFile>,
}

impl ProjectDocument {
    fn files_for(&self, version: &str) -> &[ReleaseFile] {
        match self.releases.get(version) {
            Some(files) if !files.is_empty() => files,
            _ if version == self.info.version => &self.urls,
            _ => &[],
        }
    }

    /// Picks the best non-yanked file of a version. Readable archive formats
    /// win, then sdist over wheel over egg.
    pub fn best_file(&self, version: &str) -> Option<&ReleaseFile> {
        self.files_for(version)
            .iter()
            .filter(|file| !file.yanked)
            .filter_map(|file| file.rank().map(|rank| (rank, file)))
            .min_by_key(|(rank, _)| *rank)
            .map(|(_, file)| file)
    }

    /// Chooses the version to fetch for `requirement`.
    ///
    /// Without specifiers this is the version the index reports as current.
    /// Otherwise it is the highest version that satisfies every specifier and
    /// has a downloadable file; pre-releases only qualify when a specifier
    /// names one.
    pub fn select_version(&self, requirement: &Requirement) -> Option<String> {
        if requirement.specifiers.is_empty() {
            return self
                .best_file(&self.info.version)
                .map(|_| self.info.version.clone());
        }

        let allow_pre = requirement.allows_prereleases();
        self.releases
            .keys()
            .map(|raw| (ReleaseVersion::parse(raw), raw))
            .filter(|(version, _)| allow_pre || !version.is_prerelease())
            .filter(|(version, _)| requirement.contains(version))
            .filter(|(_, raw)| self.best_file(raw).is_some())
            .max_by(|(a, a_raw), (b, b_raw)| a.cmp(b).then_with(|| a_raw.cmp(b_raw)))
            .map(|(_, raw)| raw.clone())
    }

    /// Selects the file to download for `requirement`.
    pub fn select_file(&self, requirement: &Requirement) -> Option<&ReleaseFile> {
        let version = self.select_version(requirement)?;
        self.best_file(&version)
    }
}

type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;

/// [`DistributionResolver`] backed by local paths, URLs and an index JSON API.
pub struct PackageIndex {
    agent: Agent,
    index_url: String,
    on_progress: Option<ProgressCallback>,
}

impl PackageIndex {
    pub fn new(index_url: impl Into<String>, client: &ClientConfig) -> Self {
        Self {
            agent: client.build(),
            index_url: index_url.into().trim_end_matches('/').to_string(),
            on_progress: None,
        }
    }

    /// Registers a callback that receives progress for every download.
    pub fn with_progress<F>(mut self, on_progress: F) -> Self
    where
        F: Fn(Progress) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(on_progress));
        self
    }

    pub fn index_url(&self) -> &str {
        &self.index_url
    }

    /// URL of the JSON document describing `project`.
    pub fn project_url(&self, requirement: &Requirement) -> String {
        format!("{}/pypi/{}/json", self.index_url, requirement.normalized_name())
    }

    fn copy_local(&self, path: &Path, dest_dir: &Path) -> Result<Option<PathBuf>, DownloadError> {
        if !path.is_file() {
            debug!("{} is not a file", path.display());
            return Ok(None);
        }
        debug!("copying {} into {}", path.display(), dest_dir.display());
        Ok(Some(copy_into(path, dest_dir)?))
    }

    fn fetch_url(&self, url: &str, dest_dir: &Path) -> Result<Option<PathBuf>, DownloadError> {
        let mut download = Download::new(url).output(dest_dir);
        if let Some(cb) = &self.on_progress {
            let cb = Arc::clone(cb);
            download = download.progress(move |event| (*cb)(event));
        }
        download.execute(&self.agent)
    }

    fn fetch_requirement(
        &self,
        label: &str,
        dest_dir: &Path,
    ) -> Result<Option<PathBuf>, DownloadError> {
        let requirement = Requirement::parse(label)?;
        let url = self.project_url(&requirement);

        debug!("looking up {} at {}", requirement, url);
        let Some(document) = Http::json::<ProjectDocument>(&self.agent, &url)? else {
            debug!("{} is not on the index", requirement.name);
            return Ok(None);
        };

        let Some(file) = document.select_file(&requirement) else {
            warn!("no distribution of {} matches '{}'", document.info.name, label);
            return Ok(None);
        };

        debug!("selected {} for {}", file.filename, label);
        let target = file.target_in(dest_dir)?;
        self.fetch_url(&file.url, &target)
    }
}

impl DistributionResolver for PackageIndex {
    fn download(&self, label: &str, dest_dir: &Path) -> Result<Option<PathBuf>, DownloadError> {
        let label = label.trim();
        let local = Path::new(label);
        if local.is_file() {
            return self.copy_local(local, dest_dir);
        }

        if let Ok(url) = Url::parse(label) {
            match url.scheme() {
                "file" => {
                    let path = url.to_file_path().map_err(|_| {
                        DownloadError::InvalidUrl {
                            url: label.to_string(),
                            source: url::ParseError::RelativeUrlWithoutBase,
                        }
                    })?;
                    return self.copy_local(&path, dest_dir);
                }
                "http" | "https" => return self.fetch_url(label, dest_dir),
                _ => {}
            }
        }

        self.fetch_requirement(label, dest_dir)
    }
}
