use std::{
    fs::{self, File},
    io::{Read as _, Write as _},
    path::{Path, PathBuf},
};

use tracing::debug;
use ureq::{
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_LENGTH},
        Response,
    },
    Agent, Body,
};

use crate::{
    error::DownloadError,
    http::Http,
    types::Progress,
    utils::{filename_from_header, filename_from_url, resolve_output_path},
};

pub struct Download {
    pub url: String,
    pub output: Option<PathBuf>,
    pub on_progress: Option<Box<dyn Fn(Progress) + Send + Sync>>,
}

impl Download {
    /// Creates a download of `url` into the current directory.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            output: None,
            on_progress: None,
        }
    }

    /// Sets the destination. A directory receives the file under its
    /// resolved name; any other path is used as-is.
    pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Registers a progress callback invoked with [`Progress`] events.
    pub fn progress<F>(mut self, on_progress: F) -> Self
    where
        F: Fn(Progress) + Send + Sync + 'static,
    {
        self.on_progress = Some(Box::new(on_progress));
        self
    }

    /// Performs the download and returns the written path, or `Ok(None)` when
    /// the server answers 404.
    ///
    /// The file name comes from `Content-Disposition` when present, else from
    /// the last URL path segment. A partially written file is removed on error.
    pub fn execute(self, agent: &Agent) -> Result<Option<PathBuf>, DownloadError> {
        let Some(resp) = Http::fetch(agent, &self.url)? else {
            debug!("{} not found", self.url);
            return Ok(None);
        };

        let header_filename = resp
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(filename_from_header);
        let url_filename = filename_from_url(&self.url);

        let output_path =
            resolve_output_path(self.output.as_deref(), url_filename, header_filename)?;

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }

        debug!("downloading {} to {}", self.url, output_path.display());
        if let Err(err) = self.download_to_file(resp, &output_path) {
            let _ = fs::remove_file(&output_path);
            return Err(err);
        }

        Ok(Some(output_path))
    }

    fn download_to_file(&self, resp: Response<Body>, path: &Path) -> Result<(), DownloadError> {
        let total = Self::parse_content_length(&resp);

        self.emit(Progress::Starting { total });

        let mut file = File::create(path)?;
        let mut reader = resp.into_body().into_reader();
        let mut buffer = [0u8; 8192];
        let mut downloaded = 0u64;

        loop {
            let n = reader.read(&mut buffer)?;
            if n == 0 {
                break;
            }

            file.write_all(&buffer[..n])?;
            downloaded += n as u64;

            self.emit(Progress::Chunk {
                current: downloaded,
                total,
            });
        }
        file.flush()?;

        self.emit(Progress::Complete { total: downloaded });

        Ok(())
    }

    fn emit(&self, event: Progress) {
        if let Some(ref cb) = self.on_progress {
            cb(event);
        }
    }

    fn parse_content_length(resp: &Response<Body>) -> u64 {
        resp.headers()
            .get(CONTENT_LENGTH)
            .and_then(|h| h.to_str().ok())
            .and_then(|len| len.parse::<u64>().ok())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn test_builder() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let dl = Download::new("https://example.com/foo-1.0.tar.gz")
            .output("/tmp/scratch")
            .progress(move |event| sink.lock().unwrap().push(event));

        assert_eq!(dl.url, "https://example.com/foo-1.0.tar.gz");
        assert_eq!(dl.output.as_deref(), Some(Path::new("/tmp/scratch")));

        dl.emit(Progress::Starting { total: 3 });
        assert_eq!(*seen.lock().unwrap(), [Progress::Starting { total: 3 }]);
    }
}
