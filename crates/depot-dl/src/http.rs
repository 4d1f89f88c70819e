use serde::de::DeserializeOwned;
use ureq::{http::Response, Agent, Body};

use crate::error::DownloadError;

/// Returns true when the error is an HTTP 404 answer.
pub fn is_not_found(err: &ureq::Error) -> bool {
    matches!(err, ureq::Error::StatusCode(404))
}

pub struct Http;

impl Http {
    /// Sends a GET request. A 404 answer is `Ok(None)`, other error statuses
    /// are [`DownloadError::HttpError`].
    pub fn fetch(agent: &Agent, url: &str) -> Result<Option<Response<Body>>, DownloadError> {
        match agent.get(url).call() {
            Ok(resp) => Ok(Some(resp)),
            Err(err) if is_not_found(&err) => Ok(None),
            Err(ureq::Error::StatusCode(status)) => {
                Err(DownloadError::HttpError {
                    status,
                    url: url.to_string(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Fetches and decodes a JSON document, `Ok(None)` on 404.
    pub fn json<T: DeserializeOwned>(agent: &Agent, url: &str) -> Result<Option<T>, DownloadError> {
        let Some(mut resp) = Self::fetch(agent, url)? else {
            return Ok(None);
        };

        resp.body_mut()
            .read_json()
            .map(Some)
            .map_err(|_| DownloadError::InvalidResponse {
                url: url.to_string(),
            })
    }
}
