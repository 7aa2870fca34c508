use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::config::Config;
use crate::error::GfetchError;

const BASE_DELAY_MS: u64 = 200;

pub trait RemoteStore {
    fn download(&self, remote_path: &str, local_path: &Path) -> Result<(), GfetchError>;

    fn close(&self);
}

impl<S: RemoteStore + ?Sized> RemoteStore for &S {
    fn download(&self, remote_path: &str, local_path: &Path) -> Result<(), GfetchError> {
        (**self).download(remote_path, local_path)
    }

    fn close(&self) {
        (**self).close()
    }
}

pub struct StoreSession<'a, S: RemoteStore> {
    store: &'a S,
}

impl<'a, S: RemoteStore> StoreSession<'a, S> {
    pub fn open(store: &'a S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &'a S {
        self.store
    }
}

impl<S: RemoteStore> Drop for StoreSession<'_, S> {
    fn drop(&mut self) {
        self.store.close();
    }
}

pub struct HttpRemoteStore {
    client: Client,
    endpoint: String,
    max_retries: usize,
    closed: AtomicBool,
}

impl HttpRemoteStore {
    pub fn new(config: &Config) -> Result<Self, GfetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("gfetch/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| GfetchError::Transfer(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| GfetchError::Transfer(err.to_string()))?;

        Ok(Self {
            client,
            endpoint: normalize_endpoint(&config.endpoint),
            max_retries: config.max_retries,
            closed: AtomicBool::new(false),
        })
    }

    pub fn url(&self, remote_path: &str) -> String {
        format!("{}/{}", self.endpoint, remote_path.trim_start_matches('/'))
    }

    fn send_with_retries(&self, url: &str) -> Result<Response, GfetchError> {
        let mut attempt = 0usize;
        loop {
            match self.client.get(url).send() {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if attempt < self.max_retries && is_retryable_status(status) {
                        tracing::debug!(url, status, attempt, "retrying");
                        backoff(attempt);
                        attempt += 1;
                        continue;
                    }
                    return Ok(resp);
                }
                Err(err) => {
                    if attempt < self.max_retries && is_retryable_error(&err) {
                        tracing::debug!(url, attempt, error = %err, "retrying");
                        backoff(attempt);
                        attempt += 1;
                        continue;
                    }
                    return Err(GfetchError::Transfer(err.to_string()));
                }
            }
        }
    }

    fn write_response_to_file(
        &self,
        mut response: Response,
        destination: &Path,
    ) -> Result<(), GfetchError> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "request failed".to_string());
            return Err(GfetchError::Status { status, message });
        }

        let parent = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = tempfile::Builder::new()
            .prefix("gfetch-download")
            .tempfile_in(parent)
            .map_err(|err| GfetchError::Filesystem(err.to_string()))?;
        std::io::copy(&mut response, temp.as_file_mut())
            .map_err(|err| GfetchError::Transfer(err.to_string()))?;
        temp.persist(destination)
            .map_err(|err| GfetchError::Filesystem(err.to_string()))?;
        Ok(())
    }
}

impl RemoteStore for HttpRemoteStore {
    fn download(&self, remote_path: &str, local_path: &Path) -> Result<(), GfetchError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(GfetchError::Transfer("remote store is closed".to_string()));
        }
        let url = self.url(remote_path);
        tracing::debug!(%url, destination = %local_path.display(), "download");
        let response = self.send_with_retries(&url)?;
        self.write_response_to_file(response, local_path)
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::debug!(endpoint = %self.endpoint, "closed remote store");
        }
    }
}

pub fn normalize_endpoint(endpoint: &str) -> String {
    let endpoint = endpoint.trim().trim_end_matches('/');
    if let Some(host) = endpoint.strip_prefix("ftp://") {
        return format!("https://{host}");
    }
    if !endpoint.contains("://") {
        return format!("https://{endpoint}");
    }
    endpoint.to_string()
}

fn backoff(attempt: usize) {
    thread::sleep(Duration::from_millis(BASE_DELAY_MS * (attempt as u64 + 1)));
}

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}
