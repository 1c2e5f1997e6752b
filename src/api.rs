// API client module: a small blocking HTTP client for a node's RPC
// interface. It builds the upload bodies, sends them, and turns the
// node's answers into typed results or `IpfsError`s.

use crate::error::{IpfsError, Result};
use crate::multipart::MultipartBuilder;
use reqwest::blocking::{Client as HttpClient, Response};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Read};
use std::path::Path;
use std::time::Duration;

/// Address of a node running on this machine with default settings.
pub const DEFAULT_LOCAL_URL: &str = "http://127.0.0.1:5001";
/// Deadline used by `Client::local`.
pub const DEFAULT_TIMEOUT_SECS: u64 = 4;

/// RPC endpoints used by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Add,
    Cat,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Add => "/api/v0/add",
            Endpoint::Cat => "/api/v0/cat",
        }
    }
}

/// One entry of an add response. The node reports the size as a string
/// and it is kept that way.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadResult {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Hash")]
    pub hash: String,
    #[serde(rename = "Size")]
    pub size: String,
}

impl fmt::Display for UploadResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({} bytes)", self.hash, self.name, self.size)
    }
}

/// Content returned by `cat`. Reading it pulls bytes from the open
/// connection; dropping it closes the connection.
pub struct CatStream {
    response: Response,
}

impl CatStream {
    /// Length announced by the node, when it sent one.
    pub fn content_length(&self) -> Option<u64> {
        self.response.content_length()
    }

    /// Read the remaining content into memory.
    pub fn into_bytes(mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.response.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl Read for CatStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.response.read(buf)
    }
}

impl fmt::Debug for CatStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatStream")
            .field("status", &self.response.status())
            .field("content_length", &self.response.content_length())
            .finish()
    }
}

/// Blocking client bound to one node. Immutable once built; clones share
/// the underlying connection pool and can be used from several threads.
#[derive(Clone, Debug)]
pub struct Client {
    http: HttpClient,
    base_url: String,
}

impl Client {
    /// Create a client for the node at `base_url`. `timeout_secs` bounds each
    /// whole exchange, connect and read included; `0` means no deadline.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let http = HttpClient::builder()
            .user_agent(concat!("ipfs-rpc-client/", env!("CARGO_PKG_VERSION")))
            .timeout((timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)))
            .build()
            .map_err(IpfsError::Network)?;
        tracing::debug!(%base_url, timeout_secs, "created client");
        Ok(Client { http, base_url })
    }

    /// Client for a node on localhost with the default 4 second deadline.
    pub fn local() -> Result<Self> {
        Client::new(DEFAULT_LOCAL_URL, DEFAULT_TIMEOUT_SECS)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of an endpoint on this node.
    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Upload a file or a directory tree and return the first entry the node
    /// reports. The node pins added content by default.
    pub fn add(&self, path: impl AsRef<Path>) -> Result<UploadResult> {
        let mut results = self.add_all(path)?;
        Ok(results.remove(0))
    }

    /// Upload a file or a directory tree and return every entry the node
    /// reports, in response order.
    pub fn add_all(&self, path: impl AsRef<Path>) -> Result<Vec<UploadResult>> {
        let builder = MultipartBuilder::from_path(path.as_ref())?;
        self.send_add(builder)
    }

    /// Upload the content of `reader` under `file_name`. The reader is
    /// consumed to EOF but stays owned, and open, on the caller's side.
    pub fn add_binary<R: Read + ?Sized>(&self, reader: &mut R, file_name: &str) -> Result<UploadResult> {
        let mut builder = MultipartBuilder::new();
        builder
            .add_reader(file_name, reader)
            .map_err(|e| IpfsError::io(file_name, e))?;
        let mut results = self.send_add(builder)?;
        Ok(results.remove(0))
    }

    /// Fetch the content addressed by `cid`. The caller owns the returned
    /// stream; a non-2xx answer is reported as an error instead.
    pub fn cat(&self, cid: &str) -> Result<CatStream> {
        let url = self.endpoint_url(Endpoint::Cat);
        tracing::debug!(%url, cid, "cat");
        let response = self
            .http
            .post(&url)
            .query(&[("arg", cid)])
            .send()
            .map_err(|e| IpfsError::from_transport(&url, e))?;
        let response = check_status(&url, response)?;
        Ok(CatStream { response })
    }

    fn send_add(&self, builder: MultipartBuilder) -> Result<Vec<UploadResult>> {
        let url = self.endpoint_url(Endpoint::Add);
        tracing::debug!(
            %url,
            parts = builder.part_count(),
            bytes = builder.content_bytes(),
            boundary = builder.boundary(),
            "sending add request"
        );

        let response = self
            .http
            .post(&url)
            .multipart(builder.finish())
            .send()
            .map_err(|e| IpfsError::from_transport(&url, e))?;
        let response = check_status(&url, response)?;
        let text = response
            .text()
            .map_err(|e| IpfsError::from_transport(&url, e))?;

        let results = parse_add_response(&text)?;
        for result in &results {
            tracing::info!(name = %result.name, hash = %result.hash, size = %result.size, "added");
        }
        Ok(results)
    }
}

/// Pass 2xx responses through; turn anything else into an error carrying
/// the status and body.
fn check_status(url: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    tracing::warn!(url, status = status.as_u16(), "node returned an error status");
    Err(IpfsError::from_status(status.as_u16(), body))
}

/// The add endpoint answers with one JSON object per line, one per added
/// entry. Every non-blank line must decode.
fn parse_add_response(text: &str) -> Result<Vec<UploadResult>> {
    let results = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            serde_json::from_str::<UploadResult>(line).map_err(|e| IpfsError::Decode {
                line: line.to_string(),
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    if results.is_empty() {
        return Err(IpfsError::Decode {
            line: String::new(),
            reason: "empty response body".into(),
        });
    }
    Ok(results)
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let invalid = |reason: String| IpfsError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let parsed = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme {:?}", other))),
    }
    if parsed.cannot_be_a_base() || parsed.host_str().is_none() {
        return Err(invalid("missing host".into()));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed".into()));
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}
