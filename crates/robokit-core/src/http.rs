//! Blocking HTTP GET over libcurl.
//!
//! Shared by the feed fetcher and the artifact downloader. Redirects are
//! followed; there is no retry and no overall timeout. The only limit is an
//! optional connect timeout from configuration.

use std::fmt;
use std::io;
use std::time::Duration;

const MAX_REDIRECTS: u32 = 10;
const DEFAULT_USER_AGENT: &str = concat!("robokit/", env!("CARGO_PKG_VERSION"));

/// Per-request options taken from the `[http]` config section.
#[derive(Debug, Clone, Default)]
pub struct HttpOptions {
    pub connect_timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

/// Why a GET did not produce a usable body.
#[derive(Debug)]
pub enum HttpFailure {
    /// Curl reported an error (DNS, connection, TLS, too many redirects).
    Transport(curl::Error),
    /// Final response had a non-2xx status.
    Status(u32),
    /// The local sink refused the body (disk full, permission denied).
    Sink(io::Error),
}

impl fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpFailure::Transport(e) => write!(f, "{}", e),
            HttpFailure::Status(code) => write!(f, "HTTP {}", code),
            HttpFailure::Sink(e) => write!(f, "write: {}", e),
        }
    }
}

impl std::error::Error for HttpFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HttpFailure::Transport(e) => Some(e),
            HttpFailure::Sink(e) => Some(e),
            HttpFailure::Status(_) => None,
        }
    }
}

impl From<curl::Error> for HttpFailure {
    fn from(e: curl::Error) -> Self {
        HttpFailure::Transport(e)
    }
}

/// GETs `url` and hands each body chunk to `sink`. Returns the number of body bytes delivered.
///
/// The body of an error response is still delivered before the status is
/// checked, so sinks must not treat their output as valid until this returns `Ok`.
pub fn get<F>(url: &str, opts: &HttpOptions, mut sink: F) -> Result<u64, HttpFailure>
where
    F: FnMut(&[u8]) -> io::Result<()>,
{
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.get(true)?;
    easy.follow_location(true)?;
    easy.max_redirections(MAX_REDIRECTS)?;
    if let Some(timeout) = opts.connect_timeout {
        easy.connect_timeout(timeout)?;
    }
    easy.useragent(opts.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT))?;

    let mut received = 0u64;
    let mut sink_error: Option<io::Error> = None;
    let performed = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match sink(data) {
            Ok(()) => {
                received += data.len() as u64;
                Ok(data.len())
            }
            Err(e) => {
                sink_error = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()
    };

    if let Some(e) = sink_error {
        return Err(HttpFailure::Sink(e));
    }
    performed?;

    let code = easy.response_code()?;
    tracing::debug!(url, code, bytes = received, "GET finished");
    if !(200..300).contains(&code) {
        return Err(HttpFailure::Status(code));
    }
    Ok(received)
}

/// GETs `url` into memory.
pub fn get_bytes(url: &str, opts: &HttpOptions) -> Result<Vec<u8>, HttpFailure> {
    let mut body = Vec::new();
    get(url, opts, |chunk| {
        body.extend_from_slice(chunk);
        Ok(())
    })?;
    Ok(body)
}
