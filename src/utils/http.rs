use anyhow::Result;
use reqwest::{Client, Response};
use std::time::Duration;

/// Default cap on page bodies read by the hub (2 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

const USER_AGENT: &str = concat!("gridhub/", env!("CARGO_PKG_VERSION"));

/// Build a `reqwest::Client` with a fixed overall timeout.
///
/// The connect timeout is capped at the overall timeout. Falls back to the
/// default client if the builder fails.
pub fn http_client(timeout: Duration) -> Client {
    Client::builder()
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Read at most `max_bytes` of the body, then stop pulling from the
/// connection. Returns `(bytes, was_truncated)`.
pub async fn read_capped(mut resp: Response, max_bytes: usize) -> Result<(Vec<u8>, bool)> {
    let hint = resp
        .content_length()
        .map_or(0, |len| usize::try_from(len).unwrap_or(usize::MAX));
    let mut buf = Vec::with_capacity(hint.min(max_bytes));
    while let Some(chunk) = resp.chunk().await? {
        let room = max_bytes - buf.len();
        if chunk.len() > room {
            buf.extend_from_slice(&chunk[..room]);
            return Ok((buf, true));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok((buf, false))
}

/// [`read_capped`], lossily decoded. A cut in the middle of a multi-byte
/// sequence shows up as one replacement character.
pub async fn read_capped_text(resp: Response, max_bytes: usize) -> Result<String> {
    let (bytes, truncated) = read_capped(resp, max_bytes).await?;
    if truncated {
        tracing::debug!("response body capped at {} bytes", max_bytes);
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
