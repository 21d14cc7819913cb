//! `web_read` / `web_post`: plain HTTP against arbitrary grid sites.

use crate::errors::GridError;
use crate::utils::http::{http_client, read_capped_text};
use crate::utils::regex::RegexPatterns;
use crate::utils::truncate_chars;
use reqwest::{Client, RequestBuilder, Response};
use scraper::Html;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;
use url::Url;

const SERVICE: &str = "web";
const MAX_ERROR_BODY_CHARS: usize = 300;

pub struct WebClient {
    client: Client,
    max_bytes: usize,
    /// Parent domain of the identity service; bearer credentials are only
    /// sent to hosts inside it.
    grid_domain: Option<String>,
}

impl WebClient {
    pub fn new(timeout: Duration, max_bytes: usize, identity_url: &str) -> Self {
        Self {
            client: http_client(timeout),
            max_bytes,
            grid_domain: grid_domain(identity_url),
        }
    }

    /// Fetch `raw_url` and return its readable text.
    pub async fn read(&self, raw_url: &str, credential: Option<&str>) -> Result<String, GridError> {
        let url = normalize_url(raw_url)?;
        let req = self.authorize(self.client.get(url.clone()), &url, credential);
        let resp = self.send(req).await?;
        let is_html = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .is_some_and(|ct| ct.contains("html"));
        let body = self.body(resp).await?;
        debug!("web_read {} ({} bytes, html={})", url, body.len(), is_html);

        if is_html || body.trim_start().starts_with('<') {
            Ok(extract_text(&body))
        } else {
            Ok(body)
        }
    }

    /// Submit `data` as a form POST and return the raw response body.
    pub async fn post(
        &self,
        raw_url: &str,
        data: &Map<String, Value>,
        credential: Option<&str>,
    ) -> Result<String, GridError> {
        let url = normalize_url(raw_url)?;
        let req = self
            .authorize(self.client.post(url.clone()), &url, credential)
            .form(&form_fields(data));
        let resp = self.send(req).await?;
        self.body(resp).await
    }

    fn authorize(&self, req: RequestBuilder, url: &Url, credential: Option<&str>) -> RequestBuilder {
        match credential {
            Some(token) if self.in_grid(url) => req.bearer_auth(token),
            _ => req,
        }
    }

    fn in_grid(&self, url: &Url) -> bool {
        let (Some(domain), Some(host)) = (self.grid_domain.as_deref(), url.host_str()) else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        host == domain || host.ends_with(&format!(".{domain}"))
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, GridError> {
        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                GridError::Timeout {
                    service: SERVICE.to_string(),
                }
            } else {
                GridError::Transport {
                    service: SERVICE.to_string(),
                    message: e.to_string(),
                }
            }
        })?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GridError::Backend {
                service: SERVICE.to_string(),
                status: status.as_u16(),
                message: truncate_chars(body.trim(), MAX_ERROR_BODY_CHARS).to_string(),
            });
        }
        Ok(resp)
    }

    async fn body(&self, resp: Response) -> Result<String, GridError> {
        read_capped_text(resp, self.max_bytes)
            .await
            .map_err(|e| GridError::Transport {
                service: SERVICE.to_string(),
                message: e.to_string(),
            })
    }
}

/// Prefix `http://` when no scheme is given; only http(s) is allowed.
pub fn normalize_url(raw: &str) -> Result<Url, GridError> {
    let raw = raw.trim();
    let candidate = match raw.split_once("://") {
        Some((scheme, _))
            if scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https") =>
        {
            raw.to_string()
        }
        Some((scheme, _)) if !scheme.is_empty() && !scheme.contains(['/', '.', '?']) => {
            return Err(GridError::invalid_arguments(
                "web",
                format!("unsupported scheme \"{scheme}\" in \"{raw}\""),
            ));
        }
        _ => format!("http://{raw}"),
    };
    let url = Url::parse(&candidate)
        .map_err(|e| GridError::invalid_arguments("web", format!("bad url \"{raw}\": {e}")))?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(GridError::invalid_arguments(
            "web",
            format!("url \"{raw}\" has no host"),
        ));
    }
    Ok(url)
}

/// Visible text of an HTML document, one trimmed text node per line.
pub fn extract_text(html: &str) -> String {
    let without_scripts = RegexPatterns::html_script().replace_all(html, "");
    let cleaned = RegexPatterns::html_style().replace_all(&without_scripts, "");
    let document = Html::parse_document(&cleaned);
    document
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn form_fields(data: &Map<String, Value>) -> Vec<(String, String)> {
    data.iter()
        .map(|(k, v)| {
            let value = match v {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (k.clone(), value)
        })
        .collect()
}

fn grid_domain(identity_url: &str) -> Option<String> {
    let url = Url::parse(identity_url).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    match host.split_once('.') {
        Some((_, parent)) if !parent.is_empty() => Some(parent.to_string()),
        _ => Some(host),
    }
}
