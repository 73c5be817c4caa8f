use std::sync::LazyLock;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::directory::CompanyTarget;
use crate::error::FetchFailure;

/// Everything outside the RFC 3986 unreserved set gets encoded.
const SLUG: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());

pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// One GET, no retries. Non-2xx statuses come back as responses; the
/// fetcher decides what counts as failure.
pub trait Transport {
    fn get(&self, url: &Url) -> Result<TransportResponse, FetchFailure>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent).context("user agent is not a valid header value")?,
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("es-PE,es;q=0.9,en;q=0.8"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &Url) -> Result<TransportResponse, FetchFailure> {
        let failure = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchFailure::Timeout { url: url.to_string() }
            } else {
                FetchFailure::Transport {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        };

        let resp = self.client.get(url.clone()).send().map_err(failure)?;
        let status = resp.status().as_u16();
        let body = resp.text().map_err(failure)?;
        Ok(TransportResponse { status, body })
    }
}

/// `<base>/empresa/<slug>` with the slug UTF-8 percent-encoded. Slugs that
/// arrive already encoded are decoded first so they are not encoded twice.
pub fn company_url(base: &Url, slug: &str) -> Url {
    let decoded = percent_decode_str(slug).decode_utf8_lossy();
    let encoded = utf8_percent_encode(&decoded, SLUG);

    let mut url = base.clone();
    let prefix = base.path().trim_end_matches('/');
    url.set_path(&format!("{prefix}/empresa/{encoded}"));
    url.set_query(None);
    url.set_fragment(None);
    url
}

#[derive(Debug)]
pub struct ParsedPage {
    pub url: Url,
    pub document: Html,
}

impl ParsedPage {
    pub fn new(url: Url, body: &str) -> Self {
        ParsedPage {
            url,
            document: Html::parse_document(body),
        }
    }

    pub fn title(&self) -> Option<String> {
        self.document
            .select(&TITLE)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

/// Sequential page fetcher with a fixed courtesy delay between requests.
pub struct Fetcher<T: Transport> {
    transport: T,
    base_url: Url,
    delay: Duration,
    last_request: Option<Instant>,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, base_url: Url, delay: Duration) -> Self {
        Fetcher {
            transport,
            base_url,
            delay,
            last_request: None,
        }
    }

    pub fn url_for(&self, target: &CompanyTarget) -> Url {
        company_url(&self.base_url, &target.identifier)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn fetch(&mut self, target: &CompanyTarget) -> Result<ParsedPage, FetchFailure> {
        let url = self.url_for(target);
        let body = self.fetch_url(&url)?;
        Ok(ParsedPage::new(url, &body))
    }

    /// Body of any page on the site, under the same delay and status rules.
    pub fn fetch_url(&mut self, url: &Url) -> Result<String, FetchFailure> {
        self.wait_turn();

        debug!("GET {}", url);
        let resp = self.transport.get(url);
        self.last_request = Some(Instant::now());
        let resp = resp?;

        if !(200..300).contains(&resp.status) {
            return Err(FetchFailure::Status {
                status: resp.status,
                url: url.to_string(),
            });
        }
        Ok(resp.body)
    }

    fn wait_turn(&self) {
        if let Some(last) = self.last_request {
            let remaining = self.delay.saturating_sub(last.elapsed());
            if !remaining.is_zero() {
                thread::sleep(remaining);
            }
        }
    }
}
