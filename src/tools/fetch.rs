use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

use futures_util::StreamExt;
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use reqwest::{redirect::Policy, Client, Url};

use super::html::{html_to_text, truncate_chars};
use crate::core::config::FetchSettings;
use crate::core::errors::AgentError;

const MAX_REDIRECTS: usize = 5;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage {
    pub url: String,
    pub text: String,
}

/// Pages that produced text, in request order.
#[derive(Debug, Clone, Default)]
pub struct FetchedContent {
    pub pages: Vec<FetchedPage>,
}

impl FetchedContent {
    /// Page texts joined by a single space; empty when nothing was fetched.
    pub fn blob(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn sources(&self) -> Vec<String> {
        self.pages.iter().map(|page| page.url.clone()).collect()
    }
}

#[derive(Clone)]
pub struct ContentFetcher {
    client: Client,
    settings: FetchSettings,
}

impl ContentFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, AgentError> {
        let mut builder = Client::builder()
            .redirect(redirect_policy(&settings))
            .timeout(settings.timeout)
            .connect_timeout(settings.timeout);
        if settings.block_private_hosts {
            builder = builder.dns_resolver(Arc::new(PublicOnlyResolver));
        }
        let client = builder.build().map_err(AgentError::internal)?;
        Ok(Self { client, settings })
    }

    /// Fetches every URL in order. Failures are logged and skipped so the
    /// remaining pages still contribute.
    pub async fn fetch_all(&self, urls: &[String]) -> FetchedContent {
        let mut content = FetchedContent::default();
        for url in urls {
            match self.fetch_page(url).await {
                Ok(text) if text.is_empty() => {
                    tracing::info!("No extractable text at {}", url);
                }
                Ok(text) => {
                    tracing::info!("Fetched {} ({} chars)", url, text.chars().count());
                    content.pages.push(FetchedPage {
                        url: url.clone(),
                        text,
                    });
                }
                Err(err) => {
                    tracing::warn!("Error fetching {}: {}", url, err);
                }
            }
        }
        content
    }

    /// Fetches one page and returns its visible text, capped at `max_chars`.
    pub async fn fetch_page(&self, url: &str) -> Result<String, AgentError> {
        let parsed = Url::parse(url.trim())
            .map_err(|e| AgentError::BadRequest(format!("invalid URL {}: {}", url, e)))?;
        let scheme = parsed.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(AgentError::BadRequest(
                "Only http/https URLs are supported".to_string(),
            ));
        }

        if self.settings.block_private_hosts {
            validate_fetch_target(&self.settings, &parsed).await?;
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(AgentError::provider)?;
        if !response.status().is_success() {
            return Err(AgentError::Provider(format!(
                "Fetch failed: {}",
                response.status()
            )));
        }

        let max_bytes = self.settings.max_bytes;
        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(AgentError::provider)?;
            if bytes.len().saturating_add(chunk.len()) > max_bytes {
                return Err(AgentError::BadRequest(format!(
                    "Fetched content exceeded max size of {} bytes",
                    max_bytes
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        let html = String::from_utf8_lossy(&bytes);
        let text = html_to_text(&html);
        Ok(truncate_chars(&text, self.settings.max_chars).to_string())
    }
}

/// Follows up to `MAX_REDIRECTS` hops, refusing hops that land on a
/// denylisted host or a literal private address. Hostnames on every hop go
/// through `PublicOnlyResolver` when connecting.
fn redirect_policy(settings: &FetchSettings) -> Policy {
    if !settings.block_private_hosts {
        return Policy::limited(MAX_REDIRECTS);
    }
    let denylist = settings.url_denylist.clone();
    Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }
        let blocked = match attempt.url().host_str() {
            Some(host) => is_blocked_host(host, &denylist),
            None => true,
        };
        if blocked {
            attempt.error("redirect to a blocked host")
        } else {
            attempt.follow()
        }
    })
}

async fn validate_fetch_target(settings: &FetchSettings, parsed: &Url) -> Result<(), AgentError> {
    let host = parsed
        .host_str()
        .ok_or_else(|| AgentError::BadRequest("URL host is missing".to_string()))?;

    if is_blocked_host(host, &settings.url_denylist) {
        return Err(AgentError::Forbidden(format!("host {} is blocked", host)));
    }
    if parse_host_ip(host).is_some() {
        return Ok(());
    }

    resolve_public(host).await.map(|_| ())
}

/// DNS resolver for the guarded client. Connections to a name that resolves
/// to any private address are refused.
struct PublicOnlyResolver;

impl Resolve for PublicOnlyResolver {
    fn resolve(&self, name: Name) -> Resolving {
        Box::pin(async move {
            let addrs = resolve_public(name.as_str()).await?;
            Ok::<Addrs, BoxError>(Box::new(addrs.into_iter()))
        })
    }
}

async fn resolve_public(host: &str) -> Result<Vec<SocketAddr>, AgentError> {
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, 0))
        .await
        .map_err(AgentError::provider)?
        .collect();
    if addrs.is_empty() {
        return Err(AgentError::BadRequest(format!(
            "host {} could not be resolved",
            host
        )));
    }
    if addrs.iter().any(|addr| is_blocked_ip(addr.ip())) {
        return Err(AgentError::Forbidden(format!(
            "host {} resolves to a private address",
            host
        )));
    }
    Ok(addrs)
}

fn is_blocked_host(host: &str, denylist: &[String]) -> bool {
    if denylist
        .iter()
        .any(|pattern| host_matches_pattern(host, pattern))
    {
        return true;
    }
    parse_host_ip(host).is_some_and(is_blocked_ip)
}

/// `Url::host_str` keeps the brackets around IPv6 literals.
fn parse_host_ip(host: &str) -> Option<IpAddr> {
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .ok()
}

fn is_blocked_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_blocked_ipv4(v4),
        IpAddr::V6(v6) => is_blocked_ipv6(v6),
    }
}

fn is_blocked_ipv4(ip: Ipv4Addr) -> bool {
    if ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_broadcast()
        || ip.is_unspecified()
        || ip.is_multicast()
    {
        return true;
    }
    // Shared (CGNAT), benchmarking, documentation, "this network" and reserved.
    matches!(
        ip.octets(),
        [100, 64..=127, _, _]
            | [198, 18..=19, _, _]
            | [192, 0, 2, _]
            | [198, 51, 100, _]
            | [203, 0, 113, _]
            | [0, _, _, _]
            | [240..=255, _, _, _]
    )
}

fn is_blocked_ipv6(ip: Ipv6Addr) -> bool {
    if let Some(mapped) = ip.to_ipv4_mapped() {
        return is_blocked_ipv4(mapped);
    }

    let segments = ip.segments();
    ip.is_loopback()
        || ip.is_unspecified()
        || ip.is_multicast()
        || (segments[0] & 0xfe00) == 0xfc00
        || (segments[0] & 0xffc0) == 0xfe80
        || (segments[0] == 0x2001 && segments[1] == 0x0db8)
}

/// `*.suffix` and `prefix*` wildcards, case-insensitive; anything else is
/// an exact match.
fn host_matches_pattern(host: &str, pattern: &str) -> bool {
    let host = host.to_ascii_lowercase();
    let pattern = pattern.to_ascii_lowercase();

    if let Some(suffix) = pattern.strip_prefix('*') {
        host.ends_with(suffix)
    } else if let Some(prefix) = pattern.strip_suffix('*') {
        host.starts_with(prefix)
    } else {
        host == pattern
    }
}
