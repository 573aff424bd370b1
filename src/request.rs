use reqwest::{
    header::{HeaderMap, HeaderValue, USER_AGENT},
    Client, Proxy, Url,
};

use crate::config::ProfileConfig;
use crate::{Error, Result, EXCERPT_LEN};

/// A request waiting in the crawl frontier.
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    pub url: Url,
    pub headers: HeaderMap,
    /// Index of the rule whose link extractor produced this request, `None` for the seed.
    pub rule: Option<usize>,
}

impl CrawlRequest {
    pub fn new(url: Url, rule: Option<usize>) -> Self {
        Self {
            url,
            headers: HeaderMap::new(),
            rule,
        }
    }

    /// Current `User-Agent` header, empty if unset or not valid UTF-8.
    pub fn user_agent(&self) -> &str {
        self.headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }
}

/// Overwrites the `User-Agent` of an outgoing request, whatever it held before.
pub fn set_user_agent(mut request: CrawlRequest, user_agent: &HeaderValue) -> CrawlRequest {
    request.headers.insert(USER_AGENT, user_agent.clone());
    request
}

pub fn user_agent_header(user_agent: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(user_agent)
        .map_err(|_| Error::Config(format!("invalid User-Agent header value: {user_agent:?}")))
}

/// A fetched page together with the request that produced it.
#[derive(Debug)]
pub struct FetchedPage {
    pub request: CrawlRequest,
    /// Final url after redirects.
    pub url: Url,
    pub body: String,
}

/// Requests a page and returns the HTML. Anything but a 2xx is an error.
pub(crate) async fn request_page_html(
    client: Client,
    request: CrawlRequest,
) -> Result<FetchedPage> {
    let res = client
        .get(request.url.clone())
        .headers(request.headers.clone())
        .send()
        .await?;
    let status = res.status();
    let url = res.url().clone();
    let body = res.text().await?;
    if !status.is_success() {
        return Err(Error::Status {
            status: status.as_u16(),
            excerpt: excerpt(&body),
        });
    }
    Ok(FetchedPage { request, url, body })
}

/// Client for the profile fetch: fixed timeout, browser User-Agent and the optional proxy.
pub fn profile_client(config: &ProfileConfig) -> Result<Client> {
    let mut builder = Client::builder()
        .timeout(config.timeout)
        .user_agent(user_agent_header(&config.user_agent)?);
    if let Some(proxy) = &config.proxy {
        let proxy = Proxy::all(proxy.url())?.basic_auth(&proxy.username, &proxy.password);
        builder = builder.proxy(proxy);
    } else {
        builder = builder.no_proxy();
    }
    Ok(builder.build()?)
}

/// With a proxy configured every connection goes to the proxy first (tunnel setup included),
/// so connect failures are its fault.
pub(crate) fn classify_send_error(err: reqwest::Error, proxied: bool) -> Error {
    if proxied && err.is_connect() {
        Error::Proxy(err)
    } else {
        Error::Reqwest(err)
    }
}

/// First `EXCERPT_LEN` characters of a body.
pub(crate) fn excerpt(body: &str) -> String {
    body.chars().take(EXCERPT_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_agent_is_overwritten() {
        let url = Url::parse("https://web.archive.org/web/1/https://www.imdb.com/").unwrap();
        let mut req = CrawlRequest::new(url, Some(0));
        req.headers
            .insert(USER_AGENT, HeaderValue::from_static("Scrapy/2.11"));
        let ua = user_agent_header("Your User-Agent").unwrap();

        let req = set_user_agent(req, &ua);
        assert_eq!(req.user_agent(), "Your User-Agent");
        assert_eq!(req.headers.get_all(USER_AGENT).iter().count(), 1);
        assert_eq!(req.rule, Some(0));
    }

    #[test]
    fn user_agent_is_set_on_a_bare_request() {
        let url = Url::parse("https://web.archive.org/").unwrap();
        let req = CrawlRequest::new(url, None);
        assert_eq!(req.user_agent(), "");
        let req = set_user_agent(req, &HeaderValue::from_static("ua"));
        assert_eq!(req.user_agent(), "ua");
    }

    #[test]
    fn newline_in_user_agent_is_rejected() {
        assert!(matches!(user_agent_header("bad\nagent"), Err(Error::Config(_))));
    }

    #[test]
    fn excerpt_counts_chars_not_bytes() {
        let body = "é".repeat(EXCERPT_LEN + 10);
        assert_eq!(excerpt(&body).chars().count(), EXCERPT_LEN);
        assert_eq!(excerpt("short"), "short");
    }
}
