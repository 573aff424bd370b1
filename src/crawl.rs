use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use chrono::Local;
use reqwest::{header::HeaderValue, Client, Url};
use scraper::Html;
use tokio::{
    fs::File,
    io::AsyncWriteExt,
    sync::mpsc,
    task::{spawn_blocking, JoinSet},
};

use crate::config::CrawlConfig;
use crate::parse::{parse_movie, LinkPattern, NEXT_PAGE_SELECTOR, TITLE_LINK_SELECTOR};
use crate::request::{
    request_page_html, set_user_agent, user_agent_header, CrawlRequest, FetchedPage,
};
use crate::{info_time, warn_time, Error, MovieRecord, Result};

/// Turns a parsed page into a record. Gets the page url and the User-Agent it was requested with.
pub(crate) type Callback = fn(&Html, &Url, &str) -> Result<MovieRecord>;

/// Which links to pull out of a page, and what to do with the pages they lead to.
pub(crate) struct Rule {
    pattern: LinkPattern,
    callback: Option<Callback>,
    /// Run the link extractors again on pages reached through this rule.
    follow: bool,
}

/// Title anchors lead to detail pages, the second pager anchor leads to the next listing page.
pub(crate) fn movie_rules() -> Result<Vec<Rule>> {
    Ok(vec![
        Rule {
            pattern: LinkPattern::all(TITLE_LINK_SELECTOR)?,
            callback: Some(parse_movie),
            follow: true,
        },
        Rule {
            pattern: LinkPattern::nth(NEXT_PAGE_SELECTOR, 1)?,
            callback: None,
            follow: true,
        },
    ])
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CrawlStats {
    /// Pages fetched and parsed.
    pub pages: usize,
    pub records: usize,
    pub failed: usize,
    /// Links dropped for pointing outside the allowed domains.
    pub offsite: usize,
    pub duplicates: usize,
}

pub struct Crawler {
    client: Client,
    config: CrawlConfig,
    rules: Arc<Vec<Rule>>,
    user_agent: HeaderValue,
}

impl Crawler {
    pub fn new(mut config: CrawlConfig) -> Result<Self> {
        if config.concurrency == 0 {
            return Err(Error::Config("crawl concurrency must be at least 1".into()));
        }
        // Url hands out lowercased hosts.
        for domain in &mut config.allowed_domains {
            *domain = domain.trim().trim_start_matches('.').to_ascii_lowercase();
        }
        Ok(Self {
            client: Client::new(),
            rules: Arc::new(movie_rules()?),
            user_agent: user_agent_header(&config.user_agent)?,
            config,
        })
    }

    /// Crawls from the seed until the frontier runs dry (or the page limit is hit),
    /// streaming every record into the output file as JSON Lines.
    pub async fn run(&self) -> Result<CrawlStats> {
        let start_time = Local::now();
        info_time!("Started crawling {}", self.config.seed_url);

        let seed = CrawlRequest::new(Url::parse(&self.config.seed_url)?, None);

        // Open the sink before the first request goes out, a bad path fails the crawl right away.
        let file = File::create(&self.config.out_path).await?;
        let (rec_tx, rec_rx) = mpsc::channel(256);
        let collect_handle = tokio::spawn(async move { collect_records(rec_rx, file).await });

        let mut stats = CrawlStats::default();
        let mut seen = HashSet::from([seed.url.to_string()]);
        let mut frontier = VecDeque::from([seed]);
        let mut in_flight = JoinSet::new();
        let mut dispatched = 0;

        loop {
            while in_flight.len() < self.config.concurrency
                && !self.page_limit_reached(dispatched)
            {
                let Some(request) = frontier.pop_front() else {
                    break;
                };
                let request = set_user_agent(request, &self.user_agent);
                dispatched += 1;
                in_flight.spawn({
                    // Client uses Arc so we can clone cheaply
                    let client = self.client.clone();
                    async move {
                        let url = request.url.clone();
                        (url, request_page_html(client, request).await)
                    }
                });
            }

            let Some(task) = in_flight.join_next().await else {
                break;
            };
            let page = match task? {
                (_, Ok(page)) => page,
                (url, Err(e)) => {
                    warn_time!("Skipping {}: {}", url, e);
                    stats.failed += 1;
                    continue;
                }
            };
            stats.pages += 1;

            let outcome = parse_page(self.rules.clone(), page).await?;
            if let Some(record) = outcome.record {
                stats.records += 1;
                if rec_tx.send(record).await.is_err() {
                    // The collector is gone, its own error says why.
                    return Err(match collect_handle.await? {
                        Err(e) => e,
                        Ok(_) => Error::RuntimeSendError,
                    });
                }
            }
            for request in outcome.requests {
                if !self.is_allowed(&request.url) {
                    stats.offsite += 1;
                    continue;
                }
                if !seen.insert(request.url.to_string()) {
                    stats.duplicates += 1;
                    continue;
                }
                frontier.push_back(request);
            }
        }

        drop(rec_tx);
        let written = collect_handle.await??;
        info_time!(
            start_time,
            "Finished crawling. {} pages, {} failed, {} records written to {}",
            stats.pages,
            stats.failed,
            written,
            self.config.out_path.display()
        );

        Ok(stats)
    }

    fn page_limit_reached(&self, dispatched: usize) -> bool {
        self.config.max_pages.is_some_and(|max| dispatched >= max)
    }

    /// An empty domain list lets everything through.
    fn is_allowed(&self, url: &Url) -> bool {
        if self.config.allowed_domains.is_empty() {
            return true;
        }
        let Some(host) = url.host_str() else {
            return false;
        };
        self.config.allowed_domains.iter().any(|domain| {
            host == domain
                || host
                    .strip_suffix(domain.as_str())
                    .is_some_and(|sub| sub.ends_with('.'))
        })
    }
}

/// What a single response produced.
#[derive(Debug, Default)]
pub(crate) struct PageOutcome {
    pub(crate) record: Option<MovieRecord>,
    pub(crate) requests: Vec<CrawlRequest>,
}

/// Runs the callback of the rule that led to this page, then, if that rule follows,
/// every rule's link extractor. The seed page is always followed.
pub(crate) async fn parse_page(rules: Arc<Vec<Rule>>, page: FetchedPage) -> Result<PageOutcome> {
    let outcome = spawn_blocking(move || -> Result<PageOutcome> {
        let doc = Html::parse_document(&page.body);
        let rule = page.request.rule.and_then(|idx| rules.get(idx));

        let record = match rule.and_then(|r| r.callback) {
            Some(callback) => Some(callback(&doc, &page.url, page.request.user_agent())?),
            None => None,
        };

        let mut requests = Vec::new();
        if rule.map_or(true, |r| r.follow) {
            for (idx, rule) in rules.iter().enumerate() {
                requests.extend(
                    rule.pattern
                        .links(&doc, &page.url)
                        .map(|url| CrawlRequest::new(url, Some(idx))),
                );
            }
        }
        Ok(PageOutcome { record, requests })
    })
    .await??;

    Ok(outcome)
}

/// Receives records and appends each one to `file` as a JSON line.
/// Returns how many were written.
async fn collect_records(mut rec_rx: mpsc::Receiver<MovieRecord>, mut file: File) -> Result<usize> {
    let mut written = 0;

    while let Some(record) = rec_rx.recv().await {
        info_time!(
            "Scraped {} ({} missing fields)",
            record.title.as_deref().unwrap_or(&record.movie_url),
            record.missing_fields()
        );
        file.write_all(record.to_json_line()?.as_bytes()).await?;
        written += 1;
    }
    file.flush().await?;

    Ok(written)
}
