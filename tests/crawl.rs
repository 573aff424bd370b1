use imdb_scrap::{config::CrawlConfig, crawl::Crawler, Error, MovieRecord};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DETAIL: &str = include_str!("fixtures/detail.html");
const DETAIL_SPARSE: &str = include_str!("fixtures/detail_sparse.html");
const USER_AGENT: &str = "TestBot/1.0";

const FIRST_LISTING: &str = r#"<html><body>
  <div class="desc"><a href="/list2" class="lister-page-next next-page">Next</a></div>
  <h3 class="lister-item-header"><span>1.</span><a href="/title/tt1/">One</a></h3>
  <h3 class="lister-item-header"><span>2.</span><a href="/title/tt2/">Two</a></h3>
  <h3 class="lister-item-header">
    <span>3.</span><a href="https://www.imdb.com/title/tt9/">Nine</a>
  </h3>
  <div class="desc"><a href="/list2" class="lister-page-next next-page">Next</a></div>
</body></html>"#;

const LAST_LISTING: &str = r#"<html><body>
  <h3 class="lister-item-header"><span>4.</span><a href="/title/tt3/">Three</a></h3>
  <h3 class="lister-item-header"><span>5.</span><a href="/title/tt1/">One again</a></h3>
</body></html>"#;

async fn mount(server: &MockServer, at: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

async fn archive() -> MockServer {
    let server = MockServer::start().await;
    mount(&server, "/list", 200, FIRST_LISTING).await;
    mount(&server, "/list2", 200, LAST_LISTING).await;
    mount(&server, "/title/tt1/", 200, DETAIL).await;
    mount(&server, "/title/tt2/", 404, "gone").await;
    mount(&server, "/title/tt3/", 200, DETAIL_SPARSE).await;
    server
}

fn config(server: &MockServer, dir: &TempDir) -> CrawlConfig {
    CrawlConfig {
        seed_url: format!("{}/list", server.uri()),
        allowed_domains: vec!["127.0.0.1".to_string()],
        user_agent: USER_AGENT.to_string(),
        out_path: dir.path().join("movies.jsonl"),
        max_pages: None,
        concurrency: 2,
    }
}

fn read_records(dir: &TempDir) -> Vec<MovieRecord> {
    let raw = std::fs::read_to_string(dir.path().join("movies.jsonl")).unwrap();
    let mut records: Vec<MovieRecord> = raw
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    records.sort_by(|a, b| a.movie_url.cmp(&b.movie_url));
    records
}

#[tokio::test]
async fn crawls_listing_pages_and_details() {
    let server = archive().await;
    let dir = TempDir::new().unwrap();
    let crawler = Crawler::new(config(&server, &dir)).unwrap();

    let stats = crawler.run().await.unwrap();
    assert_eq!(stats.pages, 4);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.records, 2);
    assert_eq!(stats.offsite, 1);
    assert_eq!(stats.duplicates, 1);

    let records = read_records(&dir);
    assert_eq!(records.len(), 2);

    let full = &records[0];
    assert_eq!(full.movie_url, format!("{}/title/tt1/", server.uri()));
    assert_eq!(full.title.as_deref(), Some("The Shawshank Redemption"));
    assert_eq!(full.rating.as_deref(), Some("9.3"));
    assert_eq!(full.user_agent, USER_AGENT);

    let sparse = &records[1];
    assert_eq!(sparse.movie_url, format!("{}/title/tt3/", server.uri()));
    assert_eq!(sparse.title.as_deref(), Some("Untitled"));
    assert_eq!(sparse.missing_fields(), 4);
}

#[tokio::test]
async fn every_request_carries_the_configured_user_agent() {
    let server = archive().await;
    let dir = TempDir::new().unwrap();
    Crawler::new(config(&server, &dir)).unwrap().run().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    // Seed, second listing and three detail pages. tt1 is only requested once.
    assert_eq!(requests.len(), 5);
    for request in &requests {
        let ua = request.headers.get("user-agent").unwrap();
        assert_eq!(ua.to_str().unwrap(), USER_AGENT, "{}", request.url);
    }
}

#[tokio::test]
async fn page_limit_stops_after_the_seed() {
    let server = archive().await;
    let dir = TempDir::new().unwrap();
    let crawler = Crawler::new(CrawlConfig {
        max_pages: Some(1),
        ..config(&server, &dir)
    })
    .unwrap();

    let stats = crawler.run().await.unwrap();
    assert_eq!(stats.pages, 1);
    assert_eq!(stats.records, 0);
    assert!(read_records(&dir).is_empty());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn unreachable_seed_is_counted_not_fatal() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let crawler = Crawler::new(config(&server, &dir)).unwrap();

    let stats = crawler.run().await.unwrap();
    assert_eq!(stats.pages, 0);
    assert_eq!(stats.failed, 1);
}

#[tokio::test]
async fn unwritable_output_fails_before_any_request() {
    let server = archive().await;
    let dir = TempDir::new().unwrap();
    let crawler = Crawler::new(CrawlConfig {
        out_path: dir.path().join("no_such_dir").join("movies.jsonl"),
        ..config(&server, &dir)
    })
    .unwrap();

    let res = crawler.run().await;
    assert!(matches!(res, Err(Error::Io(_))), "got {res:?}");
    assert!(server.received_requests().await.unwrap().is_empty());
}
