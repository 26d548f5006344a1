//! Integration tests for the scraper
//!
//! These tests use wiremock to create mock HTTP servers and run sitemap
//! expansion and page crawling end-to-end with the real HTTP fetcher.

use sitemap_seo::config::{Config, CrawlerConfig};
use sitemap_seo::crawler::{
    run_scrape, ConcurrencyBudget, Coordinator, CrawlScheduler, HttpFetcher, SitemapExpander,
    UserAgentPool,
};
use sitemap_seo::{scrape_sitemap, DefaultExtractor, SeoRecord};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sitemap_index(locs: &[String]) -> String {
    let entries: String = locs
        .iter()
        .map(|loc| format!("  <sitemap><loc>{}</loc></sitemap>\n", loc))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <sitemapindex xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{}</sitemapindex>",
        entries
    )
}

fn urlset(locs: &[String]) -> String {
    let entries: String = locs
        .iter()
        .map(|loc| format!("  <url><loc>{}</loc></url>\n", loc))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{}</urlset>",
        entries
    )
}

fn html_page(title: &str, h1: &str, description: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>{}</title>
  <meta name="description" content="{}">
</head>
<body>
  <h1>{}</h1>
  <p>Body text</p>
</body>
</html>"#,
        title, description, h1
    )
}

async fn mount_xml(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "application/xml"),
        )
        .mount(server)
        .await;
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn create_test_fetcher(timeout: Duration) -> Arc<HttpFetcher> {
    Arc::new(HttpFetcher::new(timeout, UserAgentPool::default()).expect("Failed to build fetcher"))
}

fn by_url(records: Vec<SeoRecord>) -> Vec<SeoRecord> {
    let mut records = records;
    records.sort_by(|a, b| a.url.cmp(&b.url));
    records
}

#[tokio::test]
async fn test_end_to_end_sitemap_index() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_xml(
        &server,
        "/sitemap.xml",
        sitemap_index(&[format!("{}/sitemap2.xml", base)]),
    )
    .await;
    mount_xml(
        &server,
        "/sitemap2.xml",
        urlset(&[format!("{}/a.html", base), format!("{}/b.html", base)]),
    )
    .await;
    mount_html(&server, "/a.html", html_page("Page A", "Heading A", "About page A")).await;
    mount_html(&server, "/b.html", html_page("Page B", "Heading B", "About page B")).await;

    let records = scrape_sitemap(
        &format!("{}/sitemap.xml", base),
        Arc::new(DefaultExtractor::new()),
        10,
    )
    .await
    .expect("Scrape failed");

    assert_eq!(
        by_url(records),
        vec![
            SeoRecord {
                url: format!("{}/a.html", base),
                title: "Page A".to_string(),
                h1: "Heading A".to_string(),
                meta_description: "About page A".to_string(),
                status_code: 200,
            },
            SeoRecord {
                url: format!("{}/b.html", base),
                title: "Page B".to_string(),
                h1: "Heading B".to_string(),
                meta_description: "About page B".to_string(),
                status_code: 200,
            },
        ]
    );
}

#[tokio::test]
async fn test_timed_out_page_is_dropped() {
    let server = MockServer::start().await;
    let base = server.uri();

    let pages: Vec<String> = ["/one", "/two", "/slow"]
        .iter()
        .map(|p| format!("{}{}", base, p))
        .collect();
    mount_xml(&server, "/sitemap.xml", urlset(&pages)).await;
    mount_html(&server, "/one", html_page("One", "One", "")).await;
    mount_html(&server, "/two", html_page("Two", "Two", "")).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_page("Slow", "Slow", ""))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(
        create_test_fetcher(Duration::from_millis(500)),
        Arc::new(DefaultExtractor::new()),
        3,
    );
    let report = coordinator.run(&format!("{}/sitemap.xml", base)).await;

    assert_eq!(report.pages_discovered, 3);
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.crawl.failed, 1);
    assert!(!report.timed_out());
    let titles: HashSet<String> = report.records.into_iter().map(|r| r.title).collect();
    assert_eq!(titles, HashSet::from(["One".to_string(), "Two".to_string()]));
}

#[tokio::test]
async fn test_cyclic_sitemaps_fetched_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/a.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap_index(&[
            format!("{}/b.xml", base),
            format!("{}/page-a", base),
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap_index(&[
            format!("{}/a.xml", base),
            format!("{}/page-b", base),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let expander = SitemapExpander::new(
        create_test_fetcher(Duration::from_secs(5)),
        ConcurrencyBudget::new(4),
    );
    let mut pages = expander.expand(&format!("{}/a.xml", base)).await;
    pages.sort();

    assert_eq!(
        pages,
        vec![format!("{}/page-a", base), format!("{}/page-b", base)]
    );
    // MockServer verifies the expect(1) counts on drop
}

#[tokio::test]
async fn test_duplicate_urls_fetched_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page("P", "P", "D")))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/page", base);
    let records = CrawlScheduler::new(
        create_test_fetcher(Duration::from_secs(5)),
        Arc::new(DefaultExtractor::new()),
        ConcurrencyBudget::new(4),
    )
    .crawl(vec![url.clone(), url.clone(), url])
    .await;

    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_missing_page_recorded_with_status() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_xml(
        &server,
        "/sitemap.xml",
        urlset(&[format!("{}/ok", base), format!("{}/gone", base)]),
    )
    .await;
    mount_html(&server, "/ok", html_page("OK", "OK", "fine")).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(
            ResponseTemplate::new(404).set_body_string(html_page("Not Found", "404", "")),
        )
        .mount(&server)
        .await;

    let records = scrape_sitemap(
        &format!("{}/sitemap.xml", base),
        Arc::new(DefaultExtractor::new()),
        2,
    )
    .await
    .expect("Scrape failed");

    let records = by_url(records);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].url, format!("{}/gone", base));
    assert_eq!(records[0].status_code, 404);
    assert_eq!(records[0].title, "Not Found");
    assert_eq!(records[1].status_code, 200);
}

#[tokio::test]
async fn test_redirected_page_recorded_under_final_url() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_xml(&server, "/sitemap.xml", urlset(&[format!("{}/old", base)])).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/new", base).as_str()),
        )
        .mount(&server)
        .await;
    mount_html(&server, "/new", html_page("New", "New home", "Moved")).await;

    let records = scrape_sitemap(
        &format!("{}/sitemap.xml", base),
        Arc::new(DefaultExtractor::new()),
        2,
    )
    .await
    .expect("Scrape failed");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, format!("{}/new", base));
    assert_eq!(records[0].status_code, 200);
    assert_eq!(records[0].title, "New");
}

#[tokio::test]
async fn test_sitemap_with_cdata_locs() {
    let server = MockServer::start().await;
    let base = server.uri();

    let body = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n\
           <url><loc><![CDATA[{}/wrapped]]></loc></url>\n\
         </urlset>",
        base
    );
    mount_xml(&server, "/sitemap.xml", body).await;
    mount_html(&server, "/wrapped", html_page("Wrapped", "Wrapped", "")).await;

    let records = scrape_sitemap(
        &format!("{}/sitemap.xml", base),
        Arc::new(DefaultExtractor::new()),
        2,
    )
    .await
    .expect("Scrape failed");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, format!("{}/wrapped", base));
}

#[tokio::test]
async fn test_run_scrape_from_config() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_xml(&server, "/sitemap.xml", urlset(&[format!("{}/only", base)])).await;
    mount_html(&server, "/only", html_page("Only", "Only heading", "Only page")).await;

    let config = Config {
        crawler: CrawlerConfig {
            seed_url: format!("{}/sitemap.xml", base),
            concurrency: 2,
            request_timeout_secs: 5,
            deadline_secs: Some(60),
            ..CrawlerConfig::default()
        },
        ..Config::default()
    };

    let report = run_scrape(&config).await.expect("Scrape failed");

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].h1, "Only heading");
    assert_eq!(report.expansion.succeeded, 1);
    assert_eq!(report.crawl.succeeded, 1);
}

#[tokio::test]
async fn test_unreachable_seed_completes_empty() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal error"))
        .mount(&server)
        .await;

    let records = scrape_sitemap(
        &format!("{}/sitemap.xml", base),
        Arc::new(DefaultExtractor::new()),
        2,
    )
    .await
    .expect("Scrape failed");

    assert!(records.is_empty());
}
