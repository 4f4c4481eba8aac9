//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle end-to-end through the real HTTP fetcher.

use linkcheck::config::Config;
use linkcheck::crawler::{build_http_client, run_crawl, HttpFetcher};
use linkcheck::output::CrawlReport;
use linkcheck::url::{normalize_url, Site, SkipList};
use linkcheck::{FetchError, Status};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Wraps body markup in a page well above the minimum body size
fn html_page(body: &str) -> String {
    format!(
        "<html><head><title>Test page</title></head><body>{}</body></html>",
        body
    )
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(html_page(body), "text/html")
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .expect(1)
        .mount(server)
        .await;
}

/// A fetcher for the site under `seed` with default settings
fn fetcher(seed: &str, skip_list: SkipList) -> HttpFetcher {
    let config = Config::default();
    let seed_url = normalize_url(seed).expect("test seed must parse");
    let client = build_http_client(&config.crawler, &config.user_agent).unwrap();
    HttpFetcher::new(
        client,
        Site::from_seed(&seed_url),
        skip_list,
        config.crawler.min_body_bytes,
    )
}

/// Crawls from `seed` with default settings and the given skip list
async fn check(seed: &str, skip_list: SkipList) -> CrawlReport {
    crawl(seed, fetcher(seed, skip_list)).await
}

async fn crawl(seed: &str, fetcher: HttpFetcher) -> CrawlReport {
    let config = Config::default();
    let run = tokio::time::timeout(
        Duration::from_secs(30),
        run_crawl(seed, Arc::new(fetcher), &config.crawler),
    )
    .await
    .expect("crawl did not finish");
    CrawlReport::from_run(run, None)
}

fn status_of(report: &CrawlReport, url: &str) -> Status {
    report
        .entries
        .iter()
        .find(|e| e.url == url)
        .unwrap_or_else(|| panic!("no entry for {}", url))
        .status
}

#[tokio::test]
async fn test_simple_chain_with_broken_link() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/b">B</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(404).set_body_string("404 page not found\n"))
        .expect(1)
        .mount(&server)
        .await;

    let report = check(&format!("{}/", base), SkipList::new()).await;

    assert_eq!(report.entries.len(), 2);
    assert_eq!(status_of(&report, &format!("{}/", base)), Status::Http(200));
    assert_eq!(status_of(&report, &format!("{}/b", base)), Status::Http(404));
    assert_eq!(report.error_count(), 1);
    assert_eq!(report.exit_code(), 1);

    let text = report.render_text();
    assert!(text.contains(&format!(" - 404 (1): {}/b", base)));
    assert!(text.contains(&format!("\t\t1 times from {}/", base)));
}

#[tokio::test]
async fn test_error_status_wins_over_small_body() {
    let site = MockServer::start().await;
    let other = MockServer::start().await;
    let base = site.uri();

    mount_page(
        &site,
        "/",
        &format!(
            r#"<a href="/broken">Broken</a><a href="{}/gone">Gone</a><a href="/down">Down</a>"#,
            other.uri()
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(404).set_body_string("nope"))
        .expect(1)
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&other)
        .await;

    let report = check(&format!("{}/", base), SkipList::new()).await;

    assert_eq!(status_of(&report, &format!("{}/broken", base)), Status::Http(404));
    assert_eq!(status_of(&report, &format!("{}/down", base)), Status::Http(503));
    assert_eq!(
        status_of(&report, &format!("{}/gone", other.uri())),
        Status::Http(404)
    );
    assert_eq!(report.error_count(), 3);
    assert_eq!(report.exit_code(), 3);
}

#[tokio::test]
async fn test_cycle_fetches_each_page_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r##"<a href="/b">B</a><a href="/b?ref=home">B again</a><a href="#top">Top</a>"##,
    )
    .await;
    mount_page(&server, "/b", r#"<a href="/">Home</a><a href="/b#self">Self</a>"#).await;

    let report = check(&format!("{}/", base), SkipList::new()).await;

    assert_eq!(report.entries.len(), 2);
    assert_eq!(report.exit_code(), 0);

    let b = report
        .entries
        .iter()
        .find(|e| e.url == format!("{}/b", base))
        .unwrap();
    assert_eq!(b.discovery_count, 3);
    assert_eq!(b.referrers.get(&format!("{}/", base)), Some(&2));
    assert_eq!(b.referrers.get(&format!("{}/b", base)), Some(&1));
}

#[tokio::test]
async fn test_seed_on_skip_list_makes_no_requests() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    Mock::given(method("GET"))
        .respond_with(html("unused"))
        .expect(0)
        .mount(&server)
        .await;

    let report = check(&seed, SkipList::new().with_prefix(&server.uri())).await;

    assert_eq!(report.entries.len(), 1);
    assert_eq!(status_of(&report, &seed), Status::Skipped);
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn test_off_site_link_is_checked_but_not_followed() {
    let site = MockServer::start().await;
    let other = MockServer::start().await;

    mount_page(&site, "/", &format!(r#"<a href="{}/ext">Elsewhere</a>"#, other.uri())).await;
    mount_page(&other, "/ext", r#"<a href="/deeper">Deeper</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/deeper"))
        .respond_with(html("never fetched"))
        .expect(0)
        .mount(&other)
        .await;

    let report = check(&format!("{}/", site.uri()), SkipList::new()).await;

    assert_eq!(report.entries.len(), 2);
    assert_eq!(
        status_of(&report, &format!("{}/ext", other.uri())),
        Status::OffSite
    );
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn test_tiny_off_site_body_is_benign() {
    let site = MockServer::start().await;
    let other = MockServer::start().await;

    mount_page(&site, "/", &format!(r#"<a href="{}/bot-wall">X</a>"#, other.uri())).await;
    Mock::given(method("GET"))
        .and(path("/bot-wall"))
        .respond_with(ResponseTemplate::new(200).set_body_string("no"))
        .expect(1)
        .mount(&other)
        .await;

    let report = check(&format!("{}/", site.uri()), SkipList::new()).await;

    let entry = report
        .entries
        .iter()
        .find(|e| e.url == format!("{}/bot-wall", other.uri()))
        .unwrap();
    assert_eq!(entry.status, Status::OffSite);
    assert!(entry.last_error.is_none());
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn test_tiny_on_site_body_is_an_error() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/empty">Empty</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x"))
        .expect(1)
        .mount(&server)
        .await;

    let report = check(&format!("{}/", base), SkipList::new()).await;

    let entry = report
        .entries
        .iter()
        .find(|e| e.url == format!("{}/empty", base))
        .unwrap();
    assert_eq!(entry.status, Status::ContentTooSmall);
    assert_eq!(
        entry.last_error,
        Some(FetchError::ContentTooSmall {
            bytes: 1,
            minimum: 32
        })
    );
    assert_eq!(report.exit_code(), 1);
    assert!(report.render_text().contains(" - 888 (1): "));
}

#[tokio::test]
async fn test_base_href_redirects_relative_links() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/docs/",
        r#"<a href="before">Before</a><base href="/docs/v2/"><a href="after">After</a>"#,
    )
    .await;
    mount_page(&server, "/docs/before", "").await;
    mount_page(&server, "/docs/v2/after", "").await;

    let report = check(&format!("{}/docs/", base), SkipList::new()).await;

    assert_eq!(report.entries.len(), 3);
    assert_eq!(
        status_of(&report, &format!("{}/docs/v2/after", base)),
        Status::Http(200)
    );
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn test_pages_outside_seed_directory_are_not_parsed() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/docs/index.html", r#"<a href="/blog/">Blog</a>"#).await;
    mount_page(&server, "/blog/", r#"<a href="/blog/post">Post</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/blog/post"))
        .respond_with(html("never fetched"))
        .expect(0)
        .mount(&server)
        .await;

    let report = check(&format!("{}/docs/index.html", base), SkipList::new()).await;

    assert_eq!(report.entries.len(), 2);
    assert_eq!(status_of(&report, &format!("{}/blog/", base)), Status::OffSite);
}

#[tokio::test]
async fn test_redirect_off_site_is_recorded() {
    let site = MockServer::start().await;
    let other = MockServer::start().await;
    let landing = format!("{}/landing", other.uri());

    mount_page(&site, "/", r#"<a href="/moved">Moved</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/moved"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", landing.as_str()))
        .expect(1)
        .mount(&site)
        .await;
    mount_page(&other, "/landing", r#"<a href="/deeper">Deeper</a>"#).await;

    let report = check(&format!("{}/", site.uri()), SkipList::new()).await;

    let moved = report
        .entries
        .iter()
        .find(|e| e.url == format!("{}/moved", site.uri()))
        .unwrap();
    assert_eq!(moved.status, Status::OffSite);
    assert_eq!(
        moved.last_error,
        Some(FetchError::OffSiteRedirect {
            final_url: landing.clone()
        })
    );
    assert_eq!(report.entries.len(), 2);
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn test_assets_are_checked_but_not_parsed() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<img src="/logo.png"><link href="/site.css">"#).await;
    mount_page(&server, "/logo.png", r#"<a href="/hidden">Hidden</a>"#).await;
    mount_page(&server, "/site.css", r#"<a href="/hidden">Hidden</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(html("never fetched"))
        .expect(0)
        .mount(&server)
        .await;

    let report = check(&format!("{}/", base), SkipList::new()).await;

    assert_eq!(report.entries.len(), 3);
    assert_eq!(
        status_of(&report, &format!("{}/logo.png", base)),
        Status::Http(200)
    );
}

#[tokio::test]
async fn test_non_html_content_is_checked_but_not_parsed() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/download">Download</a><a href="/notes">Notes</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/download"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(html_page(r#"<a href="/hidden">Hidden</a>"#), "application/octet-stream"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/notes"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_page(r#"<a href="/hidden">Hidden</a>"#)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(html("never fetched"))
        .expect(0)
        .mount(&server)
        .await;

    let report = check(&format!("{}/", base), SkipList::new()).await;

    assert_eq!(report.entries.len(), 3);
    assert_eq!(
        status_of(&report, &format!("{}/download", base)),
        Status::Http(200)
    );
    assert_eq!(status_of(&report, &format!("{}/notes", base)), Status::Http(200));
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn test_html_beyond_body_cap_is_not_scanned() {
    let server = MockServer::start().await;
    let base = server.uri();
    let seed = format!("{}/", base);

    let filler = "<p>padding</p>".repeat(100);
    mount_page(
        &server,
        "/",
        &format!(r#"<a href="/early">Early</a>{}<a href="/late">Late</a>"#, filler),
    )
    .await;
    mount_page(&server, "/early", "").await;
    Mock::given(method("GET"))
        .and(path("/late"))
        .respond_with(html("never fetched"))
        .expect(0)
        .mount(&server)
        .await;

    let report = crawl(&seed, fetcher(&seed, SkipList::new()).with_max_body_bytes(400)).await;

    assert_eq!(report.entries.len(), 2);
    assert_eq!(status_of(&report, &format!("{}/early", base)), Status::Http(200));
}

#[tokio::test]
async fn test_mail_links_are_errors_unless_skipped() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="mailto:team@example.com">Mail us</a>"#))
        .expect(2)
        .mount(&server)
        .await;

    let report = check(&seed, SkipList::new()).await;
    assert_eq!(
        status_of(&report, "mailto:team@example.com"),
        Status::UnsupportedScheme
    );
    assert_eq!(report.exit_code(), 1);
    assert!(report
        .render_text()
        .contains(&format!("\tmailto on page {}", seed)));

    let report = check(&seed, SkipList::new().with_prefix("mailto:")).await;
    assert_eq!(status_of(&report, "mailto:team@example.com"), Status::Skipped);
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="http://127.0.0.1:1/down">Down</a>"#).await;

    let report = check(&format!("{}/", base), SkipList::new()).await;

    assert_eq!(
        status_of(&report, "http://127.0.0.1:1/down"),
        Status::TransportError
    );
    assert_eq!(report.exit_code(), 1);
}

#[tokio::test]
async fn test_wide_site_completes() {
    let server = MockServer::start().await;
    let base = server.uri();

    let links: String = (0..40)
        .map(|i| format!(r#"<a href="/p{}">Page {}</a>"#, i, i))
        .collect();
    mount_page(&server, "/", &links).await;
    for i in 0..40 {
        mount_page(
            &server,
            &format!("/p{}", i),
            &format!(r#"<a href="/p{}">Next</a><a href="/">Home</a>"#, (i + 1) % 40),
        )
        .await;
    }

    let report = check(&format!("{}/", base), SkipList::new()).await;

    assert_eq!(report.entries.len(), 41);
    assert!(report.entries.iter().all(|e| e.status == Status::Http(200)));
    assert_eq!(report.exit_code(), 0);
}
