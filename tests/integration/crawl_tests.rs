//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the quotes site and run the
//! full crawl cycle end-to-end.

use quote_harvester::config::{Config, CrawlerConfig, OutputConfig, SiteConfig, UserAgentConfig};
use quote_harvester::crawler::{run_and_store, CancelToken, Coordinator};
use quote_harvester::output::{JsonFileSink, MemorySink};
use quote_harvester::{CrawlPhase, CrawlResult, HarvestError, Tag};
use std::collections::BTreeMap;
use std::time::Duration;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const END_PAGE: &str = "<html><body><div class=\"col-md-8\">No quotes found!</div></body></html>";

const TAG_CLOUD: &str = r#"<html><body>
    <div class="tags-box">
        <a class="tag" href="/tag/love/">love</a>
        <a class="tag" href="/tag/inspirational/">inspirational</a>
        <a class="tag" href="/tag/life/">life</a>
    </div>
</body></html>"#;

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, result_path: &str) -> Config {
    Config {
        site: SiteConfig {
            base_url: base_url.to_string(),
            ..SiteConfig::default()
        },
        crawler: CrawlerConfig {
            max_concurrent_requests: 4,
            request_timeout_secs: 5,
            connect_timeout_secs: 2,
            ..CrawlerConfig::default()
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
        },
        output: OutputConfig {
            result_path: result_path.to_string(),
        },
    }
}

/// Builds a listing page from (text, author, space separated tags) triples
fn listing(entries: &[(&str, &str, &str)]) -> String {
    let mut html = String::from("<html><body>");
    for (text, author, tags) in entries {
        html.push_str(&format!(
            r#"<div class="quote">
                 <span class="text">{}</span>
                 <span>by <small class="author">{}</small>
                 <a href="/author/{}">(about)</a></span>
                 <div class="tags">"#,
            text,
            author,
            author.replace(' ', "-")
        ));
        for tag in tags.split_whitespace() {
            html.push_str(&format!(
                r#"<a class="tag" href="/tag/{0}/page/1/">{0}</a>"#,
                tag
            ));
        }
        html.push_str("</div></div>");
    }
    html.push_str("</body></html>");
    html
}

fn author_page(description: &str) -> String {
    format!(
        r#"<div class="author-details">
             <span class="author-born-date">March 14, 1879</span>
             <span class="author-born-location">in Ulm, Germany</span>
             <div class="author-description">
                 {}
             </div>
           </div>"#,
        description
    )
}

async fn mount_page(server: &MockServer, number: u32, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/page/{}/", number)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_root(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_all_authors(server: &MockServer, description: &str) {
    Mock::given(method("GET"))
        .and(path_regex("^/author/.*"))
        .respond_with(ResponseTemplate::new(200).set_body_string(author_page(description)))
        .mount(server)
        .await;
}

/// Three listing pages, the fourth carries the end sentinel
async fn mount_site(server: &MockServer) {
    mount_page(
        server,
        1,
        listing(&[
            ("The world as we have created it.", "Albert Einstein", "change deep-thoughts"),
            ("It is our choices.", "J K Rowling", "abilities choices"),
        ]),
    )
    .await;
    mount_page(
        server,
        2,
        listing(&[
            ("There are only two ways to live.", "Albert Einstein", "inspirational life"),
            ("A day without sunshine is like night.", "Steve Martin", ""),
        ]),
    )
    .await;
    mount_page(
        server,
        3,
        listing(&[("Try not to become a man of success.", "Albert Einstein", "adulthood")]),
    )
    .await;
    mount_page(server, 4, END_PAGE.to_string()).await;
    mount_root(server, TAG_CLOUD).await;
}

/// Authors keyed by name with their quote texts sorted; pages drain
/// concurrently so cross-page order is not fixed
fn quotes_by_author(result: &CrawlResult) -> BTreeMap<String, Vec<String>> {
    result
        .authors
        .iter()
        .map(|author| {
            let mut texts: Vec<String> = author.quotes.iter().map(|q| q.text.clone()).collect();
            texts.sort();
            (author.name.clone(), texts)
        })
        .collect()
}

#[tokio::test]
async fn test_full_crawl() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    mount_all_authors(&server, "A physicist.").await;

    let mut coordinator = Coordinator::new(create_test_config(&server.uri(), "unused.json"));
    let result = coordinator.run().await.expect("Crawl should succeed");

    assert_eq!(coordinator.phase(), CrawlPhase::Done);
    assert!(!coordinator.is_session_open());

    // One entry per distinct author, all five quote blocks kept
    assert_eq!(result.authors.len(), 3);
    assert_eq!(result.authors.total_quotes(), 5);
    assert_eq!(result.authors.get("Albert Einstein").unwrap().quotes.len(), 3);
    assert_eq!(result.authors.get("J K Rowling").unwrap().quotes.len(), 1);
    assert_eq!(result.authors.get("Steve Martin").unwrap().quotes.len(), 1);

    // Tags keep document order
    let rowling = result.authors.get("J K Rowling").unwrap();
    let tags: Vec<&str> = rowling.quotes[0].tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tags, vec!["abilities", "choices"]);
    assert_eq!(
        rowling.quotes[0].tags[0].url,
        format!("{}/tag/abilities/", server.uri())
    );
    assert!(result.authors.get("Steve Martin").unwrap().quotes[0].tags.is_empty());

    // Enrichment
    let einstein = result.authors.get("Albert Einstein").unwrap();
    assert_eq!(einstein.biography.born_date, "March 14, 1879");
    assert_eq!(einstein.biography.born_location, "Ulm, Germany");
    assert_eq!(einstein.biography.description, "A physicist.");
    assert_eq!(
        einstein.biography.url,
        format!("{}/author/Albert-Einstein", server.uri())
    );

    // Top tags
    assert_eq!(
        result.top_tags,
        vec![
            Tag::from_name(&server.uri(), "love"),
            Tag::from_name(&server.uri(), "inspirational"),
            Tag::from_name(&server.uri(), "life"),
        ]
    );

    let stats = coordinator.statistics().expect("Statistics should be collected");
    assert_eq!(stats.pages_requested, 4);
    assert_eq!(stats.pages_processed, 3);
    assert_eq!(stats.quotes, 5);
    assert_eq!(stats.authors_enriched, 5);
    assert!(stats.fetch.peak_in_flight <= 4);
}

#[tokio::test]
async fn test_sentinel_on_second_page() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        listing(&[("first", "Ann", "a"), ("second", "Bob", "b")]),
    )
    .await;
    // The sentinel page also carries a quote that must not be processed
    mount_page(
        &server,
        2,
        format!("{}{}", listing(&[("hidden", "Cid", "c")]), END_PAGE),
    )
    .await;
    mount_root(&server, TAG_CLOUD).await;
    mount_all_authors(&server, "bio").await;

    let result = run_and_store(
        create_test_config(&server.uri(), "unused.json"),
        &MemorySink::new(),
    )
    .await
    .unwrap();

    assert_eq!(result.authors.names(), vec!["Ann", "Bob"]);
    assert!(result.authors.get("Cid").is_none());
    assert_eq!(result.authors.total_quotes(), 2);
}

#[tokio::test]
async fn test_last_completed_enrichment_wins() {
    let server = MockServer::start().await;
    mount_page(&server, 1, listing(&[("one", "A", "x")])).await;
    mount_page(&server, 2, listing(&[("two", "B", "y")])).await;
    mount_page(&server, 3, listing(&[("three", "A", "z")])).await;
    mount_page(&server, 4, END_PAGE.to_string()).await;
    mount_root(&server, TAG_CLOUD).await;

    // Whichever request for A arrives first is answered last
    Mock::given(method("GET"))
        .and(path("/author/A"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(author_page("slow"))
                .set_delay(Duration::from_millis(300)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/author/A"))
        .respond_with(ResponseTemplate::new(200).set_body_string(author_page("fast")))
        .mount(&server)
        .await;
    mount_all_authors(&server, "other").await;

    let result = run_and_store(
        create_test_config(&server.uri(), "unused.json"),
        &MemorySink::new(),
    )
    .await
    .unwrap();

    let a = result.authors.get("A").unwrap();
    assert_eq!(a.biography.description, "slow");
    assert_eq!(a.quotes.len(), 2);
}

#[tokio::test]
async fn test_missing_tag_cloud_is_not_fatal() {
    let server = MockServer::start().await;
    mount_page(&server, 1, listing(&[("q", "Ann", "a")])).await;
    mount_page(&server, 2, END_PAGE.to_string()).await;
    mount_root(&server, "<html><body>redesigned</body></html>").await;
    mount_all_authors(&server, "bio").await;

    let mut coordinator = Coordinator::new(create_test_config(&server.uri(), "unused.json"));
    let result = coordinator.run().await.unwrap();

    assert!(result.top_tags.is_empty());
    assert!(!result.authors.is_empty());
    assert_eq!(coordinator.phase(), CrawlPhase::Done);
}

#[tokio::test]
async fn test_failed_enrichment_keeps_defaults() {
    let server = MockServer::start().await;
    mount_page(&server, 1, listing(&[("q1", "Ann", "a"), ("q2", "Bob", "b")])).await;
    mount_page(&server, 2, END_PAGE.to_string()).await;
    mount_root(&server, TAG_CLOUD).await;
    Mock::given(method("GET"))
        .and(path("/author/Ann"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/author/Bob"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>no details</html>"))
        .mount(&server)
        .await;

    let mut coordinator = Coordinator::new(create_test_config(&server.uri(), "unused.json"));
    let result = coordinator.run().await.unwrap();

    for name in ["Ann", "Bob"] {
        let author = result.authors.get(name).unwrap();
        assert_eq!(author.biography.born_date, "");
        assert_eq!(author.biography.description, "");
        assert_eq!(author.biography.url, "");
        assert_eq!(author.quotes.len(), 1);
    }

    let stats = coordinator.statistics().unwrap();
    assert_eq!(stats.enrichment_failures, 1);
    assert_eq!(stats.enrichment_unparseable, 1);
    assert_eq!(stats.authors_enriched, 0);
}

#[tokio::test]
async fn test_two_runs_produce_the_same_data() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    mount_all_authors(&server, "bio").await;

    let config = create_test_config(&server.uri(), "unused.json");
    let first = run_and_store(config.clone(), &MemorySink::new()).await.unwrap();
    let second = run_and_store(config, &MemorySink::new()).await.unwrap();

    assert_eq!(quotes_by_author(&first), quotes_by_author(&second));
    assert_eq!(first.top_tags, second.top_tags);
    for author in first.authors.iter() {
        assert_eq!(
            second.authors.get(&author.name).unwrap().biography,
            author.biography
        );
    }
}

#[tokio::test]
async fn test_transport_failure_writes_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("result.json");

    // Nothing listens on the discard port
    let config = create_test_config("http://127.0.0.1:9", &output.display().to_string());
    let sink = JsonFileSink::new(&output);
    let mut coordinator = Coordinator::new(config);

    let result = coordinator.run_and_store(&sink).await;

    assert!(matches!(result, Err(HarvestError::Http { .. })));
    assert_eq!(coordinator.phase(), CrawlPhase::Failed);
    assert!(!coordinator.is_session_open());
    assert!(!output.exists());
}

#[tokio::test]
async fn test_cancellation_aborts_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing(&[("q", "Ann", "a")]))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let cancel = CancelToken::new();
    let mut coordinator =
        Coordinator::with_cancel(create_test_config(&server.uri(), "unused.json"), cancel.clone());

    let trigger = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
    });

    let result = coordinator.run().await;
    trigger.await.unwrap();

    assert!(matches!(result, Err(HarvestError::Cancelled)));
    assert_eq!(coordinator.phase(), CrawlPhase::Failed);
    assert!(!coordinator.is_session_open());
}

#[tokio::test]
async fn test_json_result_file() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        listing(&[("“Café” thoughts", "Ann", "a b"), ("more", "Ann", "")]),
    )
    .await;
    mount_page(&server, 2, END_PAGE.to_string()).await;
    mount_root(&server, TAG_CLOUD).await;
    mount_all_authors(&server, "bio").await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("result.json");
    let sink = JsonFileSink::new(&output);

    run_and_store(
        create_test_config(&server.uri(), &output.display().to_string()),
        &sink,
    )
    .await
    .unwrap();

    let content = std::fs::read_to_string(&output).unwrap();
    // Non-ASCII text is written as UTF-8 with four-space indentation
    assert!(content.contains("“Café” thoughts"));
    assert!(content.contains("\n    \"authors\": {"));

    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    let ann = &value["authors"]["Ann"];
    assert!(ann.get("name").is_none());
    assert_eq!(ann["born_location"], "Ulm, Germany");
    assert_eq!(ann["description"], "bio");
    assert_eq!(ann["quotes"][0]["text"], "“Café” thoughts");
    assert_eq!(ann["quotes"][0]["tags"][1]["name"], "b");
    assert_eq!(ann["quotes"][1]["tags"], serde_json::json!([]));
    assert_eq!(value["top_tags"][0]["name"], "love");
    assert_eq!(
        value["top_tags"][0]["url"],
        format!("{}/tag/love/", server.uri())
    );
}

#[tokio::test]
async fn test_run_and_store_hands_snapshot_to_sink() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    mount_all_authors(&server, "bio").await;

    let sink = MemorySink::new();
    let result = run_and_store(create_test_config(&server.uri(), "unused.json"), &sink)
        .await
        .unwrap();

    assert_eq!(sink.stored(), Some(result));
}

#[tokio::test]
async fn test_base_url_with_trailing_slash() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    mount_all_authors(&server, "bio").await;

    let config = create_test_config(&format!("{}/", server.uri()), "unused.json");
    let mut coordinator = Coordinator::new(config);
    let result = coordinator.run().await.unwrap();

    assert_eq!(result.authors.len(), 3);
    assert_eq!(result.authors.total_quotes(), 5);
    assert_eq!(result.top_tags.len(), 3);
    assert_eq!(
        result.authors.get("Steve Martin").unwrap().biography.url,
        format!("{}/author/Steve-Martin", server.uri())
    );

    let requested: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|request| request.url.path().to_string())
        .collect();
    assert!(requested.iter().all(|p| !p.starts_with("//")));
}

#[tokio::test]
async fn test_unwritable_result_file_fails_run() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    mount_all_authors(&server, "bio").await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("missing").join("result.json");
    let sink = JsonFileSink::new(&output);
    let mut coordinator =
        Coordinator::new(create_test_config(&server.uri(), &output.display().to_string()));

    let result = coordinator.run_and_store(&sink).await;

    assert!(matches!(result, Err(HarvestError::Output(_))));
    assert_eq!(coordinator.phase(), CrawlPhase::Failed);
    assert!(!output.exists());
}
