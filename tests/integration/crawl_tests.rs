//! Integration tests for the crawler
//!
//! These tests use wiremock to serve article pages and run the full
//! fetch, extract and persist cycle against an in-memory database.

use presswire::crawler::{CrawlOrchestrator, HttpFetcher, Pacer, RunOptions, RunSummary};
use presswire::extract::{profile_for, ArticlePage, VisualContent, VisualKind};
use presswire::storage::{
    url_md5, CrawlListPolicy, CrawlTarget, RawPageRecord, SqliteStorage, Storage, StorageResult,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Pacer that counts pauses instead of sleeping
#[derive(Clone, Default)]
struct CountingPacer {
    pauses: Arc<AtomicUsize>,
}

impl CountingPacer {
    fn count(&self) -> usize {
        self.pauses.load(Ordering::SeqCst)
    }
}

impl Pacer for CountingPacer {
    async fn pause(&mut self) -> Duration {
        self.pauses.fetch_add(1, Ordering::SeqCst);
        Duration::ZERO
    }
}

/// SQLite store that can be told to reject article or raw page writes
struct RejectingStorage {
    inner: SqliteStorage,
    reject_page: bool,
    reject_raw: bool,
}

impl Storage for RejectingStorage {
    fn get_source_id(&self, code: &str) -> StorageResult<i64> {
        self.inner.get_source_id(code)
    }

    fn get_crawl_list(&self, source_id: i64) -> StorageResult<Vec<CrawlTarget>> {
        self.inner.get_crawl_list(source_id)
    }

    fn insert_page_raw(&mut self, record: &RawPageRecord) -> bool {
        !self.reject_raw && self.inner.insert_page_raw(record)
    }

    fn insert_page(&mut self, page: &ArticlePage) -> bool {
        !self.reject_page && self.inner.insert_page(page)
    }

    fn insert_visual_link(&mut self, visual: &VisualContent) -> bool {
        self.inner.insert_visual_link(visual)
    }

    fn update_list_crawlercount(&mut self, url_md5: &str) -> StorageResult<()> {
        self.inner.update_list_crawlercount(url_md5)
    }

    fn update_list_errorcount(&mut self, url_md5: &str) -> StorageResult<()> {
        self.inner.update_list_errorcount(url_md5)
    }

    fn start_run(&mut self, source_id: i64, options: &str) -> StorageResult<i64> {
        self.inner.start_run(source_id, options)
    }

    fn finish_run(&mut self, run_id: i64, summary: &RunSummary) -> StorageResult<()> {
        self.inner.finish_run(run_id, summary)
    }
}

fn article_html(title: &str) -> String {
    format!(
        r#"<html><head>
            <meta name="news_keywords" content="颱風,停班停課">
        </head><body>
        <div id="bigpicbox"><h1 id="h1">{}</h1></div>
        <div class="picbox1"><a title="封面說明"><img src="//cdn.example.com/cover.jpg"></a></div>
        <article class="arttext">
            <time>2023年5月1日 13:45</time>
            <div class="rp_name"><cite>王小明</cite> / 台北報導</div>
            <p>第一段</p>
            <div class="picbox"><img src="https://cdn.example.com/inline.jpg"><span>內文圖</span></div>
            <p>第二段</p>
        </article>
        <section>
            <div class="video"><figcaption>影片說明</figcaption></div>
            <script>var yID = 'abc123';</script>
        </section>
        </body></html>"#,
        title
    )
}

fn html_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_article(server: &MockServer, route: &str, title: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html_response(article_html(title)))
        .mount(server)
        .await;
}

/// In-memory storage with the China Times source and the given targets queued
fn seeded_storage(urls: &[String]) -> (SqliteStorage, i64) {
    let mut storage = SqliteStorage::new_in_memory().expect("in-memory storage");
    let source_id = storage
        .register_source("cnt", "China Times")
        .expect("register source");
    for url in urls {
        storage
            .add_crawl_target(source_id, url)
            .expect("add target");
    }
    (storage, source_id)
}

fn orchestrator<S: Storage>(
    storage: S,
    pacer: CountingPacer,
) -> CrawlOrchestrator<HttpFetcher, S, CountingPacer> {
    let profile = profile_for("cnt").expect("cnt profile");
    let fetcher = HttpFetcher::from_client(reqwest::Client::new());
    CrawlOrchestrator::new(profile, fetcher, storage, pacer).expect("orchestrator")
}

fn counters(storage: &SqliteStorage, url: &str) -> (u32, u32) {
    let target = storage
        .get_target(&url_md5(url))
        .expect("query target")
        .expect("target exists");
    (target.crawl_count, target.error_count)
}

#[tokio::test]
async fn test_full_crawl_persists_articles() {
    let server = MockServer::start().await;
    mount_article(&server, "/news/1", "第一則").await;
    mount_article(&server, "/news/2", "第二則").await;

    let urls = vec![
        format!("{}/news/1", server.uri()),
        format!("{}/news/2", server.uri()),
    ];
    let (storage, source_id) = seeded_storage(&urls);
    let pacer = CountingPacer::default();

    let mut crawler = orchestrator(storage, pacer.clone());
    let summary = crawler.run(RunOptions::default()).await.expect("run");

    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(pacer.count(), 2);

    let storage = crawler.into_storage();
    for url in &urls {
        assert_eq!(counters(&storage, url), (1, 0));
    }

    let page = storage
        .get_page(&url_md5(&urls[0]))
        .expect("query page")
        .expect("page stored");
    assert_eq!(page.source_id, source_id);
    assert_eq!(page.title, "第一則");
    assert_eq!(page.body, "第一段\n第二段");
    assert_eq!(page.publish_time, "2023-05-01 13:45:00");
    assert_eq!(page.authors, vec!["王小明".to_string()]);
    assert_eq!(page.keywords, vec!["颱風".to_string(), "停班停課".to_string()]);
    assert_eq!(page.redirected_url, urls[0]);
    assert_eq!(page.image_count, 2);
    assert_eq!(page.video_count, 1);

    // optional records are off by default
    assert_eq!(storage.count_raw_pages().unwrap(), 0);
    assert_eq!(storage.count_visual_links().unwrap(), 0);
}

#[tokio::test]
async fn test_missing_title_does_not_abort_batch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/news/broken"))
        .respond_with(html_response(
            "<html><body><p>no article here</p></body></html>".to_string(),
        ))
        .mount(&server)
        .await;
    mount_article(&server, "/news/ok", "正常").await;

    let urls = vec![
        format!("{}/news/broken", server.uri()),
        format!("{}/news/ok", server.uri()),
    ];
    let (storage, _) = seeded_storage(&urls);
    let pacer = CountingPacer::default();

    let mut crawler = orchestrator(storage, pacer.clone());
    let summary = crawler.run(RunOptions::default()).await.expect("run");

    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.succeeded, 1);
    // both pages were served, so both are followed by a pause
    assert_eq!(pacer.count(), 2);

    let storage = crawler.into_storage();
    assert_eq!(counters(&storage, &urls[0]), (0, 1));
    assert_eq!(counters(&storage, &urls[1]), (1, 0));
    assert!(storage.get_page(&url_md5(&urls[0])).unwrap().is_none());
    assert_eq!(storage.count_pages().unwrap(), 1);
}

#[tokio::test]
async fn test_http_error_counts_without_pause() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/news/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_article(&server, "/news/ok", "正常").await;

    let urls = vec![
        format!("{}/news/gone", server.uri()),
        format!("{}/news/ok", server.uri()),
    ];
    let (storage, _) = seeded_storage(&urls);
    let pacer = CountingPacer::default();

    let mut crawler = orchestrator(storage, pacer.clone());
    let summary = crawler.run(RunOptions::default()).await.expect("run");

    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(pacer.count(), 1);

    let storage = crawler.into_storage();
    assert_eq!(counters(&storage, &urls[0]), (0, 1));
    assert_eq!(counters(&storage, &urls[1]), (1, 0));
}

#[tokio::test]
async fn test_redirect_target_is_recorded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", "/news/moved"),
        )
        .mount(&server)
        .await;
    mount_article(&server, "/news/moved", "搬家").await;

    let original = format!("{}/old", server.uri());
    let (storage, _) = seeded_storage(&[original.clone()]);

    let mut crawler = orchestrator(storage, CountingPacer::default());
    let summary = crawler.run(RunOptions::default()).await.expect("run");
    assert_eq!(summary.succeeded, 1);

    let storage = crawler.into_storage();
    let page = storage
        .get_page(&url_md5(&original))
        .expect("query page")
        .expect("page stored");
    assert_eq!(page.url, original);
    assert_eq!(page.redirected_url, format!("{}/news/moved", server.uri()));
}

#[tokio::test]
async fn test_raw_and_visual_records_when_enabled() {
    let server = MockServer::start().await;
    mount_article(&server, "/news/1", "圖文").await;

    let url = format!("{}/news/1", server.uri());
    let (storage, _) = seeded_storage(&[url.clone()]);

    let options = RunOptions {
        persist_raw: true,
        persist_visual: true,
        page_diff: false,
    };
    let mut crawler = orchestrator(storage, CountingPacer::default());
    crawler.run(options).await.expect("run");

    let storage = crawler.into_storage();
    let md5 = url_md5(&url);

    let raw = storage.get_page_raw(&md5).expect("raw pages");
    assert_eq!(raw.len(), 1);
    assert!(raw[0].page_content.contains("<h1 id=\"h1\">圖文</h1>"));
    assert!(!raw[0].page_content.contains("\n"));

    let visuals = storage.get_visual_links(&md5).expect("visual links");
    assert_eq!(visuals.len(), 3);
    assert_eq!(visuals[0].kind, VisualKind::Image);
    assert_eq!(visuals[0].visual_src, "https://cdn.example.com/cover.jpg");
    assert_eq!(visuals[0].caption, "封面說明");
    assert_eq!(visuals[1].visual_src, "https://cdn.example.com/inline.jpg");
    assert_eq!(visuals[1].caption, "內文圖");
    assert_eq!(visuals[2].kind, VisualKind::Video);
    assert_eq!(visuals[2].visual_src, "https://www.youtube.com/embed/abc123");
    assert_eq!(visuals[2].caption, "影片說明");
}

#[tokio::test]
async fn test_second_run_skips_crawled_targets() {
    let server = MockServer::start().await;
    mount_article(&server, "/news/1", "一次").await;

    let url = format!("{}/news/1", server.uri());
    let (storage, _) = seeded_storage(&[url.clone()]);

    let mut crawler = orchestrator(storage, CountingPacer::default());
    assert_eq!(crawler.run(RunOptions::default()).await.unwrap().attempted, 1);
    assert_eq!(crawler.run(RunOptions::default()).await.unwrap().attempted, 0);

    let storage = crawler.into_storage();
    assert_eq!(counters(&storage, &url), (1, 0));

    let runs = storage.recent_runs(5).unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].attempted, Some(0));
    assert_eq!(runs[1].attempted, Some(1));
    assert_eq!(runs[1].succeeded, Some(1));
}

#[tokio::test]
async fn test_batch_limit_and_error_ceiling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let urls: Vec<String> = (1..=3)
        .map(|n| format!("{}/news/{}", server.uri(), n))
        .collect();
    let (storage, _) = seeded_storage(&urls);
    let storage = storage.with_policy(CrawlListPolicy {
        max_error_count: 1,
        batch_limit: Some(2),
    });

    let mut crawler = orchestrator(storage, CountingPacer::default());
    let first = crawler.run(RunOptions::default()).await.expect("run");
    assert_eq!(first.attempted, 2);
    assert_eq!(first.succeeded, 0);

    // the first two reached the error ceiling, only the third remains
    let second = crawler.run(RunOptions::default()).await.expect("run");
    assert_eq!(second.attempted, 1);

    let third = crawler.run(RunOptions::default()).await.expect("run");
    assert_eq!(third.attempted, 0);

    let storage = crawler.into_storage();
    for url in &urls {
        assert_eq!(counters(&storage, url), (0, 1));
    }
}

#[tokio::test]
async fn test_unknown_source_fails_run() {
    let storage = SqliteStorage::new_in_memory().expect("in-memory storage");

    let mut crawler = orchestrator(storage, CountingPacer::default());
    let result = crawler.run(RunOptions::default()).await;

    assert!(result.is_err());
    assert_eq!(crawler.storage().count_pages().unwrap(), 0);
}

#[tokio::test]
async fn test_rejected_page_counts_error_and_keeps_visuals() {
    let server = MockServer::start().await;
    mount_article(&server, "/news/1", "被拒").await;

    let url = format!("{}/news/1", server.uri());
    let (inner, _) = seeded_storage(&[url.clone()]);
    let storage = RejectingStorage {
        inner,
        reject_page: true,
        reject_raw: false,
    };
    let pacer = CountingPacer::default();

    let options = RunOptions {
        persist_visual: true,
        ..RunOptions::default()
    };
    let mut crawler = orchestrator(storage, pacer.clone());
    let summary = crawler.run(options).await.expect("run");

    assert_eq!(summary.attempted, 1);
    assert_eq!(summary.succeeded, 0);
    assert_eq!(pacer.count(), 1);

    let storage = crawler.into_storage().inner;
    assert_eq!(counters(&storage, &url), (0, 1));
    assert!(storage.get_page(&url_md5(&url)).unwrap().is_none());

    let visuals = storage.get_visual_links(&url_md5(&url)).unwrap();
    assert_eq!(visuals.len(), 3);
    assert_eq!(visuals[0].visual_src, "https://cdn.example.com/cover.jpg");
}

#[tokio::test]
async fn test_failed_raw_write_does_not_block_article() {
    let server = MockServer::start().await;
    mount_article(&server, "/news/1", "原始頁").await;

    let url = format!("{}/news/1", server.uri());
    let (inner, _) = seeded_storage(&[url.clone()]);
    let storage = RejectingStorage {
        inner,
        reject_page: false,
        reject_raw: true,
    };

    let options = RunOptions {
        persist_raw: true,
        ..RunOptions::default()
    };
    let mut crawler = orchestrator(storage, CountingPacer::default());
    let summary = crawler.run(options).await.expect("run");

    assert_eq!(summary.succeeded, 1);

    let storage = crawler.into_storage().inner;
    assert_eq!(counters(&storage, &url), (1, 0));
    assert_eq!(storage.count_raw_pages().unwrap(), 0);

    let page = storage
        .get_page(&url_md5(&url))
        .expect("query page")
        .expect("page stored");
    assert_eq!(page.title, "原始頁");
}
