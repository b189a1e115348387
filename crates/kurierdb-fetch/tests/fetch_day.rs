//! Integration tests for the day fetcher against a wiremock dispatch site.

use chrono::NaiveDate;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kurierdb_fetch::{DocumentCache, FetchError, Fetcher, Session};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2014, 5, 6).unwrap()
}

fn session(server: &MockServer) -> Session {
    Session::new(&server.uri(), 5, "kurierdb-test").unwrap()
}

const SUMMARY_WITH_DUPLICATES: &str = r#"
<a href="ll_detail.php5?status=delivered&uuid=1234567&datum=06.05.2014">job</a>
<a href="ll_detail.php5?status=delivered&uuid=7654321&datum=06.05.2014">job</a>
<a href="ll_detail.php5?status=delivered&uuid=1234567&datum=06.05.2014">again</a>
"#;

#[tokio::test]
async fn discovers_deduplicates_and_caches_documents() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let cache = DocumentCache::open(dir.path()).unwrap();
    let session = session(&server);

    Mock::given(method("GET"))
        .and(path("/ll.php5"))
        .and(query_param("datum", "06.05.2014"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SUMMARY_WITH_DUPLICATES))
        .expect(1)
        .mount(&server)
        .await;

    // The duplicated id 1234567 must be fetched exactly once.
    for job_id in ["1234567", "7654321"] {
        Mock::given(method("GET"))
            .and(path("/ll_detail.php5"))
            .and(query_param("uuid", job_id))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(format!("<html>{job_id}</html>")),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let fetcher = Fetcher::new(&session, &cache, "m-134", false, 0);
    let documents = fetcher.fetch_day(day()).await.unwrap();

    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0].stamp.job_id, "1234567");
    assert_eq!(documents[0].stamp.courier, "m-134");
    assert_eq!(documents[1].stamp.job_id, "7654321");
    assert!(cache.contains(day(), "1234567"));
    assert!(cache.contains(day(), "7654321"));
}

#[tokio::test]
async fn second_run_serves_from_cache_without_job_requests() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let cache = DocumentCache::open(dir.path()).unwrap();
    let session = session(&server);

    cache.store(day(), "1234567", "<html>cached</html>").unwrap();

    Mock::given(method("GET"))
        .and(path("/ll.php5"))
        .respond_with(ResponseTemplate::new(200).set_body_string("uuid=1234567"))
        .expect(1)
        .mount(&server)
        .await;
    // No ll_detail.php5 mock: any document request would 404 and fail the day.

    let fetcher = Fetcher::new(&session, &cache, "m-134", false, 0);
    let documents = fetcher.fetch_day(day()).await.unwrap();

    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].html, "<html>cached</html>");
}

#[tokio::test]
async fn empty_day_writes_sentinel_and_skips_future_discovery() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let cache = DocumentCache::open(dir.path()).unwrap();
    let session = session(&server);

    Mock::given(method("GET"))
        .and(path("/ll.php5"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>keine Jobs</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(&session, &cache, "m-134", false, 0);

    let first = fetcher.fetch_day(day()).await.unwrap();
    assert!(first.is_empty());
    assert!(cache.is_marked_empty(day()));

    // Second call must not hit the summary endpoint again (expect(1) above).
    let second = fetcher.fetch_day(day()).await.unwrap();
    assert!(second.is_empty());
}

#[tokio::test]
async fn discovery_failure_is_fatal_for_the_day() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let cache = DocumentCache::open(dir.path()).unwrap();
    let session = session(&server);

    Mock::given(method("GET"))
        .and(path("/ll.php5"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(&session, &cache, "m-134", false, 0);
    let err = fetcher.fetch_day(day()).await.unwrap_err();
    assert!(
        matches!(err, FetchError::UnexpectedStatus { status: 500, .. }),
        "{err}"
    );
    assert!(!cache.is_marked_empty(day()), "a failed day is not an empty day");
}

#[tokio::test]
async fn offline_serves_cache_and_never_touches_the_network() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let cache = DocumentCache::open(dir.path()).unwrap();
    let session = session(&server);
    // No mocks mounted: any request would fail the test via connection to
    // an unmatched route returning 404.

    cache.store(day(), "1234567", "<html>offline</html>").unwrap();

    let fetcher = Fetcher::new(&session, &cache, "m-134", true, 0);
    let documents = fetcher.fetch_day(day()).await.unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].html, "<html>offline</html>");
}

#[tokio::test]
async fn offline_with_a_cold_cache_fails_explicitly() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let cache = DocumentCache::open(dir.path()).unwrap();
    let session = session(&server);

    let fetcher = Fetcher::new(&session, &cache, "m-134", true, 0);
    let err = fetcher.fetch_day(day()).await.unwrap_err();
    assert!(matches!(err, FetchError::OfflineCacheMiss { .. }), "{err}");
}

#[tokio::test]
async fn offline_respects_the_empty_day_sentinel() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let cache = DocumentCache::open(dir.path()).unwrap();
    let session = session(&server);

    cache.mark_empty(day()).unwrap();

    let fetcher = Fetcher::new(&session, &cache, "m-134", true, 0);
    let documents = fetcher.fetch_day(day()).await.unwrap();
    assert!(documents.is_empty());
}
