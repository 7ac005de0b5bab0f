//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: HTTP endpoint → paginator → state stream

use pagestream::{
    EndOfListListener, Error, HttpPageSource, HttpSourceConfig, PageBasedPaginator, PageState,
    PaginationState, PaginatorConfig, StateKind,
};
use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Task {
    id: u32,
    title: String,
}

fn tasks(ids: std::ops::RangeInclusive<u32>) -> Value {
    let items: Vec<Value> = ids
        .map(|id| json!({"id": id, "title": format!("task {id}")}))
        .collect();
    json!({"data": {"items": items}})
}

async fn mount_page(server: &MockServer, page: u32, body: Value) {
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn task_source(server: &MockServer) -> HttpPageSource<Task> {
    let config = HttpSourceConfig::new(format!("{}/tasks", server.uri()))
        .with_records_path("$.data.items");
    HttpPageSource::new(config).unwrap()
}

async fn next_state<E: Clone>(rx: &mut broadcast::Receiver<PageState<E>>) -> PageState<E> {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for state")
        .expect("state channel closed")
}

fn success_len<E: std::fmt::Debug>(state: &PageState<E>) -> usize {
    match state {
        PaginationState::Success(items) => items.len(),
        other => panic!("Expected Success, got {other:?}"),
    }
}

// ============================================================================
// Paging Flow Tests
// ============================================================================

#[tokio::test]
async fn test_pages_through_endpoint_until_end() {
    let server = MockServer::start().await;
    mount_page(&server, 1, tasks(1..=3)).await;
    mount_page(&server, 2, tasks(4..=6)).await;
    mount_page(&server, 3, tasks(7..=7)).await;

    let paginator: PageBasedPaginator<Task> =
        PageBasedPaginator::new(PaginatorConfig::new(3), task_source(&server)).unwrap();
    let mut rx = paginator.subscribe();

    paginator.load_next_page();
    assert_eq!(next_state(&mut rx).await.kind(), StateKind::LoadingInitial);
    assert_eq!(success_len(&next_state(&mut rx).await), 3);

    paginator.load_next_page();
    assert_eq!(next_state(&mut rx).await.kind(), StateKind::LoadingMore);
    assert_eq!(success_len(&next_state(&mut rx).await), 6);

    paginator.load_next_page();
    assert_eq!(next_state(&mut rx).await.kind(), StateKind::LoadingMore);
    let last = next_state(&mut rx).await;
    assert_eq!(success_len(&last), 7);
    assert_eq!(
        last.data().and_then(|items| items.last()).cloned(),
        Some(Task {
            id: 7,
            title: "task 7".to_string()
        })
    );
    assert!(paginator.is_last_page());

    paginator.load_next_page();
    assert!(next_state(&mut rx).await.is_end());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    assert!(requests
        .iter()
        .all(|r| r.url.query().unwrap_or_default().contains("page_size=3")));
}

#[tokio::test]
async fn test_failed_page_is_retried_without_skipping() {
    let server = MockServer::start().await;
    mount_page(&server, 1, tasks(1..=2)).await;
    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(&server, 2, tasks(3..=3)).await;

    let paginator: PageBasedPaginator<Task> =
        PageBasedPaginator::new(PaginatorConfig::new(2), task_source(&server)).unwrap();
    let mut rx = paginator.subscribe();

    paginator.load_next_page();
    next_state(&mut rx).await;
    assert_eq!(success_len(&next_state(&mut rx).await), 2);

    paginator.load_next_page();
    assert_eq!(next_state(&mut rx).await.kind(), StateKind::LoadingMore);
    match next_state(&mut rx).await {
        PaginationState::Error {
            accumulated_size,
            cause,
        } => {
            assert_eq!(accumulated_size, 2);
            assert!(cause.is_fetch());
            assert!(cause.is_retryable());
        }
        other => panic!("Expected Error, got {other:?}"),
    }
    assert_eq!(paginator.current_page(), 2);

    paginator.load_next_page();
    assert_eq!(next_state(&mut rx).await.kind(), StateKind::LoadingMore);
    assert_eq!(success_len(&next_state(&mut rx).await), 3);
    assert!(paginator.is_last_page());
}

#[tokio::test]
async fn test_refresh_after_end_restarts_at_first_page() {
    let server = MockServer::start().await;
    mount_page(&server, 1, tasks(1..=1)).await;

    let paginator: PageBasedPaginator<Task> =
        PageBasedPaginator::new(PaginatorConfig::new(5), task_source(&server)).unwrap();
    let mut rx = paginator.subscribe();

    paginator.load_next_page();
    next_state(&mut rx).await;
    assert_eq!(success_len(&next_state(&mut rx).await), 1);
    paginator.load_next_page();
    assert!(next_state(&mut rx).await.is_end());

    paginator.refresh_page();
    assert_eq!(next_state(&mut rx).await.kind(), StateKind::LoadingInitial);
    assert_eq!(success_len(&next_state(&mut rx).await), 1);
    assert_eq!(paginator.item_count(), 1);

    let pages: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.query().unwrap_or_default().to_string())
        .collect();
    assert_eq!(pages.len(), 2);
    assert!(pages.iter().all(|q| q.contains("page=1")));
}

// ============================================================================
// Transformation Tests
// ============================================================================

#[tokio::test]
async fn test_transformer_over_http_source() {
    let server = MockServer::start().await;
    mount_page(&server, 1, tasks(1..=2)).await;

    let transformer = |task: Task| async move { Ok::<_, Error>(task.title.to_uppercase()) };
    let paginator: PageBasedPaginator<Task, String> =
        PageBasedPaginator::with_transformer(PaginatorConfig::new(10), task_source(&server), transformer)
            .unwrap();
    let mut rx = paginator.subscribe();

    paginator.load_next_page();
    next_state(&mut rx).await;
    match next_state(&mut rx).await {
        PaginationState::Success(items) => {
            assert_eq!(items, vec!["TASK 1".to_string(), "TASK 2".to_string()]);
        }
        other => panic!("Expected Success, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_records_surface_as_error() {
    let server = MockServer::start().await;
    mount_page(&server, 1, json!({"data": {"items": [{"id": "x"}]}})).await;

    let paginator: PageBasedPaginator<Task> =
        PageBasedPaginator::new(PaginatorConfig::new(10), task_source(&server)).unwrap();
    let mut rx = paginator.subscribe();

    paginator.load_next_page();
    next_state(&mut rx).await;
    let state = next_state(&mut rx).await;
    assert!(state.is_error());
    assert!(!state.cause().unwrap().is_retryable());
    assert_eq!(paginator.current_page(), 1);
}

// ============================================================================
// Consumer-Driven Tests
// ============================================================================

#[tokio::test]
async fn test_scroll_listener_requests_next_page() {
    let server = MockServer::start().await;
    mount_page(&server, 1, tasks(1..=4)).await;
    mount_page(&server, 2, tasks(5..=8)).await;

    let paginator: Arc<PageBasedPaginator<Task>> = Arc::new(
        PageBasedPaginator::new(PaginatorConfig::new(4), task_source(&server)).unwrap(),
    );
    let mut rx = paginator.subscribe();
    let mut listener = EndOfListListener::new(1);

    paginator.load_next_page();
    next_state(&mut rx).await;
    let total = success_len(&next_state(&mut rx).await);

    assert!(!listener.observe(Some(1), total, &paginator));
    assert!(listener.observe(Some(2), total, &paginator));
    assert_eq!(next_state(&mut rx).await.kind(), StateKind::LoadingMore);
    assert_eq!(success_len(&next_state(&mut rx).await), 8);
}

#[tokio::test]
async fn test_removal_after_http_load() {
    let server = MockServer::start().await;
    mount_page(&server, 1, tasks(1..=3)).await;

    let paginator: PageBasedPaginator<Task> =
        PageBasedPaginator::new(PaginatorConfig::new(10), task_source(&server)).unwrap();
    let mut rx = paginator.subscribe();

    paginator.load_next_page();
    next_state(&mut rx).await;
    next_state(&mut rx).await;

    paginator.remove_items_by_ids([1_u32, 3], |task: &Task| task.id);
    match next_state(&mut rx).await {
        PaginationState::Update(items) => {
            assert_eq!(items.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2]);
        }
        other => panic!("Expected Update, got {other:?}"),
    }
}

#[tokio::test]
async fn test_config_file_drives_page_size() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("page_size", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tasks(1..=2)))
        .expect(1)
        .mount(&server)
        .await;

    let config = PaginatorConfig::from_yaml_str("page_size: 2\nexpose_accumulated_list: false\n")
        .unwrap();
    let paginator: PageBasedPaginator<Task> =
        PageBasedPaginator::new(config, task_source(&server)).unwrap();
    let mut rx = paginator.subscribe();

    paginator.load_next_page();
    next_state(&mut rx).await;
    assert_eq!(success_len(&next_state(&mut rx).await), 2);
    assert!(!paginator.is_last_page());
}
