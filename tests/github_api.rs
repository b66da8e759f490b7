use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use build_trigger::github::{Client, ClientBuilder, Error};
use build_trigger::pipeline::run_once;
use build_trigger::run::RunStatus;
use build_trigger::{RepoId, TriggerConfig};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use tokio::net::TcpListener;

const TOKEN: &str = "ghp_fake_token";

#[derive(Debug, Clone, PartialEq)]
struct Recorded {
    method: &'static str,
    path: String,
    authorization: Option<String>,
    accept: Option<String>,
    user_agent: Option<String>,
    body: String,
}

/// Canned responses and a log of every request the fake API saw
struct FakeApi {
    commits_status: StatusCode,
    commits_body: String,
    dispatch_status: StatusCode,
    requests: Mutex<Vec<Recorded>>,
}

type Shared = Arc<FakeApi>;

impl FakeApi {
    fn new(commits_body: serde_json::Value) -> Self {
        Self {
            commits_status: StatusCode::OK,
            commits_body: commits_body.to_string(),
            dispatch_status: StatusCode::NO_CONTENT,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, method: &'static str, path: String, headers: &HeaderMap, body: &[u8]) {
        let get = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };
        self.requests.lock().unwrap().push(Recorded {
            method,
            path,
            authorization: get(header::AUTHORIZATION),
            accept: get(header::ACCEPT),
            user_agent: get(header::USER_AGENT),
            body: String::from_utf8_lossy(body).into_owned(),
        });
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

async fn list_commits(
    State(api): State<Shared>,
    Path((owner, repo)): Path<(String, String)>,
    headers: HeaderMap,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    api.record("GET", format!("/repos/{owner}/{repo}/commits"), &headers, &[]);
    (
        api.commits_status,
        [(header::CONTENT_TYPE, "application/json")],
        api.commits_body.clone(),
    )
}

async fn dispatch(
    State(api): State<Shared>,
    Path((owner, repo, workflow)): Path<(String, String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    api.record(
        "POST",
        format!("/repos/{owner}/{repo}/actions/workflows/{workflow}/dispatches"),
        &headers,
        &body,
    );
    api.dispatch_status
}

fn routes(api: Shared) -> Router {
    Router::new()
        .route("/repos/{owner}/{repo}/commits", get(list_commits))
        .route(
            "/repos/{owner}/{repo}/actions/workflows/{workflow}/dispatches",
            post(dispatch),
        )
        .with_state(api)
}

/// Serve `app` on an ephemeral local port.
async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("test listener should bind");
    let addr = listener.local_addr().expect("listener should expose local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake GitHub API should run");
    });
    addr
}

fn client_for(base_url: &str) -> Client {
    ClientBuilder::new(SecretString::new(TOKEN.to_string()))
        .base_url(base_url)
        .expect("base url should parse")
        .build()
        .expect("client should build")
}

fn config_for(base_url: &str, messages_marker: Option<&str>) -> TriggerConfig {
    let base_url = base_url.to_string();
    let marker = messages_marker.map(String::from);
    TriggerConfig::from_lookup(move |key| match key {
        "GITHUB_TOKEN" => Some(TOKEN.to_string()),
        "GITHUB_API_URL" => Some(base_url.clone()),
        "BUILD_MARKER" => marker.clone(),
        _ => None,
    })
    .expect("test config should load")
}

fn commits_json(messages: &[&str]) -> serde_json::Value {
    serde_json::Value::Array(
        messages
            .iter()
            .enumerate()
            .map(|(i, message)| {
                serde_json::json!({
                    "sha": format!("{:040x}", 0xabc00 + i),
                    "node_id": "C_kwDO",
                    "html_url": format!("https://github.com/aayush2622/Dartotsu/commit/{i}"),
                    "commit": {
                        "author": { "name": "dev", "email": "dev@example.com", "date": "2024-01-01T00:00:00Z" },
                        "message": message,
                        "comment_count": 0
                    },
                    "parents": []
                })
            })
            .collect(),
    )
}

#[tokio::test]
async fn lists_commits_with_expected_headers() {
    let api = Arc::new(FakeApi::new(commits_json(&["fix typo", "release [build.42] done"])));
    let addr = serve(routes(api.clone())).await;
    let client = client_for(&format!("http://{addr}"));

    let repo = RepoId::parse("aayush2622/Dartotsu").unwrap();
    let commits = client.get_commits(&repo).await.expect("listing should succeed");

    let messages: Vec<&str> = commits.iter().map(|c| c.message()).collect();
    assert_eq!(messages, vec!["fix typo", "release [build.42] done"]);
    assert_eq!(commits[0].sha.as_deref(), Some(format!("{:040x}", 0xabc00).as_str()));
    assert_eq!(
        api.requests(),
        vec![Recorded {
            method: "GET",
            path: "/repos/aayush2622/Dartotsu/commits".to_string(),
            authorization: Some(format!("token {TOKEN}")),
            accept: Some("application/vnd.github.v3+json".to_string()),
            user_agent: Some("build_trigger".to_string()),
            body: String::new(),
        }]
    );
}

#[tokio::test]
async fn dispatch_posts_ref_body() {
    let api = Arc::new(FakeApi::new(commits_json(&[])));
    let addr = serve(routes(api.clone())).await;
    let client = client_for(&format!("http://{addr}"));

    let repo = RepoId::parse("grayankit/Dartotsu-Downloader").unwrap();
    let body = client
        .create_workflow_dispatch(&repo, "main.yml", "main")
        .await
        .expect("dispatch should succeed");

    assert_eq!(body, "");
    let requests = api.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(
        requests[0].path,
        "/repos/grayankit/Dartotsu-Downloader/actions/workflows/main.yml/dispatches"
    );
    assert_eq!(requests[0].authorization, Some(format!("token {TOKEN}")));
    let sent: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(sent, serde_json::json!({ "ref": "main" }));
}

#[tokio::test]
async fn error_status_carries_github_message() {
    let mut fake = FakeApi::new(serde_json::json!({
        "message": "Bad credentials",
        "documentation_url": "https://docs.github.com/rest"
    }));
    fake.commits_status = StatusCode::UNAUTHORIZED;
    let addr = serve(routes(Arc::new(fake))).await;
    let client = client_for(&format!("http://{addr}"));

    let repo = RepoId::parse("aayush2622/Dartotsu").unwrap();
    match client.get_commits(&repo).await {
        Err(Error::Status { status, message }) => {
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(message, "Bad credentials");
        }
        other => panic!("expected a status error, got {:?}", other),
    }
}

#[tokio::test]
async fn base_url_path_prefix_is_kept() {
    let api = Arc::new(FakeApi::new(commits_json(&["x"])));
    let app = Router::new().nest("/api/v3", routes(api.clone()));
    let addr = serve(app).await;
    let client = client_for(&format!("http://{addr}/api/v3"));

    let repo = RepoId::parse("owner/name").unwrap();
    let commits = client.get_commits(&repo).await.expect("listing should succeed");
    assert_eq!(commits.len(), 1);
    assert_eq!(api.requests()[0].path, "/repos/owner/name/commits");
}

#[tokio::test]
async fn full_run_dispatches_once_on_match() {
    let api = Arc::new(FakeApi::new(commits_json(&["fix typo", "release [build.42] done"])));
    let addr = serve(routes(api.clone())).await;
    let base = format!("http://{addr}");
    let client = client_for(&base);

    let run = run_once(&client, &config_for(&base, None)).await;

    assert_eq!(run.status, RunStatus::Dispatched);
    let requests = api.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].path, "/repos/aayush2622/Dartotsu/commits");
    assert_eq!(
        requests[1].path,
        "/repos/grayankit/Dartotsu-Downloader/actions/workflows/main.yml/dispatches"
    );
    assert_eq!(requests[1].body, r#"{"ref":"main"}"#);
}

#[tokio::test]
async fn full_run_without_match_only_fetches() {
    let api = Arc::new(FakeApi::new(commits_json(&["fix typo", "[BUILD.1] wrong case"])));
    let addr = serve(routes(api.clone())).await;
    let base = format!("http://{addr}");
    let client = client_for(&base);

    let run = run_once(&client, &config_for(&base, None)).await;

    assert_eq!(run.status, RunStatus::NoMatch);
    assert_eq!(run.commits_seen, 2);
    assert_eq!(api.requests().len(), 1);
}

#[tokio::test]
async fn full_run_with_rejected_dispatch_ends_failed() {
    let mut fake = FakeApi::new(commits_json(&["[build.7"]));
    fake.dispatch_status = StatusCode::FORBIDDEN;
    let api = Arc::new(fake);
    let addr = serve(routes(api.clone())).await;
    let base = format!("http://{addr}");
    let client = client_for(&base);

    let run = run_once(&client, &config_for(&base, None)).await;

    assert_eq!(run.status, RunStatus::DispatchFailed);
    assert!(run.error.unwrap().contains("403"));
    // one fetch, one dispatch, no retry
    assert_eq!(api.requests().len(), 2);
}

#[tokio::test]
async fn full_run_with_unreachable_api_is_no_match() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let base = format!("http://{addr}");
    let client = client_for(&base);

    let run = run_once(&client, &config_for(&base, None)).await;

    assert_eq!(run.status, RunStatus::NoMatch);
    assert!(run.fetch_error.is_some());
    assert!(run.response.is_none());
}

#[tokio::test]
async fn custom_marker_is_honoured() {
    let api = Arc::new(FakeApi::new(commits_json(&["chore: [release] cut"])));
    let addr = serve(routes(api.clone())).await;
    let base = format!("http://{addr}");
    let client = client_for(&base);

    let run = run_once(&client, &config_for(&base, Some("[release]"))).await;

    assert_eq!(run.status, RunStatus::Dispatched);
    assert_eq!(api.requests().len(), 2);
}
