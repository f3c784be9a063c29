pub mod auth;
pub mod model;

use anyhow::{Result, anyhow};
use http::header::ACCEPT;
use octocrab::Octocrab;
use octocrab::service::middleware::retry::RetryConfig;
use tracing::{debug, warn};

use super::ReviewSource;
use crate::config::GithubConfig;
use crate::domain::reviewer::ReviewRequestRecord;
use crate::error::FetchFailure;
use model::PullRequest;

const ACCEPT_V3: &str = "application/vnd.github.v3+json";
const PAGE_SIZE: u32 = 100;
const STATE_FILTER: &str = "all";

/// Route of the pull-request listing, relative to the API base.
///
/// octocrab prefixes its `base_uri` (path included), so this must not carry
/// the base itself.
pub fn pulls_route(cfg: &GithubConfig) -> String {
    format!(
        "/repos/{}/{}/pulls?state={STATE_FILTER}&per_page={PAGE_SIZE}",
        cfg.owner, cfg.repo
    )
}

/// Full URL of the listing, for log lines.
pub fn pulls_url(cfg: &GithubConfig) -> String {
    format!("{}{}", cfg.api_base.trim_end_matches('/'), pulls_route(cfg))
}

/// Decode a pull-request listing body. Any malformed entry fails the whole body.
pub fn decode_records(body: &str) -> Result<Vec<ReviewRequestRecord>, FetchFailure> {
    let prs: Vec<PullRequest> = serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, "pull request listing did not decode");
        FetchFailure::decode()
    })?;
    Ok(prs.into_iter().map(ReviewRequestRecord::from).collect())
}

/// Read-only client for a single repository's pull-request listing.
pub struct GithubClient {
    octo: Octocrab,
    route: String,
    url: String,
}

impl GithubClient {
    /// Build the client. Must be called inside a Tokio runtime.
    pub fn new(cfg: &GithubConfig) -> Result<Self> {
        let mut builder = Octocrab::builder()
            .personal_token(cfg.token.clone())
            .base_uri(cfg.api_base.as_str())
            .map_err(|e| anyhow!("invalid GITHUB_API_URL: {e}"))?
            .add_header(ACCEPT, ACCEPT_V3.to_string());
        // One request per fetch: no retries on 5xx.
        builder.add_retry_config(RetryConfig::None);
        let octo = builder
            .build()
            .map_err(|e| anyhow!("failed to init GitHub client: {e}"))?;
        Ok(Self {
            octo,
            route: pulls_route(cfg),
            url: pulls_url(cfg),
        })
    }

    async fn fetch_body(&self) -> Result<String, FetchFailure> {
        let response = self.octo._get(self.route.as_str()).await.map_err(|e| {
            warn!(error = %e, url = %self.url, "GitHub request failed");
            FetchFailure::transport()
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), url = %self.url, "GitHub returned an error status");
            return Err(FetchFailure::status(status.as_u16()));
        }

        self.octo.body_to_string(response).await.map_err(|e| {
            warn!(error = %e, "failed to read GitHub response body");
            FetchFailure::transport()
        })
    }
}

impl ReviewSource for GithubClient {
    async fn fetch_review_requests(&self) -> Result<Vec<ReviewRequestRecord>, FetchFailure> {
        debug!(url = %self.url, "fetching pull requests");
        let body = self.fetch_body().await?;
        let records = decode_records(&body)?;
        debug!(pull_requests = records.len(), "decoded pull requests");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;
    use crate::error::FailureKind;

    /// Local HTTP/1.1 server answering every request with the same canned
    /// response. Returns its base URL and the raw request heads it received.
    async fn canned_server(status: &'static str, body: &'static str) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut head = Vec::new();
                let mut chunk = [0u8; 1024];
                loop {
                    let n = socket.read(&mut chunk).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    head.extend_from_slice(&chunk[..n]);
                    if head.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                log.lock().unwrap().push(String::from_utf8_lossy(&head).into_owned());
                let response = format!(
                    "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        (format!("http://{addr}"), seen)
    }

    fn requests(seen: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
        seen.lock().unwrap().clone()
    }

    fn cfg(api_base: &str) -> GithubConfig {
        GithubConfig {
            owner: "octo-org".to_string(),
            repo: "hello.world".to_string(),
            token: "t0ken".to_string(),
            api_base: api_base.to_string(),
        }
    }

    #[test]
    fn route_is_relative_to_the_api_base() {
        assert_eq!(
            pulls_route(&cfg("https://ghe.example.com/api/v3")),
            "/repos/octo-org/hello.world/pulls?state=all&per_page=100"
        );
    }

    #[test]
    fn url_requests_all_states_and_one_full_page() {
        assert_eq!(
            pulls_url(&cfg("https://api.github.com")),
            "https://api.github.com/repos/octo-org/hello.world/pulls?state=all&per_page=100"
        );
    }

    #[test]
    fn url_tolerates_trailing_slash_on_enterprise_base() {
        assert_eq!(
            pulls_url(&cfg("https://ghe.example.com/api/v3/")),
            "https://ghe.example.com/api/v3/repos/octo-org/hello.world/pulls?state=all&per_page=100"
        );
    }

    #[test]
    fn decodes_requested_reviewers_and_ignores_other_fields() {
        let body = r#"[
            {"number": 7, "title": "Fix", "requested_reviewers": [
                {"login": "alice", "id": 1, "type": "User"},
                {"login": "bob", "site_admin": false}
            ], "requested_teams": []},
            {"number": 8, "requested_reviewers": []}
        ]"#;
        let records = decode_records(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            ReviewRequestRecord::from_logins(["alice", "bob"])
        );
        assert!(records[1].reviewers.is_empty());
    }

    #[test]
    fn empty_listing_decodes_to_no_records() {
        assert!(decode_records("[]").unwrap().is_empty());
    }

    #[test]
    fn malformed_body_is_a_decode_failure() {
        let err = decode_records("{\"message\": \"Not Found\"").unwrap_err();
        assert_eq!(err.kind(), FailureKind::Decode);
    }

    #[test]
    fn one_bad_entry_fails_the_whole_listing() {
        let body = r#"[
            {"requested_reviewers": [{"login": "alice"}]},
            {"requested_reviewers": [{"name": "no login"}]}
        ]"#;
        assert!(decode_records(body).is_err());
    }

    #[test]
    fn error_object_instead_of_array_fails() {
        let body = r#"{"message": "Bad credentials"}"#;
        assert_eq!(decode_records(body).unwrap_err().kind(), FailureKind::Decode);
    }

    #[tokio::test]
    async fn unreachable_host_resolves_to_transport_failure() {
        // Port 1 on loopback is closed; the connect fails immediately.
        let client = GithubClient::new(&cfg("http://127.0.0.1:1")).unwrap();
        let err = client.fetch_review_requests().await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
    }

    #[tokio::test]
    async fn sends_one_authenticated_get_to_the_listing() {
        let (base, seen) = canned_server(
            "200 OK",
            r#"[{"requested_reviewers":[{"login":"alice"},{"login":"bob"}]},{"requested_reviewers":[{"login":"alice"}]}]"#,
        )
        .await;
        let client = GithubClient::new(&cfg(&base)).unwrap();

        let records = client.fetch_review_requests().await.unwrap();
        assert_eq!(
            records,
            vec![
                ReviewRequestRecord::from_logins(["alice", "bob"]),
                ReviewRequestRecord::from_logins(["alice"]),
            ]
        );

        let reqs = requests(&seen);
        assert_eq!(reqs.len(), 1);
        let head = reqs[0].to_ascii_lowercase();
        assert!(
            head.starts_with("get /repos/octo-org/hello.world/pulls?state=all&per_page=100 http/1.1"),
            "{head}"
        );
        assert_eq!(head.matches("authorization: bearer t0ken").count(), 1, "{head}");
        assert_eq!(
            head.matches("accept: application/vnd.github.v3+json").count(),
            1,
            "{head}"
        );
    }

    #[tokio::test]
    async fn enterprise_base_path_is_sent_once() {
        let (base, seen) = canned_server("200 OK", "[]").await;
        let client = GithubClient::new(&cfg(&format!("{base}/api/v3"))).unwrap();

        assert!(client.fetch_review_requests().await.unwrap().is_empty());

        let reqs = requests(&seen);
        assert_eq!(reqs.len(), 1);
        assert!(
            reqs[0].starts_with("GET /api/v3/repos/octo-org/hello.world/pulls?state=all&per_page=100 "),
            "{}",
            reqs[0]
        );
    }

    #[tokio::test]
    async fn not_found_is_a_status_failure() {
        let (base, seen) = canned_server("404 Not Found", r#"{"message":"Not Found"}"#).await;
        let client = GithubClient::new(&cfg(&base)).unwrap();

        let err = client.fetch_review_requests().await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Status(404));
        assert_eq!(requests(&seen).len(), 1);
    }

    #[tokio::test]
    async fn server_error_is_not_retried() {
        let (base, seen) = canned_server("500 Internal Server Error", "{}").await;
        let client = GithubClient::new(&cfg(&base)).unwrap();

        let err = client.fetch_review_requests().await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Status(500));
        assert_eq!(requests(&seen).len(), 1);
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_decode_failure() {
        let (base, _seen) = canned_server("200 OK", r#"[{"requested_reviewers": "#).await;
        let client = GithubClient::new(&cfg(&base)).unwrap();

        let err = client.fetch_review_requests().await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Decode);
    }
}
