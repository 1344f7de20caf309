use crate::config::Config;
use crate::error::FetchError;
use crate::github::types::{Contributor, Repository};
use octocrab::service::middleware::retry::RetryConfig;
use octocrab::Octocrab;
use serde::de::DeserializeOwned;

/// Pixel edge requested from the avatar CDN; the terminal scales it down.
const AVATAR_PX: u32 = 96;

#[derive(Clone)]
pub struct GitHubClient {
    octo: Octocrab,
    http: reqwest::Client,
    repos_url: String,
}

impl GitHubClient {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        // one request per fetch, no retries
        let octo = Octocrab::builder()
            .add_retry_config(RetryConfig::None)
            .base_uri(config.api_base.as_str())
            .map_err(|e| FetchError::Network(e.to_string()))?
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("roster/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            octo,
            http,
            repos_url: config.repos_url(),
        })
    }

    /// One GET, decoded as JSON. Status >= 400 is an error even when the body
    /// is valid JSON; an empty success body decodes as `null`. A redirect is
    /// followed once, as for moved or renamed repositories.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        tracing::debug!(url, "GET");
        let mut response = self
            .octo
            ._get(url)
            .await
            .map_err(|e| network_error(url, e))?;

        if response.status().is_redirection() {
            let location = response
                .headers()
                .get("location")
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            if let Some(location) = location {
                tracing::info!(url, location = %location, "following redirect");
                response = self
                    .octo
                    ._get(location.as_str())
                    .await
                    .map_err(|e| network_error(&location, e))?;
            }
        }

        let status = response.status();
        if status.as_u16() >= 400 {
            tracing::warn!(url, status = status.as_u16(), "request rejected");
            return Err(FetchError::Status {
                code: status.as_u16(),
                text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = self
            .octo
            .body_to_string(response)
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        decode_body(&body)
    }

    pub async fn fetch_repos(&self) -> Result<Vec<Repository>, FetchError> {
        let repos: Option<Vec<Repository>> = self.fetch_json(&self.repos_url).await?;
        let repos = repos.unwrap_or_default();
        tracing::info!(count = repos.len(), "repositories loaded");
        Ok(repos)
    }

    pub async fn fetch_contributors(&self, url: &str) -> Result<Vec<Contributor>, FetchError> {
        // 204 No Content for empty repositories
        let list: Option<Vec<Contributor>> = self.fetch_json(url).await?;
        Ok(list.unwrap_or_default())
    }

    pub async fn fetch_avatar(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let url = sized_avatar_url(url, AVATAR_PX);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(FetchError::Status {
                code: status.as_u16(),
                text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

fn network_error(url: &str, e: octocrab::Error) -> FetchError {
    tracing::warn!(url, error = %e, "request failed");
    FetchError::Network(e.to_string())
}

fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, FetchError> {
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))
}

fn sized_avatar_url(url: &str, px: u32) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}s={px}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GitHubClient {
        let config = Config {
            api_base: server.uri(),
            ..Config::default()
        };
        GitHubClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn repos_are_fetched_from_org_endpoint_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/orgs/HackYourFuture/repos"))
            .and(query_param("per_page", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 2, "name": "b", "html_url": "h2", "forks_count": 1,
                 "updated_at": "2018-01-01T00:00:00Z", "contributors_url": "c2"},
                {"id": 1, "name": "a", "html_url": "h1", "forks_count": 0,
                 "updated_at": "2018-01-02T00:00:00Z", "contributors_url": "c1",
                 "description": "first"}
            ])))
            .mount(&server)
            .await;

        let repos = client_for(&server).fetch_repos().await.unwrap();
        let ids: Vec<u64> = repos.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(repos[1].description.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn not_found_maps_to_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "message": "Not Found",
                "documentation_url": "https://docs.github.com/rest"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_repos().await.unwrap_err();
        assert_eq!(
            err,
            FetchError::Status {
                code: 404,
                text: "Not Found".to_string()
            }
        );
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn contributors_follow_absolute_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/HackYourFuture/a/contributors"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"login": "zed", "avatar_url": "av1", "html_url": "p1", "contributions": 3},
                {"login": "amy", "avatar_url": "av2", "html_url": "p2", "contributions": 40}
            ])))
            .mount(&server)
            .await;

        let url = format!("{}/repos/HackYourFuture/a/contributors", server.uri());
        let list = client_for(&server).fetch_contributors(&url).await.unwrap();
        let logins: Vec<&str> = list.iter().map(|c| c.login.as_str()).collect();
        assert_eq!(logins, vec!["zed", "amy"]);
    }

    #[tokio::test]
    async fn empty_contributors_body_is_an_empty_roster() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let url = format!("{}/repos/x/empty/contributors", server.uri());
        let list = client_for(&server).fetch_contributors(&url).await.unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        // unpooled, so dropping it actually closes the listener
        let server = MockServer::builder().start().await;
        let client = client_for(&server);
        let url = format!("{}/gone", server.uri());
        drop(server);

        let err = client.fetch_contributors(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
        assert_eq!(err.to_string(), "Network request failed");
    }

    #[tokio::test]
    async fn server_error_is_requested_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let url = format!("{}/repos/HackYourFuture/a/contributors", server.uri());
        let err = client_for(&server).fetch_contributors(&url).await.unwrap_err();
        assert_eq!(err.to_string(), "Network error: 500 - Internal Server Error");

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn moved_repository_redirect_is_followed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/HackYourFuture/old/contributors"))
            .respond_with(
                ResponseTemplate::new(301)
                    .insert_header(
                        "location",
                        format!("{}/repositories/7/contributors", server.uri()).as_str(),
                    )
                    .set_body_json(serde_json::json!({"message": "Moved Permanently"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repositories/7/contributors"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"login": "amy", "avatar_url": "av", "html_url": "p", "contributions": 5}
            ])))
            .mount(&server)
            .await;

        let url = format!("{}/repos/HackYourFuture/old/contributors", server.uri());
        let list = client_for(&server).fetch_contributors(&url).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].login, "amy");
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn malformed_contributors_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
            .mount(&server)
            .await;

        let url = format!("{}/repos/HackYourFuture/a/contributors", server.uri());
        let err = client_for(&server).fetch_contributors(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
        assert!(err.to_string().starts_with("Invalid response: "));
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let err = decode_body::<Vec<Contributor>>("<html>").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn avatar_size_param_appends_to_existing_query() {
        assert_eq!(
            sized_avatar_url("https://avatars.githubusercontent.com/u/1?v=4", 96),
            "https://avatars.githubusercontent.com/u/1?v=4&s=96"
        );
        assert_eq!(sized_avatar_url("https://x/u/1", 48), "https://x/u/1?s=48");
    }
}
