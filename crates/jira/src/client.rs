//! Authenticated Jira REST client.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use ferry_core::remote::{AttachmentBackend, RemoteError};
use ferry_shared::{JiraConfig, TransferConfig};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde_json::Value;
use tracing::debug;

use crate::body::JiraBody;

/// Credentials sent with every request.
#[derive(Clone, PartialEq, Eq)]
pub enum JiraAuth {
    /// Username (Cloud email) and API token.
    Basic {
        /// Username.
        username: String,
        /// API token.
        api_token: String,
    },
    /// Personal access token.
    Bearer(String),
}

impl JiraAuth {
    /// Pick credentials from configuration. A personal token wins over
    /// username and API token.
    ///
    /// # Errors
    ///
    /// Returns an error if neither credential set is complete.
    pub fn from_config(config: &JiraConfig) -> Result<Self, RemoteError> {
        let present = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(String::from);

        if let Some(token) = present(&config.personal_token) {
            return Ok(Self::Bearer(token));
        }
        match (present(&config.username), present(&config.api_token)) {
            (Some(username), Some(api_token)) => Ok(Self::Basic {
                username,
                api_token,
            }),
            _ => Err(RemoteError::configuration(
                "set jira.personal_token, or both jira.username and jira.api_token",
            )),
        }
    }
}

impl fmt::Debug for JiraAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("api_token", &"***")
                .finish(),
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"***").finish(),
        }
    }
}

/// Jira REST v2 client.
#[derive(Debug, Clone)]
pub struct JiraClient {
    http: reqwest::Client,
    base_url: Url,
    auth: JiraAuth,
    chunk_size: usize,
}

impl JiraClient {
    /// Create a client with default HTTP settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid base URL.
    pub fn new(base_url: &str, auth: JiraAuth, chunk_size: usize) -> Result<Self, RemoteError> {
        Self::with_http(reqwest::Client::new(), base_url, auth, chunk_size)
    }

    /// Create a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if credentials are incomplete, the URL is invalid or
    /// the HTTP client cannot be built.
    pub fn from_config(jira: &JiraConfig, transfer: &TransferConfig) -> Result<Self, RemoteError> {
        let auth = JiraAuth::from_config(jira)?;
        // Per read, not per request: a large body that keeps flowing never times out.
        let timeout = Duration::from_secs(jira.timeout_secs);
        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .danger_accept_invalid_certs(!jira.ssl_verify)
            .user_agent(concat!("ferry/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RemoteError::configuration(e.to_string()))?;

        Self::with_http(http, &jira.url, auth, transfer.chunk_size)
    }

    fn with_http(
        http: reqwest::Client,
        base_url: &str,
        auth: JiraAuth,
        chunk_size: usize,
    ) -> Result<Self, RemoteError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| RemoteError::configuration(format!("invalid Jira URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(RemoteError::configuration(format!(
                "invalid Jira URL {base_url}: cannot be a base"
            )));
        }

        Ok(Self {
            http,
            base_url,
            auth,
            chunk_size: chunk_size.max(1),
        })
    }

    /// Base URL of the Jira instance.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an API URL under the base, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            JiraAuth::Basic {
                username,
                api_token,
            } => request.basic_auth(username, Some(api_token)),
            JiraAuth::Bearer(token) => request.bearer_auth(token),
        }
    }
}

fn request_error(err: &reqwest::Error) -> RemoteError {
    RemoteError::request(err.to_string())
}

fn check_status(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(RemoteError::status(status.as_u16(), response.url().as_str()))
    }
}

impl AttachmentBackend for JiraClient {
    type Body = JiraBody;

    async fn fetch_issue_attachments(&self, issue_key: &str) -> Result<Value, RemoteError> {
        let url = self.endpoint(&["rest", "api", "2", "issue", issue_key]);
        debug!(%url, "Fetching issue attachment field");

        let response = self
            .authorize(self.http.get(url))
            .query(&[("fields", "attachment")])
            .send()
            .await
            .map_err(|e| request_error(&e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(RemoteError::not_found(issue_key));
        }

        check_status(response)?
            .json::<Value>()
            .await
            .map_err(|e| RemoteError::decode(e.to_string()))
    }

    async fn stream_get(&self, url: &str) -> Result<JiraBody, RemoteError> {
        debug!(url, "Opening attachment stream");
        let response = self
            .authorize(self.http.get(url))
            .send()
            .await
            .map_err(|e| request_error(&e))?;

        Ok(JiraBody::new(check_status(response)?, self.chunk_size))
    }

    async fn create_attachment(
        &self,
        issue_key: &str,
        file_path: &Path,
    ) -> Result<Value, RemoteError> {
        let file = tokio::fs::File::open(file_path).await.map_err(|e| {
            RemoteError::request(format!("cannot open {}: {e}", file_path.display()))
        })?;
        let length = file
            .metadata()
            .await
            .map_err(|e| RemoteError::request(format!("cannot stat {}: {e}", file_path.display())))?
            .len();
        let filename = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let form = Form::new().part(
            "file",
            Part::stream_with_length(file, length).file_name(filename),
        );
        let url = self.endpoint(&["rest", "api", "2", "issue", issue_key, "attachments"]);
        debug!(%url, length, "Uploading attachment");

        let response = self
            .authorize(self.http.post(url))
            .header("X-Atlassian-Token", "no-check")
            .multipart(form)
            .send()
            .await
            .map_err(|e| request_error(&e))?;

        check_status(response)?
            .json::<Value>()
            .await
            .map_err(|e| RemoteError::decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn jira_config(
        username: Option<&str>,
        api_token: Option<&str>,
        personal_token: Option<&str>,
    ) -> JiraConfig {
        JiraConfig {
            url: "https://jira.example.com".to_string(),
            username: username.map(String::from),
            api_token: api_token.map(String::from),
            personal_token: personal_token.map(String::from),
            ssl_verify: true,
            timeout_secs: 75,
        }
    }

    #[test]
    fn test_auth_prefers_personal_token() {
        let auth = JiraAuth::from_config(&jira_config(Some("u"), Some("t"), Some("pat"))).unwrap();
        assert_eq!(auth, JiraAuth::Bearer("pat".to_string()));
    }

    #[test]
    fn test_auth_basic() {
        let auth = JiraAuth::from_config(&jira_config(Some("u"), Some("t"), None)).unwrap();
        assert_eq!(
            auth,
            JiraAuth::Basic {
                username: "u".to_string(),
                api_token: "t".to_string()
            }
        );
    }

    #[rstest]
    #[case(None, None, None)]
    #[case(Some("u"), None, None)]
    #[case(None, Some("t"), None)]
    #[case(Some("u"), Some(""), Some(""))]
    fn test_auth_incomplete(
        #[case] username: Option<&str>,
        #[case] api_token: Option<&str>,
        #[case] personal_token: Option<&str>,
    ) {
        let err =
            JiraAuth::from_config(&jira_config(username, api_token, personal_token)).unwrap_err();
        assert!(matches!(err, RemoteError::Configuration(_)));
    }

    #[test]
    fn test_auth_debug_redacts_secrets() {
        let basic = JiraAuth::Basic {
            username: "dev".to_string(),
            api_token: "s3cret".to_string(),
        };
        let bearer = JiraAuth::Bearer("t0ken".to_string());
        assert!(!format!("{basic:?}").contains("s3cret"));
        assert!(format!("{basic:?}").contains("dev"));
        assert!(!format!("{bearer:?}").contains("t0ken"));
    }

    #[rstest]
    #[case("https://jira.example.com", "https://jira.example.com/rest/api/2/issue/PROJ-1")]
    #[case("https://jira.example.com/", "https://jira.example.com/rest/api/2/issue/PROJ-1")]
    #[case("https://host/jira", "https://host/jira/rest/api/2/issue/PROJ-1")]
    fn test_endpoint_under_base(#[case] base: &str, #[case] expected: &str) {
        let client = JiraClient::new(base, JiraAuth::Bearer("t".into()), 8192).unwrap();
        assert_eq!(
            client.endpoint(&["rest", "api", "2", "issue", "PROJ-1"]).as_str(),
            expected
        );
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client =
            JiraClient::new("https://jira.example.com", JiraAuth::Bearer("t".into()), 8192).unwrap();
        let url = client.endpoint(&["rest", "api", "2", "issue", "../admin?x=1"]);
        assert_eq!(url.path(), "/rest/api/2/issue/..%2Fadmin%3Fx=1");
        assert!(url.query().is_none());
    }

    #[rstest]
    #[case("not a url")]
    #[case("mailto:someone@example.com")]
    fn test_invalid_base_url(#[case] base: &str) {
        let err = JiraClient::new(base, JiraAuth::Bearer("t".into()), 8192).unwrap_err();
        assert!(matches!(err, RemoteError::Configuration(_)));
    }

    #[test]
    fn test_from_config() {
        let client = JiraClient::from_config(
            &jira_config(Some("u"), Some("t"), None),
            &TransferConfig::default(),
        )
        .unwrap();
        assert_eq!(client.base_url().as_str(), "https://jira.example.com/");
        assert_eq!(client.chunk_size, 8192);
    }
}
