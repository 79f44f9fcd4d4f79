//! Airtable REST API client

use anyhow::Context;
use reqwest::Url;
use reqwest::header::CONTENT_TYPE;
use tabline_core::{FetchError, SHARED_RUNTIME, http_client};

use crate::record::Page;

/// Default REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.airtable.com/v0/";

/// Environment variable holding the bearer token
pub const TOKEN_ENV_VAR: &str = "AIRTABLE_API_KEY";

/// Missing or blank API token. Fatal for the whole run.
#[derive(Debug)]
pub struct MissingCredential;

impl std::fmt::Display for MissingCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{TOKEN_ENV_VAR} is not set (or empty)")
    }
}

impl std::error::Error for MissingCredential {}

/// Non-empty bearer token
#[derive(Clone)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(raw: &str) -> Result<Self, MissingCredential> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(MissingCredential);
        }
        Ok(Self(raw.to_string()))
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiToken(***)")
    }
}

/// Client settings
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: ApiToken,
}

impl ApiConfig {
    pub fn new(token: ApiToken) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token,
        }
    }
}

/// Table (and optional view) to read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableQuery {
    pub base_id: String,
    pub table_id: String,
    pub view_id: Option<String>,
}

impl std::fmt::Display for TableQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "base '{}', table '{}'", self.base_id, self.table_id)?;
        match &self.view_id {
            Some(view) => write!(f, ", view '{view}'"),
            None => write!(f, " (no specific view)"),
        }
    }
}

/// Anything that can serve one page of a table.
pub trait PageSource {
    /// Fetch the page starting at `offset` (`None` for the first page).
    fn fetch_page(&self, query: &TableQuery, offset: Option<&str>) -> Result<Page, FetchError>;
}

impl<T: PageSource + ?Sized> PageSource for &T {
    fn fetch_page(&self, query: &TableQuery, offset: Option<&str>) -> Result<Page, FetchError> {
        (**self).fetch_page(query, offset)
    }
}

/// Blocking Airtable client on the shared runtime
#[derive(Debug)]
pub struct AirtableClient {
    base_url: Url,
    token: ApiToken,
}

impl AirtableClient {
    pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid API base URL: {}", config.base_url))?;
        anyhow::ensure!(
            !base_url.cannot_be_a_base(),
            "API base URL cannot carry a path: {base_url}"
        );
        Ok(Self {
            base_url,
            token: config.token,
        })
    }

    /// `{base_url}/{base_id}/{table_id}?view=..&offset=..`, ids percent-encoded
    pub fn page_url(&self, query: &TableQuery, offset: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend([query.base_id.as_str(), query.table_id.as_str()]);
        }
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(view) = &query.view_id {
                pairs.append_pair("view", view);
            }
            if let Some(offset) = offset {
                pairs.append_pair("offset", offset);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        url
    }
}

impl PageSource for AirtableClient {
    fn fetch_page(&self, query: &TableQuery, offset: Option<&str>) -> Result<Page, FetchError> {
        let url = self.page_url(query, offset);
        SHARED_RUNTIME.block_on(async {
            let resp = http_client()
                .get(url)
                .bearer_auth(self.token.expose())
                .header(CONTENT_TYPE, "application/json")
                .send()
                .await
                .map_err(FetchError::from_reqwest)?;
            let status = resp.status();
            let body = resp.text().await.map_err(FetchError::from_reqwest)?;
            if !status.is_success() {
                return Err(FetchError::from_status(status, &body));
            }
            Page::from_json(&body)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::JoinHandle;

    use super::*;

    fn client() -> AirtableClient {
        AirtableClient::new(ApiConfig::new(ApiToken::new("patTEST").unwrap())).unwrap()
    }

    fn query(view: Option<&str>) -> TableQuery {
        TableQuery {
            base_id: "appABC".to_string(),
            table_id: "tblXYZ".to_string(),
            view_id: view.map(String::from),
        }
    }

    #[test]
    fn token_must_not_be_blank() {
        assert!(ApiToken::new("").is_err());
        assert!(ApiToken::new("   ").is_err());
        assert_eq!(ApiToken::new(" patX ").unwrap().expose(), "patX");
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = ApiToken::new("patSECRET").unwrap();
        assert!(!format!("{token:?}").contains("SECRET"));
    }

    #[test]
    fn first_page_url_without_view() {
        let url = client().page_url(&query(None), None);
        assert_eq!(url.as_str(), "https://api.airtable.com/v0/appABC/tblXYZ");
    }

    #[test]
    fn page_url_with_view_and_offset() {
        let url = client().page_url(&query(Some("viwGrid")), Some("itr1/rec9"));
        assert_eq!(
            url.as_str(),
            "https://api.airtable.com/v0/appABC/tblXYZ?view=viwGrid&offset=itr1%2Frec9"
        );
    }

    #[test]
    fn table_name_is_percent_encoded() {
        let mut q = query(None);
        q.table_id = "Workflow Steps".to_string();
        let url = client().page_url(&q, None);
        assert_eq!(
            url.as_str(),
            "https://api.airtable.com/v0/appABC/Workflow%20Steps"
        );
    }

    #[test]
    fn base_url_without_trailing_slash() {
        let mut config = ApiConfig::new(ApiToken::new("patTEST").unwrap());
        config.base_url = "http://localhost:8080/v0".to_string();
        let client = AirtableClient::new(config).unwrap();
        assert_eq!(
            client.page_url(&query(None), None).as_str(),
            "http://localhost:8080/v0/appABC/tblXYZ"
        );
    }

    #[test]
    fn invalid_base_url() {
        let mut config = ApiConfig::new(ApiToken::new("patTEST").unwrap());
        config.base_url = "not a url".to_string();
        assert!(AirtableClient::new(config).is_err());

        let mut config = ApiConfig::new(ApiToken::new("patTEST").unwrap());
        config.base_url = "mailto:ops@example.com".to_string();
        assert!(AirtableClient::new(config).is_err());
    }

    #[test]
    fn query_display() {
        assert_eq!(
            query(Some("viwGrid")).to_string(),
            "base 'appABC', table 'tblXYZ', view 'viwGrid'"
        );
        assert_eq!(
            query(None).to_string(),
            "base 'appABC', table 'tblXYZ' (no specific view)"
        );
    }

    /// Serve one canned HTTP response on a local port. The handle yields
    /// the raw request text.
    fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (AirtableClient, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8(request).unwrap()
        });

        let mut config = ApiConfig::new(ApiToken::new("patTEST").unwrap());
        config.base_url = format!("http://{addr}/v0/");
        (AirtableClient::new(config).unwrap(), handle)
    }

    #[test]
    fn fetch_page_sends_auth_and_decodes() {
        let (client, server) = serve_once(
            "200 OK",
            r#"{"records":[{"id":"rec1","fields":{"Name":"Intake"}}],"offset":"itr2"}"#,
        );

        let page = client.fetch_page(&query(Some("viwGrid")), Some("itr1")).unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].id, "rec1");
        assert_eq!(page.offset.as_deref(), Some("itr2"));

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /v0/appABC/tblXYZ?view=viwGrid&offset=itr1 HTTP/1.1\r\n"));
        assert!(request
            .to_ascii_lowercase()
            .contains("authorization: bearer pattest\r\n"));
    }

    #[test]
    fn fetch_page_reports_status_and_body() {
        let (client, server) = serve_once(
            "422 Unprocessable Entity",
            r#"{"error":{"type":"VIEW_NAME_NOT_FOUND"}}"#,
        );

        let err = client.fetch_page(&query(Some("viwGone")), None).unwrap_err();
        server.join().unwrap();
        assert_eq!(err.status(), Some(422));
        let message = err.to_string();
        assert!(message.starts_with("HTTP 422"));
        assert!(message.contains("VIEW_NAME_NOT_FOUND"));
    }

    #[test]
    fn fetch_page_rejects_undecodable_success() {
        let (client, server) = serve_once("200 OK", "<html>maintenance</html>");

        let err = client.fetch_page(&query(None), None).unwrap_err();
        server.join().unwrap();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    /// Live API check
    /// Run with: AIRTABLE_API_KEY=... AIRTABLE_TEST_BASE=app.. AIRTABLE_TEST_TABLE=tbl.. \
    ///   cargo test -p tabline-airtable -- --ignored live_first_page
    #[test]
    #[ignore]
    fn live_first_page() {
        let token = ApiToken::new(&std::env::var(TOKEN_ENV_VAR).unwrap()).unwrap();
        let client = AirtableClient::new(ApiConfig::new(token)).unwrap();
        let q = TableQuery {
            base_id: std::env::var("AIRTABLE_TEST_BASE").unwrap(),
            table_id: std::env::var("AIRTABLE_TEST_TABLE").unwrap(),
            view_id: None,
        };
        let page = client.fetch_page(&q, None).expect("first page");
        assert!(page.records.len() <= 100);
    }
}
