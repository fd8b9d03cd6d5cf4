// API client module: a small blocking HTTP client that talks to the
// talks registry. One request per invocation, so there is nothing to
// gain from an async runtime here.

use crate::error::TalksError;
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Registry host compiled into the binary.
pub const DEFAULT_BASE_URL: &str = "http://talks.cosi.clarkson.edu";
/// Overrides [`DEFAULT_BASE_URL`] when set.
pub const BASE_URL_ENV: &str = "TALKS_API_URL";
/// Request timeout in whole seconds.
pub const TIMEOUT_ENV: &str = "TALKS_API_TIMEOUT_SECS";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const VISIBLE_TALKS_PATH: &str = "/api/talks/visible";
pub const POST_TALK_PATH: &str = "/api/postTalk";

const JSON_UTF8: &str = "application/json; charset=utf-8";

/// A talk as the registry stores it. Missing or `null` fields decode to
/// their zero value and unknown fields are ignored, so older or newer
/// servers still parse.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Talk {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub desc: String,
    #[serde(deserialize_with = "null_as_default")]
    pub hidden: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Talk {
    /// Build an outgoing talk. `id` and `hidden` are owned by the server
    /// and always go out as their zero values.
    pub fn draft(name: impl Into<String>, kind: impl Into<String>, desc: impl Into<String>) -> Self {
        Talk {
            name: name.into(),
            kind: kind.into(),
            desc: desc.into(),
            ..Default::default()
        }
    }
}

/// Blocking client bound to one registry base URL.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url` with the given request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TalksError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TalksError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(ApiClient {
            client,
            base_url: normalize_base_url(base_url),
        })
    }

    /// Create a client configured from `TALKS_API_URL` and
    /// `TALKS_API_TIMEOUT_SECS`, falling back to the compiled-in registry
    /// and a 30 second timeout.
    pub fn from_env() -> Result<Self, TalksError> {
        let base_url = std::env::var(BASE_URL_ENV).ok();
        let timeout = parse_timeout(std::env::var(TIMEOUT_ENV).ok().as_deref())?;
        Self::new(base_url.as_deref().unwrap_or(DEFAULT_BASE_URL), timeout)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET the visible talks and decode them in server order.
    pub fn visible_talks(&self) -> Result<Vec<Talk>, TalksError> {
        let url = self.url(VISIBLE_TALKS_PATH);
        debug!(%url, "fetching visible talks");
        let res = self
            .client
            .get(&url)
            .send()
            .map_err(|source| TalksError::Transport { url: url.clone(), source })?;
        let res = ensure_success(&url, res)?;
        let talks: Vec<Talk> = res
            .json()
            .map_err(|source| TalksError::Decode { url: url.clone(), source })?;
        debug!(count = talks.len(), "decoded talks");
        Ok(talks)
    }

    /// POST a talk to the registry. The body is the JSON record followed
    /// by a newline.
    pub fn submit_talk(&self, talk: &Talk) -> Result<(), TalksError> {
        let url = self.url(POST_TALK_PATH);
        let mut body = serde_json::to_vec(talk)?;
        body.push(b'\n');

        debug!(%url, name = %talk.name, kind = %talk.kind, "submitting talk");
        let res = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, JSON_UTF8)
            .body(body)
            .send()
            .map_err(|source| TalksError::Transport { url: url.clone(), source })?;
        // Dropping the response releases the connection.
        ensure_success(&url, res).map(drop)
    }
}

/// Turn a non-2xx response into [`TalksError::Status`], keeping whatever
/// text the server sent back.
fn ensure_success(url: &str, res: Response) -> Result<Response, TalksError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().unwrap_or_default();
    warn!(%url, %status, "registry rejected request");
    Err(TalksError::Status {
        url: url.to_string(),
        status,
        body: body.trim().to_string(),
    })
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

/// Parse the timeout override. `None` or a blank value means the default.
pub fn parse_timeout(raw: Option<&str>) -> Result<Duration, TalksError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(DEFAULT_TIMEOUT),
        Some(v) => match v.parse::<u64>() {
            Ok(0) | Err(_) => Err(TalksError::Config(format!(
                "{TIMEOUT_ENV} must be a positive number of seconds, got {v:?}"
            ))),
            Ok(secs) => Ok(Duration::from_secs(secs)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client_for(server: &Server) -> ApiClient {
        ApiClient::new(&server.url(), Duration::from_secs(5)).unwrap()
    }

    /// Address of a loopback port that was just released, so nothing listens on it.
    fn closed_local_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    #[test]
    fn decode_tolerates_missing_and_unknown_fields() {
        let talks: Vec<Talk> = serde_json::from_str(
            r#"[{"id":7,"name":"A","type":"lightning","room":"SC 356"},{"desc":"only desc"}]"#,
        )
        .unwrap();
        assert_eq!(
            talks[0],
            Talk { id: 7, name: "A".into(), kind: "lightning".into(), desc: String::new(), hidden: false }
        );
        assert_eq!(talks[1], Talk { desc: "only desc".into(), ..Default::default() });
    }

    #[test]
    fn decode_treats_null_as_zero_value() {
        let talks: Vec<Talk> = serde_json::from_str(
            r#"[{"id":null,"name":"A","type":"z","desc":null,"hidden":null}]"#,
        )
        .unwrap();
        assert_eq!(talks[0], Talk { name: "A".into(), kind: "z".into(), ..Default::default() });
    }

    #[test]
    fn decode_accepts_negative_ids() {
        let talks: Vec<Talk> =
            serde_json::from_str(r#"[{"id":-3,"name":"A","type":"z","desc":"dz","hidden":false}]"#).unwrap();
        assert_eq!(talks[0].id, -3);
    }

    #[test]
    fn encode_uses_wire_field_names() {
        let value = serde_json::to_value(Talk::draft("Alice", "demo", "hello")).unwrap();
        assert_eq!(
            value,
            json!({"id": 0, "name": "Alice", "type": "demo", "desc": "hello", "hidden": false})
        );
    }

    #[test]
    fn server_records_survive_a_reencode() {
        let raw = json!([
            {"id": 1, "name": "A", "type": "z", "desc": "dz", "hidden": false},
            {"id": 42, "name": "B", "type": "a", "desc": "da", "hidden": true}
        ]);
        let talks: Vec<Talk> = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&talks).unwrap(), raw);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let api = ApiClient::new("http://localhost:9000/", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(api.url(POST_TALK_PATH), "http://localhost:9000/api/postTalk");
    }

    #[test]
    fn timeout_parsing() {
        assert_eq!(parse_timeout(None).unwrap(), DEFAULT_TIMEOUT);
        assert_eq!(parse_timeout(Some("  ")).unwrap(), DEFAULT_TIMEOUT);
        assert_eq!(parse_timeout(Some("5")).unwrap(), Duration::from_secs(5));
        assert!(matches!(parse_timeout(Some("0")), Err(TalksError::Config(_))));
        assert!(matches!(parse_timeout(Some("soon")), Err(TalksError::Config(_))));
    }

    #[test]
    fn visible_talks_decodes_server_order() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", VISIBLE_TALKS_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":1,"name":"A","type":"z","desc":"dz","hidden":false},{"id":2,"name":"B","type":"a","desc":"da","hidden":false}]"#)
            .create();

        let talks = client_for(&server).visible_talks().unwrap();
        mock.assert();
        let kinds: Vec<&str> = talks.iter().map(|t| t.kind.as_str()).collect();
        assert_eq!(kinds, ["z", "a"]);
    }

    #[test]
    fn visible_talks_rejects_non_array_body() {
        let mut server = Server::new();
        server
            .mock("GET", VISIBLE_TALKS_PATH)
            .with_status(200)
            .with_body(r#"{"error":"maintenance"}"#)
            .create();

        let err = client_for(&server).visible_talks().unwrap_err();
        assert!(matches!(err, TalksError::Decode { .. }), "{err:?}");
    }

    #[test]
    fn visible_talks_reports_server_errors() {
        let mut server = Server::new();
        server
            .mock("GET", VISIBLE_TALKS_PATH)
            .with_status(503)
            .with_body("down for maintenance\n")
            .create();

        match client_for(&server).visible_talks().unwrap_err() {
            TalksError::Status { status, body, .. } => {
                assert_eq!(status.as_u16(), 503);
                assert_eq!(body, "down for maintenance");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn submit_talk_posts_json_with_charset() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", POST_TALK_PATH)
            .match_header("content-type", "application/json; charset=utf-8")
            .match_body(Matcher::Json(json!({
                "id": 0, "name": "Alice", "type": "demo", "desc": "hello", "hidden": false
            })))
            .with_status(200)
            .create();

        client_for(&server)
            .submit_talk(&Talk::draft("Alice", "demo", "hello"))
            .unwrap();
        mock.assert();
    }

    #[test]
    fn transport_failure_is_reported() {
        let api = ApiClient::new(&closed_local_url(), Duration::from_secs(2)).unwrap();
        let err = api.visible_talks().unwrap_err();
        assert!(matches!(err, TalksError::Transport { .. }), "{err:?}");
    }
}
