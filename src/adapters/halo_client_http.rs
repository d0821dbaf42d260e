//! Halo Connect FHIR client implementation using reqwest.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue, RETRY_AFTER};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::domain::{AppError, HaloConfig, HaloCredentials};
use crate::ports::HaloClient;

const FHIR_CONTENT_TYPE: &str = "application/fhir+json";
const DEFAULT_STATUS_MESSAGE: &str = "Halo Connect request failed";

/// HTTP transport for Halo Connect.
///
/// Each call performs a single request; retry behavior is implemented by a
/// dedicated retry wrapper adapter. Access tokens are cached and refreshed
/// shortly before they expire.
pub struct HttpHaloClient {
    credentials: HaloCredentials,
    base_url: Url,
    token_url: Url,
    refresh_buffer: Duration,
    client: Client,
    token: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl std::fmt::Debug for HttpHaloClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpHaloClient")
            .field("base_url", &self.base_url)
            .field("token_url", &self.token_url)
            .field("credentials", &self.credentials)
            .finish()
    }
}

impl HttpHaloClient {
    /// Create a new HTTP client with the given credentials and configuration.
    pub fn new(credentials: HaloCredentials, config: &HaloConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::HaloApi {
                message: format!("Failed to create HTTP client: {}", e),
                status: None,
            })?;

        Ok(Self {
            credentials,
            base_url: config.base_url.clone(),
            token_url: config.token_url.clone(),
            refresh_buffer: Duration::from_secs(config.token_refresh_buffer_secs),
            client,
            token: Mutex::new(None),
        })
    }

    /// Create from environment variables with the given configuration.
    pub fn from_env(config: &HaloConfig) -> Result<Self, AppError> {
        Self::new(HaloCredentials::from_env()?, config)
    }

    fn access_token(&self) -> Result<String, AppError> {
        let mut cached = self
            .token
            .lock()
            .map_err(|_| AppError::HaloAuth("token cache lock poisoned".to_string()))?;

        if let Some(token) = cached.as_ref()
            && Instant::now() < token.expires_at
        {
            return Ok(token.access_token.clone());
        }

        let token = self.request_token()?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    fn request_token(&self) -> Result<CachedToken, AppError> {
        let mut form = vec![
            ("grant_type", "client_credentials".to_string()),
            ("client_id", self.credentials.client_id.clone()),
            ("client_secret", self.credentials.client_secret.clone()),
        ];
        if !self.credentials.scope.is_empty() {
            form.push(("scope", self.credentials.scope.clone()));
        }
        if !self.credentials.audience.is_empty() {
            form.push(("audience", self.credentials.audience.clone()));
        }

        let response = self
            .client
            .post(self.token_url.clone())
            .form(&form)
            .send()
            .map_err(|e| AppError::HaloAuth(format!("Token request failed: {}", e)))?;

        let status = response.status();
        let body_text = response.text().unwrap_or_default();
        if !status.is_success() {
            let detail = extract_error_message(&body_text)
                .unwrap_or_else(|| format!("token endpoint returned {}", status.as_u16()));
            return Err(AppError::HaloAuth(detail));
        }

        let token: TokenResponse = serde_json::from_str(&body_text)
            .map_err(|e| AppError::HaloAuth(format!("Failed to parse token response: {}", e)))?;
        if token.access_token.is_empty() {
            return Err(AppError::HaloAuth("No access token in response".to_string()));
        }

        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(3600));
        let expires_at = Instant::now() + lifetime.saturating_sub(self.refresh_buffer);
        Ok(CachedToken { access_token: token.access_token, expires_at })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::config_error("Halo base URL cannot carry path segments"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get(&self, url: Url) -> Result<Value, AppError> {
        let token = self.access_token()?;
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .header(ACCEPT, FHIR_CONTENT_TYPE)
            .send()
            .map_err(|e| AppError::HaloApi {
                message: format!("HTTP request failed: {}", e),
                status: None,
            })?;
        read_json_response(response)
    }

    fn post(&self, url: Url, payload: &Value) -> Result<Value, AppError> {
        let token = self.access_token()?;
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .header(CONTENT_TYPE, FHIR_CONTENT_TYPE)
            .header(ACCEPT, FHIR_CONTENT_TYPE)
            .json(payload)
            .send()
            .map_err(|e| AppError::HaloApi {
                message: format!("HTTP request failed: {}", e),
                status: None,
            })?;
        read_json_response(response)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

fn read_json_response(response: reqwest::blocking::Response) -> Result<Value, AppError> {
    let status = response.status();
    let retry_after_ms = response.headers().get(RETRY_AFTER).and_then(parse_retry_after_ms);
    let body_text = response.text().unwrap_or_default();

    if status.is_success() {
        if body_text.trim().is_empty() {
            return Ok(Value::Null);
        }
        return serde_json::from_str(&body_text).map_err(|e| AppError::HaloApi {
            message: format!("Failed to parse response: {}", e),
            status: Some(status.as_u16()),
        });
    }

    let mut message = extract_error_message(&body_text).unwrap_or_else(|| {
        if !body_text.trim().is_empty() {
            body_text.clone()
        } else if status.as_u16() == 429 {
            "Rate limited".to_string()
        } else if status.is_server_error() {
            "Server error".to_string()
        } else {
            DEFAULT_STATUS_MESSAGE.to_string()
        }
    });

    if let Some(value) = retry_after_ms {
        message.push_str(&format!(" (retry_after_ms={})", value));
    }

    Err(AppError::HaloApi { message, status: Some(status.as_u16()) })
}

fn extract_error_message(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }

    let parsed = serde_json::from_str::<Value>(body).ok()?;

    // FHIR OperationOutcome carries diagnostics per issue.
    if let Some(diagnostics) = parsed
        .get("issue")
        .and_then(Value::as_array)
        .and_then(|issues| issues.first())
        .and_then(|issue| issue.get("diagnostics"))
        .and_then(Value::as_str)
    {
        return Some(diagnostics.to_string());
    }

    if let Some(msg) = parsed
        .get("error")
        .and_then(|error| error.get("message").or(error.get("description")))
        .and_then(Value::as_str)
    {
        return Some(msg.to_string());
    }

    if let Some(msg) = parsed.get("error_description").and_then(Value::as_str) {
        return Some(msg.to_string());
    }

    parsed.get("message").and_then(Value::as_str).map(ToOwned::to_owned)
}

fn parse_retry_after_ms(value: &HeaderValue) -> Option<u64> {
    let raw = value.to_str().ok()?.trim();
    let seconds = raw.parse::<u64>().ok()?;
    Some(seconds.saturating_mul(1000))
}

fn format_instant(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl HaloClient for HttpHaloClient {
    fn completed_appointments(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Value>, AppError> {
        let mut url = self.endpoint(&["appointments"])?;
        url.query_pairs_mut()
            .append_pair("status", "completed")
            .append_pair("start", &format_instant(start))
            .append_pair("end", &format_instant(end));

        let payload = self.get(url)?;
        match payload {
            Value::Array(entries) => Ok(entries),
            Value::Object(mut map) => match map.remove("appointments") {
                Some(Value::Array(entries)) => Ok(entries),
                Some(_) => Err(AppError::HaloApi {
                    message: "appointments field was not a list".to_string(),
                    status: None,
                }),
                None => Ok(Vec::new()),
            },
            Value::Null => Ok(Vec::new()),
            _ => Err(AppError::HaloApi {
                message: "Unexpected appointments payload shape".to_string(),
                status: None,
            }),
        }
    }

    fn submit_claim(&self, resource: &Value) -> Result<Value, AppError> {
        let url = self.endpoint(&["Claim"])?;
        self.post(url, resource)
    }

    fn claim_status(&self, claim_id: &str) -> Result<Value, AppError> {
        let url = self.endpoint(&["Claim", claim_id])?;
        self.get(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_credentials() -> HaloCredentials {
        HaloCredentials {
            client_id: "client".into(),
            client_secret: "secret".into(),
            scope: "system/Claim.write".into(),
            audience: String::new(),
        }
    }

    fn test_config(server: &mockito::Server) -> HaloConfig {
        HaloConfig {
            base_url: Url::parse(&format!("{}/fhir", server.url())).unwrap(),
            token_url: Url::parse(&format!("{}/oauth2/token", server.url())).unwrap(),
            timeout_secs: 1,
            max_retries: 3,
            retry_delay_ms: 1,
            token_refresh_buffer_secs: 0,
        }
    }

    fn token_mock(server: &mut mockito::Server) -> mockito::Mock {
        server
            .mock("POST", "/oauth2/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "tok-1", "expires_in": 3600}"#)
            .create()
    }

    #[test]
    fn submit_claim_sends_bearer_token() {
        let mut server = mockito::Server::new();
        let token = token_mock(&mut server);
        let claim = server
            .mock("POST", "/fhir/Claim")
            .match_header("authorization", "Bearer tok-1")
            .match_header("content-type", FHIR_CONTENT_TYPE)
            .with_status(201)
            .with_header("content-type", FHIR_CONTENT_TYPE)
            .with_body(r#"{"id": "claim-9", "status": "active"}"#)
            .create();

        let client = HttpHaloClient::new(test_credentials(), &test_config(&server)).unwrap();
        let response = client.submit_claim(&json!({"resourceType": "Claim"})).unwrap();
        assert_eq!(response["id"], "claim-9");
        token.assert();
        claim.assert();
    }

    #[test]
    fn token_is_cached_across_calls() {
        let mut server = mockito::Server::new();
        let token = token_mock(&mut server);
        let _status = server
            .mock("GET", "/fhir/Claim/claim-9")
            .with_status(200)
            .with_body(r#"{"id": "claim-9", "status": "accepted"}"#)
            .expect(2)
            .create();

        let client = HttpHaloClient::new(test_credentials(), &test_config(&server)).unwrap();
        client.claim_status("claim-9").unwrap();
        client.claim_status("claim-9").unwrap();
        // One token request serves both calls.
        token.assert();
    }

    #[test]
    fn token_failure_surfaces_description() {
        let mut server = mockito::Server::new();
        let _token = server
            .mock("POST", "/oauth2/token")
            .with_status(401)
            .with_body(r#"{"error": "invalid_client", "error_description": "unknown client"}"#)
            .create();

        let client = HttpHaloClient::new(test_credentials(), &test_config(&server)).unwrap();
        let err = client.claim_status("claim-9").unwrap_err();
        match err {
            AppError::HaloAuth(message) => assert!(message.contains("unknown client")),
            other => panic!("unexpected error variant: {}", other),
        }
    }

    #[test]
    fn appointments_unwrap_the_wrapped_list() {
        let mut server = mockito::Server::new();
        let _token = token_mock(&mut server);
        let _wrapped = server
            .mock("GET", mockito::Matcher::Regex("/fhir/appointments.*".into()))
            .with_status(200)
            .with_body(r#"{"appointments": [{"id": "appt-1"}]}"#)
            .create();

        let client = HttpHaloClient::new(test_credentials(), &test_config(&server)).unwrap();
        let window_end = Utc::now();
        let window_start = window_end - chrono::Duration::hours(24);
        let appointments = client.completed_appointments(window_start, window_end).unwrap();
        assert_eq!(appointments.len(), 1);
        assert_eq!(appointments[0]["id"], "appt-1");
    }

    #[test]
    fn rate_limit_embeds_retry_after_hint() {
        let mut server = mockito::Server::new();
        let _token = token_mock(&mut server);
        let _claim = server
            .mock("POST", "/fhir/Claim")
            .with_status(429)
            .with_header("retry-after", "2")
            .create();

        let client = HttpHaloClient::new(test_credentials(), &test_config(&server)).unwrap();
        let err = client.submit_claim(&json!({"resourceType": "Claim"})).unwrap_err();
        match err {
            AppError::HaloApi { message, status } => {
                assert_eq!(status, Some(429));
                assert!(message.contains("retry_after_ms=2000"));
            }
            other => panic!("unexpected error variant: {}", other),
        }
    }

    #[test]
    fn operation_outcome_diagnostics_become_the_message() {
        let mut server = mockito::Server::new();
        let _token = token_mock(&mut server);
        let _claim = server
            .mock("POST", "/fhir/Claim")
            .with_status(422)
            .with_body(
                r#"{"resourceType": "OperationOutcome", "issue": [{"severity": "error", "diagnostics": "missing billable period"}]}"#,
            )
            .create();

        let client = HttpHaloClient::new(test_credentials(), &test_config(&server)).unwrap();
        let err = client.submit_claim(&json!({"resourceType": "Claim"})).unwrap_err();
        match err {
            AppError::HaloApi { message, status } => {
                assert_eq!(status, Some(422));
                assert_eq!(message, "missing billable period");
            }
            other => panic!("unexpected error variant: {}", other),
        }
    }
}
