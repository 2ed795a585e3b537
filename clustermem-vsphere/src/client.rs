//! VI/JSON HTTP client
//!
//! Thin session wrapper over `reqwest`: resolves the API base URL, logs in
//! through the session manager and attaches the session token to every
//! subsequent request. Any transport failure, non-success status or
//! undecodable body is reported as a retrieval error naming the request.

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use clustermem_core::{ClusterMemError, ClusterMemResult, ConnectionConfig};

use crate::types::{LoginRequest, ManagedObjectReference, ServiceContent};

/// Header carrying the session token on authenticated requests
pub const SESSION_HEADER: &str = "vmware-api-session-id";

/// Upper bound on the fault body quoted in error messages
const MAX_FAULT_BODY: usize = 512;

/// Authenticated VI/JSON session
pub struct VimClient {
    http: reqwest::Client,
    base: Url,
    content: ServiceContent,
    session_id: String,
}

impl VimClient {
    /// Open a session: fetch the service content, then log in
    pub async fn connect(config: &ConnectionConfig) -> ClusterMemResult<Self> {
        config.validate()?;

        let base = api_base(&config.endpoint()?, &config.api_release)?;
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                ClusterMemError::configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        if config.insecure {
            warn!("TLS certificate verification is disabled for {}", config.url);
        }

        let content: ServiceContent = decode(
            "GET ServiceInstance/ServiceInstance/content",
            send(
                "GET ServiceInstance/ServiceInstance/content",
                http.get(join(&base, "ServiceInstance/ServiceInstance/content")?),
            )
            .await?,
        )
        .await?;

        let session_manager = content.session_manager.clone().ok_or_else(|| {
            ClusterMemError::retrieval_message("login", "endpoint exposes no session manager")
        })?;

        let password = config.password.as_deref().unwrap_or_default();
        let login_path = format!("SessionManager/{}/Login", session_manager.value);
        let operation = format!("POST {}", login_path);
        let response = send(
            &operation,
            http.post(join(&base, &login_path)?).json(&LoginRequest {
                user_name: &config.user,
                password,
            }),
        )
        .await?;

        let session_id = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                ClusterMemError::retrieval_message(
                    operation.clone(),
                    format!("response carried no {} header", SESSION_HEADER),
                )
            })?;

        debug!(url = %base, user = %config.user, "Logged in");

        Ok(Self {
            http,
            base,
            content,
            session_id,
        })
    }

    pub fn service_content(&self) -> &ServiceContent {
        &self.content
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// GET a property or collection and decode it; an empty or `null` body
    /// decodes to `T`'s representation of null
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClusterMemResult<T> {
        let operation = format!("GET {}", path);
        let response = send(&operation, self.request(Method::GET, path)?).await?;
        decode(&operation, response).await
    }

    /// POST a JSON body and decode the result
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClusterMemResult<T> {
        let operation = format!("POST {}", path);
        let response = send(&operation, self.request(Method::POST, path)?.json(body)).await?;
        decode(&operation, response).await
    }

    /// POST a method without arguments, discarding any result
    pub async fn post_empty(&self, path: &str) -> ClusterMemResult<()> {
        let operation = format!("POST {}", path);
        send(&operation, self.request(Method::POST, path)?).await?;
        Ok(())
    }

    /// End the session on the server
    pub async fn logout(&self) -> ClusterMemResult<()> {
        let session_manager = self.session_manager()?;
        self.post_empty(&format!("SessionManager/{}/Logout", session_manager.value))
            .await?;
        debug!(url = %self.base, "Logged out");
        Ok(())
    }

    fn session_manager(&self) -> ClusterMemResult<&ManagedObjectReference> {
        self.content.session_manager.as_ref().ok_or_else(|| {
            ClusterMemError::retrieval_message("logout", "endpoint exposes no session manager")
        })
    }

    fn request(&self, method: Method, path: &str) -> ClusterMemResult<RequestBuilder> {
        Ok(self
            .http
            .request(method, join(&self.base, path)?)
            .header(SESSION_HEADER, &self.session_id))
    }
}

/// `https://vc/sdk` + `8.0.1.0` → `https://vc/sdk/vim25/8.0.1.0/`
pub fn api_base(endpoint: &Url, release: &str) -> ClusterMemResult<Url> {
    let mut base = endpoint.clone();
    let path = format!(
        "{}/vim25/{}/",
        endpoint.path().trim_end_matches('/'),
        release.trim_matches('/')
    );
    base.set_path(&path);
    base.set_query(None);
    base.set_fragment(None);
    Ok(base)
}

fn join(base: &Url, path: &str) -> ClusterMemResult<Url> {
    base.join(path)
        .map_err(|e| ClusterMemError::invalid_input("path", format!("'{}': {}", path, e)))
}

async fn send(operation: &str, request: RequestBuilder) -> ClusterMemResult<reqwest::Response> {
    let response = request
        .send()
        .await
        .map_err(|e| ClusterMemError::retrieval(operation, e))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let body = body.trim();
    let fault = if body.len() > MAX_FAULT_BODY {
        let mut end = MAX_FAULT_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    };

    debug!(operation, %status, "Request failed");
    Err(ClusterMemError::retrieval_message(
        operation,
        if fault.is_empty() {
            format!("HTTP {}", status)
        } else {
            format!("HTTP {}: {}", status, fault)
        },
    ))
}

async fn decode<T: DeserializeOwned>(
    operation: &str,
    response: reqwest::Response,
) -> ClusterMemResult<T> {
    let body = response
        .text()
        .await
        .map_err(|e| ClusterMemError::retrieval(operation, e))?;

    let body = if body.trim().is_empty() { "null" } else { body.as_str() };
    serde_json::from_str(body).map_err(|e| ClusterMemError::retrieval(operation, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_base_from_sdk_url() {
        let endpoint = Url::parse("https://127.0.0.1/sdk").unwrap();
        let base = api_base(&endpoint, "8.0.1.0").unwrap();
        assert_eq!(base.as_str(), "https://127.0.0.1/sdk/vim25/8.0.1.0/");

        let endpoint = Url::parse("https://vc01.lab:8443/sdk/?x=1").unwrap();
        let base = api_base(&endpoint, "8.0.2.0").unwrap();
        assert_eq!(base.as_str(), "https://vc01.lab:8443/sdk/vim25/8.0.2.0/");
    }

    #[test]
    fn test_join_keeps_base_path() {
        let base = api_base(&Url::parse("http://localhost:9000/sdk").unwrap(), "8.0.1.0").unwrap();
        let url = join(&base, "HostSystem/host-12/vm").unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/sdk/vim25/8.0.1.0/HostSystem/host-12/vm");
    }
}
