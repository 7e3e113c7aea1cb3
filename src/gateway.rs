//! Backend gateway.
//!
//! Every call goes to `<base>/<path>` with a JSON content type. Authenticated
//! calls carry `Authorization: Bearer <token>`. There are no retries, timeouts
//! or interceptors at this layer.

use devboard_shared::protocol::ApiRequest;
use devboard_shared::{CONTENT_TYPE_JSON, ErrorBody, HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::GatewayError;
use crate::request::{HttpClient, HttpMethod, HttpRequest, HttpResponse};

pub struct GatewayClient<C: HttpClient> {
    client: C,
    base_url: String,
}

impl<C: HttpClient> GatewayClient<C> {
    pub fn new(client: C, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(client: C, config: &ClientConfig) -> Self {
        Self::new(client, &config.api_base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Sends one request and returns the response if it was 2xx.
    ///
    /// A non-2xx response becomes [`GatewayError::Status`], with the body's
    /// `message` field when the body is a JSON object carrying one.
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Result<HttpResponse, GatewayError> {
        let url = self.url(path);
        let mut req =
            HttpRequest::new(&url, method).with_header(HEADER_CONTENT_TYPE, CONTENT_TYPE_JSON);

        if let Some(token) = token {
            req = req.with_header(HEADER_AUTHORIZATION, &format!("Bearer {}", token));
        }
        if let Some(body) = body {
            req = req.with_body(body);
        }

        log::debug!("gateway: {} {}", method.as_str(), url);
        let resp = self.client.send(req).await?;

        if !resp.ok() {
            let message = serde_json::from_str::<ErrorBody>(&resp.body)
                .ok()
                .and_then(|b| b.message);
            log::debug!("gateway: {} {} -> {}", method.as_str(), url, resp.status);
            return Err(GatewayError::Status {
                status: resp.status,
                message,
            });
        }

        Ok(resp)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<Value, GatewayError> {
        self.request(HttpMethod::Get, path, None, token).await?.json()
    }

    pub async fn post(
        &self,
        path: &str,
        body: Value,
        token: Option<&str>,
    ) -> Result<Value, GatewayError> {
        self.request(HttpMethod::Post, path, Some(body), token)
            .await?
            .json()
    }

    pub async fn put(
        &self,
        path: &str,
        body: Value,
        token: Option<&str>,
    ) -> Result<Value, GatewayError> {
        self.request(HttpMethod::Put, path, Some(body), token)
            .await?
            .json()
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<Value, GatewayError> {
        self.request(HttpMethod::Delete, path, None, token)
            .await?
            .json()
    }

    /// Typed call for an endpoint descriptor.
    ///
    /// The token is attached only when the endpoint is marked authenticated.
    pub async fn send<R: ApiRequest>(
        &self,
        req: &R,
        token: Option<&str>,
    ) -> Result<R::Response, GatewayError> {
        let body = req
            .body()
            .map_err(|e| GatewayError::Encode(e.to_string()))?;
        let token = if R::AUTHENTICATED { token } else { None };
        self.request(R::METHOD, &req.path(), body, token)
            .await?
            .json()
    }
}
