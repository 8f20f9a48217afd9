//! HTTP transport for the Portfolio Manager web service.
//!
//! [`Transport`] is the seam between the client and the network. The
//! production implementation, [`HttpTransport`], is a blocking `reqwest`
//! client that sends basic-auth credentials and the XML content headers on
//! every request.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};

const XML_MEDIA_TYPE: &str = "application/xml";

/// Raw response from the service
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Convert a non-2xx response into [`ApiError::Status`]
    pub fn error_for_status(self) -> ApiResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ApiError::Status { status: self.status, body: self.text() })
        }
    }
}

/// Synchronous request/response transport
pub trait Transport {
    fn get(&self, url: &str) -> ApiResult<HttpResponse>;

    fn post(&self, url: &str, body: String) -> ApiResult<HttpResponse>;
}

/// Blocking `reqwest` transport with basic authentication
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    username: String,
    password: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(XML_MEDIA_TYPE));
        headers.insert(ACCEPT, HeaderValue::from_static(XML_MEDIA_TYPE));

        let client = reqwest::blocking::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    fn send(&self, request: reqwest::blocking::RequestBuilder) -> ApiResult<HttpResponse> {
        let response = request
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse { status, body: body.to_vec() })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> ApiResult<HttpResponse> {
        self.send(self.client.get(url))
    }

    fn post(&self, url: &str, body: String) -> ApiResult<HttpResponse> {
        self.send(self.client.post(url).body(body))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    #[test]
    fn test_status_classification() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(201, "").is_success());
        assert!(!HttpResponse::new(401, "").is_success());
    }

    #[test]
    fn test_error_for_status() {
        let err = HttpResponse::new(500, "server down").error_for_status().unwrap_err();
        assert_eq!(err.to_string(), "Error 500: server down");

        let ok = HttpResponse::new(201, "<id>1</id>").error_for_status().unwrap();
        assert_eq!(ok.text(), "<id>1</id>");
    }

    #[test]
    fn test_http_transport_builds() {
        let config = ClientConfig::new("user", "pass", Environment::Test);
        assert!(HttpTransport::new(&config).is_ok());
    }
}
