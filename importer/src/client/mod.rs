//! Portfolio Manager web service client.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use portfolio_import::{ClientConfig, PortfolioManagerClient};
//!
//! let config = ClientConfig::from_env()?;
//! let client = PortfolioManagerClient::connect(config)?;
//!
//! let account_id = client.get_account_id()?;
//! for link in client.list_properties(account_id)? {
//!     println!("{} - {:?}", link.property_id, link.name);
//! }
//! ```
//!
//! Every call is one blocking request. Nothing is retried.

pub mod response;
pub mod transport;

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::models::{AccountInfo, PropertyDetails, PropertyLink};

pub use response::XmlNode;
pub use transport::{HttpResponse, HttpTransport, Transport};

/// Client bound to one configuration and one transport
pub struct PortfolioManagerClient<T: Transport = HttpTransport> {
    config: ClientConfig,
    transport: T,
}

impl PortfolioManagerClient<HttpTransport> {
    /// Create a client backed by the `reqwest` transport
    pub fn connect(config: ClientConfig) -> ApiResult<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> PortfolioManagerClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// GET a path and parse the XML body of a successful response
    fn get_xml(&self, path: &str) -> ApiResult<XmlNode> {
        let reply = self.transport.get(&self.config.url(path))?.error_for_status()?;
        XmlNode::parse(&reply.body)
    }

    /// Check that the credentials are accepted
    pub fn test_connection(&self) -> ApiResult<()> {
        let reply = self.transport.get(&self.config.url("/account"))?;
        match reply.status {
            200 => Ok(()),
            status => Err(ApiError::Status { status, body: reply.text() }),
        }
    }

    /// Id of the authenticated account
    pub fn get_account_id(&self) -> ApiResult<u64> {
        let root = self.get_xml("/account")?;
        response::parse_id(&root)?.ok_or_else(|| ApiError::MissingElement("id".to_string()))
    }

    pub fn get_account_info(&self) -> ApiResult<AccountInfo> {
        let root = self.get_xml("/account")?;
        Ok(response::parse_account_info(&root))
    }

    pub fn list_properties(&self, account_id: u64) -> ApiResult<Vec<PropertyLink>> {
        let root = self.get_xml(&format!("/account/{}/property/list", account_id))?;
        Ok(response::parse_property_links(&root))
    }

    pub fn get_property_details(&self, property_id: u64) -> ApiResult<PropertyDetails> {
        let root = self.get_xml(&format!("/property/{}", property_id))?;
        Ok(response::parse_property_details(&root))
    }

    /// POST a property document under an account.
    ///
    /// Returns the new property id when the response carries one.
    pub fn create_property(&self, account_id: u64, xml: String) -> ApiResult<Option<u64>> {
        let url = self.config.url(&format!("/account/{}/property", account_id));
        let reply = self.transport.post(&url, xml)?;

        if !matches!(reply.status, 200 | 201) {
            return Err(ApiError::Status { status: reply.status, body: reply.text() });
        }

        if reply.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        let root = XmlNode::parse(&reply.body)?;
        response::parse_id(&root)
    }
}
