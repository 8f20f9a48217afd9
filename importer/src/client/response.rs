//! Navigable tree for XML responses.
//!
//! Service responses are small, so they are read fully into an [`XmlNode`]
//! tree with `quick-xml` and queried by element name. Namespace prefixes
//! are dropped.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{ApiError, ApiResult};
use crate::models::{AccountInfo, PropertyDetails, PropertyLink};

/// One XML element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    /// Parse a response body into its root element.
    pub fn parse(body: &[u8]) -> ApiResult<XmlNode> {
        let content = String::from_utf8_lossy(body);
        let mut reader = Reader::from_str(&content);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => stack.push(node_from(&e)?),
                Event::Empty(e) => {
                    let node = node_from(&e)?;
                    attach(&mut stack, &mut root, node);
                }
                Event::End(_) => {
                    if let Some(node) = stack.pop() {
                        attach(&mut stack, &mut root, node);
                    }
                }
                Event::Text(t) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&t.unescape()?);
                    }
                }
                Event::CData(c) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        root.ok_or_else(|| ApiError::MissingElement("root element".to_string()))
    }

    /// First descendant (depth-first, excluding self) with this name
    pub fn find(&self, name: &str) -> Option<&XmlNode> {
        for child in &self.children {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants with this name, document order
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a XmlNode> {
        let mut found = Vec::new();
        self.collect(name, &mut found);
        found
    }

    fn collect<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlNode>) {
        for child in &self.children {
            if child.name == name {
                found.push(child);
            }
            child.collect(name, found);
        }
    }

    /// Direct child with this name
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Text of the first descendant with this name
    pub fn find_text(&self, name: &str) -> Option<String> {
        self.find(name).map(|n| n.text.clone())
    }
}

fn node_from(start: &BytesStart<'_>) -> ApiResult<XmlNode> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }

    Ok(XmlNode { name, attributes, text: String::new(), children: Vec::new() })
}

fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => {
            if root.is_none() {
                *root = Some(node);
            }
        }
    }
}

// =============================================================================
// Response extractors
// =============================================================================

/// Parse the `id` of a response (account or created property).
pub fn parse_id(root: &XmlNode) -> ApiResult<Option<u64>> {
    match root.find("id") {
        None => Ok(None),
        Some(node) => node
            .text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ApiError::InvalidValue { element: "id".to_string(), value: node.text.clone() }),
    }
}

/// `GET /account`
pub fn parse_account_info(root: &XmlNode) -> AccountInfo {
    let mut info = AccountInfo {
        id: root.find_text("id"),
        username: root.find_text("username"),
        webservice_user: root.find_text("webserviceUser"),
        ..Default::default()
    };

    if let Some(contact) = root.find("contact") {
        info.first_name = contact.child("firstName").map(|n| n.text.clone());
        info.last_name = contact.child("lastName").map(|n| n.text.clone());
        info.email = contact.child("email").map(|n| n.text.clone());
    }

    info
}

/// `GET /account/{id}/property/list`; links without a numeric id are skipped
pub fn parse_property_links(root: &XmlNode) -> Vec<PropertyLink> {
    root.find_all("link")
        .into_iter()
        .filter_map(|link| {
            let property_id = link.attr("id")?.trim().parse().ok()?;
            Some(PropertyLink {
                property_id,
                name: link.attr("name").or_else(|| link.attr("hint")).map(str::to_string),
                link: link.attr("link").map(str::to_string),
            })
        })
        .collect()
}

/// `GET /property/{id}`
pub fn parse_property_details(root: &XmlNode) -> PropertyDetails {
    let mut details = PropertyDetails {
        name: root.find_text("name"),
        primary_function: root.find_text("primaryFunction"),
        construction_status: root.find_text("constructionStatus"),
        year_built: root.find_text("yearBuilt"),
        ..Default::default()
    };

    if let Some(address) = root.find("address") {
        let attr = |name: &str| address.attr(name).map(str::to_string);
        details.address1 = attr("address1");
        details.city = attr("city");
        details.state = attr("state");
        details.postal_code = attr("postalCode");
        details.country = attr("country");
    }

    if let Some(gfa) = root.find("grossFloorArea") {
        if let Some(value) = gfa.child("value") {
            details.gross_floor_area = Some(value.text.clone());
            details.gfa_units = gfa.attr("units").map(str::to_string);
        }
    }

    details
}
