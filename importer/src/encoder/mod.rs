//! CSV row to Portfolio Manager property XML.
//!
//! Encoding happens in two steps:
//!
//! 1. [`PropertyRecord::from_row`] applies the coercion rules in [`coerce`]
//!    and the literal defaults (`constructionStatus`, `country`, `gfaUnits`,
//!    `gfaTemporary`, `isFederalProperty`).
//! 2. [`PropertyRecord::to_xml`] writes the document in the fixed element
//!    order expected by the service:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <property>
//!   <name/> <primaryFunction/> <address .../> <yearBuilt/>?
//!   <constructionStatus/> <grossFloorArea temporary units><value/></grossFloorArea>
//!   <occupancyPercentage/>? <isFederalProperty/> <notes/>? <isInstitutionalProperty/>?
//! </property>
//! ```
//!
//! Both steps are pure: the same row always yields the same bytes.

pub mod coerce;

use std::fmt;
use std::str::FromStr;

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{EncodeError, EncodeResult};
use crate::models::{
    Address, ConstructionStatus, GrossFloorArea, PropertyRecord, Row, DEFAULT_COUNTRY,
    DEFAULT_GFA_UNITS, INSTITUTIONAL_COUNTRY,
};

/// How the `notes` field is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotesMode {
    /// `<![CDATA[...]]>` as escaped text, byte-compatible with the legacy
    /// import scripts (`&lt;![CDATA[...]]&gt;` on the wire).
    Legacy,
    /// A real CDATA section.
    #[default]
    Cdata,
    /// Plain escaped text.
    Text,
}

impl FromStr for NotesMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "legacy" => Ok(NotesMode::Legacy),
            "cdata" => Ok(NotesMode::Cdata),
            "text" => Ok(NotesMode::Text),
            other => Err(format!("Unknown notes mode '{}' (expected legacy, cdata or text)", other)),
        }
    }
}

impl fmt::Display for NotesMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotesMode::Legacy => "legacy",
            NotesMode::Cdata => "cdata",
            NotesMode::Text => "text",
        };
        f.write_str(s)
    }
}

/// Encoder settings
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeOptions {
    pub notes: NotesMode,
}

impl PropertyRecord {
    /// Coerce a raw CSV row, applying defaults.
    pub fn from_row(row: &Row) -> EncodeResult<Self> {
        let address = Address {
            address1: coerce::required_text(row, "address1")?,
            address2: coerce::text(row, "address2"),
            city: coerce::required_text(row, "city")?,
            state: coerce::required_text(row, "state")?,
            postal_code: coerce::required_text(row, "postalCode")?,
            country: coerce::text_or(row, "country", DEFAULT_COUNTRY),
        };

        // Embedded as written, no numeric check
        let gross_floor_area = GrossFloorArea {
            value: coerce::required_text(row, "grossFloorArea")?,
            units: coerce::text_or(row, "gfaUnits", DEFAULT_GFA_UNITS),
            temporary: coerce::boolean_or(row, "gfaTemporary", false),
        };

        // Only read for Canadian properties
        let is_institutional_property = if address.country == INSTITUTIONAL_COUNTRY {
            coerce::boolean(row, "isInstitutionalProperty")
        } else {
            None
        };

        Ok(Self {
            name: coerce::required_text(row, "name")?,
            primary_function: coerce::required_text(row, "primaryFunction")?,
            address,
            year_built: coerce::integer(row, "yearBuilt"),
            construction_status: coerce::text_or(
                row,
                "constructionStatus",
                ConstructionStatus::default().as_str(),
            ),
            gross_floor_area,
            occupancy_percentage: coerce::number_in_range(row, "occupancyPercentage", 0.0, 100.0),
            is_federal_property: coerce::boolean_or(row, "isFederalProperty", false),
            notes: coerce::text(row, "notes"),
            is_institutional_property,
        })
    }

    /// Write the property document.
    pub fn to_xml(&self, options: &EncodeOptions) -> EncodeResult<String> {
        let mut writer = Writer::new(Vec::new());

        emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.get_mut().push(b'\n');

        emit(&mut writer, Event::Start(BytesStart::new("property")))?;

        text_element(&mut writer, "name", &self.name)?;
        text_element(&mut writer, "primaryFunction", &self.primary_function)?;

        let mut address = BytesStart::new("address");
        address.push_attribute(("address1", self.address.address1.as_str()));
        address.push_attribute(("city", self.address.city.as_str()));
        address.push_attribute(("state", self.address.state.as_str()));
        address.push_attribute(("postalCode", self.address.postal_code.as_str()));
        address.push_attribute(("country", self.address.country.as_str()));
        if let Some(ref address2) = self.address.address2 {
            address.push_attribute(("address2", address2.as_str()));
        }
        emit(&mut writer, Event::Empty(address))?;

        if let Some(year) = self.year_built {
            text_element(&mut writer, "yearBuilt", &year.to_string())?;
        }

        text_element(&mut writer, "constructionStatus", &self.construction_status)?;

        let mut gfa = BytesStart::new("grossFloorArea");
        gfa.push_attribute(("temporary", bool_text(self.gross_floor_area.temporary)));
        gfa.push_attribute(("units", self.gross_floor_area.units.as_str()));
        emit(&mut writer, Event::Start(gfa))?;
        text_element(&mut writer, "value", &self.gross_floor_area.value)?;
        emit(&mut writer, Event::End(BytesEnd::new("grossFloorArea")))?;

        if let Some(ref occupancy) = self.occupancy_percentage {
            text_element(&mut writer, "occupancyPercentage", occupancy)?;
        }

        text_element(&mut writer, "isFederalProperty", bool_text(self.is_federal_property))?;

        if let Some(ref notes) = self.notes {
            write_notes(&mut writer, notes, options.notes)?;
        }

        if self.emits_institutional_flag() {
            text_element(&mut writer, "isInstitutionalProperty", bool_text(true))?;
        }

        emit(&mut writer, Event::End(BytesEnd::new("property")))?;

        String::from_utf8(writer.into_inner()).map_err(|e| EncodeError::Xml(e.to_string()))
    }
}

/// Encode a CSV row with default options.
///
/// # Example
/// ```ignore
/// let xml = encode(&row)?;
/// assert!(xml.contains("<constructionStatus>Existing</constructionStatus>"));
/// ```
pub fn encode(row: &Row) -> EncodeResult<String> {
    encode_with(row, &EncodeOptions::default())
}

/// Encode a CSV row.
pub fn encode_with(row: &Row, options: &EncodeOptions) -> EncodeResult<String> {
    PropertyRecord::from_row(row)?.to_xml(options)
}

fn bool_text(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> EncodeResult<()> {
    writer
        .write_event(event)
        .map_err(|e| EncodeError::Xml(e.to_string()))
}

fn text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> EncodeResult<()> {
    emit(writer, Event::Start(BytesStart::new(name)))?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    emit(writer, Event::End(BytesEnd::new(name)))
}

fn write_notes(writer: &mut Writer<Vec<u8>>, notes: &str, mode: NotesMode) -> EncodeResult<()> {
    emit(writer, Event::Start(BytesStart::new("notes")))?;

    match mode {
        NotesMode::Legacy => {
            let marked = format!("<![CDATA[{}]]>", notes);
            emit(writer, Event::Text(BytesText::from_escaped(partial_escape(&marked))))?;
        }
        // A CDATA section cannot contain its own terminator
        NotesMode::Cdata if !notes.contains("]]>") => {
            emit(writer, Event::CData(BytesCData::new(notes)))?;
        }
        NotesMode::Cdata | NotesMode::Text => {
            emit(writer, Event::Text(BytesText::new(notes)))?;
        }
    }

    emit(writer, Event::End(BytesEnd::new("notes")))
}
