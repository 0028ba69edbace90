//! Raw profile payloads
//!
//! A profile source returns one of two shapes:
//! - [`DomFragments`]: text pulled out of an HTML page by selector role
//! - [`StructuredPayload`]: the JSON `included` list, each element tagged by
//!   a `$type` discriminator
//!
//! Structured elements are classified into a closed set of kinds on
//! deserialization. Anything unrecognised becomes
//! [`ProfileElement::Unknown`] rather than failing the whole payload.

use std::fmt;

use serde::Deserialize;

use crate::constants::{
    DEFAULT_MONTH, ENTITY_CERTIFICATION, ENTITY_EDUCATION, ENTITY_POSITION, ENTITY_PROFILE,
    ENTITY_SKILL,
};

/// Raw payload plus the canonical URL of the profile it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct RawProfile {
    pub profile_url: String,
    pub payload: RawPayload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    /// Text extracted from an HTML document.
    Document(DomFragments),
    /// Elements from a JSON `{ "included": [...] }` body.
    Structured(StructuredPayload),
}

/// Text fragments keyed by selector role.
///
/// Extraction always yields a string; missing optional text is `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomFragments {
    pub name: String,
    pub headline: String,
    pub location: String,
    pub education: Vec<DomEducation>,
    pub skills: Vec<String>,
    pub certifications: Vec<DomCertification>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomEducation {
    pub school: String,
    pub degree: String,
    pub field: String,
    pub period: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomCertification {
    pub name: String,
    pub issuer: String,
    pub date: String,
}

/// A calendar month. `month` is 1-based and optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    pub year: i32,
    pub month: Option<u32>,
}

impl YearMonth {
    pub fn new(year: i32, month: Option<u32>) -> Self {
        Self { year, month }
    }

    /// Month with absent or zero defaulting to January.
    #[must_use]
    pub fn month_or_default(&self) -> u32 {
        self.month.filter(|m| *m != 0).unwrap_or(DEFAULT_MONTH)
    }

    /// Ordering key used for chronological sorts.
    #[must_use]
    pub fn sort_key(&self) -> (i32, u32) {
        (self.year, self.month_or_default())
    }
}

/// Renders as `YYYY-MM`.
impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month_or_default())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<YearMonth>,
    pub end: Option<YearMonth>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionElement {
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub description: Option<String>,
    pub location_name: Option<String>,
    pub date_range: Option<DateRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileSummaryElement {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub headline: Option<String>,
    pub location_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EducationElement {
    pub school_name: Option<String>,
    pub degree_name: Option<String>,
    pub field_of_study: Option<String>,
    pub date_range: Option<DateRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillElement {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificationElement {
    pub name: Option<String>,
    pub authority: Option<String>,
    pub date_range: Option<DateRange>,
}

/// One element of a structured payload, classified by `$type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileElement {
    Position(PositionElement),
    Profile(ProfileSummaryElement),
    Education(EducationElement),
    Skill(SkillElement),
    Certification(CertificationElement),
    Unknown { type_name: String },
}

impl ProfileElement {
    /// Classify a loosely typed JSON element.
    ///
    /// The kind comes from `$type` alone. Fields are read one by one and a
    /// field of an unexpected type reads as absent, so a malformed field
    /// never hides the element. Non-objects become `Unknown` with an empty
    /// type name.
    pub fn from_value(value: serde_json::Value) -> Self {
        let serde_json::Value::Object(fields) = value else {
            return Self::Unknown { type_name: String::new() };
        };
        let element = Fields(&fields);
        let type_name = element.text("$type").unwrap_or_default();

        // Position first: its discriminator shares the `identity.profile.`
        // namespace with every other kind.
        if type_name.contains(ENTITY_POSITION) {
            Self::Position(PositionElement {
                title: element.text("title"),
                company_name: element.text("companyName"),
                description: element.text("description"),
                location_name: element.text("locationName"),
                date_range: element.date_range(),
            })
        } else if type_name.contains(ENTITY_EDUCATION) {
            Self::Education(EducationElement {
                school_name: element.text("schoolName"),
                degree_name: element.text("degreeName"),
                field_of_study: element.text("fieldOfStudy"),
                date_range: element.date_range(),
            })
        } else if type_name.contains(ENTITY_SKILL) {
            Self::Skill(SkillElement { name: element.text("name") })
        } else if type_name.contains(ENTITY_CERTIFICATION) {
            Self::Certification(CertificationElement {
                name: element.text("name"),
                authority: element.text("authority"),
                date_range: element.date_range(),
            })
        } else if type_name.contains(ENTITY_PROFILE) {
            Self::Profile(ProfileSummaryElement {
                first_name: element.text("firstName"),
                last_name: element.text("lastName"),
                headline: element.text("headline"),
                location_name: element.text("locationName"),
            })
        } else {
            Self::Unknown { type_name }
        }
    }
}

/// Payload of typed elements, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "WirePayload")]
pub struct StructuredPayload {
    pub elements: Vec<ProfileElement>,
}

impl StructuredPayload {
    pub fn new(elements: Vec<ProfileElement>) -> Self {
        Self { elements }
    }

    /// Parse a JSON body. Fails if `included` is missing or not an array.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }
}

// Wire shapes. Every field is optional so that a partially filled element
// still classifies.

#[derive(Deserialize)]
struct WirePayload {
    included: Vec<serde_json::Value>,
}

impl From<WirePayload> for StructuredPayload {
    fn from(wire: WirePayload) -> Self {
        Self::new(wire.included.into_iter().map(ProfileElement::from_value).collect())
    }
}

/// Lenient field access over one JSON object.
struct Fields<'a>(&'a serde_json::Map<String, serde_json::Value>);

impl Fields<'_> {
    /// Strings as is, numbers and booleans in their JSON spelling.
    fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            serde_json::Value::String(text) => Some(text.clone()),
            serde_json::Value::Number(number) => Some(number.to_string()),
            serde_json::Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }

    fn date_range(&self) -> Option<DateRange> {
        let serde_json::Value::Object(range) = self.0.get("dateRange")? else {
            return None;
        };
        let side = |key: &str| match range.get(key) {
            Some(serde_json::Value::Object(fields)) => year_month(fields),
            _ => None,
        };
        Some(DateRange { start: side("start"), end: side("end") })
    }
}

/// A year is required; a month outside 1..=12 reads as absent.
fn year_month(fields: &serde_json::Map<String, serde_json::Value>) -> Option<YearMonth> {
    let year = fields.get("year").and_then(integer)?;
    let year = i32::try_from(year).ok()?;
    let month = fields
        .get("month")
        .and_then(integer)
        .and_then(|month| u32::try_from(month).ok())
        .filter(|month| (1..=12).contains(month));
    Some(YearMonth::new(year, month))
}

/// Integers given as JSON numbers or numeric strings.
fn integer(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(number) => number.as_i64(),
        serde_json::Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
