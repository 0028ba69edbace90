//! Canonical profile record
//!
//! Produced by normalization from either raw payload shape and immutable
//! afterwards. A new fetch replaces the whole record.

use serde::{Deserialize, Serialize};

/// Normalized professional profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub name: String,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub profile_url: String,
    pub experiences: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<String>,
    pub certifications: Vec<Certification>,
}

impl ProfileRecord {
    /// Whether the record carries anything worth serving.
    ///
    /// A record with no experiences, education, skills or certifications is
    /// treated as a failed fetch even if parsing succeeded.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !(self.experiences.is_empty()
            && self.education.is_empty()
            && self.skills.is_empty()
            && self.certifications.is_empty())
    }
}

/// A position held at a company
///
/// `is_current_role` is true exactly when `end_date` is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub title: String,
    pub company: String,
    /// Human readable range, e.g. `2020-01 até Presente`.
    pub duration: String,
    pub location: Option<String>,
    pub description: Option<String>,
    /// `YYYY-MM`
    pub start_date: Option<String>,
    /// `YYYY-MM`
    pub end_date: Option<String>,
    pub is_current_role: bool,
    /// Skills whose normalized name appears in the title or description.
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub school: String,
    pub degree: Option<String>,
    pub field: Option<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    pub name: String,
    pub issuer: String,
    pub issue_date: Option<String>,
    pub expiration_date: Option<String>,
}
