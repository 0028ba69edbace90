//! Domain types and models
//!
//! - [`profile`]: the canonical record served to callers
//! - [`raw`]: the raw payload shapes a profile source can hand back

pub mod profile;
pub mod raw;

pub use profile::{Certification, Education, Experience, ProfileRecord};
pub use raw::{
    CertificationElement, DateRange, DomCertification, DomEducation, DomFragments,
    EducationElement, PositionElement, ProfileElement, ProfileSummaryElement, RawPayload,
    RawProfile, SkillElement, StructuredPayload, YearMonth,
};
