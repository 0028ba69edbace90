//! Raw payload to canonical profile record
//!
//! Pure and total over [`RawPayload`]: every element kind has a defined
//! mapping, and `Unknown` elements are ignored. The only failure is the
//! validity gate.

use profilelink_domain::constants::{DURATION_SEPARATOR, PRESENT_LABEL};
use profilelink_domain::{
    Certification, DateRange, DomFragments, Education, Experience, ProfileElement,
    ProfileLinkError, ProfileRecord, RawPayload, RawProfile, Result, StructuredPayload,
};

use super::matching::SkillMatcher;

/// Converts raw payloads into [`ProfileRecord`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileNormalizer;

impl ProfileNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize and apply the validity gate.
    ///
    /// # Errors
    /// `EmptyProfile` when experiences, education, skills and certifications
    /// all come out empty.
    pub fn normalize(&self, raw: &RawProfile) -> Result<ProfileRecord> {
        let record = self.build(raw);
        if record.is_usable() {
            Ok(record)
        } else {
            Err(ProfileLinkError::EmptyProfile)
        }
    }

    /// Normalize without the validity gate.
    pub fn build(&self, raw: &RawProfile) -> ProfileRecord {
        match &raw.payload {
            RawPayload::Document(fragments) => from_document(&raw.profile_url, fragments),
            RawPayload::Structured(payload) => from_structured(&raw.profile_url, payload),
        }
    }
}

/// `"<start> até <end|Presente>"`; a missing start renders as empty.
pub fn format_duration(range: &DateRange) -> String {
    let start = range.start.map(|ym| ym.to_string()).unwrap_or_default();
    let end = range.end.map_or_else(|| PRESENT_LABEL.to_string(), |ym| ym.to_string());
    format!("{start}{DURATION_SEPARATOR}{end}")
}

fn from_structured(profile_url: &str, payload: &StructuredPayload) -> ProfileRecord {
    let mut name = String::new();
    let mut headline = None;
    let mut location = None;
    let mut positions = Vec::new();
    let mut education = Vec::new();
    let mut skills = Vec::new();
    let mut certifications = Vec::new();

    for element in &payload.elements {
        match element {
            ProfileElement::Profile(summary) => {
                name = [summary.first_name.as_deref(), summary.last_name.as_deref()]
                    .into_iter()
                    .flatten()
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                headline = non_empty(summary.headline.as_deref());
                location = non_empty(summary.location_name.as_deref());
            }
            ProfileElement::Position(position) => {
                let range = position.date_range.unwrap_or_default();
                let experience = Experience {
                    title: position.title.clone().unwrap_or_default(),
                    company: position.company_name.clone().unwrap_or_default(),
                    duration: position.date_range.as_ref().map(format_duration).unwrap_or_default(),
                    location: position.location_name.clone(),
                    description: position.description.clone(),
                    start_date: range.start.map(|ym| ym.to_string()),
                    end_date: range.end.map(|ym| ym.to_string()),
                    is_current_role: range.end.is_none(),
                    skills: Vec::new(),
                };
                positions.push((range.start.map(|ym| ym.sort_key()), experience));
            }
            ProfileElement::Education(entry) => {
                if let Some(school) = non_empty(entry.school_name.as_deref()) {
                    education.push(Education {
                        school,
                        degree: entry.degree_name.clone(),
                        field: entry.field_of_study.clone(),
                        duration: entry.date_range.as_ref().map(format_duration),
                    });
                }
            }
            ProfileElement::Skill(skill) => {
                if let Some(name) = non_empty(skill.name.as_deref()) {
                    skills.push(name);
                }
            }
            ProfileElement::Certification(cert) => {
                if let Some(cert_name) = non_empty(cert.name.as_deref()) {
                    let range = cert.date_range.unwrap_or_default();
                    certifications.push(Certification {
                        name: cert_name,
                        issuer: cert.authority.clone().unwrap_or_default(),
                        issue_date: range.start.map(|ym| ym.to_string()),
                        expiration_date: range.end.map(|ym| ym.to_string()),
                    });
                }
            }
            ProfileElement::Unknown { .. } => {}
        }
    }

    // Stable, newest first; a missing start date sorts after every dated one.
    positions.sort_by(|(a, _), (b, _)| b.cmp(a));

    let matcher = SkillMatcher::new(skills.as_slice());
    let experiences = positions
        .into_iter()
        .map(|(_, mut experience)| {
            experience.skills =
                matcher.skills_for(&experience.title, experience.description.as_deref());
            experience
        })
        .collect();

    ProfileRecord {
        name,
        headline,
        location,
        profile_url: profile_url.to_string(),
        experiences,
        education,
        skills,
        certifications,
    }
}

fn from_document(profile_url: &str, fragments: &DomFragments) -> ProfileRecord {
    let education = fragments
        .education
        .iter()
        .filter_map(|block| {
            Some(Education {
                school: present(&block.school)?,
                degree: present(&block.degree),
                field: present(&block.field),
                duration: present(&block.period),
            })
        })
        .collect();

    let certifications = fragments
        .certifications
        .iter()
        .filter_map(|block| {
            Some(Certification {
                name: present(&block.name)?,
                issuer: block.issuer.trim().to_string(),
                issue_date: present(&block.date),
                expiration_date: None,
            })
        })
        .collect();

    let skills = fragments.skills.iter().filter_map(|s| present(s)).collect();

    ProfileRecord {
        name: fragments.name.trim().to_string(),
        headline: present(&fragments.headline),
        location: present(&fragments.location),
        profile_url: profile_url.to_string(),
        experiences: Vec::new(),
        education,
        skills,
        certifications,
    }
}

/// Trimmed text, with blank treated as absent.
fn non_empty(text: Option<&str>) -> Option<String> {
    text.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string)
}

fn present(text: &str) -> Option<String> {
    non_empty(Some(text))
}

#[cfg(test)]
mod tests {
    use profilelink_domain::{
        CertificationElement, DomCertification, DomEducation, EducationElement, PositionElement,
        ProfileSummaryElement, SkillElement, YearMonth,
    };

    use super::*;

    fn position(
        title: &str,
        start: Option<(i32, Option<u32>)>,
        end: Option<(i32, u32)>,
    ) -> ProfileElement {
        ProfileElement::Position(PositionElement {
            title: Some(title.to_string()),
            company_name: Some("Acme".to_string()),
            description: None,
            location_name: None,
            date_range: Some(DateRange {
                start: start.map(|(y, m)| YearMonth::new(y, m)),
                end: end.map(|(y, m)| YearMonth::new(y, Some(m))),
            }),
        })
    }

    fn structured(elements: Vec<ProfileElement>) -> RawProfile {
        RawProfile {
            profile_url: "https://www.linkedin.com/in/ana".to_string(),
            payload: RawPayload::Structured(StructuredPayload::new(elements)),
        }
    }

    #[test]
    fn test_experiences_sorted_newest_first_with_undated_last() {
        let raw = structured(vec![
            position("Undated", None, None),
            position("First", Some((2020, Some(1))), Some((2022, 5))),
            position("Second", Some((2022, Some(6))), None),
        ]);

        let record = ProfileNormalizer::new().normalize(&raw).unwrap();
        let titles: Vec<_> = record.experiences.iter().map(|e| e.title.as_str()).collect();
        let starts: Vec<_> = record.experiences.iter().map(|e| e.start_date.clone()).collect();

        assert_eq!(titles, vec!["Second", "First", "Undated"]);
        assert_eq!(starts, vec![Some("2022-06".into()), Some("2020-01".into()), None]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_dates() {
        let raw = structured(vec![
            position("A", Some((2021, Some(3))), None),
            position("B", Some((2021, Some(3))), None),
            position("C", None, None),
            position("D", None, None),
        ]);

        let record = ProfileNormalizer::new().build(&raw);
        let titles: Vec<_> = record.experiences.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_current_role_inference_and_duration() {
        let raw = structured(vec![
            position("Current", Some((2023, Some(2))), None),
            position("Past", Some((2019, None)), Some((2021, 12))),
        ]);

        let record = ProfileNormalizer::new().normalize(&raw).unwrap();
        let current = &record.experiences[0];
        assert!(current.is_current_role);
        assert_eq!(current.end_date, None);
        assert_eq!(current.duration, "2023-02 até Presente");

        let past = &record.experiences[1];
        assert!(!past.is_current_role);
        assert_eq!(past.start_date.as_deref(), Some("2019-01"));
        assert_eq!(past.end_date.as_deref(), Some("2021-12"));
        assert_eq!(past.duration, "2019-01 até 2021-12");
    }

    #[test]
    fn test_position_without_date_range() {
        let raw = structured(vec![ProfileElement::Position(PositionElement {
            title: Some("Consultant".into()),
            ..PositionElement::default()
        })]);

        let record = ProfileNormalizer::new().normalize(&raw).unwrap();
        let experience = &record.experiences[0];
        assert_eq!(experience.duration, "");
        assert!(experience.is_current_role);
        assert_eq!(experience.company, "");
    }

    #[test]
    fn test_missing_start_renders_empty_side() {
        let range = DateRange { start: None, end: Some(YearMonth::new(2020, Some(7))) };
        assert_eq!(format_duration(&range), " até 2020-07");
    }

    #[test]
    fn test_skills_attributed_to_experiences() {
        let raw = structured(vec![
            ProfileElement::Skill(SkillElement { name: Some("Node.js".into()) }),
            ProfileElement::Skill(SkillElement { name: Some("Liderança".into()) }),
            ProfileElement::Position(PositionElement {
                title: Some("Tech Lead".into()),
                description: Some("Liderança de squad, serviços em Node.js".into()),
                date_range: Some(DateRange { start: Some(YearMonth::new(2022, Some(1))), end: None }),
                ..PositionElement::default()
            }),
            ProfileElement::Position(PositionElement {
                title: Some("Developer".into()),
                description: Some("Wrote nodejsx plugins".into()),
                date_range: Some(DateRange { start: Some(YearMonth::new(2019, Some(1))), end: None }),
                ..PositionElement::default()
            }),
        ]);

        let record = ProfileNormalizer::new().normalize(&raw).unwrap();
        assert_eq!(record.skills, vec!["Node.js", "Liderança"]);
        assert_eq!(record.experiences[0].skills, vec!["Node.js", "Liderança"]);
        assert!(record.experiences[1].skills.is_empty());
    }

    #[test]
    fn test_profile_education_and_certifications() {
        let raw = structured(vec![
            ProfileElement::Profile(ProfileSummaryElement {
                first_name: Some("Ana".into()),
                last_name: Some("Silva".into()),
                headline: Some("Engineer".into()),
                location_name: Some(" ".into()),
            }),
            ProfileElement::Education(EducationElement {
                school_name: Some("USP".into()),
                degree_name: Some("BSc".into()),
                field_of_study: None,
                date_range: Some(DateRange {
                    start: Some(YearMonth::new(2010, None)),
                    end: Some(YearMonth::new(2014, Some(12))),
                }),
            }),
            ProfileElement::Education(EducationElement::default()),
            ProfileElement::Certification(CertificationElement {
                name: Some("CKA".into()),
                authority: None,
                date_range: Some(DateRange { start: Some(YearMonth::new(2023, Some(4))), end: None }),
            }),
            ProfileElement::Unknown { type_name: "com.example.Other".into() },
        ]);

        let record = ProfileNormalizer::new().normalize(&raw).unwrap();
        assert_eq!(record.name, "Ana Silva");
        assert_eq!(record.headline.as_deref(), Some("Engineer"));
        assert_eq!(record.location, None);
        assert_eq!(
            record.education,
            vec![Education {
                school: "USP".into(),
                degree: Some("BSc".into()),
                field: None,
                duration: Some("2010-01 até 2014-12".into()),
            }]
        );
        assert_eq!(
            record.certifications,
            vec![Certification {
                name: "CKA".into(),
                issuer: String::new(),
                issue_date: Some("2023-04".into()),
                expiration_date: None,
            }]
        );
    }

    #[test]
    fn test_document_path_treats_blank_as_absent() {
        let raw = RawProfile {
            profile_url: "https://www.linkedin.com/in/ana".to_string(),
            payload: RawPayload::Document(DomFragments {
                name: " Ana Silva ".into(),
                headline: String::new(),
                location: "São Paulo".into(),
                education: vec![
                    DomEducation {
                        school: "USP".into(),
                        degree: String::new(),
                        field: "Computer Science".into(),
                        period: "2010 - 2014".into(),
                    },
                    DomEducation::default(),
                ],
                skills: vec!["Rust".into(), "  ".into()],
                certifications: vec![
                    DomCertification { name: "CKA".into(), issuer: String::new(), date: String::new() },
                    DomCertification::default(),
                ],
            }),
        };

        let record = ProfileNormalizer::new().normalize(&raw).unwrap();
        assert_eq!(record.name, "Ana Silva");
        assert_eq!(record.headline, None);
        assert_eq!(record.location.as_deref(), Some("São Paulo"));
        assert_eq!(record.education.len(), 1);
        assert_eq!(record.education[0].degree, None);
        assert_eq!(record.education[0].duration.as_deref(), Some("2010 - 2014"));
        assert_eq!(record.skills, vec!["Rust"]);
        assert_eq!(record.certifications.len(), 1);
        assert_eq!(record.certifications[0].issue_date, None);
        assert!(record.experiences.is_empty());
    }

    #[test]
    fn test_empty_profile_is_rejected() {
        let raw = structured(vec![ProfileElement::Profile(ProfileSummaryElement {
            first_name: Some("Ana".into()),
            ..ProfileSummaryElement::default()
        })]);

        assert_eq!(ProfileNormalizer::new().normalize(&raw), Err(ProfileLinkError::EmptyProfile));
        assert_eq!(ProfileNormalizer::new().build(&raw).name, "Ana");
    }
}
