//! HTML profile page to [`DomFragments`]
//!
//! Each field is located by the CSS class the page uses for that role.
//! Single-valued fields take the first match; repeated blocks are read in
//! document order. Text is whitespace-collapsed; a missing node yields `""`.

use profilelink_domain::{DomCertification, DomEducation, DomFragments, ProfileLinkError, Result};
use scraper::{ElementRef, Html, Selector};

const NAME: &str = ".text-heading-xlarge";
const HEADLINE: &str = ".text-body-medium";
const LOCATION: &str = ".text-body-small";

const EDUCATION_ITEM: &str = ".education-item";
const EDUCATION_SCHOOL: &str = ".education-item-school";
const EDUCATION_DEGREE: &str = ".education-item-degree";
const EDUCATION_FIELD: &str = ".education-item-field";
const EDUCATION_PERIOD: &str = ".education-item-period";

const SKILL_NAME: &str = ".skill-category-entity__name";

const CERTIFICATION_ITEM: &str = ".certification-item";
const CERTIFICATION_TITLE: &str = ".certification-item-title";
const CERTIFICATION_ORG: &str = ".certification-item-org";
const CERTIFICATION_DATE: &str = ".certification-item-date";

/// Parsed selector set.
struct Selectors {
    name: Selector,
    headline: Selector,
    location: Selector,
    education_item: Selector,
    education_school: Selector,
    education_degree: Selector,
    education_field: Selector,
    education_period: Selector,
    skill_name: Selector,
    certification_item: Selector,
    certification_title: Selector,
    certification_org: Selector,
    certification_date: Selector,
}

impl Selectors {
    fn parse() -> Result<Self> {
        Ok(Self {
            name: selector(NAME)?,
            headline: selector(HEADLINE)?,
            location: selector(LOCATION)?,
            education_item: selector(EDUCATION_ITEM)?,
            education_school: selector(EDUCATION_SCHOOL)?,
            education_degree: selector(EDUCATION_DEGREE)?,
            education_field: selector(EDUCATION_FIELD)?,
            education_period: selector(EDUCATION_PERIOD)?,
            skill_name: selector(SKILL_NAME)?,
            certification_item: selector(CERTIFICATION_ITEM)?,
            certification_title: selector(CERTIFICATION_TITLE)?,
            certification_org: selector(CERTIFICATION_ORG)?,
            certification_date: selector(CERTIFICATION_DATE)?,
        })
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| ProfileLinkError::Internal(format!("invalid selector {css}: {e}")))
}

/// Reduce an HTML document to text fragments.
///
/// # Errors
/// Only `Internal` if a built-in selector fails to parse.
pub fn extract_fragments(html: &str) -> Result<DomFragments> {
    let selectors = Selectors::parse()?;
    let document = Html::parse_document(html);
    let root = document.root_element();

    let education = root
        .select(&selectors.education_item)
        .map(|block| DomEducation {
            school: first_text(block, &selectors.education_school),
            degree: first_text(block, &selectors.education_degree),
            field: first_text(block, &selectors.education_field),
            period: first_text(block, &selectors.education_period),
        })
        .collect();

    let skills = root
        .select(&selectors.skill_name)
        .map(text_of)
        .filter(|skill| !skill.is_empty())
        .collect();

    let certifications = root
        .select(&selectors.certification_item)
        .map(|block| DomCertification {
            name: first_text(block, &selectors.certification_title),
            issuer: first_text(block, &selectors.certification_org),
            date: first_text(block, &selectors.certification_date),
        })
        .collect();

    Ok(DomFragments {
        name: first_text(root, &selectors.name),
        headline: first_text(root, &selectors.headline),
        location: first_text(root, &selectors.location),
        education,
        skills,
        certifications,
    })
}

fn first_text(scope: ElementRef<'_>, selector: &Selector) -> String {
    scope.select(selector).next().map(text_of).unwrap_or_default()
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}
