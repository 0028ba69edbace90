//! Skill-to-experience association
//!
//! Skills are folded (decompose, drop combining marks, lowercase, keep
//! alphanumerics and whitespace) and a skill matches when its folded form
//! appears as a whole word in the experience text. The text is searched in
//! two forms: with punctuation turned into spaces, so `"Rust/Go"` mentions
//! both Rust and Go, and with punctuation removed, so `"Node.js"` in a
//! description matches the skill Node.js. Neither form matches `nodejsx`.

use regex::Regex;
use tracing::warn;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold `text` for matching: punctuation is dropped.
pub fn fold(text: &str) -> String {
    normalize(text, None)
}

/// Fold `text` with punctuation replaced by a space.
pub fn separate(text: &str) -> String {
    normalize(text, Some(' '))
}

fn normalize(text: &str, punctuation: Option<char>) -> String {
    let kept: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .filter_map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                Some(c)
            } else {
                punctuation
            }
        })
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Precompiled whole-word patterns for a skill list.
#[derive(Debug, Clone, Default)]
pub struct SkillMatcher {
    patterns: Vec<(String, Regex)>,
}

impl SkillMatcher {
    /// Compile one pattern per skill. Skills that fold to nothing are
    /// skipped.
    pub fn new<S: AsRef<str>>(skills: &[S]) -> Self {
        let patterns = skills
            .iter()
            .filter_map(|skill| {
                let skill = skill.as_ref();
                let folded = fold(skill);
                if folded.is_empty() {
                    return None;
                }
                match Regex::new(&format!(r"\b{}\b", regex::escape(&folded))) {
                    Ok(pattern) => Some((skill.to_string(), pattern)),
                    Err(err) => {
                        warn!(skill, error = %err, "skill pattern rejected");
                        None
                    }
                }
            })
            .collect();

        Self { patterns }
    }

    /// Original names of the skills mentioned in `title` or `description`,
    /// in skill list order.
    pub fn skills_for(&self, title: &str, description: Option<&str>) -> Vec<String> {
        if self.patterns.is_empty() {
            return Vec::new();
        }

        let text = format!("{title} {}", description.unwrap_or_default());
        let separated = separate(&text);
        let joined = fold(&text);
        self.patterns
            .iter()
            .filter(|(_, pattern)| pattern.is_match(&separated) || pattern.is_match(&joined))
            .map(|(skill, _)| skill.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
