//! Text composition: structured entity fields to one embedding input string.
//!
//! Segments are joined with `" | "`. Both sides of any comparison must go
//! through these functions; a change here invalidates every stored vector.

use crate::catalog::{Entity, JobPosting, ResumeProfile};
use crate::config::{JOB_DESCRIPTION_EMBED_CHARS, SEGMENT_SEPARATOR};

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// First `max_chars` characters of `text` (Unicode scalar values, not bytes).
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// `Job Title: ..` | `Required Skills: ..` | `Description: <first 500 chars>`.
pub fn job_text(job: &JobPosting) -> String {
    let mut parts = vec![format!("Job Title: {}", job.title)];

    if !job.requirements.is_empty() {
        parts.push(format!("Required Skills: {}", job.requirements.join(", ")));
    }

    if !job.description.is_empty() {
        let desc = truncate_chars(&job.description, JOB_DESCRIPTION_EMBED_CHARS);
        parts.push(format!("Description: {desc}"));
    }

    parts.join(SEGMENT_SEPARATOR)
}

/// `Skills: ..`, then one segment per experience and education entry.
///
/// Returns an empty string for a resume with nothing matchable.
pub fn resume_text(resume: &ResumeProfile) -> String {
    let mut parts = Vec::new();

    if !resume.skills.is_empty() {
        parts.push(format!("Skills: {}", resume.skills.join(", ")));
    }

    for exp in &resume.experience {
        let mut words: Vec<String> = Vec::new();
        if let Some(title) = present(&exp.title) {
            words.push(title.to_string());
        }
        if let Some(company) = present(&exp.company) {
            words.push(format!("at {company}"));
        }
        if let Some(description) = present(&exp.description) {
            words.push(description.to_string());
        }
        if !words.is_empty() {
            parts.push(words.join(" "));
        }
    }

    for edu in &resume.education {
        let mut words: Vec<String> = Vec::new();
        if let Some(degree) = present(&edu.degree) {
            words.push(degree.to_string());
        }
        if let Some(institution) = present(&edu.institution) {
            words.push(format!("from {institution}"));
        }
        if let Some(field) = present(&edu.field) {
            words.push(format!("in {field}"));
        }
        if !words.is_empty() {
            parts.push(words.join(" "));
        }
    }

    parts.join(SEGMENT_SEPARATOR)
}

pub fn entity_text(entity: &Entity) -> String {
    match entity {
        Entity::Job(job) => job_text(job),
        Entity::Resume(resume) => resume_text(resume),
    }
}
