//! The "generate description" helper: a fixed template filled from the
//! event form fields.

use time::OffsetDateTime;
use time::format_description::well_known::Rfc2822;

const CLOSING: &str = "This event is a great opportunity to meet like-minded people, \
learn something new, and have fun. Bring your friends and RSVP soon!";

/// Form fields the template draws from. Every field is optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptionInput<'a> {
    pub title: Option<&'a str>,
    pub date: Option<OffsetDateTime>,
    pub location: Option<&'a str>,
    pub capacity: Option<i64>,
}

/// Collapse runs of whitespace; `None` when nothing is left.
fn squash(text: Option<&str>) -> Option<String> {
    let words: Vec<&str> = text?.split_whitespace().collect();
    (!words.is_empty()).then(|| words.join(" "))
}

/// Fill the template. Absent (or blank) fields drop their fragment.
pub fn generate_description(input: DescriptionInput<'_>) -> String {
    let mut opening = vec!["Join us".to_string()];
    if let Some(title) = squash(input.title) {
        opening.push(format!("\"{title}\""));
    }
    if let Some(location) = squash(input.location) {
        opening.push(format!("at {location}"));
    }
    if let Some(when) = input.date.and_then(|d| d.format(&Rfc2822).ok()) {
        opening.push(format!("on {when}"));
    }

    let mut sentences = vec![format!("{}.", opening.join(" "))];
    if let Some(capacity) = input.capacity.filter(|c| *c > 0) {
        sentences.push(format!("Limited to {capacity} attendees."));
    }
    sentences.push(CLOSING.to_string());
    sentences.join(" ")
}
