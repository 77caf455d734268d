//! SVG participation certificates.
//!
//! Certificates are rendered on every download from an embedded template;
//! nothing is written to disk. The generate step only flips the
//! participation's flag and records the download URL.

use crate::model::{ParticipationDetails, ParticipationType};

const CERTIFICATE_TEMPLATE: &str = include_str!("certificate.svg");

/// Download URL stored on the participation once a certificate exists.
pub fn certificate_url(participation_id: &str) -> String {
    format!("/api/certificates/{}.svg", participation_id)
}

/// `certificate-<slug>.svg`, where the slug is the lowercased event title with
/// every non-alphanumeric character replaced by `_`.
pub fn certificate_filename(event_title: &str) -> String {
    let slug: String = event_title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("certificate-{}.svg", slug)
}

fn participation_phrase(participation_type: ParticipationType) -> &'static str {
    match participation_type {
        ParticipationType::Volunteer => "for volunteering at",
        ParticipationType::Going => "for attending",
    }
}

fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Render the certificate for a participation.
///
/// The participant's name is "First Last" as registered; the event title is
/// the English one.
pub fn render_certificate(details: &ParticipationDetails, issued_on: &str) -> String {
    let name = format!(
        "{} {}",
        details.user.profile.first_name, details.user.profile.last_name
    );
    CERTIFICATE_TEMPLATE
        .replace("{name}", &xml_escape(name.trim()))
        .replace(
            "{phrase}",
            participation_phrase(details.participation.participation_type),
        )
        .replace("{event}", &xml_escape(&details.event.title_en))
        .replace("{date}", &xml_escape(&details.event.date))
        .replace("{location}", &xml_escape(&details.event.location))
        .replace("{issued}", &xml_escape(issued_on))
}
