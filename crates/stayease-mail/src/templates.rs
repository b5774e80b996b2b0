//! Message bodies sent by the server.

use chrono::{DateTime, Utc};

use crate::OutgoingEmail;

/// Property details rendered into an availability notice.
#[derive(Debug, Clone)]
pub struct AvailabilityNotice<'a> {
    pub recipient_name: Option<&'a str>,
    pub property_name: &'a str,
    pub location: &'a str,
    pub available_at: DateTime<Utc>,
    pub property_url: &'a str,
}

/// "Your saved listing opens in N days" notice for an interested renter.
#[must_use]
pub fn availability_notice(to: &str, notice: &AvailabilityNotice<'_>) -> OutgoingEmail {
    let greeting = notice
        .recipient_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("there");
    let date = notice.available_at.format("%A, %B %-d, %Y").to_string();

    let text = format!(
        "Hi {greeting},\n\n\
         {name} in {location} becomes available on {date}.\n\
         View the listing: {url}\n\n\
         You are receiving this because you marked this property as interested on StayEase.\n",
        name = notice.property_name,
        location = notice.location,
        url = notice.property_url,
    );

    let html = format!(
        "<p>Hi {greeting},</p>\
         <p><strong>{name}</strong> in {location} becomes available on <strong>{date}</strong>.</p>\
         <p><a href=\"{url}\">View the listing</a></p>\
         <p style=\"color:#666;font-size:12px\">You are receiving this because you marked this \
         property as interested on StayEase.</p>",
        greeting = escape_html(greeting),
        name = escape_html(notice.property_name),
        location = escape_html(notice.location),
        url = escape_html(notice.property_url),
    );

    OutgoingEmail {
        to: to.to_string(),
        subject: format!("{} is available soon", notice.property_name),
        text,
        html: Some(html),
    }
}

/// Transport self-test message.
#[must_use]
pub fn test_email(to: &str, sent_at: DateTime<Utc>) -> OutgoingEmail {
    let stamp = sent_at.to_rfc3339();
    OutgoingEmail {
        to: to.to_string(),
        subject: "StayEase test email".to_string(),
        text: format!("This is a test email from StayEase, sent at {stamp}."),
        html: Some(format!(
            "<p>This is a test email from <strong>StayEase</strong>, sent at {stamp}.</p>"
        )),
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
