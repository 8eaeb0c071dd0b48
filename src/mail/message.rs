use lettre::message::Mailbox;

use crate::models::ContactSubmission;

/// Where contact mail goes and what it's called. Fixed at startup.
#[derive(Debug, Clone)]
pub struct ContactEnvelope {
    pub to: String,
    pub subject: String,
}

/// A rendered message, built once per submission and handed to every transport.
/// The sender address belongs to each transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl OutgoingEmail {
    pub fn contact(envelope: &ContactEnvelope, submission: &ContactSubmission) -> Self {
        // Submitter address is unverified; only use it for Reply-To when it parses.
        let reply_to = submission
            .email
            .parse::<Mailbox>()
            .ok()
            .map(|_| submission.email.clone());

        Self {
            to: envelope.to.clone(),
            reply_to,
            subject: envelope.subject.clone(),
            text: render_text(submission),
            html: render_html(submission),
        }
    }
}

pub fn render_text(s: &ContactSubmission) -> String {
    format!(
        "Name: {}\nEmail: {}\nPhone: {}\nBusiness Type: {}\n\nMessage:\n{}",
        s.name, s.email, s.phone, s.business_type, s.message
    )
}

pub fn render_html(s: &ContactSubmission) -> String {
    let message = escape_html(&s.message).replace("\r\n", "\n").replace('\n', "<br>");

    format!(
        "<h2>New Contact Form Submission</h2>\
         <p><strong>Name:</strong> {}</p>\
         <p><strong>Email:</strong> {}</p>\
         <p><strong>Phone:</strong> {}</p>\
         <p><strong>Business Type:</strong> {}</p>\
         <p><strong>Message:</strong></p>\
         <p>{}</p>",
        escape_html(&s.name),
        escape_html(&s.email),
        escape_html(&s.phone),
        escape_html(&s.business_type),
        message
    )
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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
