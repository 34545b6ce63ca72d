//! Channel body rendering
//!
//! Pure functions from a `SubmissionForm` to a channel-specific body.
//! Rendering is deterministic: the field order is fixed, absent values
//! show as a placeholder, and no field value can make rendering fail.

use carbazar_core::models::{ChannelKind, SubmissionForm};

/// Shown for every field the user left blank.
const PLACEHOLDER: &str = "-";

type FieldGetter = for<'a> fn(&'a SubmissionForm) -> Option<&'a str>;

/// Display label and accessor for each form field, in presentation order.
/// Both renderers walk this table so the channels always agree on content.
const FIELDS: [(&str, FieldGetter); 15] = [
    ("Name", |f| f.name.as_deref()),
    ("Phone", |f| f.phone.as_deref()),
    ("Email", |f| f.email.as_deref()),
    ("City", |f| f.city.as_deref()),
    ("Registration Number", |f| f.registration_number.as_deref()),
    ("RC Available", |f| f.rc_available.as_deref()),
    ("Insurance Available", |f| f.insurance_available.as_deref()),
    ("Car Model", |f| f.car_model.as_deref()),
    ("Variant", |f| f.variant.as_deref()),
    ("Fuel Type", |f| f.fuel_type.as_deref()),
    ("Ownership", |f| f.ownership.as_deref()),
    ("Kilometers Driven", |f| f.kilometers_driven.as_deref()),
    ("Expected Price", |f| f.expected_price.as_deref()),
    ("Condition Scale", |f| f.condition_scale.as_deref()),
    ("Damage Remarks", |f| f.damage_remarks.as_deref()),
];

/// Render the body for the given channel.
pub fn render(form: &SubmissionForm, channel: ChannelKind) -> String {
    match channel {
        ChannelKind::Email => render_email_html(form),
        ChannelKind::WhatsApp => render_chat_text(form),
    }
}

/// HTML document with one table row per form field. All user-provided
/// values are escaped before interpolation.
pub fn render_email_html(form: &SubmissionForm) -> String {
    let mut rows = String::new();
    for (label, getter) in FIELDS {
        let value = getter(form).unwrap_or(PLACEHOLDER);
        rows.push_str(&format!(
            "<tr><td style=\"padding:6px 12px;border:1px solid #ddd;font-weight:bold;\">{}</td>\
             <td style=\"padding:6px 12px;border:1px solid #ddd;\">{}</td></tr>\n",
            escape_html(label),
            escape_html(value),
        ));
    }

    format!(
        "<html><body style=\"font-family:Arial,sans-serif;\">\
         <h2>New Car Sale Submission</h2>\
         <table style=\"border-collapse:collapse;\">\n{rows}</table>\
         </body></html>"
    )
}

/// Plain-text body for chat channels, one `*Label:* value` line per field.
pub fn render_chat_text(form: &SubmissionForm) -> String {
    let mut body = String::from("New Car Sale Submission\n\n");
    for (label, getter) in FIELDS {
        let value = getter(form).unwrap_or(PLACEHOLDER);
        body.push_str(&format!("*{label}:* {value}\n"));
    }
    body
}

fn escape_html(input: &str) -> String {
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
