use chrono::NaiveDate;
use serde::Serialize;

use super::domain::CompanyRegistration;

/// Printable proof of registration, available once a registration is approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationCertificate {
    pub company_name: String,
    pub registration_number: String,
    pub business_type: String,
    pub registered_on: NaiveDate,
}

impl RegistrationCertificate {
    pub fn for_registration(record: &CompanyRegistration) -> Option<Self> {
        if !record.is_approved() {
            return None;
        }
        let registered_on = record
            .approved_date
            .unwrap_or(record.submitted_date)
            .date_naive();

        Some(Self {
            company_name: record.company_name.clone(),
            registration_number: record.registration_number.clone(),
            business_type: record.business_type.clone(),
            registered_on,
        })
    }

    pub fn file_name(&self) -> String {
        let safe: String = self
            .registration_number
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        format!("Certificate_{safe}.html")
    }

    pub fn render_html(&self) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Certificate of Registration</title>
<style>
body {{ font-family: Georgia, serif; max-width: 780px; margin: 0 auto; padding: 48px; }}
.certificate {{ border: 3px double #1f3a5f; padding: 48px; text-align: center; }}
.company {{ font-size: 26px; font-weight: bold; color: #1f3a5f; margin: 24px 0; }}
.seal {{ display: inline-block; width: 96px; height: 96px; line-height: 96px; border: 2px solid #1f3a5f; border-radius: 50%; font-size: 12px; }}
footer {{ margin-top: 36px; color: #555; font-size: 14px; }}
</style>
</head>
<body>
<section class="certificate">
<h1>Certificate of Registration</h1>
<p>This certifies that</p>
<div class="company">{company}</div>
<p>Registration number <strong>{number}</strong></p>
<p>Business type <strong>{business_type}</strong></p>
<p>is registered and authorized to operate as a business entity.</p>
<footer>
<div class="seal">OFFICIAL SEAL</div>
<p>Date of registration: {registered_on}</p>
</footer>
</section>
</body>
</html>
"#,
            company = escape_html(&self.company_name),
            number = escape_html(&self.registration_number),
            business_type = escape_html(&self.business_type),
            registered_on = self.registered_on.format("%B %-d, %Y"),
        )
    }
}

pub(crate) fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
