//! Alert email rendering (HTML via Askama, plus a plain text alternative).
use askama::Template;

/// Content id the inline logo attachment is referenced by.
pub const LOGO_CONTENT_ID: &str = "climatrixlogo";

#[derive(Template)]
#[template(path = "alert_email.html")]
pub struct AlertEmailTemplate<'a> {
    pub brand_name: &'a str,
    pub alert_type: &'a str,
    pub recipient_name: &'a str,
    pub message_lines: Vec<&'a str>,
    pub logo_cid: Option<&'a str>,
}

impl<'a> AlertEmailTemplate<'a> {
    pub fn new(
        brand_name: &'a str,
        alert_type: &'a str,
        recipient_name: &'a str,
        message: &'a str,
        with_logo: bool,
    ) -> Self {
        let recipient_name = if recipient_name.trim().is_empty() {
            "User"
        } else {
            recipient_name
        };
        Self {
            brand_name,
            alert_type,
            recipient_name,
            message_lines: message
                .split('\n')
                .map(|line| line.strip_suffix('\r').unwrap_or(line))
                .collect(),
            logo_cid: with_logo.then_some(LOGO_CONTENT_ID),
        }
    }

    #[tracing::instrument(skip(self))]
    pub fn render_html(&self) -> Result<String, askama::Error> {
        self.render()
    }

    #[tracing::instrument(skip(self))]
    pub fn render_text(&self) -> String {
        format!(
            r#"{alert_type}
Official emergency notification from {brand}

Hello {name},

{message}

You received this alert because you enabled emergency email alerts in your {brand} account.

---
This is an automated email from {brand}. Please do not reply."#,
            alert_type = self.alert_type,
            brand = self.brand_name,
            name = self.recipient_name,
            message = self.message_lines.join("\n"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_breaks_become_br_tags() {
        let tpl = AlertEmailTemplate::new(
            "Climatrix SL",
            "Flood Warning",
            "Nimal",
            "River levels rising.\nMove to higher ground.",
            false,
        );
        let html = tpl.render_html().unwrap();
        assert!(html.contains("River levels rising.<br/>Move to higher ground."));
        assert!(html.contains("Hello Nimal,"));
        assert!(html.contains("Flood Warning"));
        assert!(!html.contains("cid:"));
    }

    #[test]
    fn every_newline_becomes_a_break() {
        let tpl = AlertEmailTemplate::new("B", "T", "N", "first\r\n\nlast\n", false);
        assert_eq!(tpl.message_lines, vec!["first", "", "last", ""]);
        let html = tpl.render_html().unwrap();
        assert!(html.contains("first<br/><br/>last<br/>"));
    }

    #[test]
    fn message_is_escaped() {
        let tpl = AlertEmailTemplate::new("B", "T", "N", "<script>alert(1)</script>", false);
        let html = tpl.render_html().unwrap();
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn logo_is_referenced_by_content_id() {
        let tpl = AlertEmailTemplate::new("Climatrix SL", "T", "N", "m", true);
        let html = tpl.render_html().unwrap();
        assert!(html.contains("cid:climatrixlogo"));
    }

    #[test]
    fn blank_name_falls_back_to_user() {
        let tpl = AlertEmailTemplate::new("B", "T", "  ", "m", false);
        assert!(tpl.render_text().contains("Hello User,"));
    }
}
