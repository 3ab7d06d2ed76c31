/// Converts an upstream issue body to the markdown stored downstream.
///
/// The rich HTML body is preferred when the payload carries one; otherwise
/// the plain body is used. Either way the text runs through the HTML to
/// markdown converter, so `<p>desc</p>` becomes `desc` and plain markdown
/// passes through. Empty and whitespace-only bodies yield `None`.
pub fn issue_description(body: Option<&str>, body_html: Option<&str>) -> Option<String> {
    let raw = body_html
        .filter(|value| !value.trim().is_empty())
        .or_else(|| body.filter(|value| !value.trim().is_empty()))?;
    Some(html2md::parse_html(raw).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::issue_description;

    #[test]
    fn unit_issue_description_converts_html_paragraphs_to_markdown() {
        assert_eq!(
            issue_description(None, Some("<p>desc</p>")).as_deref(),
            Some("desc")
        );
    }

    #[test]
    fn unit_issue_description_prefers_html_body_over_plain_body() {
        assert_eq!(
            issue_description(Some("plain"), Some("<p>rich</p>")).as_deref(),
            Some("rich")
        );
    }

    #[test]
    fn unit_issue_description_falls_back_to_plain_body() {
        assert_eq!(
            issue_description(Some("plain text"), None).as_deref(),
            Some("plain text")
        );
        assert_eq!(
            issue_description(Some("plain"), Some("   ")).as_deref(),
            Some("plain")
        );
    }

    #[test]
    fn unit_issue_description_yields_none_for_empty_bodies() {
        assert!(issue_description(None, None).is_none());
        assert!(issue_description(Some("  "), Some("")).is_none());
    }
}
