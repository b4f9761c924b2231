//! Escaping for text placed in HTML and inline scripts.

/// Escapes text for use in HTML element content or attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

/// Makes serialized JSON safe to inline inside a `<script>` element.
#[must_use]
pub fn escape_script_json(json: &str) -> String {
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b>"Pos" & 'Pol'</b>"#),
            "&lt;b&gt;&quot;Pos&quot; &amp; &#39;Pol&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("Polsek Menteng"), "Polsek Menteng");
    }

    #[test]
    fn script_json_cannot_close_tag() {
        let json = serde_json::to_string("</script><script>alert(1)</script>").unwrap();
        let escaped = escape_script_json(&json);
        assert!(!escaped.contains("</script>"));
        let back: String = serde_json::from_str(&escaped).unwrap();
        assert_eq!(back, "</script><script>alert(1)</script>");
    }
}
