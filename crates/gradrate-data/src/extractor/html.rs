//! Minimal HTML scanning for the profile pages.
//!
//! Tag and attribute names are matched case-insensitively. Byte offsets found
//! in the ASCII-lowercased copy are valid in the original text.

/// Text of the first `<tag>` element, if any.
pub fn first_element_text(html: &str, tag: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    let tag = tag.to_ascii_lowercase();
    let mut pos = 0;
    while let Some(rel) = lower[pos..].find('<') {
        let start = pos + rel;
        let open_end = lower[start..].find('>')? + start + 1;
        pos = open_end;
        if tag_name(&lower[start + 1..open_end - 1]) == tag {
            let close = find_close(&lower, &tag, open_end)?;
            return Some(strip_tags(&html[open_end..close]));
        }
    }
    None
}

/// Text of every element carrying `class` in its class list, in document order.
pub fn elements_with_class(html: &str, class: &str) -> Vec<String> {
    let lower = html.to_ascii_lowercase();
    let mut out = Vec::new();
    let mut pos = 0;

    while let Some(rel) = lower[pos..].find('<') {
        let start = pos + rel;
        let Some(end_rel) = lower[start..].find('>') else {
            break;
        };
        let open_end = start + end_rel + 1;
        pos = open_end;

        let tag = &html[start + 1..open_end - 1];
        if tag.starts_with(['/', '!', '?']) || !has_class(tag, class) {
            continue;
        }
        let name = tag_name(&lower[start + 1..open_end - 1]);
        if name.is_empty() {
            continue;
        }
        if tag.ends_with('/') {
            out.push(String::new());
            continue;
        }
        if let Some(close) = find_close(&lower, &name, open_end) {
            out.push(strip_tags(&html[open_end..close]));
        }
    }
    out
}

/// Remove markup, decode the common entities and collapse whitespace.
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;

    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    normalize_ws(&decode_entities(&out))
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&#36;", "$")
        .replace("&#37;", "%")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn tag_name(tag: &str) -> String {
    tag.split(|c: char| c.is_ascii_whitespace() || c == '/')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn is_tag_boundary(rest: &str) -> bool {
    rest.chars()
        .next()
        .is_none_or(|c| c == '>' || c == '/' || c.is_ascii_whitespace())
}

/// Offset of the `</name>` matching an element opened just before `from`.
fn find_close(lower: &str, name: &str, from: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut pos = from;

    while let Some(rel) = lower[pos..].find('<') {
        let at = pos + rel;
        let rest = &lower[at + 1..];
        if let Some(after) = rest.strip_prefix('/').and_then(|r| r.strip_prefix(name)) {
            if is_tag_boundary(after) {
                depth -= 1;
                if depth == 0 {
                    return Some(at);
                }
            }
        } else if let Some(after) = rest.strip_prefix(name) {
            if is_tag_boundary(after) {
                depth += 1;
            }
        }
        pos = at + 1;
    }
    None
}

fn class_attribute(tag: &str) -> Option<&str> {
    let lower = tag.to_ascii_lowercase();
    let mut from = 0;

    while let Some(rel) = lower[from..].find("class") {
        let at = from + rel;
        from = at + "class".len();
        if !lower[..at].ends_with(|c: char| c.is_ascii_whitespace()) {
            continue;
        }
        let Some(rest) = lower[from..].trim_start().strip_prefix('=') else {
            continue;
        };
        let value = tag[lower.len() - rest.len()..].trim_start();
        let value = match value.chars().next() {
            Some(quote @ ('"' | '\'')) => value[1..].split(quote).next().unwrap_or(""),
            _ => value
                .split(|c: char| c.is_ascii_whitespace() || c == '/')
                .next()
                .unwrap_or(""),
        };
        return Some(value);
    }
    None
}

fn has_class(tag: &str, class: &str) -> bool {
    class_attribute(tag).is_some_and(|value| value.split_ascii_whitespace().any(|c| c == class))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_element_text() {
        let html = "<html><H2 class=\"title\">Smith &amp; Jones  College</H2><h2>Other</h2>";
        assert_eq!(
            first_element_text(html, "h2").as_deref(),
            Some("Smith & Jones College")
        );
        assert_eq!(first_element_text(html, "h1"), None);
    }

    #[test]
    fn test_elements_with_class_in_order() {
        let html = r#"
            <table>
              <tr><td class="label">State</td><td class="data">AL</td></tr>
              <tr><td class='data extra'><span>1,234</span></td></tr>
              <tr><TD CLASS=data>45%</TD><td class="database">no</td></tr>
              <tr><td class="metadata">no</td><td class="data"></td></tr>
            </table>"#;

        assert_eq!(elements_with_class(html, "data"), vec!["AL", "1,234", "45%", ""]);
    }

    #[test]
    fn test_nested_elements() {
        let html = r#"<div class="data">outer <div>inner</div> tail</div><div class="data">x</div>"#;
        assert_eq!(
            elements_with_class(html, "data"),
            vec!["outer inner tail", "x"]
        );
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<b>&#36;12,000</b>\n "), "$12,000");
    }
}
