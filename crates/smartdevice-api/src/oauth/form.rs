// Hidden-field extraction from the login page.
//
// The login service renders a plain HTML form; the two values needed to
// submit it live in `<input type="hidden">` tags. Attribute order varies,
// so each tag is matched first and its `name`/`value` pulled out after.

use std::sync::LazyLock;

use regex::Regex;

static INPUT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<input\b[^>]*>").expect("valid regex")
});

static NAME_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bname\s*=\s*["']([^"']*)["']"#)
        .expect("valid regex")
});

static VALUE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\bvalue\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("valid regex")
});

/// Value of the first `<input>` whose `name` equals `field`, entity-decoded.
pub fn hidden_input(html: &str, field: &str) -> Option<String> {
    INPUT_TAG.find_iter(html).find_map(|tag| {
        let tag = tag.as_str();
        let name = NAME_ATTR.captures(tag)?.get(1)?.as_str();
        if name != field {
            return None;
        }
        let caps = VALUE_ATTR.captures(tag)?;
        let raw = caps.get(1).or_else(|| caps.get(2))?.as_str();
        Some(decode_entities(raw))
    })
}

/// Decode the HTML entities that appear in attribute values.
pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_owned();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let Some(end) = rest.find(';') else {
            break;
        };
        let entity = &rest[1..end];
        match decode_entity(entity) {
            Some(c) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let num = entity.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
