use std::borrow::Cow;

use unicode_width::UnicodeWidthChar;

/// Escapes text for embedding in HTML element content or a quoted attribute.
///
/// Replaces `& < > " '` with entities. Returns `Cow::Borrowed` when nothing
/// needs escaping, which is the common case for article text.
///
/// ```
/// use newsdesk::util::escape_html;
///
/// assert_eq!(escape_html("plain"), "plain");
/// assert_eq!(
///     escape_html(r#"<img src=x onerror="alert('x')">"#),
///     "&lt;img src=x onerror=&quot;alert(&#39;x&#39;)&quot;&gt;"
/// );
/// ```
pub fn escape_html(s: &str) -> Cow<'_, str> {
    if !s.bytes().any(|b| matches!(b, b'&' | b'<' | b'>' | b'"' | b'\'')) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn is_stripped_control(b: u8) -> bool {
    b == 0x7f || (b < 0x20 && b != b'\t' && b != b'\n' && b != b'\r')
}

/// Strips terminal control characters and ANSI escape sequences.
///
/// Article fields come from third-party feeds; painting them raw into the
/// terminal would let a headline move the cursor or retitle the window.
///
/// Removes C0 controls (except tab, newline, CR), DEL, CSI sequences
/// (`ESC [ ... final`), OSC sequences (`ESC ] ... BEL|ESC \`) and bare ESC.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    let bytes = s.as_bytes();
    if !bytes.iter().any(|&b| b == 0x1b || is_stripped_control(b)) {
        return Cow::Borrowed(s);
    }

    let len = bytes.len();
    let mut out = String::with_capacity(len);
    let mut i = 0;

    while i < len {
        let b = bytes[i];
        if b == 0x1b {
            match bytes.get(i + 1) {
                Some(b'[') => {
                    i += 2;
                    while i < len {
                        let c = bytes[i];
                        i += 1;
                        if (0x40..=0x7e).contains(&c) {
                            break;
                        }
                    }
                }
                Some(b']') => {
                    i += 2;
                    while i < len {
                        if bytes[i] == 0x07 {
                            i += 1;
                            break;
                        }
                        if bytes[i] == 0x1b && bytes.get(i + 1) == Some(&b'\\') {
                            i += 2;
                            break;
                        }
                        i += 1;
                    }
                }
                _ => i += 1,
            }
        } else if is_stripped_control(b) {
            i += 1;
        } else {
            let start = i;
            i += 1;
            while i < len && bytes[i] != 0x1b && !is_stripped_control(bytes[i]) {
                i += 1;
            }
            // Only ASCII bytes end a run, so the slice is on a char boundary.
            out.push_str(&s[start..i]);
        }
    }

    Cow::Owned(out)
}

const ELLIPSIS: &str = "...";

/// Truncates `s` to at most `max_width` terminal columns, appending "..."
/// when text was cut. Widths of 3 or less get a bare prefix with no ellipsis.
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    let total: usize = s.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max_width {
        return Cow::Borrowed(s);
    }

    let budget = if max_width <= ELLIPSIS.len() {
        max_width
    } else {
        max_width - ELLIPSIS.len()
    };

    let mut width = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = c.width().unwrap_or(0);
        if width + w > budget {
            break;
        }
        width += w;
        end = idx + c.len_utf8();
    }

    if max_width <= ELLIPSIS.len() {
        Cow::Owned(s[..end].to_string())
    } else {
        Cow::Owned(format!("{}{}", &s[..end], ELLIPSIS))
    }
}
