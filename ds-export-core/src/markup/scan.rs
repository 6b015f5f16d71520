//! Low-level scanning over export text
//!
//! String literals and Deluge comments are opaque: delimiters inside them
//! never open or close anything.

/// Result of trying to skip an opaque region at a position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Skip {
    /// Nothing opaque starts here
    None,
    /// Resume scanning at this offset
    To(usize),
    /// A string literal starts here and never ends
    Unterminated,
}

/// Skip a string literal or comment starting at `i`
pub(crate) fn skip_opaque(bytes: &[u8], i: usize) -> Skip {
    match (bytes.get(i), bytes.get(i + 1)) {
        (Some(b'"'), _) => match string_end(bytes, i) {
            Some(end) => Skip::To(end),
            None => Skip::Unterminated,
        },
        (Some(b'/'), Some(b'/')) => {
            let end = memchr(bytes, b'\n', i + 2).unwrap_or(bytes.len());
            Skip::To(end)
        }
        (Some(b'/'), Some(b'*')) => {
            let mut j = i + 2;
            while j + 1 < bytes.len() {
                if bytes[j] == b'*' && bytes[j + 1] == b'/' {
                    return Skip::To(j + 2);
                }
                j += 1;
            }
            Skip::To(bytes.len())
        }
        _ => Skip::None,
    }
}

/// Offset one past the closing quote of the string opened at `start`
pub(crate) fn string_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut j = start + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'"' => return Some(j + 1),
            _ => j += 1,
        }
    }
    None
}

fn memchr(bytes: &[u8], needle: u8, from: usize) -> Option<usize> {
    bytes.get(from..)?.iter().position(|&b| b == needle).map(|p| p + from)
}

/// Offset of the `)` matching the `(` at `open`
pub fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'(') {
        return None;
    }

    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match skip_opaque(bytes, i) {
            Skip::To(next) => {
                i = next;
                continue;
            }
            Skip::Unterminated => return None,
            Skip::None => {}
        }
        match bytes[i] {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Offset of the `]` matching the `[` at `open`
pub fn matching_bracket(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'[') {
        return None;
    }

    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        if let Skip::To(next) = skip_opaque(bytes, i) {
            i = next;
            continue;
        }
        match bytes[i] {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Offset of the first non-whitespace byte at or after `from`
pub fn skip_whitespace(text: &str, from: usize) -> usize {
    text.get(from..)
        .and_then(|rest| rest.find(|c: char| !c.is_whitespace()))
        .map_or(text.len(), |p| p + from)
}

/// Net parenthesis depth change of a line, ignoring string literals
pub(crate) fn paren_delta(line: &str) -> isize {
    let bytes = line.as_bytes();
    let mut delta = 0isize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                i = string_end(bytes, i).unwrap_or(bytes.len());
                continue;
            }
            b'(' => delta += 1,
            b')' => delta -= 1,
            _ => {}
        }
        i += 1;
    }
    delta
}
