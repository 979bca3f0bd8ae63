//! Decoding of lexer literals and `[...]` character sets into code points.

use antler_core::IntervalSet;

/// Code points of a quoted literal such as `'a\n'`.
pub fn decode_literal(text: &str) -> Result<Vec<i32>, String> {
    let inner = text
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .ok_or_else(|| format!("`{text}` is not a quoted literal"))?;
    let mut out = Vec::new();
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c as i32);
            continue;
        }
        out.push(decode_escape(&mut chars, false)?);
    }
    Ok(out)
}

fn decode_escape(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    in_set: bool,
) -> Result<i32, String> {
    let Some(c) = chars.next() else {
        return Err("dangling escape".to_string());
    };
    let value = match c {
        'n' => '\n' as i32,
        'r' => '\r' as i32,
        't' => '\t' as i32,
        'b' => '\u{8}' as i32,
        'f' => '\u{c}' as i32,
        '\\' => '\\' as i32,
        '\'' => '\'' as i32,
        '"' => '"' as i32,
        ']' | '-' if in_set => c as i32,
        'u' => return decode_unicode(chars),
        other => return Err(format!("invalid escape sequence `\\{other}`")),
    };
    Ok(value)
}

fn decode_unicode(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<i32, String> {
    let digits: String = if chars.peek() == Some(&'{') {
        chars.next();
        let mut digits = String::new();
        loop {
            match chars.next() {
                Some('}') => break,
                Some(c) => digits.push(c),
                None => return Err("unterminated `\\u{...}` escape".to_string()),
            }
        }
        digits
    } else {
        (0..4).filter_map(|_| chars.next()).collect()
    };
    let value = u32::from_str_radix(&digits, 16)
        .map_err(|_| format!("invalid unicode escape `\\u{digits}`"))?;
    if value > antler_core::token::MAX_CHAR_VALUE as u32 {
        return Err(format!("code point `{value:#x}` out of range"));
    }
    Ok(value as i32)
}

/// Code points of a lexer character set such as `[a-z_\n]`.
pub fn parse_char_set(text: &str) -> Result<IntervalSet, String> {
    let inner = text
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .ok_or_else(|| format!("`{text}` is not a character set"))?;
    if inner.is_empty() {
        return Err("string literals and sets cannot be empty".to_string());
    }

    let mut values: Vec<(i32, bool)> = Vec::new();
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            values.push((decode_escape(&mut chars, true)?, false));
        } else {
            values.push((c as i32, c == '-'));
        }
    }

    let mut set = IntervalSet::new();
    let mut i = 0;
    while i < values.len() {
        let (a, _) = values[i];
        let is_range = i + 2 < values.len() && values[i + 1].1;
        if is_range {
            let (b, _) = values[i + 2];
            if b < a {
                return Err(format!(
                    "range `{}-{}` is reversed",
                    char_display(a),
                    char_display(b)
                ));
            }
            set.add_range(a, b);
            i += 3;
        } else {
            set.add(a);
            i += 1;
        }
    }
    Ok(set)
}

fn char_display(v: i32) -> String {
    char::from_u32(v as u32)
        .map(|c| c.escape_default().to_string())
        .unwrap_or_else(|| format!("\\u{{{v:x}}}"))
}

/// Add the other letter case of every code point in `set`.
pub fn with_both_cases(set: &IntervalSet) -> IntervalSet {
    let mut out = set.clone();
    for v in set.iter() {
        let Some(c) = char::from_u32(v as u32) else {
            continue;
        };
        for u in c.to_uppercase().chain(c.to_lowercase()) {
            out.add(u as i32);
        }
    }
    out
}
