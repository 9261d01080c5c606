//! Wire encoding of property names.
//!
//! Characters that cannot appear in a bare name travel as `_xHHHH_`, where `HHHH` is the
//! upper-case hexadecimal code point (`_xHHHHHHHH_` outside the basic multilingual
//! plane). A literal `_x` that would otherwise read as an escape is itself escaped as
//! `_x005F_x`.

/// Decodes every well-formed `_xHHHH_` escape. Malformed escapes are kept as written.
pub fn decode_name(encoded: &str) -> String {
    let mut out = String::with_capacity(encoded.len());
    let mut rest = encoded;
    while let Some(idx) = rest.find("_x") {
        out.push_str(&rest[..idx]);
        let candidate = &rest[idx..];
        match parse_escape(candidate) {
            Some((c, len)) => {
                out.push(c);
                rest = &candidate[len..];
            }
            None => {
                out.push_str("_x");
                rest = &candidate[2..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Encodes a decoded name for display. For names made only of plain characters this is
/// the identity, so `encode_name(&decode_name(n)) == n`.
pub fn encode_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, c) in name.char_indices() {
        let first = i == 0;
        if c == '_' && parse_escape(&name[i..]).is_some() {
            push_escape(&mut out, c);
        } else if is_plain(c, first) {
            out.push(c);
        } else {
            push_escape(&mut out, c);
        }
    }
    out
}

/// Whether `c` can appear unescaped in an encoded name.
pub fn is_plain(c: char, first: bool) -> bool {
    if c.is_alphabetic() || c == '_' || c == ':' {
        return true;
    }
    !first && (c.is_numeric() || c == '-' || c == '.')
}

/// Parses an escape at the start of `s`, returning the character and the escape length.
fn parse_escape(s: &str) -> Option<(char, usize)> {
    if !s.starts_with("_x") {
        return None;
    }
    [4, 8].into_iter().find_map(|digits| {
        let end = 2 + digits;
        if s.as_bytes().get(end) != Some(&b'_') {
            return None;
        }
        let hex = s.get(2..end)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let c = u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)?;
        Some((c, end + 1))
    })
}

fn push_escape(out: &mut String, c: char) {
    let code = c as u32;
    if code > 0xFFFF {
        out.push_str(&format!("_x{:08X}_", code));
    } else {
        out.push_str(&format!("_x{:04X}_", code));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_escapes() {
        assert_eq!(decode_name("first_x0020_name"), "first name");
        assert_eq!(decode_name("_x0031_st"), "1st");
        assert_eq!(decode_name("plain_name"), "plain_name");
        // malformed escapes survive untouched
        assert_eq!(decode_name("a_x12"), "a_x12");
        assert_eq!(decode_name("a_xZZZZ_"), "a_xZZZZ_");
    }

    #[test]
    fn test_encode_reserved() {
        assert_eq!(encode_name("first name"), "first_x0020_name");
        assert_eq!(encode_name("1st"), "_x0031_st");
        assert_eq!(encode_name("jcr:title"), "jcr:title");
    }

    #[test]
    fn test_round_trip_without_reserved_characters() {
        for name in ["age", "jcr:lastModified", "x-1.2", "_private", "naïve"] {
            assert_eq!(encode_name(&decode_name(name)), name);
        }
    }

    #[test]
    fn test_round_trip_with_reserved_characters() {
        let names = ["first name", "9lives", "a/b", "literal_x0020_text", "smile \u{1F600}"];
        for name in names {
            assert_eq!(decode_name(&encode_name(name)), name);
        }
    }
}
