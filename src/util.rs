//! Text decoding for chapter files.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

/// How far into a file the XML declaration is looked for.
const DECLARATION_WINDOW: usize = 100;

/// Decode a chapter file to text ready for the XML reader.
///
/// UTF-8 (with or without a BOM) wins whenever the bytes are valid UTF-8.
/// Otherwise the encoding named in the XML declaration is used, falling back
/// to Windows-1252, which the older annotation exports were written in.
///
/// Line ends are normalized to `\n` as XML 1.0 requires of a parser, so
/// `\r\n` and lone `\r` never reach the tree.
pub fn decode_chapter(bytes: &[u8]) -> Cow<'_, str> {
    let (text, malformed) = UTF_8.decode_with_bom_removal(bytes);
    let text = if malformed {
        declared_encoding(bytes)
            .unwrap_or(WINDOWS_1252)
            .decode_without_bom_handling(bytes)
            .0
    } else {
        text
    };
    normalize_line_ends(text)
}

/// The encoding named by `<?xml ... encoding="..."?>`, if encoding_rs knows it.
fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(DECLARATION_WINDOW)];
    let start = head.windows(5).position(|w| w == b"<?xml")?;
    let decl = &head[start..];
    let decl = &decl[..decl.windows(2).position(|w| w == b"?>").unwrap_or(decl.len())];

    let key = decl.windows(8).position(|w| w.eq_ignore_ascii_case(b"encoding"))?;
    let rest = decl[key + 8..].trim_ascii_start().strip_prefix(b"=")?;
    let rest = rest.trim_ascii_start();

    let (&quote, value) = rest.split_first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let end = value.iter().position(|&b| b == quote)?;
    Encoding::for_label(&value[..end])
}

fn normalize_line_ends(text: Cow<'_, str>) -> Cow<'_, str> {
    if !text.contains('\r') {
        return text;
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_is_borrowed() {
        let text = decode_chapter("<quote>Élise</quote>".as_bytes());
        assert_eq!(text, "<quote>Élise</quote>");
        assert!(matches!(text, Cow::Borrowed(_)));
    }

    #[test]
    fn test_bom_stripped() {
        let bytes = [0xEF, 0xBB, 0xBF, b'<', b'a', b'/', b'>'];
        assert_eq!(decode_chapter(&bytes), "<a/>");
    }

    #[test]
    fn test_declared_encoding_used_for_non_utf8() {
        let mut bytes = br#"<?xml version="1.0" encoding="ISO-8859-1"?><a>caf"#.to_vec();
        bytes.extend_from_slice(&[0xE9, b'<', b'/', b'a', b'>']);
        assert!(decode_chapter(&bytes).ends_with("<a>café</a>"));
    }

    #[test]
    fn test_windows_1252_fallback() {
        // curly double quotes
        let bytes = [b'<', b'a', b'>', 0x93, b'h', b'i', 0x94, b'<', b'/', b'a', b'>'];
        assert_eq!(decode_chapter(&bytes), "<a>\u{201C}hi\u{201D}</a>");
    }

    #[test]
    fn test_line_ends_normalized() {
        assert_eq!(decode_chapter(b"<text>a\r\nb\rc\n</text>"), "<text>a\nb\nc\n</text>");
    }

    #[test]
    fn test_declared_encoding() {
        assert_eq!(
            declared_encoding(br#"<?xml version="1.0" encoding="utf-8"?><doc/>"#),
            Some(UTF_8)
        );
        assert_eq!(
            declared_encoding(b"<?xml version='1.0' encoding = 'windows-1252'?>"),
            Some(WINDOWS_1252)
        );
        assert_eq!(declared_encoding(br#"<?xml version="1.0"?><doc encoding="utf-8"/>"#), None);
        assert_eq!(declared_encoding(b"<doc/>"), None);
        assert_eq!(declared_encoding(b"<?xml encoding="), None);
        assert_eq!(declared_encoding(br#"<?xml encoding="klingon"?>"#), None);
    }
}
