use super::*;

#[test]
fn test_plain_utf8_defaults() {
    let decoded = decode("<a>ü</a>".as_bytes(), TextEncoding::Utf8);
    assert_eq!(decoded.text, "<a>ü</a>");
    assert_eq!(decoded.encoding, TextEncoding::Utf8);
    assert!(!decoded.lossy);
}

#[test]
fn test_utf8_bom_is_stripped() {
    let decoded = decode(b"\xEF\xBB\xBF<a/>", TextEncoding::Latin1);
    assert_eq!(decoded.text, "<a/>");
    assert_eq!(decoded.encoding, TextEncoding::Utf8);
}

#[test]
fn test_invalid_utf8_is_replaced() {
    let decoded = decode(b"<a>\xFF\xFE\xFD</a>", TextEncoding::Utf8);
    assert!(decoded.text.starts_with("<a>"));
    assert!(decoded.text.ends_with("</a>"));
    assert!(decoded.text.contains('\u{FFFD}'));
    assert!(decoded.lossy);
}

#[test]
fn test_declared_latin1() {
    let bytes = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><a>caf\xE9</a>";
    let decoded = decode(bytes, TextEncoding::Utf8);
    assert_eq!(decoded.encoding, TextEncoding::Latin1);
    assert!(decoded.text.ends_with("<a>café</a>"));
}

#[test]
fn test_declared_windows_1252_maps_high_range() {
    let bytes = b"<?xml version='1.0' encoding='windows-1252'?><a>\x80\x93x\x94</a>";
    let decoded = decode(bytes, TextEncoding::Utf8);
    assert_eq!(decoded.encoding, TextEncoding::Windows1252);
    assert!(decoded.text.ends_with("<a>€“x”</a>"));
}

#[test]
fn test_declared_ascii_replaces_high_bytes() {
    let bytes = b"<?xml version=\"1.0\" encoding=\"us-ascii\"?><a>\xC3</a>";
    let decoded = decode(bytes, TextEncoding::Utf8);
    assert_eq!(decoded.encoding, TextEncoding::Ascii);
    assert!(decoded.text.ends_with("<a>\u{FFFD}</a>"));
    assert!(decoded.lossy);
}

#[test]
fn test_unknown_label_falls_back() {
    let bytes = b"<?xml version=\"1.0\" encoding=\"klingon\"?><a/>";
    let (enc, skip) = detect(bytes, TextEncoding::Latin1);
    assert_eq!(enc, TextEncoding::Latin1);
    assert_eq!(skip, 0);
}

#[test]
fn test_utf16_label_without_bom_is_ignored() {
    let bytes = b"<?xml version=\"1.0\" encoding=\"UTF-16\"?><a/>";
    let (enc, _) = detect(bytes, TextEncoding::Utf8);
    assert_eq!(enc, TextEncoding::Utf8);
}

#[test]
fn test_utf16le_with_bom() {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in "<a>é</a>".encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    let decoded = decode(&bytes, TextEncoding::Utf8);
    assert_eq!(decoded.encoding, TextEncoding::Utf16Le);
    assert_eq!(decoded.text, "<a>é</a>");
}

#[test]
fn test_utf16be_without_bom_sniffed() {
    let mut bytes = Vec::new();
    for unit in "<?xml version=\"1.0\"?><a/>".encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    let decoded = decode(&bytes, TextEncoding::Utf8);
    assert_eq!(decoded.encoding, TextEncoding::Utf16Be);
    assert!(decoded.text.ends_with("<a/>"));
}

#[test]
fn test_utf16_odd_trailing_byte_is_replaced() {
    let decoded = decode(&[0xFF, 0xFE, 0x41, 0x00, 0x42], TextEncoding::Utf8);
    assert_eq!(decoded.text, "A\u{FFFD}");
    assert!(decoded.lossy);
}

#[test]
fn test_from_label_is_case_insensitive() {
    assert_eq!(TextEncoding::from_label(" Latin1 "), Some(TextEncoding::Latin1));
    assert_eq!(TextEncoding::from_label("UTF8"), Some(TextEncoding::Utf8));
    assert_eq!(TextEncoding::from_label("ebcdic"), None);
}

#[test]
fn test_encode_single_byte_round_trips() {
    let text = "café €“x”";
    for enc in [TextEncoding::Windows1252, TextEncoding::Utf16Le, TextEncoding::Utf16Be] {
        let bytes = encode(text, enc);
        let (detected, skip) = detect(&bytes, enc);
        assert_eq!(detected, enc);
        assert_eq!(decode(&bytes[skip..], enc).text, text);
    }
    assert_eq!(encode("café", TextEncoding::Latin1), b"caf\xE9".to_vec());
}

#[test]
fn test_encode_unmappable_becomes_question_mark() {
    assert_eq!(encode("a€é", TextEncoding::Latin1), b"a?\xE9".to_vec());
    assert_eq!(encode("aé", TextEncoding::Ascii), b"a?".to_vec());
    assert_eq!(encode("a\u{0080}", TextEncoding::Windows1252), b"a?".to_vec());
}

#[test]
fn test_encoding_for_save_matches_reload_detection() {
    let declared = "<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><a/>";
    assert_eq!(
        encoding_for_save(declared, TextEncoding::Utf8, TextEncoding::Utf8),
        TextEncoding::Latin1
    );
    // UTF-16 靠 BOM 识别，不看声明
    assert_eq!(
        encoding_for_save(declared, TextEncoding::Utf16Be, TextEncoding::Utf8),
        TextEncoding::Utf16Be
    );
    assert_eq!(
        encoding_for_save("<a/>", TextEncoding::Latin1, TextEncoding::Utf8),
        TextEncoding::Utf8
    );
    let utf16_label = "<?xml version=\"1.0\" encoding=\"UTF-16\"?><a/>";
    assert_eq!(
        encoding_for_save(utf16_label, TextEncoding::Utf8, TextEncoding::Utf8),
        TextEncoding::Utf8
    );
}
