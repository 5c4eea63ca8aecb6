//! # XML 文本转义
//!
//! 把任意应用文本转换为可以放进 XML 元素内容或带引号属性值的安全文本。
//! 转义永远不会失败：非法字符和无效的 UTF-16 代理项都会被逐个替换为 [`REPLACEMENT_CHAR`]。

use std::borrow::Cow;

/// 用于替换非法字符的保留字符。
pub const REPLACEMENT_CHAR: char = '\u{FFFD}';

/// 判断一个字符是否不能出现在 XML 文本中（或不建议出现）。
///
/// 包括除制表符、回车和换行外的 C0 控制字符，除 U+0085 外的 C1 控制字符，
/// `U+FDD0..=U+FDDF` 非字符区，以及 U+FFFE、U+FFFF。
#[must_use]
pub const fn is_invalid_xml_char(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{8}'
            | '\u{B}'
            | '\u{C}'
            | '\u{E}'..='\u{1F}'
            | '\u{7F}'..='\u{84}'
            | '\u{86}'..='\u{9F}'
            | '\u{FDD0}'..='\u{FDDF}'
            | '\u{FFFE}'
            | '\u{FFFF}'
    )
}

const fn needs_escaping(c: char) -> bool {
    matches!(c, '<' | '>' | '&' | '"') || is_invalid_xml_char(c)
}

fn push_escaped_char(out: &mut String, c: char) {
    match c {
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '&' => out.push_str("&amp;"),
        '"' => out.push_str("&quot;"),
        c if is_invalid_xml_char(c) => out.push(REPLACEMENT_CHAR),
        c => out.push(c),
    }
}

/// 转义文本，使其可以直接写入元素内容或双引号属性值。
///
/// 文本不需要转义时直接借用输入，不分配内存。
///
/// ```
/// use speech_xml::escape::escape_xml;
///
/// assert_eq!(escape_xml("<>\"&"), "&lt;&gt;&quot;&amp;");
/// assert_eq!(escape_xml("a\u{0}b"), "a\u{FFFD}b");
/// ```
#[must_use]
pub fn escape_xml(text: &str) -> Cow<'_, str> {
    let Some(first) = text.find(needs_escaping) else {
        return Cow::Borrowed(text);
    };

    let mut out = String::with_capacity(text.len() + 8);
    out.push_str(&text[..first]);
    for c in text[first..].chars() {
        push_escaped_char(&mut out, c);
    }
    Cow::Owned(out)
}

/// 转义 UTF-16 文本。
///
/// 代理项按从左到右成对判断：只有高代理后紧跟低代理才会被当作一个字符保留，
/// 其余任何代理项（孤立的高/低代理、连续两个高代理、先低后高等）都会各自替换为一个
/// [`REPLACEMENT_CHAR`]，而相邻的合法字符保持不变。
#[must_use]
pub fn escape_xml_utf16(units: &[u16]) -> String {
    let mut out = String::with_capacity(units.len());
    for decoded in char::decode_utf16(units.iter().copied()) {
        match decoded {
            Ok(c) => push_escaped_char(&mut out, c),
            Err(_) => out.push(REPLACEMENT_CHAR),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SMILE_HIGH: u16 = 0xD83D;
    const SMILE_LOW: u16 = 0xDE0A;

    fn replacement(n: usize) -> String {
        std::iter::repeat_n(REPLACEMENT_CHAR, n).collect()
    }

    #[test]
    fn test_simple_text_is_borrowed() {
        let out = escape_xml("Testing 1 2 3.");
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out, "Testing 1 2 3.");
    }

    #[test]
    fn test_char_entities() {
        assert_eq!(escape_xml("<>\"&"), "&lt;&gt;&quot;&amp;");
        assert_eq!(escape_xml("it's"), "it's");
    }

    #[test]
    fn test_invalid_chars() {
        // 每个非法区间的起点、起点 + 1 和终点
        let input = "\u{0}\u{1}\u{8}\u{b}\u{c}\u{e}\u{f}\u{1f}\u{7f}\u{80}\u{84}\u{86}\u{87}\u{9f}\u{fdd0}\u{fdd1}\u{fddf}\u{fffe}\u{ffff}";
        assert_eq!(escape_xml(input), replacement(input.chars().count()));
    }

    #[test]
    fn test_allowed_control_chars() {
        assert_eq!(escape_xml("a\tb\r\nc\u{85}"), "a\tb\r\nc\u{85}");
    }

    #[test]
    fn test_escape_after_plain_prefix() {
        assert_eq!(escape_xml("fish & chips"), "fish &amp; chips");
    }

    #[test]
    fn test_valid_surrogate_pair() {
        assert_eq!(escape_xml_utf16(&[SMILE_HIGH, SMILE_LOW]), "\u{1F60A}");
    }

    #[test]
    fn test_lone_surrogates() {
        assert_eq!(escape_xml_utf16(&[SMILE_HIGH]), replacement(1));
        assert_eq!(escape_xml_utf16(&[SMILE_LOW]), replacement(1));
    }

    #[test]
    fn test_misordered_surrogates() {
        assert_eq!(escape_xml_utf16(&[SMILE_LOW, SMILE_HIGH]), replacement(2));
        assert_eq!(escape_xml_utf16(&[SMILE_HIGH, SMILE_HIGH]), replacement(2));
        assert_eq!(escape_xml_utf16(&[SMILE_LOW, SMILE_LOW]), replacement(2));
    }

    #[test]
    fn test_surrogate_then_non_surrogate() {
        let z = u16::from(b'z');
        assert_eq!(escape_xml_utf16(&[SMILE_HIGH, z]), format!("{REPLACEMENT_CHAR}z"));
        assert_eq!(escape_xml_utf16(&[SMILE_LOW, z]), format!("{REPLACEMENT_CHAR}z"));
    }

    #[test]
    fn test_high_surrogate_before_valid_pair() {
        assert_eq!(
            escape_xml_utf16(&[SMILE_HIGH, SMILE_HIGH, SMILE_LOW]),
            format!("{REPLACEMENT_CHAR}\u{1F60A}")
        );
    }

    #[test]
    fn test_utf16_entities_and_invalid_chars() {
        let units: Vec<u16> = "<a>\u{1}".encode_utf16().collect();
        assert_eq!(escape_xml_utf16(&units), format!("&lt;a&gt;{REPLACEMENT_CHAR}"));
    }

    const fn is_high_surrogate(unit: u16) -> bool {
        matches!(unit, 0xD800..=0xDBFF)
    }

    const fn is_low_surrogate(unit: u16) -> bool {
        matches!(unit, 0xDC00..=0xDFFF)
    }

    /// 从左到右成对扫描，统计没有配对的代理项个数。
    fn unpaired_surrogates(units: &[u16]) -> usize {
        let mut count = 0;
        let mut i = 0;
        while i < units.len() {
            let unit = units[i];
            if is_high_surrogate(unit) && units.get(i + 1).copied().is_some_and(is_low_surrogate) {
                i += 2;
                continue;
            }
            if is_high_surrogate(unit) || is_low_surrogate(unit) {
                count += 1;
            }
            i += 1;
        }
        count
    }

    fn assert_well_formed_text(out: &str) {
        assert!(!out.contains(['<', '>', '"']), "{out:?}");
        assert!(!out.chars().any(is_invalid_xml_char), "{out:?}");
        for (i, _) in out.match_indices('&') {
            let rest = &out[i..];
            assert!(
                ["&lt;", "&gt;", "&amp;", "&quot;"]
                    .iter()
                    .any(|e| rest.starts_with(e)),
                "{out:?}"
            );
        }
    }

    fn count_replacements(text: &str) -> usize {
        text.chars().filter(|&c| c == REPLACEMENT_CHAR).count()
    }

    fn utf16_unit() -> impl Strategy<Value = u16> {
        prop_oneof![
            any::<u16>(),
            0xD800u16..=0xDBFF,
            0xDC00u16..=0xDFFF,
            0u16..0x20,
            Just(0xFFFD),
            Just(u16::from(b'&')),
            Just(u16::from(b'<')),
        ]
    }

    proptest! {
        #[test]
        fn test_escape_output_is_always_safe(text in any::<String>()) {
            let out = escape_xml(&text);
            assert_well_formed_text(&out);

            let expected = text
                .chars()
                .filter(|&c| c == REPLACEMENT_CHAR || is_invalid_xml_char(c))
                .count();
            prop_assert_eq!(count_replacements(&out), expected);

            // 还原实体后应得到把非法字符替换掉的原文
            let restored = out
                .replace("&lt;", "<")
                .replace("&gt;", ">")
                .replace("&quot;", "\"")
                .replace("&amp;", "&");
            let sanitized: String = text
                .chars()
                .map(|c| if is_invalid_xml_char(c) { REPLACEMENT_CHAR } else { c })
                .collect();
            prop_assert_eq!(restored, sanitized);
        }

        #[test]
        fn test_each_unpaired_surrogate_becomes_one_replacement(
            units in prop::collection::vec(utf16_unit(), 0..64)
        ) {
            let out = escape_xml_utf16(&units);
            assert_well_formed_text(&out);

            // 合法的代理对只会组成补充平面字符，补充平面里没有被排除的字符
            let excluded = units
                .iter()
                .filter(|&&u| !is_high_surrogate(u) && !is_low_surrogate(u))
                .filter_map(|&u| char::from_u32(u32::from(u)))
                .filter(|&c| c == REPLACEMENT_CHAR || is_invalid_xml_char(c))
                .count();
            prop_assert_eq!(count_replacements(&out), unpaired_surrogates(&units) + excluded);
        }
    }
}
