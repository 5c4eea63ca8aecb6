//! # 语音指令类型
//!
//! 语音管线使用的指令目录：纯文本与韵律/语言/拼读/标记指令交错的线性序列。

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// 内部语言代码使用的分隔符，例如 `en_US`。
pub const INTERNAL_LOCALE_SEPARATOR: &str = "_";
/// SSML `xml:lang` 使用的分隔符，例如 `en-US`。
pub const MARKUP_LOCALE_SEPARATOR: &str = "-";

/// 乘数为该值时表示恢复合成器的默认值。
pub const DEFAULT_MULTIPLIER: f64 = 1.0;

/// 可以通过百分比调整的韵律属性。
///
/// 字符串形式即为 `<prosody>` 上的属性名。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProsodyAttribute {
    /// 音高
    Pitch,
    /// 音量
    Volume,
    /// 语速
    Rate,
}

/// 一条语音指令。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum SpeechInstruction {
    /// 需要朗读的文本。
    Text(String),
    /// 以乘数调整某个韵律属性，乘数为 [`DEFAULT_MULTIPLIER`] 时恢复默认。
    Prosody {
        attribute: ProsodyAttribute,
        multiplier: f64,
    },
    /// 切换朗读语言，`None` 表示回到默认语言。
    LangChange(Option<String>),
    /// 进入或离开逐字拼读模式。
    CharacterMode(bool),
    /// 位置标记，合成器读到此处时回报该索引。
    Index(i32),
    /// 用 IPA 音标覆盖发音，`text` 是不支持音标时的回退文本。
    Phoneme { ipa: String, text: Option<String> },
}

impl SpeechInstruction {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    #[must_use]
    pub const fn prosody(attribute: ProsodyAttribute, multiplier: f64) -> Self {
        Self::Prosody {
            attribute,
            multiplier,
        }
    }

    #[must_use]
    pub const fn pitch(multiplier: f64) -> Self {
        Self::prosody(ProsodyAttribute::Pitch, multiplier)
    }

    #[must_use]
    pub const fn volume(multiplier: f64) -> Self {
        Self::prosody(ProsodyAttribute::Volume, multiplier)
    }

    #[must_use]
    pub const fn rate(multiplier: f64) -> Self {
        Self::prosody(ProsodyAttribute::Rate, multiplier)
    }

    /// 把某个韵律属性恢复为默认值的指令。
    #[must_use]
    pub const fn reset(attribute: ProsodyAttribute) -> Self {
        Self::prosody(attribute, DEFAULT_MULTIPLIER)
    }

    pub fn lang(lang: impl Into<String>) -> Self {
        Self::LangChange(Some(lang.into()))
    }

    pub fn phoneme(ipa: impl Into<String>, text: Option<&str>) -> Self {
        Self::Phoneme {
            ipa: ipa.into(),
            text: text.map(str::to_string),
        }
    }
}

/// 把内部语言代码转换为 SSML 使用的形式：`de_DE` -> `de-DE`。
#[must_use]
pub fn locale_to_markup(locale: &str) -> String {
    locale.replace(INTERNAL_LOCALE_SEPARATOR, MARKUP_LOCALE_SEPARATOR)
}

/// 把 SSML 中的语言代码转换回内部形式：`de-DE` -> `de_DE`。
#[must_use]
pub fn locale_from_markup(lang: &str) -> String {
    lang.replace(MARKUP_LOCALE_SEPARATOR, INTERNAL_LOCALE_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_locale_normalization() {
        assert_eq!(locale_to_markup("en_US"), "en-US");
        assert_eq!(locale_from_markup("de-DE"), "de_DE");
        assert_eq!(locale_to_markup("fr"), "fr");
    }

    #[test]
    fn test_prosody_attribute_names() {
        assert_eq!(ProsodyAttribute::Pitch.as_ref(), "pitch");
        assert_eq!(ProsodyAttribute::Volume.to_string(), "volume");
        assert_eq!(
            ProsodyAttribute::from_str("rate").ok(),
            Some(ProsodyAttribute::Rate)
        );
        assert!(ProsodyAttribute::from_str("contour").is_err());
    }

    #[test]
    fn test_instruction_json_shape() {
        let seq = vec![
            SpeechInstruction::text("hi"),
            SpeechInstruction::pitch(2.0),
            SpeechInstruction::CharacterMode(true),
        ];
        let json = serde_json::to_string(&seq).unwrap();
        assert_eq!(
            json,
            r#"[{"type":"text","value":"hi"},{"type":"prosody","value":{"attribute":"pitch","multiplier":2.0}},{"type":"characterMode","value":true}]"#
        );
        let back: Vec<SpeechInstruction> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, seq);
    }
}
