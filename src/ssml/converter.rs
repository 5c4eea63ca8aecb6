//! # 语音指令 -> SSML
//!
//! 把每条语音指令映射为平衡器的基础命令，外面套上 `<speak>` 根元素，再交给平衡器输出。

use log::debug;

use super::constants::{
    ALPHABET_IPA, ATTR_ALPHABET, ATTR_INTERPRET_AS, ATTR_NAME, ATTR_PH, ATTR_VERSION,
    ATTR_XML_LANG, ATTR_XMLNS, INTERPRET_AS_CHARACTERS, SSML_NAMESPACE, SSML_VERSION, TAG_MARK,
    TAG_PHONEME, TAG_PROSODY, TAG_SAY_AS, TAG_SPEAK, TAG_VOICE,
};
use crate::balancer::{XmlBalancer, XmlCommand};
use crate::types::{DEFAULT_MULTIPLIER, ProsodyAttribute, SpeechInstruction, locale_to_markup};

/// 把乘数格式化为 SSML 百分比，例如 `2.0` -> `"200%"`。
///
/// 非整数百分比按"四舍六入五成双"取整。
#[must_use]
pub fn format_percentage(multiplier: f64) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let percent = (multiplier * 100.0).round_ties_even() as i64;
    format!("{percent}%")
}

/// SSML 生成器。
///
/// `default_language` 使用内部形式（例如 `en_US`），既用于根元素的 `xml:lang`，
/// 也用于没有指定语言的 [`SpeechInstruction::LangChange`]。
#[derive(Debug, Clone)]
pub struct SsmlConverter {
    default_language: String,
}

impl SsmlConverter {
    pub fn new(default_language: impl Into<String>) -> Self {
        Self {
            default_language: default_language.into(),
        }
    }

    #[must_use]
    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// 把语音指令序列转换为完整的 SSML 文档。
    #[must_use]
    pub fn convert_to_xml(&self, instructions: &[SpeechInstruction]) -> String {
        let commands = self.generate_balancer_commands(instructions);
        debug!(
            "{} 条语音指令映射为 {} 条平衡器命令",
            instructions.len(),
            commands.len()
        );
        XmlBalancer::new().generate_xml(&commands)
    }

    /// 生成交给平衡器的命令序列，第一条总是 `<speak>` 根元素。
    #[must_use]
    pub fn generate_balancer_commands(&self, instructions: &[SpeechInstruction]) -> Vec<XmlCommand> {
        let mut commands = Vec::with_capacity(instructions.len() + 1);
        commands.push(XmlCommand::enclose_all(
            TAG_SPEAK,
            [
                (ATTR_VERSION, SSML_VERSION.to_string()),
                (ATTR_XMLNS, SSML_NAMESPACE.to_string()),
                (ATTR_XML_LANG, locale_to_markup(&self.default_language)),
            ],
        ));
        commands.extend(instructions.iter().map(|i| self.convert_instruction(i)));
        commands
    }

    fn convert_instruction(&self, instruction: &SpeechInstruction) -> XmlCommand {
        match instruction {
            SpeechInstruction::Text(text) => XmlCommand::text(text.as_str()),
            SpeechInstruction::Prosody {
                attribute,
                multiplier,
            } => convert_prosody(*attribute, *multiplier),
            SpeechInstruction::LangChange(lang) => {
                let lang = lang.as_deref().unwrap_or(&self.default_language);
                XmlCommand::set_attr(TAG_VOICE, ATTR_XML_LANG, locale_to_markup(lang))
            }
            SpeechInstruction::CharacterMode(true) => {
                XmlCommand::enclose_text(TAG_SAY_AS, [(ATTR_INTERPRET_AS, INTERPRET_AS_CHARACTERS)])
            }
            SpeechInstruction::CharacterMode(false) => XmlCommand::StopEnclosingText,
            SpeechInstruction::Index(index) => {
                XmlCommand::stand_alone(TAG_MARK, [(ATTR_NAME, index.to_string())], None)
            }
            SpeechInstruction::Phoneme { ipa, text } => XmlCommand::stand_alone(
                TAG_PHONEME,
                [(ATTR_ALPHABET, ALPHABET_IPA), (ATTR_PH, ipa.as_str())],
                text.as_deref(),
            ),
        }
    }
}

#[allow(clippy::float_cmp)]
fn convert_prosody(attribute: ProsodyAttribute, multiplier: f64) -> XmlCommand {
    if multiplier == DEFAULT_MULTIPLIER {
        XmlCommand::del_attr(TAG_PROSODY, attribute.as_ref())
    } else {
        XmlCommand::set_attr(TAG_PROSODY, attribute.as_ref(), format_percentage(multiplier))
    }
}
