//! # SSML -> 语音指令
//!
//! 用 `quick-xml` 流式读取 SSML，重建（可能有损的）语音指令序列。
//! 作用域元素关闭时会合成对应的"恢复默认"指令；`mark` 和 `phoneme` 只参与结构平衡，不产生指令。

use std::str::FromStr;

use log::{debug, warn};
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};

use super::constants::{
    ATTR_INTERPRET_AS, ATTR_XML_LANG, INTERPRET_AS_CHARACTERS, TAG_PROSODY, TAG_SAY_AS, TAG_VOICE,
};
use crate::error::{SpeechXmlError, SpeechXmlResult};
use crate::types::{
    DEFAULT_MULTIPLIER, ProsodyAttribute, SpeechInstruction, locale_from_markup,
};

/// XML 空白字符（根元素之外只允许出现这些字符）。
const fn is_xml_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

/// 解析 `"200%"` 形式的百分比，返回乘数。
fn parse_percentage(value: &str) -> Option<f64> {
    let percent = value.trim().strip_suffix('%')?.trim().parse::<f64>().ok()?;
    percent.is_finite().then_some(percent / 100.0)
}

/// 指令种类，用于合并两段文本之间对同一状态的多次修改。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChangeKind {
    Prosody(ProsodyAttribute),
    Language,
    CharacterMode,
}

impl ChangeKind {
    const fn of(instruction: &SpeechInstruction) -> Option<Self> {
        match instruction {
            SpeechInstruction::Prosody { attribute, .. } => Some(Self::Prosody(*attribute)),
            SpeechInstruction::LangChange(_) => Some(Self::Language),
            SpeechInstruction::CharacterMode(_) => Some(Self::CharacterMode),
            _ => None,
        }
    }

    fn initial_value(self) -> SpeechInstruction {
        match self {
            Self::Prosody(attribute) => SpeechInstruction::prosody(attribute, DEFAULT_MULTIPLIER),
            Self::Language => SpeechInstruction::LangChange(None),
            Self::CharacterMode => SpeechInstruction::CharacterMode(false),
        }
    }
}

/// 收集解析出的指令。
///
/// 两段文本之间产生的状态修改先暂存起来，遇到文本（或文档结束）时再统一输出：
/// 同一种类只保留最后一次的值（位置取第一次出现的位置），与当前生效值相同的修改直接丢弃。
#[derive(Debug, Default)]
struct InstructionSink {
    sequence: Vec<SpeechInstruction>,
    pending: Vec<(ChangeKind, SpeechInstruction)>,
    effective: Vec<(ChangeKind, SpeechInstruction)>,
}

impl InstructionSink {
    fn change(&mut self, instruction: SpeechInstruction) {
        let Some(kind) = ChangeKind::of(&instruction) else {
            self.flush_pending();
            self.sequence.push(instruction);
            return;
        };
        if let Some((_, pending)) = self.pending.iter_mut().find(|(k, _)| *k == kind) {
            *pending = instruction;
        } else {
            self.pending.push((kind, instruction));
        }
    }

    fn text(&mut self, text: String) {
        self.flush_pending();
        if let Some(SpeechInstruction::Text(last)) = self.sequence.last_mut() {
            last.push_str(&text);
        } else {
            self.sequence.push(SpeechInstruction::Text(text));
        }
    }

    fn effective_value(&self, kind: ChangeKind) -> SpeechInstruction {
        self.effective
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or_else(|| kind.initial_value(), |(_, v)| v.clone())
    }

    fn flush_pending(&mut self) {
        for (kind, instruction) in std::mem::take(&mut self.pending) {
            if self.effective_value(kind) == instruction {
                continue;
            }
            if let Some((_, current)) = self.effective.iter_mut().find(|(k, _)| *k == kind) {
                current.clone_from(&instruction);
            } else {
                self.effective.push((kind, instruction.clone()));
            }
            self.sequence.push(instruction);
        }
    }

    fn finish(mut self) -> Vec<SpeechInstruction> {
        self.flush_pending();
        self.sequence
    }
}

/// SSML 解析器。
///
/// 解析器不保存跨调用的状态，可以随意复用。
#[derive(Debug, Default, Clone, Copy)]
pub struct SsmlParser;

impl SsmlParser {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// 把 SSML 文档转换为语音指令序列。
    ///
    /// # Errors
    ///
    /// * `SpeechXmlError::Xml` - 输入不是结构良好的 XML（标签未闭合、结束标签不匹配等）
    /// * `SpeechXmlError::Attribute` - 属性语法错误
    /// * `SpeechXmlError::Malformed` - 文档没有根元素、有多个根元素、根元素之外出现文本，
    ///   或文档结束时仍有元素未关闭
    pub fn convert_from_xml(&self, xml: &str) -> SpeechXmlResult<Vec<SpeechInstruction>> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);
        reader.config_mut().expand_empty_elements = true;

        let mut sink = InstructionSink::default();
        // 每个打开的元素在关闭时需要补发的指令
        let mut element_stack: Vec<(Vec<u8>, Vec<SpeechInstruction>)> = Vec::new();
        let mut root_seen = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    if element_stack.is_empty() {
                        if root_seen {
                            return Err(SpeechXmlError::Malformed(format!(
                                "位置 {} 出现第二个根元素 <{}>",
                                reader.buffer_position(),
                                String::from_utf8_lossy(e.name().as_ref())
                            )));
                        }
                        root_seen = true;
                    }
                    let resets = handle_start(&e, &mut sink)?;
                    element_stack.push((e.name().as_ref().to_vec(), resets));
                }
                Event::End(e) => {
                    let Some((name, resets)) = element_stack.pop() else {
                        return Err(SpeechXmlError::Malformed(format!(
                            "位置 {} 出现多余的结束标签 </{}>",
                            reader.buffer_position(),
                            String::from_utf8_lossy(e.name().as_ref())
                        )));
                    };
                    if name != e.name().as_ref() {
                        return Err(SpeechXmlError::Malformed(format!(
                            "位置 {} 的结束标签 </{}> 与 <{}> 不匹配",
                            reader.buffer_position(),
                            String::from_utf8_lossy(e.name().as_ref()),
                            String::from_utf8_lossy(&name)
                        )));
                    }
                    for reset in resets.into_iter().rev() {
                        sink.change(reset);
                    }
                }
                // 序言和尾部的空白不属于内容
                Event::Text(e) if element_stack.is_empty() => {
                    if !e.iter().copied().all(is_xml_whitespace) {
                        return Err(SpeechXmlError::Malformed(format!(
                            "位置 {} 的根元素之外出现文本",
                            reader.buffer_position()
                        )));
                    }
                }
                Event::Text(e) => sink.text(e.unescape()?.into_owned()),
                Event::CData(_) if element_stack.is_empty() => {
                    return Err(SpeechXmlError::Malformed(format!(
                        "位置 {} 的根元素之外出现 CDATA",
                        reader.buffer_position()
                    )));
                }
                Event::CData(e) => {
                    sink.text(String::from_utf8_lossy(&e.into_inner()).into_owned());
                }
                Event::Eof => break,
                // 注释、处理指令、声明和 DOCTYPE 都不影响语音
                _ => {}
            }
        }

        if let Some((name, _)) = element_stack.last() {
            return Err(SpeechXmlError::Malformed(format!(
                "文档结束时 <{}> 仍未关闭",
                String::from_utf8_lossy(name)
            )));
        }
        if !root_seen {
            return Err(SpeechXmlError::Malformed("文档缺少根元素".to_string()));
        }

        let sequence = sink.finish();
        debug!("从 SSML 中解析出 {} 条语音指令", sequence.len());
        Ok(sequence)
    }
}

/// 处理开始标签，输出对应指令，并返回该元素关闭时需要补发的指令（按属性出现顺序）。
fn handle_start(
    e: &BytesStart<'_>,
    sink: &mut InstructionSink,
) -> SpeechXmlResult<Vec<SpeechInstruction>> {
    let mut resets = Vec::new();
    let name = e.name();
    let name = name.as_ref();

    if name == TAG_PROSODY.as_bytes() {
        for attr in e.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref());
            let Ok(attribute) = ProsodyAttribute::from_str(&key) else {
                continue;
            };
            let value = attr.unescape_value()?;
            let Some(multiplier) = parse_percentage(&value) else {
                warn!("忽略无法解析的 prosody {key}=\"{value}\"");
                continue;
            };
            sink.change(SpeechInstruction::prosody(attribute, multiplier));
            resets.push(SpeechInstruction::reset(attribute));
        }
    } else if name == TAG_VOICE.as_bytes() {
        if let Some(attr) = e.try_get_attribute(ATTR_XML_LANG)? {
            let lang = attr.unescape_value()?;
            sink.change(SpeechInstruction::lang(locale_from_markup(&lang)));
        }
    } else if name == TAG_SAY_AS.as_bytes() {
        if let Some(attr) = e.try_get_attribute(ATTR_INTERPRET_AS)?
            && attr.unescape_value()? == INTERPRET_AS_CHARACTERS
        {
            sink.change(SpeechInstruction::CharacterMode(true));
            resets.push(SpeechInstruction::CharacterMode(false));
        }
    }

    Ok(resets)
}
