use std::io;

use quick_xml::{Error as QuickXmlError, events::attributes::AttrError as QuickXmlAttrError};
use thiserror::Error;

/// 语音指令与 SSML 互相转换时可能发生的错误。
///
/// 转义和标签平衡永远不会失败，只有解析标记和外围的 IO/配置才会产生错误。
#[derive(Error, Debug)]
pub enum SpeechXmlError {
    /// XML 格式错误，来自 `quick-xml` 库（未闭合的标签、不匹配的结束标签等）。
    #[error("SSML 格式错误: {0}")]
    Xml(#[from] QuickXmlError),
    /// XML 属性解析错误。
    #[error("XML 属性错误: {0}")]
    Attribute(#[from] QuickXmlAttrError),
    /// 标记结构不完整，例如文档结束时仍有元素未关闭。
    #[error("SSML 结构错误: {0}")]
    Malformed(String),
    /// 文件读写等 IO 错误。
    #[error("IO 错误: {0}")]
    Io(#[from] io::Error),
    /// 指令序列的 JSON 序列化/反序列化错误。
    #[error("JSON 错误: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SpeechXmlResult<T> = std::result::Result<T, SpeechXmlError>;
