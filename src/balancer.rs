//! # XML 标签平衡器
//!
//! 接收一串基础命令，输出结构良好的 XML。
//!
//! 属性标签（[`XmlCommand::SetAttr`] / [`XmlCommand::DelAttr`]）和包裹文本的标签
//! （[`XmlCommand::EncloseText`]）都是惰性的：只记录"应该打开什么"，
//! 直到真正需要输出内容时才对照已经打开的标签进行调和。
//! [`XmlCommand::EncloseAll`] 和 [`XmlCommand::StandAloneTag`] 则会立即输出。

use std::fmt::Display;
use std::mem;

use log::trace;

use crate::escape::escape_xml;

/// 按设置顺序排列的属性列表。
pub type Attributes = Vec<(String, String)>;

/// 平衡器能理解的基础命令。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlCommand {
    /// 在当前位置输出一段（会被转义的）文本。
    Text(String),
    /// 立即输出一个独立元素，不影响也不依赖包裹文本的标签。
    /// `content` 为 `None` 时输出自闭合标签。
    StandAloneTag {
        name: String,
        attrs: Attributes,
        content: Option<String>,
    },
    /// 立即打开一个元素，它会包裹之后的所有输出，直到序列结束才关闭。
    EncloseAll { name: String, attrs: Attributes },
    /// 让 `tag` 以 `attr=value` 处于活动状态。
    SetAttr {
        tag: String,
        attr: String,
        value: String,
    },
    /// 从 `tag` 的活动属性中移除 `attr`，属性全部移除后标签也随之关闭。
    DelAttr { tag: String, attr: String },
    /// 用给定标签包裹之后输出的文本，替换之前设置的包裹标签。
    EncloseText { tag: String, attrs: Attributes },
    /// 停止包裹文本。
    StopEnclosingText,
}

fn collect_attrs<K, V>(attrs: impl IntoIterator<Item = (K, V)>) -> Attributes
where
    K: Into<String>,
    V: Into<String>,
{
    attrs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

impl XmlCommand {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn stand_alone<K, V>(
        name: impl Into<String>,
        attrs: impl IntoIterator<Item = (K, V)>,
        content: Option<&str>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::StandAloneTag {
            name: name.into(),
            attrs: collect_attrs(attrs),
            content: content.map(str::to_string),
        }
    }

    pub fn enclose_all<K, V>(name: impl Into<String>, attrs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::EncloseAll {
            name: name.into(),
            attrs: collect_attrs(attrs),
        }
    }

    pub fn set_attr(tag: impl Into<String>, attr: impl Into<String>, value: impl Display) -> Self {
        Self::SetAttr {
            tag: tag.into(),
            attr: attr.into(),
            value: value.to_string(),
        }
    }

    pub fn del_attr(tag: impl Into<String>, attr: impl Into<String>) -> Self {
        Self::DelAttr {
            tag: tag.into(),
            attr: attr.into(),
        }
    }

    pub fn enclose_text<K, V>(tag: impl Into<String>, attrs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::EncloseText {
            tag: tag.into(),
            attrs: collect_attrs(attrs),
        }
    }
}

/// 一个带属性的标签，既用于"应该打开的"状态，也用于"已经打开的"状态。
#[derive(Debug, Clone, PartialEq, Eq)]
struct Tag {
    name: String,
    attrs: Attributes,
}

/// 标签平衡器。
///
/// 同一个实例可以被顺序复用，每次 [`generate_xml`](Self::generate_xml) 结束时状态都会被清空，
/// 但不能在多个线程中同时使用。
#[derive(Debug, Default)]
pub struct XmlBalancer {
    out: String,
    /// 由 `SetAttr` 维护的活动标签，按首次创建的顺序嵌套。
    tags: Vec<Tag>,
    /// 输出中实际处于打开状态的属性标签。
    open_tags: Vec<Tag>,
    /// 应该包裹文本的标签，总是位于最内层。
    text_tag: Option<Tag>,
    /// 输出中实际打开的文本包裹标签。
    open_text_tag: Option<Tag>,
    /// 已经打开、需要在最后关闭的 `EncloseAll` 元素名。
    enclose_all: Vec<String>,
}

impl XmlBalancer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 处理整个命令序列并返回完整的 XML 字符串。
    pub fn generate_xml(&mut self, commands: &[XmlCommand]) -> String {
        for command in commands {
            trace!("平衡器命令: {command:?}");
            match command {
                XmlCommand::Text(text) => {
                    self.sync_tags();
                    self.sync_text_tag();
                    self.out.push_str(&escape_xml(text));
                }
                XmlCommand::StandAloneTag {
                    name,
                    attrs,
                    content,
                } => {
                    self.sync_tags();
                    self.close_text_tag();
                    self.write_stand_alone(name, attrs, content.as_deref());
                }
                XmlCommand::EncloseAll { name, attrs } => {
                    self.close_text_tag();
                    self.close_open_tags();
                    self.write_open(name, attrs, false);
                    self.enclose_all.push(name.clone());
                }
                XmlCommand::SetAttr { tag, attr, value } => self.set_attr(tag, attr, value),
                XmlCommand::DelAttr { tag, attr } => self.del_attr(tag, attr),
                XmlCommand::EncloseText { tag, attrs } => {
                    self.text_tag = Some(Tag {
                        name: tag.clone(),
                        attrs: attrs.clone(),
                    });
                }
                XmlCommand::StopEnclosingText => self.text_tag = None,
            }
        }
        self.flush()
    }

    fn set_attr(&mut self, tag: &str, attr: &str, value: &str) {
        let index = match self.tags.iter().position(|t| t.name == tag) {
            Some(index) => index,
            None => {
                self.tags.push(Tag {
                    name: tag.to_string(),
                    attrs: Vec::new(),
                });
                self.tags.len() - 1
            }
        };
        let attrs = &mut self.tags[index].attrs;
        if let Some((_, existing)) = attrs.iter_mut().find(|(name, _)| name == attr) {
            value.clone_into(existing);
        } else {
            attrs.push((attr.to_string(), value.to_string()));
        }
    }

    fn del_attr(&mut self, tag: &str, attr: &str) {
        let Some(index) = self.tags.iter().position(|t| t.name == tag) else {
            return;
        };
        self.tags[index].attrs.retain(|(name, _)| name != attr);
        if self.tags[index].attrs.is_empty() {
            self.tags.remove(index);
        }
    }

    /// 调和属性标签：只要实际打开的和应该打开的有任何不同，就全部关闭再按创建顺序重新打开。
    fn sync_tags(&mut self) {
        if self.open_tags == self.tags {
            return;
        }
        self.close_text_tag();
        self.close_open_tags();
        for tag in &self.tags {
            Self::push_open(&mut self.out, &tag.name, &tag.attrs, false);
        }
        self.open_tags.clone_from(&self.tags);
    }

    fn sync_text_tag(&mut self) {
        if self.open_text_tag == self.text_tag {
            return;
        }
        self.close_text_tag();
        if let Some(tag) = &self.text_tag {
            Self::push_open(&mut self.out, &tag.name, &tag.attrs, false);
            self.open_text_tag = Some(tag.clone());
        }
    }

    fn close_text_tag(&mut self) {
        if let Some(tag) = self.open_text_tag.take() {
            self.write_close(&tag.name);
        }
    }

    fn close_open_tags(&mut self) {
        while let Some(tag) = self.open_tags.pop() {
            self.write_close(&tag.name);
        }
    }

    /// 关闭所有仍然打开的标签并重置状态，返回生成的 XML。
    fn flush(&mut self) -> String {
        self.close_text_tag();
        self.close_open_tags();
        while let Some(name) = self.enclose_all.pop() {
            self.write_close(&name);
        }
        self.tags.clear();
        self.text_tag = None;
        mem::take(&mut self.out)
    }

    fn push_open(out: &mut String, name: &str, attrs: &Attributes, empty: bool) {
        out.push('<');
        out.push_str(name);
        for (attr, value) in attrs {
            out.push(' ');
            out.push_str(attr);
            out.push_str("=\"");
            out.push_str(&escape_xml(value));
            out.push('"');
        }
        out.push_str(if empty { "/>" } else { ">" });
    }

    fn write_open(&mut self, name: &str, attrs: &Attributes, empty: bool) {
        Self::push_open(&mut self.out, name, attrs, empty);
    }

    fn write_close(&mut self, name: &str) {
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }

    fn write_stand_alone(&mut self, name: &str, attrs: &Attributes, content: Option<&str>) {
        match content {
            Some(content) => {
                self.write_open(name, attrs, false);
                self.out.push_str(&escape_xml(content));
                self.write_close(name);
            }
            None => self.write_open(name, attrs, true),
        }
    }
}
