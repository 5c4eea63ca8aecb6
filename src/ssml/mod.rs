//! # SSML 转换
//!
//! 两个方向各自独立实现，只共享 [`constants`] 中的元素与属性名。

pub mod constants;
mod converter;
mod parser;

pub use converter::{SsmlConverter, format_percentage};
pub use parser::SsmlParser;
