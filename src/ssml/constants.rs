//! # SSML 词汇表
//!
//! 生成和解析时共用的元素名、属性名和固定属性值。

pub const TAG_SPEAK: &str = "speak";
pub const TAG_PROSODY: &str = "prosody";
pub const TAG_VOICE: &str = "voice";
pub const TAG_SAY_AS: &str = "say-as";
pub const TAG_MARK: &str = "mark";
pub const TAG_PHONEME: &str = "phoneme";

pub const ATTR_VERSION: &str = "version";
pub const ATTR_XMLNS: &str = "xmlns";
pub const ATTR_XML_LANG: &str = "xml:lang";
pub const ATTR_INTERPRET_AS: &str = "interpret-as";
pub const ATTR_NAME: &str = "name";
pub const ATTR_ALPHABET: &str = "alphabet";
pub const ATTR_PH: &str = "ph";

pub const SSML_VERSION: &str = "1.0";
pub const SSML_NAMESPACE: &str = "http://www.w3.org/2001/10/synthesis";
pub const INTERPRET_AS_CHARACTERS: &str = "characters";
pub const ALPHABET_IPA: &str = "ipa";
