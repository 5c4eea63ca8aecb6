//! # Speech XML: Speech Instruction <-> SSML Codec
//!
//! This crate converts a linear sequence of speech instructions (text runs interleaved with
//! prosody, language, spelling-mode, marker and phoneme directives) into SSML for a speech
//! synthesizer, and parses SSML back into such a sequence.
//!
//! The main entry points are:
//! - [`SsmlConverter::convert_to_xml`]: builds an SSML document from instructions.
//! - [`SsmlParser::convert_from_xml`]: reconstructs instructions from SSML.
//! - [`XmlBalancer::generate_xml`]: the underlying engine that keeps lazily opened
//!   elements well nested while attributes are toggled on and off.
//! - [`escape::escape_xml`] / [`escape::escape_xml_utf16`]: XML escaping that never fails.
//!
//! ## ⚠️ Lossy round trip
//!
//! `mark` and `phoneme` elements are emitted but not reconstructed, so converting and parsing
//! back only preserves text, prosody, language and spelling-mode instructions.
//!
//! ## UTF-16 input
//!
//! Rust strings cannot hold unpaired surrogates, so text that arrives as raw UTF-16 (for
//! example from a Windows speech API) should go through [`escape::escape_xml_utf16`] rather
//! than being decoded first. Each unpaired surrogate becomes one U+FFFD and the result can be
//! placed directly inside an element:
//!
//! ```rust
//! use speech_xml::{SpeechInstruction, SsmlParser, escape::escape_xml_utf16};
//!
//! let units = [u16::from(b'a'), 0xD83D, u16::from(b'<')];
//! let xml = format!("<speak>{}</speak>", escape_xml_utf16(&units));
//! assert_eq!(xml, "<speak>a\u{FFFD}&lt;</speak>");
//! assert_eq!(
//!     SsmlParser::new().convert_from_xml(&xml).unwrap(),
//!     vec![SpeechInstruction::text("a\u{FFFD}<")]
//! );
//! ```
//!
//! ## Examples
//!
//! ```rust
//! use speech_xml::{SpeechInstruction, SsmlConverter, SsmlParser};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = SsmlConverter::new("en_US");
//!     let xml = converter.convert_to_xml(&[
//!         SpeechInstruction::pitch(1.5),
//!         SpeechInstruction::text("Hello"),
//!     ]);
//!     assert_eq!(
//!         xml,
//!         "<speak version=\"1.0\" xmlns=\"http://www.w3.org/2001/10/synthesis\" xml:lang=\"en-US\">\
//!          <prosody pitch=\"150%\">Hello</prosody></speak>"
//!     );
//!
//!     let parsed = SsmlParser::new().convert_from_xml(&xml)?;
//!     assert_eq!(parsed[1], SpeechInstruction::text("Hello"));
//!     Ok(())
//! }
//! ```

pub mod balancer;
pub mod error;
pub mod escape;
pub mod ssml;
pub mod types;

pub use balancer::{XmlBalancer, XmlCommand};
pub use error::{SpeechXmlError, SpeechXmlResult};
pub use ssml::{SsmlConverter, SsmlParser};
pub use types::{ProsodyAttribute, SpeechInstruction};
