use speech_xml::escape::escape_xml_utf16;
use speech_xml::{ProsodyAttribute, SpeechInstruction, SsmlConverter, SsmlParser};

fn round_trip(instructions: &[SpeechInstruction]) -> Vec<SpeechInstruction> {
    let xml = SsmlConverter::new("en_US").convert_to_xml(instructions);
    SsmlParser::new().convert_from_xml(&xml).unwrap()
}

#[test]
fn test_lossless_subset_round_trip() {
    let instructions = vec![
        SpeechInstruction::text("t1"),
        SpeechInstruction::pitch(2.0),
        SpeechInstruction::volume(2.0),
        SpeechInstruction::text("t2"),
        SpeechInstruction::reset(ProsodyAttribute::Pitch),
        SpeechInstruction::lang("de_DE"),
        SpeechInstruction::CharacterMode(true),
        SpeechInstruction::text("c"),
        SpeechInstruction::CharacterMode(false),
        SpeechInstruction::reset(ProsodyAttribute::Volume),
    ];
    assert_eq!(round_trip(&instructions), instructions);
}

#[test]
fn test_marker_and_phoneme_are_dropped() {
    let instructions = vec![
        SpeechInstruction::text("a"),
        SpeechInstruction::Index(3),
        SpeechInstruction::rate(0.5),
        SpeechInstruction::text("b"),
        SpeechInstruction::phoneme("tə", Some("to")),
    ];
    let lossless: Vec<SpeechInstruction> = vec![
        SpeechInstruction::text("a"),
        SpeechInstruction::rate(0.5),
        SpeechInstruction::text("bto"),
        SpeechInstruction::reset(ProsodyAttribute::Rate),
    ];
    assert_eq!(round_trip(&instructions), lossless);
}

#[test]
fn test_special_characters_survive_round_trip() {
    let instructions = vec![SpeechInstruction::text("1 < 2 & \"quoted\" > 0")];
    assert_eq!(round_trip(&instructions), instructions);
}

#[test]
fn test_invalid_characters_become_replacement() {
    let parsed = round_trip(&[SpeechInstruction::text("a\u{1}b")]);
    assert_eq!(parsed, vec![SpeechInstruction::text("a\u{FFFD}b")]);
}

#[test]
fn test_converter_and_parser_are_reusable() {
    let converter = SsmlConverter::new("en_US");
    let parser = SsmlParser::new();
    for text in ["one", "two"] {
        let xml = converter.convert_to_xml(&[SpeechInstruction::text(text)]);
        assert_eq!(
            parser.convert_from_xml(&xml).unwrap(),
            vec![SpeechInstruction::text(text)]
        );
    }
}

#[test]
fn test_utf16_text_with_broken_surrogates_parses_back() {
    let mut units: Vec<u16> = "x & ".encode_utf16().collect();
    units.extend([0xDE0A, 0xD83D, 0xDE0A, 0xD83D]);
    let xml = format!(r#"<speak xml:lang="en-US">{}</speak>"#, escape_xml_utf16(&units));
    assert_eq!(
        SsmlParser::new().convert_from_xml(&xml).unwrap(),
        vec![SpeechInstruction::text("x & \u{FFFD}\u{1F60A}\u{FFFD}")]
    );
}
