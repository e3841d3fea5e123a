use crate::*;

const BEGIN: &str = r#"{"beginRendering":{"surfaceId":"s","root":"root"}}"#;
const DELETE: &str = r#"{"deleteSurface":{"surfaceId":"s"}}"#;

#[test]
fn test_partial_lines_are_buffered_across_chunks() {
    let mut parser = StreamParser::new();
    let (head, tail) = BEGIN.split_at(20);

    assert!(parser.feed(head).is_empty());
    assert_eq!(parser.pending(), head.len());

    let items = parser.feed(format!("{}\n{}", tail, &DELETE[..5]));
    assert_eq!(items.len(), 1);
    assert!(matches!(items[0], Ok(ServerMessage::BeginRendering(_))));

    let items = parser.feed(format!("{}\n", &DELETE[5..]));
    assert_eq!(items.len(), 1);
    assert!(matches!(items[0], Ok(ServerMessage::DeleteSurface(_))));
    assert_eq!(parser.pending(), 0);
}

#[test]
fn test_multibyte_character_split_between_chunks() {
    let line = "{\"dataModelUpdate\":{\"contents\":[{\"key\":\"name\",\"valueString\":\"Zoë\"}]}}\n";
    let bytes = line.as_bytes();
    let split = line.find('ë').unwrap() + 1;

    let mut parser = StreamParser::new();
    assert!(parser.feed(&bytes[..split]).is_empty());
    let items = parser.feed(&bytes[split..]);

    match &items[..] {
        [Ok(ServerMessage::DataModelUpdate(update))] => {
            assert_eq!(update.contents[0]["valueString"], "Zoë");
        }
        other => panic!("Expected one DataModelUpdate, got {:?}", other),
    }
}

#[test]
fn test_blank_lines_are_skipped() {
    let text = format!("\n   \n{}\r\n\n{}\n", BEGIN, DELETE);
    let items = parse_jsonl(&text);
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(Result::is_ok));
}

#[test]
fn test_malformed_line_is_reported_and_stream_continues() {
    let text = format!("{}\n{{\"beginRendering\": oops}}\n{}\n", BEGIN, DELETE);
    let items = parse_jsonl(&text);

    assert_eq!(items.len(), 3);
    assert!(items[0].is_ok());
    match &items[1] {
        Err(StreamError::Parse(ParseError::InvalidJson { line, raw, .. })) => {
            assert_eq!(*line, 2);
            assert!(raw.contains("oops"));
        }
        other => panic!("Expected InvalidJson, got {:?}", other),
    }
    assert!(items[2].is_ok());
}

#[test]
fn test_missing_discriminant_is_a_validation_error() {
    let items = parse_jsonl("{\"surfaceId\":\"s\"}\n");
    match &items[..] {
        [Err(StreamError::Validation { line, source, .. })] => {
            assert_eq!(*line, 1);
            assert_eq!(*source, ValidationError::MissingDiscriminant);
        }
        other => panic!("Expected a validation error, got {:?}", other),
    }
}

#[test]
fn test_invalid_utf8_is_reported() {
    let mut parser = StreamParser::new();
    let items = parser.feed([0xff, 0xfe, b'\n']);
    assert_eq!(
        items,
        vec![Err(StreamError::Parse(ParseError::InvalidUtf8 { line: 1 }))]
    );
}

#[test]
fn test_finish_flushes_trailing_line() {
    let mut parser = StreamParser::new();
    assert!(parser.feed(DELETE).is_empty());
    let items = parser.finish();
    assert_eq!(items.len(), 1);
    assert_eq!(parser.pending(), 0);
    assert!(parser.finish().is_empty());
}

#[test]
fn test_reset_discards_buffer_and_line_count() {
    let mut parser = StreamParser::new();
    parser.feed(format!("{}\n{{\"partial", BEGIN));
    assert_eq!(parser.line(), 1);

    parser.reset();
    assert_eq!(parser.line(), 0);
    assert_eq!(parser.pending(), 0);
}

#[cfg(feature = "pretty-errors")]
#[test]
fn test_format_errors_mentions_line() {
    let items = parse_jsonl("{\"a\": }\n");
    let errors: Vec<StreamError> = items.into_iter().filter_map(Result::err).collect();
    let report = format_errors("stream.jsonl", &errors);
    assert!(report.contains("line 1"), "report was: {}", report);
}
