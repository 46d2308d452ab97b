use jsondom::{Document, ErrorCode, Location};
use rstest::rstest;

#[rstest]
#[case("", ErrorCode::EmptyDocument, 0)]
#[case("   \t\n", ErrorCode::EmptyDocument, 5)]
#[case("{", ErrorCode::ObjectMismatch, 1)]
#[case("{\"a\":1", ErrorCode::ObjectMismatch, 6)]
#[case("[1,2", ErrorCode::ArrayMismatch, 4)]
#[case("[1 2]", ErrorCode::ArrayMismatch, 3)]
#[case("nul", ErrorCode::ParsingReservedLiteral, 0)]
#[case("{\"a\":nul}", ErrorCode::ParsingReservedLiteral, 5)]
#[case("\"abc", ErrorCode::ParsingString, 4)]
#[case("12e", ErrorCode::ParsingNumber, 0)]
#[case("[3.4.5]", ErrorCode::ParsingNumber, 1)]
#[case("{\"a\"}", ErrorCode::ParsingElement, 4)]
#[case("{:1}", ErrorCode::ParsingElement, 1)]
#[case("@", ErrorCode::Parsing, 0)]
#[case("[1] @", ErrorCode::Parsing, 4)]
fn failures_report_a_deterministic_code_and_offset(
    #[case] input: &str,
    #[case] code: ErrorCode,
    #[case] offset: usize,
) {
    let error = jsondom::from_str(input).unwrap_err();
    assert_eq!(error.code, code, "input {input:?}");
    assert_eq!(error.offset, offset, "input {input:?}");
}

#[rstest]
#[case("")]
#[case("   ")]
fn empty_input_leaves_no_children(#[case] input: &str) {
    let mut doc = Document::new();
    let error = doc.parse(input).unwrap_err();
    assert_eq!(error.code, ErrorCode::EmptyDocument);
    assert_eq!(doc.first_root(), None);
    assert_eq!(doc.roots().count(), 0);
}

#[rstest]
fn the_document_remembers_its_error() {
    let mut doc = Document::new();
    assert!(doc.parse("{\"a\":tru}").is_err());
    assert_eq!(doc.error_code(), ErrorCode::ParsingReservedLiteral);
    assert!(doc.error().is_some());
    assert_eq!(doc.first_root(), None);
}

#[rstest]
fn clear_forgets_the_error() {
    let mut doc = Document::new();
    let _ = doc.parse("@");
    doc.clear();
    assert_eq!(doc.error_code(), ErrorCode::NoError);
    assert_eq!(doc.error(), None);
}

#[rstest]
fn a_successful_parse_replaces_an_old_error() {
    let mut doc = Document::new();
    let _ = doc.parse("[");
    doc.parse("[]").unwrap();
    assert_eq!(doc.error_code(), ErrorCode::NoError);
}

#[rstest]
fn roots_parsed_before_the_failure_remain_reachable() {
    let mut doc = Document::new();
    assert!(doc.parse("[1] @").is_err());
    let roots: Vec<_> = doc.roots().collect();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].kind(), jsondom::NodeKind::Array);
}

#[rstest]
fn error_location_counts_lines_and_columns_from_one() {
    let mut doc = Document::new();
    assert!(doc.parse("{\n \"a\":nul}").unwrap_err().code == ErrorCode::ParsingReservedLiteral);
    let location = doc.error_location().unwrap();
    assert_eq!(
        location,
        Location {
            offset: 7,
            line: 2,
            column: 6,
        }
    );
}

#[rstest]
fn error_display_names_the_code_and_offset() {
    let error = jsondom::from_str("nul").unwrap_err();
    assert_eq!(error.to_string(), "parsing-reserved-literal at byte 0");
}

#[rstest]
fn invalid_utf8_input_fails_before_parsing() {
    let mut doc = Document::new();
    let error = doc.parse_bytes(b"[\"ab\xff\"]").unwrap_err();
    assert_eq!(error.code, ErrorCode::Parsing);
    assert_eq!(error.offset, 4);
    assert_eq!(doc.first_root(), None);
}

#[rstest]
fn prefixes_of_a_valid_document_never_panic() {
    let full = r#"{"name":"value","list":[1,2.5,true],"flag":null}"#;
    for end in 0..full.len() {
        let mut doc = Document::new();
        let result = doc.parse(&full[..end]);
        assert!(result.is_err(), "prefix {:?} should not parse", &full[..end]);
    }
    jsondom::from_str(full).unwrap();
}
