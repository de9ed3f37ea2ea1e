use ifcduck_parser::{StepError, parse_header, split_statements};

fn collect_summaries(input: &str) -> Vec<(usize, String)> {
    // (line, sql)
    split_statements(input)
        .into_iter()
        .map(|s| (s.lineno, s.sql))
        .collect()
}

#[test]
fn split_single_statement() {
    let s = collect_summaries("SELECT 1 AS x");
    assert_eq!(s, vec![(1, "SELECT 1 AS x".to_string())]);
}

#[test]
fn split_drops_terminator_and_blank_statements() {
    let s = collect_summaries("SELECT 1;;  \n ;SELECT 2;");
    assert_eq!(s.len(), 2);
    assert_eq!(s[0], (1, "SELECT 1".to_string()));
    assert_eq!(s[1], (2, "SELECT 2".to_string()));
}

#[test]
fn split_respects_quotes() {
    let input = concat!(
        "INSERT INTO t VALUES ('a;b', 'it''s; fine');\n",
        "SELECT \"odd;name\" FROM t"
    );
    let s = collect_summaries(input);
    assert_eq!(s.len(), 2);
    assert_eq!(s[0].1, "INSERT INTO t VALUES ('a;b', 'it''s; fine')");
    assert_eq!(s[1].0, 2);
    assert_eq!(s[1].1, "SELECT \"odd;name\" FROM t");
}

#[test]
fn split_respects_comments() {
    let input = concat!(
        "-- leading; comment\n",
        "/* block; comment */\n",
        "SELECT 1 /* inner; */ + 1; -- trailing\n",
        "SELECT 3"
    );
    let s = collect_summaries(input);
    assert_eq!(s.len(), 2);
    // leading comments are not part of the statement, and its line is where code starts
    assert_eq!(s[0], (3, "SELECT 1 /* inner; */ + 1".to_string()));
    assert_eq!(s[1], (4, "SELECT 3".to_string()));
}

#[test]
fn split_comment_only_input_is_empty() {
    assert!(split_statements("  -- nothing here\n/* or here */ ").is_empty());
    assert!(split_statements("").is_empty());
}

#[test]
fn split_respects_dollar_quoted_strings() {
    let s = collect_summaries("SELECT $$a;b$$ AS x");
    assert_eq!(s, vec![(1, "SELECT $$a;b$$ AS x".to_string())]);

    let input = "CREATE MACRO m() AS $body$ 'x;y' $$ ; $body$;\nSELECT m()";
    let s = collect_summaries(input);
    assert_eq!(s.len(), 2);
    assert_eq!(s[0].1, "CREATE MACRO m() AS $body$ 'x;y' $$ ; $body$");
    assert_eq!(s[1], (2, "SELECT m()".to_string()));
}

#[test]
fn split_respects_backslash_escapes_in_e_strings() {
    let s = collect_summaries(r"SELECT E'it\'s; here' AS x; SELECT e'\\'; SELECT 3");
    assert_eq!(s.len(), 3);
    assert_eq!(s[0].1, r"SELECT E'it\'s; here' AS x");
    assert_eq!(s[1].1, r"SELECT e'\\'");
    assert_eq!(s[2].1, "SELECT 3");
}

#[test]
fn split_keeps_multiline_statement_together() {
    let input = "SELECT ifc_class,\n       COUNT(*) AS count\nFROM id_map\nGROUP BY ifc_class;";
    let s = split_statements(input);
    assert_eq!(s.len(), 1);
    assert_eq!(s[0].lineno, 1);
    assert_eq!(s[0].sql.lines().count(), 4);
}

const HEADER: &str = "ISO-10303-21;
HEADER;
/* exported by a test */
FILE_DESCRIPTION(('ViewDefinition [CoordinationView_V2.0]'),'2;1');
FILE_NAME('rac_basic.ifc','2014-02-27T11:45:31',('O''Brien'),('ACME'),'The EXPRESS Data Manager Version 5.02.0100.07 : 28 Aug 2013','20140606_1530(x64) - Exporter 2015.0.2014.0606 - Default UI',$);
FILE_SCHEMA(('IFC2X3'));
ENDSEC;
DATA;
#1= IFCORGANIZATION($,'Autodesk Revit 2015 (ENU)',$,$,$);
";

#[test]
fn header_reads_mandatory_records() {
    let h = parse_header(HEADER).unwrap();
    assert_eq!(h.schema(), Some("IFC2X3"));
    assert_eq!(h.description, vec!["ViewDefinition [CoordinationView_V2.0]"]);
    assert_eq!(h.implementation_level.as_deref(), Some("2;1"));
    assert_eq!(h.file_name.as_deref(), Some("rac_basic.ifc"));
    assert_eq!(h.timestamp.as_deref(), Some("2014-02-27T11:45:31"));
    assert_eq!(h.author, vec!["O'Brien"]);
    assert_eq!(h.organization, vec!["ACME"]);
    assert!(h.preprocessor_version.unwrap().starts_with("The EXPRESS Data Manager"));
    assert!(h.originating_system.unwrap().contains("Exporter 2015"));
    assert_eq!(h.authorization, None);
}

#[test]
fn header_without_schema_is_rejected() {
    let input = "ISO-10303-21;\nHEADER;\nFILE_DESCRIPTION((''),'2;1');\nENDSEC;\n";
    assert_eq!(parse_header(input), Err(StepError::MissingSchema));
}

#[test]
fn header_requires_header_section() {
    assert_eq!(
        parse_header("ISO-10303-21;\nDATA;\nENDSEC;"),
        Err(StepError::MissingHeader)
    );
}

#[test]
fn header_truncated_schema_is_missing() {
    let input = "ISO-10303-21;\nHEADER;\nFILE_SCHEMA(('IFC4'";
    assert_eq!(parse_header(input), Err(StepError::MissingSchema));
}

#[test]
fn header_with_non_ascii_text_does_not_panic() {
    // U+FFFD is what lossy decoding leaves for raw Latin-1 bytes
    let input = concat!(
        "ISO-10303-21;\nHEADER;\n",
        r"FILE_DESCRIPTION(('\X2\aaaé\X0\','Caf�'),'2;1');",
        "\n",
        r"FILE_NAME('\X2\00E9\X0\t\X\E9.ifc','',('\X2\0�\X0\'),(''),'','',$);",
        "\nFILE_SCHEMA(('IFC4'));\nENDSEC;\n"
    );
    let h = parse_header(input).unwrap();
    assert_eq!(h.description, vec![r"\X2\aaaé\X0\", "Caf�"]);
    assert_eq!(h.file_name.as_deref(), Some("été.ifc"));
    assert_eq!(h.author, vec![r"\X2\0�\X0\"]);
    assert_eq!(h.schema(), Some("IFC4"));
}

#[test]
fn header_accepts_multiple_schemas_and_lowercase_names() {
    let input = "ISO-10303-21;\nheader;\nfile_schema(('IFC4','IFC4X3'));\nendsec;\n";
    let h = parse_header(input).unwrap();
    assert_eq!(h.schemas, vec!["IFC4", "IFC4X3"]);
    assert_eq!(h.schema(), Some("IFC4"));
}
