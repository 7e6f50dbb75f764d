use docx_tidy::{Error, NumberFormat, OutlineOptions, Profile};

#[test]
fn partial_profile_keeps_defaults() {
    let json = r#"{
        "numbering": { "levels": { "3": { "format": "dotted_path" }, "4": { "apply": false } } },
        "outline": { "zero_indents": false },
        "body": { "size_pt": 12, "font": "Calibri" },
        "headings": { "1": { "size_pt": 16, "east_asia_font": "方正小标宋简体" } }
    }"#;
    let profile = Profile::from_json(json).unwrap();
    let defaults = Profile::default();

    assert!(profile.numbering.enabled);
    assert_eq!(profile.numbering.level(1).unwrap().format, NumberFormat::Chinese);
    assert_eq!(profile.numbering.level(3).unwrap().format, NumberFormat::DottedPath);
    assert!(!profile.numbering.level(4).unwrap().apply);

    assert!(!profile.outline.zero_indents);
    assert!(profile.outline.promote_outline_levels);

    assert_eq!(profile.body.size_pt, 12.0);
    assert_eq!(profile.body.font, "Calibri");
    assert_eq!(profile.body.east_asia_font, defaults.body.east_asia_font);
    assert_eq!(profile.table, defaults.table);

    let h1 = profile.heading(1).unwrap();
    assert_eq!(h1.size_pt, 16.0);
    assert_eq!(h1.east_asia_font, "方正小标宋简体");
    assert_eq!(h1.font, defaults.headings[0].font);
    assert_eq!(h1.bold, defaults.headings[0].bold);
    assert_eq!(profile.headings[1..], defaults.headings[1..]);
}

#[test]
fn empty_profile_is_the_default() {
    assert_eq!(Profile::from_json("{}").unwrap(), Profile::default());
}

#[test]
fn profile_json_round_trips() {
    let mut profile = Profile::default();
    profile.numbering = profile.numbering.clone().with_format(2, NumberFormat::RomanUpper);
    profile.outline = OutlineOptions::disabled();
    profile.table.width_in = 5.5;
    profile.headings[8].bold = true;

    let json = profile.to_json().unwrap();
    assert!(json.contains("\"roman_upper\""));
    assert_eq!(Profile::from_json(&json).unwrap(), profile);
}

#[test]
fn out_of_range_values_are_rejected() {
    let cases = [
        r#"{ "body": { "size_pt": 40 } }"#,
        r#"{ "body": { "line_spacing": 0.2 } }"#,
        r#"{ "body": { "first_line_indent_cm": 6 } }"#,
        r#"{ "table": { "width_in": 0.5 } }"#,
        r#"{ "table": { "space_after_pt": 60 } }"#,
        r#"{ "headings": { "2": { "size_pt": 3 } } }"#,
        r#"{ "headings": { "10": { "size_pt": 12 } } }"#,
        r#"{ "body": { "font": "  " } }"#,
    ];
    for json in cases {
        let err = Profile::from_json(json).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "{json}: {err}");
    }
}

#[test]
fn malformed_json_is_reported() {
    let cases = [
        r#"{ "body": { "size": 12 } }"#,
        r#"{ "unknown": true }"#,
        r#"{ "numbering": { "levels": { "1": { "format": "hex" } } } }"#,
        r#"{ "numbering": { "levels": { "0": {} } } }"#,
        "not json",
    ];
    for json in cases {
        let err = Profile::from_json(json).unwrap_err();
        assert!(matches!(err, Error::Json(_)), "{json}: {err}");
    }
}

#[test]
fn profile_file_errors_name_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    let err = Profile::from_json_file(&missing).unwrap_err();
    assert!(err.to_string().contains("missing.json"), "{err}");

    let path = dir.path().join("profile.json");
    std::fs::write(&path, r#"{ "table": { "width_in": 7 } }"#).unwrap();
    assert_eq!(Profile::from_json_file(&path).unwrap().table.width_in, 7.0);
}

#[test]
fn invalid_profile_is_refused_before_touching_input() {
    let mut profile = Profile::default();
    profile.table.line_spacing = 9.0;
    let err = docx_tidy::tidy_docx_bytes(b"whatever", &profile).unwrap_err();
    assert!(matches!(err, Error::Config(_)), "{err}");
}
