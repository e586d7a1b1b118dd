use fl_params::{ParamValue, Params, ParamsError, load_params, parse_params, save_params};

#[test]
fn roundtrip_yaml_mapping() {
    let mut params = Params::default();
    params.insert("case", ParamValue::Text("plant4.fls".to_owned()));
    params.insert("feed_stream", ParamValue::Text("Feed".to_owned()));
    params.insert("setpoint_bar", ParamValue::Float(5.2));
    params.insert("retries", ParamValue::Integer(3));
    params.insert("dry_run", ParamValue::Bool(false));
    params.insert(
        "streams",
        ParamValue::List(vec![
            ParamValue::Text("Feed".to_owned()),
            ParamValue::Text("Product".to_owned()),
        ]),
    );

    let temp_dir = std::env::temp_dir();
    let path = temp_dir.join("fl_params_roundtrip.yaml");

    save_params(&path, &params).unwrap();
    let loaded = load_params(&path).unwrap();

    assert_eq!(params, loaded);
}

#[test]
fn parse_nested_document() {
    let doc = "\
case: plant4.fls
composition:
  Methane: 0.7
  Ethane: 0.2
  CO2: 0.1
cells:
  - A1
  - B1
";
    let params = parse_params(doc).unwrap();
    assert_eq!(params.text("case").unwrap(), "plant4.fls");

    let composition = params.mapping("composition").unwrap();
    assert_eq!(composition["Methane"], ParamValue::Float(0.7));

    let cells = params.list("cells").unwrap();
    assert_eq!(cells.len(), 2);
    assert_eq!(cells[0], ParamValue::Text("A1".to_owned()));
}

#[test]
fn top_level_must_be_a_mapping() {
    let err = parse_params("- just\n- a\n- list\n").unwrap_err();
    assert!(matches!(err, ParamsError::NotAMapping { found: "list" }));
}

#[test]
fn empty_documents_load_as_empty_params() {
    assert!(parse_params("").unwrap().is_empty());
    assert!(parse_params("null").unwrap().is_empty());
    assert!(parse_params("# only a comment\n").unwrap().is_empty());
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_params(std::path::Path::new("definitely/not/here.yaml")).unwrap_err();
    assert!(matches!(err, ParamsError::Io(_)));
}
