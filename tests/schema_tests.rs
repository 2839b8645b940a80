use normforge::{
    DataType, FieldKind, FieldScope, NormError, NormField, NormSchema, NumberSpec, SchemaViolation,
};

fn violation(result: Result<NormSchema, NormError>) -> SchemaViolation {
    match result {
        Err(NormError::InvalidSchema { reason }) => reason,
        other => panic!("expected InvalidSchema, got {:?}", other),
    }
}

#[test]
fn loads_persisted_norm_json() {
    let schema = NormSchema::from_json(
        r#"{
            "code": "NMX-C-083",
            "name": "Resistencia a compresión",
            "categories": ["Concreto"],
            "fields": [
                {"id": "fc", "name": "f'c", "dataType": "number", "unit": "kg/cm2",
                 "minLimit": 200, "required": true, "scope": "specimen"},
                {"id": "falla", "name": "Tipo de falla", "type": "select",
                 "options": ["cono", "corte"]},
                {"id": "cap", "name": "Cabeceo", "dataType": "boolean"}
            ]
        }"#,
    )
    .unwrap();

    assert_eq!(schema.code(), "NMX-C-083");
    assert_eq!(schema.fields().len(), 3);
    let fc = schema.field("fc").unwrap();
    assert!(fc.required);
    assert_eq!(fc.scope, Some(FieldScope::Specimen));
    assert_eq!(fc.unit(), Some("kg/cm2"));
    assert_eq!(fc.number_spec().unwrap().min_limit, Some(200.0));
    assert_eq!(fc.number_spec().unwrap().max_limit, None);
    assert_eq!(schema.field("falla").unwrap().data_type(), DataType::Select);
    assert_eq!(schema.field("cap").unwrap().scope, None);
}

#[test]
fn rejects_duplicate_field_ids() {
    let result = NormSchema::from_fields(
        "X",
        vec![NormField::text("a", "A"), NormField::boolean("a", "A again")],
    );
    assert_eq!(violation(result), SchemaViolation::DuplicateFieldId("a".into()));
}

#[test]
fn rejects_select_without_options() {
    let result = NormSchema::from_fields("X", vec![NormField::select("s", "S", &[])]);
    assert_eq!(violation(result), SchemaViolation::SelectWithoutOptions("s".into()));
}

#[test]
fn rejects_select_without_options_from_json() {
    let err = NormSchema::from_json(
        r#"{"code":"X","fields":[{"id":"s","name":"S","dataType":"select"}]}"#,
    )
    .unwrap_err();
    assert_eq!(
        err,
        NormError::InvalidSchema { reason: SchemaViolation::SelectWithoutOptions("s".into()) }
    );
}

#[test]
fn rejects_duplicate_field_ids_from_json() {
    let err = NormSchema::from_json(
        r#"{"code":"X","fields":[
            {"id":"a","name":"A","dataType":"text"},
            {"id":"a","name":"B","dataType":"number"}
        ]}"#,
    )
    .unwrap_err();
    assert_eq!(
        err,
        NormError::InvalidSchema { reason: SchemaViolation::DuplicateFieldId("a".into()) }
    );
}

#[test]
fn malformed_json_is_a_payload_error() {
    let err = NormSchema::from_json(r#"{"code":"X","fields":[{"id":"a"}]}"#).unwrap_err();
    assert!(matches!(err, NormError::MalformedPayload { .. }));
    assert!(matches!(NormSchema::from_json("not json"), Err(NormError::MalformedPayload { .. })));
}

#[test]
fn rejects_inverted_limits() {
    let result = NormSchema::from_fields(
        "X",
        vec![NormField::number("n", "N", NumberSpec::new(Some(12.0), Some(8.0)))],
    );
    assert!(matches!(violation(result), SchemaViolation::InvertedLimits { .. }));
}

#[test]
fn rejects_reserved_and_empty_ids() {
    let reserved = NormSchema::from_fields(
        "X",
        vec![NormField::number("_qty", "Qty", NumberSpec::default())],
    );
    assert_eq!(violation(reserved), SchemaViolation::ReservedFieldId("_qty".into()));

    let empty = NormSchema::from_fields("X", vec![NormField::text("", "Blank")]);
    assert_eq!(violation(empty), SchemaViolation::EmptyFieldId);
}

#[test]
fn accepts_underscored_ids_without_collision() {
    let schema = NormSchema::from_fields(
        "X",
        vec![
            NormField::text("peso_seco", "Peso seco"),
            NormField::text("peso_humedo", "Peso húmedo"),
        ],
    );
    assert!(schema.is_ok());
}

#[test]
fn unknown_field_lookup_errors() {
    let schema = NormSchema::from_fields("X", vec![NormField::text("a", "A")]).unwrap();
    assert!(schema.require_field("a").is_ok());
    assert_eq!(
        schema.require_field("b").unwrap_err(),
        NormError::UnknownField { field_id: "b".into() }
    );
}

#[test]
fn schema_serialises_back_to_wire_shape() {
    let schema = NormSchema::from_fields(
        "X",
        vec![
            NormField::number("n", "N", NumberSpec::new(None, Some(5.0)).with_unit("mm"))
                .required()
                .scoped(FieldScope::Global),
            NormField::select("s", "S", &["a", "b"]),
        ],
    )
    .unwrap();
    let json = serde_json::to_value(&schema).unwrap();
    assert_eq!(json["fields"][0]["dataType"], "number");
    assert_eq!(json["fields"][0]["maxLimit"], 5.0);
    assert_eq!(json["fields"][0]["scope"], "global");
    assert!(json["fields"][0].get("minLimit").is_none());
    assert_eq!(json["fields"][1]["options"][1], "b");

    let back: NormSchema = serde_json::from_value(json).unwrap();
    assert_eq!(back, schema);
    assert_eq!(
        back.field("s").unwrap().kind,
        FieldKind::Select { options: vec!["a".into(), "b".into()] }
    );
}
