//! End-to-end flows: load a norm, decode stored results, edit, evaluate,
//! encode for storage.

use normforge::models::results::row;
use normforge::{
    decode, encode, evaluate, FieldScope, FieldValue, FlatResultMap, NormField, NormSchema,
    NumberSpec, StructuredResults, Verdict,
};

#[test]
fn scenario_a_global_limits() {
    let schema = NormSchema::from_fields(
        "A",
        vec![
            NormField::number("f1", "F1", NumberSpec::new(Some(200.0), None))
                .required()
                .scoped(FieldScope::Global),
            NormField::number("f2", "F2", NumberSpec::new(Some(8.0), Some(12.0)))
                .required()
                .scoped(FieldScope::Global),
        ],
    )
    .unwrap();

    let pass = StructuredResults::new().with_global("f1", 210).with_global("f2", 10);
    assert_eq!(evaluate(&schema, &pass), Verdict::Aprobado);

    let fail = StructuredResults::new().with_global("f1", 180).with_global("f2", 13);
    assert_eq!(evaluate(&schema, &fail), Verdict::Rechazado);
}

#[test]
fn scenario_b_specimen_below_minimum() {
    let schema = NormSchema::from_fields(
        "B",
        vec![NormField::number("fc", "f'c", NumberSpec::new(Some(20.0), None))
            .required()
            .scoped(FieldScope::Specimen)],
    )
    .unwrap();
    let results = StructuredResults::new().with_rows(vec![
        row(vec![("fc", 25)]),
        row(vec![("fc", 18)]),
        row(vec![("fc", 30)]),
    ]);
    assert_eq!(evaluate(&schema, &results), Verdict::Rechazado);
}

#[test]
fn scenario_c_implicit_multi_decode() {
    let schema = NormSchema::from_fields("C", vec![NormField::text("h", "Altura")]).unwrap();
    let mut flat = FlatResultMap::new();
    flat.insert("_is_multi_implicit", true);
    flat.insert("_qty", 2);
    flat.insert("h_0", "5");
    flat.insert("h_1", "7");

    let decoded = decode(&schema, Some(&flat)).results;
    assert_eq!(decoded.specimen_rows, vec![row(vec![("h", "5")]), row(vec![("h", "7")])]);
    assert!(decoded.multi_mode);
    assert!(decoded.global_values.is_empty());
}

#[test]
fn scenario_d_removal_keeps_keys_dense() {
    let schema = NormSchema::from_fields(
        "D",
        vec![NormField::number("x", "X", NumberSpec::default()).scoped(FieldScope::Specimen)],
    )
    .unwrap();
    let results = StructuredResults::new().with_rows(vec![
        row(vec![("x", 1)]),
        row(vec![("x", 2)]),
        row(vec![("x", 3)]),
    ]);
    let removed = results.remove_specimen(0).unwrap();
    assert_eq!(removed.specimen_rows, vec![row(vec![("x", 2)]), row(vec![("x", 3)])]);

    let flat = encode(&schema, &removed);
    assert_eq!(flat.len(), 2);
    assert_eq!(flat.get("x_0"), Some(&FieldValue::Number(2.0)));
    assert_eq!(flat.get("x_1"), Some(&FieldValue::Number(3.0)));
    assert!(!flat.contains_key("x_2"));
}

#[test]
fn scenario_e_empty_required_number() {
    let schema = NormSchema::from_fields(
        "E",
        vec![
            NormField::number("n", "N", NumberSpec::new(Some(0.0), None)).required(),
            NormField::number("m", "M", NumberSpec::new(Some(100.0), None)),
        ],
    )
    .unwrap();
    let results = StructuredResults::new().with_global("n", "").with_global("m", 1);
    assert_eq!(evaluate(&schema, &results), Verdict::EnProceso);
}

#[test]
fn filling_required_values_never_reopens_verdict() {
    let schema = NormSchema::from_fields(
        "M",
        vec![
            NormField::number("a", "A", NumberSpec::new(Some(10.0), None)).required(),
            NormField::number("b", "B", NumberSpec::new(None, Some(5.0))).required(),
            NormField::text("c", "C"),
        ],
    )
    .unwrap();

    let rejected = StructuredResults::new().with_global("a", 1).with_global("b", 2);
    assert_eq!(evaluate(&schema, &rejected), Verdict::Rechazado);
    // Filling an optional field cannot clear the rejection.
    assert_eq!(evaluate(&schema, &rejected.set_global("c", "nota")), Verdict::Rechazado);

    let partial = StructuredResults::new().with_global("a", 12);
    assert_eq!(evaluate(&schema, &partial), Verdict::EnProceso);
    assert_eq!(evaluate(&schema, &partial.set_global("b", 4)), Verdict::Aprobado);
    assert_eq!(evaluate(&schema, &partial.set_global("b", 6)), Verdict::Rechazado);
}

#[test]
fn cylinder_session_end_to_end() {
    let schema = NormSchema::from_json(
        r#"{
            "code": "NMX-C-083-ONNCCE",
            "name": "Resistencia a la compresión de cilindros",
            "categories": ["Concreto"],
            "fields": [
                {"id": "num_cil", "name": "Número de Cilindros", "dataType": "number"},
                {"id": "edad", "name": "Edad", "dataType": "number", "unit": "días",
                 "required": true, "scope": "global"},
                {"id": "fc", "name": "f'c", "dataType": "number", "unit": "kg/cm2",
                 "minLimit": 250, "required": true, "scope": "specimen"}
            ]
        }"#,
    )
    .unwrap();

    // New sample: nothing stored yet.
    let start = decode(&schema, None).results;
    assert_eq!(start, StructuredResults::new());
    assert_eq!(evaluate(&schema, &start), Verdict::EnProceso);

    let edited = start
        .set_global("edad", 28)
        .set_specimen_field(0, "fc", 262)
        .unwrap()
        .set_specimen_field(1, "fc", "255.5")
        .unwrap()
        .add_specimen();
    assert_eq!(evaluate(&schema, &edited), Verdict::EnProceso);

    let complete = edited.set_specimen_field(2, "fc", 270).unwrap();
    assert_eq!(evaluate(&schema, &complete), Verdict::Aprobado);

    let stored = encode(&schema, &complete);
    assert_eq!(stored.get("num_cil"), Some(&FieldValue::Number(3.0)));
    assert_eq!(stored.get("fc_1"), Some(&FieldValue::text("255.5")));

    // Reopening the sample shows the same rows and verdict.
    let reopened = decode(&schema, Some(&stored)).results;
    assert_eq!(reopened.specimen_rows, complete.specimen_rows);
    assert_eq!(reopened.global("num_cil"), Some(&FieldValue::Number(3.0)));
    assert_eq!(evaluate(&schema, &reopened), Verdict::Aprobado);

    let trimmed = reopened.remove_specimen(1).unwrap();
    let restored = encode(&schema, &trimmed);
    assert_eq!(restored.get("num_cil"), Some(&FieldValue::Number(2.0)));
    assert_eq!(restored.get("fc_1"), Some(&FieldValue::Number(270.0)));
    assert_eq!(decode(&schema, Some(&restored)).results.specimen_rows.len(), 2);
}
