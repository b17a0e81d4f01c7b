//! Tests for the ParameterSet implementation

use lcfit_rs::error::LcFitError;
use lcfit_rs::ldc::LimbDarkeningLaw;
use lcfit_rs::parameters::{HistoryRetention, ParamInput, ParamValue, ParameterSet};
use serde_json::json;

#[test]
fn test_scalar_set_normalizes_to_single_argument() {
    let mut params = ParameterSet::new();
    params.set("a", 5).unwrap();

    assert_eq!(params.value("a"), Some(&ParamValue::Number(5.0)));
    assert_eq!(
        ParameterSet::normalize("a", ParamInput::from(5)).unwrap(),
        vec![ParamInput::from(5.0)]
    );
}

#[test]
fn test_list_and_tuple_are_positional() {
    let mut params = ParameterSet::new();
    params.set("inc", vec![89.0]).unwrap();
    assert!(params.get("inc").unwrap().vary());

    params.set("per", (3.5, false)).unwrap();
    assert!(!params.get("per").unwrap().vary());

    // A bare list of numbers reads its second item as the vary flag
    assert!(matches!(
        params.set("ldcs", vec![0.1, 0.3]),
        Err(LcFitError::ParameterType { .. })
    ));

    // A sequence value is wrapped in a tuple
    params
        .set("ldcs", ParamInput::tuple([ParamInput::from(vec![0.1, 0.3])]))
        .unwrap();
    assert_eq!(
        params.value("ldcs").unwrap().to_f64_vec(),
        Some(vec![0.1, 0.3])
    );
}

#[test]
fn test_mapping_is_rejected() {
    let mut params = ParameterSet::new();
    let err = params
        .set("orbit", ParamInput::from(json!({"a": 20})))
        .unwrap_err();
    assert!(matches!(err, LcFitError::ParameterType { name, .. } if name == "orbit"));

    assert!(params.set("nothing", ParamInput::Null).is_err());

    // Failed assignments leave no trace
    assert!(params.is_empty());
    assert!(params.history().is_empty());
}

#[test]
fn test_every_set_appends_history() {
    let mut params = ParameterSet::new();
    params.set("a", 20.0).unwrap();
    params.set("a", 21.0).unwrap();
    params.set("a", 21.0).unwrap();
    params.set("inc", 89.0).unwrap();

    assert_eq!(params.len(), 2);
    assert_eq!(params.history().len(), 4);
    let values: Vec<&ParamValue> = params.history().iter().map(|h| &h.value).collect();
    assert_eq!(
        values,
        vec![
            &ParamValue::Number(20.0),
            &ParamValue::Number(21.0),
            &ParamValue::Number(21.0),
            &ParamValue::Number(89.0),
        ]
    );
}

#[test]
fn test_type_change_fails_and_keeps_old_value() {
    let mut params = ParameterSet::new();
    params.set("a", 20.0).unwrap();

    let err = params.set("a", "twenty").unwrap_err();
    assert!(matches!(err, LcFitError::ParameterType { .. }));
    assert_eq!(params.value("a"), Some(&ParamValue::Number(20.0)));
    assert_eq!(params.history().len(), 1);
}

#[test]
fn test_history_retention() {
    let mut params = ParameterSet::new().with_retention(HistoryRetention::KeepLast(2));
    for i in 0..5 {
        params.set("a", i as f64).unwrap();
    }

    assert_eq!(params.history().len(), 2);
    assert_eq!(params.total_recorded(), 5);
    assert_eq!(params.history()[1].value, ParamValue::Number(4.0));
}

#[test]
fn test_order_and_partitions() {
    let mut params = ParameterSet::new();
    params.set("per", (3.5, false)).unwrap();
    params.set("t0", 0.0).unwrap();
    params.set("rp", (0.1, true, 0.0, 0.5)).unwrap();
    params.set("per", (3.6, false)).unwrap();

    assert_eq!(params.names(), &["per", "t0", "rp"]);
    let varying: Vec<&str> = params.varying().iter().map(|p| p.name()).collect();
    assert_eq!(varying, vec!["t0", "rp"]);
    let fixed: Vec<&str> = params.fixed().iter().map(|p| p.name()).collect();
    assert_eq!(fixed, vec!["per"]);

    assert!(matches!(
        params.try_get("ecc"),
        Err(LcFitError::ParameterNotFound(_))
    ));
}

#[test]
fn test_limb_darkening_law() {
    let mut params = ParameterSet::new();
    assert_eq!(params.limb_darkening_law().unwrap(), None);

    params.set("limb_dark", "quadratic").unwrap();
    assert_eq!(
        params.limb_darkening_law().unwrap(),
        Some(LimbDarkeningLaw::Quadratic)
    );

    params.set("limb_dark", "sextic").unwrap();
    assert!(params.limb_darkening_law().is_err());
}

#[test]
fn test_json_and_text_sources() {
    let params = ParameterSet::from_json_str(r#"{"a": 20, "inc": [89, false], "ldcs": [[0.1, 0.3]]}"#)
        .unwrap();
    assert_eq!(params.value("a"), Some(&ParamValue::Number(20.0)));
    assert!(!params.get("inc").unwrap().vary());
    assert_eq!(
        params.value("ldcs").unwrap().to_f64_vec(),
        Some(vec![0.1, 0.3])
    );

    let params = ParameterSet::from_text_str("# orbit\nper 3.5\n\nrp 0.1 # radius ratio\n").unwrap();
    assert_eq!(params.names(), &["per", "rp"]);

    assert!(matches!(
        ParameterSet::from_text_str("per three"),
        Err(LcFitError::FileFormat { .. })
    ));
}

#[test]
fn test_json_serialization_shape() {
    let mut params = ParameterSet::new();
    params.set("a", 20.0).unwrap();
    params
        .set(
            "b",
            ParamInput::tuple([
                ParamInput::from(0.3),
                ParamInput::from(true),
                ParamInput::Null,
                ParamInput::from(1.0),
            ]),
        )
        .unwrap();

    let json = params.to_json_value().unwrap();
    assert_eq!(json["a"], json!([20.0, true]));
    assert_eq!(json["b"], json!([0.3, true, null, 1.0]));

    let restored = ParameterSet::from_json_str(&params.to_json().unwrap()).unwrap();
    assert!(restored.get("b").unwrap().min().is_none());
    assert_eq!(restored.get("b").unwrap().max(), Some(&ParamValue::Number(1.0)));
}
