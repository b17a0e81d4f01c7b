//! Tests for the Parameter implementation

use lcfit_rs::error::LcFitError;
use lcfit_rs::parameters::{Parameter, ParamInput, ParamValue, ValueKind};

#[test]
fn test_parameter_defaults() {
    let param = Parameter::new("a", 20.0);
    assert_eq!(param.name(), "a");
    assert_eq!(param.value(), &ParamValue::Number(20.0));
    assert!(param.vary());
    assert!(param.min().is_none());
    assert!(param.max().is_none());
    assert_eq!(param.kind(), ValueKind::Number);
}

#[test]
fn test_positional_arguments() {
    let args = vec![
        ParamInput::from(0.3),
        ParamInput::from(false),
        ParamInput::from(0.0),
        ParamInput::from(1.0),
    ];
    let param = Parameter::from_args("b", args).unwrap();

    assert_eq!(param.numeric_value(), Some(0.3));
    assert!(!param.vary());
    assert_eq!(param.min(), Some(&ParamValue::Number(0.0)));
    assert_eq!(param.max(), Some(&ParamValue::Number(1.0)));
}

#[test]
fn test_values_elide_unset_bounds() {
    let free = Parameter::new("inc", 89.0);
    let tuple = free.values().to_tuple();
    assert_eq!(
        tuple,
        vec![
            ParamValue::Text("inc".to_string()),
            ParamValue::Number(89.0),
            ParamValue::Bool(true),
        ]
    );

    let lower_only = Parameter::from_args(
        "ecc",
        vec![ParamInput::from(0.1), ParamInput::Null, ParamInput::from(0.0)],
    )
    .unwrap();
    let tuple = lower_only.values().to_tuple();
    assert_eq!(tuple.len(), 4);
    assert_eq!(tuple[3], ParamValue::Number(0.0));

    // Serialized snapshots skip unset bounds instead of writing null
    let json = serde_json::to_value(free.values()).unwrap();
    assert!(json.get("min").is_none());
    assert!(json.get("max").is_none());
}

#[test]
fn test_value_types() {
    let law = Parameter::new("limb_dark", "quadratic");
    assert_eq!(law.kind(), ValueKind::Text);
    assert!(law.numeric_value().is_none());

    let flag = Parameter::new("fit_ld", true);
    assert_eq!(flag.value().as_bool(), Some(true));

    let ldcs = Parameter::new("ldcs", vec![0.1, 0.3]);
    assert_eq!(ldcs.kind(), ValueKind::Sequence);
    assert_eq!(ldcs.value().to_f64_vec(), Some(vec![0.1, 0.3]));
}

#[test]
fn test_with_value_keeps_type_family() {
    let param = Parameter::from_args(
        "d",
        vec![ParamInput::from(0.01), ParamInput::from(true), ParamInput::from(0.0)],
    )
    .unwrap();

    let updated = param.with_value(0.02).unwrap();
    assert_eq!(updated.numeric_value(), Some(0.02));
    assert_eq!(updated.min(), param.min());
    assert_eq!(updated.name(), "d");

    assert!(matches!(
        param.with_value("deep"),
        Err(LcFitError::ParameterType { .. })
    ));
}

#[test]
fn test_invalid_arguments() {
    assert!(Parameter::from_args("a", vec![]).is_err());
    assert!(Parameter::from_args("a", vec![ParamInput::Null]).is_err());
    assert!(Parameter::from_args("a", vec![ParamInput::from(1.0), ParamInput::from(2.0)]).is_err());

    let too_many: Vec<ParamInput> = (0..5).map(|i| ParamInput::from(i as f64)).collect();
    assert!(Parameter::from_args("a", too_many).is_err());

    // Bounds must share the value's type family
    let err = Parameter::from_args(
        "a",
        vec![ParamInput::from(1.0), ParamInput::from(true), ParamInput::from("low")],
    )
    .unwrap_err();
    assert!(matches!(err, LcFitError::ParameterType { name, .. } if name == "a"));
}

#[test]
fn test_numeric_bounds() {
    let param = Parameter::from_args(
        "b",
        vec![ParamInput::from(0.3), ParamInput::from(true), ParamInput::from(0.0), ParamInput::from(1.0)],
    )
    .unwrap();
    let bounds = param.numeric_bounds().unwrap();
    assert!(bounds.is_within_bounds(0.5));
    assert!(!bounds.is_within_bounds(1.5));

    let inverted = Parameter::from_args(
        "b",
        vec![ParamInput::from(0.3), ParamInput::from(true), ParamInput::from(1.0), ParamInput::from(0.0)],
    )
    .unwrap();
    assert!(matches!(
        inverted.numeric_bounds(),
        Err(LcFitError::BoundsError(_))
    ));
}
