use rowmap_core::{expr::EvalContext, Expr, Value};

use indexmap::IndexMap;

fn param(entries: &[(&str, Value)]) -> Value {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[test]
fn bool_null_path_is_false() {
    let param = param(&[("id", Value::Null)]);
    let cx = EvalContext::new(&param);

    assert!(!Expr::parse("id").unwrap().eval_bool(&cx).unwrap());
    assert!(!Expr::parse("missing").unwrap().eval_bool(&cx).unwrap());
}

#[test]
fn bool_numeric_truthiness() {
    let param = param(&[("zero", Value::I64(0)), ("one", Value::I64(1))]);
    let cx = EvalContext::new(&param);

    assert!(!Expr::parse("zero").unwrap().eval_bool(&cx).unwrap());
    assert!(Expr::parse("one").unwrap().eval_bool(&cx).unwrap());
}

#[test]
fn bool_ne_null() {
    let param = param(&[("id", Value::I64(3))]);
    let cx = EvalContext::new(&param);

    assert!(Expr::parse("id != null").unwrap().eval_bool(&cx).unwrap());
    assert!(!Expr::parse("id == null").unwrap().eval_bool(&cx).unwrap());
}

#[test]
fn numeric_widening_in_comparison() {
    let param = param(&[("a", Value::I32(3)), ("b", Value::I64(3))]);
    let cx = EvalContext::new(&param);

    assert!(Expr::parse("a == b").unwrap().eval_bool(&cx).unwrap());
    assert!(Expr::parse("a >= 3").unwrap().eval_bool(&cx).unwrap());
    assert!(Expr::parse("a < 3.5").unwrap().eval_bool(&cx).unwrap());
}

#[test]
fn ordered_comparison_with_null_is_error() {
    let param = param(&[("id", Value::Null)]);
    let cx = EvalContext::new(&param);

    let err = Expr::parse("id > 1").unwrap().eval_bool(&cx).unwrap_err();
    assert!(err.is_expression());
}

#[test]
fn string_comparison() {
    let param = param(&[("name", Value::from("bob"))]);
    let cx = EvalContext::new(&param);

    assert!(Expr::parse("name == 'bob'")
        .unwrap()
        .eval_bool(&cx)
        .unwrap());
    assert!(Expr::parse("name < 'carol'")
        .unwrap()
        .eval_bool(&cx)
        .unwrap());
}

#[test]
fn parameter_key_reaches_whole_object() {
    let param = Value::I64(7);
    let cx = EvalContext::new(&param);

    assert_eq!(
        Expr::parse("_parameter").unwrap().eval_value(&cx).unwrap(),
        Value::I64(7)
    );
}

#[test]
fn bindings_shadow_parameter_properties() {
    let param = param(&[("item", Value::I64(1))]);
    let mut bindings = IndexMap::new();
    bindings.insert("item".to_string(), Value::I64(99));
    let cx = EvalContext::with_bindings(&param, &bindings);

    assert_eq!(
        Expr::parse("item").unwrap().eval_value(&cx).unwrap(),
        Value::I64(99)
    );
    // but the parameter namespace still reaches the original
    assert_eq!(
        Expr::parse("_parameter.item")
            .unwrap()
            .eval_value(&cx)
            .unwrap(),
        Value::I64(1)
    );
}

#[test]
fn binding_shadows_the_parameter_namespace() {
    let param = param(&[("item", Value::I64(1))]);
    let mut bindings = IndexMap::new();
    bindings.insert("_parameter".to_string(), Value::I64(99));
    let cx = EvalContext::with_bindings(&param, &bindings);

    assert_eq!(
        Expr::parse("_parameter").unwrap().eval_value(&cx).unwrap(),
        Value::I64(99)
    );
}

#[test]
fn iterate_list_in_order() {
    let param = param(&[("ids", Value::from(vec![10i64, 20, 30]))]);
    let cx = EvalContext::new(&param);

    let entries = Expr::parse("ids").unwrap().eval_iterable(&cx).unwrap();
    assert_eq!(
        entries,
        vec![
            (Value::I64(0), Value::I64(10)),
            (Value::I64(1), Value::I64(20)),
            (Value::I64(2), Value::I64(30)),
        ]
    );
}

#[test]
fn iterate_map_yields_key_value_pairs() {
    let inner = param(&[("a", Value::I64(1)), ("b", Value::I64(2))]);
    let param = param(&[("m", inner)]);
    let cx = EvalContext::new(&param);

    let entries = Expr::parse("m").unwrap().eval_iterable(&cx).unwrap();
    assert_eq!(
        entries,
        vec![
            (Value::from("a"), Value::I64(1)),
            (Value::from("b"), Value::I64(2)),
        ]
    );
}

#[test]
fn iterate_null_is_error() {
    let param = param(&[("ids", Value::Null)]);
    let cx = EvalContext::new(&param);

    assert!(Expr::parse("ids")
        .unwrap()
        .eval_iterable(&cx)
        .unwrap_err()
        .is_expression());
    assert!(Expr::parse("missing")
        .unwrap()
        .eval_iterable(&cx)
        .unwrap_err()
        .is_expression());
}

#[test]
fn iterate_scalar_as_single_element() {
    let param = param(&[("id", Value::I64(5))]);
    let cx = EvalContext::new(&param);

    let entries = Expr::parse("id").unwrap().eval_iterable(&cx).unwrap();
    assert_eq!(entries, vec![(Value::I64(0), Value::I64(5))]);
}

#[test]
fn nested_path_resolution() {
    let address = param(&[("city", Value::from("Rome"))]);
    let user = param(&[("address", address)]);
    let param = param(&[("user", user)]);
    let cx = EvalContext::new(&param);

    assert_eq!(
        Expr::parse("user.address.city")
            .unwrap()
            .eval_value(&cx)
            .unwrap(),
        Value::from("Rome")
    );
}
