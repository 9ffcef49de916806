use rowmap_core::Value;
use rowmap_template::{bind_parameters, TemplateParser};

fn param(entries: &[(&str, Value)]) -> Value {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn norm(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

const IN_LIST: &str = concat!(
    "SELECT * FROM t WHERE id IN ",
    "<foreach collection=\"ids\" item=\"id\" open=\"(\" close=\")\" separator=\",\">",
    "#{id}",
    "</foreach>"
);

#[test]
fn empty_sequence_emits_nothing() {
    let source = TemplateParser::new().parse(IN_LIST).unwrap();
    let parameter = param(&[("ids", Value::List(vec![]))]);

    let bound = source.render(&parameter, None).unwrap();
    assert_eq!(norm(&bound.sql), "SELECT * FROM t WHERE id IN");
    assert!(bound.markers.is_empty());
}

#[test]
fn elements_render_in_order_with_separators() {
    let source = TemplateParser::new().parse(IN_LIST).unwrap();
    let parameter = param(&[("ids", Value::from(vec![10i64, 20, 30]))]);

    let bound = source.render(&parameter, None).unwrap();
    assert_eq!(norm(&bound.sql), "SELECT * FROM t WHERE id IN ( ? , ? , ? )");

    let params = bind_parameters(&bound, &parameter).unwrap();
    assert_eq!(
        params.iter().map(|p| p.value.clone()).collect::<Vec<_>>(),
        vec![Value::I64(10), Value::I64(20), Value::I64(30)]
    );
}

#[test]
fn item_bindings_do_not_collide_across_iterations() {
    let source = TemplateParser::new().parse(IN_LIST).unwrap();
    let parameter = param(&[("ids", Value::from(vec![1i64, 2]))]);

    let bound = source.render(&parameter, None).unwrap();

    // each iteration's marker refers to its own disambiguated name
    let names: Vec<_> = bound.markers.iter().map(|m| m.path.to_string()).collect();
    assert_eq!(names, vec!["__frch_id_0", "__frch_id_1"]);

    // the plain item binding does not leak out of the loop
    assert!(!bound.bindings.contains_key("id"));
    assert!(bound.bindings.contains_key("__frch_id_0"));
}

#[test]
fn map_iteration_binds_key_and_value() {
    let source = TemplateParser::new()
        .parse(concat!(
            "UPDATE t <set>",
            "<foreach collection=\"updates\" item=\"val\" index=\"col\" separator=\",\">",
            "${col} = #{val}",
            "</foreach>",
            "</set>"
        ))
        .unwrap();

    let updates = param(&[("a", Value::I64(1)), ("b", Value::I64(2))]);
    let parameter = param(&[("updates", updates)]);

    let bound = source.render(&parameter, None).unwrap();
    assert_eq!(norm(&bound.sql), "UPDATE t SET a = ? , b = ?");

    let params = bind_parameters(&bound, &parameter).unwrap();
    assert_eq!(
        params.iter().map(|p| p.value.clone()).collect::<Vec<_>>(),
        vec![Value::I64(1), Value::I64(2)]
    );
}

#[test]
fn short_circuiting_bodies_leave_no_stray_separator() {
    let source = TemplateParser::new()
        .parse(concat!(
            "SELECT * FROM t WHERE x IN ",
            "<foreach collection=\"xs\" item=\"x\" open=\"(\" close=\")\" separator=\",\">",
            "<if test=\"x != null\">#{x}</if>",
            "</foreach>"
        ))
        .unwrap();

    let parameter = param(&[(
        "xs",
        Value::List(vec![Value::Null, Value::I64(7), Value::Null, Value::I64(8)]),
    )]);

    let bound = source.render(&parameter, None).unwrap();
    assert_eq!(norm(&bound.sql), "SELECT * FROM t WHERE x IN ( ? , ? )");

    let params = bind_parameters(&bound, &parameter).unwrap();
    assert_eq!(
        params.iter().map(|p| p.value.clone()).collect::<Vec<_>>(),
        vec![Value::I64(7), Value::I64(8)]
    );
}

#[test]
fn nested_property_of_item_is_rewritten() {
    let source = TemplateParser::new()
        .parse(concat!(
            "INSERT INTO t (a, b) VALUES ",
            "<foreach collection=\"rows\" item=\"row\" separator=\",\">",
            "(#{row.a}, #{row.b})",
            "</foreach>"
        ))
        .unwrap();

    let rows = Value::List(vec![
        param(&[("a", Value::I64(1)), ("b", Value::I64(2))]),
        param(&[("a", Value::I64(3)), ("b", Value::I64(4))]),
    ]);
    let parameter = param(&[("rows", rows)]);

    let bound = source.render(&parameter, None).unwrap();
    let params = bind_parameters(&bound, &parameter).unwrap();
    assert_eq!(
        params.iter().map(|p| p.value.clone()).collect::<Vec<_>>(),
        vec![Value::I64(1), Value::I64(2), Value::I64(3), Value::I64(4)]
    );
}

#[test]
fn similarly_named_paths_are_not_rewritten() {
    // `items` must not be mistaken for the loop variable `item`
    let source = TemplateParser::new()
        .parse(concat!(
            "SELECT * FROM t WHERE a = #{items} AND b IN ",
            "<foreach collection=\"list\" item=\"item\" open=\"(\" close=\")\" separator=\",\">",
            "#{item}",
            "</foreach>"
        ))
        .unwrap();

    let parameter = param(&[
        ("items", Value::I64(99)),
        ("list", Value::from(vec![1i64, 2])),
    ]);

    let bound = source.render(&parameter, None).unwrap();
    let params = bind_parameters(&bound, &parameter).unwrap();
    assert_eq!(
        params.iter().map(|p| p.value.clone()).collect::<Vec<_>>(),
        vec![Value::I64(99), Value::I64(1), Value::I64(2)]
    );
}

#[test]
fn iterating_null_collection_is_an_error() {
    let source = TemplateParser::new().parse(IN_LIST).unwrap();
    let err = source
        .render(&param(&[("ids", Value::Null)]), None)
        .unwrap_err();
    assert!(err.is_expression());
}
