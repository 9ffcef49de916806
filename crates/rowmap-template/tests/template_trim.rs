use rowmap_core::Value;
use rowmap_template::{SqlSource, TemplateParser};

fn param(entries: &[(&str, Value)]) -> Value {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn render(source: &SqlSource, parameter: &Value) -> String {
    let bound = source.render(parameter, None).unwrap();
    bound.sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[test]
fn custom_prefix_and_suffix_wrap_the_body() {
    let source = TemplateParser::new()
        .parse(concat!(
            "SELECT * FROM t WHERE ",
            "<trim prefix=\"(\" suffix=\")\" prefixOverrides=\"AND |OR \">",
            "<if test=\"a != null\">AND a = #{a}</if>",
            "<if test=\"b != null\">AND b = #{b}</if>",
            "</trim>"
        ))
        .unwrap();

    assert_eq!(
        render(&source, &param(&[("a", Value::I64(1)), ("b", Value::I64(2))])),
        "SELECT * FROM t WHERE ( a = ? AND b = ? )"
    );
}

#[test]
fn empty_body_suppresses_prefix_and_suffix() {
    let source = TemplateParser::new()
        .parse(concat!(
            "SELECT * FROM t ",
            "<trim prefix=\"WHERE (\" suffix=\")\">",
            "<if test=\"a != null\">a = #{a}</if>",
            "</trim>"
        ))
        .unwrap();

    assert_eq!(
        render(&source, &param(&[("a", Value::Null)])),
        "SELECT * FROM t"
    );
}

#[test]
fn only_the_first_matching_override_is_stripped() {
    let source = TemplateParser::new()
        .parse("<trim prefixOverrides=\"AND |OR \">AND OR a = 1</trim>")
        .unwrap();

    // one strip per application, even when the remainder starts with
    // another override token
    assert_eq!(render(&source, &Value::Null), "OR a = 1");
}

#[test]
fn override_match_is_case_insensitive() {
    let source = TemplateParser::new()
        .parse(concat!(
            "SELECT * FROM t <where>",
            "<if test=\"a != null\">and a = #{a}</if>",
            "</where>"
        ))
        .unwrap();

    assert_eq!(
        render(&source, &param(&[("a", Value::I64(1))])),
        "SELECT * FROM t WHERE a = ?"
    );
}

#[test]
fn suffix_override_strips_trailing_token() {
    let source = TemplateParser::new()
        .parse("<trim suffixOverrides=\",\">a = 1, b = 2,</trim>")
        .unwrap();

    assert_eq!(render(&source, &Value::Null), "a = 1, b = 2");
}

#[test]
fn nested_trims_each_apply_once() {
    let source = TemplateParser::new()
        .parse(concat!(
            "<trim prefix=\"OUTER\">",
            "<trim prefix=\"INNER\" prefixOverrides=\"AND \">AND x</trim>",
            "</trim>"
        ))
        .unwrap();

    assert_eq!(render(&source, &Value::Null), "OUTER INNER x");
}
