use regex::Regex;
use rowmap_core::Value;
use rowmap_template::TemplateParser;

fn param(entries: &[(&str, Value)]) -> Value {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn norm(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[test]
fn substitution_splices_text_verbatim() {
    let source = TemplateParser::new()
        .parse("SELECT * FROM ${table} ORDER BY ${column}")
        .unwrap();

    let bound = source
        .render(
            &param(&[
                ("table", Value::from("users")),
                ("column", Value::from("created_at")),
            ]),
            None,
        )
        .unwrap();

    assert_eq!(norm(&bound.sql), "SELECT * FROM users ORDER BY created_at");
    assert!(bound.markers.is_empty());
}

#[test]
fn substitution_stringifies_non_string_values() {
    let source = TemplateParser::new()
        .parse("SELECT * FROM t LIMIT ${max}")
        .unwrap();

    let bound = source
        .render(&param(&[("max", Value::I64(25))]), None)
        .unwrap();
    assert_eq!(norm(&bound.sql), "SELECT * FROM t LIMIT 25");
}

#[test]
fn guard_accepts_matching_values() {
    let guard = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    let source = TemplateParser::new().parse("SELECT * FROM ${table}").unwrap();

    let bound = source
        .render(&param(&[("table", Value::from("audit_log"))]), Some(&guard))
        .unwrap();
    assert_eq!(norm(&bound.sql), "SELECT * FROM audit_log");
}

#[test]
fn guard_rejects_non_matching_values() {
    let guard = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    let source = TemplateParser::new().parse("SELECT * FROM ${table}").unwrap();

    let err = source
        .render(
            &param(&[("table", Value::from("users; DROP TABLE users"))]),
            Some(&guard),
        )
        .unwrap_err();
    assert!(err.is_invalid_substitution());
}

#[test]
fn guard_rejects_null_substitution() {
    // null stringifies to the empty string, which no anchored
    // identifier pattern accepts
    let guard = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    let source = TemplateParser::new().parse("SELECT * FROM ${table}").unwrap();

    let err = source
        .render(&param(&[("table", Value::Null)]), Some(&guard))
        .unwrap_err();
    assert!(err.is_invalid_substitution());
}

#[test]
fn substitution_and_marker_compose() {
    let source = TemplateParser::new()
        .parse("SELECT * FROM ${table} WHERE id = #{id}")
        .unwrap();

    let parameter = param(&[("table", Value::from("users")), ("id", Value::I64(3))]);
    let bound = source.render(&parameter, None).unwrap();

    assert_eq!(norm(&bound.sql), "SELECT * FROM users WHERE id = ?");
    assert_eq!(bound.markers.len(), 1);
}
