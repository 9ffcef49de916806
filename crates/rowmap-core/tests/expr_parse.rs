use rowmap_core::{expr::CmpOp, Expr, Path, Value};

#[test]
fn parse_literal_null() {
    assert_eq!(Expr::parse("null").unwrap(), Expr::Value(Value::Null));
}

#[test]
fn parse_literal_numbers() {
    assert_eq!(Expr::parse("42").unwrap(), Expr::Value(Value::I64(42)));
    assert_eq!(Expr::parse("-7").unwrap(), Expr::Value(Value::I64(-7)));
    assert_eq!(Expr::parse("1.5").unwrap(), Expr::Value(Value::F64(1.5)));
}

#[test]
fn parse_string_literals() {
    assert_eq!(
        Expr::parse("'hello'").unwrap(),
        Expr::Value(Value::String("hello".to_string()))
    );
    assert_eq!(
        Expr::parse("\"world\"").unwrap(),
        Expr::Value(Value::String("world".to_string()))
    );
}

#[test]
fn parse_path() {
    assert_eq!(
        Expr::parse("user.name").unwrap(),
        Expr::Path(Path::parse("user.name").unwrap())
    );
}

#[test]
fn parse_ne_comparison() {
    let expr = Expr::parse("id != null").unwrap();
    assert_eq!(
        expr,
        Expr::cmp(Path::parse("id").unwrap(), CmpOp::Ne, Value::Null)
    );
}

#[test]
fn parse_sql_style_operators() {
    // `=` and `<>` are accepted alongside `==` and `!=`
    assert_eq!(Expr::parse("a = 1").unwrap(), Expr::parse("a == 1").unwrap());
    assert_eq!(
        Expr::parse("a <> 1").unwrap(),
        Expr::parse("a != 1").unwrap()
    );
}

#[test]
fn parse_and_or_precedence() {
    // a or b and c parses as a or (b and c)
    let expr = Expr::parse("a or b and c").unwrap();
    let expected = Expr::or(
        Expr::Path(Path::parse("a").unwrap()),
        Expr::and(
            Expr::Path(Path::parse("b").unwrap()),
            Expr::Path(Path::parse("c").unwrap()),
        ),
    );
    assert_eq!(expr, expected);
}

#[test]
fn parse_parens_override_precedence() {
    let expr = Expr::parse("(a or b) and c").unwrap();
    let expected = Expr::and(
        Expr::or(
            Expr::Path(Path::parse("a").unwrap()),
            Expr::Path(Path::parse("b").unwrap()),
        ),
        Expr::Path(Path::parse("c").unwrap()),
    );
    assert_eq!(expr, expected);
}

#[test]
fn parse_not_forms() {
    assert_eq!(Expr::parse("!a").unwrap(), Expr::parse("not a").unwrap());
}

#[test]
fn parse_symbolic_and_or() {
    assert_eq!(
        Expr::parse("a && b").unwrap(),
        Expr::parse("a and b").unwrap()
    );
    assert_eq!(
        Expr::parse("a || b").unwrap(),
        Expr::parse("a or b").unwrap()
    );
}

#[test]
fn parse_rejects_garbage() {
    assert!(Expr::parse("").unwrap_err().is_expression());
    assert!(Expr::parse("a ==").unwrap_err().is_expression());
    assert!(Expr::parse("(a").unwrap_err().is_expression());
    assert!(Expr::parse("a b").unwrap_err().is_expression());
    assert!(Expr::parse("'unterminated").unwrap_err().is_expression());
}

#[test]
fn compile_returns_shared_instance() {
    let a = Expr::compile("id != null").unwrap();
    let b = Expr::compile("id != null").unwrap();
    assert!(std::sync::Arc::ptr_eq(&a, &b));
}
