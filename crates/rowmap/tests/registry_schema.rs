use rowmap::{
    FieldBinding, MappedStatement, Registry, ResultMap, StatementKind, Type,
};

#[test]
fn extends_resolves_regardless_of_registration_order() {
    let mut registry = Registry::new();
    // child first, parent later
    registry.add_result_map(
        ResultMap::builder("child", "T")
            .binding(FieldBinding::new("extra", "extra"))
            .extends("parent"),
    );
    registry.add_result_map(
        ResultMap::builder("parent", "T").binding(FieldBinding::new("base", "base")),
    );

    let registry = registry.finalize().unwrap();
    let child = registry.result_map("child").unwrap();
    assert_eq!(child.bindings.len(), 2);
    assert!(child.bindings.iter().any(|b| b.property == "base"));
}

#[test]
fn extends_chain_resolves_transitively() {
    let mut registry = Registry::new();
    registry.add_result_map(
        ResultMap::builder("c", "T")
            .binding(FieldBinding::new("cc", "cc"))
            .extends("b"),
    );
    registry.add_result_map(
        ResultMap::builder("b", "T")
            .binding(FieldBinding::new("bb", "bb"))
            .extends("a"),
    );
    registry.add_result_map(
        ResultMap::builder("a", "T").binding(FieldBinding::new("aa", "aa")),
    );

    let registry = registry.finalize().unwrap();
    assert_eq!(registry.result_map("c").unwrap().bindings.len(), 3);
}

#[test]
fn missing_parent_reports_the_dependency_chain() {
    let mut registry = Registry::new();
    registry.add_result_map(
        ResultMap::builder("c", "T")
            .binding(FieldBinding::new("cc", "cc"))
            .extends("b"),
    );
    registry.add_result_map(
        ResultMap::builder("b", "T")
            .binding(FieldBinding::new("bb", "bb"))
            .extends("a"),
    );

    let err = registry.finalize().unwrap_err();
    assert!(err.is_incomplete_schema());
    let rendered = err.to_string();
    assert!(rendered.contains("`c`"), "{rendered}");
    assert!(rendered.contains("`b`"), "{rendered}");
    assert!(rendered.contains("`a`"), "{rendered}");
}

#[test]
fn statement_referencing_unknown_result_map_fails() {
    let mut registry = Registry::new();
    registry.add_statement(
        MappedStatement::builder("find", StatementKind::Select)
            .template("SELECT 1")
            .result_map("nowhere"),
    );

    let err = registry.finalize().unwrap_err();
    assert!(err.is_incomplete_schema());
    assert!(err.to_string().contains("nowhere"));
}

#[test]
fn binding_referencing_unknown_nested_map_fails() {
    let mut registry = Registry::new();
    registry.add_result_map(
        ResultMap::builder("m", "T")
            .binding(FieldBinding::new("c", "child").nested_map("missing")),
    );

    let err = registry.finalize().unwrap_err();
    assert!(err.is_incomplete_schema());
}

#[test]
fn binding_referencing_unknown_nested_select_fails() {
    let mut registry = Registry::new();
    registry.add_result_map(
        ResultMap::builder("m", "T")
            .binding(FieldBinding::new("c", "child").nested_select("missing")),
    );

    let err = registry.finalize().unwrap_err();
    assert!(err.is_incomplete_schema());
}

#[test]
fn discriminator_case_referencing_unknown_map_fails() {
    let mut registry = Registry::new();
    registry.add_result_map(
        ResultMap::builder("m", "T")
            .binding(FieldBinding::new("id", "id"))
            .discriminator(rowmap::Discriminator::new("kind").case("x", "missing")),
    );

    let err = registry.finalize().unwrap_err();
    assert!(err.is_incomplete_schema());
}

#[test]
fn fragments_compile_regardless_of_registration_order() {
    let mut registry = Registry::new();
    registry.add_statement(
        MappedStatement::builder("find", StatementKind::Select)
            .template("SELECT <include refid=\"cols\"/> FROM t"),
    );
    // fragment arrives after the statement that includes it
    registry.add_fragment("cols", "id, name");

    let registry = registry.finalize().unwrap();
    let statement = registry.statement("find").unwrap();
    assert!(!statement.source.is_dynamic());
}

#[test]
fn template_errors_name_the_statement() {
    let mut registry = Registry::new();
    registry.add_statement(
        MappedStatement::builder("broken", StatementKind::Select)
            .template("SELECT * FROM t <if test=\"x\">unclosed"),
    );

    let err = registry.finalize().unwrap_err();
    assert!(err.is_template_compile());
    assert!(err.to_string().contains("broken"));
}

#[test]
fn unknown_statement_lookup_is_an_error() {
    let registry = Registry::new().finalize().unwrap();
    let err = registry.statement("nope").unwrap_err();
    assert!(err.to_string().contains("nope"));
}

#[test]
fn extended_map_inherits_declared_types() {
    let mut registry = Registry::new();
    registry.add_result_map(
        ResultMap::builder("parent", "T")
            .binding(FieldBinding::new("n", "n").ty(Type::I64)),
    );
    registry.add_result_map(ResultMap::builder("child", "T").extends("parent"));

    let registry = registry.finalize().unwrap();
    let child = registry.result_map("child").unwrap();
    assert_eq!(child.bindings[0].ty, Type::I64);
}
