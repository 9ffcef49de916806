use rowmap::{
    FieldBinding, MappedStatement, Registry, ResultMap, Session, StatementKind, StoreType, Type,
    Value,
};
use rowmap::testing::StubExecutor;
use std::sync::Arc;

fn object(value: &Value) -> &rowmap::Object {
    match value {
        Value::Object(object) => object,
        other => panic!("expected an object, got {other:?}"),
    }
}

fn list(value: &Value) -> &[Value] {
    match value {
        Value::List(items) => items,
        other => panic!("expected a list, got {other:?}"),
    }
}

/// Orders joined to their lines; three cursor rows collapse into one
/// order carrying three lines.
fn order_registry() -> Registry {
    let mut registry = Registry::new();
    registry.add_result_map(
        ResultMap::builder("line", "OrderLine")
            .binding(FieldBinding::new("line_id", "id").ty(Type::I64).id())
            .binding(FieldBinding::new("sku", "sku").ty(Type::String)),
    );
    registry.add_result_map(
        ResultMap::builder("order", "Order")
            .binding(FieldBinding::new("order_id", "id").ty(Type::I64).id())
            .binding(FieldBinding::new("customer", "customer").ty(Type::String))
            .binding(
                FieldBinding::new("line_id", "lines")
                    .ty(Type::List)
                    .nested_map("line"),
            ),
    );
    registry.add_statement(
        MappedStatement::builder("findOrders", StatementKind::Select)
            .template("SELECT o.order_id, o.customer, l.line_id, l.sku FROM orders o LEFT JOIN lines l ON l.order_id = o.order_id")
            .result_map("order"),
    );
    registry
}

const ORDER_COLUMNS: &[(&str, StoreType)] = &[
    ("order_id", StoreType::BigInt),
    ("customer", StoreType::Varchar),
    ("line_id", StoreType::BigInt),
    ("sku", StoreType::Varchar),
];

#[test]
fn duplicate_parent_rows_collapse_into_one_instance() {
    let registry = order_registry();
    let executor = Arc::new(StubExecutor::new());
    executor.on_query(
        "findOrders",
        ORDER_COLUMNS,
        vec![
            vec![Value::I64(1), Value::from("ada"), Value::I64(10), Value::from("sku-a")],
            vec![Value::I64(1), Value::from("ada"), Value::I64(11), Value::from("sku-b")],
            vec![Value::I64(1), Value::from("ada"), Value::I64(12), Value::from("sku-c")],
        ],
    );

    let session = Session::new(registry.finalize().unwrap(), executor);
    let rows = session.select_list("findOrders", &Value::Null).unwrap();

    assert_eq!(rows.len(), 1);
    let order = object(&rows[0]);
    assert_eq!(order.get("customer"), Value::from("ada"));

    let lines = order.get("lines");
    let lines = list(&lines);
    assert_eq!(lines.len(), 3);
    // children keep row order
    assert_eq!(object(&lines[0]).get("sku"), Value::from("sku-a"));
    assert_eq!(object(&lines[1]).get("sku"), Value::from("sku-b"));
    assert_eq!(object(&lines[2]).get("sku"), Value::from("sku-c"));
}

#[test]
fn interleaved_parents_each_keep_their_children() {
    let registry = order_registry();
    let executor = Arc::new(StubExecutor::new());
    executor.on_query(
        "findOrders",
        ORDER_COLUMNS,
        vec![
            vec![Value::I64(1), Value::from("ada"), Value::I64(10), Value::from("a1")],
            vec![Value::I64(2), Value::from("grace"), Value::I64(20), Value::from("g1")],
            vec![Value::I64(1), Value::from("ada"), Value::I64(11), Value::from("a2")],
        ],
    );

    let session = Session::new(registry.finalize().unwrap(), executor);
    let rows = session.select_list("findOrders", &Value::Null).unwrap();

    assert_eq!(rows.len(), 2);
    let first = object(&rows[0]);
    let second = object(&rows[1]);
    assert_eq!(list(&first.get("lines")).len(), 2);
    assert_eq!(list(&second.get("lines")).len(), 1);
    // output keeps first-appearance order
    assert_eq!(first.get("id"), Value::I64(1));
    assert_eq!(second.get("id"), Value::I64(2));
}

#[test]
fn outer_join_null_children_produce_no_line() {
    let registry = order_registry();
    let executor = Arc::new(StubExecutor::new());
    executor.on_query(
        "findOrders",
        ORDER_COLUMNS,
        vec![vec![Value::I64(1), Value::from("ada"), Value::Null, Value::Null]],
    );

    let session = Session::new(registry.finalize().unwrap(), executor);
    let rows = session.select_list("findOrders", &Value::Null).unwrap();

    assert_eq!(rows.len(), 1);
    // the all-null child row yields nothing, not an empty line
    assert_eq!(object(&rows[0]).get("lines"), Value::Null);
}

#[test]
fn not_null_columns_guard_child_creation() {
    let mut registry = Registry::new();
    registry.add_result_map(
        ResultMap::builder("line", "OrderLine")
            .binding(FieldBinding::new("sku", "sku").ty(Type::String)),
    );
    registry.add_result_map(
        ResultMap::builder("order", "Order")
            .binding(FieldBinding::new("order_id", "id").ty(Type::I64).id())
            .binding(
                FieldBinding::new("line_id", "lines")
                    .ty(Type::List)
                    .nested_map("line")
                    .not_null_columns(&["line_id"]),
            ),
    );
    registry.add_statement(
        MappedStatement::builder("findOrders", StatementKind::Select)
            .template("SELECT order_id, line_id, sku FROM orders")
            .result_map("order"),
    );

    let executor = Arc::new(StubExecutor::new());
    executor.on_query(
        "findOrders",
        &[
            ("order_id", StoreType::BigInt),
            ("line_id", StoreType::BigInt),
            ("sku", StoreType::Varchar),
        ],
        vec![
            // sku alone would create a child; the guard column is null
            vec![Value::I64(1), Value::Null, Value::from("stray")],
            vec![Value::I64(1), Value::I64(10), Value::from("real")],
        ],
    );

    let session = Session::new(registry.finalize().unwrap(), executor);
    let rows = session.select_list("findOrders", &Value::Null).unwrap();

    let lines = object(&rows[0]).get("lines");
    let lines = list(&lines);
    assert_eq!(lines.len(), 1);
    assert_eq!(object(&lines[0]).get("sku"), Value::from("real"));
}

#[test]
fn column_prefix_disambiguates_joined_columns() {
    let mut registry = Registry::new();
    registry.add_result_map(
        ResultMap::builder("person", "Person")
            .binding(FieldBinding::new("id", "id").ty(Type::I64).id())
            .binding(FieldBinding::new("name", "name").ty(Type::String)),
    );
    registry.add_result_map(
        ResultMap::builder("team", "Team")
            .binding(FieldBinding::new("id", "id").ty(Type::I64).id())
            .binding(FieldBinding::new("name", "name").ty(Type::String))
            .binding(
                FieldBinding::new("lead_id", "lead")
                    .ty(Type::Object("Person".to_string()))
                    .nested_map("person")
                    .column_prefix("lead_"),
            ),
    );
    registry.add_statement(
        MappedStatement::builder("findTeams", StatementKind::Select)
            .template("SELECT t.id, t.name, p.id lead_id, p.name lead_name FROM teams t JOIN people p ON p.id = t.lead_id")
            .result_map("team"),
    );

    let executor = Arc::new(StubExecutor::new());
    executor.on_query(
        "findTeams",
        &[
            ("id", StoreType::BigInt),
            ("name", StoreType::Varchar),
            ("lead_id", StoreType::BigInt),
            ("lead_name", StoreType::Varchar),
        ],
        vec![vec![
            Value::I64(1),
            Value::from("core"),
            Value::I64(7),
            Value::from("ada"),
        ]],
    );

    let session = Session::new(registry.finalize().unwrap(), executor);
    let rows = session.select_list("findTeams", &Value::Null).unwrap();

    let team = object(&rows[0]);
    assert_eq!(team.get("name"), Value::from("core"));
    let lead = team.get("lead");
    let lead = object(&lead);
    assert_eq!(lead.get("id"), Value::I64(7));
    assert_eq!(lead.get("name"), Value::from("ada"));
}

#[test]
fn same_child_key_under_different_parents_stays_distinct() {
    let registry = order_registry();
    let executor = Arc::new(StubExecutor::new());
    // both orders carry a line with id 10; the instances must not be
    // shared across parents
    executor.on_query(
        "findOrders",
        ORDER_COLUMNS,
        vec![
            vec![Value::I64(1), Value::from("ada"), Value::I64(10), Value::from("a")],
            vec![Value::I64(2), Value::from("grace"), Value::I64(10), Value::from("b")],
        ],
    );

    let session = Session::new(registry.finalize().unwrap(), executor);
    let rows = session.select_list("findOrders", &Value::Null).unwrap();

    assert_eq!(rows.len(), 2);
    let first_line = object(&rows[0]).get("lines");
    let second_line = object(&rows[1]).get("lines");
    let first_line = object(&list(&first_line)[0]);
    let second_line = object(&list(&second_line)[0]);
    assert!(!first_line.ptr_eq(second_line));
    assert_eq!(first_line.get("sku"), Value::from("a"));
    assert_eq!(second_line.get("sku"), Value::from("b"));
}
