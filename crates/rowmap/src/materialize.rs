use crate::cursor::{ColumnInfo, ResultCursor, RowBounds};
use crate::mapping::{AutoMapping, ColumnRef, FieldBinding, ResultMap};
use crate::registry::Registry;
use crate::session::Session;
use crate::types::TypeDescriptor;

use indexmap::IndexMap;
use rowmap_core::{err, CacheKey, Error, Object, Result, StoreType, Type, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Per-execution result materialization state. Never shared: each
/// query execution owns its identity map, ancestor stack and in-flight
/// set.
pub(crate) struct Materializer<'a> {
    session: &'a Session,
    registry: Arc<Registry>,

    /// Identity map for one-to-many deduplication.
    instances: HashMap<CacheKey, Object>,

    /// Nested selects already issued during this execution; an
    /// identical one for a sibling row is deferred instead of run
    /// twice.
    in_flight: HashSet<CacheKey>,

    /// In-flight (map id, column prefix, instance) frames, for circular
    /// nested references back to an ancestor.
    ancestors: Vec<(String, String, Object)>,
}

struct RowResult {
    object: Object,
    created: bool,
}

impl<'a> Materializer<'a> {
    pub(crate) fn new(session: &'a Session) -> Materializer<'a> {
        Materializer {
            session,
            registry: session.registry().clone(),
            instances: HashMap::new(),
            in_flight: HashSet::new(),
            ancestors: vec![],
        }
    }

    pub(crate) fn run(
        mut self,
        mut cursor: Box<dyn ResultCursor>,
        map: Option<Arc<ResultMap>>,
        bounds: RowBounds,
    ) -> Result<Vec<Value>> {
        if bounds.offset > 0 {
            if cursor.supports_absolute() {
                cursor.absolute(bounds.offset)?;
            } else {
                for _ in 0..bounds.offset {
                    if !cursor.advance()? {
                        return Ok(vec![]);
                    }
                }
            }
        }

        let mut results = vec![];
        while results.len() < bounds.limit && cursor.advance()? {
            let row = Row::read(cursor.as_ref())?;

            match &map {
                Some(map) => {
                    if let Some(handled) = self.handle_row(&row, map, "", None, false)? {
                        // duplicate parent rows collapse to their first
                        // occurrence
                        if handled.created {
                            results.push(Value::Object(handled.object));
                        }
                    }
                }
                None => results.push(row.to_map()),
            }
        }

        debug!(rows = results.len(), "materialized result set");
        Ok(results)
    }

    fn handle_row(
        &mut self,
        row: &Row,
        map: &Arc<ResultMap>,
        prefix: &str,
        parent_key: Option<&CacheKey>,
        nested: bool,
    ) -> Result<Option<RowResult>> {
        let map = self.resolve_discriminator(row, map, prefix)?;

        // Identity-based merging is a joined-collection feature: only
        // maps that fold child rows in (or rows that are themselves
        // such children) deduplicate. A flat map emits one instance
        // per cursor row, duplicates included.
        let merge = nested || has_nested_maps(&map);

        let key = self.row_identity(row, &map, prefix);
        let degenerate = key.is_degenerate();
        let lookup = match parent_key {
            Some(parent) => key.combine(parent),
            None => key,
        };

        if merge && !degenerate {
            if let Some(existing) = self.instances.get(&lookup).cloned() {
                // merge later rows into the published instance
                self.resolve_nested(row, &map, prefix, &lookup, &existing)?;
                return Ok(Some(RowResult {
                    object: existing,
                    created: false,
                }));
            }
        }

        let Some(object) = self.create_row_object(row, &map, prefix, nested)? else {
            return Ok(None);
        };

        if merge && !degenerate {
            self.instances.insert(lookup.clone(), object.clone());
        }
        self.resolve_nested(row, &map, prefix, &lookup, &object)?;

        Ok(Some(RowResult {
            object,
            created: true,
        }))
    }

    // ------------------------------------------------------------------
    // Discriminator
    // ------------------------------------------------------------------

    fn resolve_discriminator(
        &self,
        row: &Row,
        map: &Arc<ResultMap>,
        prefix: &str,
    ) -> Result<Arc<ResultMap>> {
        let mut current = map.clone();
        let mut visited = vec![current.id.clone()];

        while let Some(discriminator) = current.discriminator.clone() {
            let column = discriminator
                .binding
                .column
                .single()
                .ok_or_else(|| err!("discriminator column must be a single column"))?;
            let value = self.column_value(row, &prefixed(prefix, column), &discriminator.binding)?;
            let text = value.to_text();

            let Some(next_id) = discriminator.cases.get(&text) else {
                return Err(Error::unresolved_discriminator(text));
            };

            // a repeat of any visited map terminates the chain
            if visited.iter().any(|id| id == next_id) {
                break;
            }
            visited.push(next_id.clone());
            current = self.registry.result_map(next_id)?.clone();
        }

        Ok(current)
    }

    // ------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------

    /// Folds the map's own id plus its identity bindings' non-null
    /// values. A key with only the map id is degenerate.
    fn row_identity(&self, row: &Row, map: &ResultMap, prefix: &str) -> CacheKey {
        let mut key = CacheKey::new();
        key.update(map.id.as_str());

        for binding in map.id_bindings() {
            let Some(column) = binding.column.single() else {
                continue;
            };
            let value = row.raw(&prefixed(prefix, column));
            if !value.is_null() {
                key.update(value);
            }
        }

        key
    }

    // ------------------------------------------------------------------
    // Instance creation
    // ------------------------------------------------------------------

    fn create_row_object(
        &mut self,
        row: &Row,
        map: &Arc<ResultMap>,
        prefix: &str,
        nested: bool,
    ) -> Result<Option<Object>> {
        let descriptor = self.registry.type_descriptor(&map.type_name).cloned();
        let (object, mut found) = self.instantiate(row, map, prefix, descriptor.as_deref())?;

        // explicit same-row property bindings
        for binding in map.property_bindings() {
            if binding.nested_map.is_some() || binding.nested_select.is_some() {
                continue;
            }
            let Some(column) = binding.column.single() else {
                continue;
            };
            let value = self.column_value(row, &prefixed(prefix, column), binding)?;
            if !value.is_null() {
                found = true;
            }
            object.set(&binding.property, value);
        }

        let policy = map
            .auto_mapping
            .unwrap_or(self.registry.settings().auto_mapping);
        let auto = match policy {
            AutoMapping::None => false,
            AutoMapping::Partial => !nested,
            AutoMapping::Full => true,
        };
        if auto && self.auto_map(row, map, prefix, descriptor.as_deref(), &object)? {
            found = true;
        }

        if !found && !self.registry.settings().return_empty_rows {
            return Ok(None);
        }
        Ok(Some(object))
    }

    fn instantiate(
        &self,
        row: &Row,
        map: &ResultMap,
        prefix: &str,
        descriptor: Option<&TypeDescriptor>,
    ) -> Result<(Object, bool)> {
        let ctor_bindings: Vec<&FieldBinding> = map.constructor_bindings().collect();

        if !ctor_bindings.is_empty() {
            if let Some(built) = self.construct_explicit(row, map, prefix, descriptor, &ctor_bindings)? {
                return Ok(built);
            }
        } else if let Some(descriptor) = descriptor {
            if let Some(built) = self.construct_by_signature(row, map, descriptor)? {
                return Ok(built);
            }
        }

        if descriptor.map_or(true, |d| d.has_default) {
            return Ok((Object::new(Some(&map.type_name)), false));
        }
        Err(Error::no_viable_constructor(&map.type_name))
    }

    /// Applies the map's explicit constructor bindings, when every one
    /// of their columns is present in the row.
    fn construct_explicit(
        &self,
        row: &Row,
        map: &ResultMap,
        prefix: &str,
        descriptor: Option<&TypeDescriptor>,
        bindings: &[&FieldBinding],
    ) -> Result<Option<(Object, bool)>> {
        // parameter names come from a matching declared constructor
        // when one exists, else from the bindings themselves
        let names: Vec<String> = descriptor
            .and_then(|d| {
                d.constructors
                    .iter()
                    .find(|c| c.params.len() == bindings.len())
            })
            .map(|c| c.params.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_else(|| bindings.iter().map(|b| b.property.clone()).collect());

        let mut values = vec![];
        for binding in bindings {
            let Some(column) = binding.column.single() else {
                return Ok(None);
            };
            let column = prefixed(prefix, column);
            if !row.has_column(&column) {
                return Ok(None);
            }
            values.push(self.column_value(row, &column, binding)?);
        }

        let object = Object::new(Some(&map.type_name));
        let mut found = false;
        for (name, value) in names.iter().zip(values) {
            if !value.is_null() {
                found = true;
            }
            object.set(name, value);
        }
        Ok(Some((object, found)))
    }

    /// First declared constructor whose parameter types each have a
    /// converter for the corresponding row column, matched positionally
    /// in column order. Declaration order is the tie-break.
    fn construct_by_signature(
        &self,
        row: &Row,
        map: &ResultMap,
        descriptor: &TypeDescriptor,
    ) -> Result<Option<(Object, bool)>> {
        for constructor in &descriptor.constructors {
            if constructor.params.len() > row.columns.len() {
                continue;
            }
            let viable = constructor
                .params
                .iter()
                .zip(&row.columns)
                .all(|((_, ty), column)| self.registry.converters().find(ty, column.store_ty).is_some());
            if !viable {
                continue;
            }

            let object = Object::new(Some(&map.type_name));
            let mut found = false;
            for (i, (name, ty)) in constructor.params.iter().enumerate() {
                let converter = self
                    .registry
                    .converters()
                    .resolve(ty, row.columns[i].store_ty);
                let value = converter
                    .from_store(row.values[i].clone(), ty)
                    .map_err(|cause| {
                        Error::result_mapping(
                            &row.columns[i].name,
                            name,
                            "constructor argument conversion failed",
                        )
                        .context(cause)
                    })?;
                if !value.is_null() {
                    found = true;
                }
                object.set(name, value);
            }
            return Ok(Some((object, found)));
        }
        Ok(None)
    }

    // ------------------------------------------------------------------
    // Auto-mapping
    // ------------------------------------------------------------------

    fn auto_map(
        &self,
        row: &Row,
        map: &ResultMap,
        prefix: &str,
        descriptor: Option<&TypeDescriptor>,
        object: &Object,
    ) -> Result<bool> {
        let underscore = self.registry.settings().map_underscore_to_camel_case;
        let mut found = false;

        for (index, column) in row.columns.iter().enumerate() {
            let name = if prefix.is_empty() {
                column.name.as_str()
            } else {
                match strip_prefix_ignore_case(&column.name, prefix) {
                    Some(rest) => rest,
                    None => continue,
                }
            };
            if map.maps_column(name) {
                continue;
            }

            let (property, ty) = match descriptor {
                Some(descriptor) => match descriptor.match_property(name, underscore) {
                    Some(property) => (
                        property.to_string(),
                        descriptor.property_ty(property).cloned().unwrap_or(Type::Unknown),
                    ),
                    None => continue,
                },
                None => (name.to_string(), Type::Unknown),
            };
            if object.has_property(&property) {
                continue;
            }

            let converter = self.registry.converters().resolve(&ty, column.store_ty);
            let value = converter
                .from_store(row.values[index].clone(), &ty)
                .map_err(|cause| {
                    Error::result_mapping(&column.name, &property, "value conversion failed")
                        .context(cause)
                })?;
            if !value.is_null() {
                found = true;
            }
            object.set(&property, value);
        }

        Ok(found)
    }

    // ------------------------------------------------------------------
    // Nested resolution
    // ------------------------------------------------------------------

    fn resolve_nested(
        &mut self,
        row: &Row,
        map: &Arc<ResultMap>,
        prefix: &str,
        key: &CacheKey,
        object: &Object,
    ) -> Result<()> {
        self.ancestors
            .push((map.id.clone(), prefix.to_string(), object.clone()));
        let result = self.resolve_nested_inner(row, map, prefix, key, object);
        self.ancestors.pop();
        result
    }

    fn resolve_nested_inner(
        &mut self,
        row: &Row,
        map: &Arc<ResultMap>,
        prefix: &str,
        key: &CacheKey,
        object: &Object,
    ) -> Result<()> {
        for binding in &map.bindings {
            if let Some(nested_id) = &binding.nested_map {
                self.resolve_nested_map(row, prefix, key, object, binding, nested_id)?;
            } else if let Some(select_id) = &binding.nested_select {
                self.resolve_nested_select(row, prefix, object, binding, select_id)?;
            }
        }
        Ok(())
    }

    fn resolve_nested_map(
        &mut self,
        row: &Row,
        prefix: &str,
        key: &CacheKey,
        object: &Object,
        binding: &FieldBinding,
        nested_id: &str,
    ) -> Result<()> {
        let child_prefix = match &binding.column_prefix {
            Some(p) => format!("{prefix}{p}"),
            None => prefix.to_string(),
        };

        // outer-join nulls: do not create an empty child
        if !binding.not_null_columns.is_empty()
            && binding
                .not_null_columns
                .iter()
                .all(|c| row.raw(&prefixed(&child_prefix, c)).is_null())
        {
            return Ok(());
        }

        // circular reference back to an in-flight ancestor
        let ancestor = self
            .ancestors
            .iter()
            .find(|(id, p, _)| id == nested_id && *p == child_prefix)
            .map(|(_, _, instance)| instance.clone());
        if let Some(ancestor) = ancestor {
            attach(object, binding, ancestor);
            return Ok(());
        }

        let child_map = self.registry.result_map(nested_id)?.clone();
        if let Some(child) = self.handle_row(row, &child_map, &child_prefix, Some(key), true)? {
            attach(object, binding, child.object);
        }
        Ok(())
    }

    fn resolve_nested_select(
        &mut self,
        row: &Row,
        prefix: &str,
        object: &Object,
        binding: &FieldBinding,
        select_id: &str,
    ) -> Result<()> {
        // a repeated parent row has already resolved (or deferred)
        // this property
        if object.has_property(&binding.property) {
            return Ok(());
        }

        let param = self.nested_select_param(row, prefix, binding);
        if param.is_null() {
            object.set(&binding.property, Value::Null);
            return Ok(());
        }

        let many = binding.ty.is_list();
        let mut select_key = CacheKey::new();
        select_key.update(select_id);
        select_key.update(param.clone());

        let lazy = binding.lazy || self.registry.settings().lazy_by_default;
        if lazy || self.in_flight.contains(&select_key) {
            object.set(&binding.property, Value::Null);
            self.session
                .defer(object.clone(), &binding.property, select_id, param, many, lazy);
        } else {
            self.in_flight.insert(select_key);
            let value = if many {
                Value::List(self.session.select_list(select_id, &param)?)
            } else {
                self.session
                    .select_one(select_id, &param)?
                    .unwrap_or(Value::Null)
            };
            object.set(&binding.property, value);
        }
        Ok(())
    }

    /// The parameter for a nested select: the single column's value, or
    /// a synthetic container assembled from a composite spec.
    fn nested_select_param(&self, row: &Row, prefix: &str, binding: &FieldBinding) -> Value {
        match &binding.column {
            ColumnRef::Column(column) => row.raw(&prefixed(prefix, column)),
            ColumnRef::Composite(pairs) => {
                let map: IndexMap<String, Value> = pairs
                    .iter()
                    .map(|(prop, column)| (prop.clone(), row.raw(&prefixed(prefix, column))))
                    .collect();
                if map.values().all(Value::is_null) {
                    Value::Null
                } else {
                    Value::Map(map)
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Column access
    // ------------------------------------------------------------------

    fn column_value(&self, row: &Row, column: &str, binding: &FieldBinding) -> Result<Value> {
        let raw = row.raw(column);
        let store_ty = row.store_ty(column).unwrap_or(binding.store_ty);

        let converter = match &binding.converter {
            Some(name) => self.registry.converters().by_name(name).ok_or_else(|| {
                Error::result_mapping(
                    column,
                    &binding.property,
                    format!("unknown converter `{name}`"),
                )
            })?,
            None => self.registry.converters().resolve(&binding.ty, store_ty),
        };

        converter.from_store(raw, &binding.ty).map_err(|cause| {
            Error::result_mapping(column, &binding.property, "value conversion failed")
                .context(cause)
        })
    }
}

/// Attaches a resolved child: list-append when the declared property
/// type is a list (created on demand, same instance never twice),
/// direct set otherwise.
fn attach(parent: &Object, binding: &FieldBinding, child: Object) {
    if binding.ty.is_list() {
        if let Value::List(items) = parent.get(&binding.property) {
            let already = items
                .iter()
                .any(|item| matches!(item, Value::Object(o) if o.ptr_eq(&child)));
            if already {
                return;
            }
        }
        parent.push(&binding.property, child);
    } else {
        parent.set(&binding.property, child);
    }
}

fn has_nested_maps(map: &ResultMap) -> bool {
    map.bindings.iter().any(|b| b.nested_map.is_some())
}

fn prefixed(prefix: &str, column: &str) -> String {
    if prefix.is_empty() {
        column.to_string()
    } else {
        format!("{prefix}{column}")
    }
}

fn strip_prefix_ignore_case<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    if name.len() >= prefix.len() && name[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(&name[prefix.len()..])
    } else {
        None
    }
}

/// One fully-read cursor row.
struct Row {
    columns: Vec<ColumnInfo>,
    values: Vec<Value>,
}

impl Row {
    fn read(cursor: &dyn ResultCursor) -> Result<Row> {
        let columns = cursor.columns().to_vec();
        let values = (0..columns.len())
            .map(|index| cursor.get(index, &Type::Unknown))
            .collect::<Result<Vec<_>>>()?;
        Ok(Row { columns, values })
    }

    fn index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.name.eq_ignore_ascii_case(name))
    }

    fn has_column(&self, name: &str) -> bool {
        self.index(name).is_some()
    }

    fn raw(&self, name: &str) -> Value {
        self.index(name)
            .map(|index| self.values[index].clone())
            .unwrap_or(Value::Null)
    }

    fn store_ty(&self, name: &str) -> Option<StoreType> {
        self.index(name).map(|index| self.columns[index].store_ty)
    }

    /// The row as an anonymous map, for statements without a result
    /// map.
    fn to_map(&self) -> Value {
        self.columns
            .iter()
            .zip(&self.values)
            .map(|(column, value)| (column.name.clone(), value.clone()))
            .collect()
    }
}
