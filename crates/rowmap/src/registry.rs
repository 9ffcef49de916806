use crate::convert::{Converter, ConverterRegistry};
use crate::mapping::{AutoMapping, ResultMap, ResultMapBuilder};
use crate::statement::{MappedStatement, StatementBuilder};
use crate::types::TypeDescriptor;

use indexmap::IndexMap;
use regex::Regex;
use rowmap_core::{err, Error, Result, StoreType, Type};
use rowmap_template::TemplateParser;
use std::sync::Arc;
use tracing::debug;

/// Engine-wide behavior switches.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Default policy for result maps that declare none.
    pub auto_mapping: AutoMapping,

    /// Ignore underscores when matching columns to properties.
    pub map_underscore_to_camel_case: bool,

    /// Defer every nested select, not only the ones flagged lazy.
    pub lazy_by_default: bool,

    /// Keep rows where no binding produced a non-null value.
    pub return_empty_rows: bool,

    /// Injection guard applied to every `${}` substitution result.
    pub substitution_guard: Option<Regex>,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            auto_mapping: AutoMapping::Partial,
            map_underscore_to_camel_case: false,
            lazy_by_default: false,
            return_empty_rows: false,
            substitution_guard: None,
        }
    }
}

/// The configuration layer: statements, result maps, fragments, type
/// descriptors, converters and settings.
///
/// Definitions may reference each other out of registration order:
/// unresolved references are queued and retried by [`Registry::finalize`],
/// which reports anything still unresolved as an incomplete-schema
/// error carrying the dependency chain. After finalization the
/// registry is immutable and shared.
#[derive(Debug, Default)]
pub struct Registry {
    statements: IndexMap<String, Arc<MappedStatement>>,
    result_maps: IndexMap<String, Arc<ResultMap>>,
    fragments: IndexMap<String, String>,
    types: IndexMap<String, Arc<TypeDescriptor>>,
    converters: ConverterRegistry,
    settings: Settings,

    pending_maps: Vec<ResultMapBuilder>,
    pending_statements: Vec<StatementBuilder>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn add_fragment(&mut self, id: &str, text: &str) {
        self.fragments.insert(id.to_string(), text.to_string());
    }

    pub fn add_type(&mut self, descriptor: TypeDescriptor) {
        self.types
            .insert(descriptor.name.clone(), Arc::new(descriptor));
    }

    pub fn add_converter(
        &mut self,
        ty: Type,
        store_ty: StoreType,
        converter: Arc<dyn Converter>,
    ) {
        self.converters.register(ty, store_ty, converter);
    }

    /// Registers a result map. A map extending a parent that is not
    /// registered yet is queued and resolved during finalization.
    pub fn add_result_map(&mut self, builder: ResultMapBuilder) {
        match &builder.extends {
            Some(parent_id) => match self.result_maps.get(parent_id.as_str()).cloned() {
                Some(parent) => {
                    let map = builder.build_extending(&parent);
                    self.result_maps.insert(map.id.clone(), Arc::new(map));
                }
                None => {
                    debug!(id = %builder.id, parent = %parent_id, "deferring result map");
                    self.pending_maps.push(builder);
                }
            },
            None => {
                let map = builder.build();
                self.result_maps.insert(map.id.clone(), Arc::new(map));
            }
        }
    }

    /// Registers a statement. The template is compiled during
    /// finalization, once every fragment it may include is available.
    pub fn add_statement(&mut self, builder: StatementBuilder) {
        self.pending_statements.push(builder);
    }

    /// Resolves everything queued, validates every cross-reference, and
    /// publishes the registry as immutable shared state.
    pub fn finalize(mut self) -> Result<Arc<Registry>> {
        self.resolve_pending_maps()?;
        self.compile_statements()?;
        self.check_references()?;
        Ok(Arc::new(self))
    }

    fn resolve_pending_maps(&mut self) -> Result<()> {
        loop {
            let mut still_pending = vec![];
            let mut progress = false;

            for builder in std::mem::take(&mut self.pending_maps) {
                let parent_id = builder.extends.clone().unwrap_or_default();
                match self.result_maps.get(parent_id.as_str()).cloned() {
                    Some(parent) => {
                        let map = builder.build_extending(&parent);
                        self.result_maps.insert(map.id.clone(), Arc::new(map));
                        progress = true;
                    }
                    None => still_pending.push(builder),
                }
            }

            self.pending_maps = still_pending;
            if self.pending_maps.is_empty() {
                return Ok(());
            }
            if !progress {
                break;
            }
        }

        // Walk the chain of queued dependents so the error names every
        // link, not just the first.
        let first = &self.pending_maps[0];
        let mut chain = vec![first.id.clone()];
        let mut missing = first.extends.clone().unwrap_or_default();
        while let Some(next) = self
            .pending_maps
            .iter()
            .find(|builder| builder.id == missing)
        {
            chain.push(next.id.clone());
            missing = next.extends.clone().unwrap_or_default();
        }

        Err(Error::incomplete_schema(
            format!("result map `{}`", chain.join("` -> `")),
            format!("result map `{missing}`"),
        ))
    }

    fn compile_statements(&mut self) -> Result<()> {
        let mut parser = TemplateParser::new();
        for (id, text) in &self.fragments {
            parser.add_fragment(id.clone(), text.clone());
        }

        for builder in std::mem::take(&mut self.pending_statements) {
            let id = builder.id.clone();
            let source = parser.parse(&builder.template).map_err(|cause| {
                Error::template_compile(format!("while compiling statement `{id}`")).context(cause)
            })?;
            debug!(statement = %id, dynamic = source.is_dynamic(), "compiled statement");
            self.statements.insert(id, Arc::new(builder.build(source)));
        }

        Ok(())
    }

    fn check_references(&self) -> Result<()> {
        for stmt in self.statements.values() {
            for map_id in &stmt.result_maps {
                if !self.result_maps.contains_key(map_id.as_str()) {
                    return Err(Error::incomplete_schema(
                        format!("statement `{}`", stmt.id),
                        format!("result map `{map_id}`"),
                    ));
                }
            }
        }

        for map in self.result_maps.values() {
            for binding in &map.bindings {
                if let Some(nested) = &binding.nested_map {
                    if !self.result_maps.contains_key(nested.as_str()) {
                        return Err(Error::incomplete_schema(
                            format!("result map `{}`", map.id),
                            format!("result map `{nested}`"),
                        ));
                    }
                }
                if let Some(select) = &binding.nested_select {
                    if !self.statements.contains_key(select.as_str()) {
                        return Err(Error::incomplete_schema(
                            format!("result map `{}`", map.id),
                            format!("statement `{select}`"),
                        ));
                    }
                }
            }
            if let Some(discriminator) = &map.discriminator {
                for target in discriminator.cases.values() {
                    if !self.result_maps.contains_key(target.as_str()) {
                        return Err(Error::incomplete_schema(
                            format!("result map `{}`", map.id),
                            format!("result map `{target}`"),
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    pub fn statement(&self, id: &str) -> Result<&Arc<MappedStatement>> {
        self.statements
            .get(id)
            .ok_or_else(|| err!("unknown statement `{id}`"))
    }

    pub fn result_map(&self, id: &str) -> Result<&Arc<ResultMap>> {
        self.result_maps
            .get(id)
            .ok_or_else(|| err!("unknown result map `{id}`"))
    }

    pub fn type_descriptor(&self, name: &str) -> Option<&Arc<TypeDescriptor>> {
        self.types.get(name)
    }

    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }
}
