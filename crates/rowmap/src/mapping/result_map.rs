use super::{Discriminator, FieldBinding};

/// Policy for columns with no explicit binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoMapping {
    /// Unmapped columns are ignored.
    None,
    /// Unmapped columns map at the top level only.
    #[default]
    Partial,
    /// Unmapped columns map recursively into nested result maps.
    Full,
}

/// A declarative mapping from result columns to one target type.
///
/// Built once at configuration time and immutable afterwards; the
/// identity and constructor index lists are precomputed at build time.
#[derive(Debug, Clone)]
pub struct ResultMap {
    pub id: String,
    pub type_name: String,
    pub bindings: Vec<FieldBinding>,
    pub discriminator: Option<Discriminator>,

    /// Per-map policy; `None` defers to the registry setting.
    pub auto_mapping: Option<AutoMapping>,

    id_indices: Vec<usize>,
    constructor_indices: Vec<usize>,
}

impl ResultMap {
    pub fn builder(id: &str, type_name: &str) -> ResultMapBuilder {
        ResultMapBuilder {
            id: id.to_string(),
            type_name: type_name.to_string(),
            bindings: vec![],
            discriminator: None,
            auto_mapping: None,
            extends: None,
        }
    }

    /// The bindings that participate in row identity.
    ///
    /// Falls back to every property binding when none is flagged.
    pub fn id_bindings(&self) -> impl Iterator<Item = &FieldBinding> {
        self.id_indices.iter().map(|i| &self.bindings[*i])
    }

    pub fn constructor_bindings(&self) -> impl Iterator<Item = &FieldBinding> {
        self.constructor_indices.iter().map(|i| &self.bindings[*i])
    }

    /// The non-constructor bindings, in declaration order.
    pub fn property_bindings(&self) -> impl Iterator<Item = &FieldBinding> {
        self.bindings.iter().filter(|b| !b.constructor)
    }

    /// Whether some binding explicitly claims this (unprefixed) column.
    pub fn maps_column(&self, column: &str) -> bool {
        self.bindings.iter().any(|b| {
            b.column
                .single()
                .is_some_and(|c| c.eq_ignore_ascii_case(column))
        }) || self.discriminator.as_ref().is_some_and(|d| {
            d.binding
                .column
                .single()
                .is_some_and(|c| c.eq_ignore_ascii_case(column))
        })
    }
}

#[derive(Debug, Clone)]
pub struct ResultMapBuilder {
    pub(crate) id: String,
    pub(crate) type_name: String,
    bindings: Vec<FieldBinding>,
    discriminator: Option<Discriminator>,
    auto_mapping: Option<AutoMapping>,
    pub(crate) extends: Option<String>,
}

impl ResultMapBuilder {
    pub fn binding(mut self, binding: FieldBinding) -> ResultMapBuilder {
        self.bindings.push(binding);
        self
    }

    pub fn discriminator(mut self, discriminator: Discriminator) -> ResultMapBuilder {
        self.discriminator = Some(discriminator);
        self
    }

    pub fn auto_mapping(mut self, policy: AutoMapping) -> ResultMapBuilder {
        self.auto_mapping = Some(policy);
        self
    }

    /// Inherit another result map's bindings. Resolution is deferred to
    /// registration, so the parent does not need to exist yet.
    pub fn extends(mut self, parent_id: &str) -> ResultMapBuilder {
        self.extends = Some(parent_id.to_string());
        self
    }

    pub fn build(self) -> ResultMap {
        finish(
            self.id,
            self.type_name,
            self.bindings,
            self.discriminator,
            self.auto_mapping,
        )
    }

    /// Builds with the parent's bindings folded in: parent bindings are
    /// appended after the child's, de-duplicated by property; parent
    /// constructor bindings are dropped when the child declares its
    /// own.
    pub(crate) fn build_extending(mut self, parent: &ResultMap) -> ResultMap {
        let child_has_constructor = self.bindings.iter().any(|b| b.constructor);

        for binding in &parent.bindings {
            if binding.constructor && child_has_constructor {
                continue;
            }
            let duplicate = self
                .bindings
                .iter()
                .any(|b| b.property == binding.property && b.constructor == binding.constructor);
            if !duplicate {
                self.bindings.push(binding.clone());
            }
        }

        if self.discriminator.is_none() {
            self.discriminator = parent.discriminator.clone();
        }

        self.extends = None;
        self.build()
    }
}

fn finish(
    id: String,
    type_name: String,
    bindings: Vec<FieldBinding>,
    discriminator: Option<Discriminator>,
    auto_mapping: Option<AutoMapping>,
) -> ResultMap {
    let mut id_indices: Vec<usize> = bindings
        .iter()
        .enumerate()
        .filter(|(_, b)| b.id)
        .map(|(i, _)| i)
        .collect();

    if id_indices.is_empty() {
        id_indices = bindings
            .iter()
            .enumerate()
            .filter(|(_, b)| !b.constructor)
            .map(|(i, _)| i)
            .collect();
    }

    let constructor_indices = bindings
        .iter()
        .enumerate()
        .filter(|(_, b)| b.constructor)
        .map(|(i, _)| i)
        .collect();

    ResultMap {
        id,
        type_name,
        bindings,
        discriminator,
        auto_mapping,
        id_indices,
        constructor_indices,
    }
}
