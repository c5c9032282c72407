//! Linked IR: the validated, fully resolved model of an API specification.
//!
//! The tower builds one `Api` per invocation; generators only ever read it.
//! Composite types (structs and unions) live in an arena owned by the `Api`
//! and are addressed by `CompositeId` handles, so parent and field edges can
//! form cycles and forward references without ownership gymnastics.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

// ─── Handles & arena ─────────────────────────────────────────────────

/// Opaque handle to a composite type in the `Api` arena.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompositeId(pub u32);

#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum Composite {
    Struct(Struct),
    Union(Union),
}

impl Composite {
    pub fn name(&self) -> &str {
        match self {
            Composite::Struct(s) => &s.name,
            Composite::Union(u) => &u.name,
        }
    }

    pub fn namespace(&self) -> &str {
        match self {
            Composite::Struct(s) => &s.namespace,
            Composite::Union(u) => &u.namespace,
        }
    }

    pub fn parent(&self) -> Option<CompositeId> {
        match self {
            Composite::Struct(s) => s.parent,
            Composite::Union(u) => u.parent,
        }
    }

    pub fn doc(&self) -> Option<&str> {
        match self {
            Composite::Struct(s) => s.doc.as_deref(),
            Composite::Union(u) => u.doc.as_deref(),
        }
    }

    pub fn as_struct(&self) -> Option<&Struct> {
        match self {
            Composite::Struct(s) => Some(s),
            Composite::Union(_) => None,
        }
    }

    pub fn as_union(&self) -> Option<&Union> {
        match self {
            Composite::Union(u) => Some(u),
            Composite::Struct(_) => None,
        }
    }
}

/// Root handle handed to code generators: all namespaces plus the composite
/// arena they index into.
#[derive(Serialize, Debug, Default, PartialEq)]
pub struct Api {
    pub namespaces: BTreeMap<String, Namespace>,
    composites: Vec<Composite>,
}

impl Api {
    pub fn composite(&self, id: CompositeId) -> &Composite {
        &self.composites[id.0 as usize]
    }

    pub(crate) fn composite_mut(&mut self, id: CompositeId) -> &mut Composite {
        &mut self.composites[id.0 as usize]
    }

    pub(crate) fn alloc(&mut self, composite: Composite) -> CompositeId {
        let id = CompositeId(self.composites.len() as u32);
        self.composites.push(composite);
        id
    }

    pub fn composite_count(&self) -> usize {
        self.composites.len()
    }

    /// Walk the parent chain from `id` upward, including `id` itself.
    pub fn ancestry(&self, id: CompositeId) -> Vec<CompositeId> {
        let mut chain = vec![id];
        let mut cur = id;
        while let Some(parent) = self.composite(cur).parent() {
            if chain.contains(&parent) {
                break; // guarded against by resolution, but never loop here
            }
            chain.push(parent);
            cur = parent;
        }
        chain
    }
}

// ─── Data types ──────────────────────────────────────────────────────

/// Constraint attributes for integer primitives.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct IntAttrs {
    pub min_value: Option<i128>,
    pub max_value: Option<i128>,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct FloatAttrs {
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct StringAttrs {
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    /// Validated to compile during resolution; stored as written.
    pub pattern: Option<String>,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct TimestampAttrs {
    /// strftime format string
    pub format: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ListType {
    pub item: DataType,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
}

/// The tagged sum of every type a field, route, or alias can resolve to.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum DataType {
    Boolean,
    Int32(IntAttrs),
    Int64(IntAttrs),
    UInt32(IntAttrs),
    UInt64(IntAttrs),
    Float32(FloatAttrs),
    Float64(FloatAttrs),
    String(StringAttrs),
    Binary,
    Timestamp(TimestampAttrs),
    Void,
    Any,
    /// Payload-less union variant type
    Symbol,
    List(Box<ListType>),
    Struct(CompositeId),
    Union(CompositeId),
    Nullable(Box<DataType>),
}

impl DataType {
    pub fn is_nullable(&self) -> bool {
        matches!(self, DataType::Nullable(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, DataType::Void)
    }

    /// The composite this type refers to, looking through `Nullable`.
    pub fn composite_id(&self) -> Option<CompositeId> {
        match self {
            DataType::Struct(id) | DataType::Union(id) => Some(*id),
            DataType::Nullable(inner) => inner.composite_id(),
            _ => None,
        }
    }

    /// Short name for diagnostics and type mapping.
    pub fn describe<'a>(&'a self, api: &'a Api) -> &'a str {
        match self {
            DataType::Boolean => "Boolean",
            DataType::Int32(_) => "Int32",
            DataType::Int64(_) => "Int64",
            DataType::UInt32(_) => "UInt32",
            DataType::UInt64(_) => "UInt64",
            DataType::Float32(_) => "Float32",
            DataType::Float64(_) => "Float64",
            DataType::String(_) => "String",
            DataType::Binary => "Binary",
            DataType::Timestamp(_) => "Timestamp",
            DataType::Void => "Void",
            DataType::Any => "Any",
            DataType::Symbol => "Symbol",
            DataType::List(_) => "List",
            DataType::Struct(id) | DataType::Union(id) => api.composite(*id).name(),
            DataType::Nullable(inner) => inner.describe(api),
        }
    }
}

// ─── Literals ────────────────────────────────────────────────────────

/// A resolved literal value: field defaults, route attributes, example
/// entries. `Tag` names a void variant of the field's union type.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i128),
    Float(f64),
    Str(String),
    Bool(bool),
    Null,
    Tag(String),
}

impl Literal {
    /// JSON representation used by the wire checker. Tags serialize as the
    /// compact string form of a union variant.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Literal::Int(n) => {
                if let Ok(v) = i64::try_from(*n) {
                    serde_json::Value::from(v)
                } else {
                    serde_json::Value::from(*n as u64)
                }
            }
            Literal::Float(v) => serde_json::Value::from(*v),
            Literal::Str(s) => serde_json::Value::from(s.clone()),
            Literal::Bool(b) => serde_json::Value::from(*b),
            Literal::Null => serde_json::Value::Null,
            Literal::Tag(t) => serde_json::Value::from(t.clone()),
        }
    }
}

// ─── Fields ──────────────────────────────────────────────────────────

/// A named member of a struct or union. Void union variants carry the
/// `Symbol` type and may be flagged as the catch-all.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
    pub default: Option<Literal>,
    pub doc: Option<String>,
    pub catch_all: bool,
}

impl Field {
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// True when the field's type is `Nullable`: the value may be absent.
    pub fn is_optional(&self) -> bool {
        self.data_type.is_nullable()
    }
}

// ─── Structs ─────────────────────────────────────────────────────────

/// The enumerated-subtypes relation of a struct: an ordered tagged
/// partition of its direct struct descendants.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EnumeratedSubtypes {
    /// Unknown tags may decode to the base struct in non-strict mode.
    pub catch_all: bool,
    pub tags: Vec<(String, CompositeId)>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Example {
    pub label: String,
    pub entries: Vec<(String, Literal)>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Struct {
    pub name: String,
    pub namespace: String,
    pub doc: Option<String>,
    pub parent: Option<CompositeId>,
    /// Own fields, in declaration order
    pub fields: Vec<Field>,
    /// Parent's `all_fields` followed by own fields; computed at resolution
    pub all_fields: Vec<Field>,
    pub subtypes: Option<EnumeratedSubtypes>,
    pub examples: BTreeMap<String, Example>,
}

impl Struct {
    pub fn has_enumerated_subtypes(&self) -> bool {
        self.subtypes.is_some()
    }

    /// True when any own field carries a docstring. Inherited fields do not
    /// count.
    pub fn has_documented_fields(&self) -> bool {
        self.fields.iter().any(|f| f.doc.is_some())
    }

    pub fn has_documented_type_or_fields(&self) -> bool {
        self.doc.is_some() || self.has_documented_fields()
    }
}

// ─── Unions ──────────────────────────────────────────────────────────

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Union {
    pub name: String,
    pub namespace: String,
    pub doc: Option<String>,
    pub parent: Option<CompositeId>,
    pub fields: Vec<Field>,
    pub all_fields: Vec<Field>,
    /// Name of the single catch-all tag, aggregated across the inheritance
    /// chain.
    pub catch_all: Option<String>,
}

impl Union {
    /// The catch-all variant, if any, looked up in `all_fields`.
    pub fn catch_all_field(&self) -> Option<&Field> {
        let name = self.catch_all.as_deref()?;
        self.all_fields.iter().find(|f| f.name == name)
    }

    pub fn has_documented_fields(&self) -> bool {
        self.fields.iter().any(|f| f.doc.is_some())
    }

    pub fn has_documented_type_or_fields(&self) -> bool {
        self.doc.is_some() || self.has_documented_fields()
    }
}

// ─── Routes ──────────────────────────────────────────────────────────

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Route {
    pub name: String,
    pub request: DataType,
    pub response: DataType,
    pub error: DataType,
    pub attrs: Vec<(String, Literal)>,
    pub doc: Option<String>,
}

// ─── Namespaces ──────────────────────────────────────────────────────

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct Namespace {
    pub name: String,
    pub doc: Option<String>,
    /// Every named type of the namespace: composites and resolved aliases
    pub data_types: BTreeMap<String, DataType>,
    /// Names of composite types in declaration order
    pub decl_order: Vec<String>,
    pub routes: Vec<Route>,
    pub imports: BTreeSet<String>,
}

impl Namespace {
    pub fn data_type_by_name(&self, name: &str) -> Option<&DataType> {
        self.data_types.get(name)
    }

    /// Composite types of this namespace in a topological order by
    /// structural dependency: parent before child, referent before referrer.
    /// Cross-namespace edges are ignored; in-namespace cycles are broken by
    /// declaration order.
    pub fn linearize_data_types(&self, api: &Api) -> Vec<CompositeId> {
        let ids: Vec<CompositeId> = self
            .decl_order
            .iter()
            .filter_map(|name| self.data_types.get(name).and_then(|dt| dt.composite_id()))
            .collect();
        let members: BTreeSet<CompositeId> = ids.iter().copied().collect();

        let mut ordered = Vec::with_capacity(ids.len());
        let mut visited: BTreeSet<CompositeId> = BTreeSet::new();
        let mut on_stack: BTreeSet<CompositeId> = BTreeSet::new();
        for id in &ids {
            Self::linearize_visit(api, *id, &members, &mut visited, &mut on_stack, &mut ordered);
        }
        ordered
    }

    fn linearize_visit(
        api: &Api,
        id: CompositeId,
        members: &BTreeSet<CompositeId>,
        visited: &mut BTreeSet<CompositeId>,
        on_stack: &mut BTreeSet<CompositeId>,
        ordered: &mut Vec<CompositeId>,
    ) {
        if visited.contains(&id) || on_stack.contains(&id) {
            return;
        }
        on_stack.insert(id);

        let mut deps: Vec<CompositeId> = Vec::new();
        let composite = api.composite(id);
        if let Some(parent) = composite.parent() {
            deps.push(parent);
        }
        let fields = match composite {
            Composite::Struct(s) => &s.fields,
            Composite::Union(u) => &u.fields,
        };
        for field in fields {
            Self::collect_composite_refs(&field.data_type, &mut deps);
        }

        for dep in deps {
            if members.contains(&dep) && dep != id {
                Self::linearize_visit(api, dep, members, visited, on_stack, ordered);
            }
        }

        on_stack.remove(&id);
        visited.insert(id);
        ordered.push(id);
    }

    fn collect_composite_refs(data_type: &DataType, out: &mut Vec<CompositeId>) {
        match data_type {
            DataType::Struct(id) | DataType::Union(id) => out.push(*id),
            DataType::Nullable(inner) => Self::collect_composite_refs(inner, out),
            DataType::List(list) => Self::collect_composite_refs(&list.item, out),
            _ => {}
        }
    }

    /// User-defined composites transitively reachable through this
    /// namespace's routes. Determines what the generated serializers must
    /// cover.
    pub fn distinct_route_io_data_types(&self, api: &Api) -> BTreeSet<CompositeId> {
        let mut reachable: BTreeSet<CompositeId> = BTreeSet::new();
        for route in &self.routes {
            for data_type in [&route.request, &route.response, &route.error] {
                Self::collect_reachable(api, data_type, &mut reachable);
            }
        }
        reachable
    }

    fn collect_reachable(api: &Api, data_type: &DataType, out: &mut BTreeSet<CompositeId>) {
        match data_type {
            DataType::Struct(id) | DataType::Union(id) => {
                if !out.insert(*id) {
                    return;
                }
                let composite = api.composite(*id);
                if let Some(parent) = composite.parent() {
                    Self::collect_reachable(api, &DataType::Struct(parent), out);
                }
                let fields = match composite {
                    Composite::Struct(s) => &s.all_fields,
                    Composite::Union(u) => &u.all_fields,
                };
                for field in fields {
                    Self::collect_reachable(api, &field.data_type, out);
                }
                if let Composite::Struct(s) = composite
                    && let Some(subtypes) = &s.subtypes
                {
                    for (_, child) in &subtypes.tags {
                        Self::collect_reachable(api, &DataType::Struct(*child), out);
                    }
                }
            }
            DataType::Nullable(inner) => Self::collect_reachable(api, inner, out),
            DataType::List(list) => Self::collect_reachable(api, &list.item, out),
            _ => {}
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[path = "ir_tests.rs"]
mod tests;
