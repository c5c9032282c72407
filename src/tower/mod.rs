//! The tower: multi-file syntax trees → linked, validated IR.
//!
//! `Tower::new(files).parse()` runs the whole pipeline as a pure call: lex
//! and parse every file, then resolve in phases. Diagnostics accumulate
//! within a phase and abort at the phase boundary, because later phases
//! presuppose the invariants the earlier ones establish. Input files are
//! sorted by path first so resolution is independent of argument order.

mod checks;

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, warn};

use crate::error::{Diagnostic, InvalidSpec};
use crate::ir::{
    Api, Composite, CompositeId, DataType, EnumeratedSubtypes, Example, Field, FloatAttrs,
    IntAttrs, ListType, Literal, Namespace, Route, StringAttrs, Struct, TimestampAttrs, Union,
};
use crate::parser::{self, ast};

/// Reserved builtin type names. `Nullable` is spelled with the postfix `?`.
const RESERVED_TYPE_NAMES: &[&str] = &[
    "Void", "Any", "Bool", "Boolean", "Int32", "Int64", "UInt32", "UInt64", "Float32", "Float64",
    "String", "Binary", "Timestamp", "List",
];

// ─── Public entry point ──────────────────────────────────────────────

/// Owns the input file set and drives resolution.
pub struct Tower {
    files: Vec<(PathBuf, String)>,
}

impl Tower {
    pub fn new(files: impl IntoIterator<Item = (PathBuf, String)>) -> Self {
        let mut files: Vec<(PathBuf, String)> = files.into_iter().collect();
        files.sort_by(|a, b| a.0.cmp(&b.0));
        Self { files }
    }

    /// Parse and resolve every file into a single validated `Api`.
    pub fn parse(&self) -> Result<Api, InvalidSpec> {
        let start = Instant::now();
        let mut resolver = Resolver::default();

        // Frontend: the parser recovers per declaration, so every file is
        // fully read before any error aborts the pipeline.
        let mut trees: Vec<(PathBuf, Vec<ast::Decl>)> = Vec::new();
        for (path, source) in &self.files {
            let (decls, errors) = parser::parse(source);
            if !errors.is_empty() {
                warn!(
                    path = %path.display(),
                    errors = errors.len(),
                    "Recovered from frontend errors"
                );
            }
            for e in errors {
                resolver.diag(e.msg, path, e.line);
            }
            trees.push((path.clone(), decls));
        }
        resolver.check_phase()?;

        resolver.collect_namespaces(&trees);
        resolver.check_phase()?;

        resolver.register_declarations(&trees);
        resolver.check_phase()?;

        resolver.link_imports(&trees);
        resolver.check_phase()?;

        resolver.resolve_type_refs();
        resolver.check_phase()?;

        resolver.validate_attributes();
        resolver.check_phase()?;

        resolver.detect_cycles();
        resolver.check_phase()?;

        resolver.check_inheritance();
        resolver.check_phase()?;

        resolver.aggregate_catch_alls();
        resolver.check_phase()?;

        resolver.validate_enumerated_subtypes();
        resolver.check_phase()?;

        resolver.type_check_defaults();
        resolver.check_phase()?;

        resolver.validate_examples();
        resolver.check_phase()?;

        resolver.resolve_doc_references();
        resolver.check_phase()?;

        let api = resolver.api;
        info!(
            files = self.files.len(),
            namespaces = api.namespaces.len(),
            data_types = api.composite_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Spec resolved"
        );
        Ok(api)
    }
}

// ─── Resolver state ──────────────────────────────────────────────────

#[derive(Debug)]
enum Entry {
    Composite(CompositeId),
    Alias(usize),
}

#[derive(Debug, Clone)]
enum AliasState {
    Unresolved,
    InProgress,
    Resolved(DataType),
    Failed,
}

struct AliasDef {
    ns: String,
    type_ref: ast::TypeRef,
    path: PathBuf,
    line: u32,
    state: AliasState,
}

/// Source location of each composite, parallel to the `Api` arena.
struct Meta {
    path: PathBuf,
    line: u32,
}

enum PendingDecl {
    Struct(ast::StructDecl),
    Union(ast::UnionDecl),
}

struct Pending {
    id: CompositeId,
    ns: String,
    path: PathBuf,
    decl: PendingDecl,
}

struct PendingRoute {
    ns: String,
    path: PathBuf,
    decl: ast::RouteDecl,
}

/// Unvalidated subtype entry: `(tag, resolved type, line)`.
type RawSubtypes = (bool, Vec<(String, DataType, u32)>);

#[derive(Default)]
struct Resolver {
    api: Api,
    diags: Vec<Diagnostic>,
    registry: HashMap<(String, String), Entry>,
    aliases: Vec<AliasDef>,
    meta: Vec<Meta>,
    pending: Vec<Pending>,
    routes: Vec<PendingRoute>,
    /// Primitive instantiations that carried arguments, for attribute
    /// validation
    prim_checks: Vec<(DataType, PathBuf, u32)>,
    raw_subtypes: BTreeMap<CompositeId, RawSubtypes>,
    /// Composites on an inheritance cycle; later phases skip them
    cyclic: std::collections::HashSet<CompositeId>,
    /// Parents-first order over the parent relation, cyclic members excluded
    topo: Vec<CompositeId>,
}

impl Resolver {
    fn diag(&mut self, msg: impl Into<String>, path: &Path, line: u32) {
        self.diags.push(Diagnostic::new(msg, path, line));
    }

    /// Phase boundary: raise every diagnostic collected so far, ordered by
    /// (path, line).
    fn check_phase(&mut self) -> Result<(), InvalidSpec> {
        if self.diags.is_empty() {
            return Ok(());
        }
        let mut diags = std::mem::take(&mut self.diags);
        diags.sort_by(|a, b| (&a.path, a.line).cmp(&(&b.path, b.line)));
        Err(InvalidSpec::new(diags))
    }

    // ─── Phase 1: namespace collection ────────────────────────────

    fn collect_namespaces(&mut self, trees: &[(PathBuf, Vec<ast::Decl>)]) {
        for (path, decls) in trees {
            let mut seen_namespace = false;
            for decl in decls {
                match decl {
                    ast::Decl::Namespace(ns_decl) if !seen_namespace => {
                        seen_namespace = true;
                        let ns = self
                            .api
                            .namespaces
                            .entry(ns_decl.name.clone())
                            .or_insert_with(|| Namespace {
                                name: ns_decl.name.clone(),
                                ..Namespace::default()
                            });
                        if let Some(doc) = &ns_decl.doc {
                            match &mut ns.doc {
                                Some(existing) => {
                                    existing.push('\n');
                                    existing.push_str(doc);
                                }
                                None => ns.doc = Some(doc.clone()),
                            }
                        }
                    }
                    ast::Decl::Namespace(ns_decl) => {
                        self.diag(
                            "Only one namespace declaration per file.",
                            path,
                            ns_decl.line,
                        );
                    }
                    other if !seen_namespace => {
                        self.diag(
                            "First declaration in a spec must be a namespace.",
                            path,
                            other.line(),
                        );
                        // Namespace-less declarations cannot be placed; stop
                        // reading this file.
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    /// Namespace the file's declarations belong to, per phase 1.
    fn file_namespace(decls: &[ast::Decl]) -> Option<String> {
        decls.iter().find_map(|d| match d {
            ast::Decl::Namespace(ns) => Some(ns.name.clone()),
            _ => None,
        })
    }

    // ─── Phase 2: declaration registration ────────────────────────

    fn register_declarations(&mut self, trees: &[(PathBuf, Vec<ast::Decl>)]) {
        for (path, decls) in trees {
            let Some(ns_name) = Self::file_namespace(decls) else {
                continue;
            };
            for decl in decls {
                match decl {
                    ast::Decl::Struct(s) => {
                        if !self.claim_name(&ns_name, &s.name, path, s.line) {
                            continue;
                        }
                        let id = self.api.alloc(Composite::Struct(Struct {
                            name: s.name.clone(),
                            namespace: ns_name.clone(),
                            doc: s.doc.clone(),
                            parent: None,
                            fields: Vec::new(),
                            all_fields: Vec::new(),
                            subtypes: None,
                            examples: BTreeMap::new(),
                        }));
                        self.meta.push(Meta {
                            path: path.clone(),
                            line: s.line,
                        });
                        self.registry
                            .insert((ns_name.clone(), s.name.clone()), Entry::Composite(id));
                        let ns = self.api.namespaces.get_mut(&ns_name).unwrap();
                        ns.data_types.insert(s.name.clone(), DataType::Struct(id));
                        ns.decl_order.push(s.name.clone());
                        self.pending.push(Pending {
                            id,
                            ns: ns_name.clone(),
                            path: path.clone(),
                            decl: PendingDecl::Struct(s.clone()),
                        });
                    }
                    ast::Decl::Union(u) => {
                        if !self.claim_name(&ns_name, &u.name, path, u.line) {
                            continue;
                        }
                        let id = self.api.alloc(Composite::Union(Union {
                            name: u.name.clone(),
                            namespace: ns_name.clone(),
                            doc: u.doc.clone(),
                            parent: None,
                            fields: Vec::new(),
                            all_fields: Vec::new(),
                            catch_all: None,
                        }));
                        self.meta.push(Meta {
                            path: path.clone(),
                            line: u.line,
                        });
                        self.registry
                            .insert((ns_name.clone(), u.name.clone()), Entry::Composite(id));
                        let ns = self.api.namespaces.get_mut(&ns_name).unwrap();
                        ns.data_types.insert(u.name.clone(), DataType::Union(id));
                        ns.decl_order.push(u.name.clone());
                        self.pending.push(Pending {
                            id,
                            ns: ns_name.clone(),
                            path: path.clone(),
                            decl: PendingDecl::Union(u.clone()),
                        });
                    }
                    ast::Decl::Alias(a) => {
                        if !self.claim_name(&ns_name, &a.name, path, a.line) {
                            continue;
                        }
                        self.aliases.push(AliasDef {
                            ns: ns_name.clone(),
                            type_ref: a.type_ref.clone(),
                            path: path.clone(),
                            line: a.line,
                            state: AliasState::Unresolved,
                        });
                        self.registry.insert(
                            (ns_name.clone(), a.name.clone()),
                            Entry::Alias(self.aliases.len() - 1),
                        );
                    }
                    ast::Decl::Route(r) => {
                        self.routes.push(PendingRoute {
                            ns: ns_name.clone(),
                            path: path.clone(),
                            decl: r.clone(),
                        });
                    }
                    ast::Decl::Namespace(_) | ast::Decl::Import(_) => {}
                }
            }
        }
    }

    fn claim_name(&mut self, ns: &str, name: &str, path: &Path, line: u32) -> bool {
        if RESERVED_TYPE_NAMES.contains(&name) {
            self.diag(
                format!("Symbol '{}' is a reserved type name.", name),
                path,
                line,
            );
            return false;
        }
        if self
            .registry
            .contains_key(&(ns.to_string(), name.to_string()))
        {
            self.diag(format!("Symbol '{}' already defined.", name), path, line);
            return false;
        }
        true
    }

    // ─── Phase 3: import linking ──────────────────────────────────

    fn link_imports(&mut self, trees: &[(PathBuf, Vec<ast::Decl>)]) {
        for (path, decls) in trees {
            let Some(ns_name) = Self::file_namespace(decls) else {
                continue;
            };
            for decl in decls {
                let ast::Decl::Import(import) = decl else {
                    continue;
                };
                if import.name == ns_name {
                    self.diag("Cannot import current namespace.", path, import.line);
                } else if !self.api.namespaces.contains_key(&import.name) {
                    self.diag(
                        format!("Namespace '{}' is not defined in any spec.", import.name),
                        path,
                        import.line,
                    );
                } else {
                    self.api
                        .namespaces
                        .get_mut(&ns_name)
                        .unwrap()
                        .imports
                        .insert(import.name.clone());
                }
            }
        }
    }

    // ─── Phase 4: type reference resolution ───────────────────────

    fn resolve_type_refs(&mut self) {
        // Aliases first so every later reference sees a settled state.
        for idx in 0..self.aliases.len() {
            self.resolve_alias(idx);
        }
        let alias_entries: Vec<(String, String, usize)> = self
            .registry
            .iter()
            .filter_map(|((ns, name), e)| match e {
                Entry::Alias(idx) => Some((ns.clone(), name.clone(), *idx)),
                Entry::Composite(_) => None,
            })
            .collect();
        for (ns, name, idx) in alias_entries {
            if let AliasState::Resolved(dt) = &self.aliases[idx].state {
                let dt = dt.clone();
                self.api
                    .namespaces
                    .get_mut(&ns)
                    .unwrap()
                    .data_types
                    .insert(name, dt);
            }
        }

        let pending = std::mem::take(&mut self.pending);
        for p in &pending {
            match &p.decl {
                PendingDecl::Struct(decl) => self.fill_struct(p, decl),
                PendingDecl::Union(decl) => self.fill_union(p, decl),
            }
        }
        self.pending = pending;

        let routes = std::mem::take(&mut self.routes);
        for r in &routes {
            self.fill_route(r);
        }
        self.routes = routes;
    }

    fn fill_struct(&mut self, p: &Pending, decl: &ast::StructDecl) {
        let parent = decl
            .extends
            .as_ref()
            .and_then(|r| self.resolve_parent_ref(&p.ns, r, &p.path, "struct"));

        let mut fields = Vec::new();
        for f in &decl.fields {
            let Some(data_type) = self.resolve_type_ref(&p.ns, &f.type_ref, &p.path) else {
                continue;
            };
            fields.push(Field {
                name: f.name.clone(),
                data_type,
                default: f.default.as_ref().map(literal_of),
                doc: f.doc.clone(),
                catch_all: false,
            });
        }

        let mut examples = BTreeMap::new();
        for ex in &decl.examples {
            examples.insert(
                ex.label.clone(),
                Example {
                    label: ex.label.clone(),
                    entries: ex
                        .entries
                        .iter()
                        .map(|(k, v)| (k.clone(), literal_of(v)))
                        .collect(),
                },
            );
        }

        if let Some(subtypes) = &decl.subtypes {
            let mut resolved = Vec::new();
            for entry in &subtypes.fields {
                if let Some(dt) = self.resolve_subtype_ref(&p.ns, &entry.type_ref, &p.path) {
                    resolved.push((entry.tag.clone(), dt, entry.line));
                }
            }
            self.raw_subtypes
                .insert(p.id, (subtypes.catch_all, resolved));
        }

        match self.api.composite_mut(p.id) {
            Composite::Struct(s) => {
                s.parent = parent;
                s.fields = fields;
                s.examples = examples;
            }
            Composite::Union(_) => unreachable!(),
        }
    }

    fn fill_union(&mut self, p: &Pending, decl: &ast::UnionDecl) {
        let parent = decl
            .extends
            .as_ref()
            .and_then(|r| self.resolve_parent_ref(&p.ns, r, &p.path, "union"));

        let mut fields = Vec::new();
        for f in &decl.fields {
            match f {
                ast::UnionFieldDecl::Void(v) => fields.push(Field {
                    name: v.name.clone(),
                    data_type: DataType::Symbol,
                    default: None,
                    doc: v.doc.clone(),
                    catch_all: v.catch_all,
                }),
                ast::UnionFieldDecl::Typed(t) => {
                    let Some(data_type) = self.resolve_type_ref(&p.ns, &t.type_ref, &p.path)
                    else {
                        continue;
                    };
                    fields.push(Field {
                        name: t.name.clone(),
                        data_type,
                        default: None,
                        doc: t.doc.clone(),
                        catch_all: false,
                    });
                }
            }
        }

        match self.api.composite_mut(p.id) {
            Composite::Union(u) => {
                u.parent = parent;
                u.fields = fields;
            }
            Composite::Struct(_) => unreachable!(),
        }
    }

    fn fill_route(&mut self, r: &PendingRoute) {
        let request = self.resolve_type_ref(&r.ns, &r.decl.request, &r.path);
        let response = self.resolve_type_ref(&r.ns, &r.decl.response, &r.path);
        let error = self.resolve_type_ref(&r.ns, &r.decl.error, &r.path);
        let (Some(request), Some(response), Some(error)) = (request, response, error) else {
            return;
        };
        self.api
            .namespaces
            .get_mut(&r.ns)
            .unwrap()
            .routes
            .push(Route {
                name: r.decl.name.clone(),
                request,
                response,
                error,
                attrs: r
                    .decl
                    .attrs
                    .iter()
                    .map(|(k, v)| (k.clone(), literal_of(v)))
                    .collect(),
                doc: r.decl.doc.clone(),
            });
    }

    fn resolve_alias(&mut self, idx: usize) {
        match self.aliases[idx].state {
            AliasState::Unresolved => {}
            _ => return,
        }
        self.aliases[idx].state = AliasState::InProgress;
        let ns = self.aliases[idx].ns.clone();
        let type_ref = self.aliases[idx].type_ref.clone();
        let path = self.aliases[idx].path.clone();
        match self.resolve_type_ref(&ns, &type_ref, &path) {
            Some(dt) => self.aliases[idx].state = AliasState::Resolved(dt),
            None => self.aliases[idx].state = AliasState::Failed,
        }
    }

    /// Resolve a type reference in the scope formed by the current
    /// namespace, its imports, and the builtin primitives. Pushes a
    /// diagnostic and returns `None` on failure.
    fn resolve_type_ref(
        &mut self,
        cur_ns: &str,
        r: &ast::TypeRef,
        path: &Path,
    ) -> Option<DataType> {
        let base = self.resolve_base(cur_ns, r, path, None)?;
        self.apply_nullable(base, r, path)
    }

    /// Like `resolve_type_ref` but with the enumerated-subtypes wording for
    /// unknown symbols.
    fn resolve_subtype_ref(
        &mut self,
        cur_ns: &str,
        r: &ast::TypeRef,
        path: &Path,
    ) -> Option<DataType> {
        let undefined = format!("Undefined subtype '{}'.", r.name);
        let base = self.resolve_base(cur_ns, r, path, Some(undefined))?;
        self.apply_nullable(base, r, path)
    }

    /// Resolve an `extends` reference to a composite handle, enforcing the
    /// nullable and kind rules for parents.
    fn resolve_parent_ref(
        &mut self,
        cur_ns: &str,
        r: &ast::TypeRef,
        path: &Path,
        kind: &str,
    ) -> Option<CompositeId> {
        if r.nullable {
            self.diag("Reference cannot be nullable.", path, r.line);
            return None;
        }
        let dt = self.resolve_base(cur_ns, r, path, None)?;
        if dt.is_nullable() {
            self.diag(
                format!("A {} cannot extend a nullable type.", kind),
                path,
                r.line,
            );
            return None;
        }
        let compatible = match (&dt, kind) {
            (DataType::Struct(_), "struct") | (DataType::Union(_), "union") => true,
            _ => false,
        };
        if !compatible {
            self.diag(
                format!("A {kind} can only extend another {kind}."),
                path,
                r.line,
            );
            return None;
        }
        dt.composite_id()
    }

    fn apply_nullable(
        &mut self,
        base: DataType,
        r: &ast::TypeRef,
        path: &Path,
    ) -> Option<DataType> {
        if !r.nullable {
            return Some(base);
        }
        if base.is_nullable() {
            self.diag(
                "Cannot mark reference to nullable type as nullable.",
                path,
                r.line,
            );
            return None;
        }
        if base.is_void() {
            self.diag("Void cannot be marked nullable.", path, r.line);
            return None;
        }
        Some(DataType::Nullable(Box::new(base)))
    }

    fn resolve_base(
        &mut self,
        cur_ns: &str,
        r: &ast::TypeRef,
        path: &Path,
        undefined_msg: Option<String>,
    ) -> Option<DataType> {
        // Builtins shadow nothing: their names are reserved at registration.
        if r.ns.is_none()
            && let Some(result) = self.resolve_builtin(cur_ns, r, path)
        {
            return result;
        }

        let target_ns = match &r.ns {
            None => cur_ns.to_string(),
            Some(q) if q == cur_ns => cur_ns.to_string(),
            Some(q) => {
                let imported = self
                    .api
                    .namespaces
                    .get(cur_ns)
                    .is_some_and(|ns| ns.imports.contains(q));
                if !imported {
                    self.diag(format!("Namespace '{}' is not imported.", q), path, r.line);
                    return None;
                }
                q.clone()
            }
        };

        let entry = self
            .registry
            .get(&(target_ns.clone(), r.name.clone()))
            .map(|e| match e {
                Entry::Composite(id) => Entry::Composite(*id),
                Entry::Alias(idx) => Entry::Alias(*idx),
            });
        match entry {
            None => {
                let msg = undefined_msg
                    .unwrap_or_else(|| format!("Symbol '{}' is undefined.", r.name));
                self.diag(msg, path, r.line);
                None
            }
            Some(Entry::Composite(id)) => {
                if r.has_args() {
                    self.diag(
                        "Attributes cannot be specified for instantiated type.",
                        path,
                        r.line,
                    );
                    return None;
                }
                Some(match self.api.composite(id) {
                    Composite::Struct(_) => DataType::Struct(id),
                    Composite::Union(_) => DataType::Union(id),
                })
            }
            Some(Entry::Alias(idx)) => {
                if r.has_args() {
                    self.diag(
                        "Attributes cannot be specified for instantiated type.",
                        path,
                        r.line,
                    );
                    return None;
                }
                match &self.aliases[idx].state {
                    AliasState::Resolved(dt) => Some(dt.clone()),
                    AliasState::Failed => None,
                    AliasState::InProgress => {
                        self.diag("Unresolvable circular reference.", path, r.line);
                        None
                    }
                    AliasState::Unresolved => {
                        self.resolve_alias(idx);
                        match &self.aliases[idx].state {
                            AliasState::Resolved(dt) => Some(dt.clone()),
                            _ => None,
                        }
                    }
                }
            }
        }
    }

    // ─── Builtin primitives ───────────────────────────────────────

    /// `Some(result)` when the name is a builtin; `None` otherwise.
    fn resolve_builtin(
        &mut self,
        cur_ns: &str,
        r: &ast::TypeRef,
        path: &Path,
    ) -> Option<Option<DataType>> {
        let dt = match r.name.as_str() {
            "Void" => self.no_args(r, path).map(|_| DataType::Void),
            "Any" => self.no_args(r, path).map(|_| DataType::Any),
            "Bool" | "Boolean" => self.no_args(r, path).map(|_| DataType::Boolean),
            "Binary" => self.no_args(r, path).map(|_| DataType::Binary),
            "Int32" => self.int_attrs(r, path).map(DataType::Int32),
            "Int64" => self.int_attrs(r, path).map(DataType::Int64),
            "UInt32" => self.int_attrs(r, path).map(DataType::UInt32),
            "UInt64" => self.int_attrs(r, path).map(DataType::UInt64),
            "Float32" => self.float_attrs(r, path).map(DataType::Float32),
            "Float64" => self.float_attrs(r, path).map(DataType::Float64),
            "String" => self.string_attrs(r, path).map(DataType::String),
            "Timestamp" => self.timestamp_attrs(r, path).map(DataType::Timestamp),
            "List" => self
                .list_type(cur_ns, r, path)
                .map(|l| DataType::List(Box::new(l))),
            _ => return None,
        };
        if let Some(dt) = &dt
            && r.has_args()
        {
            self.prim_checks.push((dt.clone(), path.to_path_buf(), r.line));
        }
        Some(dt)
    }

    fn no_args(&mut self, r: &ast::TypeRef, path: &Path) -> Option<()> {
        if r.has_args() {
            self.diag(
                format!("Type '{}' takes no arguments.", r.name),
                path,
                r.line,
            );
            None
        } else {
            Some(())
        }
    }

    fn reject_positional(&mut self, r: &ast::TypeRef, path: &Path) -> bool {
        if r.args.is_empty() {
            return true;
        }
        self.diag(
            format!("Type '{}' takes no positional arguments.", r.name),
            path,
            r.line,
        );
        false
    }

    fn int_attrs(&mut self, r: &ast::TypeRef, path: &Path) -> Option<IntAttrs> {
        if !self.reject_positional(r, path) {
            return None;
        }
        let mut attrs = IntAttrs::default();
        let mut ok = true;
        for (key, value) in &r.kwargs {
            let slot = match key.as_str() {
                "min_value" => &mut attrs.min_value,
                "max_value" => &mut attrs.max_value,
                _ => {
                    self.unknown_argument(r, key, path);
                    ok = false;
                    continue;
                }
            };
            match value {
                ast::LiteralNode::Int(n) => *slot = Some(*n),
                _ => {
                    self.diag(
                        format!("Argument '{}' must be an integer.", key),
                        path,
                        r.line,
                    );
                    ok = false;
                }
            }
        }
        ok.then_some(attrs)
    }

    fn float_attrs(&mut self, r: &ast::TypeRef, path: &Path) -> Option<FloatAttrs> {
        if !self.reject_positional(r, path) {
            return None;
        }
        let mut attrs = FloatAttrs::default();
        let mut ok = true;
        for (key, value) in &r.kwargs {
            let slot = match key.as_str() {
                "min_value" => &mut attrs.min_value,
                "max_value" => &mut attrs.max_value,
                _ => {
                    self.unknown_argument(r, key, path);
                    ok = false;
                    continue;
                }
            };
            match value {
                ast::LiteralNode::Float(v) => *slot = Some(*v),
                ast::LiteralNode::Int(n) => *slot = Some(*n as f64),
                _ => {
                    self.diag(format!("Argument '{}' must be a number.", key), path, r.line);
                    ok = false;
                }
            }
        }
        ok.then_some(attrs)
    }

    fn string_attrs(&mut self, r: &ast::TypeRef, path: &Path) -> Option<StringAttrs> {
        if !self.reject_positional(r, path) {
            return None;
        }
        let mut attrs = StringAttrs::default();
        let mut ok = true;
        for (key, value) in &r.kwargs {
            match (key.as_str(), value) {
                ("min_length", ast::LiteralNode::Int(n)) if *n >= 0 => {
                    attrs.min_length = Some(*n as u64);
                }
                ("max_length", ast::LiteralNode::Int(n)) if *n >= 0 => {
                    attrs.max_length = Some(*n as u64);
                }
                ("min_length" | "max_length", _) => {
                    self.diag(
                        format!("Argument '{}' must be a non-negative integer.", key),
                        path,
                        r.line,
                    );
                    ok = false;
                }
                ("pattern", ast::LiteralNode::Str(p)) => attrs.pattern = Some(p.clone()),
                ("pattern", _) => {
                    self.diag("Argument 'pattern' must be a string.", path, r.line);
                    ok = false;
                }
                _ => {
                    self.unknown_argument(r, key, path);
                    ok = false;
                }
            }
        }
        ok.then_some(attrs)
    }

    fn timestamp_attrs(&mut self, r: &ast::TypeRef, path: &Path) -> Option<TimestampAttrs> {
        let mut attrs = TimestampAttrs::default();
        let mut ok = true;
        for arg in &r.args {
            match arg {
                ast::TypeArg::Literal(ast::LiteralNode::Str(f)) if attrs.format.is_none() => {
                    attrs.format = Some(f.clone());
                }
                _ => {
                    self.diag(
                        "Timestamp takes a single format string argument.",
                        path,
                        r.line,
                    );
                    ok = false;
                }
            }
        }
        for (key, value) in &r.kwargs {
            match (key.as_str(), value) {
                ("format", ast::LiteralNode::Str(f)) if attrs.format.is_none() => {
                    attrs.format = Some(f.clone());
                }
                ("format", _) => {
                    self.diag("Argument 'format' must be a string.", path, r.line);
                    ok = false;
                }
                _ => {
                    self.unknown_argument(r, key, path);
                    ok = false;
                }
            }
        }
        ok.then_some(attrs)
    }

    fn list_type(&mut self, cur_ns: &str, r: &ast::TypeRef, path: &Path) -> Option<ListType> {
        let mut item = None;
        let mut ok = true;
        for arg in &r.args {
            match arg {
                ast::TypeArg::Type(item_ref) if item.is_none() => {
                    item = self.resolve_type_ref(cur_ns, item_ref, path);
                    if item.is_none() {
                        ok = false;
                    }
                }
                _ => {
                    self.diag("List takes a single data type argument.", path, r.line);
                    ok = false;
                }
            }
        }
        let mut min_items = None;
        let mut max_items = None;
        for (key, value) in &r.kwargs {
            match (key.as_str(), value) {
                ("min_items", ast::LiteralNode::Int(n)) if *n >= 0 => min_items = Some(*n as u64),
                ("max_items", ast::LiteralNode::Int(n)) if *n >= 0 => max_items = Some(*n as u64),
                ("min_items" | "max_items", _) => {
                    self.diag(
                        format!("Argument '{}' must be a non-negative integer.", key),
                        path,
                        r.line,
                    );
                    ok = false;
                }
                _ => {
                    self.unknown_argument(r, key, path);
                    ok = false;
                }
            }
        }
        let item = match item {
            Some(item) => item,
            None => {
                if ok {
                    self.diag("List requires a data type argument.", path, r.line);
                }
                return None;
            }
        };
        ok.then_some(ListType {
            item,
            min_items,
            max_items,
        })
    }

    fn unknown_argument(&mut self, r: &ast::TypeRef, key: &str, path: &Path) {
        self.diag(
            format!("Unknown argument '{}' to {}.", key, r.name),
            path,
            r.line,
        );
    }
}

/// Convert a raw literal node to its resolved IR form. Type checking
/// happens later, against the owning field's resolved type.
fn literal_of(node: &ast::LiteralNode) -> Literal {
    match node {
        ast::LiteralNode::Int(n) => Literal::Int(*n),
        ast::LiteralNode::Float(v) => Literal::Float(*v),
        ast::LiteralNode::Str(s) => Literal::Str(s.clone()),
        ast::LiteralNode::Bool(b) => Literal::Bool(*b),
        ast::LiteralNode::Null => Literal::Null,
        ast::LiteralNode::TagRef(t) => Literal::Tag(t.clone()),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[path = "tower_tests.rs"]
mod tests;
