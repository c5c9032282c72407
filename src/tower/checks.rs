//! Validation phases of the tower: primitive attributes, inheritance,
//! catch-all aggregation, enumerated subtypes, default typing, example
//! validation, and docstring references.

use std::collections::{HashMap, HashSet};

use chrono::format::{Item, StrftimeItems};
use regex::Regex;

use super::*;

impl Resolver {
    // ─── Phase 5: primitive attribute validation ──────────────────

    pub(super) fn validate_attributes(&mut self) {
        let checks = std::mem::take(&mut self.prim_checks);
        for (dt, path, line) in &checks {
            self.validate_primitive(dt, path, *line);
        }
    }

    fn validate_primitive(&mut self, dt: &DataType, path: &Path, line: u32) {
        match dt {
            DataType::Int32(a) => {
                self.validate_int_bounds("Int32", a, i32::MIN as i128, i32::MAX as i128, path, line)
            }
            DataType::Int64(a) => {
                self.validate_int_bounds("Int64", a, i64::MIN as i128, i64::MAX as i128, path, line)
            }
            DataType::UInt32(a) => {
                self.validate_int_bounds("UInt32", a, 0, u32::MAX as i128, path, line)
            }
            DataType::UInt64(a) => {
                self.validate_int_bounds("UInt64", a, 0, u64::MAX as i128, path, line)
            }
            DataType::Float32(a) | DataType::Float64(a) => {
                if let (Some(min), Some(max)) = (a.min_value, a.max_value)
                    && min > max
                {
                    self.diag("min_value must not exceed max_value.", path, line);
                }
            }
            DataType::String(a) => {
                if let (Some(min), Some(max)) = (a.min_length, a.max_length)
                    && min > max
                {
                    self.diag("min_length must not exceed max_length.", path, line);
                }
                if let Some(pattern) = &a.pattern
                    && let Err(e) = Regex::new(pattern)
                {
                    self.diag(
                        format!("Invalid regex pattern '{}': {}", pattern, e),
                        path,
                        line,
                    );
                }
            }
            DataType::Timestamp(a) => {
                if let Some(format) = &a.format
                    && StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
                {
                    self.diag(
                        format!("Invalid timestamp format '{}'.", format),
                        path,
                        line,
                    );
                }
            }
            DataType::List(list) => {
                if let (Some(min), Some(max)) = (list.min_items, list.max_items)
                    && min > max
                {
                    self.diag("min_items must not exceed max_items.", path, line);
                }
            }
            _ => {}
        }
    }

    fn validate_int_bounds(
        &mut self,
        name: &str,
        attrs: &IntAttrs,
        lo: i128,
        hi: i128,
        path: &Path,
        line: u32,
    ) {
        for (key, value) in [("min_value", attrs.min_value), ("max_value", attrs.max_value)] {
            if let Some(v) = value
                && !(lo..=hi).contains(&v)
            {
                self.diag(
                    format!("{} of {} must be between {} and {}.", key, name, lo, hi),
                    path,
                    line,
                );
            }
        }
        if let (Some(min), Some(max)) = (attrs.min_value, attrs.max_value)
            && min > max
        {
            self.diag("min_value must not exceed max_value.", path, line);
        }
    }

    // ─── Cycle detection over the inheritance relation ────────────

    pub(super) fn detect_cycles(&mut self) {
        let count = self.api.composite_count();
        let mut visited: HashSet<CompositeId> = HashSet::new();

        for i in 0..count {
            let start = CompositeId(i as u32);
            if visited.contains(&start) || self.cyclic.contains(&start) {
                continue;
            }
            let mut chain: Vec<CompositeId> = Vec::new();
            let mut cur = start;
            loop {
                if self.cyclic.contains(&cur) {
                    // Joins a known cycle; the diagnostic was already
                    // emitted for its members.
                    break;
                }
                if let Some(pos) = chain.iter().position(|&c| c == cur) {
                    for member in &chain[pos..] {
                        self.cyclic.insert(*member);
                    }
                    let meta = &self.meta[cur.0 as usize];
                    let (path, line) = (meta.path.clone(), meta.line);
                    self.diag("Unresolvable circular reference.", &path, line);
                    break;
                }
                if visited.contains(&cur) {
                    break;
                }
                chain.push(cur);
                match self.api.composite(cur).parent() {
                    Some(parent) => cur = parent,
                    None => break,
                }
            }
            for c in chain {
                visited.insert(c);
            }
        }

        // Parents-first order, used by every phase that folds over the
        // inheritance relation.
        let mut ordered = Vec::with_capacity(count);
        let mut emitted: HashSet<CompositeId> = HashSet::new();
        for i in 0..count {
            let mut stack = Vec::new();
            let mut cur = CompositeId(i as u32);
            while !emitted.contains(&cur) && !self.cyclic.contains(&cur) {
                stack.push(cur);
                match self.api.composite(cur).parent() {
                    Some(parent) => cur = parent,
                    None => break,
                }
            }
            while let Some(id) = stack.pop() {
                if emitted.insert(id) {
                    ordered.push(id);
                }
            }
        }
        self.topo = ordered;
    }

    // ─── Inheritance: field uniqueness and all_fields ─────────────

    pub(super) fn check_inheritance(&mut self) {
        let pending_of = self.pending_index();
        let pending = std::mem::take(&mut self.pending);

        for id in self.topo.clone() {
            let composite = self.api.composite(id);
            let own: Vec<(String, u32)> = {
                let fields = match composite {
                    Composite::Struct(s) => &s.fields,
                    Composite::Union(u) => &u.fields,
                };
                let p = &pending[pending_of[&id]];
                fields
                    .iter()
                    .map(|f| (f.name.clone(), field_line(&p.decl, &f.name)))
                    .collect()
            };
            let path = pending[pending_of[&id]].path.clone();

            // Uniqueness within the type
            let mut seen: HashSet<&str> = HashSet::new();
            for (field_name, line) in &own {
                if !seen.insert(field_name) {
                    self.diag(
                        format!("Field '{}' already defined.", field_name),
                        &path,
                        *line,
                    );
                }
            }

            // Uniqueness across the inheritance chain
            let ancestors: Vec<CompositeId> = self.api.ancestry(id).into_iter().skip(1).collect();
            for (field_name, line) in &own {
                for ancestor in &ancestors {
                    let ancestor = self.api.composite(*ancestor);
                    let ancestor_fields = match ancestor {
                        Composite::Struct(s) => &s.fields,
                        Composite::Union(u) => &u.fields,
                    };
                    if ancestor_fields.iter().any(|f| &f.name == field_name) {
                        let ancestor_name = ancestor.name().to_string();
                        self.diag(
                            format!(
                                "Field '{}' already defined in parent '{}'.",
                                field_name, ancestor_name
                            ),
                            &path,
                            *line,
                        );
                        break;
                    }
                }
            }

            // all_fields: parent's computed view, then own fields. The topo
            // order guarantees the parent is final by now.
            let parent_fields: Vec<Field> = match self.api.composite(id).parent() {
                Some(parent) => match self.api.composite(parent) {
                    Composite::Struct(s) => s.all_fields.clone(),
                    Composite::Union(u) => u.all_fields.clone(),
                },
                None => Vec::new(),
            };
            match self.api.composite_mut(id) {
                Composite::Struct(s) => {
                    s.all_fields = parent_fields;
                    let own = s.fields.clone();
                    s.all_fields.extend(own);
                }
                Composite::Union(u) => {
                    u.all_fields = parent_fields;
                    let own = u.fields.clone();
                    u.all_fields.extend(own);
                }
            }
        }

        self.pending = pending;
    }

    // ─── Union catch-all aggregation ──────────────────────────────

    pub(super) fn aggregate_catch_alls(&mut self) {
        let pending_of = self.pending_index();
        let pending = std::mem::take(&mut self.pending);

        for id in self.topo.clone() {
            let Composite::Union(u) = self.api.composite(id) else {
                continue;
            };
            let name = u.name.clone();
            let own: Vec<String> = u
                .fields
                .iter()
                .filter(|f| f.catch_all)
                .map(|f| f.name.clone())
                .collect();
            let parent_info = u.parent.map(|p| match self.api.composite(p) {
                Composite::Union(parent) => (parent.name.clone(), parent.catch_all.clone()),
                Composite::Struct(_) => unreachable!("kind-checked at resolution"),
            });
            let p = &pending[pending_of[&id]];
            let path = p.path.clone();

            if own.len() > 1 {
                let line = field_line(&p.decl, &own[1]);
                self.diag("Only one catch-all tag per union.", &path, line);
            }
            let inherited = parent_info.as_ref().and_then(|(_, c)| c.clone());
            if let (Some((parent_name, Some(_))), Some(first_own)) =
                (parent_info.as_ref(), own.first())
            {
                let line = field_line(&p.decl, first_own);
                self.diag(
                    format!(
                        "Subtype '{}' cannot declare a catch-all tag because parent '{}' already declared a catch-all tag.",
                        name, parent_name
                    ),
                    &path,
                    line,
                );
            }

            let resolved = own.first().cloned().or(inherited);
            match self.api.composite_mut(id) {
                Composite::Union(u) => u.catch_all = resolved,
                Composite::Struct(_) => unreachable!(),
            }
        }

        self.pending = pending;
    }

    // ─── Enumerated-subtype validation ────────────────────────────

    pub(super) fn validate_enumerated_subtypes(&mut self) {
        let pending_of = self.pending_index();
        let pending = std::mem::take(&mut self.pending);
        let raw = std::mem::take(&mut self.raw_subtypes);

        // Direct struct children by parent, in declaration order.
        let mut children: HashMap<CompositeId, Vec<(CompositeId, String)>> = HashMap::new();
        for i in 0..self.api.composite_count() {
            let id = CompositeId(i as u32);
            if let Composite::Struct(s) = self.api.composite(id)
                && let Some(parent) = s.parent
            {
                children
                    .entry(parent)
                    .or_default()
                    .push((id, s.name.clone()));
            }
        }

        for (&id, (catch_all, entries)) in &raw {
            let p = &pending[pending_of[&id]];
            let path = p.path.clone();
            let owner_name = self.api.composite(id).name().to_string();
            let decl_line = self.meta[id.0 as usize].line;

            let mut seen_children: HashSet<CompositeId> = HashSet::new();
            let mut seen_tags: HashSet<String> = HashSet::new();
            let mut tags: Vec<(String, CompositeId)> = Vec::new();

            for (tag, dt, line) in entries {
                let child = match dt {
                    DataType::Struct(child) => *child,
                    _ => {
                        self.diag(
                            format!("Enumerated subtype '{}' must be a struct.", tag),
                            &path,
                            *line,
                        );
                        continue;
                    }
                };
                let child_name = self.api.composite(child).name().to_string();
                if self.api.composite(child).parent() != Some(id) {
                    self.diag(
                        format!("'{}' is not a subtype of '{}'.", child_name, owner_name),
                        &path,
                        *line,
                    );
                    continue;
                }
                if !seen_children.insert(child) {
                    self.diag(
                        format!("Subtype '{}' can only be specified once.", child_name),
                        &path,
                        *line,
                    );
                    continue;
                }
                if !seen_tags.insert(tag.clone()) {
                    self.diag(
                        format!("Subtype tag '{}' can only be specified once.", tag),
                        &path,
                        *line,
                    );
                    continue;
                }
                self.check_tag_collisions(id, &owner_name, tag, &raw, &path, *line);
                tags.push((tag.clone(), child));
            }

            // The block must be a partition: every concrete direct subtype
            // appears exactly once.
            if let Some(direct) = children.get(&id) {
                for (child_id, child_name) in direct {
                    if !seen_children.contains(child_id) {
                        self.diag(
                            format!(
                                "Enumerated subtypes of '{}' are missing '{}'.",
                                owner_name, child_name
                            ),
                            &path,
                            decl_line,
                        );
                    }
                }
            }

            match self.api.composite_mut(id) {
                Composite::Struct(s) => {
                    s.subtypes = Some(EnumeratedSubtypes {
                        catch_all: *catch_all,
                        tags,
                    });
                }
                Composite::Union(_) => unreachable!("subtype blocks only parse inside structs"),
            }
        }

        // Tree shape: once a chain enumerates subtypes, every non-leaf link
        // must keep enumerating, and a link that stops seals the tree.
        for i in 0..self.api.composite_count() {
            let id = CompositeId(i as u32);
            let Composite::Struct(s) = self.api.composite(id) else {
                continue;
            };
            let Some(parent) = s.parent else {
                continue;
            };
            if self.cyclic.contains(&id) || self.cyclic.contains(&parent) {
                continue;
            }
            let name = s.name.clone();
            let parent_name = self.api.composite(parent).name().to_string();
            let parent_enumerates = raw.contains_key(&parent);
            let meta = &self.meta[id.0 as usize];
            let (path, line) = (meta.path.clone(), meta.line);

            if raw.contains_key(&id) && !parent_enumerates {
                self.diag(
                    format!(
                        "'{}' cannot enumerate subtypes if parent '{}' does not.",
                        name, parent_name
                    ),
                    &path,
                    line,
                );
            } else if !parent_enumerates {
                let sealed_tree = self
                    .api
                    .ancestry(parent)
                    .into_iter()
                    .any(|a| raw.contains_key(&a));
                if sealed_tree {
                    self.diag(
                        format!(
                            "'{}' cannot be extended because it does not enumerate subtypes.",
                            parent_name
                        ),
                        &path,
                        line,
                    );
                }
            }
        }

        self.raw_subtypes = raw;
        self.pending = pending;
    }

    /// A subtype tag must not collide with a field anywhere in the chain,
    /// nor with an ancestor's own tags.
    fn check_tag_collisions(
        &mut self,
        id: CompositeId,
        owner_name: &str,
        tag: &str,
        raw: &BTreeMap<CompositeId, RawSubtypes>,
        path: &Path,
        line: u32,
    ) {
        let own_conflict = match self.api.composite(id) {
            Composite::Struct(s) => s.fields.iter().any(|f| f.name == tag),
            Composite::Union(_) => false,
        };
        if own_conflict {
            self.diag(
                format!(
                    "Subtype tag '{}' already defined on '{}' as a field.",
                    tag, owner_name
                ),
                path,
                line,
            );
            return;
        }
        for ancestor in self.api.ancestry(id).into_iter().skip(1) {
            let composite = self.api.composite(ancestor);
            let ancestor_name = composite.name().to_string();
            let field_conflict = match composite {
                Composite::Struct(s) => s.fields.iter().any(|f| f.name == tag),
                Composite::Union(u) => u.fields.iter().any(|f| f.name == tag),
            };
            let tag_conflict = raw
                .get(&ancestor)
                .is_some_and(|(_, entries)| entries.iter().any(|(t, _, _)| t == tag));
            if field_conflict || tag_conflict {
                self.diag(
                    format!(
                        "Subtype tag '{}' already defined in parent '{}'.",
                        tag, ancestor_name
                    ),
                    path,
                    line,
                );
                return;
            }
        }
    }

    // ─── Default value typing ─────────────────────────────────────

    pub(super) fn type_check_defaults(&mut self) {
        let pending = std::mem::take(&mut self.pending);

        for p in &pending {
            let PendingDecl::Struct(decl) = &p.decl else {
                continue;
            };
            for field_decl in &decl.fields {
                if field_decl.default.is_none() {
                    continue;
                }
                let field = match self.api.composite(p.id) {
                    Composite::Struct(s) => {
                        s.fields.iter().find(|f| f.name == field_decl.name).cloned()
                    }
                    Composite::Union(_) => None,
                };
                let Some(field) = field else { continue };
                let Some(default) = &field.default else {
                    continue;
                };
                match check_literal(&self.api, &field.data_type, default) {
                    Ok(normalized) => {
                        if let Composite::Struct(s) = self.api.composite_mut(p.id)
                            && let Some(f) = s.fields.iter_mut().find(|f| f.name == field_decl.name)
                        {
                            f.default = Some(normalized);
                        }
                    }
                    Err(msg) => self.diag(msg, &p.path, field_decl.line),
                }
            }
        }

        // Normalization touched own fields only; rebuild the inherited
        // views so all_fields stays the exact concatenation.
        for id in self.topo.clone() {
            let parent_fields: Vec<Field> = match self.api.composite(id).parent() {
                Some(parent) => match self.api.composite(parent) {
                    Composite::Struct(s) => s.all_fields.clone(),
                    Composite::Union(u) => u.all_fields.clone(),
                },
                None => Vec::new(),
            };
            match self.api.composite_mut(id) {
                Composite::Struct(s) => {
                    s.all_fields = parent_fields;
                    let own = s.fields.clone();
                    s.all_fields.extend(own);
                }
                Composite::Union(u) => {
                    u.all_fields = parent_fields;
                    let own = u.fields.clone();
                    u.all_fields.extend(own);
                }
            }
        }

        self.pending = pending;
    }

    // ─── Example validation ───────────────────────────────────────

    pub(super) fn validate_examples(&mut self) {
        let pending = std::mem::take(&mut self.pending);

        for p in &pending {
            let PendingDecl::Struct(decl) = &p.decl else {
                continue;
            };
            if decl.examples.is_empty() {
                continue;
            }
            let (owner_name, all_fields) = match self.api.composite(p.id) {
                Composite::Struct(s) => (s.name.clone(), s.all_fields.clone()),
                Composite::Union(_) => continue,
            };

            for example in &decl.examples {
                let mut present: HashSet<&str> = HashSet::new();
                for (entry_name, value) in &example.entries {
                    if !present.insert(entry_name) {
                        self.diag(
                            format!("Example entry '{}' specified more than once.", entry_name),
                            &p.path,
                            example.line,
                        );
                        continue;
                    }
                    let Some(field) = all_fields.iter().find(|f| &f.name == entry_name) else {
                        self.diag(
                            format!(
                                "Example entry '{}' is not a field of '{}'.",
                                entry_name, owner_name
                            ),
                            &p.path,
                            example.line,
                        );
                        continue;
                    };
                    let underlying = match &field.data_type {
                        DataType::Nullable(inner) => inner.as_ref(),
                        dt => dt,
                    };
                    if matches!(underlying, DataType::Struct(_)) {
                        // A nullable struct field may still be exemplified
                        // as absent.
                        if matches!(value, ast::LiteralNode::Null) && field.is_optional() {
                            continue;
                        }
                        self.diag(
                            format!(
                                "Example entry '{}' cannot exemplify a composite type.",
                                entry_name
                            ),
                            &p.path,
                            example.line,
                        );
                        continue;
                    }
                    // Values check as wire instances: the example is a
                    // structural instance of the struct.
                    let json = literal_of(value).to_json();
                    if let Err(e) =
                        crate::wire::check_value(&self.api, &field.data_type, &json, true)
                    {
                        self.diag(
                            format!("Example entry '{}': {}.", entry_name, e),
                            &p.path,
                            example.line,
                        );
                    }
                }

                // Required fields: neither optional nor defaulted.
                for field in &all_fields {
                    if field.is_optional() || field.has_default() {
                        continue;
                    }
                    if !example.entries.iter().any(|(n, _)| n == &field.name) {
                        self.diag(
                            format!(
                                "Example '{}' is missing field '{}'.",
                                example.label, field.name
                            ),
                            &p.path,
                            example.line,
                        );
                    }
                }
            }
        }

        self.pending = pending;
    }

    // ─── Docstring reference resolution ───────────────────────────

    pub(super) fn resolve_doc_references(&mut self) {
        let doc_ref = Regex::new(r":(field|route|type|val|link):`([^`]+)`")
            .expect("doc reference pattern is valid");

        // Composite and field docs
        let pending = std::mem::take(&mut self.pending);
        for p in &pending {
            let (type_doc, field_docs, field_names) = match self.api.composite(p.id) {
                Composite::Struct(s) => (
                    s.doc.clone(),
                    s.fields
                        .iter()
                        .filter_map(|f| f.doc.clone())
                        .collect::<Vec<_>>(),
                    s.all_fields.iter().map(|f| f.name.clone()).collect::<Vec<_>>(),
                ),
                Composite::Union(u) => (
                    u.doc.clone(),
                    u.fields
                        .iter()
                        .filter_map(|f| f.doc.clone())
                        .collect::<Vec<_>>(),
                    u.all_fields.iter().map(|f| f.name.clone()).collect::<Vec<_>>(),
                ),
            };
            let mut tag_names: Vec<String> = field_names;
            if let Composite::Struct(s) = self.api.composite(p.id)
                && let Some(subtypes) = &s.subtypes
            {
                tag_names.extend(subtypes.tags.iter().map(|(t, _)| t.clone()));
            }

            let line = self.meta[p.id.0 as usize].line;
            for doc in type_doc.iter().chain(field_docs.iter()) {
                self.check_doc_markers(doc, &p.ns, Some(&tag_names), &p.path, line, &doc_ref);
            }
        }
        self.pending = pending;

        // Route docs
        let routes = std::mem::take(&mut self.routes);
        for r in &routes {
            if let Some(doc) = &r.decl.doc {
                self.check_doc_markers(doc, &r.ns, None, &r.path, r.decl.line, &doc_ref);
            }
        }
        self.routes = routes;
    }

    fn check_doc_markers(
        &mut self,
        doc: &str,
        ns: &str,
        field_scope: Option<&[String]>,
        path: &Path,
        line: u32,
        doc_ref: &Regex,
    ) {
        let mut missing: Vec<String> = Vec::new();
        for captures in doc_ref.captures_iter(doc) {
            let role = &captures[1];
            let target = &captures[2];
            let namespace = &self.api.namespaces[ns];
            let resolved = match role {
                "field" => match field_scope {
                    Some(fields) => fields.iter().any(|f| f == target),
                    // Field references outside a composite resolve lazily
                    // per generator; nothing to check here.
                    None => true,
                },
                "type" => namespace.data_types.contains_key(target),
                "route" => namespace.routes.iter().any(|r| r.name == target),
                _ => true,
            };
            if !resolved {
                missing.push(format!(
                    "Documentation references unknown {} '{}'.",
                    role, target
                ));
            }
        }
        for msg in missing {
            self.diag(msg, path, line);
        }
    }

    // ─── Helpers ──────────────────────────────────────────────────

    fn pending_index(&self) -> HashMap<CompositeId, usize> {
        self.pending
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id, i))
            .collect()
    }
}

/// Line of a named field within a pending declaration.
fn field_line(decl: &PendingDecl, field_name: &str) -> u32 {
    match decl {
        PendingDecl::Struct(s) => s
            .fields
            .iter()
            .find(|f| f.name == field_name)
            .map(|f| f.line)
            .unwrap_or(s.line),
        PendingDecl::Union(u) => u
            .fields
            .iter()
            .find(|f| f.name() == field_name)
            .map(|f| f.line())
            .unwrap_or(u.line),
    }
}

/// Check a literal against a resolved type, normalizing where the grammar is
/// looser than the type (integer literals for float fields). Returns the
/// literal to store, or an error message.
pub(crate) fn check_literal(
    api: &Api,
    data_type: &DataType,
    literal: &Literal,
) -> Result<Literal, String> {
    match data_type {
        DataType::Nullable(inner) => match literal {
            Literal::Null => Ok(Literal::Null),
            other => check_literal(api, inner, other),
        },
        DataType::Boolean => match literal {
            Literal::Bool(b) => Ok(Literal::Bool(*b)),
            _ => Err(invalid(api, data_type)),
        },
        DataType::Int32(a) => check_int(api, data_type, a, i32::MIN as i128, i32::MAX as i128, literal),
        DataType::Int64(a) => check_int(api, data_type, a, i64::MIN as i128, i64::MAX as i128, literal),
        DataType::UInt32(a) => check_int(api, data_type, a, 0, u32::MAX as i128, literal),
        DataType::UInt64(a) => check_int(api, data_type, a, 0, u64::MAX as i128, literal),
        DataType::Float32(a) | DataType::Float64(a) => {
            let value = match literal {
                Literal::Float(v) => *v,
                Literal::Int(n) => *n as f64,
                _ => return Err(invalid(api, data_type)),
            };
            if a.min_value.is_some_and(|min| value < min)
                || a.max_value.is_some_and(|max| value > max)
            {
                return Err(format!(
                    "Value {} is out of range for {}.",
                    value,
                    data_type.describe(api)
                ));
            }
            Ok(Literal::Float(value))
        }
        DataType::String(a) => match literal {
            Literal::Str(s) => {
                let len = s.chars().count() as u64;
                if a.min_length.is_some_and(|min| len < min)
                    || a.max_length.is_some_and(|max| len > max)
                {
                    return Err(format!("Value '{}' is out of range for String.", s));
                }
                Ok(Literal::Str(s.clone()))
            }
            _ => Err(invalid(api, data_type)),
        },
        DataType::Timestamp(_) => match literal {
            Literal::Str(s) => Ok(Literal::Str(s.clone())),
            _ => Err(invalid(api, data_type)),
        },
        DataType::Union(id) => match literal {
            Literal::Tag(tag) => {
                let union = api
                    .composite(*id)
                    .as_union()
                    .expect("union handle resolves to a union");
                let is_void_tag = union
                    .all_fields
                    .iter()
                    .any(|f| &f.name == tag && f.data_type == DataType::Symbol);
                if is_void_tag {
                    Ok(Literal::Tag(tag.clone()))
                } else {
                    Err(format!(
                        "Tag '{}' is not a void variant of union '{}'.",
                        tag, union.name
                    ))
                }
            }
            _ => Err(invalid(api, data_type)),
        },
        _ => Err(invalid(api, data_type)),
    }
}

fn check_int(
    api: &Api,
    data_type: &DataType,
    attrs: &IntAttrs,
    lo: i128,
    hi: i128,
    literal: &Literal,
) -> Result<Literal, String> {
    let Literal::Int(n) = literal else {
        return Err(invalid(api, data_type));
    };
    let lo = attrs.min_value.map_or(lo, |min| min.max(lo));
    let hi = attrs.max_value.map_or(hi, |max| max.min(hi));
    if !(lo..=hi).contains(n) {
        return Err(format!(
            "Value {} is out of range for {}.",
            n,
            data_type.describe(api)
        ));
    }
    Ok(Literal::Int(*n))
}

fn invalid(api: &Api, data_type: &DataType) -> String {
    format!("Invalid value for type '{}'.", data_type.describe(api))
}
