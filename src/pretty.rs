//! Reference pretty-printer: resolved IR back to `.babel` source.
//!
//! The built-in generator. One file per namespace; re-parsing its output
//! yields a structurally equivalent IR, which is what the round-trip tests
//! lean on.

use crate::codegen::{Emitter, Generator, Output, TargetLanguage};
use crate::error::InvalidSpec;
use crate::ir::{Api, Composite, DataType, Field, Literal, Namespace, Route, Struct, Union};

// ─── Target language ─────────────────────────────────────────────────

/// Babel is its own target language: identifiers pass through untouched and
/// literals render in spec syntax.
#[derive(Default)]
pub struct BabelLanguage;

impl TargetLanguage for BabelLanguage {
    fn file_extension(&self) -> &'static str {
        ".babel"
    }

    fn format_variable(&self, name: &str) -> String {
        name.to_string()
    }

    fn format_class(&self, name: &str) -> String {
        name.to_string()
    }

    fn format_method(&self, name: &str) -> String {
        name.to_string()
    }

    fn format_type(&self, api: &Api, data_type: &DataType) -> String {
        // Unqualified view; the generator qualifies cross-namespace names
        // itself because it knows the emitting namespace.
        format_type_expr(api, data_type, None)
    }
}

// ─── Formatting helpers ──────────────────────────────────────────────

fn escape_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

fn quoted(s: &str) -> String {
    format!("\"{}\"", escape_str(s))
}

pub(crate) fn format_literal(literal: &Literal) -> String {
    match literal {
        Literal::Int(n) => n.to_string(),
        Literal::Float(v) => format!("{:?}", v),
        Literal::Str(s) => quoted(s),
        Literal::Bool(true) => "true".to_string(),
        Literal::Bool(false) => "false".to_string(),
        Literal::Null => "null".to_string(),
        Literal::Tag(t) => t.clone(),
    }
}

/// Render a `DataType` in spec syntax. `cur_ns` controls qualification:
/// composites outside it render as `ns.Name`.
pub(crate) fn format_type_expr(api: &Api, data_type: &DataType, cur_ns: Option<&str>) -> String {
    let mut args: Vec<String> = Vec::new();
    let base = match data_type {
        DataType::Boolean => "Boolean".to_string(),
        DataType::Void => "Void".to_string(),
        DataType::Any => "Any".to_string(),
        DataType::Symbol => "Symbol".to_string(),
        DataType::Binary => "Binary".to_string(),
        DataType::Int32(a) | DataType::Int64(a) | DataType::UInt32(a) | DataType::UInt64(a) => {
            if let Some(min) = a.min_value {
                args.push(format!("min_value={}", min));
            }
            if let Some(max) = a.max_value {
                args.push(format!("max_value={}", max));
            }
            data_type.describe(api).to_string()
        }
        DataType::Float32(a) | DataType::Float64(a) => {
            if let Some(min) = a.min_value {
                args.push(format!("min_value={:?}", min));
            }
            if let Some(max) = a.max_value {
                args.push(format!("max_value={:?}", max));
            }
            data_type.describe(api).to_string()
        }
        DataType::String(a) => {
            if let Some(min) = a.min_length {
                args.push(format!("min_length={}", min));
            }
            if let Some(max) = a.max_length {
                args.push(format!("max_length={}", max));
            }
            if let Some(pattern) = &a.pattern {
                args.push(format!("pattern={}", quoted(pattern)));
            }
            "String".to_string()
        }
        DataType::Timestamp(a) => {
            if let Some(format) = &a.format {
                args.push(quoted(format));
            }
            "Timestamp".to_string()
        }
        DataType::List(list) => {
            args.push(format_type_expr(api, &list.item, cur_ns));
            if let Some(min) = list.min_items {
                args.push(format!("min_items={}", min));
            }
            if let Some(max) = list.max_items {
                args.push(format!("max_items={}", max));
            }
            "List".to_string()
        }
        DataType::Struct(id) | DataType::Union(id) => {
            let composite = api.composite(*id);
            match cur_ns {
                Some(ns) if composite.namespace() != ns => {
                    format!("{}.{}", composite.namespace(), composite.name())
                }
                _ => composite.name().to_string(),
            }
        }
        DataType::Nullable(inner) => {
            return format!("{}?", format_type_expr(api, inner, cur_ns));
        }
    };
    if args.is_empty() {
        base
    } else {
        format!("{}({})", base, args.join(", "))
    }
}

// ─── Generator ───────────────────────────────────────────────────────

#[derive(Default)]
pub struct BabelGenerator;

impl Generator for BabelGenerator {
    fn generate(&mut self, api: &Api, output: &mut Output) -> Result<(), InvalidSpec> {
        for (name, ns) in &api.namespaces {
            output.output_to(format!("{}.babel", name), |e| {
                emit_namespace(e, api, ns);
            });
        }
        Ok(())
    }
}

fn emit_namespace(e: &mut Emitter, api: &Api, ns: &Namespace) {
    e.emit(&format!("namespace {}", ns.name));
    if let Some(doc) = &ns.doc {
        e.indent(|e| e.emit(&quoted(doc)));
    }

    for import in &ns.imports {
        e.emit_blank_line();
        e.emit(&format!("import {}", import));
    }

    // Aliases are the named types that are not composites of this
    // namespace; composites live in decl_order.
    for (name, data_type) in &ns.data_types {
        if ns.decl_order.contains(name) {
            continue;
        }
        e.emit_blank_line();
        e.emit(&format!(
            "alias {} = {}",
            name,
            format_type_expr(api, data_type, Some(&ns.name))
        ));
    }

    for name in &ns.decl_order {
        let Some(id) = ns.data_types.get(name).and_then(|dt| dt.composite_id()) else {
            continue;
        };
        e.emit_blank_line();
        match api.composite(id) {
            Composite::Struct(s) => emit_struct(e, api, ns, s),
            Composite::Union(u) => emit_union(e, api, ns, u),
        }
    }

    for route in &ns.routes {
        e.emit_blank_line();
        emit_route(e, api, ns, route);
    }
}

fn extends_suffix(api: &Api, ns: &Namespace, parent: Option<crate::ir::CompositeId>) -> String {
    match parent {
        Some(parent) => {
            let composite = api.composite(parent);
            if composite.namespace() == ns.name {
                format!(" extends {}", composite.name())
            } else {
                format!(" extends {}.{}", composite.namespace(), composite.name())
            }
        }
        None => String::new(),
    }
}

fn emit_field(e: &mut Emitter, api: &Api, ns: &Namespace, field: &Field) {
    let mut line = format!(
        "{} {}",
        field.name,
        format_type_expr(api, &field.data_type, Some(&ns.name))
    );
    if let Some(default) = &field.default {
        line.push_str(&format!(" = {}", format_literal(default)));
    }
    e.emit(&line);
    if let Some(doc) = &field.doc {
        e.indent(|e| e.emit(&quoted(doc)));
    }
}

fn emit_struct(e: &mut Emitter, api: &Api, ns: &Namespace, s: &Struct) {
    e.emit(&format!("struct {}{}", s.name, extends_suffix(api, ns, s.parent)));
    e.indent(|e| {
        if let Some(doc) = &s.doc {
            e.emit(&quoted(doc));
        }
        if let Some(subtypes) = &s.subtypes {
            e.emit(if subtypes.catch_all { "union*" } else { "union" });
            e.indent(|e| {
                for (tag, child) in &subtypes.tags {
                    let child_expr = format_type_expr(api, &DataType::Struct(*child), Some(&ns.name));
                    e.emit(&format!("{} {}", tag, child_expr));
                }
            });
        }
        for field in &s.fields {
            emit_field(e, api, ns, field);
        }
        for example in s.examples.values() {
            e.emit(&format!("example {}", example.label));
            e.indent(|e| {
                for (name, value) in &example.entries {
                    e.emit(&format!("{}={}", name, format_literal(value)));
                }
            });
        }
        // The grammar demands a body; a struct carrying nothing else gets
        // an empty docstring.
        if s.doc.is_none() && s.subtypes.is_none() && s.fields.is_empty() && s.examples.is_empty()
        {
            e.emit("\"\"");
        }
    });
}

fn emit_union(e: &mut Emitter, api: &Api, ns: &Namespace, u: &Union) {
    e.emit(&format!("union {}{}", u.name, extends_suffix(api, ns, u.parent)));
    e.indent(|e| {
        if let Some(doc) = &u.doc {
            e.emit(&quoted(doc));
        }
        for field in &u.fields {
            if field.data_type == DataType::Symbol {
                let star = if field.catch_all { "*" } else { "" };
                e.emit(&format!("{}{}", field.name, star));
                if let Some(doc) = &field.doc {
                    e.indent(|e| e.emit(&quoted(doc)));
                }
            } else {
                emit_field(e, api, ns, field);
            }
        }
        if u.doc.is_none() && u.fields.is_empty() {
            e.emit("\"\"");
        }
    });
}

fn emit_route(e: &mut Emitter, api: &Api, ns: &Namespace, route: &Route) {
    e.emit(&format!(
        "route {}({}, {}, {})",
        route.name,
        format_type_expr(api, &route.request, Some(&ns.name)),
        format_type_expr(api, &route.response, Some(&ns.name)),
        format_type_expr(api, &route.error, Some(&ns.name))
    ));
    if route.doc.is_some() || !route.attrs.is_empty() {
        e.indent(|e| {
            if let Some(doc) = &route.doc {
                e.emit(&quoted(doc));
            }
            for (name, value) in &route.attrs {
                e.emit(&format!("{} = {}", name, format_literal(value)));
            }
        });
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[path = "pretty_tests.rs"]
mod tests;
