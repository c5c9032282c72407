//! Raw per-file syntax tree.
//!
//! These nodes exist only between parse and resolve; the tower links them
//! into the long-lived IR and the trees are dropped.

// ─── Type references ─────────────────────────────────────────────────

/// An unresolved reference to a type by name, with optional namespace
/// qualifier, type arguments, and nullable marker.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    pub name: String,
    /// Namespace qualifier from a dotted path, e.g. `ns2` in `ns2.S`
    pub ns: Option<String>,
    pub args: Vec<TypeArg>,
    pub kwargs: Vec<(String, LiteralNode)>,
    pub nullable: bool,
    pub line: u32,
}

impl TypeRef {
    pub fn plain(name: impl Into<String>, line: u32) -> Self {
        Self {
            name: name.into(),
            ns: None,
            args: Vec::new(),
            kwargs: Vec::new(),
            nullable: false,
            line,
        }
    }

    pub fn has_args(&self) -> bool {
        !self.args.is_empty() || !self.kwargs.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeArg {
    /// Positional type argument, e.g. the item type in `List(UInt64)`
    Type(TypeRef),
    /// Positional literal argument, e.g. the format in `Timestamp("%a")`
    Literal(LiteralNode),
}

/// A literal as written in source: default values, type arguments, and
/// example entries. A bare identifier is a tag reference into a union
/// (`mode UploadMode = add`) unless it spells a boolean.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralNode {
    Int(i128),
    Float(f64),
    Str(String),
    Bool(bool),
    Null,
    TagRef(String),
}

// ─── Declarations ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceDecl {
    pub name: String,
    pub doc: Option<String>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub name: String,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AliasDecl {
    pub name: String,
    pub type_ref: TypeRef,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub type_ref: TypeRef,
    pub default: Option<LiteralNode>,
    pub doc: Option<String>,
    pub line: u32,
}

impl FieldDecl {
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// Union variant with no payload (the "symbol" case).
#[derive(Debug, Clone, PartialEq)]
pub struct VoidFieldDecl {
    pub name: String,
    pub catch_all: bool,
    pub doc: Option<String>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnionFieldDecl {
    Typed(FieldDecl),
    Void(VoidFieldDecl),
}

impl UnionFieldDecl {
    pub fn name(&self) -> &str {
        match self {
            Self::Typed(f) => &f.name,
            Self::Void(f) => &f.name,
        }
    }

    pub fn line(&self) -> u32 {
        match self {
            Self::Typed(f) => f.line,
            Self::Void(f) => f.line,
        }
    }
}

/// One `tag TypeRef` entry of an enumerated-subtypes block.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtypeField {
    pub tag: String,
    pub type_ref: TypeRef,
    pub line: u32,
}

/// The `union` block inside a struct declaring its direct subtypes as a
/// tagged partition. `*` marks the tree as catch-all-capable.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtypesDecl {
    pub catch_all: bool,
    pub fields: Vec<SubtypeField>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExampleDecl {
    pub label: String,
    pub entries: Vec<(String, LiteralNode)>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub name: String,
    pub extends: Option<TypeRef>,
    pub doc: Option<String>,
    pub subtypes: Option<SubtypesDecl>,
    pub fields: Vec<FieldDecl>,
    pub examples: Vec<ExampleDecl>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionDecl {
    pub name: String,
    pub extends: Option<TypeRef>,
    pub doc: Option<String>,
    pub fields: Vec<UnionFieldDecl>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteDecl {
    pub name: String,
    pub request: TypeRef,
    pub response: TypeRef,
    pub error: TypeRef,
    pub doc: Option<String>,
    pub attrs: Vec<(String, LiteralNode)>,
    pub line: u32,
}

/// A top-level declaration. One file parses to an ordered `Vec<Decl>`.
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Namespace(NamespaceDecl),
    Import(ImportDecl),
    Alias(AliasDecl),
    Struct(StructDecl),
    Union(UnionDecl),
    Route(RouteDecl),
}

impl Decl {
    pub fn line(&self) -> u32 {
        match self {
            Decl::Namespace(d) => d.line,
            Decl::Import(d) => d.line,
            Decl::Alias(d) => d.line,
            Decl::Struct(d) => d.line,
            Decl::Union(d) => d.line,
            Decl::Route(d) => d.line,
        }
    }
}
