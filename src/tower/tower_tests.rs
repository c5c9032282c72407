use std::path::PathBuf;

use super::*;

fn resolve(files: &[(&str, &str)]) -> Result<Api, InvalidSpec> {
    Tower::new(
        files
            .iter()
            .map(|(p, s)| (PathBuf::from(p), s.to_string())),
    )
    .parse()
}

fn resolve_one(text: &str) -> Result<Api, InvalidSpec> {
    resolve(&[("test.babel", text)])
}

/// Assert failure with some diagnostic containing `needle`.
fn assert_err_containing(result: Result<Api, InvalidSpec>, needle: &str) -> InvalidSpec {
    let err = result.expect_err("expected InvalidSpec");
    assert!(
        err.diagnostics.iter().any(|d| d.msg.contains(needle)),
        "no diagnostic contains {:?}: {:?}",
        needle,
        err.diagnostics
    );
    err
}

/// Assert failure whose first diagnostic message is exactly `msg`.
fn assert_err_msg(result: Result<Api, InvalidSpec>, msg: &str) {
    let err = result.expect_err("expected InvalidSpec");
    assert_eq!(err.msg(), msg, "diagnostics: {:?}", err.diagnostics);
}

fn struct_of<'a>(api: &'a Api, ns: &str, name: &str) -> &'a crate::ir::Struct {
    match api.namespaces[ns].data_type_by_name(name) {
        Some(DataType::Struct(id)) => api.composite(*id).as_struct().unwrap(),
        other => panic!("'{}' is not a struct: {:?}", name, other),
    }
}

fn union_of<'a>(api: &'a Api, ns: &str, name: &str) -> &'a crate::ir::Union {
    match api.namespaces[ns].data_type_by_name(name) {
        Some(DataType::Union(id)) => api.composite(*id).as_union().unwrap(),
        other => panic!("'{}' is not a union: {:?}", name, other),
    }
}

// ─── Namespaces ──────────────────────────────────────────────────────

#[test]
fn test_minimal_namespace() {
    let api = resolve_one("namespace files").unwrap();
    let ns = &api.namespaces["files"];
    assert_eq!(ns.name, "files");
    assert!(ns.data_types.is_empty());
    assert!(ns.routes.is_empty());
}

#[test]
fn test_namespace_docstrings_concatenate() {
    let ns1 = "namespace ns1\n    \"\n    This is a docstring for ns1.\n    \"\n\nstruct S\n    f String\n";
    let ns2 = "namespace ns1\n    \"\n    This is another docstring for ns1.\n    \"\n\nstruct S2\n    f String\n";
    let api = resolve(&[("ns1.babel", ns1), ("ns2.babel", ns2)]).unwrap();
    assert_eq!(
        api.namespaces["ns1"].doc.as_deref(),
        Some("This is a docstring for ns1.\n\nThis is another docstring for ns1.\n")
    );
}

#[test]
fn test_missing_namespace_header() {
    assert_err_containing(
        resolve_one("struct S\n    f String\n"),
        "must be a namespace",
    );
}

#[test]
fn test_duplicate_symbol() {
    let text = "\
namespace test

struct S
    f String

union S
    a
";
    assert_err_containing(resolve_one(text), "Symbol 'S' already defined.");
}

#[test]
fn test_reserved_type_name() {
    assert_err_containing(
        resolve_one("namespace test\n\nstruct String\n    f UInt64\n"),
        "reserved type name",
    );
}

// ─── Imports ─────────────────────────────────────────────────────────

#[test]
fn test_import_cross_namespace_field() {
    let ns1 = "namespace ns1\n\nimport ns2\n\nstruct S\n    f ns2.S\n";
    let ns2 = "namespace ns2\n\nstruct S\n    f String\n";
    let api = resolve(&[("ns1.babel", ns1), ("ns2.babel", ns2)]).unwrap();
    let s = struct_of(&api, "ns1", "S");
    match &s.fields[0].data_type {
        DataType::Struct(id) => assert_eq!(api.composite(*id).namespace(), "ns2"),
        other => panic!("expected struct type, got {:?}", other),
    }
}

#[test]
fn test_import_self() {
    assert_err_msg(
        resolve_one("namespace test\nimport test\n"),
        "Cannot import current namespace.",
    );
}

#[test]
fn test_import_missing_namespace() {
    assert_err_msg(
        resolve_one("namespace test\nimport missingns\n"),
        "Namespace 'missingns' is not defined in any spec.",
    );
}

#[test]
fn test_unimported_namespace_reference() {
    let ns1 = "namespace ns1\n\nstruct S\n    f ns2.S\n";
    let ns2 = "namespace ns2\n\nstruct S\n    f String\n";
    assert_err_containing(
        resolve(&[("ns1.babel", ns1), ("ns2.babel", ns2)]),
        "is not imported",
    );
}

#[test]
fn test_import_extends_struct() {
    let ns1 = "namespace ns1\n\nimport ns2\n\nstruct S extends ns2.T\n    f String\n";
    let ns2 = "namespace ns2\n\nstruct T\n    g String\n";
    let api = resolve(&[("ns1.babel", ns1), ("ns2.babel", ns2)]).unwrap();
    let s = struct_of(&api, "ns1", "S");
    assert_eq!(s.all_fields.len(), 2);
    assert_eq!(s.all_fields[0].name, "g");
    assert_eq!(s.all_fields[1].name, "f");
}

#[test]
fn test_import_extends_union() {
    let ns1 = "namespace ns1\n\nimport ns2\n\nunion V extends ns2.U\n    b String\n";
    let ns2 = "namespace ns2\n\nunion U\n    a\n";
    let api = resolve(&[("ns1.babel", ns1), ("ns2.babel", ns2)]).unwrap();
    let v = union_of(&api, "ns1", "V");
    assert_eq!(v.all_fields.len(), 2);
}

#[test]
fn test_import_mutual_field_references() {
    let ns1 = "namespace ns1\n\nimport ns2\n\nstruct S\n    t ns2.T\n";
    let ns2 = "namespace ns2\n\nimport ns1\n\nstruct T\n    s ns1.S\n";
    resolve(&[("ns1.babel", ns1), ("ns2.babel", ns2)]).unwrap();
}

#[test]
fn test_import_mutual_inheritance_is_circular() {
    let ns1 = "namespace ns1\n\nimport ns2\n\nstruct S extends ns2.T\n    a String\n";
    let ns2 = "namespace ns2\n\nimport ns1\n\nstruct T extends ns1.S\n    b String\n";
    assert_err_containing(
        resolve(&[("ns1.babel", ns1), ("ns2.babel", ns2)]),
        "Unresolvable circular reference",
    );
}

// ─── Aliases ─────────────────────────────────────────────────────────

#[test]
fn test_alias_to_primitive() {
    resolve_one("namespace test\n\nalias R = String\n").unwrap();
}

#[test]
fn test_alias_with_attributes_and_nullable() {
    let api = resolve_one("namespace test\n\nalias R = String(min_length=1)?\n").unwrap();
    match api.namespaces["test"].data_type_by_name("R") {
        Some(DataType::Nullable(inner)) => match inner.as_ref() {
            DataType::String(attrs) => assert_eq!(attrs.min_length, Some(1)),
            other => panic!("expected string, got {:?}", other),
        },
        other => panic!("expected nullable, got {:?}", other),
    }
}

#[test]
fn test_alias_to_alias() {
    resolve_one("namespace test\n\nalias T = String\nalias R = T\n").unwrap();
}

#[test]
fn test_alias_to_alias_with_attributes() {
    assert_err_containing(
        resolve_one("namespace test\n\nalias T = String(min_length=1)\nalias R = T(min_length=1)\n"),
        "Attributes cannot be specified for instantiated type",
    );
}

#[test]
fn test_alias_to_composite() {
    resolve_one("namespace test\n\nstruct S\n    f String\nalias R = S\n").unwrap();
}

#[test]
fn test_alias_to_composite_with_attributes() {
    assert_err_containing(
        resolve_one("namespace test\n\nstruct S\n    f String\n\nalias R = S(min_length=1)\n"),
        "Attributes cannot be specified for instantiated type",
    );
}

#[test]
fn test_alias_cycle() {
    assert_err_containing(
        resolve_one("namespace test\n\nalias A = B\nalias B = A\n"),
        "Unresolvable circular reference",
    );
}

// ─── Struct semantics ────────────────────────────────────────────────

#[test]
fn test_struct_with_default_and_nullable() {
    let text = "\
namespace ns
struct D
    a String
    b UInt64 = 10
    c String?
";
    let api = resolve_one(text).unwrap();
    let d = struct_of(&api, "ns", "D");
    assert_eq!(d.fields.len(), 3);
    assert!(d.fields[1].has_default());
    assert_eq!(d.fields[1].default, Some(Literal::Int(10)));
    assert!(d.fields[2].is_optional());
    assert!(!d.fields[0].is_optional());
}

#[test]
fn test_struct_duplicate_field() {
    let text = "\
namespace test

struct A
    a UInt64
    a String
";
    assert_err_containing(resolve_one(text), "already defined");
}

#[test]
fn test_struct_field_shadows_ancestor() {
    let text = "\
namespace test

struct A
    a UInt64

struct B extends A
    b String

struct C extends B
    a String
";
    assert_err_containing(resolve_one(text), "already defined in parent");
}

#[test]
fn test_struct_extends_union_rejected() {
    let text = "\
namespace test

union A
    a

struct B extends A
    b UInt64
";
    assert_err_containing(resolve_one(text), "struct can only extend another struct");
}

#[test]
fn test_inheritance_closure() {
    let text = "\
namespace test

struct A
    a String
    b Int64

struct B extends A
    c Binary

struct C extends B
    d Float64
";
    let api = resolve_one(text).unwrap();
    let c = struct_of(&api, "test", "C");
    let names: Vec<&str> = c.all_fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c", "d"]);
    assert_eq!(c.fields.len(), 1);

    let b = struct_of(&api, "test", "B");
    assert_eq!(
        b.all_fields.len(),
        struct_of(&api, "test", "A").all_fields.len() + b.fields.len()
    );
}

// ─── Union semantics ─────────────────────────────────────────────────

#[test]
fn test_union_duplicate_field() {
    let text = "\
namespace test

union A
    a UInt64
    a String
";
    assert_err_containing(resolve_one(text), "already defined");
}

#[test]
fn test_union_field_shadows_ancestor() {
    let text = "\
namespace test

union A
    a UInt64

union B extends A
    b String

union C extends B
    a String
";
    assert_err_containing(resolve_one(text), "already defined in parent");
}

#[test]
fn test_union_catch_all_exposure() {
    let text = "\
namespace test

union A
    a*
    b
";
    let api = resolve_one(text).unwrap();
    let a = union_of(&api, "test", "A");
    assert!(a.fields[0].catch_all);
    let field = a.catch_all_field().unwrap();
    assert_eq!(field.name, "a");
    assert_eq!(field.data_type, DataType::Symbol);
}

#[test]
fn test_union_two_catch_alls() {
    let text = "\
namespace test

union A
    a*
    b*
";
    assert_err_containing(resolve_one(text), "Only one catch-all tag");
}

#[test]
fn test_union_catch_all_in_parent() {
    let text = "\
namespace test

union A
    a*

union B extends A
    b*
";
    assert_err_containing(resolve_one(text), "already declared a catch-all tag");
}

#[test]
fn test_union_inherits_catch_all() {
    let text = "\
namespace test

union A
    a*

union B extends A
    b
";
    let api = resolve_one(text).unwrap();
    let b = union_of(&api, "test", "B");
    assert_eq!(b.catch_all.as_deref(), Some("a"));
    assert_eq!(b.catch_all_field().unwrap().name, "a");
}

#[test]
fn test_union_extends_struct_rejected() {
    let text = "\
namespace test

struct A
    a UInt64

union B extends A
    b UInt64
";
    assert_err_containing(resolve_one(text), "union can only extend another union");
}

#[test]
fn test_union_with_catch_all_scenario() {
    let text = "\
namespace t
union E
    a
    b
    unk*
";
    let api = resolve_one(text).unwrap();
    let e = union_of(&api, "t", "E");
    assert_eq!(e.catch_all_field().unwrap().name, "unk");
    assert_eq!(e.fields.iter().filter(|f| f.catch_all).count(), 1);
}

// ─── Enumerated subtypes ─────────────────────────────────────────────

#[test]
fn test_enumerated_subtypes_valid() {
    let text = "\
namespace test

struct Resource
    union
        file File
        folder Folder

struct File extends Resource
    size UInt64

struct Folder extends Resource
    icon String
";
    let api = resolve_one(text).unwrap();
    let resource = struct_of(&api, "test", "Resource");
    let subtypes = resource.subtypes.as_ref().unwrap();
    assert!(!subtypes.catch_all);
    assert_eq!(subtypes.tags.len(), 2);
    assert_eq!(subtypes.tags[0].0, "file");
    assert_eq!(api.composite(subtypes.tags[0].1).name(), "File");
}

#[test]
fn test_enumerated_subtype_not_struct() {
    let text = "\
namespace test

struct Resource
    union
        file String
";
    assert_err_containing(resolve_one(text), "must be a struct");
}

#[test]
fn test_enumerated_subtype_undefined() {
    let text = "\
namespace test

struct Resource
    union
        file File
";
    assert_err_containing(resolve_one(text), "Undefined");
}

#[test]
fn test_enumerated_subtype_not_a_subtype() {
    let text = "\
namespace test

struct Resource
    union
        file File

struct File
    size UInt64
";
    assert_err_containing(resolve_one(text), "not a subtype of");
}

#[test]
fn test_enumerated_subtype_listed_twice() {
    let text = "\
namespace test

struct Resource
    union
        file File
        file2 File

struct File extends Resource
    size UInt64
";
    assert_err_containing(resolve_one(text), "only be specified once");
}

#[test]
fn test_enumerated_subtype_missing_child() {
    let text = "\
namespace test

struct Resource
    union
        file File

struct File extends Resource
    size UInt64

struct Folder extends Resource
    icon String
";
    assert_err_containing(resolve_one(text), "missing 'Folder'");
}

#[test]
fn test_enumerated_subtype_tag_conflicts_with_own_field() {
    let text = "\
namespace test

struct Resource
    union
        file File
    file String

struct File extends Resource
    size UInt64
";
    assert_err_containing(resolve_one(text), "already defined on");
}

#[test]
fn test_enumerated_subtype_tag_conflicts_with_parent_field() {
    let text = "\
namespace test

struct A
    union
        b B
    c String

struct B extends A
    union
        c C

struct C extends B
    d String
";
    assert_err_containing(resolve_one(text), "already defined in parent");
}

#[test]
fn test_enumerated_subtype_tag_conflicts_with_parent_tag() {
    let text = "\
namespace test

struct A
    union
        b B
    c String

struct B extends A
    union
        b C

struct C extends B
    d String
";
    assert_err_containing(resolve_one(text), "already defined in parent");
}

#[test]
fn test_enumerated_subtypes_gap_in_tree() {
    let text = "\
namespace test

struct A
    union
        b B
    c String

struct B extends A
    \"No enumerated subtypes.\"

struct C extends B
    union
        d D

struct D extends C
    e String
";
    assert_err_containing(resolve_one(text), "cannot enumerate subtypes if parent");
}

#[test]
fn test_enumerated_subtypes_sealed_leaf() {
    let text = "\
namespace test

struct A
    union
        b B
    c String

struct B extends A
    \"No enumerated subtypes.\"

struct C extends B
    \"No enumerated subtypes.\"
";
    assert_err_containing(resolve_one(text), "cannot be extended");
}

#[test]
fn test_plain_inheritance_is_not_sealed() {
    // Without enumerated subtypes anywhere, chains extend freely.
    let text = "\
namespace test

struct A
    a String

struct B extends A
    b String

struct C extends B
    c String
";
    resolve_one(text).unwrap();
}

// ─── Nullable rules ──────────────────────────────────────────────────

#[test]
fn test_stacked_nullable_alias() {
    let text = "\
namespace test

alias A = String?
alias B = A?
";
    assert_err_msg(
        resolve_one(text),
        "Cannot mark reference to nullable type as nullable.",
    );
}

#[test]
fn test_stacked_nullable_field() {
    let text = "\
namespace test

alias A = String?

struct S
    f A?
";
    assert_err_msg(
        resolve_one(text),
        "Cannot mark reference to nullable type as nullable.",
    );
}

#[test]
fn test_extends_nullable_reference() {
    let text = "\
namespace test

struct S
    f String

struct T extends S?
    g String
";
    assert_err_msg(resolve_one(text), "Reference cannot be nullable.");
}

#[test]
fn test_extends_alias_of_nullable() {
    let ns1 = "namespace ns1\n\nimport ns2\n\nstruct S extends ns2.X\n    f String\n";
    let ns2 = "namespace ns2\n\nalias X = T?\n\nstruct T\n    g String\n";
    assert_err_msg(
        resolve(&[("ns1.babel", ns1), ("ns2.babel", ns2)]),
        "A struct cannot extend a nullable type.",
    );
}

#[test]
fn test_nullable_void_rejected() {
    assert_err_containing(
        resolve_one("namespace test\n\nalias V = Void?\n"),
        "Void cannot be marked nullable",
    );
}

// ─── Forward references ──────────────────────────────────────────────

#[test]
fn test_route_before_struct() {
    let text = "\
namespace test

route test_route(Void, S, Void)

struct S
    f String
";
    resolve_one(text).unwrap();
}

#[test]
fn test_extends_before_definition() {
    let text = "\
namespace test

struct T extends S
    g String

struct S
    f String
";
    resolve_one(text).unwrap();
}

#[test]
fn test_field_forward_reference() {
    let text = "\
namespace test

route test_route(Void, T, Void)

struct T
    s S

struct S
    f String
";
    resolve_one(text).unwrap();
}

#[test]
fn test_self_reference() {
    let text = "\
namespace test

struct S
    s S?
";
    let api = resolve_one(text).unwrap();
    let s = struct_of(&api, "test", "S");
    match &s.fields[0].data_type {
        DataType::Nullable(inner) => {
            assert_eq!(inner.composite_id(), s.fields[0].data_type.composite_id());
            assert_eq!(api.composite(inner.composite_id().unwrap()).name(), "S");
        }
        other => panic!("expected nullable self reference, got {:?}", other),
    }
}

// ─── Routes ──────────────────────────────────────────────────────────

#[test]
fn test_route_undefined_symbol() {
    let text = "\
namespace users

route test_route(Blah, Blah, Blah)
";
    assert_err_containing(resolve_one(text), "Symbol 'Blah' is undefined");
}

#[test]
fn test_route_resolution_and_attrs() {
    let text = "\
namespace users

struct AccountInfo
    email String

route GetAccountInfo(AccountInfo, Void, Void)
    \"Gets the account info for a user\"
    auth = true
";
    let api = resolve_one(text).unwrap();
    let ns = &api.namespaces["users"];
    assert_eq!(ns.routes.len(), 1);
    let route = &ns.routes[0];
    assert_eq!(route.name, "GetAccountInfo");
    assert!(matches!(route.request, DataType::Struct(_)));
    assert!(matches!(route.response, DataType::Void));
    assert_eq!(route.attrs[0], ("auth".to_string(), Literal::Bool(true)));
}

// ─── Attribute validation ────────────────────────────────────────────

#[test]
fn test_uint32_negative_min_value() {
    assert_err_containing(
        resolve_one("namespace test\n\nalias N = UInt32(min_value=-3)\n"),
        "min_value of UInt32",
    );
}

#[test]
fn test_min_value_exceeds_max_value() {
    assert_err_containing(
        resolve_one("namespace test\n\nalias N = Int32(min_value=5, max_value=1)\n"),
        "min_value must not exceed max_value",
    );
}

#[test]
fn test_negative_min_length() {
    assert_err_containing(
        resolve_one("namespace test\n\nalias S = String(min_length=-1)\n"),
        "non-negative",
    );
}

#[test]
fn test_invalid_regex_pattern() {
    assert_err_containing(
        resolve_one("namespace test\n\nalias S = String(pattern=\"[invalid\")\n"),
        "Invalid regex pattern",
    );
}

#[test]
fn test_valid_parameterized_primitives() {
    let text = "\
namespace test

alias T = String(min_length=3)
alias F = Float64(max_value=3.2e1)
alias Numbers = List(UInt64)
alias Ts = Timestamp(\"%a, %d %b %Y %H:%M:%S\")
alias Pat = String(pattern=\"[a-z]+\")
";
    let api = resolve_one(text).unwrap();
    match api.namespaces["test"].data_type_by_name("Numbers") {
        Some(DataType::List(list)) => assert!(matches!(list.item, DataType::UInt64(_))),
        other => panic!("expected list, got {:?}", other),
    }
}

#[test]
fn test_unknown_argument() {
    assert_err_containing(
        resolve_one("namespace test\n\nalias S = String(min_len=1)\n"),
        "Unknown argument 'min_len'",
    );
}

#[test]
fn test_list_requires_item_type() {
    assert_err_containing(
        resolve_one("namespace test\n\nalias L = List(min_items=1)\n"),
        "List requires a data type argument",
    );
}

// ─── Default typing ──────────────────────────────────────────────────

#[test]
fn test_default_out_of_storage_range() {
    assert_err_containing(
        resolve_one("namespace test\n\nstruct S\n    f UInt64 = -3\n"),
        "out of range",
    );
}

#[test]
fn test_default_respects_attribute_bounds() {
    assert_err_containing(
        resolve_one("namespace test\n\nstruct S\n    f UInt64(max_value=10) = 20\n"),
        "out of range",
    );
}

#[test]
fn test_default_type_mismatch() {
    assert_err_containing(
        resolve_one("namespace test\n\nstruct S\n    f String = 5\n"),
        "Invalid value",
    );
}

#[test]
fn test_default_int_coerces_for_float_field() {
    let api = resolve_one("namespace test\n\nstruct S\n    f Float64 = -5\n").unwrap();
    let s = struct_of(&api, "test", "S");
    assert_eq!(s.fields[0].default, Some(Literal::Float(-5.0)));
}

#[test]
fn test_default_tag_ref_resolves_to_void_variant() {
    let text = "\
namespace files

union UploadMode
    add
    overwrite

struct Upload
    path String
    mode UploadMode = add
";
    let api = resolve_one(text).unwrap();
    let upload = struct_of(&api, "files", "Upload");
    assert_eq!(
        upload.fields[1].default,
        Some(Literal::Tag("add".to_string()))
    );
}

#[test]
fn test_default_tag_ref_to_typed_variant_rejected() {
    let text = "\
namespace files

union UploadMode
    add
    rename String

struct Upload
    mode UploadMode = rename
";
    assert_err_containing(resolve_one(text), "not a void variant");
}

// ─── Examples ────────────────────────────────────────────────────────

#[test]
fn test_example_valid() {
    let text = "\
namespace files

struct QuotaInfo
    quota UInt64
    name String?
    example default
        quota=64000
    example pro
        quota=100000000000
";
    let api = resolve_one(text).unwrap();
    let s = struct_of(&api, "files", "QuotaInfo");
    assert!(s.examples.contains_key("default"));
    assert!(s.examples.contains_key("pro"));
    assert_eq!(
        s.examples["default"].entries[0],
        ("quota".to_string(), Literal::Int(64000))
    );
}

#[test]
fn test_example_missing_required_field() {
    let text = "\
namespace files

struct QuotaInfo
    quota UInt64
    used UInt64
    example default
        quota=64000
";
    assert_err_containing(resolve_one(text), "missing field 'used'");
}

#[test]
fn test_example_unknown_field() {
    let text = "\
namespace files

struct QuotaInfo
    quota UInt64
    example default
        quota=1
        quotas=2
";
    assert_err_containing(resolve_one(text), "not a field of");
}

#[test]
fn test_example_value_type_mismatch() {
    let text = "\
namespace files

struct QuotaInfo
    quota UInt64
    example default
        quota=\"lots\"
";
    assert_err_containing(resolve_one(text), "expected integer, got string");
}

#[test]
fn test_example_may_omit_optional_and_defaulted() {
    let text = "\
namespace files

struct D
    a String
    b UInt64 = 10
    c String?
    example default
        a=\"x\"
";
    resolve_one(text).unwrap();
}

// ─── Docstring references ────────────────────────────────────────────

#[test]
fn test_doc_ref_union_field() {
    let text = "\
namespace test

union U
    \":field:`a`\"
    a
    b
";
    resolve_one(text).unwrap();
}

#[test]
fn test_doc_ref_field_to_sibling() {
    let text = "\
namespace test

union U
    a
        \":field:`b`\"
    b
";
    resolve_one(text).unwrap();
}

#[test]
fn test_doc_ref_unknown_field() {
    let text = "\
namespace test

union U
    \":field:`missing`\"
    a
";
    assert_err_containing(resolve_one(text), "unknown field 'missing'");
}

#[test]
fn test_doc_ref_type_and_route() {
    let text = "\
namespace test

struct S
    \"See :type:`S` used by :route:`fetch`.\"
    f String

route fetch(Void, S, Void)
";
    resolve_one(text).unwrap();
}

// ─── Documentation predicates ────────────────────────────────────────

#[test]
fn test_docstring_predicates() {
    let text = "\
namespace test

# No docstrings at all
struct E
    f String

struct S
    \"Only type doc\"
    f String

struct T
    f String
        \"Only field doc\"

union U
    \"Only type doc\"
    f String

union V
    f String
        \"Only field doc\"

# Check for inherited doc
struct W extends T
    g String
";
    let api = resolve_one(text).unwrap();

    let e = struct_of(&api, "test", "E");
    assert!(!e.has_documented_type_or_fields());
    assert!(!e.has_documented_fields());

    let s = struct_of(&api, "test", "S");
    assert!(s.has_documented_type_or_fields());
    assert!(!s.has_documented_fields());

    let t = struct_of(&api, "test", "T");
    assert!(t.has_documented_type_or_fields());
    assert!(t.has_documented_fields());

    let u = union_of(&api, "test", "U");
    assert!(u.has_documented_type_or_fields());
    assert!(!u.has_documented_fields());

    let v = union_of(&api, "test", "V");
    assert!(v.has_documented_type_or_fields());
    assert!(v.has_documented_fields());

    // Documentation is not inherited.
    let w = struct_of(&api, "test", "W");
    assert!(!w.has_documented_type_or_fields());
    assert!(!w.has_documented_fields());
}

// ─── Lexer/parser integration ────────────────────────────────────────

#[test]
fn test_indent_error_surfaces_as_invalid_spec() {
    let text = "\
namespace test

struct S
    # Indent below is only 3 spaces
   f String
";
    assert_err_containing(resolve_one(text), "Indent is not divisible by 4.");
}

#[test]
fn test_parse_error_has_path_and_line() {
    let err = assert_err_containing(
        resolve_one("namespace users\n\nstrct AccountInfo\n    email String\n"),
        "Unexpected ID with value 'strct'.",
    );
    let diag = &err.diagnostics[0];
    assert_eq!(diag.path, PathBuf::from("test.babel"));
    assert_eq!(diag.line, 3);
}

// ─── Property laws ───────────────────────────────────────────────────

#[test]
fn test_resolution_is_order_independent() {
    let ns1 = "namespace ns1\n\nimport ns2\n\nstruct S\n    t ns2.T\n";
    let ns2 = "namespace ns2\n\nimport ns1\n\nstruct T\n    s ns1.S\n";
    let forward = resolve(&[("ns1.babel", ns1), ("ns2.babel", ns2)]).unwrap();
    let backward = resolve(&[("ns2.babel", ns2), ("ns1.babel", ns1)]).unwrap();
    assert_eq!(forward, backward);
}

#[test]
fn test_diagnostics_ordered_by_path_and_line() {
    let a = "namespace t\n\nstruct A\n    f Missing1\n";
    let b = "namespace t\n\nstruct B\n    f Missing2\n    g Missing3\n";
    let err = resolve(&[("b.babel", b), ("a.babel", a)]).expect_err("expected InvalidSpec");
    let keys: Vec<(String, u32)> = err
        .diagnostics
        .iter()
        .map(|d| (d.path.display().to_string(), d.line))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    assert_eq!(err.diagnostics.len(), 3);
}

#[test]
fn test_nullable_flatness_holds_post_resolution() {
    let text = "\
namespace test

alias A = String?

struct S
    a A
    b String?
    c S?
";
    let api = resolve_one(text).unwrap();
    fn assert_flat(dt: &DataType) {
        if let DataType::Nullable(inner) = dt {
            assert!(!inner.is_nullable(), "stacked nullable survived resolution");
            assert_flat(inner);
        }
    }
    for field in &struct_of(&api, "test", "S").fields {
        assert_flat(&field.data_type);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Inheritance closure: all_fields is exactly parent's all_fields
        /// followed by own fields, and names are unique.
        #[test]
        fn inheritance_closure(parent_fields in 1usize..6, child_fields in 1usize..6) {
            let mut text = String::from("namespace t\n\nstruct P\n");
            for i in 0..parent_fields {
                text.push_str(&format!("    p{} String\n", i));
            }
            text.push_str("\nstruct C extends P\n");
            for i in 0..child_fields {
                text.push_str(&format!("    c{} UInt64\n", i));
            }

            let api = resolve_one(&text).unwrap();
            let c = struct_of(&api, "t", "C");
            let p = struct_of(&api, "t", "P");
            prop_assert_eq!(c.all_fields.len(), p.all_fields.len() + c.fields.len());
            prop_assert_eq!(&c.all_fields[..p.all_fields.len()], &p.all_fields[..]);

            let mut names: Vec<&str> = c.all_fields.iter().map(|f| f.name.as_str()).collect();
            let total = names.len();
            names.sort_unstable();
            names.dedup();
            prop_assert_eq!(names.len(), total);
        }

        /// Enumerated-subtype partition: the tag list is a bijection with
        /// the set of direct struct descendants.
        #[test]
        fn enumerated_subtype_partition(children in 1usize..7) {
            let mut text = String::from("namespace t\n\nstruct Base\n    union\n");
            for i in 0..children {
                text.push_str(&format!("        t{i} C{i}\n"));
            }
            text.push_str("    name String\n");
            for i in 0..children {
                text.push_str(&format!("\nstruct C{i} extends Base\n    f{i} String\n"));
            }

            let api = resolve_one(&text).unwrap();
            let base = struct_of(&api, "t", "Base");
            let subtypes = base.subtypes.as_ref().unwrap();
            prop_assert_eq!(subtypes.tags.len(), children);
            let mut listed: Vec<&str> = subtypes.tags.iter()
                .map(|(_, id)| api.composite(*id).name())
                .collect();
            listed.sort_unstable();
            listed.dedup();
            prop_assert_eq!(listed.len(), children);
        }

        /// Acyclic inheritance: resolution of a random linear chain always
        /// terminates and every parent edge points strictly upward.
        #[test]
        fn acyclic_inheritance(depth in 1usize..8) {
            let mut text = String::from("namespace t\n\nstruct S0\n    f0 String\n");
            for i in 1..=depth {
                text.push_str(&format!("\nstruct S{} extends S{}\n    f{} String\n", i, i - 1, i));
            }
            let api = resolve_one(&text).unwrap();
            let leaf = struct_of(&api, "t", &format!("S{}", depth));
            prop_assert_eq!(leaf.all_fields.len(), depth + 1);
        }
    }
}
