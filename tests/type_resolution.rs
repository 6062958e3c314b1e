//! Integration tests for turning type expressions into canonical types and
//! for how resolved types show up on reflected members.

mod common;

use phpantom_hover::{ReflectorBuilder, Type, TypeResolver, UnresolvedTokenPolicy};

fn resolve(expression: &str) -> Type {
    TypeResolver::default().resolve(expression)
}

// ─── Unions and null ────────────────────────────────────────────────

#[test]
fn nullable_union_from_trailing_null() {
    let ty = resolve("string|bool|null");
    assert_eq!(
        ty,
        Type::Nullable(Box::new(Type::Union(vec![
            Type::scalar("string"),
            Type::scalar("bool"),
        ])))
    );
    assert_eq!(ty.to_string(), "string|bool|null");
    assert_eq!(ty.kind(), "nullable");
}

#[test]
fn null_anywhere_in_the_union() {
    assert_eq!(resolve("null|string|bool"), resolve("string|bool|null"));
    assert_eq!(resolve("null|int"), Type::nullable(Type::scalar("int")));
    assert_eq!(resolve("?int").to_string(), "?int");
}

#[test]
fn lone_null_stays_null() {
    assert_eq!(resolve("null"), Type::scalar("null"));
}

#[test]
fn duplicate_members_are_removed() {
    assert_eq!(resolve("string|string"), Type::scalar("string"));
    assert_eq!(resolve("int|string|int").to_string(), "int|string");
}

#[test]
fn nested_parenthesised_union_is_flattened() {
    assert_eq!(resolve("(int|string)|bool").to_string(), "int|string|bool");
}

#[test]
fn whitespace_around_members_is_ignored() {
    assert_eq!(resolve("  int | string "), resolve("int|string"));
}

// ─── Mixed and Unknown ──────────────────────────────────────────────

#[test]
fn mixed_absorbs_the_union() {
    assert_eq!(resolve("mixed"), Type::Mixed);
    assert_eq!(resolve("mixed|foo"), Type::Mixed);
    assert_eq!(resolve("int|mixed|null"), Type::Mixed);
}

#[test]
fn single_unrecognised_token_is_unknown() {
    assert_eq!(resolve("12abc"), Type::Unknown);
    assert!(resolve("").is_unknown());
    assert!(resolve("   ").is_unknown());
}

#[test]
fn unrecognised_token_in_union_is_mixed_by_default() {
    assert_eq!(resolve("string|12abc"), Type::Mixed);
    assert_eq!(resolve("1a|2b"), Type::Mixed);
}

#[test]
fn ignore_policy_drops_unrecognised_tokens() {
    let resolver = TypeResolver::new(UnresolvedTokenPolicy::Ignore);
    assert_eq!(resolver.policy(), UnresolvedTokenPolicy::Ignore);
    assert_eq!(resolver.resolve("string|12abc"), Type::scalar("string"));
    assert_eq!(
        resolver.resolve("string|12abc|null"),
        Type::nullable(Type::scalar("string"))
    );
    assert_eq!(resolver.resolve("1a|2b"), Type::Mixed);
}

// ─── Arrays and generics ────────────────────────────────────────────

#[test]
fn bracket_arrays() {
    assert_eq!(resolve("Foobar[]"), Type::array_of(Type::class("Foobar")));
    assert_eq!(resolve("int[][]").to_string(), "int[][]");
    assert_eq!(resolve("Foobar[]").kind(), "array");
}

#[test]
fn generic_arrays_use_the_value_type() {
    assert_eq!(resolve("array<int, User>"), Type::array_of(Type::class("User")));
    assert_eq!(resolve("list<string>"), Type::array_of(Type::scalar("string")));
    assert_eq!(resolve("iterable<Foo>"), Type::array_of(Type::class("Foo")));
}

#[test]
fn shapes_and_callables_keep_their_base() {
    assert_eq!(resolve("array{id: int, name: string}"), Type::scalar("array"));
    assert_eq!(resolve("callable(int): void"), Type::scalar("callable"));
    assert_eq!(resolve("Closure(string): bool"), Type::class("Closure"));
}

#[test]
fn generic_classes_keep_the_class() {
    assert_eq!(resolve("Collection<int, User>"), Type::class("Collection"));
}

// ─── Declared plus documented ───────────────────────────────────────

#[test]
fn documented_type_refines_array_hint() {
    let resolver = TypeResolver::default();
    assert_eq!(
        resolver.resolve_declared(Some("array"), Some("Foobar[]")),
        Type::array_of(Type::class("Foobar"))
    );
}

#[test]
fn conflicting_native_and_documented_types_merge() {
    let resolver = TypeResolver::default();
    assert_eq!(
        resolver.resolve_declared(Some("int"), Some("string")).to_string(),
        "int|string"
    );
}

#[test]
fn unusable_documented_type_keeps_native() {
    let resolver = TypeResolver::default();
    assert_eq!(
        resolver.resolve_declared(Some("int"), Some("12abc")),
        Type::scalar("int")
    );
    assert_eq!(resolver.resolve_declared(None, None), Type::Unknown);
}

// ─── Policy on reflected members ────────────────────────────────────

#[test]
fn reflector_policy_applies_to_docblock_types() {
    let source = "<?php\nclass OneClass {\n    /** @var string|12abc */\n    public $foobar;\n}";

    let mixed = common::create_test_reflector();
    let classes = mixed.reflect_classes_in(source).unwrap();
    assert_eq!(classes.first().unwrap().properties.get("foobar").unwrap().ty, Type::Mixed);

    let ignoring = ReflectorBuilder::new()
        .unresolved_token_policy(UnresolvedTokenPolicy::Ignore)
        .build();
    assert_eq!(ignoring.resolver().policy(), UnresolvedTokenPolicy::Ignore);
    let classes = ignoring.reflect_classes_in(source).unwrap();
    assert_eq!(
        classes.first().unwrap().properties.get("foobar").unwrap().ty,
        Type::scalar("string")
    );
}

#[test]
fn mixed_or_unknown_property_doc() {
    let reflector = common::create_test_reflector();
    let classes = reflector
        .reflect_classes_in("<?php\nclass OneClass {\n    /** @var mixed|foo */\n    public $foobar;\n}")
        .unwrap();
    let foobar = classes.first().unwrap().properties.get("foobar").unwrap().clone();
    assert!(foobar.ty.is_mixed());
}
