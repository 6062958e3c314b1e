//! Integration tests for template selection and the data templates see.

mod common;

use common::{create_source_tree, create_test_reflector, create_test_renderer, templates_dir};
use phpantom_hover::{
    ClassLikeKind, HoverInformation, ObjectRendererBuilder, RenderError, Renderable, Type,
    VariantKey,
};

const COMPLEX_CLASS: &str = r#"<?php

interface DoesThis {}

/**
 * Does the concrete thing.
 *
 * @property-read int $id
 * @method static self make()
 */
final class Concrete implements DoesThis
{
    public const LIMIT = 10;
    protected ?string $label = null;
    public function run(int $times = 1): void {}
}
"#;

// ─── Determinism ────────────────────────────────────────────────────

#[test]
fn rendering_is_deterministic() {
    let reflector = create_test_reflector();
    let renderer = create_test_renderer();

    let first = {
        let classes = reflector.reflect_classes_in(COMPLEX_CLASS).unwrap();
        renderer.render(classes.get("Concrete").unwrap()).unwrap()
    };
    for _ in 0..5 {
        let classes = reflector.reflect_classes_in(COMPLEX_CLASS).unwrap();
        let again = renderer.render(classes.get("Concrete").unwrap()).unwrap();
        assert_eq!(first, again);
    }

    let other_renderer = create_test_renderer();
    let classes = reflector.reflect_classes_in(COMPLEX_CLASS).unwrap();
    assert_eq!(first, other_renderer.render(classes.get("Concrete").unwrap()).unwrap());
}

#[test]
fn complex_class_markdown() {
    let reflector = create_test_reflector();
    let classes = reflector.reflect_classes_in(COMPLEX_CLASS).unwrap();
    let markdown = create_test_renderer()
        .render(classes.get("Concrete").unwrap())
        .unwrap();

    assert_eq!(
        markdown,
        "```php\nfinal class Concrete implements DoesThis\n```\n\n\
         Does the concrete thing.\n\n\
         #### Supertypes\n- implements interface `DoesThis`\n\n\
         #### Constants\n- `public const LIMIT = 10`\n\n\
         #### Properties\n- `protected ?string $label = null`\n\
         - `public readonly int $id` *(virtual)*\n\n\
         #### Methods\n- `public function run(int $times = 1): void`\n\
         - `public static function make(): self` *(virtual)*\n"
    );
}

#[test]
fn deprecated_marker() {
    let reflector = create_test_reflector();
    let classes = reflector
        .reflect_classes_in(
            "<?php\nclass OneClass {\n    /**\n     * Old.\n     * @deprecated\n     */\n    public function foo() {}\n}",
        )
        .unwrap();
    let method = classes.first().unwrap().methods.get("foo").unwrap();
    assert_eq!(
        create_test_renderer().render(method).unwrap(),
        "```php\npublic function foo()\n```\n\nOld.\n\n**Deprecated**\n\nDeclared in `OneClass`\n"
    );
}

#[test]
fn every_bundled_output_ends_with_one_newline() {
    let reflector = create_test_reflector();
    let renderer = create_test_renderer();
    let classes = reflector.reflect_classes_in(COMPLEX_CLASS).unwrap();
    let concrete = classes.get("Concrete").unwrap();

    let outputs = [
        renderer.render(concrete).unwrap(),
        renderer.render(concrete.methods.get("run").unwrap()).unwrap(),
        renderer.render(concrete.properties.get("label").unwrap()).unwrap(),
        renderer.render(concrete.constants.get("LIMIT").unwrap()).unwrap(),
        renderer.render(&Type::Mixed).unwrap(),
        renderer
            .render(&reflector.reflect_offset(COMPLEX_CLASS, 0).unwrap())
            .unwrap(),
        renderer
            .render(&HoverInformation::new("Title", "Docs", concrete.clone()))
            .unwrap(),
    ];
    for output in outputs {
        assert!(output.ends_with('\n') && !output.ends_with("\n\n"), "{output:?}");
    }
}

// ─── Template selection ─────────────────────────────────────────────

#[test]
fn variant_keys_for_renderables() {
    let reflector = create_test_reflector();
    let classes = reflector
        .reflect_classes_in("<?php interface I {} trait T {} enum E {} class C {}")
        .unwrap();
    let keys: Vec<_> = classes
        .iter()
        .map(|class| Renderable::from(class).variant_key())
        .collect();
    assert_eq!(
        keys,
        vec![
            VariantKey::Interface,
            VariantKey::Trait,
            VariantKey::Enum,
            VariantKey::Class,
        ]
    );
    assert_eq!(VariantKey::from(ClassLikeKind::Enum), VariantKey::Enum);
    assert_eq!(Renderable::from(&Type::Mixed).variant_key(), VariantKey::Type);
}

#[test]
fn every_variant_but_enum_has_a_bundled_template() {
    let renderer = ObjectRendererBuilder::new()
        .with_default_templates()
        .build()
        .unwrap();
    for key in VariantKey::ALL {
        assert_eq!(renderer.has_template(key), key != VariantKey::Enum, "{key}");
    }
}

#[test]
fn enum_falls_back_to_interface_template() {
    let reflector = create_test_reflector();
    let classes = reflector
        .reflect_classes_in("<?php enum Suit { case Hearts; }")
        .unwrap();
    let suit = classes.first().unwrap();

    let renderer = create_test_renderer();
    assert_eq!(renderer.template_for(VariantKey::Enum).unwrap(), VariantKey::Interface);
    assert_eq!(
        renderer.render(suit).unwrap(),
        "```php\nenum Suit\n```\n\n#### Constants\n- `public const Hearts = Suit::Hearts`\n"
    );
}

#[test]
fn fallback_output_comes_from_the_interface_template() {
    let reflector = create_test_reflector();
    let renderer = create_test_renderer();
    let source = "<?php\n/** @property-read int $id */\nenum Suit { case Hearts; }\n\n/** @property-read int $id */\nclass Card {}";
    let classes = reflector.reflect_classes_in(source).unwrap();

    let card = renderer.render(classes.get("Card").unwrap()).unwrap();
    assert!(card.contains("#### Properties\n- `public readonly int $id` *(virtual)*"));

    let suit = renderer.render(classes.get("Suit").unwrap()).unwrap();
    assert!(!suit.contains("#### Properties"), "{suit}");
    assert!(suit.contains("#### Constants"));
}

#[test]
fn fallback_disabled_is_template_not_found() {
    let reflector = create_test_reflector();
    let classes = reflector.reflect_classes_in("<?php enum Suit {}").unwrap();
    let renderer = ObjectRendererBuilder::new()
        .with_default_templates()
        .build()
        .unwrap();
    let err = renderer.render(classes.first().unwrap()).unwrap_err();
    assert!(matches!(err, RenderError::TemplateNotFound(VariantKey::Enum)));
    assert_eq!(err.to_string(), "No template registered for \"enum\"");
}

#[test]
fn no_fallback_for_non_class_variants() {
    let renderer = ObjectRendererBuilder::new()
        .add_template(VariantKey::Interface, "{{name}}\n")
        .enable_interface_candidates()
        .build()
        .unwrap();
    assert!(matches!(
        renderer.render(&Type::Mixed),
        Err(RenderError::TemplateNotFound(VariantKey::Type))
    ));
}

#[test]
fn exact_template_beats_fallback() {
    let renderer = ObjectRendererBuilder::new()
        .with_default_templates()
        .add_template(VariantKey::Enum, "enum {{name}}: {{#each constants}}{{name}} {{/each}}\n")
        .enable_interface_candidates()
        .build()
        .unwrap();
    let classes = create_test_reflector()
        .reflect_classes_in("<?php enum Suit { case Hearts; case Spades; }")
        .unwrap();
    assert_eq!(
        renderer.render(classes.first().unwrap()).unwrap(),
        "enum Suit: Hearts Spades \n"
    );
}

#[test]
fn invalid_template_fails_to_build() {
    let result = ObjectRendererBuilder::new()
        .add_template(VariantKey::Type, "{{#if name}}unclosed")
        .build();
    assert!(matches!(result, Err(RenderError::Template { .. })));
}

// ─── Template directories ───────────────────────────────────────────

#[test]
fn bundled_directory_matches_defaults() {
    let from_dir = ObjectRendererBuilder::new()
        .add_template_path(templates_dir())
        .enable_interface_candidates()
        .build()
        .unwrap();
    let defaults = create_test_renderer();

    let classes = create_test_reflector()
        .reflect_classes_in(COMPLEX_CLASS)
        .unwrap();
    let concrete = classes.get("Concrete").unwrap();
    assert_eq!(from_dir.render(concrete).unwrap(), defaults.render(concrete).unwrap());
}

#[test]
fn directory_overrides_only_what_it_provides() {
    let dir = create_source_tree(&[("type.md.hbs", "The type is {{name}} ({{kind}})\n")]);
    let renderer = ObjectRendererBuilder::new()
        .with_default_templates()
        .add_template_path(dir.path())
        .build()
        .unwrap();

    assert_eq!(
        renderer.render(&Type::array_of(Type::class("Foo"))).unwrap(),
        "The type is Foo[] (array)\n"
    );
    let classes = create_test_reflector()
        .reflect_classes_in("<?php class Foobar {}")
        .unwrap();
    assert_eq!(
        renderer.render(classes.first().unwrap()).unwrap(),
        "```php\nclass Foobar\n```\n"
    );
}

#[test]
fn later_sources_win() {
    let dir = create_source_tree(&[("type.md.hbs", "from dir\n")]);
    let renderer = ObjectRendererBuilder::new()
        .add_template_path(dir.path())
        .add_template(VariantKey::Type, "inline\n")
        .build()
        .unwrap();
    assert_eq!(renderer.render(&Type::Mixed).unwrap(), "inline\n");
}

#[test]
fn unrelated_files_in_directory_are_ignored() {
    let dir = create_source_tree(&[("notes.md", "ignore me"), ("widget.md.hbs", "{{oops")]);
    let renderer = ObjectRendererBuilder::new()
        .add_template_path(dir.path())
        .build()
        .unwrap();
    for key in VariantKey::ALL {
        assert!(!renderer.has_template(key));
    }
}

// ─── Bound data ─────────────────────────────────────────────────────

#[test]
fn class_member_modifiers_are_exposed() {
    let renderer = ObjectRendererBuilder::new()
        .add_template(
            VariantKey::Class,
            "{{#each methods}}{{name}}{{#if is_abstract}} abstract{{/if}}{{#if is_final}} final{{/if}}\n{{/each}}",
        )
        .build()
        .unwrap();
    let classes = create_test_reflector()
        .reflect_classes_in(
            "<?php\nabstract class Base {\n    abstract protected function build(): void;\n    final public function run() {}\n    public function plain() {}\n}",
        )
        .unwrap();
    assert_eq!(
        renderer.render(classes.first().unwrap()).unwrap(),
        "build abstract\nrun final\nplain\n"
    );
}

#[test]
fn method_parameters_are_exposed() {
    let renderer = ObjectRendererBuilder::new()
        .add_template(
            VariantKey::Method,
            "{{#each parameters}}{{name}}:{{#if type}}{{type}}{{else}}?{{/if}}{{#if is_variadic}}...{{/if}} {{/each}}-> {{return_type}}\n",
        )
        .build()
        .unwrap();
    let classes = create_test_reflector()
        .reflect_classes_in("<?php class A { public function f(int $a, $b, string ...$c): bool {} }")
        .unwrap();
    let f = classes.first().unwrap().methods.get("f").unwrap();
    assert_eq!(renderer.render(f).unwrap(), "a:int b:? c:string... -> bool\n");
}

#[test]
fn offset_resolution_names_the_enclosing_method() {
    let (source, offset) = common::extract_offset(
        "<?php\nclass Greeter {\n    public function greet(string $name) {\n        <>\n    }\n}",
    );
    let resolution = create_test_reflector().reflect_offset(&source, offset).unwrap();
    assert_eq!(
        create_test_renderer().render(&resolution).unwrap(),
        "Scope: method `Greeter::greet`\n\n#### Variables\n- `$this`: `Greeter`\n- `$name`: `string`\n"
    );
}

#[test]
fn hover_with_docs_only() {
    let classes = create_test_reflector()
        .reflect_classes_in("<?php class Foobar {}")
        .unwrap();
    let hover = HoverInformation::new("", "<b>Docs</b> here", classes.first().unwrap().clone());
    assert_eq!(
        create_test_renderer().render(&hover).unwrap(),
        "Docs here\n\n---\n\n```php\nclass Foobar\n```\n"
    );
}
