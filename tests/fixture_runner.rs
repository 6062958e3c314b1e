//! Golden-output tests for the bundled markdown templates.
//!
//! Each `tests/fixtures/*.fixture` file holds `// key: value` headers, a
//! `--- source ---` section with the PHP snippet, and an `--- expected ---`
//! section with the exact markdown the selected value renders to.
//!
//! Recognised headers:
//!
//! - `select`: `first-class`, `class NAME`, `method NAME`, `property NAME`,
//!   `constant NAME` (members of the first class), `first-function`,
//!   `offset` (position of the `<>` marker), `offset N`, `type EXPR`.
//! - `hover`: `true` wraps the selected symbol in hover information.
//! - `title`, `docs`: hover title and docs.

mod common;

use std::collections::HashMap;

use datatest_stable::Utf8Path;
use phpantom_hover::{HoverInformation, Reflector, Symbol};

const SOURCE_MARKER: &str = "--- source ---\n";
const EXPECTED_MARKER: &str = "--- expected ---\n";

struct Fixture {
    headers: HashMap<String, String>,
    source: String,
    expected: String,
}

fn parse_fixture(content: &str) -> Result<Fixture, String> {
    let (head, rest) = content
        .split_once(SOURCE_MARKER)
        .ok_or("missing source section")?;
    let (source, expected) = rest
        .split_once(EXPECTED_MARKER)
        .ok_or("missing expected section")?;

    let headers = head
        .lines()
        .filter_map(|line| line.strip_prefix("// "))
        .filter_map(|line| line.split_once(": "))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect();

    Ok(Fixture {
        headers,
        source: source.strip_suffix('\n').unwrap_or(source).to_string(),
        expected: expected.to_string(),
    })
}

fn select_symbol(reflector: &Reflector, source: &str, select: &str) -> Result<Symbol, String> {
    let (what, name) = select.split_once(' ').unwrap_or((select, ""));
    let err = |e: phpantom_hover::ReflectionError| e.to_string();

    if what == "first-function" {
        let functions = reflector.reflect_functions_in(source).map_err(err)?;
        return Ok(functions.first().map_err(err)?.clone().into());
    }

    let classes = reflector.reflect_classes_in(source).map_err(err)?;
    let symbol = match what {
        "first-class" => classes.first().map_err(err)?.clone().into(),
        "class" => classes.get(name).map_err(err)?.clone().into(),
        "method" => classes.first().map_err(err)?.methods.get(name).map_err(err)?.clone().into(),
        "property" => classes
            .first()
            .map_err(err)?
            .properties
            .get(name)
            .map_err(err)?
            .clone()
            .into(),
        "constant" => classes
            .first()
            .map_err(err)?
            .constants
            .get(name)
            .map_err(err)?
            .clone()
            .into(),
        other => return Err(format!("unknown selector {other:?}")),
    };
    Ok(symbol)
}

fn render_fixture(fixture: &Fixture) -> Result<String, String> {
    let reflector = common::create_test_reflector();
    let renderer = common::create_test_renderer();
    let select = fixture
        .headers
        .get("select")
        .map(String::as_str)
        .unwrap_or("first-class");

    if select == "offset" {
        let (source, offset) = common::extract_offset(&fixture.source);
        let resolution = reflector
            .reflect_offset(&source, offset)
            .map_err(|e| e.to_string())?;
        return renderer.render(&resolution).map_err(|e| e.to_string());
    }
    if let Some(offset) = select.strip_prefix("offset ") {
        let offset: usize = offset.parse().map_err(|_| format!("bad offset {offset:?}"))?;
        let resolution = reflector
            .reflect_offset(&fixture.source, offset)
            .map_err(|e| e.to_string())?;
        return renderer.render(&resolution).map_err(|e| e.to_string());
    }
    if let Some(expr) = select.strip_prefix("type ") {
        let ty = reflector.resolver().resolve(expr);
        return renderer.render(&ty).map_err(|e| e.to_string());
    }

    let symbol = select_symbol(&reflector, &fixture.source, select)?;
    if fixture.headers.get("hover").is_some_and(|v| v == "true") {
        let hover = HoverInformation::new(
            fixture.headers.get("title").cloned().unwrap_or_default(),
            fixture.headers.get("docs").cloned().unwrap_or_default(),
            symbol,
        );
        return renderer.render(&hover).map_err(|e| e.to_string());
    }
    renderer.render(&symbol).map_err(|e| e.to_string())
}

fn run_fixture(path: &Utf8Path, content: String) -> datatest_stable::Result<()> {
    let fixture = parse_fixture(&content).map_err(|e| format!("{path}: {e}"))?;
    let actual = render_fixture(&fixture).map_err(|e| format!("{path}: {e}"))?;
    if actual != fixture.expected {
        return Err(format!(
            "{path}: output mismatch\n--- expected ---\n{}\n--- actual ---\n{}",
            fixture.expected, actual
        )
        .into());
    }
    Ok(())
}

datatest_stable::harness! {
    { test = run_fixture, root = "tests/fixtures", pattern = r"\.fixture$" },
}
