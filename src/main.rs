use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser};

use phpantom_hover::{
    ClassLike, Collection, DirectorySourceLocator, DocblockMemberProvider, Function,
    HoverInformation, ObjectRendererBuilder, ReflectionError, ReflectorBuilder, Symbol,
    TemporarySourceLocator,
};

mod config;

use config::Config;

/// Render hover markdown for a symbol in a PHP file.
#[derive(Parser, Debug)]
#[command(name = "phpantom-hover", version, about)]
struct Cli {
    /// PHP file to reflect
    file: PathBuf,

    #[command(flatten)]
    selector: Selector,

    /// Wrap the symbol in hover information with this title
    #[arg(long)]
    title: Option<String>,

    /// Wrap the symbol in hover information with these docs
    #[arg(long)]
    docs: Option<String>,

    /// Directory of `<variant-key>.md.hbs` templates overriding the bundled ones
    #[arg(long, value_name = "DIR")]
    templates: Option<PathBuf>,

    /// Additional source root for resolving supertypes (repeatable)
    #[arg(long = "root", value_name = "DIR")]
    roots: Vec<PathBuf>,

    /// Config file to use instead of searching for .phpantom-hover.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct Selector {
    /// Byte offset to resolve the scope at
    #[arg(long)]
    offset: Option<usize>,

    /// Class, interface, trait or enum declared in the file
    #[arg(long, value_name = "NAME")]
    class: Option<String>,

    /// Function declared in the file
    #[arg(long, value_name = "NAME")]
    function: Option<String>,

    /// Method, property or constant of a class declared in the file
    #[arg(long, value_name = "CLASS::NAME")]
    member: Option<String>,

    /// Type expression to resolve, e.g. "string|bool|null"
    #[arg(long = "type", value_name = "EXPR")]
    type_expr: Option<String>,
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the rendered markdown.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("PHPANTOM_HOVER_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_path(path)?,
        None => match Config::load()? {
            Some((config, path)) => {
                tracing::debug!("using config {}", path.display());
                config
            }
            None => Config::default(),
        },
    };

    let markdown = run(&cli, &config)?;
    print!("{markdown}");
    Ok(())
}

fn run(cli: &Cli, config: &Config) -> Result<String> {
    let source = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;

    // The file itself is the first place supertypes are looked up in, then
    // the configured roots.
    let file_locator = Arc::new(TemporarySourceLocator::new());
    file_locator.set_source(source.as_str());

    let mut builder = ReflectorBuilder::new()
        .add_locator(file_locator)
        .add_member_provider(DocblockMemberProvider)
        .enable_contextual_source_location()
        .with_cache(config.cache.enabled)
        .unresolved_token_policy(config.types.unresolved_in_union);
    let roots: Vec<PathBuf> = cli
        .roots
        .iter()
        .chain(config.locator.roots.iter())
        .cloned()
        .collect();
    if !roots.is_empty() {
        builder = builder.add_locator(DirectorySourceLocator::with_roots(roots));
    }
    let reflector = builder.build();

    let mut renderer = ObjectRendererBuilder::new().with_default_templates();
    if let Some(dir) = cli.templates.as_ref().or(config.templates.path.as_ref()) {
        renderer = renderer.add_template_path(dir);
    }
    if config.templates.interface_candidates {
        renderer = renderer.enable_interface_candidates();
    }
    let renderer = renderer.build()?;

    let selector = &cli.selector;
    if let Some(offset) = selector.offset {
        let resolution = reflector.reflect_offset(&source, offset)?;
        return Ok(renderer.render(&resolution)?);
    }
    if let Some(expr) = &selector.type_expr {
        let ty = reflector.resolver().resolve(expr);
        return Ok(renderer.render(&ty)?);
    }

    let symbol = select_symbol(&reflector.reflect_classes_in(&source)?, selector, || {
        reflector.reflect_functions_in(&source)
    })?;

    if cli.title.is_some() || cli.docs.is_some() {
        let hover = HoverInformation::new(
            cli.title.clone().unwrap_or_default(),
            cli.docs.clone().unwrap_or_default(),
            symbol,
        );
        return Ok(renderer.render(&hover)?);
    }
    Ok(renderer.render(&symbol)?)
}

fn select_symbol(
    classes: &Collection<ClassLike>,
    selector: &Selector,
    functions: impl FnOnce() -> Result<Collection<Function>, ReflectionError>,
) -> Result<Symbol> {
    if let Some(name) = &selector.class {
        return Ok(classes.get(name)?.clone().into());
    }
    if let Some(name) = &selector.function {
        return Ok(functions()?.get(name)?.clone().into());
    }
    if let Some(member) = &selector.member {
        let Some((class_name, member_name)) = member.split_once("::") else {
            bail!("--member expects CLASS::NAME, got {member:?}");
        };
        let class = classes.get(class_name)?;
        if let Some(method) = class.methods.find(member_name) {
            return Ok(method.clone().into());
        }
        if let Some(property) = class.properties.find(member_name) {
            return Ok(property.clone().into());
        }
        return Ok(class.constants.get(member_name)?.clone().into());
    }
    bail!("no symbol selected")
}
