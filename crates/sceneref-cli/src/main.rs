//! `sceneref` command-line tool
//!
//! Loads a YAML or JSON manifest, runs the reference engine over its scene
//! and reports what it found.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use sceneref_engine::{
    Diagnostic, EngineConfig, ExecutionMode, ObjectGraph, RefEngine, RefError, ValidationOutcome,
};
use sceneref_model::{RefFlags, TypeKey};
use sceneref_scene::{Manifest, ManifestError, MemoryScene};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Exit code: every reference is valid
const EXIT_OK: i32 = 0;
/// Exit code: at least one diagnostic was reported
const EXIT_INVALID: i32 = 1;
/// Exit code: a declaration error aborted the run
const EXIT_FATAL: i32 = 2;

fn cli() -> Command {
    Command::new("sceneref")
        .version(sceneref_engine::VERSION)
        .about("Resolve and validate declared scene references")
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("validate")
                .about("Resolve and validate every annotated instance in a manifest")
                .arg(
                    Arg::new("manifest")
                        .required(true)
                        .help("Manifest file (.yaml, .yml or .json)"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_name("FILE")
                        .help("Engine configuration (TOML)"),
                )
                .arg(
                    Arg::new("live")
                        .long("live")
                        .action(ArgAction::SetTrue)
                        .help("Run in live mode: validate stored values without resolving"),
                )
                .arg(
                    Arg::new("clean")
                        .long("clean")
                        .action(ArgAction::SetTrue)
                        .help("Clear resolvable fields before validating"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the outcome as JSON"),
                ),
        )
        .subcommand(
            Command::new("scan")
                .about("Print the annotated fields of a type, inherited ones included")
                .arg(
                    Arg::new("manifest")
                        .required(true)
                        .help("Manifest file (.yaml, .yml or .json)"),
                )
                .arg(Arg::new("type").required(true).help("Type name")),
        )
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_logging(matches.get_flag("log-json"));

    match matches.subcommand() {
        Some(("validate", args)) => {
            let code = run_validate(args)?;
            std::process::exit(code);
        }
        Some(("scan", args)) => run_scan(args),
        _ => Ok(()),
    }
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run_validate(args: &ArgMatches) -> Result<i32> {
    let manifest = required(args, "manifest")?;
    let config = load_config(args.get_one::<String>("config").map(Path::new), args.get_flag("live"))?;
    let json = args.get_flag("json");

    let (registry, mut scene) = match Manifest::load(manifest) {
        Ok(loaded) => loaded,
        Err(ManifestError::Declaration(err)) => return Ok(fatal(&RefError::from(err), json)),
        Err(ManifestError::Registry(err)) => return Ok(fatal(&RefError::from(err), json)),
        Err(err) => return Err(anyhow::Error::new(err).context(format!("loading {manifest}"))),
    };

    let engine = RefEngine::new(Arc::new(registry), config);
    let result = if args.get_flag("clean") {
        clean_validate_all(&engine, &mut scene)
    } else {
        engine.validate_all(&mut scene)
    };

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => return Ok(fatal(&err, json)),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        for diagnostic in outcome.diagnostics() {
            println!("{diagnostic}");
        }
        println!(
            "{} diagnostic(s), {} field write(s)",
            outcome.diagnostics().len(),
            scene.writes()
        );
    }
    Ok(if outcome.is_success() { EXIT_OK } else { EXIT_INVALID })
}

fn clean_validate_all(engine: &RefEngine, scene: &mut MemoryScene) -> Result<ValidationOutcome, RefError> {
    let annotated = engine.registry().annotated_types();
    let instances = scene.all_instances(engine.config().batch_include_inactive);

    let mut outcome = ValidationOutcome::new();
    for instance in instances.iter().filter(|a| annotated.contains(&a.ty)) {
        outcome.merge(engine.clean_validate(scene, instance, false)?);
    }
    Ok(outcome)
}

fn fatal(err: &RefError, json: bool) -> i32 {
    tracing::error!("Reference validation aborted: {}", err);

    let diagnostic = Diagnostic::fatal(err);
    if json {
        let mut outcome = ValidationOutcome::new();
        outcome.push(diagnostic);
        match serde_json::to_string_pretty(&outcome) {
            Ok(text) => println!("{text}"),
            Err(err) => tracing::error!("failed to encode outcome: {}", err),
        }
    } else {
        println!("fatal: {diagnostic}");
    }
    EXIT_FATAL
}

fn run_scan(args: &ArgMatches) -> Result<()> {
    let manifest = required(args, "manifest")?;
    let ty = TypeKey::new(required(args, "type")?);

    let registry = Manifest::read(manifest)?.registry()?;
    if !registry.contains(&ty) {
        anyhow::bail!("type '{ty}' is not declared in {manifest}");
    }

    let chain = registry.types().chain(&ty);
    println!(
        "{}",
        chain.iter().map(ToString::to_string).collect::<Vec<_>>().join(" : ")
    );

    let fields = registry.scan(&ty);
    if fields.is_empty() {
        println!("  (no annotated fields)");
    }
    for field in fields.iter() {
        let mut line = format!(
            "  {}.{}: {} [{}]",
            field.owner(),
            field.name(),
            field.expected_label(),
            field.strategy()
        );
        let flags = flag_names(field.flags());
        if !flags.is_empty() {
            line.push_str(&format!(" {}", flags.join(",")));
        }
        if field.is_indirect() {
            line.push_str(" (interface)");
        }
        if let Some(filter) = field.filter() {
            line.push_str(&format!(" filter={filter:?}"));
        }
        println!("{line}");
    }
    Ok(())
}

fn flag_names(flags: RefFlags) -> Vec<&'static str> {
    RefFlags::NAMES
        .iter()
        .filter(|(_, flag)| flags.contains(*flag))
        .map(|(name, _)| *name)
        .collect()
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a str> {
    args.get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("missing argument '{name}'"))
}

fn load_config(path: Option<&Path>, live: bool) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            parse_config(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    Ok(if live { config.with_mode(ExecutionMode::Live) } else { config })
}

fn parse_config(text: &str) -> Result<EngineConfig> {
    Ok(toml::from_str(text)?)
}
