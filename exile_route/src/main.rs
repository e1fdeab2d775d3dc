//! CLI entry point for exile_route.
//! Usage: cargo run -p exile_route -- compile routes/act --data data

use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};

use exile_data::{CharacterClass, RequiredGem, Route, language, validate_reference_data};
use exile_route::{
    ParseOptions, RouteError, RouteFile, load_reference_dir, parse_route, parse_voidstone_route, read_route_files,
};

#[derive(Parser)]
#[command(author, version, about = "Compile and lint Exile Progression route files.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse route files and print the resolved sections as JSON.
    Compile(CompileArgs),
    /// Parse route files, report the first error with its location, or count tag usage.
    Lint(LintArgs),
    /// List every fragment tag with its parameters.
    Language,
}

#[derive(Args)]
struct SourceArgs {
    /// Route files or directories of `.txt` route files, in route order.
    #[arg(required = true)]
    paths: Vec<PathBuf>,
    /// Directory holding areas.json, quests.json and gems.json.
    #[arg(long)]
    data: PathBuf,
    /// Preprocessor define, repeatable (e.g. LEAGUE_START).
    #[arg(long = "define", short = 'D')]
    defines: Vec<String>,
    /// Treat the sources as the four voidstone routes in this order.
    #[arg(long, value_delimiter = ',')]
    voidstone: Option<Vec<usize>>,
}

#[derive(Args)]
struct CompileArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Character class used for gem reward availability.
    #[arg(long)]
    class: Option<String>,
    /// Required build gem id, repeatable, in build order.
    #[arg(long = "gem")]
    gems: Vec<String>,
    /// Write JSON here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args)]
struct LintArgs {
    #[command(flatten)]
    source: SourceArgs,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Compile(args) => run_compile(&args),
        Commands::Lint(args) => run_lint(&args),
        Commands::Language => {
            print!("{}", language::describe());
            Ok(())
        },
    };
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run_compile(args: &CompileArgs) -> Result<()> {
    let class = match &args.class {
        Some(raw) => Some(CharacterClass::from_name(raw).with_context(|| format!("unknown character class '{raw}'"))?),
        None => None,
    };
    let options = ParseOptions {
        class,
        required_gems: args.gems.iter().map(RequiredGem::new).collect(),
        defines: args.source.defines.iter().cloned().collect(),
    };
    let files = read_route_files(&args.source.paths).context("reading route sources")?;
    let route = parse_sources(&args.source, &files, &options).map_err(|e| anyhow::anyhow!(describe_error(&e, &files)))?;
    let json = serde_json::to_string_pretty(&route).context("serializing route")?;
    match &args.out {
        Some(out) => {
            fs::write(out, json).with_context(|| format!("writing '{}'", out.display()))?;
            info!("wrote {} section(s) to '{}'", route.len(), out.display());
        },
        None => println!("{json}"),
    }
    Ok(())
}

fn run_lint(args: &LintArgs) -> Result<()> {
    let options = ParseOptions {
        defines: args.source.defines.iter().cloned().collect(),
        ..ParseOptions::default()
    };
    let files = read_route_files(&args.source.paths).context("reading route sources")?;
    match parse_sources(&args.source, &files, &options) {
        Ok(route) => {
            let steps: usize = route.iter().map(|s| s.steps.len()).sum();
            eprintln!(
                "lint: OK ({} file(s), {} section(s), {} step(s))",
                files.len(),
                route.len(),
                steps
            );
            for (kind, count) in language::usage(&route) {
                eprintln!("  {:<14} {count}", kind.as_str());
            }
            Ok(())
        },
        Err(e) => bail!(describe_error(&e, &files)),
    }
}

fn parse_sources(source: &SourceArgs, files: &[RouteFile], options: &ParseOptions) -> Result<Route> {
    let reference = load_reference_dir(&source.data)
        .with_context(|| format!("loading reference data from '{}'", source.data.display()))?;
    let problems = validate_reference_data(&reference);
    for problem in &problems {
        warn!("reference data: {problem}");
    }
    let route = match &source.voidstone {
        Some(order) => parse_voidstone_route(files, order, &reference, &options.defines)?,
        None => parse_route(files, &reference, options)?,
    };
    Ok(route)
}

/// Render an error with the offending source line and a caret under it.
fn describe_error(err: &anyhow::Error, files: &[RouteFile]) -> String {
    let Some(route_err) = err.downcast_ref::<RouteError>() else {
        return format!("{err:#}");
    };
    let Some(location) = &route_err.location else {
        return route_err.to_string();
    };
    let line = files
        .iter()
        .find(|f| f.name == location.file)
        .and_then(|f| f.contents.lines().nth(location.line.saturating_sub(1)));
    match (line, &route_err.kind) {
        (Some(line), exile_route::RouteErrorKind::Syntax { column, .. }) => {
            format!("{route_err}\n{line}\n{}^", " ".repeat(column.saturating_sub(1)))
        },
        (Some(line), _) => format!("{route_err}\n{line}"),
        (None, _) => route_err.to_string(),
    }
}
