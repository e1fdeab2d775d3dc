#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** Exile Progression **
//! Track progress through leveling and voidstone routes.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use log::info;
use textwrap::{Options, fill, termwidth};

use exile_data::{ReferenceData, Route, Step, step_key};
use exile_engine::config::CONFIG_FILE;
use exile_engine::loader::{DataLayout, load_atlas_guide, load_challenges, load_reference, load_route_files};
use exile_engine::progress::SectionSummary;
use exile_engine::style::RouteStyle;
use exile_engine::text::{gem_step_text, step_text};
use exile_engine::toggle_store::default_store_path;
use exile_engine::{
    ChallengeData, ChallengeMatcher, ExileConfig, FileToggleStore, Namespace, ParseStatus, ProgressSummary,
    RouteRequest, RouteSession, ToggleStore, atlas_phase_summaries, atlas_summary, challenge_summary, current_section, current_voidstone_section, export_route, gem_summary,
    load_config, route_summary, section_summaries, voidstone_section_summaries, voidstone_summary,
};

#[derive(Parser)]
#[command(author, version, about = "Track progress through Exile Progression routes.")]
struct Cli {
    /// Config file (defaults to exile.toml in the working directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Progress file, overriding the config and the default location.
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Which {
    Act,
    Voidstone,
}

#[derive(Clone, Copy, ValueEnum)]
enum ResetTarget {
    Route,
    Voidstone,
    Gems,
    Challenges,
    Atlas,
}

impl ResetTarget {
    fn namespace(self) -> Namespace {
        match self {
            ResetTarget::Route => Namespace::ROUTE,
            ResetTarget::Voidstone => Namespace::VOIDSTONE,
            ResetTarget::Gems => Namespace::GEMS,
            ResetTarget::Challenges => Namespace::CHALLENGES,
            ResetTarget::Atlas => Namespace::ATLAS,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Overall progress and the steps left in the current section.
    Status {
        #[arg(long, value_enum, default_value = "act")]
        route: Which,
    },
    /// Print every step of a route with its completion state.
    Show {
        #[arg(long, value_enum, default_value = "act")]
        route: Which,
        /// Only this section (index from `status`).
        #[arg(long)]
        section: Option<usize>,
    },
    /// Mark a route step done (or undone with --off).
    Toggle {
        section: usize,
        step: usize,
        #[arg(long, value_enum, default_value = "act")]
        route: Which,
        #[arg(long)]
        off: bool,
    },
    /// Mark a build gem acquired.
    Gem {
        id: String,
        #[arg(long)]
        off: bool,
    },
    /// List challenges, or mark one complete.
    Challenge {
        id: Option<String>,
        #[arg(long)]
        off: bool,
    },
    /// Show the atlas completion guide, or tick one of its steps.
    Atlas {
        id: Option<String>,
        #[arg(long)]
        off: bool,
    },
    /// Clear every toggle in one progress namespace.
    Reset {
        #[arg(value_enum)]
        target: ResetTarget,
    },
    /// Export the act route with the configured Path of Building code.
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Everything a command needs: config, parsed route, reference and store.
struct App {
    config: ExileConfig,
    layout: DataLayout,
    session: RouteSession,
    store: FileToggleStore,
}

impl App {
    fn open(cli: &Cli) -> Result<Self> {
        let config_path = cli.config.clone().unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
        let config = load_config(&config_path);
        let layout = DataLayout::from_config(&config);
        let store_path = cli
            .store
            .clone()
            .or_else(|| config.store_path.clone())
            .unwrap_or_else(default_store_path);
        let store = FileToggleStore::open(&store_path).context("while opening the progress store")?;
        let mut session = RouteSession::new();
        session.install_reference(load_reference(&layout.data_dir)?);
        Ok(Self {
            config,
            layout,
            session,
            store,
        })
    }

    fn reference(&self) -> Result<&ReferenceData> {
        self.session.reference().context("reference data is not loaded")
    }

    fn route(&mut self, which: Which) -> Result<Arc<Route>> {
        let request = match which {
            Which::Act => RouteRequest::act(load_route_files(&self.layout.route_dir)?, self.config.parse_options()),
            Which::Voidstone => RouteRequest::voidstone(
                load_route_files(&self.layout.voidstone_dir)?,
                self.config.voidstone_order.clone(),
                self.config.parse_options(),
            ),
        };
        let (ticket, status) = self.session.try_parse(&request);
        self.session.accept(ticket, status.clone());
        match status {
            ParseStatus::Ready(route) => Ok(route),
            ParseStatus::Pending => bail!("route parse is pending: reference data is not loaded"),
            ParseStatus::Failed(err) => Err(anyhow::Error::new(err).context("while parsing route")),
        }
    }
}

fn namespace_for(which: Which) -> Namespace {
    match which {
        Which::Act => Namespace::ROUTE,
        Which::Voidstone => Namespace::VOIDSTONE,
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    info!("Start: loading config, reference data and progress...");
    let mut app = App::open(&cli)?;
    match cli.command {
        Commands::Status { route } => run_status(&mut app, route),
        Commands::Show { route, section } => run_show(&mut app, route, section),
        Commands::Toggle {
            section,
            step,
            route,
            off,
        } => run_toggle(&mut app, route, section, step, !off),
        Commands::Gem { id, off } => {
            app.store.set(Namespace::GEMS, &id, !off)?;
            println!("{} {}", if off { "unmarked" } else { "acquired" }, id.gem_style());
            Ok(())
        },
        Commands::Challenge { id, off } => run_challenge(&mut app, id.as_deref(), !off),
        Commands::Atlas { id, off } => run_atlas(&mut app, id.as_deref(), !off),
        Commands::Reset { target } => {
            app.store.clear_all(target.namespace())?;
            println!("cleared {} in '{}'", target.namespace(), app.store.path().display());
            Ok(())
        },
        Commands::Export { out } => run_export(&mut app, out),
    }
}

fn summary_line(label: &str, summary: ProgressSummary) -> String {
    format!(
        "{label:<12} {:>4}/{:<4} {}",
        summary.completed,
        summary.total,
        format!("{:.0}%", summary.percent()).percent_style()
    )
}

fn print_sections(sections: &[SectionSummary]) {
    for (idx, section) in sections.iter().enumerate() {
        let mark = if section.summary().is_complete() { "✔" } else { " " };
        println!(
            "  {mark} {idx:>2} {} {}/{}",
            section.name.section_style(),
            section.completed,
            section.total
        );
    }
}

fn run_status(app: &mut App, which: Which) -> Result<()> {
    let route = app.route(which)?;
    let reference = app.reference()?;
    let store = &app.store;
    println!("{}", "Exile Progression".heading_style());
    if let Some(league) = &app.config.league {
        println!("league: {league}");
    }
    match which {
        Which::Act => {
            println!("{}", summary_line("route", route_summary(&route, store)));
            println!("{}", summary_line("gems", gem_summary(&route, store)));
            println!("{}", summary_line("sections", section_count(&section_summaries(&route, store))));
            print_sections(&section_summaries(&route, store));
        },
        Which::Voidstone => {
            println!("{}", summary_line("voidstones", voidstone_summary(&route, store)));
            print_sections(&voidstone_section_summaries(&route, store));
        },
    }
    if let Ok(challenges) = load_challenges(&app.layout.data_dir)
        && !challenges.challenges.is_empty()
    {
        println!("{}", summary_line("challenges", challenge_summary(&challenges.ids(), store)));
    }
    if let Ok(guide) = load_atlas_guide(&app.layout.data_dir)
        && !guide.phases.is_empty()
    {
        println!("{}", summary_line("atlas", atlas_summary(&guide, store)));
    }

    let current = match which {
        Which::Act => current_section(&route, store),
        Which::Voidstone => current_voidstone_section(&route, store),
    };
    let Some(current) = current else {
        println!("\n{}", "Route complete.".heading_style());
        return Ok(());
    };
    println!("\n{} {}", "Next:".heading_style(), current.section.name.section_style());
    let width = termwidth();
    for (step_index, step) in &current.pending {
        let label = format!("{:>2},{:<3} ", current.index, step_index);
        let opts = Options::new(width).initial_indent(&label).subsequent_indent("        ");
        println!("{}", fill(&step_text(step, reference), opts).step_pending_style());
    }
    Ok(())
}

/// Sections completed out of sections in the route.
fn section_count(sections: &[SectionSummary]) -> ProgressSummary {
    ProgressSummary {
        completed: sections.iter().filter(|s| s.summary().is_complete()).count(),
        total: sections.len(),
    }
}

fn run_show(app: &mut App, which: Which, only: Option<usize>) -> Result<()> {
    let route = app.route(which)?;
    let challenges = load_challenges(&app.layout.data_dir)?;
    let reference = app.reference()?;
    let ns = namespace_for(which);
    let tagged = ChallengeMatcher::new(&challenges).annotate(&route);
    for (s, section) in route.iter().enumerate() {
        if only.is_some_and(|o| o != s) {
            continue;
        }
        println!("{}", section.name.section_style());
        for (i, step) in section.steps.iter().enumerate() {
            match step {
                Step::Fragment(step) => {
                    let done = app.store.get(ns, &step_key(s, i));
                    let text = format!("{s:>2},{i:<3} {}", step_text(step, reference));
                    if done {
                        println!("{}", text.step_done_style());
                    } else {
                        println!("{}", text.step_pending_style());
                    }
                    for tag in tagged.iter().filter(|t| t.section == s && t.step == i) {
                        print_challenge_refs(&challenges, &tag.challenge_ids, &app.store);
                    }
                },
                Step::Gem(gem) => {
                    let done = app.store.get(Namespace::GEMS, &gem.required_gem.id);
                    let mark = if done { "✔" } else { "•" };
                    println!("       {mark} {}", gem_step_text(gem, reference).gem_style());
                },
            }
        }
    }
    Ok(())
}

fn print_challenge_refs(challenges: &ChallengeData, ids: &[String], store: &dyn ToggleStore) {
    for id in ids {
        let text = challenges.get(id).map_or(id.as_str(), |c| c.text.as_str());
        let mark = if store.get(Namespace::CHALLENGES, id) { "✔" } else { "★" };
        println!("         {mark} {}", text.challenge_style());
    }
}

fn run_toggle(app: &mut App, which: Which, section: usize, step: usize, value: bool) -> Result<()> {
    let route = app.route(which)?;
    let target = route
        .get(section)
        .and_then(|s| s.steps.get(step))
        .with_context(|| format!("no step {section},{step} in this route"))?;
    if !target.is_fragment_step() {
        bail!("step {section},{step} is a gem step; use `gem <id>` instead");
    }
    app.store.set(namespace_for(which), &step_key(section, step), value)?;
    let summary = match which {
        Which::Act => route_summary(&route, &app.store),
        Which::Voidstone => voidstone_summary(&route, &app.store),
    };
    println!("{}", summary_line("progress", summary));
    Ok(())
}

fn run_challenge(app: &mut App, id: Option<&str>, value: bool) -> Result<()> {
    let challenges = load_challenges(&app.layout.data_dir)?;
    let Some(id) = id else {
        for challenge in &challenges.challenges {
            let mark = if app.store.get(Namespace::CHALLENGES, &challenge.id) { "✔" } else { " " };
            println!("{mark} {:<20} {}", challenge.id, challenge.text.challenge_style());
        }
        println!("{}", summary_line("challenges", challenge_summary(&challenges.ids(), &app.store)));
        return Ok(());
    };
    if challenges.get(id).is_none() {
        bail!("unknown challenge '{}'", id.error_style());
    }
    app.store.set(Namespace::CHALLENGES, id, value)?;
    println!("{}", summary_line("challenges", challenge_summary(&challenges.ids(), &app.store)));
    Ok(())
}

fn run_atlas(app: &mut App, id: Option<&str>, value: bool) -> Result<()> {
    let guide = load_atlas_guide(&app.layout.data_dir)?;
    if let Some(id) = id {
        if guide.get(id).is_none() {
            bail!("unknown atlas step '{}'", id.error_style());
        }
        app.store.set(Namespace::ATLAS, id, value)?;
        println!("{}", summary_line("atlas", atlas_summary(&guide, &app.store)));
        return Ok(());
    }
    let width = termwidth();
    for (phase, summary) in guide.phases.iter().zip(atlas_phase_summaries(&guide, &app.store)) {
        println!("{} {}/{}", phase.phase.section_style(), summary.completed, summary.total);
        for step in &phase.steps {
            let done = app.store.get(Namespace::ATLAS, &step.id);
            let line = format!("{} {:<18} {}", if done { "✔" } else { " " }, step.id, step.label);
            println!("{}", if done { line.step_done_style() } else { line.step_pending_style() });
            if let Some(detail) = &step.detail {
                let opts = Options::new(width).initial_indent("      ").subsequent_indent("      ");
                println!("{}", fill(detail, opts).dimmed());
            }
        }
    }
    println!("{}", summary_line("atlas", atlas_summary(&guide, &app.store)));
    Ok(())
}

fn run_export(app: &mut App, out: Option<PathBuf>) -> Result<()> {
    let route = app.route(Which::Act)?;
    let json = export_route(&route, app.config.pob_code.as_deref())?;
    match out {
        Some(path) => {
            fs::write(&path, json).with_context(|| format!("writing '{}'", path.display()))?;
            println!("exported {} section(s) to '{}'", route.len(), path.display().to_string().bold());
        },
        None => println!("{json}"),
    }
    Ok(())
}
