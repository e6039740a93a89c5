#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::Report;
use tracing::info;
use tracing_subscriber::EnvFilter;

use weave_core::{CrossMixinPolicy, Resolution, Resolver, ResolverOptions};
use weave_model::Snapshot;

mod manifest;
mod output;
mod report;

#[derive(Parser, Debug)]
#[command(name = "weave", version, about = "Compile-time mixin composition resolver")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum CrossMixinArg {
    /// Copy both members silently
    Allow,
    /// Copy both members and warn
    Warn,
    /// Keep the first member; the later one is an error
    Reject,
}

impl From<CrossMixinArg> for CrossMixinPolicy {
    fn from(v: CrossMixinArg) -> Self {
        match v {
            CrossMixinArg::Allow => CrossMixinPolicy::Allow,
            CrossMixinArg::Warn => CrossMixinPolicy::Warn,
            CrossMixinArg::Reject => CrossMixinPolicy::Reject,
        }
    }
}

#[derive(clap::Args, Debug)]
struct ResolveArgs {
    /// Type snapshot (JSON) exported by the host
    path: PathBuf,

    /// Capability interface name prefix. Overrides `weave.toml`.
    #[arg(long)]
    prefix: Option<String>,

    /// Policy for members supplied by more than one mixin
    #[arg(long, value_enum)]
    cross_mixin: Option<CrossMixinArg>,

    /// Resolve on the calling thread instead of the rayon pool
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Write a machine-readable resolution report (JSON)
    #[arg(long)]
    report: Option<PathBuf>,

    /// Exit non-zero when any warning is produced
    #[arg(long, default_value_t = false)]
    deny_warnings: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Resolve a snapshot and write capability interfaces and augmentations
    Build {
        #[command(flatten)]
        args: ResolveArgs,

        /// Output directory for generated files. Overrides `weave.toml`.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Resolve a snapshot and report diagnostics without writing artifacts
    Check {
        #[command(flatten)]
        args: ResolveArgs,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("WEAVE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> miette::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Build { args, out } => run(&args, Some(out)),
        Cmd::Check { args } => run(&args, None),
    }
}

fn resolver_options(args: &ResolveArgs, resolved: &manifest::ResolvedManifest) -> ResolverOptions {
    let mut options = resolved.resolver.clone();
    if let Some(prefix) = &args.prefix {
        options.interface_prefix = prefix.clone();
    }
    if let Some(policy) = args.cross_mixin {
        options.cross_mixin_conflicts = policy.into();
    }
    if args.sequential {
        options.parallel = false;
    }
    options
}

/// `out` is `Some` for `build` (holding the optional `--out` override) and
/// `None` for `check`.
fn run(args: &ResolveArgs, out: Option<Option<PathBuf>>) -> miette::Result<()> {
    let resolved = manifest::load_resolved_manifest(&args.path)?;
    if let Some(path) = &resolved.manifest_path {
        info!(manifest = %path.display(), root = %resolved.project_root.display(), "using manifest");
    }
    let options = resolver_options(args, &resolved);

    let snapshot = Snapshot::load(&args.path)?;
    let resolution = Resolver::new(options).resolve(&snapshot);
    render_diagnostics(&resolution);

    let (outcomes, removed) = match &out {
        Some(dir) => {
            let out_dir = dir.clone().unwrap_or_else(|| resolved.out_dir.clone());
            let outcomes = output::write_artifacts(&out_dir, &resolution.artifacts)?;
            let removed = output::remove_stale(&out_dir, &resolution.artifacts)?;
            let written = outcomes.iter().filter(|o| o.written).count();
            println!(
                "wrote {written} of {} file(s) to {}",
                outcomes.len(),
                out_dir.display()
            );
            if !removed.is_empty() {
                println!("removed {} stale file(s)", removed.len());
            }
            (outcomes, removed)
        }
        None => (output::dry_run(&resolution.artifacts), Vec::new()),
    };

    let failed = resolution.has_errors() || (args.deny_warnings && !resolution.warnings().is_empty());

    if let Some(report_path) = args.report.as_ref().or(resolved.report.as_ref()) {
        let report = report::build_report(&args.path, !failed, &resolution, &outcomes, &removed);
        report::write_report(&report, report_path)?;
    }

    print_summary(&args.path, &resolution);

    if failed {
        return Err(miette::miette!(
            "resolution failed: {} error(s), {} warning(s)",
            resolution.errors().len(),
            resolution.warnings().len()
        ));
    }
    Ok(())
}

fn render_diagnostics(resolution: &Resolution) {
    for diagnostic in &resolution.diagnostics {
        eprintln!("{:?}", Report::new(diagnostic.clone()));
    }
}

fn print_summary(path: &Path, resolution: &Resolution) {
    println!(
        "{}: {} interface(s), {} augmentation(s), {} error(s), {} warning(s)",
        path.display(),
        resolution.interfaces.len(),
        resolution.augmentations.len(),
        resolution.errors().len(),
        resolution.warnings().len()
    );
}
