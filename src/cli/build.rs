//! Unity command implementations (generate, build)

use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::{UnityArgs, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::build::{
    absolutize, discover_files, leaves, ArtifactBuilder, ArtifactKind, BuildRequest,
    CommandBuilder, SourceItem, UnityBuilder, UnityOutcome,
};
use crate::config::loader::{
    default_config, find_config, load_config, merge_cli_overrides, project_root, resolve_path,
};
use crate::config::{UnityConfig, UnityDefaults};

/// One artifact to process.
#[derive(Debug, Clone)]
struct Job {
    kind: ArtifactKind,
    target: PathBuf,
    sources: Vec<SourceItem>,
    args: Vec<String>,
    cache_dir: Option<PathBuf>,
}

/// Artifact builder for `generate`: hands the request back untouched.
fn collect(request: BuildRequest) -> Result<BuildRequest, Infallible> {
    Ok(request)
}

/// Run the generate command
pub fn run_generate(args: &UnityArgs) -> ExitCode {
    run_jobs(args, false)
}

/// Run the build command
pub fn run_build(args: &UnityArgs) -> ExitCode {
    run_jobs(args, true)
}

fn run_jobs(args: &UnityArgs, compile: bool) -> ExitCode {
    let (config, root) = match resolve_config(args) {
        Ok(found) => found,
        Err(code) => return code,
    };

    let jobs = match plan_jobs(args, &config, &root) {
        Ok(jobs) => jobs,
        Err((code, message)) => {
            eprintln!("Error: {}", message);
            return ExitCode::from(code);
        }
    };

    if jobs.is_empty() {
        eprintln!("Error: No targets to process");
        eprintln!("Pass SOURCES on the command line or define [targets] in unity.toml");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let mut defaults = config.defaults();
    defaults.cache_dir = resolve_path(&root, &defaults.cache_dir);
    let command = CommandBuilder::new(config.compiler.clone());

    let mut outcomes = Vec::new();
    for job in jobs {
        let result = if args.dry_run {
            Ok(UnityBuilder::new(collect, job.kind, defaults.clone()).plan(
                &job.target,
                &job.sources,
                job.cache_dir.as_deref(),
            ))
        } else if compile {
            build_job(command.clone(), &defaults, job.clone()).map(|(artifact, outcome)| {
                println!("Built {} ({})", artifact.display(), job.kind);
                outcome
            })
        } else {
            build_job(collect, &defaults, job.clone()).map(|(_, outcome)| outcome)
        };

        match result {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => {
                eprintln!("Error: {}: {}", job.target.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }

    print_outcomes(&outcomes, args.json, args.dry_run)
}

/// Generate aggregates for one job and run `base` on them.
fn build_job<B: ArtifactBuilder>(
    base: B,
    defaults: &UnityDefaults,
    job: Job,
) -> Result<(B::Output, UnityOutcome), String> {
    UnityBuilder::new(base, job.kind, defaults.clone())
        .build(&job.target, job.sources, job.args, job.cache_dir.as_deref())
        .map_err(|e| e.to_string())
}

fn print_outcomes(outcomes: &[UnityOutcome], json: bool, dry_run: bool) -> ExitCode {
    if json {
        return match serde_json::to_string_pretty(outcomes) {
            Ok(text) => {
                println!("{}", text);
                ExitCode::from(EXIT_SUCCESS)
            }
            Err(e) => {
                eprintln!("Error: Failed to serialize outcome: {}", e);
                ExitCode::from(EXIT_ERROR)
            }
        };
    }

    if dry_run {
        println!("Dry run - would generate:");
    }
    for outcome in outcomes {
        println!("{}", outcome.summary());
        println!("  Artifact inputs:");
        for input in leaves(&outcome.forwarded) {
            println!("    {}", input.display());
        }
    }
    ExitCode::from(EXIT_SUCCESS)
}

/// Load unity.toml (or defaults) and apply command-line overrides.
///
/// Returns the config and the project root relative paths resolve against.
fn resolve_config(args: &UnityArgs) -> Result<(UnityConfig, PathBuf), ExitCode> {
    let cwd = std::env::current_dir().unwrap_or_default();

    let (config, root) = match args.config.clone().or_else(find_config) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "using config");
            let config = load_config(Some(&path)).map_err(|e| {
                eprintln!("Error loading config: {}", e);
                ExitCode::from(EXIT_ERROR)
            })?;
            let path = resolve_path(&cwd, &path);
            let root = project_root(&path, &config);
            (config, root)
        }
        None => {
            tracing::debug!("no unity.toml found, using defaults");
            (default_config(), cwd)
        }
    };

    let config = merge_cli_overrides(config, &args.overrides()).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_INVALID_ARGS)
    })?;

    Ok((config, root))
}

/// Work out which artifacts to process.
///
/// SOURCES on the command line make a single ad-hoc target; otherwise the
/// named target (or every target) from unity.toml is used.
fn plan_jobs(
    args: &UnityArgs,
    config: &UnityConfig,
    root: &Path,
) -> Result<Vec<Job>, (u8, String)> {
    if !args.sources.is_empty() {
        let target = args.target.as_ref().ok_or_else(|| {
            (EXIT_INVALID_ARGS, "A target path is required with SOURCES".to_string())
        })?;
        let cwd = std::env::current_dir().unwrap_or_else(|_| root.to_path_buf());
        let sources = args.sources.iter().cloned().map(SourceItem::classify).collect();

        return Ok(vec![Job {
            kind: args.kind.unwrap_or_default(),
            target: cwd.join(target),
            sources: absolutize(&cwd, sources),
            args: Vec::new(),
            cache_dir: None,
        }]);
    }

    let selected: Vec<_> = match &args.target {
        Some(name) => match config.targets.get_key_value(name) {
            Some(entry) => vec![entry],
            None => {
                return Err((
                    EXIT_INVALID_ARGS,
                    format!("Unknown target '{}' (not defined in unity.toml)", name),
                ))
            }
        },
        None => config.targets.iter().collect(),
    };

    let mut jobs = Vec::new();
    for (name, target) in selected {
        let discover = |patterns: &[String]| {
            discover_files(root, patterns).map_err(|e| (EXIT_ERROR, e.to_string()))
        };
        let sources = discover(target.sources.as_slice())?;
        let passthrough = discover(target.passthrough.as_slice())?;

        if sources.is_empty() {
            tracing::warn!(target_name = %name, "no sources matched");
        }

        let mut items: Vec<SourceItem> = sources.into_iter().map(SourceItem::Source).collect();
        items.extend(passthrough.into_iter().map(SourceItem::Node));

        // --cache-dir beats a per-target cache_dir
        let cache_dir = match args.cache_dir {
            Some(_) => None,
            None => Some(resolve_path(root, &config.effective_cache_dir(target))),
        };

        let output = target.output.clone().unwrap_or_else(|| PathBuf::from(name));
        jobs.push(Job {
            kind: args.kind.unwrap_or(target.kind),
            target: resolve_path(root, &output),
            sources: items,
            args: target.args.clone(),
            cache_dir,
        });
    }

    Ok(jobs)
}
