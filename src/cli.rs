use crate::{
    actual::load_actual,
    config::Config,
    error::SplitCheckError,
    pipeline::{PathSource, Validator},
    report::OverallValidationResult,
    store::FileStore,
    util::ensure_dir,
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "split-check")]
#[command(about = "Grades PDF split results against XML ground truth")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./split-check.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show store location and availability.
    Doctor {},
    /// Parse a ground-truth XML and print the expected documents.
    Parse {
        #[command(flatten)]
        target: Target,
    },
    /// Score an actual split (JSON) against a ground-truth XML.
    Validate {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        actual: PathBuf,
        /// Write the report here instead of printing it.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Manage stored artifacts.
    Store {
        #[command(subcommand)]
        cmd: StoreCommand,
    },
}

/// Ground truth given either as a local path or as a stored artifact id.
#[derive(clap::Args, Debug)]
#[group(multiple = false)]
pub struct Target {
    #[arg(long)]
    pub ground_truth: Option<PathBuf>,
    #[arg(long)]
    pub id: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum StoreCommand {
    Put {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    Get {
        id: String,
        #[arg(long)]
        out: PathBuf,
    },
    Meta {
        id: String,
    },
    List {
        #[arg(long, default_value_t = 0)]
        skip: usize,
        #[arg(long)]
        limit: Option<usize>,
    },
    Delete {
        id: String,
    },
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg = match resolve_config_path(args.config.as_deref())? {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    let _guard = init_logging(&args, &cfg, resolve_log_path(&cfg).as_deref())?;

    let result = match &args.cmd {
        Command::Doctor {} => doctor(&cfg),
        Command::Parse { target } => parse(&cfg, target),
        Command::Validate {
            target,
            actual,
            out,
        } => validate(&cfg, target, actual, out.as_deref()),
        Command::Store { cmd } => store(&cfg, cmd),
    };
    // Logged here so the file appender flushes it before the guard drops.
    if let Err(err) = &result {
        error!("{:#}", err);
    }
    result
}

fn resolve_config_path(user: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(p) = user {
        if !p.exists() {
            return Err(anyhow!("config not found: {}", p.display()));
        }
        return Ok(Some(p.to_path_buf()));
    }
    for candidate in ["split-check.toml", "split-check.example.toml"] {
        let path = PathBuf::from(candidate);
        if path.exists() {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }

    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }

    Some(PathBuf::from(&cfg.paths.out_dir).join("split-check.log"))
}

fn doctor(cfg: &Config) -> Result<()> {
    let health = FileStore::from_config(cfg).health();
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "store": health,
            "max_artifact_bytes": cfg.limits.max_artifact_bytes,
            "reject_url_inputs": cfg.security.reject_url_inputs,
        }))?
    );
    Ok(())
}

fn parse(cfg: &Config, target: &Target) -> Result<()> {
    let expected = match (&target.ground_truth, &target.id) {
        (Some(path), _) => Validator::new(cfg, PathSource::new(cfg))
            .load_ground_truth(&path.to_string_lossy())
            .with_context(|| format!("parsing ground truth: {}", path.display()))?,
        (None, Some(id)) => Validator::new(cfg, FileStore::from_config(cfg))
            .load_ground_truth(id)
            .with_context(|| format!("parsing stored ground truth: {id}"))?,
        (None, None) => return Err(missing_target().into()),
    };
    println!("{}", serde_json::to_string_pretty(&expected)?);
    Ok(())
}

fn validate(cfg: &Config, target: &Target, actual: &Path, out: Option<&Path>) -> Result<()> {
    let req = load_actual(actual)
        .with_context(|| format!("loading actual results: {}", actual.display()))?;

    let report = match (&target.ground_truth, target.id.as_ref().or(req.xml_file_id.as_ref())) {
        (Some(path), _) => Validator::new(cfg, PathSource::new(cfg))
            .validate(&path.to_string_lossy(), &req.split_docs)
            .with_context(|| format!("validating against {}", path.display()))?,
        (None, Some(id)) => Validator::new(cfg, FileStore::from_config(cfg))
            .validate(id, &req.split_docs)
            .with_context(|| format!("validating against stored {id}"))?,
        (None, None) => return Err(missing_target().into()),
    };

    let rendered = serde_json::to_string_pretty(&report)?;

    if cfg.output.write_report_json {
        let out_dir = PathBuf::from(&cfg.paths.out_dir);
        ensure_dir(&out_dir)?;
        let path = out_dir.join(&cfg.output.report_filename);
        std::fs::write(&path, &rendered)
            .with_context(|| format!("writing report: {}", path.display()))?;
        info!("report written to {}", path.display());
    }

    match out {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("writing report: {}", path.display()))?;
            if cfg.output.print_summary {
                print_summary(&report, path)?;
            }
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn print_summary(report: &OverallValidationResult, path: &Path) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "total_docs": report.total_docs,
            "validated_docs": report.validated_docs,
            "overall_score": report.overall_score,
            "all_docs_valid": report.summary.all_docs_valid,
            "report": path,
        }))?
    );
    Ok(())
}

fn store(cfg: &Config, cmd: &StoreCommand) -> Result<()> {
    let store = FileStore::from_config(cfg);
    let value = match cmd {
        StoreCommand::Put { files } => {
            let stored = store.put_many(files);
            if stored.is_empty() {
                return Err(anyhow!("no files stored"));
            }
            serde_json::to_value(stored)?
        }
        StoreCommand::Get { id, out } => serde_json::to_value(
            store
                .export(id, out)
                .with_context(|| format!("exporting {id} to {}", out.display()))?,
        )?,
        StoreCommand::Meta { id } => serde_json::to_value(store.metadata(id)?)?,
        StoreCommand::List { skip, limit } => serde_json::to_value(
            store.list(*skip, limit.unwrap_or(cfg.store.list_default_limit))?,
        )?,
        StoreCommand::Delete { id } => {
            store.delete(id)?;
            serde_json::json!({ "status": "success", "message": format!("artifact {id} deleted") })
        }
    };
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn missing_target() -> SplitCheckError {
    SplitCheckError::Rejected("no ground truth given: pass --ground-truth or --id".into())
}

/// Exit code for a failed command, taken from the first typed error in the chain.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<SplitCheckError>())
        .map(|e| e.class().exit_code())
        .unwrap_or(1)
}
