use std::collections::HashSet;
use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use miette::{Context, IntoDiagnostic, Result};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use patchsift_core::{OutputFormat, PatchsiftConfig};
use patchsift_difflens::commit::{extract_identifier, CommitPatch, PatchSelector, SelectedPatch};
use patchsift_difflens::filter::DiffFilter;

const CONFIG_FILE: &str = ".patchsift.toml";

#[derive(Parser)]
#[command(
    name = "patchsift",
    version,
    about = "Drop formatting-only hunks from unified diffs",
    long_about = "patchsift splits a unified diff into hunks, decides per hunk whether only\n\
                   whitespace changed, and prints the hunks that carry a real code change.\n\
                   An empty result means the patch has no semantic change.\n\n\
                   Examples:\n  \
                     git diff | patchsift filter          Filter a diff from stdin\n  \
                     patchsift classify --file fix.patch  Explain each hunk's verdict\n  \
                     patchsift commit --file commit.json  Select patches from a commit\n  \
                     patchsift batch patches/*.diff       Filter many patches at once"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (default: .patchsift.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Filtered diff text or a plain summary (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Remove formatting-only hunks from a diff
    #[command(long_about = "Remove formatting-only hunks from a diff.\n\n\
        Reads a unified diff from stdin or a file and prints the hunks that change\n\
        more than whitespace, verbatim and in order. Prints nothing if no hunk does.\n\n\
        Examples:\n  git show HEAD | patchsift filter\n  patchsift filter --file fix.patch --format json")]
    Filter {
        /// Read diff from file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Show the verdict for every hunk of a diff
    Classify {
        /// Read diff from file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Select and filter the source-file patches of a commit
    #[command(long_about = "Select and filter the source-file patches of a commit.\n\n\
        Reads a commit in the GitHub commit API JSON shape (sha, commit.message,\n\
        files[].filename, files[].patch). Commits whose message has none of the\n\
        configured keywords are skipped unless --all is given.\n\n\
        Examples:\n  gh api repos/o/r/commits/SHA | patchsift commit\n  patchsift commit --file commit.json --all")]
    Commit {
        /// Read commit JSON from file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
        /// Process the commit even if its message has no keyword
        #[arg(long)]
        all: bool,
    },
    /// Filter many diff files concurrently
    Batch {
        /// Diff files to process
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Write each non-empty filtered diff into this directory
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Number of concurrent workers (overrides [batch].workers)
        #[arg(long)]
        workers: Option<usize>,
    },
    /// Create a default .patchsift.toml in the current directory
    Init,
}

const DEFAULT_CONFIG: &str = r#"# patchsift configuration

[filter]
# File extensions (without the dot) whose patches are classified.
# source_extensions = ["c", "cpp"]
# Glob patterns for paths to leave out.
# skip_patterns = ["tests/*", "third_party/*"]

[commit]
# Commits are only processed if their message contains one of these.
# keywords = ["CVE", "Vuln", "Vulnerability", "CWE"]

[batch]
# Concurrent workers for `patchsift batch` (default: CPU count minus one).
# workers = 8
"#;

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Command::Init = cli.command {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            miette::bail!("{CONFIG_FILE} already exists");
        }
        std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
        println!("Created {CONFIG_FILE} with default configuration");
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;
    tracing::debug!(format = %cli.format, ?config, "loaded configuration");

    match cli.command {
        Command::Filter { ref file } => {
            let input = read_input(file)?;
            let filter = DiffFilter::new(&input);
            match cli.format {
                OutputFormat::Text => {
                    let out = filter.to_diff();
                    if out.is_empty() {
                        if cli.verbose {
                            eprintln!("No semantic change.");
                        }
                    } else if out.ends_with('\n') {
                        print!("{out}");
                    } else {
                        println!("{out}");
                    }
                }
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&filter.report()).into_diagnostic()?
                    );
                }
                OutputFormat::Markdown => print!("{}", filter.report().to_markdown()),
            }
        }
        Command::Classify { ref file } => {
            let input = read_input(file)?;
            let report = DiffFilter::new(&input).report();
            match cli.format {
                OutputFormat::Text => {
                    if report.hunks.is_empty() {
                        println!("No hunks found.");
                    }
                    for h in &report.hunks {
                        println!(
                            "{:>3}  {:<4}  {}  {}",
                            h.index,
                            if h.kept { "keep" } else { "drop" },
                            h.header.as_deref().unwrap_or("(no header)"),
                            h.verdict,
                        );
                    }
                }
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&report.hunks).into_diagnostic()?
                    );
                }
                OutputFormat::Markdown => print!("{}", report.to_markdown()),
            }
        }
        Command::Commit { ref file, all } => {
            let input = read_input(file)?;
            let commit = CommitPatch::from_json(&input)?;
            let selector = PatchSelector::from_config(&config)?;

            if !all && !selector.mentions_keyword(commit.message()) {
                eprintln!(
                    "Skipping commit {}: message has no configured keyword",
                    short_sha(&commit.sha)
                );
                return Ok(());
            }

            let output = CommitOutput {
                sha: commit.sha.clone(),
                identifier: extract_identifier(commit.message()),
                patches: selector.select(&commit),
            };
            if cli.verbose {
                eprintln!(
                    "{}: {} of {} files carry semantic changes",
                    short_sha(&output.sha),
                    output.patches.len(),
                    commit.files.len()
                );
            }
            match cli.format {
                OutputFormat::Text => {
                    for p in &output.patches {
                        println!("{}", p.patch.trim_end_matches('\n'));
                    }
                }
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&output).into_diagnostic()?
                    );
                }
                OutputFormat::Markdown => print!("{}", output.to_markdown()),
            }
        }
        Command::Batch {
            ref files,
            ref out_dir,
            workers,
        } => {
            let workers = workers
                .unwrap_or_else(|| config.batch.effective_workers())
                .clamp(1, Semaphore::MAX_PERMITS);
            if let Some(dir) = out_dir {
                std::fs::create_dir_all(dir)
                    .into_diagnostic()
                    .wrap_err(format!("creating {}", dir.display()))?;
            }
            let entries = run_batch(files.clone(), out_dir.clone(), workers).await?;

            match cli.format {
                OutputFormat::Text => {
                    for e in &entries {
                        if let Some(err) = &e.error {
                            println!("{}: error: {err}", e.path.display());
                        } else if e.kept_hunks == 0 {
                            println!("{}: no semantic change", e.path.display());
                        } else {
                            println!(
                                "{}: {} of {} hunks kept",
                                e.path.display(),
                                e.kept_hunks,
                                e.total_hunks
                            );
                        }
                    }
                }
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&entries).into_diagnostic()?
                    );
                }
                OutputFormat::Markdown => {
                    println!("# Batch Filter\n");
                    println!("| File | Hunks | Kept | Error |\n|---|---|---|---|");
                    for e in &entries {
                        println!(
                            "| `{}` | {} | {} | {} |",
                            e.path.display(),
                            e.total_hunks,
                            e.kept_hunks,
                            e.error.as_deref().unwrap_or("")
                        );
                    }
                }
            }

            let failed = entries.iter().filter(|e| e.error.is_some()).count();
            if failed > 0 {
                miette::bail!("{failed} of {} files failed", entries.len());
            }
        }
        Command::Init => unreachable!(),
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("PATCHSIFT_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(explicit: Option<&Path>) -> Result<PatchsiftConfig> {
    let config = match explicit {
        Some(path) => PatchsiftConfig::from_file(path)?,
        None => {
            let default_path = Path::new(CONFIG_FILE);
            if default_path.exists() {
                PatchsiftConfig::from_file(default_path)?
            } else {
                PatchsiftConfig::default()
            }
        }
    };
    Ok(config)
}

fn read_input(file: &Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err(format!("reading {}", path.display())),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .into_diagnostic()
                .wrap_err("reading stdin")?;
            Ok(input)
        }
    }
}

fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CommitOutput {
    sha: String,
    identifier: Option<String>,
    patches: Vec<SelectedPatch>,
}

impl CommitOutput {
    fn to_markdown(&self) -> String {
        let mut md = format!("# Commit `{}`\n\n", short_sha(&self.sha));
        if let Some(id) = &self.identifier {
            md.push_str(&format!("Identifier: **{id}**\n\n"));
        }
        if self.patches.is_empty() {
            md.push_str("No semantic changes in source files.\n");
        }
        for p in &self.patches {
            md.push_str(&format!(
                "## `{}`\n\n```diff\n{}\n```\n\n",
                p.filename,
                p.patch.trim_end()
            ));
        }
        md
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchEntry {
    path: PathBuf,
    total_hunks: usize,
    kept_hunks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    written_to: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl BatchEntry {
    fn failed(path: PathBuf, error: String) -> Self {
        Self {
            path,
            total_hunks: 0,
            kept_hunks: 0,
            written_to: None,
            error: Some(error),
        }
    }
}

/// Assign every input a distinct output path under `out_dir`.
///
/// Names follow the input's file name. Repeated names get a `-2`, `-3`, ...
/// suffix before the extension, and no target may coincide with an input.
fn plan_output_paths(files: &[PathBuf], out_dir: &Path) -> Vec<PathBuf> {
    let inputs: HashSet<PathBuf> = files.iter().filter_map(|f| f.canonicalize().ok()).collect();
    let resolved_dir = out_dir
        .canonicalize()
        .unwrap_or_else(|_| out_dir.to_path_buf());
    let mut taken: HashSet<OsString> = HashSet::new();

    files
        .iter()
        .map(|file| {
            let name = file
                .file_name()
                .map(OsString::from)
                .unwrap_or_else(|| OsString::from("patch.diff"));
            let stem = Path::new(&name)
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let ext = Path::new(&name)
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()));

            let mut candidate = name.clone();
            let mut n = 2;
            while taken.contains(&candidate) || inputs.contains(&resolved_dir.join(&candidate)) {
                candidate = OsString::from(format!("{stem}-{n}{}", ext.as_deref().unwrap_or("")));
                n += 1;
            }
            taken.insert(candidate.clone());
            out_dir.join(candidate)
        })
        .collect()
}

async fn run_batch(
    files: Vec<PathBuf>,
    out_dir: Option<PathBuf>,
    workers: usize,
) -> Result<Vec<BatchEntry>> {
    let targets: Vec<Option<PathBuf>> = match &out_dir {
        Some(dir) => plan_output_paths(&files, dir).into_iter().map(Some).collect(),
        None => vec![None; files.len()],
    };
    let permits = Arc::new(Semaphore::new(workers));
    let mut set = JoinSet::new();
    tracing::debug!(files = files.len(), workers, "starting batch");

    for (index, (path, target)) in files.into_iter().zip(targets).enumerate() {
        let permits = Arc::clone(&permits);
        set.spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => return (index, BatchEntry::failed(path, e.to_string())),
            };
            let task_path = path.clone();
            let entry =
                match tokio::task::spawn_blocking(move || filter_file(&task_path, target.as_deref()))
                    .await
                {
                    Ok(Ok(entry)) => entry,
                    Ok(Err(report)) => {
                        let message = report
                            .chain()
                            .map(|e| e.to_string())
                            .collect::<Vec<_>>()
                            .join(": ");
                        BatchEntry::failed(path, message)
                    }
                    Err(join) => BatchEntry::failed(path, join.to_string()),
                };
            (index, entry)
        });
    }

    let mut entries = Vec::new();
    while let Some(joined) = set.join_next().await {
        entries.push(joined.into_diagnostic()?);
    }
    entries.sort_by_key(|(index, _)| *index);
    Ok(entries.into_iter().map(|(_, entry)| entry).collect())
}

fn filter_file(path: &Path, target: Option<&Path>) -> Result<BatchEntry> {
    let input = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err(format!("reading {}", path.display()))?;
    let filter = DiffFilter::new(&input);
    let total_hunks = filter.hunks().len();
    let kept_hunks = filter.kept().count();

    let mut written_to = None;
    if let Some(target) = target {
        let out = filter.to_diff();
        // Empty output means no semantic change; nothing is persisted.
        if !out.is_empty() {
            std::fs::write(target, out)
                .into_diagnostic()
                .wrap_err(format!("writing {}", target.display()))?;
            written_to = Some(target.to_path_buf());
        }
    }

    tracing::debug!(path = %path.display(), total_hunks, kept_hunks, "filtered file");
    Ok(BatchEntry {
        path: path.to_path_buf(),
        total_hunks,
        kept_hunks,
        written_to,
        error: None,
    })
}
