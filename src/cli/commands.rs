use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use crate::indexer::{build_index_from_dir, save_search_index, write_search_index};
use crate::integrity::validate;
use crate::models::{SearchIndex, SearchResult};
use crate::parsers::load_search_index;
use crate::query::{ObjectMatch, QueryError, Searcher, lookup_object};
use crate::tui::run_interactive;
use crate::utils::environment::INDEX_PATH_ENV;
use crate::utils::{format_path_with_tilde, resolve_index_path, single_line};

#[derive(Parser)]
#[command(name = "search-index-explorer")]
#[command(version)]
#[command(about = "Query, inspect and generate documentation search indexes", long_about = None)]
pub struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Where to read the index from; falls back to `_build/html/searchindex.js`
#[derive(clap::Args, Debug, Clone)]
pub struct IndexArg {
    /// Path to searchindex.js
    #[arg(long, env = INDEX_PATH_ENV)]
    pub index: Option<PathBuf>,
}

impl IndexArg {
    fn load(&self) -> Result<(PathBuf, SearchIndex)> {
        let cwd = env::current_dir().context("Failed to read current directory")?;
        let path = resolve_index_path(self.index.as_deref(), &cwd);
        let index = load_search_index(&path)?;
        Ok((path, index))
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a ranked full-text search
    Search {
        query: String,
        #[command(flatten)]
        index: IndexArg,
        /// Maximum number of results to print
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Find documented objects by exact dotted name
    Lookup {
        path: String,
        #[command(flatten)]
        index: IndexArg,
        #[arg(long)]
        json: bool,
    },
    /// Check an index for broken cross-references
    Validate {
        #[command(flatten)]
        index: IndexArg,
    },
    /// Show index size and freshness
    Stats {
        #[command(flatten)]
        index: IndexArg,
    },
    /// Generate an index from a reStructuredText/Markdown source tree
    Build {
        source_dir: PathBuf,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Rewrite an index in the generator's canonical byte format
    Normalize {
        #[command(flatten)]
        index: IndexArg,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Browse an index interactively
    Interactive {
        #[command(flatten)]
        index: IndexArg,
        /// Site URL prepended to copied links
        #[arg(long)]
        base_url: Option<String>,
    },
}

/// Dispatch a parsed command line
///
/// Command output goes through one locked stdout handle, so a closed pipe
/// surfaces as an error (see [`is_broken_pipe`]) instead of a panic.
pub fn run(cli: Cli) -> Result<ExitCode> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let Some(command) = cli.command else {
        writeln!(out, "Use --help for usage information")?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Search { query, index, limit, json } => {
            run_search(&mut out, &index, &query, limit, json)
        }
        Commands::Lookup { path, index, json } => run_lookup(&mut out, &index, &path, json),
        Commands::Validate { index } => run_validate(&mut out, &index),
        Commands::Stats { index } => show_stats(&mut out, &index),
        Commands::Build { source_dir, output } => {
            run_build(&mut out, &source_dir, output.as_deref())
        }
        Commands::Normalize { index, output } => {
            run_normalize(&mut out, &index, output.as_deref())
        }
        Commands::Interactive { index, base_url } => {
            drop(out);
            let (_, index) = index.load()?;
            run_interactive(&index, base_url)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[derive(Serialize)]
struct ResultView<'a> {
    #[serde(flatten)]
    result: &'a SearchResult,
    url: String,
}

/// True when the error comes from writing to a reader that went away (`| head`)
pub fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<io::Error>())
        .any(|e| e.kind() == io::ErrorKind::BrokenPipe)
}

fn run_search(
    out: &mut impl Write,
    index: &IndexArg,
    query: &str,
    limit: usize,
    json: bool,
) -> Result<ExitCode> {
    let (_, index) = index.load()?;
    let results = Searcher::new(&index).search(query);
    let shown = &results[..results.len().min(limit)];

    if json {
        let views: Vec<ResultView> = shown.iter().map(|r| ResultView { result: r, url: r.url() }).collect();
        writeln!(out, "{}", serde_json::to_string_pretty(&views)?)?;
        return Ok(ExitCode::SUCCESS);
    }

    if shown.is_empty() {
        writeln!(out, "No results for \"{}\"", single_line(query))?;
        return Ok(ExitCode::SUCCESS);
    }

    for result in shown {
        writeln!(
            out,
            "{:>4}  {:<6}  {}  {}",
            result.score,
            result.kind.as_str(),
            single_line(&result.title),
            result.url()
        )?;
        if let Some(description) = result.description.as_deref() {
            writeln!(out, "              {}", single_line(description))?;
        }
    }
    if results.len() > shown.len() {
        writeln!(out, "... {} more (use --limit)", results.len() - shown.len())?;
    }
    Ok(ExitCode::SUCCESS)
}

#[derive(Serialize)]
struct ObjectView<'a> {
    fullname: &'a str,
    objtype: &'a str,
    label: &'a str,
    priority: i32,
    docname: &'a str,
    filename: &'a str,
    title: &'a str,
    anchor: &'a str,
    url: String,
}

impl<'a> From<&'a ObjectMatch> for ObjectView<'a> {
    fn from(m: &'a ObjectMatch) -> Self {
        Self {
            fullname: &m.fullname,
            objtype: &m.objtype,
            label: &m.label,
            priority: m.entry.priority,
            docname: &m.docname,
            filename: &m.filename,
            title: &m.title,
            anchor: &m.anchor,
            url: m.url(),
        }
    }
}

fn run_lookup(out: &mut impl Write, index: &IndexArg, path: &str, json: bool) -> Result<ExitCode> {
    let (_, index) = index.load()?;
    let matches = lookup_object(&index, path);

    if matches.is_empty() {
        eprintln!("{}", QueryError::NotFound(single_line(path)));
        return Ok(ExitCode::FAILURE);
    }

    if json {
        let views: Vec<ObjectView> = matches.iter().map(ObjectView::from).collect();
        writeln!(out, "{}", serde_json::to_string_pretty(&views)?)?;
        return Ok(ExitCode::SUCCESS);
    }

    for m in &matches {
        writeln!(out, "{} ({})", single_line(&m.fullname), single_line(&m.label))?;
        writeln!(out, "  page: {} ({})", single_line(&m.title), m.filename)?;
        writeln!(out, "  link: {}", m.url())?;
    }
    Ok(ExitCode::SUCCESS)
}

fn run_validate(out: &mut impl Write, index: &IndexArg) -> Result<ExitCode> {
    let (path, index) = index.load()?;
    let report = validate(&index);

    for issue in &report.issues {
        writeln!(out, "{}: {}", issue.severity(), issue)?;
    }

    let errors = report.errors().count();
    let warnings = report.warnings().count();
    writeln!(
        out,
        "{}: {} error(s), {} warning(s)",
        format_path_with_tilde(&path),
        errors,
        warnings
    )?;

    Ok(if report.is_valid() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn show_stats(out: &mut impl Write, index: &IndexArg) -> Result<ExitCode> {
    let (path, index) = index.load()?;

    writeln!(out, "Search Index Statistics")?;
    writeln!(out, "=======================")?;
    writeln!(out, "Documents: {}", index.document_count())?;
    writeln!(out, "Terms: {}", index.terms.len())?;
    writeln!(out, "Title terms: {}", index.titleterms.len())?;
    writeln!(out, "Objects: {}", index.object_count())?;
    writeln!(out, "Object types: {}", index.objtypes.len())?;
    writeln!(out, "Section titles: {}", index.alltitles.len())?;
    writeln!(out, "Index entries: {}", index.indexentries.len())?;
    writeln!(out)?;
    writeln!(out, "Index file: {}", format_path_with_tilde(&path))?;

    let modified = fs::metadata(&path)
        .and_then(|m| m.modified())
        .with_context(|| format!("Failed to read modification time: {}", path.display()))?;
    let modified: DateTime<Local> = modified.into();
    writeln!(out, "Last modified: {}", modified.format("%Y-%m-%d %H:%M:%S"))?;

    Ok(ExitCode::SUCCESS)
}

/// Write to `output`, or to `out` byte-for-byte when no path is given
fn emit(out: &mut impl Write, index: &SearchIndex, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            save_search_index(path, index)?;
            info!("Wrote {}", format_path_with_tilde(path));
        }
        None => {
            let text = write_search_index(index)?;
            out.write_all(text.as_bytes()).context("Failed to write to stdout")?;
            out.flush().context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

fn run_build(out: &mut impl Write, source_dir: &Path, output: Option<&Path>) -> Result<ExitCode> {
    let index = build_index_from_dir(source_dir)?;
    emit(out, &index, output)?;
    Ok(ExitCode::SUCCESS)
}

fn run_normalize(out: &mut impl Write, index: &IndexArg, output: Option<&Path>) -> Result<ExitCode> {
    let (_, index) = index.load()?;
    emit(out, &index, output)?;
    Ok(ExitCode::SUCCESS)
}
