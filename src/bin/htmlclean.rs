use anyhow::{anyhow, Context, Result};
use clap::Parser;
use html_style_cleaner::{
    clean_batch, clean_document, CleanOptions, SourceDocument, SINGLE_CSS_NAME, SINGLE_HTML_NAME,
};
use log::{LevelFilter, Log, Metadata, Record};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// HTML files exported from a word processor.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Directory the cleaned pages and stylesheet are written to.
    #[arg(long, default_value = "output")]
    out_dir: PathBuf,

    /// Share one stylesheet across all files even when only one is given.
    #[arg(long)]
    merge: bool,

    /// Keep `pt` lengths instead of rewriting them as `px`.
    #[arg(long)]
    keep_pt: bool,

    /// Log every pass.
    #[arg(long)]
    verbose: bool,
}

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

#[derive(Serialize, Debug)]
struct Failure {
    file: String,
    error: String,
}

#[derive(Serialize, Debug)]
struct Report {
    message: String,
    html: Vec<String>,
    css: String,
    failures: Vec<Failure>,
}

fn write_output(dir: &Path, name: &str, contents: &str) -> Result<String> {
    let path = dir.join(name);
    fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
    Ok(path.display().to_string())
}

fn read_sources(files: &[PathBuf]) -> Result<Vec<SourceDocument>> {
    files
        .iter()
        .map(|path| {
            let content = fs::read(path).with_context(|| format!("read {}", path.display()))?;
            Ok(SourceDocument::new(path.display().to_string(), content))
        })
        .collect()
}

fn run_single(args: &Args, source: &SourceDocument) -> Result<Report> {
    let mut options = CleanOptions::single();
    options.convert_units = !args.keep_pt;
    let cleaned = clean_document(&source.content, &options)
        .with_context(|| format!("clean {}", source.name))?;
    let html = write_output(&args.out_dir, SINGLE_HTML_NAME, &cleaned.html)?;
    let css = write_output(&args.out_dir, SINGLE_CSS_NAME, &cleaned.css)?;
    Ok(Report {
        message: "Your file has been successfully converted!".to_string(),
        html: vec![html],
        css,
        failures: Vec::new(),
    })
}

fn run_batch(args: &Args, sources: &[SourceDocument]) -> Result<Report> {
    let mut options = CleanOptions::merged();
    options.convert_units = !args.keep_pt;
    let output = clean_batch(sources, &options).context("clean batch")?;
    if output.pages.is_empty() {
        return Err(anyhow!(
            "no document could be cleaned ({} failures)",
            output.failures.len()
        ));
    }

    let mut html = Vec::with_capacity(output.pages.len());
    for page in &output.pages {
        html.push(write_output(&args.out_dir, &page.output_name, &page.html)?);
    }
    let css = write_output(&args.out_dir, &output.css_name, &output.css)?;

    let failures: Vec<Failure> = output
        .failures
        .iter()
        .map(|f| Failure {
            file: f.source.clone(),
            error: f.error.to_string(),
        })
        .collect();
    let message = if failures.is_empty() {
        "Your files have been successfully converted!".to_string()
    } else {
        format!(
            "Converted {} of {} files.",
            output.pages.len(),
            sources.len()
        )
    };

    Ok(Report {
        message,
        html,
        css,
        failures,
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    log::set_logger(&LOGGER).map_err(|e| anyhow!("install logger: {e}"))?;
    log::set_max_level(if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    });

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create {}", args.out_dir.display()))?;

    let sources = read_sources(&args.files)?;
    let report = match sources.as_slice() {
        [single] if !args.merge => run_single(&args, single)?,
        _ => run_batch(&args, &sources)?,
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("encode report")?
    );
    Ok(())
}
