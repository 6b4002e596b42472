//! layoutgen CLI
//!
//! Usage:
//!   layoutgen [OPTIONS] [JOB]
//!
//! Options:
//!   -s, --settings <FILE>  Settings file (TOML format)
//!   -o, --output <DIR>     Directory SVG pages are written to
//!   -d, --debug            Verbose logging
//!   --trace                Print every canvas call instead of writing pages
//!   -h, --help             Print help

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::Parser;
use log::info;

use layoutgen::job::render_failure_page;
use layoutgen::{
    Batch, Canvas, FsAssets, JobError, JobInput, RecordingCanvas, Settings, SvgCanvas, SvgConfig,
};

#[derive(Parser)]
#[command(name = "layoutgen")]
#[command(about = "Render paginated documents from templates and data records")]
struct Cli {
    /// Job file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Settings file (TOML format)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Directory SVG pages are written to
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    debug: bool,

    /// Print a trace of canvas calls instead of writing pages
    #[arg(long)]
    trace: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let settings = match &cli.settings {
        Some(path) => match Settings::from_file(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error loading settings '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Settings::default(),
    };

    let (source, filename) = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "<stdin>".to_string()),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let job = match JobInput::from_json(&source) {
        Ok(job) => job,
        Err(e) => {
            eprint!("{}", e.format(&source, &filename));
            std::process::exit(1);
        }
    };

    let base = job
        .config
        .base_path
        .clone()
        .or_else(|| settings.base_path.clone())
        .or_else(|| {
            cli.input
                .as_deref()
                .and_then(Path::parent)
                .map(Path::to_path_buf)
        })
        .unwrap_or_else(|| PathBuf::from("."));
    let assets = FsAssets::new(base);

    if cli.trace {
        let mut canvas = RecordingCanvas::new();
        let result = run(&job, &settings, &assets, &mut canvas);
        print!("{}", canvas.trace());
        if let Err(e) = result {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let mut canvas = SvgCanvas::new(SvgConfig::default());
    let result = run(&job, &settings, &assets, &mut canvas);
    let failed = match result {
        Ok(()) => false,
        Err(e) => {
            eprintln!("Error: {}", e);
            true
        }
    };

    let pages = canvas.into_pages();
    match write_pages(&cli.output, &pages) {
        Ok(()) => info!("wrote {} pages to {}", pages.len(), cli.output.display()),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
    if failed {
        std::process::exit(1);
    }
}

/// Prepare and run the batch. When preparation fails nothing has been
/// drawn yet, so a standalone failure page is rendered in its place.
fn run(
    job: &JobInput,
    settings: &Settings,
    assets: &FsAssets,
    canvas: &mut dyn Canvas,
) -> Result<(), JobError> {
    let mut batch = match Batch::prepare(&job.config, settings, assets, canvas) {
        Ok(batch) => batch,
        Err(e) => {
            if let Err(page_err) = render_failure_page(&e, settings, assets, canvas) {
                log::error!("failure page could not be rendered: {}", page_err);
            }
            return Err(e);
        }
    };
    batch.run(&job.records, canvas)?;
    Ok(())
}

fn write_pages(dir: &Path, pages: &[String]) -> Result<(), JobError> {
    fs::create_dir_all(dir).map_err(output_error(dir.to_path_buf()))?;
    for (index, page) in pages.iter().enumerate() {
        let path = dir.join(format!("page-{:03}.svg", index + 1));
        fs::write(&path, page).map_err(output_error(path.clone()))?;
    }
    Ok(())
}

fn output_error(path: PathBuf) -> impl FnOnce(io::Error) -> JobError {
    move |source| JobError::Output { path, source }
}
