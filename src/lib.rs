//! layoutgen - paginated document rendering from templates and data records
//!
//! A job declares reusable templates (sections, text blocks, images, grids,
//! repeating groups) and a stream of records. Each template is resolved and
//! compiled once, then replayed per record onto a [`renderer::Canvas`].
//!
//! # Example
//!
//! ```rust
//! use layoutgen::assets::{FontFace, FontFamily, MemoryAssets};
//! use layoutgen::settings::{FontSource, Settings};
//!
//! let assets = MemoryAssets::new()
//!     .with_font(FontFamily::new("calibri", FontFace::uniform(500.0)));
//! let settings = Settings::empty().with_font_source(FontSource {
//!     name: "calibri".to_string(),
//!     files: vec!["calibri.ttf".to_string()],
//! });
//!
//! let pages = layoutgen::render_job(
//!     r#"{
//!         "config": {
//!             "layouts": [{"name": "card"}],
//!             "definitions": {
//!                 "card": {"definitions": [{"name": "title", "field": "title"}]}
//!             }
//!         },
//!         "records": [{"card": {"title": "Hello"}}]
//!     }"#,
//!     &settings,
//!     &assets,
//! )
//! .unwrap();
//!
//! assert_eq!(pages.len(), 1);
//! assert!(pages[0].contains("Hello"));
//! ```

pub mod assets;
pub mod compile;
pub mod error;
pub mod job;
pub mod layout;
pub mod renderer;
pub mod settings;
pub mod template;
pub mod typeset;
pub mod value;

use std::path::PathBuf;

use thiserror::Error;

pub use assets::{AssetError, AssetProvider, FsAssets, MemoryAssets};
pub use compile::RenderError;
pub use error::InputError;
pub use job::{Batch, JobConfig, JobInput, RunSummary};
pub use layout::LayoutError;
pub use renderer::{Canvas, RecordingCanvas, SvgCanvas, SvgConfig};
pub use settings::{Settings, SettingsError};
pub use template::TemplateError;

/// Any failure of a job run
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// Writing the rendered output failed
    #[error("failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Broad classes of job failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The job or its templates are wrong; nothing was rendered
    Config,
    /// A record could not be drawn
    Render,
    /// A file or asset could not be reached
    Io,
}

impl JobError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            JobError::Template(_) | JobError::Layout(_) | JobError::Input(_) => {
                ErrorCategory::Config
            }
            JobError::Asset(e) if e.is_io() => ErrorCategory::Io,
            JobError::Asset(_) => ErrorCategory::Config,
            JobError::Render(e) if e.is_structural() => ErrorCategory::Config,
            JobError::Render(_) => ErrorCategory::Render,
            JobError::Settings(SettingsError::IoError(_)) => ErrorCategory::Io,
            JobError::Settings(SettingsError::ParseError(_)) => ErrorCategory::Config,
            JobError::Output { .. } => ErrorCategory::Io,
        }
    }
}

/// Render a job document to one SVG string per physical page
pub fn render_job(
    source: &str,
    settings: &Settings,
    assets: &dyn AssetProvider,
) -> Result<Vec<String>, JobError> {
    render_job_with_config(source, settings, assets, SvgConfig::default())
}

/// Render a job document with custom SVG output options
pub fn render_job_with_config(
    source: &str,
    settings: &Settings,
    assets: &dyn AssetProvider,
    svg: SvgConfig,
) -> Result<Vec<String>, JobError> {
    let job = JobInput::from_json(source)?;
    let mut canvas = SvgCanvas::new(svg);
    let mut batch = Batch::prepare(&job.config, settings, assets, &mut canvas)?;
    batch.run(&job.records, &mut canvas)?;
    Ok(canvas.into_pages())
}
