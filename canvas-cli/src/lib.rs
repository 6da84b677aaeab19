//! # Meme Canvas CLI
//!
//! Headless host for the meme canvas. Replays a JSON input script against a
//! [`DrawingCanvas`](canvas_renderer::DrawingCanvas) and writes the exported
//! image, plus optional NFT metadata.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p canvas-cli -- script.json --output meme.jpg
//! ```
//!
//! ## With metadata:
//!
//! ```bash
//! cargo run -p canvas-cli -- script.json --name "Doge" --price 0.01 --supply 100
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `Script` / `Step` - JSON input script
//! - `ScriptRunner` - Drives the canvas and collects its callbacks

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod runner;
mod script;

pub use runner::{RunOutcome, ScriptRunner};
pub use script::{Script, Step};

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use canvas_mint::{MintDraft, NftMetadata};
use canvas_renderer::{CanvasConfig, DrawingCanvas, ExportConfig, ExportFormat};
use clap::{Parser, ValueEnum};

/// Output image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// JPEG (lossy, default).
    Jpeg,
    /// PNG (lossless).
    Png,
}

impl From<FormatArg> for ExportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Jpeg => Self::Jpeg,
            FormatArg::Png => Self::Png,
        }
    }
}

/// Command-line arguments for meme-canvas.
#[derive(Debug, Clone, Parser)]
#[command(name = "meme-canvas")]
#[command(about = "Replay a drawing script on the meme canvas and export the result")]
#[command(version)]
pub struct CliArgs {
    /// Input script (JSON)
    pub script: PathBuf,

    /// Output image path; the extension follows --format when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Export format
    #[arg(long, value_enum, default_value = "jpeg", env = "MEME_CANVAS_FORMAT")]
    pub format: FormatArg,

    /// JPEG quality (1-100)
    #[arg(long, default_value = "70", env = "MEME_CANVAS_JPEG_QUALITY")]
    pub quality: u8,

    /// Side length before the first mount
    #[arg(long, default_value = "300")]
    pub side: u32,

    /// Quiet period before an export fires, in milliseconds
    #[arg(long, default_value = "100", env = "MEME_CANVAS_EXPORT_DEBOUNCE_MS")]
    pub export_debounce_ms: u64,

    /// Quiet period before a resize applies, in milliseconds
    #[arg(long, default_value = "100", env = "MEME_CANVAS_RESIZE_DEBOUNCE_MS")]
    pub resize_debounce_ms: u64,

    /// Disable text placement
    #[arg(long)]
    pub no_text: bool,

    /// Skip loading system fonts
    #[arg(long)]
    pub no_system_fonts: bool,

    /// Extra font file (repeatable)
    #[arg(long = "font")]
    pub fonts: Vec<PathBuf>,

    /// NFT name; validates the mint form and writes a metadata document
    /// next to the image when set
    #[arg(long, requires_all = ["price", "supply"])]
    pub name: Option<String>,

    /// NFT description
    #[arg(long, default_value = "")]
    pub description: String,

    /// Token symbol
    #[arg(long, default_value = "")]
    pub symbol: String,

    /// Price per token in the native currency (e.g. 0.01)
    #[arg(long)]
    pub price: Option<String>,

    /// Total supply (at least 2)
    #[arg(long)]
    pub supply: Option<String>,
}

impl CliArgs {
    /// Where the image is written.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let extension = ExportFormat::from(self.format).extension();
            self.script.with_extension(extension)
        })
    }

    /// The mint form described by the arguments, if a name was given.
    #[must_use]
    pub fn mint_draft(&self) -> Option<MintDraft> {
        self.name.as_ref().map(|name| MintDraft {
            name: name.clone(),
            symbol: self.symbol.clone(),
            price: self.price.clone().unwrap_or_default(),
            supply: self.supply.clone().unwrap_or_default(),
        })
    }

    /// Where the metadata document is written, if requested.
    #[must_use]
    pub fn metadata_path(&self) -> Option<PathBuf> {
        self.name
            .as_ref()
            .map(|_| self.output_path().with_extension("json"))
    }
}

impl From<&CliArgs> for CanvasConfig {
    fn from(args: &CliArgs) -> Self {
        Self {
            initial_side: args.side,
            resize_debounce: Duration::from_millis(args.resize_debounce_ms),
            export_debounce: Duration::from_millis(args.export_debounce_ms),
            export: ExportConfig {
                format: args.format.into(),
                jpeg_quality: args.quality,
                ..ExportConfig::default()
            },
            text_enabled: !args.no_text,
            system_fonts: !args.no_system_fonts,
            font_files: args.fonts.clone(),
            ..CanvasConfig::default()
        }
    }
}

/// Replay `args.script` and write its outputs.
///
/// # Errors
///
/// Returns an error if the mint form is invalid, the script cannot be
/// loaded, the canvas cannot be created, no image was produced or an output
/// cannot be written.
pub async fn run(args: &CliArgs) -> anyhow::Result<RunOutcome> {
    let draft = args
        .mint_draft()
        .map(|draft| {
            draft.validate().map_err(|errors| {
                let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
                anyhow::anyhow!("invalid mint form: {}", messages.join("; "))
            })
        })
        .transpose()?;
    if let Some(draft) = &draft {
        tracing::info!(
            "Mint form valid: {} at {} wei, supply {}",
            draft.name,
            draft.price,
            draft.supply
        );
    }

    let script = Script::load(&args.script)?;
    let base_dir = args.script.parent().unwrap_or_else(|| Path::new("."));

    let canvas = DrawingCanvas::new(CanvasConfig::from(args))
        .map_err(|e| anyhow::anyhow!("Failed to create canvas: {e}"))?;
    tracing::info!(
        "Replaying {} steps from {}",
        script.steps.len(),
        args.script.display()
    );
    let outcome = ScriptRunner::new(canvas, base_dir).run(&script).await;

    let image = outcome
        .image
        .as_ref()
        .context("the canvas produced no image")?;
    let output = args.output_path();
    std::fs::write(&output, &image.bytes)
        .with_context(|| format!("failed to write {}", output.display()))?;
    tracing::info!(
        "Wrote {}x{} {} to {}",
        image.width,
        image.height,
        image.mime_type(),
        output.display()
    );

    if let (Some(draft), Some(path)) = (&draft, args.metadata_path()) {
        let metadata = NftMetadata::new(&draft.name, &args.description, image.to_data_uri());
        std::fs::write(&path, metadata.to_json()?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!("Wrote metadata to {}", path.display());
    }

    Ok(outcome)
}
