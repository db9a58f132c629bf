use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;

use offprint::logging::{init_logging, LoggingConfig};
use offprint::{GraphicsManager, OutputMode, PrintConfig, RenderOutput, RenderSession};

/// Render a figure from a JSON scene file without a display.
#[derive(Debug, Parser)]
#[command(name = "offprint", version)]
struct Cli {
    /// Scene description (JSON)
    scene: PathBuf,

    /// Zero-based index of the figure to render
    #[arg(long, default_value_t = 0)]
    figure: usize,

    /// Vector output path; requires --term
    #[arg(long, requires = "term")]
    output: Option<PathBuf>,

    /// Format flags, e.g. "svg", "pdfis2D", "epstexnotext"
    #[arg(long, requires = "output")]
    term: Option<String>,

    /// Write the raster image as PNG
    #[arg(long, conflicts_with = "output")]
    png: Option<PathBuf>,

    /// Print the SHA-256 digest of the raster image
    #[arg(long, conflicts_with = "output")]
    digest: bool,

    /// Log filter, overrides RUST_LOG
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(LoggingConfig {
        env_filter: cli.log_level.clone(),
        ..Default::default()
    });

    let json = std::fs::read_to_string(&cli.scene)
        .with_context(|| format!("reading {}", cli.scene.display()))?;
    let mut manager = GraphicsManager::new();
    let figures = manager
        .load_json(&json)
        .with_context(|| format!("loading {}", cli.scene.display()))?;
    let Some(&figure) = figures.get(cli.figure) else {
        bail!(
            "figure index {} out of range, {} has {} figure(s)",
            cli.figure,
            cli.scene.display(),
            figures.len()
        );
    };

    let mode = match (cli.output, cli.term) {
        (Some(path), Some(format_flags)) => OutputMode::VectorExport { path, format_flags },
        _ => OutputMode::Raster,
    };

    let mut session = RenderSession::new(PrintConfig::default());
    match session.render(&mut manager, figure, mode)? {
        RenderOutput::Exported(paths) => {
            for path in paths {
                println!("{}", path.display());
            }
        }
        RenderOutput::Image(image) => {
            let (c, h, w) = image.shape();
            println!("rendered {}x{}x{}", c, h, w);
            if cli.digest {
                println!("{}", image.sha256_hex());
            }
            if let Some(png) = cli.png {
                let rgb = image
                    .to_rgb_image()
                    .context("image buffer does not match its dimensions")?;
                rgb.save(&png)
                    .with_context(|| format!("writing {}", png.display()))?;
            }
        }
    }
    Ok(())
}
