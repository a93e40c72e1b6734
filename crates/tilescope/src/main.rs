//! Watch a microscope acquisition directory and keep a stitched,
//! contrast-stretched PNG preview of the montage up to date, with a
//! JSON sidecar listing the per-tile index labels.

use std::fs::File;
use std::path::{Path, PathBuf};

use clap::Parser;
use image::{GrayImage, Luma};
use log::{info, warn};
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};
use tilescope_io::{ImageFileSource, PreviewConfig, PreviewFrame, RenderSink, Scheduler};

/// Live stitched preview of microscope acquisition tiles.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Path to the preview configuration (JSON).
    #[arg(short, long)]
    config: PathBuf,

    /// Where to write the preview PNG. The label sidecar lands next to
    /// it with a `.labels.json` suffix.
    #[arg(short, long, default_value = "preview.png")]
    output: PathBuf,

    /// Run a single poll cycle and exit instead of looping.
    #[arg(long)]
    once: bool,

    /// Log verbosity.
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

/// Render sink writing each published frame to disk.
struct PngSink {
    output: PathBuf,
}

impl RenderSink for PngSink {
    fn update(&mut self, frame: &PreviewFrame) {
        if let Err(error) = write_preview(&self.output, frame) {
            // A failed write is not fatal; the next cycle re-publishes.
            warn!("failed to write {}: {error}", self.output.display());
        }
    }
}

/// Write the frame as an 8-bit PNG stretched to its contrast bounds,
/// plus the label sidecar.
fn write_preview(output: &Path, frame: &PreviewFrame) -> Result<(), Box<dyn std::error::Error>> {
    let (low, high) = frame.contrast;
    let range = (high - low).max(1.0);
    let stretched = GrayImage::from_fn(frame.canvas.width(), frame.canvas.height(), |x, y| {
        let value = f64::from(frame.canvas.get_pixel(x, y).0[0]);
        #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let byte = ((value - low) / range * 255.0).clamp(0.0, 255.0) as u8;
        Luma([byte])
    });
    stretched.save(output)?;

    let sidecar = label_sidecar_path(output);
    serde_json::to_writer_pretty(File::create(&sidecar)?, &frame.labels)?;

    info!(
        "wrote {} ({} labels, contrast {:.0}..{:.0})",
        output.display(),
        frame.labels.len(),
        low,
        high,
    );
    Ok(())
}

/// `preview.png` -> `preview.labels.json`.
fn label_sidecar_path(output: &Path) -> PathBuf {
    output.with_extension("labels.json")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    TermLogger::init(
        args.log_level,
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let config: PreviewConfig = serde_json::from_reader(File::open(&args.config)?)?;
    info!(
        "watching {} for a {}x{} grid every {}s",
        config.source_directory.display(),
        config.grid_rows,
        config.grid_cols,
        config.poll_interval_seconds,
    );

    let source = ImageFileSource::new(&config.source_directory, &config.file_extension)?;
    let sink = PngSink {
        output: args.output,
    };
    let mut scheduler = Scheduler::new(config, source, sink)?;

    if args.once {
        let report = scheduler.run_once();
        info!(
            "single cycle: {} discovered, {} placed, {} pending",
            report.discovered,
            report.placed.len(),
            report.failed.len(),
        );
        return Ok(());
    }

    scheduler.run();
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tilescope_core::{LabelEntry, TilePixels};

    #[test]
    fn sidecar_path_replaces_extension() {
        assert_eq!(
            label_sidecar_path(Path::new("out/preview.png")),
            Path::new("out/preview.labels.json")
        );
    }

    #[test]
    fn preview_is_stretched_to_contrast_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("preview.png");

        let mut canvas = TilePixels::from_pixel(2, 1, Luma([100]));
        canvas.put_pixel(1, 0, Luma([300]));
        let frame = PreviewFrame {
            canvas,
            contrast: (100.0, 300.0),
            labels: vec![LabelEntry::for_tile(0, 0, 0)],
        };
        write_preview(&output, &frame).unwrap();

        let reloaded = image::open(&output).unwrap().to_luma8();
        assert_eq!(reloaded.get_pixel(0, 0).0[0], 0);
        assert_eq!(reloaded.get_pixel(1, 0).0[0], 255);

        let labels: Vec<LabelEntry> =
            serde_json::from_reader(File::open(label_sidecar_path(&output)).unwrap()).unwrap();
        assert_eq!(labels.len(), 1);
    }
}
