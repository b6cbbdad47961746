//! Kiln command line renderer.
//!
//! Usage: `kiln [JOB] [-o FILE]`
//!
//! The job file picks a built-in scene and overrides any of its render
//! settings:
//!
//! ```json
//! { "scene": "whitted", "render": { "width": 640, "height": 480 } }
//! ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use kiln_renderer::{render, scenes, RenderConfig, Scene};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Command line options.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to the job file.
    #[clap(value_name = "JOB", help = "Render job JSON; renders the Cornell box when omitted.")]
    job: Option<PathBuf>,

    /// Path to the image file.
    #[clap(
        long = "outfile",
        short = 'o',
        value_name = "FILE",
        help = "Write the final image to the given filename (default kiln.png)."
    )]
    output: Option<PathBuf>,
}

/// Built-in scenes the CLI can render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum DemoScene {
    #[default]
    Cornell,
    Whitted,
    EnclosedBox,
}

impl DemoScene {
    fn build(self) -> Result<(Scene, RenderConfig)> {
        Ok(match self {
            DemoScene::Cornell => (
                scenes::cornell_box().context("Failed to build Cornell box")?,
                scenes::cornell_box_config(),
            ),
            DemoScene::Whitted => (
                scenes::whitted_showcase().context("Failed to build Whitted scene")?,
                scenes::whitted_showcase_config(),
            ),
            DemoScene::EnclosedBox => (scenes::enclosed_box(), scenes::enclosed_box_config()),
        })
    }
}

/// A render job as read from JSON.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Job {
    scene: DemoScene,
    output: Option<PathBuf>,
    /// Settings layered over the scene's own configuration
    render: Option<Value>,
}

/// Apply the keys of `overrides` on top of `base`.
fn merge_config(base: &RenderConfig, overrides: Option<Value>) -> Result<RenderConfig> {
    let Some(overrides) = overrides else {
        return Ok(base.clone());
    };
    let Value::Object(overrides) = overrides else {
        bail!("\"render\" must be a JSON object");
    };

    let mut merged = serde_json::to_value(base)?;
    if let Value::Object(fields) = &mut merged {
        fields.extend(overrides);
    }
    serde_json::from_value(merged).context("Invalid render settings")
}

fn load_job(path: &Path) -> Result<Job> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    let job = match &args.job {
        Some(path) => load_job(path)?,
        None => Job::default(),
    };
    let output = args
        .output
        .or(job.output)
        .unwrap_or_else(|| PathBuf::from("kiln.png"));

    log::info!("Building {:?} scene", job.scene);
    let start = Instant::now();
    let (scene, preset) = job.scene.build()?;
    let config = merge_config(&preset, job.render)?;
    log::info!("Scene built in {:.2?}", start.elapsed());

    let image = render(&scene, &config)?;

    let buffer = image::RgbaImage::from_raw(image.width, image.height, image.to_rgba())
        .context("Framebuffer size does not match the image dimensions")?;
    buffer
        .save(&output)
        .with_context(|| format!("Failed to save {}", output.display()))?;
    log::info!("Saved {}", output.display());

    Ok(())
}
