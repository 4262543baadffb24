//! Drive a demo scene through the frame pipeline and report what it did.

use std::{fs, io, path::PathBuf};

use anyhow::{Context, Result};
use arbor::{Expanse, FrameOutcome, RendererConfig};
use arbor_examples::scenegym::{Scene, SceneGym};
use clap::Parser;
use tracing::Level;

/// CLI flags for the scene gym example.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Scene to render.
    #[clap(short, long, value_enum, default_value_t = Scene::Dashboard)]
    scene: Scene,

    /// Number of frames to render.
    #[clap(short, long, default_value_t = 10)]
    frames: u64,

    /// Target width in pixels.
    #[clap(long, default_value_t = 800)]
    width: u32,

    /// Target height in pixels.
    #[clap(long, default_value_t = 480)]
    height: u32,

    /// Resize the target to this width halfway through.
    #[clap(long)]
    resize_width: Option<u32>,

    /// Repaint only dirty regions.
    #[clap(short, long)]
    incremental: bool,

    /// Renderer configuration as a JSON file. Flags override it.
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Print the canvas and a tree dump of the last frame.
    #[clap(short, long)]
    dump: bool,

    /// Log every frame decision.
    #[clap(short, long)]
    verbose: bool,
}

/// Run the scene gym example.
pub fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => {
            let s = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            RendererConfig::from_json(&s).context("parsing renderer config")?
        }
        None => RendererConfig::default(),
    };
    config.incremental |= args.incremental;

    let mut gym = SceneGym::new(args.scene, Expanse::new(args.width, args.height), config);
    for frame in 0..args.frames {
        if let Some(w) = args.resize_width {
            if frame == args.frames / 2 {
                gym.resize(Expanse::new(w, args.height));
            }
        }
        let outcome = gym.step()?;
        let label = match outcome {
            FrameOutcome::Full => "full".to_string(),
            FrameOutcome::Partial(r) => format!("partial {r:?}"),
            FrameOutcome::Skipped => "skipped".to_string(),
        };
        println!("frame {frame:>4}: {label}");
    }

    if args.dump {
        print!("{}", gym.canvas().contents());
        print!("{}", gym.dump()?);
    }
    println!("{}", serde_json::to_string_pretty(&gym.diagnostics())?);
    Ok(())
}
