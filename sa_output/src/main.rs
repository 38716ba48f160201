use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use anyhow::{Context, Result, bail, ensure};
use clap::Parser;
use sa_formats::SaArchive;
use sa_output::{Settings, TextureManager};

#[derive(Parser, Debug)]
#[command(about = "Decode and cache Stone Age textures", version)]
struct Args {
    /// JSON settings file; command-line paths override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory containing adrn.bin and real.bin
    #[arg(long, value_name = "DIR")]
    resources: Option<PathBuf>,

    /// Output base directory; textures are cached under <DIR>/textures
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Texture identifier to fetch (may repeat)
    #[arg(long = "id", value_name = "ID")]
    ids: Vec<u32>,

    /// Fetch every identifier listed in the adrn index
    #[arg(long, conflicts_with = "ids")]
    all: bool,

    /// Worker threads sharing the cache
    #[arg(long, default_value_t = 1)]
    jobs: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::init();

    ensure!(args.jobs >= 1, "--jobs must be at least 1");

    let mut settings = match args.config.as_ref() {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(resources) = args.resources {
        settings.resources_path = resources;
    }
    if let Some(output) = args.output {
        settings.output_path = output;
    }

    let archive = SaArchive::open(settings.adrn_path(), settings.real_path())
        .context("opening Stone Age archive")?;

    let ids: Vec<u32> = if args.all {
        archive.index().blocks().iter().map(|block| block.index).collect()
    } else {
        args.ids
    };
    if ids.is_empty() {
        bail!("no texture ids requested (use --id or --all)");
    }

    let manager = TextureManager::new(&settings, &archive)?;
    let next = AtomicUsize::new(0);
    let failures = AtomicUsize::new(0);

    thread::scope(|scope| {
        for _ in 0..args.jobs.min(ids.len()) {
            scope.spawn(|| {
                loop {
                    let slot = next.fetch_add(1, Ordering::Relaxed);
                    let Some(&id) = ids.get(slot) else {
                        break;
                    };
                    match manager.get_texture(id) {
                        Ok(texture) => println!(
                            "{id:>8} {width:>5}x{height:<5} offset {x},{y}",
                            width = texture.width,
                            height = texture.height,
                            x = texture.x,
                            y = texture.y
                        ),
                        Err(err) => {
                            eprintln!("texture {id}: {err}");
                            failures.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            });
        }
    });

    let failed = failures.load(Ordering::Relaxed);
    println!(
        "Cached {} textures in {}",
        manager.cached_ids().len(),
        manager.texture_dir().display()
    );
    ensure!(failed == 0, "{failed} of {} textures failed", ids.len());
    Ok(())
}
