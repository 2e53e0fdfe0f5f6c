use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{ArgAction, Parser};

use framesnap::capture::context::{CameraView, ProjectionMode, Rotator, Vec3};
use framesnap::capture::{CaptureDependencies, MainThreadQueue, ScreenshotAction};
use framesnap::headless::{HeadlessCamera, HeadlessScene};
use framesnap::{Config, load_screenshot};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("FRAMESNAP_GIT_HASH"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "framesnap")]
#[command(version = VERSION, about = "Capture a rendered frame to PNG or EXR and load it back")]
struct Cli {
    /// File name without extension (.png or .exr is chosen from the capture)
    #[arg(long, short = 'f', value_name = "NAME", required_unless_present = "load")]
    filename: Option<String>,

    /// Output directory (defaults to the config value or <Pictures>/Screenshots)
    #[arg(long, short = 'd', value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Do not prefix the file name with a timestamp
    #[arg(long, action = ArgAction::SetTrue)]
    no_timestamp: bool,

    /// Capture the viewport with its UI instead of the player view
    #[arg(long, action = ArgAction::SetTrue)]
    ui: bool,

    /// Write EXR when the scene renders HDR
    #[arg(long, action = ArgAction::SetTrue)]
    hdr: bool,

    /// Render from a custom camera
    #[arg(long, value_name = "X,Y,Z,PITCH,YAW,ROLL,FOV", value_parser = parse_camera)]
    camera: Option<CameraView>,

    /// Use orthographic projection of this width for --camera
    #[arg(long, value_name = "WIDTH", requires = "camera")]
    ortho: Option<f32>,

    /// Remove the local player from the scene
    #[arg(long, action = ArgAction::SetTrue)]
    no_player: bool,

    /// Viewport width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Viewport height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Configuration file (defaults to ~/.config/framesnap/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Load an existing screenshot and print its size instead of capturing
    #[arg(long, value_name = "PATH", conflicts_with = "filename")]
    load: Option<PathBuf>,

    /// Seconds to wait for the screenshot to be written
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    timeout: u64,
}

enum Outcome {
    Completed {
        path: PathBuf,
        width: u32,
        height: u32,
        hdr: bool,
    },
    Failed(PathBuf),
}

fn parse_camera(value: &str) -> Result<CameraView, String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid number in --camera value: {e}"))?;
    let [x, y, z, pitch, yaw, roll, fov] = parts[..] else {
        return Err(format!(
            "expected 7 comma-separated values, got {}",
            parts.len()
        ));
    };
    Ok(CameraView::perspective(
        Vec3::new(x, y, z),
        Rotator::new(pitch, yaw, roll),
        fov,
    ))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    if let Some(path) = &cli.load {
        let texture = load_screenshot(path)
            .with_context(|| format!("Could not load screenshot {}", path.display()))?;
        println!(
            "{}: {}x{} ({})",
            path.display(),
            texture.width(),
            texture.height(),
            if texture.is_hdr() { "hdr" } else { "ldr" }
        );
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let filename = cli.filename.as_deref().context("--filename is required")?;
    let mut options = config.capture.to_options(filename);
    if let Some(dir) = &cli.dir {
        options.directory = dir.clone();
    }
    options.prefix_timestamp &= !cli.no_timestamp;
    options.show_ui |= cli.ui;
    options.with_hdr |= cli.hdr;
    if let Some(mut view) = cli.camera {
        if let Some(width) = cli.ortho {
            view.projection = ProjectionMode::Orthographic;
            view.ortho_width = width;
        }
        options.camera = Some(Arc::new(HeadlessCamera { view }));
    }

    if let Some(width) = cli.width {
        config.scene.width = width;
    }
    if let Some(height) = cli.height {
        config.scene.height = height;
    }
    config.scene.clamp_size();
    let mut scene = HeadlessScene::new(config.scene.width, config.scene.height)
        .with_hdr(config.scene.hdr_enabled);
    if cli.no_player || !config.scene.player_present {
        scene = scene.with_player(None);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start worker runtime")?;
    let main_queue = MainThreadQueue::new();
    let dependencies = CaptureDependencies::new(
        scene.render_context(config.scene.ui_overlay),
        runtime.handle(),
        main_queue.handle(),
    );

    log::info!("Capturing {:?}", options);
    let action = ScreenshotAction::take_screenshot(options, dependencies);
    let outcome = Arc::new(Mutex::new(None));

    let slot = outcome.clone();
    action.on_completed(move |texture, path| {
        *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(Outcome::Completed {
            path: path.to_path_buf(),
            width: texture.width(),
            height: texture.height(),
            hdr: texture.is_hdr(),
        });
    });
    let slot = outcome.clone();
    action.on_failed(move |_, path| {
        *slot.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(Outcome::Failed(path.to_path_buf()));
    });

    action.activate();

    let finished = main_queue.run_until(Duration::from_secs(cli.timeout), || {
        outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    });
    if !finished {
        bail!("Timed out after {}s waiting for the screenshot", cli.timeout);
    }

    let result = outcome.lock().unwrap_or_else(PoisonError::into_inner).take();
    match result {
        Some(Outcome::Completed {
            path,
            width,
            height,
            hdr,
        }) => {
            println!(
                "Saved screenshot to {} ({}x{}, {})",
                path.display(),
                width,
                height,
                if hdr { "hdr" } else { "ldr" }
            );
            Ok(())
        }
        Some(Outcome::Failed(path)) if path.as_os_str().is_empty() => {
            bail!("Screenshot failed (run with RUST_LOG=warn for details)")
        }
        Some(Outcome::Failed(path)) => {
            bail!(
                "Screenshot failed for {} (run with RUST_LOG=warn for details)",
                path.display()
            )
        }
        None => bail!("Screenshot finished without an outcome"),
    }
}
