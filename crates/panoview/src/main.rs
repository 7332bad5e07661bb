mod args;
mod loader;
mod pose;
mod viewer;

use anyhow::Result;
use clap::Parser;
use panoview_engine::device::GpuInit;
use panoview_engine::logging::{init_logging, LoggingConfig};
use panoview_engine::window::{Runtime, RuntimeConfig};
use panoview_stereo::{
    HeadsetSensor, OrientationSource, ProjectionMode, SourceChain, TiltSensor, ViewState,
};

use args::{Args, PoseFormat};
use loader::ImageLoader;
use viewer::{ImageSwap, Viewer};

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(LoggingConfig::with_filter(args.log.clone()));

    let headset = args.headset();
    let sources = orientation_sources(&args)?;
    let projection = ProjectionMode::from(args.projection);
    let view = ViewState::new(sources, headset, projection);

    let loader = ImageLoader::spawn(args.max_texture_size()?)?;
    let swap = ImageSwap::new(args.images.clone());
    let viewer = Viewer::new(view, loader, swap, args.show_timing)?;

    log::info!(
        "controls: w/s pitch, a/d yaw, q/e roll, z recenter, p projection, \
         f/g fullscreen, n next image, esc quit"
    );

    let config = RuntimeConfig {
        title: "panoview".to_string(),
        ..RuntimeConfig::default()
    };
    Runtime::run(config, GpuInit::default(), viewer)
}

/// Builds the candidate sources and resolves them in priority order.
fn orientation_sources(args: &Args) -> Result<SourceChain> {
    let mut candidates: Vec<Box<dyn OrientationSource>> = Vec::new();

    if args.headset().is_some() {
        let (sensor, feed) = HeadsetSensor::new();
        if args.pose_input == Some(PoseFormat::Quat) {
            pose::spawn_stdin_feed(feed, pose::parse_quat)?;
        }
        candidates.push(Box::new(sensor));
    } else if args.pose_input == Some(PoseFormat::Quat) {
        log::warn!("--pose-input quat needs --headset-fov; ignoring pose input");
    }

    if args.pose_input == Some(PoseFormat::Angles) {
        let (sensor, feed) = TiltSensor::new();
        pose::spawn_stdin_feed(feed, pose::parse_angles)?;
        candidates.push(Box::new(sensor));
    }

    Ok(SourceChain::resolve(candidates))
}
