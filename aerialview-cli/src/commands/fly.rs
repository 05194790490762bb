//! Render frames along a straight flight path.

use std::path::{Path, PathBuf};

use aerialview::flight::{PoseSource, StraightLineFlight};
use aerialview::request::{AerialViewRequest, CameraSpec, GeoPose};
use aerialview::service::{AerialViewError, AerialViewService};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use super::common::{resolve_service_config, ServiceArgs};
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct FlyArgs {
    /// Start latitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Start longitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,

    /// Heading in degrees, clockwise from north
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub heading: f64,

    /// Height above ground in meters
    #[arg(long, default_value_t = 120.0)]
    pub altitude: f64,

    /// Full field of view in degrees
    #[arg(long, default_value_t = 60.0)]
    pub fov: f64,

    /// Ground speed in meters per second
    #[arg(long, default_value_t = 30.0)]
    pub speed: f64,

    /// Seconds between frames
    #[arg(long, default_value_t = 1.0)]
    pub dt: f64,

    /// Number of frames to render
    #[arg(long, default_value_t = 10)]
    pub frames: usize,

    /// Output width in pixels
    #[arg(long, default_value_t = 512)]
    pub width: u32,

    /// Output height in pixels
    #[arg(long, default_value_t = 512)]
    pub height: u32,

    /// Directory for the numbered frame images
    #[arg(long, default_value = "frames")]
    pub out_dir: PathBuf,

    /// Skip frames whose tiles cannot be fetched instead of aborting
    #[arg(long)]
    pub keep_going: bool,

    #[command(flatten)]
    pub service: ServiceArgs,
}

pub async fn run(config_path: Option<&Path>, args: FlyArgs) -> Result<(), CliError> {
    if args.frames == 0 {
        return Err(CliError::InvalidArgument("--frames must be positive".into()));
    }
    if !(args.dt.is_finite() && args.dt > 0.0) {
        return Err(CliError::InvalidArgument("--dt must be positive".into()));
    }

    let config = resolve_service_config(config_path, &args.service)?;
    let service = AerialViewService::new(config)?;

    std::fs::create_dir_all(&args.out_dir).map_err(|source| CliError::CreateDir {
        path: args.out_dir.clone(),
        source,
    })?;

    let camera = CameraSpec::new(args.altitude, args.fov).with_output(args.width, args.height);
    let start = GeoPose::new(args.lat, args.lon, args.heading);
    let mut flight = StraightLineFlight::new(start, args.speed).with_max_steps(args.frames - 1);

    let progress = ProgressBar::new(args.frames as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} frames {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut pose = Some(flight.current());
    let mut frame = 0usize;
    let mut skipped = 0usize;

    while let Some(current) = pose {
        progress.set_message(format!("{:.5}, {:.5}", current.latitude, current.longitude));

        match service
            .get_aerial_image(&AerialViewRequest::new(current, camera))
            .await
        {
            Ok(image) => {
                let path = args.out_dir.join(format!("frame_{:05}.png", frame));
                image
                    .save(&path)
                    .map_err(|source| CliError::WriteImage { path, source })?;
            }
            Err(e @ (AerialViewError::AllTilesFailed { .. } | AerialViewError::TileFetch { .. }))
                if args.keep_going =>
            {
                warn!(frame, error = %e, "Skipping frame");
                skipped += 1;
            }
            Err(e) => {
                progress.abandon();
                return Err(e.into());
            }
        }

        frame += 1;
        progress.inc(1);
        pose = flight.advance(args.dt);
    }

    progress.finish_with_message("done");

    println!(
        "Rendered {} frame(s) to {} ({} skipped)",
        frame - skipped,
        args.out_dir.display(),
        skipped
    );
    println!("  Fetch: {}", service.metrics());
    Ok(())
}
