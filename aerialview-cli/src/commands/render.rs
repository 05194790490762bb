//! Render a single frame.

use std::path::{Path, PathBuf};

use aerialview::request::{AerialViewRequest, CameraSpec, GeoPose};
use aerialview::service::AerialViewService;
use clap::Args;

use super::common::{resolve_service_config, ServiceArgs};
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Camera latitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Camera longitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,

    /// Heading in degrees, clockwise from north
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub bearing: f64,

    /// Height above ground in meters
    #[arg(long, default_value_t = 120.0)]
    pub altitude: f64,

    /// Full field of view in degrees
    #[arg(long, default_value_t = 60.0)]
    pub fov: f64,

    /// Output width in pixels
    #[arg(long, default_value_t = 512)]
    pub width: u32,

    /// Output height in pixels
    #[arg(long, default_value_t = 512)]
    pub height: u32,

    /// Output image file (format from extension)
    #[arg(short, long, default_value = "aerialview.png")]
    pub output: PathBuf,

    #[command(flatten)]
    pub service: ServiceArgs,
}

impl RenderArgs {
    fn request(&self) -> AerialViewRequest {
        AerialViewRequest::new(
            GeoPose::new(self.lat, self.lon, self.bearing),
            CameraSpec::new(self.altitude, self.fov).with_output(self.width, self.height),
        )
    }
}

pub async fn run(config_path: Option<&Path>, args: RenderArgs) -> Result<(), CliError> {
    let config = resolve_service_config(config_path, &args.service)?;
    let service = AerialViewService::new(config)?;

    let view = service.render(&args.request()).await?;

    view.image
        .save(&args.output)
        .map_err(|source| CliError::WriteImage {
            path: args.output.clone(),
            source,
        })?;

    println!("Wrote {}", args.output.display());
    println!("  Tiles: {}", view.report);
    println!("  Fetch: {}", service.metrics());
    Ok(())
}
