//! The aerial view service.

use std::sync::Arc;
use std::time::Instant;

use image::RgbImage;
use tracing::{debug, info, warn};

use super::{AerialViewError, ServiceConfig};
use crate::cache::{DiskTileStore, TileCacheClient, TileStore};
use crate::grid::{AssemblyReport, BoundingBox, Footprint, GridAssembler};
use crate::provider::{HttpClient, ReqwestClient, UrlTemplate};
use crate::request::{AerialViewRequest, CameraSpec, GeoPose};
use crate::telemetry::{FetchMetrics, TelemetrySnapshot};
use crate::view::{ViewGeometry, ViewSynthesizer};

/// Tiles and geometry needed for one request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewPlan {
    /// Ground footprint and camera tile position.
    pub footprint: Footprint,
    /// Tiles to fetch.
    pub bbox: BoundingBox,
    /// Zoom level of the tiles.
    pub zoom: u8,
}

/// A rendered view and how its tiles were obtained.
#[derive(Debug, Clone)]
pub struct RenderedView {
    /// The camera image at the requested output size.
    pub image: RgbImage,
    /// Tile outcome tally.
    pub report: AssemblyReport,
    /// The geometry the image was produced from.
    pub plan: ViewPlan,
}

/// Synthesizes aerial camera images from slippy-map tiles.
///
/// Owns a long-lived HTTP client, the tile store and the configuration. A
/// single instance can serve concurrent requests; all requests share the
/// connection pool and the cache directory.
///
/// # Example
///
/// ```ignore
/// let service = AerialViewService::new(ServiceConfig::default())?;
/// let image = service
///     .get_aerial_image_at(47.3769, 8.5417, 45.0, 120.0, 70.0, (640, 480))
///     .await?;
/// image.save("view.png")?;
/// ```
pub struct AerialViewService<C = ReqwestClient, S = DiskTileStore> {
    config: ServiceConfig,
    template: UrlTemplate,
    client: TileCacheClient<C, S>,
    assembler: GridAssembler,
    synthesizer: ViewSynthesizer,
    metrics: Arc<FetchMetrics>,
}

impl AerialViewService {
    /// Create a service that downloads over HTTP and caches on disk.
    pub fn new(config: ServiceConfig) -> Result<Self, AerialViewError> {
        config.validate()?;
        let http = ReqwestClient::with_timeout(config.http_timeout, &config.user_agent)?;
        let store = DiskTileStore::new(&config.cache_dir);
        Self::with_parts(config, http, store)
    }
}

impl<C: HttpClient, S: TileStore> AerialViewService<C, S> {
    /// Create a service from an explicit HTTP client and tile store.
    pub fn with_parts(config: ServiceConfig, http: C, store: S) -> Result<Self, AerialViewError> {
        config.validate()?;
        let template = config.template()?;
        let metrics = Arc::new(FetchMetrics::new());

        let client = TileCacheClient::new(http, store)
            .with_retry_policy(config.retry_policy())
            .with_key_scheme(config.cache_key_scheme)
            .with_metrics(Arc::clone(&metrics));

        let assembler = GridAssembler::new(config.concurrency)
            .with_cache_hits_bypass_limiter(config.cache_hits_bypass_limiter)
            .with_deadline(config.request_deadline)
            .with_tile_size(Some(config.tile_size));

        info!(
            template = %template,
            zoom = config.zoom,
            cache_dir = %config.cache_dir.display(),
            concurrency = config.concurrency,
            "Aerial view service ready"
        );

        Ok(Self {
            config,
            template,
            client,
            assembler,
            synthesizer: ViewSynthesizer::new(),
            metrics,
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Point-in-time copy of the fetch counters.
    pub fn metrics(&self) -> TelemetrySnapshot {
        self.metrics.snapshot()
    }

    /// Validate a request and work out which tiles it needs.
    ///
    /// Performs no I/O.
    pub fn plan(&self, request: &AerialViewRequest) -> Result<ViewPlan, AerialViewError> {
        request.validate()?;

        let zoom = self.config.zoom;
        let footprint = Footprint::compute(
            request.pose.latitude,
            request.pose.longitude,
            request.camera.altitude,
            request.camera.fov,
            zoom,
        )?;
        let bbox = footprint.bounding_box();

        let tiles = bbox.tile_count();
        if tiles > self.config.max_tiles_per_request {
            return Err(AerialViewError::FootprintTooLarge {
                tiles,
                max: self.config.max_tiles_per_request,
            });
        }

        debug!(
            ratio = footprint.ratio,
            extra_tiles = footprint.extra_tiles,
            columns = bbox.columns(),
            rows = bbox.rows(),
            "Planned view"
        );

        Ok(ViewPlan {
            footprint,
            bbox,
            zoom,
        })
    }

    /// Render a view and report how its tiles were obtained.
    pub async fn render(
        &self,
        request: &AerialViewRequest,
    ) -> Result<RenderedView, AerialViewError> {
        let started = Instant::now();

        match self.render_inner(request).await {
            Ok(view) => {
                let elapsed = started.elapsed();
                self.metrics.view_rendered(elapsed);
                info!(
                    lat = request.pose.latitude,
                    lon = request.pose.longitude,
                    bearing = request.pose.bearing,
                    tiles = %view.report,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Aerial view rendered"
                );
                Ok(view)
            }
            Err(e) => {
                self.metrics.view_failed();
                warn!(
                    lat = request.pose.latitude,
                    lon = request.pose.longitude,
                    error = %e,
                    "Aerial view failed"
                );
                Err(e)
            }
        }
    }

    /// Synthesize the camera image for a request.
    ///
    /// Tiles the server does not have are left black.
    ///
    /// # Errors
    ///
    /// - [`AerialViewError::InvalidGeometry`] before any I/O for a bad request
    /// - [`AerialViewError::FootprintTooLarge`] when the view needs too many tiles
    /// - [`AerialViewError::TileFetch`] when a tile fails for a reason other
    ///   than "not found", such as a network error after the last retry
    /// - [`AerialViewError::AllTilesFailed`] when no tile could be resolved
    pub async fn get_aerial_image(
        &self,
        request: &AerialViewRequest,
    ) -> Result<RgbImage, AerialViewError> {
        self.render(request).await.map(|view| view.image)
    }

    /// Convenience form of [`get_aerial_image`](Self::get_aerial_image).
    ///
    /// # Arguments
    ///
    /// * `lat`, `lon` - Camera position in degrees
    /// * `bearing` - Heading in degrees, clockwise from north
    /// * `altitude` - Height above ground in meters
    /// * `fov` - Full field of view in degrees
    /// * `output` - Output `(width, height)` in pixels
    pub async fn get_aerial_image_at(
        &self,
        lat: f64,
        lon: f64,
        bearing: f64,
        altitude: f64,
        fov: f64,
        output: (u32, u32),
    ) -> Result<RgbImage, AerialViewError> {
        let request = AerialViewRequest::new(
            GeoPose::new(lat, lon, bearing),
            CameraSpec::new(altitude, fov).with_output(output.0, output.1),
        );
        self.get_aerial_image(&request).await
    }

    async fn render_inner(
        &self,
        request: &AerialViewRequest,
    ) -> Result<RenderedView, AerialViewError> {
        let plan = self.plan(request)?;

        let grid = self
            .assembler
            .assemble(&self.client, &self.template, &plan.bbox, plan.zoom)
            .await?;

        let (tile_w, tile_h) = grid.tile_size;
        let geometry = ViewGeometry {
            center: plan.footprint.center_pixel(tile_w, tile_h),
            half_width: plan.footprint.crop_half_width(tile_w),
            bearing: request.pose.bearing,
        };

        let image = self.synthesizer.synthesize(
            &grid.image,
            &geometry,
            request.camera.output.dimensions(),
        );

        Ok(RenderedView {
            image,
            report: grid.report,
            plan,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{encode_png, MemoryTileStore, TileError};
    use crate::provider::{MockHttpClient, ProviderError};
    use image::Rgb;

    fn solid_tiles(color: [u8; 3]) -> MockHttpClient {
        let png = encode_png(&RgbImage::from_pixel(256, 256, Rgb(color))).unwrap();
        MockHttpClient::fixed(Ok(png))
    }

    fn config() -> ServiceConfig {
        ServiceConfig::default()
            .with_url_template("https://tile.example/{z}/{x}/{y}.png")
            .with_zoom(17)
    }

    fn request(altitude: f64) -> AerialViewRequest {
        AerialViewRequest::new(
            GeoPose::new(46.0, 7.0, 30.0),
            CameraSpec::new(altitude, 60.0).with_output(64, 48),
        )
    }

    #[test]
    fn test_plan_minimum_margin() {
        let service =
            AerialViewService::with_parts(config(), solid_tiles([0, 0, 0]), MemoryTileStore::new())
                .unwrap();
        let plan = service.plan(&request(100.0)).unwrap();

        assert_eq!(plan.zoom, 17);
        assert_eq!(plan.footprint.extra_tiles, 5);
        assert!(plan.bbox.columns() >= 10 && plan.bbox.columns() <= 11);
    }

    #[test]
    fn test_plan_rejects_huge_footprint() {
        let service = AerialViewService::with_parts(
            config().with_max_tiles_per_request(200),
            solid_tiles([0, 0, 0]),
            MemoryTileStore::new(),
        )
        .unwrap();

        let err = service.plan(&request(20_000.0)).unwrap_err();
        assert!(matches!(err, AerialViewError::FootprintTooLarge { max: 200, .. }));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = AerialViewService::with_parts(
            config().with_concurrency(0),
            solid_tiles([0, 0, 0]),
            MemoryTileStore::new(),
        );
        assert!(matches!(result, Err(AerialViewError::Config(_))));
    }

    #[tokio::test]
    async fn test_render_solid_world() {
        let service = AerialViewService::with_parts(
            config(),
            solid_tiles([60, 120, 180]),
            MemoryTileStore::new(),
        )
        .unwrap();

        let view = service.render(&request(100.0)).await.unwrap();
        assert_eq!(view.image.dimensions(), (64, 48));
        assert_eq!(view.image.get_pixel(32, 24), &Rgb([60, 120, 180]));
        assert!(view.report.is_complete());

        let metrics = service.metrics();
        assert_eq!(metrics.views_rendered, 1);
        assert_eq!(metrics.network_fetches as usize, view.report.requested);
    }

    #[tokio::test]
    async fn test_invalid_geometry_counts_failure() {
        let http = Arc::new(solid_tiles([0, 0, 0]));
        let service =
            AerialViewService::with_parts(config(), Arc::clone(&http), MemoryTileStore::new())
                .unwrap();

        let err = service
            .get_aerial_image_at(46.0, 7.0, 0.0, -10.0, 60.0, (64, 64))
            .await
            .unwrap_err();

        assert!(matches!(err, AerialViewError::InvalidGeometry(_)));
        assert_eq!(http.calls(), 0);
        assert_eq!(service.metrics().views_failed, 1);
    }

    #[tokio::test]
    async fn test_all_tiles_missing() {
        let service = AerialViewService::with_parts(
            config(),
            MockHttpClient::fixed(Err(ProviderError::NotFound(String::new()))),
            MemoryTileStore::new(),
        )
        .unwrap();

        let err = service.get_aerial_image(&request(100.0)).await.unwrap_err();
        assert!(matches!(
            err,
            AerialViewError::AllTilesFailed { tiles, not_found, .. } if tiles == not_found
        ));
    }

    #[tokio::test]
    async fn test_single_transport_failure_fails_request() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let png = encode_png(&RgbImage::from_pixel(256, 256, Rgb([9, 9, 9]))).unwrap();
        let calls = AtomicUsize::new(0);
        let http = MockHttpClient::new(move |_| {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(ProviderError::Transport("connection refused".into()));
            }
            Ok(bytes::Bytes::from(png.clone()))
        });
        let service = AerialViewService::with_parts(
            config().with_max_retries(1),
            http,
            MemoryTileStore::new(),
        )
        .unwrap();

        let err = service.render(&request(100.0)).await.unwrap_err();

        assert!(matches!(
            err,
            AerialViewError::TileFetch {
                source: TileError::Fetch { attempts: 1, .. },
                ..
            }
        ));
        assert_eq!(service.metrics().views_failed, 1);
        assert_eq!(service.metrics().views_rendered, 0);
    }
}
