//! Stitched image build pipeline.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use image::RgbImage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::types::{BuildError, BuildProgress};
use crate::composite::Canvas;
use crate::config::StitchConfig;
use crate::coord::{resolve, CoordError, GeoPoint, MAX_ZOOM};
use crate::fetch::{FetchError, TileFetcher};
use crate::grid::{self, GridCell, GridPlan};
use crate::output::StitchedImage;
use crate::request::BuildRequest;

type ProgressCallback = Box<dyn Fn(BuildProgress) + Send + Sync>;

/// Builds stitched images.
///
/// Each build runs Validate → Resolve → Plan → {Fetch, Crop, Paste}* → Save.
/// Fetches run on a bounded pool of worker threads while the building thread
/// is the only writer to the canvas. Any failure aborts the build; a partial
/// canvas is never returned or saved.
///
/// # Example
///
/// ```ignore
/// use mapstitch::{BuildRequest, StitchOrchestrator, TileFetcher};
/// use mapstitch::config::StitchConfig;
///
/// let orchestrator = StitchOrchestrator::new(fetcher, StitchConfig::default());
/// let image = orchestrator.build(&BuildRequest::new(51.5638, -0.1648))?;
/// ```
pub struct StitchOrchestrator {
    fetcher: TileFetcher,
    config: StitchConfig,
    progress: Option<ProgressCallback>,
}

impl StitchOrchestrator {
    pub fn new(fetcher: TileFetcher, config: StitchConfig) -> Self {
        Self {
            fetcher,
            config,
            progress: None,
        }
    }

    /// Registers a callback invoked on the building thread after each paste.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(BuildProgress) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &StitchConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &TileFetcher {
        &self.fetcher
    }

    /// Builds the image for `request`.
    pub fn build(&self, request: &BuildRequest) -> Result<StitchedImage, BuildError> {
        self.build_with_cancellation(request, &CancellationToken::new())
    }

    /// Builds the image for `request`, stopping early once `cancel` fires.
    ///
    /// Cancellation stops new fetches; fetches already in flight finish and
    /// are discarded.
    pub fn build_with_cancellation(
        &self,
        request: &BuildRequest,
        cancel: &CancellationToken,
    ) -> Result<StitchedImage, BuildError> {
        let started = Instant::now();

        let request = &self.normalize(request);
        self.validate(request)?;

        let anchor = resolve(request.point, request.zoom, self.config.precision)?;
        let plan = grid::plan(
            &anchor,
            request.width,
            request.height,
            self.config.precision,
        )?;

        info!(
            anchor = %request.point,
            zoom = request.zoom,
            width = request.width,
            height = request.height,
            map_type = %request.map_type,
            rows = plan.rows,
            cols = plan.cols,
            provider = self.fetcher.provider().name(),
            "Starting build"
        );

        let workers = self.config.parallel_fetches.min(plan.cell_count()).max(1);
        let canvas = if workers == 1 {
            self.run_sequential(&plan, request, cancel)?
        } else {
            self.run_parallel(&plan, request, cancel, workers)?
        };

        let path = StitchedImage::default_path(request, &self.config.output_dir);
        let image = StitchedImage::new(canvas.into_image(), request.clone(), path);

        if request.save {
            image.save()?;
        }

        info!(
            tiles = plan.cell_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Build complete"
        );

        Ok(image)
    }

    /// Re-rounds the anchor to the configured precision so the file name,
    /// cache keys and cell centers all agree with the boundary epsilon.
    fn normalize(&self, request: &BuildRequest) -> BuildRequest {
        let point = request.point;
        BuildRequest {
            point: GeoPoint::rounded(point.latitude(), point.longitude(), self.config.precision),
            ..request.clone()
        }
    }

    /// Rejects invalid requests before any network traffic.
    fn validate(&self, request: &BuildRequest) -> Result<(), BuildError> {
        request.point.validate()?;
        if request.zoom > MAX_ZOOM || !self.fetcher.provider().supports_zoom(request.zoom) {
            return Err(CoordError::InvalidZoom(request.zoom).into());
        }
        grid::check_dimensions(request.width, request.height, self.config.max_dimension)?;
        Ok(())
    }

    fn run_sequential(
        &self,
        plan: &GridPlan,
        request: &BuildRequest,
        cancel: &CancellationToken,
    ) -> Result<Canvas, BuildError> {
        let mut canvas = Canvas::new(plan.width, plan.height);
        let total = plan.cell_count();

        for (index, cell) in plan.cells().enumerate() {
            if cancel.is_cancelled() {
                return Err(BuildError::Cancelled);
            }

            let tile = self
                .fetcher
                .fetch(cell, plan.zoom, request.map_type)
                .map_err(|source| fetch_error(cell, source, cancel))?;
            canvas.place(tile, cell.row, cell.col)?;

            self.report(BuildProgress {
                completed: index + 1,
                total,
            });
        }

        Ok(canvas)
    }

    fn run_parallel(
        &self,
        plan: &GridPlan,
        request: &BuildRequest,
        cancel: &CancellationToken,
        workers: usize,
    ) -> Result<Canvas, BuildError> {
        let build_token = cancel.child_token();
        let cells: Vec<&GridCell> = plan.cells().collect();
        let total = cells.len();
        let cursor = AtomicUsize::new(0);
        let mut canvas = Canvas::new(plan.width, plan.height);

        // Capacity bounds the rasters fetched but not yet pasted.
        let (tx, rx) = mpsc::sync_channel::<(GridCell, Result<RgbImage, FetchError>)>(workers);

        let outcome = thread::scope(|scope| {
            for worker in 0..workers {
                let tx = tx.clone();
                let cells = &cells;
                let cursor = &cursor;
                let token = &build_token;
                let fetcher = &self.fetcher;
                let zoom = plan.zoom;
                let map_type = request.map_type;

                scope.spawn(move || loop {
                    if token.is_cancelled() {
                        debug!(worker, "Worker stopping");
                        break;
                    }
                    let index = cursor.fetch_add(1, Ordering::Relaxed);
                    let Some(cell) = cells.get(index) else {
                        break;
                    };
                    let result = fetcher.fetch(cell, zoom, map_type);
                    if tx.send((**cell, result)).is_err() {
                        break;
                    }
                });
            }
            drop(tx);

            let mut outcome: Result<(), BuildError> = Ok(());
            let mut completed = 0;

            // Keep draining after a failure so no worker blocks on send.
            for (cell, result) in rx {
                if outcome.is_err() {
                    continue;
                }
                let pasted = result
                    .map_err(|source| fetch_error(&cell, source, cancel))
                    .and_then(|tile| {
                        canvas
                            .place(tile, cell.row, cell.col)
                            .map_err(BuildError::from)
                    });
                match pasted {
                    Ok(()) => {
                        completed += 1;
                        self.report(BuildProgress { completed, total });
                    }
                    Err(e) => {
                        warn!(row = cell.row, col = cell.col, error = %e, "Aborting build");
                        build_token.cancel();
                        outcome = Err(e);
                    }
                }
            }

            if outcome.is_ok() && completed < total {
                outcome = Err(BuildError::Cancelled);
            }
            outcome
        });

        outcome?;
        if cancel.is_cancelled() {
            return Err(BuildError::Cancelled);
        }
        Ok(canvas)
    }

    fn report(&self, progress: BuildProgress) {
        debug!(
            completed = progress.completed,
            total = progress.total,
            "Tile pasted"
        );
        if let Some(callback) = &self.progress {
            callback(progress);
        }
    }
}

/// A fetch that fails after the caller cancelled reports the cancellation.
fn fetch_error(cell: &GridCell, source: FetchError, cancel: &CancellationToken) -> BuildError {
    if cancel.is_cancelled() {
        return BuildError::Cancelled;
    }
    BuildError::Fetch {
        row: cell.row,
        col: cell.col,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ProviderError, TileFetchRequest, TileProvider};
    use image::Rgb;
    use parking_lot::Mutex;
    use std::io::Cursor;
    use std::sync::Arc;

    /// Serves solid 640×640 PNGs and records every request.
    struct RecordingProvider {
        tile: Vec<u8>,
        requests: Mutex<Vec<TileFetchRequest>>,
        fail_after: Option<usize>,
    }

    impl RecordingProvider {
        fn new() -> Self {
            let img = RgbImage::from_pixel(640, 640, Rgb([10, 20, 30]));
            let mut buffer = Cursor::new(Vec::new());
            img.write_to(&mut buffer, image::ImageFormat::Png).unwrap();
            Self {
                tile: buffer.into_inner(),
                requests: Mutex::new(Vec::new()),
                fail_after: None,
            }
        }

        fn failing_after(mut self, n: usize) -> Self {
            self.fail_after = Some(n);
            self
        }
    }

    impl TileProvider for RecordingProvider {
        fn fetch(&self, request: &TileFetchRequest) -> Result<Vec<u8>, ProviderError> {
            let mut requests = self.requests.lock();
            requests.push(*request);
            match self.fail_after {
                Some(n) if requests.len() > n => {
                    Err(ProviderError::HttpError("HTTP 500".to_string()))
                }
                _ => Ok(self.tile.clone()),
            }
        }

        fn name(&self) -> &str {
            "Recording"
        }

        fn max_zoom(&self) -> u8 {
            21
        }
    }

    fn orchestrator(provider: Arc<RecordingProvider>, parallel: usize) -> StitchOrchestrator {
        let config = StitchConfig::default().with_parallel_fetches(parallel);
        StitchOrchestrator::new(TileFetcher::new(provider), config)
    }

    fn london() -> BuildRequest {
        BuildRequest::new(51.563839178, -0.164794922)
    }

    #[test]
    fn test_build_two_columns() {
        let provider = Arc::new(RecordingProvider::new());
        let image = orchestrator(provider.clone(), 1)
            .build(&london().with_size(1200, 300))
            .unwrap();

        assert_eq!((image.width(), image.height()), (1200, 300));
        assert_eq!(image.image().get_pixel(1199, 299), &Rgb([10, 20, 30]));

        let requests = provider.requests.lock();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.width == 640 && r.height == 640));
        assert!(requests.iter().all(|r| r.zoom == 19));
    }

    #[test]
    fn test_oversized_request_issues_no_fetches() {
        let provider = Arc::new(RecordingProvider::new());
        let err = orchestrator(provider.clone(), 4)
            .build(&london().with_size(3500, 300))
            .unwrap_err();

        assert!(matches!(
            err,
            BuildError::DimensionTooLarge {
                axis: "width",
                value: 3500,
                max: 3000
            }
        ));
        assert!(provider.requests.lock().is_empty());
    }

    #[test]
    fn test_invalid_zoom_is_rejected_up_front() {
        let provider = Arc::new(RecordingProvider::new());
        let err = orchestrator(provider.clone(), 1)
            .build(&london().with_zoom(20))
            .unwrap_err();

        assert!(err.is_input_error());
        assert!(provider.requests.lock().is_empty());
    }

    #[test]
    fn test_sequential_failure_stops_fetching() {
        let provider = Arc::new(RecordingProvider::new().failing_after(1));
        let err = orchestrator(provider.clone(), 1)
            .build(&london().with_size(1900, 300))
            .unwrap_err();

        assert!(matches!(err, BuildError::Fetch { row: 0, col: 1, .. }));
        assert_eq!(provider.requests.lock().len(), 2);
    }

    #[test]
    fn test_parallel_failure_aborts_build() {
        let provider = Arc::new(RecordingProvider::new().failing_after(2));
        let err = orchestrator(provider, 3)
            .build(&london().with_size(3000, 3000))
            .unwrap_err();

        assert!(matches!(err, BuildError::Fetch { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_pre_cancelled_build() {
        let provider = Arc::new(RecordingProvider::new());
        let token = CancellationToken::new();
        token.cancel();

        for parallel in [1, 4] {
            let err = orchestrator(provider.clone(), parallel)
                .build_with_cancellation(&london().with_size(1900, 1300), &token)
                .unwrap_err();
            assert!(matches!(err, BuildError::Cancelled));
        }
        assert!(provider.requests.lock().is_empty());
    }

    #[test]
    fn test_progress_reports_every_cell() {
        let provider = Arc::new(RecordingProvider::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        orchestrator(provider, 3)
            .with_progress(move |p| sink.lock().push(p))
            .build(&london().with_size(1900, 1300))
            .unwrap();

        let seen = seen.lock();
        assert_eq!(seen.len(), 9);
        assert!(seen.iter().all(|p| p.total == 9));
        assert_eq!(seen.last().unwrap().completed, 9);
    }

    #[test]
    fn test_save_writes_default_file_name() {
        let temp = tempfile::TempDir::new().unwrap();
        let provider = Arc::new(RecordingProvider::new());
        let config = StitchConfig::default().with_output_dir(temp.path());
        let orchestrator = StitchOrchestrator::new(TileFetcher::new(provider), config);

        let image = orchestrator
            .build(&london().with_size(100, 50).with_save(true))
            .unwrap();

        assert_eq!(
            image.path(),
            temp.path().join("51.56383918_-0.16479492_19_100_50.jpg")
        );
        assert!(image.path().exists());
    }

    #[test]
    fn test_anchor_is_rounded_to_configured_precision() {
        let provider = Arc::new(RecordingProvider::new());
        let config = StitchConfig::default().with_precision(4);
        let orchestrator = StitchOrchestrator::new(TileFetcher::new(provider.clone()), config);

        let image = orchestrator.build(&london().with_size(100, 50)).unwrap();

        let anchor = image.request().point;
        assert_eq!(anchor.latitude(), 51.5638);
        assert_eq!(anchor.longitude(), -0.1648);
        assert_eq!(
            image.path(),
            std::path::Path::new("output").join("51.5638_-0.1648_19_100_50.jpg")
        );

        let center = provider.requests.lock()[0].center;
        let factor = 1e4;
        assert_eq!((center.latitude() * factor).round() / factor, center.latitude());
        assert_eq!((center.longitude() * factor).round() / factor, center.longitude());
    }

    #[test]
    fn test_failure_after_cancellation_reports_cancelled() {
        let token = CancellationToken::new();
        let cell = GridCell {
            row: 0,
            col: 0,
            center: GeoPoint::rounded(1.0, 2.0, 8),
            fetch_width: 640,
            fetch_height: 640,
        };
        let timeout = || FetchError::Provider(ProviderError::Timeout("slow".to_string()));

        assert!(matches!(
            fetch_error(&cell, timeout(), &token),
            BuildError::Fetch { .. }
        ));
        token.cancel();
        assert!(matches!(
            fetch_error(&cell, timeout(), &token),
            BuildError::Cancelled
        ));
    }
}
