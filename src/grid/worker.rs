//! Message-passing front end for the exposure grid calculator.
//!
//! The calculator itself is a pure function; this module gives it the
//! request/response/progress shape hosts expect from a background worker.
//! Messages are JSON-serializable so the same protocol crosses process or
//! thread boundaries unchanged. For a given request id, progress values
//! arrive in strictly increasing order and the terminal result or error
//! message is always last. Requests are handled sequentially; a host that
//! supersedes a request simply ignores messages carrying the stale id.

use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::{self, JoinHandle};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::bounds::GridBounds;
use crate::config::{DateRange, EngineConfig, SampleStep};
use crate::grid::{ExposureGrid, GridRequest, compute_exposure_grid};
use crate::shadow::GeoObstacle;
use crate::slope::PlotSlope;

/// Date range as it crosses the wire: ISO-8601 calendar dates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsoDateRange {
    pub start: String,
    pub end: String,
}

/// Grid shape and tuning carried inside a calculate request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridJobConfig {
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub sample_step: SampleStep,
    #[serde(default)]
    pub slope: Option<PlotSlope>,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkerRequest {
    #[serde(rename_all = "camelCase")]
    Calculate {
        id: String,
        bounds: GridBounds,
        trees: Vec<GeoObstacle>,
        date_range: IsoDateRange,
        config: GridJobConfig,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkerResponse {
    Progress { id: String, progress: f64 },
    Result { id: String, grid: ExposureGrid },
    Error { id: String, error: String },
}

impl WorkerResponse {
    pub fn id(&self) -> &str {
        match self {
            WorkerResponse::Progress { id, .. }
            | WorkerResponse::Result { id, .. }
            | WorkerResponse::Error { id, .. } => id,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, WorkerResponse::Progress { .. })
    }
}

fn build_grid_request(
    bounds: GridBounds,
    trees: Vec<GeoObstacle>,
    date_range: &IsoDateRange,
    config: GridJobConfig,
) -> Result<GridRequest, String> {
    let start = NaiveDate::parse_from_str(&date_range.start, "%Y-%m-%d")
        .map_err(|e| format!("invalid start date {:?}: {}", date_range.start, e))?;
    let end = NaiveDate::parse_from_str(&date_range.end, "%Y-%m-%d")
        .map_err(|e| format!("invalid end date {:?}: {}", date_range.end, e))?;

    let range =
        DateRange::with_step(start, end, config.sample_step).map_err(|e| e.to_string())?;

    Ok(GridRequest {
        bounds,
        width: config.width,
        height: config.height,
        obstacles: trees,
        date_range: range,
        slope: config.slope,
        config: config.engine,
    })
}

fn handle_request(request: WorkerRequest, responses: &Sender<WorkerResponse>) {
    let WorkerRequest::Calculate {
        id,
        bounds,
        trees,
        date_range,
        config,
    } = request;

    let grid_request = match build_grid_request(bounds, trees, &date_range, config) {
        Ok(req) => req,
        Err(error) => {
            let _ = responses.send(WorkerResponse::Error { id, error });
            return;
        }
    };

    let progress_id = id.clone();
    let progress_tx = responses.clone();
    let result = compute_exposure_grid(&grid_request, move |progress| {
        let _ = progress_tx.send(WorkerResponse::Progress {
            id: progress_id.clone(),
            progress,
        });
    });

    let message = match result {
        Ok(grid) => WorkerResponse::Result { id, grid },
        Err(error) => WorkerResponse::Error {
            id,
            error: error.to_string(),
        },
    };
    let _ = responses.send(message);
}

/// Handle to a spawned grid worker thread.
///
/// Dropping the handle closes the request channel; the worker drains any
/// queued work and exits.
pub struct GridWorker {
    requests: Sender<WorkerRequest>,
    responses: Receiver<WorkerResponse>,
    handle: Option<JoinHandle<()>>,
}

impl GridWorker {
    pub fn send(&self, request: WorkerRequest) -> Result<(), String> {
        self.requests
            .send(request)
            .map_err(|_| "grid worker has shut down".to_string())
    }

    pub fn responses(&self) -> &Receiver<WorkerResponse> {
        &self.responses
    }

    /// Close the request channel and wait for the worker to finish.
    pub fn shutdown(self) {
        let GridWorker {
            requests,
            responses,
            handle,
        } = self;

        // The request sender must be gone before the join or the worker
        // loop never observes the hangup
        drop(requests);
        drop(responses);

        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

/// Spawn a dedicated worker thread serving grid computations.
pub fn spawn_grid_worker() -> GridWorker {
    let (request_tx, request_rx) = channel::<WorkerRequest>();
    let (response_tx, response_rx) = channel::<WorkerResponse>();

    let handle = thread::spawn(move || {
        while let Ok(request) = request_rx.recv() {
            handle_request(request, &response_tx);
        }
    });

    GridWorker {
        requests: request_tx,
        responses: response_rx,
        handle: Some(handle),
    }
}
