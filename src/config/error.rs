use std::fmt;

#[derive(Debug)]
pub enum EngineError {
    InvalidCoordinates(String),
    InvalidBounds(String),
    InvalidObstacle(String),
    DateOrder,
    InvalidDate(String),
    DateParse(chrono::ParseError),
    SamplingInterval,
    ShadeIntensity,
    GridDimensions(String),
    Io(std::io::Error),
    Json(serde_json::Error),
    Worker(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidCoordinates(msg) => write!(f, "Invalid coordinates: {}", msg),
            EngineError::InvalidBounds(msg) => write!(f, "Invalid bounds: {}", msg),
            EngineError::InvalidObstacle(msg) => write!(f, "Invalid obstacle: {}", msg),
            EngineError::DateOrder => write!(f, "end date cannot be earlier than start date"),
            EngineError::InvalidDate(msg) => write!(f, "Invalid date: {}", msg),
            EngineError::DateParse(e) => write!(f, "Failed to parse date: {}", e),
            EngineError::SamplingInterval => write!(
                f,
                "sampling_interval_minutes should be one of 5, 10, 12, 15, 20, 30, 60"
            ),
            EngineError::ShadeIntensity => write!(f, "shade intensities must be within (0, 1]"),
            EngineError::GridDimensions(msg) => write!(f, "Invalid grid dimensions: {}", msg),
            EngineError::Io(e) => write!(f, "I/O error: {}", e),
            EngineError::Json(e) => write!(f, "Failed to parse JSON: {}", e),
            EngineError::Worker(msg) => write!(f, "Grid worker error: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> EngineError {
        EngineError::Io(err)
    }
}

impl From<chrono::ParseError> for EngineError {
    fn from(err: chrono::ParseError) -> EngineError {
        EngineError::DateParse(err)
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> EngineError {
        EngineError::Json(err)
    }
}
