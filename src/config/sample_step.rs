use serde::{Deserialize, Serialize};

/// Day-subsampling strategy used when iterating a date range.
///
/// `Daily` evaluates every calendar day; `Weekly` and `Monthly` trade
/// accuracy for speed in long-range exposure grid computations.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum SampleStep {
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "monthly")]
    Monthly,
}

impl Default for SampleStep {
    fn default() -> Self {
        SampleStep::Daily
    }
}
