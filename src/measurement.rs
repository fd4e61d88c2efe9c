//! Per-video measurement results.
//!
//! Each saved angle appends a [`Measurement`] row. Together with the
//! participant metadata these form the results record the host serializes
//! (the JSON field names match the host's existing results shape).

use serde::{Deserialize, Serialize};

/// One saved angle measurement, in save order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    /// 1-based position in the video's measurement list.
    pub frame_number: usize,
    /// The displayed angle in degrees at save time.
    pub frame_angle_measurement: f64,
    /// `m:ss` label of a checkpoint near the saved frame, or empty.
    #[serde(default)]
    pub frame_checkpoint: String,
}

/// Participant metadata attached to a video's results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInfo {
    /// Date as `YYYYMMDD`.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub participant_id: String,
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub configuration: String,
    #[serde(default)]
    pub trial: String,
}

impl ParticipantInfo {
    /// Build from raw form values: fields are trimmed and the date's `-`
    /// separators removed (`2024-03-01` becomes `20240301`).
    pub fn from_form(
        date: &str,
        participant_id: &str,
        task: &str,
        configuration: &str,
        trial: &str,
    ) -> Self {
        Self {
            date: date.trim().replace('-', ""),
            participant_id: participant_id.trim().to_string(),
            task: task.trim().to_string(),
            configuration: configuration.trim().to_string(),
            trial: trial.trim().to_string(),
        }
    }
}

/// Results record for one video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoResults {
    #[serde(flatten)]
    pub participant: ParticipantInfo,
    #[serde(default)]
    pub measurements: Vec<Measurement>,
}

impl VideoResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a measurement, numbering it after the existing ones.
    /// Returns the assigned frame number.
    pub fn push_measurement(&mut self, angle: f64, checkpoint_label: Option<String>) -> usize {
        let frame_number = self.measurements.len() + 1;
        self.measurements.push(Measurement {
            frame_number,
            frame_angle_measurement: angle,
            frame_checkpoint: checkpoint_label.unwrap_or_default(),
        });
        frame_number
    }

    /// Remove the row numbered `frame_number`.
    pub fn remove_measurement(&mut self, frame_number: usize) -> Option<Measurement> {
        let index = self
            .measurements
            .iter()
            .position(|m| m.frame_number == frame_number)?;
        Some(self.measurements.remove(index))
    }

    /// Put a removed row back before the first row with a higher frame number.
    pub fn restore_measurement(&mut self, measurement: Measurement) {
        let index = self
            .measurements
            .iter()
            .position(|m| m.frame_number > measurement.frame_number)
            .unwrap_or(self.measurements.len());
        self.measurements.insert(index, measurement);
    }

    /// Export to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Import from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
