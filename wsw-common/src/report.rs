//! Window-strike report entity
//!
//! A report starts life as a [`ReportDraft`] owned by the submission workflow and becomes a
//! [`Report`] once the record store has assigned it an id and a creation time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::{Error, Result};

/// Condition of the bird when it was found
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrikeStatus {
    #[default]
    Dead,
    Stunned,
    Injured,
    /// Stored text that is none of the above
    #[serde(other)]
    Unknown,
}

impl StrikeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrikeStatus::Dead => "dead",
            StrikeStatus::Stunned => "stunned",
            StrikeStatus::Injured => "injured",
            StrikeStatus::Unknown => "unknown",
        }
    }
}

impl FromStr for StrikeStatus {
    type Err = std::convert::Infallible;

    /// Total parse: unrecognized text maps to [`StrikeStatus::Unknown`]
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "dead" => StrikeStatus::Dead,
            "stunned" => StrikeStatus::Stunned,
            "injured" => StrikeStatus::Injured,
            _ => StrikeStatus::Unknown,
        })
    }
}

impl fmt::Display for StrikeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of glass the bird collided with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowType {
    #[default]
    ClearGlass,
    ReflectiveGlass,
    Mirrored,
    #[serde(other)]
    Unknown,
}

impl WindowType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowType::ClearGlass => "clear_glass",
            WindowType::ReflectiveGlass => "reflective_glass",
            WindowType::Mirrored => "mirrored",
            WindowType::Unknown => "unknown",
        }
    }
}

impl FromStr for WindowType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "clear_glass" => WindowType::ClearGlass,
            "reflective_glass" => WindowType::ReflectiveGlass,
            "mirrored" => WindowType::Mirrored,
            _ => WindowType::Unknown,
        })
    }
}

impl fmt::Display for WindowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// WGS84 position in decimal degrees
///
/// "No location captured" is represented by the absence of a `Coordinates`, never by (0, 0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Build a coordinate pair, rejecting non-finite or out-of-range values
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::InvalidInput(format!(
                "latitude out of range: {}",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::InvalidInput(format!(
                "longitude out of range: {}",
                longitude
            )));
        }
        Ok(Self { latitude, longitude })
    }
}

/// In-progress report, never persisted on its own
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportDraft {
    pub reporter_name: String,
    pub bird_species: String,
    pub status: StrikeStatus,
    pub window_type: WindowType,
    pub photo_url: Option<String>,
    pub location: Option<Coordinates>,
    pub description: String,
}

/// Persisted report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    pub reporter_name: String,
    pub bird_species: String,
    pub status: StrikeStatus,
    pub window_type: WindowType,
    pub photo_url: Option<String>,
    pub location: Option<Coordinates>,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Report {
    /// Attach store-assigned identity to a draft
    pub fn from_draft(draft: ReportDraft, id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            reporter_name: draft.reporter_name,
            bird_species: draft.bird_species,
            status: draft.status,
            window_type: draft.window_type,
            photo_url: draft.photo_url,
            location: draft.location,
            description: draft.description,
            created_at,
        }
    }

    /// User-supplied fields of this report, without the store-assigned ones
    pub fn to_draft(&self) -> ReportDraft {
        ReportDraft {
            reporter_name: self.reporter_name.clone(),
            bird_species: self.bird_species.clone(),
            status: self.status,
            window_type: self.window_type,
            photo_url: self.photo_url.clone(),
            location: self.location,
            description: self.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_defaults() {
        let draft = ReportDraft::default();
        assert_eq!(draft.status, StrikeStatus::Dead);
        assert_eq!(draft.window_type, WindowType::ClearGlass);
        assert!(draft.location.is_none());
        assert!(draft.photo_url.is_none());
        assert!(draft.bird_species.is_empty());
    }

    #[test]
    fn test_status_parse_is_total() {
        assert_eq!("stunned".parse::<StrikeStatus>().unwrap(), StrikeStatus::Stunned);
        assert_eq!("asleep".parse::<StrikeStatus>().unwrap(), StrikeStatus::Unknown);
        assert_eq!("".parse::<WindowType>().unwrap(), WindowType::Unknown);
    }

    #[test]
    fn test_status_serde_unknown_value() {
        let status: StrikeStatus = serde_json::from_str("\"flying\"").unwrap();
        assert_eq!(status, StrikeStatus::Unknown);

        let json = serde_json::to_string(&WindowType::ReflectiveGlass).unwrap();
        assert_eq!(json, "\"reflective_glass\"");
    }

    #[test]
    fn test_coordinates_range() {
        assert!(Coordinates::new(25.03, 121.56).is_ok());
        assert!(Coordinates::new(0.0, 0.0).is_ok());
        assert!(Coordinates::new(91.0, 0.0).is_err());
        assert!(Coordinates::new(0.0, -180.5).is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_draft_round_trip_through_report() {
        let draft = ReportDraft {
            reporter_name: "Lin".to_string(),
            bird_species: "五色鳥 (95%)".to_string(),
            status: StrikeStatus::Injured,
            window_type: WindowType::Mirrored,
            photo_url: Some("http://localhost/photos/a.jpg".to_string()),
            location: Some(Coordinates::new(25.0, 121.5).unwrap()),
            description: "east wing".to_string(),
        };
        let report = Report::from_draft(draft.clone(), Uuid::new_v4(), Utc::now());
        assert_eq!(report.to_draft(), draft);
    }
}
