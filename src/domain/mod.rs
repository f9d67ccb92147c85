/// Domain models for the application
use chrono::{DateTime, Datelike, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One mission attempt as served by `GET /launches`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Launch {
    pub id: String,
    pub name: String,
    pub date_utc: DateTime<Utc>,
    pub date_local: DateTime<FixedOffset>,
    pub success: Option<bool>,
    #[serde(default)]
    pub upcoming: bool,
    pub details: Option<String>,
    pub rocket: String,
    pub launchpad: String,
    #[serde(default)]
    pub payloads: Vec<String>,
    #[serde(default)]
    pub links: LaunchLinks,
}

impl Launch {
    pub fn outcome(&self) -> Outcome {
        Outcome::from_flags(self.success, self.upcoming)
    }

    /// Year of the UTC timestamp, used by the year filter
    pub fn year_utc(&self) -> i32 {
        self.date_utc.year()
    }

    /// Year at the launch site, used by statistics and the timeline
    pub fn year_local(&self) -> i32 {
        self.date_local.year()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchLinks {
    pub patch: PatchLinks,
    pub reddit: RedditLinks,
    pub flickr: FlickrLinks,
    pub presskit: Option<String>,
    pub webcast: Option<String>,
    pub youtube_id: Option<String>,
    pub article: Option<String>,
    pub wikipedia: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchLinks {
    pub small: Option<String>,
    pub large: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedditLinks {
    pub campaign: Option<String>,
    pub launch: Option<String>,
    pub media: Option<String>,
    pub recovery: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlickrLinks {
    pub small: Vec<String>,
    pub original: Vec<String>,
}

/// Metric/imperial pair used by rocket dimensions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Measure {
    pub meters: Option<f64>,
    pub feet: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mass {
    pub kg: Option<f64>,
    pub lb: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rocket {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub stages: u32,
    #[serde(default)]
    pub boosters: u32,
    pub cost_per_launch: Option<u64>,
    pub success_rate_pct: Option<f64>,
    pub first_flight: Option<String>,
    pub country: Option<String>,
    pub company: Option<String>,
    #[serde(default)]
    pub height: Measure,
    #[serde(default)]
    pub diameter: Measure,
    #[serde(default)]
    pub mass: Mass,
    pub description: Option<String>,
    #[serde(default)]
    pub flickr_images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Launchpad {
    pub id: String,
    pub name: String,
    pub full_name: Option<String>,
    pub locality: Option<String>,
    pub region: Option<String>,
    pub timezone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub launch_attempts: u32,
    #[serde(default)]
    pub launch_successes: u32,
    pub status: Option<String>,
    pub details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub id: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub mass_kg: Option<f64>,
    pub mass_lbs: Option<f64>,
    pub orbit: Option<String>,
    pub reference_system: Option<String>,
    pub regime: Option<String>,
    pub longitude: Option<f64>,
    pub semi_major_axis_km: Option<f64>,
    pub eccentricity: Option<f64>,
    pub periapsis_km: Option<f64>,
    pub apoapsis_km: Option<f64>,
    pub inclination_deg: Option<f64>,
    pub period_min: Option<f64>,
    pub lifespan_years: Option<f64>,
    pub epoch: Option<String>,
    pub mean_motion: Option<f64>,
    pub raan: Option<f64>,
    pub arg_of_pericenter: Option<f64>,
    pub mean_anomaly: Option<f64>,
}

/// A launch joined with whichever related records resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchDetails {
    #[serde(flatten)]
    pub launch: Launch,
    pub rocket_details: Option<Rocket>,
    pub launchpad_details: Option<Launchpad>,
    #[serde(default)]
    pub payloads_details: Vec<Payload>,
}

/// Displayed outcome of a launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Upcoming,
    Success,
    Failed,
    Unknown,
}

impl Outcome {
    /// `upcoming` wins over whatever `success` says
    pub fn from_flags(success: Option<bool>, upcoming: bool) -> Self {
        match (upcoming, success) {
            (true, _) => Outcome::Upcoming,
            (false, Some(true)) => Outcome::Success,
            (false, Some(false)) => Outcome::Failed,
            (false, None) => Outcome::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Upcoming => "Upcoming",
            Outcome::Success => "Success",
            Outcome::Failed => "Failed",
            Outcome::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome selector of the filter bar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeFilter {
    #[default]
    All,
    Success,
    Failed,
    Favorites,
}

impl OutcomeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeFilter::All => "all",
            OutcomeFilter::Success => "success",
            OutcomeFilter::Failed => "failed",
            OutcomeFilter::Favorites => "favorites",
        }
    }

    /// Unknown values read as `All`
    pub fn parse(value: &str) -> Self {
        match value {
            "success" => OutcomeFilter::Success,
            "failed" => OutcomeFilter::Failed,
            "favorites" => OutcomeFilter::Favorites,
            _ => OutcomeFilter::All,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Active filter criteria; `year: None` means every year
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchFilters {
    pub search: String,
    pub year: Option<i32>,
    pub success: OutcomeFilter,
}

impl LaunchFilters {
    /// Evaluates name, then year, then outcome; all must pass
    pub fn matches(&self, launch: &Launch, favorites: &[String]) -> bool {
        if !self.search.is_empty()
            && !launch
                .name
                .to_lowercase()
                .contains(&self.search.to_lowercase())
        {
            return false;
        }
        if let Some(year) = self.year {
            if launch.year_utc() != year {
                return false;
            }
        }
        match self.success {
            OutcomeFilter::All => true,
            OutcomeFilter::Success => launch.success == Some(true),
            OutcomeFilter::Failed => launch.success == Some(false),
            OutcomeFilter::Favorites => favorites.iter().any(|id| *id == launch.id),
        }
    }
}
