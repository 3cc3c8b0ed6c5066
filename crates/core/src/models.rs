use serde::{Deserialize, Serialize};

/// A catalog place. Owned by the store; the engine only reads snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub average_duration_hours: Option<u32>,
}

impl Place {
    /// Category label with the documented default for absent or blank values.
    pub fn category_label(&self) -> &str {
        match self.category.as_deref() {
            Some(value) if !value.trim().is_empty() => value,
            _ => "General",
        }
    }

    /// Visit duration in hours, defaulting to 1 when the catalog has none.
    pub fn average_duration(&self) -> u32 {
        self.average_duration_hours.unwrap_or(1)
    }

    /// Raw stored coordinate. Not validated; distance math returns the
    /// unreachable sentinel for malformed values.
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// A latitude/longitude pair. Constructed through `validate_location` for
/// user input; places carry their own unchecked coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_on_earth(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude.abs() <= 90.0
            && self.longitude.abs() <= 180.0
    }
}

/// Optional numeric constraints extracted from the message. Absence of a
/// field means "no constraint", never zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    pub hours: Option<u32>,
    pub max_distance_km: Option<f64>,
}

impl FilterSet {
    pub fn is_empty(&self) -> bool {
        self.hours.is_none() && self.max_distance_km.is_none()
    }
}

/// The constraints a ranked place actually satisfied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchedFilters {
    pub category: Option<String>,
    pub hours: Option<u32>,
    pub max_distance_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPlace {
    pub place: Place,
    /// Great-circle distance from the query origin, rounded to 2 decimals.
    pub distance_km: f64,
    pub matched: MatchedFilters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Greeting,
    Thanks,
    Goodbye,
    Smalltalk,
    Help,
    Yes,
    No,
    LocationRequest,
    ValidationError,
    TimeBasedPlaces,
    DistanceBasedPlaces,
    MultiFilterPlaces,
    NearestPlaces,
    CategoryPlaces,
    MoodPlaces,
    OpenHoursStub,
    TravelModeStub,
    FaqAnswer,
    Fallback,
    InternalError,
}

impl OutcomeKind {
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::Thanks => "thanks",
            Self::Goodbye => "goodbye",
            Self::Smalltalk => "smalltalk",
            Self::Help => "help",
            Self::Yes => "yes",
            Self::No => "no",
            Self::LocationRequest => "location_request",
            Self::ValidationError => "validation_error",
            Self::TimeBasedPlaces => "time_based_places",
            Self::DistanceBasedPlaces => "distance_based_places",
            Self::MultiFilterPlaces => "multi_filter_places",
            Self::NearestPlaces => "nearest_places",
            Self::CategoryPlaces => "category_places",
            Self::MoodPlaces => "mood_places",
            Self::OpenHoursStub => "open_hours_stub",
            Self::TravelModeStub => "travel_mode_stub",
            Self::FaqAnswer => "faq_answer",
            Self::Fallback => "fallback",
            Self::InternalError => "internal_error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseStatus {
    Success,
    ClientError,
    ServerError,
}

impl ResponseStatus {
    pub fn http_code(self) -> u16 {
        match self {
            Self::Success => 200,
            Self::ClientError => 400,
            Self::ServerError => 500,
        }
    }
}

/// The resolved result of one message: a kind tag, the human-readable
/// reply, and the ranked places for listing branches. Constructed fresh per
/// request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    #[serde(rename = "type")]
    pub kind: OutcomeKind,
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub places: Option<Vec<RankedPlace>>,
    pub status: ResponseStatus,
}

impl Outcome {
    pub fn reply_only(kind: OutcomeKind, reply: impl Into<String>) -> Self {
        Self {
            kind,
            reply: reply.into(),
            places: None,
            status: ResponseStatus::Success,
        }
    }

    pub fn listing(kind: OutcomeKind, reply: impl Into<String>, places: Vec<RankedPlace>) -> Self {
        Self {
            kind,
            reply: reply.into(),
            places: Some(places),
            status: ResponseStatus::Success,
        }
    }

    pub fn client_error(kind: OutcomeKind, reply: impl Into<String>) -> Self {
        Self {
            kind,
            reply: reply.into(),
            places: None,
            status: ResponseStatus::ClientError,
        }
    }

    pub fn server_error(kind: OutcomeKind, reply: impl Into<String>) -> Self {
        Self {
            kind,
            reply: reply.into(),
            places: None,
            status: ResponseStatus::ServerError,
        }
    }
}

/// The request boundary record handed to the engine by the transport layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageInput {
    pub message: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub limit: Option<usize>,
}
