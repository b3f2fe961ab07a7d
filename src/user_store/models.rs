use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: usize,
    pub handle: String,
    /// Seed type chosen at cold start, if any.
    pub personality_type: Option<String>,
    pub created: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    View,
    Like,
    Save,
    Share,
    Purchase,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::View => "view",
            ActionType::Like => "like",
            ActionType::Save => "save",
            ActionType::Share => "share",
            ActionType::Purchase => "purchase",
        }
    }

    /// Actions that count as an endorsement for collaborative filtering.
    pub fn is_endorsement(&self) -> bool {
        matches!(self, ActionType::Like | ActionType::Save)
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(ActionType::View),
            "like" => Ok(ActionType::Like),
            "save" => Ok(ActionType::Save),
            "share" => Ok(ActionType::Share),
            "purchase" => Ok(ActionType::Purchase),
            other => anyhow::bail!("Unknown action type: {}", other),
        }
    }
}

/// One logged user action. `id` and `timestamp` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub id: Option<usize>,
    pub user_id: usize,
    pub artwork_id: String,
    pub action: ActionType,
    pub dwell_secs: Option<f64>,
    pub rating: Option<u8>,
    pub timestamp: i64,
}

impl InteractionEvent {
    pub fn new(user_id: usize, artwork_id: impl Into<String>, action: ActionType) -> Self {
        Self {
            id: None,
            user_id,
            artwork_id: artwork_id.into(),
            action,
            dwell_secs: None,
            rating: None,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn with_dwell(mut self, dwell_secs: Option<f64>) -> Self {
        self.dwell_secs = dwell_secs;
        self
    }

    pub fn with_rating(mut self, rating: Option<u8>) -> Self {
        self.rating = rating;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AffinityDimension {
    Artist,
    Genre,
    Period,
}

impl AffinityDimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            AffinityDimension::Artist => "artist",
            AffinityDimension::Genre => "genre",
            AffinityDimension::Period => "period",
        }
    }
}

impl fmt::Display for AffinityDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AffinityDimension {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "artist" => Ok(AffinityDimension::Artist),
            "genre" => Ok(AffinityDimension::Genre),
            "period" => Ok(AffinityDimension::Period),
            other => anyhow::bail!("Unknown affinity dimension: {}", other),
        }
    }
}

/// Accumulated preference of one user for one dimension value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAffinity {
    pub user_id: usize,
    pub dimension: AffinityDimension,
    pub value: String,
    pub score: f64,
    pub is_inferred: bool,
    pub is_initial: bool,
    pub updated: i64,
}

/// A delta to add onto a `(user, dimension, value)` affinity row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffinityUpdate {
    pub dimension: AffinityDimension,
    pub value: String,
    pub score: f64,
    pub is_inferred: bool,
    pub is_initial: bool,
}

impl AffinityUpdate {
    pub fn direct(dimension: AffinityDimension, value: impl Into<String>, score: f64) -> Self {
        Self {
            dimension,
            value: value.into(),
            score,
            is_inferred: false,
            is_initial: false,
        }
    }

    pub fn inferred(dimension: AffinityDimension, value: impl Into<String>, score: f64) -> Self {
        Self {
            is_inferred: true,
            ..Self::direct(dimension, value, score)
        }
    }

    pub fn initial(dimension: AffinityDimension, value: impl Into<String>, score: f64) -> Self {
        Self {
            is_initial: true,
            ..Self::direct(dimension, value, score)
        }
    }
}

/// Another user's scores on the dimension values they share with the
/// requester. Each pair is `(requester score, other score)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedAffinities {
    pub user_id: usize,
    pub pairs: Vec<(f64, f64)>,
}

/// A like or save some user gave an artwork.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endorsement {
    pub artwork_id: String,
    pub user_id: usize,
}
