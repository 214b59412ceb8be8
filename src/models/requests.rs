use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::models::domain::{MatchConstraints, NeighborhoodRecord, WeightVector};

/// Request to rank neighborhoods
///
/// Every field is optional. Missing weights are filled from the configured
/// defaults by [`MatchRequest::weights`]; `maxBudget` is kept as raw JSON and
/// only honored when it is a number.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    #[serde(default)]
    pub safety: Option<f64>,
    #[serde(default)]
    pub pollution: Option<f64>,
    #[serde(default)]
    pub cleanliness: Option<f64>,
    #[serde(default)]
    pub greenery: Option<f64>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default, alias = "max_budget")]
    pub max_budget: Option<Value>,
}

impl MatchRequest {
    /// Fill omitted weights from `defaults`
    pub fn weights(&self, defaults: &WeightVector) -> WeightVector {
        WeightVector {
            safety: self.safety.unwrap_or(defaults.safety),
            pollution: self.pollution.unwrap_or(defaults.pollution),
            cleanliness: self.cleanliness.unwrap_or(defaults.cleanliness),
            greenery: self.greenery.unwrap_or(defaults.greenery),
        }
    }

    /// Hard filters for this request
    ///
    /// An empty city means "any city". A non-numeric `maxBudget` is ignored.
    pub fn constraints(&self) -> MatchConstraints {
        let city = self
            .city
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        let max_budget = self.max_budget.as_ref().and_then(Value::as_f64);

        MatchConstraints { city, max_budget }
    }
}

/// Query string for listing neighborhoods
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListNeighborhoodsQuery {
    pub city: Option<String>,
}

/// Request to create a neighborhood
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewNeighborhood {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "city must not be empty"))]
    pub city: String,
    #[validate(range(max = 100))]
    pub safety: u8,
    #[validate(range(max = 100))]
    pub pollution: u8,
    #[validate(range(max = 100))]
    pub cleanliness: u8,
    #[validate(range(max = 100))]
    pub greenery: u8,
    #[validate(range(min = 0.0))]
    pub budget: f64,
    #[serde(default)]
    pub data_sources: Vec<String>,
}

/// Partial update of a neighborhood; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NeighborhoodPatch {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "city must not be empty"))]
    pub city: Option<String>,
    #[validate(range(max = 100))]
    pub safety: Option<u8>,
    #[validate(range(max = 100))]
    pub pollution: Option<u8>,
    #[validate(range(max = 100))]
    pub cleanliness: Option<u8>,
    #[validate(range(max = 100))]
    pub greenery: Option<u8>,
    #[validate(range(min = 0.0))]
    pub budget: Option<f64>,
    pub data_sources: Option<Vec<String>>,
}

impl NeighborhoodPatch {
    /// Apply the present fields to `record`
    ///
    /// Does not touch `last_updated`; the store stamps it.
    pub fn apply(self, record: &mut NeighborhoodRecord) {
        if let Some(name) = self.name {
            record.name = name;
        }
        if let Some(city) = self.city {
            record.city = city;
        }
        if let Some(safety) = self.safety {
            record.safety = safety;
        }
        if let Some(pollution) = self.pollution {
            record.pollution = pollution;
        }
        if let Some(cleanliness) = self.cleanliness {
            record.cleanliness = cleanliness;
        }
        if let Some(greenery) = self.greenery {
            record.greenery = greenery;
        }
        if let Some(budget) = self.budget {
            record.budget = budget;
        }
        if let Some(data_sources) = self.data_sources {
            record.data_sources = data_sources;
        }
    }
}
