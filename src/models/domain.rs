use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A neighborhood in the catalog
///
/// Metrics are on a 0-100 scale. Higher is better for safety, cleanliness
/// and greenery; lower is better for pollution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborhoodRecord {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub safety: u8,
    pub pollution: u8,
    pub cleanliness: u8,
    pub greenery: u8,
    /// Average monthly rent in the local currency
    pub budget: f64,
    #[serde(default)]
    pub data_sources: Vec<String>,
    pub last_updated: DateTime<Utc>,
}

/// Neighborhood with its composite match score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedNeighborhood {
    #[serde(flatten)]
    pub neighborhood: NeighborhoodRecord,
    pub score: u8,
}

/// Relative importance of each metric for one match request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightVector {
    pub safety: f64,
    pub pollution: f64,
    pub cleanliness: f64,
    pub greenery: f64,
}

impl WeightVector {
    /// Same weight on every metric
    pub const fn uniform(weight: f64) -> Self {
        Self {
            safety: weight,
            pollution: weight,
            cleanliness: weight,
            greenery: weight,
        }
    }

    pub fn total(&self) -> f64 {
        self.safety + self.pollution + self.cleanliness + self.greenery
    }

    fn as_array(&self) -> [(&'static str, f64); 4] {
        [
            ("safety", self.safety),
            ("pollution", self.pollution),
            ("cleanliness", self.cleanliness),
            ("greenery", self.greenery),
        ]
    }

    /// Check that the weights can produce a well-defined weighted average
    ///
    /// Every weight must be finite and non-negative. A single zero weight
    /// is fine (the metric is ignored), but an all-zero vector is rejected,
    /// and so is a vector whose sum overflows.
    pub fn validate(&self) -> Result<(), String> {
        for (metric, weight) in self.as_array() {
            if !weight.is_finite() {
                return Err(format!("weight for {} must be a finite number", metric));
            }
            if weight < 0.0 {
                return Err(format!("weight for {} must not be negative", metric));
            }
        }

        let total = self.total();
        if !total.is_finite() {
            return Err("weights are too large to combine".to_string());
        }
        if total <= 0.0 {
            return Err("weights must not all be zero".to_string());
        }

        Ok(())
    }
}

impl Default for WeightVector {
    fn default() -> Self {
        Self::uniform(25.0)
    }
}

/// Hard filters applied before scoring
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchConstraints {
    pub city: Option<String>,
    pub max_budget: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_are_uniform() {
        let weights = WeightVector::default();
        assert_eq!(weights, WeightVector::uniform(25.0));
        assert_eq!(weights.total(), 100.0);
    }

    #[test]
    fn test_single_zero_axis_is_valid() {
        let weights = WeightVector {
            safety: 0.0,
            ..WeightVector::default()
        };
        assert!(weights.validate().is_ok());
    }

    #[test]
    fn test_all_zero_weights_rejected() {
        let err = WeightVector::uniform(0.0).validate().unwrap_err();
        assert_eq!(err, "weights must not all be zero");
    }

    #[test]
    fn test_negative_weight_rejected() {
        let weights = WeightVector {
            pollution: -1.0,
            ..WeightVector::default()
        };
        let err = weights.validate().unwrap_err();
        assert!(err.contains("pollution"));
    }

    #[test]
    fn test_non_finite_weight_rejected() {
        let weights = WeightVector {
            greenery: f64::INFINITY,
            ..WeightVector::default()
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_overflowing_total_rejected() {
        let weights = WeightVector::uniform(1e308);
        assert!(weights.total().is_infinite());
        assert_eq!(weights.validate().unwrap_err(), "weights are too large to combine");

        // Large but summable weights are still fine
        assert!(WeightVector::uniform(1e300).validate().is_ok());
    }

    #[test]
    fn test_ranked_neighborhood_flattens_record() {
        let ranked = RankedNeighborhood {
            neighborhood: NeighborhoodRecord {
                id: Uuid::nil(),
                name: "Koregaon Park".to_string(),
                city: "Pune".to_string(),
                safety: 80,
                pollution: 40,
                cleanliness: 70,
                greenery: 60,
                budget: 18000.0,
                data_sources: vec!["NCRB".to_string()],
                last_updated: Utc::now(),
            },
            score: 68,
        };

        let json = serde_json::to_value(&ranked).unwrap();
        assert_eq!(json["name"], "Koregaon Park");
        assert_eq!(json["dataSources"][0], "NCRB");
        assert_eq!(json["score"], 68);
        assert!(json.get("neighborhood").is_none());
    }
}
