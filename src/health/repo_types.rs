use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::metrics::{body_metrics, BmiCategory, MetricsError};
use crate::db::StoreError;

pub const DEFAULT_GENDER: Gender = Gender::Male;
pub const DEFAULT_HEIGHT_CM: f64 = 170.0;
pub const DEFAULT_WEIGHT_KG: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }
}

/// Per-principal health metrics. `bmi` and `bmi_category` are derived and
/// only change through [`HealthRecord::set_measurements`].
#[derive(Debug, Clone, PartialEq)]
pub struct HealthRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub gender: Gender,
    height: f64,
    weight: f64,
    bmi: f64,
    bmi_category: BmiCategory,
}

impl HealthRecord {
    pub fn new(
        owner_id: Uuid,
        gender: Gender,
        height: f64,
        weight: f64,
    ) -> Result<Self, MetricsError> {
        let m = body_metrics(height, weight)?;
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            gender,
            height,
            weight,
            bmi: m.bmi,
            bmi_category: m.category,
        })
    }

    /// Replaces height and weight and recomputes the derived metrics.
    /// The record is left untouched on error.
    pub fn set_measurements(&mut self, height: f64, weight: f64) -> Result<(), MetricsError> {
        let m = body_metrics(height, weight)?;
        self.height = height;
        self.weight = weight;
        self.bmi = m.bmi;
        self.bmi_category = m.category;
        Ok(())
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn bmi(&self) -> f64 {
        self.bmi
    }

    pub fn bmi_category(&self) -> BmiCategory {
        self.bmi_category
    }
}

/// Row shape of the `health_records` table.
#[derive(Debug, FromRow)]
pub struct HealthRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub gender: String,
    pub height: f64,
    pub weight: f64,
    pub bmi: f64,
    pub bmi_category: String,
}

impl TryFrom<HealthRow> for HealthRecord {
    type Error = StoreError;

    // Derived columns are recomputed rather than trusted.
    fn try_from(r: HealthRow) -> Result<Self, Self::Error> {
        let gender = Gender::parse(&r.gender)
            .ok_or_else(|| StoreError::Unavailable(format!("unknown gender: {}", r.gender)))?;
        let mut record = HealthRecord::new(r.owner_id, gender, r.height, r.weight)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        record.id = r.id;
        Ok(record)
    }
}

impl From<&HealthRecord> for HealthRow {
    fn from(h: &HealthRecord) -> Self {
        Self {
            id: h.id,
            owner_id: h.owner_id,
            gender: h.gender.as_str().to_string(),
            height: h.height,
            weight: h.weight,
            bmi: h.bmi,
            bmi_category: h.bmi_category.as_str().to_string(),
        }
    }
}
