use serde::Serialize;
use uuid::Uuid;

use super::{metrics::BmiCategory, repo_types::{Gender, HealthRecord}};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthView {
    pub id: Uuid,
    pub gender: Gender,
    pub height: f64,
    pub weight: f64,
    pub bmi: f64,
    pub bmi_category: BmiCategory,
}

impl From<&HealthRecord> for HealthView {
    fn from(h: &HealthRecord) -> Self {
        Self {
            id: h.id,
            gender: h.gender,
            height: h.height(),
            weight: h.weight(),
            bmi: h.bmi(),
            bmi_category: h.bmi_category(),
        }
    }
}
