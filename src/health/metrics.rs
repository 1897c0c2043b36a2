use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AppError;

/// BMI classification. Thresholds are closed-open: 18.5 is `Normal`, 25.0 is
/// `Overweight`, 30.0 is `Obese`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn for_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "underweight",
            BmiCategory::Normal => "normal",
            BmiCategory::Overweight => "overweight",
            BmiCategory::Obese => "obese",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "underweight" => Some(BmiCategory::Underweight),
            "normal" => Some(BmiCategory::Normal),
            "overweight" => Some(BmiCategory::Overweight),
            "obese" => Some(BmiCategory::Obese),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum MetricsError {
    #[error("height must be a positive number of centimetres, got {0}")]
    InvalidHeight(f64),
    #[error("weight must be a positive number of kilograms, got {0}")]
    InvalidWeight(f64),
}

impl From<MetricsError> for AppError {
    fn from(err: MetricsError) -> Self {
        AppError::Validation(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyMetrics {
    pub bmi: f64,
    pub category: BmiCategory,
}

/// BMI from height in centimetres and weight in kilograms, rounded to one
/// decimal.
///
/// The category thresholds apply to the reported (rounded) value, not the raw
/// quotient: a raw 18.46 is reported as 18.5 and classed `Normal`.
pub fn body_metrics(height_cm: f64, weight_kg: f64) -> Result<BodyMetrics, MetricsError> {
    if !height_cm.is_finite() || height_cm <= 0.0 {
        return Err(MetricsError::InvalidHeight(height_cm));
    }
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err(MetricsError::InvalidWeight(weight_kg));
    }
    let metres = height_cm / 100.0;
    let bmi = (weight_kg / (metres * metres) * 10.0).round() / 10.0;
    Ok(BodyMetrics {
        bmi,
        category: BmiCategory::for_bmi(bmi),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tall_heavy_owner_is_overweight() {
        let m = body_metrics(180.0, 81.0).unwrap();
        assert!((m.bmi - 25.0).abs() < 1e-9);
        assert_eq!(m.category, BmiCategory::Overweight);
    }

    #[test]
    fn defaults_are_normal() {
        let m = body_metrics(170.0, 70.0).unwrap();
        assert!((m.bmi - 24.2).abs() < 1e-9);
        assert_eq!(m.category, BmiCategory::Normal);
    }

    #[test]
    fn thresholds_are_closed_open() {
        assert_eq!(BmiCategory::for_bmi(18.4), BmiCategory::Underweight);
        assert_eq!(BmiCategory::for_bmi(18.5), BmiCategory::Normal);
        assert_eq!(BmiCategory::for_bmi(24.9), BmiCategory::Normal);
        assert_eq!(BmiCategory::for_bmi(25.0), BmiCategory::Overweight);
        assert_eq!(BmiCategory::for_bmi(29.9), BmiCategory::Overweight);
        assert_eq!(BmiCategory::for_bmi(30.0), BmiCategory::Obese);
    }

    #[test]
    fn category_follows_reported_value() {
        // raw 18.46 and 24.96
        let m = body_metrics(100.0, 18.46).unwrap();
        assert_eq!(m.bmi, 18.5);
        assert_eq!(m.category, BmiCategory::Normal);
        let m = body_metrics(100.0, 24.96).unwrap();
        assert_eq!(m.bmi, 25.0);
        assert_eq!(m.category, BmiCategory::Overweight);
        let m = body_metrics(100.0, 18.44).unwrap();
        assert_eq!(m.bmi, 18.4);
        assert_eq!(m.category, BmiCategory::Underweight);
    }

    #[test]
    fn bmi_never_decreases_as_weight_grows() {
        let mut last = 0.0;
        for w in 30..200 {
            let m = body_metrics(172.0, w as f64 + 0.5).unwrap();
            assert!(m.bmi >= last, "bmi dropped at weight {w}");
            last = m.bmi;
        }
    }

    #[test]
    fn rejects_non_positive_inputs() {
        assert_eq!(body_metrics(0.0, 70.0), Err(MetricsError::InvalidHeight(0.0)));
        assert_eq!(body_metrics(-170.0, 70.0), Err(MetricsError::InvalidHeight(-170.0)));
        assert_eq!(body_metrics(170.0, 0.0), Err(MetricsError::InvalidWeight(0.0)));
        assert!(body_metrics(f64::NAN, 70.0).is_err());
    }

    #[test]
    fn category_names_round_trip() {
        for c in [
            BmiCategory::Underweight,
            BmiCategory::Normal,
            BmiCategory::Overweight,
            BmiCategory::Obese,
        ] {
            assert_eq!(BmiCategory::parse(c.as_str()), Some(c));
        }
    }
}
