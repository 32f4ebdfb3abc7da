use serde::{Deserialize, Serialize};

use crate::{ValidationError, Vrm};

/// Validated input for a valuation lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuationRequest {
    pub vrm: Vrm,
    pub mileage: u32,
}

impl ValuationRequest {
    pub fn new(vrm: Vrm, mileage: u32) -> Result<Self, ValidationError> {
        if mileage == 0 {
            return Err(ValidationError::NonPositiveMileage);
        }
        Ok(Self { vrm, mileage })
    }
}

/// Estimated value range for a vehicle as reported by one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Valuation {
    pub vrm: String,
    pub lowest_value: f64,
    pub highest_value: f64,
    pub provider: Option<String>,
}

impl Valuation {
    pub fn new(
        vrm: impl Into<String>,
        lowest_value: f64,
        highest_value: f64,
        provider: Option<String>,
    ) -> Result<Self, ValidationError> {
        validate_amount("lowest_value", lowest_value)?;
        validate_amount("highest_value", highest_value)?;
        if highest_value < lowest_value {
            return Err(ValidationError::InvalidValuationRange);
        }

        Ok(Self {
            vrm: vrm.into(),
            lowest_value,
            highest_value,
            provider,
        })
    }

    pub fn midpoint_value(&self) -> f64 {
        (self.highest_value + self.lowest_value) / 2.0
    }
}

fn validate_amount(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
