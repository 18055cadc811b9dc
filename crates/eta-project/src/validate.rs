//! Scenario validation.

use crate::schema::Scenario;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing field: {field}")]
    Missing { field: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        return Ok(());
    }
    Err(ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: "must be positive and finite".to_string(),
    })
}

/// Structural checks on a scenario. Physical parameter ranges are checked
/// again by the simulator when the run request is built.
pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    if scenario.version == 0 || scenario.version > crate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }
    if scenario.name.trim().is_empty() {
        return Err(ValidationError::Missing {
            field: "name".to_string(),
        });
    }
    if scenario.tables.as_os_str().is_empty() {
        return Err(ValidationError::Missing {
            field: "tables".to_string(),
        });
    }
    positive("distance_m", scenario.distance_m)?;
    positive("time_limit_s", scenario.time_limit_s)?;

    if scenario.phases.is_empty() {
        return Err(ValidationError::Missing {
            field: "phases".to_string(),
        });
    }
    for (i, phase) in scenario.phases.iter().enumerate() {
        if !phase.min_mps.is_finite() || phase.min_mps < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: format!("phases[{i}].min_mps"),
                value: phase.min_mps.to_string(),
                reason: "must be non-negative".to_string(),
            });
        }
        if phase.max_mps.is_nan() || phase.max_mps <= phase.min_mps {
            return Err(ValidationError::InvalidValue {
                field: format!("phases[{i}].max_mps"),
                value: phase.max_mps.to_string(),
                reason: format!("must exceed min_mps ({})", phase.min_mps),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PhaseDef;

    fn scenario() -> Scenario {
        Scenario::new(
            "demo",
            500.0,
            90.0,
            vec![PhaseDef {
                min_mps: 5.0,
                max_mps: 8.0,
            }],
            "tables.yaml",
        )
    }

    #[test]
    fn accepts_reference_scenario() {
        validate_scenario(&scenario()).unwrap();
    }

    #[test]
    fn rejects_future_version() {
        let mut s = scenario();
        s.version = crate::LATEST_VERSION + 1;
        assert!(matches!(
            validate_scenario(&s),
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn rejects_inverted_phase() {
        let mut s = scenario();
        s.phases.push(PhaseDef {
            min_mps: 9.0,
            max_mps: 8.0,
        });
        let err = validate_scenario(&s).unwrap_err();
        assert!(err.to_string().contains("phases[1].max_mps"));
    }

    #[test]
    fn rejects_missing_pieces() {
        let mut s = scenario();
        s.phases.clear();
        assert!(matches!(
            validate_scenario(&s),
            Err(ValidationError::Missing { .. })
        ));

        let mut s = scenario();
        s.distance_m = f64::NAN;
        assert!(validate_scenario(&s).is_err());

        let mut s = scenario();
        s.tables = Default::default();
        assert!(validate_scenario(&s).is_err());
    }
}
