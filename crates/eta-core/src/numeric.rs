use crate::EtaError;

/// Floating point type used throughout the simulation.
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, EtaError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(EtaError::NonFinite { what, value: v })
    }
}

/// Require a strictly positive, finite value.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, EtaError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(EtaError::InvalidArg { what })
    }
}

/// Require a finite value `>= 0` (loads, per-event costs).
pub fn ensure_non_negative(v: Real, what: &'static str) -> Result<Real, EtaError> {
    let v = ensure_finite(v, what)?;
    if v >= 0.0 {
        Ok(v)
    } else {
        Err(EtaError::InvalidArg { what })
    }
}

/// Require a finite value in `[0, 1]` (efficiencies, fractions).
pub fn ensure_fraction(v: Real, what: &'static str) -> Result<Real, EtaError> {
    let v = ensure_finite(v, what)?;
    if (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err(EtaError::InvalidArg { what })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_positive_rejects_zero() {
        assert!(ensure_positive(0.0, "mass").is_err());
        assert_eq!(ensure_positive(224.0, "mass").unwrap(), 224.0);
    }

    #[test]
    fn ensure_non_negative_accepts_zero() {
        assert_eq!(ensure_non_negative(0.0, "load").unwrap(), 0.0);
        assert!(ensure_non_negative(-0.5, "load").is_err());
        assert!(ensure_non_negative(f64::INFINITY, "load").is_err());
    }

    #[test]
    fn ensure_fraction_bounds() {
        assert!(ensure_fraction(0.6, "eff").is_ok());
        assert!(ensure_fraction(1.2, "eff").is_err());
        assert!(ensure_fraction(-0.1, "eff").is_err());
    }
}
