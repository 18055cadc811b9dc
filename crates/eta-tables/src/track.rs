//! Track geometry: elevation, slope and heading as functions of distance.

use crate::error::{TableError, TableResult};
use crate::lookup::LookupTable;

/// Distance-indexed track geometry.
///
/// The slope table holds `atan(dz/ds)` for each consecutive sample pair,
/// keyed by the segment start distance. Slope queries hold the end segments
/// outside the sampled distance; elevation and heading extrapolate.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackProfile {
    elevation: LookupTable,
    heading: LookupTable,
    slope: LookupTable,
}

impl TrackProfile {
    /// Build from distance, elevation and heading (rad) samples.
    pub fn new(distance: Vec<f64>, elevation: Vec<f64>, heading: Vec<f64>) -> TableResult<Self> {
        if distance.len() < 2 {
            return Err(TableError::InvalidTrack {
                what: "track needs at least two distance samples",
            });
        }
        let elevation = LookupTable::new("track elevation", distance.clone(), elevation)?;
        let heading = LookupTable::new("track heading", distance, heading)?;

        let (d, z) = (elevation.x(), elevation.y());
        let angles: Vec<f64> = d
            .windows(2)
            .zip(z.windows(2))
            .map(|(ds, dz)| ((dz[1] - dz[0]) / (ds[1] - ds[0])).atan())
            .collect();
        let starts = d[..d.len() - 1].to_vec();
        let slope = LookupTable::new("track slope", starts, angles)?;

        Ok(Self {
            elevation,
            heading,
            slope,
        })
    }

    /// Build from planar coordinates; heading is `atan2` of the coordinate
    /// gradients taken along the sample index.
    pub fn from_planar(
        distance: Vec<f64>,
        elevation: Vec<f64>,
        easting: &[f64],
        northing: &[f64],
    ) -> TableResult<Self> {
        if easting.len() != distance.len() || northing.len() != distance.len() {
            return Err(TableError::InvalidTrack {
                what: "planar coordinates must match the distance samples",
            });
        }
        let dx = gradient(easting);
        let dy = gradient(northing);
        let heading = dy.iter().zip(&dx).map(|(y, x)| y.atan2(*x)).collect();
        Self::new(distance, elevation, heading)
    }

    /// Track slope angle (rad) at distance `s`.
    #[inline]
    pub fn slope_angle(&self, s: f64) -> f64 {
        self.slope.eval_clamped(s)
    }

    /// Track heading (rad) at distance `s`.
    #[inline]
    pub fn heading(&self, s: f64) -> f64 {
        self.heading.eval(s)
    }

    #[inline]
    pub fn elevation(&self, s: f64) -> f64 {
        self.elevation.eval(s)
    }

    /// Last sampled distance (m).
    pub fn length(&self) -> f64 {
        self.elevation.domain().1
    }
}

/// Unit-spacing gradient: central differences inside, one-sided at the ends.
fn gradient(v: &[f64]) -> Vec<f64> {
    let n = v.len();
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => (0..n)
            .map(|i| {
                if i == 0 {
                    v[1] - v[0]
                } else if i == n - 1 {
                    v[n - 1] - v[n - 2]
                } else {
                    0.5 * (v[i + 1] - v[i - 1])
                }
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn slope_from_elevation() {
        let track = TrackProfile::new(
            vec![0.0, 100.0, 200.0],
            vec![0.0, 1.0, 1.0],
            vec![0.0, 0.0, 0.0],
        )
        .unwrap();
        assert!((track.slope_angle(0.0) - 0.01_f64.atan()).abs() < 1e-12);
        assert!(track.slope_angle(150.0).abs() < 1e-12);
    }

    #[test]
    fn slope_is_held_outside_domain() {
        let track = TrackProfile::new(
            vec![0.0, 100.0, 200.0],
            vec![0.0, 1.0, 3.0],
            vec![0.0, 0.0, 0.0],
        )
        .unwrap();
        assert_eq!(track.slope_angle(-50.0), track.slope_angle(0.0));
        assert!((track.slope_angle(500.0) - 0.02_f64.atan()).abs() < 1e-12);
    }

    #[test]
    fn heading_from_planar_coordinates() {
        // straight line heading north
        let track = TrackProfile::from_planar(
            vec![0.0, 10.0, 20.0],
            vec![0.0, 0.0, 0.0],
            &[0.0, 0.0, 0.0],
            &[0.0, 10.0, 20.0],
        )
        .unwrap();
        assert!((track.heading(5.0) - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn rejects_single_sample_track() {
        let err = TrackProfile::new(vec![0.0], vec![0.0], vec![0.0]).unwrap_err();
        assert!(matches!(err, TableError::InvalidTrack { .. }));
    }

    #[test]
    fn rejects_mismatched_planar_lengths() {
        let err =
            TrackProfile::from_planar(vec![0.0, 1.0], vec![0.0, 0.0], &[0.0], &[0.0, 1.0])
                .unwrap_err();
        assert!(matches!(err, TableError::InvalidTrack { .. }));
    }

    #[test]
    fn gradient_matches_central_differences() {
        assert_eq!(gradient(&[0.0, 1.0, 4.0, 9.0]), vec![1.0, 2.0, 4.0, 5.0]);
    }
}
