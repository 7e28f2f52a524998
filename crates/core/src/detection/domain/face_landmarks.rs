//! 68-point face landmarks with checked lookups.
//!
//! Landmarks come from an external model, so a set may be truncated or hold
//! non-finite coordinates. Every lookup is fallible and callers decide how
//! to degrade.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::landmark_index::{FacialFeature, LandmarkGroup};
use crate::shared::geometry::Point;

#[derive(Debug, Error, PartialEq)]
pub enum LandmarkError {
    #[error("landmark {index} missing (detection has {available} points)")]
    Missing { index: usize, available: usize },
    #[error("landmark {index} is not a finite coordinate")]
    NonFinite { index: usize },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceLandmarks {
    points: Vec<Point>,
}

impl FaceLandmarks {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point(&self, index: usize) -> Result<Point, LandmarkError> {
        let p = self.points.get(index).ok_or(LandmarkError::Missing {
            index,
            available: self.points.len(),
        })?;
        if !p.is_finite() {
            return Err(LandmarkError::NonFinite { index });
        }
        Ok(*p)
    }

    pub fn feature(&self, feature: FacialFeature) -> Result<Point, LandmarkError> {
        self.point(feature.index())
    }

    /// Points of one anatomical group, in index order.
    pub fn group(&self, group: LandmarkGroup) -> Result<Vec<Point>, LandmarkError> {
        group.indices().map(|i| self.point(i)).collect()
    }

    /// Scales every point independently per axis.
    pub fn scaled(&self, sx: f64, sy: f64) -> FaceLandmarks {
        FaceLandmarks::new(self.points.iter().map(|p| p.scaled(sx, sy)).collect())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A plausible frontal face roughly 200 px wide, eyes 100 px apart at
    /// the outer corners (36 at x=150, 45 at x=250, both y=200).
    pub fn frontal_face() -> FaceLandmarks {
        let mut pts = vec![Point::default(); crate::shared::constants::LANDMARK_COUNT];
        // jaw: arc from (100,200) down to chin (200,320) and back up to (300,200)
        for (i, p) in pts.iter_mut().enumerate().take(17) {
            let t = i as f64 / 16.0;
            let x = 100.0 + 200.0 * t;
            let y = 200.0 + 120.0 * (1.0 - (2.0 * t - 1.0).powi(2));
            *p = Point::new(x, y);
        }
        for i in 0..5 {
            pts[17 + i] = Point::new(140.0 + 12.0 * i as f64, 175.0);
            pts[22 + i] = Point::new(212.0 + 12.0 * i as f64, 175.0);
        }
        for i in 0..4 {
            pts[27 + i] = Point::new(200.0, 190.0 + 15.0 * i as f64);
        }
        for i in 0..5 {
            pts[31 + i] = Point::new(185.0 + 7.5 * i as f64, 245.0);
        }
        // right eye: outer corner 36, lids 37/38 above, inner corner 39, lids 40/41 below
        let right_eye = [
            (150.0, 200.0),
            (160.0, 194.0),
            (170.0, 194.0),
            (180.0, 200.0),
            (170.0, 206.0),
            (160.0, 206.0),
        ];
        let left_eye = [
            (220.0, 200.0),
            (230.0, 194.0),
            (240.0, 194.0),
            (250.0, 200.0),
            (240.0, 206.0),
            (230.0, 206.0),
        ];
        for i in 0..6 {
            pts[36 + i] = Point::new(right_eye[i].0, right_eye[i].1);
            pts[42 + i] = Point::new(left_eye[i].0, left_eye[i].1);
        }
        for i in 0..12 {
            let angle = i as f64 / 12.0 * std::f64::consts::TAU;
            pts[48 + i] = Point::new(200.0 + 30.0 * angle.cos(), 275.0 + 12.0 * angle.sin());
        }
        for i in 0..8 {
            let angle = i as f64 / 8.0 * std::f64::consts::TAU;
            pts[60 + i] = Point::new(200.0 + 18.0 * angle.cos(), 275.0 + 5.0 * angle.sin());
        }
        FaceLandmarks::new(pts)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::frontal_face;
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_point_lookup() {
        let lm = frontal_face();
        assert_eq!(lm.point(36).unwrap(), Point::new(150.0, 200.0));
        assert_eq!(
            lm.feature(FacialFeature::LeftEyeOuterCorner).unwrap(),
            Point::new(250.0, 200.0)
        );
    }

    #[test]
    fn test_truncated_set_reports_missing() {
        let lm = FaceLandmarks::new(frontal_face().points()[..30].to_vec());
        assert_eq!(
            lm.point(36),
            Err(LandmarkError::Missing {
                index: 36,
                available: 30
            })
        );
        assert!(lm.point(29).is_ok());
    }

    #[test]
    fn test_non_finite_point_is_rejected() {
        let mut pts = frontal_face().points().to_vec();
        pts[45] = Point::new(f64::NAN, 10.0);
        let lm = FaceLandmarks::new(pts);
        assert_eq!(lm.point(45), Err(LandmarkError::NonFinite { index: 45 }));
    }

    #[test]
    fn test_group_returns_points_in_order() {
        let lm = frontal_face();
        let eye = lm.group(LandmarkGroup::RightEye).unwrap();
        assert_eq!(eye.len(), 6);
        assert_eq!(eye[0], lm.point(36).unwrap());
        assert_eq!(eye[5], lm.point(41).unwrap());
    }

    #[test]
    fn test_group_fails_when_any_point_missing() {
        let lm = FaceLandmarks::new(frontal_face().points()[..40].to_vec());
        assert!(lm.group(LandmarkGroup::RightEye).is_err());
        assert!(lm.group(LandmarkGroup::Jaw).is_ok());
    }

    #[test]
    fn test_scaled_applies_per_axis() {
        let lm = frontal_face().scaled(2.0, 0.5);
        let p = lm.point(36).unwrap();
        assert_relative_eq!(p.x, 300.0);
        assert_relative_eq!(p.y, 100.0);
    }

    #[test]
    fn test_serde_is_a_plain_point_list() {
        let lm = FaceLandmarks::new(vec![Point::new(1.0, 2.0)]);
        let json = serde_json::to_string(&lm).unwrap();
        assert_eq!(json, r#"[{"x":1.0,"y":2.0}]"#);
    }
}
