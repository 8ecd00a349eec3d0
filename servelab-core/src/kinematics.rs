//! Joint angles and body metrics from pose landmarks.
//!
//! All functions are pure. Landmark coordinates are the detector's normalized
//! image coordinates, with y growing downwards.

use serde::Serialize;

use crate::pose::{Keypoints, PoseLandmark};

const EPSILON: f64 = 1e-9;

/// Angle in degrees at vertex `b` formed by `a` and `c`.
///
/// Works for 2-D or 3-D points. The result lies in [0, 180]; coincident
/// points yield a finite value instead of NaN.
#[must_use]
pub fn angle<const N: usize>(a: [f64; N], b: [f64; N], c: [f64; N]) -> f64 {
    let v1: [f64; N] = std::array::from_fn(|i| a[i] - b[i]);
    let v2: [f64; N] = std::array::from_fn(|i| c[i] - b[i]);
    vector_angle(v1, v2)
}

/// Angle in degrees between two vectors, in [0, 180].
#[must_use]
pub fn vector_angle<const N: usize>(v1: [f64; N], v2: [f64; N]) -> f64 {
    let dot: f64 = v1.iter().zip(&v2).map(|(x, y)| x * y).sum();
    let denom = norm(&v1) * norm(&v2) + EPSILON;
    (dot / denom).clamp(-1.0, 1.0).acos().to_degrees()
}

fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Distance in the image plane between the nose and the right ankle.
///
/// Returns `None` when `landmarks` does not reach the right ankle.
#[must_use]
pub fn body_height_proxy(landmarks: &[[f32; 3]]) -> Option<f64> {
    let nose = landmarks.get(PoseLandmark::Nose.index())?;
    let ankle = landmarks.get(PoseLandmark::RightAnkle.index())?;
    let dx = f64::from(ankle[0]) - f64::from(nose[0]);
    let dy = f64::from(ankle[1]) - f64::from(nose[1]);
    Some(dx.hypot(dy))
}

/// Which arm holds the racket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    #[default]
    Right,
    Left,
}

impl Handedness {
    fn arm(self) -> (PoseLandmark, PoseLandmark, PoseLandmark) {
        match self {
            Self::Right => (
                PoseLandmark::RightShoulder,
                PoseLandmark::RightElbow,
                PoseLandmark::RightWrist,
            ),
            Self::Left => (
                PoseLandmark::LeftShoulder,
                PoseLandmark::LeftElbow,
                PoseLandmark::LeftWrist,
            ),
        }
    }
}

/// Serve metrics for a single frame. A field is `None` when a landmark it
/// depends on is missing or below the visibility threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FrameMetrics {
    /// Hip-knee-ankle angle, degrees (180 = straight leg).
    pub left_knee_deg: Option<f64>,
    pub right_knee_deg: Option<f64>,
    /// Shoulder-elbow-wrist angle of the hitting arm, degrees.
    pub elbow_deg: Option<f64>,
    /// Angle between the shoulder line and the hip line, degrees.
    pub x_factor_deg: Option<f64>,
    /// Height of the hitting wrist above its shoulder, in body heights.
    pub wrist_height_rel: Option<f64>,
    pub body_height: Option<f64>,
}

impl FrameMetrics {
    #[must_use]
    pub fn from_keypoints(keypoints: &Keypoints, handedness: Handedness, min_visibility: f32) -> Self {
        let point = |lm: PoseLandmark| -> Option<[f64; 2]> {
            let visible = keypoints.visibility_of(lm)? >= min_visibility;
            let p = keypoints.point(lm)?;
            visible.then(|| [f64::from(p[0]), f64::from(p[1])])
        };
        let joint = |a, b, c| Some(angle(point(a)?, point(b)?, point(c)?));

        let left_knee_deg = joint(
            PoseLandmark::LeftHip,
            PoseLandmark::LeftKnee,
            PoseLandmark::LeftAnkle,
        );
        let right_knee_deg = joint(
            PoseLandmark::RightHip,
            PoseLandmark::RightKnee,
            PoseLandmark::RightAnkle,
        );

        let (shoulder, elbow, wrist) = handedness.arm();
        let elbow_deg = joint(shoulder, elbow, wrist);

        let x_factor_deg = (|| {
            let ls = point(PoseLandmark::LeftShoulder)?;
            let rs = point(PoseLandmark::RightShoulder)?;
            let lh = point(PoseLandmark::LeftHip)?;
            let rh = point(PoseLandmark::RightHip)?;
            Some(vector_angle([rs[0] - ls[0], rs[1] - ls[1]], [rh[0] - lh[0], rh[1] - lh[1]]))
        })();

        let body_height = point(PoseLandmark::Nose)
            .and(point(PoseLandmark::RightAnkle))
            .and_then(|_| body_height_proxy(keypoints.landmarks()));

        let wrist_height_rel = (|| {
            let height = body_height.filter(|h| *h > EPSILON)?;
            let s = point(shoulder)?;
            let w = point(wrist)?;
            Some((s[1] - w[1]) / height)
        })();

        Self {
            left_knee_deg,
            right_knee_deg,
            elbow_deg,
            x_factor_deg,
            wrist_height_rel,
            body_height,
        }
    }
}
