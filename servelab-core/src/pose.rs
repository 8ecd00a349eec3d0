// ============================================================================
// servelab-core/src/pose.rs
// ============================================================================
//
// POSE: Landmark topology, keypoint containers and the detector seam
//
// The pose detector itself is an external collaborator: it takes an RGB frame
// and returns 33 landmarks in the BlazePose topology (normalized x/y, relative
// depth z, plus a visibility score per landmark) or nothing when no person is
// found. This module fixes the topology, validates keypoint sets, exposes a
// plain per-landmark view for drawing, and runs a detector over extracted
// frame files to produce per-frame metrics.

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};

use crate::error::{CoreError, CoreResult};
use crate::kinematics::{FrameMetrics, Handedness};

// ============================================================================
// TOPOLOGY
// ============================================================================

/// The 33 BlazePose landmarks, in detector output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoseLandmark {
    Nose,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    MouthLeft,
    MouthRight,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

/// Number of landmarks a detector reports.
pub const LANDMARK_COUNT: usize = 33;

impl PoseLandmark {
    /// Position of this landmark in a keypoint sequence.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

use PoseLandmark as L;

/// Skeleton edges used when drawing a pose.
pub const POSE_CONNECTIONS: [(PoseLandmark, PoseLandmark); 35] = [
    (L::Nose, L::LeftEyeInner),
    (L::LeftEyeInner, L::LeftEye),
    (L::LeftEye, L::LeftEyeOuter),
    (L::LeftEyeOuter, L::LeftEar),
    (L::Nose, L::RightEyeInner),
    (L::RightEyeInner, L::RightEye),
    (L::RightEye, L::RightEyeOuter),
    (L::RightEyeOuter, L::RightEar),
    (L::MouthLeft, L::MouthRight),
    (L::LeftShoulder, L::RightShoulder),
    (L::LeftShoulder, L::LeftElbow),
    (L::LeftElbow, L::LeftWrist),
    (L::LeftWrist, L::LeftPinky),
    (L::LeftWrist, L::LeftIndex),
    (L::LeftWrist, L::LeftThumb),
    (L::LeftPinky, L::LeftIndex),
    (L::RightShoulder, L::RightElbow),
    (L::RightElbow, L::RightWrist),
    (L::RightWrist, L::RightPinky),
    (L::RightWrist, L::RightIndex),
    (L::RightWrist, L::RightThumb),
    (L::RightPinky, L::RightIndex),
    (L::LeftShoulder, L::LeftHip),
    (L::RightShoulder, L::RightHip),
    (L::LeftHip, L::RightHip),
    (L::LeftHip, L::LeftKnee),
    (L::RightHip, L::RightKnee),
    (L::LeftKnee, L::LeftAnkle),
    (L::RightKnee, L::RightAnkle),
    (L::LeftAnkle, L::LeftHeel),
    (L::RightAnkle, L::RightHeel),
    (L::LeftHeel, L::LeftFootIndex),
    (L::RightHeel, L::RightFootIndex),
    (L::LeftAnkle, L::LeftFootIndex),
    (L::RightAnkle, L::RightFootIndex),
];

// ============================================================================
// KEYPOINTS
// ============================================================================

/// One landmark as seen by drawing and export code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandmarkView {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub visibility: f32,
}

/// Landmark coordinates with a parallel sequence of visibility scores.
#[derive(Debug, Clone, PartialEq)]
pub struct Keypoints {
    landmarks: Vec<[f32; 3]>,
    visibility: Vec<f32>,
}

impl Keypoints {
    /// Fails with `InvalidKeypoints` when the two sequences differ in length.
    pub fn new(landmarks: Vec<[f32; 3]>, visibility: Vec<f32>) -> CoreResult<Self> {
        if landmarks.len() != visibility.len() {
            return Err(CoreError::InvalidKeypoints(format!(
                "{} landmarks but {} visibility scores",
                landmarks.len(),
                visibility.len()
            )));
        }
        Ok(Self {
            landmarks,
            visibility,
        })
    }

    #[must_use]
    pub fn landmarks(&self) -> &[[f32; 3]] {
        &self.landmarks
    }

    #[must_use]
    pub fn visibility(&self) -> &[f32] {
        &self.visibility
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    #[must_use]
    pub fn point(&self, landmark: PoseLandmark) -> Option<[f32; 3]> {
        self.landmarks.get(landmark.index()).copied()
    }

    #[must_use]
    pub fn visibility_of(&self, landmark: PoseLandmark) -> Option<f32> {
        self.visibility.get(landmark.index()).copied()
    }

    #[must_use]
    pub fn views(&self) -> Vec<LandmarkView> {
        self.landmarks
            .iter()
            .zip(&self.visibility)
            .map(|(&[x, y, z], &visibility)| LandmarkView {
                x,
                y,
                z,
                visibility,
            })
            .collect()
    }
}

// ============================================================================
// DETECTOR SEAM
// ============================================================================

/// Pose landmark detector.
pub trait PoseDetector {
    /// Detects a single pose in `frame`. `Ok(None)` means no person was found.
    fn detect(&mut self, frame: &RgbImage) -> CoreResult<Option<Keypoints>>;
}

/// Loads an extracted frame file as RGB.
pub fn load_frame(path: &Path) -> CoreResult<RgbImage> {
    let img = image::open(path).map_err(|e| {
        CoreError::OperationFailed(format!("Failed to load frame {}: {e}", path.display()))
    })?;
    Ok(img.to_rgb8())
}

/// Runs `detector` over `frames` in order and derives metrics per frame.
///
/// Frames without a detection map to `None`.
pub fn analyze_frames<D: PoseDetector>(
    detector: &mut D,
    frames: &[PathBuf],
    handedness: Handedness,
    min_visibility: f32,
) -> CoreResult<Vec<(PathBuf, Option<FrameMetrics>)>> {
    let mut results = Vec::with_capacity(frames.len());
    for path in frames {
        let frame = load_frame(path)?;
        let metrics = detector
            .detect(&frame)?
            .map(|kp| FrameMetrics::from_keypoints(&kp, handedness, min_visibility));
        results.push((path.clone(), metrics));
    }

    let detected = results.iter().filter(|(_, m)| m.is_some()).count();
    log::debug!("Pose detected in {} of {} frames", detected, results.len());
    Ok(results)
}

// ============================================================================
// DRAWING
// ============================================================================

const CONNECTION_COLOR: Rgb<u8> = Rgb([224, 224, 224]);
const LANDMARK_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const LANDMARK_RADIUS: i64 = 2;

/// Draws the pose skeleton onto `frame`.
///
/// Landmarks below `min_visibility` or outside the normalized [0, 1] range
/// are left out, together with their connections.
pub fn draw_landmarks(frame: &mut RgbImage, views: &[LandmarkView], min_visibility: f32) {
    let (w, h) = frame.dimensions();
    let to_pixel = |v: &LandmarkView| -> Option<(i64, i64)> {
        let inside = (0.0..=1.0).contains(&v.x) && (0.0..=1.0).contains(&v.y);
        (inside && v.visibility >= min_visibility).then(|| {
            (
                (v.x * (w.saturating_sub(1)) as f32).round() as i64,
                (v.y * (h.saturating_sub(1)) as f32).round() as i64,
            )
        })
    };
    let pixels: Vec<Option<(i64, i64)>> = views.iter().map(to_pixel).collect();
    let at = |lm: PoseLandmark| pixels.get(lm.index()).copied().flatten();

    for (a, b) in POSE_CONNECTIONS {
        if let (Some(p), Some(q)) = (at(a), at(b)) {
            draw_line(frame, p, q, CONNECTION_COLOR);
        }
    }
    for &(cx, cy) in pixels.iter().flatten() {
        for dy in -LANDMARK_RADIUS..=LANDMARK_RADIUS {
            for dx in -LANDMARK_RADIUS..=LANDMARK_RADIUS {
                put_pixel(frame, cx + dx, cy + dy, LANDMARK_COLOR);
            }
        }
    }
}

fn draw_line(frame: &mut RgbImage, (x0, y0): (i64, i64), (x1, y1): (i64, i64), color: Rgb<u8>) {
    let steps = (x1 - x0).abs().max((y1 - y0).abs()).max(1);
    for step in 0..=steps {
        let t = step as f64 / steps as f64;
        let x = x0 as f64 + (x1 - x0) as f64 * t;
        let y = y0 as f64 + (y1 - y0) as f64 * t;
        put_pixel(frame, x.round() as i64, y.round() as i64, color);
    }
}

fn put_pixel(frame: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) {
        if x < frame.width() && y < frame.height() {
            frame.put_pixel(x, y, color);
        }
    }
}
