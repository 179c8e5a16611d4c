//! Parsing of per-frame hand reports.
//!
//! One report is one JSON value. Accepted shapes:
//!
//! * `null` or `[]` — no hand this frame
//! * `[{"x":..,"y":..,"z":..}, ...]` — landmark objects (`z` optional,
//!   extra fields such as `visibility` ignored)
//! * `[[x, y], [x, y, z], ...]` — coordinate arrays
//! * `{"multiHandLandmarks": [[...], ...]}` — a MediaPipe results object;
//!   only the first hand is used, an empty list means no hand
//!
//! Anything else, including objects without `multiHandLandmarks`, is a
//! [`PoseError`].

use serde::Deserialize;

use crate::{HandPose, Landmark, PoseError};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPoint {
    Object(Landmark),
    Coords(Vec<f32>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawReport {
    Points(Vec<RawPoint>),
    Results {
        #[serde(rename = "multiHandLandmarks")]
        multi_hand_landmarks: Vec<Vec<RawPoint>>,
    },
}

/// Parse one frame report. `Ok(None)` means the tracker saw no hand.
pub fn parse_frame(text: &str) -> Result<Option<HandPose>, PoseError> {
    let report: Option<RawReport> = serde_json::from_str(text)?;
    let points = match report {
        None                                         => return Ok(None),
        Some(RawReport::Points(points))              => points,
        Some(RawReport::Results { multi_hand_landmarks }) => {
            match multi_hand_landmarks.into_iter().next() {
                Some(first) => first,
                None        => return Ok(None),
            }
        }
    };
    if points.is_empty() {
        return Ok(None);
    }

    let landmarks = points
        .into_iter()
        .enumerate()
        .map(|(index, p)| to_landmark(index, p))
        .collect::<Result<Vec<_>, _>>()?;
    HandPose::from_slice(&landmarks).map(Some)
}

fn to_landmark(index: usize, point: RawPoint) -> Result<Landmark, PoseError> {
    match point {
        RawPoint::Object(l) => Ok(l),
        RawPoint::Coords(c) => match c.as_slice() {
            [x, y]    => Ok(Landmark::new(*x, *y)),
            [x, y, z] => Ok(Landmark { x: *x, y: *y, z: *z }),
            _         => Err(PoseError::MissingCoordinate { index, found: c.len() }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::Preset;

    fn object_array(pose: &HandPose) -> String {
        serde_json::to_string(pose).unwrap()
    }

    fn coord_array(pose: &HandPose) -> String {
        let rows: Vec<String> = pose.landmarks().iter()
            .map(|l| format!("[{},{}]", l.x, l.y))
            .collect();
        format!("[{}]", rows.join(","))
    }

    #[test]
    fn null_and_empty_mean_no_hand() {
        assert!(parse_frame("null").unwrap().is_none());
        assert!(parse_frame("[]").unwrap().is_none());
        assert!(parse_frame(r#"{"multiHandLandmarks": []}"#).unwrap().is_none());
    }

    #[test]
    fn unrelated_objects_are_errors() {
        for text in [
            "{}",
            r#"{"landmarks": [[0.1,0.2]]}"#,
            r#"{"multiHandLandmark": []}"#,
            r#"{"x":0.1,"y":0.2}"#,
        ] {
            assert!(matches!(parse_frame(text), Err(PoseError::Json(_))), "{}", text);
        }
    }

    #[test]
    fn object_points() {
        let pose = Preset::OpenPalm.pose();
        assert_eq!(parse_frame(&object_array(&pose)).unwrap(), Some(pose));
    }

    #[test]
    fn coordinate_pairs() {
        let pose = Preset::Fist.pose();
        let parsed = parse_frame(&coord_array(&pose)).unwrap().unwrap();
        for (a, b) in parsed.landmarks().iter().zip(pose.landmarks()) {
            assert!((a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6);
        }
    }

    #[test]
    fn mediapipe_results_uses_first_hand() {
        let first  = Preset::VSign.pose();
        let second = Preset::Fist.pose();
        let text = format!(
            r#"{{"multiHandLandmarks": [{}, {}]}}"#,
            object_array(&first),
            object_array(&second),
        );
        assert_eq!(parse_frame(&text).unwrap(), Some(first));
    }

    #[test]
    fn extra_fields_ignored() {
        let rows: Vec<String> = (0..21)
            .map(|_| r#"{"x":0.5,"y":0.5,"z":-0.01,"visibility":0.9}"#.to_string())
            .collect();
        let text = format!("[{}]", rows.join(","));
        assert!(parse_frame(&text).unwrap().is_some());
    }

    #[test]
    fn fifteen_points_is_an_error() {
        let rows: Vec<String> = (0..15).map(|_| "[0.5,0.5]".to_string()).collect();
        let text = format!("[{}]", rows.join(","));
        assert!(matches!(
            parse_frame(&text),
            Err(PoseError::WrongLandmarkCount { found: 15 })
        ));
    }

    #[test]
    fn single_coordinate_is_an_error() {
        let mut rows: Vec<String> = (0..21).map(|_| "[0.5,0.5]".to_string()).collect();
        rows[3] = "[0.5]".to_string();
        let text = format!("[{}]", rows.join(","));
        assert!(matches!(
            parse_frame(&text),
            Err(PoseError::MissingCoordinate { index: 3, found: 1 })
        ));
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(matches!(parse_frame("not json"), Err(PoseError::Json(_))));
    }
}
