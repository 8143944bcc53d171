//! Uniform subdivision of straight moves

use wavekit_core::Point2D;

/// Number of sub-segments used for a move of `distance` at `step` resolution
///
/// Always at least one; a trailing partial step is folded into the last
/// sub-segment.
pub fn segment_count(distance: f64, step: f64) -> usize {
    if step.is_nan() || step <= 0.0 || !distance.is_finite() {
        return 1;
    }
    ((distance / step).floor() as usize).max(1)
}

/// Subdivide the straight line `p1 → p2` into evenly spaced points
///
/// The result holds `segment_count + 1` points, starting exactly at `p1` and
/// ending exactly at `p2`. Identical endpoints still yield `[p1, p2]`.
pub fn segment(p1: Point2D, p2: Point2D, step: f64) -> Vec<Point2D> {
    let count = segment_count(p1.distance_to(&p2), step);

    let mut points: Vec<Point2D> = (0..count)
        .map(|i| p1.lerp(&p2, i as f64 / count as f64))
        .collect();
    points.push(p2);
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ten_mm_at_one_mm() {
        let points = segment(Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0), 1.0);
        assert_eq!(points.len(), 11);
        for (i, p) in points.iter().enumerate() {
            assert!((p.x - i as f64).abs() < 1e-12);
            assert_eq!(p.y, 0.0);
        }
    }

    #[test]
    fn test_partial_step_folded() {
        // 2.5mm at 1mm resolution: two sub-segments of 1.25mm
        let points = segment(Point2D::new(0.0, 0.0), Point2D::new(2.5, 0.0), 1.0);
        assert_eq!(points.len(), 3);
        assert!((points[1].x - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_short_move_single_segment() {
        let points = segment(Point2D::new(0.0, 0.0), Point2D::new(0.1, 0.1), 1.0);
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_degenerate() {
        let p = Point2D::new(4.0, 4.0);
        assert_eq!(segment(p, p, 0.2), vec![p, p]);
    }

    #[test]
    fn test_invalid_step_is_single_segment() {
        assert_eq!(segment_count(10.0, 0.0), 1);
        assert_eq!(segment_count(10.0, -1.0), 1);
        assert_eq!(segment_count(f64::NAN, 1.0), 1);
    }

    proptest! {
        #[test]
        fn prop_endpoints_preserved(
            x1 in -200.0f64..200.0, y1 in -200.0f64..200.0,
            x2 in -200.0f64..200.0, y2 in -200.0f64..200.0,
            step in 0.05f64..5.0,
        ) {
            let p1 = Point2D::new(x1, y1);
            let p2 = Point2D::new(x2, y2);
            let points = segment(p1, p2, step);
            prop_assert!(points.len() >= 2);
            prop_assert_eq!(points[0], p1);
            prop_assert_eq!(*points.last().unwrap(), p2);
        }

        #[test]
        fn prop_uniform_spacing(
            x2 in 1.0f64..100.0, y2 in 1.0f64..100.0, step in 0.1f64..2.0,
        ) {
            let p1 = Point2D::new(0.0, 0.0);
            let p2 = Point2D::new(x2, y2);
            let points = segment(p1, p2, step);
            let expected = p1.distance_to(&p2) / (points.len() - 1) as f64;
            for pair in points.windows(2) {
                prop_assert!((pair[0].distance_to(&pair[1]) - expected).abs() < 1e-9);
            }
        }
    }
}
