//! Bounded capture loop: read frames until enough views are accepted.

use crate::board::BoardSpec;
use crate::correspondences::{CorrespondenceError, Correspondences, View};
use nalgebra::Point2;

/// Anything that yields frames on demand, blocking until one is ready.
pub trait FrameSource {
    type Frame;
    type Error;

    fn grab(&mut self) -> Result<Self::Frame, Self::Error>;
}

/// Finds the board's inner corners in a frame.
///
/// `Ok(None)` means the pattern is not visible in this frame; the loop
/// moves on to the next one.
pub trait PatternDetector<F> {
    type Error;

    fn detect(&mut self, frame: &F) -> Result<Option<Vec<Point2<f32>>>, Self::Error>;
}

/// Level of the per-frame "not found" message. It stays visible under `-q`.
pub const NOT_FOUND_LEVEL: log::Level = log::Level::Warn;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("only {found} of {target} views accepted after {frames} frames")]
    InsufficientDetections {
        found: usize,
        target: usize,
        frames: usize,
    },
    #[error(transparent)]
    Correspondence(#[from] CorrespondenceError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CapturePlan {
    pub target: usize,
    pub max_frames: Option<usize>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CaptureStats {
    pub frames: usize,
    pub accepted: usize,
    pub rejected: usize,
}

/// Read frames from `source` until `plan.target` views are accepted.
///
/// Each accepted detection is paired with the board's object points and
/// handed to `on_accept` together with the frame and the running count.
/// Detections whose corner count differs from the board are rejected like
/// a missed frame.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "info", skip_all, fields(views = plan.target))
)]
pub fn collect_views<S, D, H, E>(
    source: &mut S,
    detector: &mut D,
    board: &BoardSpec,
    plan: CapturePlan,
    mut on_accept: H,
) -> Result<(Correspondences, CaptureStats), E>
where
    S: FrameSource,
    D: PatternDetector<S::Frame>,
    H: FnMut(&mut S::Frame, &[Point2<f32>], usize) -> Result<(), E>,
    E: From<S::Error> + From<D::Error> + From<SessionError>,
{
    let object_points = board.object_points();
    let expected = object_points.len();
    let mut views = Correspondences::with_capacity(plan.target);
    let mut stats = CaptureStats::default();

    while views.len() < plan.target {
        if let Some(max_frames) = plan.max_frames {
            if stats.frames >= max_frames {
                return Err(SessionError::InsufficientDetections {
                    found: views.len(),
                    target: plan.target,
                    frames: stats.frames,
                }
                .into());
            }
        }

        let mut frame = source.grab()?;
        stats.frames += 1;

        let corners = match detector.detect(&frame)? {
            Some(corners) if corners.len() == expected => corners,
            Some(corners) => {
                log::warn!(
                    "frame {}: got {} corners, board has {}",
                    stats.frames,
                    corners.len(),
                    expected
                );
                stats.rejected += 1;
                continue;
            }
            None => {
                log::log!(NOT_FOUND_LEVEL, "frame {}: not found", stats.frames);
                stats.rejected += 1;
                continue;
            }
        };

        views
            .push(View {
                object_points: object_points.clone(),
                image_points: corners,
            })
            .map_err(SessionError::from)?;
        stats.accepted += 1;
        log::info!(
            "frame {}: accepted view {}/{}",
            stats.frames,
            views.len(),
            plan.target
        );

        let latest = &views.views()[views.len() - 1];
        on_accept(&mut frame, &latest.image_points, views.len())?;
    }

    Ok((views, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Exhausted,
        Detector,
        Hook,
        Session(SessionError),
    }

    impl From<SessionError> for TestError {
        fn from(e: SessionError) -> Self {
            TestError::Session(e)
        }
    }

    /// Frame `n` carries the number of corners to report, 0 = not found.
    struct ScriptedSource(VecDeque<usize>);

    impl FrameSource for ScriptedSource {
        type Frame = usize;
        type Error = TestError;

        fn grab(&mut self) -> Result<usize, TestError> {
            self.0.pop_front().ok_or(TestError::Exhausted)
        }
    }

    struct CountingDetector {
        fail_on: Option<usize>,
    }

    impl PatternDetector<usize> for CountingDetector {
        type Error = TestError;

        fn detect(&mut self, frame: &usize) -> Result<Option<Vec<Point2<f32>>>, TestError> {
            if self.fail_on == Some(*frame) {
                return Err(TestError::Detector);
            }
            if *frame == 0 {
                return Ok(None);
            }
            Ok(Some(
                (0..*frame).map(|i| Point2::new(i as f32, 2.0)).collect(),
            ))
        }
    }

    fn board() -> BoardSpec {
        BoardSpec::new(3, 2, 1.0).expect("board")
    }

    fn plan(target: usize, max_frames: Option<usize>) -> CapturePlan {
        CapturePlan { target, max_frames }
    }

    #[test]
    fn stops_at_target_and_skips_missed_frames() {
        let mut source = ScriptedSource(VecDeque::from([0, 6, 0, 0, 6, 6, 6]));
        let mut detector = CountingDetector { fail_on: None };
        let mut seen = Vec::new();

        let (views, stats) = collect_views(
            &mut source,
            &mut detector,
            &board(),
            plan(3, None),
            |_frame, corners, count| -> Result<(), TestError> {
                seen.push((corners.len(), count));
                Ok(())
            },
        )
        .expect("collect");

        assert_eq!(views.len(), 3);
        assert_eq!(
            stats,
            CaptureStats {
                frames: 6,
                accepted: 3,
                rejected: 3
            }
        );
        assert_eq!(seen, vec![(6, 1), (6, 2), (6, 3)]);
        assert_eq!(source.0.len(), 1, "loop must not read past the target");

        let first = &views.views()[0];
        assert_eq!(first.object_points, board().object_points());
        assert_eq!(first.image_points[5], Point2::new(5.0, 2.0));
    }

    #[test]
    fn partial_detections_are_rejected() {
        let mut source = ScriptedSource(VecDeque::from([4, 6]));
        let mut detector = CountingDetector { fail_on: None };

        let (views, stats) = collect_views(
            &mut source,
            &mut detector,
            &board(),
            plan(1, None),
            |_, _, _| -> Result<(), TestError> { Ok(()) },
        )
        .expect("collect");

        assert_eq!(views.len(), 1);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.frames, 2);
    }

    #[test]
    fn frame_budget_reports_insufficient_detections() {
        let mut source = ScriptedSource(VecDeque::from([6, 0, 0, 6, 6]));
        let mut detector = CountingDetector { fail_on: None };

        let err = collect_views(
            &mut source,
            &mut detector,
            &board(),
            plan(3, Some(3)),
            |_, _, _| -> Result<(), TestError> { Ok(()) },
        )
        .expect_err("budget exhausted");

        assert_eq!(
            err,
            TestError::Session(SessionError::InsufficientDetections {
                found: 1,
                target: 3,
                frames: 3
            })
        );
    }

    #[test]
    fn source_detector_and_hook_errors_propagate() {
        let mut detector = CountingDetector { fail_on: None };
        let err = collect_views(
            &mut ScriptedSource(VecDeque::from([6])),
            &mut detector,
            &board(),
            plan(2, None),
            |_, _, _| -> Result<(), TestError> { Ok(()) },
        )
        .expect_err("source runs dry");
        assert_eq!(err, TestError::Exhausted);

        let mut detector = CountingDetector { fail_on: Some(7) };
        let err = collect_views(
            &mut ScriptedSource(VecDeque::from([0, 7])),
            &mut detector,
            &board(),
            plan(1, None),
            |_, _, _| -> Result<(), TestError> { Ok(()) },
        )
        .expect_err("detector fails");
        assert_eq!(err, TestError::Detector);

        let mut detector = CountingDetector { fail_on: None };
        let err = collect_views(
            &mut ScriptedSource(VecDeque::from([6])),
            &mut detector,
            &board(),
            plan(1, None),
            |_, _, _| Err(TestError::Hook),
        )
        .expect_err("hook fails");
        assert_eq!(err, TestError::Hook);
    }

    #[test]
    fn not_found_survives_quiet_logging() {
        assert!(NOT_FOUND_LEVEL <= log::LevelFilter::Warn);
    }
}
