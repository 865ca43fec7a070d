use crate::config::{MatchConfig, ShortTrackletPolicy};
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::math;
use crate::tracklet::Tracklet;

/// Measurements behind an accepted `(head, tail)` pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evidence {
    pub feature_distance: f32,
    pub head_speed: Option<f32>,
    pub tail_speed: Option<f32>,
    pub joined_speed: Option<f32>,

    // |avg(head, tail) - joined|, None when the speed check was skipped
    pub speed_delta: Option<f32>,

    // frames between head.last() and tail.first()
    pub time_gap: u32,

    // in px, head.last() center to tail.first() center
    pub spatial_gap: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    ClassMismatch,
    NotAfter,
    FeatureTooFar(f32),
    SpeedUnknown,
    SpeedDiscontinuity(f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    Accepted(Evidence),
    Rejected(Rejection),
}

impl Verdict {
    #[inline]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted(_))
    }

    #[inline]
    pub fn evidence(&self) -> Option<&Evidence> {
        match self {
            Verdict::Accepted(ev) => Some(ev),
            Verdict::Rejected(_) => None,
        }
    }
}

pub trait Compatibility {
    /// Whether `tail` plausibly continues `head`
    fn verdict(&self, head: &Tracklet, tail: &Tracklet) -> Result<Verdict>;

    #[inline]
    fn is_prefix_of(&self, head: &Tracklet, tail: &Tracklet) -> Result<bool> {
        Ok(self.verdict(head, tail)?.is_accepted())
    }
}

/// Class, strict ordering, feature and speed continuity, checked in that order.
#[derive(Debug, Clone, Default)]
pub struct PrefixCompatibility {
    config: MatchConfig,
}

impl PrefixCompatibility {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }
}

fn known_speed(frames: &[Frame]) -> Result<Option<f32>> {
    if frames.len() < 2 {
        return Ok(None);
    }

    math::speed(frames)
}

impl Compatibility for PrefixCompatibility {
    fn verdict(&self, head: &Tracklet, tail: &Tracklet) -> Result<Verdict> {
        let (head_last, tail_first) = (head.last()?, tail.first()?);

        if head.class() != tail.class() {
            return Ok(Verdict::Rejected(Rejection::ClassMismatch));
        }

        if head_last.image_id() >= tail_first.image_id() {
            return Ok(Verdict::Rejected(Rejection::NotAfter));
        }

        let feature_distance = math::min_feature_distance(head.frames(), tail.frames())?
            .ok_or(Error::EmptyTracklet(head.id()))?;

        if !math::is_similar(feature_distance, self.config.feature_threshold) {
            return Ok(Verdict::Rejected(Rejection::FeatureTooFar(feature_distance)));
        }

        let head_speed = known_speed(head.frames())?;
        let tail_speed = known_speed(tail.frames())?;
        let joined_speed = match (head_speed, tail_speed) {
            (Some(_), Some(_)) => math::speed_of(head.frames().iter().chain(tail.frames()))?,
            _ => None,
        };

        let speed_delta = match (head_speed, tail_speed, joined_speed) {
            (Some(h), Some(t), Some(j)) => Some(((h + t) / 2.0 - j).abs()),
            _ => None,
        };

        match speed_delta {
            Some(delta) if !math::is_similar(delta, self.config.speed_tolerance) => {
                return Ok(Verdict::Rejected(Rejection::SpeedDiscontinuity(delta)));
            }
            None if self.config.short_tracklet_policy == ShortTrackletPolicy::Reject => {
                return Ok(Verdict::Rejected(Rejection::SpeedUnknown));
            }
            _ => {}
        }

        Ok(Verdict::Accepted(Evidence {
            feature_distance,
            head_speed,
            tail_speed,
            joined_speed,
            speed_delta,
            time_gap: tail_first.image_id() - head_last.image_id(),
            spatial_gap: math::point_distance(&head_last.center(), &tail_first.center()),
        }))
    }
}

/// [`PrefixCompatibility::is_prefix_of`] with an explicit config
pub fn is_prefix_of(head: &Tracklet, tail: &Tracklet, config: &MatchConfig) -> Result<bool> {
    PrefixCompatibility::new(config.clone()).is_prefix_of(head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;
    use crate::tracklet::{RoadUserType, TrackletId};
    use ndarray::Array1;

    fn tracklet(
        class: RoadUserType,
        instance: u32,
        frames: &[(u32, f32, f32, [f32; 2])],
    ) -> Tracklet {
        let frames = frames
            .iter()
            .map(|&(t, x, y, feat)| {
                Frame::new(t, BBox::xywh(x, y, 10.0, 30.0), Array1::from(feat.to_vec()))
            })
            .collect();

        Tracklet::new(TrackletId::new(class, instance), frames)
    }

    fn head() -> Tracklet {
        tracklet(
            RoadUserType::Person,
            1,
            &[(0, 0.0, 0.0, [0.0, 0.0]), (5, 1.0, 1.0, [0.0, 0.0])],
        )
    }

    fn tail(class: RoadUserType) -> Tracklet {
        tracklet(
            class,
            2,
            &[(6, 2.0, 2.0, [0.1, 0.1]), (10, 3.0, 3.0, [0.0, 0.0])],
        )
    }

    fn relaxed() -> MatchConfig {
        MatchConfig {
            speed_tolerance: 0.2,
            ..Default::default()
        }
    }

    #[test]
    fn test_smooth_continuation_accepted() {
        let verdict = PrefixCompatibility::new(relaxed())
            .verdict(&head(), &tail(RoadUserType::Person))
            .unwrap();

        let ev = verdict.evidence().expect("pair should be accepted");
        assert!(ev.feature_distance.abs() < 1e-6);
        assert!((ev.head_speed.unwrap() - 2.0f32.sqrt() / 5.0).abs() < 1e-5);
        assert!((ev.tail_speed.unwrap() - 2.0f32.sqrt() / 4.0).abs() < 1e-5);
        assert!((ev.joined_speed.unwrap() - 3.0 * 2.0f32.sqrt() / 10.0).abs() < 1e-5);
        assert!((ev.speed_delta.unwrap() - 0.1061).abs() < 1e-3);
        assert_eq!(ev.time_gap, 1);
        assert!((ev.spatial_gap - 2.0f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_default_tolerance_is_tight() {
        let verdict = PrefixCompatibility::default()
            .verdict(&head(), &tail(RoadUserType::Person))
            .unwrap();

        assert!(matches!(
            verdict,
            Verdict::Rejected(Rejection::SpeedDiscontinuity(d)) if (d - 0.1061).abs() < 1e-3
        ));
    }

    #[test]
    fn test_class_mismatch() {
        let compat = PrefixCompatibility::new(relaxed());
        let verdict = compat.verdict(&head(), &tail(RoadUserType::Bike)).unwrap();

        assert_eq!(verdict, Verdict::Rejected(Rejection::ClassMismatch));
    }

    #[test]
    fn test_class_mismatch_before_feature_dimensions() {
        let bike = Tracklet::new(
            TrackletId::new(RoadUserType::Bike, 9),
            vec![
                Frame::new(6, BBox::xywh(2.0, 2.0, 1.0, 1.0), Array1::zeros(5)),
                Frame::new(10, BBox::xywh(3.0, 3.0, 1.0, 1.0), Array1::zeros(5)),
            ],
        );

        assert!(!is_prefix_of(&head(), &bike, &relaxed()).unwrap());
    }

    #[test]
    fn test_overlapping_time_rejected() {
        let overlapping = tracklet(
            RoadUserType::Person,
            3,
            &[(5, 2.0, 2.0, [0.0, 0.0]), (10, 3.0, 3.0, [0.0, 0.0])],
        );

        let compat = PrefixCompatibility::new(relaxed());
        assert_eq!(
            compat.verdict(&head(), &overlapping).unwrap(),
            Verdict::Rejected(Rejection::NotAfter)
        );
        assert!(!compat.is_prefix_of(&overlapping, &head()).unwrap());
    }

    #[test]
    fn test_feature_too_far() {
        let far = tracklet(
            RoadUserType::Person,
            4,
            &[(6, 2.0, 2.0, [40.0, 0.0]), (10, 3.0, 3.0, [0.0, 35.0])],
        );

        let verdict = PrefixCompatibility::new(relaxed())
            .verdict(&head(), &far)
            .unwrap();

        assert!(matches!(
            verdict,
            Verdict::Rejected(Rejection::FeatureTooFar(d)) if (d - 35.0).abs() < 1e-4
        ));
    }

    #[test]
    fn test_single_frame_rejected_by_default() {
        let single = tracklet(RoadUserType::Person, 5, &[(6, 2.0, 2.0, [0.0, 0.0])]);

        let verdict = PrefixCompatibility::new(relaxed())
            .verdict(&head(), &single)
            .unwrap();

        assert_eq!(verdict, Verdict::Rejected(Rejection::SpeedUnknown));

        let early = tracklet(RoadUserType::Person, 8, &[(3, 0.0, 0.0, [0.0, 0.0])]);
        assert!(!is_prefix_of(&early, &tail(RoadUserType::Person), &relaxed()).unwrap());
    }

    #[test]
    fn test_zero_duration_head() {
        let frozen = tracklet(
            RoadUserType::Person,
            1,
            &[(3, 0.0, 0.0, [0.0, 0.0]), (3, 1.0, 0.0, [0.0, 0.0])],
        );
        let later = tracklet(
            RoadUserType::Person,
            2,
            &[(5, 2.0, 0.0, [0.0, 0.0]), (7, 4.0, 0.0, [0.0, 0.0])],
        );

        let verdict = PrefixCompatibility::default()
            .verdict(&frozen, &later)
            .unwrap();
        assert_eq!(verdict, Verdict::Rejected(Rejection::SpeedUnknown));

        let config = MatchConfig {
            short_tracklet_policy: ShortTrackletPolicy::SkipSpeedCheck,
            ..Default::default()
        };
        assert!(is_prefix_of(&frozen, &later, &config).unwrap());
    }

    #[test]
    fn test_single_frame_with_skip_policy() {
        let single = tracklet(RoadUserType::Person, 5, &[(6, 2.0, 2.0, [0.0, 0.0])]);
        let config = MatchConfig {
            short_tracklet_policy: ShortTrackletPolicy::SkipSpeedCheck,
            ..relaxed()
        };

        let verdict = PrefixCompatibility::new(config)
            .verdict(&head(), &single)
            .unwrap();

        let ev = verdict.evidence().expect("speed check skipped");
        assert_eq!(ev.tail_speed, None);
        assert_eq!(ev.speed_delta, None);
    }

    #[test]
    fn test_empty_tracklet_is_error() {
        let empty = Tracklet::new(TrackletId::new(RoadUserType::Person, 6), vec![]);
        let compat = PrefixCompatibility::default();

        assert!(matches!(
            compat.verdict(&head(), &empty),
            Err(Error::EmptyTracklet(id)) if id == empty.id()
        ));
        assert!(compat.verdict(&empty, &head()).is_err());
    }

    #[test]
    fn test_dimension_mismatch_propagates() {
        let odd = Tracklet::new(
            TrackletId::new(RoadUserType::Person, 7),
            vec![
                Frame::new(6, BBox::xywh(2.0, 2.0, 1.0, 1.0), Array1::zeros(3)),
                Frame::new(10, BBox::xywh(3.0, 3.0, 1.0, 1.0), Array1::zeros(3)),
            ],
        );

        assert!(matches!(
            PrefixCompatibility::default().verdict(&head(), &odd),
            Err(Error::DimensionMismatch(2, 3))
        ));
    }
}
