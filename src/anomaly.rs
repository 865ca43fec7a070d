use log::{debug, warn};

use crate::config::MatchConfig;
use crate::error::{Error, Result};
use crate::math;
use crate::tracklet::{Tracklet, TrackletId};

/// Distance between two same-class tracklets, lower is more alike
pub trait TrackletComparator {
    fn compare(&self, query: &Tracklet, reference: &Tracklet) -> Result<f32>;
}

impl<F> TrackletComparator for F
where
    F: Fn(&Tracklet, &Tracklet) -> Result<f32>,
{
    #[inline]
    fn compare(&self, query: &Tracklet, reference: &Tracklet) -> Result<f32> {
        self(query, reference)
    }
}

/// Smallest feature distance over all frame pairs
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureComparator;

impl TrackletComparator for FeatureComparator {
    fn compare(&self, query: &Tracklet, reference: &Tracklet) -> Result<f32> {
        math::min_feature_distance(query.frames(), reference.frames())?
            .ok_or_else(|| {
                let id = if query.is_empty() {
                    query.id()
                } else {
                    reference.id()
                };

                Error::EmptyTracklet(id)
            })
    }
}

/// Fixed distance regardless of input
#[derive(Debug, Clone, Copy)]
pub struct ConstantComparator(pub f32);

impl TrackletComparator for ConstantComparator {
    #[inline]
    fn compare(&self, _query: &Tracklet, _reference: &Tracklet) -> Result<f32> {
        Ok(self.0)
    }
}

pub struct AnomalyChecker<C = FeatureComparator> {
    comparator: C,
    threshold: f32,
}

impl AnomalyChecker<FeatureComparator> {
    pub fn new(config: &MatchConfig) -> Self {
        Self::with_comparator(FeatureComparator, config.tracklet_threshold)
    }
}

impl<C: TrackletComparator> AnomalyChecker<C> {
    pub fn with_comparator(comparator: C, threshold: f32) -> Self {
        Self {
            comparator,
            threshold,
        }
    }

    /// `true` when no reference of the query's class is closer than the threshold.
    ///
    /// A class with no references at all is anomalous. An empty query is an error,
    /// a reference that cannot be compared is logged and left out.
    pub fn check_anomaly<'a, I>(&self, query: &Tracklet, references: I) -> Result<bool>
    where
        I: IntoIterator<Item = &'a Tracklet>,
    {
        query.first()?;

        let mut similar = 0;

        for reference in references {
            if reference.class() != query.class() || reference.id() == query.id() {
                continue;
            }

            match self.comparator.compare(query, reference) {
                Ok(distance) if math::is_similar(distance, self.threshold) => similar += 1,
                Ok(_) => (),
                Err(err) => warn!("{} vs {}: skipped: {}", query.id(), reference.id(), err),
            }
        }

        debug!("{}: {} similar references", query.id(), similar);

        Ok(similar == 0)
    }

    /// [`check_anomaly`](Self::check_anomaly) for every query, in input order
    pub fn check_all<'a, 'b, Q, R>(
        &self,
        queries: Q,
        references: R,
    ) -> Vec<(TrackletId, Result<bool>)>
    where
        Q: IntoIterator<Item = &'a Tracklet>,
        R: IntoIterator<Item = &'b Tracklet> + Clone,
    {
        queries
            .into_iter()
            .map(|q| (q.id(), self.check_anomaly(q, references.clone())))
            .collect()
    }
}

pub fn check_anomaly<'a, I>(query: &Tracklet, references: I, config: &MatchConfig) -> Result<bool>
where
    I: IntoIterator<Item = &'a Tracklet>,
{
    AnomalyChecker::new(config).check_anomaly(query, references)
}
