use log::{debug, info, trace, warn};
use rayon::prelude::*;
use std::collections::BTreeMap;

use crate::compat::{Compatibility, Evidence, PrefixCompatibility, Verdict};
use crate::config::{MatchConfig, MergePolicy};
use crate::error::{Error, Result};
use crate::math;
use crate::store::TrackletStore;
use crate::tracklet::{RoadUserType, Tracklet, TrackletId};

/// Proposal to join `tail` onto the end of `head`
#[derive(Debug, Clone, PartialEq)]
pub struct MergeCandidate {
    pub head: TrackletId,
    pub tail: TrackletId,
    pub tail_start: u32,
    pub evidence: Evidence,

    // spatial gap within point_threshold; informational only
    pub spatially_close: bool,
}

/// A pair (or a lone tracklet when `tail` is `None`) left out of the scan
#[derive(Debug)]
pub struct Skipped {
    pub head: TrackletId,
    pub tail: Option<TrackletId>,
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct MatchReport {
    pub candidates: Vec<MergeCandidate>,
    pub skipped: Vec<Skipped>,
}

enum Outcome {
    Merge(MergeCandidate),
    Skip(Skipped),
}

pub struct ReidMatcher<C = PrefixCompatibility> {
    compat: C,
    config: MatchConfig,
}

impl ReidMatcher<PrefixCompatibility> {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            compat: PrefixCompatibility::new(config.clone()),
            config,
        }
    }
}

impl Default for ReidMatcher<PrefixCompatibility> {
    fn default() -> Self {
        Self::new(MatchConfig::default())
    }
}

impl<C: Compatibility + Sync> ReidMatcher<C> {
    pub fn with_compatibility(compat: C, config: MatchConfig) -> Self {
        Self { compat, config }
    }

    #[inline]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn run<S: TrackletStore>(&self, store: &S) -> MatchReport {
        let mut ids = store.ids();
        ids.sort();

        let tracklets: Vec<&Tracklet> = ids.iter().filter_map(|id| store.get(id)).collect();

        self.run_tracklets(&tracklets)
    }

    pub fn run_tracklets(&self, tracklets: &[&Tracklet]) -> MatchReport {
        let mut report = MatchReport::default();
        let mut buckets: BTreeMap<RoadUserType, Vec<(u32, u32, &Tracklet)>> = BTreeMap::new();

        for &tracklet in tracklets {
            match tracklet.span() {
                Ok((first, last)) => buckets
                    .entry(tracklet.class())
                    .or_default()
                    .push((first, last, tracklet)),

                Err(error) => {
                    warn!("skipping tracklet {}: {}", tracklet.id(), error);
                    report.skipped.push(Skipped {
                        head: tracklet.id(),
                        tail: None,
                        error,
                    });
                }
            }
        }

        let mut work: Vec<(&Tracklet, Vec<&Tracklet>)> = Vec::new();

        for bucket in buckets.values_mut() {
            bucket.sort_by_key(|&(first, _, t)| (first, t.id()));

            for &(_, last, head) in bucket.iter() {
                // only tails starting strictly after the head can qualify
                let from = bucket.partition_point(|&(first, _, _)| first <= last);
                let tails = bucket[from..].iter().map(|&(_, _, t)| t).collect();

                work.push((head, tails));
            }
        }

        let outcomes: Vec<Vec<Outcome>> = if self.config.parallel {
            work.par_iter()
                .map(|(head, tails)| self.match_head(head, tails))
                .collect()
        } else {
            work.iter()
                .map(|(head, tails)| self.match_head(head, tails))
                .collect()
        };

        let mut accepted = Vec::new();

        for outcome in outcomes.into_iter().flatten() {
            match outcome {
                Outcome::Merge(candidate) => accepted.push(candidate),
                Outcome::Skip(skipped) => report.skipped.push(skipped),
            }
        }

        report.candidates = self.resolve(accepted);

        info!(
            "{} tracklets, {} pairs tested, {} merge candidates, {} skipped",
            tracklets.len(),
            work.iter().map(|(_, tails)| tails.len()).sum::<usize>(),
            report.candidates.len(),
            report.skipped.len()
        );

        report
    }

    fn match_head(&self, head: &Tracklet, tails: &[&Tracklet]) -> Vec<Outcome> {
        let mut out = Vec::new();

        for &tail in tails {
            match self.try_pair(head, tail) {
                Ok(Some(candidate)) => out.push(Outcome::Merge(candidate)),
                Ok(None) => {}
                Err(error) => {
                    warn!("skipping pair {} -> {}: {}", head.id(), tail.id(), error);
                    out.push(Outcome::Skip(Skipped {
                        head: head.id(),
                        tail: Some(tail.id()),
                        error,
                    }));
                }
            }
        }

        out
    }

    fn try_pair(&self, head: &Tracklet, tail: &Tracklet) -> Result<Option<MergeCandidate>> {
        match self.compat.verdict(head, tail)? {
            Verdict::Accepted(evidence) => {
                debug!("{} -> {} accepted: {:?}", head.id(), tail.id(), evidence);

                Ok(Some(MergeCandidate {
                    head: head.id(),
                    tail: tail.id(),
                    tail_start: tail.first()?.image_id(),
                    spatially_close: math::is_similar(
                        evidence.spatial_gap,
                        self.config.point_threshold,
                    ),
                    evidence,
                }))
            }

            Verdict::Rejected(reason) => {
                trace!("{} -> {} rejected: {:?}", head.id(), tail.id(), reason);
                Ok(None)
            }
        }
    }

    fn resolve(&self, mut accepted: Vec<MergeCandidate>) -> Vec<MergeCandidate> {
        accepted.sort_by(|a, b| {
            (a.head, a.tail_start, a.tail).cmp(&(b.head, b.tail_start, b.tail))
        });

        match self.config.merge_policy {
            MergePolicy::All => accepted,
            MergePolicy::Greedy => {
                let mut best: Vec<MergeCandidate> = Vec::new();

                for candidate in accepted {
                    match best.last_mut() {
                        Some(top) if top.head == candidate.head => {
                            // input is already ordered by (tail_start, tail) per head,
                            // so only a strictly closer feature match replaces `top`
                            if candidate.evidence.feature_distance < top.evidence.feature_distance
                            {
                                *top = candidate;
                            }
                        }
                        _ => best.push(candidate),
                    }
                }

                best
            }
        }
    }
}

/// Runs a [`ReidMatcher`] with the default compatibility predicate
pub fn find_merges<S: TrackletStore>(store: &S, config: &MatchConfig) -> MatchReport {
    ReidMatcher::new(config.clone()).run(store)
}
