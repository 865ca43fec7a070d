use serde_derive::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// What to do when a tracklet is too short (or too static) to estimate speed
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShortTrackletPolicy {
    /// speed continuity fails, so the pair is rejected
    Reject,
    /// accept on class, ordering and feature checks alone
    SkipSpeedCheck,
}

/// Resolution of one head matching several tails
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// every accepted pair is reported
    All,
    /// one tail per head: lowest feature distance, then earliest start, then lowest id
    Greedy,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MatchConfig {
    pub feature_threshold: f32,
    pub point_threshold: f32,
    pub tracklet_threshold: f32,
    pub speed_tolerance: f32,
    pub short_tracklet_policy: ShortTrackletPolicy,
    pub merge_policy: MergePolicy,
    pub parallel: bool,
}

impl MatchConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;

        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            feature_threshold: 30.0,
            point_threshold: 100.0,
            tracklet_threshold: 0.1,
            speed_tolerance: 0.1,
            short_tracklet_policy: ShortTrackletPolicy::Reject,
            merge_policy: MergePolicy::Greedy,
            parallel: false,
        }
    }
}
