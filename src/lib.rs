pub mod anomaly;
pub mod bbox;
pub mod compat;
pub mod config;
pub mod error;
pub mod frame;
pub mod math;
pub mod matcher;
pub mod store;
pub mod tracklet;

pub use anomaly::{check_anomaly, AnomalyChecker, TrackletComparator};
pub use compat::{is_prefix_of, Compatibility, PrefixCompatibility, Verdict};
pub use config::{MatchConfig, MergePolicy, ShortTrackletPolicy};
pub use error::{Error, Result};
pub use frame::Frame;
pub use matcher::{find_merges, MatchReport, MergeCandidate, ReidMatcher};
pub use store::{load_tracklets, TrackletStore, Tracklets};
pub use tracklet::{RoadUserType, Tracklet, TrackletId};
