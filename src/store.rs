use log::info;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::tracklet::{Tracklet, TrackletId};

pub trait TrackletStore {
    fn ids(&self) -> Vec<TrackletId>;
    fn get(&self, id: &TrackletId) -> Option<&Tracklet>;
}

/// Tracklets keyed by id; iteration is always in id order.
#[derive(Debug, Clone, Default)]
pub struct Tracklets {
    tracklets: BTreeMap<TrackletId, Tracklet>,
    source: Option<PathBuf>,
}

impl Tracklets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tracklets<I: IntoIterator<Item = Tracklet>>(iter: I) -> Result<Self> {
        let mut store = Self::new();

        for tracklet in iter {
            store.insert(tracklet)?;
        }

        Ok(store)
    }

    pub fn insert(&mut self, tracklet: Tracklet) -> Result<()> {
        let id = tracklet.id();

        if self.tracklets.contains_key(&id) {
            return Err(Error::DuplicateTracklet(id));
        }

        self.tracklets.insert(id, tracklet);

        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tracklets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracklets.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Tracklet> {
        self.tracklets.values()
    }

    #[inline]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

impl TrackletStore for Tracklets {
    fn ids(&self) -> Vec<TrackletId> {
        self.tracklets.keys().copied().collect()
    }

    #[inline]
    fn get(&self, id: &TrackletId) -> Option<&Tracklet> {
        self.tracklets.get(id)
    }
}

impl fmt::Display for Tracklets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(path) => write!(f, "<Tracklets {} tracks from {}>", self.len(), path.display()),
            None => write!(f, "<Tracklets {} tracks>", self.len()),
        }
    }
}

/// Reads a JSON array of `{"id": [class, instance], "frames": [...]}` records.
pub fn load_tracklets<P: AsRef<Path>>(path: P) -> Result<Tracklets> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let records: Vec<Tracklet> = serde_json::from_reader(std::io::BufReader::new(file))?;

    let mut store = Tracklets::from_tracklets(records)?;
    store.source = Some(path.to_path_buf());

    info!("loaded {}", store);

    Ok(store)
}
