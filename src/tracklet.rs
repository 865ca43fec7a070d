use serde_derive::Deserialize;
use std::fmt;

use crate::error::{Error, Result};
use crate::frame::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RoadUserType {
    Person = 0,
    Bike = 1,
    Car = 2,
}

impl TryFrom<i32> for RoadUserType {
    type Error = Error;

    fn try_from(class: i32) -> Result<Self> {
        match class {
            0 => Ok(RoadUserType::Person),
            1 => Ok(RoadUserType::Bike),
            2 => Ok(RoadUserType::Car),
            x => Err(Error::UnknownClass(x)),
        }
    }
}

impl fmt::Display for RoadUserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoadUserType::Person => "PERSON",
            RoadUserType::Bike => "BIKE",
            RoadUserType::Car => "CAR",
        };

        f.write_str(name)
    }
}

/// `(class, instance)` key of a tracklet, serialized as `[class_id, instance]`
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "(i32, u32)")]
pub struct TrackletId {
    pub class: RoadUserType,
    pub instance: u32,
}

impl TrackletId {
    #[inline]
    pub fn new(class: RoadUserType, instance: u32) -> Self {
        Self { class, instance }
    }
}

impl TryFrom<(i32, u32)> for TrackletId {
    type Error = Error;

    fn try_from((class, instance): (i32, u32)) -> Result<Self> {
        Ok(Self::new(RoadUserType::try_from(class)?, instance))
    }
}

impl fmt::Display for TrackletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.class as i32, self.instance)
    }
}

#[derive(Deserialize, Debug)]
pub struct TrackletRecord {
    pub id: TrackletId,
    pub frames: Vec<Frame>,
}

/// Frames of one object inside a short track, ordered by `image_id`.
#[derive(Deserialize, Debug, Clone)]
#[serde(from = "TrackletRecord")]
pub struct Tracklet {
    id: TrackletId,
    frames: Vec<Frame>,
}

impl Tracklet {
    pub fn new(id: TrackletId, mut frames: Vec<Frame>) -> Self {
        // stable, so equal timestamps keep their detection order
        frames.sort_by_key(Frame::image_id);

        Self { id, frames }
    }

    #[inline]
    pub fn id(&self) -> TrackletId {
        self.id
    }

    #[inline]
    pub fn class(&self) -> RoadUserType {
        self.id.class
    }

    #[inline]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn first(&self) -> Result<&Frame> {
        self.frames.first().ok_or(Error::EmptyTracklet(self.id))
    }

    pub fn last(&self) -> Result<&Frame> {
        self.frames.last().ok_or(Error::EmptyTracklet(self.id))
    }

    /// `(first, last)` image ids
    pub fn span(&self) -> Result<(u32, u32)> {
        Ok((self.first()?.image_id(), self.last()?.image_id()))
    }
}

impl From<TrackletRecord> for Tracklet {
    fn from(rec: TrackletRecord) -> Self {
        Tracklet::new(rec.id, rec.frames)
    }
}
