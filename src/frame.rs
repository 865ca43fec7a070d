use nalgebra as na;
use ndarray::prelude::*;
use serde_derive::Deserialize;
use std::fmt;

use crate::bbox::{BBox, Ltrb, Xywh};

/// On-disk shape of a frame: `bbox` is `[cx, cy, w, h]`
#[derive(Deserialize, Debug, Clone)]
pub struct FrameRecord {
    pub image_id: u32,
    pub bbox: [f32; 4],
    pub feature: Vec<f32>,
}

/// A single detection sample of a tracked object.
///
/// `image_id` doubles as the frame time, there is no wall clock in this domain.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(from = "FrameRecord")]
pub struct Frame {
    image_id: u32,
    bbox: BBox<Xywh>,
    feature: Array1<f32>,
}

impl Frame {
    pub fn new(image_id: u32, bbox: BBox<Xywh>, feature: Array1<f32>) -> Self {
        Self {
            image_id,
            bbox,
            feature,
        }
    }

    #[inline]
    pub fn image_id(&self) -> u32 {
        self.image_id
    }

    #[inline]
    pub fn time(&self) -> u32 {
        self.image_id
    }

    #[inline]
    pub fn bbox(&self) -> &BBox<Xywh> {
        &self.bbox
    }

    #[inline]
    pub fn bounds(&self) -> BBox<Ltrb> {
        self.bbox.as_ltrb()
    }

    #[inline]
    pub fn center(&self) -> na::Point2<f32> {
        self.bbox.center()
    }

    #[inline]
    pub fn size(&self) -> (f32, f32) {
        (self.bbox.width(), self.bbox.height())
    }

    #[inline]
    pub fn feature(&self) -> ArrayView1<'_, f32> {
        self.feature.view()
    }
}

impl From<FrameRecord> for Frame {
    fn from(rec: FrameRecord) -> Self {
        let [cx, cy, w, h] = rec.bbox;

        Frame::new(rec.image_id, BBox::xywh(cx, cy, w, h), Array1::from(rec.feature))
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Frame img={} bbx=[{:.1}, {:.1}, {:.1}, {:.1}] features={}>",
            self.image_id,
            self.bbox.cx(),
            self.bbox.cy(),
            self.bbox.width(),
            self.bbox.height(),
            self.feature.len()
        )
    }
}
