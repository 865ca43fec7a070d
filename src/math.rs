use nalgebra as na;
use ndarray::prelude::*;

use crate::error::{Error, Result};
use crate::frame::Frame;

pub fn euclidean_distance(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> Result<f32> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch(a.len(), b.len()));
    }

    Ok(a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt())
}

#[inline]
pub fn feature_distance(f1: &Frame, f2: &Frame) -> Result<f32> {
    euclidean_distance(f1.feature(), f2.feature())
}

#[inline]
pub fn point_distance(p1: &na::Point2<f32>, p2: &na::Point2<f32>) -> f32 {
    na::distance(p1, p2)
}

/// Smallest feature distance over every `(h, t)` frame pair, not only the
/// touching endpoints.
pub fn min_feature_distance(head: &[Frame], tail: &[Frame]) -> Result<Option<f32>> {
    let mut min: Option<f32> = None;

    for h in head {
        for t in tail {
            let d = feature_distance(h, t)?;
            min = Some(min.map_or(d, |m| m.min(d)));
        }
    }

    Ok(min)
}

/// Path length over consecutive centers divided by elapsed frames.
///
/// Frames must come in temporal order. Returns `Ok(None)` when all frames
/// share one timestamp.
pub fn speed_of<'a, I>(frames: I) -> Result<Option<f32>>
where
    I: IntoIterator<Item = &'a Frame>,
{
    let mut iter = frames.into_iter();
    let mut prev = match iter.next() {
        Some(f) => f,
        None => return Err(Error::InsufficientFrames(0)),
    };

    let mut count = 1;
    let mut path = 0.0f32;
    let mut elapsed = 0u64;

    for curr in iter {
        path += point_distance(&prev.center(), &curr.center());
        elapsed += u64::from(curr.image_id().saturating_sub(prev.image_id()));
        count += 1;
        prev = curr;
    }

    if count < 2 {
        return Err(Error::InsufficientFrames(count));
    }

    if elapsed == 0 {
        return Ok(None);
    }

    Ok(Some(path / elapsed as f32))
}

#[inline]
pub fn speed(frames: &[Frame]) -> Result<Option<f32>> {
    speed_of(frames)
}

/// Same as [`speed`] but treats a zero duration as an error.
pub fn speed_required(frames: &[Frame]) -> Result<f32> {
    speed(frames)?.ok_or(Error::ZeroDuration)
}

#[inline(always)]
pub fn is_similar(distance: f32, threshold: f32) -> bool {
    distance < threshold
}
