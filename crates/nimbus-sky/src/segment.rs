//! Segmentation of a label sequence into contiguous same-label runs.

use crate::error::SkyError;
use crate::skytype::SkyType;

/// Per-sample segmentation of a sky-type sequence.
///
/// Segment ids start at 0, are non-decreasing along the sequence, and
/// increase by one exactly at label-change points:
///
/// ```text
/// labels: [2, 2, 2, 4, 4, 5, 5, 5, 5, 5, 3, 4, 4]
/// ids:    [0, 0, 0, 1, 1, 2, 2, 2, 2, 2, 3, 4, 4]
/// ```
#[derive(Debug, Clone)]
pub struct Segmentation {
    ids: Vec<usize>,
    labels: Vec<SkyType>,
}

impl Segmentation {
    /// Per-sample segment ids.
    #[must_use]
    pub fn ids(&self) -> &[usize] {
        &self.ids
    }

    /// Per-sample sky types (the sequence that produced this segmentation).
    #[must_use]
    pub fn labels(&self) -> &[SkyType] {
        &self.labels
    }

    /// Number of distinct segments.
    #[must_use]
    pub fn n_segments(&self) -> usize {
        self.ids.last().map_or(0, |last| last + 1)
    }
}

/// A segment annotated with its neighbors' sky type and length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Segment id.
    pub id: usize,
    /// Sky type shared by every sample of the segment.
    pub sky_type: SkyType,
    /// Index of the segment's first sample in the sequence.
    pub start: usize,
    /// Number of samples in the segment.
    pub len: usize,
    /// Previous segment's (sky type, length); `None` at the sequence start.
    pub prev: Option<(SkyType, usize)>,
    /// Next segment's (sky type, length); `None` at the sequence end.
    pub next: Option<(SkyType, usize)>,
}

impl Patch {
    /// Range of sample indices covered by this patch.
    #[must_use]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.len
    }
}

/// Assign a segment id to every sample of `labels`.
#[must_use]
pub fn segment(labels: &[SkyType]) -> Segmentation {
    let mut ids = Vec::with_capacity(labels.len());
    let mut current = 0usize;
    for (i, &label) in labels.iter().enumerate() {
        if i > 0 && label != labels[i - 1] {
            current += 1;
        }
        ids.push(current);
    }
    Segmentation {
        ids,
        labels: labels.to_vec(),
    }
}

/// Summarize a segmentation into one [`Patch`] per segment, in id order.
///
/// # Errors
///
/// Returns [`SkyError::MixedSegment`] if a segment contains more than one
/// sky type. Segmentations produced by [`segment`] never trip this; it is an
/// internal-consistency check, and a failure indicates a segmentation bug.
pub fn reduce(segmentation: &Segmentation) -> Result<Vec<Patch>, SkyError> {
    let ids = segmentation.ids();
    let labels = segmentation.labels();

    // One (sky_type, start, len) per segment, with the single-label invariant check.
    let mut runs: Vec<(SkyType, usize, usize)> = Vec::new();
    for (i, (&id, &label)) in ids.iter().zip(labels).enumerate() {
        if id == runs.len() {
            runs.push((label, i, 1));
        } else if let Some((sky_type, _, len)) = runs.get_mut(id) {
            if *sky_type != label {
                return Err(SkyError::MixedSegment { segment: id });
            }
            *len += 1;
        } else {
            return Err(SkyError::MixedSegment { segment: id });
        }
    }

    let patches = (0..runs.len())
        .map(|id| {
            let (sky_type, start, len) = runs[id];
            Patch {
                id,
                sky_type,
                start,
                len,
                prev: id.checked_sub(1).map(|p| (runs[p].0, runs[p].2)),
                next: runs.get(id + 1).map(|n| (n.0, n.2)),
            }
        })
        .collect();
    Ok(patches)
}

/// Rebuild a per-sample label sequence from segment ids and one label per
/// segment (`segment_labels[id]`).
#[must_use]
pub fn reconstruct(ids: &[usize], segment_labels: &[SkyType]) -> Vec<SkyType> {
    ids.iter().map(|&id| segment_labels[id]).collect()
}
