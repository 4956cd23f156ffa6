//! Array dimension descriptors.
//!
//! The host describes each array it hands over as a `long` vector
//! `[rank, n1, ..., n_rank]` in column-major order, so the first index
//! varies fastest and the last two axes are the horizontal (east-west,
//! north-south) extents. [`DimInfo`] is the validated form of that vector,
//! optionally carrying the halo width of a distributed grid.

use smallvec::SmallVec;

use crate::error::DimError;

/// Highest array rank a descriptor may declare.
pub const MAX_RANK: usize = 4;

/// Validated shape of an array field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DimInfo {
    extents: SmallVec<[usize; MAX_RANK]>,
    halo: usize,
}

impl DimInfo {
    /// Build a descriptor from explicit extents with no halo.
    pub fn new(extents: &[usize]) -> Result<Self, DimError> {
        if extents.is_empty() || extents.len() > MAX_RANK {
            return Err(DimError::RankOutOfRange {
                rank: extents.len() as i64,
            });
        }
        if let Some(axis) = extents.iter().position(|&n| n == 0) {
            return Err(DimError::ZeroExtent { axis });
        }
        // Every extent must survive the round trip through the raw `long` form.
        if extents.iter().any(|&n| i64::try_from(n).is_err()) {
            return Err(DimError::Overflow);
        }
        extents
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .ok_or(DimError::Overflow)?;
        Ok(Self {
            extents: SmallVec::from_slice(extents),
            halo: 0,
        })
    }

    /// Parse the host's raw `[rank, n1, ..., n_rank]` form.
    ///
    /// Trailing entries past the declared rank are ignored, matching hosts
    /// that pass a fixed-size buffer.
    pub fn from_raw(raw: &[i64]) -> Result<Self, DimError> {
        let &declared = raw.first().ok_or(DimError::Truncated { needed: 1, got: 0 })?;
        let rank = match usize::try_from(declared) {
            Ok(rank) if (1..=MAX_RANK).contains(&rank) => rank,
            _ => return Err(DimError::RankOutOfRange { rank: declared }),
        };
        if raw.len() < rank + 1 {
            return Err(DimError::Truncated {
                needed: rank + 1,
                got: raw.len(),
            });
        }
        let mut extents: SmallVec<[usize; MAX_RANK]> = SmallVec::new();
        for (axis, &n) in raw[1..=rank].iter().enumerate() {
            if n < 0 {
                return Err(DimError::NegativeExtent { axis, value: n });
            }
            let n = usize::try_from(n).map_err(|_| DimError::Overflow)?;
            extents.push(n);
        }
        Self::new(&extents)
    }

    /// Attach a halo width to the horizontal axes.
    ///
    /// Every horizontal axis must keep at least one owned cell.
    pub fn with_halo(mut self, halo: usize) -> Result<Self, DimError> {
        for (axis, extent) in self.horizontal_axes() {
            let width = halo.checked_mul(2).ok_or(DimError::Overflow)?;
            if width >= extent {
                return Err(DimError::HaloTooWide { axis, halo, extent });
            }
        }
        self.halo = halo;
        Ok(self)
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.extents.len()
    }

    /// Extent of every axis, fastest-varying first.
    pub fn extents(&self) -> &[usize] {
        &self.extents
    }

    /// Halo width on the horizontal axes.
    pub fn halo(&self) -> usize {
        self.halo
    }

    /// Total number of elements.
    pub fn element_count(&self) -> usize {
        // Overflow was rejected at construction.
        self.extents.iter().product()
    }

    /// The (east-west, north-south) extents, or `None` for rank-1 arrays.
    pub fn horizontal(&self) -> Option<(usize, usize)> {
        match self.extents.as_slice() {
            [.., ew, ns] => Some((*ew, *ns)),
            _ => None,
        }
    }

    /// Extents with halo cells stripped from the horizontal axes.
    pub fn interior_extents(&self) -> SmallVec<[usize; MAX_RANK]> {
        let mut out = self.extents.clone();
        for (axis, extent) in self.horizontal_axes() {
            out[axis] = extent - 2 * self.halo;
        }
        out
    }

    /// The host's raw `[rank, n1, ..., n_rank]` form.
    pub fn to_raw(&self) -> SmallVec<[i64; MAX_RANK + 1]> {
        let mut raw = SmallVec::new();
        raw.push(self.rank() as i64);
        // `new` rejects extents above `i64::MAX`.
        raw.extend(self.extents.iter().map(|&n| n as i64));
        raw
    }

    fn horizontal_axes(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let rank = self.rank();
        let skip = if rank < 2 { rank } else { rank - 2 };
        self.extents.iter().copied().enumerate().skip(skip)
    }
}
