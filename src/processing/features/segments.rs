//! Overlapping segment layout shared by the segment-based estimators

use ndarray::ArrayView2;

/// Half-overlapping segments tiled across every epoch.
///
/// Segments are numbered start-fastest: segment `j` begins at
/// `starts[j % starts.len()]` in epoch `j / starts.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentLayout {
    segment_length: usize,
    starts: Vec<usize>,
    epochs: usize,
}

impl SegmentLayout {
    /// Layout of `segment_length`-sample windows with a 50% hop over epochs of `pnts` samples.
    ///
    /// Only whole multiples of `segment_length` are tiled; a trailing partial
    /// block is ignored.
    pub fn new(pnts: usize, segment_length: usize, epochs: usize) -> Self {
        if segment_length == 0 || segment_length > pnts {
            return Self {
                segment_length,
                starts: Vec::new(),
                epochs,
            };
        }

        let cutoff = (pnts / segment_length) * segment_length;
        let stop = (cutoff - segment_length + 1) as f64;
        let step = segment_length as f64 / 2.0;
        let count = (stop / step).ceil() as usize;
        // Rounding up can push the last start of a one-sample layout past the end
        let starts = (0..count)
            .map(|k| (k as f64 * step).ceil() as usize)
            .filter(|&start| start + segment_length <= cutoff)
            .collect();

        Self {
            segment_length,
            starts,
            epochs,
        }
    }

    /// Samples per segment
    pub fn segment_length(&self) -> usize {
        self.segment_length
    }

    /// Segment start samples within one epoch
    pub fn starts(&self) -> &[usize] {
        &self.starts
    }

    /// Segments across all epochs
    pub fn n_segments(&self) -> usize {
        self.starts.len() * self.epochs
    }

    /// (start sample, epoch) of segment `index`
    pub fn locate(&self, index: usize) -> (usize, usize) {
        let per_epoch = self.starts.len();
        (self.starts[index % per_epoch], index / per_epoch)
    }

    /// Copy segment `index` out of a (samples, epochs) activation
    pub fn extract(&self, activation: &ArrayView2<'_, f64>, index: usize) -> Vec<f64> {
        let (start, epoch) = self.locate(index);
        (start..start + self.segment_length)
            .map(|t| activation[[t, epoch]])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_single_segment_when_epoch_equals_length() {
        let layout = SegmentLayout::new(256, 256, 1);
        assert_eq!(layout.starts(), &[0]);
        assert_eq!(layout.n_segments(), 1);
    }

    #[test]
    fn test_half_overlap_starts() {
        let layout = SegmentLayout::new(512, 128, 2);
        assert_eq!(layout.starts(), &[0, 64, 128, 192, 256, 320, 384]);
        assert_eq!(layout.n_segments(), 14);
        assert_eq!(layout.locate(8), (64, 1));
    }

    #[test]
    fn test_odd_length_rounds_starts_up() {
        let layout = SegmentLayout::new(10, 5, 1);
        // Starts at 0, 2.5 -> 3, 5
        assert_eq!(layout.starts(), &[0, 3, 5]);
    }

    #[test]
    fn test_trailing_partial_block_ignored() {
        let layout = SegmentLayout::new(300, 128, 1);
        assert_eq!(layout.starts(), &[0, 64, 128]);
    }

    #[test]
    fn test_extract_reads_epoch_major() {
        let activation = Array2::from_shape_fn((8, 2), |(t, e)| (t + 100 * e) as f64);
        let layout = SegmentLayout::new(8, 4, 2);
        assert_eq!(layout.starts(), &[0, 2, 4]);
        assert_eq!(layout.extract(&activation.view(), 4), vec![102.0, 103.0, 104.0, 105.0]);
    }
}
