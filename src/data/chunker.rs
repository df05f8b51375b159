// ============================================================
// Layer 4 — Signal Chunker
// ============================================================
// Cuts a long ECG recording into fixed-length windows. The
// network only accepts one input length, so every example has
// to be exactly `window_len` samples long.
//
// Example with window_len=4, overlap=0:
//   Signal:  s0 s1 s2 s3 s4 s5 s6 s7 s8 s9
//   Window 1: s0..s3
//   Window 2: s4..s7
//   s8 s9 are dropped; a partial window is never padded.
//
// With overlap > 0 consecutive windows share `overlap` samples;
// stride = window_len - overlap.

pub struct Chunker {
    /// Samples per window
    window_len: usize,
    /// Samples shared between adjacent windows
    overlap: usize,
}

impl Chunker {
    /// # Panics
    /// Panics if `window_len` is zero or `overlap >= window_len`
    /// (the stride would be zero).
    pub fn new(window_len: usize, overlap: usize) -> Self {
        assert!(window_len > 0, "window_len must be positive");
        assert!(
            overlap < window_len,
            "overlap ({}) must be less than window_len ({})",
            overlap,
            window_len
        );
        Self { window_len, overlap }
    }

    pub fn window_len(&self) -> usize {
        self.window_len
    }

    /// Borrowed views of every complete window, in signal order.
    pub fn chunk<'a>(&self, signal: &'a [f32]) -> Vec<&'a [f32]> {
        let stride = self.window_len - self.overlap;
        (0..self.num_chunks(signal.len()))
            .map(|i| {
                let start = i * stride;
                &signal[start..start + self.window_len]
            })
            .collect()
    }

    /// Number of complete windows a signal of `len` samples yields
    pub fn num_chunks(&self, len: usize) -> usize {
        if len < self.window_len {
            return 0;
        }
        let stride = self.window_len - self.overlap;
        (len - self.window_len) / stride + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<f32> {
        (0..n).map(|i| i as f32).collect()
    }

    #[test]
    fn test_non_overlapping_drops_tail() {
        let c      = Chunker::new(4, 0);
        let signal = ramp(10);
        let chunks = c.chunk(&signal);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(chunks[1], &[4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_overlap_is_correct() {
        let c      = Chunker::new(4, 2);
        let signal = ramp(8);
        let chunks = c.chunk(&signal);
        // stride 2: [0..4], [2..6], [4..8]
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1][0], 2.0);
        assert_eq!(c.num_chunks(8), 3);
    }

    #[test]
    fn test_short_signal_gives_no_chunks() {
        let c = Chunker::new(100, 0);
        assert!(c.chunk(&ramp(99)).is_empty());
        assert_eq!(c.chunk(&ramp(100)).len(), 1);
    }

    #[test]
    #[should_panic]
    fn test_overlap_must_be_less_than_window() {
        let _ = Chunker::new(5, 5);
    }
}
