//! Mono PCM sample buffers

/// A block of synthesized mono samples
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl SampleBuffer {
    pub(crate) fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Empty buffer at the given rate
    pub fn empty(sample_rate: u32) -> Self {
        Self::new(Vec::new(), sample_rate)
    }

    /// Samples per second
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Always 1
    pub fn channels(&self) -> u16 {
        1
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Borrow the samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Largest absolute sample value
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
    }

    /// Give up the buffer and keep the samples
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buffer() {
        let buffer = SampleBuffer::empty(44100);
        assert!(buffer.is_empty());
        assert_eq!(buffer.channels(), 1);
        assert_eq!(buffer.duration_secs(), 0.0);
        assert_eq!(buffer.peak(), 0.0);
    }

    #[test]
    fn test_duration_and_peak() {
        let buffer = SampleBuffer::new(vec![0.0, -0.75, 0.5, 0.25], 4);
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.duration_secs(), 1.0);
        assert_eq!(buffer.peak(), 0.75);
    }
}
