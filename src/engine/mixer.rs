//! Mixer for overlapping one-shot sounds
//!
//! Each scheduled graph becomes a voice that plays its buffer once at its
//! gain and is retired when it runs out. The mixer sums all live voices.
//!
//! `process` runs on the audio callback and never frees memory: finished
//! buffers move to a retired list that `add` and `clear` empty from the
//! scheduling side.

use super::device::PlaybackGraph;

struct OneShotVoice {
    samples: Vec<f32>,
    position: usize,
    gain: f32,
}

impl OneShotVoice {
    fn finished(&self) -> bool {
        self.position >= self.samples.len()
    }

    fn next(&mut self) -> f32 {
        let sample = self.samples.get(self.position).copied().unwrap_or(0.0);
        self.position += 1;
        sample * self.gain
    }
}

/// Sums active one-shot voices into a mono signal
#[derive(Default)]
pub struct Mixer {
    voices: Vec<OneShotVoice>,
    retired: Vec<Vec<f32>>,
}

impl Mixer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a graph on the next processed sample
    pub fn add(&mut self, graph: PlaybackGraph) {
        let (buffer, gain) = graph.into_parts();
        if buffer.is_empty() || gain == 0.0 {
            return;
        }
        self.retired.clear();
        self.voices.push(OneShotVoice {
            samples: buffer.into_samples(),
            position: 0,
            gain,
        });
        // Room for every live voice to retire without growing in `process`
        self.retired.reserve(self.voices.len());
    }

    /// Number of voices still sounding
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Finished buffers waiting to be freed outside the audio callback
    pub fn retired_buffers(&self) -> usize {
        self.retired.len()
    }

    /// Drop every voice
    pub fn clear(&mut self) {
        self.voices.clear();
        self.retired.clear();
    }

    /// Generate the next mixed sample
    pub fn process(&mut self) -> f32 {
        if self.voices.is_empty() {
            return 0.0;
        }

        let output: f32 = self.voices.iter_mut().map(OneShotVoice::next).sum();

        let mut i = 0;
        while i < self.voices.len() {
            if self.voices[i].finished() {
                let voice = self.voices.swap_remove(i);
                self.retired.push(voice.samples);
            } else {
                i += 1;
            }
        }

        output.clamp(-1.0, 1.0)
    }

    /// Fill a mono buffer with samples
    pub fn fill_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process();
        }
    }
}
