//! VoicePool: fixed-capacity voice slots for the render path.

use crate::voice::Voice;

/// Identifier for a voice slot in the pool.
pub type VoiceId = usize;

/// Maximum number of simultaneous voices.
///
/// A standard beat starts four voices and the longest lasts 0.5 s, so this
/// covers tempos far beyond any playable BPM.
pub const MAX_VOICES: usize = 64;

/// Pool of voice slots, allocated once up front.
pub struct VoicePool {
    /// Voice slots (None = free).
    slots: Vec<Option<Voice>>,
}

impl VoicePool {
    /// Create a new empty voice pool.
    pub fn new() -> Self {
        Self {
            slots: (0..MAX_VOICES).map(|_| None).collect(),
        }
    }

    /// Place a voice in a free slot.
    ///
    /// A started voice always plays to its end, so when every slot is busy
    /// the new voice is dropped and None is returned.
    pub fn allocate(&mut self, voice: Voice) -> Option<VoiceId> {
        let id = self.slots.iter().position(|s| s.is_none())?;
        self.slots[id] = Some(voice);
        Some(id)
    }

    /// Get a reference to a voice.
    pub fn get(&self, id: VoiceId) -> Option<&Voice> {
        self.slots.get(id).and_then(|s| s.as_ref())
    }

    /// Render one sample from every voice and free the ones that finished.
    pub fn render(&mut self, noise: &[f32], sample_rate: f32) -> f32 {
        let mut sum = 0.0;
        for slot in &mut self.slots {
            if let Some(voice) = slot {
                sum += voice.render(noise, sample_rate);
                if !voice.is_playing() {
                    *slot = None;
                }
            }
        }
        sum
    }

    /// Count of occupied slots.
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

impl Default for VoicePool {
    fn default() -> Self {
        Self::new()
    }
}
