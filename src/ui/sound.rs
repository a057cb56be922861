/// Sound effects: one procedurally generated clip per `AudioCue`.
///
/// Clips are synthesized into in-memory WAV buffers once at startup and
/// played fire-and-forget through rodio. Build without the "sound" feature
/// and `SoundEngine` becomes a no-op; the synthesis itself always compiles.

use crate::sim::event::AudioCue;

const SAMPLE_RATE: u32 = 22050;
const TAU: f32 = std::f32::consts::TAU;

// ════════════════════════════════════════════════════════════
//  Synthesis
// ════════════════════════════════════════════════════════════

/// Oscillator shapes used by the cues.
#[derive(Clone, Copy)]
enum Wave {
    Sine,
    /// Sine plus a third harmonic; reads as a soft square.
    Buzz,
    Noise,
}

/// One linear pitch sweep with a decaying envelope.
struct Segment {
    from_hz: f32,
    to_hz: f32,
    secs: f32,
    volume: f32,
    wave: Wave,
}

const fn seg(from_hz: f32, to_hz: f32, secs: f32, volume: f32, wave: Wave) -> Segment {
    Segment { from_hz, to_hz, secs, volume, wave }
}

const SWING: &[Segment] = &[seg(900.0, 300.0, 0.08, 0.25, Wave::Noise)];
const HIT: &[Segment] = &[seg(400.0, 250.0, 0.06, 0.3, Wave::Buzz)];
const DIE: &[Segment] = &[
    seg(600.0, 200.0, 0.10, 0.3, Wave::Buzz),
    seg(300.0, 80.0, 0.12, 0.25, Wave::Noise),
];
const HURT: &[Segment] = &[seg(220.0, 110.0, 0.15, 0.35, Wave::Buzz)];
const PICKUP: &[Segment] = &[
    seg(1047.0, 1047.0, 0.045, 0.25, Wave::Buzz),
    seg(1319.0, 1319.0, 0.045, 0.25, Wave::Buzz),
    seg(1568.0, 1568.0, 0.06, 0.25, Wave::Buzz),
];
const DOOR: &[Segment] = &[
    seg(150.0, 300.0, 0.10, 0.3, Wave::Sine),
    seg(300.0, 450.0, 0.08, 0.2, Wave::Sine),
];
const GAME_OVER: &[Segment] = &[
    seg(440.0, 440.0, 0.14, 0.3, Wave::Sine),
    seg(370.0, 370.0, 0.14, 0.3, Wave::Sine),
    seg(311.0, 311.0, 0.14, 0.3, Wave::Sine),
    seg(261.0, 200.0, 0.30, 0.3, Wave::Sine),
];

fn cue_segments(cue: AudioCue) -> &'static [Segment] {
    match cue {
        AudioCue::SwordSwing => SWING,
        AudioCue::EnemyHit => HIT,
        AudioCue::EnemyDie => DIE,
        AudioCue::PlayerHit => HURT,
        AudioCue::ItemPickup => PICKUP,
        AudioCue::DoorOpen => DOOR,
        AudioCue::GameOver => GAME_OVER,
    }
}

fn render(segments: &[Segment]) -> Vec<f32> {
    let mut out = Vec::new();
    let mut noise: u32 = 0x2545_f491;
    let mut phase = 0.0_f32;
    for s in segments {
        let n = (SAMPLE_RATE as f32 * s.secs) as usize;
        for i in 0..n {
            let t = i as f32 / n.max(1) as f32;
            let hz = s.from_hz + (s.to_hz - s.from_hz) * t;
            phase = (phase + hz / SAMPLE_RATE as f32).fract();
            let v = match s.wave {
                Wave::Sine => (phase * TAU).sin(),
                Wave::Buzz => (phase * TAU).sin() * 0.7 + (phase * 3.0 * TAU).sin() * 0.3,
                Wave::Noise => {
                    noise = noise.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                    let n = (noise >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0;
                    n * 0.6 + (phase * TAU).sin() * 0.4
                }
            };
            out.push(v * (1.0 - t).sqrt() * s.volume);
        }
    }
    out
}

/// 16-bit mono PCM WAV.
fn encode_wav(samples: &[f32]) -> Vec<u8> {
    let data_len = samples.len() as u32 * 2;
    let mut buf = Vec::with_capacity(44 + data_len as usize);

    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + data_len).to_le_bytes());
    buf.extend_from_slice(b"WAVEfmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&1u16.to_le_bytes()); // mono
    buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    buf.extend_from_slice(&(SAMPLE_RATE * 2).to_le_bytes());
    buf.extend_from_slice(&2u16.to_le_bytes());
    buf.extend_from_slice(&16u16.to_le_bytes());
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_len.to_le_bytes());

    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
        buf.extend_from_slice(&v.to_le_bytes());
    }
    buf
}

pub fn cue_wav(cue: AudioCue) -> Vec<u8> {
    encode_wav(&render(cue_segments(cue)))
}

pub const ALL_CUES: [AudioCue; 7] = [
    AudioCue::SwordSwing,
    AudioCue::EnemyHit,
    AudioCue::EnemyDie,
    AudioCue::PlayerHit,
    AudioCue::ItemPickup,
    AudioCue::DoorOpen,
    AudioCue::GameOver,
];

// ════════════════════════════════════════════════════════════
//  Playback
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
mod inner {
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};
    use tracing::{debug, warn};

    use super::{cue_wav, ALL_CUES};
    use crate::sim::event::AudioCue;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        clips: HashMap<AudioCue, Arc<Vec<u8>>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    warn!("no audio output: {e}");
                    return None;
                }
            };
            let clips = ALL_CUES.iter().map(|&c| (c, Arc::new(cue_wav(c)))).collect();
            debug!("sound clips synthesized");
            Some(SoundEngine { _stream: stream, handle, clips })
        }

        pub fn play(&self, cue: AudioCue) {
            let Some(buf) = self.clips.get(&cue) else {
                return;
            };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                if let Ok(src) = rodio::Decoder::new(Cursor::new(buf.as_ref().clone())) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }
    }
}

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> {
        Some(SoundEngine)
    }
    pub fn play(&self, _cue: AudioCue) {}
}
