// Copyright (c) 2024 Mike Tsao

use super::{circle_position, FadeWindow, Trajectory};
use crate::{
    spatial::{GainDelayVector, SpatializationEngine, ACTIVE_GAIN_THRESHOLD},
    types::{FrequencyHz, Position, SampleBuffer, Seconds},
    util::SynthesisSettings,
};
use core::f64::consts::TAU;
use kahan::KahanSum;

/// Renders spatialized sine tones into [SampleBuffer]s.
///
/// Every buffer has one channel per output channel of the engine's layout.
/// Speakers that share a channel sum into it.
#[derive(Clone, Debug, Default)]
pub struct BufferSynthesizer {
    engine: SpatializationEngine,
    settings: SynthesisSettings,

    // Output channel for each speaker, in layout order.
    speaker_channels: Vec<usize>,
}
impl BufferSynthesizer {
    #[allow(missing_docs)]
    pub fn new_with(engine: SpatializationEngine, settings: SynthesisSettings) -> Self {
        let speaker_channels = engine
            .layout()
            .speakers()
            .iter()
            .map(|s| s.channel)
            .collect();
        Self {
            engine,
            settings,
            speaker_channels,
        }
    }

    #[allow(missing_docs)]
    pub fn engine(&self) -> &SpatializationEngine {
        &self.engine
    }

    #[allow(missing_docs)]
    pub fn settings(&self) -> &SynthesisSettings {
        &self.settings
    }

    #[allow(missing_docs)]
    pub fn channel_count(&self) -> usize {
        self.engine.channel_count()
    }

    /// A silent buffer of the given length.
    pub fn silence(&self, duration: Seconds) -> SampleBuffer {
        SampleBuffer::new_silent(
            self.settings.sample_rate().frames_for(duration),
            self.channel_count(),
        )
    }

    /// One burst of `tone_duration` at a fixed position and frequency, faded
    /// in and out. Each speaker's delay shifts the phase of its sine.
    pub fn tone(&self, position: &Position, frequency: FrequencyHz, amplitude: f64) -> SampleBuffer {
        let sample_rate = self.settings.sample_rate();
        let frame_count = sample_rate.frames_for(self.settings.tone_duration);
        let mut buffer = SampleBuffer::new_silent(frame_count, self.channel_count());
        let window = FadeWindow::new_with(frame_count, self.settings.fade_frames());
        let vector = self.engine.compute(position);
        let sample_rate = f64::from(sample_rate);

        for (speaker, gain, delay) in vector.active(ACTIVE_GAIN_THRESHOLD) {
            let channel = self.speaker_channels[speaker];
            for n in 0..frame_count {
                let t = n as f64 / sample_rate;
                let value = (TAU * frequency.0 * (t - delay)).sin();
                buffer.add(n, channel, amplitude * gain * value * window.gain(n));
            }
        }
        buffer
    }

    /// A continuous sweep around a circle of `radius` centered on the
    /// origin, one revolution over `duration`.
    pub fn circle(
        &self,
        radius: f64,
        duration: Seconds,
        frequency: FrequencyHz,
        amplitude: f64,
    ) -> SampleBuffer {
        self.render_continuous(
            duration,
            amplitude,
            |t| circle_position(radius, t),
            |_| frequency,
        )
    }

    /// A continuous glide from `start` to `end` at a fixed position.
    pub fn frequency_ramp(
        &self,
        position: &Position,
        start: FrequencyHz,
        end: FrequencyHz,
        duration: Seconds,
        amplitude: f64,
    ) -> SampleBuffer {
        let position = *position;
        self.render_continuous(
            duration,
            amplitude,
            |_| position,
            |t| FrequencyHz::lerp(start, end, t),
        )
    }

    /// A continuous glide from `start` to `end` while moving along `path`.
    pub fn path_frequency_ramp(
        &self,
        path: &Trajectory,
        start: FrequencyHz,
        end: FrequencyHz,
        duration: Seconds,
        amplitude: f64,
    ) -> SampleBuffer {
        self.render_continuous(
            duration,
            amplitude,
            |t| path.position_at(t),
            |t| FrequencyHz::lerp(start, end, t),
        )
    }

    /// Renders `duration` of audio whose position and frequency follow the
    /// given functions of normalized time.
    ///
    /// Phase is accumulated sample by sample so that a changing frequency
    /// never jumps. Spatialization is recomputed once per segment (see
    /// [SynthesisSettings::segment_duration]), evaluated at the segment's
    /// midpoint. One fade window spans the whole buffer.
    pub fn render_continuous(
        &self,
        duration: Seconds,
        amplitude: f64,
        position_at: impl Fn(f64) -> Position,
        frequency_at: impl Fn(f64) -> FrequencyHz,
    ) -> SampleBuffer {
        let sample_rate = self.settings.sample_rate();
        let frame_count = sample_rate.frames_for(duration);
        let mut buffer = SampleBuffer::new_silent(frame_count, self.channel_count());
        if frame_count == 0 || self.engine.layout().is_empty() {
            return buffer;
        }
        let sample_rate = f64::from(sample_rate);
        let window = FadeWindow::new_with(frame_count, self.settings.fade_frames());

        let frequencies: Vec<f64> = (0..frame_count)
            .map(|n| frequency_at(n as f64 / frame_count as f64).0)
            .collect();

        // In cycles rather than radians, and including the current sample.
        let mut cursor = KahanSum::<f64>::new();
        let cycles: Vec<f64> = frequencies
            .iter()
            .map(|f| {
                cursor += f / sample_rate;
                cursor.sum()
            })
            .collect();

        let segment_frames = self.settings.segment_frames();
        for start in (0..frame_count).step_by(segment_frames) {
            let end = (start + segment_frames).min(frame_count);
            let midpoint = start + (end - start) / 2;
            let vector = self
                .engine
                .compute(&position_at(midpoint as f64 / frame_count as f64));
            self.render_segment(
                &mut buffer,
                &vector,
                start..end,
                amplitude,
                &cycles,
                &frequencies,
                &window,
            );
        }
        buffer
    }

    #[allow(clippy::too_many_arguments)]
    fn render_segment(
        &self,
        buffer: &mut SampleBuffer,
        vector: &GainDelayVector,
        frames: core::ops::Range<usize>,
        amplitude: f64,
        cycles: &[f64],
        frequencies: &[f64],
        window: &FadeWindow,
    ) {
        for (speaker, gain, delay) in vector.active(ACTIVE_GAIN_THRESHOLD) {
            let channel = self.speaker_channels[speaker];
            for n in frames.clone() {
                let cycle = if delay != 0.0 {
                    cycles[n] - frequencies[n] * delay
                } else {
                    cycles[n]
                };
                let value = (TAU * cycle.fract()).sin();
                buffer.add(n, channel, amplitude * gain * value * window.gain(n));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        layout::{default_grid, Speaker, SpeakerLayout},
        spatial::{ItdIldParams, MethodKind, SpatializationMethod},
        types::SampleRate,
    };
    use float_cmp::approx_eq;
    use more_asserts::{assert_gt, assert_le, assert_lt};

    fn pair() -> SpeakerLayout {
        SpeakerLayout::new_with(
            "pair",
            vec![
                Speaker::new_with("L", Position::new(-0.5, 0.0), 0),
                Speaker::new_with("R", Position::new(0.5, 0.0), 1),
            ],
        )
    }

    fn synthesizer(layout: SpeakerLayout, method: SpatializationMethod) -> BufferSynthesizer {
        BufferSynthesizer::new_with(
            SpatializationEngine::new_with(layout, method),
            SynthesisSettings::default(),
        )
    }

    #[test]
    fn tone_shape_and_envelope() {
        let s = synthesizer(pair(), MethodKind::NearestNeighbor.into());
        let buffer = s.tone(&Position::new(-0.4, 0.0), FrequencyHz(440.0), 0.5);
        assert_eq!(buffer.frame_count(), 4800);
        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.get(0, 0), 0.0);
        assert_eq!(buffer.peak(1), 0.0);
        assert_gt!(buffer.peak(0), 0.45);
        assert_le!(buffer.peak(0), 0.5);
    }

    #[test]
    fn itd_ild_centered_source_is_balanced() {
        let s = synthesizer(pair(), SpatializationMethod::ItdIld(ItdIldParams::default()));
        let buffer = s.tone(&Position::origin(), FrequencyHz(440.0), 0.5);
        assert!(approx_eq!(f64, buffer.peak(0), buffer.peak(1)));
        assert_gt!(buffer.peak(0), 0.0);
        for n in 0..buffer.frame_count() {
            assert_eq!(buffer.get(n, 0), buffer.get(n, 1));
        }
    }

    #[test]
    fn speakers_sharing_a_channel_sum() {
        let layout = SpeakerLayout::new_with(
            "shared",
            vec![
                Speaker::new_with("A", Position::new(-0.01, 0.0), 2),
                Speaker::new_with("B", Position::new(0.01, 0.0), 2),
            ],
        );
        let s = synthesizer(layout, MethodKind::DistancePan.into());
        let buffer = s.tone(&Position::origin(), FrequencyHz(100.0), 1.0);
        assert_eq!(buffer.channel_count(), 3);
        assert_eq!(buffer.peak(0), 0.0);
        // Two gains of 1/sqrt(2) in phase.
        assert_gt!(buffer.peak(2), 1.0);
    }

    #[test]
    fn continuous_frame_count_and_fades() {
        let s = synthesizer(default_grid(), SpatializationMethod::default());
        let buffer = s.frequency_ramp(
            &Position::origin(),
            FrequencyHz(100.0),
            FrequencyHz(300.0),
            Seconds(0.5),
            0.3,
        );
        assert_eq!(buffer.frame_count(), 24000);
        assert_eq!(buffer.channel_count(), 16);
        assert_eq!(buffer.frame_power(0), 0.0);
        assert_eq!(buffer.frame_power(23999), 0.0);

        let rate = SampleRate::default();
        let empty = s.circle(0.04, Seconds(0.0), FrequencyHz(220.0), 0.3);
        assert!(empty.is_empty());
        assert_eq!(s.silence(Seconds(0.25)).frame_count(), rate.frames_for(Seconds(0.25)));
    }

    #[test]
    fn phase_is_continuous_across_segments() {
        let layout = SpeakerLayout::new_with(
            "one",
            vec![Speaker::new_with("only", Position::origin(), 0)],
        );
        let s = synthesizer(layout, MethodKind::NearestNeighbor.into());
        let buffer = s.frequency_ramp(
            &Position::origin(),
            FrequencyHz(200.0),
            FrequencyHz(800.0),
            Seconds(1.0),
            1.0,
        );
        // Away from the fades, consecutive samples of a sine at most 800 Hz
        // can't differ by more than 2π·800/48000.
        let max_step = TAU * 800.0 / 48000.0 + 1e-9;
        let fade = s.settings().fade_frames();
        for n in fade + 1..buffer.frame_count() - fade {
            assert_lt!((buffer.get(n, 0) - buffer.get(n - 1, 0)).abs(), max_step);
        }
    }

    #[test]
    fn empty_layout_renders_nothing() {
        let s = synthesizer(SpeakerLayout::default(), SpatializationMethod::default());
        assert_eq!(s.channel_count(), 0);
        assert!(s.tone(&Position::origin(), FrequencyHz(440.0), 1.0).is_empty());
        assert!(s
            .circle(0.04, Seconds(1.0), FrequencyHz(220.0), 1.0)
            .is_empty());
    }
}
