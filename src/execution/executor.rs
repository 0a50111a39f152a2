// Copyright (c) 2024 Mike Tsao

use super::{AudioSink, TelemetryEvent};
use crate::{
    error::{ExecutionError, SinkError},
    script::{Action, Script},
    synthesis::{circle_position, step_fraction, BufferSynthesizer},
    types::{FrequencyHz, Position, SampleBuffer, Seconds},
    util::{BoundedCrossbeamChannel, ExecutionSettings},
};
use crossbeam::channel::{Receiver, TrySendError};
use std::time::Instant;

/// What a run accomplished.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecutionSummary {
    /// Actions that ran to completion.
    pub actions_executed: usize,
    /// Unknown actions and stepped actions with no steps.
    pub actions_skipped: usize,
    /// Frames handed to the sink, including silence.
    pub frames_written: usize,
}

/// Sequences [Action]s, rendering each one and handing it to an
/// [AudioSink].
#[derive(Debug)]
pub struct ScriptExecutor {
    synthesizer: BufferSynthesizer,
    settings: ExecutionSettings,
    telemetry: BoundedCrossbeamChannel<TelemetryEvent>,

    current_position: Position,
    last_frequency: FrequencyHz,
}
impl ScriptExecutor {
    #[allow(missing_docs)]
    pub fn new_with(synthesizer: BufferSynthesizer, settings: ExecutionSettings) -> Self {
        let telemetry = BoundedCrossbeamChannel::new_with(settings.telemetry_queue_capacity.max(1));
        Self {
            synthesizer,
            settings,
            telemetry,
            current_position: Position::origin(),
            last_frequency: FrequencyHz::default(),
        }
    }

    #[allow(missing_docs)]
    pub fn synthesizer(&self) -> &BufferSynthesizer {
        &self.synthesizer
    }

    /// Where the source was left by the most recent action.
    pub fn current_position(&self) -> Position {
        self.current_position
    }

    #[allow(missing_docs)]
    pub fn last_frequency(&self) -> FrequencyHz {
        self.last_frequency
    }

    /// The receiving end of the telemetry queue. Events that don't fit are
    /// dropped, so an observer that never reads costs nothing.
    pub fn telemetry_receiver(&self) -> Receiver<TelemetryEvent> {
        self.telemetry.receiver.clone()
    }

    /// Runs the script's actions with its overrides in effect. The overrides
    /// last only for this run.
    pub fn execute_script(
        &mut self,
        script: &Script,
        sink: &mut dyn AudioSink,
    ) -> Result<ExecutionSummary, ExecutionError> {
        let overridden = script.overrides.apply(&self.synthesizer);
        let original = std::mem::replace(&mut self.synthesizer, overridden);
        let result = self.execute(&script.actions, sink);
        self.synthesizer = original;
        result
    }

    /// Runs each action in order. Stops at the first sink failure; anything
    /// an offline sink already holds stays valid.
    pub fn execute(
        &mut self,
        actions: &[Action],
        sink: &mut dyn AudioSink,
    ) -> Result<ExecutionSummary, ExecutionError> {
        // Events nobody read during an earlier run are stale now.
        while self.telemetry.receiver.try_recv().is_ok() {}

        let mut summary = ExecutionSummary::default();
        for (index, action) in actions.iter().enumerate() {
            log::debug!("action {index}: {}", action.name());
            match self.execute_action(action, sink) {
                Ok(Some(frames)) => {
                    summary.actions_executed += 1;
                    summary.frames_written += frames;
                }
                Ok(None) => summary.actions_skipped += 1,
                Err(StepError::Sink(source)) => {
                    return Err(ExecutionError::Sink {
                        action_index: index,
                        source,
                    })
                }
                Err(StepError::WriterPanicked) => return Err(ExecutionError::WriterPanicked),
            }
        }
        log::info!(
            "executed {} actions ({} skipped), {} frames",
            summary.actions_executed,
            summary.actions_skipped,
            summary.frames_written
        );
        Ok(summary)
    }

    // Returns the number of frames written, or None if the action was
    // skipped.
    fn execute_action(
        &mut self,
        action: &Action,
        sink: &mut dyn AudioSink,
    ) -> Result<Option<usize>, StepError> {
        let frames = match action {
            Action::Wait { duration } => self.pause(sink, *duration)?,
            Action::Jump { position } => {
                self.current_position = *position;
                self.emit(*position, self.last_frequency, 0.0, action.name());
                0
            }
            Action::Sound {
                position,
                frequency,
                amplitude,
            } => self.burst(sink, *position, *frequency, *amplitude, action.name())?,
            Action::Arc {
                path,
                duration,
                steps,
                frequency,
                amplitude,
            } => {
                let Some(steps) = Self::checked_steps(*steps, action) else {
                    return Ok(None);
                };
                self.stepped(sink, *duration, steps, action.name(), |t| {
                    (path.position_at(t), *frequency, *amplitude)
                })?
            }
            Action::FreqRamp {
                position,
                start_frequency,
                end_frequency,
                duration,
                steps,
                amplitude,
            } => {
                let Some(steps) = Self::checked_steps(*steps, action) else {
                    return Ok(None);
                };
                self.stepped(sink, *duration, steps, action.name(), |t| {
                    (
                        *position,
                        FrequencyHz::lerp(*start_frequency, *end_frequency, t),
                        *amplitude,
                    )
                })?
            }
            Action::CircleSweep {
                radius,
                duration,
                steps,
                frequency,
                amplitude,
            } => {
                let Some(steps) = Self::checked_steps(*steps, action) else {
                    return Ok(None);
                };
                let buffer = self
                    .synthesizer
                    .circle(*radius, *duration, *frequency, *amplitude);
                let updates = steps.min(self.settings.telemetry_update_cap);
                self.continuous(sink, buffer, *duration, updates, action.name(), |t| {
                    (circle_position(*radius, t), *frequency, *amplitude)
                })?
            }
            Action::FreqRampSmooth {
                position,
                start_frequency,
                end_frequency,
                duration,
                amplitude,
            } => {
                let buffer = self.synthesizer.frequency_ramp(
                    position,
                    *start_frequency,
                    *end_frequency,
                    *duration,
                    *amplitude,
                );
                let updates = self.settings.telemetry_update_cap;
                self.continuous(sink, buffer, *duration, updates, action.name(), |t| {
                    (
                        *position,
                        FrequencyHz::lerp(*start_frequency, *end_frequency, t),
                        *amplitude,
                    )
                })?
            }
            Action::PathFreqRamp {
                path,
                start_frequency,
                end_frequency,
                duration,
                steps,
                amplitude,
            } => {
                if Self::checked_steps(*steps, action).is_none() {
                    return Ok(None);
                }
                let buffer = self.synthesizer.path_frequency_ramp(
                    path,
                    *start_frequency,
                    *end_frequency,
                    *duration,
                    *amplitude,
                );
                let updates = (buffer.frame_count() / 10).min(self.settings.telemetry_update_cap);
                self.continuous(sink, buffer, *duration, updates, action.name(), |t| {
                    (
                        path.position_at(t),
                        FrequencyHz::lerp(*start_frequency, *end_frequency, t),
                        *amplitude,
                    )
                })?
            }
            Action::Unknown => {
                log::warn!("skipping unrecognized action");
                return Ok(None);
            }
        };
        Ok(Some(frames))
    }

    fn checked_steps(steps: i64, action: &Action) -> Option<usize> {
        match usize::try_from(steps) {
            Ok(steps) if steps > 0 => Some(steps),
            _ => {
                log::warn!("{} with steps={steps} does nothing", action.name());
                None
            }
        }
    }

    fn emit(&self, position: Position, frequency: FrequencyHz, amplitude: f64, source: &'static str) {
        let event = TelemetryEvent {
            position,
            frequency,
            amplitude,
            source,
        };
        if let Err(TrySendError::Full(_)) = self.telemetry.sender.try_send(event) {
            log::trace!("telemetry queue is full; dropping an event");
        }
    }

    fn write(&self, sink: &mut dyn AudioSink, buffer: &SampleBuffer) -> Result<usize, StepError> {
        sink.write(buffer)?;
        Ok(buffer.frame_count())
    }

    // Realtime sinks sleep; offline sinks get silence.
    fn pause(&self, sink: &mut dyn AudioSink, duration: Seconds) -> Result<usize, StepError> {
        if sink.is_realtime() {
            std::thread::sleep(duration.to_duration());
            Ok(0)
        } else if duration.is_positive() {
            self.write(sink, &self.synthesizer.silence(duration))
        } else {
            Ok(0)
        }
    }

    fn burst(
        &mut self,
        sink: &mut dyn AudioSink,
        position: Position,
        frequency: FrequencyHz,
        amplitude: f64,
        source: &'static str,
    ) -> Result<usize, StepError> {
        self.current_position = position;
        self.last_frequency = frequency;
        self.emit(position, frequency, amplitude, source);
        let buffer = self.synthesizer.tone(&position, frequency, amplitude);
        self.write(sink, &buffer)
    }

    // `steps` bursts with a pause between each pair, so that the whole thing
    // spans roughly `duration`.
    fn stepped(
        &mut self,
        sink: &mut dyn AudioSink,
        duration: Seconds,
        steps: usize,
        source: &'static str,
        at: impl Fn(f64) -> (Position, FrequencyHz, f64),
    ) -> Result<usize, StepError> {
        let gap = Seconds(
            ((duration / steps).0 - self.synthesizer.settings().tone_duration.0).max(0.0),
        );
        let mut frames = 0;
        for i in 0..steps {
            let (position, frequency, amplitude) = at(step_fraction(i, steps));
            frames += self.burst(sink, position, frequency, amplitude, source)?;
            if i + 1 < steps {
                frames += self.pause(sink, gap)?;
            }
        }
        Ok(frames)
    }

    // Plays a prerendered buffer. Realtime sinks write from a second thread
    // while this one reports progress against the wall clock.
    fn continuous(
        &mut self,
        sink: &mut dyn AudioSink,
        buffer: SampleBuffer,
        duration: Seconds,
        updates: usize,
        source: &'static str,
        at: impl Fn(f64) -> (Position, FrequencyHz, f64),
    ) -> Result<usize, StepError> {
        let frames = if sink.is_realtime() {
            let updates = updates.max(1);
            let interval = (duration / updates).to_duration();
            let writer_sink = &mut *sink;
            let buffer = &buffer;
            let result = std::thread::scope(|scope| {
                let writer = scope.spawn(move || writer_sink.write(buffer));
                let start = Instant::now();
                for _ in 0..updates {
                    let progress = if duration.is_positive() {
                        (start.elapsed().as_secs_f64() / duration.0).min(1.0)
                    } else {
                        1.0
                    };
                    let (position, frequency, amplitude) = at(progress);
                    self.emit(position, frequency, amplitude, source);
                    std::thread::sleep(interval);
                }
                writer.join()
            });
            match result {
                Ok(written) => written?,
                Err(_) => return Err(StepError::WriterPanicked),
            }
            buffer.frame_count()
        } else {
            self.write(sink, &buffer)?
        };
        let (position, frequency, _) = at(1.0);
        self.current_position = position;
        self.last_frequency = frequency;
        Ok(frames)
    }
}

enum StepError {
    Sink(SinkError),
    WriterPanicked,
}
impl From<SinkError> for StepError {
    fn from(value: SinkError) -> Self {
        Self::Sink(value)
    }
}
