// Copyright (c) 2024 Mike Tsao

use super::Action;
use crate::{
    error::{Diagnostic, ParseError},
    spatial::{SpatializationEngine, SpatializationMethod},
    synthesis::{BufferSynthesizer, PathMode, Trajectory},
    types::{FrequencyHz, Seconds},
    util::{parse_f64, parse_point, Directive, Line, SynthesisSettings},
};
use serde::{Deserialize, Serialize};
use std::{path::Path, str::FromStr};

/// Settings a script assigns with `key = value` lines. Unset fields leave
/// the session's configuration alone.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScriptOverrides {
    /// Scales ItdIld delays.
    pub itd_exaggeration: Option<f64>,
    /// Exponent of the ItdIld level difference.
    pub ild_exponent: Option<f64>,
    /// Length of each discrete burst.
    pub tone_duration: Option<Seconds>,
}
impl ScriptOverrides {
    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// The method with any overridden coefficients applied. Only ItdIld has
    /// coefficients that scripts can set.
    pub fn apply_to_method(&self, method: &SpatializationMethod) -> SpatializationMethod {
        match method {
            SpatializationMethod::ItdIld(params) => {
                let mut params = params.clone();
                if let Some(v) = self.itd_exaggeration {
                    params.itd_exaggeration = v;
                }
                if let Some(v) = self.ild_exponent {
                    params.ild_exponent = v;
                }
                SpatializationMethod::ItdIld(params)
            }
            _ => method.clone(),
        }
    }

    #[allow(missing_docs)]
    pub fn apply_to_settings(&self, settings: &SynthesisSettings) -> SynthesisSettings {
        let mut settings = settings.clone();
        if let Some(v) = self.tone_duration {
            settings.tone_duration = v;
        }
        settings
    }

    /// A new synthesizer with these overrides applied to both its engine and
    /// its settings.
    pub fn apply(&self, synthesizer: &BufferSynthesizer) -> BufferSynthesizer {
        if self.is_empty() {
            return synthesizer.clone();
        }
        let engine = synthesizer.engine();
        BufferSynthesizer::new_with(
            SpatializationEngine::new_with(
                engine.layout().clone(),
                self.apply_to_method(engine.method()),
            ),
            self.apply_to_settings(synthesizer.settings()),
        )
    }

    fn assign(&mut self, key: &str, value: &str) -> Result<(), ParseError> {
        match key {
            "itd_exaggeration" => self.itd_exaggeration = Some(parse_f64(key, value)?),
            "ild_exponent" => self.ild_exponent = Some(parse_f64(key, value)?),
            "tone_duration" => self.tone_duration = Some(Seconds(parse_f64(key, value)?)),
            _ => return Err(ParseError::UnknownParameter(key.to_string())),
        }
        Ok(())
    }
}

/// A parsed script.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Script {
    /// The timeline, in order.
    pub actions: Vec<Action>,
    #[allow(missing_docs)]
    pub overrides: ScriptOverrides,
    /// Lines that were skipped, and why.
    pub diagnostics: Vec<Diagnostic>,
}
impl Script {
    /// Parses script text. Bad lines are logged, recorded, and skipped; the
    /// rest of the script is still usable.
    pub fn parse(text: &str) -> Self {
        let mut r = Self::default();
        for (index, raw) in text.lines().enumerate() {
            let result = match Line::classify(raw) {
                Line::Blank => Ok(()),
                Line::Assignment { key, value } => r.overrides.assign(&key, &value),
                Line::Command(directive) => {
                    parse_action(&directive).map(|action| r.actions.push(action))
                }
            };
            if let Err(error) = result {
                let diagnostic = Diagnostic {
                    line_number: index + 1,
                    line: raw.trim().to_string(),
                    error,
                };
                log::warn!("{diagnostic}");
                r.diagnostics.push(diagnostic);
            }
        }
        r
    }

    /// Reads a script file. A `.json` file holds a serialized list of
    /// [Action]s with no overrides.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("json")) {
            return Ok(Self {
                actions: serde_json::from_str(&text)?,
                ..Default::default()
            });
        }
        Ok(Self::parse(&text))
    }

    /// The sum of every action's nominal duration.
    pub fn nominal_duration(&self) -> Seconds {
        Seconds(
            self.actions
                .iter()
                .filter_map(Action::duration)
                .map(|d| d.0.max(0.0))
                .sum(),
        )
    }
}

fn parse_action(d: &Directive) -> Result<Action, ParseError> {
    let action = match d.command.as_str() {
        "WAIT" => Action::Wait {
            duration: Seconds(parse_f64("duration", positional(d, 0, "duration")?)?),
        },
        "JUMP" => Action::Jump {
            position: parse_point(positional(d, 0, "x,y")?)?,
        },
        "SOUND" => Action::Sound {
            position: parse_point(positional(d, 0, "x,y")?)?,
            frequency: FrequencyHz(d.required_f64("FREQ")?),
            amplitude: d.required_f64("AMP")?,
        },
        "ARC" => Action::Arc {
            path: path(d)?,
            duration: Seconds(d.required_f64("DURATION")?),
            steps: d.required_i64("STEPS")?,
            frequency: FrequencyHz(d.required_f64("FREQ")?),
            amplitude: d.required_f64("AMP")?,
        },
        "CIRCLE_SMOOTH" => Action::CircleSweep {
            radius: d.required_f64("RADIUS")?,
            duration: Seconds(d.required_f64("DURATION")?),
            steps: d.required_i64("STEPS")?,
            frequency: FrequencyHz(d.required_f64("FREQ")?),
            amplitude: d.required_f64("AMP")?,
        },
        "FREQ_RAMP" => Action::FreqRamp {
            position: d.required_point("POS")?,
            start_frequency: FrequencyHz(d.required_f64("START_FREQ")?),
            end_frequency: FrequencyHz(d.required_f64("END_FREQ")?),
            duration: Seconds(d.required_f64("DURATION")?),
            steps: d.required_i64("STEPS")?,
            amplitude: d.required_f64("AMP")?,
        },
        "FREQ_RAMP_SMOOTH" => Action::FreqRampSmooth {
            position: d.required_point("POS")?,
            start_frequency: FrequencyHz(d.required_f64("START_FREQ")?),
            end_frequency: FrequencyHz(d.required_f64("END_FREQ")?),
            duration: Seconds(d.required_f64("DURATION")?),
            amplitude: d.required_f64("AMP")?,
        },
        "PATH_FREQ_RAMP" => Action::PathFreqRamp {
            path: path(d)?,
            start_frequency: FrequencyHz(d.required_f64("START_FREQ")?),
            end_frequency: FrequencyHz(d.required_f64("END_FREQ")?),
            duration: Seconds(d.required_f64("DURATION")?),
            steps: d.required_i64("STEPS")?,
            amplitude: d.required_f64("AMP")?,
        },
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };
    Ok(action)
}

fn positional<'a>(d: &'a Directive, index: usize, field: &str) -> Result<&'a str, ParseError> {
    d.positional(index).ok_or_else(|| ParseError::MissingField {
        command: d.command.clone(),
        field: field.to_string(),
    })
}

fn path(d: &Directive) -> Result<Trajectory, ParseError> {
    let points = d.positional_points()?;
    if points.len() > 3 {
        log::warn!(
            "{} accepts at most 3 points, using the first 3 of {}",
            d.command,
            points.len()
        );
    }
    // Anything but CURVED is a straight path.
    let mode = match d.text("MODE") {
        Some(mode) => PathMode::from_str(mode).unwrap_or_else(|_| {
            log::warn!("{}: unknown MODE={mode}, using a straight path", d.command);
            PathMode::Straight
        }),
        None => PathMode::default(),
    };
    Trajectory::from_points(&points, mode).ok_or_else(|| ParseError::TooFewPoints {
        command: d.command.clone(),
        found: points.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        layout::default_grid,
        spatial::{ItdIldParams, MethodKind},
        types::Position,
    };

    #[test]
    fn every_command() {
        let script = Script::parse(
            r#"
            # a bit of everything
            wait 0.5
            JUMP 0.0,0.04
            SOUND 0.02,-0.02 FREQ=250 AMP=0.6
            ARC -0.06,0 0,0.06 0.06,0 DURATION=2 STEPS=12 FREQ=200 AMP=0.5 MODE=curved
            CIRCLE_SMOOTH RADIUS=0.04 DURATION=4 STEPS=100 FREQ=220 AMP=0.3
            FREQ_RAMP POS=0,0 START_FREQ=100 END_FREQ=400 DURATION=2 STEPS=8 AMP=0.5
            FREQ_RAMP_SMOOTH POS=0.01,0 START_FREQ=100 END_FREQ=400 DURATION=2 AMP=0.5
            PATH_FREQ_RAMP -0.06,0 0.06,0 START_FREQ=80 END_FREQ=300 DURATION=3 STEPS=30 AMP=0.5
            "#,
        );
        assert!(script.diagnostics.is_empty(), "{:?}", script.diagnostics);
        let names: Vec<_> = script.actions.iter().map(Action::name).collect();
        assert_eq!(
            names,
            vec![
                "wait",
                "jump",
                "sound",
                "arc",
                "circle_sweep",
                "freq_ramp",
                "freq_ramp_smooth",
                "path_freq_ramp"
            ]
        );
        assert_eq!(
            script.actions[2],
            Action::Sound {
                position: Position::new(0.02, -0.02),
                frequency: FrequencyHz(250.0),
                amplitude: 0.6
            }
        );
        match &script.actions[3] {
            Action::Arc { path, steps, .. } => {
                assert!(matches!(path, Trajectory::Quadratic { .. }));
                assert_eq!(*steps, 12);
            }
            other => panic!("unexpected {other:?}"),
        }
        match &script.actions[7] {
            Action::PathFreqRamp { path, .. } => {
                assert_eq!(path.end(), Position::new(0.06, 0.0));
                assert!(matches!(path, Trajectory::Linear { .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(script.nominal_duration(), Seconds(13.5));
    }

    #[test]
    fn extra_points_are_dropped() {
        let script =
            Script::parse("ARC 0,0 1,1 2,0 3,3 DURATION=1 STEPS=3 FREQ=100 AMP=1 MODE=CURVED");
        match &script.actions[0] {
            Action::Arc { path, .. } => assert_eq!(path.end(), Position::new(2.0, 0.0)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_modes_mean_straight() {
        let script = Script::parse(
            "ARC 0,0 0.5,1 1,0 DURATION=1 STEPS=3 FREQ=100 AMP=1 MODE=LINEAR\n\
             PATH_FREQ_RAMP 0,0 0.5,1 1,0 START_FREQ=100 END_FREQ=200 DURATION=1 STEPS=3 AMP=1 MODE=wiggly",
        );
        assert!(script.diagnostics.is_empty());
        assert_eq!(script.actions.len(), 2);
        let straight = Trajectory::from_points(
            &[Position::new(0.0, 0.0), Position::new(1.0, 0.0)],
            PathMode::Straight,
        );
        match &script.actions[0] {
            Action::Arc { path, .. } => assert_eq!(Some(path.clone()), straight),
            other => panic!("unexpected {other:?}"),
        }
        match &script.actions[1] {
            Action::PathFreqRamp { path, .. } => assert_eq!(Some(path.clone()), straight),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn nonpositive_steps_survive_parsing() {
        let script = Script::parse("ARC 0,0 1,1 DURATION=1 STEPS=0 FREQ=100 AMP=1");
        assert!(matches!(script.actions[0], Action::Arc { steps: 0, .. }));
    }

    #[test]
    fn bad_lines_are_reported_and_skipped() {
        let script = Script::parse(
            "SOUND 0,0 FREQ=440\nJUMP 0;0\nARC 0,0 DURATION=1 STEPS=2 FREQ=1 AMP=1\nFLY 1\nvolume = 3\nWAIT 1\n",
        );
        assert_eq!(script.actions, vec![Action::Wait { duration: Seconds(1.0) }]);
        let errors: Vec<_> = script.diagnostics.iter().map(|d| d.error.clone()).collect();
        assert_eq!(
            errors,
            vec![
                ParseError::MissingField {
                    command: "SOUND".to_string(),
                    field: "AMP".to_string()
                },
                ParseError::InvalidCoordinates("0;0".to_string()),
                ParseError::TooFewPoints {
                    command: "ARC".to_string(),
                    found: 1
                },
                ParseError::UnknownCommand("FLY".to_string()),
                ParseError::UnknownParameter("volume".to_string()),
            ]
        );
        assert_eq!(script.diagnostics[3].line_number, 4);
    }

    #[test]
    fn overrides_reach_the_synthesizer() {
        let script = Script::parse("itd_exaggeration = 3\nILD_EXPONENT = 2\ntone_duration = 0.25\n");
        assert!(script.actions.is_empty());
        assert_eq!(script.overrides.tone_duration, Some(Seconds(0.25)));

        let synthesizer = BufferSynthesizer::new_with(
            SpatializationEngine::new_with(default_grid(), MethodKind::ItdIld.into()),
            SynthesisSettings::default(),
        );
        let tuned = script.overrides.apply(&synthesizer);
        assert_eq!(tuned.settings().tone_duration, Seconds(0.25));
        assert_eq!(
            tuned.engine().method(),
            &SpatializationMethod::ItdIld(ItdIldParams {
                itd_exaggeration: 3.0,
                ild_exponent: 2.0,
                ..Default::default()
            })
        );
        assert_eq!(tuned.engine().layout(), synthesizer.engine().layout());

        // Other methods ignore the ItdIld coefficients.
        let vbap = script.overrides.apply_to_method(&SpatializationMethod::Vbap);
        assert_eq!(vbap, SpatializationMethod::Vbap);
    }
}
