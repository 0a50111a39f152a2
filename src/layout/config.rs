// Copyright (c) 2024 Mike Tsao

use super::{
    generators::{self, DEFAULT_GRID_SPACING},
    Speaker, SpeakerLayout,
};
use crate::{
    error::{Diagnostic, ParseError},
    spatial::{MethodKind, SpatializationEngine},
    types::Position,
    util::{parse_f64, parse_point, Directive, Line},
};
use std::{fmt::Write, path::Path};

/// A speaker layout plus the spatialization method it was configured with,
/// as read from the layout text format.
///
/// ```text
/// # comments start with a hash
/// config_name = bench_rig
/// method = vbap
/// SPEAKER FL -0.05,0.05 CHANNEL=0 DESCRIPTION="front left"
/// GRID SIZE=4 SPACING=0.04 OFFSET=0,0
/// CIRCLE COUNT=8 RADIUS=0.1
/// LINE COUNT=5 LENGTH=0.2 ANGLE=90
/// ```
///
/// GRID, CIRCLE, and LINE replace whatever speakers came before them.
/// `grid_size = n` regenerates the default grid at the current `spacing`.
#[derive(Clone, Debug)]
pub struct LayoutConfig {
    /// The speakers.
    pub layout: SpeakerLayout,
    /// The method named by `method = ...`.
    pub method: MethodKind,
    /// Lines that were skipped, and why.
    pub diagnostics: Vec<Diagnostic>,

    spacing: f64,
}
impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            layout: generators::default_grid(),
            method: MethodKind::default(),
            diagnostics: Vec::default(),
            spacing: DEFAULT_GRID_SPACING,
        }
    }
}
impl LayoutConfig {
    /// Parses layout text. Malformed lines are logged, recorded in
    /// `diagnostics`, and skipped. If no speakers survive, the default grid
    /// is used.
    pub fn parse(text: &str, name: &str) -> Self {
        let mut r = Self {
            layout: SpeakerLayout::new_with(name, Vec::default()),
            ..Default::default()
        };
        for (index, raw) in text.lines().enumerate() {
            let result = match Line::classify(raw) {
                Line::Blank => Ok(()),
                Line::Assignment { key, value } => r.apply_assignment(&key, &value),
                Line::Command(directive) => r.apply_command(&directive),
            };
            if let Err(error) = result {
                let diagnostic = Diagnostic {
                    line_number: index + 1,
                    line: raw.trim().to_string(),
                    error,
                };
                log::warn!("{name}: {diagnostic}");
                r.diagnostics.push(diagnostic);
            }
        }
        if r.layout.is_empty() {
            log::warn!("{name}: no speakers defined, using the default 4x4 grid");
            let name = r.layout.name().to_string();
            r.layout = generators::default_grid();
            r.layout.set_name(name);
        }
        r.layout.validate_and_log();
        r
    }

    /// Reads a layout file. The layout is named after the file unless the
    /// file sets `config_name`. A `.json` file holds a serialized
    /// [SpeakerLayout] and uses the default method.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("json")) {
            let layout: SpeakerLayout = serde_json::from_str(&text)?;
            layout.validate_and_log();
            return Ok(Self {
                layout,
                ..Default::default()
            });
        }
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self::parse(&text, &name))
    }

    /// Writes the layout in the same text format, one SPEAKER line per
    /// speaker.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, self.to_config_text())?;
        Ok(())
    }

    #[allow(missing_docs)]
    pub fn to_config_text(&self) -> String {
        let mut text = String::default();
        let _ = writeln!(text, "# Speaker layout: {}", self.layout.name());
        let _ = writeln!(text, "# Channels start at 0\n");
        let _ = writeln!(text, "config_name = {}", self.layout.name());
        let _ = writeln!(text, "method = {}\n", self.method);
        for s in self.layout.speakers() {
            let _ = write!(
                text,
                "SPEAKER {} {:.4},{:.4} CHANNEL={}",
                s.id, s.position.x, s.position.y, s.channel
            );
            if let Some(description) = &s.description {
                let _ = write!(text, " DESCRIPTION=\"{description}\"");
            }
            text.push('\n');
        }
        text
    }

    /// An engine for this layout using the configured method with default
    /// coefficients.
    pub fn engine(&self) -> SpatializationEngine {
        SpatializationEngine::new_with(self.layout.clone(), self.method.into())
    }

    fn apply_assignment(&mut self, key: &str, value: &str) -> Result<(), ParseError> {
        match key {
            "spacing" => self.spacing = parse_f64(key, value)?,
            "grid_size" => {
                let size = value
                    .parse::<usize>()
                    .map_err(|_| ParseError::InvalidNumber {
                        field: key.to_string(),
                        value: value.to_string(),
                    })?;
                self.replace_speakers(generators::grid(size, self.spacing, Position::origin()));
            }
            "method" => match MethodKind::parse(value) {
                Ok(method) => self.method = method,
                Err(e) => {
                    self.method = MethodKind::default();
                    return Err(e);
                }
            },
            "config_name" => self.layout.set_name(value),
            _ => return Err(ParseError::UnknownParameter(key.to_string())),
        }
        Ok(())
    }

    fn apply_command(&mut self, directive: &Directive) -> Result<(), ParseError> {
        match directive.command.as_str() {
            "SPEAKER" => {
                let id = directive.positional(0).ok_or_else(|| ParseError::MissingField {
                    command: directive.command.clone(),
                    field: "id".to_string(),
                })?;
                let position =
                    parse_point(directive.positional(1).ok_or_else(|| {
                        ParseError::MissingField {
                            command: directive.command.clone(),
                            field: "x,y".to_string(),
                        }
                    })?)?;
                let mut speaker =
                    Speaker::new_with(id, position, directive.required_count("CHANNEL")?);
                speaker.description = directive.text("DESCRIPTION").map(str::to_string);
                self.layout.push(speaker);
            }
            "GRID" => {
                let size = directive.required_count("SIZE")?;
                let spacing = directive.required_f64("SPACING")?;
                let offset = directive.optional_point("OFFSET")?.unwrap_or_else(Position::origin);
                self.spacing = spacing;
                self.replace_speakers(generators::grid(size, spacing, offset));
            }
            "CIRCLE" => {
                let count = directive.required_count("COUNT")?;
                let radius = directive.required_f64("RADIUS")?;
                let offset = directive.optional_point("OFFSET")?.unwrap_or_else(Position::origin);
                self.replace_speakers(generators::circle(count, radius, offset));
            }
            "LINE" => {
                let count = directive.required_count("COUNT")?;
                let length = directive.required_f64("LENGTH")?;
                let angle = directive.optional_f64("ANGLE")?.unwrap_or_default();
                let offset = directive.optional_point("OFFSET")?.unwrap_or_else(Position::origin);
                self.replace_speakers(generators::line(count, length, angle, offset));
            }
            other => return Err(ParseError::UnknownCommand(other.to_string())),
        }
        Ok(())
    }

    fn replace_speakers(&mut self, generated: SpeakerLayout) {
        log::debug!(
            "{}: generated {} speakers on channels 0-{}",
            generated.name(),
            generated.len(),
            generated.channel_count().saturating_sub(1)
        );
        self.layout.replace_speakers(generated.speakers().to_vec());
    }
}
