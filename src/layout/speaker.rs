// Copyright (c) 2024 Mike Tsao

use crate::types::{Position, PositionExt};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};
use thiserror::Error;

/// One transducer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Speaker {
    /// A short name, unique within a layout by convention only.
    pub id: String,
    /// Where the transducer sits, in meters.
    pub position: Position,
    /// The zero-based output channel that drives it.
    pub channel: usize,
    /// Free-form notes carried through load and save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
impl Speaker {
    #[allow(missing_docs)]
    pub fn new_with(id: impl Into<String>, position: Position, channel: usize) -> Self {
        Self {
            id: id.into(),
            position,
            channel,
            description: None,
        }
    }

    #[allow(missing_docs)]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Something questionable about a layout. None of these stop a layout from
/// being used.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum LayoutWarning {
    /// The layout has no speakers, so everything it renders is silent.
    #[error("layout has no speakers")]
    Empty,
    /// More than one speaker shares a channel. Their signals will sum.
    #[error("channel {channel} is assigned to {} speakers ({})", .ids.len(), .ids.join(", "))]
    DuplicateChannel {
        #[allow(missing_docs)]
        channel: usize,
        #[allow(missing_docs)]
        ids: Vec<String>,
    },
    /// Channels below the highest assigned one that no speaker uses. They
    /// will carry silence.
    #[error("channels {0:?} have no speaker")]
    MissingChannels(Vec<usize>),
}

/// An ordered collection of [Speaker]s. The order matters: every
/// [GainDelayVector](crate::spatial::GainDelayVector) is indexed the same way.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SpeakerLayout {
    name: String,
    speakers: Vec<Speaker>,
}
impl SpeakerLayout {
    #[allow(missing_docs)]
    pub fn new_with(name: impl Into<String>, speakers: Vec<Speaker>) -> Self {
        Self {
            name: name.into(),
            speakers,
        }
    }

    #[allow(missing_docs)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[allow(missing_docs)]
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[allow(missing_docs)]
    pub fn speakers(&self) -> &[Speaker] {
        &self.speakers
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.speakers.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.speakers.is_empty()
    }

    /// Adds a speaker after the existing ones.
    pub fn push(&mut self, speaker: Speaker) {
        self.speakers.push(speaker);
    }

    /// Replaces every speaker, keeping the name.
    pub fn replace_speakers(&mut self, speakers: Vec<Speaker>) {
        self.speakers = speakers;
    }

    /// Speaker positions in layout order.
    pub fn positions(&self) -> Vec<Position> {
        self.speakers.iter().map(|s| s.position).collect()
    }

    /// One more than the highest channel index, or zero for an empty layout.
    pub fn channel_count(&self) -> usize {
        self.speakers
            .iter()
            .map(|s| s.channel + 1)
            .max()
            .unwrap_or_default()
    }

    /// Which speakers each channel drives.
    pub fn channel_map(&self) -> BTreeMap<usize, Vec<&Speaker>> {
        let mut map: BTreeMap<usize, Vec<&Speaker>> = BTreeMap::default();
        for speaker in self.speakers.iter() {
            map.entry(speaker.channel).or_default().push(speaker);
        }
        map
    }

    /// The width and height of the smallest rectangle holding every speaker.
    pub fn extent(&self) -> (f64, f64) {
        let Some(first) = self.speakers.first() else {
            return (0.0, 0.0);
        };
        let (mut min, mut max) = (first.position, first.position);
        for s in self.speakers.iter() {
            min = Position::new(min.x.min(s.position.x), min.y.min(s.position.y));
            max = Position::new(max.x.max(s.position.x), max.y.max(s.position.y));
        }
        (max.x - min.x, max.y - min.y)
    }

    /// The speaker closest to `position`, if any.
    pub fn nearest(&self, position: &Position) -> Option<&Speaker> {
        self.speakers.iter().min_by(|a, b| {
            a.position
                .distance_to(position)
                .total_cmp(&b.position.distance_to(position))
        })
    }

    /// Checks channel assignments.
    pub fn validate(&self) -> Vec<LayoutWarning> {
        if self.speakers.is_empty() {
            return vec![LayoutWarning::Empty];
        }
        let map = self.channel_map();
        let mut warnings: Vec<LayoutWarning> = map
            .iter()
            .filter(|(_, speakers)| speakers.len() > 1)
            .map(|(channel, speakers)| LayoutWarning::DuplicateChannel {
                channel: *channel,
                ids: speakers.iter().map(|s| s.id.clone()).collect(),
            })
            .collect();
        let missing: Vec<usize> = (0..self.channel_count())
            .filter(|c| !map.contains_key(c))
            .collect();
        if !missing.is_empty() {
            warnings.push(LayoutWarning::MissingChannels(missing));
        }
        warnings
    }

    /// [SpeakerLayout::validate()], logging each warning.
    pub fn validate_and_log(&self) -> Vec<LayoutWarning> {
        let warnings = self.validate();
        for warning in warnings.iter() {
            log::warn!("{}: {warning}", self.name);
        }
        warnings
    }
}
impl fmt::Display for SpeakerLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.extent();
        writeln!(f, "Layout: {}", self.name)?;
        writeln!(
            f,
            "Speakers: {}, channels: {}, coverage: {:.1}mm x {:.1}mm",
            self.speakers.len(),
            self.channel_count(),
            width * 1000.0,
            height * 1000.0
        )?;
        for s in self.speakers.iter() {
            write!(
                f,
                "  {}: ({:6.1}, {:6.1})mm -> CH{}",
                s.id,
                s.position.x * 1000.0,
                s.position.y * 1000.0,
                s.channel
            )?;
            if let Some(description) = &s.description {
                write!(f, " ({description})")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_speakers() -> SpeakerLayout {
        SpeakerLayout::new_with(
            "test",
            vec![
                Speaker::new_with("A", Position::new(-1.0, 0.0), 0),
                Speaker::new_with("B", Position::new(1.0, 0.0), 3),
                Speaker::new_with("C", Position::new(0.0, 2.0), 3).with_description("top"),
            ],
        )
    }

    #[test]
    fn channel_count_is_max_plus_one() {
        assert_eq!(SpeakerLayout::default().channel_count(), 0);
        assert_eq!(three_speakers().channel_count(), 4);
    }

    #[test]
    fn validation_reports_duplicates_and_gaps() {
        assert_eq!(SpeakerLayout::default().validate(), vec![LayoutWarning::Empty]);
        let warnings = three_speakers().validate();
        assert_eq!(
            warnings,
            vec![
                LayoutWarning::DuplicateChannel {
                    channel: 3,
                    ids: vec!["B".to_string(), "C".to_string()]
                },
                LayoutWarning::MissingChannels(vec![1, 2]),
            ]
        );
        assert_eq!(
            warnings[0].to_string(),
            "channel 3 is assigned to 2 speakers (B, C)"
        );
    }

    #[test]
    fn geometry_helpers() {
        let layout = three_speakers();
        assert_eq!(layout.extent(), (2.0, 2.0));
        assert_eq!(layout.nearest(&Position::new(0.9, 0.1)).unwrap().id, "B");
        assert_eq!(layout.channel_map()[&3].len(), 2);
        assert!(layout.to_string().contains("C: (   0.0, 2000.0)mm -> CH3 (top)"));
    }

    #[test]
    fn serde_round_trip() {
        let layout = three_speakers();
        let json = serde_json::to_string(&layout).unwrap();
        let back: SpeakerLayout = serde_json::from_str(&json).unwrap();
        assert_eq!(back, layout);
    }
}
