// Copyright (c) 2024 Mike Tsao

//! The timeline language. A [Script] is an ordered list of [Action]s plus a
//! few settings overrides, usually read from text with [Script::parse()].
//!
//! ```text
//! # one command per line
//! tone_duration = 0.08
//! JUMP 0.0,0.04
//! SOUND 0.02,0.02 FREQ=250 AMP=0.6
//! WAIT 0.5
//! ARC -0.06,0 0,0.06 0.06,0 DURATION=2 STEPS=12 FREQ=200 AMP=0.5 MODE=CURVED
//! CIRCLE_SMOOTH RADIUS=0.04 DURATION=4 STEPS=100 FREQ=220 AMP=0.3
//! FREQ_RAMP POS=0,0 START_FREQ=100 END_FREQ=400 DURATION=2 STEPS=8 AMP=0.5
//! FREQ_RAMP_SMOOTH POS=0,0 START_FREQ=100 END_FREQ=400 DURATION=2 AMP=0.5
//! PATH_FREQ_RAMP -0.06,0 0.06,0 START_FREQ=80 END_FREQ=300 DURATION=3 STEPS=30 AMP=0.5
//! ```

/// The most commonly used imports.
pub mod prelude {
    pub use super::{Action, Script, ScriptOverrides};
}

pub use {
    action::Action,
    parser::{Script, ScriptOverrides},
};

mod action;
mod parser;
