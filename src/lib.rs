// Copyright (c) 2024 Mike Tsao

#![deny(missing_docs, unused_imports, unused_variables)]
#![allow(rustdoc::private_intra_doc_links)]

//! Spatialiser renders a moving, pitch-changing virtual sound source on an
//! array of tactile or acoustic transducers.
//!
//! The pieces, from the bottom up:
//!
//! * A [SpeakerLayout](layout::SpeakerLayout) says where each transducer is
//! and which output channel drives it.
//! * A [SpatializationEngine](spatial::SpatializationEngine) turns a source
//! position into a gain and delay for every transducer, using one of several
//! [methods](spatial::SpatializationMethod).
//! * A [BufferSynthesizer](synthesis::BufferSynthesizer) renders tones,
//! sweeps, and glides into multi-channel
//! [SampleBuffer](types::SampleBuffer)s.
//! * A [ScriptExecutor](execution::ScriptExecutor) runs a
//! [Script](script::Script) against an [AudioSink](execution::AudioSink),
//! either a live device or an [OfflineRenderer](execution::OfflineRenderer)
//! whose result can be exported as a WAV file.
//!
//! ```
//! use spatialiser::prelude::*;
//!
//! let script = Script::parse("SOUND 0.02,0.0 FREQ=250 AMP=0.5\nWAIT 0.2");
//! let config = LayoutConfig::default();
//! let synthesizer = BufferSynthesizer::new_with(config.engine(), SynthesisSettings::default());
//! let mut sink = OfflineRenderer::new_with(synthesizer.channel_count());
//! let mut executor = ScriptExecutor::new_with(synthesizer, ExecutionSettings::default());
//! let summary = executor.execute_script(&script, &mut sink).unwrap();
//! assert_eq!(summary.actions_executed, 2);
//! assert_eq!(sink.buffer().channel_count(), 16);
//! ```

/// A collection of imports that are useful to users of this crate. `use
/// spatialiser::prelude::*;` for easier onboarding.
pub mod prelude {
    #[cfg(feature = "hound")]
    pub use super::export::{BufferExporter, ExportError};
    pub use super::{
        error::{Diagnostic, ExecutionError, ParseError, SinkError},
        execution::prelude::*,
        layout::prelude::*,
        script::prelude::*,
        spatial::prelude::*,
        synthesis::prelude::*,
        types::prelude::*,
        util::prelude::*,
    };
}

pub use version::app_version;

pub mod error;
pub mod execution;
#[cfg(feature = "hound")]
pub mod export;
pub mod layout;
pub mod script;
pub mod spatial;
pub mod synthesis;
pub mod types;
pub mod util;

mod version;
