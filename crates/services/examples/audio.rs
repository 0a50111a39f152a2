// Copyright (c) 2024 Mike Tsao

//! Sweeps a tone once around a ring of transducers on a live output device.

use clap::Parser;
use spatialiser::{
    layout::circle,
    prelude::*,
};
use spatialiser_services::prelude::*;

#[derive(clap::Parser, Debug, Default)]
#[clap(author, about, long_about = None)]
struct Args {
    /// The frequency to play
    #[clap(short = 'f', long, value_parser, default_value_t = 250.0)]
    frequency: f64,

    /// How many transducers are arranged in the ring
    #[clap(short = 'c', long, value_parser, default_value_t = 2)]
    channels: usize,

    /// Output device index or name
    #[clap(short = 'd', long, value_parser, default_value = "default")]
    device: String,

    /// Seconds for one revolution
    #[clap(short = 's', long, value_parser, default_value_t = 3.0)]
    seconds: f64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let layout = circle(args.channels, 0.05, Position::origin());
    let engine = SpatializationEngine::new_with(layout, SpatializationMethod::from(MethodKind::Vbap));
    let synthesizer = BufferSynthesizer::new_with(engine, SynthesisSettings::default());

    let selector: DeviceSelector = args.device.parse()?;
    let mut output = CpalAudioOutput::new_with(
        selector,
        synthesizer.channel_count(),
        synthesizer.settings().sample_rate(),
    );
    output.start()?;

    println!(
        "Sweeping {} around {} channels for {} seconds",
        FrequencyHz(args.frequency),
        args.channels,
        args.seconds
    );
    let buffer = synthesizer.circle(0.05, Seconds(args.seconds), FrequencyHz(args.frequency), 0.5);
    output.write(&buffer)?;
    output.stop();

    Ok(())
}
