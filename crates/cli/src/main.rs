// Copyright (c) 2024 Mike Tsao

//! Plays or renders spatialiser scripts from the command line.

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use spatialiser::prelude::*;
use spatialiser_services::prelude::*;
use std::path::{Path, PathBuf};

/// The program's command-line arguments.
#[derive(clap::Parser, Debug)]
#[clap(author, about, long_about = None)]
struct Args {
    /// Print version and exit
    #[clap(short = 'v', long, value_parser)]
    version: bool,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a script on an output device
    Play {
        script: PathBuf,

        #[clap(flatten)]
        options: RenderOptions,

        /// Output device index or name
        #[clap(short = 'd', long, default_value = "default")]
        device: String,
    },
    /// Render a script to a WAV file
    Render {
        script: PathBuf,
        output: PathBuf,

        #[clap(flatten)]
        options: RenderOptions,
    },
    /// Print a layout and its channel map
    Layout {
        /// Layout file; the default 4x4 grid if omitted
        #[clap(short = 'l', long)]
        layout: Option<PathBuf>,
    },
    /// List output devices
    Devices,
}

#[derive(clap::Args, Debug)]
struct RenderOptions {
    /// Layout file; the default 4x4 grid if omitted
    #[clap(short = 'l', long)]
    layout: Option<PathBuf>,

    /// Spatialization method, overriding the layout's
    #[clap(short = 'm', long)]
    method: Option<String>,

    /// Tactile grid coefficient as NAME=VALUE; may be repeated
    #[clap(long, value_parser = parse_name_value)]
    tactile: Vec<(String, String)>,

    /// Output sample rate in Hz
    #[clap(long)]
    sample_rate: Option<usize>,

    /// Length of one discrete burst, in seconds
    #[clap(long)]
    tone_duration: Option<f64>,

    /// Fade length at each end of a buffer, in seconds
    #[clap(long)]
    fade: Option<f64>,

    /// Log telemetry events at debug level
    #[clap(long)]
    telemetry: bool,
}
impl RenderOptions {
    fn synthesizer(&self) -> anyhow::Result<BufferSynthesizer> {
        let config = load_layout(self.layout.as_deref())?;
        let kind = match &self.method {
            Some(name) => MethodKind::parse(name)?,
            None => config.method,
        };
        let mut method = SpatializationMethod::from(kind);
        if !self.tactile.is_empty() {
            let SpatializationMethod::TactileGrid(params) = &mut method else {
                return Err(anyhow!("--tactile applies only to the tactile_grid method"));
            };
            for (name, value) in &self.tactile {
                params.set_by_name(name, value)?;
            }
        }

        let mut settings = SynthesisSettings::default();
        if let Some(rate) = self.sample_rate {
            settings.sample_rate = SampleRate::new(rate);
        }
        if let Some(seconds) = self.tone_duration {
            settings.tone_duration = Seconds(seconds);
        }
        if let Some(seconds) = self.fade {
            settings.fade_duration = Seconds(seconds);
        }

        log::info!(
            "layout {} with {} speakers on {} channels, method {}",
            config.layout.name(),
            config.layout.len(),
            config.layout.channel_count(),
            kind
        );
        Ok(BufferSynthesizer::new_with(
            SpatializationEngine::new_with(config.layout, method),
            settings,
        ))
    }

    /// Runs the script, logging telemetry on a side thread if asked.
    fn execute(
        &self,
        synthesizer: BufferSynthesizer,
        script: &Script,
        sink: &mut dyn AudioSink,
    ) -> anyhow::Result<ExecutionSummary> {
        let mut executor = ScriptExecutor::new_with(synthesizer, ExecutionSettings::default());
        let observer = self.telemetry.then(|| {
            let receiver = executor.telemetry_receiver();
            std::thread::spawn(move || {
                for event in receiver.iter() {
                    log::debug!(
                        "{}: ({:.4}, {:.4}) {} amp {:.2}",
                        event.source,
                        event.position.x,
                        event.position.y,
                        event.frequency,
                        event.amplitude
                    );
                }
            })
        });
        let result = executor.execute_script(script, sink);

        // The observer exits once the executor's sender is gone.
        drop(executor);
        if let Some(observer) = observer {
            let _ = observer.join();
        }
        Ok(result?)
    }
}

fn parse_name_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .ok_or_else(|| format!("`{s}` is not of the form NAME=VALUE"))
}

fn load_layout(path: Option<&Path>) -> anyhow::Result<LayoutConfig> {
    match path {
        Some(path) => LayoutConfig::load(path)
            .with_context(|| format!("couldn't read layout {}", path.display())),
        None => Ok(LayoutConfig::default()),
    }
}

fn load_script(path: &Path) -> anyhow::Result<Script> {
    let script =
        Script::load(path).with_context(|| format!("couldn't read script {}", path.display()))?;
    if !script.diagnostics.is_empty() {
        eprintln!(
            "{}: skipped {} malformed line(s)",
            path.display(),
            script.diagnostics.len()
        );
    }
    log::info!(
        "{}: {} actions, nominally {}",
        path.display(),
        script.actions.len(),
        script.nominal_duration()
    );
    Ok(script)
}

fn play(script: &Path, options: &RenderOptions, device: &str) -> anyhow::Result<()> {
    let script = load_script(script)?;
    let synthesizer = options.synthesizer()?;
    let selector: DeviceSelector = device.parse()?;
    let mut output = CpalAudioOutput::new_with(
        selector,
        synthesizer.channel_count(),
        synthesizer.settings().sample_rate(),
    );
    output.start()?;
    let summary = options.execute(synthesizer, &script, &mut output)?;
    output.stop();
    println!(
        "Played {} actions ({} skipped)",
        summary.actions_executed, summary.actions_skipped
    );
    Ok(())
}

fn render(script: &Path, wav: &Path, options: &RenderOptions) -> anyhow::Result<()> {
    let script = load_script(script)?;
    let synthesizer = options.synthesizer()?;
    let sample_rate = synthesizer.settings().sample_rate();
    let mut renderer = OfflineRenderer::new_with(synthesizer.channel_count());
    let summary = options.execute(synthesizer, &script, &mut renderer)?;
    let report = BufferExporter::export_to_wav(renderer.buffer(), sample_rate, wav)?;
    println!(
        "Rendered {} actions ({} skipped) to {}: {} frames, {} channels, peak {:.3}",
        summary.actions_executed,
        summary.actions_skipped,
        wav.display(),
        report.frame_count,
        report.channel_count,
        report.peak
    );
    Ok(())
}

fn show_layout(path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_layout(path)?;
    print!("{}", config.layout);
    println!("method: {}", config.method);
    println!("channel map:");
    for (channel, speakers) in config.layout.channel_map() {
        let ids: Vec<&str> = speakers.iter().map(|s| s.id.as_str()).collect();
        println!("  {channel:>2}: {}", ids.join(", "));
    }
    for warning in config.layout.validate() {
        println!("warning: {warning}");
    }
    Ok(())
}

fn list_devices() -> anyhow::Result<()> {
    for device in list_output_devices()? {
        let rate = device
            .default_sample_rate
            .map(|r| r.to_string())
            .unwrap_or_else(|| "?".to_string());
        println!(
            "{}{:>3}: {} ({} channels, {})",
            if device.is_default { "*" } else { " " },
            device.index,
            device.name,
            device.max_channels,
            rate
        );
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.version {
        eprintln!("{}", spatialiser::app_version());
        return Ok(());
    }

    match args.command {
        Some(Command::Play {
            script,
            options,
            device,
        }) => play(&script, &options, &device),
        Some(Command::Render {
            script,
            output,
            options,
        }) => render(&script, &output, &options),
        Some(Command::Layout { layout }) => show_layout(layout.as_deref()),
        Some(Command::Devices) => list_devices(),
        None => Err(anyhow!("no command given; try --help")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_value_pairs() {
        assert_eq!(
            parse_name_value("gaussian_sigma = 0.02"),
            Ok(("gaussian_sigma".to_string(), "0.02".to_string()))
        );
        assert!(parse_name_value("gaussian_sigma").is_err());
    }

    #[test]
    fn tactile_flags_need_the_tactile_method() {
        let args = Args::parse_from([
            "spatialiser",
            "render",
            "in.txt",
            "out.wav",
            "--method",
            "vbap",
            "--tactile",
            "distance_power=2",
        ]);
        let Some(Command::Render { options, .. }) = args.command else {
            panic!("expected render");
        };
        assert!(options.synthesizer().is_err());
    }

    #[test]
    fn overrides_reach_the_synthesizer() {
        let args = Args::parse_from([
            "spatialiser",
            "render",
            "in.txt",
            "out.wav",
            "--tactile",
            "max_active_speakers=2",
            "--sample-rate",
            "44100",
            "--tone-duration",
            "0.2",
        ]);
        let Some(Command::Render { options, .. }) = args.command else {
            panic!("expected render");
        };
        let synthesizer = options.synthesizer().unwrap();
        assert_eq!(synthesizer.settings().sample_rate(), SampleRate::new(44100));
        assert_eq!(synthesizer.settings().tone_duration, Seconds(0.2));
        assert_eq!(synthesizer.channel_count(), 16);
        let SpatializationMethod::TactileGrid(params) = synthesizer.engine().method() else {
            panic!("expected the tactile grid");
        };
        assert_eq!(params.max_active_speakers, 2);
    }
}
