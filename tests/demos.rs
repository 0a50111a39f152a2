// Copyright (c) 2024 Mike Tsao

use more_asserts::assert_gt;
use spatialiser::prelude::*;
use std::path::PathBuf;

fn demo(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(relative)
}

#[test]
fn demo_layouts_load_cleanly() {
    let development = LayoutConfig::load(&demo("layouts/development.txt")).unwrap();
    assert!(development.diagnostics.is_empty());
    assert_eq!(development.layout.name(), "development");
    assert_eq!(development.method, MethodKind::DistancePan);
    assert_eq!(development.layout.len(), 4);
    assert!(development.layout.validate().is_empty());

    let fingers = LayoutConfig::load(&demo("layouts/fingers.txt")).unwrap();
    assert!(fingers.diagnostics.is_empty());
    assert_eq!(fingers.layout.channel_count(), 10);
    assert!(fingers.layout.validate().is_empty());
    assert_eq!(
        fingers.layout.speakers()[0].description.as_deref(),
        Some("Right thumb")
    );

    let ring = LayoutConfig::load(&demo("layouts/ring8.txt")).unwrap();
    assert_eq!(ring.method, MethodKind::Vbap);
    assert_eq!(ring.layout.len(), 8);
}

#[test]
fn demo_scripts_parse_cleanly() {
    let tour = Script::load(&demo("scripts/tour_4x4.txt")).unwrap();
    assert!(tour.diagnostics.is_empty(), "{:?}", tour.diagnostics);
    assert_eq!(tour.actions.len(), 19);
    assert_eq!(tour.overrides.tone_duration, Some(Seconds(0.1)));

    let each = Script::load(&demo("scripts/each_speaker.txt")).unwrap();
    assert!(each.diagnostics.is_empty(), "{:?}", each.diagnostics);
    assert_eq!(each.actions.len(), 31);
}

#[test]
fn each_speaker_script_reaches_every_channel() {
    let script = Script::load(&demo("scripts/each_speaker.txt")).unwrap();
    let settings = SynthesisSettings {
        sample_rate: SampleRate::new(8000),
        ..Default::default()
    };
    let synthesizer = BufferSynthesizer::new_with(
        LayoutConfig::default().engine(),
        settings,
    );
    let mut sink = OfflineRenderer::new_with(synthesizer.channel_count());
    let mut executor = ScriptExecutor::new_with(synthesizer, ExecutionSettings::default());
    let summary = executor.execute_script(&script, &mut sink).unwrap();
    assert_eq!(summary.actions_executed, 31);

    let buffer = sink.into_buffer();
    for channel in 0..16 {
        assert_gt!(buffer.peak(channel), 0.1, "channel {channel}");
    }
    assert_eq!(
        executor.current_position(),
        Position::new(0.06, -0.06)
    );
}

#[test]
fn json_layouts_and_scripts_load() {
    let dir = std::env::temp_dir().join(format!("spatialiser-json-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let layout = spatialiser::layout::circle(6, 0.03, Position::origin());
    let layout_path = dir.join("ring.json");
    std::fs::write(&layout_path, serde_json::to_string(&layout).unwrap()).unwrap();
    let config = LayoutConfig::load(&layout_path).unwrap();
    assert_eq!(config.layout, layout);
    assert_eq!(config.method, MethodKind::default());

    let script_path = dir.join("script.JSON");
    std::fs::write(
        &script_path,
        r#"[{"action": "wait", "duration": 0.5}, {"action": "jump", "position": [0.01, 0.02]}]"#,
    )
    .unwrap();
    let script = Script::load(&script_path).unwrap();
    assert_eq!(
        script.actions,
        vec![
            Action::Wait {
                duration: Seconds(0.5)
            },
            Action::Jump {
                position: Position::new(0.01, 0.02)
            },
        ]
    );

    let _ = std::fs::remove_dir_all(&dir);
}
