//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `scenelink_core` linkage.
//! - Run the liveness guard against a valid, a destroyed and a never-attached
//!   feature and print one deterministic line per case.
//!
//! Logging is enabled when `SCENELINK_LOG_DIR` is set; `SCENELINK_LOG_LEVEL`
//! overrides the build-mode default level.

use scenelink_core::{
    assert_valid, default_log_level, init_logging, AttachedFeature, FeatureKind,
    SceneGraphError, SharedSceneGraph,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    if let Ok(log_dir) = std::env::var("SCENELINK_LOG_DIR") {
        let level = std::env::var("SCENELINK_LOG_LEVEL")
            .unwrap_or_else(|_| default_log_level().as_str().to_string());
        if let Err(err) = init_logging(&level, &log_dir) {
            eprintln!("scenelink logging disabled: {err}");
        }
    }

    println!("scenelink_core ping={}", scenelink_core::ping());
    println!("scenelink_core version={}", scenelink_core::core_version());

    match run_guard_probe() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("scenelink probe failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_guard_probe() -> Result<(), SceneGraphError> {
    let scene = SharedSceneGraph::new();
    let node = scene.write(|graph| graph.add_child(graph.root(), "probe"))?;
    let feature = scene.attach_feature(node, FeatureKind::Sensor)?;
    report("attached", &feature);

    scene.write(|graph| graph.destroy(node))?;
    report("destroyed", &feature);

    report(
        "never_attached",
        &AttachedFeature::detached(FeatureKind::Sensor),
    );
    Ok(())
}

fn report(case: &str, feature: &AttachedFeature) {
    match assert_valid(feature) {
        Ok(()) => println!("guard case={case} status=valid"),
        Err(err) => println!("guard case={case} status=invalid message=\"{err}\""),
    }
}
