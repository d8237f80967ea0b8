use scenelink_core::{init_logging, logging_status, LogLevel, LoggingError};

#[test]
fn init_logging_is_idempotent_for_same_config_and_rejects_conflicts() {
    let log_dir = tempfile::tempdir().expect("create temp log dir");
    let second_dir = tempfile::tempdir().expect("create second temp dir");
    let log_dir_str = log_dir
        .path()
        .to_str()
        .expect("temp dir should be valid UTF-8")
        .to_string();
    let second_dir_str = second_dir
        .path()
        .to_str()
        .expect("temp dir should be valid UTF-8")
        .to_string();

    init_logging("info", &log_dir_str).expect("first init should succeed");
    init_logging("INFO", &log_dir_str).expect("same config should be idempotent");

    let level_error = init_logging("debug", &log_dir_str).expect_err("level conflict should fail");
    assert!(matches!(level_error, LoggingError::LevelConflict { .. }));
    assert!(level_error.to_string().contains("refusing to switch"));

    let dir_error =
        init_logging("info", &second_dir_str).expect_err("directory conflict should fail");
    assert!(matches!(dir_error, LoggingError::DirConflict { .. }));

    let (active_level, active_dir) = logging_status().expect("logging should be active");
    assert_eq!(active_level, LogLevel::Info);
    assert_eq!(active_dir, log_dir.path());

    log::info!("event=logging_test module=tests status=ok");
    log::logger().flush();

    let has_log_file = std::fs::read_dir(log_dir.path())
        .expect("read log dir")
        .filter_map(Result::ok)
        .any(|entry| entry.file_name().to_string_lossy().starts_with("scenelink"));
    assert!(has_log_file);
}
