use std::fs;
use std::path::PathBuf;

use steadytick_core::{OrderPolicy, Scheduler, SchedulerConfig};

fn temp_file(name: &str, body: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("steadytick-{}-{name}", std::process::id()));
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn toml_file_drives_the_scheduler() {
    let path = temp_file(
        "loop.toml",
        r#"
        [loop]
        update_rate = 50
        order_policy = "legacy"
        "#,
    );
    let cfg = SchedulerConfig::load(&path).unwrap();
    let _ = fs::remove_file(&path);

    let sched = Scheduler::new(cfg);
    assert_eq!(sched.update_interval_ms(), 20.0);
    assert_eq!(sched.entities().policy(), OrderPolicy::Legacy);
    assert!(sched.config().telemetry.log_rates);
}

#[test]
fn json_file_is_selected_by_extension() {
    let path = temp_file(
        "loop.json",
        r#"{ "loop": { "max_catch_up_ticks": 4 }, "telemetry": { "log_period_ms": 250 } }"#,
    );
    let cfg = SchedulerConfig::load(&path).unwrap();
    let _ = fs::remove_file(&path);

    assert_eq!(cfg.loop_cfg.update_rate, 30);
    assert_eq!(cfg.loop_cfg.max_catch_up_ticks, 4);
    assert_eq!(cfg.telemetry.log_period_ms, 250);
}

#[test]
fn missing_file_is_an_error() {
    let path = std::env::temp_dir().join("steadytick-does-not-exist.toml");
    assert!(SchedulerConfig::load(path).is_err());
}

#[test]
fn zero_update_rate_is_clamped_to_one_hertz() {
    let mut cfg = SchedulerConfig::default();
    cfg.loop_cfg.update_rate = 0;
    assert!(cfg.validate().is_err());

    let sched = Scheduler::new(cfg);
    assert_eq!(sched.update_interval_ms(), 1000.0);
}
