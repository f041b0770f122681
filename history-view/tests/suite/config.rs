#![allow(clippy::expect_used)]

use std::io::Write;
use std::time::Duration;

use history_view::HistoryViewConfig;
use history_view::config::ConfigError;
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;
use tempfile::TempDir;

#[test]
fn loads_settings_from_a_file() -> anyhow::Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(
        file,
        r#"
[interaction]
start_drag_distance = 4
double_click_interval_ms = 250

[touch]
long_press_ms = 700

[style]
msg_margin_left = 20
"#
    )?;

    let config = HistoryViewConfig::load(file.path())?;
    assert_eq!(config.interaction.start_drag_distance, 4);
    assert_eq!(
        config.interaction.double_click_interval,
        Duration::from_millis(250)
    );
    assert_eq!(config.touch.long_press, Duration::from_millis(700));
    assert_eq!(config.style.msg_margin_left, 20);
    assert_eq!(config.grouping, HistoryViewConfig::new().grouping);
    Ok(())
}

#[test]
fn missing_file_reports_its_path() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("history-view.toml");

    let err = HistoryViewConfig::load(&path).expect_err("file does not exist");
    match err {
        ConfigError::Io { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected an io error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn invalid_values_are_rejected_on_load() -> anyhow::Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "[selection]\nmax_selected_items = 0")?;

    let err = HistoryViewConfig::load(file.path()).expect_err("zero limit");
    assert!(matches!(
        err,
        ConfigError::Invalid {
            field: "selection.max_selected_items",
            ..
        }
    ));
    Ok(())
}
