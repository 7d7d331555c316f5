use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_stackplot"))
}

fn tmp_dir(stem: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let dir = std::env::temp_dir().join(format!("stackplot_{stem}_{}_{nanos}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Run the binary with the script piped to stdin, as a shell heredoc would.
fn run_script(args: &[&str], script: &str) -> Output {
    let mut child = Command::new(bin_path())
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap_or_else(|e| panic!("failed to run {:?}: {e}", bin_path()));
    child.stdin.as_mut().unwrap().write_all(script.as_bytes()).unwrap();
    child.wait_with_output().unwrap()
}

fn source_json(content: &[f64]) -> String {
    let edges: Vec<f64> = (0..=content.len()).map(|i| i as f64).collect();
    serde_json::json!({
        "histograms": {
            "h1_met": {
                "bin_edges": edges,
                "bin_content": content,
                "x_title": "M_T [GeV]",
            }
        }
    })
    .to_string()
}

/// Config, cross-sections, and four JSON sources under one directory.
/// Event counts equal the total luminosity so simulation scales by 1.
fn write_fixture(dir: &PathBuf) -> PathBuf {
    let sources = dir.join("sources");
    std::fs::create_dir_all(&sources).unwrap();
    std::fs::write(sources.join("data_obs.json"), source_json(&[40.0, 30.0, 20.0, 10.0])).unwrap();
    std::fs::write(sources.join("qcd.json"), source_json(&[20.0, 15.0, 10.0, 5.0])).unwrap();
    std::fs::write(sources.join("wjets.json"), source_json(&[4.0, 3.0, 2.0, 1.0])).unwrap();
    std::fs::write(sources.join("susy.json"), source_json(&[2.0, 2.0, 2.0, 2.0])).unwrap();

    std::fs::write(
        dir.join("xsec.yaml"),
        r#"
qcd: { cross_section: 1.0, weight: 1.0, event_count: 3000 }
wjets: { cross_section: 1.0, weight: 1.0, event_count: 3000 }
susy: { cross_section: 1.0, weight: 1.0, event_count: 3000 }
"#,
    )
    .unwrap();

    let config = dir.join("plots.yaml");
    std::fs::write(
        &config,
        r#"
general:
  hist_prefix: "h1_"
  cross_sections: "xsec.yaml"
  source_dir: "sources"
  experiment: "CMS"
  energy: "8 TeV"
data:
  - name: data_obs
    luminosity: 3000.0
backgrounds:
  - name: qcd
    label: QCD
  - name: wjets
    label: "W+jets"
signals:
  - name: susy
    label: SUSY
"#,
    )
    .unwrap();
    config
}

#[test]
fn scripted_pipeline_writes_a_frame_artifact() {
    let dir = tmp_dir("pipeline");
    let config = write_fixture(&dir);
    let artifact = dir.join("met_frame.json");

    let script = format!(
        "setup {}\ncreate_grid 1 1\nload met\nratio\nannotation right Preliminary\nsave {}\nexit\n",
        config.display(),
        artifact.display()
    );
    let out = run_script(&[], &script);
    assert!(
        out.status.success(),
        "pipeline should succeed, stderr={}",
        String::from_utf8_lossy(&out.stderr)
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("loaded 4 sources (0 skipped), luminosity 3000 pb^-1"), "{stdout}");
    assert!(stdout.contains(&format!("saved {}", artifact.display())), "{stdout}");

    let frame: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&artifact).unwrap()).unwrap();
    assert_eq!(frame.get("schema_version").and_then(|v| v.as_str()), Some("1"));
    assert_eq!(frame.get("x_title").and_then(|v| v.as_str()), Some("M_T [GeV]"));
    assert_eq!(frame.get("y_title").and_then(|v| v.as_str()), Some("Events / 1 GeV"));
    assert_eq!(frame.get("luminosity").and_then(|v| v.as_f64()), Some(3000.0));

    let series = frame.get("series").and_then(|v| v.as_array()).expect("series array");
    let roles: Vec<&str> = series.iter().map(|s| s["role"].as_str().unwrap()).collect();
    assert_eq!(roles, vec!["stack_layer", "stack_layer", "data", "signal"]);

    // Stack top is QCD over W+jets; its content is the summed background.
    let top = &series[1];
    let y: Vec<f64> = top["y"].as_array().unwrap().iter().map(|v| v.as_f64().unwrap()).collect();
    assert_eq!(y, vec![24.0, 18.0, 12.0, 6.0]);

    let ratio = frame.get("ratio").expect("ratio block");
    let ratio_y: Vec<f64> =
        ratio["y"].as_array().unwrap().iter().map(|v| v.as_f64().unwrap()).collect();
    assert!((ratio_y[0] - 40.0 / 24.0).abs() < 1e-12);

    let annotations = frame.get("annotations").and_then(|v| v.as_array()).unwrap();
    assert_eq!(annotations[0]["lines"][0].as_str(), Some("3.0 fb^-1 (8 TeV)"));
    assert_eq!(annotations[1]["lines"][0].as_str(), Some("CMS"));
    assert_eq!(annotations[1]["lines"][1].as_str(), Some("Preliminary"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn startup_flags_load_the_configuration() {
    let dir = tmp_dir("startup");
    let config = write_fixture(&dir);

    let out = run_script(
        &["--config", config.to_string_lossy().as_ref(), "--log-level", "error"],
        "create_grid 2 1\nstatus\nexit\n",
    );
    assert!(
        out.status.success(),
        "startup should succeed, stderr={}",
        String::from_utf8_lossy(&out.stderr)
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains(&format!("configuration loaded from {}", config.display())), "{stdout}");
    assert!(stdout.contains("grid: 2x1"), "{stdout}");
    assert!(stdout.contains("panel 1: empty"), "{stdout}");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn command_errors_are_reported_without_ending_the_session() {
    let dir = tmp_dir("errors");
    let config = write_fixture(&dir);

    let script = format!(
        "bogus\ncreate_grid 9 9\nsetup {}\ncreate_grid 1 1\nload met\nstatus\nexit\n",
        config.display()
    );
    let out = run_script(&[], &script);
    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("unknown command 'bogus'"), "{stderr}");
    assert!(stderr.contains("grid must be between 1x1 and 3x2"), "{stderr}");

    // The session stayed usable after both failures.
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("panel 0: rendered"), "{stdout}");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn rebin_and_switches_reshape_the_saved_frame() {
    let dir = tmp_dir("rebin");
    let config = write_fixture(&dir);
    let artifact = dir.join("rebinned.json");

    let script = format!(
        "setup {}\ncreate_grid 1 1\nload met\nset stack_signal on\nrebin 2\nsave {}\nexit\n",
        config.display(),
        artifact.display()
    );
    let out = run_script(&[], &script);
    assert!(
        out.status.success(),
        "rebin script should succeed, stderr={}",
        String::from_utf8_lossy(&out.stderr)
    );

    let frame: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&artifact).unwrap()).unwrap();
    let edges: Vec<f64> =
        frame["bin_edges"].as_array().unwrap().iter().map(|v| v.as_f64().unwrap()).collect();
    assert_eq!(edges, vec![0.0, 2.0, 4.0]);

    // With stack_signal on, the signal overlay draws first and rides on
    // the summed background.
    let series = frame["series"].as_array().unwrap();
    assert_eq!(series[0]["role"].as_str(), Some("signal"));
    let signal_y: Vec<f64> =
        series[0]["y"].as_array().unwrap().iter().map(|v| v.as_f64().unwrap()).collect();
    assert_eq!(signal_y, vec![4.0 + 42.0, 4.0 + 18.0]);

    let _ = std::fs::remove_dir_all(&dir);
}
