use assert_cmd::Command;
use predicates::prelude::*;
use std::error::Error;
use std::path::PathBuf;
use tempfile::tempdir;

fn data(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn nestify(config_dir: &std::path::Path) -> Result<Command, Box<dyn Error>> {
    // Point the config at an empty location so a user config never leaks in
    let mut cmd = Command::cargo_bin("nestify")?;
    cmd.env("NESTIFY_CONFIG", config_dir.join("config.toml"))
        .env_remove("RUST_LOG");
    Ok(cmd)
}

fn empty_config() -> Result<tempfile::TempDir, Box<dyn Error>> {
    let dir = tempdir()?;
    std::fs::write(dir.path().join("config.toml"), "")?;
    Ok(dir)
}

#[test]
fn resolve_writes_expanded_layers_to_stdout() -> Result<(), Box<dyn Error>> {
    let cfg = empty_config()?;
    let assert = nestify(cfg.path())?
        .args(["resolve", data("network.json").to_str().expect("utf8")])
        .assert()
        .success();

    let out: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout)?;
    let layers: Vec<&String> = out["layers"].as_object().expect("layers").keys().collect();
    assert_eq!(layers, vec!["lgn", "retina_o1", "retina_o2"]);
    assert_eq!(out["areas"]["input"], serde_json::json!(["retina_o1", "retina_o2"]));
    assert_eq!(out["populations"][0]["layer"], "lgn");
    Ok(())
}

#[test]
fn resolve_to_file_in_compact_form() -> Result<(), Box<dyn Error>> {
    let cfg = empty_config()?;
    let tmp = tempdir()?;
    let out = tmp.path().join("out").join("resolved.json");

    nestify(cfg.path())?
        .args([
            "resolve",
            data("network.json").to_str().expect("utf8"),
            "-o",
            out.to_str().expect("utf8"),
            "--compact",
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let text = std::fs::read_to_string(&out)?;
    assert_eq!(text.lines().count(), 1);
    let value: serde_json::Value = serde_json::from_str(&text)?;
    assert!(value["layers"]["lgn"]["nest_params"].is_object());
    Ok(())
}

#[test]
fn toml_input_is_accepted() -> Result<(), Box<dyn Error>> {
    let cfg = empty_config()?;
    let assert = nestify(cfg.path())?
        .args(["resolve", data("network.toml").to_str().expect("utf8")])
        .assert()
        .success();

    let out: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout)?;
    assert_eq!(
        out["layers"]["v1"]["nest_params"]["elements"],
        serde_json::json!(["exc", 8, "inh", 2])
    );
    Ok(())
}

#[test]
fn merge_combines_files_before_resolving() -> Result<(), Box<dyn Error>> {
    let cfg = empty_config()?;
    let assert = nestify(cfg.path())?
        .args([
            "merge",
            data("network.json").to_str().expect("utf8"),
            data("connections.json").to_str().expect("utf8"),
        ])
        .assert()
        .success();

    let out: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout)?;
    let connections = out["connections"].as_array().expect("connections");
    assert_eq!(connections.len(), 2);
    for connection in connections {
        assert_eq!(connection["params"]["weights"], serde_json::json!(1.0));
        assert_eq!(connection["target_layer"], "lgn");
    }
    Ok(())
}

#[test]
fn merge_requires_an_input() -> Result<(), Box<dyn Error>> {
    let cfg = empty_config()?;
    nestify(cfg.path())?.arg("merge").assert().failure();
    Ok(())
}

#[test]
fn layers_lists_replicas_by_area() -> Result<(), Box<dyn Error>> {
    let cfg = empty_config()?;
    nestify(cfg.path())?
        .args(["layers", data("network.json").to_str().expect("utf8")])
        .assert()
        .success()
        .stdout("input\n  retina_o1\n  retina_o2\nthalamus\n  lgn\n");
    Ok(())
}

#[test]
fn flat_layers_skip_replication() -> Result<(), Box<dyn Error>> {
    let cfg = empty_config()?;
    nestify(cfg.path())?
        .args(["layers", "--flat", data("network.json").to_str().expect("utf8")])
        .assert()
        .success()
        .stdout("input\n  retina\nthalamus\n  lgn\n");
    Ok(())
}

#[test]
fn invalid_network_fails_with_message() -> Result<(), Box<dyn Error>> {
    let cfg = empty_config()?;
    nestify(cfg.path())?
        .args(["resolve", data("broken.json").to_str().expect("utf8")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("only one inhibitory population"));
    Ok(())
}

#[test]
fn missing_input_fails() -> Result<(), Box<dyn Error>> {
    let cfg = empty_config()?;
    let tmp = tempdir()?;
    nestify(cfg.path())?
        .args(["resolve", tmp.path().join("absent.json").to_str().expect("utf8")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.json"));
    Ok(())
}

#[test]
fn config_renames_tree_keys() -> Result<(), Box<dyn Error>> {
    let cfg = tempdir()?;
    std::fs::write(
        cfg.path().join("config.toml"),
        "[keys]\nparams = \"p\"\nchildren = \"sub\"\n\n[output]\npretty = false\n",
    )?;
    let tmp = tempdir()?;
    let input = tmp.path().join("net.json");
    std::fs::write(
        &input,
        r#"{"layers": {"p": {"area": "a", "size": 2, "visSize": 1.0, "edge_wrap": false, "elements": []},
                        "sub": {"x": {"name": "x"}}}}"#,
    )?;

    nestify(cfg.path())?
        .args(["layers", input.to_str().expect("utf8")])
        .assert()
        .success()
        .stdout("a\n  x\n");
    Ok(())
}

#[test]
fn missing_explicit_config_fails() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    Command::cargo_bin("nestify")?
        .args([
            "--config",
            tmp.path().join("nope.toml").to_str().expect("utf8"),
            "layers",
            data("network.json").to_str().expect("utf8"),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
    Ok(())
}
