use predicates::str::contains;

#[test]
fn unknown_profile_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gvl-sim");
    cmd.args(["--thread", "low-io", "--thread", "bogus"]);
    cmd.assert().failure().stderr(contains(
        "Error: unknown profile 'bogus'; valid profiles: low-io, heavy-io",
    ));
}

#[test]
fn empty_thread_entry_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gvl-sim");
    cmd.args(["--threads", "low-io,,heavy-io"]);
    cmd.assert()
        .failure()
        .stderr(contains("Error: invalid input: empty profile key at position 1"));
}

#[test]
fn zero_width_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gvl-sim");
    cmd.args(["--thread", "low-io", "--width", "0"]);
    cmd.assert()
        .failure()
        .stderr(contains("Error: timeline width must be > 0"));
}

#[test]
fn invalid_format_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gvl-sim");
    cmd.args(["--thread", "low-io", "--format", "html"]);
    cmd.assert().failure().stderr(contains("Error:"));
}

#[test]
fn missing_config_file_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gvl-sim");
    cmd.args(["--config", "does-not-exist.toml"]);
    cmd.assert()
        .failure()
        .stderr(contains("Error: failed to read config 'does-not-exist.toml'"));
}
