use assert_cmd::cargo::cargo_bin_cmd;

#[test]
fn init_help_mentions_options() {
    let mut cmd = cargo_bin_cmd!("picasort-init");
    let output = cmd
        .arg("init")
        .arg("--help")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8_lossy(&output);
    assert!(
        text.contains("--non-interactive"),
        "init help missing --non-interactive"
    );
    assert!(text.contains("--rotate"), "init help missing --rotate");
    assert!(
        text.contains("--print-only"),
        "init help missing --print-only"
    );
}

#[test]
fn db_subcommands_present() {
    let mut cmd = cargo_bin_cmd!("picasort-init");
    let out = cmd
        .arg("db")
        .arg("--help")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8_lossy(&out);
    assert!(text.contains("bootstrap"), "db help missing bootstrap");
    assert!(text.contains("preflight"), "db help missing preflight");

    let mut cmd_bootstrap = cargo_bin_cmd!("picasort-init");
    let bootstrap_out = cmd_bootstrap
        .arg("db")
        .arg("bootstrap")
        .arg("--help")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let bootstrap_text = String::from_utf8_lossy(&bootstrap_out);
    assert!(
        bootstrap_text.contains("--admin-url"),
        "db bootstrap help missing --admin-url"
    );
    assert!(
        bootstrap_text.contains("--role"),
        "db bootstrap help missing --role"
    );
}

#[test]
fn print_only_emits_kv_without_writing_env() {
    let dir = tempfile::tempdir().expect("tempdir");
    let env_file = dir.path().join(".env");

    let mut cmd = cargo_bin_cmd!("picasort-init");
    let out = cmd
        .current_dir(dir.path())
        .env("PICASORT_INIT_TEST_SEED", "5")
        .arg("init")
        .arg("--env-file")
        .arg(&env_file)
        .arg("--non-interactive")
        .arg("--print-only")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8_lossy(&out);
    assert!(text.contains("DATABASE_URL="), "missing DATABASE_URL line");
    assert!(
        text.contains("DATABASE_APP_PASSWORD="),
        "missing DATABASE_APP_PASSWORD line"
    );
    assert!(
        !env_file.exists(),
        "--print-only must not write the env file"
    );
}
