use assert_cmd::Command;

#[test]
fn cli_help_runs() {
    let mut cmd = Command::cargo_bin("textmill").expect("binary exists");
    cmd.arg("--help").assert().success();
}

#[test]
fn wordcount_writes_a_csv_report() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), "The cat saw the dog.").unwrap();
    std::fs::write(dir.path().join("b.txt"), "The dog ran away.").unwrap();
    let out = dir.path().join("counts.csv");

    let mut cmd = Command::cargo_bin("textmill").expect("binary exists");
    cmd.arg("wordcount")
        .arg(dir.path())
        .arg("--out")
        .arg(&out)
        .arg("--min-tf")
        .arg("1")
        .assert()
        .success();

    let written = std::fs::read_to_string(&out).unwrap();
    assert!(written.lines().count() >= 3);
    assert!(written.contains("dog"));
}

#[test]
fn conflicting_entity_filters_fail() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), "John met Mary.").unwrap();
    let out = dir.path().join("ents.csv");

    let mut cmd = Command::cargo_bin("textmill").expect("binary exists");
    cmd.arg("entities")
        .arg(dir.path())
        .arg("--out")
        .arg(&out)
        .arg("--use-types")
        .arg("PERSON")
        .arg("--ignore-types")
        .arg("DATE")
        .assert()
        .failure();
}
