use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn align_abc(dir: &TempDir) -> anyhow::Result<String> {
    let session = dir.path().join("session.json");
    let session = session.to_str().unwrap().to_string();

    let mut cmd = Command::cargo_bin("gcalign")?;
    cmd.arg("align")
        .arg("tests/gcalign/bgc_a.fa")
        .arg("tests/gcalign/bgc_b.fa")
        .arg("tests/gcalign/bgc_c.fa")
        .arg("-o")
        .arg(&session)
        .assert()
        .success();

    Ok(session)
}

#[test]
fn command_invalid() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("gcalign")?;
    cmd.arg("foobar");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("recognized"));

    Ok(())
}

#[test]
fn command_align() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("gcalign")?;
    let output = cmd
        .arg("align")
        .arg("tests/gcalign/bgc_a.fa")
        .arg("tests/gcalign/bgc_b.fa")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;
    let json: serde_json::Value = serde_json::from_str(&stdout)?;

    assert_eq!(json["order"].as_array().unwrap().len(), 2);
    assert_eq!(json["clusters"].as_object().unwrap().len(), 2);
    assert_eq!(json["genes"].as_object().unwrap().len(), 6);
    assert_eq!(json["alignments"].as_object().unwrap().len(), 1);
    assert!(json["links"].as_object().unwrap().len() >= 3);

    Ok(())
}

#[test]
fn command_align_single() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("gcalign")?;
    let output = cmd.arg("align").arg("tests/gcalign/loci.fa").output()?;
    let stdout = String::from_utf8(output.stdout)?;
    let json: serde_json::Value = serde_json::from_str(&stdout)?;

    assert_eq!(json["loci"].as_object().unwrap().len(), 2);
    assert!(json["alignments"].as_object().unwrap().is_empty());
    assert!(stdout.contains("\"contig1\""));
    assert!(stdout.contains("\"contig2|x2\""));

    Ok(())
}

#[test]
fn command_align_bad_options() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("gcalign")?;
    cmd.arg("align")
        .arg("tests/gcalign/bgc_a.fa")
        .arg("tests/gcalign/bgc_b.fa")
        .arg("--matrix")
        .arg("blosum99")
        .assert()
        .failure()
        .stderr(predicate::str::contains("substitution_matrix"));

    let mut cmd = Command::cargo_bin("gcalign")?;
    cmd.arg("align")
        .arg("tests/gcalign/bgc_a.fa")
        .arg("--gap-open")
        .arg("5")
        .assert()
        .failure()
        .stderr(predicate::str::contains("open_gap_score"));

    Ok(())
}

#[test]
fn command_align_extend_session() -> anyhow::Result<()> {
    let tempdir = TempDir::new()?;
    let first = tempdir.path().join("ab.json");
    let second = tempdir.path().join("abc.json");

    let mut cmd = Command::cargo_bin("gcalign")?;
    cmd.arg("align")
        .arg("tests/gcalign/bgc_a.fa")
        .arg("tests/gcalign/bgc_b.fa")
        .arg("-o")
        .arg(&first)
        .assert()
        .success();

    let mut cmd = Command::cargo_bin("gcalign")?;
    cmd.arg("align")
        .arg("tests/gcalign/bgc_c.fa")
        .arg("--session")
        .arg(&first)
        .arg("-o")
        .arg(&second)
        .arg("-p")
        .arg("2")
        .assert()
        .success();

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&second)?)?;
    assert_eq!(json["order"].as_array().unwrap().len(), 3);
    assert_eq!(json["alignments"].as_object().unwrap().len(), 3);

    // a file read again becomes a new cluster with fresh uids
    let mut cmd = Command::cargo_bin("gcalign")?;
    let output = cmd
        .arg("align")
        .arg("tests/gcalign/bgc_c.fa")
        .arg("--session")
        .arg(&second)
        .output()?;
    let json: serde_json::Value = serde_json::from_str(&String::from_utf8(output.stdout)?)?;
    assert_eq!(json["order"].as_array().unwrap().len(), 4);
    assert_eq!(json["alignments"].as_object().unwrap().len(), 6);

    Ok(())
}

#[test]
fn command_show() -> anyhow::Result<()> {
    let tempdir = TempDir::new()?;
    let session = align_abc(&tempdir)?;

    let mut cmd = Command::cargo_bin("gcalign")?;
    let output = cmd
        .arg("show")
        .arg(&session)
        .arg("--delimiter")
        .arg("\\t")
        .arg("--link-headers")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(stdout.contains("bgc_a vs bgc_b\n--------------\n"));
    assert!(stdout.contains("Query\tTarget\tIdentity\tSimilarity"));
    assert!(stdout.contains("a1\tb1\t1.0000\t1.0000"));
    assert!(stdout.contains("a3\tb3\t1.0000\t1.0000"));
    assert!(stdout.contains("bgc_b vs bgc_c"));

    let mut cmd = Command::cargo_bin("gcalign")?;
    let output = cmd
        .arg("show")
        .arg(&session)
        .arg("--no-headers")
        .arg("--decimals")
        .arg("1")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(!stdout.contains(" vs "));
    assert!(stdout.contains("1.0"));
    assert!(!stdout.contains("1.0000"));

    Ok(())
}

#[test]
fn command_matrix() -> anyhow::Result<()> {
    let tempdir = TempDir::new()?;
    let session = align_abc(&tempdir)?;

    let mut cmd = Command::cargo_bin("gcalign")?;
    let output = cmd.arg("matrix").arg(&session).output()?;
    let stdout = String::from_utf8(output.stdout)?;
    let lines: Vec<&str> = stdout.lines().collect();

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "\tbgc_a\tbgc_b\tbgc_c");
    assert!(lines[1].starts_with("bgc_a\t0.0000\t"));
    assert_eq!(lines[3], "bgc_c\t0.0000\t0.0000\t0.0000");

    let mut cmd = Command::cargo_bin("gcalign")?;
    let output = cmd
        .arg("matrix")
        .arg(&session)
        .arg("--normalise")
        .arg("--distance")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;
    let lines: Vec<&str> = stdout.lines().collect();

    assert_eq!(lines[1], "bgc_a\t0.0000\t0.0000\t1.0000");
    assert_eq!(lines[3], "bgc_c\t1.0000\t1.0000\t0.0000");

    Ok(())
}

#[test]
fn command_order() -> anyhow::Result<()> {
    let tempdir = TempDir::new()?;
    let session = align_abc(&tempdir)?;

    let mut cmd = Command::cargo_bin("gcalign")?;
    let output = cmd.arg("order").arg(&session).output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(stdout, "bgc_b\nbgc_a\nbgc_c\n");

    let mut cmd = Command::cargo_bin("gcalign")?;
    cmd.arg("order")
        .arg(&session)
        .arg("--method")
        .arg("nearest")
        .assert()
        .failure()
        .stderr(predicate::str::contains("method"));

    Ok(())
}
