use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::{tempdir, TempDir};

fn create_test_files(dir: &TempDir, files: &[(&str, &str)]) -> Result<()> {
    for (name, content) in files {
        fs::write(dir.path().join(name), content)?;
    }
    Ok(())
}

fn wordscout(dir: &TempDir) -> Result<Command> {
    let mut cmd = Command::cargo_bin("wordscout")?;
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    Ok(cmd)
}

#[test]
fn test_analyze_prints_sorted_counts() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(
        &dir,
        &[
            ("fruit.txt", "cherry banana apple\nbanana apple"),
            ("notes.md", "not analyzed"),
        ],
    )?;

    wordscout(&dir)?
        .args(["analyze", "-d", "."])
        .assert()
        .success()
        .stdout(predicate::str::contains("fruit.txt"))
        .stdout(predicate::str::contains(
            "\tapple: 2\n\tbanana: 2\n\tcherry: 1\n",
        ))
        .stdout(predicate::str::contains("notes.md").not())
        .stdout(predicate::str::contains("Analyzed 1 files (0 failed), 5 words"));
    Ok(())
}

#[test]
fn test_extensions_and_stopwords() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(
        &dir,
        &[
            ("a.txt", "the sun and the moon"),
            ("b.md", "The Moon!"),
            ("stop.list", "the\nand\n"),
        ],
    )?;

    wordscout(&dir)?
        .args(["analyze", "-e", "txt,md", "--stopwords", "stop.list", "-j", "2", "-k", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\tmoon: 1\n\tsun: 1\n"))
        .stdout(predicate::str::contains("Analyzed 2 files (0 failed), 3 words"))
        .stdout(predicate::str::contains("\tthe:").not());
    Ok(())
}

#[test]
fn test_default_stopwords_file_in_working_directory() -> Result<()> {
    let dir = tempdir()?;
    fs::create_dir_all(dir.path().join("docs"))?;
    create_test_files(
        &dir,
        &[
            ("stopwords.txt", "the\nof\n"),
            ("docs/tale.txt", "The best of times, the worst of times"),
        ],
    )?;

    wordscout(&dir)?
        .args(["analyze", "-d", "docs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\ttimes: 2\n\tbest: 1\n\tworst: 1\n"))
        .stdout(predicate::str::contains("\tthe:").not())
        .stdout(predicate::str::contains("\tof:").not());
    Ok(())
}

#[test]
fn test_explicit_stopwords_flag_replaces_default() -> Result<()> {
    let dir = tempdir()?;
    fs::create_dir_all(dir.path().join("docs"))?;
    create_test_files(
        &dir,
        &[
            ("stopwords.txt", "the\n"),
            ("custom.list", "times\n"),
            ("docs/tale.txt", "the times the times"),
        ],
    )?;

    wordscout(&dir)?
        .args(["analyze", "-d", "docs", "--stopwords", "custom.list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\tthe: 2\n"))
        .stdout(predicate::str::contains("\ttimes:").not());
    Ok(())
}

#[test]
fn test_unknown_encoding_rejected() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(&dir, &[("a.txt", "words")])?;

    wordscout(&dir)?
        .args(["analyze", "--encoding", "latin1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'latin1'"));

    wordscout(&dir)?
        .args(["analyze", "--encoding", "FailFast"])
        .assert()
        .success();
    Ok(())
}

#[test]
fn test_stats_only() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(&dir, &[("a.txt", "one two three")])?;

    wordscout(&dir)?
        .args(["analyze", "--stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Analyzed 1 files (0 failed), 3 words"))
        .stdout(predicate::str::contains("\tone: 1").not());
    Ok(())
}

#[test]
fn test_failfast_failure_goes_to_stderr() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(&dir, &[("good.txt", "fine words")])?;
    fs::write(dir.path().join("bad.txt"), b"\xff\xfe broken")?;

    wordscout(&dir)?
        .args(["analyze", "--encoding", "failfast"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Analyzed 1 files (1 failed), 2 words"))
        .stderr(predicate::str::contains("bad.txt"));
    Ok(())
}

#[test]
fn test_json_output() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(&dir, &[("a.txt", "echo echo delta")])?;

    wordscout(&dir)?
        .args(["analyze", "-o", "out/report.json"])
        .assert()
        .success();

    let json = fs::read_to_string(dir.path().join("out/report.json"))?;
    assert!(json.contains("\"file_name\": \"a.txt\""));
    assert!(json.contains("\"word\": \"echo\""));
    Ok(())
}

#[test]
fn test_config_errors_exit_nonzero() -> Result<()> {
    let dir = tempdir()?;

    wordscout(&dir)?
        .args(["analyze", "-k", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));

    wordscout(&dir)?
        .args(["analyze", "-d", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("root path does not exist"));
    Ok(())
}

#[test]
fn test_config_file_values_used() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(
        &dir,
        &[
            ("a.txt", "plain text"),
            ("b.md", "markdown text"),
            ("settings.yaml", "file_extensions: [\"md\"]\nworker_count: 2\n"),
        ],
    )?;

    wordscout(&dir)?
        .args(["analyze", "--config", "settings.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("b.md"))
        .stdout(predicate::str::contains("a.txt").not());
    Ok(())
}
