use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const STEM: &str = "Considere o texto a seguir e assinale a alternativa que responde corretamente.";

fn write_exam(dir: &Path) -> std::path::PathBuf {
    let mut text = String::new();
    for n in 1..=6 {
        text.push_str(&format!("{}\n{} ({})\n(A) sim\n(B) não\n", n, STEM, n));
    }
    let path = dir.join("prova.txt");
    fs::write(&path, text).unwrap();
    path
}

fn write_key(dir: &Path, name: &str) -> std::path::PathBuf {
    let text = "GABARITO\nM1 – ANALISTA\n1 2 3 4 5 6\nA B C D E X\n\
                M2 – TÉCNICO\n1 2 3 4 5 6\nE D C B A A\n";
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

fn gabarito(config_dir: &TempDir) -> Command {
    // Keep tests away from the user's real config file.
    let config = config_dir.path().join("config.json");
    if !config.exists() {
        fs::write(&config, "{}").unwrap();
    }
    let mut cmd = Command::cargo_bin("gabarito").unwrap();
    cmd.arg("--config").arg(&config);
    cmd
}

#[test]
fn test_questions_json() {
    let dir = TempDir::new().unwrap();
    let exam = write_exam(dir.path());

    let output = gabarito(&dir)
        .arg("questions")
        .arg(&exam)
        .output()
        .unwrap();
    assert!(output.status.success());

    let questions: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let numbers: Vec<u64> = questions
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["number"].as_u64().unwrap())
        .collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_answers_text_format() {
    let dir = TempDir::new().unwrap();
    let key = write_key(dir.path(), "gabarito.txt");

    gabarito(&dir)
        .args(["answers", "--format", "text"])
        .arg(&key)
        .assert()
        .success()
        .stdout(predicate::str::contains("ANALISTA (tipo 1) - 6 answers, 1 annulled"))
        .stdout(predicate::str::contains("TÉCNICO (tipo 2)"))
        .stdout(predicate::str::contains("1-A 2-B 3-C 4-D 5-E 6-X"));
}

#[test]
fn test_answers_show_strategy() {
    let dir = TempDir::new().unwrap();
    let key = write_key(dir.path(), "gabarito.txt");

    gabarito(&dir)
        .args(["answers", "--show-strategy"])
        .arg(&key)
        .assert()
        .success()
        .stderr(predicate::str::contains("numbered_variant"))
        .stderr(predicate::str::contains("via table"));
}

#[test]
fn test_merge_by_tipo() {
    let dir = TempDir::new().unwrap();
    let exam = write_exam(dir.path());
    let key = write_key(dir.path(), "gabarito.txt");

    let output = gabarito(&dir)
        .args(["merge", "--tipo", "2"])
        .arg(&exam)
        .arg(&key)
        .output()
        .unwrap();
    assert!(output.status.success());

    let merged: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let merged = merged.as_array().unwrap();
    assert_eq!(merged.len(), 6);
    assert_eq!(merged[0]["correct_answer"], "E");
    assert_eq!(merged[5]["correct_answer"], "A");
}

#[test]
fn test_batch_writes_outputs_and_summary() {
    let dir = TempDir::new().unwrap();
    write_key(dir.path(), "a.txt");
    write_key(dir.path(), "b.txt");
    let out_dir = dir.path().join("out");
    let pattern = dir.path().join("*.txt");

    gabarito(&dir)
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .arg("--output-dir")
        .arg(&out_dir)
        .arg("--summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 successful"));

    assert!(out_dir.join("a.json").exists());
    assert!(out_dir.join("b.json").exists());
    let summary = fs::read_to_string(out_dir.join("summary.csv")).unwrap();
    assert!(summary.starts_with("filename,status,answer_keys"));
    assert!(summary.contains("a.txt,success,2,12,numbered_variant"));
}

#[test]
fn test_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    gabarito(&dir)
        .args(["questions", "does-not-exist.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_unsupported_extension_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scan.png");
    fs::write(&path, b"not really").unwrap();
    gabarito(&dir)
        .arg("answers")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}

#[test]
fn test_corrupt_pdf_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.pdf");
    fs::write(&path, b"definitely not a pdf").unwrap();
    gabarito(&dir)
        .arg("answers")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse PDF"));
}

#[test]
fn test_config_get_and_set() {
    let dir = TempDir::new().unwrap();

    gabarito(&dir)
        .args(["config", "set", "extraction.max_question_number", "300"])
        .assert()
        .success();

    gabarito(&dir)
        .args(["config", "get", "extraction.max_question_number"])
        .assert()
        .success()
        .stdout(predicate::str::contains("300"));

    gabarito(&dir)
        .args(["config", "get", "extraction.min_answers"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5"));

    gabarito(&dir)
        .args(["config", "set", "extraction.bogus", "1"])
        .assert()
        .failure();
}
