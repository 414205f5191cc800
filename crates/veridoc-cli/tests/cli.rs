//! Command-line integration tests. None of these reach the network: the
//! Gemini key is cleared and only text inputs are used.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const AADHAAR_CARD: &str = "\
GOVERNMENT OF INDIA
JOHN DOE
DOB: 01/01/1990
MALE
Address: 221B Baker Street,
Sector 12, New Delhi 110001
1234 5678 9123
";

fn veridoc(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("veridoc").unwrap();
    cmd.env_remove("GEMINI_API_KEY")
        .env_remove("OPENAI_API_KEY")
        .env_remove("VERIDOC_LEDGER")
        .arg("--config")
        .arg(dir.path().join("config.json"))
        .arg("--ledger")
        .arg(dir.path().join("proofs.json"));
    cmd
}

fn write_card(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("aadhaar.txt");
    fs::write(&path, AADHAAR_CARD).unwrap();
    path
}

#[test]
fn help_lists_commands() {
    Command::cargo_bin("veridoc")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("verify"))
        .stdout(predicate::str::contains("proof"));
}

#[test]
fn extract_prints_json_fields() {
    let dir = TempDir::new().unwrap();
    let card = write_card(&dir);

    veridoc(&dir)
        .args(["extract", "--class", "aadhar"])
        .arg(&card)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"aadharNumber\": \"123456789123\""))
        .stdout(predicate::str::contains("\"origin\": \"ruleBased\""));
}

#[test]
fn extract_csv_uses_vocabulary_header() {
    let dir = TempDir::new().unwrap();
    let card = write_card(&dir);

    veridoc(&dir)
        .args(["extract", "--class", "aadhar", "--format", "csv"])
        .arg(&card)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "aadharNumber,name,dateOfBirth,gender,address",
        ));
}

#[test]
fn unknown_class_is_rejected() {
    let dir = TempDir::new().unwrap();
    let card = write_card(&dir);

    veridoc(&dir)
        .args(["extract", "--class", "passport"])
        .arg(&card)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown document type"));
}

#[test]
fn images_need_an_api_key() {
    let dir = TempDir::new().unwrap();
    let image = dir.path().join("card.png");
    fs::write(&image, [0x89, b'P', b'N', b'G']).unwrap();

    veridoc(&dir)
        .args(["extract", "--class", "pan"])
        .arg(&image)
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires a Gemini API key"));
}

#[test]
fn ai_flag_without_key_fails() {
    let dir = TempDir::new().unwrap();
    let card = write_card(&dir);

    veridoc(&dir)
        .args(["extract", "--class", "aadhar", "--ai"])
        .arg(&card)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--ai requires a Gemini API key"));
}

#[test]
fn verify_reports_full_confidence() {
    let dir = TempDir::new().unwrap();
    let card = write_card(&dir);

    veridoc(&dir)
        .args(["verify", "--class", "aadhar", "--rules-only"])
        .arg(&card)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Document verification successful (100% confidence)",
        ));
}

#[test]
fn verify_with_bad_edit_fails() {
    let dir = TempDir::new().unwrap();
    let card = write_card(&dir);

    veridoc(&dir)
        .args(["verify", "--class", "aadhar", "--field", "aadharNumber=12345"])
        .arg(&card)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Invalid Aadhar number format"));
}

#[test]
fn proof_codes_round_trip_through_the_ledger() {
    let dir = TempDir::new().unwrap();
    let card = write_card(&dir);

    let output = veridoc(&dir)
        .args(["proof", "generate", "--class", "aadhar"])
        .arg(&card)
        .output()
        .unwrap();
    assert!(output.status.success());
    let code = String::from_utf8(output.stdout).unwrap().trim().to_string();
    assert_eq!(code.len(), 43);

    veridoc(&dir)
        .args(["proof", "list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(code.as_str()));

    veridoc(&dir)
        .args(["proof", "check", "--class", "aadhar", "--code", &code])
        .arg(&card)
        .assert()
        .success()
        .stdout(predicate::str::contains("Proof code matches"));

    veridoc(&dir)
        .args(["proof", "check", "--class", "aadhar", "--code", &code])
        .args(["--field", "name=JANE DOE"])
        .arg(&card)
        .assert()
        .failure();

    veridoc(&dir)
        .args(["proof", "remove", &code])
        .assert()
        .success();

    veridoc(&dir)
        .args(["proof", "remove", &code])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Proof code not found"));
}

#[test]
fn config_init_get_set() {
    let dir = TempDir::new().unwrap();

    veridoc(&dir).args(["config", "init"]).assert().success();
    assert!(dir.path().join("config.json").exists());

    veridoc(&dir)
        .args(["config", "get", "extraction.min_subject_rows"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4"));

    veridoc(&dir)
        .args(["config", "set", "proofs.max_entries", "5"])
        .assert()
        .success();

    veridoc(&dir)
        .args(["config", "get", "proofs.max_entries"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5"));

    veridoc(&dir)
        .args(["config", "get", "storage.path"])
        .assert()
        .failure();
}

#[test]
fn batch_writes_summary() {
    let dir = TempDir::new().unwrap();
    write_card(&dir);
    fs::write(dir.path().join("blank.txt"), "   \n").unwrap();
    let out = dir.path().join("out");

    veridoc(&dir)
        .args(["batch", "--class", "aadhar", "--summary", "--continue-on-error"])
        .arg(dir.path().join("*.txt").to_string_lossy().as_ref())
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 verified"));

    assert!(out.join("aadhaar.json").exists());
    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.starts_with("filename,status,valid"));
    assert!(summary.contains("aadhaar.txt,success,true,100"));
    assert!(summary.contains("blank.txt,error"));
}
