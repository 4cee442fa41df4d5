use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const INVOICE: &str = "ALFA TRADE DOO
PIB: 101234567
Tekući račun: 160-0000000123456-12
Broj fakture: 2024-0153
Datum prometa: 05.03.2024
Datum dospeća: 20.03.2024
Iznos za plaćanje: 8.831,23 RSD
";

fn racun(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("racun").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.path()).env("HOME", home.path());
    cmd
}

#[test]
fn extract_from_stdin_prints_json() {
    let home = TempDir::new().unwrap();
    racun(&home)
        .arg("extract")
        .write_stdin(INVOICE)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"supplierName\": \"ALFA TRADE DOO\""))
        .stdout(predicate::str::contains("\"amount\": \"8831.23\""))
        .stdout(predicate::str::contains("\"dueDate\": \"2024-03-20\""))
        .stdout(predicate::str::contains("rawText").not());
}

#[test]
fn extract_single_field_from_file() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("strip.txt");
    fs::write(&input, "  12.480,00  ").unwrap();

    racun(&home)
        .args(["extract", "--field", "iznosZaPlacanje"])
        .arg(&input)
        .assert()
        .success()
        .stdout("12480.00\n");
}

#[test]
fn extract_csv_output() {
    let home = TempDir::new().unwrap();
    racun(&home)
        .args(["extract", "-", "--format", "csv"])
        .write_stdin("PIB: 123456789")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "supplierName,taxId,invoiceNumber,amount,transactionDate,dueDate,bankAccount\n",
        ))
        .stdout(predicate::str::contains(",123456789,"));
}

#[test]
fn extract_rejects_unknown_field() {
    let home = TempDir::new().unwrap();
    racun(&home)
        .args(["extract", "--field", "napomena"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown field: napomena"));
}

#[test]
fn extract_explain_lists_candidates() {
    let home = TempDir::new().unwrap();
    racun(&home)
        .args(["extract", "--explain", "--field", "invoiceNumber"])
        .write_stdin("VP999\nbroj fakture: ABC123")
        .assert()
        .success()
        .stdout(predicate::str::contains("* ABC123"))
        .stdout(predicate::str::contains("vp_number"));
}

#[test]
fn scan_text_file_without_models() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("invoice.txt");
    fs::write(&input, INVOICE).unwrap();

    racun(&home)
        .args(["scan", "--format", "text"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("8.831,23 RSD"))
        .stdout(predicate::str::contains("101234567"));
}

#[test]
fn scan_image_without_models_fails_with_hint() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("invoice.png");
    fs::write(&input, b"\x89PNG\r\n\x1a\n").unwrap();

    racun(&home)
        .arg("scan")
        .arg(&input)
        .args(["--model-dir"])
        .arg(home.path().join("no-models"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--model-dir"));
}

#[test]
fn scan_missing_file() {
    let home = TempDir::new().unwrap();
    racun(&home)
        .args(["scan", "does-not-exist.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn batch_writes_summary() {
    let home = TempDir::new().unwrap();
    let inputs = home.path().join("inbox");
    let out = home.path().join("out");
    fs::create_dir_all(&inputs).unwrap();
    fs::write(inputs.join("a.txt"), INVOICE).unwrap();
    fs::write(inputs.join("b.txt"), "Prodavac: Beta DOO\nZa uplatu: 480,00").unwrap();

    racun(&home)
        .arg("batch")
        .arg(format!("{}/*.txt", inputs.display()))
        .arg("--output-dir")
        .arg(&out)
        .arg("--summary")
        .assert()
        .success();

    assert!(out.join("a.json").exists());
    let b = fs::read_to_string(out.join("b.json")).unwrap();
    assert!(b.contains("\"amount\": \"480.00\""));

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("filename,status,supplierName"));
    assert!(lines[1].starts_with("a.txt,success,ALFA TRADE DOO,101234567,2024-0153,8831.23"));
    assert!(lines[2].starts_with("b.txt,success,Beta DOO"));
}

#[test]
fn config_init_get_set() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("racun.json");

    racun(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(config.exists());

    racun(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "pdf.min_text_length", "10"])
        .assert()
        .success();

    racun(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "pdf.min_text_length"])
        .assert()
        .success()
        .stdout("10\n");

    racun(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "pdf.min_text_length", "\"many\""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value"));

    racun(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "ocr.nope"])
        .assert()
        .failure();
}

#[test]
fn config_default_format_applies_to_extract() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("racun.json");
    fs::write(&config, r#"{"output": {"default_format": "csv"}}"#).unwrap();

    racun(&home)
        .arg("--config")
        .arg(&config)
        .arg("extract")
        .write_stdin("PIB: 123456789")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("supplierName,"));
}
