//! Command-line smoke tests.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const INVOICES: &str = "cliente,total,pagado\nA,100,100\nB,100,40\nC,100,0\n";

fn cobro() -> Command {
    Command::cargo_bin("cobro").unwrap()
}

fn write(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_classify_text_summary() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "facturas.csv", INVOICES);

    cobro()
        .args(["classify", &input])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mode: amount"))
        .stdout(predicate::str::contains("Paid:         1"))
        .stdout(predicate::str::contains("Partial:      1"))
        .stdout(predicate::str::contains("Unpaid:       1"));
}

#[test]
fn test_classify_json_output() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "facturas.csv", INVOICES);

    let output = cobro()
        .args(["classify", &input, "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["mode"], "amount");
    assert_eq!(json["partial"][0]["cliente"], "B");
    assert_eq!(json["partial"][0]["Pending"], 60.0);
}

#[test]
fn test_classify_csv_export() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "facturas.csv", INVOICES);
    let out = dir.path().join("out");

    cobro()
        .args(["classify", &input, "--format", "csv", "--output-dir"])
        .arg(&out)
        .assert()
        .success();

    for name in ["paid", "partial", "unpaid", "unclassified"] {
        assert!(out.join(format!("{}.csv", name)).exists(), "missing {}.csv", name);
    }
    let partial = fs::read_to_string(out.join("partial.csv")).unwrap();
    assert_eq!(partial, "cliente,total,pagado,Total,Paid,Pending\nB,100,40,100,40,60\n");
}

#[test]
fn test_classify_csv_requires_output_dir() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "facturas.csv", INVOICES);

    cobro()
        .args(["classify", &input, "--format", "csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output-dir"));
}

#[test]
fn test_classify_xlsx_workbook_reads_back() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "facturas.csv", INVOICES);
    let out = dir.path().join("out");

    cobro()
        .args(["classify", &input, "--format", "xlsx", "--output-dir"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Workbook written"));

    // The first sheet holds the paid partition
    let workbook = out.join("classification.xlsx");
    cobro()
        .arg("classify")
        .arg(&workbook)
        .assert()
        .success()
        .stdout(predicate::str::contains("Mode: amount"))
        .stdout(predicate::str::contains("Paid:         1"))
        .stdout(predicate::str::contains("Unpaid:       0"));
}

#[test]
fn test_classify_xlsx_requires_output_dir() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "facturas.csv", INVOICES);

    cobro()
        .args(["classify", &input, "--format", "xlsx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output-dir"));
}

#[test]
fn test_classify_without_basis_fails() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "clientes.csv", "cliente,fecha\nA,2024-01-01\n");

    cobro()
        .args(["classify", &input])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no total or status column"));
}

#[test]
fn test_classify_status_with_separate_undetermined() {
    let dir = TempDir::new().unwrap();
    let input = write(
        &dir,
        "estados.json",
        r#"[{"cliente": "A", "estado": "Pagada"}, {"cliente": "B", "estado": "en trámite"}]"#,
    );

    cobro()
        .args(["classify", &input, "--separate-undetermined"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mode: status"))
        .stdout(predicate::str::contains("Unclassified: 1"));
}

#[test]
fn test_classify_glob_with_text_document() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.txt", "Factura Nº: A-001\nCliente: ACME\nEstado: No pagada\nTotal: 1.234,56€");
    write(&dir, "b.txt", "Factura Nº: A-002\nCliente: Beta\nEstado: Pagada\nTotal: 10,00€");
    let pattern = dir.path().join("*.txt").to_string_lossy().into_owned();

    cobro()
        .args(["classify", &pattern])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unpaid:       2"));
}

#[test]
fn test_classify_missing_input() {
    cobro()
        .args(["classify", "/nonexistent/facturas.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn test_extract_text_document() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "factura.txt", "Factura Nº: A-001\nCliente: ACME\nEstado: No pagada\nTotal: 1.234,56€");

    cobro()
        .args(["extract", &input, "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Invoice: A-001"))
        .stdout(predicate::str::contains("Client:  ACME"))
        .stdout(predicate::str::contains("Status:  Unpaid"))
        .stdout(predicate::str::contains("Amount:  1234.56"));
}

#[test]
fn test_config_init_and_get() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");

    cobro()
        .args(["config", "init", "--output"])
        .arg(&config)
        .assert()
        .success();
    assert!(config.exists());

    cobro()
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "classification.undetermined"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"partial\""));
}

#[test]
fn test_config_set_changes_classification() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    let input = write(
        &dir,
        "estados.csv",
        "cliente,estado\nA,Pagada\nB,en trámite\n",
    );

    cobro()
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "classification.undetermined", "separate"])
        .assert()
        .success();

    cobro()
        .arg("--config")
        .arg(&config)
        .args(["classify", &input])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unclassified: 1"));
}

#[test]
fn test_config_set_rejects_unknown_key() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");

    cobro()
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "classification.nope", "1"])
        .assert()
        .failure();
}
