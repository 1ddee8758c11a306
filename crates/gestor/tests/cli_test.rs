//! Integration tests for the `gestor` CLI binary.
//!
//! Parsing, help, completions and local error paths run without a backend;
//! the record commands run against a wiremock server via `--base-url`.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

const NO_CONFIG: &str = "/tmp/gestor-cli-test-nonexistent/config.toml";

/// Build a [`Command`] for the `gestor` binary with env isolation.
///
/// Clears all `GESTOR_*` env vars and points the config file at a
/// nonexistent path so tests never touch the user's real configuration.
fn gestor_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("gestor");
    cmd.env("HOME", "/tmp/gestor-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/gestor-cli-test-nonexistent")
        .env("GESTOR_CONFIG", NO_CONFIG)
        .env_remove("GESTOR_BASE_URL")
        .env_remove("GESTOR_OUTPUT")
        .env_remove("GESTOR_INSECURE")
        .env_remove("GESTOR_TIMEOUT")
        .env_remove("GESTOR_REQUEST_TIMEOUT")
        .env_remove("GESTOR_SEARCH_RETENTION")
        .env_remove("GESTOR_FULL_LIST")
        .env_remove("RUST_LOG");
    cmd
}

/// `gestor --base-url <mock>/api <args>`, run off the async runtime.
async fn run_against(server: &MockServer, args: &[&str]) -> std::process::Output {
    let mut cmd = gestor_cmd();
    cmd.arg("--base-url")
        .arg(format!("{}/api", server.uri()))
        .args(args);
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn envelope(results: serde_json::Value, total_pages: u32) -> serde_json::Value {
    let count = results.as_array().map_or(0, Vec::len);
    json!({"results": results, "count": count, "total_pages": total_pages, "page_size": 10})
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = gestor_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    gestor_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("product")
            .and(predicate::str::contains("payment-method"))
            .and(predicate::str::contains("stock-movement"))
            .and(predicate::str::contains("report"))
            .and(predicate::str::contains("--base-url")),
    );
}

#[test]
fn test_version_flag() {
    gestor_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gestor"));
}

#[test]
fn test_record_subcommands_exist() {
    gestor_cmd()
        .args(["supplier", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("next"))
                .and(predicate::str::contains("prev"))
                .and(predicate::str::contains("all"))
                .and(predicate::str::contains("create"))
                .and(predicate::str::contains("update"))
                .and(predicate::str::contains("delete"))
                .and(predicate::str::contains("deps")),
        );
}

#[test]
fn test_stock_has_extra_actions() {
    gestor_cmd()
        .args(["stock", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("move")
                .and(predicate::str::contains("movements"))
                .and(predicate::str::contains("list")),
        );
}

#[test]
fn test_completions_zsh() {
    gestor_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_invalid_subcommand() {
    let output = gestor_cmd().arg("warehouse").output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_invalid_output_format() {
    let output = gestor_cmd()
        .args(["--output", "xml", "entities"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Local commands ──────────────────────────────────────────────────

#[test]
fn test_entities_table() {
    gestor_cmd().arg("entities").assert().success().stdout(
        predicate::str::contains("produtos")
            .and(predicate::str::contains("formas-pagamento?ativo=true"))
            .and(predicate::str::contains("vendas?status=P")),
    );
}

#[test]
fn test_entities_plain_lists_names() {
    let output = gestor_cmd()
        .args(["-o", "plain", "entities"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let names: Vec<&str> = stdout.lines().collect();
    assert_eq!(names.len(), 15);
    assert!(names.contains(&"payment-method"));
    assert!(names.contains(&"stock-report"));
}

#[test]
fn test_config_path_follows_env() {
    gestor_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(NO_CONFIG));
}

#[test]
fn test_config_show_defaults() {
    gestor_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("base_url = \"http://localhost:8000/api\"")
                .and(predicate::str::contains("search_retention = \"reset\""))
                .and(predicate::str::contains("full_list = \"invalidate_on_write\"")),
        );
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let path_arg = path.to_str().unwrap();

    gestor_cmd()
        .args(["--config", path_arg, "--base-url", "https://erp.example.com/api"])
        .args(["config", "init"])
        .assert()
        .success();
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("https://erp.example.com/api"));

    let output = gestor_cmd()
        .args(["--config", path_arg, "config", "init"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("already exists"));

    gestor_cmd()
        .args(["--config", path_arg, "--yes", "config", "init", "--force"])
        .assert()
        .success();
    let rewritten = std::fs::read_to_string(&path).unwrap();
    assert!(rewritten.contains("http://localhost:8000/api"));
}

#[test]
fn test_config_file_output_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "output = \"json\"\n").unwrap();

    let output = gestor_cmd()
        .args(["--config", path.to_str().unwrap(), "entities"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 15);
}

#[test]
fn test_create_requires_payload() {
    let output = gestor_cmd().args(["product", "create"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_create_rejects_non_object_payload() {
    let output = gestor_cmd()
        .args(["product", "create", "--data", "[1, 2]"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("expected a JSON object"));
}

#[test]
fn test_delete_without_yes_is_refused_non_interactively() {
    let output = gestor_cmd()
        .args(["customer", "delete", "5"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("requires confirmation"));
}

#[test]
fn test_unreachable_backend_is_connection_error() {
    let output = gestor_cmd()
        .args(["--base-url", "http://127.0.0.1:9/api", "--timeout", "2"])
        .args(["role", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7));
    assert!(combined_output(&output).contains("Could not reach the backend"));
}

// ── Against a backend ───────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_list_prints_page_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cargos/"))
        .and(query_param("page", "2"))
        .and(query_param("search", "ger"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": 11, "nome": "Gerente"}],
            "count": 11,
            "total_pages": 2,
            "page_size": 10
        })))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(
        &server,
        &["-o", "json", "role", "list", "--page", "2", "--search", "ger"],
    )
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let page: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(page["page"], 2);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["items"][0]["nome"], "Gerente");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_table_output_has_footer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/produtos/"))
        .and(query_param("ordering", "-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            json!([{"id": 2, "nome": "Café"}, {"id": 1, "nome": "Arroz"}]),
            1,
        )))
        .mount(&server)
        .await;

    let output = run_against(&server, &["product", "list"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Café"));
    assert!(stdout.contains("Page 1/1 · 2 record(s)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_next_on_last_page_makes_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/categorias/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(json!([{"id": 1}]), 1)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(&server, &["-o", "plain", "category", "next"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Already on the last page"));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "1");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_next_loads_current_page_then_steps() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/categorias/"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(json!([{"id": 1}]), 2)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/categorias/"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(json!([{"id": 2}]), 2)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(&server, &["-o", "plain", "category", "next"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "2");
}

#[test]
fn test_next_help_mentions_two_requests() {
    gestor_cmd()
        .args(["category", "next", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("two requests"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_posts_without_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/produtos/"))
        .and(body_json(json!({"nome": "Feijão", "preco": "8.50"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 12, "nome": "Feijão", "preco": "8.50"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(
        &server,
        &[
            "-o",
            "plain",
            "product",
            "create",
            "--data",
            r#"{"id": 99, "nome": "Feijão", "preco": "8.50"}"#,
        ],
    )
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "12");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_record_shows_field_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/clientes/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "cpf": ["Este campo é obrigatório."]
        })))
        .mount(&server)
        .await;

    let output = run_against(&server, &["customer", "create", "--data", r#"{"nome": "Ana"}"#]).await;
    assert_eq!(output.status.code(), Some(6));
    let text = combined_output(&output);
    assert!(text.contains("rejected"), "{text}");
    assert!(text.contains("cpf: Este campo é obrigatório."), "{text}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_missing_record_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/clientes/7/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(&server, &["--yes", "customer", "delete", "7"]).await;
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("customer '7' not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stock_create_is_refused_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let output = run_against(
        &server,
        &["stock", "create", "--data", r#"{"produto": 1, "quantidade": 5}"#],
    )
    .await;
    assert_eq!(output.status.code(), Some(5));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stock_move_then_shows_stock() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/movimentacoes-estoque/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 31, "produto": 4, "tipo": "E", "quantidade": 10
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/estoques/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            json!([{"id": 1, "produto": 4, "quantidade": 25}]),
            1,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(
        &server,
        &[
            "-o",
            "json-compact",
            "stock",
            "move",
            "--data",
            r#"{"produto": 4, "tipo": "E", "quantidade": 10}"#,
        ],
    )
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Stock movement 31 registered"));
    let page: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(page["items"][0]["quantidade"], 25);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_deps_reports_failed_slot_and_prints_the_rest() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/formas-pagamento/"))
        .and(query_param("ativo", "true"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(json!([{"id": 1, "nome": "Pix"}]), 1)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/vendas/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let output = run_against(&server, &["-o", "json", "payment", "deps"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stderr).contains("warning: vendas"));

    let sets: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(sets["formas-pagamento"][0]["nome"], "Pix");
    assert!(sets.get("vendas").is_none());
}
