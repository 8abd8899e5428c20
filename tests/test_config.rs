use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use mws::config::Config;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| vars.get(key).cloned()
}

#[test]
fn test_config_defaults() {
    let cfg = Config::default();

    assert_eq!(cfg.port, 80);
    assert_eq!(cfg.document_root, PathBuf::from("./mws_root"));
    assert_eq!(cfg.index_file, "index.html");
    assert_eq!(cfg.max_line_len, 500);
    assert_eq!(cfg.backlog, 20);
    assert_eq!(cfg.listen_addr(), "0.0.0.0:80");
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_config_from_yaml() {
    let cfg = Config::from_yaml_str(
        "host: 127.0.0.1\nport: 8080\ndocument_root: /srv/www\nread_timeout_ms: 2500\n",
    )
    .unwrap();

    assert_eq!(cfg.listen_addr(), "127.0.0.1:8080");
    assert_eq!(cfg.document_root, PathBuf::from("/srv/www"));
    assert_eq!(cfg.read_timeout(), Duration::from_millis(2500));
    // Unset keys keep their defaults
    assert_eq!(cfg.server_name, "Minimal Web Server");
}

#[test]
fn test_config_empty_yaml_is_default() {
    let cfg = Config::from_yaml_str("").unwrap();

    assert_eq!(cfg.port, 80);
}

#[test]
fn test_config_yaml_rejects_unknown_keys() {
    assert!(Config::from_yaml_str("prot: 8080\n").is_err());
}

#[test]
fn test_config_yaml_rejects_bad_port() {
    assert!(Config::from_yaml_str("port: 70000\n").is_err());
}

#[test]
fn test_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mws.yaml");
    std::fs::write(&path, "port: 9000\nindex_file: default.htm\n").unwrap();

    let cfg = Config::from_file(&path).unwrap();

    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.index_file, "default.htm");
}

#[test]
fn test_config_from_missing_file() {
    assert!(Config::from_file("/definitely/not/here.yaml").is_err());
}

#[test]
fn test_config_env_overrides() {
    let mut cfg = Config::default();

    cfg.apply_overrides(lookup(&[
        ("MWS_HOST", "127.0.0.1"),
        ("MWS_PORT", "3000"),
        ("MWS_ROOT", "/var/www"),
        ("MWS_SERVER_NAME", "Tiny webserver"),
        ("MWS_MAX_LINE", "1024"),
        ("MWS_LOG", "debug"),
    ]))
    .unwrap();

    assert_eq!(cfg.listen_addr(), "127.0.0.1:3000");
    assert_eq!(cfg.document_root, PathBuf::from("/var/www"));
    assert_eq!(cfg.server_name, "Tiny webserver");
    assert_eq!(cfg.max_line_len, 1024);
    assert_eq!(cfg.level().unwrap(), tracing::Level::DEBUG);
}

#[test]
fn test_config_no_overrides_keeps_values() {
    let mut cfg = Config::from_yaml_str("port: 8081\n").unwrap();

    cfg.apply_overrides(lookup(&[])).unwrap();

    assert_eq!(cfg.port, 8081);
}

#[test]
fn test_config_env_override_bad_number() {
    let mut cfg = Config::default();

    assert!(cfg.apply_overrides(lookup(&[("MWS_PORT", "eighty")])).is_err());
    assert!(cfg.apply_overrides(lookup(&[("MWS_READ_TIMEOUT_MS", "-1")])).is_err());
}

#[test]
fn test_config_validate_line_len() {
    let mut cfg = Config::default();
    cfg.max_line_len = 2;

    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("max_line_len"));
}

#[test]
fn test_config_validate_timeout_and_backlog() {
    let mut cfg = Config::default();
    cfg.read_timeout_ms = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = Config::default();
    cfg.backlog = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn test_config_validate_index_file() {
    let mut cfg = Config::default();
    cfg.index_file = "sub/index.html".to_string();
    assert!(cfg.validate().is_err());

    cfg.index_file = String::new();
    assert!(cfg.validate().is_err());
}

#[test]
fn test_config_validate_server_name_header_injection() {
    let mut cfg = Config::default();
    cfg.server_name = "mws\r\nX-Evil: 1".to_string();

    assert!(cfg.validate().is_err());
}

#[test]
fn test_config_validate_log_level() {
    let mut cfg = Config::default();
    cfg.log_level = "loud".to_string();

    assert!(cfg.validate().is_err());
}

#[test]
fn test_config_clone() {
    let cfg1 = Config::default();
    let cfg2 = cfg1.clone();
    assert_eq!(cfg1.listen_addr(), cfg2.listen_addr());
}

#[test]
fn test_config_listen_addr_brackets_ipv6() {
    let mut cfg = Config::default();

    cfg.host = "::".to_string();
    assert_eq!(cfg.listen_addr(), "[::]:80");

    cfg.host = "[::1]".to_string();
    assert_eq!(cfg.listen_addr(), "[::1]:80");

    cfg.host = "localhost".to_string();
    assert_eq!(cfg.listen_addr(), "localhost:80");
}

#[test]
fn test_config_ipv6_listen_addr_parses() {
    let mut cfg = Config::default();
    cfg.host = "::1".to_string();
    cfg.port = 8080;

    let addr: std::net::SocketAddr = cfg.listen_addr().parse().unwrap();
    assert!(addr.is_ipv6());
    assert_eq!(addr.port(), 8080);
}
