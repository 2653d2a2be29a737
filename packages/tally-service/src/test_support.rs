//! Shared fixtures for the unit tests in this crate.

pub(crate) const CONFIG_TOML: &str = r#"
[service]
http_bind = "127.0.0.1:8080"
log_level = "info"

[providers.embedding]
api_base   = "http://127.0.0.1:9000"
api_key    = "test-key"
model      = "bge-m3"
dimensions = 8
timeout_ms = 100

[providers.phrasing]
api_base    = "http://127.0.0.1:9001"
api_key     = "test-key"
path        = "/v1/chat/completions"
model       = "narrator"
temperature = 0.0
timeout_ms  = 100

[providers.vector_search]
api_base   = "http://127.0.0.1:9002"
api_key    = "test-key"
path       = "/v1/search"
top_k      = 10
timeout_ms = 100
"#;

pub(crate) fn config() -> tally_config::Config {
	match toml::from_str(CONFIG_TOML) {
		Ok(cfg) => cfg,
		Err(err) => panic!("test config must parse: {err}"),
	}
}
