//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for safe, sandboxed env var manipulation.

use dash_config::{BucketKind, DashConfig, StoreBackend};
use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};

#[test]
fn loads_api_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[api]
base_url = "https://dash.example.org"
timeout_secs = 5
"#,
        )?;

        let config: DashConfig = Figment::from(Serialized::defaults(DashConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.api.base_url, "https://dash.example.org");
        assert_eq!(config.api.timeout_secs, 5);
        assert!(config.api.is_configured());
        Ok(())
    });
}

#[test]
fn loads_bucket_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[store]
backend = "object_store"

[bucket]
kind = "s3"
bucket_name = "toml-bucket"
region = "auto"
endpoint = "http://localhost:9000"
access_key_id = "toml-key"
secret_access_key = "toml-secret"
"#,
        )?;

        let config: DashConfig = Figment::from(Serialized::defaults(DashConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.store.backend, StoreBackend::ObjectStore);
        assert_eq!(config.bucket.kind, BucketKind::S3);
        assert_eq!(config.bucket.bucket_name, "toml-bucket");
        assert_eq!(config.bucket.endpoint, "http://localhost:9000");
        assert_eq!(config.bucket.prefix, "studies");
        assert!(config.bucket.is_configured());
        Ok(())
    });
}

#[test]
fn project_file_is_picked_up_by_load() {
    Jail::expect_with(|jail| {
        jail.create_dir(".studydash")?;
        jail.create_file(
            ".studydash/config.toml",
            r#"
[general]
progress = false
default_format = "table"
"#,
        )?;

        let config = DashConfig::load().expect("config loads");
        assert!(!config.general.progress);
        assert_eq!(config.general.default_format, "table");
        Ok(())
    });
}

#[test]
fn env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[api]
base_url = "http://from-toml"
"#,
        )?;
        jail.set_env("STUDYDASH_API__BASE_URL", "http://from-env");

        let config: DashConfig = Figment::from(Serialized::defaults(DashConfig::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("STUDYDASH_").split("__"))
            .extract()?;

        assert_eq!(config.api.base_url, "http://from-env");
        Ok(())
    });
}

#[test]
fn invalid_backend_is_an_error() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[store]
backend = "carrier_pigeon"
"#,
        )?;

        let result: Result<DashConfig, _> =
            Figment::from(Serialized::defaults(DashConfig::default()))
                .merge(Toml::file("config.toml"))
                .extract();

        assert!(result.is_err());
        Ok(())
    });
}
