use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid service-account key file {}: {source}", .path.display())]
    KeyFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("missing {key} (set it in the config file or {env})")]
    Missing { key: &'static str, env: &'static str },

    #[error("invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
}
