//! General application configuration.

use serde::{Deserialize, Serialize};

const fn default_progress() -> bool {
    true
}

fn default_format() -> String {
    String::from("json")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Whether to draw progress bars during batch uploads and deletes.
    #[serde(default = "default_progress")]
    pub progress: bool,

    /// Output format used when `--format` is not given (`json`, `table`, `raw`).
    #[serde(default = "default_format")]
    pub default_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            progress: default_progress(),
            default_format: default_format(),
        }
    }
}
