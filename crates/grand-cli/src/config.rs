use anyhow::{Context, Result};
use grand_lib::OptionValue;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
        }
    }
}

/// Contents of the optional `--config` TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub render: RenderConfig,
    /// Option pairs applied before the command-line pairs
    pub defaults: BTreeMap<String, OptionValue>,
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// `[defaults]` flattened into the key/value list the resolver takes.
    pub fn default_pairs(&self) -> Vec<OptionValue> {
        self.defaults
            .iter()
            .flat_map(|(key, value)| [OptionValue::Text(key.clone()), value.clone()])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_render_and_defaults() {
        let cfg: CliConfig = toml::from_str(
            "[render]\nwidth = 1024\n\n[defaults]\nci = \"on\"\nxlim = [-200, 600]\n",
        )
        .unwrap();
        assert_eq!(cfg.render.width, 1024);
        assert_eq!(cfg.render.height, 480);
        assert_eq!(
            cfg.default_pairs(),
            vec![
                OptionValue::Text("ci".into()),
                OptionValue::Text("on".into()),
                OptionValue::Text("xlim".into()),
                OptionValue::Numbers(vec![-200.0, 600.0]),
            ]
        );
    }

    #[test]
    fn empty_file_uses_builtin_defaults() {
        let cfg: CliConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.render, RenderConfig::default());
        assert!(cfg.default_pairs().is_empty());
    }

    #[test]
    fn rejects_unknown_sections() {
        assert!(toml::from_str::<CliConfig>("[colours]\nmean = 1\n").is_err());
    }
}
