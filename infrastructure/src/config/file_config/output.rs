//! `[output]` section: how the single-shot answer is rendered

use fusion_domain::OutputFormat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// `full` (every reference answer plus the synthesis), `synthesis`
    /// (streamed answer only) or `json`. Unset means `synthesis`.
    pub format: Option<OutputFormat>,
    /// Colored terminal output. `false` also disables the dimmed summary line.
    pub color: bool,
}

impl FileOutputConfig {
    /// Format to render with once the `--output` flag has been applied
    pub fn format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_deserialize() {
        let toml_str = r#"
[output]
format = "json"
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.output.format, Some(OutputFormat::Json));
        assert_eq!(config.output.format(), OutputFormat::Json);
    }

    #[test]
    fn test_unset_format_streams_synthesis() {
        assert_eq!(FileOutputConfig::default().format(), OutputFormat::Synthesis);
    }
}
