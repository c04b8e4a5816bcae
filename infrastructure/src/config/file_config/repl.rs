//! `[repl]` section: settings for `--chat` mode

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReplConfig {
    /// Per-target ✓/✗ lines and the streamed synthesis for each question.
    /// `--quiet` turns this off regardless.
    pub show_progress: bool,
    /// Line history file. Unset means `history.txt` in the agent-fusion
    /// data directory.
    pub history_file: Option<String>,
}

impl FileReplConfig {
    pub fn history_path(&self) -> Option<PathBuf> {
        self.history_file
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
    }
}

impl Default for FileReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            history_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_path() {
        assert_eq!(FileReplConfig::default().history_path(), None);

        let blank = FileReplConfig {
            history_file: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(blank.history_path(), None);

        let config: super::super::FileConfig =
            toml::from_str("[repl]\nhistory_file = \"/tmp/fusion-history\"\n").unwrap();
        assert_eq!(
            config.repl.history_path(),
            Some(PathBuf::from("/tmp/fusion-history"))
        );
    }
}
