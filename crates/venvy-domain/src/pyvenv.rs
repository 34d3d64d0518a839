use std::collections::HashMap;

/// The marker file that makes a directory a virtual environment.
pub const PYVENV_CFG: &str = "pyvenv.cfg";

/// Parsed `pyvenv.cfg` contents. The format is line-oriented `key = value`;
/// the first `=` on a line is the delimiter and lines without one are
/// ignored. An empty parse means the directory is not an environment.
#[derive(Clone, Debug, Default)]
pub struct PyvenvCfg {
    entries: HashMap<String, String>,
}

impl PyvenvCfg {
    pub fn parse(contents: &str) -> Self {
        let mut entries = HashMap::new();
        for line in contents.lines() {
            if let Some((key, value)) = line.split_once('=') {
                entries.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// `version`, falling back to `version_info`, falling back to "unknown".
    pub fn version(&self) -> String {
        self.get("version")
            .or_else(|| self.get("version_info"))
            .unwrap_or("unknown")
            .to_string()
    }

    pub fn home(&self) -> String {
        self.get("home").unwrap_or_default().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keys_and_ignores_malformed_lines() {
        let cfg = PyvenvCfg::parse("version = 3.11.4\nhome = /usr/local\nincluded = true\n\nno delimiter here\n");
        assert_eq!(cfg.version(), "3.11.4");
        assert_eq!(cfg.home(), "/usr/local");
        assert_eq!(cfg.get("included"), Some("true"));
        assert_eq!(cfg.get("no delimiter here"), None);
    }

    #[test]
    fn first_equals_sign_delimits() {
        let cfg = PyvenvCfg::parse("command = /usr/bin/python3 -m venv --prompt=x /tmp/x\n");
        assert_eq!(
            cfg.get("command"),
            Some("/usr/bin/python3 -m venv --prompt=x /tmp/x")
        );
    }

    #[test]
    fn version_info_is_the_fallback_key() {
        let cfg = PyvenvCfg::parse("version_info = 3.12.1\n");
        assert_eq!(cfg.version(), "3.12.1");
        let cfg = PyvenvCfg::parse("home = /x\n");
        assert_eq!(cfg.version(), "unknown");
    }

    #[test]
    fn empty_or_delimiterless_input_parses_to_nothing() {
        assert!(PyvenvCfg::parse("").is_empty());
        assert!(PyvenvCfg::parse("just some text\nanother line\n").is_empty());
        assert_eq!(PyvenvCfg::parse("").home(), "");
    }
}
