use serde::{Deserialize, Serialize};

/// Display-mode preference, persisted under its own storage key beside the
/// task list. Stored as a bare boolean for compatibility with older
/// snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DarkMode(pub bool);

impl DarkMode {
    pub fn label(self) -> &'static str {
        if self.0 { "dark" } else { "light" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_bare_boolean() {
        assert_eq!(serde_json::to_string(&DarkMode(true)).unwrap(), "true");
        let d: DarkMode = serde_json::from_str("false").unwrap();
        assert_eq!(d, DarkMode(false));
    }
}
