//! OWNERS file parsing

use base64::Engine as _;
use serde::Deserialize;
use std::collections::HashSet;

/// Name of the OWNERS file, at the repository root and in SIG directories
pub const OWNERS_FILE: &str = "OWNERS";

/// An OWNERS file as stored in the repository
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct OwnersFile {
    #[serde(default)]
    pub maintainers: Vec<String>,
    #[serde(default)]
    pub committers: Vec<String>,
}

impl OwnersFile {
    /// Parse the YAML document
    pub fn from_yaml(content: &[u8]) -> Result<Self, serde_yaml::Error> {
        // An empty document deserialises to unit, not to an empty mapping.
        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_yaml::from_slice(content)
    }

    /// Maintainers and committers together
    pub fn owners(&self) -> HashSet<String> {
        self.maintainers
            .iter()
            .chain(self.committers.iter())
            .cloned()
            .collect()
    }
}

/// Decode a base64-encoded OWNERS file into its set of owners
///
/// A file that cannot be decoded or parsed yields no owners, so a broken
/// OWNERS file never grants anything.
pub fn decode_owners(content: &str) -> HashSet<String> {
    // The contents API wraps base64 at 60 columns.
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();

    let bytes = match base64::engine::general_purpose::STANDARD.decode(compact) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::error!("Failed to decode OWNERS content: {}", e);
            return HashSet::new();
        }
    };

    match OwnersFile::from_yaml(&bytes) {
        Ok(file) => file.owners(),
        Err(e) => {
            log::error!("Failed to parse OWNERS file: {}", e);
            HashSet::new()
        }
    }
}

#[cfg(test)]
pub(crate) fn encode_owners(maintainers: &[&str], committers: &[&str]) -> String {
    let yaml = format!(
        "maintainers: [{}]\ncommitters: [{}]\n",
        maintainers.join(", "),
        committers.join(", ")
    );
    base64::engine::general_purpose::STANDARD.encode(yaml)
}
