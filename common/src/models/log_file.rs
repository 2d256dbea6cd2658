use serde::Serialize;

/// A file in a host's remote log directory that matched one of the configured prefixes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteLogFile {
    pub name: String,
    /// The prefix that selected this file.
    pub prefix: String,
}

impl RemoteLogFile {
    pub fn new(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
        }
    }

    pub fn remote_path(&self, dir: &str) -> String {
        if dir.ends_with('/') {
            format!("{dir}{}", self.name)
        } else {
            format!("{dir}/{}", self.name)
        }
    }
}
