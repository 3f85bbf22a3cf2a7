use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WeblogType {
    #[default]
    MetaWeblogApi,
    WordPress,
    Medium,
    Unknown,
}

impl WeblogType {
    /// Medium renders the leading `# ` heading itself, so it stays in the body.
    pub fn keeps_title_heading(&self) -> bool {
        matches!(self, WeblogType::Medium)
    }
}

/// A configured publishing destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct WeblogInfo {
    pub name: String,
    pub api_url: String,
    pub blog_id: String,
    pub username: String,
    #[serde(rename = "type")]
    pub weblog_type: WeblogType,
}

/// The slice of add-in configuration a decode call reads, captured once
/// per call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodeContext {
    pub last_weblog_name: String,
    pub destination: WeblogType,
}

impl DecodeContext {
    pub fn new(last_weblog_name: impl Into<String>, destination: WeblogType) -> Self {
        Self {
            last_weblog_name: last_weblog_name.into(),
            destination,
        }
    }
}
