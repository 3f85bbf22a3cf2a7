use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetaErr {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("{context}:\n {source}")]
    Context {
        context: String,
        #[source]
        source: Box<MetaErr>,
    },
    #[error("{0}")]
    Message(String),
}

impl From<String> for MetaErr {
    fn from(value: String) -> Self {
        MetaErr::Message(value)
    }
}

impl From<&str> for MetaErr {
    fn from(value: &str) -> Self {
        MetaErr::Message(value.to_string())
    }
}

pub trait ContextExt<T> {
    fn with_context<F>(self, f: F) -> Result<T, MetaErr>
    where
        F: FnOnce() -> String;
}

impl<T, E> ContextExt<T> for Result<T, E>
where
    E: Into<MetaErr>,
{
    fn with_context<F>(self, f: F) -> Result<T, MetaErr>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| MetaErr::Context {
            context: f(),
            source: Box::new(err.into()),
        })
    }
}

/// Recovered failures while reading a metadata block. They never abort a
/// decode, they only downgrade its outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "camelCase")]
pub enum ParseIssue {
    #[error("front matter is not a valid metadata mapping: {0}")]
    FrontMatter(String),
    #[error("custom fields block is not valid XML: {0}")]
    CustomFields(String),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn context_wraps_the_source_error() {
        let res: Result<(), io::Error> = Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let err = res.with_context(|| "reading post.md".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "reading post.md:\n IO error: gone");
    }

    #[test]
    fn messages_convert_from_str() {
        let err: MetaErr = "weblog not configured".into();
        assert_eq!(err.to_string(), "weblog not configured");
    }
}
