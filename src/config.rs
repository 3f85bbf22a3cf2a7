use std::{
    fs::{File, create_dir_all},
    io::ErrorKind,
    path::{Path, PathBuf},
};

use directories::{BaseDirs, ProjectDirs};
use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{ContextExt, MetaErr},
    weblog::{DecodeContext, WeblogInfo, WeblogType},
};

const CONFIG_FILE_NAME: &str = "weblog-addin.json";
const POSTS_FOLDER_NAME: &str = "Weblog Posts";

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AddinConfig {
    #[serde(default)]
    pub weblogs: LinkedHashMap<String, WeblogInfo>,
    #[serde(default)]
    pub last_weblog_accessed: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posts_folder: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub render_links_open_external: bool,
}

impl Default for AddinConfig {
    fn default() -> Self {
        Self {
            weblogs: LinkedHashMap::new(),
            last_weblog_accessed: String::new(),
            posts_folder: None,
            render_links_open_external: true,
        }
    }
}

impl AddinConfig {
    /// `<config dir>/weblog-meta/weblog-addin.json` on the current platform.
    pub fn default_path() -> Result<PathBuf, MetaErr> {
        ProjectDirs::from("", "", env!("CARGO_PKG_NAME"))
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            .ok_or_else(|| "could not determine the configuration directory".into())
    }

    /// Reads the configuration at `path`. A missing file yields defaults and
    /// its directory is created so a later `save` succeeds.
    pub fn load(path: &Path) -> Result<Self, MetaErr> {
        match File::open(path) {
            Ok(f) => Ok(serde_json::from_reader(f)
                .with_context(|| format!("config file: {path:?}"))?),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no config at {:?}, using defaults", path);
                if let Some(parent) = path.parent() {
                    create_dir_all(parent)
                        .with_context(|| format!("config directory: {parent:?}"))?;
                }
                Ok(Self::default())
            }
            Err(err) => Err(err).with_context(|| format!("config file: {path:?}")),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), MetaErr> {
        if let Some(parent) = path.parent() {
            create_dir_all(parent).with_context(|| format!("config directory: {parent:?}"))?;
        }
        let f = File::create(path).with_context(|| format!("config file: {path:?}"))?;
        serde_json::to_writer_pretty(f, self).with_context(|| format!("config file: {path:?}"))
    }

    pub fn weblog(&self, name: &str) -> Option<&WeblogInfo> {
        self.weblogs.get(name)
    }

    pub fn add_weblog(&mut self, info: WeblogInfo) {
        self.weblogs.insert(info.name.clone(), info);
    }

    /// Folder new posts are stored in. Falls back to a Dropbox folder in the
    /// home directory when one exists, otherwise the platform data dir. The
    /// resolved folder is created and remembered.
    pub fn posts_folder(&mut self) -> Result<PathBuf, MetaErr> {
        if let Some(folder) = &self.posts_folder {
            return Ok(folder.clone());
        }
        let dirs = BaseDirs::new().ok_or("could not determine the home directory")?;
        let dropbox = dirs.home_dir().join("Dropbox");
        let base = if dropbox.is_dir() {
            dropbox
        } else {
            dirs.data_dir().to_path_buf()
        };
        let folder = base.join(POSTS_FOLDER_NAME);
        create_dir_all(&folder).with_context(|| format!("posts folder: {folder:?}"))?;
        self.posts_folder = Some(folder.clone());
        Ok(folder)
    }

    /// Snapshot for a single decode call. The destination is the weblog
    /// called `weblog_name`, or the last accessed one.
    pub fn decode_context(&self, weblog_name: Option<&str>) -> DecodeContext {
        let name = weblog_name.unwrap_or(&self.last_weblog_accessed);
        let destination = self
            .weblog(name)
            .map(|info| info.weblog_type)
            .unwrap_or(WeblogType::Unknown);
        DecodeContext::new(self.last_weblog_accessed.clone(), destination)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn loads_fixture() {
        let config = AddinConfig::load(Path::new("./test/fixtures/weblog-addin.json")).unwrap();
        assert_eq!(config.last_weblog_accessed, "Rust Notes");
        assert_eq!(config.weblogs.len(), 2);
        assert_eq!(
            config.weblog("Medium").map(|w| w.weblog_type),
            Some(WeblogType::Medium)
        );
        assert!(config.render_links_open_external);
        assert_eq!(
            config.posts_folder,
            Some(PathBuf::from("./test/fixtures/posts"))
        );
    }

    #[test]
    fn decode_context_uses_destination_type() {
        let config = AddinConfig::load(Path::new("./test/fixtures/weblog-addin.json")).unwrap();
        let ctx = config.decode_context(None);
        assert_eq!(ctx.last_weblog_name, "Rust Notes");
        assert_eq!(ctx.destination, WeblogType::WordPress);

        let ctx = config.decode_context(Some("Medium"));
        assert_eq!(ctx.last_weblog_name, "Rust Notes");
        assert_eq!(ctx.destination, WeblogType::Medium);

        assert_eq!(
            config.decode_context(Some("nope")).destination,
            WeblogType::Unknown
        );
    }

    #[test]
    fn configured_posts_folder_is_kept() {
        let mut config = AddinConfig {
            posts_folder: Some(PathBuf::from("/tmp/posts")),
            ..AddinConfig::default()
        };
        assert_eq!(config.posts_folder().unwrap(), PathBuf::from("/tmp/posts"));
    }

    #[test]
    fn save_and_load() {
        let path = std::env::temp_dir()
            .join(format!("weblog-meta-test-{}", std::process::id()))
            .join(CONFIG_FILE_NAME);
        let mut config = AddinConfig {
            last_weblog_accessed: "Blog".to_string(),
            render_links_open_external: false,
            ..AddinConfig::default()
        };
        config.add_weblog(WeblogInfo {
            name: "Blog".to_string(),
            api_url: "https://blog.example.com/xmlrpc.php".to_string(),
            weblog_type: WeblogType::WordPress,
            ..WeblogInfo::default()
        });
        config.save(&path).unwrap();
        assert_eq!(AddinConfig::load(&path).unwrap(), config);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = std::env::temp_dir().join(format!("weblog-meta-missing-{}", std::process::id()));
        let config = AddinConfig::load(&dir.join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, AddinConfig::default());
        assert!(dir.is_dir());
        let _ = std::fs::remove_dir_all(dir);
    }
}
