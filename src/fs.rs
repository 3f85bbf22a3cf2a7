use std::path::Path;

use tokio::{
    fs::{OpenOptions, create_dir_all, read_to_string},
    io::AsyncWriteExt,
};

use crate::error::{ContextExt, MetaErr};

pub async fn read_document(path: &Path) -> Result<String, MetaErr> {
    read_to_string(path)
        .await
        .with_context(|| format!("document: {path:?}"))
}

pub async fn write_file(path: &Path, content: &str) -> Result<(), MetaErr> {
    if let Some(prefix) = path.parent() {
        create_dir_all(prefix).await?;
    }
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)
        .await
        .with_context(|| format!("document: {path:?}"))?;
    file.write_all(content.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn write_then_read() {
        let path = std::env::temp_dir()
            .join(format!("weblog-meta-fs-{}", std::process::id()))
            .join("post.md");
        write_file(&path, "first version").await.unwrap();
        write_file(&path, "second").await.unwrap();
        assert_eq!(read_document(&path).await.unwrap(), "second");
        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
    }

    #[tokio::test]
    async fn missing_document_names_the_path() {
        let err = read_document(Path::new("./test/fixtures/missing.md"))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("document: \"./test/fixtures/missing.md\""));
    }

    #[tokio::test]
    async fn reads_fixture() {
        let text = read_document(Path::new("./test/fixtures/legacy-post.md"))
            .await
            .unwrap();
        assert!(text.starts_with("# Parsing front matter"));
    }
}
