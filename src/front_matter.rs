//! `---` delimited YAML front matter.

use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};

use crate::{
    extract::{FrontMatterBlock, LineEnding, find_front_matter, opens_front_matter},
    legacy::strip_legacy_block,
    metadata::PostMetadata,
};

#[derive(Debug)]
pub enum FrontMatterDecode<'a> {
    Absent,
    Parsed {
        metadata: PostMetadata,
        block: FrontMatterBlock<'a>,
    },
    Malformed {
        reason: String,
    },
}

/// Rewrites known keys to their camelCase spelling and drops the rest.
fn normalize_keys(mapping: Mapping) -> Mapping {
    let mut normalized = Mapping::new();
    for (key, value) in mapping {
        match key.as_str().and_then(PostMetadata::canonical_key) {
            Some(name) => {
                normalized.insert(Value::String(name.to_string()), value);
            }
            None => debug!("ignoring unknown front matter key: {:?}", key),
        }
    }
    normalized
}

fn parse_yaml(yaml: &str) -> Result<PostMetadata, String> {
    let value: Value = serde_yaml::from_str(yaml).map_err(|err| err.to_string())?;
    match value {
        Value::Mapping(mapping) => {
            serde_yaml::from_value(Value::Mapping(normalize_keys(mapping)))
                .map_err(|err| err.to_string())
        }
        Value::Null => Err("front matter is empty".to_string()),
        other => Err(format!("expected a mapping, got {other:?}")),
    }
}

/// Reads the front matter block at the start of `text`, which is expected
/// to be trimmed already. Bodies of the returned metadata are left empty.
pub fn decode_front_matter(text: &str) -> FrontMatterDecode<'_> {
    if !opens_front_matter(text) {
        return FrontMatterDecode::Absent;
    }
    let Some(block) = find_front_matter(text) else {
        debug!("front matter opened but never closed");
        return FrontMatterDecode::Absent;
    };
    match parse_yaml(block.yaml) {
        Ok(metadata) => FrontMatterDecode::Parsed { metadata, block },
        Err(reason) => FrontMatterDecode::Malformed { reason },
    }
}

/// Embeds `meta` as front matter into its `raw_body`, replacing an earlier
/// front matter block and dropping any legacy configuration block.
pub fn encode_front_matter(meta: &PostMetadata) -> String {
    let markdown = meta.raw_body.trim();
    let yaml = match serde_yaml::to_string(meta) {
        Ok(yaml) => yaml,
        Err(err) => {
            warn!("could not serialize post metadata, document left as is: {err}");
            return meta.raw_body.clone();
        }
    };

    let body = match find_front_matter(markdown) {
        Some(block) => &markdown[block.range.end..],
        None => markdown,
    }
    .trim_start_matches(['\r', '\n']);

    let body = strip_legacy_block(body);
    let body = body.trim_end();

    let eol = LineEnding::detect(markdown);
    let block = eol.apply(&format!("---\n{yaml}---"));
    if body.is_empty() {
        block
    } else {
        format!("{block}{}{body}", eol.as_str())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::metadata::CustomField;

    fn parsed(text: &str) -> (PostMetadata, FrontMatterBlock<'_>) {
        match decode_front_matter(text) {
            FrontMatterDecode::Parsed { metadata, block } => (metadata, block),
            other => panic!("expected parsed front matter, got {other:?}"),
        }
    }

    #[test]
    fn reads_known_keys() {
        let text = "---\ntitle: Hello\nabstract: Short\ncategories: A,B\nkeywords: x\n\
                    weblogName: Blog\npostId: 12\nisDraft: true\n---\nBody";
        let (meta, block) = parsed(text);
        assert_eq!(meta.title, "Hello");
        assert_eq!(meta.excerpt, "Short");
        assert_eq!(meta.categories_list(), vec!["A", "B"]);
        assert_eq!(meta.weblog_name, "Blog");
        assert_eq!(meta.post_id, "12");
        assert!(meta.is_draft);
        assert_eq!(&text[block.range.end..], "Body");
    }

    #[test]
    fn keys_match_case_insensitively() {
        let (meta, _) = parsed("---\nTitle: Hi\nWEBLOGNAME: Blog\nIsDraft: True\n---\n");
        assert_eq!(meta.title, "Hi");
        assert_eq!(meta.weblog_name, "Blog");
        assert!(meta.is_draft);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let (meta, _) = parsed("---\ntitle: Hi\nlayout: post\ntags: [a, b]\n---\n");
        assert_eq!(meta.title, "Hi");
    }

    #[test]
    fn malformed_yaml() {
        assert!(matches!(
            decode_front_matter("---\ntitle: [unclosed\n---\nbody"),
            FrontMatterDecode::Malformed { .. }
        ));
        assert!(matches!(
            decode_front_matter("---\n---\nbody"),
            FrontMatterDecode::Malformed { .. }
        ));
        assert!(matches!(
            decode_front_matter("---\n- a\n- b\n---\nbody"),
            FrontMatterDecode::Malformed { .. }
        ));
        assert!(matches!(
            decode_front_matter("---\nisDraft: maybe\n---\nbody"),
            FrontMatterDecode::Malformed { .. }
        ));
    }

    #[test]
    fn unterminated_block_is_absent() {
        assert!(matches!(
            decode_front_matter("---\ntitle: Hi\nbody"),
            FrontMatterDecode::Absent
        ));
        assert!(matches!(
            decode_front_matter("# Title\n---\n"),
            FrontMatterDecode::Absent
        ));
    }

    #[test]
    fn encode_prepends_block() {
        let meta = PostMetadata {
            title: "Hello".to_string(),
            weblog_name: "Blog".to_string(),
            raw_body: "Body text\n".to_string(),
            ..PostMetadata::default()
        };
        assert_eq!(
            encode_front_matter(&meta),
            "---\ntitle: Hello\nabstract: ''\ncategories: ''\nkeywords: ''\nweblogName: Blog\n\
             isDraft: false\ninferFeaturedImage: true\n---\nBody text"
        );
    }

    #[test]
    fn encode_replaces_existing_block() {
        let meta = PostMetadata {
            title: "New".to_string(),
            raw_body: "---\ntitle: Old\n---\nBody\n\n---\n\nMore".to_string(),
            ..PostMetadata::default()
        };
        let encoded = encode_front_matter(&meta);
        assert_eq!(encoded.matches("title:").count(), 1);
        assert!(encoded.contains("title: New"));
        assert!(encoded.ends_with("---\nBody\n\n---\n\nMore"));
    }

    #[test]
    fn encode_writes_custom_fields_and_post_id_when_set() {
        let mut meta = PostMetadata {
            post_id: "42".to_string(),
            raw_body: "Body".to_string(),
            ..PostMetadata::default()
        };
        meta.custom_fields
            .insert(CustomField::new("mt_price", "10").with_id("5"));
        let encoded = encode_front_matter(&meta);
        assert!(encoded.contains("postId: '42'"));
        assert!(encoded.contains(
            "customFields:\n  mt_price:\n    key: mt_price\n    value: '10'\n    id: '5'\n"
        ));
    }

    #[test]
    fn encode_drops_legacy_block() {
        let meta = PostMetadata {
            title: "T".to_string(),
            raw_body: "Body\n\n<!-- Post Configuration -->\n<title>T</title>\n\
                       <!-- End Post Configuration -->\n"
                .to_string(),
            ..PostMetadata::default()
        };
        let encoded = encode_front_matter(&meta);
        assert!(!encoded.contains("Post Configuration"));
        assert!(encoded.ends_with("---\nBody"));
    }

    #[test]
    fn encode_keeps_crlf_documents_crlf() {
        let meta = PostMetadata {
            title: "T".to_string(),
            raw_body: "---\r\ntitle: Old\r\n---\r\nline one\r\nline two".to_string(),
            ..PostMetadata::default()
        };
        let encoded = encode_front_matter(&meta);
        assert!(encoded.starts_with("---\r\ntitle: T\r\n"));
        assert!(encoded.ends_with("---\r\nline one\r\nline two"));
        assert!(!encoded.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn encode_leaves_body_line_endings_alone() {
        let meta = PostMetadata {
            title: "T".to_string(),
            raw_body: "---\r\ntitle: Old\r\n---\r\nintro\r\n```\nlf only\n```".to_string(),
            ..PostMetadata::default()
        };
        let encoded = encode_front_matter(&meta);
        assert!(encoded.starts_with("---\r\ntitle: T\r\n"));
        assert!(encoded.ends_with("---\r\nintro\r\n```\nlf only\n```"));
    }

    #[test]
    fn encode_without_body_ends_at_closing_line() {
        let meta = PostMetadata {
            title: "T".to_string(),
            ..PostMetadata::default()
        };
        assert!(encode_front_matter(&meta).ends_with("inferFeaturedImage: true\n---"));
    }
}
