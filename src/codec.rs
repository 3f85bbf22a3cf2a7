//! Entry points: read metadata out of a document and write it back in.

use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    error::ParseIssue,
    extract::first_content_line,
    front_matter::{FrontMatterDecode, decode_front_matter, encode_front_matter},
    legacy::{apply_legacy_block, encode_legacy, find_legacy_block, strip_legacy_block},
    metadata::PostMetadata,
    weblog::DecodeContext,
};

/// Where the decoded metadata came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MetadataSource {
    FrontMatter,
    /// Only a leading `# ` heading, used as the title.
    Heading,
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ParseOutcome {
    /// Plain document, metadata holds defaults.
    Absent,
    Parsed { source: MetadataSource },
    /// Something could not be read and was skipped.
    Partial {
        source: Option<MetadataSource>,
        issues: Vec<ParseIssue>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub metadata: PostMetadata,
    pub outcome: ParseOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Encoding {
    #[default]
    FrontMatter,
    Legacy,
}

/// Splits `raw` into publishing metadata and clean Markdown.
///
/// Never fails: unreadable blocks fall back to defaults and are reported
/// through [`Decoded::outcome`].
pub fn decode(raw: &str, ctx: &DecodeContext) -> Decoded {
    let text = raw.trim();
    let mut metadata = PostMetadata::with_body(raw);
    let mut source = None;
    let mut issues = Vec::new();

    match decode_front_matter(text) {
        FrontMatterDecode::Parsed {
            metadata: parsed,
            block,
        } => {
            debug!("front matter found");
            metadata = PostMetadata {
                raw_body: raw.to_string(),
                body: text[block.range.end..].trim().to_string(),
                ..parsed
            };
            source = Some(MetadataSource::FrontMatter);
        }
        FrontMatterDecode::Malformed { reason } => {
            warn!("front matter ignored: {reason}");
            issues.push(ParseIssue::FrontMatter(reason));
        }
        FrontMatterDecode::Absent => {
            if let Some(line) = first_content_line(text)
                && let Some(title) = line.trim().strip_prefix("# ")
            {
                debug!("title taken from heading");
                metadata.title = title.trim().to_string();
                if !ctx.destination.keeps_title_heading() {
                    metadata.body = text[line.len()..].trim().to_string();
                }
                source = Some(MetadataSource::Heading);
            }
        }
    }

    if let Some(block) = find_legacy_block(text) {
        debug!("legacy post configuration found");
        metadata.body = strip_legacy_block(&metadata.body).trim().to_string();
        if let Some(issue) = apply_legacy_block(block.text, &mut metadata) {
            warn!("legacy custom fields ignored: {issue}");
            issues.push(issue);
        }
        if source != Some(MetadataSource::FrontMatter) {
            source = Some(MetadataSource::Legacy);
        }
    }

    if metadata.weblog_name.is_empty() {
        metadata.weblog_name = ctx.last_weblog_name.clone();
    }

    let outcome = match (source, issues.is_empty()) {
        (None, true) => ParseOutcome::Absent,
        (Some(source), true) => ParseOutcome::Parsed { source },
        (source, false) => ParseOutcome::Partial { source, issues },
    };
    Decoded { metadata, outcome }
}

/// Embeds `meta` into its `raw_body` using `encoding`.
pub fn encode(meta: &PostMetadata, encoding: Encoding) -> String {
    match encoding {
        Encoding::FrontMatter => encode_front_matter(meta),
        Encoding::Legacy => encode_legacy(meta),
    }
}
