pub mod codec;
pub mod config;
pub mod error;
pub mod extract;
pub mod front_matter;
pub mod fs;
pub mod legacy;
pub mod metadata;
pub mod post;
pub mod weblog;
pub mod xml;

pub use crate::codec::{Decoded, Encoding, MetadataSource, ParseOutcome, decode, encode};

pub use crate::config::AddinConfig;

pub use crate::error::{MetaErr, ParseIssue};

pub use crate::metadata::{CustomField, CustomFields, PostMetadata};

pub use crate::post::Post;

pub use crate::weblog::{DecodeContext, WeblogInfo, WeblogType};
