use serde::Serialize;

use crate::metadata::{CustomField, PostMetadata};

/// The fields of a publishing request that come from document metadata.
#[derive(Debug, Serialize, Default, Clone, PartialEq, Eq)]
pub struct Post {
    pub title: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub excerpt: String,
    pub keywords: String,
    pub custom_fields: Vec<CustomField>,
}

impl From<&PostMetadata> for Post {
    fn from(meta: &PostMetadata) -> Self {
        Self {
            title: meta.title.clone(),
            categories: meta.categories_list(),
            tags: meta.keywords_list(),
            excerpt: meta.excerpt.clone(),
            keywords: meta.keywords.clone(),
            custom_fields: meta.custom_fields.values().cloned().collect(),
        }
    }
}
