use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Publishing metadata of a single Markdown document.
///
/// `raw_body` is the document as read from the editor, metadata block
/// included. `body` is the same text with the block removed.
#[derive(Debug, PartialEq, Serialize, Clone, Deserialize, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PostMetadata {
    #[serde(deserialize_with = "yaml_value::string")]
    pub title: String,
    #[serde(rename = "abstract", deserialize_with = "yaml_value::string")]
    pub excerpt: String,
    #[serde(deserialize_with = "yaml_value::comma_joined")]
    pub categories: String,
    #[serde(deserialize_with = "yaml_value::comma_joined")]
    pub keywords: String,
    #[serde(deserialize_with = "yaml_value::string")]
    pub weblog_name: String,
    #[serde(
        skip_serializing_if = "String::is_empty",
        deserialize_with = "yaml_value::string"
    )]
    pub post_id: String,
    #[serde(deserialize_with = "yaml_value::flag_or_false")]
    pub is_draft: bool,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "yaml_value::optional_string"
    )]
    pub featured_image_url: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "yaml_value::optional_string"
    )]
    pub featured_image_id: Option<String>,
    #[serde(deserialize_with = "yaml_value::flag_or_true")]
    pub infer_featured_image: bool,
    #[serde(skip_serializing_if = "CustomFields::is_empty")]
    pub custom_fields: CustomFields,
    #[serde(skip)]
    pub raw_body: String,
    #[serde(skip)]
    pub body: String,
}

impl PostMetadata {
    /// Front matter keys in the order they are written.
    pub const FIELD_NAMES: [&'static str; 11] = [
        "title",
        "abstract",
        "categories",
        "keywords",
        "weblogName",
        "postId",
        "isDraft",
        "featuredImageUrl",
        "featuredImageId",
        "inferFeaturedImage",
        "customFields",
    ];

    pub fn with_body(raw_body: impl Into<String>) -> Self {
        let raw_body = raw_body.into();
        Self {
            body: raw_body.trim().to_string(),
            raw_body,
            ..Self::default()
        }
    }

    pub fn categories_list(&self) -> Vec<String> {
        split_list(&self.categories)
    }

    pub fn keywords_list(&self) -> Vec<String> {
        split_list(&self.keywords)
    }

    /// Canonical spelling of a front matter key, matched case-insensitively.
    pub fn canonical_key(key: &str) -> Option<&'static str> {
        Self::FIELD_NAMES
            .iter()
            .copied()
            .find(|name| name.eq_ignore_ascii_case(key))
    }
}

impl Default for PostMetadata {
    fn default() -> Self {
        Self {
            title: String::new(),
            excerpt: String::new(),
            categories: String::new(),
            keywords: String::new(),
            weblog_name: String::new(),
            post_id: String::new(),
            is_draft: false,
            featured_image_url: None,
            featured_image_id: None,
            infer_featured_image: true,
            custom_fields: CustomFields::new(),
            raw_body: String::new(),
            body: String::new(),
        }
    }
}

/// Splits a comma-joined list, dropping empty entries.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}

#[derive(Debug, PartialEq, Serialize, Clone, Deserialize, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CustomField {
    #[serde(default, deserialize_with = "yaml_value::string")]
    pub key: String,
    #[serde(default, deserialize_with = "yaml_value::string")]
    pub value: String,
    /// Server side id, present once the field was uploaded.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "yaml_value::optional_string"
    )]
    pub id: Option<String>,
}

impl CustomField {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Custom fields keyed by name. Iteration follows insertion order, equality
/// does not.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct CustomFields(LinkedHashMap<String, CustomField>);

impl CustomFields {
    pub fn new() -> Self {
        Self(LinkedHashMap::new())
    }

    /// Inserts under the field's key, replacing a field of the same name.
    pub fn insert(&mut self, field: CustomField) -> Option<CustomField> {
        self.0.insert(field.key.clone(), field)
    }

    pub fn get(&self, name: &str) -> Option<&CustomField> {
        self.0.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<CustomField> {
        self.0.remove(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &CustomField> {
        self.0.values()
    }
}

impl PartialEq for CustomFields {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .0
                .iter()
                .all(|(name, field)| other.get(name) == Some(field))
    }
}

impl Eq for CustomFields {}

impl FromIterator<CustomField> for CustomFields {
    fn from_iter<I: IntoIterator<Item = CustomField>>(iter: I) -> Self {
        let mut fields = CustomFields::new();
        for field in iter {
            fields.insert(field);
        }
        fields
    }
}

impl<'de> Deserialize<'de> for CustomFields {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map: Option<LinkedHashMap<String, CustomField>> = Option::deserialize(deserializer)?;
        let mut fields = CustomFields::new();
        for (name, mut field) in map.unwrap_or_default() {
            if field.key.is_empty() {
                field.key = name.clone();
            }
            fields.0.insert(name, field);
        }
        Ok(fields)
    }
}

/// Lenient readers for hand edited front matter values.
mod yaml_value {
    use itertools::Itertools;
    use serde::{Deserialize, Deserializer, de::Error};
    use serde_yaml::Value;

    fn scalar(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(optional_string(deserializer)?.unwrap_or_default())
    }

    pub fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(None),
            value => scalar(&value)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("expected a scalar, got {value:?}"))),
        }
    }

    pub fn comma_joined<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(String::new()),
            Value::Sequence(items) => items
                .iter()
                .map(|item| {
                    scalar(item).ok_or_else(|| {
                        D::Error::custom(format!("expected a scalar list entry, got {item:?}"))
                    })
                })
                .process_results(|mut entries| entries.join(", ")),
            value => scalar(&value)
                .ok_or_else(|| D::Error::custom(format!("expected a list, got {value:?}"))),
        }
    }

    fn flag<'de, D>(deserializer: D, default: bool) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(default),
            Value::Bool(b) => Ok(b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            value => Err(D::Error::custom(format!(
                "expected true or false, got {value:?}"
            ))),
        }
    }

    pub fn flag_or_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        flag(deserializer, false)
    }

    pub fn flag_or_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        flag(deserializer, true)
    }
}
