//! Legacy `<!-- Post Configuration -->` blocks with pseudo XML fields.

use tracing::debug;

use crate::{
    error::ParseIssue,
    extract::{ExtractOptions, LineEnding, Span, cut, extract_between},
    metadata::{CustomField, CustomFields, PostMetadata},
    xml,
};

pub const CONFIG_START: &str = "<!-- Post Configuration -->";
pub const CONFIG_END: &str = "<!-- End Post Configuration -->";

/// The configuration block including its sentinels. Sentinels match
/// case-insensitively and a missing end sentinel extends the block to the
/// end of `text`.
pub fn find_legacy_block(text: &str) -> Option<Span<'_>> {
    let opts = ExtractOptions::default()
        .case_insensitive()
        .allow_missing_end()
        .include_delimiters();
    extract_between(text, CONFIG_START, CONFIG_END, opts)
}

/// Removes every configuration block from `text`.
pub fn strip_legacy_block(text: &str) -> String {
    let mut out = text.to_string();
    while let Some(span) = find_legacy_block(&out) {
        out = cut(&out, span.range);
    }
    out
}

fn field<'a>(config: &'a str, name: &str) -> Option<&'a str> {
    extract_between(
        config,
        &format!("<{name}>"),
        &format!("</{name}>"),
        ExtractOptions::default(),
    )
    .map(|span| span.text.trim())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Reads the `<customFields>` fragment. Each child element holds key, value
/// and an optional id as its first, second and third child.
pub fn parse_custom_fields(fragment: &str) -> Result<CustomFields, ParseIssue> {
    let root = xml::parse(fragment).map_err(|err| ParseIssue::CustomFields(err.to_string()))?;
    let mut fields = CustomFields::new();
    for entry in root.elements() {
        let parts: Vec<&xml::Element> = entry.elements().collect();
        let [key, value, rest @ ..] = parts.as_slice() else {
            return Err(ParseIssue::CustomFields(format!(
                "<{}> needs a key and a value",
                entry.name
            )));
        };
        let id = rest
            .first()
            .map(|id| id.inner_text())
            .filter(|id| !id.is_empty());
        fields.insert(CustomField {
            key: key.inner_text(),
            value: value.inner_text(),
            id,
        });
    }
    Ok(fields)
}

/// Copies the fields present in a legacy `config` block onto `meta`.
///
/// The title is only taken when `meta` has none yet. A broken custom fields
/// fragment leaves the custom fields untouched and is reported back.
pub fn apply_legacy_block(config: &str, meta: &mut PostMetadata) -> Option<ParseIssue> {
    if let Some(title) = field(config, "title")
        && meta.title.is_empty()
    {
        meta.title = title.to_string();
    }
    if let Some(excerpt) = field(config, "abstract") {
        meta.excerpt = excerpt.to_string();
    }
    if let Some(keywords) = field(config, "keywords") {
        meta.keywords = keywords.to_string();
    }
    if let Some(categories) = field(config, "categories") {
        meta.categories = categories.to_string();
    }
    if let Some(post_id) = field(config, "postid") {
        meta.post_id = post_id.to_string();
    }
    if let Some(is_draft) = field(config, "isDraft") {
        meta.is_draft = is_draft == "True";
    }
    if let Some(weblog) = non_empty(field(config, "weblog")) {
        meta.weblog_name = weblog.to_string();
    }
    if let Some(infer) = non_empty(field(config, "inferFeaturedImage")) {
        meta.infer_featured_image = infer != "False" && infer != "false";
    }
    if let Some(url) = non_empty(field(config, "featuredImage")) {
        meta.featured_image_url = Some(url.to_string());
    }
    if let Some(id) = non_empty(field(config, "featuredImageId")) {
        meta.featured_image_id = Some(id.to_string());
    }

    let fragment = extract_between(
        config,
        "<customFields>",
        "</customFields>",
        ExtractOptions::default().include_delimiters(),
    )?;
    match parse_custom_fields(fragment.text) {
        Ok(fields) => {
            for field in fields.values() {
                meta.custom_fields.insert(field.clone());
            }
            None
        }
        Err(issue) => {
            debug!("{issue}");
            Some(issue)
        }
    }
}

fn title_case(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

fn render_custom_fields(fields: &CustomFields) -> String {
    if fields.is_empty() {
        return String::new();
    }
    let mut out = String::from("\n<customFields>");
    for field in fields.values() {
        out.push_str(&format!(
            "\n\t<customField>\n\t\t<key>{}</key>\n\t\t<value>{}</value>",
            xml::escape(&field.key),
            xml::escape(&field.value)
        ));
        if let Some(id) = field.id.as_deref().filter(|id| !id.is_empty()) {
            out.push_str(&format!("\n\t\t<id>{}</id>", xml::escape(id)));
        }
        out.push_str("\n\t</customField>");
    }
    out.push_str("\n</customFields>");
    out
}

pub fn render_legacy_block(meta: &PostMetadata) -> String {
    format!(
        "{CONFIG_START}
<!--
```xml
<blogpost>
<title>{title}</title>
<abstract>
{excerpt}
</abstract>
<categories>
{categories}
</categories>
<keywords>
{keywords}
</keywords>
<isDraft>{is_draft}</isDraft>
<weblogs>
<postid>{post_id}</postid>
<weblog>
{weblog}
</weblog>
</weblogs>
<inferFeaturedImage>{infer}</inferFeaturedImage>
<featuredImage>{image_url}</featuredImage>
<featuredImageId>{image_id}</featuredImageId>{custom_fields}
</blogpost>
```
-->
{CONFIG_END}",
        title = meta.title,
        excerpt = meta.excerpt,
        categories = meta.categories,
        keywords = meta.keywords,
        is_draft = title_case(meta.is_draft),
        post_id = meta.post_id,
        weblog = meta.weblog_name,
        infer = title_case(meta.infer_featured_image),
        image_url = meta.featured_image_url.as_deref().unwrap_or_default(),
        image_id = meta.featured_image_id.as_deref().unwrap_or_default(),
        custom_fields = render_custom_fields(&meta.custom_fields),
    )
}

/// Writes `meta` as a legacy block into its `raw_body`, replacing the
/// existing block or appending a new one after the body. An existing block
/// without an end sentinel is replaced up to the end of the document.
pub fn encode_legacy(meta: &PostMetadata) -> String {
    let markdown = meta.raw_body.as_str();
    let eol = LineEnding::detect(markdown);
    let block = eol.apply(&render_legacy_block(meta));
    match find_legacy_block(markdown) {
        Some(span) => format!(
            "{}{}{}",
            &markdown[..span.range.start],
            block,
            &markdown[span.range.end..]
        ),
        None => {
            let body = markdown.trim_end();
            if body.is_empty() {
                block
            } else {
                format!("{body}{0}{0}{block}", eol.as_str())
            }
        }
    }
}
