//! Delimiter based extraction shared by both metadata encodings.

use std::ops::Range;

pub const FRONT_MATTER_DELIMITER: &str = "---";

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    pub case_insensitive: bool,
    pub allow_missing_end: bool,
    pub include_delimiters: bool,
}

impl ExtractOptions {
    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    pub fn allow_missing_end(mut self) -> Self {
        self.allow_missing_end = true;
        self
    }

    pub fn include_delimiters(mut self) -> Self {
        self.include_delimiters = true;
        self
    }
}

/// A region of a source string, `range` indexes into that source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span<'a> {
    pub range: Range<usize>,
    pub text: &'a str,
}

fn find_from(haystack: &str, needle: &str, from: usize, case_insensitive: bool) -> Option<usize> {
    let rest = haystack.get(from..)?;
    if !case_insensitive {
        return rest.find(needle).map(|idx| idx + from);
    }
    // ASCII folding keeps byte offsets identical to the source.
    let needle = needle.to_ascii_lowercase();
    rest.to_ascii_lowercase()
        .find(&needle)
        .map(|idx| idx + from)
}

/// Returns the text between the first `begin` and the next `end` after it.
pub fn extract_between<'a>(
    source: &'a str,
    begin: &str,
    end: &str,
    opts: ExtractOptions,
) -> Option<Span<'a>> {
    if source.is_empty() || begin.is_empty() || end.is_empty() {
        return None;
    }
    let start = find_from(source, begin, 0, opts.case_insensitive)?;
    let inner_start = start + begin.len();
    let (inner_end, outer_end) = match find_from(source, end, inner_start, opts.case_insensitive) {
        Some(idx) => (idx, idx + end.len()),
        None if opts.allow_missing_end => (source.len(), source.len()),
        None => return None,
    };
    let range = if opts.include_delimiters {
        start..outer_end
    } else {
        inner_start..inner_end
    };
    Some(Span {
        text: &source[range.clone()],
        range,
    })
}

/// Removes `range` from `source`, returning the remaining text.
pub fn cut(source: &str, range: Range<usize>) -> String {
    let mut out = String::with_capacity(source.len() - range.len());
    out.push_str(&source[..range.start]);
    out.push_str(&source[range.end..]);
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatterBlock<'a> {
    /// YAML between the delimiter lines.
    pub yaml: &'a str,
    /// Both delimiter lines included, plus the newline after the closing one.
    pub range: Range<usize>,
}

fn is_delimiter_line(line: &str) -> bool {
    line.trim_end_matches(['\r', '\n']) == FRONT_MATTER_DELIMITER
}

/// Locates a `---` delimited block at the very start of `text`.
///
/// The block is terminated by the first line after the opening one that is
/// exactly `---`. Later `---` lines (horizontal rules in the body) are never
/// considered.
pub fn find_front_matter(text: &str) -> Option<FrontMatterBlock<'_>> {
    let mut lines = text.split_inclusive('\n');
    let opening = lines.next()?;
    if !opening.ends_with('\n') || !is_delimiter_line(opening) {
        return None;
    }
    let yaml_start = opening.len();
    let mut offset = yaml_start;
    for line in lines {
        if is_delimiter_line(line) {
            return Some(FrontMatterBlock {
                yaml: &text[yaml_start..offset],
                range: 0..offset + line.len(),
            });
        }
        offset += line.len();
    }
    None
}

/// True when `text` opens with a `---` line followed by a line break.
pub fn opens_front_matter(text: &str) -> bool {
    text.starts_with("---\n") || text.starts_with("---\r\n")
}

/// First line that is not blank, without its line ending.
pub fn first_content_line(text: &str) -> Option<&str> {
    text.lines().find(|line| !line.trim().is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }

    /// Rewrites LF-only text to this line ending.
    pub fn apply(&self, text: &str) -> String {
        match self {
            LineEnding::Lf => text.to_string(),
            LineEnding::CrLf => text.replace("\r\n", "\n").replace('\n', "\r\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn extracts_inner_text() {
        let span = extract_between("a <b>x</b> c", "<b>", "</b>", ExtractOptions::default())
            .expect("region present");
        assert_eq!(span.text, "x");
        assert_eq!(span.range, 5..6);
    }

    #[test]
    fn includes_delimiters_on_request() {
        let opts = ExtractOptions::default().include_delimiters();
        let span = extract_between("a <b>x</b> c", "<b>", "</b>", opts).expect("region present");
        assert_eq!(span.text, "<b>x</b>");
    }

    #[test]
    fn case_insensitive_matching_keeps_source_text() {
        let opts = ExtractOptions::default()
            .case_insensitive()
            .include_delimiters();
        let span = extract_between(
            "x <!-- POST config --> y <!-- end -->",
            "<!-- post Config -->",
            "<!-- END -->",
            opts,
        )
        .expect("region present");
        assert_eq!(span.text, "<!-- POST config --> y <!-- end -->");
    }

    #[test]
    fn missing_end_runs_to_end_of_text() {
        assert_eq!(
            extract_between("<a>open", "<a>", "</a>", ExtractOptions::default()),
            None
        );
        let opts = ExtractOptions::default().allow_missing_end();
        let span = extract_between("<a>open", "<a>", "</a>", opts).expect("region present");
        assert_eq!(span.text, "open");
    }

    #[test]
    fn cut_removes_range() {
        assert_eq!(cut("hello world", 5..11), "hello");
    }

    #[test]
    fn front_matter_stops_at_first_closing_line() {
        let text = "---\ntitle: a\n---\nbody\n---\nmore";
        let block = find_front_matter(text).expect("block present");
        assert_eq!(block.yaml, "title: a\n");
        assert_eq!(&text[block.range.end..], "body\n---\nmore");
    }

    #[test]
    fn front_matter_with_crlf() {
        let text = "---\r\ntitle: a\r\n---\r\nbody";
        let block = find_front_matter(text).expect("block present");
        assert_eq!(block.yaml, "title: a\r\n");
        assert_eq!(&text[block.range.end..], "body");
    }

    #[test]
    fn front_matter_closing_line_at_end_of_text() {
        let block = find_front_matter("---\ntitle: a\n---").expect("block present");
        assert_eq!(block.yaml, "title: a\n");
        assert_eq!(block.range, 0..16);
    }

    #[test]
    fn front_matter_requires_both_delimiters() {
        assert_eq!(find_front_matter("---\ntitle: a\n"), None);
        assert_eq!(find_front_matter("--- \ntitle: a\n---\n"), None);
        assert_eq!(find_front_matter("----\ntitle: a\n---\n"), None);
        assert_eq!(find_front_matter("---"), None);
    }

    #[test]
    fn first_content_line_skips_blank_lines() {
        assert_eq!(first_content_line("\n  \n# Title\nbody"), Some("# Title"));
        assert_eq!(first_content_line("  \n"), None);
    }

    #[test]
    fn line_endings() {
        assert_eq!(LineEnding::detect("a\r\nb"), LineEnding::CrLf);
        assert_eq!(LineEnding::detect("a\nb"), LineEnding::Lf);
        assert_eq!(LineEnding::CrLf.apply("a\nb\r\nc"), "a\r\nb\r\nc");
    }
}
