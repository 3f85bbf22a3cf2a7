//! Minimal XML element reader for the fragments embedded in legacy
//! post configuration blocks. Attributes are accepted and dropped,
//! DTDs are not supported.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XmlError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unexpected character {found:?} at byte {pos}")]
    UnexpectedChar { found: char, pos: usize },
    #[error("closing tag </{found}> does not match <{expected}>")]
    MismatchedTag { expected: String, found: String },
    #[error("unknown entity &{0};")]
    UnknownEntity(String),
    #[error("content after the root element at byte {0}")]
    TrailingContent(usize),
    #[error("elements nested deeper than {0} levels")]
    TooDeep(usize),
}

const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub children: Vec<Node>,
}

impl Element {
    /// Child elements, skipping text and whitespace.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// Concatenated text of this element and all its descendants.
    pub fn inner_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(el) => el.collect_text(out),
            }
        }
    }
}

/// Parses a document with exactly one root element.
pub fn parse(input: &str) -> Result<Element, XmlError> {
    let mut reader = Reader { src: input, pos: 0 };
    reader.skip_misc()?;
    let root = reader.element(1)?;
    reader.skip_misc()?;
    if reader.pos < input.len() {
        return Err(XmlError::TrailingContent(reader.pos));
    }
    Ok(root)
}

/// Escapes text for use inside an element.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Resolves the predefined entities and numeric character references.
pub fn unescape(text: &str) -> Result<String, XmlError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let semi = after.find(';').ok_or(XmlError::UnexpectedEof)?;
        let entity = &after[..semi];
        let decoded = match entity {
            "lt" => '<',
            "gt" => '>',
            "amp" => '&',
            "quot" => '"',
            "apos" => '\'',
            _ => numeric_reference(entity)
                .ok_or_else(|| XmlError::UnknownEntity(entity.to_string()))?,
        };
        out.push(decoded);
        rest = &after[semi + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn numeric_reference(entity: &str) -> Option<char> {
    let code = if let Some(hex) = entity
        .strip_prefix("#x")
        .or_else(|| entity.strip_prefix("#X"))
    {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        entity.strip_prefix('#')?.parse().ok()?
    };
    char::from_u32(code)
}

struct Reader<'a> {
    src: &'a str,
    pos: usize,
}

impl Reader<'_> {
    fn rest(&self) -> &str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    fn expect(&mut self, c: char) -> Result<(), XmlError> {
        match self.peek() {
            Some(found) if found == c => {
                self.pos += c.len_utf8();
                Ok(())
            }
            Some(found) => Err(XmlError::UnexpectedChar {
                found,
                pos: self.pos,
            }),
            None => Err(XmlError::UnexpectedEof),
        }
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    /// Advances past the next `end`, returning the text before it.
    fn take_until(&mut self, end: &str) -> Result<&str, XmlError> {
        let idx = self.rest().find(end).ok_or(XmlError::UnexpectedEof)?;
        let start = self.pos;
        self.pos += idx + end.len();
        Ok(&self.src[start..start + idx])
    }

    /// Whitespace, comments and processing instructions.
    fn skip_misc(&mut self) -> Result<(), XmlError> {
        loop {
            self.skip_ws();
            if self.starts_with("<!--") {
                self.take_until("-->")?;
            } else if self.starts_with("<?") {
                self.take_until("?>")?;
            } else {
                return Ok(());
            }
        }
    }

    fn name(&mut self) -> Result<String, XmlError> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' || c == ':' => {}
            Some(found) => return Err(XmlError::UnexpectedChar { found, pos: start }),
            None => return Err(XmlError::UnexpectedEof),
        }
        let len = self
            .rest()
            .find(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.')))
            .unwrap_or(self.rest().len());
        self.pos += len;
        Ok(self.src[start..self.pos].to_string())
    }

    fn skip_attribute(&mut self) -> Result<(), XmlError> {
        self.name()?;
        self.skip_ws();
        self.expect('=')?;
        self.skip_ws();
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let value = self.take_until(&quote.to_string())?.to_string();
                unescape(&value)?;
                Ok(())
            }
            Some(found) => Err(XmlError::UnexpectedChar {
                found,
                pos: self.pos,
            }),
            None => Err(XmlError::UnexpectedEof),
        }
    }

    fn element(&mut self, depth: usize) -> Result<Element, XmlError> {
        if depth > MAX_DEPTH {
            return Err(XmlError::TooDeep(MAX_DEPTH));
        }
        self.expect('<')?;
        let name = self.name()?;
        loop {
            self.skip_ws();
            if self.starts_with("/>") {
                self.pos += 2;
                return Ok(Element {
                    name,
                    children: vec![],
                });
            }
            if self.starts_with(">") {
                self.pos += 1;
                break;
            }
            self.skip_attribute()?;
        }

        let mut children = Vec::new();
        loop {
            if self.rest().is_empty() {
                return Err(XmlError::UnexpectedEof);
            }
            if self.starts_with("</") {
                self.pos += 2;
                let closing = self.name()?;
                self.skip_ws();
                self.expect('>')?;
                if closing != name {
                    return Err(XmlError::MismatchedTag {
                        expected: name,
                        found: closing,
                    });
                }
                return Ok(Element { name, children });
            }
            if self.starts_with("<!--") {
                self.take_until("-->")?;
            } else if self.starts_with("<![CDATA[") {
                self.pos += "<![CDATA[".len();
                let text = self.take_until("]]>")?.to_string();
                children.push(Node::Text(text));
            } else if self.starts_with("<") {
                children.push(Node::Element(self.element(depth + 1)?));
            } else {
                let len = self.rest().find('<').unwrap_or(self.rest().len());
                let raw = &self.src[self.pos..self.pos + len];
                self.pos += len;
                if !raw.trim().is_empty() {
                    children.push(Node::Text(unescape(raw)?));
                }
            }
        }
    }
}
