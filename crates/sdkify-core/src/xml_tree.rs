//! Immutable XML element tree
//!
//! All three input formats (legacy project, `packages.config`, `.nuspec`) are
//! small documents that are queried several times, so they are read once into
//! an owned tree with resolved namespaces and then only inspected.

use crate::errors::MigrateError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    namespace: Option<String>,
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<XmlElement>,
}

impl XmlElement {
    /// Local name, without any prefix
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved namespace URI, if the element is bound to one
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Attribute value by local name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Concatenated, trimmed character data directly inside this element
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == Some(namespace)
    }

    /// All elements below this one in document order (pre-order, self excluded)
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// Descendants with the given namespace and local name, in document order
    pub fn find_all<'a, 'q>(
        &'a self,
        namespace: &'q str,
        name: &'q str,
    ) -> impl Iterator<Item = &'a XmlElement> + 'q
    where
        'a: 'q,
    {
        self.descendants().filter(move |e| e.is(namespace, name))
    }

    pub fn find_first(&self, namespace: &str, name: &str) -> Option<&XmlElement> {
        self.find_all(namespace, name).next()
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a XmlElement>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlElement;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.children.iter().rev());
        Some(next)
    }
}

/// Read a whole file as UTF-8, refusing anything larger than `max_bytes`
pub fn read_bounded(path: &Path, max_bytes: u64) -> Result<String, MigrateError> {
    let read_error = |source: io::Error| {
        if source.kind() == io::ErrorKind::NotFound {
            MigrateError::NotFound(path.to_path_buf())
        } else {
            MigrateError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    };

    let size = path.metadata().map_err(read_error)?.len();
    if size > max_bytes {
        return Err(MigrateError::InputTooLarge {
            path: path.to_path_buf(),
            size,
            limit: max_bytes,
        });
    }

    // The file may grow between stat and read; never take more than the limit.
    let mut bytes = Vec::with_capacity(usize::try_from(size).unwrap_or(0));
    File::open(path)
        .map_err(read_error)?
        .take(max_bytes.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(read_error)?;
    let read = bytes.len() as u64;
    if read > max_bytes {
        return Err(MigrateError::InputTooLarge {
            path: path.to_path_buf(),
            size: read,
            limit: max_bytes,
        });
    }

    let content = String::from_utf8(bytes).map_err(|e| MigrateError::Malformed {
        path: path.to_path_buf(),
        message: format!("not valid UTF-8: {}", e),
    })?;
    Ok(match content.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => content,
    })
}

/// Load and parse an XML file into its root element
pub fn load(path: &Path, max_bytes: u64) -> Result<XmlElement, MigrateError> {
    let content = read_bounded(path, max_bytes)?;
    parse_str(&content, path)
}

/// Parse XML text into its root element. `path` is only used for error reporting.
pub fn parse_str(content: &str, path: &Path) -> Result<XmlElement, MigrateError> {
    let malformed = |message: String| MigrateError::Malformed {
        path: path.to_path_buf(),
        message,
    };

    // Text is kept untrimmed so pieces split by CDATA or comments join
    // exactly; each element's text is trimmed once when it closes.
    let mut reader = NsReader::from_str(content);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let step = reader
            .read_resolved_event()
            .map(|(ns, event)| (namespace_uri(&ns), event));
        let (namespace, event) = match step {
            Ok(resolved) => resolved,
            Err(e) => {
                return Err(malformed(format!(
                    "{} (near byte {})",
                    e,
                    reader.error_position()
                )))
            }
        };

        match event {
            Event::Start(start) => {
                stack.push(element_from(&start, namespace).map_err(&malformed)?);
            }
            Event::Empty(start) => {
                let element = element_from(&start, namespace).map_err(&malformed)?;
                attach(element, &mut stack, &mut root).map_err(&malformed)?;
            }
            Event::End(_) => {
                let Some(element) = stack.pop() else {
                    return Err(malformed("unexpected closing tag".to_string()));
                };
                attach(element, &mut stack, &mut root).map_err(&malformed)?;
            }
            Event::Text(text) => {
                let decoded = text
                    .unescape()
                    .map_err(|e| malformed(format!("invalid character data: {}", e)))?;
                append_text(&mut stack, &decoded).map_err(&malformed)?;
            }
            Event::CData(data) => {
                let decoded = String::from_utf8_lossy(&data).into_owned();
                append_text(&mut stack, &decoded).map_err(&malformed)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(malformed(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| malformed("document has no root element".to_string()))
}

fn namespace_uri(resolved: &ResolveResult) -> Option<String> {
    match resolved {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        _ => None,
    }
}

fn element_from(start: &BytesStart, namespace: Option<String>) -> Result<XmlElement, String> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| format!("bad attribute on <{}>: {}", name, e))?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| format!("bad value for attribute '{}' on <{}>: {}", key, name, e))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(XmlElement {
        namespace,
        name,
        attributes,
        text: String::new(),
        children: Vec::new(),
    })
}

fn attach(
    mut element: XmlElement,
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
) -> Result<(), String> {
    let trimmed = element.text.trim();
    if trimmed.len() != element.text.len() {
        element.text = trimmed.to_string();
    }
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(format!(
            "second root element <{}> after the document element",
            element.name
        ));
    }
    *root = Some(element);
    Ok(())
}

fn append_text(stack: &mut [XmlElement], text: &str) -> Result<(), String> {
    match stack.last_mut() {
        Some(current) => {
            current.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err("character data outside the document element".to_string()),
    }
}
