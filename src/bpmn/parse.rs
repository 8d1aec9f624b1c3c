//! This module is responsible for parsing BPMN 2.0 XML text into an owned, namespace-resolved element tree.
//!
//! The tree is deliberately generic: every element keeps all of its attributes and children,
//! so the extractor can project any element type, including vendor extensions.

use std::str::FromStr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;

use crate::error::XmlError;

/// A node in the element tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String), // Character data, including CDATA sections
}

/// An XML element with its resolved namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// The qualified name as written, e.g. `bpmn:userTask`
    pub name: String,
    /// The name without prefix, e.g. `userTask`
    pub local_name: String,
    pub prefix: Option<String>,
    /// The namespace URI the element is bound to, if any
    pub namespace: Option<String>,
    /// Attributes in document order as (qualified name, unescaped value).
    /// Namespace declarations are kept as ordinary attributes.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Look up an attribute by its qualified name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Direct child elements, skipping text
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// All descendant text concatenated in document order
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, text: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Text(t) => text.push_str(t),
                XmlNode::Element(element) => element.collect_text(text),
            }
        }
    }

    /// Visit this element and all of its descendants in document order
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    fn from_start(start: &BytesStart, namespace: Option<String>, reader: &NsReader<&[u8]>) -> Result<Self, String> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let local_name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let prefix = start
            .name()
            .prefix()
            .map(|prefix| String::from_utf8_lossy(prefix.as_ref()).into_owned());
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| e.to_string())?;
            // `xmlns` and `xml` prefixes are reserved and never declared
            let reserved = attribute.key.as_namespace_binding().is_some()
                || attribute.key.prefix().is_some_and(|prefix| prefix.as_ref() == b"xml");
            if !reserved {
                // Namespace declarations of this element are already in scope here
                namespace_uri(reader.resolve_attribute(attribute.key).0)?;
            }
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute.unescape_value().map_err(|e| e.to_string())?;
            attributes.push((key, value.into_owned()));
        }

        Ok(XmlElement {
            name,
            local_name,
            prefix,
            namespace,
            attributes,
            children: Vec::new(),
        })
    }
}

/// The namespace URI a name resolved to. A prefix that was never declared makes the document malformed.
fn namespace_uri(result: ResolveResult) -> Result<Option<String>, String> {
    match result {
        ResolveResult::Bound(ns) => Ok(Some(String::from_utf8_lossy(ns.as_ref()).into_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(format!(
            "undeclared namespace prefix `{}`",
            String::from_utf8_lossy(&prefix)
        )),
    }
}

/// Depth-first, pre-order iterator over an element and its descendants
pub struct Descendants<'a> {
    stack: Vec<&'a XmlElement>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlElement;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        // Push in reverse so the first child is visited next
        let children = element.child_elements().collect::<Vec<_>>();
        self.stack.extend(children.into_iter().rev());
        Some(element)
    }
}

/// A well-formed XML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub root: XmlElement,
}

impl Document {
    /// Parse XML text into an element tree.
    /// Fails on anything that is not a single well-formed root element.
    pub fn parse(xml: &str) -> Result<Self, XmlError> {
        let mut reader = NsReader::from_str(xml);
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root = None;

        // Shorthand to build an error at the current reader position
        let fail = |reader: &NsReader<&[u8]>, message: String| XmlError {
            message,
            position: reader.buffer_position(),
        };

        loop {
            let (namespace, event) = match reader.read_resolved_event() {
                Ok((namespace, event)) => (namespace_uri(namespace), event),
                Err(e) => return Err(fail(&reader, e.to_string())),
            };
            match event {
                Event::Start(start) => {
                    if root.is_some() {
                        return Err(fail(&reader, "content after the root element".to_string()));
                    }
                    let element = namespace
                        .and_then(|namespace| XmlElement::from_start(&start, namespace, &reader))
                        .map_err(|m| fail(&reader, m))?;
                    stack.push(element);
                }
                Event::Empty(start) => {
                    if root.is_some() {
                        return Err(fail(&reader, "content after the root element".to_string()));
                    }
                    let element = namespace
                        .and_then(|namespace| XmlElement::from_start(&start, namespace, &reader))
                        .map_err(|m| fail(&reader, m))?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Element(element)),
                        None => root = Some(element),
                    }
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| fail(&reader, "closing tag without an opening tag".to_string()))?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Element(element)),
                        None => root = Some(element),
                    }
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(|e| fail(&reader, e.to_string()))?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Text(text.into_owned())),
                        None if text.trim().is_empty() => {}
                        None => return Err(fail(&reader, "text outside the root element".to_string())),
                    }
                }
                Event::CData(cdata) => {
                    let text = String::from_utf8_lossy(&cdata.into_inner()).into_owned();
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Text(text)),
                        None => return Err(fail(&reader, "CDATA outside the root element".to_string())),
                    }
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions and doctypes carry no content
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(fail(&reader, format!("unclosed element <{}>", open.name)));
        }
        root.map(|root| Document { root })
            .ok_or_else(|| fail(&reader, "no root element".to_string()))
    }
}

impl FromStr for Document {
    type Err = XmlError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Document::parse(s)
    }
}
