//! XML → node adapter.
//!
//! The document becomes an object with one `Element` member for the root.
//! Each element becomes an object whose members are, in order:
//!
//! 1. attributes — key `@{ns}local`, namespace declarations excluded
//! 2. text — key `#text`, trimmed text and CDATA concatenated, omitted if empty
//! 3. child element groups — one `XmlSiblings` array per expanded name, in
//!    order of first occurrence
//!
//! Element identity is the expanded name (`{namespace-uri}local`), so the
//! same element written with different prefixes compares equal. Comments,
//! processing instructions, the declaration and doctype are skipped.
//!
//! Depth is counted as the comparison engine counts it: the document object
//! is at depth 1, the root element at 2, each child element one below its
//! parent and attributes and text one below their element.

use super::{depth_exceeded, line_col, ComparableNode, Member, MemberKind, ScalarValue, SequenceKind};
use crate::errors::{ExError, ExErrorKind, Result};
use crate::options::ComparisonOptions;
use crate::{log_op_end, log_op_error, log_op_start};
use docassert_core_types::DocumentFormat;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use std::time::Instant;

/// Key of the text member of an element
pub const TEXT_KEY: &str = "#text";

/// Parse XML text into a node tree.
///
/// # Errors
///
/// - `InvalidOptions` — `options` fail validation
/// - `InvalidXml` — malformed markup, mismatched or unclosed tags, unbound
///   prefixes, no root or more than one root, text outside the root
/// - `DepthLimitExceeded` — the tree would be deeper than `options.max_depth`
pub fn load_xml(raw: &str, options: &ComparisonOptions) -> Result<ComparableNode> {
    let start = Instant::now();
    log_op_start!("load_xml", input_len = raw.len());

    let result = options.validate().and_then(|_| parse(raw, options.max_depth));
    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(node) => {
            log_op_end!("load_xml", duration_ms = duration_ms, depth = node.depth());
        }
        Err(e) => {
            log_op_error!("load_xml", e.clone(), duration_ms = duration_ms);
        }
    }
    result
}

/// Element under construction.
struct ElementBuilder {
    local: String,
    key: String,
    attributes: Vec<Member>,
    text: String,
    groups: Vec<(String, String, Vec<ComparableNode>)>,
}

impl ElementBuilder {
    fn add_child(&mut self, key: String, local: String, node: ComparableNode) {
        match self.groups.iter_mut().find(|(k, _, _)| *k == key) {
            Some((_, _, items)) => items.push(node),
            None => self.groups.push((key, local, vec![node])),
        }
    }

    fn finish(self) -> (String, String, ComparableNode) {
        let mut members = self.attributes;
        if !self.text.is_empty() {
            members.push(Member::new(
                TEXT_KEY,
                MemberKind::Text,
                ComparableNode::scalar(Some(TEXT_KEY.to_string()), ScalarValue::text(self.text)),
            ));
        }
        for (key, local, items) in self.groups {
            members.push(Member::new(
                key,
                MemberKind::Element,
                ComparableNode::array(Some(local), SequenceKind::XmlSiblings, items),
            ));
        }
        let node = ComparableNode::object(Some(self.local.clone()), members);
        (self.key, self.local, node)
    }
}

fn xml_error(raw: &str, offset: u64, message: impl Into<String>) -> ExError {
    let (line, column) = line_col(raw, offset as usize);
    ExError::new(ExErrorKind::InvalidXml)
        .with_op("load_xml")
        .with_format(DocumentFormat::Xml)
        .with_position(line, column)
        .with_message(message)
}

fn expanded_name(
    raw: &str,
    offset: u64,
    resolved: ResolveResult<'_>,
    local: &[u8],
) -> Result<(String, String)> {
    let local = String::from_utf8_lossy(local).into_owned();
    match resolved {
        ResolveResult::Bound(ns) => {
            let uri = String::from_utf8_lossy(ns.as_ref());
            Ok((format!("{{{}}}{}", uri, local), local))
        }
        ResolveResult::Unbound => Ok((local.clone(), local)),
        ResolveResult::Unknown(prefix) => Err(xml_error(
            raw,
            offset,
            format!(
                "namespace prefix '{}' of '{}' is not declared",
                String::from_utf8_lossy(&prefix),
                local
            ),
        )),
    }
}

fn open_element(reader: &NsReader<&[u8]>, raw: &str, e: &BytesStart<'_>) -> Result<ElementBuilder> {
    let offset = reader.buffer_position();
    let (resolved, local) = reader.resolve_element(e.name());
    let (key, local) = expanded_name(raw, offset, resolved, local.as_ref())?;

    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| {
            xml_error(raw, offset, format!("malformed attribute on <{}>: {}", local, err))
        })?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let (resolved, attr_local) = reader.resolve_attribute(attr.key);
        let (attr_key, attr_local) = expanded_name(raw, offset, resolved, attr_local.as_ref())?;
        let value = attr.unescape_value().map_err(|err| {
            xml_error(
                raw,
                offset,
                format!("attribute '{}' on <{}> has an invalid value: {}", attr_local, local, err),
            )
        })?;
        if attributes.iter().any(|m: &Member| m.key() == format!("@{}", attr_key)) {
            return Err(xml_error(
                raw,
                offset,
                format!("attribute '{}' is repeated on <{}>", attr_local, local),
            ));
        }
        attributes.push(Member::new(
            format!("@{}", attr_key),
            MemberKind::Attribute,
            ComparableNode::scalar(Some(attr_local), ScalarValue::text(value.into_owned())),
        ));
    }

    Ok(ElementBuilder {
        local,
        key,
        attributes,
        text: String::new(),
        groups: Vec::new(),
    })
}

fn parse(raw: &str, max_depth: usize) -> Result<ComparableNode> {
    let mut reader = NsReader::from_str(raw);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<ElementBuilder> = Vec::new();
    let mut root: Option<(String, String, ComparableNode)> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            xml_error(
                raw,
                reader.error_position(),
                format!("input is not well-formed XML: {}", e),
            )
        })?;
        let offset = reader.buffer_position();

        match event {
            Event::Start(e) | Event::Empty(e) if stack.is_empty() && root.is_some() => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                return Err(xml_error(
                    raw,
                    offset,
                    format!("document has more than one root element (second root <{}>)", name),
                ));
            }
            Event::Start(e) => {
                check_depth(element_depth(stack.len()), max_depth)?;
                let builder = open_element(&reader, raw, &e)?;
                stack.push(builder);
            }
            Event::Empty(e) => {
                check_depth(element_depth(stack.len()), max_depth)?;
                let builder = open_element(&reader, raw, &e)?;
                close_element(builder, &mut stack, &mut root, max_depth)?;
            }
            Event::End(_) => match stack.pop() {
                Some(builder) => close_element(builder, &mut stack, &mut root, max_depth)?,
                None => return Err(xml_error(raw, offset, "closing tag without opening tag")),
            },
            Event::Text(e) => {
                let text = e.unescape().map_err(|err| {
                    xml_error(raw, offset, format!("text contains an invalid escape: {}", err))
                })?;
                push_text(raw, offset, &mut stack, text.trim())?;
            }
            Event::CData(e) => {
                let inner = e.into_inner();
                let text = String::from_utf8_lossy(&inner);
                push_text(raw, offset, &mut stack, text.trim())?;
            }
            Event::Eof => break,
            // Declaration, comments, processing instructions, doctype
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(xml_error(
            raw,
            raw.len() as u64,
            format!("element <{}> is not closed", open.local),
        ));
    }

    match root {
        Some((key, local, node)) => Ok(ComparableNode::object(
            None,
            vec![Member::new(
                key,
                MemberKind::Element,
                ComparableNode::array(Some(local), SequenceKind::XmlSiblings, vec![node]),
            )],
        )),
        None => Err(xml_error(raw, raw.len() as u64, "document has no root element")),
    }
}

/// Depth of an element with `open` enclosing elements
fn element_depth(open: usize) -> usize {
    open + 2
}

fn check_depth(depth: usize, max_depth: usize) -> Result<()> {
    if depth > max_depth {
        return Err(depth_exceeded("load_xml", DocumentFormat::Xml, max_depth));
    }
    Ok(())
}

fn close_element(
    builder: ElementBuilder,
    stack: &mut [ElementBuilder],
    root: &mut Option<(String, String, ComparableNode)>,
    max_depth: usize,
) -> Result<()> {
    if !builder.attributes.is_empty() || !builder.text.is_empty() {
        check_depth(element_depth(stack.len()) + 1, max_depth)?;
    }
    let (key, local, node) = builder.finish();
    match stack.last_mut() {
        Some(parent) => parent.add_child(key, local, node),
        None => *root = Some((key, local, node)),
    }
    Ok(())
}

fn push_text(raw: &str, offset: u64, stack: &mut [ElementBuilder], text: &str) -> Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    match stack.last_mut() {
        Some(current) => {
            current.text.push_str(text);
            Ok(())
        }
        None => Err(xml_error(
            raw,
            offset,
            format!("text '{}' appears outside the root element", text),
        )),
    }
}
