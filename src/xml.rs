//! Minimal mutable XML tree for rewriting package parts.
//!
//! Parts are parsed with `roxmltree` and converted into owned elements that
//! keep their qualified names (`w:p`), namespace declarations and attribute
//! order, so a part that is read and written back without edits only loses
//! insignificant formatting inside tags.

use std::collections::HashSet;

use crate::error::Error;

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum XmlNode {
    Element(XmlElement),
    Text(String),
    Comment(String),
    ProcessingInstruction(String, Option<String>),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct XmlElement {
    pub(crate) name: String,
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) children: Vec<XmlNode>,
}

pub(crate) fn parse(text: &str) -> Result<XmlElement, Error> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let doc = roxmltree::Document::parse(text)?;
    Ok(convert(doc.root_element(), None))
}

fn qualified(node: roxmltree::Node, ns: Option<&str>, local: &str) -> String {
    let prefix = match ns {
        Some(XML_NS) => Some("xml"),
        Some(uri) => node.lookup_prefix(uri),
        None => None,
    };
    match prefix {
        Some(p) if !p.is_empty() => format!("{p}:{local}"),
        _ => local.to_string(),
    }
}

fn convert(node: roxmltree::Node, parent: Option<roxmltree::Node>) -> XmlElement {
    let tag = node.tag_name();
    let mut el = XmlElement::new(&qualified(node, tag.namespace(), tag.name()));

    let inherited: HashSet<(Option<&str>, &str)> = parent
        .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();
    for ns in node.namespaces() {
        if ns.name() == Some("xml") || inherited.contains(&(ns.name(), ns.uri())) {
            continue;
        }
        let decl = match ns.name() {
            Some(prefix) => format!("xmlns:{prefix}"),
            None => "xmlns".to_string(),
        };
        el.attrs.push((decl, ns.uri().to_string()));
    }
    for attr in node.attributes() {
        el.attrs
            .push((qualified(node, attr.namespace(), attr.name()), attr.value().to_string()));
    }

    for child in node.children() {
        match child.node_type() {
            roxmltree::NodeType::Element => {
                el.children.push(XmlNode::Element(convert(child, Some(node))))
            }
            roxmltree::NodeType::Text => {
                if let Some(t) = child.text() {
                    el.children.push(XmlNode::Text(t.to_string()));
                }
            }
            roxmltree::NodeType::Comment => {
                if let Some(t) = child.text() {
                    el.children.push(XmlNode::Comment(t.to_string()));
                }
            }
            roxmltree::NodeType::PI => {
                if let Some(pi) = child.pi() {
                    el.children.push(XmlNode::ProcessingInstruction(
                        pi.target.to_string(),
                        pi.value.map(str::to_string),
                    ));
                }
            }
            roxmltree::NodeType::Root => {}
        }
    }
    el
}

/// Position of `name` in a schema sequence; names not listed sort last.
fn rank(order: &[&str], name: &str) -> usize {
    order.iter().position(|n| *n == name).unwrap_or(order.len())
}

impl XmlElement {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub(crate) fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub(crate) fn is(&self, name: &str) -> bool {
        self.name == name
    }

    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub(crate) fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(k, _)| k != name);
    }

    pub(crate) fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|n| match n {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    pub(crate) fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|n| match n {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    pub(crate) fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.is(name))
    }

    pub(crate) fn child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|e| e.is(name))
    }

    /// `w:val` of the named child, the usual shape of WordprocessingML properties.
    pub(crate) fn child_val(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(|c| c.attr("w:val"))
    }

    /// Existing child `name`, or a new empty one inserted where `order` says it belongs.
    pub(crate) fn ensure_child(&mut self, name: &str, order: &[&str]) -> &mut XmlElement {
        let idx = match self.position_of(name) {
            Some(idx) => idx,
            None => self.insert_ordered(XmlElement::new(name), order),
        };
        match &mut self.children[idx] {
            XmlNode::Element(e) => e,
            _ => unreachable!("index points at an element"),
        }
    }

    /// Replace child `child.name` or insert it in schema order.
    pub(crate) fn put_child(&mut self, child: XmlElement, order: &[&str]) {
        match self.position_of(&child.name) {
            Some(idx) => self.children[idx] = XmlNode::Element(child),
            None => {
                self.insert_ordered(child, order);
            }
        }
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|n| matches!(n, XmlNode::Element(e) if e.is(name)))
    }

    fn insert_ordered(&mut self, child: XmlElement, order: &[&str]) -> usize {
        let wanted = rank(order, &child.name);
        let idx = self
            .children
            .iter()
            .position(|n| matches!(n, XmlNode::Element(e) if rank(order, &e.name) > wanted))
            .unwrap_or(self.children.len());
        self.children.insert(idx, XmlNode::Element(child));
        idx
    }

    /// Remove every direct child element called `name`; returns how many went.
    pub(crate) fn remove_children(&mut self, name: &str) -> usize {
        let before = self.children.len();
        self.children
            .retain(|n| !matches!(n, XmlNode::Element(e) if e.is(name)));
        before - self.children.len()
    }

    pub(crate) fn has_descendant(&self, names: &[&str]) -> bool {
        self.elements()
            .any(|e| names.contains(&e.name.as_str()) || e.has_descendant(names))
    }

    /// Concatenated character data of direct text children.
    pub(crate) fn text(&self) -> String {
        let mut out = String::new();
        for n in &self.children {
            if let XmlNode::Text(t) = n {
                out.push_str(t);
            }
        }
        out
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.children.push(XmlNode::Text(text.to_string()));
    }

    pub(crate) fn to_xml(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n");
        self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (k, v) in &self.attrs {
            out.push(' ');
            out.push_str(k);
            out.push_str("=\"");
            escape_into(out, v, true);
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                XmlNode::Element(e) => e.write_to(out),
                XmlNode::Text(t) => escape_into(out, t, false),
                XmlNode::Comment(c) => {
                    out.push_str("<!--");
                    out.push_str(c);
                    out.push_str("-->");
                }
                XmlNode::ProcessingInstruction(target, value) => {
                    out.push_str("<?");
                    out.push_str(target);
                    if let Some(v) = value {
                        out.push(' ');
                        out.push_str(v);
                    }
                    out.push_str("?>");
                }
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

fn escape_into(out: &mut String, s: &str, attribute: bool) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\n' if attribute => out.push_str("&#10;"),
            '\t' if attribute => out.push_str("&#9;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
}
