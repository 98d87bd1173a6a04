//! Namespace-aware document tree built over quick-xml events.
//!
//! Feeds are small documents that get queried many times by the resolver and
//! the extensions, so instead of re-streaming events per field the reader
//! builds this arena tree once per import. Elements live in a flat store and
//! reference each other by [`NodeId`]; namespace prefixes are resolved to URIs
//! at build time via a binding stack, while the original prefixed names and
//! attributes are kept verbatim so inline XHTML content can be serialized
//! back with its prefixes intact.
//!
//! The builder fails fast on any DOCTYPE declaration before the first element
//! is examined. Dialect detection never sees a document that carried one.

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::xml::ns;

/// Index of an element in the document arena.
pub type NodeId = usize;

/// Nesting guard for pathological documents; feeds are shallow in practice
/// and subtree serialization recurses over this depth.
const MAX_ELEMENT_DEPTH: usize = 128;

#[derive(Debug)]
enum Node {
    Element(NodeId),
    Text(String),
}

#[derive(Debug)]
struct Element {
    prefix: Option<String>,
    local: String,
    namespace: Option<String>,
    /// Attributes in document order, raw qualified keys, unescaped values.
    /// `xmlns`/`xmlns:*` declarations are kept here as well.
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{p}:{}", self.local),
            None => self.local.clone(),
        }
    }
}

/// An immutable XML document with namespace-resolved elements.
#[derive(Debug)]
pub struct Document {
    store: Vec<Element>,
    root: NodeId,
    encoding: Option<String>,
}

impl Document {
    /// Parses an XML document into a tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for empty input, any DOCTYPE
    /// declaration ("illegal DOCTYPE"), unresolvable entity references, or
    /// XML that quick-xml rejects as ill-formed.
    pub fn parse(content: &str) -> Result<Document> {
        if content.trim().is_empty() {
            return Err(Error::InvalidInput("document is empty".into()));
        }

        // SEC: quick-xml (pinned 0.37) never parses <!ENTITY> declarations,
        // and any DOCTYPE at all is rejected below, so entity expansion is
        // limited to the five XML builtins resolved by the escape layer.
        // Custom entities surface as an unescape error and abort the parse.
        let mut reader = Reader::from_str(content);

        let mut store: Vec<Element> = Vec::new();
        let mut stack: Vec<NodeId> = Vec::new();
        let mut bindings: Vec<Vec<(Option<String>, String)>> = Vec::new();
        let mut root: Option<NodeId> = None;
        let mut encoding: Option<String> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Decl(decl)) => {
                    if let Some(Ok(enc)) = decl.encoding() {
                        encoding = Some(String::from_utf8_lossy(&enc).into_owned());
                    }
                }
                Ok(Event::DocType(_)) => {
                    return Err(Error::InvalidInput(
                        "illegal DOCTYPE: document type declarations are not allowed in feeds"
                            .into(),
                    ));
                }
                Ok(Event::Start(e)) => {
                    if stack.len() >= MAX_ELEMENT_DEPTH {
                        return Err(Error::InvalidInput(format!(
                            "element nesting exceeds maximum of {MAX_ELEMENT_DEPTH} levels"
                        )));
                    }
                    let id = open_element(&e, &reader, &mut store, &mut bindings)?;
                    attach(&mut store, &stack, &mut root, id)?;
                    stack.push(id);
                }
                Ok(Event::Empty(e)) => {
                    let id = open_element(&e, &reader, &mut store, &mut bindings)?;
                    attach(&mut store, &stack, &mut root, id)?;
                    bindings.pop();
                }
                Ok(Event::End(_)) => {
                    stack.pop();
                    bindings.pop();
                }
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|e| Error::InvalidInput(format!("XML parse error: {e}")))?;
                    if let Some(&parent) = stack.last() {
                        if !text.trim().is_empty() {
                            store[parent].children.push(Node::Text(text.into_owned()));
                        }
                    }
                }
                Ok(Event::CData(e)) => {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    if let Some(&parent) = stack.last() {
                        if !text.is_empty() {
                            store[parent].children.push(Node::Text(text));
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::InvalidInput(format!("XML parse error: {e}")));
                }
                _ => {}
            }
            buf.clear();
        }

        match root {
            Some(root) => Ok(Document {
                store,
                root,
                encoding,
            }),
            None => Err(Error::InvalidInput("no root element found".into())),
        }
    }

    /// The document's root element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Encoding declared in the XML declaration, defaulting to UTF-8.
    pub fn encoding(&self) -> &str {
        self.encoding.as_deref().unwrap_or("UTF-8")
    }

    /// Local (unprefixed) element name.
    pub fn local_name(&self, id: NodeId) -> &str {
        &self.store[id].local
    }

    /// Resolved namespace URI of the element, if any was in scope.
    pub fn namespace(&self, id: NodeId) -> Option<&str> {
        self.store[id].namespace.as_deref()
    }

    /// Attribute value by raw qualified key (`version`, `xml:lang`, `rdf:about`).
    pub fn attr(&self, id: NodeId, key: &str) -> Option<&str> {
        self.store[id]
            .attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Direct child elements in document order.
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.store[id].children.iter().filter_map(|n| match n {
            Node::Element(id) => Some(*id),
            Node::Text(_) => None,
        })
    }

    /// Direct child elements matching a namespace URI and local name.
    ///
    /// `namespace: None` matches only elements with *no* namespace in scope,
    /// which is how plain RSS 0.9x/2.0 elements appear.
    pub fn find_children<'a>(
        &'a self,
        id: NodeId,
        namespace: Option<&'a str>,
        local: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.child_elements(id)
            .filter(move |&c| self.store[c].local == local && self.namespace(c) == namespace)
    }

    /// First matching direct child.
    pub fn find_child(&self, id: NodeId, namespace: Option<&str>, local: &str) -> Option<NodeId> {
        self.find_children(id, namespace, local).next()
    }

    /// Depth-first descendant-or-self search by namespace URI and local name.
    pub fn find_descendant(&self, from: NodeId, namespace: &str, local: &str) -> Option<NodeId> {
        if self.store[from].local == local && self.namespace(from) == Some(namespace) {
            return Some(from);
        }
        self.child_elements(from)
            .find_map(|c| self.find_descendant(c, namespace, local))
    }

    /// Concatenated text of the element and its descendants, trimmed.
    /// Returns `None` when the result is empty; feed fields treat
    /// whitespace-only elements as absent.
    pub fn text(&self, id: NodeId) -> Option<String> {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        let trimmed = out.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Text content of the first matching direct child.
    pub fn child_text(&self, id: NodeId, namespace: Option<&str>, local: &str) -> Option<String> {
        self.find_child(id, namespace, local)
            .and_then(|c| self.text(c))
    }

    /// Serializes the element's children back to markup, keeping original
    /// prefixes and attributes. Used for Atom `type="xhtml"` content, where
    /// the value of the field *is* the embedded markup.
    pub fn serialize_children(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in &self.store[id].children {
            self.serialize_node(node, &mut out);
        }
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        for node in &self.store[id].children {
            match node {
                Node::Text(t) => out.push_str(t),
                Node::Element(c) => self.collect_text(*c, out),
            }
        }
    }

    fn serialize_node(&self, node: &Node, out: &mut String) {
        match node {
            Node::Text(t) => out.push_str(&escape(t.as_str())),
            Node::Element(id) => {
                let el = &self.store[*id];
                let name = el.qualified_name();
                out.push('<');
                out.push_str(&name);
                for (k, v) in &el.attributes {
                    out.push(' ');
                    out.push_str(k);
                    out.push_str("=\"");
                    out.push_str(&escape(v.as_str()));
                    out.push('"');
                }
                if el.children.is_empty() {
                    out.push_str("/>");
                } else {
                    out.push('>');
                    for child in &el.children {
                        self.serialize_node(child, out);
                    }
                    out.push_str("</");
                    out.push_str(&name);
                    out.push('>');
                }
            }
        }
    }
}

/// Creates an element from a start tag: captures attributes, pushes its
/// namespace declarations as a new binding frame, and resolves the element's
/// own prefix against the updated stack.
fn open_element(
    e: &quick_xml::events::BytesStart<'_>,
    reader: &Reader<&[u8]>,
    store: &mut Vec<Element>,
    bindings: &mut Vec<Vec<(Option<String>, String)>>,
) -> Result<NodeId> {
    let decoder = reader.decoder();
    let mut attributes = Vec::new();
    let mut frame: Vec<(Option<String>, String)> = Vec::new();

    for attr_result in e.attributes() {
        let attr = match attr_result {
            Ok(attr) => attr,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed attribute");
                continue;
            }
        };
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .decode_and_unescape_value(decoder)
            .map_err(|e| Error::InvalidInput(format!("XML parse error: {e}")))?
            .into_owned();

        if key == "xmlns" {
            frame.push((None, value.clone()));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            frame.push((Some(prefix.to_string()), value.clone()));
        }
        attributes.push((key, value));
    }
    bindings.push(frame);

    let name = e.name();
    let local = String::from_utf8_lossy(name.local_name().as_ref()).into_owned();
    let prefix = name
        .prefix()
        .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned());
    let namespace = resolve_namespace(bindings, prefix.as_deref());

    store.push(Element {
        prefix,
        local,
        namespace,
        attributes,
        children: Vec::new(),
    });
    Ok(store.len() - 1)
}

/// Links a freshly created element to its parent, or installs it as the root.
fn attach(
    store: &mut [Element],
    stack: &[NodeId],
    root: &mut Option<NodeId>,
    id: NodeId,
) -> Result<()> {
    if let Some(&parent) = stack.last() {
        store[parent].children.push(Node::Element(id));
    } else if root.is_some() {
        return Err(Error::InvalidInput(
            "multiple root elements in document".into(),
        ));
    } else {
        *root = Some(id);
    }
    Ok(())
}

/// Resolves a prefix against the binding stack, innermost frame first.
/// The `xml` prefix is implicitly bound; an empty URI un-binds the default
/// namespace per the Namespaces in XML recommendation.
fn resolve_namespace(
    bindings: &[Vec<(Option<String>, String)>],
    prefix: Option<&str>,
) -> Option<String> {
    if prefix == Some("xml") {
        return Some(ns::XML.to_string());
    }
    for frame in bindings.iter().rev() {
        for (bound, uri) in frame.iter().rev() {
            if bound.as_deref() == prefix {
                if uri.is_empty() {
                    return None;
                }
                return Some(uri.clone());
            }
        }
    }
    None
}
