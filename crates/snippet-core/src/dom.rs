//! Mutable document tree.
//!
//! The tree is stored in an arena owned by [`Document`]; nodes are addressed by [`NodeId`].
//! Detached nodes stay in the arena (they simply have no parent) until [`Document::remove`]
//! frees them. Freed slots go on a free list and are reused by later `create_*` calls, so an id
//! must not be used after its node was removed.
//!
//! The API mirrors the small subset of DOM operations the page behaviors need:
//!
//! - node creation (`create_element`, `create_text`, ...)
//! - structural edits (`append_child`, `insert_before`, `replace_with`, `detach`, `remove`)
//! - lookups (`get_element_by_id`, `elements_by_class`, `body`)
//! - text normalization (`merge_adjacent_text`, `normalize`)

use thiserror::Error;

/// Identifier of a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Returns the arena index of this node.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A single `name="value"` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name (lowercase when produced by the HTML parser).
    pub name: String,
    /// Attribute value (entity-decoded).
    pub value: String,
}

impl Attribute {
    /// Create a new attribute.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Element payload: tag name plus ordered attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Tag name (lowercase when produced by the HTML parser).
    pub tag: String,
    /// Attributes in insertion order (name order for parsed HTML).
    pub attrs: Vec<Attribute>,
}

impl ElementData {
    /// Create an element payload without attributes.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
        }
    }

    /// Returns the value of attribute `name`, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set (or overwrite) attribute `name`.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attrs.push(Attribute::new(name, value)),
        }
    }

    /// Remove attribute `name`. Returns `true` if it was present.
    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|a| a.name != name);
        self.attrs.len() != before
    }

    /// The element's `id` attribute.
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Iterate over the whitespace-separated tokens of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    /// Returns `true` if the class list contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Add `class` to the class list (no-op if already present).
    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let joined = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => {
                format!("{} {}", existing.trim(), class)
            }
            _ => class.to_string(),
        };
        self.set_attr("class", joined);
    }

    /// Remove `class` from the class list. Returns `true` if it was present.
    ///
    /// The `class` attribute itself is kept (possibly empty), matching `classList.remove`.
    pub fn remove_class(&mut self, class: &str) -> bool {
        if !self.has_class(class) {
            return false;
        }
        let remaining: Vec<&str> = self.classes().filter(|c| *c != class).collect();
        let joined = remaining.join(" ");
        self.set_attr("class", joined);
        true
    }
}

/// Node payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document root.
    Document,
    /// `<!DOCTYPE ...>` with its raw contents (e.g. `html`).
    Doctype(String),
    /// An element.
    Element(ElementData),
    /// A text node (entity-decoded contents).
    Text(String),
    /// A comment.
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Errors produced by structural edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// The id does not belong to this document.
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    /// Text, comment and doctype nodes cannot have children.
    #[error("node {0:?} cannot have children")]
    NotAContainer(NodeId),
    /// The edit would make a node its own ancestor.
    #[error("inserting {child:?} under {parent:?} would create a cycle")]
    HierarchyRequest {
        /// The would-be parent.
        parent: NodeId,
        /// The node being inserted.
        child: NodeId,
    },
    /// The operation needs the node to be attached to a parent.
    #[error("node {0:?} has no parent")]
    Detached(NodeId),
    /// The document root cannot be removed.
    #[error("the document root cannot be removed")]
    RootRemoval,
    /// `insert_before` was given a reference node that is not a child of the parent.
    #[error("reference node {reference:?} is not a child of {parent:?}")]
    NotAChild {
        /// The parent passed to the operation.
        parent: NodeId,
        /// The reference node.
        reference: NodeId,
    },
}

/// An arena-backed mutable document tree.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document containing only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            })],
            free: Vec::new(),
        }
    }

    /// The document root.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of live nodes (attached or detached, but not removed).
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Number of arena slots, live or free.
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if `id` is a live node of this document.
    pub fn contains(&self, id: NodeId) -> bool {
        self.slot(id).is_some()
    }

    fn slot(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)?.as_ref()
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)?.as_mut()
    }

    fn node(&self, id: NodeId) -> Result<&Node, DocumentError> {
        self.slot(id).ok_or(DocumentError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DocumentError> {
        self.slot_mut(id).ok_or(DocumentError::UnknownNode(id))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let node = Node {
            kind,
            parent: None,
            children: Vec::new(),
        };
        match self.free.pop() {
            Some(index) => {
                self.nodes[index] = Some(node);
                NodeId(index)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        if let Some(slot) = self.nodes.get_mut(id.0)
            && slot.take().is_some()
        {
            self.free.push(id.0);
        }
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        self.push(NodeKind::Element(ElementData::new(tag)))
    }

    /// Create a detached element with the given attributes.
    pub fn create_element_with_attrs(
        &mut self,
        tag: impl Into<String>,
        attrs: Vec<Attribute>,
    ) -> NodeId {
        self.push(NodeKind::Element(ElementData {
            tag: tag.into(),
            attrs,
        }))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    /// Create a detached comment node.
    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Comment(text.into()))
    }

    /// Create a detached doctype node.
    pub fn create_doctype(&mut self, name: impl Into<String>) -> NodeId {
        self.push(NodeKind::Doctype(name.into()))
    }

    /// Node payload, or `None` for an unknown id.
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.slot(id).map(|n| &n.kind)
    }

    /// Element payload, if `id` is an element.
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.kind(id)? {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Mutable element payload, if `id` is an element.
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match self.slot_mut(id).map(|n| &mut n.kind)? {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Tag name, if `id` is an element.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    /// Text contents, if `id` is a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns `true` if `id` is a text node.
    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Some(NodeKind::Text(_)))
    }

    /// Parent of `id`, if attached.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).and_then(|n| n.parent)
    }

    /// Children of `id` (empty for unknown ids and leaf nodes).
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slot(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Returns `true` if `ancestor` is `node` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    fn check_insertion(&self, parent: NodeId, child: NodeId) -> Result<(), DocumentError> {
        let parent_node = self.node(parent)?;
        self.node(child)?;
        if !matches!(parent_node.kind, NodeKind::Document | NodeKind::Element(_)) {
            return Err(DocumentError::NotAContainer(parent));
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DocumentError::HierarchyRequest { parent, child });
        }
        Ok(())
    }

    /// Detach `id` from its parent (no-op if already detached).
    pub fn detach(&mut self, id: NodeId) -> Result<(), DocumentError> {
        let Some(parent) = self.node(id)?.parent else {
            return Ok(());
        };
        self.node_mut(parent)?.children.retain(|c| *c != id);
        self.node_mut(id)?.parent = None;
        Ok(())
    }

    /// Detach `id` and free it together with its whole subtree.
    ///
    /// Returns the number of nodes freed. The ids of freed nodes become invalid and may be
    /// handed out again by later `create_*` calls.
    pub fn remove(&mut self, id: NodeId) -> Result<usize, DocumentError> {
        if id == self.root() {
            return Err(DocumentError::RootRemoval);
        }
        self.detach(id)?;
        let mut doomed = vec![id];
        doomed.extend(self.descendants(id));
        for &node in &doomed {
            self.release(node);
        }
        Ok(doomed.len())
    }

    /// Append `child` as the last child of `parent`, moving it if it is already attached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DocumentError> {
        self.check_insertion(parent, child)?;
        self.detach(child)?;
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Insert `child` into `parent` immediately before `reference`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), DocumentError> {
        self.check_insertion(parent, child)?;
        if child == reference {
            return Ok(());
        }
        if self.parent(reference) != Some(parent) {
            return Err(DocumentError::NotAChild { parent, reference });
        }
        self.detach(child)?;
        let index = self
            .node(parent)?
            .children
            .iter()
            .position(|c| *c == reference)
            .ok_or(DocumentError::NotAChild { parent, reference })?;
        self.node_mut(parent)?.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Replace `old` with the ordered `replacements`, detaching `old`.
    ///
    /// Replacements that are currently children of `old` are moved out first, which makes this
    /// usable for unwrapping an element in place.
    pub fn replace_with(
        &mut self,
        old: NodeId,
        replacements: &[NodeId],
    ) -> Result<(), DocumentError> {
        let parent = self.node(old)?.parent.ok_or(DocumentError::Detached(old))?;
        for &node in replacements {
            if node == old {
                return Err(DocumentError::HierarchyRequest {
                    parent,
                    child: node,
                });
            }
            self.check_insertion(parent, node)?;
        }
        for &node in replacements {
            self.detach(node)?;
        }

        let index = self
            .node(parent)?
            .children
            .iter()
            .position(|c| *c == old)
            .ok_or(DocumentError::Detached(old))?;
        let siblings = &mut self.node_mut(parent)?.children;
        siblings.splice(index..=index, replacements.iter().copied());
        for &node in replacements {
            self.node_mut(node)?.parent = Some(parent);
        }
        self.node_mut(old)?.parent = None;
        Ok(())
    }

    /// Replace the contents of text node `id`.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<(), DocumentError> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Text(existing) => {
                *existing = text.into();
                Ok(())
            }
            _ => Err(DocumentError::NotAContainer(id)),
        }
    }

    /// Pre-order traversal of the descendants of `id` (excluding `id` itself).
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { doc: self, stack }
    }

    /// First attached element (in document order) whose `id` attribute equals `element_id`.
    pub fn get_element_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .find(|&n| self.element(n).and_then(ElementData::id) == Some(element_id))
    }

    /// Attached elements carrying `class`, in document order.
    pub fn elements_by_class(&self, class: &str) -> Vec<NodeId> {
        self.descendants(self.root())
            .filter(|&n| self.element(n).is_some_and(|e| e.has_class(class)))
            .collect()
    }

    /// Attached elements with tag `tag`, in document order.
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.descendants(self.root())
            .filter(|&n| self.tag_name(n).is_some_and(|t| t.eq_ignore_ascii_case(tag)))
            .collect()
    }

    /// The `<body>` element, if any.
    pub fn body(&self) -> Option<NodeId> {
        self.descendants(self.root())
            .find(|&n| self.tag_name(n) == Some("body"))
    }

    /// Concatenated text of every text node under `id` (including `id` if it is text).
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(text) = self.text(id) {
            out.push_str(text);
        }
        for node in self.descendants(id) {
            if let Some(text) = self.text(node) {
                out.push_str(text);
            }
        }
        out
    }

    /// Merge runs of adjacent text children of `parent` and drop empty text children.
    ///
    /// Only direct children are touched. Dropped text nodes are freed. Returns the number of
    /// text nodes removed.
    pub fn merge_adjacent_text(&mut self, parent: NodeId) -> Result<usize, DocumentError> {
        let children = self.node(parent)?.children.clone();
        let mut kept: Vec<NodeId> = Vec::with_capacity(children.len());
        let mut removed = 0;

        for child in children {
            let Some(text) = self.text(child).map(str::to_owned) else {
                kept.push(child);
                continue;
            };
            if text.is_empty() {
                self.release(child);
                removed += 1;
                continue;
            }
            match kept.last().copied() {
                Some(prev) if self.is_text(prev) => {
                    if let NodeKind::Text(existing) = &mut self.node_mut(prev)?.kind {
                        existing.push_str(&text);
                    }
                    self.release(child);
                    removed += 1;
                }
                _ => kept.push(child),
            }
        }

        self.node_mut(parent)?.children = kept;
        Ok(removed)
    }

    /// Recursively apply [`Document::merge_adjacent_text`] to `id` and its descendants.
    pub fn normalize(&mut self, id: NodeId) -> Result<usize, DocumentError> {
        let mut removed = self.merge_adjacent_text(id)?;
        let children = self.node(id)?.children.clone();
        for child in children {
            if matches!(self.kind(child), Some(NodeKind::Element(_))) {
                removed += self.normalize(child)?;
            }
        }
        Ok(removed)
    }
}

/// Iterator returned by [`Document::descendants`].
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}
