//! The immutable virtual node tree.
//!
//! Application code describes the desired screen as a fresh [`VirtualNode`]
//! tree every frame. Nodes are plain values: once built they are only read,
//! and a change between frames is expressed as a [`Patch`](crate::Patch)
//! that describes a replacement rather than a mutation.

use crate::geometry::Rect;
use crate::path::Path;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Element properties, ordered by key so diffs are deterministic.
pub type Props = BTreeMap<String, Value>;

/// An element node: a tag, its props, and ordered children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Element tag (`"box"`, `"row"`, ...)
    pub tag: String,
    /// Declared properties
    #[serde(default)]
    pub props: Props,
    /// Ordered children
    #[serde(default)]
    pub children: Vec<VirtualNode>,
}

impl Element {
    /// Create an element with no props or children.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            props: Props::new(),
            children: Vec::new(),
        }
    }

    /// Look up a prop.
    #[must_use]
    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }
}

/// One node of the virtual tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VirtualNode {
    /// A styled box with children
    Element(Element),
    /// A run of text (may contain newlines)
    Text(String),
    /// Transparent grouping of children
    Fragment(Vec<VirtualNode>),
    /// Children visible only inside `rect`
    Clipping {
        /// Clip rectangle, relative to the parent's content origin
        rect: Rect,
        /// Clipped children
        children: Vec<VirtualNode>,
    },
    /// Renders nothing
    Empty,
}

/// Discriminant of a [`VirtualNode`], used to detect kind changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// [`VirtualNode::Element`]
    Element,
    /// [`VirtualNode::Text`]
    Text,
    /// [`VirtualNode::Fragment`]
    Fragment,
    /// [`VirtualNode::Clipping`]
    Clipping,
    /// [`VirtualNode::Empty`]
    Empty,
}

/// A node's own data without its children.
///
/// The renderer keeps one of these per rendered element and represents the
/// children as element handles instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeData {
    /// Element tag and props
    Element {
        /// Element tag
        tag: String,
        /// Declared properties
        props: Props,
    },
    /// Text content
    Text(String),
    /// Fragment marker
    Fragment,
    /// Clip rectangle
    Clipping(Rect),
    /// Empty marker
    Empty,
}

impl NodeData {
    /// Kind of node this data came from.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Element { .. } => NodeKind::Element,
            Self::Text(_) => NodeKind::Text,
            Self::Fragment => NodeKind::Fragment,
            Self::Clipping(_) => NodeKind::Clipping,
            Self::Empty => NodeKind::Empty,
        }
    }

    /// Look up an element prop. Always `None` for other kinds.
    #[must_use]
    pub fn prop(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Element { props, .. } => props.get(key),
            _ => None,
        }
    }

    /// Rebuild a full node from this data and the given children.
    ///
    /// Children are dropped for kinds that cannot hold any.
    #[must_use]
    pub fn into_node(self, children: Vec<VirtualNode>) -> VirtualNode {
        match self {
            Self::Element { tag, props } => VirtualNode::Element(Element {
                tag,
                props,
                children,
            }),
            Self::Text(content) => VirtualNode::Text(content),
            Self::Fragment => VirtualNode::Fragment(children),
            Self::Clipping(rect) => VirtualNode::Clipping { rect, children },
            Self::Empty => VirtualNode::Empty,
        }
    }
}

impl VirtualNode {
    /// Create an element node.
    #[must_use]
    pub fn element(tag: impl Into<String>) -> Self {
        Self::Element(Element::new(tag))
    }

    /// Create a text node.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    /// Create a fragment.
    #[must_use]
    pub fn fragment(children: impl IntoIterator<Item = Self>) -> Self {
        Self::Fragment(children.into_iter().collect())
    }

    /// Create a clipping node.
    #[must_use]
    pub fn clipping(rect: Rect, children: impl IntoIterator<Item = Self>) -> Self {
        Self::Clipping {
            rect,
            children: children.into_iter().collect(),
        }
    }

    /// Create an empty node.
    #[must_use]
    pub const fn empty() -> Self {
        Self::Empty
    }

    /// Set a prop. Has no effect on non-element nodes.
    #[must_use]
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if let Self::Element(el) = &mut self {
            el.props.insert(key.into(), value.into());
        }
        self
    }

    /// Append a child. Has no effect on text and empty nodes.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        if let Some(children) = self.children_vec_mut() {
            children.push(child);
        }
        self
    }

    /// Append several children. Has no effect on text and empty nodes.
    #[must_use]
    pub fn with_children(mut self, new_children: impl IntoIterator<Item = Self>) -> Self {
        if let Some(children) = self.children_vec_mut() {
            children.extend(new_children);
        }
        self
    }

    /// Kind of this node.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Element(_) => NodeKind::Element,
            Self::Text(_) => NodeKind::Text,
            Self::Fragment(_) => NodeKind::Fragment,
            Self::Clipping { .. } => NodeKind::Clipping,
            Self::Empty => NodeKind::Empty,
        }
    }

    /// Check if this kind of node can hold children.
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Element(_) | Self::Fragment(_) | Self::Clipping { .. }
        )
    }

    /// Ordered children (empty for text and empty nodes).
    #[must_use]
    pub fn children(&self) -> &[Self] {
        match self {
            Self::Element(el) => &el.children,
            Self::Fragment(children) | Self::Clipping { children, .. } => children,
            Self::Text(_) | Self::Empty => &[],
        }
    }

    /// Mutable access to the child list, used when building a new tree.
    pub(crate) fn children_vec_mut(&mut self) -> Option<&mut Vec<Self>> {
        match self {
            Self::Element(el) => Some(&mut el.children),
            Self::Fragment(children) | Self::Clipping { children, .. } => Some(children),
            Self::Text(_) | Self::Empty => None,
        }
    }

    /// Borrow as an element.
    #[must_use]
    pub const fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Borrow the text content of a text node.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(content) => Some(content),
            _ => None,
        }
    }

    /// Look up an element prop. Always `None` for other kinds.
    #[must_use]
    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.as_element().and_then(|el| el.prop(key))
    }

    /// This node's own data, without children.
    #[must_use]
    pub fn data(&self) -> NodeData {
        match self {
            Self::Element(el) => NodeData::Element {
                tag: el.tag.clone(),
                props: el.props.clone(),
            },
            Self::Text(content) => NodeData::Text(content.clone()),
            Self::Fragment(_) => NodeData::Fragment,
            Self::Clipping { rect, .. } => NodeData::Clipping(*rect),
            Self::Empty => NodeData::Empty,
        }
    }

    /// Resolve a path to the node it addresses.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> Option<&Self> {
        path.segments()
            .iter()
            .try_fold(self, |node, &index| node.children().get(index))
    }

    /// Total number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(Self::node_count).sum::<usize>()
    }
}

impl From<Element> for VirtualNode {
    fn from(el: Element) -> Self {
        Self::Element(el)
    }
}
