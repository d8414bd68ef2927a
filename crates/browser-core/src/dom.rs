use serde::{Deserialize, Serialize};

/// Stable handle into a [`Dom`] arena. Cheap to copy, non-owning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Ordered `name -> value` attribute mapping. A plain `Vec` rather than a
/// hash/btree map: insertion order must be preserved (boolean attributes
/// carry `""`), and elements rarely have more than a handful of attributes,
/// so linear lookup is the right tradeoff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeMap(pub Vec<(String, String)>);

impl AttributeMap {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn insert(&mut self, name: String, value: String) {
        if let Some(slot) = self.0.iter_mut().find(|(k, _)| *k == name) {
            slot.1 = value;
        } else {
            self.0.push((name, value));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One slot of the arena. The parent link is a non-owning `Option<NodeId>`;
/// children are owned by index. An arena sidesteps the cyclic parent/child
/// reference problem that `Rc<RefCell<_>>` would otherwise run into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeData {
    Element {
        tag: String,
        attributes: AttributeMap,
        children: Vec<NodeId>,
        parent: Option<NodeId>,
    },
    Text {
        text: String,
        parent: Option<NodeId>,
    },
}

impl NodeData {
    pub fn parent(&self) -> Option<NodeId> {
        match self {
            NodeData::Element { parent, .. } => *parent,
            NodeData::Text { parent, .. } => *parent,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, NodeData::Element { .. })
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            NodeData::Element { tag, .. } => Some(tag.as_str()),
            NodeData::Text { .. } => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            NodeData::Text { text, .. } => Some(text.as_str()),
            NodeData::Element { .. } => None,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        match self {
            NodeData::Element { children, .. } => children.as_slice(),
            NodeData::Text { .. } => &[],
        }
    }
}

/// The DOM: a single rooted tree of [`NodeData`] stored contiguously.
/// `root` is always an `Element` (synthesised by the tree builder if the
/// input never opened one explicitly).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dom {
    nodes: Vec<NodeData>,
    pub root: NodeId,
}

impl Dom {
    /// An arena with no nodes yet and no root. Tree builders push nodes as
    /// they go and call [`Dom::finish`] once the root is known.
    pub fn building() -> Self {
        Dom {
            nodes: Vec::new(),
            root: NodeId(0),
        }
    }

    pub fn get(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    /// Insert a node into the arena and return its handle. Used by tree
    /// builders while constructing the tree; the returned `NodeId` is
    /// stable for the lifetime of this `Dom`.
    pub fn push(&mut self, node: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if let NodeData::Element { children, .. } = self.get_mut(parent) {
            children.push(child);
        }
    }

    /// Finalize construction by declaring which node is the root.
    pub fn finish(mut self, root: NodeId) -> Self {
        self.root = root;
        self
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth-first pre-order walk starting at `id`, yielding `(depth, id)`.
    pub fn walk(&self, id: NodeId) -> Vec<(usize, NodeId)> {
        let mut out = Vec::new();
        self.walk_inner(id, 0, &mut out);
        out
    }

    fn walk_inner(&self, id: NodeId, depth: usize, out: &mut Vec<(usize, NodeId)>) {
        out.push((depth, id));
        for &child in self.get(id).children() {
            self.walk_inner(child, depth + 1, out);
        }
    }
}
