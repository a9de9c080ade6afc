//! Declarative protocol descriptions.
//!
//! Nodes live in an arena owned by [`Grammar`] and refer to each other by
//! [`NodeId`]. A loop is handed its own id while its body is being built,
//! which is how recursive protocols are written without named recursion
//! and without duplicating structure.

use super::error::GrammarError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Index of a node inside its [`Grammar`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One protocol shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Exactly one token.
    Emit(String),
    /// Each part in order.
    Sequence(Vec<NodeId>),
    /// One tag token, then the branch it selects.
    Choice(BTreeMap<String, NodeId>),
    /// A body that may refer back to the loop. `None` only while the body
    /// is under construction.
    Loop(Option<NodeId>),
    /// Sub-protocols over `channel/value` tokens, in any interleaving.
    Product(BTreeMap<String, NodeId>),
}

/// Arena of protocol nodes.
///
/// # Example
///
/// ```rust
/// use chanalg::protocol::Grammar;
///
/// let mut g = Grammar::new();
/// // ping, then either stop or go around again
/// let ping = g.looped(|g, again| {
///     let stop = g.done();
///     let tail = g.choice([("stop", stop), ("more", again)])?;
///     let ping = g.emit("ping");
///     Ok(g.sequence([ping, tail]))
/// }).unwrap();
///
/// assert!(g.check(ping, &["ping", "more", "ping", "stop"]).is_ok());
/// assert!(g.check(ping, &["ping", "more"]).is_err());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Grammar {
    nodes: Vec<Node>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// The node behind `id`.
    ///
    /// Panics if `id` was issued by a different grammar with more nodes;
    /// see [`Grammar::get`].
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// The node behind `id`, or `None` if this grammar never issued it.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Match exactly `token`.
    pub fn emit(&mut self, token: impl Into<String>) -> NodeId {
        self.push(Node::Emit(token.into()))
    }

    /// Match each part in turn.
    pub fn sequence(&mut self, parts: impl IntoIterator<Item = NodeId>) -> NodeId {
        self.push(Node::Sequence(parts.into_iter().collect()))
    }

    /// The empty protocol: matches without consuming anything.
    pub fn done(&mut self) -> NodeId {
        self.sequence([])
    }

    /// Match a tag token, then the branch registered for it.
    pub fn choice<K>(&mut self, branches: impl IntoIterator<Item = (K, NodeId)>) -> Result<NodeId, GrammarError>
    where
        K: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (tag, node) in branches {
            let tag = tag.into();
            if map.contains_key(&tag) {
                return Err(GrammarError::DuplicateTag { tag });
            }
            map.insert(tag, node);
        }
        if map.is_empty() {
            return Err(GrammarError::EmptyChoice);
        }
        Ok(self.push(Node::Choice(map)))
    }

    /// A single-tag choice: receive `tag`, then continue with `then`.
    pub fn receive(&mut self, tag: impl Into<String>, then: NodeId) -> NodeId {
        self.push(Node::Choice(BTreeMap::from([(tag.into(), then)])))
    }

    /// Sub-protocols that run concurrently, one per channel.
    ///
    /// Channel names must be single non-empty segments, since tokens are
    /// split on their first `/`.
    pub fn product<K>(&mut self, channels: impl IntoIterator<Item = (K, NodeId)>) -> Result<NodeId, GrammarError>
    where
        K: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (channel, node) in channels {
            let channel = channel.into();
            if channel.is_empty() || channel.contains('/') {
                return Err(GrammarError::InvalidChannelName { channel });
            }
            if map.contains_key(&channel) {
                return Err(GrammarError::DuplicateChannel { channel });
            }
            map.insert(channel, node);
        }
        if map.is_empty() {
            return Err(GrammarError::EmptyProduct);
        }
        Ok(self.push(Node::Product(map)))
    }

    /// A self-referential protocol.
    ///
    /// `body` receives the grammar and the loop's own id and returns the
    /// loop body, which may mention that id anywhere.
    pub fn looped<F>(&mut self, body: F) -> Result<NodeId, GrammarError>
    where
        F: FnOnce(&mut Grammar, NodeId) -> Result<NodeId, GrammarError>,
    {
        let this = self.push(Node::Loop(None));
        let inner = body(self, this)?;
        self.nodes[this.0] = Node::Loop(Some(inner));
        Ok(this)
    }

    /// Render a node as text, printing each loop once and referring back to
    /// it as `@N` afterwards.
    pub fn describe(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.describe_into(id, &mut HashSet::new(), &mut out);
        out
    }

    fn describe_into(&self, id: NodeId, seen: &mut HashSet<NodeId>, out: &mut String) {
        let Some(node) = self.get(id) else {
            out.push_str(&format!("unknown{id}"));
            return;
        };
        match node {
            Node::Emit(token) => out.push_str(&format!("emit({token})")),
            Node::Sequence(parts) => {
                out.push('[');
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.describe_into(*part, seen, out);
                }
                out.push(']');
            }
            Node::Choice(branches) | Node::Product(branches) => {
                let keyword = if matches!(node, Node::Choice(_)) {
                    "choice"
                } else {
                    "product"
                };
                out.push_str(keyword);
                out.push('{');
                for (i, (key, node)) in branches.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(key);
                    out.push_str(": ");
                    self.describe_into(*node, seen, out);
                }
                out.push('}');
            }
            Node::Loop(body) => {
                if !seen.insert(id) {
                    out.push_str(&format!("@{}", id.0));
                    return;
                }
                out.push_str(&format!("loop@{}(", id.0));
                match body {
                    Some(body) => self.describe_into(*body, seen, out),
                    None => out.push('?'),
                }
                out.push(')');
            }
        }
    }
}
