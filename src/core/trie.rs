//! Prefix tree over lowercased characters.
//!
//! The tree is built by a [`TrieBuilder`] (single writer) and frozen into a
//! [`Trie`] (read-only, shareable across threads). Nodes live in one arena and
//! refer to their children by index, so traversal never recurses and the tree
//! has a single owner.
//!
//! # Normalization
//!
//! Every path is keyed by [`fold_char`], a per-character lowering. Terms keep
//! their exact spelling, so one node may hold several terms that differ only
//! by letter case:
//!
//! ```text
//! root ─f─ · ─l─ · ─a─ · ─g─ {"flag", "Flag"}
//! ```

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use super::term::Term;

pub(crate) type NodeId = usize;

pub(crate) const ROOT: NodeId = 0;

/// Lower a single character with the simple (one-to-one) Unicode mapping.
///
/// One input character is always one trie step. `İ` (U+0130) is the only
/// character whose full lowercase form is longer; its simple mapping is `i`.
#[inline]
pub fn fold_char(ch: char) -> char {
    if ch.is_ascii() {
        return ch.to_ascii_lowercase();
    }
    if ch == '\u{130}' {
        return 'i';
    }
    let mut lower = ch.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(folded), None) => folded,
        _ => ch,
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Node {
    children: FxHashMap<char, NodeId>,
    terms: FxHashMap<String, Term>,
}

impl Node {
    #[inline]
    pub(crate) fn child(&self, folded: char) -> Option<NodeId> {
        self.children.get(&folded).copied()
    }

    #[inline]
    pub(crate) fn has_terms(&self) -> bool {
        !self.terms.is_empty()
    }

    #[inline]
    pub(crate) fn term(&self, text: &str) -> Option<&Term> {
        self.terms.get(text)
    }

    /// Any one of the node's terms. Which one is unspecified, but the choice
    /// is stable for a given trie.
    #[inline]
    pub(crate) fn any_term(&self) -> Option<&Term> {
        self.terms.values().next()
    }
}

/// Mutable, insert-only construction phase of a [`Trie`].
///
/// # Example
///
/// ```
/// use trex::TrieBuilder;
///
/// let mut builder = TrieBuilder::new();
/// builder.insert("flag", 0b01);
/// builder.insert("Flag", 0b10);
/// let trie = builder.build();
///
/// assert_eq!(trie.len(), 2);
/// assert_eq!(trie.search("Flag", true).map(|t| t.flags()), Some(0b10));
/// ```
#[derive(Debug, Clone)]
pub struct TrieBuilder {
    nodes: Vec<Node>,
    len: usize,
}

impl Default for TrieBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TrieBuilder {
    /// Create a builder holding only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
            len: 0,
        }
    }

    /// Insert `text` with `flags`.
    ///
    /// New terms get the number of distinct terms inserted before them as
    /// their position. Re-inserting an exact text replaces its flags and keeps
    /// its position.
    pub fn insert(&mut self, text: &str, flags: u64) {
        let position = self.len;
        self.insert_at(text, flags, position);
    }

    /// Insert `text` with `flags` and an explicit position counter.
    ///
    /// The position only applies when the exact text is new; an existing term
    /// keeps the position it was first inserted with.
    pub fn insert_at(&mut self, text: &str, flags: u64, position: usize) {
        if text.is_empty() {
            return;
        }

        let mut id = ROOT;
        for ch in text.chars() {
            let folded = fold_char(ch);
            id = match self.nodes[id].child(folded) {
                Some(child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[id].children.insert(folded, child);
                    child
                }
            };
        }

        let node = &mut self.nodes[id];
        if let Some(term) = node.terms.get_mut(text) {
            trace!(text, flags, "overwriting term flags");
            term.replace_flags(flags);
        } else {
            node.terms
                .insert(text.to_owned(), Term::new(text, position, flags));
            self.len += 1;
        }
    }

    /// Number of distinct exact texts inserted so far.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` if no term has been inserted.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Freeze the tree. No further insertion is possible.
    pub fn build(self) -> Trie {
        debug!(
            terms = self.len,
            nodes = self.nodes.len(),
            "trie built"
        );
        Trie {
            nodes: self.nodes,
            len: self.len,
        }
    }
}

impl<S: AsRef<str>> Extend<(S, u64)> for TrieBuilder {
    fn extend<I: IntoIterator<Item = (S, u64)>>(&mut self, iter: I) {
        for (text, flags) in iter {
            self.insert(text.as_ref(), flags);
        }
    }
}

impl<S: AsRef<str>> FromIterator<(S, u64)> for TrieBuilder {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut builder = Self::new();
        builder.extend(iter);
        builder
    }
}

/// Immutable prefix tree, queried by the batch and streaming lexers.
///
/// A `Trie` has no mutating methods and is `Send + Sync`: share it by
/// reference (or behind an `Arc`) with as many lexers as needed.
#[derive(Debug, Clone)]
pub struct Trie {
    nodes: Vec<Node>,
    len: usize,
}

impl Default for Trie {
    fn default() -> Self {
        TrieBuilder::new().build()
    }
}

impl From<TrieBuilder> for Trie {
    fn from(builder: TrieBuilder) -> Self {
        builder.build()
    }
}

impl Trie {
    /// Number of distinct exact texts.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` if the trie holds no terms.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Exact lookup of a whole term, no prefix matching.
    pub fn get(&self, text: &str) -> Option<&Term> {
        let mut id = ROOT;
        for ch in text.chars() {
            id = self.nodes[id].child(fold_char(ch))?;
        }
        self.nodes[id].term(text)
    }

    /// Visit every node, children before their parent.
    ///
    /// The traversal uses an explicit stack. The first `Err` returned by
    /// `visit` stops it and is passed back to the caller.
    pub fn walk<E, F>(&self, mut visit: F) -> Result<(), E>
    where
        F: FnMut(NodeView<'_>) -> Result<(), E>,
    {
        // (node, depth, children already pushed)
        let mut stack: Vec<(NodeId, usize, bool)> = vec![(ROOT, 0, false)];

        while let Some((id, depth, expanded)) = stack.pop() {
            let node = &self.nodes[id];
            if expanded {
                visit(NodeView { node, depth })?;
            } else {
                stack.push((id, depth, true));
                stack.extend(node.children.values().map(|&child| (child, depth + 1, false)));
            }
        }

        Ok(())
    }

    /// Iterate over every stored term, in node creation order.
    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.nodes.iter().flat_map(|node| node.terms.values())
    }
}

/// Read-only view of a node handed to [`Trie::walk`] visitors.
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a> {
    node: &'a Node,
    depth: usize,
}

impl<'a> NodeView<'a> {
    /// Terms terminating at this node (empty for interior nodes).
    pub fn terms(&self) -> impl Iterator<Item = &'a Term> {
        self.node.terms.values()
    }

    /// `true` if at least one term terminates here.
    pub fn is_terminal(&self) -> bool {
        self.node.has_terms()
    }

    /// Number of distinct next characters below this node.
    pub fn child_count(&self) -> usize {
        self.node.children.len()
    }

    /// Distance from the root, in characters.
    pub fn depth(&self) -> usize {
        self.depth
    }
}
