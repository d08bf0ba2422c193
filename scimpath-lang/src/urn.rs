//! A lower-cased byte trie of registered schema URNs, so the path scanner
//! does not split a URN's internal dots as segment separators.

use std::collections::HashMap;

/// A trie node, addressed by index into [`Urn::nodes`] rather than by
/// pointer. This keeps the structure `Send + Sync` with no lifetimes,
/// permitting concurrent readers without synchronisation once
/// initialisation has completed.
#[derive(Debug, Default)]
struct TrieNode {
    children: HashMap<u8, usize>,
    is_word: bool,
}

/// The index of the trie's root node, returned by [`Urn::root`].
pub type NodeId = usize;

/// Registry of schema/extension URNs, consulted by the path scanner so that
/// e.g. `urn:ietf:params:scim:schemas:core:2.0:User` is treated as one
/// atomic segment rather than being split on its internal `:`-separated
/// (not `.`-separated) components. URNs never contain literal dots in
/// practice, but the registry is dot-agnostic and matches whatever string
/// was registered, case-insensitively.
#[derive(Debug, Default)]
pub struct Urn {
    nodes: Vec<TrieNode>,
}

impl Urn {
    pub fn new() -> Self {
        Urn {
            nodes: vec![TrieNode::default()],
        }
    }

    /// The root node, the starting point for every lookup.
    pub fn root(&self) -> NodeId {
        0
    }

    /// Idempotently inserts `urn`, lower-cased.
    pub fn register(&mut self, urn: &str) {
        let mut cur = self.root();
        for b in urn.bytes() {
            let b = b.to_ascii_lowercase();
            cur = match self.nodes[cur].children.get(&b) {
                Some(&next) => next,
                None => {
                    self.nodes.push(TrieNode::default());
                    let next = self.nodes.len() - 1;
                    self.nodes[cur].children.insert(b, next);
                    next
                }
            };
        }
        self.nodes[cur].is_word = true;
    }

    /// Registers every URN yielded by `urns`.
    pub fn register_many<I, S>(&mut self, urns: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for urn in urns {
            self.register(urn.as_ref());
        }
    }

    /// Advances from `node` on byte `c` (case-insensitively), returning the
    /// child node if one exists.
    pub fn next(&self, node: NodeId, c: u8) -> Option<NodeId> {
        self.nodes[node].children.get(&c.to_ascii_lowercase()).copied()
    }

    /// Whether `node` terminates a registered URN.
    pub fn is_word(&self, node: NodeId) -> bool {
        self.nodes[node].is_word
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_walk() {
        let mut urn = Urn::new();
        urn.register("urn:ietf:params:scim:schemas:core:2.0:User");
        let mut node = urn.root();
        for b in "urn:ietf:params:scim:schemas:core:2.0:User".bytes() {
            node = urn.next(node, b).expect("byte should advance trie");
        }
        assert!(urn.is_word(node));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut urn = Urn::new();
        urn.register("URN:IETF:PARAMS:SCIM:SCHEMAS:CORE:2.0:User");
        let mut node = urn.root();
        for b in "urn:ietf:params:scim:schemas:core:2.0:user".bytes() {
            node = urn.next(node, b).expect("case-insensitive walk");
        }
        assert!(urn.is_word(node));
    }

    #[test]
    fn register_is_idempotent() {
        let mut urn = Urn::new();
        urn.register("urn:a");
        let before = urn.nodes.len();
        urn.register("urn:a");
        assert_eq!(before, urn.nodes.len());
    }

    #[test]
    fn unregistered_prefix_has_no_children() {
        let urn = Urn::new();
        assert_eq!(urn.next(urn.root(), b'u'), None);
    }
}
