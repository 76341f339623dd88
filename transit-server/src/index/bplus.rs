//! B+ tree with linked leaves.
//!
//! Nodes live in an arena and refer to each other by index, which keeps the
//! leaf chain and parent links free of shared ownership. Records are stored
//! only in leaves; internal nodes hold separator keys, where every key in
//! the subtree right of a separator is greater than or equal to it.

use std::borrow::Borrow;

/// Default maximum number of keys per node.
pub const DEFAULT_ORDER: usize = 50;

/// Smallest order that still splits into non-empty halves.
const MIN_ORDER: usize = 3;

type NodeId = usize;

#[derive(Debug)]
enum Node<K, V> {
    Internal {
        keys: Vec<K>,
        children: Vec<NodeId>,
    },
    Leaf {
        keys: Vec<K>,
        values: Vec<V>,
        next: Option<NodeId>,
    },
}

/// Shape statistics, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeStats {
    pub keys: usize,
    pub leaves: usize,
    pub height: usize,
    pub order: usize,
}

/// An ordered map with B+ tree layout.
///
/// Inserting an existing key overwrites its value in place.
#[derive(Debug)]
pub struct BPlusTree<K, V> {
    order: usize,
    nodes: Vec<Node<K, V>>,
    root: NodeId,
    first_leaf: NodeId,
    len: usize,
    height: usize,
}

impl<K: Ord + Clone, V> Default for BPlusTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone, V> BPlusTree<K, V> {
    /// Create an empty tree with [`DEFAULT_ORDER`].
    pub fn new() -> Self {
        Self::with_order(DEFAULT_ORDER)
    }

    /// Create an empty tree holding at most `order` keys per node.
    ///
    /// Orders below 3 are raised to 3.
    pub fn with_order(order: usize) -> Self {
        Self {
            order: order.max(MIN_ORDER),
            nodes: vec![Node::Leaf {
                keys: Vec::new(),
                values: Vec::new(),
                next: None,
            }],
            root: 0,
            first_leaf: 0,
            len: 0,
            height: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels, counting the leaf level.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Insert a record. Returns `true` if the key was new, `false` if an
    /// existing record was overwritten.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let mut path = Vec::with_capacity(self.height);
        let leaf = self.descend(&key, &mut path);

        let overflow = match &mut self.nodes[leaf] {
            Node::Leaf { keys, values, .. } => match keys.binary_search(&key) {
                Ok(pos) => {
                    values[pos] = value;
                    return false;
                }
                Err(pos) => {
                    keys.insert(pos, key);
                    values.insert(pos, value);
                    keys.len() > self.order
                }
            },
            Node::Internal { .. } => unreachable!("descent always ends at a leaf"),
        };
        self.len += 1;

        if overflow {
            let (separator, right) = self.split_leaf(leaf);
            self.insert_in_parent(path, leaf, separator, right);
        }
        true
    }

    /// Exact lookup.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let leaf = self.leaf_for(key);
        match &self.nodes[leaf] {
            Node::Leaf { keys, values, .. } => keys
                .binary_search_by(|k| k.borrow().cmp(key))
                .ok()
                .map(|pos| &values[pos]),
            Node::Internal { .. } => None,
        }
    }

    /// Records in key order, following the leaf chain.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            tree: self,
            leaf: Some(self.first_leaf),
            pos: 0,
        }
    }

    /// Records with key `>= start`, in key order.
    pub fn range_from<Q>(&self, start: &Q) -> Iter<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let leaf = self.leaf_for(start);
        let pos = match &self.nodes[leaf] {
            Node::Leaf { keys, .. } => keys.partition_point(|k| k.borrow() < start),
            Node::Internal { .. } => 0,
        };
        Iter {
            tree: self,
            leaf: Some(leaf),
            pos,
        }
    }

    pub fn stats(&self) -> TreeStats {
        let mut leaves = 0;
        let mut current = Some(self.first_leaf);
        while let Some(id) = current {
            leaves += 1;
            current = match &self.nodes[id] {
                Node::Leaf { next, .. } => *next,
                Node::Internal { .. } => None,
            };
        }
        TreeStats {
            keys: self.len,
            leaves,
            height: self.height,
            order: self.order,
        }
    }

    /// Walk from the root to the leaf that would hold `key`, recording the
    /// internal nodes passed through.
    fn descend(&self, key: &K, path: &mut Vec<NodeId>) -> NodeId {
        let mut current = self.root;
        loop {
            match &self.nodes[current] {
                Node::Internal { keys, children } => {
                    path.push(current);
                    current = children[keys.partition_point(|k| k <= key)];
                }
                Node::Leaf { .. } => return current,
            }
        }
    }

    fn leaf_for<Q>(&self, key: &Q) -> NodeId
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        loop {
            match &self.nodes[current] {
                Node::Internal { keys, children } => {
                    current = children[keys.partition_point(|k| k.borrow() <= key)];
                }
                Node::Leaf { .. } => return current,
            }
        }
    }

    /// Move the upper half of an overflowing leaf into a new right sibling.
    /// Returns the separator to promote and the sibling's id.
    fn split_leaf(&mut self, leaf: NodeId) -> (K, NodeId) {
        let right_id = self.nodes.len();
        let mid = self.order.div_ceil(2);

        let (right_keys, right_values, old_next) = match &mut self.nodes[leaf] {
            Node::Leaf { keys, values, next } => {
                let old_next = next.replace(right_id);
                (keys.split_off(mid), values.split_off(mid), old_next)
            }
            Node::Internal { .. } => unreachable!("split_leaf called on internal node"),
        };

        let separator = right_keys[0].clone();
        self.nodes.push(Node::Leaf {
            keys: right_keys,
            values: right_values,
            next: old_next,
        });
        (separator, right_id)
    }

    /// Link `right` next to `left` in their parent, splitting parents upward
    /// as they overflow. A root split grows the tree by one level.
    fn insert_in_parent(
        &mut self,
        mut path: Vec<NodeId>,
        mut left: NodeId,
        mut separator: K,
        mut right: NodeId,
    ) {
        loop {
            let Some(parent) = path.pop() else {
                let new_root = self.nodes.len();
                self.nodes.push(Node::Internal {
                    keys: vec![separator],
                    children: vec![left, right],
                });
                self.root = new_root;
                self.height += 1;
                return;
            };

            let sibling_id = self.nodes.len();
            let split = match &mut self.nodes[parent] {
                Node::Internal { keys, children } => {
                    let pos = keys.partition_point(|k| k < &separator);
                    keys.insert(pos, separator);
                    children.insert(pos + 1, right);

                    if keys.len() <= self.order {
                        return;
                    }

                    let mid = self.order / 2;
                    let mut right_keys = keys.split_off(mid);
                    let right_children = children.split_off(mid + 1);
                    let promoted = right_keys.remove(0);
                    (promoted, right_keys, right_children)
                }
                Node::Leaf { .. } => unreachable!("parent path only holds internal nodes"),
            };

            let (promoted, keys, children) = split;
            self.nodes.push(Node::Internal { keys, children });

            left = parent;
            separator = promoted;
            right = sibling_id;
        }
    }
}

impl<V> BPlusTree<String, V> {
    /// Values whose key starts with `prefix`, in key order, at most `limit`.
    ///
    /// Matching keys are contiguous, so the scan starts at the first key
    /// `>= prefix` and stops at the first key that no longer matches.
    pub fn search_prefix(&self, prefix: &str, limit: usize) -> Vec<&V> {
        self.range_from(prefix)
            .take_while(|(k, _)| k.starts_with(prefix))
            .take(limit)
            .map(|(_, v)| v)
            .collect()
    }

    /// Values whose key contains `needle`, in key order, at most `limit`.
    ///
    /// Linear scan of the whole leaf chain.
    pub fn search_contains(&self, needle: &str, limit: usize) -> Vec<&V> {
        self.iter()
            .filter(|(k, _)| k.contains(needle))
            .take(limit)
            .map(|(_, v)| v)
            .collect()
    }
}

/// Iterator over records along the leaf chain.
pub struct Iter<'a, K, V> {
    tree: &'a BPlusTree<K, V>,
    leaf: Option<NodeId>,
    pos: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let id = self.leaf?;
            match &self.tree.nodes[id] {
                Node::Leaf { keys, values, next } => {
                    if self.pos < keys.len() {
                        let item = (&keys[self.pos], &values[self.pos]);
                        self.pos += 1;
                        return Some(item);
                    }
                    self.leaf = *next;
                    self.pos = 0;
                }
                Node::Internal { .. } => return None,
            }
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    proptest! {
        /// The tree agrees with a BTreeMap on contents and order
        #[test]
        fn matches_btreemap(
            entries in prop::collection::vec(("[a-e]{1,4}", 0u32..100), 0..200),
            order in 3usize..8,
        ) {
            let mut tree = BPlusTree::with_order(order);
            let mut model = BTreeMap::new();
            for (k, v) in &entries {
                let was_new = tree.insert(k.clone(), *v);
                prop_assert_eq!(was_new, model.insert(k.clone(), *v).is_none());
            }

            prop_assert_eq!(tree.len(), model.len());
            let ours: Vec<_> = tree.iter().map(|(k, v)| (k.clone(), *v)).collect();
            let theirs: Vec<_> = model.iter().map(|(k, v)| (k.clone(), *v)).collect();
            prop_assert_eq!(ours, theirs);

            for (k, v) in &model {
                prop_assert_eq!(tree.get(k.as_str()), Some(v));
            }
        }

        /// Prefix search returns exactly the matching keys, in order
        #[test]
        fn prefix_matches_filter(
            keys in prop::collection::btree_set("[a-c]{1,4}", 0..100),
            prefix in "[a-c]{1,2}",
        ) {
            let mut tree = BPlusTree::with_order(3);
            for k in &keys {
                tree.insert(k.clone(), k.clone());
            }
            let expected: Vec<&String> = keys.iter().filter(|k| k.starts_with(&prefix)).collect();
            prop_assert_eq!(tree.search_prefix(&prefix, usize::MAX), expected);
        }
    }
}
