//! Arena-backed red-black tree.
//!
//! Nodes live in a `Vec` and refer to each other by index. Slot 0 is the
//! shared black leaf sentinel, so every "missing child" is a real slot with a
//! colour and no special cases are needed in the rebalancing code. Only
//! insertion is supported; the index is built once per listing.

use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

use super::{Keyed, SortCriterion, SortKey};

/// Sentinel slot shared by every leaf.
const NIL: usize = 0;

/// Node colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => f.write_str("R"),
            Color::Black => f.write_str("B"),
        }
    }
}

/// A broken red-black or ordering invariant.
///
/// Insertion always maintains the invariants; these only surface through
/// [`RedBlackIndex::verify`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeViolation {
    #[error("root is red")]
    RedRoot,

    #[error("red node {0:?} has a red child")]
    RedRed(String),

    #[error("black height differs under {label:?}: {left} on the left, {right} on the right")]
    BlackHeight {
        label: String,
        left: usize,
        right: usize,
    },

    #[error("node {0:?} is out of order")]
    OutOfOrder(String),

    #[error("node {0:?} does not point back to its parent")]
    BrokenParent(String),
}

#[derive(Debug, Clone)]
struct Slot<T> {
    value: Option<T>,
    key: SortKey,
    color: Color,
    left: usize,
    right: usize,
    parent: usize,
}

impl<T> Slot<T> {
    fn sentinel() -> Self {
        Self {
            value: None,
            key: SortKey::Number(0.0),
            color: Color::Black,
            left: NIL,
            right: NIL,
            parent: NIL,
        }
    }
}

/// A red-black tree of values ordered by a [`SortCriterion`].
///
/// Values with equal keys are kept in insertion order.
///
/// ```
/// use tour_planner::domain::{Destination, DestinationId, GeoPoint};
/// use tour_planner::index::{RedBlackIndex, SortCriterion};
///
/// let mut index = RedBlackIndex::new(SortCriterion::Name);
/// for (id, name) in [(1, "Parque Kennedy"), (2, "Larcomar"), (3, "Museo Larco")] {
///     index.insert(Destination::new(DestinationId(id), name, GeoPoint::new(0.0, 0.0)));
/// }
///
/// let names: Vec<&str> = index.in_order().iter().map(|d| d.name.as_str()).collect();
/// assert_eq!(names, ["Larcomar", "Museo Larco", "Parque Kennedy"]);
/// assert!(index.verify().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct RedBlackIndex<T> {
    criterion: SortCriterion,
    nodes: Vec<Slot<T>>,
    root: usize,
}

impl<T: Keyed> RedBlackIndex<T> {
    /// Create an empty index.
    pub fn new(criterion: SortCriterion) -> Self {
        Self {
            criterion,
            nodes: vec![Slot::sentinel()],
            root: NIL,
        }
    }

    /// The ordering this index uses.
    pub fn criterion(&self) -> SortCriterion {
        self.criterion
    }

    /// Number of values stored.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Returns true if nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.root == NIL
    }

    /// Insert a value. Equal keys go to the right of existing ones.
    pub fn insert(&mut self, value: T) {
        let key = value.sort_key(self.criterion);

        let mut parent = NIL;
        let mut current = self.root;
        while current != NIL {
            parent = current;
            current = if key < self.nodes[current].key {
                self.nodes[current].left
            } else {
                self.nodes[current].right
            };
        }

        let node = self.nodes.len();
        let goes_left = parent != NIL && key < self.nodes[parent].key;
        self.nodes.push(Slot {
            value: Some(value),
            key,
            color: Color::Red,
            left: NIL,
            right: NIL,
            parent,
        });

        if parent == NIL {
            self.root = node;
        } else if goes_left {
            self.nodes[parent].left = node;
        } else {
            self.nodes[parent].right = node;
        }

        self.fix_insert(node);
    }

    fn fix_insert(&mut self, mut node: usize) {
        while self.nodes[self.nodes[node].parent].color == Color::Red {
            let parent = self.nodes[node].parent;
            // A red parent is never the root, so the grandparent is real.
            let grandparent = self.nodes[parent].parent;

            if parent == self.nodes[grandparent].left {
                let uncle = self.nodes[grandparent].right;
                if self.nodes[uncle].color == Color::Red {
                    self.nodes[parent].color = Color::Black;
                    self.nodes[uncle].color = Color::Black;
                    self.nodes[grandparent].color = Color::Red;
                    node = grandparent;
                } else {
                    if node == self.nodes[parent].right {
                        node = parent;
                        self.rotate_left(node);
                    }
                    let parent = self.nodes[node].parent;
                    let grandparent = self.nodes[parent].parent;
                    self.nodes[parent].color = Color::Black;
                    self.nodes[grandparent].color = Color::Red;
                    self.rotate_right(grandparent);
                }
            } else {
                let uncle = self.nodes[grandparent].left;
                if self.nodes[uncle].color == Color::Red {
                    self.nodes[parent].color = Color::Black;
                    self.nodes[uncle].color = Color::Black;
                    self.nodes[grandparent].color = Color::Red;
                    node = grandparent;
                } else {
                    if node == self.nodes[parent].left {
                        node = parent;
                        self.rotate_right(node);
                    }
                    let parent = self.nodes[node].parent;
                    let grandparent = self.nodes[parent].parent;
                    self.nodes[parent].color = Color::Black;
                    self.nodes[grandparent].color = Color::Red;
                    self.rotate_left(grandparent);
                }
            }
        }
        let root = self.root;
        self.nodes[root].color = Color::Black;
    }

    /// Replace `old` with `new` in `old`'s parent (or as root).
    fn relink_parent(&mut self, old: usize, new: usize) {
        let parent = self.nodes[old].parent;
        self.nodes[new].parent = parent;
        if parent == NIL {
            self.root = new;
        } else if self.nodes[parent].left == old {
            self.nodes[parent].left = new;
        } else {
            self.nodes[parent].right = new;
        }
    }

    fn rotate_left(&mut self, node: usize) {
        let pivot = self.nodes[node].right;
        let inner = self.nodes[pivot].left;

        self.nodes[node].right = inner;
        if inner != NIL {
            self.nodes[inner].parent = node;
        }
        self.relink_parent(node, pivot);
        self.nodes[pivot].left = node;
        self.nodes[node].parent = pivot;
    }

    fn rotate_right(&mut self, node: usize) {
        let pivot = self.nodes[node].left;
        let inner = self.nodes[pivot].right;

        self.nodes[node].left = inner;
        if inner != NIL {
            self.nodes[inner].parent = node;
        }
        self.relink_parent(node, pivot);
        self.nodes[pivot].right = node;
        self.nodes[node].parent = pivot;
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        self.height_from(self.root)
    }

    fn height_from(&self, node: usize) -> usize {
        if node == NIL {
            return 0;
        }
        let slot = &self.nodes[node];
        1 + self.height_from(slot.left).max(self.height_from(slot.right))
    }

    /// Values in ascending key order.
    pub fn in_order(&self) -> Vec<&T> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack = Vec::new();
        let mut current = self.root;
        while current != NIL || !stack.is_empty() {
            while current != NIL {
                stack.push(current);
                current = self.nodes[current].left;
            }
            let Some(node) = stack.pop() else { break };
            out.extend(self.nodes[node].value.as_ref());
            current = self.nodes[node].right;
        }
        out
    }

    /// Values in descending key order. Equal keys come out newest first.
    pub fn in_order_rev(&self) -> Vec<&T> {
        let mut out = self.in_order();
        out.reverse();
        out
    }

    /// Values in pre-order with their colour and depth (root at depth 0).
    pub fn pre_order(&self) -> Vec<(&T, Color, usize)> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack = vec![(self.root, 0)];
        while let Some((node, depth)) = stack.pop() {
            if node == NIL {
                continue;
            }
            let slot = &self.nodes[node];
            if let Some(value) = &slot.value {
                out.push((value, slot.color, depth));
            }
            stack.push((slot.right, depth + 1));
            stack.push((slot.left, depth + 1));
        }
        out
    }

    /// The first value found with exactly this key.
    ///
    /// Text keys compare case-insensitively; build them with
    /// [`SortKey::text`].
    pub fn find(&self, key: &SortKey) -> Option<&T> {
        let mut current = self.root;
        while current != NIL {
            let slot = &self.nodes[current];
            current = match key.cmp(&slot.key) {
                Ordering::Equal => return slot.value.as_ref(),
                Ordering::Less => slot.left,
                Ordering::Greater => slot.right,
            };
        }
        None
    }

    /// Check every structural invariant.
    ///
    /// Returns the first violation found. A tree built only through
    /// [`insert`](Self::insert) always passes.
    pub fn verify(&self) -> Result<(), TreeViolation> {
        if self.root == NIL {
            return Ok(());
        }
        if self.nodes[self.root].color != Color::Black {
            return Err(TreeViolation::RedRoot);
        }
        self.black_height(self.root)?;

        let keys: Vec<usize> = self.in_order_slots();
        for pair in keys.windows(2) {
            if self.nodes[pair[1]].key < self.nodes[pair[0]].key {
                return Err(TreeViolation::OutOfOrder(self.label(pair[1])));
            }
        }
        Ok(())
    }

    fn in_order_slots(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack = Vec::new();
        let mut current = self.root;
        while current != NIL || !stack.is_empty() {
            while current != NIL {
                stack.push(current);
                current = self.nodes[current].left;
            }
            let Some(node) = stack.pop() else { break };
            out.push(node);
            current = self.nodes[node].right;
        }
        out
    }

    /// Black nodes on every path below `node`, counting the sentinel.
    fn black_height(&self, node: usize) -> Result<usize, TreeViolation> {
        if node == NIL {
            return Ok(1);
        }
        let slot = &self.nodes[node];
        for child in [slot.left, slot.right] {
            if child == NIL {
                continue;
            }
            if self.nodes[child].parent != node {
                return Err(TreeViolation::BrokenParent(self.label(child)));
            }
            if slot.color == Color::Red && self.nodes[child].color == Color::Red {
                return Err(TreeViolation::RedRed(self.label(node)));
            }
        }

        let left = self.black_height(slot.left)?;
        let right = self.black_height(slot.right)?;
        if left != right {
            return Err(TreeViolation::BlackHeight {
                label: self.label(node),
                left,
                right,
            });
        }
        Ok(left + usize::from(slot.color == Color::Black))
    }

    fn label(&self, node: usize) -> String {
        self.nodes[node]
            .value
            .as_ref()
            .map(|v| v.label().to_string())
            .unwrap_or_default()
    }

    /// Draw the tree, one node per line, with `[R]`/`[B]` colour markers.
    pub fn render(&self) -> String {
        if self.root == NIL {
            return "(empty)".to_string();
        }
        let mut lines = Vec::with_capacity(self.len());
        self.render_from(self.root, "", true, &mut lines);
        lines.join("\n")
    }

    fn render_from(&self, node: usize, prefix: &str, last: bool, lines: &mut Vec<String>) {
        let slot = &self.nodes[node];
        let branch = if last { "└── " } else { "├── " };
        lines.push(format!("{prefix}{branch}[{}] {}", slot.color, self.label(node)));

        let prefix = format!("{prefix}{}", if last { "    " } else { "│   " });
        match (slot.left, slot.right) {
            (NIL, NIL) => {}
            (left, NIL) => self.render_from(left, &prefix, true, lines),
            (NIL, right) => self.render_from(right, &prefix, true, lines),
            (left, right) => {
                self.render_from(left, &prefix, false, lines);
                self.render_from(right, &prefix, true, lines);
            }
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    struct Scored(u32, f64);

    impl Keyed for Scored {
        fn sort_key(&self, _: SortCriterion) -> SortKey {
            SortKey::Number(self.1)
        }

        fn label(&self) -> &str {
            "scored"
        }
    }

    proptest! {
        /// Any insertion order yields a valid, sorted, logarithmic-height tree.
        #[test]
        fn invariants_hold(values in prop::collection::vec(0u8..50, 0..200)) {
            let mut index = RedBlackIndex::new(SortCriterion::Rating);
            for (seq, v) in values.iter().enumerate() {
                index.insert(Scored(seq as u32, f64::from(*v)));
            }

            prop_assert_eq!(index.verify(), Ok(()));
            prop_assert_eq!(index.len(), values.len());

            let n = values.len();
            let bound = 2 * (usize::BITS - (n + 1).leading_zeros()) as usize;
            prop_assert!(index.height() <= bound);

            let sorted = index.in_order();
            for pair in sorted.windows(2) {
                prop_assert!(pair[0].1 <= pair[1].1);
                // Stable among duplicates.
                if pair[0].1 == pair[1].1 {
                    prop_assert!(pair[0].0 < pair[1].0);
                }
            }
        }
    }
}
