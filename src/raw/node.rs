use super::handle::Handle;

/// Node color. A freshly linked node is RED so that insertion can only
/// violate the no-red-red rule, never the black-height rule.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Color {
    Red,
    Black,
}

/// The intrusive structural unit of the tree: a color bit, the three
/// structural links, the key, and a handle into the value arena.
///
/// `parent` is a non-owning back reference used only for traversal and
/// fixup; ownership flows from the root through `left` and `right`. Links
/// and color are mutated exclusively by the balancing engine.
#[derive(Clone)]
pub(crate) struct Node<K> {
    pub(crate) color: Color,
    pub(crate) parent: Option<Handle>,
    pub(crate) left: Option<Handle>,
    pub(crate) right: Option<Handle>,
    pub(crate) key: K,
    pub(crate) value: Handle,
}

impl<K> Node<K> {
    /// Creates an isolated RED leaf ready to be linked below `parent`.
    pub(crate) const fn new(key: K, value: Handle, parent: Option<Handle>) -> Self {
        Self {
            color: Color::Red,
            parent,
            left: None,
            right: None,
            key,
            value,
        }
    }

    pub(crate) const fn is_red(&self) -> bool {
        matches!(self.color, Color::Red)
    }
}
