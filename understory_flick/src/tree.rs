// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture trees: what each direction means on a key.
//!
//! A [`DirectionMap`] maps directions to [`GestureNode`]s. A node is either a
//! [`Leaf`] carrying an output value or a [`Branch`] holding a nested map that
//! the gesture descends into. A [`FlickKey`] bundles the root map for the
//! normal [`KeyMode`] with optional alternate roots for other modes.

use alloc::string::String;
use alloc::vec::Vec;

use crate::direction::{Direction, DirectionSet};

/// Identifies one of a key's alternate root maps.
///
/// What each mode means is up to the caller; a kana keyboard might use one for
/// voiced and one for semi-voiced variants.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyMode(pub u8);

impl KeyMode {
    /// The mode every gesture starts in.
    pub const NORMAL: Self = Self(0);

    /// Returns `true` for [`KeyMode::NORMAL`].
    #[must_use]
    pub const fn is_normal(self) -> bool {
        self.0 == 0
    }
}

/// A terminal node: committing it produces `output`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Leaf<O> {
    /// The committed value.
    pub output: O,
    /// Mode the key switches to when this leaf becomes highlighted.
    pub switch_mode: Option<KeyMode>,
}

impl<O> Leaf<O> {
    /// Creates a leaf without a mode switch.
    pub const fn new(output: O) -> Self {
        Self {
            output,
            switch_mode: None,
        }
    }

    /// Sets the mode this leaf switches to when highlighted.
    #[must_use]
    pub fn with_switch_mode(mut self, mode: KeyMode) -> Self {
        self.switch_mode = Some(mode);
        self
    }
}

/// A nested level of choices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Branch<O> {
    /// Choices available once the branch is entered. A `Tap` entry is the
    /// branch's own default.
    pub children: DirectionMap<O>,
    /// Display label. Falls back to the `Tap` child when absent.
    pub label: Option<String>,
    /// Back out of the branch when the pointer returns to the parent's center.
    pub cancel_on_tap: bool,
}

impl<O> Branch<O> {
    /// Creates an unlabeled branch.
    pub const fn new(children: DirectionMap<O>) -> Self {
        Self {
            children,
            label: None,
            cancel_on_tap: false,
        }
    }

    /// Sets the display label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Marks the branch to be backed out of when the pointer returns into the
    /// parent frame's dead zone.
    #[must_use]
    pub fn with_cancel_on_tap(mut self) -> Self {
        self.cancel_on_tap = true;
        self
    }

    /// The `Tap` leaf, committed when the gesture ends without a further choice.
    #[must_use]
    pub fn tap_leaf(&self) -> Option<&Leaf<O>> {
        match self.children.get(Direction::Tap)? {
            GestureNode::Leaf(leaf) => Some(leaf),
            GestureNode::Branch(_) => None,
        }
    }
}

/// One entry of a gesture tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GestureNode<O> {
    /// Commits a value.
    Leaf(Leaf<O>),
    /// Descends into a nested level.
    Branch(Branch<O>),
}

impl<O> GestureNode<O> {
    /// Shorthand for a plain [`Leaf`].
    pub const fn leaf(output: O) -> Self {
        Self::Leaf(Leaf::new(output))
    }

    /// Shorthand for an unlabeled [`Branch`].
    pub const fn branch(children: DirectionMap<O>) -> Self {
        Self::Branch(Branch::new(children))
    }

    /// Returns the branch, if this node is one.
    #[must_use]
    pub fn as_branch(&self) -> Option<&Branch<O>> {
        match self {
            Self::Branch(branch) => Some(branch),
            Self::Leaf(_) => None,
        }
    }

    /// Returns the leaf, if this node is one.
    #[must_use]
    pub fn as_leaf(&self) -> Option<&Leaf<O>> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Branch(_) => None,
        }
    }
}

impl<O> From<Leaf<O>> for GestureNode<O> {
    fn from(leaf: Leaf<O>) -> Self {
        Self::Leaf(leaf)
    }
}

impl<O> From<Branch<O>> for GestureNode<O> {
    fn from(branch: Branch<O>) -> Self {
        Self::Branch(branch)
    }
}

/// A mapping from directions to gesture nodes.
///
/// Entries are kept sorted in [`Direction::ALL`] order, so iteration is
/// deterministic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectionMap<O> {
    entries: Vec<(Direction, GestureNode<O>)>,
}

impl<O> Default for DirectionMap<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> DirectionMap<O> {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Builder form of [`DirectionMap::insert`].
    #[must_use]
    pub fn with(mut self, direction: Direction, node: impl Into<GestureNode<O>>) -> Self {
        self.insert(direction, node);
        self
    }

    /// Adds a plain leaf for `direction`.
    #[must_use]
    pub fn with_leaf(self, direction: Direction, output: O) -> Self {
        self.with(direction, Leaf::new(output))
    }

    /// Inserts `node` for `direction`, returning the node it replaced.
    pub fn insert(
        &mut self,
        direction: Direction,
        node: impl Into<GestureNode<O>>,
    ) -> Option<GestureNode<O>> {
        let node = node.into();
        match self.entries.binary_search_by_key(&direction, |(d, _)| *d) {
            Ok(i) => Some(core::mem::replace(&mut self.entries[i].1, node)),
            Err(i) => {
                self.entries.insert(i, (direction, node));
                None
            }
        }
    }

    /// Removes the entry for `direction`.
    pub fn remove(&mut self, direction: Direction) -> Option<GestureNode<O>> {
        let i = self
            .entries
            .binary_search_by_key(&direction, |(d, _)| *d)
            .ok()?;
        Some(self.entries.remove(i).1)
    }

    /// Returns the node for `direction`.
    #[must_use]
    pub fn get(&self, direction: Direction) -> Option<&GestureNode<O>> {
        self.entries
            .binary_search_by_key(&direction, |(d, _)| *d)
            .ok()
            .map(|i| &self.entries[i].1)
    }

    /// The set of directions with an entry, `Tap` included.
    #[must_use]
    pub fn directions(&self) -> DirectionSet {
        self.entries.iter().map(|(d, _)| *d).collect()
    }

    /// Iterates entries in [`Direction::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, &GestureNode<O>)> {
        self.entries.iter().map(|(d, n)| (*d, n))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<O, N: Into<GestureNode<O>>> FromIterator<(Direction, N)> for DirectionMap<O> {
    fn from_iter<I: IntoIterator<Item = (Direction, N)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (direction, node) in iter {
            map.insert(direction, node);
        }
        map
    }
}

/// The gesture trees bound to one key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlickKey<O> {
    normal: DirectionMap<O>,
    modes: Vec<(KeyMode, DirectionMap<O>)>,
    label: Option<String>,
}

impl<O> FlickKey<O> {
    /// Creates a key from its normal root map.
    #[must_use]
    pub const fn new(normal: DirectionMap<O>) -> Self {
        Self {
            normal,
            modes: Vec::new(),
            label: None,
        }
    }

    /// Adds or replaces the root map used in `mode`.
    ///
    /// Registering [`KeyMode::NORMAL`] replaces the normal map.
    #[must_use]
    pub fn with_mode(mut self, mode: KeyMode, map: DirectionMap<O>) -> Self {
        if mode.is_normal() {
            self.normal = map;
        } else if let Some(slot) = self.modes.iter_mut().find(|(m, _)| *m == mode) {
            slot.1 = map;
        } else {
            self.modes.push((mode, map));
        }
        self
    }

    /// Sets the key's display label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The key's display label.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The root map for `mode`, falling back to the normal map for modes the
    /// key does not define.
    #[must_use]
    pub fn root(&self, mode: KeyMode) -> &DirectionMap<O> {
        if mode.is_normal() {
            return &self.normal;
        }
        self.modes
            .iter()
            .find(|(m, _)| *m == mode)
            .map_or(&self.normal, |(_, map)| map)
    }

    /// Returns `true` if the key defines a dedicated map for `mode`.
    #[must_use]
    pub fn has_mode(&self, mode: KeyMode) -> bool {
        mode.is_normal() || self.modes.iter().any(|(m, _)| *m == mode)
    }

    /// Returns `true` if the normal map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.normal.is_empty()
    }
}

impl<O> From<DirectionMap<O>> for FlickKey<O> {
    fn from(map: DirectionMap<O>) -> Self {
        Self::new(map)
    }
}
