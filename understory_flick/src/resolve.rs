// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Side-effect free lookups over gesture trees.
//!
//! These helpers are what the session uses to decide what a direction means,
//! and what presentation code uses to label candidates.

use alloc::string::String;
use alloc::vec::Vec;

use crate::direction::{Direction, DirectionSet};
use crate::tree::{DirectionMap, GestureNode, Leaf};

/// Looks up the node for `direction` in `map`.
#[must_use]
pub fn resolve<O>(map: &DirectionMap<O>, direction: Direction) -> Option<&GestureNode<O>> {
    map.get(direction)
}

/// Walks `path` from `map` through nested branches and returns the map reached.
///
/// Returns `None` if a step is missing or lands on a leaf.
#[must_use]
pub fn resolve_path<'a, O>(
    map: &'a DirectionMap<O>,
    path: &[Direction],
) -> Option<&'a DirectionMap<O>> {
    path.iter().try_fold(map, |map, direction| {
        map.get(*direction)?.as_branch().map(|b| &b.children)
    })
}

/// The leaf committed when a gesture ends on `node`.
///
/// A leaf commits itself; a branch commits its `Tap` leaf, if any.
#[must_use]
pub fn commit_target<O>(node: &GestureNode<O>) -> Option<&Leaf<O>> {
    match node {
        GestureNode::Leaf(leaf) => Some(leaf),
        GestureNode::Branch(branch) => branch.tap_leaf(),
    }
}

/// What to display for a node.
#[derive(Debug, PartialEq, Eq)]
pub enum Label<'a, O> {
    /// An explicit branch label.
    Text(&'a str),
    /// A leaf's output, or a branch's `Tap` output.
    Output(&'a O),
    /// Nothing suitable; presentation draws a placeholder.
    Placeholder,
}

impl<O> Clone for Label<'_, O> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<O> Copy for Label<'_, O> {}

impl<O: Clone> Label<'_, O> {
    /// Detaches the label from the tree it borrows.
    #[must_use]
    pub fn to_owned_label(&self) -> OwnedLabel<O> {
        match self {
            Self::Text(text) => OwnedLabel::Text(String::from(*text)),
            Self::Output(output) => OwnedLabel::Output((*output).clone()),
            Self::Placeholder => OwnedLabel::Placeholder,
        }
    }
}

/// An owned [`Label`], as stored in recorded events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OwnedLabel<O> {
    /// An explicit branch label.
    Text(String),
    /// A leaf's output, or a branch's `Tap` output.
    Output(O),
    /// Nothing suitable.
    Placeholder,
}

/// The display label of `node`: explicit branch label, then its `Tap` output,
/// then a placeholder.
#[must_use]
pub fn default_label<O>(node: &GestureNode<O>) -> Label<'_, O> {
    match node {
        GestureNode::Leaf(leaf) => Label::Output(&leaf.output),
        GestureNode::Branch(branch) => {
            if let Some(text) = branch.label.as_deref() {
                Label::Text(text)
            } else if let Some(leaf) = branch.tap_leaf() {
                Label::Output(&leaf.output)
            } else {
                Label::Placeholder
            }
        }
    }
}

/// One level of a gesture tree, as seen by presentation.
#[derive(Debug)]
pub struct Level<'a, O> {
    /// Hierarchy depth, `1` for the root frame.
    pub depth: usize,
    /// Choices available at this level.
    pub map: &'a DirectionMap<O>,
}

impl<O> Clone for Level<'_, O> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<O> Copy for Level<'_, O> {}

impl<'a, O> Level<'a, O> {
    /// Directions with an entry at this level.
    #[must_use]
    pub fn directions(&self) -> DirectionSet {
        self.map.directions()
    }

    /// Every candidate at this level with its display label, in
    /// [`Direction::ALL`] order.
    pub fn candidates(self) -> impl Iterator<Item = (Direction, Label<'a, O>)> + 'a {
        self.map.iter().map(|(d, node)| (d, default_label(node)))
    }

    /// Owned copy of [`Level::candidates`].
    #[must_use]
    pub fn owned_candidates(&self) -> Vec<(Direction, OwnedLabel<O>)>
    where
        O: Clone,
    {
        self.candidates()
            .map(|(d, label)| (d, label.to_owned_label()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Branch;

    fn scenario_c() -> DirectionMap<&'static str> {
        DirectionMap::new().with_leaf(Direction::Tap, "a").with(
            Direction::Right,
            GestureNode::branch(
                DirectionMap::new()
                    .with_leaf(Direction::Tap, "i")
                    .with_leaf(Direction::Down, "e"),
            ),
        )
    }

    #[test]
    fn resolve_path_descends_branches() {
        let root = scenario_c();
        let inner = resolve_path(&root, &[Direction::Right]).map(DirectionMap::directions);
        assert_eq!(inner, Some(DirectionSet::TAP | DirectionSet::DOWN));
        assert!(resolve_path(&root, &[Direction::Tap]).is_none());
        assert!(resolve_path(&root, &[Direction::Left]).is_none());
        assert_eq!(resolve_path(&root, &[]).map(DirectionMap::len), Some(2));
    }

    #[test]
    fn commit_target_uses_branch_tap() {
        let root = scenario_c();
        let right = resolve(&root, Direction::Right).and_then(commit_target);
        assert_eq!(right.map(|l| l.output), Some("i"));
        let tap = resolve(&root, Direction::Tap).and_then(commit_target);
        assert_eq!(tap.map(|l| l.output), Some("a"));
        assert!(resolve(&root, Direction::Up).is_none());
    }

    #[test]
    fn label_fallback_chain() {
        let labeled: GestureNode<&str> =
            Branch::new(DirectionMap::new().with_leaf(Direction::Tap, "x"))
                .with_label("X")
                .into();
        assert_eq!(default_label(&labeled), Label::Text("X"));

        let tap_only: GestureNode<&str> =
            GestureNode::branch(DirectionMap::new().with_leaf(Direction::Tap, "x"));
        assert_eq!(default_label(&tap_only), Label::Output(&"x"));

        let bare: GestureNode<&str> =
            GestureNode::branch(DirectionMap::new().with_leaf(Direction::Up, "y"));
        assert_eq!(default_label(&bare), Label::Placeholder);
    }

    #[test]
    fn level_candidates_are_ordered() {
        let root = scenario_c();
        let level = Level {
            depth: 1,
            map: &root,
        };
        let owned = level.owned_candidates();
        assert_eq!(
            owned,
            [
                (Direction::Tap, OwnedLabel::Output("a")),
                (Direction::Right, OwnedLabel::Output("i")),
            ]
        );
    }
}
