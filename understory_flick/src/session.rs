// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-pointer gesture state machine.
//!
//! A [`GestureSession`] lives from press to release (or cancel). It keeps a
//! stack of frames, one per hierarchy level reached. Each frame remembers the
//! point it is centered on, the direction that led into it and the direction
//! highlighted within it. Maps are never stored in frames; they are found by
//! walking the key's root map through the entry directions, which keeps the
//! stack valid across mode switches.
//!
//! ## Stickiness
//!
//! Moves are classified against the top frame's center. Returning into the
//! dead zone never clears a highlight, so releasing after wandering back to
//! the center commits the last direction chosen. The one exception is a
//! branch flagged with [`Branch::cancel_on_tap`](crate::Branch::cancel_on_tap),
//! which is backed out of when the pointer returns to its parent's center.

use alloc::sync::Arc;

use kurbo::Point;
use smallvec::SmallVec;

use crate::classifier::DirectionClassifier;
use crate::direction::Direction;
use crate::long_press::{LongPressScheduler, LongPressToken, SessionId};
use crate::observer::{DirectionPath, FlickCommit, FlickObserver, GestureEnd};
use crate::pointer::PointerId;
use crate::resolve::{Label, Level, commit_target, resolve, resolve_path};
use crate::tree::{DirectionMap, FlickKey, GestureNode, KeyMode};

/// Whether a direction has been chosen at the active level.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Nothing chosen at the top frame yet.
    Neutral,
    /// A direction is highlighted at the top frame.
    Determined,
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct GestureFrame {
    center: Point,
    entered_from: Direction,
    highlight: Direction,
}

/// One gesture in progress.
///
/// Sessions are created by [`FlickRecognizer`](crate::FlickRecognizer) on
/// press and consumed on release, cancel or interruption. They are exposed
/// read-only for presentation.
#[derive(Clone, Debug)]
pub struct GestureSession<O> {
    id: SessionId,
    pointer: PointerId,
    key: Arc<FlickKey<O>>,
    mode: KeyMode,
    initial_point: Point,
    last_point: Point,
    started_at: u64,
    frames: SmallVec<[GestureFrame; 4]>,
    long_press_armed: bool,
    reveal_mode: bool,
}

/// Walks `root` through the entry direction of every frame above the first.
fn frame_map<'a, O>(
    root: &'a DirectionMap<O>,
    frames: &[GestureFrame],
) -> Option<&'a DirectionMap<O>> {
    let entries: DirectionPath = frames.iter().skip(1).map(|f| f.entered_from).collect();
    resolve_path(root, &entries)
}

/// Label a key shows in `mode`: the mode's own `Tap` output, then the key
/// label, then a placeholder.
fn mode_label<O>(key: &FlickKey<O>, mode: KeyMode) -> Label<'_, O> {
    let tap = resolve(key.root(mode), Direction::Tap).and_then(GestureNode::as_leaf);
    match (tap, key.label()) {
        (Some(leaf), _) => Label::Output(&leaf.output),
        (None, Some(text)) => Label::Text(text),
        (None, None) => Label::Placeholder,
    }
}

impl<O> GestureSession<O> {
    /// Starts a session: pushes the root frame and arms the long-press timer.
    pub(crate) fn begin(
        id: SessionId,
        pointer: PointerId,
        key: Arc<FlickKey<O>>,
        point: Point,
        now: u64,
        timers: &mut LongPressScheduler,
        observer: &mut impl FlickObserver<O>,
    ) -> (Self, LongPressToken) {
        let mut frames = SmallVec::new();
        frames.push(GestureFrame {
            center: point,
            entered_from: Direction::Tap,
            highlight: Direction::Tap,
        });
        let token = timers.arm(id, now);
        tracing::debug!(
            target: "understory_flick::session",
            session = id.get(),
            pointer = pointer.0,
            x = point.x,
            y = point.y,
            deadline = token.deadline,
            "gesture started"
        );
        observer.on_gesture_started(
            pointer,
            Level {
                depth: 1,
                map: key.root(KeyMode::NORMAL),
            },
        );
        let session = Self {
            id,
            pointer,
            key,
            mode: KeyMode::NORMAL,
            initial_point: point,
            last_point: point,
            started_at: now,
            frames,
            long_press_armed: true,
            reveal_mode: false,
        };
        (session, token)
    }

    /// The session's id.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The pointer driving the session.
    #[must_use]
    pub fn pointer(&self) -> PointerId {
        self.pointer
    }

    /// The key binding the session started with.
    #[must_use]
    pub fn key(&self) -> &FlickKey<O> {
        &self.key
    }

    /// The key mode currently in effect.
    #[must_use]
    pub fn mode(&self) -> KeyMode {
        self.mode
    }

    /// Where the pointer went down.
    #[must_use]
    pub fn initial_point(&self) -> Point {
        self.initial_point
    }

    /// The last position seen.
    #[must_use]
    pub fn last_point(&self) -> Point {
        self.last_point
    }

    /// Host timestamp of the press.
    #[must_use]
    pub fn started_at(&self) -> u64 {
        self.started_at
    }

    /// Number of hierarchy levels reached, `1` at the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Center of the active frame.
    #[must_use]
    pub fn center(&self) -> Point {
        self.top().center
    }

    /// The direction a release would currently commit.
    ///
    /// This is the top frame's highlight, or the direction that entered the
    /// top frame when nothing is highlighted there yet.
    #[must_use]
    pub fn sticky_highlight(&self) -> Direction {
        let top = self.top();
        if top.highlight.is_tap() {
            top.entered_from
        } else {
            top.highlight
        }
    }

    /// Whether a direction is chosen at the top frame.
    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.top().highlight.is_tap() {
            Phase::Neutral
        } else {
            Phase::Determined
        }
    }

    /// Returns `true` while the long-press timer is armed.
    #[must_use]
    pub fn is_long_press_armed(&self) -> bool {
        self.long_press_armed
    }

    /// Returns `true` once the long-press timer has fired.
    #[must_use]
    pub fn is_reveal_mode(&self) -> bool {
        self.reveal_mode
    }

    /// The active level's map.
    #[must_use]
    pub fn level(&self) -> Option<Level<'_, O>> {
        let map = frame_map(self.key.root(self.mode), &self.frames)?;
        Some(Level {
            depth: self.frames.len(),
            map,
        })
    }

    /// Directions chosen so far, root first.
    #[must_use]
    pub fn path(&self) -> DirectionPath {
        let mut path: DirectionPath = self
            .frames
            .iter()
            .skip(1)
            .map(|f| f.entered_from)
            .collect();
        let top = self.top();
        if !top.highlight.is_tap() {
            path.push(top.highlight);
        }
        path
    }

    fn top(&self) -> &GestureFrame {
        // The stack always holds the root frame.
        &self.frames[self.frames.len() - 1]
    }

    fn top_mut(&mut self) -> &mut GestureFrame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    fn disarm(&mut self, timers: &mut LongPressScheduler) {
        if self.long_press_armed {
            timers.cancel(self.id);
            self.long_press_armed = false;
            tracing::trace!(
                target: "understory_flick::session",
                session = self.id.get(),
                "long-press disarmed"
            );
        }
    }

    /// Applies a pointer move.
    pub(crate) fn on_move(
        &mut self,
        point: Point,
        classifier: &DirectionClassifier,
        timers: &mut LongPressScheduler,
        observer: &mut impl FlickObserver<O>,
    ) {
        self.last_point = point;
        let key = Arc::clone(&self.key);
        let root = key.root(self.mode);

        if self.back_out_of_branch(root, point, classifier, observer) {
            return;
        }

        let top = *self.top();
        let Some(map) = frame_map(root, &self.frames) else {
            tracing::warn!(
                target: "understory_flick::session",
                session = self.id.get(),
                "frame stack no longer matches the key"
            );
            return;
        };
        let direction = classifier.classify(point - top.center, map.directions());
        if direction.is_tap() || direction == top.highlight {
            return;
        }
        self.disarm(timers);

        match resolve(map, direction) {
            Some(GestureNode::Leaf(leaf)) => {
                self.top_mut().highlight = direction;
                tracing::trace!(
                    target: "understory_flick::session",
                    session = self.id.get(),
                    %direction,
                    depth = self.frames.len(),
                    "highlight"
                );
                observer.on_direction_changed(self.pointer, direction);
                if let Some(mode) = leaf.switch_mode {
                    self.switch_mode(mode, observer);
                }
            }
            Some(GestureNode::Branch(branch)) => {
                self.top_mut().highlight = direction;
                self.frames.push(GestureFrame {
                    center: point,
                    entered_from: direction,
                    highlight: Direction::Tap,
                });
                tracing::trace!(
                    target: "understory_flick::session",
                    session = self.id.get(),
                    %direction,
                    depth = self.frames.len(),
                    "entered branch"
                );
                observer.on_direction_changed(self.pointer, direction);
                observer.on_level_entered(
                    self.pointer,
                    Level {
                        depth: self.frames.len(),
                        map: &branch.children,
                    },
                );
            }
            None => {}
        }
    }

    /// Pops the top frame if it belongs to a cancel-on-tap branch and `point`
    /// is back inside the parent's dead zone.
    fn back_out_of_branch(
        &mut self,
        root: &DirectionMap<O>,
        point: Point,
        classifier: &DirectionClassifier,
        observer: &mut impl FlickObserver<O>,
    ) -> bool {
        let depth = self.frames.len();
        if depth < 2 {
            return false;
        }
        let parent = self.frames[depth - 2];
        let entered_from = self.frames[depth - 1].entered_from;
        let Some(parent_map) = frame_map(root, &self.frames[..depth - 1]) else {
            return false;
        };
        let cancels = resolve(parent_map, entered_from)
            .and_then(GestureNode::as_branch)
            .is_some_and(|b| b.cancel_on_tap);
        if !cancels || !classifier.is_in_dead_zone(point - parent.center) {
            return false;
        }

        self.frames.pop();
        self.top_mut().highlight = Direction::Tap;
        tracing::trace!(
            target: "understory_flick::session",
            session = self.id.get(),
            depth = self.frames.len(),
            "backed out of branch"
        );
        observer.on_direction_changed(self.pointer, self.sticky_highlight());
        observer.on_level_entered(
            self.pointer,
            Level {
                depth: self.frames.len(),
                map: parent_map,
            },
        );
        true
    }

    /// Switches to `mode`, truncating the frame stack to the part that still
    /// exists in the new mode's tree.
    fn switch_mode(&mut self, mode: KeyMode, observer: &mut impl FlickObserver<O>) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        let key = Arc::clone(&self.key);

        let mut map = key.root(mode);
        let mut keep = 1;
        for frame in &self.frames[1..] {
            match resolve(map, frame.entered_from).and_then(GestureNode::as_branch) {
                Some(branch) => {
                    map = &branch.children;
                    keep += 1;
                }
                None => break,
            }
        }
        if keep < self.frames.len() {
            tracing::warn!(
                target: "understory_flick::session",
                session = self.id.get(),
                mode = mode.0,
                from = self.frames.len(),
                to = keep,
                "mode switch truncated the frame stack"
            );
            self.frames.truncate(keep);
        }
        let top = self.top_mut();
        if !top.highlight.is_tap() && resolve(map, top.highlight).is_none() {
            top.highlight = Direction::Tap;
        }

        tracing::debug!(
            target: "understory_flick::session",
            session = self.id.get(),
            mode = mode.0,
            "mode changed"
        );
        observer.on_mode_changed(self.pointer, mode, mode_label(&key, mode));
    }

    /// Handles the long-press timer firing for this session.
    ///
    /// Returns `false` if the timer was no longer armed.
    pub(crate) fn on_long_press(&mut self, observer: &mut impl FlickObserver<O>) -> bool {
        if !self.long_press_armed {
            return false;
        }
        self.long_press_armed = false;
        self.reveal_mode = true;
        tracing::debug!(
            target: "understory_flick::session",
            session = self.id.get(),
            "reveal mode"
        );
        if let Some(level) = self.level() {
            observer.on_reveal_mode_entered(self.pointer, level);
        }
        true
    }

    /// The leaf a release would commit right now.
    fn commit_leaf(&self) -> Option<&O> {
        let root = self.key.root(self.mode);
        let top = self.top();
        let depth = self.frames.len();
        let (map, direction) = if !top.highlight.is_tap() {
            (frame_map(root, &self.frames)?, top.highlight)
        } else if depth > 1 {
            (frame_map(root, &self.frames[..depth - 1])?, top.entered_from)
        } else {
            (root, Direction::Tap)
        };
        resolve(map, direction)
            .and_then(commit_target)
            .map(|leaf| &leaf.output)
    }

    /// The value a release would commit right now, without ending the session.
    #[must_use]
    pub fn pending_output(&self) -> Option<&O> {
        self.commit_leaf()
    }

    /// Ends the session on release or stream cancel.
    ///
    /// The timer is canceled before anything else. `release_point`, when
    /// given, is applied as a final move.
    pub(crate) fn finish(
        mut self,
        release_point: Option<Point>,
        classifier: &DirectionClassifier,
        timers: &mut LongPressScheduler,
        observer: &mut impl FlickObserver<O>,
    ) -> Option<FlickCommit<O>>
    where
        O: Clone,
    {
        timers.cancel(self.id);
        self.long_press_armed = false;

        if let Some(point) = release_point {
            self.on_move(point, classifier, timers, observer);
        }

        let commit = self.commit_leaf().cloned().map(|output| {
            let path = self.path();
            FlickCommit {
                pointer: self.pointer,
                output,
                direction: self.sticky_highlight(),
                is_flick: !path.is_empty(),
                path,
                after_reveal: self.reveal_mode,
            }
        });

        let end = if let Some(commit) = &commit {
            tracing::debug!(
                target: "understory_flick::session",
                session = self.id.get(),
                direction = %commit.direction,
                depth = self.frames.len(),
                after_reveal = commit.after_reveal,
                "committed"
            );
            observer.on_flick(commit.clone());
            GestureEnd::Committed
        } else {
            tracing::debug!(
                target: "understory_flick::session",
                session = self.id.get(),
                "ended without candidate"
            );
            GestureEnd::NoCandidate
        };
        self.end(end, observer);
        commit
    }

    /// Discards the session without committing.
    pub(crate) fn interrupt(
        self,
        timers: &mut LongPressScheduler,
        observer: &mut impl FlickObserver<O>,
    ) {
        timers.cancel(self.id);
        tracing::debug!(
            target: "understory_flick::session",
            session = self.id.get(),
            "interrupted"
        );
        self.end(GestureEnd::Interrupted, observer);
    }

    fn end(self, end: GestureEnd, observer: &mut impl FlickObserver<O>) {
        if !self.mode.is_normal() {
            observer.on_mode_changed(
                self.pointer,
                KeyMode::NORMAL,
                mode_label(&self.key, KeyMode::NORMAL),
            );
        }
        observer.on_gesture_ended(self.pointer, end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::FlickEvent;
    use crate::topology::Topology;
    use crate::tree::{Branch, Leaf};
    use alloc::vec::Vec;

    struct Rig {
        classifier: DirectionClassifier,
        timers: LongPressScheduler,
        events: Vec<FlickEvent<&'static str>>,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                classifier: DirectionClassifier::new(80.0, Topology::EightWay),
                timers: LongPressScheduler::new(400),
                events: Vec::new(),
            }
        }

        fn begin(&mut self, map: DirectionMap<&'static str>) -> GestureSession<&'static str> {
            self.begin_key(FlickKey::new(map))
        }

        fn begin_key(&mut self, key: FlickKey<&'static str>) -> GestureSession<&'static str> {
            let (session, _) = GestureSession::begin(
                SessionId(1),
                PointerId(0),
                Arc::new(key),
                Point::ORIGIN,
                0,
                &mut self.timers,
                &mut self.events,
            );
            session
        }

        fn mv(&mut self, s: &mut GestureSession<&'static str>, x: f64, y: f64) {
            s.on_move(
                Point::new(x, y),
                &self.classifier,
                &mut self.timers,
                &mut self.events,
            );
        }

        fn release(&mut self, s: GestureSession<&'static str>) -> Option<&'static str> {
            s.finish(None, &self.classifier, &mut self.timers, &mut self.events)
                .map(|c| c.output)
        }
    }

    fn nested() -> DirectionMap<&'static str> {
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
    fn leaf_highlight_sticks() {
        let mut rig = Rig::new();
        let mut s = rig.begin(
            DirectionMap::new()
                .with_leaf(Direction::Tap, "a")
                .with_leaf(Direction::Left, "u"),
        );
        assert_eq!(s.phase(), Phase::Neutral);
        rig.mv(&mut s, -100.0, 0.0);
        assert_eq!(s.phase(), Phase::Determined);
        rig.mv(&mut s, -5.0, 3.0);
        assert_eq!(s.sticky_highlight(), Direction::Left);
        assert_eq!(rig.release(s), Some("u"));
    }

    #[test]
    fn first_qualifying_move_disarms_timer() {
        let mut rig = Rig::new();
        let mut s = rig.begin(nested());
        rig.mv(&mut s, 20.0, 0.0);
        assert!(s.is_long_press_armed());
        rig.mv(&mut s, 100.0, 0.0);
        assert!(!s.is_long_press_armed());
        assert_eq!(rig.timers.next_deadline(), None);
    }

    #[test]
    fn branch_pushes_frame_at_current_point() {
        let mut rig = Rig::new();
        let mut s = rig.begin(nested());
        rig.mv(&mut s, 100.0, 0.0);
        assert_eq!(s.depth(), 2);
        assert_eq!(s.center(), Point::new(100.0, 0.0));
        assert_eq!(s.sticky_highlight(), Direction::Right);
        assert_eq!(s.phase(), Phase::Neutral);
        assert_eq!(s.pending_output(), Some(&"i"));
        rig.mv(&mut s, 100.0, 100.0);
        assert_eq!(s.sticky_highlight(), Direction::Down);
        assert_eq!(s.path().as_slice(), [Direction::Right, Direction::Down]);
        assert_eq!(rig.release(s), Some("e"));
    }

    #[test]
    fn level_follows_resolved_path() {
        let mut rig = Rig::new();
        let inner = DirectionMap::new()
            .with_leaf(Direction::Tap, "x")
            .with_leaf(Direction::Left, "y");
        let map = DirectionMap::new().with_leaf(Direction::Tap, "a").with(
            Direction::Right,
            GestureNode::branch(
                DirectionMap::new()
                    .with_leaf(Direction::Tap, "i")
                    .with(Direction::Down, GestureNode::branch(inner)),
            ),
        );
        let mut s = rig.begin(map);
        rig.mv(&mut s, 100.0, 0.0);
        rig.mv(&mut s, 100.0, 100.0);
        assert_eq!(s.depth(), 3);

        let expected = resolve_path(s.key().root(KeyMode::NORMAL), &s.path());
        let level = s.level().map(|l| l.map);
        assert!(level.zip(expected).is_some_and(|(a, b)| core::ptr::eq(a, b)));
        assert_eq!(s.pending_output(), Some(&"x"));
        rig.mv(&mut s, 0.0, 100.0);
        assert_eq!(rig.release(s), Some("y"));
    }

    #[test]
    fn unflagged_branch_ignores_return_to_parent_center() {
        let mut rig = Rig::new();
        let mut s = rig.begin(nested());
        rig.mv(&mut s, 100.0, 0.0);
        rig.mv(&mut s, 0.0, 0.0);
        // From the child's center this is a left flick, which the child lacks.
        assert_eq!(s.depth(), 2);
        assert_eq!(rig.release(s), Some("i"));
    }

    #[test]
    fn cancel_on_tap_branch_backs_out() {
        let mut rig = Rig::new();
        let map = DirectionMap::new().with_leaf(Direction::Tap, "a").with(
            Direction::Right,
            Branch::new(DirectionMap::new().with_leaf(Direction::Down, "e")).with_cancel_on_tap(),
        );
        let mut s = rig.begin(map);
        rig.mv(&mut s, 100.0, 0.0);
        assert_eq!(s.depth(), 2);
        rig.mv(&mut s, 10.0, 0.0);
        assert_eq!(s.depth(), 1);
        assert_eq!(s.sticky_highlight(), Direction::Tap);
        assert!(rig.events.contains(&FlickEvent::LevelEntered {
            pointer: PointerId(0),
            depth: 1,
            directions: crate::DirectionSet::TAP | crate::DirectionSet::RIGHT,
        }));
        assert_eq!(rig.release(s), Some("a"));
    }

    #[test]
    fn long_press_fires_only_while_armed() {
        let mut rig = Rig::new();
        let mut s = rig.begin(nested());
        assert!(s.on_long_press(&mut rig.events));
        assert!(s.is_reveal_mode());
        assert!(!s.on_long_press(&mut rig.events));
        let reveals = rig
            .events
            .iter()
            .filter(|e| matches!(e, FlickEvent::RevealModeEntered { .. }))
            .count();
        assert_eq!(reveals, 1);
    }

    #[test]
    fn mode_switch_truncates_and_resets_at_end() {
        let mut rig = Rig::new();
        let shifted = KeyMode(1);
        let key = FlickKey::new(
            DirectionMap::new()
                .with_leaf(Direction::Tap, "ka")
                .with(Direction::Up, Leaf::new("ka*").with_switch_mode(shifted)),
        )
        .with_mode(
            shifted,
            DirectionMap::new()
                .with_leaf(Direction::Tap, "ga")
                .with_leaf(Direction::Up, "ga*"),
        );
        let mut s = rig.begin_key(key);
        rig.mv(&mut s, 0.0, -100.0);
        assert_eq!(s.mode(), shifted);
        assert!(rig.events.contains(&FlickEvent::ModeChanged {
            pointer: PointerId(0),
            mode: shifted,
            label: crate::OwnedLabel::Output("ga"),
        }));
        assert_eq!(rig.release(s), Some("ga*"));
        assert!(rig.events.contains(&FlickEvent::ModeChanged {
            pointer: PointerId(0),
            mode: KeyMode::NORMAL,
            label: crate::OwnedLabel::Output("ka"),
        }));
    }

    #[test]
    fn release_point_applies_as_final_move() {
        let mut rig = Rig::new();
        let s = rig.begin(nested());
        let commit = s.finish(
            Some(Point::new(100.0, 0.0)),
            &rig.classifier,
            &mut rig.timers,
            &mut rig.events,
        );
        assert_eq!(commit.map(|c| c.output), Some("i"));
    }

    #[test]
    fn interrupt_never_commits() {
        let mut rig = Rig::new();
        let mut s = rig.begin(nested());
        rig.mv(&mut s, 100.0, 0.0);
        s.interrupt(&mut rig.timers, &mut rig.events);
        assert!(rig.events.iter().all(|e| e.as_commit().is_none()));
        assert_eq!(
            rig.events.last(),
            Some(&FlickEvent::GestureEnded {
                pointer: PointerId(0),
                end: GestureEnd::Interrupted,
            })
        );
    }
}
