// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_flick --heading-base-level=0

//! Understory Flick: flick gesture recognition for virtual keys.
//!
//! A flick is a short directional drag on a key. This crate turns a pointer
//! stream into exactly one committed value per gesture, possibly after the
//! gesture has descended through several nested levels of choices.
//!
//! ## Pieces
//!
//! - [`DirectionClassifier`]: pure geometry. A displacement shorter than the
//!   sensitivity is a [`Direction::Tap`]; otherwise the nearest enabled
//!   direction of the [`Topology`] within 70 degrees wins.
//! - [`DirectionMap`], [`GestureNode`] and [`FlickKey`]: the tree of choices
//!   on a key. Leaves carry output values, branches open a nested level.
//! - [`resolve`], [`commit_target`] and [`default_label`]: side-effect free
//!   lookups over that tree.
//! - [`LongPressScheduler`]: one cancellable long-press timer per gesture,
//!   backed by [`understory_timing::TimerQueue`].
//! - [`GestureSession`]: the per-pointer state machine.
//! - [`FlickRecognizer`]: owns the sessions and timers for one key.
//! - [`FlickBoard`]: routes pointers across many keys with a rollover policy.
//! - [`FlickObserver`]: receives commits and advisory notifications for
//!   presentation.
//!
//! ## Stickiness and hierarchy
//!
//! Once a direction is chosen it stays chosen when the pointer drifts back
//! toward the center. Entering a branch starts a new level centered where the
//! pointer is at that moment, and later moves are classified against it:
//!
//! ```rust
//! use kurbo::Point;
//! use understory_flick::{
//!     Direction, DirectionMap, FlickKey, FlickRecognizer, GestureNode, PointerId,
//! };
//!
//! let tree = DirectionMap::new()
//!     .with_leaf(Direction::Tap, "a")
//!     .with(
//!         Direction::Right,
//!         GestureNode::branch(
//!             DirectionMap::new()
//!                 .with_leaf(Direction::Tap, "i")
//!                 .with_leaf(Direction::Down, "e"),
//!         ),
//!     );
//!
//! let mut recognizer = FlickRecognizer::default();
//! assert!(recognizer.attach(FlickKey::new(tree)));
//!
//! // `()` ignores notifications; the commit is also returned directly.
//! let finger = PointerId(0);
//! recognizer.on_press(finger, Point::new(0.0, 0.0), 0, &mut ());
//! recognizer.on_move(finger, Point::new(100.0, 0.0), &mut ()); // into the branch
//! recognizer.on_move(finger, Point::new(100.0, 100.0), &mut ()); // down inside it
//! recognizer.on_move(finger, Point::new(100.0, 10.0), &mut ()); // back near its center
//! let commit = recognizer.on_release(finger, Point::new(100.0, 10.0), &mut ());
//!
//! let commit = commit.unwrap();
//! assert_eq!(commit.output, "e");
//! assert_eq!(commit.path.as_slice(), [Direction::Right, Direction::Down]);
//! ```
//!
//! ## Time
//!
//! Nothing here reads a clock. Presses carry a host timestamp in milliseconds
//! and the host either polls [`FlickRecognizer::advance`] (using
//! [`FlickRecognizer::next_deadline`] to decide when) or schedules its own
//! callback for the [`LongPressToken`] returned by the press:
//!
//! ```rust
//! use kurbo::Point;
//! use understory_flick::{
//!     Direction, DirectionMap, FlickEvent, FlickKey, FlickRecognizer, PointerId,
//! };
//!
//! let mut recognizer = FlickRecognizer::default();
//! recognizer.attach(FlickKey::new(
//!     DirectionMap::new()
//!         .with_leaf(Direction::Tap, 'a')
//!         .with_leaf(Direction::Right, 'i'),
//! ));
//!
//! let finger = PointerId(3);
//! let mut events: Vec<FlickEvent<char>> = Vec::new();
//! let token = recognizer.on_press(finger, Point::ORIGIN, 1_000, &mut events).unwrap();
//! assert_eq!(token.deadline, 1_400);
//!
//! // The host's timer fires: candidates are revealed.
//! assert!(recognizer.fire_long_press(token, &mut events));
//! assert!(events.iter().any(|e| matches!(e, FlickEvent::RevealModeEntered { .. })));
//!
//! // Releasing in place still commits the tap value.
//! let commit = recognizer.on_release(finger, Point::ORIGIN, &mut events).unwrap();
//! assert_eq!(commit.output, 'a');
//! assert!(commit.after_reveal);
//! ```
//!
//! ## Features
//!
//! - `std` (default): forwards to `kurbo/std` and `tracing/std`.
//! - `libm`: lets `kurbo` do its float math without `std`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod board;
mod classifier;
mod config;
mod direction;
mod long_press;
mod observer;
mod pointer;
mod recognizer;
mod resolve;
mod session;
mod topology;
mod tree;

pub use board::{FlickBoard, RolloverPolicy};
pub use classifier::{DirectionClassifier, MAX_ANGLE_DIFFERENCE, flick_angle};
pub use config::{
    ConfigError, DEFAULT_LONG_PRESS_TIMEOUT_MS, DEFAULT_MAX_POINTERS, DEFAULT_SENSITIVITY,
    FlickConfig, KeyClaim,
};
pub use direction::{Direction, DirectionSet};
pub use long_press::{LongPressScheduler, LongPressToken, SessionId};
pub use observer::{DirectionPath, FlickCommit, FlickEvent, FlickObserver, GestureEnd};
pub use pointer::{PointerEvent, PointerId, PointerPhase};
pub use recognizer::FlickRecognizer;
pub use resolve::{Label, Level, OwnedLabel, commit_target, default_label, resolve, resolve_path};
pub use session::{GestureSession, Phase};
pub use topology::{DeadZone, Sector, Topology, angular_distance, normalize_degrees};
pub use tree::{Branch, DirectionMap, FlickKey, GestureNode, KeyMode, Leaf};
