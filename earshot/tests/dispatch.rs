// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Key ownership across stacked overlays.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use earshot::SessionBuilder;
use earshot::prelude::*;

const NONE: Modifiers = Modifiers::empty();

fn session_with(handlers: Vec<Box<dyn Handler>>) -> Session {
    handlers
        .into_iter()
        .fold(
            Session::builder(&EarshotConfig::default(), Speaker::new(|_: &str| {})),
            SessionBuilder::register_boxed,
        )
        .build(0)
        .unwrap()
}

#[test]
fn escape_at_the_top_reaches_every_overlay_and_the_game() {
    let (speaker, _) = Speaker::recording();
    let popup = TreeSource::fixed(vec![Node::list("Orders", ["Build"])]);
    let popup = Rc::new(RefCell::new(HierarchicalNavigator::new("popup", popup, 2, speaker)));
    let game_menu_closed = Rc::new(Cell::new(false));
    let seen = Rc::clone(&game_menu_closed);
    let mut session = session_with(vec![
        Box::new(Shared::new(Rc::clone(&popup))),
        Box::new(FnHandler::new("hud", || true, move |key, _| {
            if key == Key::Escape {
                seen.set(true);
            }
            Ok(false)
        })),
    ]);

    popup.borrow_mut().open();
    assert_eq!(session.handle_key(Key::Escape, NONE), Dispatched::Forwarded);
    assert!(!popup.borrow().is_open());
    assert!(game_menu_closed.get());
}

#[test]
fn inactive_handlers_are_skipped() {
    let hits = Rc::new(Cell::new(0));
    let counted = Rc::clone(&hits);
    let mut session = session_with(vec![
        Box::new(FnHandler::new("asleep", || false, |_, _| Ok(true))),
        Box::new(FnHandler::new("awake", || true, move |_, _| {
            counted.set(counted.get() + 1);
            Ok(true)
        })),
    ]);
    assert_eq!(session.handle_key(Key::Up, NONE), Dispatched::Consumed { handler: 1 });
    assert_eq!(hits.get(), 1);
}

#[test]
fn faults_are_contained_and_consume_the_key() {
    let later = Rc::new(Cell::new(false));
    let reached = Rc::clone(&later);
    let mut session = session_with(vec![
        Box::new(FnHandler::new("broken", || true, |key, _| {
            if key == Key::Up {
                return Err(HandlerError::Collaborator("panel vanished".to_owned()));
            }
            panic!("unexpected key {key}");
        })),
        Box::new(FnHandler::new("fallback", || true, move |_, _| {
            reached.set(true);
            Ok(true)
        })),
    ]);

    assert_eq!(session.handle_key(Key::Up, NONE), Dispatched::Faulted { handler: 0 });
    assert_eq!(session.handle_key(Key::Down, NONE), Dispatched::Faulted { handler: 0 });
    assert!(!later.get(), "a faulted key must not reach later handlers");

    // The chain keeps working after a panic.
    assert_eq!(session.handle_key(Key::Up, NONE), Dispatched::Faulted { handler: 0 });
}

#[test]
fn busy_shared_handler_is_a_fault() {
    let (speaker, _) = Speaker::recording();
    let menu = TreeSource::fixed(vec![Node::leaf("Resume")]);
    let menu = Rc::new(RefCell::new(HierarchicalNavigator::new("menu", menu, 2, speaker)));
    let mut session = session_with(vec![Box::new(Shared::new(Rc::clone(&menu)))]);
    menu.borrow_mut().open();

    // A reader elsewhere holds the navigator while the key arrives.
    let held = menu.borrow();
    assert_eq!(session.handle_key(Key::Down, NONE), Dispatched::Faulted { handler: 0 });
    drop(held);
    assert!(session.handle_key(Key::Down, NONE).is_consumed());
}
