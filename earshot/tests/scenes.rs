// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene transitions: game data invalidation and announcer teardown.

use std::cell::RefCell;
use std::rc::Rc;

use earshot::navigator::{EntityId, LoadState, Snapshot};
use earshot::prelude::*;

#[derive(Default)]
struct Village {
    queue: RefCell<Vec<EventPayload>>,
}

impl Village {
    fn birth(&self, name: &str) {
        self.queue
            .borrow_mut()
            .push(EventPayload::new("villager_born").with_field("name", name));
    }
}

impl GameDataProvider for Village {
    fn fetch_snapshot(&self, kind: &str, id: EntityId) -> Result<Snapshot, Unavailable> {
        Ok(Snapshot {
            kind: kind.to_owned(),
            id,
            sections: vec![Node::list("Workers", ["Ada", "Brune"]), Node::leaf("Storage")],
        })
    }

    fn poll_events(&self) -> Vec<EventPayload> {
        std::mem::take(&mut *self.queue.borrow_mut())
    }
}

fn name_key(ev: &EventPayload) -> Result<String, MalformedEvent> {
    ev.field("name").map(str::to_owned)
}

fn born(ev: &EventPayload) -> Result<String, MalformedEvent> {
    Ok(format!("{} was born", ev.field("name")?))
}

#[test]
fn announcements_restart_after_a_scene_change() {
    let ctx = Rc::new(GameContext::new(Village::default()));
    let (speaker, transcript) = Speaker::recording();
    let mut session = Session::builder(&EarshotConfig::default(), speaker)
        .subscribe("villager_born", name_key, born)
        .build(0)
        .unwrap();

    ctx.provider().birth("Ada");
    assert_eq!(session.pump(ctx.as_ref(), 1000), 0, "inside the grace period");
    ctx.provider().birth("Ada");
    assert_eq!(session.pump(ctx.as_ref(), 2500), 1);
    ctx.provider().birth("Ada");
    ctx.provider().birth("Brune");
    assert_eq!(session.pump(ctx.as_ref(), 3000), 1, "Ada is a duplicate");

    session.scene_changed(10_000);
    assert_eq!(session.scene(), 1);
    assert_eq!(session.scope().started_at(), 10_000);
    assert!(session.scope().is_subscribed("villager_born"));

    ctx.provider().birth("Ada");
    assert_eq!(session.pump(ctx.as_ref(), 11_000), 0, "new grace period");
    ctx.provider().birth("Ada");
    assert_eq!(session.pump(ctx.as_ref(), 12_500), 1, "cache was dropped");

    assert_eq!(
        transcript.borrow().lines(),
        ["Ada was born", "Brune was born", "Ada was born"]
    );
}

#[test]
fn malformed_events_are_not_spoken() {
    let (speaker, transcript) = Speaker::recording();
    let mut session = Session::builder(&EarshotConfig::default(), speaker)
        .subscribe("villager_born", name_key, born)
        .build(0)
        .unwrap();
    let nameless = EventPayload::new("villager_born");
    assert_eq!(session.publish(&nameless, 5000), Some(Delivery::Malformed));
    assert_eq!(session.publish(&EventPayload::new("harvest"), 5000), None);
    assert!(transcript.borrow().lines().is_empty());
}

#[test]
fn panels_read_nothing_while_the_scene_loads() {
    let ctx = Rc::new(GameContext::new(Village::default()));
    let (speaker, transcript) = Speaker::recording();
    let source = TreeSource::from_snapshot(Rc::clone(&ctx), "building", EntityId(7));
    let panel = Rc::new(RefCell::new(HierarchicalNavigator::new(
        "building_panel",
        source,
        2,
        speaker.clone(),
    )));
    let mut session = Session::builder(&EarshotConfig::default(), speaker)
        .register(Shared::new(Rc::clone(&panel)))
        .build(0)
        .unwrap();

    ctx.invalidate();
    ctx.provider().birth("Ada");
    assert!(ctx.poll_events().is_empty());
    session.scene_changed(100);

    panel.borrow_mut().open();
    assert_eq!(panel.borrow().load_state(), LoadState::Unavailable);
    assert_eq!(panel.borrow().current_index(), None);
    assert!(session.handle_key(Key::Down, Modifiers::empty()).is_consumed());
    panel.borrow_mut().close();

    ctx.refresh();
    assert_eq!(ctx.generation(), 1);
    panel.borrow_mut().open();
    assert_eq!(panel.borrow().load_state(), LoadState::Ready);
    session.handle_key(Key::Right, Modifiers::empty());
    assert_eq!(panel.borrow().path(), Some(vec![0, 0]));
    assert_eq!(transcript.borrow().last(), Some("Ada"));
}
