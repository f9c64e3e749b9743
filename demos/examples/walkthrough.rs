// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A scripted play session: a menu, a building panel, the map scanner and
//! event announcements, all spoken through the log.
//!
//! Run:
//! - `cargo run -p earshot_demos --example walkthrough`
//! - `RUST_LOG=debug cargo run -p earshot_demos --example walkthrough -- earshot.toml`

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use earshot::navigator::{EntityId, Snapshot};
use earshot::prelude::*;
use tracing_subscriber::EnvFilter;

/// A tiny village standing in for the game.
#[derive(Default)]
struct Village {
    events: RefCell<Vec<EventPayload>>,
}

impl GameDataProvider for Village {
    fn fetch_snapshot(&self, kind: &str, id: EntityId) -> Result<Snapshot, Unavailable> {
        if kind != "building" {
            return Err(Unavailable);
        }
        Ok(Snapshot {
            kind: kind.to_owned(),
            id,
            sections: vec![
                Node::list("Workers", ["Ada", "Brune"]),
                Node::list("Storage", ["12 wood", "4 stone"]),
                Node::branch("Upgrades", Vec::new()),
            ],
        })
    }

    fn poll_events(&self) -> Vec<EventPayload> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

fn scan_village(catalog: &mut CatalogBuilder) -> Result<(), Unavailable> {
    catalog
        .declare("Buildings", "Housing", "Huts")
        .push(ScanEntry::new("Buildings", "Production", "Mills", "mill", Point::new(4.0, 3.0)))
        .push(ScanEntry::new("Resources", "Trees", "Oak", "oak", Point::new(-2.0, 0.0)))
        .push(ScanEntry::new("Resources", "Trees", "Oak", "old oak", Point::new(0.0, -7.0)))
        .push(ScanEntry::new("Resources", "Rocks", "Granite", "boulder", Point::new(5.0, 5.0)));
    Ok(())
}

fn press(session: &mut Session, key: Key, modifiers: Modifiers) {
    let outcome = session.handle_key(key, modifiers);
    if !outcome.is_consumed() {
        tracing::info!(%key, "key passed through to the game");
    }
}

fn main() -> Result<(), EarshotError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match std::env::args().nth(1) {
        Some(path) => EarshotConfig::load(Path::new(&path))?,
        None => EarshotConfig::default(),
    };
    let speaker = Speaker::new(TracingSink);
    let game = Rc::new(GameContext::new(Village::default()));

    let menu = TreeSource::fixed(vec![
        Node::list("Build", ["Hut", "Mill", "Well"]),
        Node::list("Orders", ["Gather wood", "Gather stone"]),
        Node::leaf("Resume"),
    ])
    .on_activate(|_, node| Some(format!("{} selected", node.label)));
    let menu = Rc::new(RefCell::new(config.navigator("menu", menu, 2, speaker.clone())));

    let panel = TreeSource::from_snapshot(Rc::clone(&game), "building", EntityId(1));
    let panel = Rc::new(RefCell::new(config.navigator(
        "building_panel",
        panel,
        3,
        speaker.clone(),
    )));

    let scanner = Rc::new(RefCell::new(config.scanner("scanner", scan_village, speaker.clone())));

    let mut session = Session::builder(&config, speaker)
        .register(Shared::new(Rc::clone(&panel)))
        .register(Shared::new(Rc::clone(&menu)))
        .register(Shared::new(Rc::clone(&scanner)))
        .register(FnHandler::new("hotkeys", || true, |key, mods| {
            Ok(key == Key::Function(1) && mods.is_empty())
        }))
        .subscribe(
            "villager_born",
            |ev| ev.field("name").map(str::to_owned),
            |ev| Ok(format!("{} was born", ev.field("name")?)),
        )
        .build(0)?;

    let none = Modifiers::empty();

    tracing::info!("menu");
    menu.borrow_mut().open();
    for key in [Key::Down, Key::Right, Key::Down, Key::Enter, Key::Left, Key::Char('o')] {
        press(&mut session, key, none);
    }
    press(&mut session, Key::Escape, none);

    tracing::info!("building panel");
    panel.borrow_mut().open();
    for key in [Key::Right, Key::Down, Key::Left, Key::End, Key::Right, Key::Tab] {
        press(&mut session, key, none);
    }
    press(&mut session, Key::PageDown, Modifiers::CTRL);
    press(&mut session, Key::Escape, none);
    press(&mut session, Key::Escape, none);

    tracing::info!("scanner");
    scanner.borrow_mut().open(Point::ORIGIN);
    press(&mut session, Key::End, none);
    press(&mut session, Key::PageDown, none);
    press(&mut session, Key::End, none);
    press(&mut session, Key::PageDown, Modifiers::SHIFT);
    press(&mut session, Key::PageDown, Modifiers::CTRL);
    press(&mut session, Key::Home, none);
    press(&mut session, Key::Function(5), none);
    press(&mut session, Key::Escape, none);

    tracing::info!("events");
    let born = |name: &str| EventPayload::new("villager_born").with_field("name", name);
    game.provider().events.borrow_mut().push(born("Cato"));
    session.pump(game.as_ref(), 500);
    game.provider().events.borrow_mut().extend([born("Dara"), born("Dara")]);
    session.pump(game.as_ref(), 2500);

    tracing::info!("scene change");
    game.invalidate();
    session.scene_changed(3000);
    panel.borrow_mut().open();
    press(&mut session, Key::Escape, none);
    game.refresh();
    game.provider().events.borrow_mut().push(born("Dara"));
    let spoken = session.pump(game.as_ref(), 6000);
    tracing::info!(spoken, scene = session.scene(), "done");
    Ok(())
}
