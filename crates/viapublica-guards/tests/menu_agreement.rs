//! Menus and guards are derived from the same site map and must agree.

use proptest::prelude::*;
use viapublica_core::{ClientKind, Role, Session};
use viapublica_guards::{guard_for, menu_for, route, GuardConfig, ROUTES};
use viapublica_session::SessionStore;

fn session(role: Role) -> Session {
    let builder = Session::builder("Menu", "menu@example.com", role);
    match role {
        Role::SpaceClient => builder.client_kind(ClientKind::Owner),
        _ => builder,
    }
    .build()
    .unwrap()
}

fn concrete(pattern: &str, id: u32) -> String {
    pattern
        .split('/')
        .map(|segment| {
            if segment.starts_with(':') {
                id.to_string()
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[test]
fn every_route_pattern_resolves_to_itself() {
    for r in ROUTES {
        let path = concrete(r.path, 1);
        assert_eq!(route(&path).map(|found| found.path), Some(r.path), "{path}");
    }
}

#[test]
fn administrator_menu_lists_every_menu_route() {
    let admin = session(Role::Administrator);
    let menu = menu_for(Some(&admin));
    assert_eq!(menu.len(), ROUTES.iter().filter(|r| r.in_menu).count());
}

proptest! {
    #[test]
    fn menu_entry_shown_iff_guard_grants(
        role in prop::sample::select(Role::ALL.to_vec()),
        index in 0..ROUTES.len(),
        id in 1u32..10_000,
    ) {
        let r = &ROUTES[index];
        let session = session(role);
        let listed = menu_for(Some(&session)).iter().any(|entry| entry.path == r.path);

        let (_writer, ctx) = SessionStore::resolved(Some(session));
        let path = concrete(r.path, id);
        let opens = match guard_for(&path, &GuardConfig::default()).unwrap() {
            None => true,
            Some(mut guard) => guard.poll(&ctx).state.is_granted(),
        };

        prop_assert_eq!(listed, r.in_menu && opens);
    }

    #[test]
    fn anonymous_menu_is_empty_and_gated_routes_deny(index in 0..ROUTES.len()) {
        prop_assert!(menu_for(None).is_empty());
        let (_writer, ctx) = SessionStore::resolved(None);
        if let Some(mut guard) = guard_for(ROUTES[index].path, &GuardConfig::default()).unwrap() {
            prop_assert!(guard.poll(&ctx).state.redirect().is_some());
        }
    }
}
