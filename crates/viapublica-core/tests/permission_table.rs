//! Permission table properties
//!
//! Literal grant sets per role, totality, determinism and the administrator
//! superset property.

use proptest::prelude::*;
use viapublica_core::{
    capability_for, grants, require, Capability, CapabilitySet, ClientKind, PermissionTable,
    Role, Session, ViaPublicaError,
};

fn set(caps: &[Capability]) -> CapabilitySet {
    caps.iter().copied().collect()
}

#[test]
fn standard_user_grants_are_exactly_browse_favorites_contact() {
    let expected = set(&[
        Capability::ViewCatalog,
        Capability::SaveFavorites,
        Capability::ContactOwners,
    ]);
    assert_eq!(grants(Role::StandardUser), expected);
    for cap in Capability::ALL {
        assert_eq!(
            capability_for(Role::StandardUser, cap),
            expected.contains(cap),
            "standard_user / {cap}"
        );
    }
}

#[test]
fn space_client_grants_match_observed_matrix() {
    let expected = set(&[
        Capability::ViewCatalog,
        Capability::SaveFavorites,
        Capability::ContactOwners,
        Capability::PublishBillboards,
        Capability::EditBillboards,
        Capability::ViewInquiries,
        Capability::ViewStatistics,
        Capability::ManageAvailability,
        Capability::DefinePricing,
    ]);
    assert_eq!(grants(Role::SpaceClient), expected);

    for excluded in [
        Capability::ManageUsers,
        Capability::ManageRoles,
        Capability::AccessAdminPanel,
        Capability::AuditMessages,
        Capability::ViewGlobalMetrics,
    ] {
        assert!(!capability_for(Role::SpaceClient, excluded), "{excluded}");
    }
}

#[test]
fn administrator_holds_every_capability() {
    assert_eq!(grants(Role::Administrator), CapabilitySet::all());
    for role in Role::ALL {
        assert!(grants(Role::Administrator).is_superset_of(grants(role)));
    }
}

#[test]
fn every_pair_is_defined() {
    let table = PermissionTable::global();
    let mut seen = 0;
    for role in Role::ALL {
        for cap in Capability::ALL {
            let _granted: bool = table.capability_for(role, cap);
            seen += 1;
        }
    }
    assert_eq!(seen, 3 * 14);
}

#[test]
fn client_kind_does_not_change_grants() {
    let owner = Session::builder("Dueño", "owner@example.com", Role::SpaceClient)
        .client_kind(ClientKind::Owner)
        .build()
        .unwrap();
    let agency = Session::builder("Agencia", "agency@example.com", Role::SpaceClient)
        .client_kind(ClientKind::Agency)
        .build()
        .unwrap();
    for cap in Capability::ALL {
        assert_eq!(
            require(Some(&owner), cap).is_ok(),
            require(Some(&agency), cap).is_ok()
        );
    }
}

#[test]
fn require_distinguishes_unauthenticated_and_unauthorized() {
    assert_eq!(
        require(None, Capability::ViewCatalog),
        Err(ViaPublicaError::Unauthenticated)
    );

    let user = Session::builder("Ana", "ana@example.com", Role::StandardUser)
        .build()
        .unwrap();
    assert_eq!(
        require(Some(&user), Capability::PublishBillboards),
        Err(ViaPublicaError::unauthorized(
            Role::StandardUser,
            Capability::PublishBillboards
        ))
    );
    assert!(require(Some(&user), Capability::ContactOwners).is_ok());
}

fn any_role() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::ALL.to_vec())
}

fn any_capability() -> impl Strategy<Value = Capability> {
    prop::sample::select(Capability::ALL.to_vec())
}

proptest! {
    #[test]
    fn lookup_is_deterministic(role in any_role(), cap in any_capability()) {
        let first = capability_for(role, cap);
        for _ in 0..8 {
            prop_assert_eq!(capability_for(role, cap), first);
        }
        prop_assert_eq!(PermissionTable::global().capability_for(role, cap), first);
    }

    #[test]
    fn name_lookup_agrees_with_typed_lookup(role in any_role(), cap in any_capability()) {
        let table = PermissionTable::global();
        prop_assert_eq!(
            table.capability_for_names(role.as_str(), cap.as_str()).unwrap(),
            capability_for(role, cap)
        );
        prop_assert_eq!(
            table.capability_for_names(role.as_str(), cap.legacy_key()).unwrap(),
            capability_for(role, cap)
        );
    }

    #[test]
    fn unknown_capability_names_fail_loudly(name in "[a-z]{3,12}-[a-z]{3,12}") {
        prop_assume!(Capability::ALL.iter().all(|cap| cap.as_str() != name));
        let err = PermissionTable::global()
            .capability_for_names("administrator", &name)
            .unwrap_err();
        prop_assert!(err.is_programming_error());
    }

    #[test]
    fn capabilities_are_independent_bits(role in any_role(), a in any_capability(), b in any_capability()) {
        // Granting one capability says nothing about another: only the table decides.
        let granted = grants(role);
        prop_assert_eq!(granted.contains(a), capability_for(role, a));
        prop_assert_eq!(granted.contains(b), capability_for(role, b));
    }
}
