//! Static permission table
//!
//! The single source of truth for "what can this role do". Each role row is an
//! exhaustive match over [`Capability`], so adding a capability without deciding
//! it for every role fails to compile. The table is immutable; changing an
//! entitlement means shipping a new build.

use crate::{Capability, CapabilitySet, Result, Role, Session, ViaPublicaError};
use serde::{Deserialize, Serialize};
use tracing::debug;

const fn standard_user_grants(cap: Capability) -> bool {
    match cap {
        Capability::ViewCatalog => true,
        Capability::SaveFavorites => true,
        Capability::ContactOwners => true,
        Capability::PublishBillboards => false,
        Capability::EditBillboards => false,
        Capability::ViewInquiries => false,
        Capability::ManageUsers => false,
        Capability::ManageRoles => false,
        Capability::AccessAdminPanel => false,
        Capability::ViewStatistics => false,
        Capability::ManageAvailability => false,
        Capability::DefinePricing => false,
        Capability::AuditMessages => false,
        Capability::ViewGlobalMetrics => false,
    }
}

const fn space_client_grants(cap: Capability) -> bool {
    match cap {
        Capability::ViewCatalog => true,
        Capability::SaveFavorites => true,
        Capability::ContactOwners => true,
        Capability::PublishBillboards => true,
        Capability::EditBillboards => true,
        Capability::ViewInquiries => true,
        Capability::ManageUsers => false,
        Capability::ManageRoles => false,
        Capability::AccessAdminPanel => false,
        Capability::ViewStatistics => true,
        Capability::ManageAvailability => true,
        Capability::DefinePricing => true,
        Capability::AuditMessages => false,
        Capability::ViewGlobalMetrics => false,
    }
}

const fn administrator_grants(cap: Capability) -> bool {
    match cap {
        Capability::ViewCatalog => true,
        Capability::SaveFavorites => true,
        Capability::ContactOwners => true,
        Capability::PublishBillboards => true,
        Capability::EditBillboards => true,
        Capability::ViewInquiries => true,
        Capability::ManageUsers => true,
        Capability::ManageRoles => true,
        Capability::AccessAdminPanel => true,
        Capability::ViewStatistics => true,
        Capability::ManageAvailability => true,
        Capability::DefinePricing => true,
        Capability::AuditMessages => true,
        Capability::ViewGlobalMetrics => true,
    }
}

/// Total, pure lookup of a single (role, capability) entry.
pub const fn capability_for(role: Role, cap: Capability) -> bool {
    match role {
        Role::StandardUser => standard_user_grants(cap),
        Role::SpaceClient => space_client_grants(cap),
        Role::Administrator => administrator_grants(cap),
    }
}

/// Dense `Role × Capability` matrix, materialized at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionTable {
    rows: [[bool; Capability::COUNT]; Role::COUNT],
}

/// The process-wide table.
pub static PERMISSION_TABLE: PermissionTable = PermissionTable::build();

impl PermissionTable {
    const fn build() -> Self {
        let mut rows = [[false; Capability::COUNT]; Role::COUNT];
        let mut r = 0;
        while r < Role::COUNT {
            let mut c = 0;
            while c < Capability::COUNT {
                rows[r][c] = capability_for(Role::ALL[r], Capability::ALL[c]);
                c += 1;
            }
            r += 1;
        }
        Self { rows }
    }

    /// Returns the process-wide table.
    pub fn global() -> &'static PermissionTable {
        &PERMISSION_TABLE
    }

    /// Look up one entry.
    pub const fn capability_for(&self, role: Role, cap: Capability) -> bool {
        self.rows[role.index()][cap.index()]
    }

    /// Every capability granted to `role`.
    pub fn grants(&self, role: Role) -> CapabilitySet {
        Capability::ALL
            .into_iter()
            .filter(|cap| self.capability_for(role, *cap))
            .collect()
    }

    /// Look up an entry by wire names.
    ///
    /// Unknown names are programming errors and fail with `InvalidArgument`.
    pub fn capability_for_names(&self, role: &str, cap: &str) -> Result<bool> {
        let role: Role = role.parse()?;
        let cap: Capability = cap.parse()?;
        Ok(self.capability_for(role, cap))
    }

    /// Iterate `(role, capability, granted)` in table order.
    pub fn entries(&self) -> impl Iterator<Item = (Role, Capability, bool)> + '_ {
        Role::ALL.into_iter().flat_map(move |role| {
            Capability::ALL
                .into_iter()
                .map(move |cap| (role, cap, self.capability_for(role, cap)))
        })
    }
}

/// Every capability granted to `role` in the global table.
pub fn grants(role: Role) -> CapabilitySet {
    PERMISSION_TABLE.grants(role)
}

/// Hard check for call sites that are not guarded views.
///
/// An absent session is `Unauthenticated` and never reaches the table.
pub fn require(session: Option<&Session>, cap: Capability) -> Result<()> {
    let Some(session) = session else {
        debug!(capability = %cap, "capability check without session");
        return Err(ViaPublicaError::Unauthenticated);
    };
    let role = session.role();
    if PERMISSION_TABLE.capability_for(role, cap) {
        Ok(())
    } else {
        debug!(session_id = %session.id(), %role, capability = %cap, "capability denied");
        Err(ViaPublicaError::unauthorized(role, cap))
    }
}

/// Flat permission record used to show or hide UI affordances.
///
/// Serialized with the web client's `canXxx` keys. Built from the same table
/// the guards use, so nothing can be shown-but-rejected or hidden-but-reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    /// Browse the public catalog
    pub can_view_catalog: bool,
    /// Keep a favorites list
    pub can_save_favorites: bool,
    /// Message space owners
    pub can_contact_owners: bool,
    /// Publish billboard spaces
    pub can_publish_billboards: bool,
    /// Edit own billboard spaces
    pub can_edit_billboards: bool,
    /// Read inquiries received
    pub can_view_inquiries: bool,
    /// Administer user accounts
    pub can_manage_users: bool,
    /// Change user roles
    pub can_manage_roles: bool,
    /// Open the admin panel
    pub can_access_admin_panel: bool,
    /// See own publication statistics
    pub can_view_statistics: bool,
    /// Set space availability
    pub can_manage_availability: bool,
    /// Set space pricing
    pub can_define_pricing: bool,
    /// Audit platform messages
    pub can_audit_messages: bool,
    /// See platform-wide metrics
    pub can_view_global_metrics: bool,
}

impl Permissions {
    /// Record for a set of granted capabilities.
    pub fn from_set(set: CapabilitySet) -> Self {
        Self {
            can_view_catalog: set.contains(Capability::ViewCatalog),
            can_save_favorites: set.contains(Capability::SaveFavorites),
            can_contact_owners: set.contains(Capability::ContactOwners),
            can_publish_billboards: set.contains(Capability::PublishBillboards),
            can_edit_billboards: set.contains(Capability::EditBillboards),
            can_view_inquiries: set.contains(Capability::ViewInquiries),
            can_manage_users: set.contains(Capability::ManageUsers),
            can_manage_roles: set.contains(Capability::ManageRoles),
            can_access_admin_panel: set.contains(Capability::AccessAdminPanel),
            can_view_statistics: set.contains(Capability::ViewStatistics),
            can_manage_availability: set.contains(Capability::ManageAvailability),
            can_define_pricing: set.contains(Capability::DefinePricing),
            can_audit_messages: set.contains(Capability::AuditMessages),
            can_view_global_metrics: set.contains(Capability::ViewGlobalMetrics),
        }
    }

    /// Value of a single field.
    pub fn get(&self, cap: Capability) -> bool {
        match cap {
            Capability::ViewCatalog => self.can_view_catalog,
            Capability::SaveFavorites => self.can_save_favorites,
            Capability::ContactOwners => self.can_contact_owners,
            Capability::PublishBillboards => self.can_publish_billboards,
            Capability::EditBillboards => self.can_edit_billboards,
            Capability::ViewInquiries => self.can_view_inquiries,
            Capability::ManageUsers => self.can_manage_users,
            Capability::ManageRoles => self.can_manage_roles,
            Capability::AccessAdminPanel => self.can_access_admin_panel,
            Capability::ViewStatistics => self.can_view_statistics,
            Capability::ManageAvailability => self.can_manage_availability,
            Capability::DefinePricing => self.can_define_pricing,
            Capability::AuditMessages => self.can_audit_messages,
            Capability::ViewGlobalMetrics => self.can_view_global_metrics,
        }
    }
}

/// Permission record for the current session; all `false` when anonymous.
pub fn permissions_for(session: Option<&Session>) -> Permissions {
    match session {
        Some(session) => Permissions::from_set(grants(session.role())),
        None => Permissions::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn materialized_table_matches_match_arms() {
        for (role, cap, granted) in PERMISSION_TABLE.entries() {
            assert_eq!(granted, capability_for(role, cap), "{role} / {cap}");
        }
        assert_eq!(
            PERMISSION_TABLE.entries().count(),
            Role::COUNT * Capability::COUNT
        );
    }

    #[test]
    fn lookup_by_names() {
        let table = PermissionTable::global();
        assert!(table
            .capability_for_names("space_client", "define-pricing")
            .unwrap());
        assert!(!table
            .capability_for_names("usuario", "canManageUsers")
            .unwrap());

        let err = table
            .capability_for_names("administrator", "teleport")
            .unwrap_err();
        assert!(matches!(err, ViaPublicaError::InvalidArgument { .. }));
    }

    #[test]
    fn permissions_record_agrees_with_table() {
        for role in Role::ALL {
            let record = Permissions::from_set(grants(role));
            for cap in Capability::ALL {
                assert_eq!(record.get(cap), capability_for(role, cap));
            }
        }
    }

    #[test]
    fn anonymous_record_is_all_false() {
        let record = permissions_for(None);
        assert!(Capability::ALL.into_iter().all(|cap| !record.get(cap)));
    }

    #[test]
    fn record_serializes_with_legacy_keys() {
        let json = serde_json::to_value(Permissions::from_set(grants(Role::StandardUser))).unwrap();
        assert_eq!(json["canViewCatalog"], true);
        assert_eq!(json["canPublishBillboards"], false);
        for cap in Capability::ALL {
            assert!(json.get(cap.legacy_key()).is_some(), "missing {}", cap.legacy_key());
        }
    }
}
