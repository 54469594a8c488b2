//! Capabilities and capability sets
//!
//! Capabilities are independent bits drawn from a closed enumeration. None
//! implies another, so every check names exactly one capability.

use crate::{Result, ViaPublicaError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A single named permission bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// Browse the public catalog
    ViewCatalog,
    /// Keep a favorites list
    SaveFavorites,
    /// Message space owners
    ContactOwners,
    /// Publish new billboard listings
    PublishBillboards,
    /// Edit existing listings
    EditBillboards,
    /// Read inquiries received on own listings
    ViewInquiries,
    /// Administer user accounts
    ManageUsers,
    /// Assign roles
    ManageRoles,
    /// Enter the administration panel
    AccessAdminPanel,
    /// Listing statistics for own spaces
    ViewStatistics,
    /// Maintain availability calendars
    ManageAvailability,
    /// Set listing prices
    DefinePricing,
    /// Audit user messages
    AuditMessages,
    /// Marketplace-wide metrics
    ViewGlobalMetrics,
}

impl Capability {
    /// Every capability, in table order.
    pub const ALL: [Capability; 14] = [
        Capability::ViewCatalog,
        Capability::SaveFavorites,
        Capability::ContactOwners,
        Capability::PublishBillboards,
        Capability::EditBillboards,
        Capability::ViewInquiries,
        Capability::ManageUsers,
        Capability::ManageRoles,
        Capability::AccessAdminPanel,
        Capability::ViewStatistics,
        Capability::ManageAvailability,
        Capability::DefinePricing,
        Capability::AuditMessages,
        Capability::ViewGlobalMetrics,
    ];

    /// Number of capabilities.
    pub const COUNT: usize = Self::ALL.len();

    /// Wire name (`publish-billboards`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Capability::ViewCatalog => "view-catalog",
            Capability::SaveFavorites => "save-favorites",
            Capability::ContactOwners => "contact-owners",
            Capability::PublishBillboards => "publish-billboards",
            Capability::EditBillboards => "edit-billboards",
            Capability::ViewInquiries => "view-inquiries",
            Capability::ManageUsers => "manage-users",
            Capability::ManageRoles => "manage-roles",
            Capability::AccessAdminPanel => "access-admin-panel",
            Capability::ViewStatistics => "view-statistics",
            Capability::ManageAvailability => "manage-availability",
            Capability::DefinePricing => "define-pricing",
            Capability::AuditMessages => "audit-messages",
            Capability::ViewGlobalMetrics => "view-global-metrics",
        }
    }

    /// Key used by the web client's permission records (`canPublishBillboards`).
    pub const fn legacy_key(self) -> &'static str {
        match self {
            Capability::ViewCatalog => "canViewCatalog",
            Capability::SaveFavorites => "canSaveFavorites",
            Capability::ContactOwners => "canContactOwners",
            Capability::PublishBillboards => "canPublishBillboards",
            Capability::EditBillboards => "canEditBillboards",
            Capability::ViewInquiries => "canViewInquiries",
            Capability::ManageUsers => "canManageUsers",
            Capability::ManageRoles => "canManageRoles",
            Capability::AccessAdminPanel => "canAccessAdminPanel",
            Capability::ViewStatistics => "canViewStatistics",
            Capability::ManageAvailability => "canManageAvailability",
            Capability::DefinePricing => "canDefinePricing",
            Capability::AuditMessages => "canAuditMessages",
            Capability::ViewGlobalMetrics => "canViewGlobalMetrics",
        }
    }

    /// Dense index used by the permission table.
    pub const fn index(self) -> usize {
        self as usize
    }

    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = ViaPublicaError;

    fn from_str(s: &str) -> Result<Self> {
        Capability::ALL
            .into_iter()
            .find(|cap| cap.as_str() == s || cap.legacy_key() == s)
            .ok_or_else(|| ViaPublicaError::invalid_argument(format!("unknown capability '{s}'")))
    }
}

/// Set of capabilities backed by a bitmask over [`Capability::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CapabilitySet(u16);

impl CapabilitySet {
    /// The empty set.
    pub const EMPTY: CapabilitySet = CapabilitySet(0);

    /// Set containing every capability.
    pub const fn all() -> Self {
        let mut bits = 0u16;
        let mut i = 0;
        while i < Capability::COUNT {
            bits |= Capability::ALL[i].bit();
            i += 1;
        }
        CapabilitySet(bits)
    }

    /// Returns a copy of `self` with `cap` added.
    #[must_use]
    pub const fn with(self, cap: Capability) -> Self {
        CapabilitySet(self.0 | cap.bit())
    }

    /// Returns `true` if `cap` is in the set.
    pub const fn contains(self, cap: Capability) -> bool {
        self.0 & cap.bit() != 0
    }

    /// Returns `true` if every member of `other` is also in `self`.
    pub const fn is_superset_of(self, other: CapabilitySet) -> bool {
        self.0 & other.0 == other.0
    }

    /// Number of capabilities in the set.
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns `true` if the set has no members.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate members in table order.
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.into_iter().filter(move |cap| self.contains(*cap))
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(CapabilitySet::EMPTY, CapabilitySet::with)
    }
}

impl std::fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.iter().map(Capability::as_str).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}
