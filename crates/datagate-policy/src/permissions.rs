//! Role permission resolution.
//!
//! Roles are matched case-insensitively. A role with no explicit entry on an
//! entity inherits from `authenticated`, which in turn inherits from
//! `anonymous`. An entity with no permissions block is open to every role.

use datagate_core::{EntityAction, EntityConfig, EntitySourceType};
use std::collections::BTreeSet;

/// The role used when a request carries none.
pub const ANONYMOUS_ROLE: &str = "anonymous";

/// The role every signed-in principal holds.
pub const AUTHENTICATED_ROLE: &str = "authenticated";

/// Actions that make sense for an entity's source type.
pub fn applicable_actions(source_type: EntitySourceType) -> &'static [EntityAction] {
    match source_type {
        EntitySourceType::Table | EntitySourceType::View => &[
            EntityAction::Create,
            EntityAction::Read,
            EntityAction::Update,
            EntityAction::Delete,
        ],
        EntitySourceType::StoredProcedure => &[EntityAction::Execute],
    }
}

/// Resolves which actions a role holds on one entity.
pub struct RolePermissions<'a> {
    entity: &'a EntityConfig,
}

impl<'a> RolePermissions<'a> {
    pub fn new(entity: &'a EntityConfig) -> Self {
        Self { entity }
    }

    /// Whether the entity restricts access at all.
    pub fn is_open(&self) -> bool {
        self.entity.permissions.is_empty()
    }

    /// The raw actions configured for the role, following the inheritance chain.
    fn configured_actions(&self, role: &str) -> Option<&'a [EntityAction]> {
        let find = |name: &str| {
            self.entity
                .permissions
                .iter()
                .find(|p| p.role.eq_ignore_ascii_case(name))
                .map(|p| p.actions.as_slice())
        };

        if let Some(actions) = find(role) {
            return Some(actions);
        }
        if role.eq_ignore_ascii_case(ANONYMOUS_ROLE) {
            return None;
        }
        if !role.eq_ignore_ascii_case(AUTHENTICATED_ROLE)
            && let Some(actions) = find(AUTHENTICATED_ROLE)
        {
            return Some(actions);
        }
        find(ANONYMOUS_ROLE)
    }

    /// Effective actions for the role, with `*` expanded for the source type.
    pub fn actions_for(&self, role: &str) -> BTreeSet<EntityAction> {
        let applicable = applicable_actions(self.entity.source_type());
        if self.is_open() {
            return applicable.iter().copied().collect();
        }

        let Some(configured) = self.configured_actions(role) else {
            return BTreeSet::new();
        };

        if configured.contains(&EntityAction::All) {
            return applicable.iter().copied().collect();
        }
        configured
            .iter()
            .copied()
            .filter(|a| applicable.contains(a))
            .collect()
    }

    /// Whether the role may perform the action.
    pub fn allows(&self, role: &str, action: EntityAction) -> bool {
        self.actions_for(role).contains(&action)
    }
}
