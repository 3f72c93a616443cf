//! Role Type Aggregator
//!
//! Folds a user's role bindings into the single role type stored on the
//! user. Privilege order, most privileged first:
//! `DOMAIN_ADMIN (1) > WORKSPACE_OWNER (2) > WORKSPACE_MEMBER (3) > USER (4)`.
//!
//! Workspace roles never lift the aggregate above `USER`: combining a
//! workspace role into an aggregate that is not already more privileged
//! yields `USER`.

use crate::role::RoleType;

pub struct RoleTypeAggregator;

impl RoleTypeAggregator {
    /// Lower is more privileged. Types outside the binding order rank as `USER`.
    pub fn priority(role_type: RoleType) -> u8 {
        match role_type {
            RoleType::DomainAdmin => 1,
            RoleType::WorkspaceOwner => 2,
            RoleType::WorkspaceMember => 3,
            _ => 4,
        }
    }

    pub fn combine(before: RoleType, after: RoleType) -> RoleType {
        if Self::priority(before) < Self::priority(after) {
            before
        } else if after.is_workspace_role() {
            RoleType::User
        } else {
            after
        }
    }

    /// Left fold of `combine` from an explicit seed.
    pub fn fold<I>(seed: RoleType, role_types: I) -> RoleType
    where
        I: IntoIterator<Item = RoleType>,
    {
        role_types.into_iter().fold(seed, Self::combine)
    }

    /// Aggregate after adding a binding of type `added` to a user holding `current`.
    ///
    /// `SYSTEM` and `SYSTEM_ADMIN` accounts keep their type.
    pub fn after_bind(current: RoleType, added: RoleType) -> RoleType {
        if current.is_system() {
            current
        } else {
            Self::combine(current, added)
        }
    }

    /// Aggregate recomputed from scratch over the bindings a user still holds.
    pub fn recompute<I>(current: RoleType, remaining: I) -> RoleType
    where
        I: IntoIterator<Item = RoleType>,
    {
        if current.is_system() {
            current
        } else {
            Self::fold(RoleType::User, remaining)
        }
    }
}
