//! Role and permission checks for route guards.

use super::{AdminRole, UserRecord};

/// Permission checks over the (possibly absent) current user.
///
/// Every check is false when no user is signed in.
#[derive(Debug, Clone, Copy)]
pub struct Permissions<'a> {
    user: Option<&'a UserRecord>,
}

impl<'a> Permissions<'a> {
    /// Creates a view over the given user.
    #[must_use]
    pub const fn new(user: Option<&'a UserRecord>) -> Self {
        Self { user }
    }

    /// Returns the current role, if signed in.
    #[must_use]
    pub fn role(&self) -> Option<&'a AdminRole> {
        self.user.map(|u| &u.role)
    }

    /// Returns true if the user holds `permission`. Empty names never match.
    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        if permission.is_empty() {
            return false;
        }
        self.user
            .is_some_and(|u| u.permissions.iter().any(|p| p == permission))
    }

    /// Returns true if the user holds at least one of `permissions`.
    #[must_use]
    pub fn has_any_permission<S: AsRef<str>>(&self, permissions: &[S]) -> bool {
        permissions.iter().any(|p| self.has_permission(p.as_ref()))
    }

    /// Returns true if the user holds every one of `permissions`.
    #[must_use]
    pub fn has_all_permissions<S: AsRef<str>>(&self, permissions: &[S]) -> bool {
        permissions.iter().all(|p| self.has_permission(p.as_ref()))
    }

    /// Returns true if the user's role is exactly `role`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.role().is_some_and(|r| r.as_str() == role)
    }

    /// Returns true if the user's role is any of `roles`.
    #[must_use]
    pub fn has_any_role<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        roles.iter().any(|r| self.has_role(r.as_ref()))
    }

    /// Returns true for super admins.
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        matches!(self.role(), Some(AdminRole::SuperAdmin))
    }

    /// Decides whether a route with the given requirements is accessible.
    ///
    /// Super admins pass everything. Otherwise a non-empty role list requires
    /// any of the roles and a non-empty permission list requires all of the
    /// permissions. Empty lists impose no requirement.
    #[must_use]
    pub fn can_access<P, R>(&self, required_permissions: &[P], required_roles: &[R]) -> bool
    where
        P: AsRef<str>,
        R: AsRef<str>,
    {
        if self.is_super_admin() {
            return true;
        }

        if !required_roles.is_empty() && !self.has_any_role(required_roles) {
            return false;
        }

        required_permissions.is_empty() || self.has_all_permissions(required_permissions)
    }
}
