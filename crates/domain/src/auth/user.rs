//! Admin user record.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Role of an admin user.
///
/// Roles the backend introduces later are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AdminRole {
    /// Unrestricted access.
    SuperAdmin,
    /// Support staff.
    SupportAdmin,
    /// Read-only analytics access.
    AnalyticsViewer,
    /// A role this client does not know about.
    Other(String),
}

impl AdminRole {
    /// Returns the wire name of the role.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::SupportAdmin => "support_admin",
            Self::AnalyticsViewer => "analytics_viewer",
            Self::Other(role) => role,
        }
    }
}

impl From<String> for AdminRole {
    fn from(value: String) -> Self {
        match value.as_str() {
            "super_admin" => Self::SuperAdmin,
            "support_admin" => Self::SupportAdmin,
            "analytics_viewer" => Self::AnalyticsViewer,
            _ => Self::Other(value),
        }
    }
}

impl From<AdminRole> for String {
    fn from(value: AdminRole) -> Self {
        match value {
            AdminRole::Other(role) => role,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reads an optional field, mapping an explicit `null` to the default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// The authenticated admin user as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// User identifier.
    pub id: String,
    /// Login email.
    pub email: String,
    /// Given name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_name: String,
    /// Family name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_name: String,
    /// Admin role.
    pub role: AdminRole,
    /// Fine-grained permissions, e.g. `tenants:write`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub permissions: Vec<String>,
    /// Whether two-factor authentication is enabled.
    #[serde(default, deserialize_with = "null_as_default")]
    pub two_factor_enabled: bool,
    /// Account creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last successful login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// Creates a user with the required fields; the rest are empty.
    #[must_use]
    pub fn new(id: impl Into<String>, email: impl Into<String>, role: AdminRole) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            first_name: String::new(),
            last_name: String::new(),
            role,
            permissions: Vec::new(),
            two_factor_enabled: false,
            created_at: None,
            last_login: None,
        }
    }

    /// Adds permissions.
    #[must_use]
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions.extend(permissions.into_iter().map(Into::into));
        self
    }

    /// Returns "First Last", falling back to the email.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_user_from_backend_json() {
        let json = r#"{
            "id": "u-1",
            "email": "a@b.com",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "role": "support_admin",
            "permissions": ["tickets:read"],
            "twoFactorEnabled": true,
            "createdAt": "2024-03-01T10:00:00Z"
        }"#;

        let user: UserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, AdminRole::SupportAdmin);
        assert_eq!(user.permissions, vec!["tickets:read".to_string()]);
        assert!(user.two_factor_enabled);
        assert!(user.created_at.is_some());
        assert_eq!(user.last_login, None);
        assert_eq!(user.display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_null_optional_fields_read_as_empty() {
        let json = r#"{
            "id": "u-4",
            "email": "n@example.com",
            "firstName": null,
            "lastName": null,
            "role": "analytics_viewer",
            "permissions": null,
            "twoFactorEnabled": null
        }"#;

        let user: UserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(
            user,
            UserRecord::new("u-4", "n@example.com", AdminRole::AnalyticsViewer)
        );
    }

    #[test]
    fn test_unknown_role_is_preserved() {
        let user: UserRecord =
            serde_json::from_str(r#"{"id":"u-2","email":"x@y.z","role":"billing_admin"}"#).unwrap();
        assert_eq!(user.role, AdminRole::Other("billing_admin".to_string()));

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["role"], "billing_admin");
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let user = UserRecord::new("u-3", "ops@example.com", AdminRole::SuperAdmin);
        assert_eq!(user.display_name(), "ops@example.com");
    }
}
