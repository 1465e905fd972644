use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The role a user registers with. Carried inside every issued token.
/// Corresponds to the `user_role` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Performs maintenance tasks and owns the records of them.
    Technician,
    /// Oversees every technician's tasks and may delete them.
    Manager,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Technician => "technician",
            Role::Manager => "manager",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "technician" => Ok(Role::Technician),
            "manager" => Ok(Role::Manager),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Public view of a registered user. The password hash never leaves the store layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

/// What login needs from the credential store.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Credentials {
    pub id: i64,
    pub password_hash: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_role_serde() {
        assert_eq!(serde_json::to_string(&Role::Technician).unwrap(), "\"technician\"");
        assert_eq!(serde_json::to_string(&Role::Manager).unwrap(), "\"manager\"");

        let role: Role = serde_json::from_str("\"manager\"").unwrap();
        assert_eq!(role, Role::Manager);

        assert!(serde_json::from_str::<Role>("\"admin\"").is_err());
        assert!(serde_json::from_str::<Role>("\"\"").is_err());
        assert!(serde_json::from_str::<Role>("{\"role\":\"technician\"}").is_err());
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("technician".parse::<Role>(), Ok(Role::Technician));
        assert_eq!("manager".parse::<Role>(), Ok(Role::Manager));
        assert!("Manager".parse::<Role>().is_err());
        assert!("user".parse::<Role>().is_err());
    }

    #[test]
    fn test_user_serialization_has_no_password() {
        let user = User {
            id: 1,
            username: "alice".to_string(),
            role: Role::Technician,
        };
        let value = serde_json::to_value(&user).unwrap();

        assert_eq!(value["id"], 1);
        assert_eq!(value["username"], "alice");
        assert_eq!(value["role"], "technician");
        assert!(value.get("password").is_none());
        assert!(value.get("password_hash").is_none());
    }
}
