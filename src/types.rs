use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Console user identifier (`user_id` on the wire, e.g. `"U001"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct UserId(pub String);

/// Role kinds a console account can hold.
///
/// The Chinese label is both the wire form (`role_type`) and the display
/// form. Parsing an unrecognised label fails rather than producing a
/// catch-all variant, so every role check downstream works on a known value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "生态监测员")]
    EcologicalMonitor,
    #[serde(rename = "数据分析师")]
    DataAnalyst,
    #[serde(rename = "游客")]
    Visitor,
    #[serde(rename = "执法人员")]
    LawEnforcer,
    #[serde(rename = "科研人员")]
    Researcher,
    #[serde(rename = "技术人员")]
    Technician,
    #[serde(rename = "公园管理人员")]
    ParkManager,
    #[serde(rename = "系统管理员")]
    SystemAdministrator,
}

impl Role {
    pub const ALL: [Role; 8] = [
        Role::EcologicalMonitor,
        Role::DataAnalyst,
        Role::Visitor,
        Role::LawEnforcer,
        Role::Researcher,
        Role::Technician,
        Role::ParkManager,
        Role::SystemAdministrator,
    ];

    /// Wire/display label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::EcologicalMonitor => "生态监测员",
            Role::DataAnalyst => "数据分析师",
            Role::Visitor => "游客",
            Role::LawEnforcer => "执法人员",
            Role::Researcher => "科研人员",
            Role::Technician => "技术人员",
            Role::ParkManager => "公园管理人员",
            Role::SystemAdministrator => "系统管理员",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| Error::UnknownRole(s.to_owned()))
    }
}

/// Account state as reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    #[serde(rename = "正常")]
    Active,
    #[serde(rename = "锁定")]
    Locked,
    #[serde(rename = "停用")]
    Disabled,
}

/// Profile of the signed-in user.
///
/// Owned by the session and replaced wholesale on refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct UserProfile {
    pub user_id: UserId,
    pub username: String,
    #[serde(rename = "real_name")]
    pub display_name: String,
    #[serde(rename = "role_type")]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_status: Option<AccountStatus>,
}

impl UserProfile {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        username: impl Into<String>,
        display_name: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            user_id: UserId(user_id.into()),
            username: username.into(),
            display_name: display_name.into(),
            role,
            contact_phone: None,
            account_status: None,
        }
    }

    #[must_use]
    pub fn with_contact_phone(mut self, phone: impl Into<String>) -> Self {
        self.contact_phone = Some(phone.into());
        self
    }

    #[must_use]
    pub fn with_account_status(mut self, status: AccountStatus) -> Self {
        self.account_status = Some(status);
        self
    }
}

/// Username/password pair sent to the login endpoint.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of a successful credential exchange.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct LoginResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: String,
    pub user: UserProfile,
}
