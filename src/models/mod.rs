pub mod audit_event;
pub mod company;
pub mod setting;
pub mod user;

pub use audit_event::AuditEvent;
pub use company::{Company, CompanyStatus};
pub use setting::Setting;
pub use user::{User, UserRole, UserStatus};

/// Returned when a string from outside the database (session claims, query
/// params) does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEnumValue {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownEnumValue {
    pub fn new(kind: &'static str, value: &str) -> Self {
        UnknownEnumValue {
            kind,
            value: value.to_string(),
        }
    }
}

impl std::fmt::Display for UnknownEnumValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {} value: {}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownEnumValue {}
