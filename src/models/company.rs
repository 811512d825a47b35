use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::UnknownEnumValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "company_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum CompanyStatus {
    Incomplete,
    Pending,
    Active,
    Inactive,
    Suspended,
}

impl CompanyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CompanyStatus::Incomplete => "INCOMPLETE",
            CompanyStatus::Pending => "PENDING",
            CompanyStatus::Active => "ACTIVE",
            CompanyStatus::Inactive => "INACTIVE",
            CompanyStatus::Suspended => "SUSPENDED",
        }
    }
}

impl fmt::Display for CompanyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompanyStatus {
    type Err = UnknownEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INCOMPLETE" => Ok(CompanyStatus::Incomplete),
            "PENDING" => Ok(CompanyStatus::Pending),
            "ACTIVE" => Ok(CompanyStatus::Active),
            "INACTIVE" => Ok(CompanyStatus::Inactive),
            "SUSPENDED" => Ok(CompanyStatus::Suspended),
            other => Err(UnknownEnumValue::new("company_status", other)),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: CompanyStatus,
    pub company_name: String,
    pub brand_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub phone_alt: Option<String>,
    pub nip: Option<String>,
    pub regon: Option<String>,
    pub street: Option<String>,
    pub building_no: Option<String>,
    pub apartment_no: Option<String>,
    pub city: Option<String>,
    pub zipcode: Option<String>,
    pub voivodeship: Option<String>,
    pub country_code: String,
    pub website: Option<String>,
    pub logo_path: Option<String>,
    pub meta: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}
