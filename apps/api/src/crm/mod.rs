// Client, user, package, and contract management for the agency admin.

pub mod clients;
pub mod contracts;
pub mod handlers;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    Prospect,
    Active,
    Paused,
    Churned,
}

impl ClientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Prospect => "prospect",
            ClientStatus::Active => "active",
            ClientStatus::Paused => "paused",
            ClientStatus::Churned => "churned",
        }
    }
}

impl FromStr for ClientStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prospect" => Ok(ClientStatus::Prospect),
            "active" => Ok(ClientStatus::Active),
            "paused" => Ok(ClientStatus::Paused),
            "churned" => Ok(ClientStatus::Churned),
            other => Err(AppError::Validation(format!(
                "Unknown client status '{other}'"
            ))),
        }
    }
}
