use serde::{Deserialize, Serialize};

pub type ClientId = i64;

/// A bank client. The identifier is assigned by the caller (national ID number).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub phone: i64,
    pub email: String,
}

impl Client {
    pub fn new(
        id: ClientId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        address: impl Into<String>,
        phone: i64,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            address: address.into(),
            phone,
            email: email.into().trim().to_string(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn has_valid_email(&self) -> bool {
        is_valid_email(&self.email)
    }
}

/// An email is accepted when it has exactly one `@` and a `.` somewhere in the domain part.
pub fn is_valid_email(email: &str) -> bool {
    let mut parts = email.trim().split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(domain), None) => domain.contains('.'),
        _ => false,
    }
}
