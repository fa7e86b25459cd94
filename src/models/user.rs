use serde::{Deserialize, Serialize};

/// A row of the flat user table backing the HTTP auth surface.
/// `password` holds the argon2 hash, never the plaintext.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub nip: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub bank_account: String,
}

/// API-facing view of a user with the password hash stripped.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub company_name: String,
    pub nip: String,
    pub address: String,
    pub phone: String,
    pub bank_account: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            company_name: user.company_name.clone(),
            nip: user.nip.clone(),
            address: user.address.clone(),
            phone: user.phone.clone(),
            bank_account: user.bank_account.clone(),
        }
    }
}

/// Partial update for a user profile. A new password is re-hashed
/// before it is stored.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub company_name: Option<String>,
    pub nip: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub bank_account: Option<String>,
}
