use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::{PublicUser, User, UserPatch};
use crate::persist::PersistenceAdapter;

pub const USERS_KEY: &str = "users";

/// Registration payload; `name`, `email` and `password` are required.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub nip: String,
    #[serde(default)]
    pub address: String,
}

/// The flat user table behind the auth endpoints. Passwords are stored as
/// argon2 hashes; the table persists as one JSON array through the same
/// adapter as the record collections.
pub struct UserStore {
    adapter: Arc<dyn PersistenceAdapter>,
    users: Vec<User>,
}

impl UserStore {
    pub fn open(adapter: Arc<dyn PersistenceAdapter>) -> Result<Self> {
        let users = match adapter.load(USERS_KEY)? {
            Some(bytes) => serde_json::from_slice(&bytes)?,
            None => Vec::new(),
        };
        Ok(Self { adapter, users })
    }

    pub fn by_id(&self, id: u64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn register(&mut self, reg: Registration) -> Result<PublicUser> {
        if reg.name.trim().is_empty() || reg.email.trim().is_empty() || reg.password.is_empty() {
            return Err(Error::Validation("missing required fields".into()));
        }
        if self.users.iter().any(|u| u.email == reg.email) {
            return Err(Error::Duplicate(reg.email));
        }

        let user = User {
            id: self.users.iter().map(|u| u.id).max().unwrap_or(0) + 1,
            name: reg.name,
            email: reg.email,
            password: hash_password(&reg.password)?,
            company_name: reg.company_name,
            nip: reg.nip,
            address: reg.address,
            phone: String::new(),
            bank_account: String::new(),
        };
        let public = PublicUser::from(&user);
        self.users.push(user);
        self.persist();

        Ok(public)
    }

    /// Check credentials. Unknown e-mail and wrong password are the same
    /// error, so the response does not leak which accounts exist.
    pub fn login(&self, email: &str, password: &str) -> Result<PublicUser> {
        let user = self
            .users
            .iter()
            .find(|u| u.email == email)
            .ok_or(Error::Unauthorized)?;
        if !verify_password(password, &user.password)? {
            return Err(Error::Unauthorized);
        }
        Ok(PublicUser::from(user))
    }

    pub fn update(&mut self, id: u64, patch: UserPatch) -> Result<PublicUser> {
        // Hash outside the borrow of the user row
        let new_hash = match &patch.password {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        let user = self
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| Error::not_found("user", &id.to_string()))?;

        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(hash) = new_hash {
            user.password = hash;
        }
        if let Some(company_name) = patch.company_name {
            user.company_name = company_name;
        }
        if let Some(nip) = patch.nip {
            user.nip = nip;
        }
        if let Some(address) = patch.address {
            user.address = address;
        }
        if let Some(phone) = patch.phone {
            user.phone = phone;
        }
        if let Some(bank_account) = patch.bank_account {
            user.bank_account = bank_account;
        }
        let public = PublicUser::from(&*user);

        self.persist();
        Ok(public)
    }

    fn persist(&self) {
        let bytes = match serde_json::to_vec_pretty(&self.users) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(%err, "failed to serialize user table");
                return;
            }
        };
        if let Err(err) = self.adapter.save(USERS_KEY, &bytes) {
            tracing::warn!(%err, "failed to persist user table");
        }
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| Error::Internal(format!("password hashing failed: {err}")))
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|err| Error::Internal(format!("stored password hash is invalid: {err}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryAdapter;

    fn registration(email: &str) -> Registration {
        Registration {
            name: "Fachowiec".into(),
            email: email.into(),
            password: "sekret123".into(),
            ..Default::default()
        }
    }

    #[test]
    fn register_then_login() {
        let mut users = UserStore::open(Arc::new(MemoryAdapter::new())).unwrap();
        let created = users.register(registration("jan@example.com")).unwrap();
        assert_eq!(created.id, 1);

        let logged_in = users.login("jan@example.com", "sekret123").unwrap();
        assert_eq!(logged_in.email, "jan@example.com");
    }

    #[test]
    fn wrong_password_is_unauthorized() {
        let mut users = UserStore::open(Arc::new(MemoryAdapter::new())).unwrap();
        users.register(registration("jan@example.com")).unwrap();
        let err = users.login("jan@example.com", "zle-haslo").unwrap_err();
        assert!(matches!(err, Error::Unauthorized));
    }

    #[test]
    fn duplicate_email_is_rejected_without_mutation() {
        let mut users = UserStore::open(Arc::new(MemoryAdapter::new())).unwrap();
        users.register(registration("jan@example.com")).unwrap();
        let err = users.register(registration("jan@example.com")).unwrap_err();
        assert!(matches!(err, Error::Duplicate(_)));
        assert!(users.by_id(2).is_none());
    }

    #[test]
    fn missing_fields_fail_validation() {
        let mut users = UserStore::open(Arc::new(MemoryAdapter::new())).unwrap();
        let err = users
            .register(Registration {
                email: "jan@example.com".into(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn password_update_rehashes() {
        let mut users = UserStore::open(Arc::new(MemoryAdapter::new())).unwrap();
        let created = users.register(registration("jan@example.com")).unwrap();

        users
            .update(
                created.id,
                UserPatch {
                    password: Some("nowe-haslo".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(users.login("jan@example.com", "sekret123").is_err());
        assert!(users.login("jan@example.com", "nowe-haslo").is_ok());
    }
}
