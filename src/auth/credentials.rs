use std::collections::HashMap;

use anyhow::anyhow;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Username to argon2 password hash. Plaintext passwords are dropped once hashed.
#[derive(Debug, Default)]
pub struct CredentialStore {
    users: HashMap<String, String>,
}

impl CredentialStore {
    pub fn from_plaintext<'a>(
        credentials: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> anyhow::Result<Self> {
        let argon2 = Argon2::default();
        let mut users = HashMap::new();
        for (username, password) in credentials {
            let salt = SaltString::generate(&mut OsRng);
            let hash = argon2
                .hash_password(password.as_bytes(), &salt)
                .map_err(|e| anyhow!("failed to hash password for {}: {}", username, e))?;
            users.insert(username.clone(), hash.to_string());
        }

        if users.is_empty() {
            log::warn!("no credentials configured, every login will be rejected");
        }
        Ok(Self { users })
    }

    pub fn is_valid(&self, username: &str, password: &str) -> bool {
        let Some(hash) = self.users.get(username) else {
            return false;
        };
        PasswordHash::new(hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
