//! Member accounts and their password-protected private keys.
//!
//! A member's private key is stored encrypted under a key derived from the
//! member's passphrase and salt. The plaintext private key only exists
//! inside [`Member::unlock`] and the values it returns, all of which wipe
//! their bytes on drop.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use trustcircle_core::{
    cipher, CryptoKey, EncryptedData, Error, KeyPair, MemberId, PasswordKdf, PrivateKey,
    PublicKey, Result, Salt, Settings,
};

/// A member account as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,

    /// Unique account name.
    pub name: String,

    /// Salt for the password-derived key.
    pub salt: Salt,

    /// Private key encrypted under the password-derived key. Its salt is the IV.
    pub private_key: EncryptedData,

    /// Base64-armored public key.
    pub public_key: String,

    /// Creation time (Unix ms), assigned by the store.
    pub added: i64,

    /// Last modification time (Unix ms), assigned by the store.
    pub altered: i64,
}

impl Member {
    /// Register a new member: generate a key pair and protect it with
    /// `passphrase`.
    pub fn register(
        name: impl Into<String>,
        passphrase: &str,
        settings: &Settings,
        kdf: &PasswordKdf,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::verification("member name must not be empty"));
        }
        settings.check_passphrase(passphrase)?;

        let keypair = KeyPair::generate();
        let salt = Salt::generate();
        let private_key = protect(keypair.private_key(), passphrase, &salt, kdf)?;

        tracing::debug!(member = %name, "registered member");

        Ok(Self {
            id: MemberId::generate(),
            name,
            salt,
            private_key,
            public_key: keypair.public_key().to_armored(),
            added: 0,
            altered: 0,
        })
    }

    /// Parse the member's public key.
    pub fn public_key(&self) -> Result<PublicKey> {
        PublicKey::from_armored(&self.public_key)
    }

    /// Decrypt the member's private key.
    ///
    /// A wrong passphrase fails with `AuthenticationWarning`. A private key
    /// that decrypts but does not match the stored public key fails with
    /// `IntegrityError`.
    pub fn unlock(&self, passphrase: &str, kdf: &PasswordKdf) -> Result<PrivateKey> {
        let password_key = kdf.derive(passphrase, &self.salt)?;

        let seed = Zeroizing::new(
            cipher::decrypt(
                &password_key,
                &self.private_key.salt,
                &self.private_key.ciphertext,
            )
            .map_err(|_| {
                tracing::debug!(member = %self.id, "private key unlock failed");
                Error::authentication()
            })?,
        );

        let private = PrivateKey::from_slice(&seed)
            .map_err(|_| Error::corrupted("stored private key is malformed"))?;

        if private.public_key().to_armored() != self.public_key {
            return Err(Error::corrupted("stored private key does not match public key"));
        }

        Ok(private)
    }

    /// Re-protect the private key under a new passphrase.
    ///
    /// A fresh member salt and IV are drawn. The key pair is unchanged, so
    /// every sealed circle key stays valid.
    pub fn change_passphrase(
        &mut self,
        old: &str,
        new: &str,
        settings: &Settings,
        kdf: &PasswordKdf,
    ) -> Result<()> {
        settings.check_passphrase(new)?;
        let private = self.unlock(old, kdf)?;

        let salt = Salt::generate();
        let protected = protect(&private, new, &salt, kdf)?;
        drop(private);

        self.salt = salt;
        self.private_key = protected;

        tracing::debug!(member = %self.id, "passphrase changed");
        Ok(())
    }
}

fn protect(
    private: &PrivateKey,
    passphrase: &str,
    salt: &Salt,
    kdf: &PasswordKdf,
) -> Result<EncryptedData> {
    let password_key = kdf.derive(passphrase, salt)?;
    EncryptedData::encrypt(private.encoded(), &password_key)
}
