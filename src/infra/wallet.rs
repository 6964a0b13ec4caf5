//! Wallet implementations.

use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};
use secrecy::{ExposeSecret, SecretString};

use crate::domain::{SdkError, Wallet, WalletError};

/// Decode a Base58 secret key (32-byte seed or 64-byte Solana keypair)
pub fn signing_key_from_base58(secret: &SecretString) -> Result<SigningKey, WalletError> {
    let key_bytes = bs58::decode(secret.expose_secret())
        .into_vec()
        .map_err(|e| WalletError::InvalidKey(e.to_string()))?;

    // Solana keypair format: first 32 bytes are the secret key
    let key_array: [u8; 32] = match key_bytes.len() {
        64 => key_bytes[..32]
            .try_into()
            .map_err(|_| WalletError::InvalidKey("Invalid keypair format".to_string()))?,
        32 => key_bytes
            .try_into()
            .map_err(|_| WalletError::InvalidKey("Invalid seed format".to_string()))?,
        len => {
            return Err(WalletError::InvalidKey(format!(
                "Key must be 32 or 64 bytes, got {}",
                len
            )));
        }
    };

    Ok(SigningKey::from_bytes(&key_array))
}

/// Wallet holding an ed25519 keypair
pub struct KeypairWallet {
    signing_key: SigningKey,
}

impl KeypairWallet {
    #[must_use]
    pub fn new(signing_key: SigningKey) -> Self {
        Self { signing_key }
    }

    /// Fresh random keypair
    #[must_use]
    pub fn generate() -> Self {
        Self::new(SigningKey::generate(&mut rand::rngs::OsRng))
    }

    pub fn from_base58(secret: &SecretString) -> Result<Self, WalletError> {
        signing_key_from_base58(secret).map(Self::new)
    }

    pub fn address(&self) -> String {
        bs58::encode(self.signing_key.verifying_key().as_bytes()).into_string()
    }
}

#[async_trait]
impl Wallet for KeypairWallet {
    fn public_key(&self) -> Option<String> {
        Some(self.address())
    }

    fn can_sign(&self) -> bool {
        true
    }

    async fn sign_message(&self, message: &[u8]) -> Result<String, SdkError> {
        let signature = self.signing_key.sign(message);
        Ok(bs58::encode(signature.to_bytes()).into_string())
    }
}

/// Public key only; cannot sign
#[derive(Debug, Clone, Default)]
pub struct WatchOnlyWallet {
    public_key: Option<String>,
}

impl WatchOnlyWallet {
    #[must_use]
    pub fn new(public_key: impl Into<String>) -> Self {
        Self {
            public_key: Some(public_key.into()),
        }
    }

    #[must_use]
    pub fn disconnected() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Wallet for WatchOnlyWallet {
    fn public_key(&self) -> Option<String> {
        self.public_key.clone()
    }
}
