//! X25519 keypair generation.

use rand::rngs::OsRng;
use rand::RngCore;
use x25519_dalek::{PublicKey, StaticSecret};

use super::encode_key;

/// Failure to produce key material.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KeyError {
    #[error("secure randomness source failed: {0}")]
    Randomness(String),
}

/// A Curve25519 keypair (32-byte private scalar + 32-byte public key).
#[derive(Clone)]
pub struct Keypair {
    /// The private key bytes, as stored in a WireGuard config
    secret: [u8; 32],
    /// The derived public key bytes
    public: [u8; 32],
}

impl Keypair {
    /// Generates a new random keypair from the operating system RNG.
    #[inline]
    pub fn generate() -> Result<Self, KeyError> {
        let mut secret = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut secret)
            .map_err(|e| KeyError::Randomness(e.to_string()))?;
        Ok(Self::from_secret_bytes(secret))
    }

    /// Derives the keypair for an existing private key.
    pub fn from_secret_bytes(secret: [u8; 32]) -> Self {
        let public = PublicKey::from(&StaticSecret::from(secret));

        Self {
            secret,
            public: public.to_bytes(),
        }
    }

    /// Returns the private key bytes.
    pub fn private_key_bytes(&self) -> &[u8; 32] {
        &self.secret
    }

    /// Returns the public key bytes.
    #[inline]
    pub fn public_key_bytes(&self) -> &[u8; 32] {
        &self.public
    }

    /// Returns the private key as padded base64.
    pub fn private_key_b64(&self) -> String {
        encode_key(&self.secret)
    }

    /// Returns the public key as padded base64.
    #[inline]
    pub fn public_key_b64(&self) -> String {
        encode_key(&self.public)
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("public", &self.public_key_b64())
            .finish_non_exhaustive()
    }
}

/// Produces fresh keypairs for workers.
///
/// Implementations are shared by every worker thread, so they must either be
/// stateless or synchronize internally.
pub trait KeySource: Send + Sync {
    fn generate(&self) -> Result<Keypair, KeyError>;
}

/// Key source backed by the operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsKeySource;

impl KeySource for OsKeySource {
    #[inline]
    fn generate(&self) -> Result<Keypair, KeyError> {
        Keypair::generate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_generation() {
        let a = Keypair::generate().unwrap();
        let b = Keypair::generate().unwrap();
        assert_eq!(a.public_key_b64().len(), 44);
        assert_ne!(a.private_key_bytes(), b.private_key_bytes());
        assert_ne!(a.public_key_bytes(), b.public_key_bytes());
    }

    #[test]
    fn test_rfc7748_vector() {
        let secret: [u8; 32] = [
            0x77, 0x07, 0x6d, 0x0a, 0x73, 0x18, 0xa5, 0x7d, 0x3c, 0x16, 0xc1, 0x72, 0x51, 0xb2,
            0x66, 0x45, 0xdf, 0x4c, 0x2f, 0x87, 0xeb, 0xc0, 0x99, 0x2a, 0xb1, 0x77, 0xfb, 0xa5,
            0x1d, 0xb9, 0x2c, 0x2a,
        ];
        let keypair = Keypair::from_secret_bytes(secret);

        assert_eq!(
            keypair.private_key_b64(),
            "dwdtCnMYpX08FsFyUbJmRd9ML4frwJkqsXf7pR25LCo="
        );
        assert_eq!(
            keypair.public_key_b64(),
            "hSDwCYkwp1R0i33ctD73Wg2/Og0mOBr066SpjqqbTmo="
        );
    }

    #[test]
    fn test_os_key_source() {
        let source = OsKeySource;
        let keypair = source.generate().unwrap();
        let derived = Keypair::from_secret_bytes(*keypair.private_key_bytes());
        assert_eq!(derived.public_key_bytes(), keypair.public_key_bytes());
    }
}
