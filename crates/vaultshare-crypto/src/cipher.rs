//! AES-256-CBC cipher engine with PKCS7 padding.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::BLOCK_SIZE;
use crate::error::CryptoError;
use crate::keys::{EncryptionKey, InitVector, derive_key};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Output of a single encryption: ciphertext plus the IV it was made with.
#[derive(Debug, Clone)]
pub struct Encrypted {
    /// PKCS7-padded AES-256-CBC ciphertext.
    pub ciphertext: Vec<u8>,
    /// Fresh IV drawn for this encryption.
    pub iv: InitVector,
}

/// Encrypt `plaintext` under `key` with a freshly generated IV.
///
/// The working key is derived from `(key, iv)`, so encrypting the same
/// plaintext twice yields different ciphertexts.
pub fn encrypt(plaintext: &[u8], key: &EncryptionKey) -> Encrypted {
    let iv = InitVector::generate();
    let working = derive_key(key.as_bytes(), iv.as_bytes());
    let ciphertext = Aes256CbcEnc::new(working.as_bytes().into(), iv.as_bytes().into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);
    Encrypted { ciphertext, iv }
}

/// Decrypt `ciphertext` produced by [`encrypt`] with the same key and IV.
pub fn decrypt(
    ciphertext: &[u8],
    key: &EncryptionKey,
    iv: &InitVector,
) -> Result<Vec<u8>, CryptoError> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(CryptoError::InvalidCiphertextLength {
            len: ciphertext.len(),
        });
    }
    let working = derive_key(key.as_bytes(), iv.as_bytes());
    Aes256CbcDec::new(working.as_bytes().into(), iv.as_bytes().into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::InvalidPadding)
}

/// Decrypt using the base64 key and IV strings stored on a record.
pub fn decrypt_encoded(
    ciphertext: &[u8],
    encoded_key: &str,
    encoded_iv: &str,
) -> Result<Vec<u8>, CryptoError> {
    let key = EncryptionKey::from_encoded(encoded_key)?;
    let iv = InitVector::from_encoded(encoded_iv)?;
    decrypt(ciphertext, &key, &iv)
}
