use crate::error::Error;

/// Hashes a password with bcrypt, using a fresh random salt on every call.
pub fn hash_password(plaintext: &str, cost: u32) -> Result<String, Error> {
    Ok(bcrypt::hash(plaintext, cost)?)
}

pub fn verify_password(plaintext: &str, hash: &str) -> Result<bool, Error> {
    Ok(bcrypt::verify(plaintext, hash)?)
}
