//! Random opaque tokens for session identifiers and `state` values.

use crate::Error;
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};

/// Generate `N` bytes from the OS RNG, encoded as unpadded base64url.
///
/// # Errors
/// Returns [`Error::SessionStore`] if the OS RNG is unavailable.
pub(crate) fn generate_opaque_token<const N: usize>() -> Result<String, Error> {
    let mut bytes = [0u8; N];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::SessionStore(format!("failed to generate random token: {e}")))?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}
