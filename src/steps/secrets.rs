//! Random secrets for generated configuration

use rand::RngCore;

/// Hex-encoded random token of `bytes` bytes (`2 * bytes` characters)
pub fn token_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}
