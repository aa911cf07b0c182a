//! Small free-standing helpers: id generation and webhook signature math.

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

/// Hex string of `n_bytes` random bytes from the OS RNG.
pub fn random_hex(n_bytes: usize) -> String {
    let mut buf = vec![0u8; n_bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    buf.iter().map(|b| format!("{b:02x}")).collect()
}

/// Public order ids are short, opaque, and unguessable. They are shown to buyers, so keep them friendly.
pub fn new_order_id() -> String {
    format!("ord-{}", random_hex(6))
}

/// Correlation tokens bind an external payment event to a local order. 128 bits of randomness; for the unsigned
/// mobile-money callback this unguessability is the only gate.
pub fn new_correlation_token() -> String {
    random_hex(16)
}

/// HMAC-SHA256 over the raw request body, base64-encoded. This is the signature scheme the card processor uses on
/// its webhooks.
pub fn calculate_hmac(secret: &str, body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(body);
    base64::encode(mac.finalize().into_bytes())
}

/// Constant-time byte comparison for signatures and admin tokens.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
