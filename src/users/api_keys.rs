use rand::Rng;

/// Random bytes per key
const API_KEY_BYTES: usize = 32;

/// 32 random bytes, hex encoded.
pub fn generate_api_key() -> String {
    let mut bytes = [0u8; API_KEY_BYTES];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}
