use rand::Rng;

pub const SHORT_KEY_LEN: usize = 10;
pub const SHORT_KEY_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

pub fn generate_short_key<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SHORT_KEY_LEN)
        .map(|_| SHORT_KEY_ALPHABET[rng.random_range(0..SHORT_KEY_ALPHABET.len())] as char)
        .collect()
}

pub fn short_link(public_base_url: &str, short_key: &str) -> String {
    format!("{}/e/{}", public_base_url.trim_end_matches('/'), short_key)
}

pub fn is_valid_short_key(key: &str) -> bool {
    key.len() == SHORT_KEY_LEN && key.bytes().all(|b| SHORT_KEY_ALPHABET.contains(&b))
}
