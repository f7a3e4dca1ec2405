use rand::Rng;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const CODE_LEN: usize = 8;

/// Issue a fresh confirmation code: 8 uppercase alphanumeric characters,
/// drawn independently of any booking content. Ambiguous glyphs (I, O, 0, 1)
/// are left out of the alphabet since the code is read back at check-in.
/// Uniqueness is enforced by the store; a collision there is handled by
/// regenerating once, not treated as fatal.
pub fn issue_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}
