//! Certificate code generation and validation.

use rand::Rng;

/// Alphabet for certificate codes. Excludes 0/O and 1/I so codes survive
/// being read aloud or retyped from a printout.
const CODE_ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Number of random characters in a code (grouped 4-4-4).
const CODE_LEN: usize = 12;

/// Generate a certificate code of the form `XXXX-XXXX-XXXX`.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut code = String::with_capacity(CODE_LEN + 2);
    for i in 0..CODE_LEN {
        if i > 0 && i % 4 == 0 {
            code.push('-');
        }
        let idx = rng.random_range(0..CODE_ALPHABET.len());
        code.push(CODE_ALPHABET[idx] as char);
    }
    code
}

/// Check that a string is a well-formed certificate code.
pub fn validate_code(code: &str) -> Result<(), String> {
    let groups: Vec<&str> = code.split('-').collect();
    let well_formed = groups.len() == 3
        && groups.iter().all(|g| {
            g.len() == 4 && g.bytes().all(|b| CODE_ALPHABET.contains(&b))
        });
    if well_formed {
        Ok(())
    } else {
        Err(format!("Invalid certificate code '{code}'"))
    }
}
