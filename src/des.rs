//! VNC authentication's DES challenge/response.
//!
//! The RFB spec reuses DES in a way no other protocol does: each key byte has its
//! bits reversed before it is used, a quirk inherited from the original AT&T VNC
//! implementation and preserved by every server since.

use des::cipher::generic_array::GenericArray;
use des::cipher::{BlockEncrypt, KeyInit};
use des::Des;

/// Bit-reverses a password into a DES key the way RFB requires, e.g. `0x01` becomes
/// `0x80`. Passwords longer than 8 bytes are truncated; shorter ones are zero-padded.
fn vnc_key(password: &[u8]) -> [u8; 8] {
    let mut key = [0u8; 8];
    for (i, slot) in key.iter_mut().enumerate() {
        let byte = password.get(i).copied().unwrap_or(0);
        *slot = byte.reverse_bits();
    }
    key
}

/// Encrypts a 16-byte server challenge with `password` into the 16-byte response VNC
/// authentication expects: two independent 8-byte ECB blocks under the same key.
pub fn encrypt_challenge(password: &[u8], challenge: &[u8; 16]) -> [u8; 16] {
    let key = vnc_key(password);
    let cipher = Des::new_from_slice(&key).expect("DES key is always exactly 8 bytes");

    let mut response = [0u8; 16];
    for (chunk_in, chunk_out) in challenge.chunks_exact(8).zip(response.chunks_exact_mut(8)) {
        let mut block = GenericArray::clone_from_slice(chunk_in);
        cipher.encrypt_block(&mut block);
        chunk_out.copy_from_slice(&block);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverses_bits_of_each_key_byte() {
        let key = vnc_key(b"pass");
        // 'p' = 0x70 = 0b0111_0000 -> reversed = 0b0000_1110 = 0x0e
        assert_eq!(key[0], 0x70u8.reverse_bits());
        // Unset bytes beyond the password length stay zero either way.
        assert_eq!(key[4], 0);
    }

    #[test]
    fn single_reversal_is_not_its_own_inverse_in_general() {
        // 0x01 reversed is 0x80, not 0x01: reverse_bits is an involution only for
        // byte values that are themselves palindromic in binary.
        assert_eq!(0x01u8.reverse_bits(), 0x80);
        assert_eq!(0x80u8.reverse_bits(), 0x01);
    }

    #[test]
    fn encrypts_zero_challenge_deterministically() {
        let challenge = [0u8; 16];
        let response = encrypt_challenge(b"pass", &challenge);
        // DES-ECB on an all-zero plaintext under the same key twice yields identical
        // 8-byte halves.
        assert_eq!(&response[0..8], &response[8..16]);
        assert_ne!(response, [0u8; 16]);
    }

    #[test]
    fn different_passwords_yield_different_responses() {
        let challenge = [0x42u8; 16];
        let a = encrypt_challenge(b"password", &challenge);
        let b = encrypt_challenge(b"drowssap", &challenge);
        assert_ne!(a, b);
    }
}
