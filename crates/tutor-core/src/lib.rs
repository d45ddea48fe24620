//! Core runtime for a rule-based tutoring assistant.
//!
//! The interesting piece is the non-repeating practice allocator in
//! [`allocator`]: every caller owns its [`allocator::AllocatorMemory`] and
//! passes it in and out of the [`tutor::Tutor`] and the [`ranker`] by value.

pub mod allocator;
pub mod bank;
pub mod catalog;
pub mod config;
pub mod mastery;
pub mod ranker;
pub mod session;
pub mod tutor;

/// Generate a random 128-bit identifier, hex encoded.
pub fn new_id() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let bytes: [u8; 16] = rng.gen();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id_is_32_hex_chars() {
        let id = new_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_new_id_is_unique() {
        assert_ne!(new_id(), new_id());
    }
}
