use rand::Rng;

use super::models::RoomCode;

const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Trait for generating candidate room codes
pub trait RoomCodeGenerator: Send + Sync {
    fn generate(&self) -> RoomCode;
}

/// Base-36 generator producing short uppercase codes
pub struct RandomCodeGenerator {
    length: usize,
}

impl RandomCodeGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Default for RandomCodeGenerator {
    fn default() -> Self {
        Self::new(RoomCode::GENERATED_LEN)
    }
}

impl RoomCodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> RoomCode {
        let mut rng = rand::rng();
        let raw: String = (0..self.length)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();

        RoomCode::from_generated(raw)
    }
}
