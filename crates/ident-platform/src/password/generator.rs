//! Temporary password generation

use rand::distr::{Alphanumeric, Distribution};
use rand::seq::SliceRandom;
use rand::Rng;

const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";

pub trait PasswordGenerator: Send + Sync {
    fn generate(&self, length: usize) -> String;
}

/// Alphanumeric passwords holding at least one lowercase letter, one
/// uppercase letter and one digit. Lengths below 3 are raised to 3.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPasswordGenerator;

impl PasswordGenerator for RandomPasswordGenerator {
    fn generate(&self, length: usize) -> String {
        let mut rng = rand::rng();
        let length = length.max(3);

        let mut chars: Vec<u8> = [LOWER, UPPER, DIGITS]
            .iter()
            .map(|set| set[rng.random_range(0..set.len())])
            .collect();
        chars.extend(Alphanumeric.sample_iter(&mut rng).take(length - chars.len()));
        chars.shuffle(&mut rng);

        chars.into_iter().map(char::from).collect()
    }
}
