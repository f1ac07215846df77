//! Dataset size calculation.
//!
//! Sizes follow Ethash's growth schedule: the dataset starts at 1 GiB
//! and grows by 8 MiB per epoch, then shrinks in 256-byte steps until
//! the row count (`size / 128`) is prime. Computing the size instead
//! of shipping the precomputed table keeps arbitrary epochs in reach.

use crate::params;

/// Epoch a block number belongs to.
pub fn epoch_of_block(block_number: u64) -> u64 {
    block_number / params::EPOCH_LENGTH
}

/// Full size in bytes of the Ethash dataset for a block number.
pub fn dataset_size(block_number: u64) -> u64 {
    let epoch = epoch_of_block(block_number);
    let mix_bytes = params::MIX_BYTES as u64;
    let mut size = params::DATASET_BYTES_INIT + params::DATASET_BYTES_GROWTH * epoch - mix_bytes;
    while !is_prime(size / mix_bytes) {
        size -= 2 * mix_bytes;
    }
    size
}

/// Deterministic primality by trial division. Row counts stay below
/// 2^40, so the scan over odd divisors up to the square root is cheap.
fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3u64;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}
