use sha2::{Digest, Sha256};

use crate::chain::{Chain, Slot};

/// Computes the canonical structural hash of a chain as lowercase hex.
///
/// Two chains hash equal exactly when their sites, patterns, cursor, layers and
/// barrier positions are equal; the encoding does not depend on the codec format.
pub fn canonical_hash(chain: &Chain) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"qdyn-chain");
    hasher.update((chain.total_sites() as u64).to_le_bytes());
    hasher.update((chain.pattern_cursor() as u64).to_le_bytes());

    hasher.update((chain.patterns().len() as u64).to_le_bytes());
    for pattern in chain.patterns() {
        hasher.update((pattern.pairs().len() as u64).to_le_bytes());
        for &(control, target) in pattern.pairs() {
            hasher.update((control as u64).to_le_bytes());
            hasher.update((target as u64).to_le_bytes());
        }
    }

    hasher.update((chain.layers().len() as u64).to_le_bytes());
    for layer in chain.layers() {
        for slot in layer.slots() {
            match slot {
                Slot::Empty => hasher.update([0u8]),
                Slot::Gate(kind) => {
                    hasher.update([1u8]);
                    hasher.update(kind.label().as_bytes());
                }
                Slot::Marker(pattern) => {
                    hasher.update([2u8]);
                    hasher.update((*pattern as u64).to_le_bytes());
                }
            }
        }
    }

    update_slice(chain.barriers(), &mut hasher);
    format!("{:x}", hasher.finalize())
}

fn update_slice(values: &[usize], hasher: &mut Sha256) {
    hasher.update((values.len() as u64).to_le_bytes());
    for value in values {
        hasher.update((*value as u64).to_le_bytes());
    }
}
