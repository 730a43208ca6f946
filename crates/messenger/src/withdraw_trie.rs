//! Inclusion verification against a committed withdraw trie root.
//!
//! The trie itself is built by the L2 execution client; only inclusion is checked here.

use alloy_primitives::{keccak256, B256};

/// Verifies the inclusion of `leaf_hash` at `leaf_index` under `root`.
///
/// The proof lists the sibling hash at each level from the leaf up. The bits of `leaf_index`
/// select the concatenation order: a zero bit places the running hash on the left.
pub fn verify_merkle_proof(root: B256, leaf_hash: B256, leaf_index: u64, proof: &[B256]) -> bool {
    let mut hash = leaf_hash;
    let mut index = leaf_index;

    for sibling in proof {
        hash = if index & 1 == 0 {
            hash_pair(&hash, sibling)
        } else {
            hash_pair(sibling, &hash)
        };
        index >>= 1;
    }

    hash == root
}

fn hash_pair(left: &B256, right: &B256) -> B256 {
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(left.as_slice());
    buf[32..].copy_from_slice(right.as_slice());
    keccak256(buf)
}

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils {
    use super::hash_pair;

    use alloy_primitives::B256;

    /// Builds a balanced keccak merkle tree over the leaves, padded with zero hashes, and
    /// returns the root along with one sibling proof per original leaf.
    pub fn build_withdraw_trie(leaves: &[B256]) -> (B256, Vec<Vec<B256>>) {
        let depth = leaves.len().next_power_of_two().trailing_zeros().max(1) as usize;
        let width = 1usize << depth;

        let mut level: Vec<B256> = leaves.to_vec();
        level.resize(width, B256::ZERO);

        let mut proofs: Vec<Vec<B256>> = vec![Vec::with_capacity(depth); leaves.len()];
        for _ in 0..depth {
            for (leaf, proof) in proofs.iter_mut().enumerate() {
                let position = leaf >> proof.len();
                proof.push(level[position ^ 1]);
            }
            level = level.chunks(2).map(|pair| hash_pair(&pair[0], &pair[1])).collect();
        }

        (level[0], proofs)
    }
}
