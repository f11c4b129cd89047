//! Sorted-pair keccak merkle tree, compatible with OpenZeppelin's
//! `MerkleProof.verify`.

use alloy_primitives::{keccak256, B256};

fn hash_pair(a: B256, b: B256) -> B256 {
    if a <= b {
        keccak256([a.as_slice(), b.as_slice()].concat())
    } else {
        keccak256([b.as_slice(), a.as_slice()].concat())
    }
}

pub struct MerkleTree {
    /// `layers[0]` are the sorted leaves, the last layer is the root.
    layers: Vec<Vec<B256>>,
}

impl MerkleTree {
    pub fn new(mut leaves: Vec<B256>) -> Self {
        leaves.sort();
        let mut layers = vec![leaves];
        while layers.last().map_or(false, |l| l.len() > 1) {
            let prev = &layers[layers.len() - 1];
            // An odd node is promoted unchanged.
            let next = prev
                .chunks(2)
                .map(|pair| match pair.get(1) {
                    Some(b) => hash_pair(pair[0], *b),
                    None => pair[0],
                })
                .collect();
            layers.push(next);
        }
        Self { layers }
    }

    /// Zero for an empty tree.
    pub fn root(&self) -> B256 {
        self.layers
            .last()
            .and_then(|l| l.first())
            .copied()
            .unwrap_or(B256::ZERO)
    }

    pub fn proof(&self, leaf: B256) -> Option<Vec<B256>> {
        let mut index = self.layers.first()?.iter().position(|l| *l == leaf)?;
        let mut proof = Vec::new();
        for layer in &self.layers[..self.layers.len() - 1] {
            let sibling = index ^ 1;
            if let Some(node) = layer.get(sibling) {
                proof.push(*node);
            }
            index /= 2;
        }
        Some(proof)
    }
}

pub fn verify(proof: &[B256], root: B256, leaf: B256) -> bool {
    proof.iter().fold(leaf, |hash, p| hash_pair(hash, *p)) == root
}
