//! Proof verification, polymorphic over five attestation mechanisms.
//!
//! Every mechanism converges on the same contract: authenticate the evidence
//! and produce the claimant that fulfilled the intent. Dispatch is by the
//! `Reward.prover` tag; a mechanism rejects evidence it does not govern.
//! Relay claims take a separate delivery path (`handle`) because they arrive
//! as messages, not as caller-supplied evidence.

use anchor_lang::prelude::*;
use waypoint_std::prover::ProverType;
use waypoint_std::Bytes32;

use crate::instructions::WaypointError;
use crate::types::keccak256;

pub mod attest;
pub mod bedrock;
pub mod cannon;
pub mod nitro;

/// Domain separator for fulfillment leaves committed on the destination
/// chain.
const FULFILLMENT_LEAF_TAG: &[u8] = b"fulfilled";

/// Mechanism-specific proof material supplied to `prove`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub enum Evidence {
    /// Direct attestation by the creator or a trusted attestor.
    Attestation { claimant: Pubkey },
    /// Rollup output-root proof: preimage of a registered output root plus
    /// inclusion of the fulfillment leaf under its state root.
    OutputRoot {
        output_index: u64,
        preimage: OutputRootPreimage,
        inclusion: InclusionProof,
    },
    /// Fault-proof game resolved on the settlement layer.
    FaultGame {
        game_id: Bytes32,
        inclusion: InclusionProof,
    },
    /// Confirmed optimistic-chain assertion node.
    Assertion {
        node: u64,
        inclusion: InclusionProof,
    },
}

impl Evidence {
    pub fn mechanism(&self) -> ProverType {
        match self {
            Evidence::Attestation { .. } => ProverType::Attest,
            Evidence::OutputRoot { .. } => ProverType::Bedrock,
            Evidence::FaultGame { .. } => ProverType::Cannon,
            Evidence::Assertion { .. } => ProverType::Nitro,
        }
    }

    /// The evidence must be of the mechanism the reward designates; anything
    /// else is an unauthorized proof source, not a malformed proof.
    pub fn require_mechanism(&self, designated: ProverType) -> Result<()> {
        require!(
            self.mechanism() == designated,
            WaypointError::UnauthorizedProofSource
        );

        Ok(())
    }
}

/// Preimage of a bedrock-style output root:
/// `keccak(version || state_root || message_passer_root || block_hash)`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug)]
pub struct OutputRootPreimage {
    pub version: Bytes32,
    pub state_root: Bytes32,
    pub message_passer_root: Bytes32,
    pub block_hash: Bytes32,
}

impl OutputRootPreimage {
    pub fn output_root(&self) -> Bytes32 {
        keccak256(&[
            self.version.as_ref(),
            self.state_root.as_ref(),
            self.message_passer_root.as_ref(),
            self.block_hash.as_ref(),
        ])
    }
}

/// Keccak Merkle path from the fulfillment leaf up to a committed root.
/// `index` carries the leaf position; its bits select the hashing order at
/// each level.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct InclusionProof {
    pub claimant: Pubkey,
    pub index: u64,
    pub siblings: Vec<Bytes32>,
}

impl InclusionProof {
    pub fn leaf(&self, intent_hash: &Bytes32) -> Bytes32 {
        keccak256(&[
            FULFILLMENT_LEAF_TAG,
            intent_hash.as_ref(),
            self.claimant.as_ref(),
        ])
    }

    pub fn fold(&self, intent_hash: &Bytes32) -> Bytes32 {
        let mut node = self.leaf(intent_hash);
        let mut index = self.index;

        for sibling in &self.siblings {
            node = if index & 1 == 0 {
                keccak256(&[node.as_ref(), sibling.as_ref()])
            } else {
                keccak256(&[sibling.as_ref(), node.as_ref()])
            };
            index >>= 1;
        }

        node
    }

    /// Checks the path ends at `root`.
    pub fn verify(&self, intent_hash: &Bytes32, root: &Bytes32) -> Result<()> {
        require!(
            self.fold(intent_hash) == *root,
            WaypointError::InvalidInclusionProof
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proof(claimant: Pubkey, index: u64, siblings: Vec<Bytes32>) -> InclusionProof {
        InclusionProof {
            claimant,
            index,
            siblings,
        }
    }

    #[test]
    fn leaf_binds_intent_and_claimant() {
        let hash: Bytes32 = [1u8; 32].into();
        let claimant = Pubkey::new_unique();
        let leaf = proof(claimant, 0, vec![]).leaf(&hash);

        assert_ne!(leaf, proof(claimant, 0, vec![]).leaf(&[2u8; 32].into()));
        assert_ne!(leaf, proof(Pubkey::new_unique(), 0, vec![]).leaf(&hash));
    }

    #[test]
    fn two_leaf_tree_verifies_both_positions() {
        let hash_a: Bytes32 = [1u8; 32].into();
        let hash_b: Bytes32 = [2u8; 32].into();
        let claimant = Pubkey::new_unique();

        let left = proof(claimant, 0, vec![]);
        let right = proof(claimant, 1, vec![]);
        let leaf_a = left.leaf(&hash_a);
        let leaf_b = right.leaf(&hash_b);
        let root = keccak256(&[leaf_a.as_ref(), leaf_b.as_ref()]);

        proof(claimant, 0, vec![leaf_b])
            .verify(&hash_a, &root)
            .unwrap();
        proof(claimant, 1, vec![leaf_a])
            .verify(&hash_b, &root)
            .unwrap();
    }

    #[test]
    fn wrong_position_fails_verification() {
        let hash_a: Bytes32 = [1u8; 32].into();
        let hash_b: Bytes32 = [2u8; 32].into();
        let claimant = Pubkey::new_unique();

        let leaf_a = proof(claimant, 0, vec![]).leaf(&hash_a);
        let leaf_b = proof(claimant, 1, vec![]).leaf(&hash_b);
        let root = keccak256(&[leaf_a.as_ref(), leaf_b.as_ref()]);

        // correct siblings, wrong index
        assert!(proof(claimant, 1, vec![leaf_b])
            .verify(&hash_a, &root)
            .is_err());
    }

    #[test]
    fn output_root_preimage_is_deterministic() {
        let preimage = OutputRootPreimage {
            version: Bytes32::ZERO,
            state_root: [1u8; 32].into(),
            message_passer_root: [2u8; 32].into(),
            block_hash: [3u8; 32].into(),
        };

        assert_eq!(preimage.output_root(), preimage.output_root());

        let mut tampered = preimage;
        tampered.state_root = [9u8; 32].into();
        assert_ne!(preimage.output_root(), tampered.output_root());
    }

    #[test]
    fn evidence_mechanism_tags() {
        let attestation = Evidence::Attestation {
            claimant: Pubkey::new_unique(),
        };

        assert_eq!(attestation.mechanism(), ProverType::Attest);
        assert!(attestation.require_mechanism(ProverType::Attest).is_ok());
        assert!(attestation.require_mechanism(ProverType::Bedrock).is_err());
    }
}
