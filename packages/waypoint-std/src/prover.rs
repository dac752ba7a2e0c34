//! Proving-mechanism tags and the relay wire format.

use anchor_lang::prelude::*;
use derive_new::new;

use crate::Bytes32;

/// Which verification mechanism governs a reward. Selected per intent by
/// `Reward.prover`; dispatch is by tag, every mechanism shares the same
/// verify contract.
#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProverType {
    /// The creator or a trusted attestor vouches for fulfillment directly.
    Attest,
    /// Rollup output-root proof against the canonical output registry.
    Bedrock,
    /// Fault-proof dispute game resolved on the settlement layer.
    Cannon,
    /// Optimistic-chain assertion with a confirmed send root.
    Nitro,
    /// Generic cross-chain message relayed by a messaging endpoint.
    Relay,
}

impl ProverType {
    /// Stable one-byte tag for PDA derivations. Claim records are keyed per
    /// `(intent_hash, mechanism)`, so a mechanism can only ever write or
    /// read its own record.
    pub fn seed(&self) -> [u8; 1] {
        [match self {
            ProverType::Attest => 0,
            ProverType::Bedrock => 1,
            ProverType::Cannon => 2,
            ProverType::Nitro => 3,
            ProverType::Relay => 4,
        }]
    }
}

/// Body of a relayed fulfillment message: intent hashes paired index-aligned
/// with the claimants that fulfilled them.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq, new)]
pub struct RelayMessage {
    pub intent_hashes: Vec<Bytes32>,
    pub claimants: Vec<Bytes32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayMessageError {
    Malformed,
    /// The two parallel lists differ in length. Rejected wholesale, never
    /// truncated.
    LengthMismatch,
}

impl RelayMessage {
    pub fn decode(payload: &[u8]) -> std::result::Result<Self, RelayMessageError> {
        let message =
            Self::try_from_slice(payload).map_err(|_| RelayMessageError::Malformed)?;

        if message.intent_hashes.len() != message.claimants.len() {
            return Err(RelayMessageError::LengthMismatch);
        }

        Ok(message)
    }

    pub fn encode(&self) -> std::result::Result<Vec<u8>, RelayMessageError> {
        self.try_to_vec().map_err(|_| RelayMessageError::Malformed)
    }

    pub fn pairs(&self) -> impl Iterator<Item = (Bytes32, Pubkey)> + '_ {
        self.intent_hashes
            .iter()
            .zip(&self.claimants)
            .map(|(hash, claimant)| (*hash, Pubkey::from(*claimant)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prover_seeds_are_distinct() {
        let seeds = [
            ProverType::Attest,
            ProverType::Bedrock,
            ProverType::Cannon,
            ProverType::Nitro,
            ProverType::Relay,
        ]
        .map(|prover| prover.seed());

        for (i, a) in seeds.iter().enumerate() {
            for b in &seeds[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn relay_message_round_trip() {
        let message = RelayMessage::new(
            vec![[1u8; 32].into(), [2u8; 32].into()],
            vec![Pubkey::new_unique().into(), Pubkey::new_unique().into()],
        );

        let decoded = RelayMessage::decode(&message.encode().unwrap()).unwrap();

        assert_eq!(decoded, message);
        assert_eq!(decoded.pairs().count(), 2);
    }

    #[test]
    fn relay_message_length_mismatch_rejected() {
        let message = RelayMessage::new(
            vec![[1u8; 32].into(), [2u8; 32].into()],
            vec![[3u8; 32].into(), [4u8; 32].into(), [5u8; 32].into()],
        );

        let result = RelayMessage::decode(&message.encode().unwrap());

        assert_eq!(result, Err(RelayMessageError::LengthMismatch));
    }

    #[test]
    fn relay_message_garbage_rejected() {
        assert_eq!(
            RelayMessage::decode(&[0xff, 0x01]),
            Err(RelayMessageError::Malformed)
        );
    }

    #[test]
    fn relay_message_pairs_are_index_aligned() {
        let claimant_a = Pubkey::new_unique();
        let claimant_b = Pubkey::new_unique();
        let message = RelayMessage::new(
            vec![[1u8; 32].into(), [2u8; 32].into()],
            vec![claimant_a.into(), claimant_b.into()],
        );

        let pairs: Vec<_> = message.pairs().collect();

        assert_eq!(pairs[0], ([1u8; 32].into(), claimant_a));
        assert_eq!(pairs[1], ([2u8; 32].into(), claimant_b));
    }
}
