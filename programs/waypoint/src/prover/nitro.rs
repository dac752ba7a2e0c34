use anchor_lang::prelude::*;
use waypoint_std::Bytes32;

use crate::instructions::WaypointError;
use crate::prover::InclusionProof;
use crate::state::AssertionRecord;

/// Optimistic-chain proof: inclusion under the send root of a confirmed
/// assertion node.
pub fn verify(
    record: &AssertionRecord,
    intent_hash: &Bytes32,
    inclusion: &InclusionProof,
) -> Result<Pubkey> {
    require!(record.confirmed, WaypointError::AssertionNotConfirmed);
    inclusion.verify(intent_hash, &record.send_root)?;

    Ok(inclusion.claimant)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmed_assertion_releases_claimant() {
        let intent_hash: Bytes32 = [1u8; 32].into();
        let claimant = Pubkey::new_unique();
        let inclusion = InclusionProof {
            claimant,
            index: 0,
            siblings: vec![],
        };
        let record = AssertionRecord::new(3, inclusion.fold(&intent_hash), true);

        assert_eq!(verify(&record, &intent_hash, &inclusion).unwrap(), claimant);
    }

    #[test]
    fn unconfirmed_assertion_is_rejected() {
        let intent_hash: Bytes32 = [1u8; 32].into();
        let inclusion = InclusionProof {
            claimant: Pubkey::new_unique(),
            index: 0,
            siblings: vec![],
        };
        let record = AssertionRecord::new(3, inclusion.fold(&intent_hash), false);

        assert!(verify(&record, &intent_hash, &inclusion).is_err());
    }

    #[test]
    fn inclusion_under_wrong_root_is_rejected() {
        let intent_hash: Bytes32 = [1u8; 32].into();
        let inclusion = InclusionProof {
            claimant: Pubkey::new_unique(),
            index: 0,
            siblings: vec![],
        };
        let record = AssertionRecord::new(3, [9u8; 32].into(), true);

        assert!(verify(&record, &intent_hash, &inclusion).is_err());
    }
}
