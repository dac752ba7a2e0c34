use anchor_lang::prelude::*;
use waypoint_std::Bytes32;

use crate::instructions::WaypointError;
use crate::prover::InclusionProof;
use crate::state::{GameOutcome, GameRecord};

/// Fault-proof game: finality comes from a dispute game resolved in favor of
/// the root claim, not from a directly published output root.
pub fn verify(
    record: &GameRecord,
    intent_hash: &Bytes32,
    inclusion: &InclusionProof,
) -> Result<Pubkey> {
    require!(
        record.outcome == GameOutcome::DefenderWins,
        WaypointError::GameNotResolved
    );
    inclusion.verify(intent_hash, &record.root_claim)?;

    Ok(inclusion.claimant)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved_game(intent_hash: &Bytes32, claimant: Pubkey, outcome: GameOutcome) -> (GameRecord, InclusionProof) {
        let inclusion = InclusionProof {
            claimant,
            index: 0,
            siblings: vec![],
        };
        let record = GameRecord::new([5u8; 32].into(), inclusion.fold(intent_hash), outcome);

        (record, inclusion)
    }

    #[test]
    fn defender_win_releases_claimant() {
        let intent_hash: Bytes32 = [1u8; 32].into();
        let claimant = Pubkey::new_unique();
        let (record, inclusion) = resolved_game(&intent_hash, claimant, GameOutcome::DefenderWins);

        assert_eq!(verify(&record, &intent_hash, &inclusion).unwrap(), claimant);
    }

    #[test]
    fn unresolved_game_is_rejected() {
        let intent_hash: Bytes32 = [1u8; 32].into();
        let (record, inclusion) =
            resolved_game(&intent_hash, Pubkey::new_unique(), GameOutcome::InProgress);

        assert!(verify(&record, &intent_hash, &inclusion).is_err());
    }

    #[test]
    fn challenger_win_is_rejected() {
        let intent_hash: Bytes32 = [1u8; 32].into();
        let (record, inclusion) =
            resolved_game(&intent_hash, Pubkey::new_unique(), GameOutcome::ChallengerWins);

        assert!(verify(&record, &intent_hash, &inclusion).is_err());
    }
}
