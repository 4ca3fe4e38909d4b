//! Player reputation - the scalar record every game event feeds into.

use serde::{Deserialize, Serialize};

/// How the world perceives the player, as four independent scalars.
///
/// All current event handlers apply non-negative deltas, so the fields never
/// drop below zero. There is no upper bound.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerReputation {
    pub brutality: f32,
    pub honor: f32,
    pub notoriety: f32,
    pub police_heat: f32,
}

/// Names a single reputation scalar for targeted adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReputationField {
    Brutality,
    Honor,
    Notoriety,
    PoliceHeat,
}

impl PlayerReputation {
    /// Add `amount` to the named field. No validation beyond the type.
    pub fn adjust(&mut self, field: ReputationField, amount: f32) {
        match field {
            ReputationField::Brutality => self.brutality += amount,
            ReputationField::Honor => self.honor += amount,
            ReputationField::Notoriety => self.notoriety += amount,
            ReputationField::PoliceHeat => self.police_heat += amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_reputation_starts_at_zero() {
        let rep = PlayerReputation::default();
        assert_eq!(rep.brutality, 0.0);
        assert_eq!(rep.honor, 0.0);
        assert_eq!(rep.notoriety, 0.0);
        assert_eq!(rep.police_heat, 0.0);
    }

    #[test]
    fn adjust_targets_only_the_named_field() {
        let mut rep = PlayerReputation::default();
        rep.adjust(ReputationField::Brutality, 0.1);
        rep.adjust(ReputationField::PoliceHeat, 0.2);

        assert_eq!(rep.brutality, 0.1);
        assert_eq!(rep.police_heat, 0.2);
        assert_eq!(rep.honor, 0.0);
        assert_eq!(rep.notoriety, 0.0);
    }

    #[test]
    fn adjust_is_additive() {
        let mut rep = PlayerReputation::default();
        rep.adjust(ReputationField::Notoriety, 0.3);
        rep.adjust(ReputationField::Notoriety, 0.3);
        assert!((rep.notoriety - 0.6).abs() < f32::EPSILON);
    }
}
