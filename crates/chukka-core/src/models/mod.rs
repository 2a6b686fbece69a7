//! Data models for Chukka

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::sync::SyncEntity;

mod award;
mod breeder;
mod club;
mod duty;
mod field;
mod horse;
mod ids;
mod participation;
mod player;
mod polo_match;
mod team;
mod tournament;
mod user;

pub use award::{Award, AwardDto, AwardFields};
pub use breeder::{Breeder, BreederDto, BreederFields};
pub use club::{Club, ClubDto, ClubFields};
pub use duty::{Duty, DutyFields};
pub use field::{Field, FieldDto, FieldFields};
pub use horse::{Horse, HorseDto, HorseFields};
pub use ids::{LocalId, RemoteId};
pub use participation::{Participation, ParticipationFields};
pub use player::{Player, PlayerDto, PlayerFields};
pub use polo_match::{Match, MatchDto, MatchFields, MatchStatus};
pub use team::{Team, TeamDto, TeamFields};
pub use tournament::{Tournament, TournamentDto, TournamentFields};
pub use user::{User, UserDto};

/// The synchronized entity kinds.
///
/// The runtime handle for dispatching per-kind sync operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Tournament,
    Club,
    Team,
    Player,
    Horse,
    Breeder,
    Field,
    Match,
    Award,
}

impl EntityKind {
    /// All synchronized kinds, in dependency order: kinds later in the list
    /// may reference earlier ones by remote id, so pulls run front to back.
    pub const ALL: [Self; 9] = [
        Self::Club,
        Self::Breeder,
        Self::Field,
        Self::Team,
        Self::Tournament,
        Self::Player,
        Self::Horse,
        Self::Award,
        Self::Match,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tournament => "tournament",
            Self::Club => "club",
            Self::Team => "team",
            Self::Player => "player",
            Self::Horse => "horse",
            Self::Breeder => "breeder",
            Self::Field => "field",
            Self::Match => "match",
            Self::Award => "award",
        }
    }

    /// The kind's local delete policy, as declared on its sync binding.
    #[must_use]
    pub const fn delete_policy(self) -> DeletePolicy {
        match self {
            Self::Tournament => Tournament::DELETE_POLICY,
            Self::Club => Club::DELETE_POLICY,
            Self::Team => Team::DELETE_POLICY,
            Self::Player => Player::DELETE_POLICY,
            Self::Horse => Horse::DELETE_POLICY,
            Self::Breeder => Breeder::DELETE_POLICY,
            Self::Field => Field::DELETE_POLICY,
            Self::Match => Match::DELETE_POLICY,
            Self::Award => Award::DELETE_POLICY,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tournament" => Ok(Self::Tournament),
            "club" => Ok(Self::Club),
            "team" => Ok(Self::Team),
            "player" => Ok(Self::Player),
            "horse" => Ok(Self::Horse),
            "breeder" => Ok(Self::Breeder),
            "field" => Ok(Self::Field),
            "match" => Ok(Self::Match),
            "award" => Ok(Self::Award),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown entity kind: {other}"
            ))),
        }
    }
}

/// What local deletion means for a kind.
///
/// One policy per kind, declared on its sync binding; the remote call is
/// always a hard DELETE regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Flip `is_active` to false and keep the row
    Soft,
    /// Remove the row (cascading to owned children)
    Hard,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_kind_round_trips_through_str() {
        for kind in EntityKind::ALL {
            let parsed: EntityKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn entity_kind_rejects_unknown_name() {
        assert!("committee".parse::<EntityKind>().is_err());
    }

    #[test]
    fn only_teams_and_matches_hard_delete() {
        for kind in EntityKind::ALL {
            let expect_hard = matches!(kind, EntityKind::Team | EntityKind::Match);
            assert_eq!(kind.delete_policy() == DeletePolicy::Hard, expect_hard);
        }
    }
}
