use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::models::timestamp;
use crate::resolver::Resolver;

const OTHER: &str = "Other";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyTally {
    pub seats: i64,
    pub pickups: i64,
    pub needed: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<i64>,
}

impl PartyTally {
    pub fn new(seats: i64, needed: i64, expected: Option<i64>) -> Self {
        Self {
            seats,
            pickups: 0,
            needed,
            expected,
        }
    }
}

/// Seat counters for one chamber, seeded with the seats already decided
/// going into election night.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceOfPower {
    pub total_seats: i64,
    pub majority: i64,
    pub uncalled_races: i64,
    #[serde(with = "timestamp::option")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(rename = "Dem")]
    pub dem: PartyTally,
    #[serde(rename = "GOP")]
    pub gop: PartyTally,
    #[serde(rename = "Other")]
    pub other: PartyTally,
}

impl BalanceOfPower {
    pub fn senate_seed() -> Self {
        Self {
            total_seats: 100,
            majority: 51,
            uncalled_races: 34,
            last_updated: None,
            dem: PartyTally::new(34, 17, Some(8)),
            gop: PartyTally::new(30, 21, Some(14)),
            other: PartyTally::new(2, 49, Some(0)),
        }
    }

    pub fn house_seed() -> Self {
        Self {
            total_seats: 435,
            majority: 218,
            uncalled_races: 435,
            last_updated: None,
            dem: PartyTally::new(0, 218, Some(178)),
            gop: PartyTally::new(0, 218, Some(202)),
            other: PartyTally::new(0, 218, Some(0)),
        }
    }

    fn bucket_mut(&mut self, party: &str) -> Result<&mut PartyTally, RenderError> {
        match party {
            "Dem" => Ok(&mut self.dem),
            "GOP" => Ok(&mut self.gop),
            OTHER => Ok(&mut self.other),
            _ => Err(RenderError::UnknownParty {
                party: party.to_string(),
            }),
        }
    }

    /// Folds one state-level result into the tally.
    ///
    /// Parties outside `accepted_parties` count toward "Other". An accepted
    /// party without a bucket of its own (a ballot measure "Yes", say) is an
    /// error rather than a silent drop.
    pub fn tally<R: Resolver>(
        &mut self,
        row: &R,
        accepted_parties: &[String],
    ) -> Result<(), RenderError> {
        let result = row.result();
        let party = if accepted_parties.contains(&result.party) {
            result.party.as_str()
        } else {
            OTHER
        };

        if row.is_npr_winner() {
            let bucket = self.bucket_mut(party)?;
            bucket.seats += 1;
            bucket.needed -= 1;
            self.uncalled_races -= 1;
        }

        if row.is_pickup() {
            self.bucket_mut(party)?.pickups += 1;
            let previous = row.meta().current_party.as_deref().unwrap_or_default();
            self.bucket_mut(previous)?.pickups -= 1;
        }

        if row.is_expected() {
            if let Some(expected) = self.bucket_mut(party)?.expected.as_mut() {
                *expected -= 1;
            }
        }

        if row.is_not_expected() {
            let expected_party = row.meta().expected.as_deref().unwrap_or_default();
            if let Some(expected) = self.bucket_mut(expected_party)?.expected.as_mut() {
                *expected -= 1;
            }
        }

        if self.last_updated.is_none_or(|current| result.lastupdated > current) {
            self.last_updated = Some(result.lastupdated);
        }

        Ok(())
    }

    pub fn tally_all<'a, R, I>(
        &mut self,
        rows: I,
        accepted_parties: &[String],
    ) -> Result<(), RenderError>
    where
        R: Resolver + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        for row in rows {
            self.tally(row, accepted_parties)?;
        }
        Ok(())
    }

    pub fn called_seats(&self) -> i64 {
        self.dem.seats + self.gop.seats + self.other.seats
    }
}

/// Contents of `top-level-results.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopLevel {
    pub senate_bop: BalanceOfPower,
    pub house_bop: BalanceOfPower,
    #[serde(with = "timestamp")]
    pub last_updated: DateTime<Utc>,
}

impl TopLevel {
    // Freshest of the two chambers; `now` only when neither has seen a row
    pub fn combine(senate_bop: BalanceOfPower, house_bop: BalanceOfPower, now: DateTime<Utc>) -> Self {
        let last_updated = match (senate_bop.last_updated, house_bop.last_updated) {
            (Some(senate), Some(house)) => senate.max(house),
            (Some(only), None) | (None, Some(only)) => only,
            (None, None) => now,
        };
        Self {
            senate_bop,
            house_bop,
            last_updated,
        }
    }
}
