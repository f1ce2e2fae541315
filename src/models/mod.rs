use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod timestamp;

// Geographic level a result row was reported at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    State,
    County,
    Township,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::State => "state",
            Level::County => "county",
            Level::Township => "township",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "state" => Some(Level::State),
            "county" => Some(Level::County),
            "township" => Some(Level::Township),
            _ => None,
        }
    }

    // Winner and pickup calls only exist at the state level
    pub fn is_callable(&self) -> bool {
        matches!(self, Level::State)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One candidate in one race at one level, as ingested from the wire service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceResult {
    pub id: i64,
    pub raceid: String,
    pub statepostal: String,
    pub statename: String,
    pub fipscode: Option<String>,
    pub reportingunitname: Option<String>,
    pub level: Level,
    pub officename: String,
    pub party: String,
    pub first: String,
    pub last: String,
    pub incumbent: bool,
    pub runoff: bool,
    pub seatname: Option<String>,
    pub seatnum: Option<String>,
    pub votecount: i64,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub votepct: Decimal,
    pub precinctsreporting: i64,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub precinctsreportingpct: Decimal,
    pub precinctstotal: i64,
    pub winner: bool,
    #[serde(with = "timestamp")]
    pub lastupdated: DateTime<Utc>,
    pub is_ballot_measure: bool,
    pub is_special_election: bool,
}

/// Editorial metadata shared by every row of a race.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RaceMeta {
    pub raceid: String,
    pub poll_closing: Option<String>,
    pub full_poll_closing: Option<String>,
    pub current_party: Option<String>,
    pub key_race: bool,
    pub voting_member: bool,
    pub expected: Option<String>,
}

// Decision desk override for a single result row
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Call {
    pub accept_ap: bool,
    pub override_winner: bool,
}

impl Default for Call {
    fn default() -> Self {
        Self {
            accept_ap: true,
            override_winner: false,
        }
    }
}

// Which optional fields a serialized candidate row carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSet {
    pub incumbent: bool,
    pub runoff: bool,
    pub seat: bool,
    pub ballot_measure: bool,
    pub reporting_unit: bool,
}

impl SelectionSet {
    pub const SENATE: SelectionSet = SelectionSet {
        incumbent: true,
        runoff: true,
        seat: false,
        ballot_measure: false,
        reporting_unit: false,
    };

    pub const HOUSE: SelectionSet = SelectionSet {
        incumbent: true,
        runoff: true,
        seat: true,
        ballot_measure: false,
        reporting_unit: false,
    };

    pub const GOVERNOR: SelectionSet = SelectionSet {
        incumbent: true,
        runoff: false,
        seat: false,
        ballot_measure: false,
        reporting_unit: false,
    };

    pub const BALLOT_MEASURES: SelectionSet = SelectionSet {
        incumbent: false,
        runoff: false,
        seat: true,
        ballot_measure: true,
        reporting_unit: false,
    };

    pub fn with_reporting_unit(self) -> Self {
        Self {
            reporting_unit: true,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Office {
    Senate,
    House,
    Governor,
    BallotMeasures,
}

impl Office {
    pub const ALL: [Office; 4] = [
        Office::Senate,
        Office::House,
        Office::Governor,
        Office::BallotMeasures,
    ];

    // Key used inside the per-state document
    pub fn label(&self) -> &'static str {
        match self {
            Office::Senate => "senate",
            Office::House => "house",
            Office::Governor => "governor",
            Office::BallotMeasures => "ballot_measures",
        }
    }

    // Fragment used in file names
    pub fn slug(&self) -> &'static str {
        match self {
            Office::Senate => "senate",
            Office::House => "house",
            Office::Governor => "governor",
            Office::BallotMeasures => "ballot-measures",
        }
    }

    // Ballot measures are selected by flag, not by office name
    pub fn officename(&self) -> Option<&'static str> {
        match self {
            Office::Senate => Some("U.S. Senate"),
            Office::House => Some("U.S. House"),
            Office::Governor => Some("Governor"),
            Office::BallotMeasures => None,
        }
    }

    pub fn selection_set(&self) -> SelectionSet {
        match self {
            Office::Senate => SelectionSet::SENATE,
            Office::House => SelectionSet::HOUSE,
            Office::Governor => SelectionSet::GOVERNOR,
            Office::BallotMeasures => SelectionSet::BALLOT_MEASURES,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Office::ALL
            .into_iter()
            .find(|office| office.slug() == value || office.label() == value)
    }
}

impl fmt::Display for Office {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

// Offices whose rows carry a `pickup` flag
pub fn is_pickup_office(officename: &str) -> bool {
    officename == "U.S. House" || officename == "U.S. Senate"
}
