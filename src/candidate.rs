use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{timestamp, Level, RaceMeta, SelectionSet};
use crate::resolver::Resolver;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetaSummary {
    pub poll_closing: Option<String>,
    pub full_poll_closing: Option<String>,
    pub current_party: Option<String>,
    pub expected: Option<String>,
}

impl From<&RaceMeta> for MetaSummary {
    fn from(meta: &RaceMeta) -> Self {
        Self {
            poll_closing: meta.poll_closing.clone(),
            full_poll_closing: meta.full_poll_closing.clone(),
            current_party: meta.current_party.clone(),
            expected: meta.expected.clone(),
        }
    }
}

/// One candidate as written to disk: the office's selected fields plus the
/// decision desk annotations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub first: String,
    pub last: String,
    #[serde(with = "timestamp")]
    pub lastupdated: DateTime<Utc>,
    pub level: Level,
    pub officename: String,
    pub party: String,
    pub precinctsreporting: i64,
    #[serde(serialize_with = "rust_decimal::serde::arbitrary_precision::serialize")]
    pub precinctsreportingpct: Decimal,
    pub precinctstotal: i64,
    pub raceid: String,
    pub statename: String,
    pub statepostal: String,
    #[serde(serialize_with = "rust_decimal::serde::arbitrary_precision::serialize")]
    pub votepct: Decimal,
    pub votecount: i64,
    pub winner: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incumbent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runoff: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seatname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seatnum: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_ballot_measure: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fipscode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reportingunitname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<MetaSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub npr_winner: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup: Option<bool>,
}

impl Candidate {
    // Copies only the fields the selection set asks for; no annotations
    pub fn project<R: Resolver>(row: &R, set: SelectionSet) -> Self {
        let result = row.result();
        Self {
            first: result.first.clone(),
            last: result.last.clone(),
            lastupdated: result.lastupdated,
            level: result.level,
            officename: result.officename.clone(),
            party: result.party.clone(),
            precinctsreporting: result.precinctsreporting,
            precinctsreportingpct: result.precinctsreportingpct,
            precinctstotal: result.precinctstotal,
            raceid: result.raceid.clone(),
            statename: result.statename.clone(),
            statepostal: result.statepostal.clone(),
            votepct: result.votepct,
            votecount: result.votecount,
            winner: result.winner,
            incumbent: set.incumbent.then_some(result.incumbent),
            runoff: set.runoff.then_some(result.runoff),
            seatname: if set.seat { result.seatname.clone() } else { None },
            seatnum: if set.seat { result.seatnum.clone() } else { None },
            is_ballot_measure: set.ballot_measure.then_some(result.is_ballot_measure),
            fipscode: if set.reporting_unit { result.fipscode.clone() } else { None },
            reportingunitname: if set.reporting_unit {
                result.reportingunitname.clone()
            } else {
                None
            },
            meta: None,
            npr_winner: None,
            pickup: None,
        }
    }

    pub fn is_reporting(&self) -> bool {
        self.precinctsreporting > 0
    }
}

// Minor-party candidates merged into one line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OtherRow {
    pub first: String,
    pub last: String,
    pub votecount: i64,
    // Summed exactly; a float sum would publish rounding noise
    #[serde(serialize_with = "rust_decimal::serde::arbitrary_precision::serialize")]
    pub votepct: Decimal,
    pub npr_winner: bool,
}

impl Default for OtherRow {
    fn default() -> Self {
        Self {
            first: String::new(),
            last: "Other".to_string(),
            votecount: 0,
            votepct: Decimal::ZERO,
            npr_winner: false,
        }
    }
}

impl OtherRow {
    pub fn absorb(&mut self, candidate: &Candidate) {
        self.votecount += candidate.votecount;
        self.votepct += candidate.votepct;
        self.npr_winner |= candidate.npr_winner.unwrap_or(false);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Row {
    Candidate(Candidate),
    Other(OtherRow),
}

impl Row {
    pub fn candidate(&self) -> Option<&Candidate> {
        match self {
            Row::Candidate(candidate) => Some(candidate),
            Row::Other(_) => None,
        }
    }

    pub fn is_other(&self) -> bool {
        matches!(self, Row::Other(_))
    }
}
