use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::candidate::{Candidate, MetaSummary, Row};
use crate::collate::collate_other;
use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::models::{is_pickup_office, timestamp, Level, Office, SelectionSet};
use crate::resolver::Resolver;
use crate::staleness;

lazy_static! {
    static ref DISTRICT_SUFFIX: Regex = Regex::new(r"\d$").unwrap();
}

/// A rendered JSON document: keyed groups plus the freshness stamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document<T> {
    pub results: BTreeMap<String, T>,
    #[serde(with = "timestamp")]
    pub last_updated: DateTime<Utc>,
    // Live timestamp before the fallback to render time
    #[serde(skip)]
    pub freshest: Option<DateTime<Utc>>,
}

impl<T> Document<T> {
    fn new(results: BTreeMap<String, T>, freshest: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        Self {
            results,
            last_updated: freshest.unwrap_or(now),
            freshest,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

pub type FlatDocument = Document<Vec<Row>>;
pub type BoardDocument = Document<BTreeMap<String, Vec<Row>>>;
pub type StateDocument = Document<FlatDocument>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    RaceId,
    // Statewide rows land in a literal "state" bucket
    FipsCode,
    // Postal code, suffixed with the district digit when there is one
    StatePostal,
}

impl GroupKey {
    pub fn resolve<R: Resolver>(&self, row: &R) -> Result<String, RenderError> {
        let result = row.result();
        match self {
            GroupKey::RaceId => Ok(result.raceid.clone()),
            GroupKey::FipsCode if result.level == Level::State => Ok("state".to_string()),
            GroupKey::FipsCode => {
                result
                    .fipscode
                    .clone()
                    .ok_or_else(|| RenderError::MissingFipsCode {
                        raceid: result.raceid.clone(),
                    })
            }
            GroupKey::StatePostal => {
                let suffix = result
                    .reportingunitname
                    .as_deref()
                    .and_then(|name| DISTRICT_SUFFIX.find(name));
                Ok(match suffix {
                    Some(digit) => format!("{}-{}", result.statepostal, digit.as_str()),
                    None => result.statepostal.clone(),
                })
            }
        }
    }
}

/// Builds documents from result rows for one render pass.
pub struct Serializer<'a> {
    config: &'a RenderConfig,
    now: DateTime<Utc>,
}

impl<'a> Serializer<'a> {
    pub fn new(config: &'a RenderConfig, now: DateTime<Utc>) -> Self {
        Self { config, now }
    }

    pub fn candidate<R: Resolver>(&self, row: &R, set: SelectionSet) -> Candidate {
        let result = row.result();
        let mut candidate = Candidate::project(row, set);
        if result.level.is_callable() {
            candidate.meta = Some(MetaSummary::from(row.meta()));
            candidate.npr_winner = Some(row.is_npr_winner());
            if is_pickup_office(&result.officename) {
                candidate.pickup = Some(row.is_pickup());
            }
        }
        candidate
    }

    fn collate(&self, candidates: Vec<Candidate>) -> Vec<Row> {
        collate_other(
            candidates,
            &self.config.accepted_parties,
            self.config.display_slots,
        )
    }

    /// Groups candidates straight by `key`, collating each group.
    pub fn by_key<R: Resolver>(
        &self,
        rows: &[R],
        set: SelectionSet,
        key: GroupKey,
    ) -> Result<FlatDocument, RenderError> {
        let mut groups: BTreeMap<String, Vec<Candidate>> = BTreeMap::new();
        for row in rows {
            let dict_key = key.resolve(row)?;
            groups
                .entry(dict_key)
                .or_default()
                .push(self.candidate(row, set));
        }

        let freshest = staleness::freshest(groups.values().map(Vec::as_slice));
        let results = groups
            .into_iter()
            .map(|(key, candidates)| (key, self.collate(candidates)))
            .collect();

        Ok(Document::new(results, freshest, self.now))
    }

    /// Groups candidates by poll closing bucket first, then by `key`.
    pub fn for_big_board<R: Resolver>(
        &self,
        rows: &[R],
        set: SelectionSet,
        key: GroupKey,
    ) -> Result<BoardDocument, RenderError> {
        let mut buckets: BTreeMap<String, BTreeMap<String, Vec<Candidate>>> = BTreeMap::new();
        for row in rows {
            let poll_closing = row.meta().poll_closing.clone().ok_or_else(|| {
                RenderError::MissingPollClosing {
                    raceid: row.result().raceid.clone(),
                }
            })?;
            let dict_key = key.resolve(row)?;
            buckets
                .entry(poll_closing)
                .or_default()
                .entry(dict_key)
                .or_default()
                .push(self.candidate(row, set));
        }

        let freshest = staleness::freshest(
            buckets
                .values()
                .flat_map(|bucket| bucket.values().map(Vec::as_slice)),
        );
        let results = buckets
            .into_iter()
            .map(|(closing, bucket)| {
                let bucket = bucket
                    .into_iter()
                    .map(|(key, candidates)| (key, self.collate(candidates)))
                    .collect();
                (closing, bucket)
            })
            .collect();

        Ok(Document::new(results, freshest, self.now))
    }

    // One state's per-office documents under a single freshness stamp
    pub fn state(&self, sections: Vec<(Office, FlatDocument)>) -> StateDocument {
        let freshest = staleness::latest(sections.iter().map(|(_, doc)| doc.freshest));
        let results = sections
            .into_iter()
            .map(|(office, doc)| (office.label().to_string(), doc))
            .collect();
        Document::new(results, freshest, self.now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ResultRow;
    use crate::testing::{at, result, row, winner};

    fn config() -> RenderConfig {
        RenderConfig::default()
    }

    fn race(raceid: &str, closing: &str, parties: &[(&str, i64)]) -> Vec<ResultRow> {
        parties
            .iter()
            .map(|(party, votes)| {
                let mut row = row(result(raceid, party, *votes));
                row.meta.poll_closing = Some(closing.to_string());
                row
            })
            .collect()
    }

    #[test]
    fn flat_groups_by_raceid_and_collates() {
        let config = config();
        let serializer = Serializer::new(&config, at(23, 0));
        let mut rows = race("1", "7:00 PM", &[("Dem", 10), ("GOP", 20), ("Ind", 1), ("Lib", 1)]);
        rows.extend(race("2", "7:00 PM", &[("Dem", 5)]));

        let doc = serializer.by_key(&rows, SelectionSet::SENATE, GroupKey::RaceId).unwrap();
        assert_eq!(doc.results["1"].len(), 3);
        assert!(doc.results["1"][2].is_other());
        assert_eq!(doc.results["2"].len(), 1);
        assert_eq!(doc.last_updated, at(20, 0));
    }

    #[test]
    fn callable_rows_are_annotated() {
        let config = config();
        let serializer = Serializer::new(&config, at(23, 0));
        let mut state = winner(row(result("1", "Dem", 10)));
        state.resolution.pickup = true;
        let candidate = serializer.candidate(&state, SelectionSet::SENATE);
        assert_eq!(candidate.npr_winner, Some(true));
        assert_eq!(candidate.pickup, Some(true));
        assert!(candidate.meta.is_some());

        let mut governor = row(result("2", "Dem", 10));
        governor.result.officename = "Governor".to_string();
        let candidate = serializer.candidate(&governor, SelectionSet::GOVERNOR);
        assert_eq!(candidate.pickup, None);
        assert_eq!(candidate.npr_winner, Some(false));
    }

    #[test]
    fn county_rows_skip_annotation_and_state_rows_rekey() {
        let config = config();
        let serializer = Serializer::new(&config, at(23, 0));
        let mut county = winner(row(result("1", "Dem", 10)));
        county.result.level = Level::County;
        county.result.fipscode = Some("51059".to_string());
        let statewide = row(result("1", "GOP", 10));

        let set = SelectionSet::SENATE.with_reporting_unit();
        let doc = serializer
            .by_key(&[county, statewide], set, GroupKey::FipsCode)
            .unwrap();
        let keys: Vec<&String> = doc.results.keys().collect();
        assert_eq!(keys, vec!["51059", "state"]);

        let county_row = doc.results["51059"][0].candidate().unwrap();
        assert_eq!(county_row.npr_winner, None);
        assert_eq!(county_row.meta, None);
        assert_eq!(county_row.fipscode.as_deref(), Some("51059"));
    }

    #[test]
    fn county_row_without_fips_is_an_error() {
        let config = config();
        let serializer = Serializer::new(&config, at(23, 0));
        let mut county = row(result("1", "Dem", 10));
        county.result.level = Level::County;
        let err = serializer
            .by_key(&[county], SelectionSet::SENATE, GroupKey::FipsCode)
            .unwrap_err();
        assert!(matches!(err, RenderError::MissingFipsCode { .. }));
    }

    #[test]
    fn statepostal_key_takes_district_suffix() {
        let mut district = row(result("1", "Dem", 10));
        district.result.statepostal = "ME".to_string();
        district.result.reportingunitname = Some("Congressional District 2".to_string());
        assert_eq!(GroupKey::StatePostal.resolve(&district).unwrap(), "ME-2");

        district.result.reportingunitname = Some("Maine".to_string());
        assert_eq!(GroupKey::StatePostal.resolve(&district).unwrap(), "ME");
    }

    #[test]
    fn big_board_buckets_by_poll_closing() {
        let config = config();
        let serializer = Serializer::new(&config, at(23, 0));
        let mut rows = race("1", "7:00 PM", &[("Dem", 10), ("GOP", 20)]);
        rows.extend(race("2", "8:00 PM", &[("Dem", 5), ("GOP", 6)]));
        rows.extend(race("3", "7:00 PM", &[("Dem", 5), ("GOP", 6)]));

        let doc = serializer
            .for_big_board(&rows, SelectionSet::SENATE, GroupKey::RaceId)
            .unwrap();
        assert_eq!(doc.results.len(), 2);
        let seven: Vec<&String> = doc.results["7:00 PM"].keys().collect();
        assert_eq!(seven, vec!["1", "3"]);
        assert!(doc.results["8:00 PM"].contains_key("2"));
    }

    #[test]
    fn big_board_requires_poll_closing() {
        let config = config();
        let serializer = Serializer::new(&config, at(23, 0));
        let mut rows = race("1", "7:00 PM", &[("Dem", 10)]);
        rows[0].meta.poll_closing = None;
        let err = serializer
            .for_big_board(&rows, SelectionSet::SENATE, GroupKey::RaceId)
            .unwrap_err();
        assert!(matches!(err, RenderError::MissingPollClosing { raceid } if raceid == "1"));
    }

    #[test]
    fn nothing_reporting_defaults_to_now() {
        let config = config();
        let serializer = Serializer::new(&config, at(23, 0));
        let mut rows = race("1", "7:00 PM", &[("Dem", 0), ("GOP", 0)]);
        for row in &mut rows {
            row.result.precinctsreporting = 0;
        }
        let doc = serializer.by_key(&rows, SelectionSet::SENATE, GroupKey::RaceId).unwrap();
        assert_eq!(doc.freshest, None);
        assert_eq!(doc.last_updated, at(23, 0));
    }

    #[test]
    fn state_document_takes_freshest_live_section() {
        let config = config();
        let serializer = Serializer::new(&config, at(23, 0));
        let senate = serializer
            .by_key(&race("1", "7:00 PM", &[("Dem", 1)]), SelectionSet::SENATE, GroupKey::RaceId)
            .unwrap();
        let empty: Vec<ResultRow> = Vec::new();
        let house = serializer
            .by_key(&empty, SelectionSet::HOUSE, GroupKey::RaceId)
            .unwrap();
        assert_eq!(house.last_updated, at(23, 0));

        let state = serializer.state(vec![(Office::Senate, senate), (Office::House, house)]);
        assert_eq!(state.last_updated, at(20, 0));
        assert!(state.results.contains_key("senate"));
        assert!(state.results.contains_key("house"));
    }

    #[test]
    fn identical_input_serializes_identically() {
        let config = config();
        let serializer = Serializer::new(&config, at(23, 0));
        let mut rows = race("1", "7:00 PM", &[("Dem", 10), ("GOP", 20), ("Ind", 3)]);
        rows.extend(race("2", "8:00 PM", &[("Dem", 5), ("GOP", 6)]));

        let first = serializer
            .for_big_board(&rows, SelectionSet::SENATE, GroupKey::RaceId)
            .unwrap();
        let second = serializer
            .for_big_board(&rows, SelectionSet::SENATE, GroupKey::RaceId)
            .unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
