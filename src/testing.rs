// Fixture builders for unit tests
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::models::{Level, RaceMeta, RaceResult};
use crate::resolver::{Resolution, ResultRow};

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2018, 11, 6, hour, minute, 0).unwrap()
}

pub fn result(raceid: &str, party: &str, votecount: i64) -> RaceResult {
    RaceResult {
        id: 0,
        raceid: raceid.to_string(),
        statepostal: "VA".to_string(),
        statename: "Virginia".to_string(),
        fipscode: None,
        reportingunitname: None,
        level: Level::State,
        officename: "U.S. Senate".to_string(),
        party: party.to_string(),
        first: format!("{} first", party),
        last: format!("{} last", party),
        incumbent: false,
        runoff: false,
        seatname: None,
        seatnum: None,
        votecount,
        votepct: Decimal::ZERO,
        precinctsreporting: 10,
        precinctsreportingpct: Decimal::new(5, 1),
        precinctstotal: 20,
        winner: false,
        lastupdated: at(20, 0),
        is_ballot_measure: false,
        is_special_election: false,
    }
}

pub fn meta(raceid: &str) -> RaceMeta {
    RaceMeta {
        raceid: raceid.to_string(),
        poll_closing: Some("7:00 PM".to_string()),
        full_poll_closing: Some("7:00 PM".to_string()),
        current_party: None,
        key_race: false,
        voting_member: true,
        expected: None,
    }
}

pub fn row(result: RaceResult) -> ResultRow {
    let meta = meta(&result.raceid);
    ResultRow {
        result,
        meta,
        resolution: Resolution::default(),
    }
}

pub fn winner(mut row: ResultRow) -> ResultRow {
    row.resolution.npr_winner = true;
    row
}
