#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use results_board::models::{Level, RaceMeta, RaceResult};
use results_board::MemoryStore;

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2018, 11, 6, hour, minute, 0).unwrap()
}

pub struct Race {
    pub raceid: &'static str,
    pub statepostal: &'static str,
    pub officename: &'static str,
    pub level: Level,
    pub fipscode: Option<&'static str>,
    pub reporting: i64,
    pub updated: DateTime<Utc>,
}

impl Race {
    pub fn state(raceid: &'static str, statepostal: &'static str, officename: &'static str) -> Self {
        Self {
            raceid,
            statepostal,
            officename,
            level: Level::State,
            fipscode: None,
            reporting: 12,
            updated: at(20, 0),
        }
    }

    pub fn county(mut self, fipscode: &'static str) -> Self {
        self.level = Level::County;
        self.fipscode = Some(fipscode);
        self
    }

    pub fn quiet(mut self) -> Self {
        self.reporting = 0;
        self
    }

    pub fn updated(mut self, updated: DateTime<Utc>) -> Self {
        self.updated = updated;
        self
    }

    pub fn candidate(&self, id: i64, party: &str, votecount: i64, winner: bool) -> RaceResult {
        RaceResult {
            id,
            raceid: self.raceid.to_string(),
            statepostal: self.statepostal.to_string(),
            statename: self.statepostal.to_string(),
            fipscode: self.fipscode.map(str::to_string),
            reportingunitname: self.fipscode.map(|f| format!("County {}", f)),
            level: self.level,
            officename: self.officename.to_string(),
            party: party.to_string(),
            first: format!("{} first", party),
            last: format!("{} last", party),
            incumbent: false,
            runoff: false,
            seatname: None,
            seatnum: None,
            votecount,
            votepct: Decimal::new(votecount, 0) / Decimal::new(2000, 0),
            precinctsreporting: self.reporting,
            precinctsreportingpct: if self.reporting > 0 {
                Decimal::new(5, 1)
            } else {
                Decimal::ZERO
            },
            precinctstotal: 24,
            winner,
            lastupdated: self.updated,
            is_ballot_measure: false,
            is_special_election: false,
        }
    }
}

pub fn meta(raceid: &str, poll_closing: &str) -> RaceMeta {
    RaceMeta {
        raceid: raceid.to_string(),
        poll_closing: Some(poll_closing.to_string()),
        full_poll_closing: Some(format!("{} EST", poll_closing)),
        current_party: None,
        key_race: false,
        voting_member: true,
        expected: None,
    }
}

/// Two states: Virginia is reporting, Maryland has not started.
pub fn election_night() -> MemoryStore {
    let mut store = MemoryStore::new();

    let senate = Race::state("100", "VA", "U.S. Senate");
    store.insert_meta(meta("100", "7:00 PM"));
    store.insert_result(senate.candidate(1, "Dem", 1000, true), None);
    store.insert_result(senate.candidate(2, "GOP", 900, false), None);
    store.insert_result(senate.candidate(3, "Ind", 50, false), None);
    store.insert_result(senate.candidate(4, "Lib", 10, false), None);

    let fairfax = Race::state("100", "VA", "U.S. Senate").county("51059").updated(at(20, 30));
    store.insert_result(fairfax.candidate(5, "Dem", 600, false), None);
    store.insert_result(fairfax.candidate(6, "GOP", 400, false), None);
    let arlington = Race::state("100", "VA", "U.S. Senate").county("51013").quiet();
    store.insert_result(arlington.candidate(7, "Dem", 0, false), None);
    store.insert_result(arlington.candidate(8, "GOP", 0, false), None);

    let house = Race::state("200", "VA", "U.S. House").updated(at(21, 0));
    let mut house_meta = meta("200", "7:00 PM");
    house_meta.current_party = Some("GOP".to_string());
    store.insert_meta(house_meta);
    let mut dem = house.candidate(9, "Dem", 700, true);
    dem.seatnum = Some("7".to_string());
    dem.seatname = Some("District 7".to_string());
    store.insert_result(dem, None);
    store.insert_result(house.candidate(10, "GOP", 650, false), None);

    let governor = Race::state("300", "MD", "Governor").quiet();
    store.insert_meta(meta("300", "8:00 PM"));
    store.insert_result(governor.candidate(11, "Dem", 0, false), None);
    store.insert_result(governor.candidate(12, "GOP", 0, false), None);

    let measure = Race::state("400", "MD", "Question 1").quiet();
    store.insert_meta(meta("400", "8:00 PM"));
    for (id, party) in [(13, "Yes"), (14, "No")] {
        let mut row = measure.candidate(id, party, 0, false);
        row.is_ballot_measure = true;
        store.insert_result(row, None);
    }

    store
}
