use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::models::{Level, Office, RaceMeta, RaceResult};

/// A conjunction of filters over the result store.
///
/// Empty `levels` matches every level; `raceids` of `None` matches every race.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub levels: Vec<Level>,
    pub officename: Option<String>,
    pub statepostal: Option<String>,
    pub raceids: Option<Vec<String>>,
    pub exclude_special: bool,
    pub require_voting_member: bool,
    pub require_key_race: bool,
    pub ballot_measure: Option<bool>,
}

impl Selection {
    pub fn new(level: Level) -> Self {
        Self {
            levels: vec![level],
            ..Self::default()
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        if !self.levels.contains(&level) {
            self.levels.push(level);
        }
        self
    }

    pub fn office(mut self, officename: &str) -> Self {
        self.officename = Some(officename.to_string());
        self
    }

    pub fn state(mut self, statepostal: &str) -> Self {
        self.statepostal = Some(statepostal.to_string());
        self
    }

    pub fn raceids<I, S>(mut self, raceids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.raceids = Some(raceids.into_iter().map(Into::into).collect());
        self
    }

    pub fn exclude_special(mut self) -> Self {
        self.exclude_special = true;
        self
    }

    pub fn voting_member(mut self) -> Self {
        self.require_voting_member = true;
        self
    }

    pub fn key_race(mut self) -> Self {
        self.require_key_race = true;
        self
    }

    pub fn ballot_measure(mut self) -> Self {
        self.ballot_measure = Some(true);
        self
    }

    // Rows for one office regardless of where they are selected
    pub fn for_office(office: Office, level: Level) -> Self {
        let selection = Selection::new(level);
        match office.officename() {
            Some(name) => selection.office(name),
            None => selection.ballot_measure(),
        }
    }

    /// All state-level rows feeding a national big board.
    ///
    /// The house board is limited to the curated race list, or to races
    /// flagged as key races when no list is configured.
    pub fn national(office: Office, config: &RenderConfig) -> Self {
        let selection = Self::for_office(office, Level::State);
        match office {
            Office::House if config.selected_house_races.is_empty() => selection.key_race(),
            Office::House => selection.raceids(config.selected_house_races.iter().cloned()),
            _ => selection,
        }
    }

    /// Every seat in a chamber, for balance of power. House seats are limited
    /// to voting members so delegates never count toward the 435.
    pub fn chamber(office: Office) -> Self {
        let selection = Self::for_office(office, Level::State);
        match office {
            Office::House => selection.voting_member(),
            _ => selection,
        }
    }

    pub fn state_detail(office: Office, statepostal: &str) -> Self {
        Self::for_office(office, Level::State).state(statepostal)
    }

    // County files also carry the statewide rows under a "state" bucket
    pub fn county_detail(office: Office, statepostal: &str) -> Self {
        Self::for_office(office, Level::County)
            .with_level(Level::State)
            .state(statepostal)
    }

    /// Checks one row against the selection and hands back its race metadata
    /// when the row is selected.
    ///
    /// Metadata is required of every row that passes the result filters, so an
    /// orphan is reported before the metadata flags could filter it away.
    pub fn admit<'m>(
        &self,
        result: &RaceResult,
        meta: Option<&'m RaceMeta>,
    ) -> Result<Option<&'m RaceMeta>, RenderError> {
        if !self.matches_result(result) {
            return Ok(None);
        }
        let meta = meta.ok_or_else(|| RenderError::MissingMeta {
            raceid: result.raceid.clone(),
            result_id: result.id,
        })?;
        if self.require_voting_member && !meta.voting_member {
            return Ok(None);
        }
        if self.require_key_race && !meta.key_race {
            return Ok(None);
        }
        Ok(Some(meta))
    }

    fn matches_result(&self, result: &RaceResult) -> bool {
        if !self.levels.is_empty() && !self.levels.contains(&result.level) {
            return false;
        }
        if let Some(name) = &self.officename {
            if &result.officename != name {
                return false;
            }
        }
        if let Some(postal) = &self.statepostal {
            if &result.statepostal != postal {
                return false;
            }
        }
        if let Some(raceids) = &self.raceids {
            if !raceids.contains(&result.raceid) {
                return false;
            }
        }
        if let Some(flag) = self.ballot_measure {
            if result.is_ballot_measure != flag {
                return false;
            }
        }
        !(self.exclude_special && result.is_special_election)
    }
}
