use chrono::Utc;
use log::{debug, info};
use std::fmt;
use std::sync::Arc;

use crate::bop::TopLevel;
use crate::config::RenderConfig;
use crate::db::ResultStore;
use crate::error::RenderError;
use crate::models::Office;
use crate::select::Selection;
use crate::serialize::{BoardDocument, FlatDocument, GroupKey, Serializer, StateDocument};

pub mod pool;
pub mod writer;

pub const TOP_LEVEL_FILE: &str = "top-level-results.json";

// National boards in the order a full render writes them
const BOARD_ORDER: [Office; 4] = [
    Office::Senate,
    Office::Governor,
    Office::BallotMeasures,
    Office::House,
];

pub fn board_filename(office: Office) -> String {
    format!("{}-national.json", office.slug())
}

pub fn state_filename(statepostal: &str) -> String {
    format!("{}.json", statepostal.to_lowercase())
}

pub fn county_filename(statepostal: &str, office: Office) -> String {
    format!("{}-counties-{}.json", statepostal.to_lowercase(), office.slug())
}

// One (state, office) county render unit
#[derive(Debug, Clone)]
struct CountyJob {
    statepostal: String,
    office: Office,
}

impl fmt::Display for CountyJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} counties ({})", self.statepostal, self.office)
    }
}

/// Turns the result store into the published JSON files.
#[derive(Clone)]
pub struct Renderer {
    store: Arc<dyn ResultStore>,
    config: Arc<RenderConfig>,
}

impl Renderer {
    pub fn new(store: Arc<dyn ResultStore>, config: Arc<RenderConfig>) -> Self {
        Self { store, config }
    }

    /// Full render: wipe the output directory, then write every artifact.
    pub async fn render_all(&self) -> Result<(), RenderError> {
        info!("Rendering all results into {}", self.config.output_dir.display());
        writer::reset_output_dir(&self.config.output_dir).await?;

        self.render_top_level().await?;
        for office in BOARD_ORDER {
            self.render_board(office).await?;
        }
        self.render_states().await?;
        self.render_counties().await?;

        info!("Render complete");
        Ok(())
    }

    pub async fn render_top_level(&self) -> Result<TopLevel, RenderError> {
        writer::ensure_output_dir(&self.config.output_dir).await?;
        let accepted = &self.config.accepted_parties;

        let mut senate_bop = self.config.senate_seed.clone();
        let senate = self.store.select(&Selection::chamber(Office::Senate)).await?;
        senate_bop.tally_all(&senate, accepted)?;

        let mut house_bop = self.config.house_seed.clone();
        let house = self.store.select(&Selection::chamber(Office::House)).await?;
        house_bop.tally_all(&house, accepted)?;

        debug!(
            "Senate {} uncalled, house {} uncalled",
            senate_bop.uncalled_races, house_bop.uncalled_races
        );

        let top = TopLevel::combine(senate_bop, house_bop, Utc::now());
        writer::write_json_file(&self.config.output_dir, TOP_LEVEL_FILE, &top).await?;
        Ok(top)
    }

    pub async fn render_board(&self, office: Office) -> Result<BoardDocument, RenderError> {
        writer::ensure_output_dir(&self.config.output_dir).await?;
        let rows = self
            .store
            .select(&Selection::national(office, &self.config))
            .await?;
        let serializer = Serializer::new(&self.config, Utc::now());
        let board = serializer.for_big_board(&rows, office.selection_set(), GroupKey::RaceId)?;

        let filename = board_filename(office);
        writer::write_json_file(&self.config.output_dir, &filename, &board).await?;
        info!("Rendered {} ({} rows)", filename, rows.len());
        Ok(board)
    }

    /// One `<state>.json` per distinct state, on the worker pool.
    pub async fn render_states(&self) -> Result<(), RenderError> {
        writer::ensure_output_dir(&self.config.output_dir).await?;
        let states = self.store.states().await?;
        info!("Rendering {} state files", states.len());

        let renderer = self.clone();
        pool::dispatch(
            states,
            self.config.workers,
            self.config.failure_policy,
            move |statepostal: String| {
                let renderer = renderer.clone();
                async move { renderer.render_state(&statepostal).await.map(|_| ()) }
            },
        )
        .await
    }

    pub async fn render_state(&self, statepostal: &str) -> Result<StateDocument, RenderError> {
        let serializer = Serializer::new(&self.config, Utc::now());
        let mut sections = Vec::with_capacity(Office::ALL.len());
        for office in Office::ALL {
            let rows = self
                .store
                .select(&Selection::state_detail(office, statepostal))
                .await?;
            let section = serializer.by_key(&rows, office.selection_set(), GroupKey::RaceId)?;
            sections.push((office, section));
        }
        let state = serializer.state(sections);

        writer::write_json_file(&self.config.output_dir, &state_filename(statepostal), &state)
            .await?;
        Ok(state)
    }

    /// One county file per (state, office) pair that has races.
    pub async fn render_counties(&self) -> Result<(), RenderError> {
        writer::ensure_output_dir(&self.config.output_dir).await?;
        let jobs: Vec<CountyJob> = self
            .store
            .states()
            .await?
            .into_iter()
            .flat_map(|statepostal| {
                Office::ALL.into_iter().map(move |office| CountyJob {
                    statepostal: statepostal.clone(),
                    office,
                })
            })
            .collect();
        info!("Rendering {} county units", jobs.len());

        let renderer = self.clone();
        pool::dispatch(
            jobs,
            self.config.workers,
            self.config.failure_policy,
            move |job: CountyJob| {
                let renderer = renderer.clone();
                async move {
                    renderer
                        .render_county(&job.statepostal, job.office)
                        .await
                        .map(|_| ())
                }
            },
        )
        .await
    }

    // `None` when the state has no races for the office; no file is written
    pub async fn render_county(
        &self,
        statepostal: &str,
        office: Office,
    ) -> Result<Option<FlatDocument>, RenderError> {
        let rows = self
            .store
            .select(&Selection::county_detail(office, statepostal))
            .await?;
        if rows.is_empty() {
            debug!("No {} races in {}, skipping county file", office, statepostal);
            return Ok(None);
        }

        let serializer = Serializer::new(&self.config, Utc::now());
        let set = office.selection_set().with_reporting_unit();
        let counties = serializer.by_key(&rows, set, GroupKey::FipsCode)?;

        let filename = county_filename(statepostal, office);
        writer::write_json_file(&self.config.output_dir, &filename, &counties).await?;
        Ok(Some(counties))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_lowercase() {
        assert_eq!(board_filename(Office::BallotMeasures), "ballot-measures-national.json");
        assert_eq!(state_filename("VA"), "va.json");
        assert_eq!(county_filename("ME", Office::House), "me-counties-house.json");
    }
}
