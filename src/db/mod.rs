use async_trait::async_trait;
use log::debug;
use rust_decimal::Decimal;
use std::str::FromStr;
use sqlx::{
    migrate::MigrateDatabase,
    sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow},
    QueryBuilder, Row, Sqlite,
};

use crate::error::RenderError;
use crate::models::{timestamp, Call, Level, RaceMeta, RaceResult};
use crate::resolver::{Resolution, ResultRow};
use crate::select::Selection;

pub mod memory;

pub use memory::MemoryStore;

/// Read-only view of the ingested results.
///
/// Every returned row already carries its race metadata and resolved calls;
/// a row whose race has no metadata is an error, never a silent drop.
#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn select(&self, selection: &Selection) -> Result<Vec<ResultRow>, RenderError>;

    // Distinct state postal codes, sorted
    async fn states(&self) -> Result<Vec<String>, RenderError>;
}

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn open(db_url: &str, max_connections: u32) -> Result<Self, RenderError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(db_url)
            .await?;
        Ok(Self { pool })
    }

    // Creates the database file and tables when missing; used for local runs and fixtures
    pub async fn bootstrap(db_url: &str) -> Result<Self, RenderError> {
        if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            Sqlite::create_database(db_url).await?;
        }
        let store = Self::open(db_url, 5).await?;
        store.init_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn init_schema(&self) -> Result<(), RenderError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS results (
                id INTEGER PRIMARY KEY,
                raceid TEXT NOT NULL,
                statepostal TEXT NOT NULL,
                statename TEXT NOT NULL,
                fipscode TEXT,
                reportingunitname TEXT,
                level TEXT NOT NULL,
                officename TEXT NOT NULL,
                party TEXT NOT NULL,
                first TEXT NOT NULL DEFAULT '',
                last TEXT NOT NULL DEFAULT '',
                incumbent BOOLEAN NOT NULL DEFAULT FALSE,
                runoff BOOLEAN NOT NULL DEFAULT FALSE,
                seatname TEXT,
                seatnum TEXT,
                votecount INTEGER NOT NULL DEFAULT 0,
                votepct TEXT NOT NULL DEFAULT '0',
                precinctsreporting INTEGER NOT NULL DEFAULT 0,
                precinctsreportingpct TEXT NOT NULL DEFAULT '0',
                precinctstotal INTEGER NOT NULL DEFAULT 0,
                winner BOOLEAN NOT NULL DEFAULT FALSE,
                lastupdated TEXT NOT NULL,
                is_ballot_measure BOOLEAN NOT NULL DEFAULT FALSE,
                is_special_election BOOLEAN NOT NULL DEFAULT FALSE
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS race_meta (
                raceid TEXT PRIMARY KEY,
                poll_closing TEXT,
                full_poll_closing TEXT,
                current_party TEXT,
                key_race BOOLEAN NOT NULL DEFAULT FALSE,
                voting_member BOOLEAN NOT NULL DEFAULT TRUE,
                expected TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS calls (
                result_id INTEGER PRIMARY KEY,
                accept_ap BOOLEAN NOT NULL DEFAULT TRUE,
                override_winner BOOLEAN NOT NULL DEFAULT FALSE,
                FOREIGN KEY (result_id) REFERENCES results(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn build_select(selection: &Selection) -> QueryBuilder<'_, Sqlite> {
        let mut query = QueryBuilder::new(
            r#"
            SELECT r.id, r.raceid, r.statepostal, r.statename, r.fipscode, r.reportingunitname,
                   r.level, r.officename, r.party, r.first, r.last, r.incumbent, r.runoff,
                   r.seatname, r.seatnum, r.votecount, r.votepct, r.precinctsreporting,
                   r.precinctsreportingpct, r.precinctstotal, r.winner, r.lastupdated,
                   r.is_ballot_measure, r.is_special_election,
                   m.raceid AS meta_raceid, m.poll_closing, m.full_poll_closing,
                   m.current_party, m.key_race, m.voting_member, m.expected,
                   c.accept_ap, c.override_winner
            FROM results r
            LEFT JOIN race_meta m ON m.raceid = r.raceid
            LEFT JOIN calls c ON c.result_id = r.id
            WHERE 1 = 1
            "#,
        );

        if !selection.levels.is_empty() {
            query.push(" AND r.level IN (");
            let mut levels = query.separated(", ");
            for level in &selection.levels {
                levels.push_bind(level.as_str());
            }
            levels.push_unseparated(")");
        }
        if let Some(name) = &selection.officename {
            query.push(" AND r.officename = ").push_bind(name.as_str());
        }
        if let Some(postal) = &selection.statepostal {
            query.push(" AND r.statepostal = ").push_bind(postal.as_str());
        }
        if let Some(raceids) = &selection.raceids {
            if raceids.is_empty() {
                query.push(" AND 0 = 1");
            } else {
                query.push(" AND r.raceid IN (");
                let mut ids = query.separated(", ");
                for raceid in raceids {
                    ids.push_bind(raceid.as_str());
                }
                ids.push_unseparated(")");
            }
        }
        if let Some(flag) = selection.ballot_measure {
            query.push(" AND r.is_ballot_measure = ").push_bind(flag);
        }
        if selection.exclude_special {
            query.push(" AND r.is_special_election = FALSE");
        }
        // Orphans pass the metadata flags so decode_row can reject them
        if selection.require_voting_member {
            query.push(" AND (m.raceid IS NULL OR m.voting_member = TRUE)");
        }
        if selection.require_key_race {
            query.push(" AND (m.raceid IS NULL OR m.key_race = TRUE)");
        }

        query.push(" ORDER BY r.id");
        query
    }
}

// Percentages are kept as decimal text so they survive storage exactly
fn decode_decimal(row: &SqliteRow, column: &str) -> Result<Decimal, RenderError> {
    let text: String = row.try_get(column)?;
    Decimal::from_str(&text)
        .map_err(|e| RenderError::Decode(format!("bad {} '{}': {}", column, text, e)))
}

fn decode_row(row: &SqliteRow) -> Result<ResultRow, RenderError> {
    let level_str: String = row.try_get("level")?;
    let level = Level::parse(&level_str)
        .ok_or_else(|| RenderError::Decode(format!("unknown level '{}'", level_str)))?;
    let lastupdated_str: String = row.try_get("lastupdated")?;
    let lastupdated = timestamp::parse(&lastupdated_str).map_err(RenderError::Decode)?;

    let result = RaceResult {
        id: row.try_get("id")?,
        raceid: row.try_get("raceid")?,
        statepostal: row.try_get("statepostal")?,
        statename: row.try_get("statename")?,
        fipscode: row.try_get("fipscode")?,
        reportingunitname: row.try_get("reportingunitname")?,
        level,
        officename: row.try_get("officename")?,
        party: row.try_get("party")?,
        first: row.try_get("first")?,
        last: row.try_get("last")?,
        incumbent: row.try_get("incumbent")?,
        runoff: row.try_get("runoff")?,
        seatname: row.try_get("seatname")?,
        seatnum: row.try_get("seatnum")?,
        votecount: row.try_get("votecount")?,
        votepct: decode_decimal(row, "votepct")?,
        precinctsreporting: row.try_get("precinctsreporting")?,
        precinctsreportingpct: decode_decimal(row, "precinctsreportingpct")?,
        precinctstotal: row.try_get("precinctstotal")?,
        winner: row.try_get("winner")?,
        lastupdated,
        is_ballot_measure: row.try_get("is_ballot_measure")?,
        is_special_election: row.try_get("is_special_election")?,
    };

    let meta_raceid: Option<String> = row.try_get("meta_raceid")?;
    let Some(meta_raceid) = meta_raceid else {
        return Err(RenderError::MissingMeta {
            raceid: result.raceid,
            result_id: result.id,
        });
    };
    let meta = RaceMeta {
        raceid: meta_raceid,
        poll_closing: row.try_get("poll_closing")?,
        full_poll_closing: row.try_get("full_poll_closing")?,
        current_party: row.try_get("current_party")?,
        key_race: row.try_get("key_race")?,
        voting_member: row.try_get("voting_member")?,
        expected: row.try_get("expected")?,
    };

    let accept_ap: Option<bool> = row.try_get("accept_ap")?;
    let override_winner: Option<bool> = row.try_get("override_winner")?;
    let call = accept_ap.map(|accept_ap| Call {
        accept_ap,
        override_winner: override_winner.unwrap_or(false),
    });

    let resolution = Resolution::from_call(&result, &meta, call.as_ref());
    Ok(ResultRow {
        result,
        meta,
        resolution,
    })
}

#[async_trait]
impl ResultStore for SqliteStore {
    async fn select(&self, selection: &Selection) -> Result<Vec<ResultRow>, RenderError> {
        let mut query = Self::build_select(selection);
        let rows = query.build().fetch_all(&self.pool).await?;
        debug!("selected {} result rows for {:?}", rows.len(), selection);
        rows.iter().map(decode_row).collect()
    }

    async fn states(&self) -> Result<Vec<String>, RenderError> {
        let states = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT statepostal FROM results ORDER BY statepostal",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(states)
    }
}
