use chrono::{DateTime, Utc};

use crate::candidate::Candidate;

/// Freshest `lastupdated` across groups that have begun reporting.
///
/// Groups with no precincts in carry placeholder timestamps and are skipped.
/// `None` means nothing is live yet.
pub fn freshest<'a, I>(groups: I) -> Option<DateTime<Utc>>
where
    I: IntoIterator<Item = &'a [Candidate]>,
{
    groups
        .into_iter()
        .filter(|group| group.iter().any(Candidate::is_reporting))
        .flat_map(|group| group.iter().map(|candidate| candidate.lastupdated))
        .max()
}

pub fn latest(stamps: impl IntoIterator<Item = Option<DateTime<Utc>>>) -> Option<DateTime<Utc>> {
    stamps.into_iter().flatten().max()
}
