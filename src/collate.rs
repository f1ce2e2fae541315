use crate::candidate::{Candidate, OtherRow, Row};

/// Bounds the width of one race's candidate list.
///
/// Once the race is reporting, candidates are ranked by vote count. Accepted
/// parties always stay; the highest ranked minor-party candidates fill any
/// display slots left over, and everyone after that is merged into a single
/// trailing "Other" row. Nothing is merged when nothing overflows.
pub fn collate_other(
    mut candidates: Vec<Candidate>,
    accepted_parties: &[String],
    display_slots: usize,
) -> Vec<Row> {
    if candidates.first().is_some_and(Candidate::is_reporting) {
        candidates.sort_by(|a, b| b.votecount.cmp(&a.votecount));
    }

    let is_accepted = |candidate: &Candidate| accepted_parties.contains(&candidate.party);
    let accepted_count = candidates.iter().filter(|&c| is_accepted(c)).count();
    let mut open_slots = display_slots.saturating_sub(accepted_count);

    let mut rows = Vec::with_capacity(candidates.len());
    let mut other: Option<OtherRow> = None;

    for candidate in candidates {
        if is_accepted(&candidate) {
            rows.push(Row::Candidate(candidate));
        } else if open_slots > 0 {
            open_slots -= 1;
            rows.push(Row::Candidate(candidate));
        } else {
            other.get_or_insert_with(OtherRow::default).absorb(&candidate);
        }
    }

    rows.extend(other.map(Row::Other));
    rows
}
