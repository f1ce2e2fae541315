use crate::models::{Call, RaceMeta, RaceResult};

// Decision desk answers for one result row, computed by the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resolution {
    pub npr_winner: bool,
    pub pickup: bool,
    pub expected: bool,
    pub not_expected: bool,
}

impl Resolution {
    /// Folds the wire-service call and any manual override into the
    /// authoritative winner flag, then derives pickup and expectation
    /// answers from the race metadata.
    pub fn from_call(result: &RaceResult, meta: &RaceMeta, call: Option<&Call>) -> Self {
        let call = call.copied().unwrap_or_default();
        let npr_winner = if call.accept_ap {
            result.winner
        } else {
            call.override_winner
        };

        let pickup = npr_winner
            && meta
                .current_party
                .as_deref()
                .is_some_and(|current| current != result.party);

        let (expected, not_expected) = match meta.expected.as_deref() {
            Some(party) if npr_winner => (party == result.party, party != result.party),
            _ => (false, false),
        };

        Self {
            npr_winner,
            pickup,
            expected,
            not_expected,
        }
    }
}

/// A result row joined with its race metadata and resolved calls.
#[derive(Debug, Clone)]
pub struct ResultRow {
    pub result: RaceResult,
    pub meta: RaceMeta,
    pub resolution: Resolution,
}

// Capability surface the aggregator and serializer read through
pub trait Resolver {
    fn result(&self) -> &RaceResult;
    fn meta(&self) -> &RaceMeta;
    fn is_npr_winner(&self) -> bool;
    fn is_pickup(&self) -> bool;
    fn is_expected(&self) -> bool;
    fn is_not_expected(&self) -> bool;
}

impl Resolver for ResultRow {
    fn result(&self) -> &RaceResult {
        &self.result
    }

    fn meta(&self) -> &RaceMeta {
        &self.meta
    }

    fn is_npr_winner(&self) -> bool {
        self.resolution.npr_winner
    }

    fn is_pickup(&self) -> bool {
        self.resolution.pickup
    }

    fn is_expected(&self) -> bool {
        self.resolution.expected
    }

    fn is_not_expected(&self) -> bool {
        self.resolution.not_expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{meta, result};

    #[test]
    fn accepted_wire_call_passes_through() {
        let mut row = result("1", "Dem", 100);
        row.winner = true;
        let resolution = Resolution::from_call(&row, &meta("1"), None);
        assert!(resolution.npr_winner);
        assert!(!resolution.pickup);
    }

    #[test]
    fn override_replaces_wire_call() {
        let mut row = result("1", "Dem", 100);
        row.winner = true;
        let call = Call {
            accept_ap: false,
            override_winner: false,
        };
        let resolution = Resolution::from_call(&row, &meta("1"), Some(&call));
        assert!(!resolution.npr_winner);
    }

    #[test]
    fn winner_against_incumbent_party_is_pickup() {
        let mut row = result("1", "Dem", 100);
        row.winner = true;
        let mut race = meta("1");
        race.current_party = Some("GOP".to_string());
        race.expected = Some("GOP".to_string());
        let resolution = Resolution::from_call(&row, &race, None);
        assert!(resolution.pickup);
        assert!(!resolution.expected);
        assert!(resolution.not_expected);
    }

    #[test]
    fn losers_resolve_nothing() {
        let row = result("1", "GOP", 100);
        let mut race = meta("1");
        race.current_party = Some("Dem".to_string());
        race.expected = Some("GOP".to_string());
        assert_eq!(Resolution::from_call(&row, &race, None), Resolution::default());
    }
}
