//! Subnet selection for load balancers
//!
//! A load balancer can attach to at most one subnet per zone. When a zone has
//! several compatible subnets, each is scored:
//! - +1 if a master instance group runs in it (internal load balancers avoid
//!   extra hops to the control plane)
//! - +1 if it is a `Utility` subnet (the conventional internet-facing tier)
//!
//! The highest score wins; ties go to the lexically smallest name so the
//! choice is the same on every build regardless of input order.

use std::collections::BTreeSet;

use keel_common::spec::{ClusterSubnetSpec, SubnetType};
use keel_common::{Error, Result};
use tracing::debug;

use crate::context::ModelContext;

/// A candidate subnet with its score
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoredSubnet<'s> {
    /// Selection score; higher is better
    pub score: u32,
    /// The candidate
    pub subnet: &'s ClusterSubnetSpec,
}

/// Picks one subnet per zone
#[derive(Clone, Debug, Default)]
pub struct SubnetSelector<'a> {
    preferred: BTreeSet<&'a str>,
}

impl<'a> SubnetSelector<'a> {
    /// Selector preferring the given subnet names
    pub fn new(preferred: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            preferred: preferred.into_iter().collect(),
        }
    }

    /// Selector preferring every subnet a master instance group spans
    pub fn for_masters(ctx: &'a ModelContext) -> Self {
        Self::new(
            ctx.master_instance_groups()
                .flat_map(|ig| ig.spec.subnets.iter().map(String::as_str)),
        )
    }

    /// Score a single candidate
    pub fn score(&self, subnet: &ClusterSubnetSpec) -> u32 {
        let mut score = 0;
        if self.preferred.contains(subnet.name.as_str()) {
            score += 1;
        }
        if subnet.type_ == SubnetType::Utility {
            score += 1;
        }
        score
    }

    /// Order candidates best first: score descending, then name ascending
    pub fn rank<'s>(&self, candidates: &[&'s ClusterSubnetSpec]) -> Vec<ScoredSubnet<'s>> {
        let mut scored: Vec<ScoredSubnet<'s>> = candidates
            .iter()
            .map(|&subnet| ScoredSubnet {
                score: self.score(subnet),
                subnet,
            })
            .collect();
        scored.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.subnet.name.cmp(&b.subnet.name))
        });
        scored
    }

    /// Choose the subnet for `zone` among `candidates`
    ///
    /// Candidates must already be restricted to `zone` and to subnet types
    /// compatible with the load balancer. A single candidate is returned
    /// without scoring. An empty list is a configuration error.
    pub fn choose<'s>(
        &self,
        zone: &str,
        candidates: &[&'s ClusterSubnetSpec],
    ) -> Result<&'s ClusterSubnetSpec> {
        match candidates {
            [] => Err(Error::validation(format!(
                "no subnet available for zone {zone:?}"
            ))),
            [only] => Ok(*only),
            _ => {
                let ranked = self.rank(candidates);
                let (first, second) = (ranked[0], ranked[1]);
                if first.score == second.score {
                    debug!(
                        zone = %zone,
                        chosen = %first.subnet.name,
                        other = %second.subnet.name,
                        score = first.score,
                        "making arbitrary choice between subnets to attach to load balancer"
                    );
                }
                Ok(first.subnet)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fmt;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    /// Records the `chosen` field of every debug event
    #[derive(Clone, Default)]
    struct ChosenEvents(Arc<Mutex<Vec<String>>>);

    impl<S: Subscriber> Layer<S> for ChosenEvents {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() != Level::DEBUG {
                return;
            }
            let mut chosen = ChosenField(None);
            event.record(&mut chosen);
            if let Some(name) = chosen.0 {
                self.0.lock().unwrap().push(name);
            }
        }
    }

    struct ChosenField(Option<String>);

    impl Visit for ChosenField {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "chosen" {
                self.0 = Some(format!("{value:?}"));
            }
        }
    }

    /// Run `choose` under a subscriber and return the chosen name plus the
    /// names reported by tie events
    fn choose_logged(
        selector: &SubnetSelector<'_>,
        candidates: &[&ClusterSubnetSpec],
    ) -> (String, Vec<String>) {
        let events = ChosenEvents::default();
        let subscriber = tracing_subscriber::registry().with(events.clone());
        let chosen = tracing::subscriber::with_default(subscriber, || {
            selector.choose("us-east-1a", candidates).unwrap().name.clone()
        });
        let logged = events.0.lock().unwrap().clone();
        (chosen, logged)
    }

    fn subnet(name: &str, type_: SubnetType) -> ClusterSubnetSpec {
        ClusterSubnetSpec::new(name, "us-east-1a", type_)
    }

    #[rstest]
    #[case::neither("a", SubnetType::Public, 0)]
    #[case::utility_only("a", SubnetType::Utility, 1)]
    #[case::preferred_only("m", SubnetType::Private, 1)]
    #[case::preferred_utility("m", SubnetType::Utility, 2)]
    fn test_score(#[case] name: &str, #[case] type_: SubnetType, #[case] expected: u32) {
        let selector = SubnetSelector::new(["m"]);
        assert_eq!(selector.score(&subnet(name, type_)), expected);
    }

    #[test]
    fn test_single_candidate_fast_path() {
        let only = subnet("zzz", SubnetType::Public);
        // Preferences are irrelevant with one candidate
        let selector = SubnetSelector::new(["other"]);
        let chosen = selector.choose("us-east-1a", &[&only]).unwrap();
        assert_eq!(chosen.name, "zzz");
    }

    #[test]
    fn test_empty_candidates_is_error() {
        let err = SubnetSelector::default().choose("us-east-1a", &[]).unwrap_err();
        assert!(err.to_string().contains("no subnet available for zone \"us-east-1a\""));
    }

    #[test]
    fn test_tie_break_is_lexical_regardless_of_order() {
        let a = subnet("a", SubnetType::Public);
        let b = subnet("b", SubnetType::Public);
        let selector = SubnetSelector::default();

        assert_eq!(selector.choose("z", &[&a, &b]).unwrap().name, "a");
        assert_eq!(selector.choose("z", &[&b, &a]).unwrap().name, "a");
    }

    #[test]
    fn test_scoring_is_monotonic() {
        let both = subnet("z-both", SubnetType::Utility);
        let preferred = subnet("a-preferred", SubnetType::Public);
        let utility = subnet("a-utility", SubnetType::Utility);
        let neither = subnet("0-neither", SubnetType::Public);
        let selector = SubnetSelector::new(["z-both", "a-preferred"]);

        let ranked = selector.rank(&[&neither, &utility, &preferred, &both]);
        let names: Vec<&str> = ranked.iter().map(|s| s.subnet.name.as_str()).collect();
        assert_eq!(names, vec!["z-both", "a-preferred", "a-utility", "0-neither"]);
        assert_eq!(
            ranked.iter().map(|s| s.score).collect::<Vec<_>>(),
            vec![2, 1, 1, 0]
        );
    }

    #[test]
    fn test_preferred_beats_lexically_smaller_name() {
        let a = subnet("a", SubnetType::Private);
        let b = subnet("b", SubnetType::Private);
        let selector = SubnetSelector::new(["b"]);
        assert_eq!(selector.choose("z", &[&a, &b]).unwrap().name, "b");
    }

    #[test]
    fn test_tie_is_logged_once() {
        let a = subnet("a", SubnetType::Public);
        let b = subnet("b", SubnetType::Public);

        let (chosen, logged) = choose_logged(&SubnetSelector::default(), &[&b, &a]);
        assert_eq!(chosen, "a");
        assert_eq!(logged, vec!["a".to_string()]);
    }

    #[rstest]
    #[case::utility_wins(SubnetSelector::default(), SubnetType::Utility, SubnetType::Public)]
    #[case::preferred_wins(SubnetSelector::new(["b"]), SubnetType::Public, SubnetType::Public)]
    fn test_clear_winner_is_not_logged(
        #[case] selector: SubnetSelector<'static>,
        #[case] a_type: SubnetType,
        #[case] b_type: SubnetType,
    ) {
        let a = subnet("a", a_type);
        let b = subnet("b", b_type);
        let expected = if selector.score(&b) > selector.score(&a) { "b" } else { "a" };

        let (chosen, logged) = choose_logged(&selector, &[&a, &b]);
        assert_eq!(chosen, expected);
        assert!(logged.is_empty());
    }

    #[test]
    fn test_single_candidate_is_not_logged() {
        let a = subnet("a", SubnetType::Public);
        let (chosen, logged) = choose_logged(&SubnetSelector::default(), &[&a]);
        assert_eq!(chosen, "a");
        assert!(logged.is_empty());
    }
}
