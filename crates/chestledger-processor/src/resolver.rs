//! Identity resolver - reconciles parsed names with the roster

use crate::config::MatchStrategy;
use chestledger_domain::Clanmate;
use strsim::jaro_winkler;

/// Similarity of two names on a 0-100 scale
pub fn similarity(a: &str, b: &str) -> f64 {
    jaro_winkler(a, b) * 100.0
}

/// What a parsed name turned out to be
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The name is a roster member (case-insensitive)
    Known(String),
    /// The name is a typo of a roster member
    Corrected {
        /// Name as parsed
        from: String,
        /// Canonical roster name
        to: String,
        /// Similarity score
        score: f64,
    },
    /// No roster member is similar enough
    New(String),
}

impl Resolution {
    /// Name as parsed
    pub fn parsed(&self) -> &str {
        match self {
            Resolution::Known(name) | Resolution::New(name) => name,
            Resolution::Corrected { from, .. } => from,
        }
    }

    /// Name the chest should be attributed to
    pub fn canonical(&self) -> &str {
        match self {
            Resolution::Known(name) | Resolution::New(name) => name,
            Resolution::Corrected { to, .. } => to,
        }
    }
}

/// Matches names against a roster snapshot
#[derive(Debug, Clone, Copy)]
pub struct IdentityResolver {
    threshold: f64,
    strategy: MatchStrategy,
}

impl IdentityResolver {
    /// Create a resolver
    pub fn new(threshold: f64, strategy: MatchStrategy) -> Self {
        Self { threshold, strategy }
    }

    /// Roster member the name is a typo of, if any clears the threshold
    ///
    /// With [`MatchStrategy::FirstOverThreshold`] the first member in roster
    /// order over the threshold wins even when a later one is closer.
    pub fn scan<'a>(&self, name: &str, roster: &'a [Clanmate]) -> Option<(&'a Clanmate, f64)> {
        let mut scored = roster
            .iter()
            .map(|member| (member, similarity(&member.name, name)))
            .filter(|(_, score)| *score > self.threshold);

        match self.strategy {
            MatchStrategy::FirstOverThreshold => scored.next(),
            MatchStrategy::BestMatch => scored.fold(None, |best, candidate| match best {
                Some((_, best_score)) if best_score >= candidate.1 => best,
                _ => Some(candidate),
            }),
        }
    }

    /// Resolve one parsed name
    pub fn resolve(&self, name: &str, roster: &[Clanmate]) -> Resolution {
        if roster.iter().any(|member| member.matches_name(name)) {
            return Resolution::Known(name.to_string());
        }

        match self.scan(name, roster) {
            Some((member, score)) => Resolution::Corrected {
                from: name.to_string(),
                to: member.name.clone(),
                score,
            },
            None => Resolution::New(name.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(names: &[&str]) -> Vec<Clanmate> {
        names.iter().map(|n| Clanmate::new(*n)).collect()
    }

    #[test]
    fn test_exact_match_is_known() {
        let resolver = IdentityResolver::new(80.0, MatchStrategy::FirstOverThreshold);
        let members = roster(&["Iroh", "Zuko"]);
        assert_eq!(
            resolver.resolve("iroh", &members),
            Resolution::Known("iroh".to_string())
        );
    }

    #[test]
    fn test_resolution_is_idempotent_for_canonical_names() {
        let resolver = IdentityResolver::new(80.0, MatchStrategy::FirstOverThreshold);
        let members = roster(&["Katara", "Sokka"]);
        let first = resolver.resolve("Katarra", &members);
        let again = resolver.resolve(first.canonical(), &members);
        assert_eq!(again, Resolution::Known("Katara".to_string()));
    }

    #[test]
    fn test_typo_is_corrected() {
        let resolver = IdentityResolver::new(80.0, MatchStrategy::FirstOverThreshold);
        let members = roster(&["Zuko", "Katara"]);
        match resolver.resolve("Katarra", &members) {
            Resolution::Corrected { to, score, .. } => {
                assert_eq!(to, "Katara");
                assert!(score > 80.0);
            }
            other => panic!("expected correction, got {:?}", other),
        }
    }

    #[test]
    fn test_dissimilar_name_is_new() {
        let resolver = IdentityResolver::new(70.0, MatchStrategy::FirstOverThreshold);
        let members = roster(&["Bob"]);
        assert!(similarity("Bob", "Xyzzyq") < 70.0);
        assert_eq!(
            resolver.resolve("Xyzzyq", &members),
            Resolution::New("Xyzzyq".to_string())
        );
    }

    #[test]
    fn test_first_over_threshold_prefers_roster_order() {
        let members = roster(&["Aangg", "Aang1"]);
        let first = IdentityResolver::new(70.0, MatchStrategy::FirstOverThreshold);
        let best = IdentityResolver::new(70.0, MatchStrategy::BestMatch);

        assert!(similarity("Aang1", "Aang12") > similarity("Aangg", "Aang12"));
        assert_eq!(first.resolve("Aang12", &members).canonical(), "Aangg");
        assert_eq!(best.resolve("Aang12", &members).canonical(), "Aang1");
    }
}
