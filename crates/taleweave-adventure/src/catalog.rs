//! The adventure catalog: lookup by id, loaded from JSON.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use taleweave_protocol::AdventureId;

use crate::{Adventure, CatalogError, Round, RoundOutcome};

/// A short listing entry for the routing layer's adventure index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdventureSummary {
    pub id: AdventureId,
    pub title: String,
    pub description: String,
}

/// Immutable directory of adventures, keyed by id.
///
/// Built once at process start (from a JSON file or the builtin set)
/// and shared read-only behind an `Arc`. Nothing mutates it afterwards.
pub struct AdventureCatalog {
    adventures: HashMap<AdventureId, Adventure>,
}

impl AdventureCatalog {
    /// Builds a catalog from a list of adventures, validating each one.
    pub fn new(
        adventures: Vec<Adventure>,
    ) -> Result<Self, CatalogError> {
        let mut map = HashMap::with_capacity(adventures.len());
        for adventure in adventures {
            validate(&adventure)?;
            tracing::debug!(
                id = %adventure.id,
                title = %adventure.title,
                rounds = adventure.rounds.len(),
                "catalog adventure loaded"
            );
            map.insert(adventure.id, adventure);
        }
        tracing::info!(adventures = map.len(), "adventure catalog ready");
        Ok(Self { adventures: map })
    }

    /// Parses a catalog from a JSON array of adventures.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let adventures: Vec<Adventure> = serde_json::from_str(json)?;
        Self::new(adventures)
    }

    /// Loads a catalog from a JSON file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// A small builtin catalog for demos and tests.
    pub fn builtin() -> Self {
        let adventures = vec![Adventure {
            id: AdventureId(1),
            title: "The Hollow Lighthouse".into(),
            description: "A storm-lashed rescue on the north shore".into(),
            rounds: vec![
                Round {
                    text: "The lighthouse door hangs open. Inside, the \
                           stairs spiral up into darkness; a cellar hatch \
                           gapes at your feet."
                        .into(),
                    choices: vec![
                        "Climb the stairs".into(),
                        "Descend into the cellar".into(),
                    ],
                    next_rounds: vec![Some(1), Some(2)],
                },
                Round {
                    text: "The lamp room is cold. Through the cracked \
                           glass you spot a rowboat foundering on the \
                           rocks below."
                        .into(),
                    choices: vec![
                        "Signal with the lamp".into(),
                        "Run back down to the shore".into(),
                    ],
                    next_rounds: vec![None, Some(2)],
                },
                Round {
                    text: "Waves hammer the causeway. The keeper clings \
                           to a mooring post, shouting over the gale."
                        .into(),
                    choices: vec![
                        "Throw the rope".into(),
                        "Wade in after them".into(),
                    ],
                    next_rounds: vec![None, None],
                },
            ],
        }];

        // Builtin content is validated by construction; new() only
        // fails on malformed adventures.
        match Self::new(adventures) {
            Ok(catalog) => catalog,
            Err(_) => Self { adventures: HashMap::new() },
        }
    }

    /// Looks up an adventure by id.
    pub fn get(&self, id: AdventureId) -> Option<&Adventure> {
        self.adventures.get(&id)
    }

    /// Returns `true` if `id` is a known adventure.
    pub fn contains(&self, id: AdventureId) -> bool {
        self.adventures.contains_key(&id)
    }

    /// Returns the round at `round_index` of an adventure.
    pub fn round(
        &self,
        id: AdventureId,
        round_index: usize,
    ) -> Result<&Round, CatalogError> {
        let adventure = self
            .get(id)
            .ok_or(CatalogError::AdventureNotFound(id))?;
        adventure
            .round(round_index)
            .ok_or(CatalogError::RoundOutOfRange { adventure: id, round_index })
    }

    /// Maps a winning choice through the adventure's transition table.
    pub fn resolve_next_round(
        &self,
        id: AdventureId,
        round_index: usize,
        choice_index: usize,
    ) -> Result<RoundOutcome, CatalogError> {
        let round = self.round(id, round_index)?;
        match round.next_rounds.get(choice_index) {
            Some(Some(next)) => Ok(RoundOutcome::Next(*next)),
            Some(None) => Ok(RoundOutcome::Finished),
            None => Err(CatalogError::ChoiceOutOfRange {
                adventure: id,
                round_index,
                choice_index,
            }),
        }
    }

    /// Lists every adventure as a summary, sorted by id.
    pub fn summaries(&self) -> Vec<AdventureSummary> {
        let mut entries: Vec<AdventureSummary> = self
            .adventures
            .values()
            .map(|a| AdventureSummary {
                id: a.id,
                title: a.title.clone(),
                description: a.description.clone(),
            })
            .collect();
        entries.sort_by_key(|e| e.id.0);
        entries
    }

    /// Number of adventures in the catalog.
    pub fn len(&self) -> usize {
        self.adventures.len()
    }

    /// Returns `true` if the catalog holds no adventures.
    pub fn is_empty(&self) -> bool {
        self.adventures.is_empty()
    }
}

/// Structural validation: every round must offer at least one choice and
/// every transition target must point at an existing round.
fn validate(adventure: &Adventure) -> Result<(), CatalogError> {
    let id = adventure.id;
    if adventure.rounds.is_empty() {
        return Err(CatalogError::InvalidAdventure {
            adventure: id,
            reason: "adventure has no rounds".into(),
        });
    }
    for (index, round) in adventure.rounds.iter().enumerate() {
        if round.choices.is_empty() {
            return Err(CatalogError::InvalidAdventure {
                adventure: id,
                reason: format!("round {index} has no choices"),
            });
        }
        if round.next_rounds.len() != round.choices.len() {
            return Err(CatalogError::InvalidAdventure {
                adventure: id,
                reason: format!(
                    "round {index} has {} choices but {} transitions",
                    round.choices.len(),
                    round.next_rounds.len()
                ),
            });
        }
        for target in round.next_rounds.iter().flatten() {
            if *target >= adventure.rounds.len() {
                return Err(CatalogError::InvalidAdventure {
                    adventure: id,
                    reason: format!(
                        "round {index} points at missing round {target}"
                    ),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_round_adventure() -> Adventure {
        Adventure {
            id: AdventureId(7),
            title: "Test".into(),
            description: "d".into(),
            rounds: vec![
                Round {
                    text: "first".into(),
                    choices: vec!["a".into(), "b".into()],
                    next_rounds: vec![Some(1), None],
                },
                Round {
                    text: "second".into(),
                    choices: vec!["c".into()],
                    next_rounds: vec![None],
                },
            ],
        }
    }

    #[test]
    fn test_get_known_and_unknown_adventure() {
        let catalog = AdventureCatalog::new(vec![two_round_adventure()]).unwrap();
        assert!(catalog.get(AdventureId(7)).is_some());
        assert!(catalog.get(AdventureId(99)).is_none());
        assert!(catalog.contains(AdventureId(7)));
    }

    #[test]
    fn test_resolve_next_round_continues() {
        let catalog = AdventureCatalog::new(vec![two_round_adventure()]).unwrap();
        let outcome = catalog.resolve_next_round(AdventureId(7), 0, 0).unwrap();
        assert_eq!(outcome, RoundOutcome::Next(1));
    }

    #[test]
    fn test_resolve_next_round_terminal() {
        let catalog = AdventureCatalog::new(vec![two_round_adventure()]).unwrap();
        let outcome = catalog.resolve_next_round(AdventureId(7), 0, 1).unwrap();
        assert_eq!(outcome, RoundOutcome::Finished);
    }

    #[test]
    fn test_resolve_next_round_choice_out_of_range() {
        let catalog = AdventureCatalog::new(vec![two_round_adventure()]).unwrap();
        let result = catalog.resolve_next_round(AdventureId(7), 0, 5);
        assert!(matches!(
            result,
            Err(CatalogError::ChoiceOutOfRange { choice_index: 5, .. })
        ));
    }

    #[test]
    fn test_round_out_of_range() {
        let catalog = AdventureCatalog::new(vec![two_round_adventure()]).unwrap();
        let result = catalog.round(AdventureId(7), 9);
        assert!(matches!(
            result,
            Err(CatalogError::RoundOutOfRange { round_index: 9, .. })
        ));
    }

    #[test]
    fn test_new_rejects_mismatched_transition_table() {
        let mut bad = two_round_adventure();
        bad.rounds[0].next_rounds.pop();
        let result = AdventureCatalog::new(vec![bad]);
        assert!(matches!(result, Err(CatalogError::InvalidAdventure { .. })));
    }

    #[test]
    fn test_new_rejects_dangling_transition_target() {
        let mut bad = two_round_adventure();
        bad.rounds[0].next_rounds[0] = Some(42);
        let result = AdventureCatalog::new(vec![bad]);
        assert!(matches!(result, Err(CatalogError::InvalidAdventure { .. })));
    }

    #[test]
    fn test_new_rejects_empty_rounds() {
        let bad = Adventure {
            id: AdventureId(1),
            title: "t".into(),
            description: "d".into(),
            rounds: vec![],
        };
        assert!(AdventureCatalog::new(vec![bad]).is_err());
    }

    #[test]
    fn test_from_json_str() {
        let json = r#"[{
            "id": 3,
            "title": "Json Tale",
            "description": "loaded from text",
            "rounds": [
                {
                    "text": "start",
                    "choices": ["go", "stay"],
                    "next_rounds": [null, null]
                }
            ]
        }]"#;
        let catalog = AdventureCatalog::from_json_str(json).unwrap();
        let adventure = catalog.get(AdventureId(3)).unwrap();
        assert_eq!(adventure.title, "Json Tale");
        assert_eq!(adventure.rounds[0].choices.len(), 2);
    }

    #[test]
    fn test_from_json_str_rejects_garbage() {
        assert!(AdventureCatalog::from_json_str("nope").is_err());
    }

    #[test]
    fn test_builtin_catalog_is_usable() {
        let catalog = AdventureCatalog::builtin();
        assert!(!catalog.is_empty());
        let adventure = catalog.get(AdventureId(1)).unwrap();
        assert!(!adventure.rounds.is_empty());
    }

    #[test]
    fn test_summaries_sorted_by_id() {
        let mut second = two_round_adventure();
        second.id = AdventureId(2);
        let mut first = two_round_adventure();
        first.id = AdventureId(1);
        let catalog = AdventureCatalog::new(vec![second, first]).unwrap();
        let summaries = catalog.summaries();
        assert_eq!(summaries[0].id, AdventureId(1));
        assert_eq!(summaries[1].id, AdventureId(2));
    }
}
