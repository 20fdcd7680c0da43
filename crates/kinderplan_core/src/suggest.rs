//! crates/kinderplan_core/src/suggest.rs
//!
//! The activity suggestion service: cache, then the remote generative
//! backend, then a built-in offline table, in that strict order. No tier
//! is allowed to surface an error; planning must keep working through an
//! AI outage, a missing credential, or a corrupt cache.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{mint_id, Activity, ActivityType, AgeGroup};
use crate::ports::{ActivityGenerator, StorageBackend, SuggestionRequest};

/// The storage slot holding the suggestion cache: one JSON map from
/// normalized request key to activity list.
pub const AI_CACHE_SLOT: &str = "dpb_ai_cache_v1";

/// Whole-cache size ceiling. Exceeding it discards the cache entirely
/// rather than evicting entries; the cache never grows unboundedly.
const CACHE_MAX_BYTES: usize = 500_000;

/// Which tier produced a suggestion set. Always disclosed to the caller so
/// the educator can judge how much to trust the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Ai,
    Cache,
    Offline,
}

/// A resolved suggestion set. Every activity carries a freshly minted id,
/// the requested age group, and a cleared template flag.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestions {
    pub activities: Vec<Activity>,
    pub source: Source,
}

//=========================================================================================
// SuggestionService
//=========================================================================================

/// Resolves activity suggestions through the cache / remote / offline chain.
///
/// The generator is optional: when no credential is configured, the remote
/// tier is simply skipped. `online` reflects environment connectivity and
/// gates the remote tier the same way.
pub struct SuggestionService {
    storage: Arc<dyn StorageBackend>,
    generator: Option<Arc<dyn ActivityGenerator>>,
    online: bool,
}

impl SuggestionService {
    pub fn new(
        storage: Arc<dyn StorageBackend>,
        generator: Option<Arc<dyn ActivityGenerator>>,
        online: bool,
    ) -> Self {
        Self {
            storage,
            generator,
            online,
        }
    }

    /// Produces a non-empty suggestion set for the request. Infallible:
    /// every path terminates in a successful result.
    pub async fn suggest(&self, request: SuggestionRequest) -> Suggestions {
        let key = cache_key(&request);

        // 1. Cache.
        if let Some(activities) = self.read_cache().remove(&key) {
            debug!(key, "serving suggestions from local cache");
            return Suggestions {
                activities,
                source: Source::Cache,
            };
        }

        // 2. Remote, only with a configured generator and connectivity.
        if self.online {
            if let Some(generator) = &self.generator {
                match generator.generate(&request).await {
                    Ok(items) if !items.is_empty() => {
                        let activities: Vec<Activity> = items
                            .into_iter()
                            .map(|item| Activity {
                                id: mint_id("ai"),
                                title: item.title,
                                activity_type: ActivityType::from_label(&item.type_label),
                                objective: item.objective,
                                materials: item.materials,
                                description: item.description,
                                age_group: request.age_group,
                                is_template: false,
                            })
                            .collect();
                        self.write_cache(&key, &activities);
                        return Suggestions {
                            activities,
                            source: Source::Ai,
                        };
                    }
                    Ok(_) => {
                        warn!("generator returned an empty set; using offline templates");
                    }
                    Err(err) => {
                        // 3. Absorbed; fall through to the offline tier.
                        warn!(error = %err, "activity generation failed; using offline templates");
                    }
                }
            }
        }

        // 4. Offline fallback, guaranteed to succeed.
        Suggestions {
            activities: offline_fallback(request.age_group),
            source: Source::Offline,
        }
    }

    /// Loads the cache map. A missing, unreadable or corrupt slot reads as
    /// an empty cache.
    fn read_cache(&self) -> HashMap<String, Vec<Activity>> {
        let raw = match self.storage.read(AI_CACHE_SLOT) {
            Ok(Some(raw)) => raw,
            Ok(None) => return HashMap::new(),
            Err(err) => {
                warn!(error = %err, "suggestion cache read failed");
                return HashMap::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(error = %err, "discarding corrupt suggestion cache");
            HashMap::new()
        })
    }

    /// Inserts one entry and persists the cache, unless the serialized
    /// whole would exceed the size ceiling, in which case the slot is
    /// dropped and the cache rebuilds from empty on the next write.
    /// Failures are logged and absorbed.
    fn write_cache(&self, key: &str, activities: &[Activity]) {
        let mut cache = self.read_cache();
        cache.insert(key.to_string(), activities.to_vec());
        match serde_json::to_string(&cache) {
            Ok(raw) if raw.len() > CACHE_MAX_BYTES => {
                debug!(bytes = raw.len(), "suggestion cache over limit; resetting");
                if let Err(err) = self.storage.remove(AI_CACHE_SLOT) {
                    warn!(error = %err, "suggestion cache reset failed");
                }
            }
            Ok(raw) => {
                if let Err(err) = self.storage.write(AI_CACHE_SLOT, &raw) {
                    warn!(error = %err, "suggestion cache write failed");
                }
            }
            Err(err) => {
                warn!(error = %err, "suggestion cache serialization failed");
            }
        }
    }
}

/// Canonicalizes a request into its cache key: the lowercase alphanumeric
/// residue of `{age}_{theme}_{materials}`.
fn cache_key(request: &SuggestionRequest) -> String {
    format!(
        "{}_{}_{}",
        request.age_group, request.theme, request.materials
    )
    .to_lowercase()
    .chars()
    .filter(char::is_ascii_alphanumeric)
    .collect()
}

//=========================================================================================
// Offline Fallback Table
//=========================================================================================

type OfflineEntry = (&'static str, ActivityType, &'static str, &'static str, &'static str);

// (title, type, objective, description, materials) per age group. Three
// low-prep activities each, enough to hand the educator a usable day.
fn offline_bucket(age_group: AgeGroup) -> &'static [OfflineEntry] {
    match age_group {
        AgeGroup::Infant => &[
            (
                "Sensory Bottles",
                ActivityType::Sensory,
                "Visual tracking and auditory stimulation",
                "Fill clear bottles with water, glitter, and beads. Seal tight.",
                "Plastic bottles, water, glitter, glue",
            ),
            (
                "Texture Touch",
                ActivityType::Sensory,
                "Tactile exploration",
                "Let infants touch different fabrics (soft, rough, bumpy).",
                "Fabric scraps",
            ),
            (
                "Mirror Play",
                ActivityType::General,
                "Self-recognition and social emotional development",
                "Tummy time in front of a low mirror.",
                "Unbreakable mirror",
            ),
        ],
        AgeGroup::Toddler => &[
            (
                "Color Sorting",
                ActivityType::General,
                "Color recognition and fine motor skills",
                "Sort large pom-poms into matching colored bowls.",
                "Pom-poms, colored bowls",
            ),
            (
                "Bubble Chase",
                ActivityType::Outdoor,
                "Gross motor movement and hand-eye coordination",
                "Blow bubbles and encourage children to pop them.",
                "Bubbles",
            ),
            (
                "Playdough Fun",
                ActivityType::Art,
                "Fine motor strength and creativity",
                "Free manipulation of playdough.",
                "Playdough, plastic tools",
            ),
        ],
        AgeGroup::Preschool => &[
            (
                "Nature Collage",
                ActivityType::Art,
                "Creativity and nature appreciation",
                "Glue collected leaves and sticks onto paper.",
                "Nature items, glue, paper",
            ),
            (
                "Shape Scavenger Hunt",
                ActivityType::General,
                "Shape recognition",
                "Find items in the room that match specific shapes.",
                "None",
            ),
            (
                "Freeze Dance",
                ActivityType::Music,
                "Listening skills and self-regulation",
                "Dance when music plays, freeze when it stops.",
                "Music player",
            ),
        ],
        AgeGroup::PreK => &[
            (
                "Letter Tracing",
                ActivityType::Literacy,
                "Letter recognition and writing skills",
                "Trace letters in sand or shaving cream.",
                "Trays, sand/shaving cream",
            ),
            (
                "Simple Science: Sink or Float",
                ActivityType::General,
                "Scientific inquiry and prediction",
                "Predict and test which items sink or float in water.",
                "Water bin, various objects",
            ),
            (
                "Obstacle Course",
                ActivityType::GrossMotor,
                "Gross motor planning and balance",
                "Navigate through a simple course.",
                "Cones, tunnel, balance beam",
            ),
        ],
        AgeGroup::GradeSchool => &[
            (
                "Journal Writing",
                ActivityType::Literacy,
                "Creative writing and reflection",
                "Write or draw about a specific prompt.",
                "Journals, pencils",
            ),
            (
                "Team Building Game",
                ActivityType::General,
                "Cooperation and communication",
                "Group challenges to solve a problem together.",
                "Varies",
            ),
            (
                "Art Project",
                ActivityType::Art,
                "Fine motor skills and artistic expression",
                "Multi-step art project.",
                "Art supplies",
            ),
        ],
    }
}

/// Builds the offline suggestion set for an age group, minting fresh ids
/// the same way the remote tier does.
fn offline_fallback(age_group: AgeGroup) -> Vec<Activity> {
    offline_bucket(age_group)
        .iter()
        .map(|(title, activity_type, objective, description, materials)| Activity {
            id: mint_id("offline"),
            title: (*title).to_string(),
            activity_type: *activity_type,
            objective: (*objective).to_string(),
            materials: (*materials).to_string(),
            description: (*description).to_string(),
            age_group,
            is_template: false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{GeneratedActivity, PortError, PortResult};
    use crate::store::MemoryBackend;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A counting generator stub: either succeeds with canned items or
    /// fails, and records how many times it was called.
    struct StubGenerator {
        calls: AtomicUsize,
        items: Result<Vec<GeneratedActivity>, String>,
    }

    impl StubGenerator {
        fn succeeding(count: usize, description: &str) -> Self {
            let items = (0..count)
                .map(|i| GeneratedActivity {
                    title: format!("Generated Activity {i}"),
                    objective: "Practice a skill".to_string(),
                    description: description.to_string(),
                    materials: "Household items".to_string(),
                    type_label: "Art".to_string(),
                })
                .collect();
            Self {
                calls: AtomicUsize::new(0),
                items: Ok(items),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                items: Err(message.to_string()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ActivityGenerator for StubGenerator {
        async fn generate(
            &self,
            _request: &SuggestionRequest,
        ) -> PortResult<Vec<GeneratedActivity>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.items {
                Ok(items) => Ok(items.clone()),
                Err(message) => Err(PortError::Generation(message.clone())),
            }
        }
    }

    fn request(theme: &str) -> SuggestionRequest {
        SuggestionRequest {
            age_group: AgeGroup::Toddler,
            theme: theme.to_string(),
            materials: "paper, glue".to_string(),
        }
    }

    fn service(
        storage: Arc<MemoryBackend>,
        generator: Option<Arc<StubGenerator>>,
        online: bool,
    ) -> SuggestionService {
        SuggestionService::new(
            storage,
            generator.map(|g| g as Arc<dyn ActivityGenerator>),
            online,
        )
    }

    #[test]
    fn cache_keys_are_lowercase_alphanumeric() {
        let req = SuggestionRequest {
            age_group: AgeGroup::PreK,
            theme: "Fall / Harvest!".to_string(),
            materials: "Paint & Paper".to_string(),
        };
        assert_eq!(cache_key(&req), "prekfallharvestpaintpaper");
    }

    #[tokio::test]
    async fn cache_hit_returns_without_calling_the_generator() {
        let storage = Arc::new(MemoryBackend::new());
        let cached = offline_fallback(AgeGroup::Toddler);
        let mut cache = HashMap::new();
        cache.insert(cache_key(&request("fall")), cached.clone());
        storage
            .write(AI_CACHE_SLOT, &serde_json::to_string(&cache).unwrap())
            .unwrap();

        let generator = Arc::new(StubGenerator::succeeding(3, "fresh"));
        let service = service(Arc::clone(&storage), Some(Arc::clone(&generator)), true);

        let result = service.suggest(request("fall")).await;
        assert_eq!(result.source, Source::Cache);
        assert_eq!(result.activities, cached);
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn no_generator_means_offline_with_a_non_empty_set() {
        let service = service(Arc::new(MemoryBackend::new()), None, true);
        let result = service.suggest(request("ocean")).await;
        assert_eq!(result.source, Source::Offline);
        assert!(!result.activities.is_empty());
        for activity in &result.activities {
            assert_eq!(activity.age_group, AgeGroup::Toddler);
            assert!(!activity.is_template);
        }
    }

    #[tokio::test]
    async fn offline_mode_skips_a_configured_generator() {
        let generator = Arc::new(StubGenerator::succeeding(3, "unused"));
        let service = service(
            Arc::new(MemoryBackend::new()),
            Some(Arc::clone(&generator)),
            false,
        );
        let result = service.suggest(request("ocean")).await;
        assert_eq!(result.source, Source::Offline);
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn generated_activities_are_minted_stamped_and_cached() {
        let storage = Arc::new(MemoryBackend::new());
        let generator = Arc::new(StubGenerator::succeeding(3, "short"));
        let service = service(Arc::clone(&storage), Some(generator), true);

        let result = service.suggest(request("space")).await;
        assert_eq!(result.source, Source::Ai);
        assert_eq!(result.activities.len(), 3);
        let mut ids: Vec<&str> = result.activities.iter().map(|a| a.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
        for activity in &result.activities {
            assert!(activity.id.starts_with("ai_"));
            assert_eq!(activity.age_group, AgeGroup::Toddler);
            assert_eq!(activity.activity_type, ActivityType::Art);
            assert!(!activity.is_template);
        }

        // A second identical request is served from the cache.
        let again = service.suggest(request("space")).await;
        assert_eq!(again.source, Source::Cache);
        assert_eq!(again.activities, result.activities);
    }

    #[tokio::test]
    async fn generator_failure_falls_through_without_caching() {
        let storage = Arc::new(MemoryBackend::new());
        let generator = Arc::new(StubGenerator::failing("quota exhausted"));
        let service = service(Arc::clone(&storage), Some(Arc::clone(&generator)), true);

        let result = service.suggest(request("dinosaurs")).await;
        assert_eq!(result.source, Source::Offline);
        assert_eq!(generator.call_count(), 1);
        assert!(storage.read(AI_CACHE_SLOT).unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_cache_reads_as_empty_and_gets_rebuilt() {
        let storage = Arc::new(MemoryBackend::new());
        storage.write(AI_CACHE_SLOT, "]]] nonsense").unwrap();
        let generator = Arc::new(StubGenerator::succeeding(2, "short"));
        let service = service(Arc::clone(&storage), Some(generator), true);

        let result = service.suggest(request("farm")).await;
        assert_eq!(result.source, Source::Ai);

        let raw = storage.read(AI_CACHE_SLOT).unwrap().unwrap();
        let cache: HashMap<String, Vec<Activity>> = serde_json::from_str(&raw).unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn oversized_cache_resets_to_a_single_entry_on_the_next_write() {
        let storage = Arc::new(MemoryBackend::new());
        // Each generated set serializes to roughly 300 KB, so the second
        // entry pushes the whole cache past the 500 KB ceiling.
        let big = "x".repeat(300_000);
        let generator = Arc::new(StubGenerator::succeeding(1, &big));
        let service = service(Arc::clone(&storage), Some(generator), true);

        service.suggest(request("theme one")).await;
        assert!(storage.read(AI_CACHE_SLOT).unwrap().is_some());

        service.suggest(request("theme two")).await;
        // Over the ceiling: the slot was dropped outright.
        assert!(storage.read(AI_CACHE_SLOT).unwrap().is_none());

        service.suggest(request("theme three")).await;
        let raw = storage.read(AI_CACHE_SLOT).unwrap().unwrap();
        let cache: HashMap<String, Vec<Activity>> = serde_json::from_str(&raw).unwrap();
        assert_eq!(cache.len(), 1);
    }
}
