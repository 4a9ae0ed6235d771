// Migration report - terminal outcome of every entity plus run counters
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use content_store::{Collection, DocumentId};
use migrate_shared::{EntityKey, EntityKind};
use tracing::{debug, info, warn};

use crate::loader::{EntityStore, LoadSummary};

/// Why an entity produced no destination write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The upload's backing file is not in the assets directory.
    MissingFile,
    /// The upload carries no `hash`, so its file cannot be located.
    MissingHash,
    /// The entity has no `locale`.
    NoLocale,
    /// A translation whose default-locale record was never created.
    NoDefaultCounterpart,
    /// A project sharing its slug with one whose creation failed.
    DuplicateSlug,
    /// A content type the migrator does not write.
    UnsupportedType,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::MissingFile => "backing file missing",
            Self::MissingHash => "no file hash",
            Self::NoLocale => "no locale",
            Self::NoDefaultCounterpart => "no default-locale counterpart",
            Self::DuplicateSlug => "duplicate slug of a failed project",
            Self::UnsupportedType => "unsupported type",
        };
        f.write_str(reason)
    }
}

/// Terminal state of one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityOutcome {
    /// A new destination record was created.
    Created(DocumentId),
    /// An existing destination media record was reused.
    Reused(DocumentId),
    /// A duplicate-slug project mapped onto the first record with that slug.
    MappedToDuplicate(DocumentId),
    /// Translated fields were written onto the counterpart's record.
    Localized(DocumentId),
    Skipped(SkipReason),
    Failed(String),
}

impl EntityOutcome {
    /// Destination record the entity ended up on, if any.
    pub fn document_id(&self) -> Option<&DocumentId> {
        match self {
            Self::Created(id)
            | Self::Reused(id)
            | Self::MappedToDuplicate(id)
            | Self::Localized(id) => Some(id),
            Self::Skipped(_) | Self::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Outcome totals for one entity kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub created: usize,
    pub reused: usize,
    pub duplicates: usize,
    pub localized: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl OutcomeCounts {
    fn add(&mut self, outcome: &EntityOutcome) {
        match outcome {
            EntityOutcome::Created(_) => self.created += 1,
            EntityOutcome::Reused(_) => self.reused += 1,
            EntityOutcome::MappedToDuplicate(_) => self.duplicates += 1,
            EntityOutcome::Localized(_) => self.localized += 1,
            EntityOutcome::Skipped(_) => self.skipped += 1,
            EntityOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.created + self.reused + self.duplicates + self.localized + self.skipped + self.failed
    }
}

/// Result of updating categories with their skill lists.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BackfillSummary {
    pub updated: usize,
    pub failed: usize,
}

/// Everything a migration run did.
#[derive(Debug, Default, Clone)]
pub struct MigrationReport {
    pub load: LoadSummary,
    /// Records removed per collection by the pre-migration wipe.
    pub wiped: Vec<(Collection, usize)>,
    pub wipe_failures: Vec<(Collection, String)>,
    pub backfill: BackfillSummary,
    pub elapsed: Duration,
    outcomes: BTreeMap<EntityKey, EntityOutcome>,
}

impl MigrationReport {
    pub fn new(load: LoadSummary) -> Self {
        Self {
            load,
            ..Self::default()
        }
    }

    /// Record the terminal state of `key`. An entity keeps its first outcome.
    pub fn record(&mut self, key: EntityKey, outcome: EntityOutcome) -> bool {
        use std::collections::btree_map::Entry;

        match self.outcomes.entry(key) {
            Entry::Occupied(existing) => {
                debug!(
                    entity = %existing.key(),
                    outcome = ?existing.get(),
                    "Outcome already recorded"
                );
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(outcome);
                true
            }
        }
    }

    pub fn outcome(&self, key: &EntityKey) -> Option<&EntityOutcome> {
        self.outcomes.get(key)
    }

    pub fn outcomes(&self) -> impl Iterator<Item = (&EntityKey, &EntityOutcome)> {
        self.outcomes.iter()
    }

    pub fn counts(&self, kind: &EntityKind) -> OutcomeCounts {
        let mut counts = OutcomeCounts::default();
        for outcome in self
            .outcomes
            .iter()
            .filter(|(key, _)| &key.kind == kind)
            .map(|(_, outcome)| outcome)
        {
            counts.add(outcome);
        }
        counts
    }

    pub fn failures(&self) -> Vec<(&EntityKey, &str)> {
        self.outcomes
            .iter()
            .filter_map(|(key, outcome)| match outcome {
                EntityOutcome::Failed(reason) => Some((key, reason.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.values().any(EntityOutcome::is_failed) || !self.wipe_failures.is_empty()
    }

    /// Close the report: entities no phase touched are unsupported types.
    pub fn finish(&mut self, entities: &EntityStore, elapsed: Duration) {
        for entity in entities.iter() {
            self.outcomes
                .entry(entity.key())
                .or_insert(EntityOutcome::Skipped(SkipReason::UnsupportedType));
        }
        self.elapsed = elapsed;
    }

    pub fn log_summary(&self) {
        info!("=== Migration Complete ===");
        info!("Total time: {:.2}s", self.elapsed.as_secs_f64());
        info!(
            "Entities: {} ({} malformed lines)",
            self.load.entity_lines.parsed, self.load.entity_lines.malformed
        );
        info!(
            "Links: {} recorded, {} ignored ({} malformed lines)",
            self.load.links.recorded, self.load.links.ignored, self.load.link_lines.malformed
        );
        for (collection, deleted) in &self.wiped {
            info!("Wiped {}: {}", collection, deleted);
        }

        for kind in [
            EntityKind::Upload,
            EntityKind::SkillCategory,
            EntityKind::Skill,
            EntityKind::SoftwareProject,
        ] {
            let c = self.counts(&kind);
            info!(
                "{}: created={} reused={} duplicates={} localized={} skipped={} failed={}",
                kind, c.created, c.reused, c.duplicates, c.localized, c.skipped, c.failed
            );
        }
        info!(
            "Category back-fill: {} updated, {} failed",
            self.backfill.updated, self.backfill.failed
        );

        for (collection, error) in &self.wipe_failures {
            warn!(collection = %collection, error = %error, "Wipe failed");
        }
        for (key, reason) in self.failures() {
            warn!(entity = %key, error = %reason, "Failed");
        }
    }
}
