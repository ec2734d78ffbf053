//! Audio tag orchestration
//!
//! Ties the adapters, diff engine, scrubber and cover handling together. The
//! service holds no mutable state; configuration is passed per call and the
//! retag event is returned to the caller instead of being published here.

use super::parsed_info::ParsedTrackInfo;
use super::track_metadata;
use crate::error::Result;
use crate::formats::{atomic_temp_path, AdapterRegistry};
use crate::tags::diff::{self, SkipFields, TagField};
use crate::tags::{cover_art, scrub, CanonicalTag};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tagsync_common::events::{FieldChange, TagSyncEvent};
use tagsync_common::models::TrackFile;
use tagsync_common::{EventBus, TagConfig, WriteMode};
use tracing::{debug, info};

/// Why a write was not performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Tag writing is disabled by configuration
    Disabled,
    /// The file already carries the desired tags
    NoChanges,
}

/// Result of [`AudioTagService::write_tags`]
#[derive(Debug, Clone)]
pub enum WriteOutcome {
    /// Tags were written; the caller dispatches the event
    Written { event: TagSyncEvent },
    /// Nothing was written
    Skipped(SkipReason),
    /// Deferred write mode: the pending changes, nothing written
    Deferred { changes: Vec<FieldChange> },
}

impl WriteOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, WriteOutcome::Written { .. })
    }
}

/// What a retag would change, computed without writing
#[derive(Debug, Clone)]
pub struct RetagPreview {
    pub path: PathBuf,
    /// Tags on disk, with scrubbed categories zeroed
    pub current: CanonicalTag,
    /// Tags derived from the catalog, with scrubbed categories zeroed
    pub desired: CanonicalTag,
    pub changes: Vec<FieldChange>,
}

impl RetagPreview {
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// Tag read/write service
pub struct AudioTagService {
    registry: AdapterRegistry,
}

impl AudioTagService {
    pub fn new(registry: AdapterRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Parsed identity/quality view of a file (never fails)
    pub fn read_tags(&self, path: &Path) -> ParsedTrackInfo {
        ParsedTrackInfo::from(&self.read_audio_tag(path))
    }

    /// Canonical tags of a file, degraded on unreadable input
    pub fn read_audio_tag(&self, path: &Path) -> CanonicalTag {
        self.registry.read(path)
    }

    /// Desired tags of a track file, from catalog data only
    pub fn get_track_metadata(&self, track_file: &TrackFile, config: &TagConfig) -> Result<CanonicalTag> {
        track_metadata::get_track_metadata(track_file, config)
    }

    /// Compare the file's tags against the catalog
    ///
    /// When `scrub` is set the configured scrub categories are zeroed on both
    /// sides, so they are neither compared nor written.
    fn plan(&self, track_file: &TrackFile, config: &TagConfig, scrub: bool) -> Result<RetagPreview> {
        let mut desired = self.get_track_metadata(track_file, config)?;
        let mut current = self.read_audio_tag(&track_file.path);

        if scrub {
            scrub::apply_categories(&mut current, &config.scrub_categories);
            scrub::apply_categories(&mut desired, &config.scrub_categories);
        }

        let mut skip = SkipFields::computed();
        if !cover_art::should_embed(&desired, config.embed_cover_art, current.image_size) {
            skip = skip.with(TagField::ImageSize);
        }

        let changes = diff::diff_values(&current, &desired, &skip)
            .into_iter()
            .map(|(field, (old, new))| FieldChange {
                field: field.name().to_string(),
                old,
                new,
            })
            .collect();

        Ok(RetagPreview {
            path: track_file.path.clone(),
            current,
            desired,
            changes,
        })
    }

    /// Pending changes for a track file under the configured scrub policy
    pub fn preview_retag(&self, track_file: &TrackFile, config: &TagConfig) -> Result<RetagPreview> {
        self.plan(track_file, config, config.scrub_audio_tags)
    }

    /// Bring a file's tags in line with the catalog
    ///
    /// Writes only when a compared field differs, unless `force_write` is set;
    /// repeated calls with unchanged catalog data touch the file once. On a
    /// write, `track_file.size` and `track_file.modified` are refreshed from
    /// disk. A failed write propagates and leaves them untouched.
    pub fn write_tags(
        &self,
        track_file: &mut TrackFile,
        config: &TagConfig,
        scrub: bool,
        force_write: bool,
    ) -> Result<WriteOutcome> {
        if !force_write && config.write_mode == WriteMode::Disabled {
            debug!(file = %track_file.path.display(), "Tag writing disabled, skipping");
            return Ok(WriteOutcome::Skipped(SkipReason::Disabled));
        }

        let scrubbing = scrub || config.scrub_audio_tags;
        let plan = self.plan(track_file, config, scrubbing)?;

        if !plan.has_changes() && !force_write {
            debug!(file = %track_file.path.display(), "Tags already up to date");
            return Ok(WriteOutcome::Skipped(SkipReason::NoChanges));
        }

        if !force_write && config.write_mode == WriteMode::Deferred {
            debug!(
                file = %track_file.path.display(),
                changes = plan.changes.len(),
                "Deferring tag write"
            );
            return Ok(WriteOutcome::Deferred {
                changes: plan.changes,
            });
        }

        for change in &plan.changes {
            debug!(
                file = %track_file.path.display(),
                field = %change.field,
                old = %change.old,
                new = %change.new,
                "Tag change"
            );
        }

        let path = track_file.path.clone();
        if scrubbing {
            debug!(file = %path.display(), "Scrubbing existing tags");
            self.scrub_and_write(&path, &plan.desired)?;
        } else {
            self.registry.write(&path, &plan.desired)?;
        }

        let metadata = fs::metadata(&path)?;
        track_file.size = metadata.len();
        track_file.modified = DateTime::<Utc>::from(metadata.modified()?);

        info!(
            file = %path.display(),
            changes = plan.changes.len(),
            scrubbed = scrubbing,
            "Retagged file"
        );

        Ok(WriteOutcome::Written {
            event: TagSyncEvent::TrackRetagged {
                track_file_id: track_file.id,
                path,
                changes: plan.changes,
                scrubbed: scrubbing,
                timestamp: Utc::now(),
            },
        })
    }

    /// Strip and rewrite a hidden sibling copy, then rename it over the file
    ///
    /// A failure in either step leaves the original file as it was.
    fn scrub_and_write(&self, path: &Path, desired: &CanonicalTag) -> Result<()> {
        let staged = atomic_temp_path(path);
        fs::copy(path, &staged)?;

        let result = self
            .registry
            .remove_all(&staged)
            .and_then(|()| self.registry.write(&staged, desired));
        match result {
            Ok(()) => {
                fs::rename(&staged, path)?;
                Ok(())
            }
            Err(e) => {
                let _ = fs::remove_file(&staged);
                Err(e)
            }
        }
    }

    /// [`write_tags`](Self::write_tags), emitting the retag event on the bus
    pub fn write_tags_and_notify(
        &self,
        track_file: &mut TrackFile,
        config: &TagConfig,
        scrub: bool,
        force_write: bool,
        event_bus: &EventBus,
    ) -> Result<WriteOutcome> {
        let outcome = self.write_tags(track_file, config, scrub, force_write)?;
        if let WriteOutcome::Written { event } = &outcome {
            event_bus.emit_lossy(event.clone());
        }
        Ok(outcome)
    }

    /// Strip MusicBrainz identifiers from a track file's tags
    ///
    /// Returns whether the file was rewritten.
    pub fn remove_musicbrainz_tags(&self, track_file: &TrackFile) -> Result<bool> {
        scrub::strip_in_place(&self.registry, &track_file.path)
    }

    /// Strip every tag from a file
    pub fn remove_all_tags(&self, path: &Path) -> Result<()> {
        self.registry.remove_all(path)
    }

    /// Embed an image file as the file's only front cover
    pub fn embed_cover(&self, path: &Path, image_file: &Path) -> Result<()> {
        cover_art::embed(&self.registry, path, image_file)
    }
}

impl Default for AudioTagService {
    fn default() -> Self {
        Self::new(AdapterRegistry::with_default_adapters())
    }
}
