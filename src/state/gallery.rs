/// Artwork record lifecycle
///
/// Records are created from a successful generation, inserted into the
/// gallery on save and dropped again on delete. All operations here are
/// pure: persistence is handled by the caller.

use super::data::{ArtworkRecord, GenerationMode};

/// Storage key of the gallery inside the local store
pub const GALLERY_KEY: &str = "gallery";

/// Inputs that would break the record invariants
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("mode {0:?} needs a source image")]
    MissingSourceImage(GenerationMode),

    #[error("mode {0:?} does not take a source image")]
    UnexpectedSourceImage(GenerationMode),

    #[error("generated image is empty")]
    EmptyGeneratedImage,
}

/// Build a new record with a fresh identifier and the current time
pub fn create_record(
    mode: GenerationMode,
    prompt: impl Into<String>,
    generated_image: impl Into<String>,
    source_image: Option<String>,
) -> Result<ArtworkRecord, RecordError> {
    let generated_image = generated_image.into();
    if generated_image.is_empty() {
        return Err(RecordError::EmptyGeneratedImage);
    }

    match (mode.requires_source_image(), &source_image) {
        (true, None) => return Err(RecordError::MissingSourceImage(mode)),
        (false, Some(_)) => return Err(RecordError::UnexpectedSourceImage(mode)),
        _ => {}
    }

    Ok(ArtworkRecord {
        id: uuid::Uuid::new_v4().to_string(),
        source_image,
        generated_image,
        prompt: prompt.into(),
        mode,
        timestamp: chrono::Utc::now().timestamp_millis(),
    })
}

/// Whether a record with this identifier is already saved
pub fn contains(gallery: &[ArtworkRecord], id: &str) -> bool {
    gallery.iter().any(|item| item.id == id)
}

/// Prepend `record`, unless one with the same identifier is already saved
pub fn save_to_gallery(record: ArtworkRecord, gallery: Vec<ArtworkRecord>) -> Vec<ArtworkRecord> {
    if contains(&gallery, &record.id) {
        return gallery;
    }

    let mut updated = Vec::with_capacity(gallery.len() + 1);
    updated.push(record);
    updated.extend(gallery);
    updated
}

/// Drop the record with identifier `id` (no-op if absent)
pub fn remove_from_gallery(id: &str, mut gallery: Vec<ArtworkRecord>) -> Vec<ArtworkRecord> {
    gallery.retain(|item| item.id != id);
    gallery
}

/// Records ordered for display, newest first. The stored order is untouched.
pub fn sorted_for_display(gallery: &[ArtworkRecord]) -> Vec<&ArtworkRecord> {
    let mut sorted: Vec<&ArtworkRecord> = gallery.iter().collect();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, timestamp: i64) -> ArtworkRecord {
        ArtworkRecord {
            id: id.into(),
            source_image: None,
            generated_image: format!("data:image/png;base64,{id}"),
            prompt: format!("prompt {id}"),
            mode: GenerationMode::FromText,
            timestamp,
        }
    }

    fn sample_galleries() -> Vec<Vec<ArtworkRecord>> {
        vec![
            vec![],
            vec![record("a", 1)],
            vec![record("c", 3), record("b", 2), record("a", 1)],
        ]
    }

    #[test]
    fn test_save_new_record_prepends() {
        for gallery in sample_galleries() {
            let before = gallery.len();
            let new = record("new", 99);

            let updated = save_to_gallery(new.clone(), gallery);

            assert_eq!(updated.len(), before + 1);
            assert_eq!(updated[0], new);
        }
    }

    #[test]
    fn test_save_existing_record_is_idempotent() {
        for gallery in sample_galleries().into_iter().filter(|g| !g.is_empty()) {
            let existing = gallery[gallery.len() - 1].clone();
            let updated = save_to_gallery(existing, gallery.clone());
            assert_eq!(updated, gallery);
        }
    }

    #[test]
    fn test_save_same_record_twice_adds_once() {
        let new = record("twice", 5);
        let once = save_to_gallery(new.clone(), vec![record("a", 1)]);
        let twice = save_to_gallery(new, once.clone());
        assert_eq!(twice.len(), 2);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_remove_present_record() {
        let gallery = vec![record("c", 3), record("b", 2), record("a", 1)];
        let updated = remove_from_gallery("b", gallery.clone());

        assert_eq!(updated.len(), gallery.len() - 1);
        assert!(!contains(&updated, "b"));
        assert_eq!(updated[0].id, "c");
        assert_eq!(updated[1].id, "a");
    }

    #[test]
    fn test_remove_absent_record_is_noop() {
        for gallery in sample_galleries() {
            let updated = remove_from_gallery("missing", gallery.clone());
            assert_eq!(updated, gallery);
        }
    }

    #[test]
    fn test_sorted_for_display_newest_first() {
        let gallery = vec![record("old", 1), record("newest", 30), record("mid", 10)];
        let ids: Vec<&str> = sorted_for_display(&gallery)
            .into_iter()
            .map(|r| r.id.as_str())
            .collect();

        assert_eq!(ids, vec!["newest", "mid", "old"]);
        // Stored order unchanged
        assert_eq!(gallery[0].id, "old");
    }

    #[test]
    fn test_create_record_from_text() {
        let record = create_record(
            GenerationMode::FromText,
            "a cyberpunk city street",
            "data:image/png;base64,AAA",
            None,
        )
        .unwrap();

        assert_eq!(record.mode, GenerationMode::FromText);
        assert!(record.source_image.is_none());
        assert_eq!(record.generated_image, "data:image/png;base64,AAA");
        assert_eq!(record.prompt, "a cyberpunk city street");
        assert!(record.timestamp > 0);
        assert!(!record.id.is_empty());
    }

    #[test]
    fn test_create_record_unique_ids() {
        let a = create_record(GenerationMode::FromText, "p", "data:,x", None).unwrap();
        let b = create_record(GenerationMode::FromText, "p", "data:,x", None).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_create_record_enforces_source_image_invariant() {
        assert_eq!(
            create_record(GenerationMode::Edit, "p", "data:,x", None),
            Err(RecordError::MissingSourceImage(GenerationMode::Edit))
        );
        assert_eq!(
            create_record(GenerationMode::FromText, "p", "data:,x", Some("data:,y".into())),
            Err(RecordError::UnexpectedSourceImage(GenerationMode::FromText))
        );
        assert_eq!(
            create_record(GenerationMode::FromRoom, "p", "", Some("data:,y".into())),
            Err(RecordError::EmptyGeneratedImage)
        );

        let room = create_record(GenerationMode::FromRoom, "p", "data:,x", Some("data:,y".into()))
            .unwrap();
        assert_eq!(room.source_image.as_deref(), Some("data:,y"));
    }
}
