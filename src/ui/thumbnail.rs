use iced::widget::image::Handle;
use image::imageops::FilterType;
use image::RgbaImage;
use std::collections::HashMap;

use crate::gateway::media::decode_data_uri;
use crate::state::app::AppState;

/// Size of gallery thumbnails (square bounding box)
const THUMBNAIL_SIZE: u32 = 320;

/// Which rendition of a record an entry holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rendition {
    /// Full-size generated image (result overlay)
    Generated,
    /// Full-size uploaded image (result overlay)
    Source,
    /// Downscaled generated image (gallery grid)
    Thumbnail,
}

/// Record id plus rendition
pub type ImageKey = (String, Rendition);

#[derive(Debug)]
enum Entry {
    /// Decode job handed out, result not back yet
    Pending,
    Ready(Handle),
    /// Undecodable; never retried
    Failed,
}

/// One image to decode off the UI thread
#[derive(Debug, Clone)]
pub struct DecodeJob {
    pub key: ImageKey,
    pub uri: String,
}

/// Decoded image handles for everything currently on screen
///
/// Records carry their images as data URIs. `sync` hands out a job for
/// each image that is needed and not yet known; the results come back
/// through `insert`. Entries are forgotten when the record leaves the
/// screen.
#[derive(Debug, Default)]
pub struct ImageCache {
    entries: HashMap<ImageKey, Entry>,
}

impl ImageCache {
    pub fn get(&self, id: &str, rendition: Rendition) -> Option<&Handle> {
        match self.entries.get(&(id.to_string(), rendition)) {
            Some(Entry::Ready(handle)) => Some(handle),
            _ => None,
        }
    }

    /// Drop entries nothing shows any more and return jobs for new ones
    pub fn sync(&mut self, state: &AppState) -> Vec<DecodeJob> {
        let mut wanted: Vec<(ImageKey, &str)> = Vec::new();

        if let Some(overlay) = &state.overlay {
            let record = &overlay.record;
            wanted.push(((record.id.clone(), Rendition::Generated), &record.generated_image));
            if let Some(source) = &record.source_image {
                wanted.push(((record.id.clone(), Rendition::Source), source));
            }
        }

        for record in &state.gallery {
            wanted.push(((record.id.clone(), Rendition::Thumbnail), &record.generated_image));
        }

        self.entries
            .retain(|key, _| wanted.iter().any(|(wanted_key, _)| wanted_key == key));

        let mut jobs = Vec::new();
        for (key, uri) in wanted {
            if self.entries.contains_key(&key) {
                continue;
            }
            self.entries.insert(key.clone(), Entry::Pending);
            jobs.push(DecodeJob {
                key,
                uri: uri.to_string(),
            });
        }

        if !jobs.is_empty() {
            tracing::debug!("🖼  Decoding {} image(s)", jobs.len());
        }
        tracing::trace!(cached = self.len(), "image cache synced");
        jobs
    }

    /// Store a decode result; ignored if the image is no longer wanted
    pub fn insert(&mut self, key: ImageKey, handle: Option<Handle>) {
        let Some(entry) = self.entries.get_mut(&key) else {
            return;
        };

        *entry = match handle {
            Some(handle) => Entry::Ready(handle),
            None => {
                tracing::warn!("⚠️  Could not decode {:?} image for {}", key.1, key.0);
                Entry::Failed
            }
        };
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Run a decode job on the blocking pool
pub async fn decode(job: DecodeJob) -> (ImageKey, Option<Handle>) {
    let DecodeJob { key, uri } = job;
    let rendition = key.1;

    let handle = tokio::task::spawn_blocking(move || decode_blocking(rendition, &uri))
        .await
        .unwrap_or_else(|e| {
            tracing::error!("❌ Decode task failed: {e}");
            None
        });

    (key, handle)
}

fn decode_blocking(rendition: Rendition, uri: &str) -> Option<Handle> {
    let (_, bytes) = decode_data_uri(uri).ok()?;

    match rendition {
        // iced decodes the encoded bytes itself
        Rendition::Generated | Rendition::Source => Some(Handle::from_bytes(bytes)),
        Rendition::Thumbnail => {
            let thumbnail = thumbnail(&bytes)?;
            let (width, height) = thumbnail.dimensions();
            Some(Handle::from_rgba(width, height, thumbnail.into_raw()))
        }
    }
}

/// Decode and downscale to fit the thumbnail box
fn thumbnail(bytes: &[u8]) -> Option<RgbaImage> {
    let img = image::load_from_memory(bytes).ok()?;
    Some(
        img.resize(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Lanczos3)
            .to_rgba8(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::GenerationMode;
    use crate::state::gallery::create_record;
    use crate::state::store::LocalStore;
    use base64::Engine;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([10, 120, 200]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn png_uri(width: u32, height: u32) -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(png_bytes(width, height))
        )
    }

    fn state_with(uris: &[String]) -> (AppState, Vec<String>) {
        let mut state = AppState::start(LocalStore::in_memory("artvibe"), None);
        let mut ids = Vec::new();
        for uri in uris {
            let record = create_record(GenerationMode::FromText, "p", uri.clone(), None).unwrap();
            ids.push(record.id.clone());
            state.gallery.push(record);
        }
        (state, ids)
    }

    #[test]
    fn test_thumbnail_fits_bounding_box() {
        let wide = thumbnail(&png_bytes(800, 400)).unwrap();
        assert_eq!(wide.dimensions(), (320, 160));

        let tall = thumbnail(&png_bytes(300, 900)).unwrap();
        assert_eq!(tall.dimensions(), (107, 320));

        assert!(thumbnail(b"not an image").is_none());
    }

    #[test]
    fn test_sync_hands_out_each_job_once() {
        let (state, ids) = state_with(&[png_uri(16, 16)]);
        let mut cache = ImageCache::default();

        let jobs = cache.sync(&state);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].key, (ids[0].clone(), Rendition::Thumbnail));

        // Still pending: nothing new to do, nothing to show yet
        assert!(cache.sync(&state).is_empty());
        assert!(cache.get(&ids[0], Rendition::Thumbnail).is_none());
    }

    #[tokio::test]
    async fn test_decoded_thumbnail_is_cached() {
        let (mut state, ids) = state_with(&[png_uri(16, 16)]);
        let mut cache = ImageCache::default();

        for job in cache.sync(&state) {
            let (key, handle) = decode(job).await;
            assert!(handle.is_some());
            cache.insert(key, handle);
        }

        assert!(cache.get(&ids[0], Rendition::Thumbnail).is_some());
        assert!(cache.get(&ids[0], Rendition::Generated).is_none());
        assert!(cache.sync(&state).is_empty());

        state.gallery.clear();
        assert!(cache.sync(&state).is_empty());
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test]
    async fn test_undecodable_image_is_not_retried() {
        let truncated = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&png_bytes(64, 64)[..40])
        );
        let (mut state, ids) = state_with(&[truncated]);
        let mut cache = ImageCache::default();

        let jobs = cache.sync(&state);
        assert_eq!(jobs.len(), 1);
        let (key, handle) = decode(jobs.into_iter().next().unwrap()).await;
        assert!(handle.is_none());
        cache.insert(key, handle);

        for keystroke in ["a", "ab", "abc"] {
            state.set_prompt(keystroke.into());
            assert!(cache.sync(&state).is_empty());
        }
        assert!(cache.get(&ids[0], Rendition::Thumbnail).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_late_result_for_removed_record_is_ignored() {
        let (mut state, ids) = state_with(&[png_uri(8, 8)]);
        let mut cache = ImageCache::default();

        let job = cache.sync(&state).remove(0);
        state.gallery.clear();
        cache.sync(&state);

        let handle = decode_blocking(job.key.1, &job.uri);
        cache.insert(job.key, handle);
        assert!(cache.get(&ids[0], Rendition::Thumbnail).is_none());
        assert_eq!(cache.len(), 0);
    }
}
