/// Page/view controller
///
/// All mutable application state lives in [`AppState`] and changes only
/// through the transition methods below. Views render from a shared
/// reference; the iced shell in `main.rs` turns UI messages into calls
/// here and runs the async work they hand back.

use url::Url;

use super::data::{ArtworkRecord, GenerationMode, Page};
use super::gallery::{self, GALLERY_KEY};
use super::session::{self, LOGIN_KEY};
use super::store::LocalStore;
use crate::gateway::media::SourceImage;
use crate::gateway::{GenerationError, GenerationRequest};

pub const SHARE_NOTICE: &str = "Sharing to Instagram requires a secure server-side implementation to protect credentials. This functionality is for UI demonstration purposes only.";

/// Identifies one submission from the Generate page
///
/// A result is applied only if its token matches the one currently
/// pending; anything else is a late answer for a form that no longer
/// exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// Identifies one instance of the Generate form
///
/// Leaving the Generate page starts a new form; images picked for the old
/// one are dropped when they finish loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormId(u64);

/// Inputs captured when the user pressed Generate
#[derive(Debug, Clone)]
struct PendingGeneration {
    token: RequestToken,
    mode: GenerationMode,
    prompt: String,
    source_image: Option<String>,
}

/// Work for the shell to run after a successful submit
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub token: RequestToken,
    pub request: GenerationRequest,
}

/// State of the Generate page form
#[derive(Debug, Clone)]
pub struct GenerateForm {
    pub mode: GenerationMode,
    pub prompt: String,
    pub room_image: Option<SourceImage>,
    pub edit_image: Option<SourceImage>,
    pub is_loading: bool,
    pub error: Option<String>,
    pending: Option<PendingGeneration>,
}

impl Default for GenerateForm {
    fn default() -> Self {
        Self {
            mode: GenerationMode::FromRoom,
            prompt: String::new(),
            room_image: None,
            edit_image: None,
            is_loading: false,
            error: None,
            pending: None,
        }
    }
}

impl GenerateForm {
    /// Image chosen for `mode`, if that mode takes one
    pub fn image_for(&self, mode: GenerationMode) -> Option<&SourceImage> {
        match mode {
            GenerationMode::FromRoom => self.room_image.as_ref(),
            GenerationMode::Edit => self.edit_image.as_ref(),
            GenerationMode::FromText => None,
        }
    }

    /// Whether the Generate button is enabled
    pub fn can_submit(&self) -> bool {
        if self.is_loading || self.prompt.is_empty() {
            return false;
        }
        !self.mode.requires_source_image() || self.image_for(self.mode).is_some()
    }
}

/// The generated record currently shown in the overlay
#[derive(Debug, Clone, PartialEq)]
pub struct ResultOverlay {
    pub record: ArtworkRecord,
    /// Set once the user pressed Save in this overlay
    pub saved: bool,
}

/// Application state owned by the controller
#[derive(Debug)]
pub struct AppState {
    pub page: Page,
    pub overlay: Option<ResultOverlay>,
    pub logged_in: bool,
    pub gallery: Vec<ArtworkRecord>,
    pub form: GenerateForm,
    /// Transient message shown on top of the current view
    pub notice: Option<String>,
    /// Launch URL, without its query once a login code was consumed
    pub location: Option<Url>,
    store: LocalStore,
    next_token: u64,
    form_id: FormId,
}

impl AppState {
    /// Restore persisted state and consume a login redirect, if any
    pub fn start(store: LocalStore, launch_url: Option<Url>) -> Self {
        let gallery: Vec<ArtworkRecord> = store.read(GALLERY_KEY, Vec::new());
        let logged_in = store.read(LOGIN_KEY, false);

        tracing::info!("🎨 ArtVibe initialized with {} saved artworks", gallery.len());

        let mut state = AppState {
            page: Page::Home,
            overlay: None,
            logged_in,
            gallery,
            form: GenerateForm::default(),
            notice: None,
            location: None,
            store,
            next_token: 0,
            form_id: FormId(0),
        };

        if let Some(url) = launch_url {
            let redirect = session::take_redirect(&url);
            if redirect.code.is_some() {
                tracing::info!("🔑 Login redirect received");
                state.set_logged_in(true);
            }
            state.location = Some(redirect.location);
        }

        state
    }

    /// Switch pages. Leaving the Generate page discards its form.
    pub fn navigate(&mut self, page: Page) {
        if page == self.page {
            return;
        }
        if self.page == Page::Generate {
            if self.form.pending.is_some() {
                tracing::debug!("Generate page left with a request in flight");
            }
            self.form = GenerateForm::default();
            self.form_id = FormId(self.form_id.0 + 1);
        }
        self.page = page;
    }

    pub fn select_mode(&mut self, mode: GenerationMode) {
        self.form.mode = mode;
    }

    pub fn set_prompt(&mut self, prompt: String) {
        if !self.form.is_loading {
            self.form.prompt = prompt;
        }
    }

    /// The form currently on the Generate page
    pub fn form_id(&self) -> FormId {
        self.form_id
    }

    /// Store the image picked for `mode` in `form`, if that form still exists
    pub fn set_source_image(&mut self, form: FormId, mode: GenerationMode, image: SourceImage) {
        if form != self.form_id {
            tracing::debug!(?form, "dropping image picked for a discarded form");
            return;
        }
        match mode {
            GenerationMode::FromRoom => self.form.room_image = Some(image),
            GenerationMode::Edit => self.form.edit_image = Some(image),
            GenerationMode::FromText => {}
        }
    }

    /// Show a problem with a picked image inline
    pub fn source_image_failed(&mut self, form: FormId, message: String) {
        if form != self.form_id {
            return;
        }
        self.form.error = Some(message);
    }

    /// Start a generation if the form allows it
    pub fn begin_generation(&mut self) -> Option<GenerationJob> {
        if !self.form.can_submit() {
            return None;
        }

        let mode = self.form.mode;
        let prompt = self.form.prompt.clone();
        let source = self.form.image_for(mode).cloned();

        let request = match (mode, source.clone()) {
            (GenerationMode::FromRoom, Some(room)) => GenerationRequest::FromRoom {
                room,
                prompt: prompt.clone(),
            },
            (GenerationMode::Edit, Some(source)) => GenerationRequest::Edit {
                source,
                prompt: prompt.clone(),
            },
            (GenerationMode::FromText, _) => GenerationRequest::FromText {
                prompt: prompt.clone(),
            },
            // can_submit() guarantees an image for image modes
            (_, None) => return None,
        };

        self.next_token += 1;
        let token = RequestToken(self.next_token);

        self.form.is_loading = true;
        self.form.error = None;
        self.form.pending = Some(PendingGeneration {
            token,
            mode,
            prompt,
            source_image: source.map(|image| image.to_data_uri()),
        });

        Some(GenerationJob { token, request })
    }

    /// Apply a finished generation. Results for any other token are dropped.
    pub fn finish_generation(&mut self, token: RequestToken, result: Result<String, GenerationError>) {
        let pending = match self.form.pending.take() {
            Some(pending) if pending.token == token => pending,
            other => {
                self.form.pending = other;
                tracing::debug!(?token, "dropping stale generation result");
                return;
            }
        };

        self.form.is_loading = false;

        let generated_image = match result {
            Ok(uri) => uri,
            Err(e) => {
                self.form.error = Some(e.to_string());
                return;
            }
        };

        match gallery::create_record(pending.mode, pending.prompt, generated_image, pending.source_image) {
            Ok(record) => {
                self.overlay = Some(ResultOverlay {
                    record,
                    saved: false,
                });
            }
            Err(e) => {
                tracing::error!("❌ Generated artwork rejected: {e}");
                self.form.error = Some("Generation failed to return an image.".to_string());
            }
        }
    }

    pub fn close_result(&mut self) {
        self.overlay = None;
        self.notice = None;
    }

    pub fn generate_again(&mut self) {
        self.close_result();
        self.navigate(Page::Generate);
    }

    /// Save the record shown in the overlay. Returns true if the gallery grew.
    pub fn save_result(&mut self) -> bool {
        let Some(overlay) = self.overlay.as_mut() else {
            return false;
        };
        overlay.saved = true;

        if gallery::contains(&self.gallery, &overlay.record.id) {
            return false;
        }

        let record = overlay.record.clone();
        let current = std::mem::take(&mut self.gallery);
        self.gallery = gallery::save_to_gallery(record, current);
        self.persist_gallery();

        tracing::info!("💾 Saved artwork, gallery now holds {}", self.gallery.len());
        true
    }

    /// Delete a record from the gallery
    pub fn remove_artwork(&mut self, id: &str) {
        if !gallery::contains(&self.gallery, id) {
            return;
        }

        let current = std::mem::take(&mut self.gallery);
        self.gallery = gallery::remove_from_gallery(id, current);
        self.persist_gallery();
    }

    /// Gallery in display order (newest first)
    pub fn gallery_for_display(&self) -> Vec<&ArtworkRecord> {
        gallery::sorted_for_display(&self.gallery)
    }

    /// Share is only offered to logged-in users and only shows a notice
    pub fn share_result(&mut self) {
        if self.logged_in && self.overlay.is_some() {
            self.notice = Some(SHARE_NOTICE.to_string());
        }
    }

    pub fn show_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn logout(&mut self) {
        self.set_logged_in(false);
    }

    fn set_logged_in(&mut self, logged_in: bool) {
        self.logged_in = logged_in;
        if let Err(e) = self.store.write(LOGIN_KEY, &logged_in) {
            tracing::warn!("⚠️  Could not persist login flag: {e}");
        }
    }

    fn persist_gallery(&self) {
        if let Err(e) = self.store.write(GALLERY_KEY, &self.gallery) {
            tracing::warn!("⚠️  Could not persist gallery: {e}");
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &LocalStore {
        &self.store
    }
}
