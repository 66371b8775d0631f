use iced::widget::image::Handle;
use iced::widget::{column, container};
use iced::{Element, Length, Task, Theme};
use rfd::FileDialog;
use std::sync::Arc;
use url::Url;

mod config;
mod gateway;
mod state;
mod ui;

use config::Config;
use gateway::media::{ImageError, SourceImage};
use gateway::{Gateway, GeminiService, GenerationError};
use state::app::{AppState, FormId, RequestToken};
use state::data::{GenerationMode, Page};
use state::session::{self, LoginConfig, LoginLaunch};
use state::store::LocalStore;
use ui::thumbnail::{ImageCache, ImageKey};

/// Namespace for every key the application persists
const STORE_NAMESPACE: &str = "artvibe";

/// Main application state
struct ArtVibe {
    /// Pages, form, overlay, gallery and login flag
    state: AppState,
    /// Client for the generation service
    gateway: Gateway,
    login: LoginConfig,
    /// Decoded images for the current view
    images: ImageCache,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    Navigate(Page),
    SelectMode(GenerationMode),
    PromptChanged(String),
    /// User clicked the uploader for the given mode
    PickImage(GenerationMode),
    /// Background read/convert of a file picked for a form completed
    ImageLoaded(FormId, GenerationMode, Result<SourceImage, ImageError>),
    /// Background decode of a record image completed
    ImageDecoded(ImageKey, Option<Handle>),
    Generate,
    /// Gateway call for the request tagged by the token completed
    GenerationFinished(RequestToken, Result<String, GenerationError>),
    CloseResult,
    SaveResult,
    ShareResult,
    GenerateAgain,
    RemoveArtwork(String),
    Login,
    Logout,
    DismissNotice,
}

impl ArtVibe {
    /// Create a new instance of the application
    fn new(config: Config, gateway: Gateway, launch_url: Option<Url>) -> (Self, Task<Message>) {
        let store = LocalStore::open_or_memory(&config.data_dir, STORE_NAMESPACE);
        let state = AppState::start(store, launch_url);

        if let Some(location) = &state.location {
            tracing::debug!("Launched from {location}");
        }

        let mut app = ArtVibe {
            state,
            gateway,
            login: config.login,
            images: ImageCache::default(),
        };
        let task = app.decode_images();

        (app, task)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        let task = self.handle(message);
        Task::batch([task, self.decode_images()])
    }

    /// Decode any newly visible record images in the background
    fn decode_images(&mut self) -> Task<Message> {
        Task::batch(self.images.sync(&self.state).into_iter().map(|job| {
            Task::perform(ui::thumbnail::decode(job), |(key, handle)| {
                Message::ImageDecoded(key, handle)
            })
        }))
    }

    fn handle(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Navigate(page) => {
                self.state.navigate(page);
                Task::none()
            }
            Message::SelectMode(mode) => {
                self.state.select_mode(mode);
                Task::none()
            }
            Message::PromptChanged(prompt) => {
                self.state.set_prompt(prompt);
                Task::none()
            }
            Message::PickImage(mode) => {
                // Show the native file picker
                let file = FileDialog::new()
                    .set_title(mode.upload_label().unwrap_or("Select an image"))
                    .add_filter("Images", &["png", "jpg", "jpeg", "gif", "webp", "bmp"])
                    .pick_file();

                match file {
                    Some(path) => {
                        tracing::debug!("Loading {}", path.display());
                        let form = self.state.form_id();
                        Task::perform(SourceImage::load(path), move |result| {
                            Message::ImageLoaded(form, mode, result)
                        })
                    }
                    None => Task::none(),
                }
            }
            Message::ImageLoaded(form, mode, result) => {
                match result {
                    Ok(image) => {
                        tracing::info!("🖼  {} ready ({} bytes)", image.name, image.bytes.len());
                        self.state.set_source_image(form, mode, image);
                    }
                    Err(e) => {
                        tracing::warn!("⚠️  {e}");
                        self.state.source_image_failed(form, e.to_string());
                    }
                }
                Task::none()
            }
            Message::ImageDecoded(key, handle) => {
                self.images.insert(key, handle);
                Task::none()
            }
            Message::Generate => {
                let Some(job) = self.state.begin_generation() else {
                    return Task::none();
                };

                tracing::info!("✨ Generating ({:?})", job.request.mode());

                let gateway = self.gateway.clone();
                let token = job.token;
                Task::perform(async move { gateway.run(job.request).await }, move |result| {
                    Message::GenerationFinished(token, result)
                })
            }
            Message::GenerationFinished(token, result) => {
                if result.is_ok() {
                    tracing::info!("✅ Generation complete");
                }
                self.state.finish_generation(token, result);
                Task::none()
            }
            Message::CloseResult => {
                self.state.close_result();
                Task::none()
            }
            Message::SaveResult => {
                self.state.save_result();
                Task::none()
            }
            Message::ShareResult => {
                self.state.share_result();
                Task::none()
            }
            Message::GenerateAgain => {
                self.state.generate_again();
                Task::none()
            }
            Message::RemoveArtwork(id) => {
                self.state.remove_artwork(&id);
                Task::none()
            }
            Message::Login => {
                let launch = session::launch_login(&self.login, |url| open::that_detached(url));
                match launch {
                    Ok(LoginLaunch::Browser) => {
                        tracing::info!("🔑 Opened Instagram authorization page");
                        Task::none()
                    }
                    Ok(LoginLaunch::Fallback(url)) => {
                        self.state.show_notice(
                            "The Instagram login link was copied to your clipboard. \
                             Open it in a browser to continue.",
                        );
                        iced::clipboard::write(url.to_string())
                    }
                    Err(e) => {
                        tracing::error!("❌ Invalid authorization URL: {e}");
                        Task::none()
                    }
                }
            }
            Message::Logout => {
                self.state.logout();
                Task::none()
            }
            Message::DismissNotice => {
                self.state.dismiss_notice();
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let page = match self.state.page {
            Page::Home => ui::home::view(),
            Page::Generate => ui::generate::view(&self.state.form),
            Page::Gallery => ui::gallery::view(self.state.gallery_for_display(), &self.images),
        };

        let base = column![
            ui::header(&self.state),
            container(page).width(Length::Fill).height(Length::Fill),
        ];

        if let Some(overlay) = &self.state.overlay {
            let content = ui::result::view(
                overlay,
                self.state.logged_in,
                &self.images,
                self.state.notice.as_deref(),
            );
            return ui::modal(base, content, Message::CloseResult);
        }

        if let Some(notice) = &self.state.notice {
            return ui::modal(base, ui::notice(notice), Message::DismissNotice);
        }

        base.into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Light
    }
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("artvibe=info")),
        )
        .init();

    let config = Config::from_env();

    let service = GeminiService::builder()
        .api_key(config.api_key.clone())
        .api_base(config.api_base.clone())
        .text_model(config.text_model.clone())
        .edit_model(config.edit_model.clone())
        .vision_model(config.vision_model.clone())
        .build();

    let gateway = match service {
        Ok(service) => Gateway::new(Arc::new(service)),
        Err(e) => {
            tracing::error!("❌ {e}. Set GEMINI_API_KEY (or API_KEY) in the environment or a .env file.");
            std::process::exit(1);
        }
    };

    // Launched via the registered redirect URI when returning from login
    let launch_url = std::env::args().nth(1).and_then(|arg| match Url::parse(&arg) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!("⚠️  Ignoring launch argument {arg:?}: {e}");
            None
        }
    });

    iced::application("ArtVibe", ArtVibe::update, ArtVibe::view)
        .theme(ArtVibe::theme)
        .centered()
        .run_with(move || ArtVibe::new(config, gateway, launch_url))
}
