/// User interface module
///
/// Views are plain functions from application state to widgets:
/// - Header and page navigation (this file)
/// - Landing page (home.rs)
/// - Generation form (generate.rs)
/// - Saved artworks grid (gallery.rs)
/// - Result overlay (result.rs)
/// - Decoded image handles (thumbnail.rs)

pub mod gallery;
pub mod generate;
pub mod home;
pub mod result;
pub mod thumbnail;

use iced::widget::{button, center, container, horizontal_space, mouse_area, opaque, row, stack, text};
use iced::{Alignment, Color, Element, Length, Theme};

use crate::state::app::AppState;
use crate::state::data::Page;
use crate::Message;

/// Brand accent (sunflower yellow)
pub const ACCENT: Color = Color::from_rgb(1.0, 0.827, 0.0);

/// Error text
pub const DANGER: Color = Color::from_rgb(0.86, 0.15, 0.15);

/// Secondary text
pub const MUTED: Color = Color::from_rgb(0.42, 0.45, 0.5);

type ButtonStyle = fn(&Theme, button::Status) -> button::Style;

/// Logo, page links and the login control
pub fn header(state: &AppState) -> Element<'_, Message> {
    let logo = button(text("✨ ArtVibe").size(24))
        .style(button::text)
        .on_press(Message::Navigate(Page::Home));

    let mut nav = row![].spacing(8).align_y(Alignment::Center);

    for page in [Page::Home, Page::Generate, Page::Gallery] {
        let style: ButtonStyle = if state.page == page {
            button::secondary
        } else {
            button::text
        };
        nav = nav.push(
            button(text(page.title()))
                .style(style)
                .padding([6, 12])
                .on_press(Message::Navigate(page)),
        );
    }

    let session = if state.logged_in {
        button(text("Logout"))
            .style(button::text)
            .padding([6, 12])
            .on_press(Message::Logout)
    } else {
        button(text("Login"))
            .style(button::primary)
            .padding([6, 16])
            .on_press(Message::Login)
    };

    container(
        row![logo, horizontal_space(), nav, session]
            .spacing(16)
            .align_y(Alignment::Center),
    )
    .padding([12, 20])
    .width(Length::Fill)
    .style(container::bordered_box)
    .into()
}

/// Lay `content` over `base` on a dimmed backdrop; clicking the backdrop
/// sends `on_blur`
pub fn modal<'a>(
    base: impl Into<Element<'a, Message>>,
    content: impl Into<Element<'a, Message>>,
    on_blur: Message,
) -> Element<'a, Message> {
    stack![
        base.into(),
        opaque(
            mouse_area(center(opaque(content)).style(|_theme| {
                container::Style {
                    background: Some(
                        Color {
                            a: 0.75,
                            ..Color::BLACK
                        }
                        .into(),
                    ),
                    ..container::Style::default()
                }
            }))
            .on_press(on_blur)
        )
    ]
    .into()
}

/// Small dismissable message box
pub fn notice(message: &str) -> Element<'_, Message> {
    container(
        row![
            text(message).width(Length::Fill),
            button(text("OK"))
                .style(button::primary)
                .on_press(Message::DismissNotice),
        ]
        .spacing(16)
        .align_y(Alignment::Center),
    )
    .padding(20)
    .max_width(480.0)
    .style(container::rounded_box)
    .into()
}
