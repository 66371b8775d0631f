use iced::widget::{button, column, container, horizontal_space, image, row, scrollable, text, Row};
use iced::{Alignment, ContentFit, Element, Length};

use super::thumbnail::{ImageCache, Rendition};
use super::MUTED;
use crate::state::app::ResultOverlay;
use crate::Message;

const PANEL_WIDTH: f32 = 920.0;
const IMAGE_HEIGHT: f32 = 380.0;

/// Overlay content for a freshly generated artwork
pub fn view<'a>(
    overlay: &'a ResultOverlay,
    logged_in: bool,
    images: &'a ImageCache,
    notice: Option<&'a str>,
) -> Element<'a, Message> {
    let record = &overlay.record;

    let title = row![
        horizontal_space(),
        text("Your ArtVibe Creation").size(26),
        horizontal_space(),
        button(text("✕"))
            .style(button::text)
            .on_press(Message::CloseResult),
    ]
    .align_y(Alignment::Center);

    let mut pictures = Row::new().spacing(24).align_y(Alignment::Center);
    if record.source_image.is_some() {
        pictures = pictures.push(picture("Original", images, &record.id, Rendition::Source));
    }
    pictures = pictures.push(picture(
        "Generated Art",
        images,
        &record.id,
        Rendition::Generated,
    ));

    let save = if overlay.saved {
        button(text("Saved!")).style(button::secondary)
    } else {
        button(text("💾 Save to Gallery"))
            .style(button::primary)
            .on_press(Message::SaveResult)
    };

    let share = button(text("📷 Share on Instagram"))
        .style(button::success)
        .on_press_maybe(logged_in.then_some(Message::ShareResult));

    let actions = row![
        save.padding([12, 24]),
        share.padding([12, 24]),
        button(text("🔄 Generate Again"))
            .style(button::secondary)
            .padding([12, 24])
            .on_press(Message::GenerateAgain),
    ]
    .spacing(16);

    let mut content = column![
        title,
        pictures,
        text(format!("Prompt: \"{}\"", record.prompt))
            .size(14)
            .color(MUTED),
        actions,
    ]
    .spacing(24)
    .align_x(Alignment::Center);

    if !logged_in {
        content = content.push(text("Please log in to share").size(12).color(MUTED));
    }

    if let Some(message) = notice {
        content = content.push(super::notice(message));
    }

    container(scrollable(content))
        .padding(28)
        .max_width(PANEL_WIDTH)
        .style(container::rounded_box)
        .into()
}

fn picture<'a>(
    caption: &'a str,
    images: &'a ImageCache,
    id: &str,
    rendition: Rendition,
) -> Element<'a, Message> {
    let body: Element<'a, Message> = match images.get(id, rendition) {
        Some(handle) => image(handle.clone())
            .width(Length::Fill)
            .height(Length::Fixed(IMAGE_HEIGHT))
            .content_fit(ContentFit::Contain)
            .into(),
        None => container(text("Image unavailable").color(MUTED))
            .height(Length::Fixed(IMAGE_HEIGHT))
            .center_y(Length::Fixed(IMAGE_HEIGHT))
            .into(),
    };

    column![text(caption).size(16), body]
        .spacing(8)
        .width(Length::Fill)
        .align_x(Alignment::Center)
        .into()
}
