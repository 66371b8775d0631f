use iced::widget::{button, column, container, image, row, scrollable, text, Space};
use iced::{Alignment, ContentFit, Element, Length, Pixels};
use iced_aw::Wrap;

use super::thumbnail::{ImageCache, Rendition};
use super::MUTED;
use crate::state::data::ArtworkRecord;
use crate::Message;

const CARD_WIDTH: f32 = 300.0;
const CARD_IMAGE_HEIGHT: f32 = 280.0;

pub fn view<'a>(artworks: Vec<&'a ArtworkRecord>, images: &'a ImageCache) -> Element<'a, Message> {
    if artworks.is_empty() {
        return empty();
    }

    let cards: Vec<Element<'a, Message>> = artworks
        .into_iter()
        .map(|artwork| card(artwork, images))
        .collect();

    let grid = Wrap::with_elements(cards)
        .spacing(Pixels(20.0))
        .line_spacing(Pixels(20.0));

    let content = column![text("Your Saved Creations").size(32), grid]
        .spacing(28)
        .padding(32)
        .align_x(Alignment::Center);

    scrollable(container(content).center_x(Length::Fill))
        .height(Length::Fill)
        .into()
}

fn empty() -> Element<'static, Message> {
    container(
        column![
            text("🖼").size(56).color(MUTED),
            text("Your gallery is empty").size(26),
            text("Start creating to see your artworks here.").color(MUTED),
        ]
        .spacing(8)
        .align_x(Alignment::Center),
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .center_x(Length::Fill)
    .center_y(Length::Fill)
    .into()
}

fn card<'a>(artwork: &'a ArtworkRecord, images: &'a ImageCache) -> Element<'a, Message> {
    let preview: Element<'a, Message> = match images.get(&artwork.id, Rendition::Thumbnail) {
        Some(handle) => image(handle.clone())
            .width(Length::Fill)
            .height(Length::Fixed(CARD_IMAGE_HEIGHT))
            .content_fit(ContentFit::Cover)
            .into(),
        None => container(text("Preview unavailable").color(MUTED))
            .width(Length::Fill)
            .height(Length::Fixed(CARD_IMAGE_HEIGHT))
            .center_x(Length::Fill)
            .center_y(Length::Fixed(CARD_IMAGE_HEIGHT))
            .into(),
    };

    let footer = row![
        text(&artwork.prompt).size(14).width(Length::Fill),
        Space::with_width(8),
        button(text("🗑"))
            .style(button::danger)
            .padding([6, 10])
            .on_press(Message::RemoveArtwork(artwork.id.clone())),
    ]
    .align_y(Alignment::Center);

    container(column![preview, footer].spacing(12))
        .padding(12)
        .width(Length::Fixed(CARD_WIDTH))
        .style(container::rounded_box)
        .into()
}
