use iced::widget::{button, column, container, text};
use iced::{Alignment, Element, Length};

use super::{ACCENT, MUTED};
use crate::state::data::Page;
use crate::Message;

pub fn view() -> Element<'static, Message> {
    let content = column![
        text("✨").size(56).color(ACCENT),
        text("ArtVibe").size(64),
        text(
            "Transform your space with AI-generated art. Create, edit, and \
             discover designs that perfectly match your vibe."
        )
        .size(18)
        .color(MUTED)
        .width(Length::Fixed(560.0))
        .center(),
        button(text("Generate Art Now").size(18))
            .style(button::primary)
            .padding([14, 36])
            .on_press(Message::Navigate(Page::Generate)),
    ]
    .spacing(20)
    .align_x(Alignment::Center);

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}
