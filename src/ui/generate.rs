use iced::widget::{button, column, container, row, scrollable, text, text_input, Column};
use iced::{Alignment, Element, Length};

use super::{ButtonStyle, DANGER, MUTED};
use crate::state::app::GenerateForm;
use crate::state::data::GenerationMode;
use crate::Message;

pub fn view(form: &GenerateForm) -> Element<'_, Message> {
    let mut modes = row![].spacing(12);
    for mode in GenerationMode::ALL {
        let style: ButtonStyle = if form.mode == mode {
            button::primary
        } else {
            button::secondary
        };
        modes = modes.push(
            button(text(mode.label()))
                .style(style)
                .padding([10, 20])
                .on_press(Message::SelectMode(mode)),
        );
    }

    let mut fields: Column<Message> = column![].spacing(24).width(Length::Fill);

    if let Some(label) = form.mode.upload_label() {
        fields = fields.push(uploader(form, label));
    }

    fields = fields.push(
        column![
            text(form.mode.prompt_label()).size(14),
            text_input(form.mode.prompt_placeholder(), &form.prompt)
                .on_input_maybe((!form.is_loading).then_some(Message::PromptChanged))
                .on_submit(Message::Generate)
                .padding(14)
                .size(16),
        ]
        .spacing(8),
    );

    let label = if form.is_loading {
        "⏳ Generating..."
    } else {
        "✨ Generate"
    };
    fields = fields.push(
        button(text(label).size(18).width(Length::Fill).center())
            .style(button::primary)
            .padding(16)
            .width(Length::Fill)
            .on_press_maybe(form.can_submit().then_some(Message::Generate)),
    );

    if let Some(error) = &form.error {
        fields = fields.push(text(error).color(DANGER).width(Length::Fill).center());
    }

    let content = column![
        text("Create Your Art").size(32),
        text("Choose a method to bring your vision to life.").color(MUTED),
        modes,
        fields,
    ]
    .spacing(20)
    .padding(32)
    .max_width(680.0)
    .align_x(Alignment::Center);

    scrollable(container(content).center_x(Length::Fill))
        .height(Length::Fill)
        .into()
}

/// Picker for the image the current mode works on
fn uploader<'a>(form: &'a GenerateForm, label: &'a str) -> Element<'a, Message> {
    let hint = match form.image_for(form.mode) {
        Some(image) => text(&image.name),
        None => text("PNG, JPG, GIF up to 10MB"),
    };

    let picker = button(text("📤 Upload a file"))
        .style(button::secondary)
        .padding([10, 20]);
    let picker = if form.is_loading {
        picker
    } else {
        picker.on_press(Message::PickImage(form.mode))
    };

    column![
        text(label).size(14),
        container(
            column![picker, hint.size(12).color(MUTED)]
                .spacing(8)
                .align_x(Alignment::Center),
        )
        .padding(24)
        .width(Length::Fill)
        .center_x(Length::Fill)
        .style(container::bordered_box),
    ]
    .spacing(8)
    .into()
}
