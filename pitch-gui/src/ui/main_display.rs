//! # Main Display Module
//!
//! This module contains the main display components and layout logic
//! for the pitchscope window.

use iced::widget::{button, column, container, row, scrollable, text, Space};
use iced::{Alignment, Color, Element, Length};

use super::spectrum_bars;

/// Creates the complete main application view
pub fn create_main_view(
    data: &crate::AppDisplayData,
    capture_message: crate::Message,
) -> Element<'static, crate::Message> {
    let title = text("pitchscope").size(28);

    let controls = row![
        make_capture_button(data.capturing, capture_message),
        Space::with_width(15),
        text(data.status.clone().unwrap_or_default()).size(14),
    ]
    .align_y(Alignment::Center);

    let main_content = column![
        title,
        Space::with_height(20),
        controls,
        Space::with_height(10),
        create_reading_panel(data),
        create_spectrum_panel(data),
        create_notes_panel(data),
    ]
    .width(Length::Fill)
    .spacing(10)
    .padding(20);

    container(main_content)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// Note and volume readouts.
fn create_reading_panel(data: &crate::AppDisplayData) -> Element<'static, crate::Message> {
    container(
        column![
            text(data.note_text.clone()).size(24),
            text(data.volume_text.clone()).size(18),
        ]
        .spacing(8)
        .padding(15),
    )
    .width(Length::Fill)
    .into()
}

/// Creates the live spectrum panel.
fn create_spectrum_panel(data: &crate::AppDisplayData) -> Element<'static, crate::Message> {
    let spectrum_content = container(spectrum_bars::SpectrumBars::new(data.spectrum.clone()).view())
        .width(Length::Fill)
        .height(Length::Fill);

    container(
        column![text("Spectrum").size(18), Space::with_height(10), spectrum_content]
            .spacing(5)
            .padding(15),
    )
    .width(Length::Fill)
    .height(Length::Fixed(250.0))
    .into()
}

/// Lists the notes found in the last recording.
fn create_notes_panel(data: &crate::AppDisplayData) -> Element<'static, crate::Message> {
    let content: Element<'static, crate::Message> = if data.analyzing {
        text("Analyzing recording...").size(14).into()
    } else if data.detected_notes.is_empty() {
        text("Stop a capture to list the notes it contained.")
            .size(14)
            .color(Color::from_rgb(0.6, 0.6, 0.6))
            .into()
    } else {
        let lines = data
            .detected_notes
            .iter()
            .fold(column![].spacing(2), |col, note| col.push(text(note.to_string()).size(14)));
        scrollable(lines).height(Length::Fill).into()
    };

    container(
        column![text("Detected Notes").size(18), Space::with_height(10), content]
            .spacing(5)
            .padding(15),
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .into()
}

/// Start/stop button; red while capturing.
fn make_capture_button(
    capturing: bool,
    capture_message: crate::Message,
) -> Element<'static, crate::Message> {
    let (label, color) = if capturing {
        ("Stop Capturing", Color::from_rgb(0.8, 0.2, 0.2))
    } else {
        ("Start Capturing", Color::from_rgb(0.2, 0.6, 0.2))
    };

    button(text(label).size(18))
        .padding([12, 20])
        .style(move |_theme, _status| button::Style {
            background: Some(iced::Background::Color(color)),
            text_color: Color::WHITE,
            ..button::Style::default()
        })
        .on_press(capture_message)
        .into()
}
