//! # Spectrum Bars Widget
//!
//! Draws a byte spectrum snapshot as a bar chart: one bar per frequency
//! bin, lowest frequency on the left, bar height proportional to the
//! bin's 0-255 magnitude.

use iced::widget::canvas::{self, Geometry, Path};
use iced::widget::container;
use iced::{mouse, Color, Element, Point, Rectangle, Renderer, Size, Theme};

const BACKGROUND: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 0.1 };
const BAR_COLOR: Color = Color { r: 0.0, g: 0.0, b: 1.0, a: 0.7 };

pub struct SpectrumBars {
    data: Vec<u8>,
}

impl SpectrumBars {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn view(self) -> Element<'static, crate::Message> {
        container(
            canvas::Canvas::new(self)
                .width(iced::Length::Fill)
                .height(iced::Length::Fill),
        )
        .into()
    }
}

/// Returns `(x, height)` of every bar drawn in a `width` x `height` area.
///
/// Zero-valued bins produce no bar.
pub fn bar_layout(data: &[u8], width: f32, height: f32) -> (f32, Vec<(f32, f32)>) {
    if data.is_empty() {
        return (0.0, Vec::new());
    }
    let bar_width = width / data.len() as f32;
    let bars = data
        .iter()
        .enumerate()
        .filter(|&(_, &value)| value > 0)
        .map(|(i, &value)| (i as f32 * bar_width, value as f32 / 255.0 * height))
        .collect();
    (bar_width, bars)
}

impl<Message> canvas::Program<Message> for SpectrumBars {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        if !bounds.width.is_finite() || !bounds.height.is_finite() {
            return vec![frame.into_geometry()];
        }

        // Clear to the faint backdrop every frame.
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), BACKGROUND);

        let (bar_width, bars) = bar_layout(&self.data, bounds.width, bounds.height);
        for (x, height) in bars {
            let bar = Path::rectangle(
                Point::new(x, bounds.height - height),
                Size::new(bar_width, height),
            );
            frame.fill(&bar, BAR_COLOR);
        }

        vec![frame.into_geometry()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-4;

    #[test]
    fn bars_scale_with_value() {
        let (bar_width, bars) = bar_layout(&[255, 0, 51, 102], 400.0, 100.0);
        assert!((bar_width - 100.0).abs() < TOLERANCE);
        assert_eq!(bars.len(), 3);
        assert!((bars[0].1 - 100.0).abs() < TOLERANCE);
        assert!((bars[1].0 - 200.0).abs() < TOLERANCE);
        assert!((bars[1].1 - 20.0).abs() < TOLERANCE);
        assert!((bars[2].1 - 40.0).abs() < TOLERANCE);
    }

    #[test]
    fn empty_snapshot_draws_nothing() {
        let (_, bars) = bar_layout(&[], 400.0, 100.0);
        assert!(bars.is_empty());
    }
}
