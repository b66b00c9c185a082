use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

pub struct GaugeWidget<'a> {
    title: &'a str,
    value: Option<f64>,
    unit: &'a str,
    min: f64,
    max: f64,
    thresholds: Vec<(f64, Color)>,
}

impl<'a> GaugeWidget<'a> {
    pub fn new(title: &'a str, value: Option<f64>, unit: &'a str) -> Self {
        Self {
            title,
            value,
            unit,
            min: 0.0,
            max: 100.0,
            thresholds: Vec::new(),
        }
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn thresholds(mut self, thresholds: Vec<(f64, Color)>) -> Self {
        self.thresholds = thresholds;
        self
    }

    fn color_for(&self, value: f64) -> Color {
        for (threshold, color) in self.thresholds.iter().rev() {
            if value >= *threshold {
                return *color;
            }
        }
        Theme::FG
    }

    /// Share of the bar to fill, 0.0 to 1.0.
    fn ratio(&self, value: f64) -> f64 {
        if self.max <= self.min {
            return 0.0;
        }
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }
}

impl Widget for GaugeWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 3 || area.width < 10 {
            return;
        }

        let block = Block::default()
            .title(self.title)
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        match self.value {
            Some(value) => {
                let color = self.color_for(value);
                let value_str = format!("{:.0}{}", value, self.unit);

                Paragraph::new(Line::from(vec![Span::styled(
                    value_str,
                    Style::default().fg(color),
                )]))
                .render(inner, buf);

                if inner.height >= 2 {
                    let bar_y = inner.y + 1;
                    let filled = (inner.width as f64 * self.ratio(value)) as u16;

                    for x in inner.x..inner.x + inner.width {
                        let ch = if x < inner.x + filled { '█' } else { '░' };
                        buf[(x, bar_y)].set_char(ch).set_fg(color);
                    }
                }
            }
            None => {
                Paragraph::new(Span::styled("N/A", Theme::dim())).render(inner, buf);
            }
        }
    }
}

pub fn temperature_gauge(title: &str, value: Option<f64>) -> GaugeWidget<'_> {
    GaugeWidget::new(title, value, "°C")
        .range(-5.0, 50.0)
        .thresholds(vec![
            (f64::MIN, Theme::TEMP_COLD),
            (10.0, Theme::TEMP_COOL),
            (20.0, Theme::TEMP_WARM),
            (32.0, Theme::TEMP_HOT),
        ])
}

pub fn moisture_gauge(title: &str, value: Option<f64>) -> GaugeWidget<'_> {
    GaugeWidget::new(title, value, "%").thresholds(vec![
        (0.0, Theme::MOISTURE_DRY),
        (20.0, Theme::MOISTURE_OK),
        (60.0, Theme::MOISTURE_WET),
    ])
}

pub fn humidity_gauge(title: &str, value: Option<f64>) -> GaugeWidget<'_> {
    GaugeWidget::new(title, value, "%").thresholds(vec![
        (0.0, Theme::WARNING),
        (30.0, Theme::SUCCESS),
        (85.0, Theme::HIGHLIGHT),
    ])
}

pub fn rain_gauge(title: &str, value: Option<f64>) -> GaugeWidget<'_> {
    GaugeWidget::new(title, value, "%").thresholds(vec![
        (0.0, Theme::DIM),
        (30.0, Theme::HIGHLIGHT),
        (50.0, Theme::RAIN),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(buf: &Buffer, y: u16) -> String {
        (buf.area.x..buf.area.x + buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn thresholds_pick_highest_reached() {
        let gauge = temperature_gauge("Air", None);
        assert_eq!(gauge.color_for(-2.0), Theme::TEMP_COLD);
        assert_eq!(gauge.color_for(10.0), Theme::TEMP_COOL);
        assert_eq!(gauge.color_for(31.9), Theme::TEMP_WARM);
        assert_eq!(gauge.color_for(45.0), Theme::TEMP_HOT);
    }

    #[test]
    fn ratio_is_clamped() {
        let gauge = moisture_gauge("Soil", None);
        assert_eq!(gauge.ratio(-10.0), 0.0);
        assert_eq!(gauge.ratio(50.0), 0.5);
        assert_eq!(gauge.ratio(150.0), 1.0);
        assert_eq!(GaugeWidget::new("x", None, "").range(5.0, 5.0).ratio(5.0), 0.0);
    }

    #[test]
    fn renders_value_and_bar() {
        let area = Rect::new(0, 0, 12, 4);
        let mut buf = Buffer::empty(area);
        humidity_gauge("Humidity", Some(50.0)).render(area, &mut buf);

        assert!(row_text(&buf, 1).contains("50%"));
        let bar = row_text(&buf, 2);
        assert_eq!(bar.matches('█').count(), 5);
        assert_eq!(bar.matches('░').count(), 5);
    }

    #[test]
    fn missing_value_shows_na() {
        let area = Rect::new(0, 0, 12, 4);
        let mut buf = Buffer::empty(area);
        rain_gauge("Rain", None).render(area, &mut buf);
        assert!(row_text(&buf, 1).contains("N/A"));
    }
}
