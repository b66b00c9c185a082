use super::nav_line;
use crate::models::{ConsolidatedReport, DailyForecast, DataMode, Location};
use crate::ui::components::{humidity_gauge, moisture_gauge, rain_gauge, temperature_gauge};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Sparkline, Table, Widget, Wrap},
};

const FORECAST_ROWS: usize = 7;
const FORECAST_TABLE_WIDTH: u16 = 60;

pub struct DashboardScreen<'a> {
    pub location: &'a Location,
    pub mode: DataMode,
    pub report: Option<&'a ConsolidatedReport>,
    pub status_message: Option<&'a str>,
}

impl<'a> DashboardScreen<'a> {
    pub fn new(location: &'a Location, mode: DataMode, report: Option<&'a ConsolidatedReport>) -> Self {
        Self {
            location,
            mode,
            report,
            status_message: None,
        }
    }

    pub fn with_status(mut self, status: Option<&'a str>) -> Self {
        self.status_message = status;
        self
    }
}

impl Widget for DashboardScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(4), // Gauges row
                Constraint::Length(8), // Conditions and soil
                Constraint::Min(5),    // Forecast
                Constraint::Length(1), // Status message
                Constraint::Length(1), // Nav bar
            ])
            .split(area);

        self.render_header(chunks[0], buf);
        self.render_gauges(chunks[1], buf);

        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[2]);

        self.render_conditions(middle[0], buf);
        self.render_soil(middle[1], buf);
        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(FORECAST_TABLE_WIDTH), Constraint::Min(20)])
            .split(chunks[3]);

        self.render_forecast(bottom[0], buf);
        self.render_trends(bottom[1], buf);
        self.render_status_message(chunks[4], buf);

        Paragraph::new(nav_line(&[])).render(chunks[5], buf);
    }
}

impl DashboardScreen<'_> {
    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let name = self
            .report
            .map(|r| r.current.location.name.as_str())
            .unwrap_or(self.location.name.as_str());

        let origin = self.report.map(|r| r.origin).unwrap_or(self.mode);
        let title = Line::from(vec![
            Span::styled(format!("Kisaan - {} ", name), Theme::title()),
            Span::styled(format!(" {} ", origin.as_str()), Theme::mode_badge(origin)),
        ]);

        let block = Block::default()
            .title(title)
            .borders(Borders::BOTTOM)
            .border_style(Theme::border());

        let info = match self.report {
            Some(report) => format!(
                "Reliability {}% | Updated {} | {:.4}, {:.4}",
                report.reliability_score,
                report
                    .current
                    .observed_at
                    .with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M"),
                self.location.lat,
                self.location.lon
            ),
            None => "Waiting for weather data...".to_string(),
        };

        Paragraph::new(Span::styled(info, Theme::dim()))
            .block(block)
            .render(area, buf);
    }

    fn render_gauges(&self, area: Rect, buf: &mut Buffer) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(25); 4])
            .split(area);

        let current = self.report.map(|r| &r.current);

        temperature_gauge("Temperature", current.map(|c| c.temperature.current_c))
            .render(cols[0], buf);
        humidity_gauge("Humidity", current.map(|c| c.humidity_pct)).render(cols[1], buf);
        moisture_gauge("Soil Moisture", current.map(|c| c.soil.moisture_pct)).render(cols[2], buf);
        rain_gauge("Rain Chance", current.map(|c| c.precipitation.probability_pct))
            .render(cols[3], buf);
    }

    fn render_conditions(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled("Current Conditions", Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let Some(report) = self.report else {
            Paragraph::new(Span::styled("No data yet", Theme::dim())).render(inner, buf);
            return;
        };
        let c = &report.current;

        let lines = vec![
            Line::from(vec![
                Span::styled(format!("{} ", c.condition.symbol()), Theme::highlight()),
                Span::styled(&c.description, Theme::normal()),
            ]),
            Line::from(vec![
                Span::styled("Feels like: ", Theme::dim()),
                Span::styled(
                    format!("{:.0}°C", c.temperature.feels_like_c),
                    Style::default().fg(Theme::temp_color(c.temperature.feels_like_c)),
                ),
            ]),
            Line::from(vec![
                Span::styled("Min / Max:  ", Theme::dim()),
                Span::styled(
                    format!("{:.0}°C / {:.0}°C", c.temperature.min_c, c.temperature.max_c),
                    Theme::normal(),
                ),
            ]),
            Line::from(vec![
                Span::styled("Wind:       ", Theme::dim()),
                Span::styled(
                    format!("{:.0} km/h {}", c.wind.speed_kph, c.wind.compass()),
                    Theme::normal(),
                ),
            ]),
            Line::from(vec![
                Span::styled("Rainfall:   ", Theme::dim()),
                Span::styled(format!("{:.1} mm", c.precipitation.amount_mm), Theme::normal()),
            ]),
        ];

        Paragraph::new(lines).render(inner, buf);
    }

    fn render_soil(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled("Soil", Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let Some(report) = self.report else {
            Paragraph::new(Span::styled("No data yet", Theme::dim())).render(inner, buf);
            return;
        };
        let soil = &report.current.soil;
        let status = soil.status();

        let lines = vec![
            Line::from(vec![
                Span::styled("Status: ", Theme::dim()),
                Span::styled(status.as_str(), Style::default().fg(status.color())),
                Span::styled(
                    if soil.measured { "  (measured)" } else { "  (estimated)" },
                    Theme::dim(),
                ),
            ]),
            Line::from(vec![
                Span::styled("Soil temp: ", Theme::dim()),
                Span::styled(format!("{:.0}°C", soil.temperature_c), Theme::normal()),
            ]),
            Line::from(""),
            Line::from(Span::styled(&soil.advice, Theme::normal())),
        ];

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }

    fn render_forecast(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled("Forecast", Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let forecast = self.report.map(|r| r.forecast.as_slice()).unwrap_or(&[]);
        if forecast.is_empty() {
            let inner = block.inner(area);
            block.render(area, buf);
            Paragraph::new(Span::styled("No forecast available", Theme::dim())).render(inner, buf);
            return;
        }

        let header = Row::new(["Date", "", "Min", "Max", "Humidity", "Rain", "Soil"])
            .style(Theme::dim());

        let rows: Vec<Row> = forecast
            .iter()
            .take(FORECAST_ROWS)
            .map(|day| {
                Row::new(vec![
                    Cell::from(day.date.format("%a %d %b").to_string()),
                    Cell::from(day.condition.symbol()),
                    Cell::from(format!("{:.0}°C", day.min_temp_c))
                        .style(Style::default().fg(Theme::temp_color(day.min_temp_c))),
                    Cell::from(format!("{:.0}°C", day.max_temp_c))
                        .style(Style::default().fg(Theme::temp_color(day.max_temp_c))),
                    Cell::from(format!("{:.0}%", day.humidity_pct)),
                    Cell::from(format!("{:.1} mm", day.precipitation_mm)),
                    Cell::from(format!("{:.0}%", day.soil_moisture_pct))
                        .style(Style::default().fg(Theme::moisture_color(day.soil_moisture_pct))),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(11),
            Constraint::Length(3),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(6),
        ];

        Table::new(rows, widths)
            .header(header)
            .block(block)
            .render(area, buf);
    }

    /// Whole-forecast sparklines for temperature, rain and soil moisture.
    fn render_trends(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled("Trends", Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let forecast = self.report.map(|r| r.forecast.as_slice()).unwrap_or(&[]);
        if forecast.is_empty() {
            return;
        }

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Ratio(1, 3); 3])
            .split(inner);

        let days = forecast.len();
        render_trend(
            rows[0],
            buf,
            &format!("Avg temp ({} days)", days),
            forecast,
            DailyForecast::avg_temp_c,
            "°C",
            Theme::TEMP_WARM,
        );
        render_trend(
            rows[1],
            buf,
            "Rain",
            forecast,
            |day| day.precipitation_mm,
            " mm",
            Theme::RAIN,
        );
        render_trend(
            rows[2],
            buf,
            "Soil moisture",
            forecast,
            |day| day.soil_moisture_pct,
            "%",
            Theme::MOISTURE_OK,
        );
    }

    fn render_status_message(&self, area: Rect, buf: &mut Buffer) {
        if let Some(msg) = self.status_message {
            let style = if msg.contains("unavailable") || msg.contains("failed") {
                Theme::warning()
            } else {
                Theme::success()
            };
            Paragraph::new(Span::styled(msg, style)).render(area, buf);
        }
    }
}

fn render_trend(
    area: Rect,
    buf: &mut Buffer,
    label: &str,
    forecast: &[DailyForecast],
    value: impl Fn(&DailyForecast) -> f64,
    unit: &str,
    color: ratatui::style::Color,
) {
    if area.height == 0 {
        return;
    }

    let values: Vec<f64> = forecast.iter().map(value).collect();
    let low = values.iter().copied().fold(f64::INFINITY, f64::min);
    let high = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let title = Line::from(vec![
        Span::styled(format!("{} ", label), Theme::dim()),
        Span::styled(format!("{:.0}-{:.0}{}", low, high, unit), Theme::normal()),
    ]);
    Paragraph::new(title).render(Rect { height: 1, ..area }, buf);

    // Shifted so sub-zero readings still draw.
    let floor = low.min(0.0);
    let bars: Vec<u64> = values
        .iter()
        .map(|v| ((v - floor) * 10.0).round().max(0.0) as u64)
        .collect();

    let spark_area = Rect {
        y: area.y + 1,
        height: area.height - 1,
        ..area
    };
    Sparkline::default()
        .data(bars)
        .style(Style::default().fg(color))
        .render(spark_area, buf);
}
