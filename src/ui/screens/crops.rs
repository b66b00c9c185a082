use super::nav_line;
use crate::logic::ActiveSeasons;
use crate::models::CropSuggestion;
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Widget, Wrap},
};

pub struct CropsScreen<'a> {
    pub suggestions: &'a [CropSuggestion],
    pub selected_index: usize,
    pub month: u32,
}

impl<'a> CropsScreen<'a> {
    pub fn new(suggestions: &'a [CropSuggestion], month: u32) -> Self {
        Self {
            suggestions,
            selected_index: 0,
            month,
        }
    }

    pub fn with_selection(mut self, index: usize) -> Self {
        self.selected_index = index;
        self
    }

    fn season_summary(&self) -> String {
        let active: Vec<&str> = ActiveSeasons::for_month(self.month)
            .active()
            .iter()
            .map(|s| s.as_str())
            .collect();
        if active.is_empty() {
            "no active season".to_string()
        } else {
            active.join(" + ")
        }
    }
}

impl Widget for CropsScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Min(10),   // Content
                Constraint::Length(1), // Nav
            ])
            .split(area);

        let title = Line::from(vec![
            Span::styled("Crop Suggestions", Theme::title()),
            Span::styled(
                format!(
                    " ({} crops, {})",
                    self.suggestions.len(),
                    self.season_summary()
                ),
                Theme::dim(),
            ),
        ]);
        Paragraph::new(title).render(chunks[0], buf);

        if self.suggestions.is_empty() {
            self.render_empty(chunks[1], buf);
        } else {
            let content = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
                .split(chunks[1]);

            self.render_list(content[0], buf);
            self.render_details(content[1], buf);
        }

        Paragraph::new(nav_line(&[("[↑↓]", "Navigate ")])).render(chunks[2], buf);
    }
}

impl CropsScreen<'_> {
    fn render_empty(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let lines = vec![
            Line::from(""),
            Line::from(Span::styled("No Crop Suggestions Available", Theme::header())),
            Line::from(""),
            Line::from(Span::styled(
                "Current conditions do not suit any crop in season.",
                Theme::dim(),
            )),
            Line::from(Span::styled(
                "Try another location or refresh the weather data.",
                Theme::dim(),
            )),
        ];

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block)
            .render(area, buf);
    }

    fn render_list(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Ranked")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let items: Vec<ListItem> = self
            .suggestions
            .iter()
            .enumerate()
            .map(|(i, crop)| {
                let style = if i == self.selected_index {
                    Theme::selected()
                } else {
                    Style::default()
                };
                let tier_style = Style::default().fg(crop.suitability.color());

                let line = Line::from(vec![
                    Span::styled(format!("{} ", crop.suitability.symbol()), tier_style),
                    Span::styled(crop.name.as_str(), Theme::normal()),
                    Span::styled(format!(" {}%", crop.confidence), tier_style),
                ]);

                ListItem::new(line).style(style)
            })
            .collect();

        List::new(items).render(inner, buf);
    }

    fn render_details(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Details")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let Some(crop) = self.suggestions.get(self.selected_index) else {
            Paragraph::new(Span::styled("Select a crop to view details", Theme::dim()))
                .render(inner, buf);
            return;
        };

        let tier_style = Style::default().fg(crop.suitability.color());
        let mut lines = vec![
            Line::from(Span::styled(crop.name.as_str(), Theme::header())),
            Line::from(vec![
                Span::styled(crop.suitability.as_str(), tier_style),
                Span::styled(format!("  {}% confidence", crop.confidence), Theme::dim()),
                Span::styled("  | ", Theme::dim()),
                Span::styled(
                    crop.season.as_str(),
                    Style::default().fg(crop.crop_type.color()),
                ),
                Span::styled(format!("  | {}", crop.category), Theme::dim()),
            ]),
            Line::from(""),
        ];

        let fields: [(&str, &str); 10] = [
            ("Sowing", crop.sowing_time.as_str()),
            ("Harvest", crop.harvest_time.as_str()),
            ("Yield", crop.expected_yield.as_str()),
            ("Market price", crop.market_price.as_str()),
            ("Soil", crop.soil_requirement.as_str()),
            ("Climate", crop.climate_requirement.as_str()),
            ("Spacing", crop.spacing.as_str()),
            ("Seeds", crop.seeds.as_str()),
            ("Fertilizer", crop.fertilizer.as_str()),
            ("Pests", crop.pest_management.as_str()),
        ];

        lines.push(Line::from(vec![
            Span::styled("Water need: ", Theme::dim()),
            Span::styled(
                crop.water_requirement.as_str(),
                Style::default().fg(crop.water_requirement.color()),
            ),
        ]));
        for (label, value) in fields {
            lines.push(Line::from(vec![
                Span::styled(format!("{}: ", label), Theme::dim()),
                Span::styled(value, Theme::normal()),
            ]));
        }

        push_section(&mut lines, "Why this crop", &crop.rationale);
        push_section(&mut lines, "Benefits", &crop.benefits);
        push_section(&mut lines, "Challenges", &crop.challenges);
        push_section(&mut lines, "Tips", &crop.tips);

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}

fn push_section<'a>(lines: &mut Vec<Line<'a>>, title: &'a str, items: &'a [String]) {
    if items.is_empty() {
        return;
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(title, Theme::highlight())));
    for item in items {
        lines.push(Line::from(vec![
            Span::styled("  • ", Theme::dim()),
            Span::styled(item.as_str(), Theme::normal()),
        ]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{Catalog, CropAdvisor};
    use crate::models::CurrentConditions;
    use crate::ui::screens::buffer_text;

    fn render(screen: CropsScreen) -> String {
        let area = Rect::new(0, 0, 140, 60);
        let mut buf = Buffer::empty(area);
        screen.render(area, &mut buf);
        buffer_text(&buf)
    }

    #[test]
    fn empty_state_is_explicit() {
        let text = render(CropsScreen::new(&[], 7));
        assert!(text.contains("No Crop Suggestions Available"));
        assert!(text.contains("0 crops, Kharif"));
    }

    #[test]
    fn lists_ranked_crops_with_details() {
        let advisor = CropAdvisor::new(Catalog::builtin().unwrap());
        let suggestions = advisor.suggest(&CurrentConditions::new(28.0, 75.0, 70.0, 65.0), 7);
        assert!(!suggestions.is_empty());

        let text = render(CropsScreen::new(&suggestions, 7).with_selection(0));
        let top = &suggestions[0];

        assert!(text.contains(&top.name));
        assert!(text.contains(&format!("{}% confidence", top.confidence)));
        assert!(text.contains("Sowing:"));
        assert!(text.contains("Why this crop"));
    }

    #[test]
    fn season_summary_joins_overlaps() {
        let june = CropsScreen::new(&[], 6);
        assert_eq!(june.season_summary(), "Kharif + Zaid");
        let bogus = CropsScreen::new(&[], 13);
        assert_eq!(bogus.season_summary(), "no active season");
    }
}
