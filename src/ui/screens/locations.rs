use super::nav_line;
use crate::app::LocationsState;
use crate::models::Location;
use crate::ui::components::InputWidget;
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Widget},
};

pub struct LocationsScreen<'a> {
    pub state: &'a LocationsState,
    pub current: &'a Location,
}

impl<'a> LocationsScreen<'a> {
    pub fn new(state: &'a LocationsState, current: &'a Location) -> Self {
        Self { state, current }
    }
}

impl Widget for LocationsScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Length(3), // Search input
                Constraint::Min(6),    // Results and recent
                Constraint::Length(1), // Nav
            ])
            .split(area);

        let title = Line::from(vec![
            Span::styled("Locations", Theme::title()),
            Span::styled(format!(" (current: {})", self.current.short_name()), Theme::dim()),
        ]);
        Paragraph::new(title).render(chunks[0], buf);

        let label = if self.state.searching {
            "Search (searching...)"
        } else {
            "Search"
        };
        InputWidget::new(label, &self.state.input)
            .placeholder("Press / to search for a city or village")
            .focused(self.state.editing)
            .render(chunks[1], buf);

        self.render_entries(chunks[2], buf);

        let nav = if self.state.editing {
            Line::from(vec![
                Span::styled("[Enter]", Theme::nav_key()),
                Span::styled("Search ", Theme::nav_label()),
                Span::styled("[Esc]", Theme::nav_key()),
                Span::styled("Cancel", Theme::nav_label()),
            ])
        } else {
            nav_line(&[("[/]", "Search "), ("[↑↓]", "Navigate "), ("[Enter]", "Select ")])
        };
        Paragraph::new(nav).render(chunks[3], buf);
    }
}

impl LocationsScreen<'_> {
    fn render_entries(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Places")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        if self.state.is_empty() {
            Paragraph::new(Span::styled(
                "No search results or recent locations yet",
                Theme::dim(),
            ))
            .render(inner, buf);
            return;
        }

        let row_style = |i: usize| {
            if i == self.state.selected_index && !self.state.editing {
                Theme::selected()
            } else {
                Style::default()
            }
        };

        let mut items = Vec::new();

        if !self.state.results.is_empty() {
            items.push(ListItem::new(Span::styled("Search results", Theme::highlight())));
            for (i, place) in self.state.results.iter().enumerate() {
                let kind = format!(" [{}]", place.kind);
                items.push(
                    ListItem::new(Line::from(vec![
                        Span::styled("  ", Theme::dim()),
                        Span::styled(place.display_name.as_str(), Theme::normal()),
                        Span::styled(kind, Theme::dim()),
                    ]))
                    .style(row_style(i)),
                );
            }
        }

        if !self.state.recent.is_empty() {
            items.push(ListItem::new(Span::styled("Recent", Theme::highlight())));
            let offset = self.state.results.len();
            for (i, recent) in self.state.recent.iter().enumerate() {
                let marker = if recent.location == *self.current { "* " } else { "  " };
                items.push(
                    ListItem::new(Line::from(vec![
                        Span::styled(marker, Theme::success()),
                        Span::styled(recent.location.name.as_str(), Theme::normal()),
                        Span::styled(
                            format!(
                                "  {:.4}, {:.4}",
                                recent.location.lat, recent.location.lon
                            ),
                            Theme::dim(),
                        ),
                    ]))
                    .style(row_style(offset + i)),
                );
            }
        }

        List::new(items).render(inner, buf);
    }
}
