use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Single-line text box. The cursor sits at the end of the text when focused.
pub struct InputWidget<'a> {
    label: &'a str,
    value: &'a str,
    placeholder: &'a str,
    focused: bool,
}

impl<'a> InputWidget<'a> {
    pub fn new(label: &'a str, value: &'a str) -> Self {
        Self {
            label,
            value,
            placeholder: "",
            focused: false,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }
}

impl Widget for InputWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Theme::border_focused()
        } else {
            Theme::border()
        };

        let block = Block::default()
            .title(self.label)
            .borders(Borders::ALL)
            .border_style(border_style);

        let inner = block.inner(area);
        block.render(area, buf);

        let line = if self.focused {
            Line::from(vec![
                Span::raw(self.value),
                Span::styled(" ", Theme::selected()),
            ])
        } else if self.value.is_empty() {
            Line::from(Span::styled(self.placeholder, Theme::dim()))
        } else {
            Line::from(Span::raw(self.value))
        };

        Paragraph::new(line).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inner_text(buf: &Buffer) -> String {
        (1..buf.area.width - 1)
            .map(|x| buf[(x, 1)].symbol().to_string())
            .collect()
    }

    #[test]
    fn placeholder_shown_when_empty_and_unfocused() {
        let area = Rect::new(0, 0, 30, 3);
        let mut buf = Buffer::empty(area);
        InputWidget::new("Search", "")
            .placeholder("Press / to search")
            .render(area, &mut buf);
        assert!(inner_text(&buf).starts_with("Press / to search"));
    }

    #[test]
    fn focused_input_shows_value() {
        let area = Rect::new(0, 0, 30, 3);
        let mut buf = Buffer::empty(area);
        InputWidget::new("Search", "Nashik")
            .placeholder("unused")
            .focused(true)
            .render(area, &mut buf);
        assert!(inner_text(&buf).starts_with("Nashik"));
        assert_eq!(buf[(7, 1)].bg, ratatui::style::Color::DarkGray);
    }
}
