pub mod crops;
pub mod dashboard;
pub mod locations;

pub use crops::CropsScreen;
pub use dashboard::DashboardScreen;
pub use locations::LocationsScreen;

use crate::ui::Theme;
use ratatui::text::{Line, Span};

/// Global keys followed by any screen-specific ones.
pub(crate) fn nav_line(extra: &[(&'static str, &'static str)]) -> Line<'static> {
    const GLOBAL: [(&str, &str); 6] = [
        ("[1]", "Dashboard "),
        ("[2]", "Crops "),
        ("[3]", "Locations "),
        ("[r]", "Refresh "),
        ("[m]", "Mode "),
        ("[q]", "Quit "),
    ];

    let spans: Vec<Span> = GLOBAL
        .iter()
        .chain(extra.iter())
        .flat_map(|(key, label)| {
            [
                Span::styled(*key, Theme::nav_key()),
                Span::styled(*label, Theme::nav_label()),
            ]
        })
        .collect();

    Line::from(spans)
}

#[cfg(test)]
pub(crate) fn buffer_text(buf: &ratatui::buffer::Buffer) -> String {
    let area = buf.area;
    let mut text = String::new();
    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            text.push_str(buf[(x, y)].symbol());
        }
        text.push('\n');
    }
    text
}
