use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Screen regions: query line on top, results beside preview, status at the bottom
pub struct AppLayout {
    pub query_area: Rect,
    pub results_area: Rect,
    pub preview_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    pub fn new(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3), Constraint::Length(1)])
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(rows[1]);

        Self {
            query_area: rows[0],
            results_area: columns[0],
            preview_area: columns[1],
            status_area: rows[2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_regions() {
        let layout = AppLayout::new(Rect::new(0, 0, 100, 30));

        assert_eq!(layout.query_area.height, 3);
        assert_eq!(layout.query_area.y, 0);
        assert_eq!(layout.status_area.height, 1);
        assert_eq!(layout.status_area.y, 29);
        assert_eq!(layout.results_area.height, 26);
        assert_eq!(layout.results_area.y, 3);
        assert_eq!(layout.results_area.width, 55);
        assert_eq!(layout.preview_area.width, 45);
    }

    #[test]
    fn test_layout_small_terminal() {
        let layout = AppLayout::new(Rect::new(0, 0, 40, 7));

        assert_eq!(layout.query_area.height, 3);
        assert_eq!(layout.results_area.height, 3);
        assert_eq!(layout.status_area.height, 1);
    }
}
