use crate::merger::{compute_tri_state, merge_remodeling_data, ItemType, MergedData, Selection, TriState};
use crate::model::{Version, VersionData};
use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{DefaultTerminal, Frame};

/// One line of the picker tree.
#[derive(Debug, Clone, PartialEq)]
pub struct PickerRow {
    pub item_id: String,
    pub item_type: ItemType,
    pub depth: u16,
    pub label: String,
}

/// Builds the picker rows: building, floors, zones, surfaces, then photovoltaics.
#[must_use]
pub fn picker_rows(data: &VersionData) -> Vec<PickerRow> {
    let mut rows = vec![PickerRow {
        item_id: String::new(),
        item_type: ItemType::Building,
        depth: 0,
        label: "Building".to_string(),
    }];

    for floor in &data.floors {
        rows.push(PickerRow {
            item_id: floor.floor_id.clone(),
            item_type: ItemType::Floor,
            depth: 1,
            label: format!("{} ({})", floor.floor_name, floor.floor_number),
        });
        for zone in &floor.zones {
            rows.push(PickerRow {
                item_id: zone.id.clone(),
                item_type: ItemType::Zone,
                depth: 2,
                label: zone.name.clone(),
            });
            for surface in &zone.surfaces {
                let generated = if surface.is_generated { " *" } else { "" };
                rows.push(PickerRow {
                    item_id: surface.id.clone(),
                    item_type: ItemType::Surface,
                    depth: 3,
                    label: format!("{} [{}]{generated}", surface.name, surface.surface_type),
                });
            }
        }
    }

    if !data.photovoltaics.is_empty() {
        rows.push(PickerRow {
            item_id: String::new(),
            item_type: ItemType::PhotovoltaicAll,
            depth: 0,
            label: "Photovoltaics".to_string(),
        });
        for reference in &data.photovoltaics {
            rows.push(PickerRow {
                item_id: reference.id.clone(),
                item_type: ItemType::Photovoltaic,
                depth: 1,
                label: format!("{} x{}", reference.id, reference.count),
            });
        }
    }

    rows
}

/// Interactive picker choosing what to copy from one version into the other.
pub struct App {
    pub origin_version: Version,
    pub target_version: Version,
    pub origin: VersionData,
    pub target: VersionData,
    pub rows: Vec<PickerRow>,
    pub selection: Selection,
    pub selected_row: usize,
    pub should_quit: bool,
    pub confirmed: bool,
}

impl App {
    #[must_use]
    pub fn new(
        origin_version: Version,
        origin: VersionData,
        target_version: Version,
        target: VersionData,
    ) -> Self {
        let rows = picker_rows(&origin);
        Self {
            origin_version,
            target_version,
            origin,
            target,
            rows,
            selection: Selection::new(),
            selected_row: 0,
            should_quit: false,
            confirmed: false,
        }
    }

    /// Runs until the user quits. Returns the selection if it was confirmed.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> Result<Option<Selection>> {
        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;
            self.handle_events()?;
        }
        Ok(self.confirmed.then_some(self.selection))
    }

    fn draw(&self, frame: &mut Frame) {
        super::picker::draw_picker(frame, self);
    }

    fn handle_events(&mut self) -> Result<()> {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                self.handle_key(key.code);
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.previous_row(),
            KeyCode::Down | KeyCode::Char('j') => self.next_row(),
            KeyCode::Char(' ') => self.toggle_current(),
            KeyCode::Char('a') => self.selection.toggle("", ItemType::Building, &self.origin),
            KeyCode::Enter => {
                self.confirmed = true;
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn previous_row(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(1);
    }

    fn next_row(&mut self) {
        if self.selected_row < self.rows.len().saturating_sub(1) {
            self.selected_row += 1;
        }
    }

    fn toggle_current(&mut self) {
        if let Some(row) = self.rows.get(self.selected_row) {
            self.selection.toggle(&row.item_id, row.item_type, &self.origin);
        }
    }

    #[must_use]
    pub fn row_state(&self, row: &PickerRow) -> TriState {
        compute_tri_state(&row.item_id, row.item_type, &self.origin, &self.selection)
    }

    /// What the target would look like if the selection were applied now.
    #[must_use]
    pub fn preview(&self) -> MergedData {
        merge_remodeling_data(&self.selection, &self.origin, &self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Floor, Surface, SurfaceType, Zone};
    use pretty_assertions::assert_eq;

    fn app() -> App {
        let origin = VersionData::new(vec![Floor::new("f1", 1, "1F").with_zones([
            Zone::new("z1", "Office").with_surfaces([Surface::new("s1", "N", SurfaceType::Wall)]),
        ])]);
        App::new(Version::Before, origin, Version::After, VersionData::default())
    }

    #[test]
    fn rows_follow_hierarchy() {
        let app = app();
        let kinds: Vec<(ItemType, u16)> = app.rows.iter().map(|r| (r.item_type, r.depth)).collect();

        assert_eq!(
            kinds,
            vec![
                (ItemType::Building, 0),
                (ItemType::Floor, 1),
                (ItemType::Zone, 2),
                (ItemType::Surface, 3),
            ]
        );
        assert_eq!(app.rows[3].label, "N [wall]");
    }

    #[test]
    fn space_toggles_and_enter_confirms() {
        let mut app = app();

        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Char(' '));
        assert_eq!(app.row_state(&app.rows[0]), TriState::Checked);
        assert_eq!(app.preview().floors.len(), 1);

        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Down);
        assert_eq!(app.selected_row, 3);

        app.handle_key(KeyCode::Enter);
        assert!(app.should_quit);
        assert!(app.confirmed);
    }
}
