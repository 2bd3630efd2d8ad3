use measure_shared::{MeasurementsSnapshot, Room};

use crate::ports::{ListRow, ListSurface};

pub const ROOM_LABEL: &str = "Room total";
pub const ROOM_PLACEHOLDER: &str = "Not yet measured";

pub fn room_value(room: &Room) -> String {
    if room.is_measured() {
        format!("{}cm x {}cm ({}m²)", room.width, room.height, room.area)
    } else {
        ROOM_PLACEHOLDER.to_string()
    }
}

/// Room line first, then one row per record. Indices are positional, so a
/// reordered server list renumbers the rows.
pub fn list_rows(snapshot: &MeasurementsSnapshot) -> Vec<ListRow> {
    let mut rows = Vec::with_capacity(snapshot.measurements.len() + 1);
    rows.push(ListRow {
        label: ROOM_LABEL.to_string(),
        value: room_value(&snapshot.room),
        emphasized: true,
    });
    for (index, record) in snapshot.measurements.iter().enumerate() {
        rows.push(ListRow {
            label: format!("{} {}", record.kind, index + 1),
            value: format!("{}cm x {}cm", record.width, record.height),
            emphasized: false,
        });
    }
    rows
}

pub fn render_list(surface: &mut dyn ListSurface, snapshot: &MeasurementsSnapshot) {
    surface.show(&list_rows(snapshot));
}

/// Orders list fetches so an older response never replaces a newer one.
#[derive(Debug, Default)]
pub struct RefreshSequencer {
    issued: u64,
    applied: u64,
}

impl RefreshSequencer {
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// True if the response for `seq` may be rendered.
    pub fn accept(&mut self, seq: u64) -> bool {
        if seq <= self.applied {
            return false;
        }
        self.applied = seq;
        true
    }
}
