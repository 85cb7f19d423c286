use std::collections::HashMap;

use eframe::egui::Color32;

pub const EDGE_PALETTE: [Color32; 12] = [
    Color32::from_rgb(0x0e, 0xa5, 0xe9),
    Color32::from_rgb(0x22, 0xc5, 0x5e),
    Color32::from_rgb(0xf9, 0x73, 0x16),
    Color32::from_rgb(0xa8, 0x55, 0xf7),
    Color32::from_rgb(0xec, 0x48, 0x99),
    Color32::from_rgb(0x14, 0xb8, 0xa6),
    Color32::from_rgb(0xfa, 0xcc, 0x15),
    Color32::from_rgb(0xef, 0x44, 0x44),
    Color32::from_rgb(0x63, 0x66, 0xf1),
    Color32::from_rgb(0x8b, 0x5c, 0xf6),
    Color32::from_rgb(0xfb, 0x71, 0x85),
    Color32::from_rgb(0x2d, 0xd4, 0xbf),
];

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColorKey {
    pub source: String,
    pub target: String,
    pub relation: String,
}

/// Round-robin edge palette state carried between graph builds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PaletteCursor {
    used: HashMap<ColorKey, Color32>,
    next_index: usize,
}

impl PaletteCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_index(&self) -> usize {
        self.next_index
    }

    pub fn assigned(&self, key: &ColorKey) -> Option<Color32> {
        self.used.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    pub fn color_for(&mut self, key: ColorKey) -> Color32 {
        if let Some(color) = self.used.get(&key) {
            return *color;
        }

        let color = EDGE_PALETTE[self.next_index % EDGE_PALETTE.len()];
        self.next_index += 1;
        self.used.insert(key, color);
        color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(source: &str, target: &str, relation: &str) -> ColorKey {
        ColorKey {
            source: source.into(),
            target: target.into(),
            relation: relation.into(),
        }
    }

    #[test]
    fn repeated_keys_keep_their_color() {
        let mut cursor = PaletteCursor::new();
        let first = cursor.color_for(key("A", "B", "r"));
        let second = cursor.color_for(key("A", "C", "r"));

        assert_eq!(first, EDGE_PALETTE[0]);
        assert_eq!(second, EDGE_PALETTE[1]);
        assert_eq!(cursor.color_for(key("A", "B", "r")), first);
        assert_eq!(cursor.next_index(), 2);
        assert_eq!(cursor.len(), 2);
    }

    #[test]
    fn cursor_wraps_around_the_palette() {
        let mut cursor = PaletteCursor::new();
        for index in 0..EDGE_PALETTE.len() {
            cursor.color_for(key("A", "B", &index.to_string()));
        }

        assert_eq!(cursor.color_for(key("A", "B", "wrap")), EDGE_PALETTE[0]);
        assert_eq!(cursor.next_index(), EDGE_PALETTE.len() + 1);
    }
}
