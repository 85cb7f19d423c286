use eframe::egui::Color32;

pub const DEFAULT_CLUSTER_COLOR: Color32 = Color32::from_rgb(0x6b, 0x72, 0x80);
pub const DEFAULT_RELATION_STRENGTH: f32 = 0.5;

const CLUSTER_COLORS: [(&str, Color32); 9] = [
    ("cx:cluster-appropriations-intake", Color32::from_rgb(0x05, 0x96, 0x69)),
    ("cx:cluster-hearings-modernization", Color32::from_rgb(0x7c, 0x3a, 0xed)),
    ("cx:cluster-witness-management", Color32::from_rgb(0xea, 0x58, 0x0c)),
    ("cx:cluster-data-standards", Color32::from_rgb(0x08, 0x91, 0xb2)),
    ("cx:cluster-transparency-oversight", Color32::from_rgb(0xdc, 0x26, 0x26)),
    ("cx:cluster-staff-capacity", Color32::from_rgb(0x43, 0x38, 0xca)),
    ("cx:cluster-public-feedback", Color32::from_rgb(0x65, 0xa3, 0x0d)),
    ("cx:cluster-joint-hearings-mra", Color32::from_rgb(0xbe, 0x12, 0x3c)),
    ("cx:cluster-committee-memory", Color32::from_rgb(0xa2, 0x1c, 0xaf)),
];

const RELATION_STRENGTHS: [(&str, f32); 10] = [
    ("operational dependency", 1.0),
    ("learning loop", 0.8),
    ("resource constraint", 0.9),
    ("resourcing pressure", 0.9),
    ("outputs and artifacts", 0.7),
    ("reporting on outcomes", 0.7),
    ("tagging and retrieval", 0.6),
    ("cross-docket tagging", 0.6),
    ("improved data structure", 0.7),
    ("historical context indexing", 0.6),
];

pub fn color_for_cluster(cluster_id: &str) -> Color32 {
    CLUSTER_COLORS
        .iter()
        .find(|(id, _)| *id == cluster_id)
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_CLUSTER_COLOR)
}

/// Visual weight in `(0, 1]`; drives stroke width only.
pub fn strength_for_relation(label: &str) -> f32 {
    RELATION_STRENGTHS
        .iter()
        .find(|(phrase, _)| *phrase == label)
        .map(|(_, strength)| *strength)
        .unwrap_or(DEFAULT_RELATION_STRENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_clusters_have_fixed_colors() {
        assert_eq!(
            color_for_cluster("cx:cluster-witness-management"),
            Color32::from_rgb(0xea, 0x58, 0x0c)
        );
        assert_eq!(color_for_cluster("cx:unknown"), DEFAULT_CLUSTER_COLOR);
        assert_eq!(color_for_cluster(""), DEFAULT_CLUSTER_COLOR);
    }

    #[test]
    fn strengths_stay_in_unit_interval() {
        for (phrase, _) in RELATION_STRENGTHS {
            let strength = strength_for_relation(phrase);
            assert!(strength > 0.0 && strength <= 1.0, "{phrase}");
        }
        assert_eq!(strength_for_relation("operational dependency"), 1.0);
        assert_eq!(strength_for_relation("Operational Dependency"), 0.5);
        assert_eq!(strength_for_relation("something new"), 0.5);
    }
}
