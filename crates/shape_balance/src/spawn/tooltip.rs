//! Tooltip text for a single instance.
use glam::Vec3;

/// Asset prefix dropped from material names before display.
pub const MATERIAL_ASSET_PREFIX: &str = "MI_";

/// Formats `" {material}\n {mesh}\n [x, y, z]"` with one decimal per scale
/// component.
pub fn format_tooltip(material_name: &str, mesh_name: &str, scale: Vec3) -> String {
    let material = material_name
        .strip_prefix(MATERIAL_ASSET_PREFIX)
        .unwrap_or(material_name);
    format!(
        " {}\n {}\n [{:.1}, {:.1}, {:.1}]",
        material, mesh_name, scale.x, scale.y, scale.z
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_names_and_scale() {
        let text = format_tooltip("MI_Red", "SM_Cube", Vec3::new(0.76, 1.04, 1.26));
        assert_eq!(text, " Red\n SM_Cube\n [0.8, 1.0, 1.3]");
    }

    #[test]
    fn keeps_names_without_prefix() {
        let text = format_tooltip("Gold", "Sphere", Vec3::ONE);
        assert_eq!(text, " Gold\n Sphere\n [1.0, 1.0, 1.0]");
    }
}
