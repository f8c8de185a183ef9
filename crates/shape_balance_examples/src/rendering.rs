use std::collections::HashMap;
use std::path::Path;

use glam::Vec3;
use image::{Rgb, RgbImage};
use shape_balance::prelude::{BalanceEngine, BoundingBox};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Installs a global fmt subscriber at `INFO`. Later calls are ignored.
pub fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Logs per-kind counts and the current thresholds.
pub fn log_population(engine: &BalanceEngine) {
    let t = engine.thresholds();
    info!(
        "total={} min_per_mesh={} min_per_material={}",
        engine.total(),
        t.min_per_mesh,
        t.min_per_material
    );
    for mesh in engine.space().meshes() {
        let name = engine.space().mesh_name(mesh).unwrap_or("?");
        info!("  {name}: {}", engine.count_mesh(mesh));
    }
    for material in engine.space().materials() {
        let name = engine.space().material_name(material).unwrap_or("?");
        info!("  {name}: {}", engine.count_material(material));
    }
}

/// Marker shape used for one mesh kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshStyle {
    Circle,
    Square,
    Diamond,
}

const PALETTE: [[u8; 3]; 6] = [
    [230, 80, 70],
    [90, 200, 110],
    [80, 130, 230],
    [235, 200, 70],
    [190, 110, 220],
    [70, 210, 210],
];

const STYLES: [MeshStyle; 3] = [MeshStyle::Circle, MeshStyle::Square, MeshStyle::Diamond];

/// Top-down (XY) rendering settings.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub image_size: (u32, u32),
    pub background: [u8; 3],
    /// Marker radius in pixels at scale 1.
    pub base_radius: f32,
    mesh_styles: HashMap<String, MeshStyle>,
    material_colors: HashMap<String, [u8; 3]>,
}

impl RenderConfig {
    pub fn new(image_size: (u32, u32)) -> Self {
        Self {
            image_size,
            background: [26, 26, 26],
            base_radius: 4.0,
            mesh_styles: HashMap::new(),
            material_colors: HashMap::new(),
        }
    }

    pub fn with_background(mut self, background: [u8; 3]) -> Self {
        self.background = background;
        self
    }

    pub fn with_base_radius(mut self, base_radius: f32) -> Self {
        self.base_radius = base_radius;
        self
    }

    pub fn set_mesh_style(&mut self, mesh: impl Into<String>, style: MeshStyle) {
        self.mesh_styles.insert(mesh.into(), style);
    }

    pub fn set_material_color(&mut self, material: impl Into<String>, color: [u8; 3]) {
        self.material_colors.insert(material.into(), color);
    }

    fn style_for(&self, name: &str, index: usize) -> MeshStyle {
        self.mesh_styles
            .get(name)
            .copied()
            .unwrap_or(STYLES[index % STYLES.len()])
    }

    fn color_for(&self, name: &str, index: usize) -> [u8; 3] {
        self.material_colors
            .get(name)
            .copied()
            .unwrap_or(PALETTE[index % PALETTE.len()])
    }
}

/// Pixel coordinates of `position` projected onto the XY plane of `bounds`.
/// Y grows upwards in world space and downwards in the image.
fn project(position: Vec3, bounds: &BoundingBox, size: (u32, u32)) -> (f32, f32) {
    let min = bounds.min();
    let extent = bounds.max() - min;
    let u = (position.x - min.x) / extent.x;
    let v = (position.y - min.y) / extent.y;
    (u * size.0 as f32, (1.0 - v) * size.1 as f32)
}

fn covers(style: MeshStyle, dx: f32, dy: f32, r: f32) -> bool {
    match style {
        MeshStyle::Circle => dx * dx + dy * dy <= r * r,
        MeshStyle::Square => dx.abs() <= r && dy.abs() <= r,
        MeshStyle::Diamond => dx.abs() + dy.abs() <= r,
    }
}

fn stamp(img: &mut RgbImage, center: (f32, f32), radius: f32, style: MeshStyle, color: [u8; 3]) {
    let (w, h) = img.dimensions();
    let r = radius.ceil() as i64;
    let cx = center.0 as i64;
    let cy = center.1 as i64;
    for y in (cy - r).max(0)..=(cy + r).min(h as i64 - 1) {
        for x in (cx - r).max(0)..=(cx + r).min(w as i64 - 1) {
            let dx = x as f32 + 0.5 - center.0;
            let dy = y as f32 + 0.5 - center.1;
            if covers(style, dx, dy, radius) {
                img.put_pixel(x as u32, y as u32, Rgb(color));
            }
        }
    }
}

/// Renders every instance of `engine` as a marker: shape by mesh kind,
/// color by material kind, size by the instance's X scale.
pub fn render_population_to_png(
    engine: &BalanceEngine,
    bounds: &BoundingBox,
    config: &RenderConfig,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let (w, h) = config.image_size;
    if w == 0 || h == 0 {
        anyhow::bail!("image size must be non-zero, got {w}x{h}");
    }
    let mut img = RgbImage::from_pixel(w, h, Rgb(config.background));
    let space = engine.space();

    for (pair, pool) in engine.iter_pools() {
        let mesh_name = space.mesh_name(pair.mesh).unwrap_or_default();
        let material_name = space.material_name(pair.material).unwrap_or_default();
        let style = config.style_for(mesh_name, pair.mesh.index());
        let color = config.color_for(material_name, pair.material.index());
        for instance in pool.iter() {
            let center = project(instance.transform.position, bounds, config.image_size);
            let radius = config.base_radius * instance.transform.scale.x;
            stamp(&mut img, center, radius, style, color);
        }
    }

    img.save(path.as_ref())?;
    info!("Wrote {} instance(s) to {}", engine.total(), path.as_ref().display());
    Ok(())
}
