#![forbid(unsafe_code)]

mod rendering;

pub use rendering::{
    init_tracing, log_population, render_population_to_png, MeshStyle, RenderConfig,
};
