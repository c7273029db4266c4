//! Print the band layout for a mode.

use shortsmith_common::config::AppConfig;
use shortsmith_processing_core::layout::{LayoutConfig, LayoutEngine};
use shortsmith_project_model::geometry::Dimensions;
use shortsmith_project_model::layout::VideoMode;

pub fn run(config: &AppConfig, mode: VideoMode, json: bool) -> anyhow::Result<()> {
    let canvas = Dimensions::new(config.video.width, config.video.height);
    let plan = LayoutEngine::new(canvas, LayoutConfig::default()).plan(mode);

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("Layout: {} ({}x{})", mode, canvas.width, canvas.height);
    println!("  Fit: {:?}", mode.fit_strategy());
    for band in &plan.bands {
        println!(
            "  {:<13} y={:<5} {}x{}",
            format!("{:?}", band.role),
            band.rect.y,
            band.rect.width,
            band.rect.height
        );
    }
    if !plan.is_partition() {
        anyhow::bail!("bands do not partition the canvas");
    }
    Ok(())
}
