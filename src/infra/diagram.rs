// ============================================================
// Layer 6 — Network Diagram
// ============================================================
// Renders the layer summary as a vertical stack of boxes:
//
//   +----------------------------------+
//   | input          (None, 2000, 1)   |
//   +----------------------------------+
//                    |
//   +----------------------------------+
//   | conv_block_0   (None, 1001, 32)  |
//   +----------------------------------+
//                   ...
//
// Drawing needs the optional `plot` feature (plotters). Without it
// every call returns DiagramError::Unavailable, which the caller
// logs and ignores.

use std::path::Path;
use thiserror::Error;

use crate::ml::model::LayerSummary;

pub const DIAGRAM_FILE: &str = "model.png";

#[derive(Debug, Error)]
pub enum DiagramError {
    #[error("diagram rendering is not available (build with the `plot` feature)")]
    Unavailable,

    #[error("failed to render diagram: {0}")]
    Render(String),
}

#[cfg(feature = "plot")]
pub fn render_diagram(layers: &[LayerSummary], path: &Path) -> Result<(), DiagramError> {
    use plotters::prelude::*;

    const WIDTH:   u32 = 480;
    const ROW:     i32 = 70;
    const BOX_H:   i32 = 40;
    const MARGIN:  i32 = 20;

    let render = |e: &dyn std::fmt::Display| DiagramError::Render(e.to_string());

    let height = (layers.len() as i32 * ROW + MARGIN) as u32;
    let root = BitMapBackend::new(path, (WIDTH, height)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| render(&e))?;

    let right = WIDTH as i32 - MARGIN;
    for (i, layer) in layers.iter().enumerate() {
        let top = MARGIN + i as i32 * ROW;

        root.draw(&Rectangle::new(
            [(MARGIN, top), (right, top + BOX_H)],
            Into::<ShapeStyle>::into(&BLACK).stroke_width(1),
        ))
        .map_err(|e| render(&e))?;

        root.draw(&Text::new(
            layer.to_string(),
            (MARGIN + 10, top + BOX_H / 2 - 7),
            ("sans-serif", 15).into_font().color(&BLACK),
        ))
        .map_err(|e| render(&e))?;

        if i + 1 < layers.len() {
            let mid = WIDTH as i32 / 2;
            root.draw(&PathElement::new(
                vec![(mid, top + BOX_H), (mid, top + ROW)],
                Into::<ShapeStyle>::into(&BLACK).stroke_width(1),
            ))
            .map_err(|e| render(&e))?;
        }
    }

    root.present().map_err(|e| render(&e))?;
    tracing::debug!("Wrote diagram to '{}'", path.display());
    Ok(())
}

#[cfg(not(feature = "plot"))]
pub fn render_diagram(_layers: &[LayerSummary], _path: &Path) -> Result<(), DiagramError> {
    Err(DiagramError::Unavailable)
}
