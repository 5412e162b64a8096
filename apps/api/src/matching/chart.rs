//! Match/gap pie chart, rendered to an SVG string with `plotters`.

use plotters::element::Pie;
use plotters::prelude::*;
use thiserror::Error;

use super::Proportions;

const WIDTH: u32 = 480;
const HEIGHT: u32 = 480;
const RADIUS: f64 = 170.0;
const START_ANGLE: f64 = 140.0;

const MATCH_COLOR: RGBColor = RGBColor(0x4C, 0xAF, 0x50);
const GAP_COLOR: RGBColor = RGBColor(0xFF, 0x57, 0x33);

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Chart drawing failed: {0}")]
    Draw(String),
}

fn draw_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Draw(e.to_string())
}

/// Renders the two-slice pie ("Match" vs "Not Match") as a standalone SVG document.
pub fn render_pie_chart(proportions: &Proportions) -> Result<String, ChartError> {
    let sizes = vec![
        f64::from(proportions.match_share),
        f64::from(proportions.gap_share),
    ];
    let colors = vec![MATCH_COLOR, GAP_COLOR];
    let labels = vec!["Match", "Not Match"];

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let center = (WIDTH as i32 / 2, HEIGHT as i32 / 2);
        let radius = RADIUS;

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(START_ANGLE);
        pie.label_style(("sans-serif", 18).into_font().color(&BLACK));
        pie.percentages(("sans-serif", 16).into_font().color(&WHITE));

        root.draw(&pie).map_err(draw_err)?;
        root.present().map_err(draw_err)?;
    }

    Ok(svg)
}
