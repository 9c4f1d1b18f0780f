use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use image::RgbImage;
use plotters::prelude::*;

use crate::insights::{FeatureImportance, TOP_FEATURES};

pub const CHART_SIZE: (u32, u32) = (1200, 800);

const BAR_COLORS: [RGBColor; TOP_FEATURES] = [
    RGBColor(0xff, 0x6b, 0x6b),
    RGBColor(0x4e, 0xcd, 0xc4),
    RGBColor(0x45, 0xb7, 0xd1),
    RGBColor(0xf9, 0xca, 0x24),
    RGBColor(0xf0, 0x93, 0x2b),
    RGBColor(0xeb, 0x4d, 0x4b),
    RGBColor(0x6c, 0x5c, 0xe7),
    RGBColor(0x74, 0xb9, 0xff),
    RGBColor(0x00, 0xb8, 0x94),
    RGBColor(0xfd, 0xcb, 0x6e),
];

/// Draw the top-ranked features as horizontal bars, most important on top.
pub fn render(ranked: &[FeatureImportance], (width, height): (u32, u32)) -> Result<RgbImage> {
    let top: Vec<&FeatureImportance> = ranked.iter().take(TOP_FEATURES).collect();
    if top.is_empty() {
        bail!("no feature importances to chart");
    }
    let n = top.len();
    let x_max = top.iter().map(|f| f.importance).fold(0.0, f64::max).max(1e-6) * 1.15;

    let mut buf = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;

        // Segment `row` holds rank `n - 1 - row`.
        let label = |row: usize| top[n - 1 - row].friendly_name.clone();

        let mut chart = ChartBuilder::on(&root)
            .caption(
                "Top 10 Most Important Factors for Predicting Churn",
                ("sans-serif", 28).into_font(),
            )
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(240)
            .build_cartesian_2d(0f64..x_max, (0..n).into_segmented())?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(n)
            .y_label_formatter(&|v| match v {
                SegmentValue::CenterOf(row) if *row < n => label(*row),
                _ => String::new(),
            })
            .x_desc("Importance Score")
            .label_style(("sans-serif", 16))
            .draw()?;

        chart.draw_series(top.iter().enumerate().map(|(rank, f)| {
            let row = n - 1 - rank;
            let mut bar = Rectangle::new(
                [
                    (0.0, SegmentValue::Exact(row)),
                    (f.importance, SegmentValue::Exact(row + 1)),
                ],
                BAR_COLORS[rank % BAR_COLORS.len()].filled(),
            );
            bar.set_margin(6, 6, 0, 0);
            bar
        }))?;

        chart.draw_series(top.iter().enumerate().map(|(rank, f)| {
            Text::new(
                format!("{:.3}", f.importance),
                (f.importance + x_max * 0.01, SegmentValue::CenterOf(n - 1 - rank)),
                ("sans-serif", 16).into_font().style(FontStyle::Bold),
            )
        }))?;

        root.present()?;
    }

    RgbImage::from_raw(width, height, buf).ok_or_else(|| anyhow!("chart buffer has the wrong size"))
}

/// Render the chart and save it as PNG.
pub fn write_png(ranked: &[FeatureImportance], path: &Path) -> Result<()> {
    let img = render(ranked, CHART_SIZE)?;
    img.save(path)
        .with_context(|| format!("Failed to write chart to {}", path.display()))?;
    Ok(())
}
