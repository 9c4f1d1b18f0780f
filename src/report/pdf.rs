use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use image::DynamicImage;
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point, Polygon, Rgb,
};

use crate::insights::FeatureImportance;
use crate::models::RiskTier;
use crate::predictor::BatchOutcome;
use crate::report::chart::{self, CHART_SIZE};
use crate::report::customer_label;
use crate::report::export::format_probability;
use crate::scoring::RiskThresholds;

type Rgb3 = (f32, f32, f32);

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 18.0;
const COVER_HDR_H: f32 = 72.0;

const BG: Rgb3 = (1.00, 1.00, 1.00);
const PANEL: Rgb3 = (1.00, 1.00, 1.00);
const PANEL_ALT: Rgb3 = (0.96, 0.97, 0.99);
const PANEL_BORDER: Rgb3 = (0.85, 0.87, 0.92);
const ACCENT_TEAL: Rgb3 = (0.11, 0.55, 0.60);
const ACCENT_BLU: Rgb3 = (0.20, 0.40, 0.85);
const TEXT_PRI: Rgb3 = (0.07, 0.08, 0.14);
const TEXT_SEC: Rgb3 = (0.36, 0.40, 0.52);
const TEXT_MUT: Rgb3 = (0.58, 0.63, 0.72);
const WHITE: Rgb3 = (1.00, 1.00, 1.00);
const WHITE_DIM: Rgb3 = (0.84, 0.93, 0.96);

const LOW_BG: Rgb3 = (0.90, 0.98, 0.92);
const LOW_FG: Rgb3 = (0.07, 0.52, 0.22);
const MED_BG: Rgb3 = (1.00, 0.95, 0.87);
const MED_FG: Rgb3 = (0.70, 0.40, 0.02);
const HIGH_BG: Rgb3 = (1.00, 0.91, 0.91);
const HIGH_FG: Rgb3 = (0.76, 0.09, 0.13);

const R_PANEL: f32 = 2.5;
const R_BADGE: f32 = 1.5;

// Tier summary table
const C1_X: f32 = MARGIN;
const C2_X: f32 = MARGIN + 44.0;
const C3_X: f32 = MARGIN + 112.0;
const T_END: f32 = PAGE_W - MARGIN;
const HDR_H: f32 = 9.0;
const LINE_H: f32 = 4.8;
const ROW_PAD: f32 = 4.5;
const BADGE_W: f32 = 37.0;
const BADGE_H: f32 = 6.5;
const DOT_SIZE: f32 = 2.5;
const DESC_WRAP: usize = 34;
const IDS_WRAP: usize = 30;
const IDS_MAX_LINES: usize = 6;

fn tier_colors(tier: RiskTier) -> (Rgb3, Rgb3) {
    match tier {
        RiskTier::High => (HIGH_BG, HIGH_FG),
        RiskTier::Medium => (MED_BG, MED_FG),
        RiskTier::Low => (LOW_BG, LOW_FG),
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self> {
        Ok(Self {
            regular: doc.add_builtin_font(BuiltinFont::Helvetica)?,
            bold: doc.add_builtin_font(BuiltinFont::HelveticaBold)?,
        })
    }
}

/// Render a PDF report: cover → tier summary → driver chart → all customers.
///
/// The chart page is skipped when the model exposes no importances.
pub fn render(
    outcome: &BatchOutcome,
    source: &Path,
    thresholds: &RiskThresholds,
    importances: Option<&[FeatureImportance]>,
    output_path: &Path,
) -> Result<()> {
    let source_name = source
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("customers");

    let doc = PdfDocument::empty("Churn Risk Report");
    let fonts = Fonts::load(&doc)?;

    add_cover_page(&doc, &fonts, outcome, source_name, importances.is_some());
    add_tier_summary_page(&doc, &fonts, outcome, thresholds);
    if let Some(ranked) = importances {
        add_chart_page(&doc, &fonts, ranked)?;
    }
    add_table_pages(&doc, &fonts, outcome);

    let bytes = doc.save_to_bytes()?;
    std::fs::write(output_path, &bytes)
        .with_context(|| format!("Failed to write PDF to {}", output_path.display()))?;

    println!("PDF report written to: {}", output_path.display());
    Ok(())
}

fn new_page(doc: &PdfDocumentReference, name: &str) -> PdfLayerReference {
    let (page_idx, layer_idx) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), name);
    let layer = doc.get_page(page_idx).get_layer(layer_idx);
    fill_rect(&layer, 0.0, 0.0, PAGE_W, PAGE_H, BG);
    layer
}

fn page_footer(layer: &PdfLayerReference, fonts: &Fonts) {
    draw_hline(layer, MARGIN, PAGE_W - MARGIN, 22.0, PANEL_BORDER);
    set_color(layer, TEXT_MUT);
    layer.use_text(
        format!("churn-checkr v{}", env!("CARGO_PKG_VERSION")),
        7.5, Mm(MARGIN), Mm(15.0), &fonts.regular,
    );
}

// ── Cover page ────────────────────────────────────────────────────────────────

fn add_cover_page(
    doc: &PdfDocumentReference,
    fonts: &Fonts,
    outcome: &BatchOutcome,
    source_name: &str,
    has_chart: bool,
) {
    let layer = new_page(doc, "Cover");
    let summary = outcome.summary();

    let hdr_bot = PAGE_H - COVER_HDR_H;
    fill_gradient_h(&layer, 0.0, hdr_bot, PAGE_W, COVER_HDR_H, ACCENT_TEAL, ACCENT_BLU, 28);

    set_color(&layer, WHITE_DIM);
    layer.use_text(
        format!("churn-checkr v{}", env!("CARGO_PKG_VERSION")),
        7.5, Mm(PAGE_W - MARGIN - 40.0), Mm(PAGE_H - 10.5), &fonts.regular,
    );
    set_color(&layer, WHITE);
    layer.use_text("Customer Churn", 28.0, Mm(MARGIN), Mm(PAGE_H - 26.0), &fonts.bold);
    set_color(&layer, WHITE_DIM);
    layer.use_text("Risk Report", 28.0, Mm(MARGIN), Mm(PAGE_H - 41.0), &fonts.bold);

    // Source chip
    let chip_y = hdr_bot - 18.0;
    let (chip_w, chip_h) = (106.0f32, 12.0f32);
    fill_rounded_rect(&layer, MARGIN, chip_y, chip_w, chip_h, R_BADGE, PANEL);
    stroke_rounded_rect(&layer, MARGIN, chip_y, chip_w, chip_h, R_BADGE, PANEL_BORDER);
    fill_rect(&layer, MARGIN, chip_y, 2.5, chip_h, ACCENT_TEAL);
    set_color(&layer, TEXT_MUT);
    layer.use_text("CUSTOMER DATA", 6.0, Mm(MARGIN + 5.0), Mm(chip_y + chip_h - 3.8), &fonts.bold);
    set_color(&layer, TEXT_PRI);
    layer.use_text(truncate(source_name, 34), 9.5, Mm(MARGIN + 5.0), Mm(chip_y + 2.8), &fonts.bold);

    set_color(&layer, TEXT_SEC);
    layer.use_text(format!("Scored  {}", today()), 9.0, Mm(MARGIN), Mm(chip_y - 8.0), &fonts.regular);

    let rule_y = chip_y - 16.5;
    draw_hline(&layer, MARGIN, PAGE_W - MARGIN, rule_y, PANEL_BORDER);
    set_color(&layer, TEXT_MUT);
    layer.use_text("OVERVIEW", 6.5, Mm(MARGIN), Mm(rule_y - 7.0), &fonts.bold);

    let card_y = rule_y - 42.0;
    let card_h = 26.0f32;
    let gap = 4.0f32;
    let card_w = (T_END - MARGIN - gap * 3.0) / 4.0;
    let cards: [(&str, usize, Rgb3); 4] = [
        ("TOTAL", summary.total, ACCENT_BLU),
        ("HIGH RISK", summary.high, HIGH_FG),
        ("MEDIUM RISK", summary.medium, MED_FG),
        ("LOW RISK", summary.low, LOW_FG),
    ];
    for (i, (label, count, accent)) in cards.iter().enumerate() {
        let cx = MARGIN + (card_w + gap) * i as f32;
        let caption = if i == 0 {
            label.to_string()
        } else {
            let tier = [RiskTier::High, RiskTier::Medium, RiskTier::Low][i - 1];
            format!("{}  {:.1}%", label, summary.percent(tier))
        };
        draw_stat_card(&layer, fonts, cx, card_y, card_w, card_h, &caption, &count.to_string(), *accent);
    }

    let section_y = card_y - 13.0;
    draw_hline(&layer, MARGIN, PAGE_W - MARGIN, section_y, PANEL_BORDER);
    set_color(&layer, TEXT_MUT);
    layer.use_text("WHAT'S IN THIS REPORT", 6.5, Mm(MARGIN), Mm(section_y - 7.5), &fonts.bold);

    let mut items = vec![("Risk Tiers", "Customers grouped by churn risk, with next steps")];
    if has_chart {
        items.push(("Churn Drivers", "The factors the model weighs most heavily"));
    }
    items.push(("All Customers", "Probability, prediction and risk for every row"));
    for (j, (title, desc)) in items.iter().enumerate() {
        let iy = section_y - 15.0 - j as f32 * 10.0;
        fill_rounded_rect(&layer, MARGIN, iy + 2.0, 2.0, 2.0, 1.0, ACCENT_TEAL);
        set_color(&layer, TEXT_PRI);
        layer.use_text(*title, 8.5, Mm(MARGIN + 5.0), Mm(iy + 2.0), &fonts.bold);
        set_color(&layer, TEXT_SEC);
        layer.use_text(*desc, 8.0, Mm(MARGIN + 5.0), Mm(iy - 3.5), &fonts.regular);
    }

    page_footer(&layer, fonts);
    set_color(&layer, TEXT_MUT);
    layer.use_text(today(), 7.5, Mm(PAGE_W - MARGIN - 22.0), Mm(15.0), &fonts.regular);
}

#[allow(clippy::too_many_arguments)]
fn draw_stat_card(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    x: f32, y: f32, w: f32, h: f32,
    label: &str,
    value: &str,
    accent: Rgb3,
) {
    fill_rounded_rect(layer, x, y, w, h, R_BADGE, PANEL);
    stroke_rounded_rect(layer, x, y, w, h, R_BADGE, PANEL_BORDER);
    fill_rect(layer, x, y + h - 2.0, w, 2.0, accent);

    set_color(layer, accent);
    layer.use_text(value, 20.0, Mm(x + 5.0), Mm(y + h * 0.38), &fonts.bold);
    set_color(layer, TEXT_MUT);
    layer.use_text(label, 6.5, Mm(x + 5.0), Mm(y + 3.5), &fonts.regular);
}

// ── Tier summary page ─────────────────────────────────────────────────────────

struct TierRow {
    tier: RiskTier,
    desc_lines: Vec<String>,
    id_lines: Vec<String>,
    height: f32,
}

fn add_tier_summary_page(
    doc: &PdfDocumentReference,
    fonts: &Fonts,
    outcome: &BatchOutcome,
    thresholds: &RiskThresholds,
) {
    let layer = new_page(doc, "Risk Tiers");
    fill_gradient_h(&layer, 0.0, PAGE_H - 2.5, PAGE_W, 2.5, ACCENT_TEAL, ACCENT_BLU, 21);

    let rows: Vec<TierRow> = [RiskTier::High, RiskTier::Medium, RiskTier::Low]
        .into_iter()
        .map(|tier| {
            let ids: Vec<String> = outcome
                .scored
                .iter()
                .enumerate()
                .filter(|(_, s)| s.result.tier == tier)
                .map(|(i, s)| customer_label(&s.record, i))
                .collect();
            let range = match tier {
                RiskTier::High => format!("p ≥ {:.2}", thresholds.high),
                RiskTier::Medium => format!("{:.2} ≤ p < {:.2}", thresholds.medium, thresholds.high),
                RiskTier::Low => format!("p < {:.2}", thresholds.medium),
            };
            let mut desc_lines = wrap_text(tier.headline(), DESC_WRAP);
            desc_lines.extend(wrap_text(tier.recommended_actions()[0], DESC_WRAP));
            desc_lines.push(range);

            let mut id_lines = format_count_list(&ids, IDS_WRAP);
            if id_lines.len() > IDS_MAX_LINES {
                let count_line = id_lines.last().cloned().unwrap_or_default();
                id_lines.truncate(IDS_MAX_LINES - 1);
                id_lines.push(count_line);
            }
            let n = desc_lines.len().max(id_lines.len()).max(2) as f32;
            TierRow { tier, desc_lines, id_lines, height: n * LINE_H + ROW_PAD * 2.0 }
        })
        .collect();

    const TABLE_TOP: f32 = 258.0;
    let total_h = HDR_H + rows.iter().map(|r| r.height).sum::<f32>();
    let table_bot = TABLE_TOP - total_h;
    let table_w = T_END - C1_X;

    set_color(&layer, TEXT_PRI);
    layer.use_text("Risk Tiers", 20.0, Mm(MARGIN), Mm(278.5), &fonts.bold);
    set_color(&layer, TEXT_SEC);
    layer.use_text("Customers grouped by churn probability", 9.0, Mm(MARGIN), Mm(271.5), &fonts.regular);
    draw_hline(&layer, MARGIN, PAGE_W - MARGIN, 267.5, PANEL_BORDER);

    fill_rounded_rect(&layer, C1_X, table_bot, table_w, total_h, R_PANEL, PANEL);
    stroke_rounded_rect(&layer, C1_X, table_bot, table_w, total_h, R_PANEL, PANEL_BORDER);

    set_color(&layer, TEXT_SEC);
    layer.use_text("RISK TIER", 7.0, Mm(C1_X + 4.0), Mm(TABLE_TOP - 6.2), &fonts.bold);
    layer.use_text("WHAT TO DO", 7.0, Mm(C2_X + 2.0), Mm(TABLE_TOP - 6.2), &fonts.bold);
    layer.use_text("CUSTOMERS", 7.0, Mm(C3_X + 2.0), Mm(TABLE_TOP - 6.2), &fonts.bold);
    draw_hline(&layer, C1_X + R_PANEL, T_END - R_PANEL, TABLE_TOP - HDR_H, PANEL_BORDER);

    let mut y_top = TABLE_TOP - HDR_H;
    for (i, row) in rows.iter().enumerate() {
        let y_bot = y_top - row.height;
        let (bg, fg) = tier_colors(row.tier);

        if i % 2 == 1 {
            fill_rect(&layer, C1_X, y_bot, table_w, row.height, PANEL_ALT);
        }

        let badge_x = C1_X + 3.0;
        let badge_y = y_top - ROW_PAD - BADGE_H;
        fill_rounded_rect(&layer, badge_x, badge_y, BADGE_W, BADGE_H, R_BADGE, bg);
        fill_rounded_rect(
            &layer,
            badge_x + 2.5, badge_y + (BADGE_H - DOT_SIZE) / 2.0,
            DOT_SIZE, DOT_SIZE, DOT_SIZE / 2.0, fg,
        );
        set_color(&layer, fg);
        layer.use_text(row.tier.label(), 8.0, Mm(badge_x + 7.5), Mm(badge_y + 1.5), &fonts.bold);

        set_color(&layer, TEXT_SEC);
        for (j, line) in row.desc_lines.iter().enumerate() {
            let ly = y_top - ROW_PAD - (j as f32 + 0.9) * LINE_H;
            layer.use_text(line.as_str(), 8.0, Mm(C2_X + 2.0), Mm(ly), &fonts.regular);
        }

        // Identifiers muted, count line bold
        let last = row.id_lines.len().saturating_sub(1);
        for (j, line) in row.id_lines.iter().enumerate() {
            let ly = y_top - ROW_PAD - (j as f32 + 0.9) * LINE_H;
            if j == last {
                set_color(&layer, TEXT_PRI);
                layer.use_text(line.as_str(), 9.0, Mm(C3_X + 2.0), Mm(ly), &fonts.bold);
            } else {
                set_color(&layer, TEXT_MUT);
                layer.use_text(line.as_str(), 7.0, Mm(C3_X + 2.0), Mm(ly), &fonts.regular);
            }
        }

        if i < rows.len() - 1 {
            draw_hline(&layer, C1_X + R_PANEL, T_END - R_PANEL, y_bot, PANEL_BORDER);
        }
        y_top = y_bot;
    }

    page_footer(&layer, fonts);
}

// ── Churn driver chart page ───────────────────────────────────────────────────

fn add_chart_page(doc: &PdfDocumentReference, fonts: &Fonts, ranked: &[FeatureImportance]) -> Result<()> {
    let layer = new_page(doc, "Churn Drivers");
    fill_gradient_h(&layer, 0.0, PAGE_H - 2.5, PAGE_W, 2.5, ACCENT_TEAL, ACCENT_BLU, 21);

    set_color(&layer, TEXT_PRI);
    layer.use_text("Churn Drivers", 20.0, Mm(MARGIN), Mm(278.5), &fonts.bold);
    set_color(&layer, TEXT_SEC);
    layer.use_text(
        "Which factors matter most when predicting whether a customer will leave",
        9.0, Mm(MARGIN), Mm(271.5), &fonts.regular,
    );
    draw_hline(&layer, MARGIN, PAGE_W - MARGIN, 267.5, PANEL_BORDER);

    let rgb = chart::render(ranked, CHART_SIZE)?;
    let image = Image::from_dynamic_image(&DynamicImage::ImageRgb8(rgb));

    // Scale the bitmap to the text width.
    let width_mm = T_END - MARGIN;
    let dpi = CHART_SIZE.0 as f32 * 25.4 / width_mm;
    let height_mm = CHART_SIZE.1 as f32 * 25.4 / dpi;
    let img_y = 262.0 - height_mm;
    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(MARGIN)),
            translate_y: Some(Mm(img_y)),
            dpi: Some(dpi),
            ..Default::default()
        },
    );

    // Top five with explanations
    let mut y = img_y - 10.0;
    set_color(&layer, TEXT_MUT);
    layer.use_text("WHAT THIS MEANS", 6.5, Mm(MARGIN), Mm(y), &fonts.bold);
    for f in ranked.iter().take(5) {
        y -= 8.0;
        fill_rounded_rect(&layer, MARGIN, y + 0.6, 2.0, 2.0, 1.0, ACCENT_TEAL);
        set_color(&layer, TEXT_PRI);
        layer.use_text(
            format!("{}  ({:.1}%)", f.friendly_name, f.importance * 100.0),
            8.5, Mm(MARGIN + 5.0), Mm(y), &fonts.bold,
        );
        set_color(&layer, TEXT_SEC);
        layer.use_text(
            truncate(&crate::insights::explanation(&f.feature), 95),
            8.0, Mm(MARGIN + 5.0), Mm(y - 4.0), &fonts.regular,
        );
    }

    page_footer(&layer, fonts);
    Ok(())
}

// ── All customers table ───────────────────────────────────────────────────────

fn add_table_pages(doc: &PdfDocumentReference, fonts: &Fonts, outcome: &BatchOutcome) {
    const ROW_H: f32 = 7.0;
    const HDR_Y: f32 = 268.5;
    const FIRST_Y: f32 = 259.5;
    const BOT_MARGIN: f32 = 25.0;

    //  CUSTOMER   PROBABILITY   PREDICTION   RISK
    let col_x = [MARGIN, MARGIN + 62.0, MARGIN + 92.0, MARGIN + 134.0];
    let headers = ["CUSTOMER", "PROBABILITY", "PREDICTION", "RISK"];

    let mut cur_y = FIRST_Y;
    let mut page_num: u32 = 0;
    let mut current: Option<PdfLayerReference> = None;

    for (row_idx, scored) in outcome.scored.iter().enumerate() {
        if current.is_none() || cur_y - ROW_H < BOT_MARGIN {
            page_num += 1;
            let l = new_page(doc, "Customers");
            fill_gradient_h(&l, 0.0, PAGE_H - 2.5, PAGE_W, 2.5, ACCENT_TEAL, ACCENT_BLU, 21);

            set_color(&l, TEXT_PRI);
            l.use_text("All Customers", 14.0, Mm(MARGIN), Mm(282.5), &fonts.bold);
            set_color(&l, TEXT_MUT);
            l.use_text(format!("Page {}", page_num), 8.0, Mm(PAGE_W - MARGIN - 14.0), Mm(283.0), &fonts.regular);
            draw_hline(&l, MARGIN, PAGE_W - MARGIN, 277.5, PANEL_BORDER);

            fill_rounded_rect(&l, MARGIN, HDR_Y - 7.5, PAGE_W - 2.0 * MARGIN, 9.5, R_BADGE, PANEL);
            stroke_rounded_rect(&l, MARGIN, HDR_Y - 7.5, PAGE_W - 2.0 * MARGIN, 9.5, R_BADGE, PANEL_BORDER);
            set_color(&l, TEXT_MUT);
            for (i, h) in headers.iter().enumerate() {
                l.use_text(*h, 7.0, Mm(col_x[i] + 1.5), Mm(HDR_Y - 4.0), &fonts.bold);
            }
            page_footer(&l, fonts);

            cur_y = FIRST_Y;
            current = Some(l);
        }
        let Some(layer) = current.as_ref() else { continue };

        let result = &scored.result;
        let (bg, fg) = tier_colors(result.tier);

        if row_idx % 2 == 0 {
            fill_rect(layer, MARGIN, cur_y - ROW_H + 1.5, PAGE_W - 2.0 * MARGIN, ROW_H, PANEL_ALT);
        }

        let text_y = cur_y - 4.0;
        set_color(layer, TEXT_PRI);
        layer.use_text(
            truncate(&customer_label(&scored.record, row_idx), 30),
            8.0, Mm(col_x[0] + 1.5), Mm(text_y), &fonts.regular,
        );
        set_color(layer, TEXT_SEC);
        layer.use_text(format_probability(result.probability), 8.0, Mm(col_x[1] + 1.5), Mm(text_y), &fonts.regular);
        layer.use_text(result.label.to_string(), 8.0, Mm(col_x[2] + 1.5), Mm(text_y), &fonts.regular);

        let badge_x = col_x[3] + 1.5;
        let badge_y = cur_y - ROW_H + 2.2;
        fill_rounded_rect(layer, badge_x, badge_y, 26.0, 4.8, R_BADGE, bg);
        set_color(layer, fg);
        layer.use_text(result.tier.label(), 7.0, Mm(badge_x + 3.0), Mm(badge_y + 1.1), &fonts.bold);

        draw_hline(layer, MARGIN, T_END, cur_y - ROW_H + 1.5, PANEL_BORDER);
        cur_y -= ROW_H;
    }
}

// ── Drawing helpers ───────────────────────────────────────────────────────────

fn rgb((r, g, b): Rgb3) -> Color {
    Color::Rgb(Rgb { r, g, b, icc_profile: None })
}

fn set_color(layer: &PdfLayerReference, color: Rgb3) {
    layer.set_fill_color(rgb(color));
}

fn fill_polygon(layer: &PdfLayerReference, ring: Vec<(Point, bool)>, color: Rgb3) {
    layer.set_fill_color(rgb(color));
    layer.add_polygon(Polygon {
        rings: vec![ring],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    });
    layer.set_fill_color(rgb((0.0, 0.0, 0.0)));
}

fn fill_rect(layer: &PdfLayerReference, x: f32, y: f32, w: f32, h: f32, color: Rgb3) {
    let ring = vec![
        (Point::new(Mm(x), Mm(y)), false),
        (Point::new(Mm(x + w), Mm(y)), false),
        (Point::new(Mm(x + w), Mm(y + h)), false),
        (Point::new(Mm(x), Mm(y + h)), false),
    ];
    fill_polygon(layer, ring, color);
}

/// Clockwise ring approximating a rounded rectangle, 8 segments per corner.
fn rounded_rect_ring(x: f32, y: f32, w: f32, h: f32, r: f32) -> Vec<(Point, bool)> {
    const SEGS: usize = 8;
    let r = r.min(w / 2.0).min(h / 2.0);
    let corners = [
        (x + w - r, y + r, 270.0f32),
        (x + w - r, y + h - r, 0.0f32),
        (x + r, y + h - r, 90.0f32),
        (x + r, y + r, 180.0f32),
    ];
    corners
        .iter()
        .flat_map(|&(cx, cy, start)| {
            (0..=SEGS).map(move |i| {
                let angle = (start + 90.0 * i as f32 / SEGS as f32).to_radians();
                (Point::new(Mm(cx + r * angle.cos()), Mm(cy + r * angle.sin())), false)
            })
        })
        .collect()
}

fn fill_rounded_rect(layer: &PdfLayerReference, x: f32, y: f32, w: f32, h: f32, r: f32, color: Rgb3) {
    fill_polygon(layer, rounded_rect_ring(x, y, w, h, r), color);
}

fn stroke_rounded_rect(layer: &PdfLayerReference, x: f32, y: f32, w: f32, h: f32, r: f32, color: Rgb3) {
    layer.set_outline_color(rgb(color));
    layer.set_outline_thickness(0.4);
    layer.add_polygon(Polygon {
        rings: vec![rounded_rect_ring(x, y, w, h, r)],
        mode: PaintMode::Stroke,
        winding_order: WindingOrder::NonZero,
    });
    layer.set_outline_color(rgb((0.0, 0.0, 0.0)));
    layer.set_outline_thickness(1.0);
}

fn draw_hline(layer: &PdfLayerReference, x1: f32, x2: f32, y: f32, color: Rgb3) {
    layer.set_outline_color(rgb(color));
    layer.set_outline_thickness(0.3);
    layer.add_line(Line {
        points: vec![(Point::new(Mm(x1), Mm(y)), false), (Point::new(Mm(x2), Mm(y)), false)],
        is_closed: false,
    });
    layer.set_outline_color(rgb((0.0, 0.0, 0.0)));
    layer.set_outline_thickness(1.0);
}

/// Left-to-right gradient built from `steps` overlapping vertical strips.
#[allow(clippy::too_many_arguments)]
fn fill_gradient_h(
    layer: &PdfLayerReference,
    x: f32, y: f32, w: f32, h: f32,
    from: Rgb3,
    to: Rgb3,
    steps: usize,
) {
    let step_w = w / steps as f32;
    for i in 0..steps {
        let t = i as f32 / (steps - 1).max(1) as f32;
        let color = (
            from.0 + (to.0 - from.0) * t,
            from.1 + (to.1 - from.1) * t,
            from.2 + (to.2 - from.2) * t,
        );
        fill_rect(layer, x + i as f32 * step_w, y, step_w + 0.6, h, color);
    }
}

// ── Text helpers ──────────────────────────────────────────────────────────────

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", head)
    } else {
        s.to_string()
    }
}

fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Identifiers packed into comma-separated lines, then "<N> customer(s)".
fn format_count_list(ids: &[String], max_chars: usize) -> Vec<String> {
    if ids.is_empty() {
        return vec!["None".to_string()];
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    for id in ids {
        if !current.is_empty() && current.len() + 2 + id.len() > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push_str(", ");
        }
        current.push_str(id);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.push(format!("{} customer{}", ids.len(), if ids.len() == 1 { "" } else { "s" }));
    lines
}

/// Today's UTC date as `YYYY-MM-DD`.
fn today() -> String {
    format_date(Utc::now().date_naive())
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
