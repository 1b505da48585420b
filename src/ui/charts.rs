use std::collections::BTreeMap;
use std::f64::consts::TAU;

use eframe::egui::{self, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Plot, PlotPoints, Points,
    Polygon,
};

use crate::color::{ColorMap, ACCENT};
use crate::data::report::ScatterSeries;
use crate::data::stats::{Bin, BoxStats};

const CHART_HEIGHT: f32 = 280.0;

fn no_data(ui: &mut Ui) {
    ui.add_sized(
        [ui.available_width(), 60.0],
        egui::Label::new(egui::RichText::new("No data for the current filters").weak()),
    );
}

/// Axis labels for charts whose x positions are category indices.
fn category_formatter(labels: Vec<String>) -> impl Fn(GridMark, &std::ops::RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &std::ops::RangeInclusive<f64>| {
        let idx = mark.value.round();
        if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Price distribution
// ---------------------------------------------------------------------------

pub fn price_histogram(ui: &mut Ui, bins: &[Bin]) {
    if bins.is_empty() {
        no_data(ui);
        return;
    }
    let bars: Vec<Bar> = bins
        .iter()
        .map(|bin| {
            Bar::new((bin.start + bin.end) / 2.0, bin.count as f64)
                .width(bin.end - bin.start)
                .fill(ACCENT.linear_multiply(0.7))
        })
        .collect();

    Plot::new("price_histogram")
        .height(CHART_HEIGHT)
        .allow_scroll(false)
        .x_axis_label("price")
        .y_axis_label("count")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(ACCENT).name("price"));
        });
}

// ---------------------------------------------------------------------------
// Price by vehicle type
// ---------------------------------------------------------------------------

pub fn price_by_vehicle_type(ui: &mut Ui, groups: &[(String, BoxStats)]) {
    if groups.is_empty() {
        no_data(ui);
        return;
    }
    let colors = ColorMap::new(groups.iter().map(|(kind, _)| kind.as_str()));
    let labels: Vec<String> = groups.iter().map(|(kind, _)| kind.clone()).collect();

    Plot::new("price_by_vehicle_type")
        .height(CHART_HEIGHT)
        .allow_scroll(false)
        .legend(Legend::default())
        .x_axis_label("vehicleType")
        .y_axis_label("price")
        .x_axis_formatter(category_formatter(labels))
        .show(ui, |plot_ui| {
            for (i, (kind, stats)) in groups.iter().enumerate() {
                let x = i as f64;
                let color = colors.color_for(kind);
                let spread = BoxSpread::new(
                    stats.lower_whisker,
                    stats.q1,
                    stats.median,
                    stats.q3,
                    stats.upper_whisker,
                );
                let elem = BoxElem::new(x, spread)
                    .name(kind)
                    .box_width(0.6)
                    .fill(color.linear_multiply(0.3))
                    .stroke(Stroke::new(1.5, color));
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(kind).color(color));

                if !stats.outliers.is_empty() {
                    let outliers: Vec<[f64; 2]> = stats.outliers.iter().map(|&y| [x, y]).collect();
                    plot_ui.points(
                        Points::new(outliers)
                            .name(kind)
                            .color(color.linear_multiply(0.7))
                            .radius(2.0),
                    );
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Price vs. car age
// ---------------------------------------------------------------------------

/// Marker radius classes for the power-sized scatter.
const SIZE_CLASSES: usize = 4;

pub fn price_vs_age(ui: &mut Ui, series: &[ScatterSeries]) {
    if series.iter().all(|s| s.points.is_empty()) {
        no_data(ui);
        return;
    }
    let colors = ColorMap::new(series.iter().map(|s| s.gearbox.as_str()));
    let max_power = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.power_ps))
        .fold(0.0_f64, f64::max);

    Plot::new("price_vs_age")
        .height(CHART_HEIGHT)
        .allow_scroll(false)
        .legend(Legend::default())
        .x_axis_label("car_age")
        .y_axis_label("price")
        .show(ui, |plot_ui| {
            for s in series {
                let color = colors.color_for(&s.gearbox).gamma_multiply(0.6);

                // Points share one radius per series, so bucket by power.
                let mut classes: Vec<Vec<[f64; 2]>> = vec![Vec::new(); SIZE_CLASSES];
                for p in &s.points {
                    let share = (p.power_ps / max_power).sqrt();
                    let class = ((share * SIZE_CLASSES as f64) as usize).min(SIZE_CLASSES - 1);
                    classes[class].push([p.car_age, p.price]);
                }

                for (class, points) in classes.into_iter().enumerate() {
                    if points.is_empty() {
                        continue;
                    }
                    plot_ui.points(
                        Points::new(points)
                            .name(&s.gearbox)
                            .color(color)
                            .radius(1.5 + 1.5 * class as f32),
                    );
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Most common models
// ---------------------------------------------------------------------------

pub fn top_models(ui: &mut Ui, models: &[(String, usize)]) {
    if models.is_empty() {
        no_data(ui);
        return;
    }
    let bars: Vec<Bar> = models
        .iter()
        .enumerate()
        .map(|(i, (model, count))| {
            Bar::new(i as f64, *count as f64)
                .width(0.7)
                .name(model)
                .fill(ACCENT)
        })
        .collect();
    let labels = models.iter().map(|(model, _)| model.clone()).collect();

    Plot::new("top_models")
        .height(CHART_HEIGHT)
        .allow_scroll(false)
        .x_axis_label("model")
        .y_axis_label("count")
        .x_axis_formatter(category_formatter(labels))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(ACCENT).name("listings"));
        });
}

// ---------------------------------------------------------------------------
// Fuel type share
// ---------------------------------------------------------------------------

/// Segments of the pie, largest first: `(label, count, share)`.
pub fn pie_segments(share: &BTreeMap<String, usize>) -> Vec<(String, usize, f64)> {
    let total: usize = share.values().sum();
    if total == 0 {
        return Vec::new();
    }
    let mut segments: Vec<(String, usize, f64)> = share
        .iter()
        .map(|(fuel, &count)| (fuel.clone(), count, count as f64 / total as f64))
        .collect();
    segments.sort_by(|a, b| b.1.cmp(&a.1));
    segments
}

/// Outlines of one pie slice starting at angle `start` and running
/// clockwise over `sweep` radians. Polygon fill needs convex shapes, so the
/// slice is cut into wedges of at most a quarter turn, each outline being
/// the centre followed by its arc.
pub fn slice_wedges(start: f64, sweep: f64) -> Vec<Vec<[f64; 2]>> {
    let pieces = (sweep / (TAU / 4.0) - 1e-9).ceil().max(1.0) as usize;
    let piece_sweep = sweep / pieces as f64;
    let steps = ((piece_sweep / TAU) * 120.0).ceil().max(2.0) as usize;

    (0..pieces)
        .map(|piece| {
            let from = start - piece_sweep * piece as f64;
            let mut outline = Vec::with_capacity(steps + 2);
            outline.push([0.0, 0.0]);
            for step in 0..=steps {
                let angle = from - piece_sweep * step as f64 / steps as f64;
                outline.push([angle.cos(), angle.sin()]);
            }
            outline
        })
        .collect()
}

pub fn fuel_share(ui: &mut Ui, share: &BTreeMap<String, usize>) {
    let segments = pie_segments(share);
    if segments.is_empty() {
        no_data(ui);
        return;
    }
    let colors = ColorMap::new(segments.iter().map(|(fuel, _, _)| fuel.as_str()));

    Plot::new("fuel_share")
        .height(CHART_HEIGHT)
        .allow_scroll(false)
        .legend(Legend::default())
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .show(ui, |plot_ui| {
            // Start at twelve o'clock and run clockwise.
            let mut start = TAU / 4.0;
            for (fuel, _, fraction) in &segments {
                let sweep = fraction * TAU;
                let color = colors.color_for(fuel);
                // Wedges share the name so the legend shows one entry.
                let name = format!("{fuel} ({:.1}%)", fraction * 100.0);
                for outline in slice_wedges(start, sweep) {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::new(outline))
                            .fill_color(color)
                            .stroke(Stroke::new(1.0, color))
                            .name(&name),
                    );
                }
                start -= sweep;
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pie_segments_sorted_by_count() {
        let share: BTreeMap<String, usize> =
            [("diesel".to_string(), 1), ("petrol".to_string(), 3)].into();
        let segments = pie_segments(&share);
        assert_eq!(segments[0].0, "petrol");
        assert_eq!(segments[0].2, 0.75);
        assert!((segments.iter().map(|s| s.2).sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(pie_segments(&BTreeMap::new()).is_empty());
    }

    /// Cross product of consecutive edges; clockwise convex outlines never
    /// turn left.
    fn turns_right_everywhere(outline: &[[f64; 2]]) -> bool {
        let n = outline.len();
        (0..n).all(|i| {
            let [ax, ay] = outline[i];
            let [bx, by] = outline[(i + 1) % n];
            let [cx, cy] = outline[(i + 2) % n];
            (bx - ax) * (cy - by) - (by - ay) * (cx - bx) <= 1e-12
        })
    }

    #[test]
    fn large_slices_split_into_convex_wedges() {
        let start = TAU / 4.0;
        let sweep = 0.75 * TAU;
        let wedges = slice_wedges(start, sweep);

        assert_eq!(wedges.len(), 3);
        assert!(wedges.iter().all(|w| turns_right_everywhere(w)));

        let first = wedges[0][1];
        let last = *wedges[2].last().unwrap();
        assert!((first[0] - start.cos()).abs() < 1e-12);
        assert!((first[1] - start.sin()).abs() < 1e-12);
        assert!((last[0] - (start - sweep).cos()).abs() < 1e-12);
        assert!((last[1] - (start - sweep).sin()).abs() < 1e-12);

        // Neighbouring wedges meet on the same radius.
        for pair in wedges.windows(2) {
            let end = *pair[0].last().unwrap();
            let begin = pair[1][1];
            assert!((end[0] - begin[0]).abs() < 1e-12);
            assert!((end[1] - begin[1]).abs() < 1e-12);
        }
    }

    #[test]
    fn small_slice_is_a_single_wedge() {
        let wedges = slice_wedges(0.0, 0.1 * TAU);
        assert_eq!(wedges.len(), 1);
        assert!(turns_right_everywhere(&wedges[0]));
        assert_eq!(wedges[0][0], [0.0, 0.0]);
    }
}
