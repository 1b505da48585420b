use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::Dataset;
use crate::data::stats::ColumnSummary;

const ROW_HEIGHT: f32 = 18.0;

/// First `rows` listings of the working set, every column.
pub fn preview(ui: &mut Ui, dataset: &Dataset, rows: usize) {
    if dataset.is_empty() {
        ui.label(egui::RichText::new("No listings match the current filters").weak());
        return;
    }

    egui::ScrollArea::horizontal()
        .id_salt("preview_scroll")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .columns(Column::auto().at_least(60.0), dataset.columns.len())
                .header(20.0, |mut header| {
                    for col in &dataset.columns {
                        header.col(|ui: &mut Ui| {
                            ui.strong(col);
                        });
                    }
                })
                .body(|mut body| {
                    for listing in dataset.listings.iter().take(rows) {
                        body.row(ROW_HEIGHT, |mut row| {
                            for col in &dataset.columns {
                                row.col(|ui: &mut Ui| {
                                    ui.label(listing.cell(col).to_string());
                                });
                            }
                        });
                    }
                });
        });
}

fn fmt_stat(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.2}"),
        None => "NaN".to_string(),
    }
}

/// `describe()` transposed: one row per numeric column.
pub fn summary(ui: &mut Ui, summary: &[ColumnSummary]) {
    const HEADERS: [&str; 9] = ["", "count", "mean", "std", "min", "25%", "50%", "75%", "max"];

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::auto().at_least(120.0))
        .columns(Column::auto().at_least(70.0), HEADERS.len() - 1)
        .header(20.0, |mut header| {
            for h in HEADERS {
                header.col(|ui: &mut Ui| {
                    ui.strong(h);
                });
            }
        })
        .body(|mut body| {
            for s in summary {
                let st = s.stats;
                let cells = [
                    s.count.to_string(),
                    fmt_stat(st.map(|x| x.mean)),
                    fmt_stat(st.and_then(|x| x.std)),
                    fmt_stat(st.map(|x| x.min)),
                    fmt_stat(st.map(|x| x.q1)),
                    fmt_stat(st.map(|x| x.median)),
                    fmt_stat(st.map(|x| x.q3)),
                    fmt_stat(st.map(|x| x.max)),
                ];
                body.row(ROW_HEIGHT, |mut row| {
                    row.col(|ui: &mut Ui| {
                        ui.strong(&s.column);
                    });
                    for cell in &cells {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell);
                        });
                    }
                });
            }
        });
}
