use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints};

use formation_sim::io::csv::{read_error_series_file, ErrorColumn};

const LOG_FILE: &str = "tracking_errors.csv";

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // A missing or malformed log is reported, not fatal: plotting happens
    // after the run has already ended.
    let columns = match read_error_series_file(LOG_FILE) {
        Ok(columns) => columns,
        Err(e) => {
            log::error!("could not load {LOG_FILE}: {e}");
            return Ok(());
        }
    };

    let app = ErrorViz { columns };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Follower Tracking Error",
        options,
        Box::new(|_| Ok(Box::new(app))),
    )
}

struct ErrorViz {
    columns: Vec<ErrorColumn>,
}

impl eframe::App for ErrorViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading("Follower tracking error over time");
            let steps = self
                .columns
                .iter()
                .map(|c| c.points.len())
                .max()
                .unwrap_or(0);
            ui.label(format!(
                "{} followers  |  {} recorded steps  |  source: {}",
                self.columns.len(),
                steps,
                LOG_FILE,
            ));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            Plot::new("tracking_error")
                .x_axis_label("Step")
                .y_axis_label("Tracking Error (cm)")
                .legend(Legend::default())
                .show(ui, |plot_ui| {
                    for column in &self.columns {
                        let points: PlotPoints = column.points.iter().copied().collect();
                        plot_ui.line(Line::new(column.name.clone(), points));
                    }
                });
        });
    }
}
