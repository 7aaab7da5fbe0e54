use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;

mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use ui::app::ConsultApp;

#[derive(Parser, Debug)]
#[command(about = "Desktop front end for the machine fault diagnosis service")]
struct Args {
    /// Base URL of the diagnosis service.
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    server_url: String,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([900.0, 680.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Machine Fault Consultation",
        options,
        Box::new(move |cc| {
            backend_bridge::runtime::launch(
                args.server_url.clone(),
                cmd_rx,
                ui_tx,
                cc.egui_ctx.clone(),
            );
            Ok(Box::new(ConsultApp::new(cmd_tx, ui_rx)))
        }),
    )
}
