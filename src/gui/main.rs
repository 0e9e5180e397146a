#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::path::PathBuf;
use std::sync::mpsc;

use eframe::egui;

use folder_icon::api::{FolderIconApi, IMAGE_FILTER_EXTENSIONS, IMAGE_FILTER_NAME, Response};
use folder_icon::config::Config;
use folder_icon::pipeline::Pipeline;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([500.0, 400.0])
        .with_min_inner_size([420.0, 300.0])
        .with_drag_and_drop(true);

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "Folder Icon",
        options,
        Box::new(|cc| Ok(Box::new(App::new(cc)))),
    )
}

// ── Requests sent to the worker thread and their replies ────────────

enum Action {
    Install {
        folder: String,
        image: Option<String>,
        recursive: bool,
    },
    Uninstall {
        folder: String,
        recursive: bool,
    },
}

impl Action {
    fn verb(&self) -> &'static str {
        match self {
            Action::Install { .. } => "Install",
            Action::Uninstall { .. } => "Uninstall",
        }
    }
}

// ── Main application state ──────────────────────────────────────────

struct App {
    config: Config,
    folder: String,
    image: String,
    recursive: bool,
    busy: bool,
    status: String,
    last: Option<Response>,
    rx: mpsc::Receiver<(&'static str, Response)>,
    tx: mpsc::Sender<(&'static str, Response)>,
}

impl App {
    fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let (tx, rx) = mpsc::channel();
        let config = Config::load(None).unwrap_or_default();

        Self {
            config,
            folder: String::new(),
            image: String::new(),
            recursive: false,
            busy: false,
            status: "Ready — choose a folder".into(),
            last: None,
            rx,
            tx,
        }
    }

    fn select_folder(&mut self) {
        if let Some(dir) = rfd::FileDialog::new().pick_folder() {
            self.folder = dir.display().to_string();
        }
    }

    fn select_image(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter(IMAGE_FILTER_NAME, IMAGE_FILTER_EXTENSIONS)
            .pick_file()
        {
            self.image = path.display().to_string();
        }
    }

    /// Run one request on a worker thread; the reply arrives through `rx`.
    fn start(&mut self, action: Action) {
        if self.busy || self.folder.trim().is_empty() {
            return;
        }
        self.busy = true;
        self.last = None;
        self.status = format!("{}ing...", action.verb());

        let config = self.config.clone();
        let tx = self.tx.clone();

        std::thread::spawn(move || {
            let api = FolderIconApi::new(Pipeline::builder().from_config(&config).build());
            let verb = action.verb();
            let response = match action {
                Action::Install {
                    folder,
                    image,
                    recursive,
                } => api.install(&folder, image.as_deref(), recursive),
                Action::Uninstall { folder, recursive } => api.uninstall(&folder, recursive),
            };
            let _ = tx.send((verb, response));
        });
    }

    fn poll_messages(&mut self) {
        while let Ok((verb, response)) = self.rx.try_recv() {
            self.busy = false;
            self.status = match &response.error {
                None => format!("{verb} complete — press F5 in Explorer to refresh"),
                Some(err) => format!("{verb} failed: {err}"),
            };
            self.last = Some(response);
        }
    }

    fn handle_dropped(&mut self, ctx: &egui::Context) {
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw.dropped_files.iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        for path in dropped {
            if path.is_dir() {
                self.folder = path.display().to_string();
            } else {
                self.image = path.display().to_string();
            }
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_messages();
        self.handle_dropped(ctx);

        // Request repaint while working so we pick up the reply
        if self.busy {
            ctx.request_repaint();
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.busy {
                    ui.spinner();
                }
                match &self.last {
                    Some(r) if !r.success => {
                        ui.colored_label(egui::Color32::from_rgb(220, 50, 50), &self.status);
                    }
                    Some(_) => {
                        ui.colored_label(egui::Color32::from_rgb(50, 180, 50), &self.status);
                    }
                    None => {
                        ui.label(&self.status);
                    }
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Custom Folder Icon");
            ui.add_space(12.0);

            egui::Grid::new("form")
                .num_columns(3)
                .spacing([8.0, 10.0])
                .show(ui, |ui| {
                    ui.label(egui::RichText::new("Folder").strong());
                    ui.add(egui::TextEdit::singleline(&mut self.folder).desired_width(280.0));
                    if ui.add_enabled(!self.busy, egui::Button::new("📁 Browse")).clicked() {
                        self.select_folder();
                    }
                    ui.end_row();

                    ui.label(egui::RichText::new("Image").strong());
                    ui.add(
                        egui::TextEdit::singleline(&mut self.image)
                            .hint_text("folder.png / folder.jpg / folder.ico")
                            .desired_width(280.0),
                    );
                    if ui.add_enabled(!self.busy, egui::Button::new("🖼 Browse")).clicked() {
                        self.select_image();
                    }
                    ui.end_row();
                });

            ui.add_space(8.0);
            ui.checkbox(&mut self.recursive, "Apply to subfolders");
            ui.add_space(12.0);

            let ready = !self.busy && !self.folder.trim().is_empty();
            ui.horizontal(|ui| {
                if ui.add_enabled(ready, egui::Button::new("▶ Install")).clicked() {
                    let image = Some(self.image.clone()).filter(|s| !s.trim().is_empty());
                    self.start(Action::Install {
                        folder: self.folder.clone(),
                        image,
                        recursive: self.recursive,
                    });
                }
                if ui.add_enabled(ready, egui::Button::new("↺ Uninstall")).clicked() {
                    self.start(Action::Uninstall {
                        folder: self.folder.clone(),
                        recursive: self.recursive,
                    });
                }
            });
        });
    }
}
