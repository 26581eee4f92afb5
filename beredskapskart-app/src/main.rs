use beredskapskart::{
    controllers::{DistrictController, ShelterController},
    core::{geo::LatLng, map::MapHost},
    layers::tile::TileLayer,
    ui::widget::MapSurfaceExt,
};

/// Resolves a dataset URL against the configured data host
fn dataset_url(file: &str) -> String {
    let base = std::env::var("KART_DATA_BASE").unwrap_or_else(|_| {
        "https://dantiante.github.io/kws2100-publishing-a-map-application-Dantiante".to_string()
    });
    format!("{}/{}", base.trim_end_matches('/'), file)
}

/// Standalone map viewer application
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Map application"),
        ..Default::default()
    };

    eframe::run_native(
        "beredskapskart-app",
        options,
        Box::new(|cc| Box::new(KartApp::new(cc))),
    )?;

    Ok(())
}

/// The main application struct
struct KartApp {
    host: MapHost,
    districts: DistrictController,
    shelters: ShelterController,
    district_checked: bool,
    shelter_checked: bool,
}

impl KartApp {
    fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        // View over southern Norway, where both datasets live
        let mut host = MapHost::new(LatLng::new(59.0, 10.0), 8.0);
        host.set_layers(vec![Box::new(TileLayer::openstreetmap(
            "basemap".to_string(),
            "OpenStreetMap".to_string(),
        ))]);

        Self {
            host,
            districts: DistrictController::new(dataset_url("Sivilforsvarsdistrikter.geojson")),
            shelters: ShelterController::new(dataset_url("Offentlige_tilfluktsrom.geojson")),
            district_checked: false,
            shelter_checked: false,
        }
    }

    fn layer_checkboxes(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Actions:");

            let district_label = if self.district_checked {
                "Hide Civil Defense Layer"
            } else {
                "Show Civil Defense Layer"
            };
            if ui
                .checkbox(&mut self.district_checked, district_label)
                .changed()
            {
                if let Err(e) = self
                    .districts
                    .set_checked(self.district_checked, &mut self.host)
                {
                    log::error!("toggling civil defense layer failed: {}", e);
                    self.district_checked = self.districts.is_visible();
                }
            }

            let shelter_label = if self.shelter_checked {
                "Hide Emergency Shelter Layer"
            } else {
                "Show Emergency Shelter Layer"
            };
            if ui
                .checkbox(&mut self.shelter_checked, shelter_label)
                .changed()
            {
                if let Err(e) = self
                    .shelters
                    .set_checked(self.shelter_checked, &mut self.host)
                {
                    log::error!("toggling emergency shelter layer failed: {}", e);
                    self.shelter_checked = self.shelters.is_visible();
                }
            }
        });
    }
}

impl eframe::App for KartApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Pick up datasets once their background fetches finish
        self.districts.poll_source(&mut self.host);
        self.shelters.poll_source(&mut self.host);

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading("Map application");
        });

        egui::TopBottomPanel::top("nav").show(ctx, |ui| {
            self.layer_checkboxes(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let map = ui.map_view(&mut self.host);
            if let Some(coord) = map.clicked_at {
                self.districts.on_map_click(coord, &mut self.host);
                self.shelters.on_map_click(coord, &mut self.host);
            }
        });

        for event in self.host.process_events() {
            log::debug!("map event: {:?}", event);
        }

        // Tiles and datasets arrive from background threads
        ctx.request_repaint_after(std::time::Duration::from_millis(250));
    }
}
