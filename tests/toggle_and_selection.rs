//! Headless integration tests for the checkbox-driven layer controllers.
//!
//! These drive the controllers and map host exactly as the viewer app does,
//! minus the rendering surface: toggles, clicks and popups all work on
//! plain data.

use beredskapskart::controllers::{
    DistrictController, ShelterController, ToggleState, DISTRICT_LAYER_ID, SHELTER_LAYER_ID,
};
use beredskapskart::core::{geo::LatLng, geo::Point, map::MapHost};
use beredskapskart::data::{geojson::GeoJson, source::FeatureSource};
use beredskapskart::layers::{district::DistrictLayer, shelter::ShelterLayer};

fn district_doc() -> GeoJson {
    serde_json::from_value(serde_json::json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"navn": "Oslo og Akershus sivilforsvarsdistrikt"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [9.0, 58.0], [11.0, 58.0], [11.0, 60.0], [9.0, 60.0], [9.0, 58.0]
                    ]]
                }
            },
            {
                "type": "Feature",
                "properties": {"navn": "Buskerud sivilforsvarsdistrikt"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [7.0, 59.5], [9.5, 59.5], [9.5, 61.0], [7.0, 61.0], [7.0, 59.5]
                    ]]
                }
            }
        ]
    }))
    .unwrap()
}

fn shelter_doc() -> GeoJson {
    serde_json::from_value(serde_json::json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"adresse": "Main St", "plasser": 500, "romnr": 3},
                "geometry": {"type": "Point", "coordinates": [10.0, 59.0]}
            },
            {
                "type": "Feature",
                "properties": {"adresse": "Second St", "plasser": 1500, "romnr": 7},
                "geometry": {"type": "Point", "coordinates": [10.4, 59.2]}
            }
        ]
    }))
    .unwrap()
}

fn test_host() -> MapHost {
    let mut host = MapHost::new(LatLng::new(59.0, 10.0), 8.0);
    host.attach(Point::new(800.0, 600.0)).unwrap();
    host
}

fn district_controller(host: &mut MapHost) -> DistrictController {
    let source = FeatureSource::preloaded("memory://districts", district_doc());
    let mut controller = DistrictController::with_source(source);
    controller.poll_source(host);
    controller
}

fn shelter_controller(host: &mut MapHost) -> ShelterController {
    let source = FeatureSource::preloaded("memory://shelters", shelter_doc());
    let mut controller = ShelterController::with_source(source);
    controller.poll_source(host);
    controller
}

fn shelter_feature_ids(host: &MapHost) -> Vec<String> {
    host.layer(SHELTER_LAYER_ID)
        .and_then(|l| l.as_any().downcast_ref::<ShelterLayer>())
        .map(|layer| layer.features().iter().map(|f| f.id.clone()).collect())
        .unwrap_or_default()
}

fn with_shelter_layer<R>(host: &MapHost, f: impl FnOnce(&ShelterLayer) -> R) -> R {
    let layer = host
        .layer(SHELTER_LAYER_ID)
        .and_then(|l| l.as_any().downcast_ref::<ShelterLayer>())
        .expect("shelter layer in active list");
    f(layer)
}

#[test]
fn layer_present_iff_checked() {
    let mut host = test_host();
    let mut districts = district_controller(&mut host);

    assert_eq!(districts.state(), ToggleState::Hidden);
    assert!(!host.has_layer(DISTRICT_LAYER_ID));

    districts.set_checked(true, &mut host).unwrap();
    assert_eq!(districts.state(), ToggleState::Visible);
    assert!(host.has_layer(DISTRICT_LAYER_ID));

    // Checking twice without unchecking is a no-op
    districts.set_checked(true, &mut host).unwrap();
    assert!(host.has_layer(DISTRICT_LAYER_ID));
    assert_eq!(host.layer_ids(), vec![DISTRICT_LAYER_ID.to_string()]);

    districts.set_checked(false, &mut host).unwrap();
    assert!(!host.has_layer(DISTRICT_LAYER_ID));

    // Unchecking twice is also a no-op
    districts.set_checked(false, &mut host).unwrap();
    assert!(!host.has_layer(DISTRICT_LAYER_ID));
}

#[test]
fn toggle_sequences_preserve_the_invariant() {
    let mut host = test_host();
    let mut shelters = shelter_controller(&mut host);

    for checked in [true, true, false, true, false, false, true] {
        shelters.set_checked(checked, &mut host).unwrap();
        assert_eq!(host.has_layer(SHELTER_LAYER_ID), checked);
        assert_eq!(shelters.is_visible(), checked);
    }
}

#[test]
fn district_click_with_one_hit_opens_popup() {
    let mut host = test_host();
    let mut districts = district_controller(&mut host);
    districts.set_checked(true, &mut host).unwrap();

    // (58.5, 10.5) is inside Oslo og Akershus only
    districts.on_map_click(LatLng::new(58.5, 10.5), &mut host);

    assert!(host.popups().is_visible(DISTRICT_LAYER_ID));
    assert_eq!(
        host.popups().get(DISTRICT_LAYER_ID).unwrap().content,
        "Oslo og Akershus sivilforsvarsdistrikt"
    );
    assert!(districts.selected_id().is_some());
}

#[test]
fn ambiguous_district_click_clears_selection() {
    let mut host = test_host();
    let mut districts = district_controller(&mut host);
    districts.set_checked(true, &mut host).unwrap();

    // Open a popup first so the ambiguous click has something to clear
    districts.on_map_click(LatLng::new(58.5, 10.5), &mut host);
    assert!(host.popups().is_visible(DISTRICT_LAYER_ID));

    // (59.7, 9.2) is covered by both districts
    districts.on_map_click(LatLng::new(59.7, 9.2), &mut host);

    assert!(!host.popups().is_visible(DISTRICT_LAYER_ID));
    assert!(districts.selected_id().is_none());
}

#[test]
fn clicking_empty_space_clears_popup() {
    let mut host = test_host();
    let mut districts = district_controller(&mut host);
    districts.set_checked(true, &mut host).unwrap();

    districts.on_map_click(LatLng::new(58.5, 10.5), &mut host);
    assert!(host.popups().is_visible(DISTRICT_LAYER_ID));

    // Far out in the Skagerrak, no district coverage
    districts.on_map_click(LatLng::new(57.0, 8.0), &mut host);
    assert!(!host.popups().is_visible(DISTRICT_LAYER_ID));
}

#[test]
fn clicks_are_ignored_while_hidden() {
    let mut host = test_host();
    let mut districts = district_controller(&mut host);

    districts.on_map_click(LatLng::new(58.5, 10.5), &mut host);
    assert!(!host.popups().is_visible(DISTRICT_LAYER_ID));
    assert!(districts.selected_id().is_none());
}

#[test]
fn uncheck_with_open_popup_closes_it_and_recheck_starts_clean() {
    let mut host = test_host();
    let mut districts = district_controller(&mut host);
    districts.set_checked(true, &mut host).unwrap();

    districts.on_map_click(LatLng::new(58.5, 10.5), &mut host);
    assert!(host.popups().is_visible(DISTRICT_LAYER_ID));

    districts.set_checked(false, &mut host).unwrap();
    assert!(!host.has_layer(DISTRICT_LAYER_ID));
    assert!(!host.popups().is_visible(DISTRICT_LAYER_ID));

    // Re-checking shows the layer with no popup until a new click occurs
    districts.set_checked(true, &mut host).unwrap();
    assert!(host.has_layer(DISTRICT_LAYER_ID));
    assert!(!host.popups().is_visible(DISTRICT_LAYER_ID));

    let feature_count = host
        .layer(DISTRICT_LAYER_ID)
        .and_then(|l| l.as_any().downcast_ref::<DistrictLayer>())
        .map(|l| l.feature_count())
        .unwrap();
    assert_eq!(feature_count, 2);
}

#[test]
fn shelter_click_toggle_scenario() {
    let mut host = test_host();
    let mut shelters = shelter_controller(&mut host);
    shelters.set_checked(true, &mut host).unwrap();

    let main_st = LatLng::new(59.0, 10.0);

    // First click selects: popup text and highlighted style
    shelters.on_map_click(main_st, &mut host);
    assert!(host.popups().is_visible(SHELTER_LAYER_ID));
    assert_eq!(
        host.popups().get(SHELTER_LAYER_ID).unwrap().content,
        "Main St: 500 plasser: Romnummer: 3"
    );
    with_shelter_layer(&host, |layer| {
        let feature = &layer.features()[0];
        assert!(feature.selected);
        assert_eq!(layer.selected_id(), Some(feature.id.as_str()));
    });

    // Second click on the same shelter deselects: popup closes, default
    // style returns (radius 10 + 500/100 = 15, low-capacity fill)
    shelters.on_map_click(main_st, &mut host);
    assert!(!host.popups().is_visible(SHELTER_LAYER_ID));
    with_shelter_layer(&host, |layer| {
        let feature = &layer.features()[0];
        assert!(!feature.selected);
        assert_eq!(feature.radius(), 15.0);
        assert_eq!(
            feature.fill_color(),
            egui::Color32::from_rgb(0xEF, 0x82, 0x0D)
        );
    });
}

#[test]
fn selecting_b_deselects_a() {
    let mut host = test_host();
    let mut shelters = shelter_controller(&mut host);
    shelters.set_checked(true, &mut host).unwrap();

    let ids = shelter_feature_ids(&host);
    assert_eq!(ids.len(), 2);

    shelters.on_map_click(LatLng::new(59.0, 10.0), &mut host);
    with_shelter_layer(&host, |layer| {
        assert_eq!(layer.selected_id(), Some(ids[0].as_str()));
    });

    shelters.on_map_click(LatLng::new(59.2, 10.4), &mut host);
    with_shelter_layer(&host, |layer| {
        assert_eq!(layer.selected_id(), Some(ids[1].as_str()));
        assert_eq!(layer.features().iter().filter(|f| f.selected).count(), 1);
    });
    assert_eq!(
        host.popups().get(SHELTER_LAYER_ID).unwrap().content,
        "Second St: 1500 plasser: Romnummer: 7"
    );
}

#[test]
fn shelter_empty_click_clears_selection_and_popup() {
    let mut host = test_host();
    let mut shelters = shelter_controller(&mut host);
    shelters.set_checked(true, &mut host).unwrap();

    shelters.on_map_click(LatLng::new(59.0, 10.0), &mut host);
    assert!(host.popups().is_visible(SHELTER_LAYER_ID));

    shelters.on_map_click(LatLng::new(58.0, 9.0), &mut host);
    assert!(!host.popups().is_visible(SHELTER_LAYER_ID));
    with_shelter_layer(&host, |layer| {
        assert!(layer.selected_id().is_none());
    });
}

#[test]
fn uncheck_resets_highlighted_style_before_reshow() {
    let mut host = test_host();
    let mut shelters = shelter_controller(&mut host);
    shelters.set_checked(true, &mut host).unwrap();

    shelters.on_map_click(LatLng::new(59.0, 10.0), &mut host);
    with_shelter_layer(&host, |layer| assert!(layer.selected_id().is_some()));

    shelters.set_checked(false, &mut host).unwrap();
    assert!(!host.has_layer(SHELTER_LAYER_ID));
    assert!(!host.popups().is_visible(SHELTER_LAYER_ID));

    // No stale highlight when the layer comes back
    shelters.set_checked(true, &mut host).unwrap();
    with_shelter_layer(&host, |layer| {
        assert!(layer.selected_id().is_none());
        assert!(layer.features().iter().all(|f| !f.selected));
    });
}

#[test]
fn failed_fetch_leaves_an_empty_but_usable_layer() {
    let mut host = test_host();
    // A source that never delivers: nothing arrives, nothing panics
    let source = FeatureSource::new("http://127.0.0.1:9/unreachable.geojson");
    let mut shelters = ShelterController::with_source(source);
    shelters.poll_source(&mut host);

    shelters.set_checked(true, &mut host).unwrap();
    assert!(host.has_layer(SHELTER_LAYER_ID));
    with_shelter_layer(&host, |layer| assert_eq!(layer.feature_count(), 0));

    // Clicking an empty layer is just a cleared selection
    shelters.on_map_click(LatLng::new(59.0, 10.0), &mut host);
    assert!(!host.popups().is_visible(SHELTER_LAYER_ID));
}

#[test]
fn dataset_arriving_while_visible_populates_the_live_layer() {
    let mut host = test_host();
    let source = FeatureSource::preloaded("memory://shelters", shelter_doc());
    let mut shelters = ShelterController::with_source(source);

    // Show first, poll after: the document lands in the hosted layer
    shelters.set_checked(true, &mut host).unwrap();
    with_shelter_layer(&host, |layer| assert_eq!(layer.feature_count(), 0));

    shelters.poll_source(&mut host);
    with_shelter_layer(&host, |layer| assert_eq!(layer.feature_count(), 2));
}
