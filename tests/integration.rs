//! Integration tests for map-sync.
//!
//! These tests exercise the public API from outside the crate: a map element
//! with markers, driven through the Pilot against the recording fake library.

use std::rc::Rc;

use map_sync::capability::MapsLoader;
use map_sync::config::{MapConfig, MarkerConfig};
use map_sync::element::{MapElement, MarkerElement, MarkerId};
use map_sync::event::{MapEvent, MarkerEvent};
use map_sync::geometry::LatLng;
use map_sync::sync::{MapPhase, MarkerPhase, PopupPhase};
use map_sync::testing::{Call, FakeMaps, Pilot};
use pretty_assertions::assert_eq;
use serde_json::json;

fn bound_pilot() -> Pilot {
    let config = MapConfig::new().with_center(52.0, 5.0).with_zoom(8.0);
    let mut pilot = Pilot::with_config(config).unwrap();
    pilot.attach_and_load();
    pilot
}

fn bound_marker(pilot: &mut Pilot, config: MarkerConfig) -> MarkerId {
    let id = pilot.add_marker(MarkerElement::new(config).unwrap());
    pilot.process();
    pilot.take_events();
    id
}

fn set_options_calls(pilot: &Pilot) -> usize {
    pilot
        .fake()
        .count(|c| matches!(c, Call::SetOptions { .. }))
}

// ---------------------------------------------------------------------------
// Idle gating
// ---------------------------------------------------------------------------

#[test]
fn test_writes_during_drag_release_one_union_on_idle() {
    let mut pilot = bound_pilot();
    pilot.drag_start();

    pilot.map_mut().set_zoom(10.0).unwrap();
    pilot.process();
    pilot.map_mut().set(map_sync::state::MapValue::Tilt(45.0)).unwrap();
    pilot.process();
    pilot.map_mut().set_zoom(11.0).unwrap();
    pilot.process();
    assert_eq!(set_options_calls(&pilot), 0);

    pilot.idle();
    assert_eq!(set_options_calls(&pilot), 1);
    let patch = pilot.fake().last_set_options().unwrap();
    assert_eq!(patch.to_json(), json!({ "zoom": 11.0, "tilt": 45.0 }));
}

#[test]
fn test_full_scenario_construct_drag_idle() {
    let mut pilot = bound_pilot();

    assert_eq!(pilot.fake().maps_created(), 1);
    let created = pilot.fake().created_map_options().unwrap();
    assert_eq!(created.to_json()["center"], json!({ "lat": 52.0, "lng": 5.0 }));
    assert_eq!(created.zoom(), Some(8.0));

    pilot.drag_start();
    assert!(!pilot.map().is_idle());
    pilot.map_mut().set_zoom(10.0).unwrap();
    pilot.process();
    assert_eq!(set_options_calls(&pilot), 0);

    pilot.idle();
    assert!(pilot.map().is_idle());
    assert_eq!(set_options_calls(&pilot), 1);
    assert_eq!(
        pilot.fake().last_set_options().unwrap().to_json(),
        json!({ "zoom": 10.0 })
    );
}

// ---------------------------------------------------------------------------
// Diffing and convergence
// ---------------------------------------------------------------------------

#[test]
fn test_lat_lng_in_one_batch_send_one_center() {
    let mut pilot = bound_pilot();
    pilot.map_mut().set_center(40.4, -3.7).unwrap();
    pilot.process();

    assert_eq!(set_options_calls(&pilot), 1);
    let patch = pilot.fake().last_set_options().unwrap();
    assert_eq!(patch.keys(), vec!["center"]);
}

#[test]
fn test_zoom_round_trip_converges() {
    let mut pilot = bound_pilot();
    pilot.map_mut().set_zoom(14.0).unwrap();
    pilot.process();
    assert_eq!(set_options_calls(&pilot), 1);

    pilot.zoom_to(14.0);
    pilot.process();
    assert_eq!(set_options_calls(&pilot), 1);

    let names = pilot.event_names();
    assert_eq!(names, vec!["zoom-changed"]);
}

#[test]
fn test_user_zoom_is_absorbed_without_echo() {
    let mut pilot = bound_pilot();
    pilot.zoom_to(5.0);
    pilot.process();

    assert_eq!(pilot.map().state().zoom, 5.0);
    assert_eq!(set_options_calls(&pilot), 0);
    let events = pilot.take_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, "zoom-changed");
    assert_eq!(events[0].value(), &json!(5.0));
}

#[test]
fn test_pan_then_declarative_center_wins() {
    let mut pilot = bound_pilot();
    pilot.drag_start();
    pilot.pan_to(LatLng::new(10.0, 10.0).unwrap());
    pilot.map_mut().set_center(20.0, 20.0).unwrap();
    pilot.process();
    assert_eq!(set_options_calls(&pilot), 0);

    pilot.idle();
    let patch = pilot.fake().last_set_options().unwrap();
    assert_eq!(patch.center(), LatLng::new(20.0, 20.0).ok());
    assert_eq!(pilot.map().live_center(), LatLng::new(20.0, 20.0).ok());
}

#[test]
fn test_bounds_changed_reports_live_viewport() {
    let mut pilot = bound_pilot();
    pilot.fire(MapEvent::BoundsChanged);
    let events = pilot.take_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, "bounds-changed");
    assert_eq!(events[0].value()["north"], json!(52.5));
}

// ---------------------------------------------------------------------------
// Markers
// ---------------------------------------------------------------------------

#[test]
fn test_info_popup_created_and_destroyed_once() {
    let mut pilot = bound_pilot();
    let id = bound_marker(&mut pilot, MarkerConfig::new());
    let baseline = pilot.fake().listener_count();

    let marker = pilot.map_mut().marker_mut(id).unwrap();
    marker.set_info(Some(String::new()));
    pilot.process();
    assert_eq!(pilot.fake().info_windows_created(), 0);

    pilot.map_mut().marker_mut(id).unwrap().set_info(Some("Hello".into()));
    pilot.process();
    assert_eq!(pilot.fake().info_windows_created(), 1);
    assert_eq!(pilot.fake().listener_count(), baseline + 2);

    pilot.map_mut().marker_mut(id).unwrap().set_info(Some(String::new()));
    pilot.process();
    assert_eq!(pilot.fake().info_windows_created(), 1);
    assert_eq!(pilot.fake().info_windows_dropped(), 1);
    assert_eq!(pilot.fake().listener_count(), baseline);
    assert!(!pilot.fake().has_listener("click"));
    assert!(!pilot.fake().has_listener("closeclick"));
}

#[test]
fn test_marker_detach_reattach_never_reconstructs() {
    let mut pilot = bound_pilot();
    let id = bound_marker(&mut pilot, MarkerConfig::new().with_title("Dam"));
    pilot.fake().clear_calls();

    let marker = pilot.map_mut().marker_mut(id).unwrap();
    marker.disconnected();
    marker.connected();

    assert_eq!(
        pilot.fake().calls().iter().filter(|c| matches!(c, Call::SetMap { .. })).count(),
        2
    );
    assert_eq!(pilot.fake().count(|c| matches!(c, Call::SetMap { map: None, .. })), 1);
    assert_eq!(pilot.fake().count(|c| matches!(c, Call::SetMap { map: Some(_), .. })), 1);
    assert_eq!(pilot.fake().markers_created(), 0);

    let marker = pilot.map().marker(id).unwrap();
    assert_eq!(marker.state().title, "Dam");
    assert_eq!(marker.phase(), MarkerPhase::Bound);
}

#[test]
fn test_click_opens_and_closeclick_closes_popup() {
    let mut pilot = bound_pilot();
    let id = bound_marker(&mut pilot, MarkerConfig::new().with_info("<b>Hi</b>"));
    assert_eq!(pilot.map().marker(id).unwrap().popup_phase(), PopupPhase::Ready);

    pilot.fire_marker(id, MarkerEvent::Click);
    pilot.process();
    assert_eq!(pilot.map().marker(id).unwrap().popup_phase(), PopupPhase::Open);
    assert_eq!(pilot.fake().count(|c| matches!(c, Call::OpenInfoWindow { .. })), 1);
    assert_eq!(pilot.event_names(), vec!["open-changed"]);

    pilot.close_popup(id);
    pilot.process();
    let marker = pilot.map().marker(id).unwrap();
    assert_eq!(marker.popup_phase(), PopupPhase::Ready);
    assert!(!marker.state().open);
}

#[test]
fn test_marker_drag_absorbs_position() {
    let mut pilot = bound_pilot();
    let id = bound_marker(&mut pilot, MarkerConfig::new().with_draggable(true));

    assert!(pilot.drag_marker(id, LatLng::new(51.5, -0.1).unwrap()));
    pilot.process();

    let marker = pilot.map().marker(id).unwrap();
    assert_eq!(marker.state().latitude(), 51.5);
    assert_eq!(marker.state().longitude(), -0.1);
    assert_eq!(pilot.fake().count(|c| matches!(c, Call::SetPosition { .. })), 0);
    assert_eq!(
        pilot.event_names(),
        vec!["latitude-changed", "longitude-changed"]
    );
}

#[test]
fn test_hidden_marker_sets_visibility() {
    let mut pilot = bound_pilot();
    let id = bound_marker(&mut pilot, MarkerConfig::new());
    pilot.map_mut().marker_mut(id).unwrap().set_hidden(true);
    pilot.process();
    assert_eq!(
        pilot.fake().count(|c| matches!(c, Call::SetVisible { visible: false, .. })),
        1
    );
}

// ---------------------------------------------------------------------------
// Map lifecycle
// ---------------------------------------------------------------------------

#[test]
fn test_map_detach_reattach_keeps_handle() {
    let mut pilot = bound_pilot();
    let id = bound_marker(&mut pilot, MarkerConfig::new());

    pilot.detach();
    assert_eq!(pilot.fake().listener_count(), 0);
    pilot.pan_to(LatLng::new(1.0, 1.0).unwrap());
    assert!(pilot.take_events().is_empty());

    pilot.attach();
    assert_eq!(pilot.map().phase(), MapPhase::Bound);
    assert_eq!(pilot.fake().maps_created(), 1);
    assert_eq!(pilot.fake().markers_created(), 1);
    assert!(pilot.map().marker(id).unwrap().placed_on().is_some());
    assert_eq!(
        pilot.fake().listener_count(),
        MapEvent::ALL.len() + MarkerEvent::CORE.len()
    );
}

#[test]
fn test_info_on_detached_map_binds_no_listeners() {
    let mut pilot = bound_pilot();
    let id = bound_marker(&mut pilot, MarkerConfig::new());

    pilot.detach();
    pilot
        .map_mut()
        .marker_mut(id)
        .unwrap()
        .set_info(Some("Hello".into()));
    pilot.process();
    assert_eq!(pilot.fake().listener_count(), 0);

    pilot.fire_marker(id, MarkerEvent::Click);
    pilot.process();
    let marker = pilot.map().marker(id).unwrap();
    assert!(!marker.state().open);
    assert_eq!(marker.popup_phase(), PopupPhase::Ready);

    pilot.attach();
    assert!(pilot.fake().has_listener("closeclick"));
    assert_eq!(
        pilot.fake().listener_count(),
        MapEvent::ALL.len() + MarkerEvent::CORE.len() + 2
    );
}

#[test]
fn test_invalid_coordinates_are_not_forwarded() {
    let mut pilot = bound_pilot();
    assert!(pilot.map_mut().set_center(91.0, 0.0).is_err());
    assert!(pilot.map_mut().set_zoom(f64::NAN).is_err());
    pilot.process();
    assert_eq!(set_options_calls(&pilot), 0);
    assert_eq!(pilot.map().state().latitude(), 52.0);
}

#[test]
fn test_config_from_json() {
    let config = MapConfig::from_json(r#"{ "latitude": 52.0, "longitude": 5.0, "zoom": 8 }"#).unwrap();
    let mut pilot = Pilot::with_config(config).unwrap();
    pilot.attach_and_load();
    let created = pilot.fake().created_map_options().unwrap();
    assert_eq!(created.center(), LatLng::new(52.0, 5.0).ok());
    assert_eq!(created.to_json()["mapTypeId"], json!("roadmap"));
}

// ---------------------------------------------------------------------------
// Script bootstrap
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_loader_binds_map_and_markers() {
    let loader = Rc::new(MapsLoader::new());
    let config = MapConfig::new().with_api_key("k3y");
    let mut map = MapElement::new(config).unwrap().with_loader(Rc::clone(&loader));
    assert_eq!(
        map.take_script_request().map(|u| u.to_string()),
        Some("https://maps.googleapis.com/maps/api/js?key=k3y".to_owned())
    );

    let id = map.insert_marker(MarkerElement::default());
    map.connected();
    assert_eq!(map.phase(), MapPhase::Unbound);

    let fake = FakeMaps::new();
    loader.resolve(Rc::new(fake.clone()));
    assert!(map.wait_for_capability().await.unwrap());

    assert_eq!(fake.maps_created(), 1);
    assert_eq!(fake.markers_created(), 1);
    assert_eq!(map.marker(id).unwrap().phase(), MarkerPhase::Bound);
}
