use anyhow::Result;
use chrono::Local;
use mapty_lib::{
    AppService, Bounds, Camera, Config, Controls, Coordinates, Field, Focus, GeolocationError,
    Marker, Metric, Notice, RawFields, Scene, SelectionChange, SortOrder, SqliteStorage,
    Storage, StoreError, ValidationError, View, Workout, WorkoutId, WorkoutKind, WORKOUTS_KEY,
};
use rusqlite::Connection;

const BERLIN: Coordinates = Coordinates::new(52.52, 13.405);
const POTSDAM: Coordinates = Coordinates::new(52.39, 13.06);
const SPANDAU: Coordinates = Coordinates::new(52.53, 13.2);

// Helper function to create a test service with an in-memory database
fn create_test_service() -> Result<AppService> {
    create_service_with(Config::default(), Connection::open_in_memory()?, Scene::new())
}

fn create_service_with<V: View>(config: Config, conn: Connection, view: V) -> Result<AppService<V>> {
    let storage = SqliteStorage::new(conn)?;
    Ok(AppService::new(
        config,
        storage,
        view,
        ":memory:".into(),
        "test_config.toml".into(),
    ))
}

// Service started over whatever `saved` holds under the workouts key
fn service_with_saved(saved: &str) -> Result<AppService> {
    let mut storage = SqliteStorage::new(Connection::open_in_memory()?)?;
    storage.set_item(WORKOUTS_KEY, saved)?;
    Ok(AppService::new(
        Config::default(),
        storage,
        Scene::new(),
        ":memory:".into(),
        "test_config.toml".into(),
    ))
}

// Service whose map is already initialized at BERLIN
fn located_service() -> Result<AppService> {
    let mut service = create_test_service()?;
    service.locate(Ok(BERLIN))?;
    Ok(service)
}

fn running(distance: &str, duration: &str, cadence: &str) -> RawFields {
    RawFields {
        kind: WorkoutKind::Running,
        distance: distance.to_string(),
        duration: duration.to_string(),
        cadence: cadence.to_string(),
        ..Default::default()
    }
}

fn cycling(distance: &str, duration: &str, elevation: &str) -> RawFields {
    RawFields {
        kind: WorkoutKind::Cycling,
        distance: distance.to_string(),
        duration: duration.to_string(),
        elevation: elevation.to_string(),
        ..Default::default()
    }
}

fn add<V: View>(
    service: &mut AppService<V>,
    at: Coordinates,
    fields: &RawFields,
) -> Result<Workout, StoreError> {
    assert!(service.map_click(at), "map should accept clicks");
    service.submit_form(fields)
}

fn saved_json<V: View>(service: &AppService<V>) -> Result<String> {
    Ok(service
        .store
        .storage()
        .get_item(WORKOUTS_KEY)?
        .unwrap_or_default())
}

#[test]
fn test_running_workout_derives_pace_and_label() -> Result<()> {
    let mut service = located_service()?;
    let workout = add(&mut service, BERLIN, &running("5", "25", "178"))?;

    assert_eq!(workout.metric(), Metric::Pace(5.0));
    assert_eq!(workout.kind(), WorkoutKind::Running);
    let expected = format!(
        "Running on {}",
        workout.created_at().with_timezone(&Local).format("%B %-d")
    );
    assert_eq!(workout.label(), expected);

    // Marker, list row and form all follow the new workout
    let marker = service.view.markers.get(&workout.id()).unwrap();
    assert_eq!(marker.coords, BERLIN);
    assert!(marker.popup.ends_with(&expected));
    assert_eq!(service.view.list.len(), 1);
    assert!(service.view.form.is_none());
    assert!(!service.form.is_open());
    Ok(())
}

#[test]
fn test_cycling_workout_derives_speed() -> Result<()> {
    let mut service = located_service()?;
    let workout = add(&mut service, BERLIN, &cycling("20", "60", "120"))?;
    assert_eq!(workout.metric(), Metric::Speed(20.0));

    let workout = add(&mut service, POTSDAM, &cycling("30", "75", "300"))?;
    assert_eq!(workout.metric(), Metric::Speed(30.0 / (75.0 / 60.0)));
    Ok(())
}

#[test]
fn test_invalid_input_is_rejected_without_mutation() -> Result<()> {
    let mut service = located_service()?;
    let cases = [
        (running("", "25", "178"), ValidationError::NotANumber(Field::Distance)),
        (running("five", "25", "178"), ValidationError::NotANumber(Field::Distance)),
        (running("0", "25", "178"), ValidationError::NotPositive(Field::Distance)),
        (running("5", "-25", "178"), ValidationError::NotPositive(Field::Duration)),
        (running("5", "inf", "178"), ValidationError::NotFinite(Field::Duration)),
        (running("5", "25", "NaN"), ValidationError::NotFinite(Field::Cadence)),
        (running("5", "25", "0"), ValidationError::NotPositive(Field::Cadence)),
        (cycling("5", "25", "-3"), ValidationError::NotPositive(Field::Elevation)),
    ];

    assert!(service.map_click(BERLIN));
    for (fields, expected) in cases {
        let err = service.submit_form(&fields).unwrap_err();
        match err {
            StoreError::Validation(actual) => assert_eq!(actual, expected),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(service.view.take_notice(), Some(Notice::Invalid(expected)));
    }

    assert!(service.store.is_empty());
    assert!(service.view.markers.is_empty());
    assert!(service.view.list.is_empty());
    assert_eq!(service.form.pending_location(), Some(BERLIN));
    assert!(service.view.form.is_some(), "form stays open for correction");
    assert_eq!(saved_json(&service)?, "");
    Ok(())
}

#[test]
fn test_submit_without_open_form_is_rejected() -> Result<()> {
    let mut service = located_service()?;
    let err = service.submit_form(&running("5", "25", "178")).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::NoLocation)
    ));
    assert!(service.store.is_empty());
    Ok(())
}

#[test]
fn test_close_form_keeps_store_untouched() -> Result<()> {
    let mut service = located_service()?;
    assert!(service.map_click(POTSDAM));
    assert_eq!(service.toggle_kind(WorkoutKind::Cycling), Field::Elevation);
    assert_eq!(service.view.form.map(|f| f.field), Some(Field::Elevation));

    assert!(service.close_form());
    assert!(!service.close_form());
    assert!(service.view.form.is_none());
    assert!(service.store.is_empty());
    Ok(())
}

#[test]
fn test_without_location_fix_map_stays_uninitialized() -> Result<()> {
    let mut service = create_test_service()?;
    let err = service.locate(Err(GeolocationError::Unavailable)).unwrap_err();
    assert_eq!(err, GeolocationError::Unavailable);
    assert!(matches!(
        service.view.take_notice(),
        Some(Notice::GeolocationUnavailable(_))
    ));

    assert!(!service.is_map_ready());
    assert!(!service.map_click(BERLIN));
    assert!(service.view.form.is_none());
    assert!(service.view.camera.is_none());
    assert!(!service.controls().recenter);
    Ok(())
}

#[test]
fn test_persist_and_reload_round_trip() -> Result<()> {
    let mut service = located_service()?;
    let created = vec![
        add(&mut service, BERLIN, &running("5", "25", "178"))?,
        add(&mut service, POTSDAM, &cycling("20", "60", "120"))?,
        add(&mut service, SPANDAU, &running("10.5", "58", "165"))?,
    ];
    let json = saved_json(&service)?;

    // Same JSON in a fresh database, as if the app had restarted
    let conn = Connection::open_in_memory()?;
    let mut storage = SqliteStorage::new(conn)?;
    storage.set_item(WORKOUTS_KEY, &json)?;
    let mut reloaded = AppService::new(
        Config::default(),
        storage,
        Scene::new(),
        ":memory:".into(),
        "test_config.toml".into(),
    );

    assert_eq!(reloaded.store.workouts(), created.as_slice());
    assert_eq!(reloaded.view.list.len(), 3);
    // Markers wait for the map
    assert!(reloaded.view.markers.is_empty());
    reloaded.locate(Ok(BERLIN))?;
    assert_eq!(reloaded.view.markers.len(), 3);

    // New ids keep increasing past the loaded ones
    let newest = add(&mut reloaded, BERLIN, &running("1", "6", "170"))?;
    assert!(created.iter().all(|w| w.id() < newest.id()));
    Ok(())
}

#[test]
fn test_loads_browser_local_storage_format() -> Result<()> {
    let legacy = r#"[
        {"date":"2024-03-05T07:30:00.000Z","id":"9640000000","clicks":0,
         "coords":[52.52,13.405],"distance":5,"duration":25,"type":"running",
         "cadence":178,"pace":5,"description":"Running on March 5"},
        {"date":"2024-03-06T16:00:00.000Z","id":"9726400000","clicks":0,
         "coords":[52.39,13.06],"distance":20,"duration":60,"type":"cycling",
         "elevationGain":120,"speed":20,"description":"Cycling on March 6"}
    ]"#;
    let mut storage = SqliteStorage::new(Connection::open_in_memory()?)?;
    storage.set_item(WORKOUTS_KEY, legacy)?;
    let service = AppService::new(
        Config::default(),
        storage,
        Scene::new(),
        ":memory:".into(),
        "test_config.toml".into(),
    );

    let workouts = service.store.workouts();
    assert_eq!(workouts.len(), 2);
    assert_eq!(workouts[0].id(), WorkoutId::new(9_640_000_000));
    assert_eq!(workouts[0].metric(), Metric::Pace(5.0));
    assert_eq!(workouts[1].kind(), WorkoutKind::Cycling);
    assert_eq!(workouts[1].metric(), Metric::Speed(20.0));
    assert_eq!(workouts[1].coords(), POTSDAM);
    Ok(())
}

#[test]
fn test_unreadable_saved_data_starts_empty_and_tells_the_user() -> Result<()> {
    let mut service = service_with_saved("{not json")?;
    assert!(service.store.is_empty());
    assert!(service.view.list.is_empty());
    assert!(matches!(service.view.take_notice(), Some(Notice::Failure(_))));
    // Raw value stays until the next write replaces it
    assert_eq!(saved_json(&service)?, "{not json");

    service.locate(Ok(BERLIN))?;
    add(&mut service, BERLIN, &running("5", "25", "178"))?;
    assert!(saved_json(&service)?.starts_with('['));

    // Clearing works from the recovered state too
    let mut service = service_with_saved("{not json")?;
    assert_eq!(service.delete_all()?, 0);
    assert_eq!(saved_json(&service)?, "[]");
    Ok(())
}

#[test]
fn test_unreadable_record_is_skipped_and_reported() -> Result<()> {
    let saved = r#"[
        {"date":"2024-03-05T07:30:00.000Z","id":"9640000000","coords":[52.52,13.405],
         "distance":5,"duration":25,"type":"running","cadence":null},
        {"date":"2024-03-06T16:00:00.000Z","id":"9726400000","coords":[52.39,13.06],
         "distance":20,"duration":60,"type":"cycling","elevationGain":120}
    ]"#;
    let mut service = service_with_saved(saved)?;

    assert_eq!(service.store.len(), 1);
    assert_eq!(service.store.workouts()[0].id(), WorkoutId::new(9_726_400_000));
    match service.view.take_notice() {
        Some(Notice::Failure(message)) => assert!(message.starts_with('1'), "{message}"),
        other => panic!("expected failure notice, got {other:?}"),
    }
    assert_eq!(saved_json(&service)?, saved);
    Ok(())
}

#[test]
fn test_clean_load_queues_no_notice() -> Result<()> {
    let mut service = create_test_service()?;
    assert_eq!(service.view.take_notice(), None);
    Ok(())
}

#[test]
fn test_selecting_switches_single_focus() -> Result<()> {
    let mut service = located_service()?;
    let a = add(&mut service, BERLIN, &running("5", "25", "178"))?;
    let b = add(&mut service, POTSDAM, &cycling("20", "60", "120"))?;

    let change = service.select_workout(a.id()).unwrap();
    assert!(matches!(change, SelectionChange::Selected { previous: None, .. }));
    assert_eq!(service.view.focus.map(|f| f.id), Some(a.id()));

    let change = service.select_workout(b.id()).unwrap();
    match change {
        SelectionChange::Selected { previous, current } => {
            assert_eq!(previous.map(|p| p.id), Some(a.id()));
            assert_eq!(current.id, b.id());
            assert_eq!(current.index, 1);
        }
        other => panic!("unexpected change {other:?}"),
    }
    assert_eq!(service.view.focus.map(|f| f.id), Some(b.id()));
    assert_eq!(service.view.active, Some(b.id()));
    assert_eq!(
        service.view.camera,
        Some(Camera::Center {
            center: POTSDAM,
            zoom: 13
        })
    );
    assert_eq!(service.active_workout().map(Workout::id), Some(b.id()));
    Ok(())
}

#[test]
fn test_selecting_same_workout_twice_toggles_off() -> Result<()> {
    let mut service = located_service()?;
    let a = add(&mut service, POTSDAM, &running("5", "25", "178"))?;

    service.select_workout(a.id());
    let change = service.select_workout(a.id()).unwrap();
    assert!(matches!(change, SelectionChange::Deselected { .. }));

    assert!(service.selection.active().is_none());
    assert!(service.view.focus.is_none());
    assert_eq!(service.view.active, None);
    // Back to the user's position
    assert_eq!(
        service.view.camera,
        Some(Camera::Center {
            center: BERLIN,
            zoom: 13
        })
    );
    assert!(!service.controls().delete_current);
    Ok(())
}

#[test]
fn test_selection_ignored_before_map_is_ready() -> Result<()> {
    let mut service = located_service()?;
    let a = add(&mut service, POTSDAM, &running("5", "25", "178"))?;
    let json = saved_json(&service)?;

    let mut storage = SqliteStorage::new(Connection::open_in_memory()?)?;
    storage.set_item(WORKOUTS_KEY, &json)?;
    let mut cold = AppService::new(
        Config::default(),
        storage,
        Scene::new(),
        ":memory:".into(),
        "test_config.toml".into(),
    );
    assert_eq!(cold.store.len(), 1);
    assert!(cold.select_workout(a.id()).is_none());
    assert!(service.select_workout(WorkoutId::new(1)).is_none());
    Ok(())
}

#[test]
fn test_delete_current_removes_marker_row_and_saved_entry() -> Result<()> {
    let mut service = located_service()?;
    let a = add(&mut service, BERLIN, &running("5", "25", "178"))?;
    let b = add(&mut service, POTSDAM, &cycling("20", "60", "120"))?;

    service.select_workout(b.id());
    assert!(service.controls().delete_current);
    let removed = service.delete_current()?.unwrap();
    assert_eq!(removed.id(), b.id());

    assert!(service.selection.active().is_none());
    assert!(service.view.focus.is_none());
    assert!(!service.view.markers.contains_key(&b.id()));
    assert!(service.view.markers.contains_key(&a.id()));
    assert_eq!(service.view.list.iter().map(Workout::id).collect::<Vec<_>>(), [a.id()]);
    assert!(!saved_json(&service)?.contains(&b.id().to_string()));
    assert!(!service.controls().delete_current);

    // Nothing selected any more
    assert!(service.delete_current()?.is_none());
    assert_eq!(service.store.len(), 1);
    Ok(())
}

#[test]
fn test_delete_before_active_keeps_selection_index_in_step() -> Result<()> {
    let mut service = located_service()?;
    let a = add(&mut service, BERLIN, &running("5", "25", "178"))?;
    let b = add(&mut service, POTSDAM, &cycling("20", "60", "120"))?;
    let c = add(&mut service, SPANDAU, &running("3", "20", "160"))?;

    service.select_workout(c.id());
    assert_eq!(service.selection.active().map(|s| s.index), Some(2));

    service.delete_workout(a.id())?;
    let active = service.selection.active().unwrap();
    assert_eq!(active.id, c.id());
    assert_eq!(Some(active.index), service.store.position(c.id()));
    assert_eq!(active.index, 1);
    assert_eq!(service.view.focus.map(|f| f.id), Some(c.id()));

    // Removing a later workout leaves the index alone
    service.select_workout(b.id());
    service.delete_workout(c.id())?;
    assert_eq!(service.selection.active().map(|s| (s.id, s.index)), Some((b.id(), 0)));
    Ok(())
}

#[test]
fn test_delete_all_empties_everything_and_disables_controls() -> Result<()> {
    let mut service = located_service()?;
    let a = add(&mut service, BERLIN, &running("5", "25", "178"))?;
    add(&mut service, POTSDAM, &cycling("20", "60", "120"))?;
    service.select_workout(a.id());

    assert_eq!(service.delete_all()?, 2);
    assert!(service.store.is_empty());
    assert!(service.view.markers.is_empty());
    assert!(service.view.list.is_empty());
    assert!(service.view.focus.is_none());
    assert_eq!(saved_json(&service)?, "[]");
    assert_eq!(
        service.view.controls,
        Controls {
            delete_current: false,
            delete_all: false,
            show_all: false,
            recenter: true,
        }
    );
    Ok(())
}

#[test]
fn test_sort_then_default_restores_insertion_order() -> Result<()> {
    let mut service = located_service()?;
    for distance in ["5", "20", "3"] {
        add(&mut service, BERLIN, &running(distance, "30", "170"))?;
    }
    let distances = |service: &AppService| {
        service
            .view
            .list
            .iter()
            .map(Workout::distance_km)
            .collect::<Vec<_>>()
    };

    service.set_sort(SortOrder::DistanceAsc);
    assert_eq!(distances(&service), [3.0, 5.0, 20.0]);
    service.set_sort(SortOrder::DistanceDesc);
    assert_eq!(distances(&service), [20.0, 5.0, 3.0]);
    service.set_sort(SortOrder::Default);
    assert_eq!(distances(&service), [5.0, 20.0, 3.0]);

    // Sorting is a view concern only
    let stored: Vec<f64> = service.store.workouts().iter().map(Workout::distance_km).collect();
    assert_eq!(stored, [5.0, 20.0, 3.0]);
    Ok(())
}

#[test]
fn test_show_all_fits_every_marker() -> Result<()> {
    let mut service = located_service()?;
    assert!(service.show_all().is_none());

    add(&mut service, BERLIN, &running("5", "25", "178"))?;
    add(&mut service, POTSDAM, &cycling("20", "60", "120"))?;
    add(&mut service, SPANDAU, &running("3", "20", "160"))?;

    let bounds = service.show_all().unwrap();
    assert_eq!(
        bounds,
        Bounds {
            south_west: Coordinates::new(52.39, 13.06),
            north_east: Coordinates::new(52.53, 13.405),
        }
    );
    assert_eq!(service.view.camera, Some(Camera::Fit(bounds)));

    assert_eq!(service.show_user_position(), Some(BERLIN));
    assert_eq!(
        service.view.camera,
        Some(Camera::Center {
            center: BERLIN,
            zoom: 13
        })
    );
    Ok(())
}

/// View that records the order of focus operations.
#[derive(Default)]
struct RecordingView {
    focus: Option<Focus>,
    focus_ops: Vec<&'static str>,
    markers: Vec<WorkoutId>,
}

impl View for RecordingView {
    fn render_list(&mut self, _workouts: &[Workout], _active: Option<WorkoutId>) {}
    fn add_marker(&mut self, marker: Marker) {
        assert!(!self.markers.contains(&marker.id), "duplicate marker");
        self.markers.push(marker.id);
    }
    fn remove_marker(&mut self, id: WorkoutId) {
        self.markers.retain(|m| *m != id);
    }
    fn clear_markers(&mut self) {
        self.markers.clear();
    }
    fn draw_focus(&mut self, focus: Focus) {
        assert!(self.focus.is_none(), "focus drawn without retracting the previous one");
        self.focus_ops.push("draw");
        self.focus = Some(focus);
    }
    fn clear_focus(&mut self) {
        self.focus_ops.push("clear");
        self.focus = None;
    }
    fn show_user(&mut self, _at: Coordinates) {}
    fn set_view(&mut self, _center: Coordinates, _zoom: u8) {}
    fn fit_bounds(&mut self, _bounds: Bounds) {}
    fn show_form(&mut self, _location: Coordinates) {}
    fn show_field(&mut self, _field: Field) {}
    fn hide_form(&mut self) {}
    fn update_controls(&mut self, _controls: Controls) {}
    fn notify(&mut self, _notice: Notice) {}
}

#[test]
fn test_focus_is_retracted_before_redraw() -> Result<()> {
    let config = Config {
        show_route: true,
        ..Default::default()
    };
    let mut service = create_service_with(config, Connection::open_in_memory()?, RecordingView::default())?;
    service.locate(Ok(BERLIN))?;
    let a = add(&mut service, POTSDAM, &running("5", "25", "178"))?;
    let b = add(&mut service, SPANDAU, &running("7", "40", "172"))?;

    service.select_workout(a.id());
    service.select_workout(b.id());
    service.select_workout(b.id());

    assert_eq!(
        service.view.focus_ops,
        ["clear", "draw", "clear", "draw", "clear"]
    );
    assert_eq!(service.view.markers, [a.id(), b.id()]);

    service.select_workout(a.id());
    let focus = service.view.focus.unwrap();
    assert_eq!(focus.radius_m, 120.0);
    assert_eq!(focus.route, Some((BERLIN, POTSDAM)));
    Ok(())
}
