//! Typed facades and the generic accessor against the in-memory host.

mod common;

use common::plant_host;
use fl_host::{CellValue, Dimension, HostError, MemoryLocator, Property};
use fl_link::{AttachMode, LinkError, Session};

fn attached_session(host: fl_host::InMemoryHost) -> Session {
    let locator = MemoryLocator::new(host);
    let mut session = Session::default();
    session
        .attach(&locator, AttachMode::CurrentDocument)
        .expect("attach should succeed");
    session
}

#[test]
fn typed_getters_read_facade_units() {
    let (host, _, _) = plant_host();
    let session = attached_session(host);
    let feed = session.material_stream("Feed").unwrap();

    assert_eq!(feed.name(), "Feed");
    assert_eq!(feed.temperature().unwrap(), 310.0);
    assert_eq!(feed.pressure().unwrap(), 5.0);
    assert_eq!(feed.molar_flow().unwrap(), 120.0);
    assert_eq!(feed.mass_flow().unwrap(), 7800.0);
    assert_eq!(feed.heat_flow().unwrap(), -1.2e6);
    assert_eq!(feed.vapour_fraction().unwrap(), 1.0);
    assert_eq!(feed.molecular_weight().unwrap(), 21.4);
    assert_eq!(feed.z_factor().unwrap(), 0.93);
}

#[test]
fn typed_setters_write_facade_units() {
    let (host, _, feed_handle) = plant_host();
    let session = attached_session(host.clone());
    let feed = session.material_stream("Feed").unwrap();

    feed.set_temperature(350.0).unwrap();
    feed.set_pressure(2.5).unwrap();
    feed.set_molar_flow(90.0).unwrap();

    assert_eq!(host.scalar_raw(feed_handle, "Temperature").unwrap(), 350.0);
    assert_eq!(host.scalar_raw(feed_handle, "Pressure").unwrap(), 2.5);
    assert_eq!(host.scalar_raw(feed_handle, "MolarFlow").unwrap(), 90.0);
}

#[test]
fn accessor_converts_through_the_host() {
    let (host, _, _) = plant_host();
    let session = attached_session(host);
    let feed = session.material_stream("Feed").unwrap();

    let celsius = feed.accessor().get_in(Property::Temperature, "C").unwrap();
    assert!((celsius - 36.85).abs() < 1e-9);
    let kpa = feed.accessor().get_in(Property::Pressure, "kPa").unwrap();
    assert!((kpa - 500.0).abs() < 1e-9);

    feed.accessor().set_in(Property::Pressure, "kPa", 250.0).unwrap();
    assert_eq!(feed.pressure().unwrap(), 2.5);
}

#[test]
fn writes_to_calculated_properties_are_rejected_client_side() {
    let (host, _, feed_handle) = plant_host();
    let session = attached_session(host.clone());
    let feed = session.material_stream("Feed").unwrap();

    let err = feed.accessor().set(Property::ZFactor, 0.5).unwrap_err();
    assert!(matches!(err, LinkError::Host(HostError::ReadOnly { .. })));
    assert_eq!(host.scalar_raw(feed_handle, "ZFactor").unwrap(), 0.93);
}

#[test]
fn raw_access_reaches_properties_outside_the_typed_set() {
    let (host, _, feed_handle) = plant_host();
    host.seed_extra_scalar(feed_handle, "UserVariable1", Dimension::Dimensionless, 42.0, false)
        .unwrap();
    let session = attached_session(host.clone());
    let feed = session.material_stream("Feed").unwrap();

    assert_eq!(feed.accessor().get_raw("UserVariable1", None).unwrap(), 42.0);
    feed.accessor().set_raw("UserVariable1", None, 43.0).unwrap();
    assert_eq!(host.scalar_raw(feed_handle, "UserVariable1").unwrap(), 43.0);
}

#[test]
fn unknown_names_normalize_to_not_found() {
    let (host, _, _) = plant_host();
    let session = attached_session(host);

    let err = session.material_stream("Nope").unwrap_err();
    assert!(matches!(
        err,
        LinkError::NotFound {
            kind: "material stream",
            ..
        }
    ));

    let feed = session.material_stream("Feed").unwrap();
    let err = feed.accessor().get_raw("Frobnication", None).unwrap_err();
    assert!(matches!(err, LinkError::NotFound { kind: "property", .. }));
}

#[test]
fn non_finite_values_are_refused_in_both_directions() {
    let (host, _, feed_handle) = plant_host();
    host.seed_scalar(feed_handle, "ZFactor", f64::NAN).unwrap();
    let session = attached_session(host.clone());
    let feed = session.material_stream("Feed").unwrap();

    assert!(matches!(
        feed.z_factor().unwrap_err(),
        LinkError::Numeric(_)
    ));
    assert!(matches!(
        feed.set_temperature(f64::INFINITY).unwrap_err(),
        LinkError::Numeric(_)
    ));
    // The rejected write never reached the host.
    assert_eq!(host.scalar_raw(feed_handle, "Temperature").unwrap(), 310.0);
}

#[test]
fn energy_stream_exposes_heat_flow() {
    let (host, case, _) = plant_host();
    let duty = host.add_energy_stream(case, "Q-100").unwrap();
    host.seed_scalar(duty, "HeatFlow", -3.6e5).unwrap();
    let session = attached_session(host.clone());

    assert_eq!(
        session.energy_stream_names().unwrap(),
        vec!["Q-100".to_owned()]
    );
    let stream = session.energy_stream("Q-100").unwrap();
    assert_eq!(stream.heat_flow().unwrap(), -3.6e5);

    stream.set_heat_flow(-4.0e5).unwrap();
    assert_eq!(host.scalar_raw(duty, "HeatFlow").unwrap(), -4.0e5);

    // Energy streams have no temperature to read.
    let err = stream.accessor().get(Property::Temperature).unwrap_err();
    assert!(matches!(err, LinkError::NotFound { kind: "property", .. }));
}

#[test]
fn spreadsheet_cells_and_formulas() {
    let (host, case, _) = plant_host();
    host.add_spreadsheet(case, "SHEET-1").unwrap();
    let session = attached_session(host);

    assert_eq!(
        session.operation_names().unwrap(),
        vec!["SHEET-1".to_owned()]
    );
    let sheet = session.spreadsheet("SHEET-1").unwrap();

    assert_eq!(sheet.cell("A1").unwrap(), CellValue::Empty);
    sheet.set_number("A1", 42.0).unwrap();
    assert_eq!(sheet.cell("A1").unwrap(), CellValue::Number(42.0));

    sheet.set_text("A2", "feed basis").unwrap();
    assert_eq!(
        sheet.cell("A2").unwrap(),
        CellValue::Text("feed basis".to_owned())
    );

    assert_eq!(sheet.formula("B1").unwrap(), None);
    sheet.set_formula("B1", "=A1*2").unwrap();
    assert_eq!(sheet.formula("B1").unwrap(), Some("=A1*2".to_owned()));

    let err = session.spreadsheet("MISSING").unwrap_err();
    assert!(matches!(err, LinkError::NotFound { kind: "operation", .. }));
}

#[test]
fn stream_factory_searches_both_collections() {
    let (host, case, _) = plant_host();
    let duty = host.add_energy_stream(case, "Q-100").unwrap();
    host.seed_scalar(duty, "HeatFlow", -3.6e5).unwrap();
    let session = attached_session(host);

    let feed = session.stream("Feed").unwrap();
    assert_eq!(feed.get(Property::Temperature).unwrap(), 310.0);

    // Energy streams are found on the second pass.
    let duty = session.stream("Q-100").unwrap();
    assert_eq!(duty.get(Property::HeatFlow).unwrap(), -3.6e5);

    let err = session.stream("Nope").unwrap_err();
    assert!(matches!(err, LinkError::NotFound { kind: "stream", .. }));
}

#[test]
fn operation_factory_gives_raw_property_access() {
    let (host, case, _) = plant_host();
    let sheet = host.add_spreadsheet(case, "SHEET-1").unwrap();
    host.seed_extra_scalar(sheet, "NumberOfIterations", Dimension::Dimensionless, 25.0, true)
        .unwrap();
    let session = attached_session(host);

    let op = session.operation("SHEET-1").unwrap();
    assert_eq!(op.get_raw("NumberOfIterations", None).unwrap(), 25.0);

    let err = session.operation("MISSING").unwrap_err();
    assert!(matches!(err, LinkError::NotFound { kind: "operation", .. }));
}

#[test]
fn listings_follow_host_order() {
    let (host, case, _) = plant_host();
    host.add_material_stream(case, "Recycle").unwrap();
    host.add_material_stream(case, "Product").unwrap();
    let session = attached_session(host);

    assert_eq!(
        session.material_stream_names().unwrap(),
        vec!["Feed".to_owned(), "Recycle".to_owned(), "Product".to_owned()]
    );
}

#[test]
fn stale_facade_use_is_impossible_but_unattached_lookup_errors() {
    let (host, _, _) = plant_host();
    let locator = MemoryLocator::new(host);
    let mut session = Session::default();
    session
        .attach(&locator, AttachMode::ActiveInstance)
        .unwrap();

    // No case selected yet: facade construction is refused up front.
    let err = session.material_stream("Feed").unwrap_err();
    assert!(matches!(err, LinkError::NoActiveCase));

    session.detach();
    assert!(matches!(
        session.material_stream("Feed").unwrap_err(),
        LinkError::NotAttached
    ));
}
