//! Shared fixtures for fl-link integration tests.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use fl_host::{CaseHandle, InMemoryHost, ObjectHandle};
use tracing::span;
use tracing::{Event, Level, Metadata, Subscriber};

/// Counts WARN events emitted while installed as the default subscriber.
///
/// The warning contracts under test promise an exact number of warnings, not
/// just "some log output", so the tests count events instead of scraping
/// formatted text.
#[derive(Clone, Default)]
pub struct WarnCounter {
    warnings: Arc<AtomicUsize>,
}

impl WarnCounter {
    pub fn count(&self) -> usize {
        self.warnings.load(Ordering::SeqCst)
    }
}

impl Subscriber for WarnCounter {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, _span: &span::Attributes<'_>) -> span::Id {
        span::Id::from_u64(1)
    }

    fn record(&self, _span: &span::Id, _values: &span::Record<'_>) {}

    fn record_follows_from(&self, _span: &span::Id, _follows: &span::Id) {}

    fn event(&self, event: &Event<'_>) {
        if *event.metadata().level() == Level::WARN {
            self.warnings.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn enter(&self, _span: &span::Id) {}

    fn exit(&self, _span: &span::Id) {}
}

/// Run `f` and report how many WARN events it emitted.
pub fn warnings_during<T>(f: impl FnOnce() -> T) -> (T, usize) {
    let counter = WarnCounter::default();
    let result = tracing::subscriber::with_default(counter.clone(), f);
    (result, counter.count())
}

/// Host with one saved case, three real components (one padding slot) and a
/// fully seeded feed stream.
pub fn plant_host() -> (InMemoryHost, CaseHandle, ObjectHandle) {
    let host = InMemoryHost::new("4-plant");
    let case = host.add_case("Plant 4 heat balance", Some(Path::new("plant4.fls")));
    host.set_component_groups(case, &[&["Methane", "Ethane", ""], &["CO2"]])
        .unwrap();
    let feed = host.add_material_stream(case, "Feed").unwrap();
    host.seed_scalar(feed, "Temperature", 310.0).unwrap();
    host.seed_scalar(feed, "Pressure", 5.0).unwrap();
    host.seed_scalar(feed, "MolarFlow", 120.0).unwrap();
    host.seed_scalar(feed, "MassFlow", 7800.0).unwrap();
    host.seed_scalar(feed, "HeatFlow", -1.2e6).unwrap();
    host.seed_scalar(feed, "VapourFraction", 1.0).unwrap();
    host.seed_scalar(feed, "MolecularWeight", 21.4).unwrap();
    host.seed_scalar(feed, "ZFactor", 0.93).unwrap();
    host.seed_vector(feed, "ComponentMolarFraction", &[0.7, 0.2, 0.1])
        .unwrap();
    host.seed_vector(feed, "ComponentMolarFlow", &[84.0, 24.0, 12.0])
        .unwrap();
    (host, case, feed)
}
