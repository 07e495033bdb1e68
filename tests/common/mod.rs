//! Common test helpers shared across the integration suites.

use ckan_crosswalk::{Crosswalk, FixedClock, SourceRecord, StaticCitationSource};
use serde_json::json;

/// Path of the full EnviDat package fixture.
pub const PACKAGE_FIXTURE: &str = "tests/data/envidat_package.json";

/// Builds a converter over the built-in configuration that never touches
/// the network and always reports 2024 as the current year.
pub fn offline_crosswalk() -> Crosswalk {
    Crosswalk::envidat()
        .expect("built-in configuration loads")
        .with_citation_source(StaticCitationSource::new())
        .with_clock(FixedClock::at_year(2024))
}

/// Loads the full EnviDat package fixture.
#[allow(dead_code)]
pub fn package_record() -> SourceRecord {
    let json = std::fs::read_to_string(PACKAGE_FIXTURE).expect("fixture is readable");
    SourceRecord::from_json(&json).expect("fixture parses")
}

/// The minimal `gem2` record: one author, a publication block, no DOI.
#[allow(dead_code)]
pub fn gem2_record() -> SourceRecord {
    SourceRecord::from_value(json!({
        "name": "gem2",
        "title": "GEM2 station data",
        "author": "[{\"name\":\"Phillips\",\"given_name\":\"Marcia\"}]",
        "doi": "",
        "publication": "{\"publisher\":\"EnviDat\",\"publication_year\":\"2016\"}"
    }))
    .expect("gem2 is an object")
}
