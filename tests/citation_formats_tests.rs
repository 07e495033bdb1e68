//! RIS and BibTeX citation exports.

mod common;

use ckan_crosswalk::Schema;
use common::{gem2_record, offline_crosswalk, package_record};

#[test]
fn test_gem2_ris() {
    let ris = offline_crosswalk()
        .convert(&gem2_record(), Schema::Ris)
        .expect("RIS needs no DOI");
    assert_eq!(
        ris,
        "TY  - DATA\n\
         T1  - GEM2 station data\n\
         AU  - Marcia Phillips\n\
         UR  - https://www.envidat.ch/dataset/gem2\n\
         PY  - 2016\n\
         PB  - EnviDat\n\
         LA  - en\n\
         ER  -  "
    );
}

#[test]
fn test_package_ris_lines() {
    let ris = offline_crosswalk()
        .convert(&package_record(), Schema::Ris)
        .expect("RIS conversion");
    let lines: Vec<&str> = ris.lines().collect();
    assert_eq!(lines.first(), Some(&"TY  - DATA"));
    assert_eq!(lines.last(), Some(&"ER  -  "));
    assert!(lines.contains(&"AU  - Marcia Phillips"));
    assert!(lines.contains(&"AU  - Bartelt"));
    assert!(lines.contains(&"DO  - 10.16904/envidat.42"));
    assert!(lines.contains(&"KW  - PERMAFROST"));
    assert!(lines.contains(&"KW  - SNOW"));
}

#[test]
fn test_gem2_bibtex() {
    let bibtex = offline_crosswalk()
        .convert(&gem2_record(), Schema::Bibtex)
        .expect("BibTeX needs no DOI");
    assert_eq!(
        bibtex,
        "@misc{gem2-2016,\n  \
         year = \"2016\",\n  \
         publisher = \"EnviDat\",\n  \
         title = \"GEM2 station data\",\n  \
         author = \"Marcia Phillips\",\n  \
         url = \"https://www.envidat.ch/dataset/gem2\"\n}"
    );
}

#[test]
fn test_package_bibtex_fields() {
    let bibtex = offline_crosswalk()
        .convert(&package_record(), Schema::Bibtex)
        .expect("BibTeX conversion");
    assert!(bibtex.starts_with("@misc{gem2-station-data-2016,"));
    assert!(bibtex.contains("author = \"Marcia Phillips and Bartelt\""));
    assert!(bibtex.contains("DOI = \"http://dx.doi.org/10.16904/envidat.42\""));
}

#[test]
fn test_bibtex_year_defaults_to_clock() {
    let mut record = gem2_record();
    record.set("publication", "");
    let bibtex = offline_crosswalk()
        .convert(&record, Schema::Bibtex)
        .expect("BibTeX conversion");
    assert!(bibtex.starts_with("@misc{gem2-2024,"));
    assert!(bibtex.contains("year = \"2024\""));
}

#[test]
fn test_conversion_is_repeatable() {
    let crosswalk = offline_crosswalk();
    let record = package_record();
    for schema in Schema::ALL {
        let first = crosswalk.convert(&record, schema).expect("first conversion");
        let second = crosswalk.convert(&record, schema).expect("second conversion");
        assert_eq!(first, second, "{schema} output differs between runs");
    }
}
