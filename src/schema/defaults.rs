use once_cell::sync::Lazy;

use super::FileSpec;

/// The five OpenFlights reference files, in import order.
pub static DEFAULT_SPECS: Lazy<Vec<FileSpec>> = Lazy::new(|| {
    vec![
        FileSpec::new(
            "airports.dat",
            &[
                "id",
                "name",
                "city",
                "country",
                "iata",
                "icao",
                "latitude",
                "longitude",
                "altitude",
                "timezone",
                "dst",
                "tz_database_time_zone",
                "type",
                "source",
            ],
            "airports",
        ),
        FileSpec::new(
            "airlines.dat",
            &[
                "id", "name", "alias", "iata", "icao", "callsign", "country", "active",
            ],
            "airlines",
        ),
        FileSpec::new(
            "routes.dat",
            &[
                "airline",
                "airline_id",
                "source_airport",
                "source_airport_id",
                "destination_airport",
                "destination_airport_id",
                "codeshare",
                "stops",
                "equipment",
            ],
            "routes",
        ),
        FileSpec::new("planes.dat", &["name", "iata", "icao"], "planes"),
        FileSpec::new(
            "countries.dat",
            &["name", "iso_code", "dafif_code"],
            "countries",
        ),
    ]
});

/// An owned copy of [`DEFAULT_SPECS`], ready to hand to an importer.
pub fn default_specs() -> Vec<FileSpec> {
    DEFAULT_SPECS.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_and_ordered() {
        let tables: Vec<&str> = DEFAULT_SPECS.iter().map(|s| s.table.as_str()).collect();
        assert_eq!(
            tables,
            vec!["airports", "airlines", "routes", "planes", "countries"]
        );
        for spec in DEFAULT_SPECS.iter() {
            spec.validate().unwrap();
            assert_eq!(spec.filename, format!("{}.dat", spec.table));
        }
        assert_eq!(DEFAULT_SPECS[0].columns.len(), 14);
        assert_eq!(DEFAULT_SPECS[2].columns.len(), 9);
    }
}
