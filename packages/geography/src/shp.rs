//! Boundary loading from ESRI shapefiles.
//!
//! Statistics Canada publishes the provincial boundaries as a zipped
//! shapefile in Statistics Canada Lambert. Province codes and names come
//! from the `.dbf` attribute table.

use std::collections::BTreeMap;
use std::io::Cursor;

use geo::MultiPolygon;
use shapefile::dbase::{self, FieldValue};

use crate::GeographyError;
use crate::boundaries::{Boundary, NAME_PROPERTIES, merge_feature};

/// Parses shapefile geometry (`shp`) and its attribute table (`dbf`).
///
/// Records sharing a code are merged into a single boundary. Records
/// without the code column or without polygon geometry are skipped with a
/// warning.
pub(crate) fn parse_shapefile(
    shp: Vec<u8>,
    dbf: Vec<u8>,
    code_property: &str,
    origin: &str,
) -> Result<Vec<Boundary>, GeographyError> {
    let shapefile_error = |e| GeographyError::Shapefile {
        path: origin.to_string(),
        source: e,
    };

    let shapes = shapefile::ShapeReader::new(Cursor::new(shp)).map_err(shapefile_error)?;
    let records = dbase::Reader::new(Cursor::new(dbf)).map_err(|e| GeographyError::Dbase {
        path: origin.to_string(),
        source: e,
    })?;
    let mut reader = shapefile::Reader::new(shapes, records);

    let mut merged = BTreeMap::new();

    for (index, item) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = item.map_err(shapefile_error)?;

        let Some(raw_code) = character(&record, code_property) else {
            log::warn!("Record {index} has no '{code_property}' value, skipping");
            continue;
        };

        let name = NAME_PROPERTIES
            .iter()
            .find_map(|key| character(&record, key));

        let Some(geometry) = to_multipolygon(shape) else {
            log::warn!("Record {index} ({raw_code}) has no polygon geometry, skipping");
            continue;
        };

        merge_feature(&mut merged, raw_code, name, geometry);
    }

    Ok(merged.into_values().collect())
}

/// Trimmed text of a character column.
fn character(record: &dbase::Record, field: &str) -> Option<String> {
    match record.get(field)? {
        FieldValue::Character(Some(value)) => {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        }
        _ => None,
    }
}

fn to_multipolygon(shape: shapefile::Shape) -> Option<MultiPolygon<f64>> {
    match geo::Geometry::<f64>::try_from(shape).ok()? {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}
