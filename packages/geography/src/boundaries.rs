//! Boundary loading from `GeoJSON`.
//!
//! The Statistics Canada boundary file identifies each province by its
//! `PREABBR` abbreviation (`"Alta."`, `"B.C."`, ...). Those are normalized
//! to [`ProvinceCode`]s here so the rest of the pipeline joins on typed
//! codes. Features whose code cannot be normalized are kept with
//! `code: None` so that join diagnostics can still report them.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::io::Read as _;
use std::path::Path;

use ai_exposure_region_models::ProvinceCode;
use geo::{BoundingRect, Centroid, InteriorPoint, MultiPolygon, Point, Rect};
use geojson::GeoJson;

use crate::{GeographyError, shp};
use crate::projection::LambertConformalConic;

/// Feature property holding the province abbreviation.
pub const DEFAULT_CODE_PROPERTY: &str = "PREABBR";

/// Feature properties tried for a display name.
pub(crate) const NAME_PROPERTIES: &[&str] = &["PRENAME", "name", "NAME"];

/// One province or territory outline.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    /// Normalized province code, if the raw code was recognized.
    pub code: Option<ProvinceCode>,
    /// Code exactly as it appeared in the boundary file.
    pub raw_code: String,
    /// Display name from the feature properties, if any.
    pub name: Option<String>,
    /// Outline. Longitude/latitude until projected.
    pub geometry: MultiPolygon<f64>,
}

impl Boundary {
    /// A point inside the outline suitable for a label.
    ///
    /// Uses the interior point, falling back to the centroid.
    #[must_use]
    pub fn label_anchor(&self) -> Option<Point<f64>> {
        self.geometry
            .interior_point()
            .or_else(|| self.geometry.centroid())
    }

    /// Bounding box of the outline.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.geometry.bounding_rect()
    }
}

/// Loads boundaries from a `.geojson`/`.json` file, a `.shp` shapefile
/// (with its `.dbf` sibling), or a `.zip` archive containing either.
///
/// `code_property` names the feature property (or `.dbf` column) holding
/// the province code.
///
/// # Errors
///
/// * [`GeographyError::MissingBoundaries`] if `path` does not exist.
/// * [`GeographyError::NoBoundaryInArchive`] if a zip holds neither
///   `GeoJSON` nor a complete shapefile.
/// * [`GeographyError::GeoJson`] / [`GeographyError::NoFeatureCollection`]
///   if a `GeoJSON` document cannot be parsed.
/// * [`GeographyError::Shapefile`] / [`GeographyError::Dbase`] if a
///   shapefile cannot be read.
pub fn load_boundaries(path: &Path, code_property: &str) -> Result<Vec<Boundary>, GeographyError> {
    if !path.exists() {
        return Err(GeographyError::MissingBoundaries {
            path: path.display().to_string(),
        });
    }

    log::info!("Loading boundaries from {}", path.display());

    let origin = path.display().to_string();
    let source = match extension(path).as_deref() {
        Some("zip") => read_zip(path)?,
        Some("shp") => BoundarySource::Shapefile {
            shp: read_file(path)?,
            dbf: read_file(&path.with_extension("dbf"))?,
        },
        _ => BoundarySource::GeoJson(std::fs::read_to_string(path).map_err(|e| {
            GeographyError::Io {
                path: origin.clone(),
                source: e,
            }
        })?),
    };

    let boundaries = match source {
        BoundarySource::GeoJson(text) => parse_boundaries(&text, code_property)?,
        BoundarySource::Shapefile { shp, dbf } => {
            shp::parse_shapefile(shp, dbf, code_property, &origin)?
        }
    };
    log::info!("Loaded {} boundaries", boundaries.len());

    Ok(boundaries)
}

/// Raw boundary data, before parsing.
enum BoundarySource {
    GeoJson(String),
    Shapefile { shp: Vec<u8>, dbf: Vec<u8> },
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

fn read_file(path: &Path) -> Result<Vec<u8>, GeographyError> {
    std::fs::read(path).map_err(|e| GeographyError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Reads the boundary data out of a zip archive.
///
/// The first `.geojson`/`.json` entry wins. Otherwise the first `.shp`
/// entry is read together with the `.dbf` entry of the same stem.
fn read_zip(path: &Path) -> Result<BoundarySource, GeographyError> {
    let zip_error = |e| GeographyError::Zip {
        path: path.display().to_string(),
        source: e,
    };

    let file = std::fs::File::open(path).map_err(|e| GeographyError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut archive = zip::ZipArchive::new(file).map_err(zip_error)?;

    let names: Vec<String> = archive.file_names().map(str::to_string).collect();

    if let Some(name) = names.iter().find(|n| {
        let n = n.to_ascii_lowercase();
        n.ends_with(".geojson") || n.ends_with(".json")
    }) {
        log::debug!("Reading {name} from {}", path.display());
        let bytes = read_entry(&mut archive, name, path)?;
        let text = String::from_utf8(bytes).map_err(|e| GeographyError::Io {
            path: format!("{}!{name}", path.display()),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;
        return Ok(BoundarySource::GeoJson(text));
    }

    let shp_name = names
        .iter()
        .find(|n| n.to_ascii_lowercase().ends_with(".shp"));
    let dbf_name = shp_name.and_then(|shp| {
        let dbf = format!("{}.dbf", shp.to_ascii_lowercase().trim_end_matches(".shp"));
        names.iter().find(|n| n.to_ascii_lowercase() == dbf)
    });

    let (Some(shp_name), Some(dbf_name)) = (shp_name, dbf_name) else {
        return Err(GeographyError::NoBoundaryInArchive {
            path: path.display().to_string(),
        });
    };

    log::debug!("Reading {shp_name} and {dbf_name} from {}", path.display());

    Ok(BoundarySource::Shapefile {
        shp: read_entry(&mut archive, shp_name, path)?,
        dbf: read_entry(&mut archive, dbf_name, path)?,
    })
}

fn read_entry(
    archive: &mut zip::ZipArchive<std::fs::File>,
    name: &str,
    path: &Path,
) -> Result<Vec<u8>, GeographyError> {
    let mut entry = archive.by_name(name).map_err(|e| GeographyError::Zip {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut bytes = Vec::new();
    entry
        .read_to_end(&mut bytes)
        .map_err(|e| GeographyError::Io {
            path: format!("{}!{name}", path.display()),
            source: e,
        })?;

    Ok(bytes)
}

/// Parses a `GeoJSON` `FeatureCollection` into boundaries.
///
/// Features sharing a code are merged into a single boundary. Features
/// without a polygon geometry or without the code property are skipped
/// with a warning.
///
/// # Errors
///
/// Returns [`GeographyError`] if the text is not a `FeatureCollection`.
pub fn parse_boundaries(text: &str, code_property: &str) -> Result<Vec<Boundary>, GeographyError> {
    let GeoJson::FeatureCollection(collection) = text.parse::<GeoJson>()? else {
        return Err(GeographyError::NoFeatureCollection);
    };

    let mut merged = BTreeMap::new();

    for (index, feature) in collection.features.into_iter().enumerate() {
        let Some(raw_code) = feature
            .property(code_property)
            .and_then(|v| v.as_str())
            .map(str::to_string)
        else {
            log::warn!("Feature {index} has no '{code_property}' property, skipping");
            continue;
        };

        let name = NAME_PROPERTIES
            .iter()
            .find_map(|key| feature.property(key).and_then(|v| v.as_str()))
            .map(str::to_string);

        let Some(geometry) = feature.geometry.and_then(to_multipolygon) else {
            log::warn!("Feature {index} ({raw_code}) has no polygon geometry, skipping");
            continue;
        };

        merge_feature(&mut merged, raw_code, name, geometry);
    }

    Ok(merged.into_values().collect())
}

/// Adds one feature, merging it into an existing boundary with the same
/// raw code.
pub(crate) fn merge_feature(
    merged: &mut BTreeMap<String, Boundary>,
    raw_code: String,
    name: Option<String>,
    geometry: MultiPolygon<f64>,
) {
    match merged.entry(raw_code) {
        Entry::Occupied(mut existing) => existing.get_mut().geometry.0.extend(geometry.0),
        Entry::Vacant(slot) => {
            let code = ProvinceCode::normalize(slot.key());
            if code.is_none() {
                log::warn!("Unrecognized province code '{}' in boundary file", slot.key());
            }
            let raw_code = slot.key().clone();
            slot.insert(Boundary {
                code,
                raw_code,
                name,
                geometry,
            });
        }
    }
}

/// Converts a `GeoJSON` geometry into a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn to_multipolygon(geometry: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

/// Whether every boundary lies within longitude/latitude range.
#[must_use]
pub fn is_geographic(boundaries: &[Boundary]) -> bool {
    boundaries.iter().filter_map(Boundary::bounds).all(|rect| {
        rect.min().x >= -180.0
            && rect.max().x <= 180.0
            && rect.min().y >= -90.0
            && rect.max().y <= 90.0
    })
}

/// Projects longitude/latitude boundaries in place. Boundaries already in
/// a projected coordinate system are left untouched.
pub fn project_boundaries(boundaries: &mut [Boundary], projection: &LambertConformalConic) {
    if !is_geographic(boundaries) {
        log::info!("Boundaries are already projected, skipping reprojection");
        return;
    }

    log::debug!("Projecting {} boundaries to Lambert", boundaries.len());
    for boundary in boundaries {
        boundary.geometry = projection.project_geometry(&boundary.geometry);
    }
}
