use crate::error::{LoadError, Result};
use geojson::{Feature, GeoJson, Geometry, PolygonType, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Closed ring of (lon, lat) positions
pub type Ring = Vec<(f64, f64)>;

#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub exterior: Ring,
    pub holes: Vec<Ring>,
}

/// A named country boundary as read from the GeoJSON document
#[derive(Debug, Clone, PartialEq)]
pub struct Country {
    pub name: String,
    pub polygons: Vec<Polygon>,
}

/// Load country boundaries from a GeoJSON FeatureCollection
pub fn load_countries(path: &Path) -> Result<Vec<Country>> {
    let mut bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let geojson: GeoJson =
        simd_json::serde::from_slice(&mut bytes).map_err(|source| LoadError::GeoJson {
            path: path.to_path_buf(),
            source,
        })?;

    let countries = countries_from_geojson(geojson).ok_or_else(|| {
        LoadError::NotFeatureCollection {
            path: path.to_path_buf(),
        }
    })?;

    if countries.is_empty() {
        return Err(LoadError::Empty {
            what: "country features",
            path: path.to_path_buf(),
        });
    }

    info!(count = countries.len(), path = %path.display(), "loaded country boundaries");
    Ok(countries)
}

/// Extract named polygonal features. Returns None unless the document is a
/// FeatureCollection; unnamed or non-polygonal features are skipped.
pub fn countries_from_geojson(geojson: GeoJson) -> Option<Vec<Country>> {
    let GeoJson::FeatureCollection(fc) = geojson else {
        return None;
    };

    let features = &fc.features;
    let countries: Vec<Country> = features.iter().filter_map(country_from_feature).collect();

    if countries.len() < features.len() {
        debug!(
            skipped = features.len() - countries.len(),
            "features without a name or polygons"
        );
    }
    Some(countries)
}

fn country_from_feature(feature: &Feature) -> Option<Country> {
    let props = feature.properties.as_ref();
    // Natural Earth exports vary in which property carries the display name
    let name = props
        .and_then(|p| {
            p.get("name")
                .or_else(|| p.get("NAME"))
                .or_else(|| p.get("ADMIN"))
        })
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())?
        .to_string();

    let mut polygons = Vec::new();
    if let Some(ref geometry) = feature.geometry {
        collect_polygons(geometry, &mut polygons);
    }
    if polygons.is_empty() {
        return None;
    }

    Some(Country { name, polygons })
}

fn collect_polygons(geometry: &Geometry, out: &mut Vec<Polygon>) {
    match &geometry.value {
        Value::Polygon(rings) => out.extend(to_polygon(rings)),
        Value::MultiPolygon(polygons) => {
            out.extend(polygons.iter().filter_map(to_polygon));
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_polygons(g, out);
            }
        }
        _ => {}
    }
}

fn to_polygon(rings: &PolygonType) -> Option<Polygon> {
    let mut rings = rings.iter().map(|coords| {
        coords
            .iter()
            .filter(|c| c.len() >= 2)
            .map(|c| (c[0], c[1]))
            .collect::<Ring>()
    });

    let exterior = rings.next().filter(|r| r.len() >= 3)?;
    let holes = rings.filter(|r| r.len() >= 3).collect();
    Some(Polygon { exterior, holes })
}
