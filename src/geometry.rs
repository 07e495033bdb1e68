//! Geometry transcoding.
//!
//! Records carry a GeoJSON-like geometry (`Point`, `MultiPoint` or `Polygon`,
//! possibly JSON-encoded as a string). [`Geometry::from_value`] reads it and
//! [`transcode`] turns it into the spatial markup of a target schema:
//!
//! | Geometry   | DataCite                         | ISO 19139                                | DIF                  |
//! |------------|----------------------------------|------------------------------------------|----------------------|
//! | Point      | `geoLocationPoint`               | `gml:Point` in `EX_BoundingPolygon`      | `Point`              |
//! | MultiPoint | one `geoLocationPoint` per point | `gml:MultiPoint`                         | one `Point` each     |
//! | Polygon    | `geoLocationPolygon`             | `EX_GeographicBoundingBox` or `gml:Polygon` | `Bounding_Rectangle` or `Polygon` |
//!
//! A closed five-point axis-aligned ring is treated as a box and written as a
//! bounding box wherever the schema has one.
//!
//! Missing or unsupported geometries yield an empty [`GeoNode`]. A geometry
//! whose coordinates do not fit its declared type is an error; assemblers
//! catch it and omit the spatial block.

use serde_json::Value;

use crate::error::{CrosswalkError, Result};
use crate::formats::Schema;
use crate::record::parse_embedded;
use crate::tree::Element;

/// A longitude/latitude pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    /// Longitude in decimal degrees.
    pub lon: f64,
    /// Latitude in decimal degrees.
    pub lat: f64,
}

impl Position {
    /// Creates a position.
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    fn from_value(value: &Value) -> Result<Self> {
        let pair = value
            .as_array()
            .filter(|pair| pair.len() >= 2)
            .ok_or_else(|| CrosswalkError::Geometry(format!("expected a coordinate pair, found {value}")))?;
        Ok(Self::new(coordinate(&pair[0])?, coordinate(&pair[1])?))
    }

    /// `"lon lat"` as used by `gml:pos`.
    #[must_use]
    pub fn gml_pos(&self) -> String {
        format!("{} {}", format_coordinate(self.lon), format_coordinate(self.lat))
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum longitude.
    pub west: f64,
    /// Maximum longitude.
    pub east: f64,
    /// Minimum latitude.
    pub south: f64,
    /// Maximum latitude.
    pub north: f64,
}

/// A supported geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// A single position.
    Point(Position),
    /// Several unconnected positions.
    MultiPoint(Vec<Position>),
    /// A polygon, reduced to its outer ring.
    Polygon(Vec<Position>),
}

impl Geometry {
    /// Reads a geometry from a record value.
    ///
    /// Returns `Ok(None)` for absent, unparsable or unsupported geometries.
    ///
    /// # Errors
    ///
    /// Returns [`CrosswalkError::Geometry`] if the coordinates do not match
    /// the declared type.
    pub fn from_value(value: &Value) -> Result<Option<Self>> {
        let Value::Object(object) = parse_embedded(value) else {
            return Ok(None);
        };
        let kind = object
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_ascii_lowercase();
        let coordinates = object.get("coordinates").unwrap_or(&Value::Null);

        let geometry = match kind.as_str() {
            "point" => Self::Point(Position::from_value(coordinates)?),
            "multipoint" => Self::MultiPoint(positions(coordinates)?),
            "polygon" => {
                let ring = coordinates
                    .as_array()
                    .and_then(|rings| rings.first())
                    .ok_or_else(|| CrosswalkError::Geometry("polygon has no outer ring".into()))?;
                Self::Polygon(positions(ring)?)
            },
            _ => return Ok(None),
        };
        Ok(Some(geometry))
    }

    /// Returns the bounding box if this is a closed axis-aligned rectangle.
    #[must_use]
    pub fn as_box(&self) -> Option<BoundingBox> {
        let Self::Polygon(ring) = self else {
            return None;
        };
        if ring.len() != 5 {
            return None;
        }
        let (c0, c1, c2, c3, c4) = (ring[0], ring[1], ring[2], ring[3], ring[4]);
        #[allow(clippy::float_cmp)]
        let closed = c0 == c4;
        #[allow(clippy::float_cmp)]
        let degenerate = c0.lon == c2.lon || c0.lat == c2.lat;
        // Either winding: the second corner shares longitude or latitude with the first.
        let corners_a = c1 == Position::new(c0.lon, c2.lat) && c3 == Position::new(c2.lon, c0.lat);
        let corners_b = c1 == Position::new(c2.lon, c0.lat) && c3 == Position::new(c0.lon, c2.lat);
        if !closed || degenerate || !(corners_a || corners_b) {
            return None;
        }
        Some(BoundingBox {
            west: c0.lon.min(c2.lon),
            east: c0.lon.max(c2.lon),
            south: c0.lat.min(c2.lat),
            north: c0.lat.max(c2.lat),
        })
    }
}

fn positions(value: &Value) -> Result<Vec<Position>> {
    value
        .as_array()
        .ok_or_else(|| CrosswalkError::Geometry(format!("expected a list of coordinate pairs, found {value}")))?
        .iter()
        .map(Position::from_value)
        .collect()
}

fn coordinate(value: &Value) -> Result<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| CrosswalkError::Geometry(format!("not a coordinate: {value}")))
}

/// Formats a coordinate the way JSON would print it (`46.0`, `8.60904`).
#[must_use]
pub fn format_coordinate(value: f64) -> String {
    serde_json::Number::from_f64(value).map_or_else(|| value.to_string(), |number| number.to_string())
}

/// Sequential `gml:id` generator shared by the temporal and spatial extents
/// of one ISO document.
#[derive(Debug, Clone, Default)]
pub struct GmlIds {
    counter: usize,
}

impl GmlIds {
    /// Creates a generator starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next id with the given prefix, e.g. `P003`.
    pub fn next_id(&mut self, prefix: &str) -> String {
        self.counter += 1;
        format!("{prefix}{:03}", self.counter)
    }
}

/// Schema-specific spatial markup. Empty when nothing applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoNode {
    /// Elements to splice into the target document.
    pub elements: Vec<Element>,
}

impl GeoNode {
    /// Returns true if there is nothing to emit.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Transcodes a geometry for `target`.
///
/// DataCite yields `geoLocation` elements, ISO 19139 one
/// `gmd:geographicElement`, DIF one `Geometry`. Other schemas have no
/// spatial markup and yield an empty node.
#[must_use]
pub fn transcode(geometry: &Geometry, target: Schema, ids: &mut GmlIds) -> GeoNode {
    let elements = match target {
        Schema::DataCite => datacite(geometry),
        Schema::Iso19139 => vec![iso19139(geometry, ids)],
        Schema::Dif => vec![dif(geometry)],
        Schema::DcatAp | Schema::Ris | Schema::Bibtex => Vec::new(),
    };
    GeoNode { elements }
}

fn datacite_point(name: &str, position: Position) -> Element {
    Element::new(name)
        .with_child(Element::text_node("pointLongitude", format_coordinate(position.lon)))
        .with_child(Element::text_node("pointLatitude", format_coordinate(position.lat)))
}

fn datacite(geometry: &Geometry) -> Vec<Element> {
    match geometry {
        Geometry::Point(position) => {
            vec![Element::new("geoLocation").with_child(datacite_point("geoLocationPoint", *position))]
        },
        Geometry::MultiPoint(points) => points
            .iter()
            .map(|position| Element::new("geoLocation").with_child(datacite_point("geoLocationPoint", *position)))
            .collect(),
        Geometry::Polygon(ring) => vec![Element::new("geoLocation").with_child(
            Element::new("geoLocationPolygon")
                .with_children(ring.iter().map(|position| datacite_point("polygonPoint", *position))),
        )],
    }
}

fn decimal(name: &str, value: f64) -> Element {
    Element::new(name).with_child(Element::text_node("gco:Decimal", format_coordinate(value)))
}

fn bounding_polygon(shape: Element) -> Element {
    Element::new("gmd:EX_BoundingPolygon").with_child(Element::new("gmd:polygon").with_child(shape))
}

fn iso19139(geometry: &Geometry, ids: &mut GmlIds) -> Element {
    let inner = if let Some(bbox) = geometry.as_box() {
        Element::new("gmd:EX_GeographicBoundingBox")
            .with_child(decimal("gmd:westBoundLongitude", bbox.west))
            .with_child(decimal("gmd:eastBoundLongitude", bbox.east))
            .with_child(decimal("gmd:southBoundLatitude", bbox.south))
            .with_child(decimal("gmd:northBoundLatitude", bbox.north))
    } else {
        match geometry {
            Geometry::Point(position) => bounding_polygon(
                Element::new("gml:Point")
                    .with_attr("gml:id", ids.next_id("P"))
                    .with_child(Element::text_node("gml:pos", position.gml_pos())),
            ),
            Geometry::MultiPoint(points) => {
                let mut multi = Element::new("gml:MultiPoint").with_attr("gml:id", ids.next_id("MP"));
                for position in points {
                    multi.push(
                        Element::new("gml:pointMember").with_child(
                            Element::new("gml:Point")
                                .with_attr("gml:id", ids.next_id("P"))
                                .with_child(Element::text_node("gml:pos", position.gml_pos())),
                        ),
                    );
                }
                bounding_polygon(multi)
            },
            Geometry::Polygon(ring) => bounding_polygon(
                Element::new("gml:Polygon")
                    .with_attr("gml:id", ids.next_id("PL"))
                    .with_child(
                        Element::new("gml:interior").with_child(
                            Element::new("gml:LinearRing").with_children(
                                ring.iter().map(|position| Element::text_node("gml:pos", position.gml_pos())),
                            ),
                        ),
                    ),
            ),
        }
    };
    Element::new("gmd:geographicElement").with_child(inner)
}

fn dif_point(position: Position) -> Element {
    Element::new("Point")
        .with_child(Element::text_node("Point_Longitude", format_coordinate(position.lon)))
        .with_child(Element::text_node("Point_Latitude", format_coordinate(position.lat)))
}

fn dif(geometry: &Geometry) -> Element {
    let node = Element::new("Geometry").with_child(Element::text_node("Coordinate_System", "CARTESIAN"));
    if let Some(bbox) = geometry.as_box() {
        return node.with_child(
            Element::new("Bounding_Rectangle")
                .with_child(Element::text_node("West_Bounding_Coordinate", format_coordinate(bbox.west)))
                .with_child(Element::text_node("East_Bounding_Coordinate", format_coordinate(bbox.east)))
                .with_child(Element::text_node("North_Bounding_Coordinate", format_coordinate(bbox.north)))
                .with_child(Element::text_node("South_Bounding_Coordinate", format_coordinate(bbox.south))),
        );
    }
    match geometry {
        Geometry::Point(position) => node.with_child(dif_point(*position)),
        Geometry::MultiPoint(points) => node.with_children(points.iter().copied().map(dif_point)),
        Geometry::Polygon(ring) => node.with_child(
            Element::new("Polygon").with_child(
                Element::new("Boundary").with_children(ring.iter().copied().map(dif_point)),
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rectangle() -> Geometry {
        Geometry::from_value(&json!({
            "type": "Polygon",
            "coordinates": [[[7.5, 46.0], [7.5, 47.0], [8.5, 47.0], [8.5, 46.0], [7.5, 46.0]]]
        }))
        .expect("valid")
        .expect("supported")
    }

    fn pentagon() -> Geometry {
        Geometry::from_value(&json!(
            "{\"type\": \"Polygon\", \"coordinates\": [[[7.0, 46.0], [7.5, 47.0], [8.5, 47.0], [8.5, 46.0], [7.0, 46.0]]]}"
        ))
        .expect("valid")
        .expect("supported")
    }

    #[test]
    fn test_point_to_datacite() {
        let point = Geometry::from_value(&json!("{\"type\": \"Point\", \"coordinates\": [8.60904, 46.60369]}"))
            .expect("valid")
            .expect("supported");
        let node = transcode(&point, Schema::DataCite, &mut GmlIds::new());
        assert_eq!(node.elements.len(), 1);
        let location = &node.elements[0];
        assert_eq!(
            location.find("geoLocationPoint/pointLongitude").map(Element::text_or_empty),
            Some("8.60904")
        );
        assert_eq!(
            location.find("geoLocationPoint/pointLatitude").map(Element::text_or_empty),
            Some("46.60369")
        );
    }

    #[test]
    fn test_multipoint_keeps_order() {
        let multi = Geometry::from_value(&json!({"type": "MultiPoint", "coordinates": [[1.0, 2.0], [3.0, 4.0]]}))
            .expect("valid")
            .expect("supported");
        let node = transcode(&multi, Schema::DataCite, &mut GmlIds::new());
        let longitudes: Vec<_> = node
            .elements
            .iter()
            .filter_map(|location| location.find("geoLocationPoint/pointLongitude"))
            .map(Element::text_or_empty)
            .collect();
        assert_eq!(longitudes, vec!["1.0", "3.0"]);
    }

    #[test]
    fn test_box_detection() {
        let bbox = rectangle().as_box().expect("rectangle is a box");
        assert_eq!(bbox, BoundingBox { west: 7.5, east: 8.5, south: 46.0, north: 47.0 });
        assert_eq!(pentagon().as_box(), None);
    }

    #[test]
    fn test_box_detection_other_winding() {
        let geometry = Geometry::Polygon(vec![
            Position::new(7.5, 46.0),
            Position::new(8.5, 46.0),
            Position::new(8.5, 47.0),
            Position::new(7.5, 47.0),
            Position::new(7.5, 46.0),
        ]);
        assert!(geometry.as_box().is_some());
    }

    #[test]
    fn test_iso_box_and_polygon() {
        let node = transcode(&rectangle(), Schema::Iso19139, &mut GmlIds::new());
        let bbox = node.elements[0]
            .find("gmd:EX_GeographicBoundingBox")
            .expect("bounding box");
        assert_eq!(
            bbox.find("gmd:westBoundLongitude/gco:Decimal").map(Element::text_or_empty),
            Some("7.5")
        );
        assert_eq!(
            bbox.find("gmd:northBoundLatitude/gco:Decimal").map(Element::text_or_empty),
            Some("47.0")
        );

        let mut ids = GmlIds::new();
        ids.next_id("D");
        let node = transcode(&pentagon(), Schema::Iso19139, &mut ids);
        assert!(node.elements[0].find("gmd:EX_GeographicBoundingBox").is_none());
        let polygon = node.elements[0]
            .find("gmd:EX_BoundingPolygon/gmd:polygon/gml:Polygon")
            .expect("general polygon");
        assert_eq!(polygon.attr("gml:id"), Some("PL002"));
        assert_eq!(polygon.descendants("gml:pos").len(), 5);
    }

    #[test]
    fn test_iso_point_position() {
        let node = transcode(
            &Geometry::Point(Position::new(8.60904, 46.60369)),
            Schema::Iso19139,
            &mut GmlIds::new(),
        );
        let point = node.elements[0]
            .find("gmd:EX_BoundingPolygon/gmd:polygon/gml:Point")
            .expect("point");
        assert_eq!(point.attr("gml:id"), Some("P001"));
        assert_eq!(point.find("gml:pos").map(Element::text_or_empty), Some("8.60904 46.60369"));
    }

    #[test]
    fn test_dif_bounding_rectangle() {
        let node = transcode(&rectangle(), Schema::Dif, &mut GmlIds::new());
        assert_eq!(
            node.elements[0]
                .find("Bounding_Rectangle/South_Bounding_Coordinate")
                .map(Element::text_or_empty),
            Some("46.0")
        );
    }

    #[test]
    fn test_missing_and_unsupported_geometry() {
        assert_eq!(Geometry::from_value(&json!("")).expect("ok"), None);
        assert_eq!(Geometry::from_value(&json!("{oops")).expect("ok"), None);
        assert_eq!(
            Geometry::from_value(&json!({"type": "LineString", "coordinates": [[0, 0], [1, 1]]})).expect("ok"),
            None
        );
        assert!(transcode(&rectangle(), Schema::Ris, &mut GmlIds::new()).is_empty());
    }

    #[test]
    fn test_arity_mismatch_is_error() {
        let err = Geometry::from_value(&json!({"type": "Point", "coordinates": [[8.6, 46.6]]}));
        assert!(matches!(err, Err(CrosswalkError::Geometry(_))));
        let err = Geometry::from_value(&json!({"type": "Polygon", "coordinates": [8.6, 46.6]}));
        assert!(matches!(err, Err(CrosswalkError::Geometry(_))));
    }
}
