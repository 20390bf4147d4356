//! Geometric type scalar readers: point, line, lseg, box, path, polygon, circle.

use std::collections::HashMap;

use zerocopy::byteorder::big_endian::F64;
use zerocopy::{FromBytes, Immutable, KnownLayout};

use super::{insert, RegistryEntry};
use crate::cursor::Cursor;
use crate::error::Result;
use crate::oid::{oid, Oid};
use crate::value::{Box2, Circle, Line, LineSegment, Path, Point, Polygon, Value};

/// Wire layout of a point: two big-endian `f64`s, read in one shot via `zerocopy`
/// rather than two separate `advance_f64` calls.
#[derive(FromBytes, KnownLayout, Immutable)]
#[repr(C)]
struct PointWire {
    x: F64,
    y: F64,
}

fn read_point(cur: &mut Cursor<'_>) -> Result<Point> {
    let wire: PointWire = cur.advance_struct()?;
    Ok(Point {
        x: wire.x.get(),
        y: wire.y.get(),
    })
}

fn point_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    Ok(Value::Point(read_point(cur)?))
}

fn line_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    let a = cur.advance_f64()?;
    let b = cur.advance_f64()?;
    let c = cur.advance_f64()?;
    Ok(Value::Line(Line { a, b, c }))
}

fn lseg_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    let p1 = read_point(cur)?;
    let p2 = read_point(cur)?;
    Ok(Value::LineSegment(LineSegment { p1, p2 }))
}

fn box_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    let high = read_point(cur)?;
    let low = read_point(cur)?;
    Ok(Value::Box(Box2 { high, low }))
}

fn read_points(cur: &mut Cursor<'_>) -> Result<Vec<Point>> {
    let npoints = cur.advance_u32()?;
    let mut points = Vec::with_capacity(npoints as usize);
    for _ in 0..npoints {
        points.push(read_point(cur)?);
    }
    Ok(points)
}

fn path_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    let closed = cur.advance_u8()? != 0;
    let points = read_points(cur)?;
    Ok(Value::Path(Path { closed, points }))
}

fn polygon_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    let points = read_points(cur)?;
    Ok(Value::Polygon(Polygon { points }))
}

fn circle_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    let center = read_point(cur)?;
    let radius = cur.advance_f64()?;
    Ok(Value::Circle(Circle { center, radius }))
}

pub(super) fn register(entries: &mut HashMap<Oid, RegistryEntry>) {
    insert(
        entries,
        oid::POINT,
        RegistryEntry {
            text: None,
            binary: Some(point_binary),
            array_element_oid: None,
        },
    );
    insert(
        entries,
        oid::LINE,
        RegistryEntry {
            text: None,
            binary: Some(line_binary),
            array_element_oid: None,
        },
    );
    insert(
        entries,
        oid::LSEG,
        RegistryEntry {
            text: None,
            binary: Some(lseg_binary),
            array_element_oid: None,
        },
    );
    insert(
        entries,
        oid::BOX,
        RegistryEntry {
            text: None,
            binary: Some(box_binary),
            array_element_oid: None,
        },
    );
    insert(
        entries,
        oid::PATH,
        RegistryEntry {
            text: None,
            binary: Some(path_binary),
            array_element_oid: None,
        },
    );
    insert(
        entries,
        oid::POLYGON,
        RegistryEntry {
            text: None,
            binary: Some(polygon_binary),
            array_element_oid: None,
        },
    );
    insert(
        entries,
        oid::CIRCLE,
        RegistryEntry {
            text: None,
            binary: Some(circle_binary),
            array_element_oid: None,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid::Format;
    use crate::readers::Registry;

    #[test]
    fn circle_binary_decodes_center_and_radius() {
        let registry = Registry::new();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1.5f64.to_be_bytes());
        bytes.extend_from_slice(&2.5f64.to_be_bytes());
        bytes.extend_from_slice(&3.0f64.to_be_bytes());
        let value = registry.decode(oid::CIRCLE, Format::Binary, &bytes).unwrap();
        assert_eq!(
            value,
            Value::Circle(Circle {
                center: Point { x: 1.5, y: 2.5 },
                radius: 3.0
            })
        );
    }

    #[test]
    fn polygon_binary_decodes_point_list() {
        let registry = Registry::new();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&2u32.to_be_bytes());
        bytes.extend_from_slice(&0.0f64.to_be_bytes());
        bytes.extend_from_slice(&0.0f64.to_be_bytes());
        bytes.extend_from_slice(&1.0f64.to_be_bytes());
        bytes.extend_from_slice(&1.0f64.to_be_bytes());
        let value = registry.decode(oid::POLYGON, Format::Binary, &bytes).unwrap();
        assert_eq!(
            value,
            Value::Polygon(Polygon {
                points: vec![Point { x: 0.0, y: 0.0 }, Point { x: 1.0, y: 1.0 }]
            })
        );
    }
}
