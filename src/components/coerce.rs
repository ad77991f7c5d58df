//! Conversie van pinwaarden naar de types die de componenten verwachten.

use crate::geom::{Line3, Mesh, Point3, Polyline3};
use crate::graph::value::Value;

use super::ComponentError;

/// `true` wanneer een pin data bevat (niet ontbrekend, geen `Null`, geen lege lijst).
#[must_use]
pub fn has_data(value: Option<&Value>) -> bool {
    value.is_some_and(|value| !value.is_empty())
}

pub fn coerce_number(value: &Value) -> Result<f64, ComponentError> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Text(s) => s.trim().parse().map_err(|_| {
            ComponentError::new(format!("Kon tekst '{s}' niet naar een getal converteren"))
        }),
        Value::List(l) if l.len() == 1 => coerce_number(&l[0]),
        other => other
            .expect_number()
            .map_err(|err| ComponentError::new(format!("Verwachtte een getal: {err}"))),
    }
}

pub fn coerce_integer(value: &Value) -> Result<i64, ComponentError> {
    match value {
        Value::Number(n) if n.is_finite() => Ok(n.round() as i64),
        Value::Boolean(b) => Ok(i64::from(*b)),
        Value::Text(s) => s.trim().parse().map_err(|_| {
            ComponentError::new(format!("Kon tekst '{s}' niet naar een geheel getal converteren"))
        }),
        Value::List(l) if l.len() == 1 => coerce_integer(&l[0]),
        other => Err(ComponentError::new(format!(
            "Verwachtte een geheel getal, kreeg {}",
            other.kind()
        ))),
    }
}

pub fn coerce_boolean(value: &Value) -> Result<bool, ComponentError> {
    match value {
        Value::Boolean(b) => Ok(*b),
        Value::Number(n) => Ok(n.abs() > 1e-9),
        Value::List(l) if l.len() == 1 => coerce_boolean(&l[0]),
        other => Err(ComponentError::new(format!(
            "Verwachtte een booleaanse waarde, kreeg {}",
            other.kind()
        ))),
    }
}

pub fn coerce_text(value: &Value) -> Result<String, ComponentError> {
    match value {
        Value::Text(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Boolean(b) => Ok(b.to_string()),
        Value::List(l) if l.len() == 1 => coerce_text(&l[0]),
        other => Err(ComponentError::new(format!(
            "Verwachtte een tekst, kreeg {}",
            other.kind()
        ))),
    }
}

pub fn coerce_point(value: &Value) -> Result<Point3, ComponentError> {
    match value {
        Value::List(l) if l.len() == 1 => coerce_point(&l[0]),
        other => other
            .expect_point()
            .map(Point3::from)
            .map_err(|err| ComponentError::new(format!("Verwachtte een punt: {err}"))),
    }
}

/// Zet een `Value::Surface` om naar een gevalideerde mesh.
pub fn coerce_mesh(value: &Value) -> Result<Mesh, ComponentError> {
    match value {
        Value::List(l) if l.len() == 1 => coerce_mesh(&l[0]),
        other => {
            let (vertices, faces) = other
                .expect_surface()
                .map_err(|err| ComponentError::new(format!("Verwachtte een mesh: {err}")))?;
            Mesh::from_indexed(vertices, faces)
                .map_err(|err| ComponentError::new(format!("Ongeldige mesh: {err}")))
        }
    }
}

/// Lijnsegmenten uit een lijn of een lijst van lijnen.
pub fn coerce_lines(value: &Value) -> Result<Vec<Line3>, ComponentError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::List(values) => values.iter().try_fold(Vec::new(), |mut acc, entry| {
            acc.extend(coerce_lines(entry)?);
            Ok(acc)
        }),
        other => {
            let (p1, p2) = other
                .expect_curve_line()
                .map_err(|err| ComponentError::new(format!("Verwachtte een lijn: {err}")))?;
            Ok(vec![Line3::new(p1.into(), p2.into())])
        }
    }
}

/// Polyline uit een puntenlijst, een lijn, of een aaneengesloten reeks lijnen.
///
/// Opeenvolgende lijnen worden aan elkaar geregen; een lijn die niet aansluit
/// op de vorige wordt met een tussensprong verbonden.
pub fn coerce_polyline(value: &Value) -> Result<Polyline3, ComponentError> {
    let mut points: Vec<Point3> = Vec::new();
    collect_polyline_points(value, &mut points)?;
    Polyline3::new(points).map_err(|err| ComponentError::new(format!("Ongeldige curve: {err}")))
}

fn collect_polyline_points(value: &Value, points: &mut Vec<Point3>) -> Result<(), ComponentError> {
    match value {
        Value::Point(p) => push_distinct(points, Point3::from(*p)),
        Value::CurveLine { p1, p2 } => {
            push_distinct(points, Point3::from(*p1));
            push_distinct(points, Point3::from(*p2));
        }
        Value::List(values) => {
            for entry in values {
                collect_polyline_points(entry, points)?;
            }
        }
        other => {
            return Err(ComponentError::new(format!(
                "Verwachtte een curve-achtige invoer, kreeg {}",
                other.kind()
            )));
        }
    }
    Ok(())
}

fn push_distinct(points: &mut Vec<Point3>, point: Point3) {
    if points.last() != Some(&point) {
        points.push(point);
    }
}

pub fn coerce_number_with_default(value: Option<&Value>, default: f64) -> Result<f64, ComponentError> {
    match value {
        Some(v) if !v.is_empty() => coerce_number(v),
        _ => Ok(default),
    }
}

pub fn coerce_integer_with_default(value: Option<&Value>, default: i64) -> Result<i64, ComponentError> {
    match value {
        Some(v) if !v.is_empty() => coerce_integer(v),
        _ => Ok(default),
    }
}

pub fn coerce_boolean_with_default(value: Option<&Value>, default: bool) -> Result<bool, ComponentError> {
    match value {
        Some(v) if !v.is_empty() => coerce_boolean(v),
        _ => Ok(default),
    }
}

pub fn coerce_text_with_default(value: Option<&Value>, default: &str) -> Result<String, ComponentError> {
    match value {
        Some(v) if !v.is_empty() => coerce_text(v),
        _ => Ok(default.to_owned()),
    }
}
