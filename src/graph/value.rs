//! Basis Value-enum waarin componentwaarden en -resultaten worden
//! opgeslagen.

use core::fmt;

/// Beschikbare waardetypes die tussen host en componenten worden uitgewisseld.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Een lege of ontbrekende waarde (bv. een niet-aangesloten optionele pin).
    #[default]
    Null,
    /// Een enkele numerieke waarde.
    Number(f64),
    /// Een booleaanse waarde.
    Boolean(bool),
    /// Tekst, bijvoorbeeld de JSON-attributen van een simulatie.
    Text(String),
    /// Een 3D-punt.
    Point([f64; 3]),
    /// Een lijnsegment, beschreven door twee punten.
    CurveLine { p1: [f64; 3], p2: [f64; 3] },
    /// Een mesh representatie met driehoeken en/of vierhoeken.
    Surface {
        vertices: Vec<[f64; 3]>,
        faces: Vec<Vec<u32>>,
    },
    /// Een lijst van waarden.
    List(Vec<Value>),
}

impl Value {
    /// Geeft de variantnaam terug. Wordt gebruikt in foutmeldingen.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Number(_) => ValueKind::Number,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Text(_) => ValueKind::Text,
            Self::Point(_) => ValueKind::Point,
            Self::CurveLine { .. } => ValueKind::CurveLine,
            Self::Surface { .. } => ValueKind::Surface,
            Self::List(_) => ValueKind::List,
        }
    }

    /// `true` voor `Null` en voor lege lijsten.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::List(values) => values.is_empty(),
            _ => false,
        }
    }

    /// Verwacht een `Number` en retourneert de f64-waarde.
    pub fn expect_number(&self) -> Result<f64, ValueError> {
        match self {
            Self::Number(value) => Ok(*value),
            _ => Err(ValueError::type_mismatch("Number", self.kind())),
        }
    }

    /// Verwacht een `Point` en retourneert de coördinaten.
    pub fn expect_point(&self) -> Result<[f64; 3], ValueError> {
        match self {
            Self::Point(point) => Ok(*point),
            _ => Err(ValueError::type_mismatch("Point", self.kind())),
        }
    }

    /// Verwacht een `CurveLine` en retourneert de eindpunten.
    pub fn expect_curve_line(&self) -> Result<([f64; 3], [f64; 3]), ValueError> {
        match self {
            Self::CurveLine { p1, p2 } => Ok((*p1, *p2)),
            _ => Err(ValueError::type_mismatch("CurveLine", self.kind())),
        }
    }

    /// Verwacht een `Surface` en retourneert de mesh-data.
    pub fn expect_surface(&self) -> Result<(&[[f64; 3]], &[Vec<u32>]), ValueError> {
        match self {
            Self::Surface { vertices, faces } => Ok((vertices, faces)),
            _ => Err(ValueError::type_mismatch("Surface", self.kind())),
        }
    }

    /// Verwacht een lijst en geeft een slice terug.
    pub fn expect_list(&self) -> Result<&[Value], ValueError> {
        match self {
            Self::List(values) => Ok(values),
            _ => Err(ValueError::type_mismatch("List", self.kind())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("<null>"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Text(t) => f.write_str(t),
            Self::Point(p) => write!(f, "{{{}, {}, {}}}", p[0], p[1], p[2]),
            Self::CurveLine { .. } => f.write_str("Line"),
            Self::Surface { vertices, faces } => {
                write!(f, "Mesh (V:{} F:{})", vertices.len(), faces.len())
            }
            Self::List(values) => write!(f, "List ({})", values.len()),
        }
    }
}

/// Typefout voor wanneer een `Value` naar het verkeerde type wordt
/// geconverteerd.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueError {
    expected: &'static str,
    found: ValueKind,
}

impl ValueError {
    #[must_use]
    pub fn type_mismatch(expected: &'static str, found: ValueKind) -> Self {
        Self { expected, found }
    }

    #[must_use]
    pub fn expected(&self) -> &'static str {
        self.expected
    }

    #[must_use]
    pub fn found(&self) -> ValueKind {
        self.found
    }
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "verwachtte type `{}` maar kreeg `{}`",
            self.expected, self.found
        )
    }
}

impl std::error::Error for ValueError {}

/// Beschrijft het soort `Value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Number,
    Boolean,
    Text,
    Point,
    CurveLine,
    Surface,
    List,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "Null",
            Self::Number => "Number",
            Self::Boolean => "Boolean",
            Self::Text => "Text",
            Self::Point => "Point",
            Self::CurveLine => "CurveLine",
            Self::Surface => "Surface",
            Self::List => "List",
        };
        f.write_str(name)
    }
}
