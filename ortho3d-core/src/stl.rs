//! STL file parser for binary and ASCII formats
use std::fs;
use std::path::Path;

use log::debug;
use nalgebra::Vector3;
use nom::{
    bytes::complete::tag,
    character::complete::{multispace0, multispace1, not_line_ending},
    multi::many0,
    number::complete::float,
    sequence::preceded,
    IResult,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::canvas::Color;
use crate::geometry::TriangleSurface;

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

#[derive(Error, Debug)]
pub enum StlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse ASCII STL: {0}")]
    Parse(String),
    #[error("Binary STL truncated: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },
}

/// One facet as stored in the file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Facet {
    pub normal: Vector3<f32>,
    pub vertices: [Vector3<f32>; 3],
}

/// How the loader assigns flat colors to facets
#[derive(Debug, Clone, PartialEq)]
pub enum ColorPolicy {
    /// Every facet gets the same color
    Uniform(Color),
    /// A new random color every `faces` facets, drawn from a seeded generator
    RandomEvery { faces: usize, seed: u64 },
}

impl Default for ColorPolicy {
    fn default() -> Self {
        ColorPolicy::Uniform(Color::new(0.0, 1.0, 1.0))
    }
}

impl ColorPolicy {
    /// Turn facets into triangles, in file order
    pub fn apply(&self, facets: &[Facet]) -> Vec<TriangleSurface> {
        let surface = |facet: &Facet, color: Color| {
            let [a, b, c] = facet.vertices;
            TriangleSurface::new(a, b, c, color)
        };

        match *self {
            ColorPolicy::Uniform(color) => facets.iter().map(|f| surface(f, color)).collect(),
            ColorPolicy::RandomEvery { faces, seed } => {
                let mut rng = StdRng::seed_from_u64(seed);
                let mut color = random_color(&mut rng);
                facets
                    .iter()
                    .enumerate()
                    .map(|(n, f)| {
                        if n > 0 && n % faces.max(1) == 0 {
                            color = random_color(&mut rng);
                        }
                        surface(f, color)
                    })
                    .collect()
            }
        }
    }
}

fn random_color<R: Rng>(rng: &mut R) -> Color {
    Color::new(rng.gen(), rng.gen(), rng.gen())
}

/// Read an STL file and color its facets with `policy`
pub fn load_stl<P: AsRef<Path>>(path: P, policy: &ColorPolicy) -> Result<Vec<TriangleSurface>, StlError> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    let facets = parse_stl(&data)?;
    debug!("loaded {} facets from '{}'", facets.len(), path.display());
    Ok(policy.apply(&facets))
}

fn read_f32(data: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}

fn read_vector(data: &[u8], offset: usize) -> Vector3<f32> {
    Vector3::new(
        read_f32(data, offset),
        read_f32(data, offset + 4),
        read_f32(data, offset + 8),
    )
}

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> Result<Vec<Facet>, StlError> {
    if data.len() < HEADER_LEN + 4 {
        return Err(StlError::Truncated {
            expected: HEADER_LEN + 4,
            found: data.len(),
        });
    }

    // Skip 80-byte header, then the little-endian triangle count
    let data = &data[HEADER_LEN..];
    let triangle_count = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
    let body = &data[4..];

    let expected = triangle_count * FACET_LEN;
    if body.len() < expected {
        return Err(StlError::Truncated {
            expected: HEADER_LEN + 4 + expected,
            found: HEADER_LEN + 4 + body.len(),
        });
    }

    // Each record: normal, three vertices, 2-byte attribute count
    let facets = body
        .chunks_exact(FACET_LEN)
        .take(triangle_count)
        .map(|record| Facet {
            normal: read_vector(record, 0),
            vertices: [
                read_vector(record, 12),
                read_vector(record, 24),
                read_vector(record, 36),
            ],
        })
        .collect();

    Ok(facets)
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> Result<Vec<Facet>, StlError> {
    match parse_ascii_stl_impl(input) {
        Ok((_, facets)) => Ok(facets),
        Err(e) => Err(StlError::Parse(format!("{:?}", e))),
    }
}

fn parse_ascii_stl_impl(input: &str) -> IResult<&str, Vec<Facet>> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _) = not_line_ending(input)?; // Optional name
    let (input, facets) = many0(parse_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    let (input, _) = not_line_ending(input)?;
    Ok((input, facets))
}

fn parse_facet(input: &str) -> IResult<&str, Facet> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, normal) = parse_vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, v1) = parse_vertex(input)?;
    let (input, v2) = parse_vertex(input)?;
    let (input, v3) = parse_vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((
        input,
        Facet {
            normal,
            vertices: [v1, v2, v3],
        },
    ))
}

fn parse_vertex(input: &str) -> IResult<&str, Vector3<f32>> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    parse_vector3(input)
}

fn parse_vector3(input: &str) -> IResult<&str, Vector3<f32>> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, Vector3::new(x, y, z)))
}

/// Detect and parse STL data (binary or ASCII)
pub fn parse_stl(data: &[u8]) -> Result<Vec<Facet>, StlError> {
    // Binary files may also start with "solid", so fall back when the
    // length matches the binary layout
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            match parse_ascii_stl(text) {
                Ok(facets) => return Ok(facets),
                Err(e) if !has_binary_length(data) => return Err(e),
                Err(_) => {}
            }
        }
    }

    parse_binary_stl(data)
}

/// True if `data` is exactly as long as its header's facet count implies
fn has_binary_length(data: &[u8]) -> bool {
    let Some(count) = data.get(HEADER_LEN..HEADER_LEN + 4) else {
        return false;
    };
    let count = u32::from_le_bytes([count[0], count[1], count[2], count[3]]) as usize;
    count
        .checked_mul(FACET_LEN)
        .and_then(|body| body.checked_add(HEADER_LEN + 4))
        .map_or(false, |expected| expected == data.len())
}
