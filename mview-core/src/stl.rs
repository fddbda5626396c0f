/// STL decoder for binary and ASCII files
use nalgebra::{Point3, Vector3};
use nom::{
    bytes::complete::tag,
    character::complete::{multispace0, multispace1, not_line_ending},
    multi::{count, many0},
    number::complete::{float, le_f32, le_u16, le_u32},
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::StlError;
use crate::geometry::{Mesh, Triangle, Vertex};

const HEADER_LEN: usize = 80;
const RECORD_LEN: usize = 50;

/// Builds a triangle, recomputing the normal when the file stores a zero one.
fn facet(normal: Vector3<f32>, corners: [Vector3<f32>; 3]) -> Triangle {
    let [a, b, c] = corners.map(Point3::from);
    let normal = if normal.norm_squared() > f32::EPSILON {
        normal.normalize()
    } else {
        (b - a)
            .cross(&(c - a))
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    };

    Triangle::new(
        Vertex::new(a, normal),
        Vertex::new(b, normal),
        Vertex::new(c, normal),
    )
}

fn binary_vector(input: &[u8]) -> IResult<&[u8], Vector3<f32>> {
    let (input, (x, y, z)) = tuple((le_f32, le_f32, le_f32))(input)?;
    Ok((input, Vector3::new(x, y, z)))
}

fn binary_facet(input: &[u8]) -> IResult<&[u8], Triangle> {
    let (input, normal) = binary_vector(input)?;
    let (input, corners) = count(binary_vector, 3)(input)?;
    let (input, _attribute_bytes) = le_u16(input)?;
    Ok((input, facet(normal, [corners[0], corners[1], corners[2]])))
}

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> Result<Mesh, StlError> {
    if data.len() < HEADER_LEN + 4 {
        return Err(StlError::TooShort(data.len()));
    }

    let body = &data[HEADER_LEN..];
    let (records, declared) = le_u32::<_, nom::error::Error<&[u8]>>(body)
        .map_err(|_| StlError::TooShort(data.len()))?;
    let declared = declared as usize;
    let available = records.len() / RECORD_LEN;

    if available < declared {
        return Err(StlError::Truncated {
            declared,
            available,
        });
    }

    let (_, triangles) = count(binary_facet, declared)(records).map_err(|_| {
        StlError::Truncated {
            declared,
            available,
        }
    })?;

    Ok(Mesh { triangles })
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> Result<Mesh, StlError> {
    match ascii_solid(input) {
        Ok((_, mesh)) => Ok(mesh),
        Err(err) => Err(ascii_error(input, err)),
    }
}

fn ascii_error(input: &str, err: nom::Err<nom::error::Error<&str>>) -> StlError {
    match err {
        nom::Err::Incomplete(_) => StlError::Ascii("unexpected end of input".to_owned()),
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let offset = input.len() - e.input.len();
            let line = input[..offset].matches('\n').count() + 1;
            StlError::Ascii(format!("line {}: unexpected input ({:?})", line, e.code))
        }
    }
}

fn ascii_solid(input: &str) -> IResult<&str, Mesh> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _name) = not_line_ending(input)?;
    let (input, triangles) = many0(ascii_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    let (input, _name) = not_line_ending(input)?;
    let (input, _) = multispace0(input)?;

    Ok((input, Mesh { triangles }))
}

fn ascii_facet(input: &str) -> IResult<&str, Triangle> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, normal) = ascii_vector(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, a) = ascii_vertex(input)?;
    let (input, b) = ascii_vertex(input)?;
    let (input, c) = ascii_vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((input, facet(normal, [a, b, c])))
}

fn ascii_vertex(input: &str) -> IResult<&str, Vector3<f32>> {
    preceded(preceded(multispace0, tag("vertex")), ascii_vector)(input)
}

fn ascii_vector(input: &str) -> IResult<&str, Vector3<f32>> {
    let (input, x) = preceded(multispace1, float)(input)?;
    let (input, y) = preceded(multispace1, float)(input)?;
    let (input, z) = preceded(multispace1, float)(input)?;
    Ok((input, Vector3::new(x, y, z)))
}

/// Detect and parse an STL file.
///
/// Binary files may also start with `solid`, so a failed ASCII parse falls
/// back to the binary decoder.
pub fn parse_stl(data: &[u8]) -> Result<Mesh, StlError> {
    let ascii = match std::str::from_utf8(data) {
        Ok(text) if text.trim_start().starts_with("solid") => Some(parse_ascii_stl(text)),
        _ => None,
    };

    match ascii {
        Some(Ok(mesh)) => Ok(mesh),
        Some(Err(ascii_err)) => parse_binary_stl(data).map_err(|_| ascii_err),
        None => parse_binary_stl(data),
    }
}
