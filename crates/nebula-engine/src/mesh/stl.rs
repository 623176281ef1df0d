use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use super::{FlatMesh, MeshError, Triangle};

const FORMAT: &str = "STL";
const HEADER_LEN: usize = 80;
/// Header + u32 triangle count.
const PREAMBLE_LEN: usize = HEADER_LEN + 4;
/// normal (12) + 3 vertices (36) + attribute byte count (2).
const RECORD_LEN: usize = 50;

/// Parses binary or ASCII STL. Facet normals are discarded.
pub(crate) fn parse(bytes: &[u8]) -> Result<FlatMesh, MeshError> {
    if is_binary(bytes) {
        parse_binary(bytes)
    } else {
        parse_ascii(bytes)
    }
}

/// Binary files may also start with "solid", so an exact size match wins.
fn is_binary(bytes: &[u8]) -> bool {
    if let Some(count) = declared_count(bytes) {
        let expected = (count as u64)
            .checked_mul(RECORD_LEN as u64)
            .and_then(|n| n.checked_add(PREAMBLE_LEN as u64));
        if expected == Some(bytes.len() as u64) {
            return true;
        }
    }
    !bytes.trim_ascii_start().starts_with(b"solid")
}

fn declared_count(bytes: &[u8]) -> Option<u32> {
    let mut cursor = Cursor::new(bytes.get(HEADER_LEN..)?);
    cursor.read_u32::<LittleEndian>().ok()
}

fn parse_binary(bytes: &[u8]) -> Result<FlatMesh, MeshError> {
    let count = declared_count(bytes).ok_or(MeshError::Truncated {
        format: FORMAT,
        needed: PREAMBLE_LEN,
        available: bytes.len(),
    })? as usize;

    let needed = count
        .checked_mul(RECORD_LEN)
        .and_then(|n| n.checked_add(PREAMBLE_LEN))
        .ok_or_else(|| MeshError::body(FORMAT, format!("triangle count {count} overflows")))?;
    if bytes.len() < needed {
        return Err(MeshError::Truncated {
            format: FORMAT,
            needed,
            available: bytes.len(),
        });
    }

    let mut cursor = Cursor::new(&bytes[PREAMBLE_LEN..needed]);
    let mut triangles = Vec::with_capacity(count);
    for index in 0..count {
        let triangle = read_record(&mut cursor)
            .map_err(|e| MeshError::body(FORMAT, format!("triangle {index}: {e}")))?;
        triangles.push(triangle);
    }

    Ok(FlatMesh { triangles })
}

fn read_record(cursor: &mut Cursor<&[u8]>) -> std::io::Result<Triangle> {
    // facet normal, unused
    for _ in 0..3 {
        cursor.read_f32::<LittleEndian>()?;
    }
    let mut vertices = [[0.0f32; 3]; 3];
    for v in &mut vertices {
        for c in v.iter_mut() {
            *c = cursor.read_f32::<LittleEndian>()?;
        }
    }
    // attribute byte count
    cursor.read_u16::<LittleEndian>()?;
    Ok(Triangle { vertices })
}

fn parse_ascii(bytes: &[u8]) -> Result<FlatMesh, MeshError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| MeshError::body(FORMAT, format!("ASCII STL is not valid UTF-8: {e}")))?;

    let mut triangles = Vec::new();
    let mut facet: Option<Vec<[f32; 3]>> = None;
    let mut seen_solid = false;
    let mut seen_end = false;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };

        if seen_end {
            return Err(MeshError::header(FORMAT, line_no, "content after `endsolid`"));
        }

        match keyword {
            "solid" if !seen_solid => seen_solid = true,
            _ if !seen_solid => {
                return Err(MeshError::header(FORMAT, line_no, "expected `solid`"));
            }
            "facet" => {
                if facet.is_some() {
                    return Err(MeshError::header(FORMAT, line_no, "nested `facet`"));
                }
                facet = Some(Vec::with_capacity(3));
            }
            "outer" | "endloop" => {
                if facet.is_none() {
                    return Err(MeshError::header(
                        FORMAT,
                        line_no,
                        format!("`{keyword}` outside a facet"),
                    ));
                }
            }
            "vertex" => {
                let Some(verts) = facet.as_mut() else {
                    return Err(MeshError::header(FORMAT, line_no, "`vertex` outside a facet"));
                };
                let mut v = [0.0f32; 3];
                for c in &mut v {
                    let token = tokens.next().ok_or_else(|| {
                        MeshError::header(FORMAT, line_no, "vertex needs three coordinates")
                    })?;
                    *c = token.parse().map_err(|_| {
                        MeshError::header(FORMAT, line_no, format!("bad coordinate `{token}`"))
                    })?;
                }
                verts.push(v);
            }
            "endfacet" => {
                let verts = facet.take().ok_or_else(|| {
                    MeshError::header(FORMAT, line_no, "`endfacet` without `facet`")
                })?;
                let vertices: [[f32; 3]; 3] = verts.try_into().map_err(|v: Vec<[f32; 3]>| {
                    MeshError::header(
                        FORMAT,
                        line_no,
                        format!("facet has {} vertices, expected 3", v.len()),
                    )
                })?;
                triangles.push(Triangle { vertices });
            }
            "endsolid" => {
                if facet.is_some() {
                    return Err(MeshError::header(FORMAT, line_no, "unterminated facet"));
                }
                seen_end = true;
            }
            other => {
                return Err(MeshError::header(
                    FORMAT,
                    line_no,
                    format!("unexpected keyword `{other}`"),
                ));
            }
        }
    }

    if !seen_end {
        return Err(MeshError::body(FORMAT, "missing `endsolid`"));
    }

    Ok(FlatMesh { triangles })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary(triangles: &[[[f32; 3]; 3]], header: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0u8; HEADER_LEN];
        bytes[..header.len()].copy_from_slice(header);
        bytes.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
        for tri in triangles {
            bytes.extend_from_slice(&[0u8; 12]);
            for v in tri {
                for c in v {
                    bytes.extend_from_slice(&c.to_le_bytes());
                }
            }
            bytes.extend_from_slice(&[0u8; 2]);
        }
        bytes
    }

    const TRI_A: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
    const TRI_B: [[f32; 3]; 3] = [[-1.5, 2.0, 3.25], [4.0, -5.0, 6.0], [7.0, 8.0, -9.0]];

    #[test]
    fn binary_yields_declared_triangles() {
        let bytes = binary(&[TRI_A, TRI_B, TRI_A], b"exported by a tool");
        let mesh = parse(&bytes).unwrap();
        assert_eq!(mesh.triangles.len(), 3);
        assert_eq!(mesh.triangles[1].vertices, TRI_B);
    }

    #[test]
    fn binary_with_solid_header_is_still_binary() {
        let bytes = binary(&[TRI_B], b"solid logo");
        let mesh = parse(&bytes).unwrap();
        assert_eq!(mesh.triangles, vec![Triangle { vertices: TRI_B }]);
    }

    #[test]
    fn binary_truncated_body() {
        let mut bytes = binary(&[TRI_A, TRI_B], b"");
        bytes.truncate(bytes.len() - 10);
        match parse(&bytes).unwrap_err() {
            MeshError::Truncated { needed, available, .. } => {
                assert_eq!(needed, PREAMBLE_LEN + 2 * RECORD_LEN);
                assert_eq!(available, needed - 10);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn binary_shorter_than_preamble() {
        assert!(matches!(
            parse(&[0u8; 20]).unwrap_err(),
            MeshError::Truncated { .. }
        ));
    }

    const ASCII: &str = "solid cube_side
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 1 1 0
    endloop
  endfacet
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 1 0
      vertex 0 1 -2.5e-1
    endloop
  endfacet
endsolid cube_side
";

    #[test]
    fn ascii_yields_every_facet() {
        let mesh = parse(ASCII.as_bytes()).unwrap();
        assert_eq!(mesh.triangles.len(), 2);
        assert_eq!(mesh.triangles[1].vertices[2], [0.0, 1.0, -0.25]);
    }

    #[test]
    fn ascii_facet_with_two_vertices() {
        let src = "solid s\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\nvertex 1 0 0\nendloop\nendfacet\nendsolid s\n";
        match parse(src.as_bytes()).unwrap_err() {
            MeshError::Header { line, message, .. } => {
                assert_eq!(line, 7);
                assert!(message.contains("2 vertices"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn ascii_bad_coordinate() {
        let src = "solid s\nfacet normal 0 0 1\nouter loop\nvertex 0 x 0\n";
        assert!(matches!(
            parse(src.as_bytes()).unwrap_err(),
            MeshError::Header { line: 4, .. }
        ));
    }

    #[test]
    fn ascii_missing_endsolid() {
        let src = "solid s\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\nvertex 1 0 0\nvertex 0 1 0\nendloop\nendfacet\n";
        assert!(matches!(
            parse(src.as_bytes()).unwrap_err(),
            MeshError::Body { .. }
        ));
    }
}
