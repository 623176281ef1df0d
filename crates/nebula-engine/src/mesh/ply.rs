use std::io::Cursor;

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};

use super::{IndexedMesh, MeshError, MeshVertex};

const FORMAT: &str = "PLY";

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Encoding {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum ScalarType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl ScalarType {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "char" | "int8" => ScalarType::I8,
            "uchar" | "uint8" => ScalarType::U8,
            "short" | "int16" => ScalarType::I16,
            "ushort" | "uint16" => ScalarType::U16,
            "int" | "int32" => ScalarType::I32,
            "uint" | "uint32" => ScalarType::U32,
            "float" | "float32" => ScalarType::F32,
            "double" | "float64" => ScalarType::F64,
            _ => return None,
        })
    }

    fn size(self) -> usize {
        match self {
            ScalarType::I8 | ScalarType::U8 => 1,
            ScalarType::I16 | ScalarType::U16 => 2,
            ScalarType::I32 | ScalarType::U32 | ScalarType::F32 => 4,
            ScalarType::F64 => 8,
        }
    }

    fn is_integer(self) -> bool {
        !matches!(self, ScalarType::F32 | ScalarType::F64)
    }
}

#[derive(Debug, Clone)]
enum PropertyKind {
    Scalar(ScalarType),
    List { count: ScalarType, item: ScalarType },
}

#[derive(Debug, Clone)]
struct Property {
    name: String,
    kind: PropertyKind,
}

#[derive(Debug, Clone)]
struct Element {
    name: String,
    count: usize,
    properties: Vec<Property>,
}

impl Element {
    /// Smallest number of body bytes one entry can occupy.
    fn min_entry_len(&self, encoding: Encoding) -> usize {
        let len: usize = match encoding {
            // one character per value, separators aside
            Encoding::Ascii => self.properties.len(),
            Encoding::BinaryLittleEndian | Encoding::BinaryBigEndian => self
                .properties
                .iter()
                .map(|p| match p.kind {
                    PropertyKind::Scalar(ty) => ty.size(),
                    PropertyKind::List { count, .. } => count.size(),
                })
                .sum(),
        };
        len.max(1)
    }

    /// Preallocation for this element's entries, bounded by what the
    /// remaining body could actually hold.
    fn capacity(&self, encoding: Encoding, body_len: usize) -> usize {
        self.count.min(body_len / self.min_entry_len(encoding))
    }

    fn position(&self, names: &[&str]) -> Option<usize> {
        self.properties
            .iter()
            .position(|p| names.contains(&p.name.as_str()))
    }
}

#[derive(Debug)]
struct Header {
    encoding: Encoding,
    elements: Vec<Element>,
    /// Offset of the first body byte.
    body_offset: usize,
}

/// Parses a PLY file with a `vertex` and a `face` element.
///
/// Faces with more than three indices are fan-triangulated.
pub(crate) fn parse(bytes: &[u8]) -> Result<IndexedMesh, MeshError> {
    let header = parse_header(bytes)?;
    let body = &bytes[header.body_offset..];

    let mut reader = match header.encoding {
        Encoding::Ascii => {
            let text = std::str::from_utf8(body)
                .map_err(|e| MeshError::body(FORMAT, format!("ASCII body is not valid UTF-8: {e}")))?;
            BodyReader::Ascii(text.split_ascii_whitespace())
        }
        Encoding::BinaryLittleEndian => BodyReader::LittleEndian(Cursor::new(body)),
        Encoding::BinaryBigEndian => BodyReader::BigEndian(Cursor::new(body)),
    };

    let mut vertices = Vec::new();
    let mut faces: Vec<Vec<u64>> = Vec::new();

    for element in &header.elements {
        let capacity = element.capacity(header.encoding, body.len());
        match element.name.as_str() {
            "vertex" => vertices = read_vertices(element, capacity, &mut reader)?,
            "face" => faces = read_faces(element, capacity, &mut reader)?,
            _ => skip_element(element, &mut reader)?,
        }
    }

    let vertex_count = vertices.len();
    let mut indices = Vec::with_capacity(faces.len() * 3);
    for (face, corners) in faces.iter().enumerate() {
        if let Some(&index) = corners.iter().find(|&&i| i >= vertex_count as u64) {
            return Err(MeshError::IndexOutOfRange {
                face,
                index,
                vertex_count,
            });
        }
        // fan: (0, i, i + 1)
        for pair in corners[1..].windows(2) {
            indices.extend([corners[0] as u32, pair[0] as u32, pair[1] as u32]);
        }
    }

    Ok(IndexedMesh { vertices, indices })
}

fn parse_header(bytes: &[u8]) -> Result<Header, MeshError> {
    let mut encoding = None;
    let mut elements: Vec<Element> = Vec::new();
    let mut offset = 0;
    let mut line_no = 0;

    loop {
        let rest = &bytes[offset..];
        let Some(len) = rest.iter().position(|&b| b == b'\n') else {
            return Err(MeshError::header(FORMAT, line_no + 1, "missing `end_header`"));
        };
        line_no += 1;
        let raw = &rest[..len];
        offset += len + 1;

        let line = std::str::from_utf8(raw)
            .map_err(|_| MeshError::header(FORMAT, line_no, "header is not valid UTF-8"))?
            .trim_end_matches('\r');
        let mut tokens = line.split_whitespace();
        let keyword = tokens.next().unwrap_or("");

        if line_no == 1 {
            if line.trim() != "ply" {
                return Err(MeshError::header(FORMAT, line_no, "missing `ply` magic"));
            }
            continue;
        }

        match keyword {
            "" | "comment" | "obj_info" => {}
            "format" => {
                let enc = match tokens.next() {
                    Some("ascii") => Encoding::Ascii,
                    Some("binary_little_endian") => Encoding::BinaryLittleEndian,
                    Some("binary_big_endian") => Encoding::BinaryBigEndian,
                    other => {
                        return Err(MeshError::header(
                            FORMAT,
                            line_no,
                            format!("unknown format `{}`", other.unwrap_or("")),
                        ));
                    }
                };
                if tokens.next() != Some("1.0") {
                    return Err(MeshError::header(FORMAT, line_no, "unsupported version"));
                }
                encoding = Some(enc);
            }
            "element" => {
                let (Some(name), Some(count)) = (tokens.next(), tokens.next()) else {
                    return Err(MeshError::header(FORMAT, line_no, "element needs a name and a count"));
                };
                let count = count.parse().map_err(|_| {
                    MeshError::header(FORMAT, line_no, format!("bad element count `{count}`"))
                })?;
                elements.push(Element {
                    name: name.to_owned(),
                    count,
                    properties: Vec::new(),
                });
            }
            "property" => {
                let Some(element) = elements.last_mut() else {
                    return Err(MeshError::header(FORMAT, line_no, "property before any element"));
                };
                let property = parse_property(&mut tokens)
                    .map_err(|msg| MeshError::header(FORMAT, line_no, msg))?;
                element.properties.push(property);
            }
            "end_header" => break,
            other => {
                return Err(MeshError::header(
                    FORMAT,
                    line_no,
                    format!("unexpected keyword `{other}`"),
                ));
            }
        }
    }

    let encoding =
        encoding.ok_or_else(|| MeshError::header(FORMAT, line_no, "missing `format` line"))?;

    let vertex = elements
        .iter()
        .find(|e| e.name == "vertex")
        .ok_or_else(|| MeshError::header(FORMAT, line_no, "missing `vertex` element"))?;
    for axis in ["x", "y", "z"] {
        if vertex.position(&[axis]).is_none() {
            return Err(MeshError::header(
                FORMAT,
                line_no,
                format!("vertex element has no `{axis}` property"),
            ));
        }
    }

    let face = elements
        .iter()
        .find(|e| e.name == "face")
        .ok_or_else(|| MeshError::header(FORMAT, line_no, "missing `face` element"))?;
    match face_index_property(face).map(|i| &face.properties[i].kind) {
        Some(PropertyKind::List { item, .. }) if item.is_integer() => {}
        Some(_) => {
            return Err(MeshError::header(FORMAT, line_no, "face indices must be an integer list"));
        }
        None => {
            return Err(MeshError::header(FORMAT, line_no, "face element has no `vertex_indices` list"));
        }
    }

    Ok(Header {
        encoding,
        elements,
        body_offset: offset,
    })
}

fn parse_property<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Result<Property, String> {
    let ty = tokens.next().ok_or("property needs a type")?;
    let kind = if ty == "list" {
        let count = tokens.next().ok_or("list property needs a count type")?;
        let item = tokens.next().ok_or("list property needs an item type")?;
        let count = ScalarType::parse(count).ok_or_else(|| format!("unknown type `{count}`"))?;
        if !count.is_integer() {
            return Err("list count type must be an integer".into());
        }
        PropertyKind::List {
            count,
            item: ScalarType::parse(item).ok_or_else(|| format!("unknown type `{item}`"))?,
        }
    } else {
        PropertyKind::Scalar(ScalarType::parse(ty).ok_or_else(|| format!("unknown type `{ty}`"))?)
    };
    let name = tokens.next().ok_or("property needs a name")?;
    Ok(Property {
        name: name.to_owned(),
        kind,
    })
}

fn face_index_property(face: &Element) -> Option<usize> {
    face.position(&["vertex_indices", "vertex_index"])
}

enum BodyReader<'a> {
    Ascii(std::str::SplitAsciiWhitespace<'a>),
    LittleEndian(Cursor<&'a [u8]>),
    BigEndian(Cursor<&'a [u8]>),
}

impl BodyReader<'_> {
    fn read(&mut self, ty: ScalarType) -> Result<f64, MeshError> {
        match self {
            BodyReader::Ascii(tokens) => {
                let token = tokens
                    .next()
                    .ok_or_else(|| MeshError::body(FORMAT, "unexpected end of data"))?;
                let value = if ty.is_integer() {
                    token.parse::<i64>().map(|v| v as f64).ok()
                } else {
                    token.parse::<f64>().ok()
                };
                value.ok_or_else(|| MeshError::body(FORMAT, format!("bad value `{token}`")))
            }
            BodyReader::LittleEndian(cursor) => read_binary::<LittleEndian>(cursor, ty),
            BodyReader::BigEndian(cursor) => read_binary::<BigEndian>(cursor, ty),
        }
    }

    fn read_list(&mut self, count: ScalarType, item: ScalarType) -> Result<Vec<f64>, MeshError> {
        let len = self.read(count)?;
        if len < 0.0 {
            return Err(MeshError::body(FORMAT, format!("negative list length {len}")));
        }
        let len = len as usize;
        // the length is untrusted; grow as items arrive
        let mut items = Vec::with_capacity(len.min(64));
        for _ in 0..len {
            items.push(self.read(item)?);
        }
        Ok(items)
    }

    fn read_property(&mut self, kind: &PropertyKind) -> Result<PropertyValue, MeshError> {
        Ok(match kind {
            PropertyKind::Scalar(ty) => PropertyValue::Scalar(self.read(*ty)?),
            PropertyKind::List { count, item } => PropertyValue::List(self.read_list(*count, *item)?),
        })
    }
}

fn read_binary<B: ByteOrder>(cursor: &mut Cursor<&[u8]>, ty: ScalarType) -> Result<f64, MeshError> {
    let start = cursor.position() as usize;
    let value = match ty {
        ScalarType::I8 => cursor.read_i8().map(f64::from),
        ScalarType::U8 => cursor.read_u8().map(f64::from),
        ScalarType::I16 => cursor.read_i16::<B>().map(f64::from),
        ScalarType::U16 => cursor.read_u16::<B>().map(f64::from),
        ScalarType::I32 => cursor.read_i32::<B>().map(f64::from),
        ScalarType::U32 => cursor.read_u32::<B>().map(f64::from),
        ScalarType::F32 => cursor.read_f32::<B>().map(f64::from),
        ScalarType::F64 => cursor.read_f64::<B>(),
    };
    value.map_err(|_| MeshError::Truncated {
        format: FORMAT,
        needed: start + ty.size(),
        available: cursor.get_ref().len(),
    })
}

enum PropertyValue {
    Scalar(f64),
    List(Vec<f64>),
}

fn read_vertices(
    element: &Element,
    capacity: usize,
    reader: &mut BodyReader<'_>,
) -> Result<Vec<MeshVertex>, MeshError> {
    // Destination slot in the 8-float vertex for each property, if any.
    let slots: Vec<Option<usize>> = element
        .properties
        .iter()
        .map(|p| match p.name.as_str() {
            "x" => Some(0),
            "y" => Some(1),
            "z" => Some(2),
            "nx" => Some(3),
            "ny" => Some(4),
            "nz" => Some(5),
            "s" | "u" | "texture_u" => Some(6),
            "t" | "v" | "texture_v" => Some(7),
            _ => None,
        })
        .collect();

    let mut vertices = Vec::with_capacity(capacity);
    for _ in 0..element.count {
        let mut attrs = [0.0f32; 8];
        for (property, slot) in element.properties.iter().zip(&slots) {
            let value = reader.read_property(&property.kind)?;
            if let (Some(slot), PropertyValue::Scalar(v)) = (slot, value) {
                attrs[*slot] = v as f32;
            }
        }
        vertices.push(MeshVertex {
            position: [attrs[0], attrs[1], attrs[2]],
            normal: [attrs[3], attrs[4], attrs[5]],
            tex_coord: [attrs[6], attrs[7]],
        });
    }
    Ok(vertices)
}

fn read_faces(
    element: &Element,
    capacity: usize,
    reader: &mut BodyReader<'_>,
) -> Result<Vec<Vec<u64>>, MeshError> {
    let index_slot = face_index_property(element);

    let mut faces = Vec::with_capacity(capacity);
    for face in 0..element.count {
        let mut corners = None;
        for (i, property) in element.properties.iter().enumerate() {
            let value = reader.read_property(&property.kind)?;
            match value {
                PropertyValue::List(items) if Some(i) == index_slot => corners = Some(items),
                _ => {}
            }
        }

        let corners = corners.unwrap_or_default();
        if corners.len() < 3 {
            return Err(MeshError::body(
                FORMAT,
                format!("face {face} has {} indices, expected at least 3", corners.len()),
            ));
        }
        let corners = corners
            .into_iter()
            .map(|v| {
                if v < 0.0 {
                    Err(MeshError::body(FORMAT, format!("face {face} has negative index {v}")))
                } else {
                    Ok(v as u64)
                }
            })
            .collect::<Result<Vec<u64>, MeshError>>()?;
        faces.push(corners);
    }
    Ok(faces)
}

fn skip_element(element: &Element, reader: &mut BodyReader<'_>) -> Result<(), MeshError> {
    log::debug!("skipping PLY element `{}` ({} entries)", element.name, element.count);
    for _ in 0..element.count {
        for property in &element.properties {
            reader.read_property(&property.kind)?;
        }
    }
    Ok(())
}
