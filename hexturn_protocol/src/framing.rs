// Length-delimited framing for relay messages.
//
// Wire format: a 4-byte big-endian length prefix followed by the message
// `Node` serialized as JSON. `write_frame`/`read_frame` move raw payloads;
// `write_node`/`read_node` add the JSON step on top.
//
// `MAX_FRAME_SIZE` caps a single frame so a corrupt or hostile length prefix
// cannot force a huge allocation. Turn data and whiteboard payloads are the
// largest frames seen in practice and stay far below it.

use std::io::{self, Read, Write};

use crate::node::Node;

/// Maximum allowed frame size (16 MB).
pub const MAX_FRAME_SIZE: u32 = 16 * 1024 * 1024;

/// Write one frame: 4-byte big-endian length, then payload.
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> io::Result<()> {
    let len = u32::try_from(payload.len())
        .ok()
        .filter(|len| *len <= MAX_FRAME_SIZE)
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "frame too large: {} bytes (max {MAX_FRAME_SIZE})",
                    payload.len()
                ),
            )
        })?;
    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(payload)?;
    writer.flush()
}

/// Read one frame.
///
/// Returns `UnexpectedEof` if the stream ends before or inside a frame and
/// `InvalidData` if the length prefix exceeds `MAX_FRAME_SIZE`.
pub fn read_frame<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_FRAME_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame too large: {len} bytes (max {MAX_FRAME_SIZE})"),
        ));
    }
    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// Serialize `node` to JSON and write it as one frame.
pub fn write_node<W: Write>(writer: &mut W, node: &Node) -> io::Result<()> {
    let json = serde_json::to_vec(node).map_err(io::Error::other)?;
    write_frame(writer, &json)
}

/// Read one frame and parse it as a `Node`. A frame that is not a valid
/// node yields `InvalidData`.
pub fn read_node<R: Read>(reader: &mut R) -> io::Result<Node> {
    let bytes = read_frame(reader)?;
    serde_json::from_slice(&bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
