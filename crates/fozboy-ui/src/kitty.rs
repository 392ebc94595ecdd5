//! Kitty graphics protocol transmitter.
//!
//! Sends a PNG to the terminal as a chunked APC sequence. Each escape
//! carries at most [`MAX_CHUNK`] payload bytes:
//! ```text
//! \x1b_Ga=T,f=100,c={cols},r={rows}[,m=1];{chunk}\x1b\\   first (or only)
//! \x1b_Gm=1;{chunk}\x1b\\                                  middle
//! \x1b_Gm=0;{chunk}\x1b\\                                  last
//! ```
//! Only the first escape carries the action, format and cell size; the
//! terminal appends later chunks until it sees `m=0`.
//!
//! Like the other inline image protocols, the escapes bypass ratatui's cell
//! buffer, so the caller writes them straight to the backend.

use std::io::{self, Write};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;

use fozboy_core::layout::ImagePlacement;

/// Largest payload a single kitty escape may carry.
pub const MAX_CHUNK: usize = 4096;

const APC_START: &[u8] = b"\x1b_G";
const ST: &[u8] = b"\x1b\\";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkPosition {
    /// The whole payload fits in one escape.
    Only,
    First,
    Middle,
    Last,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageChunk {
    pub position: ChunkPosition,
    pub payload: Vec<u8>,
}

/// An encoded image, ready to transmit. Built once per loaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFrame {
    cols: u16,
    rows: u16,
    chunks: Vec<ImageChunk>,
}

/// Split a base64 payload into protocol chunks sized for `cols` × `rows`
/// cells. An empty payload still yields one (empty) chunk.
pub fn encode_image(payload: &[u8], cols: u16, rows: u16) -> ImageFrame {
    let pieces: Vec<&[u8]> = if payload.is_empty() {
        vec![payload]
    } else {
        payload.chunks(MAX_CHUNK).collect()
    };

    let last = pieces.len() - 1;
    let chunks = pieces
        .into_iter()
        .enumerate()
        .map(|(i, piece)| {
            let position = match i {
                0 if last == 0 => ChunkPosition::Only,
                0 => ChunkPosition::First,
                i if i == last => ChunkPosition::Last,
                _ => ChunkPosition::Middle,
            };
            ImageChunk {
                position,
                payload: piece.to_vec(),
            }
        })
        .collect();

    ImageFrame { cols, rows, chunks }
}

impl ImageFrame {
    pub fn chunks(&self) -> &[ImageChunk] {
        &self.chunks
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// All chunk payloads joined back together.
    pub fn payload(&self) -> Vec<u8> {
        self.chunks
            .iter()
            .flat_map(|chunk| chunk.payload.iter().copied())
            .collect()
    }

    /// Serialize every chunk as its escape sequence, in order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let overhead = self.chunks.len() * 32;
        let mut out = Vec::with_capacity(self.payload_len() + overhead);
        for chunk in &self.chunks {
            out.extend_from_slice(APC_START);
            match chunk.position {
                ChunkPosition::Only => {
                    out.extend_from_slice(
                        format!("a=T,f=100,c={},r={}", self.cols, self.rows).as_bytes(),
                    );
                }
                ChunkPosition::First => {
                    out.extend_from_slice(
                        format!("a=T,f=100,c={},r={},m=1", self.cols, self.rows).as_bytes(),
                    );
                }
                ChunkPosition::Middle => out.extend_from_slice(b"m=1"),
                ChunkPosition::Last => out.extend_from_slice(b"m=0"),
            }
            out.push(b';');
            out.extend_from_slice(&chunk.payload);
            out.extend_from_slice(ST);
        }
        out
    }

    fn payload_len(&self) -> usize {
        self.chunks.iter().map(|chunk| chunk.payload.len()).sum()
    }
}

/// Move the cursor to `placement` and send `frame`.
///
/// The cursor escape and every chunk go out in a single `write_all` so no
/// frame render can interleave with the image.
pub fn transmit(
    writer: &mut impl Write,
    placement: ImagePlacement,
    frame: &ImageFrame,
) -> io::Result<()> {
    // 1-indexed for ANSI escape codes
    let mut out = format!("\x1b[{};{}H", placement.row + 1, placement.col + 1).into_bytes();
    out.extend_from_slice(&frame.to_bytes());
    writer.write_all(&out)?;
    writer.flush()
}

/// Delete every image the terminal is currently displaying.
pub fn clear_images(writer: &mut impl Write) -> io::Result<()> {
    writer.write_all(b"\x1b_Ga=d\x1b\\")?;
    writer.flush()
}

/// Check that `bytes` hold a PNG (format 100 is PNG only) and base64-encode
/// them for transmission.
pub fn png_payload(bytes: &[u8]) -> io::Result<Vec<u8>> {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => Ok(STANDARD.encode(bytes).into_bytes()),
        Ok(other) => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("expected a PNG image, found {:?}", other),
        )),
        Err(_) => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "unrecognized image format",
        )),
    }
}
