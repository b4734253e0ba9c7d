//! Decoding of the stored v2 payload: base64 text wrapping an optionally
//! gzipped protobuf release.

use std::io::Read;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use flate2::read::GzDecoder;
use prost::Message;

// Records written before Tiller grew compression are plain protobuf after
// the base64 layer, so the gzip magic decides.
const GZIP_MAGIC: [u8; 3] = [0x1f, 0x8b, 0x08];

pub fn decode_release(payload: &str) -> Result<hapi::Release> {
    let raw = STANDARD
        .decode(payload.trim())
        .context("base64-decoding record payload")?;
    let proto = if raw.len() > GZIP_MAGIC.len() && raw[..GZIP_MAGIC.len()] == GZIP_MAGIC {
        let mut buf = Vec::new();
        GzDecoder::new(raw.as_slice())
            .read_to_end(&mut buf)
            .context("decompressing record payload")?;
        buf
    } else {
        raw
    };
    hapi::Release::decode(proto.as_slice()).context("parsing release protobuf")
}
