/*
This code is part of the FlowNet drainage-network analysis library.
Created: 19/03/2025
Last Modified: 21/07/2025
License: MIT
*/

use super::{DomainMask, RiverNetwork};
use crate::error::{FlowError, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

const MAGIC: &[u8; 8] = b"FLOWNET\0";

/// The JSON header at the front of a precomputed network blob. The binary
/// payload that follows is fixed-order little-endian: downstream, levels,
/// the packed mask bits, sources, sinks.
#[derive(Serialize, Deserialize)]
struct BlobHeader {
    version: String,
    rows: usize,
    cols: usize,
    n_nodes: usize,
    n_sources: usize,
    n_sinks: usize,
}

/// The format version is the library's major.minor; a patch release must
/// stay able to read its own blobs.
fn format_version() -> String {
    env!("CARGO_PKG_VERSION")
        .split('.')
        .take(2)
        .collect::<Vec<_>>()
        .join(".")
}

/// Writes a built network to an opaque binary blob.
pub fn save_network<P: AsRef<Path>>(net: &RiverNetwork, path: P) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writer.write_all(MAGIC)?;

    let (rows, cols) = net.shape();
    let header = BlobHeader {
        version: format_version(),
        rows,
        cols,
        n_nodes: net.n_nodes(),
        n_sources: net.sources().len(),
        n_sinks: net.sinks().len(),
    };
    let header_bytes =
        serde_json::to_vec(&header).map_err(|e| FlowError::InvalidBlob(e.to_string()))?;
    writer.write_u32::<LittleEndian>(header_bytes.len() as u32)?;
    writer.write_all(&header_bytes)?;

    for &d in net.downstream() {
        writer.write_u64::<LittleEndian>(d as u64)?;
    }
    for &l in net.levels() {
        writer.write_u64::<LittleEndian>(l as u64)?;
    }
    write_packed_bits(&mut writer, net.mask().cells())?;
    for &s in net.sources() {
        writer.write_u64::<LittleEndian>(s as u64)?;
    }
    for &s in net.sinks() {
        writer.write_u64::<LittleEndian>(s as u64)?;
    }

    writer.flush()?;
    Ok(())
}

/// Reads a network blob written by [`save_network`], rejecting unknown
/// magic and mismatched format versions. The group index is rebuilt from
/// the stored levels.
pub fn load_network<P: AsRef<Path>>(path: P) -> Result<RiverNetwork> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut magic = [0u8; 8];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(FlowError::InvalidBlob("bad magic bytes".to_string()));
    }

    let header_len = reader.read_u32::<LittleEndian>()? as usize;
    let mut header_bytes = vec![0u8; header_len];
    reader.read_exact(&mut header_bytes)?;
    let header: BlobHeader = serde_json::from_slice(&header_bytes)
        .map_err(|e| FlowError::InvalidBlob(e.to_string()))?;

    let expected = format_version();
    if header.version != expected {
        return Err(FlowError::UnsupportedVersion {
            expected,
            found: header.version,
        });
    }

    let downstream = read_u64_array(&mut reader, header.n_nodes)?;
    let levels = read_u64_array(&mut reader, header.n_nodes)?;
    let cells = read_packed_bits(&mut reader, header.rows * header.cols)?;
    let sources = read_u64_array(&mut reader, header.n_sources)?;
    let sinks = read_u64_array(&mut reader, header.n_sinks)?;

    let mask = DomainMask::new(header.rows, header.cols, cells)?;
    RiverNetwork::assemble(downstream, levels, sources, sinks, mask)
}

fn write_packed_bits<W: Write>(writer: &mut W, bits: &[bool]) -> Result<()> {
    let mut byte = 0u8;
    for (i, &bit) in bits.iter().enumerate() {
        if bit {
            byte |= 1 << (i % 8);
        }
        if i % 8 == 7 {
            writer.write_u8(byte)?;
            byte = 0;
        }
    }
    if bits.len() % 8 != 0 {
        writer.write_u8(byte)?;
    }
    Ok(())
}

fn read_packed_bits<R: Read>(reader: &mut R, count: usize) -> Result<Vec<bool>> {
    let n_bytes = (count + 7) / 8;
    let mut bytes = vec![0u8; n_bytes];
    reader.read_exact(&mut bytes)?;
    Ok((0..count).map(|i| bytes[i / 8] & (1 << (i % 8)) != 0).collect())
}

fn read_u64_array<R: Read>(reader: &mut R, count: usize) -> Result<Vec<usize>> {
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(reader.read_u64::<LittleEndian>()? as usize);
    }
    Ok(values)
}

#[cfg(test)]
mod test {
    use super::{load_network, save_network};
    use crate::error::FlowError;
    use crate::testdata::network4x5;
    use std::fs;
    use std::io::Write;

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.flownet");
        let net = network4x5();
        save_network(&net, &path).unwrap();
        let loaded = load_network(&path).unwrap();
        assert_eq!(loaded.n_nodes(), net.n_nodes());
        assert_eq!(loaded.downstream(), net.downstream());
        assert_eq!(loaded.levels(), net.levels());
        assert_eq!(loaded.sources(), net.sources());
        assert_eq!(loaded.sinks(), net.sinks());
        assert_eq!(loaded.mask(), net.mask());
        assert_eq!(loaded.groups(), net.groups());
    }

    #[test]
    fn test_bad_magic_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.flownet");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"NOTANETWORKBLOB!").unwrap();
        drop(file);
        assert!(matches!(
            load_network(&path),
            Err(FlowError::InvalidBlob(_))
        ));
    }

    #[test]
    fn test_version_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.flownet");
        save_network(&network4x5(), &path).unwrap();
        // tamper with the version string inside the JSON header
        let mut bytes = fs::read(&path).unwrap();
        let needle = br#""version":""#;
        let pos = bytes
            .windows(needle.len())
            .position(|w| w == needle)
            .unwrap()
            + needle.len();
        bytes[pos] = b'9';
        fs::write(&path, &bytes).unwrap();
        assert!(matches!(
            load_network(&path),
            Err(FlowError::UnsupportedVersion { .. })
        ));
    }
}
