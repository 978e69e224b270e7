//! Built-in gateway for TI calculator files.
//!
//! Only the headers are interpreted: the signature, the comment of regular
//! files and the leading FLASH header of flash files.  The raw bytes are kept
//! so a parsed file is written back unchanged.
//!
//! Regular file layouts (all integers little-endian):
//!
//! | family | signature | marker | folder | comment | rest |
//! |--------|-----------|--------|--------|---------|------|
//! | Z80 (73/82/83/85/86) | 8 B | 3 B | – | 42 B | u16 data length, data |
//! | 68k (89/92) | 8 B | 2 B | 8 B | 40 B | variable table, data |
//!
//! Flash header: `**TIFL**`, revision major/minor, flags, object type,
//! 4-byte BCD date, name length, 8-byte name, 23 filler bytes, device type,
//! data type, 24 filler bytes, u32 data length, data.

use std::fs;
use std::io::{self, Cursor, Read};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use thiserror::Error;

use crate::classify::Category;
use crate::gateway::ContentGateway;
use crate::platform::Platform;

pub const FLASH_SIGNATURE: &[u8; 8] = b"**TIFL**";
const SIGNATURE_LEN: usize = 8;

const Z80_COMMENT_OFFSET: usize = 11;
const Z80_COMMENT_LEN:    usize = 42;
const K68_COMMENT_OFFSET: usize = 18;
const K68_COMMENT_LEN:    usize = 40;
const FLASH_HEADER_LEN:   usize = 78;

#[derive(Error, Debug)]
pub enum TiFileError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("not a TI file (signature {0:?})")]
    BadSignature(String),
    #[error("truncated file: need {needed} bytes, have {actual}")]
    Truncated { needed: usize, actual: usize },
}

// ── Regular ──────────────────────────────────────────────────────────────────

/// A regular (variable group / single variable) file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegularContent {
    pub platform: Platform,
    pub comment:  String,
    raw:          Vec<u8>,
}

impl RegularContent {
    /// Build a single-payload file for `platform`.
    ///
    /// The fields are read back from the serialised header, so models that
    /// share a signature come back as the base model and the comment is cut
    /// to the header's field width.
    pub fn new(platform: Platform, comment: &str, payload: &[u8]) -> Result<Self, TiFileError> {
        let sig = platform.signature().ok_or_else(|| TiFileError::BadSignature("none".into()))?;
        let mut raw = Vec::with_capacity(64 + payload.len());
        raw.extend_from_slice(sig);
        if platform.is_68k() {
            raw.extend_from_slice(&[0x01, 0x00]);
            raw.extend_from_slice(b"main\0\0\0\0");
            raw.extend_from_slice(&fixed_field(comment, K68_COMMENT_LEN));
            raw.extend_from_slice(payload);
        } else {
            let marker = if matches!(platform, Platform::Ti85 | Platform::Ti86) { 0x0C } else { 0x0A };
            raw.extend_from_slice(&[0x1A, marker, 0x00]);
            raw.extend_from_slice(&fixed_field(comment, Z80_COMMENT_LEN));
            let len = u16::try_from(payload.len())
                .map_err(|_| TiFileError::Truncated { needed: u16::MAX as usize, actual: payload.len() })?;
            raw.extend_from_slice(&len.to_le_bytes());
            raw.extend_from_slice(payload);
        }
        Self::from_bytes(raw)
    }

    pub fn from_bytes(raw: Vec<u8>) -> Result<Self, TiFileError> {
        let platform = Platform::from_signature(signature(&raw)?);
        if platform == Platform::None {
            return Err(TiFileError::BadSignature(String::from_utf8_lossy(&raw[..SIGNATURE_LEN]).into_owned()));
        }
        let (offset, len) = if platform.is_68k() {
            (K68_COMMENT_OFFSET, K68_COMMENT_LEN)
        } else {
            (Z80_COMMENT_OFFSET, Z80_COMMENT_LEN)
        };
        need(&raw, offset + len)?;
        let comment = c_string(&raw[offset..offset + len]);

        if !platform.is_68k() {
            let mut rdr = Cursor::new(&raw[offset + len..]);
            let data_len = rdr.read_u16::<LittleEndian>()
                .map_err(|_| TiFileError::Truncated { needed: offset + len + 2, actual: raw.len() })?;
            need(&raw, offset + len + 2 + data_len as usize)?;
        }
        Ok(Self { platform, comment, raw })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }
}

// ── Flash ────────────────────────────────────────────────────────────────────

/// A flash application or operating system image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashContent {
    pub revision:    (u8, u8),
    pub object_type: u8,
    pub name:        String,
    pub device_type: u8,
    pub data_type:   u8,
    pub data_len:    u32,
    raw:             Vec<u8>,
}

impl FlashContent {
    /// Build a single-part flash image.
    pub fn new(name: &str, device_type: u8, data_type: u8, data: &[u8]) -> Self {
        let mut raw = Vec::with_capacity(FLASH_HEADER_LEN + data.len());
        raw.extend_from_slice(FLASH_SIGNATURE);
        raw.extend_from_slice(&[1, 0, 0, 0]);          // revision 1.0, flags, object type
        raw.extend_from_slice(&[0x01, 0x01, 0x20, 0x06]); // 01/01/2006, BCD
        let name_field = fixed_field(name, 8);
        raw.push(name.len().min(8) as u8);
        raw.extend_from_slice(&name_field);
        raw.extend_from_slice(&[0u8; 23]);
        raw.push(device_type);
        raw.push(data_type);
        raw.extend_from_slice(&[0u8; 24]);
        raw.extend_from_slice(&(data.len() as u32).to_le_bytes());
        raw.extend_from_slice(data);
        Self {
            revision: (1, 0),
            object_type: 0,
            name: c_string(&name_field),
            device_type,
            data_type,
            data_len: data.len() as u32,
            raw,
        }
    }

    pub fn from_bytes(raw: Vec<u8>) -> Result<Self, TiFileError> {
        let sig = signature(&raw)?;
        if sig != FLASH_SIGNATURE {
            return Err(TiFileError::BadSignature(String::from_utf8_lossy(sig).into_owned()));
        }
        need(&raw, FLASH_HEADER_LEN)?;

        let mut rdr = Cursor::new(&raw[SIGNATURE_LEN..FLASH_HEADER_LEN]);
        let major       = rdr.read_u8()?;
        let minor       = rdr.read_u8()?;
        let _flags      = rdr.read_u8()?;
        let object_type = rdr.read_u8()?;
        let _date       = rdr.read_u32::<LittleEndian>()?;
        let name_len    = rdr.read_u8()? as usize;
        let mut name    = [0u8; 8];
        rdr.read_exact(&mut name)?;
        rdr.set_position(rdr.position() + 23);
        let device_type = rdr.read_u8()?;
        let data_type   = rdr.read_u8()?;
        rdr.set_position(rdr.position() + 24);
        let data_len    = rdr.read_u32::<LittleEndian>()?;

        need(&raw, FLASH_HEADER_LEN + data_len as usize)?;
        Ok(Self {
            revision: (major, minor),
            object_type,
            name: c_string(&name[..name_len.min(8)]),
            device_type,
            data_type,
            data_len,
            raw,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }
}

// ── Gateway ──────────────────────────────────────────────────────────────────

/// [`ContentGateway`] for TI-73 … V200 files.
#[derive(Debug, Clone, Copy, Default)]
pub struct TiFiles;

impl ContentGateway for TiFiles {
    type Regular = RegularContent;
    type Flash   = FlashContent;
    type Error   = TiFileError;

    fn classify(&self, staged: &Path) -> Category {
        let mut sig = [0u8; SIGNATURE_LEN];
        let read = fs::File::open(staged).and_then(|mut f| f.read_exact(&mut sig));
        match read {
            Ok(()) if &sig == FLASH_SIGNATURE => Category::Flash,
            Ok(()) if Platform::from_signature(&sig) != Platform::None => Category::Regular,
            _ => Category::Unrecognized,
        }
    }

    fn platform(&self, staged: &Path) -> Platform {
        match Platform::from_extension(staged) {
            Platform::None => {
                let mut sig = [0u8; SIGNATURE_LEN];
                fs::File::open(staged)
                    .and_then(|mut f| f.read_exact(&mut sig))
                    .map(|_| Platform::from_signature(&sig))
                    .unwrap_or(Platform::None)
            }
            p => p,
        }
    }

    fn read_regular(&self, staged: &Path) -> Result<RegularContent, TiFileError> {
        RegularContent::from_bytes(fs::read(staged)?)
    }

    fn read_flash(&self, staged: &Path) -> Result<FlashContent, TiFileError> {
        FlashContent::from_bytes(fs::read(staged)?)
    }

    fn write_regular(&self, content: &RegularContent, staged: &Path) -> Result<(), TiFileError> {
        fs::write(staged, &content.raw)?;
        Ok(())
    }

    fn write_flash(&self, content: &FlashContent, staged: &Path) -> Result<(), TiFileError> {
        fs::write(staged, &content.raw)?;
        Ok(())
    }
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn signature(raw: &[u8]) -> Result<&[u8], TiFileError> {
    need(raw, SIGNATURE_LEN)?;
    Ok(&raw[..SIGNATURE_LEN])
}

fn need(raw: &[u8], needed: usize) -> Result<(), TiFileError> {
    if raw.len() < needed {
        return Err(TiFileError::Truncated { needed, actual: raw.len() });
    }
    Ok(())
}

fn c_string(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

fn fixed_field(s: &str, len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    let bytes = s.as_bytes();
    let n = bytes.len().min(len);
    out[..n].copy_from_slice(&bytes[..n]);
    out
}
