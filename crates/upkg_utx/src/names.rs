//! Types for reading and writing the name table

use std::{
    borrow::Cow,
    io::{ErrorKind, Read, Seek, SeekFrom, Write},
};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use derive_more::derive::{Deref, Index, IntoIterator};
use tracing::{debug, instrument};

use crate::error::{Error, InvalidHeaderError, Result};
use crate::types::{PackageHeader, LENGTH_PREFIXED_NAMES};

/// Longest name an old style package may store, terminator included
pub const MAX_NAME_LEN: usize = 256;

/// Name table entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameEntry {
    /// The name exactly as stored in the package, terminator included
    pub raw: Vec<u8>,

    /// Object flags shared by every object using this name
    pub flags: u32,
}

impl NameEntry {
    /// Create an entry for `name`, adding the terminator the package stores
    pub fn new(name: &str, flags: u32) -> Self {
        let mut raw = Vec::with_capacity(name.len() + 1);
        raw.extend_from_slice(name.as_bytes());
        raw.push(0);
        Self { raw, flags }
    }

    /// The stored bytes up to the first terminator
    pub fn text(&self) -> &[u8] {
        let end = self
            .raw
            .iter()
            .position(|b| *b == 0)
            .unwrap_or(self.raw.len());
        &self.raw[..end]
    }

    /// The name, with invalid UTF-8 replaced
    pub fn name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.text())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for NameEntry {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("NameEntry", 2)?;
        state.serialize_field("name", &self.name())?;
        state.serialize_field("flags", &self.flags)?;
        state.end()
    }
}

/// The ordered names of a package
///
/// Exports and imports refer to names by their position in this table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, Index, IntoIterator)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[into_iterator(owned, ref)]
pub struct NameTable(Vec<NameEntry>);

impl NameTable {
    /// Read the name table declared by `header`
    ///
    /// Either every entry is read or no table is returned.
    #[instrument(skip_all, err, fields(count = header.name_count, offset = header.name_offset))]
    pub fn read<R: Read + Seek>(reader: &mut R, header: &PackageHeader) -> Result<NameTable> {
        Self::read_entries(reader, header)
            .map(NameTable)
            .map_err(Error::into_invalid_header)
    }

    fn read_entries<R: Read + Seek>(
        reader: &mut R,
        header: &PackageHeader,
    ) -> Result<Vec<NameEntry>> {
        reader.seek(SeekFrom::Start(header.name_offset.into()))?;

        let mut entries = Vec::new();
        entries.try_reserve_exact(header.name_count as usize)?;

        for index in 0..header.name_count as usize {
            let raw = read_name(reader, header.version).map_err(|e| {
                debug!(index, "failed to read name");
                match e {
                    Error::InvalidHeader(InvalidHeaderError::UnterminatedName { .. }) => {
                        InvalidHeaderError::UnterminatedName { index }.into()
                    }
                    other => other,
                }
            })?;
            let flags = reader.read_u32::<LittleEndian>()?;
            entries.push(NameEntry { raw, flags });
        }

        Ok(entries)
    }

    /// Look up a name by the index stored in an export or import
    pub fn lookup(&self, index: i32) -> Result<&NameEntry> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.0.get(i))
            .ok_or_else(|| {
                InvalidHeaderError::NameIndex {
                    index,
                    len: self.0.len(),
                }
                .into()
            })
    }

    /// Position of the first entry whose name is `name`
    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|e| e.text() == name.as_bytes())
    }

    pub fn into_inner(self) -> Vec<NameEntry> {
        self.0
    }
}

impl From<Vec<NameEntry>> for NameTable {
    fn from(value: Vec<NameEntry>) -> Self {
        NameTable(value)
    }
}

/// Read one name using the encoding of package `version`
///
/// Length prefixed names return exactly the stored bytes. Terminated names return the bytes up to
/// and including the terminator, or up to the end of the stream. A name read on its own reports
/// [`InvalidHeaderError::UnterminatedName`] with index 0, [`NameTable::read`] fills in the entry.
pub fn read_name<R: Read>(reader: &mut R, version: u16) -> Result<Vec<u8>> {
    if version >= LENGTH_PREFIXED_NAMES {
        let len = reader.read_u8()?;
        let mut name = vec![0; len as usize];
        reader.read_exact(&mut name)?;
        return Ok(name);
    }

    let mut scratch = [0u8; MAX_NAME_LEN];
    let mut len = 0;
    while len < MAX_NAME_LEN {
        let byte = match reader.read_u8() {
            Ok(byte) => byte,
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        };
        scratch[len] = byte;
        len += 1;
        if byte == 0 {
            break;
        }
    }

    if len == MAX_NAME_LEN && scratch[len - 1] != 0 {
        return Err(InvalidHeaderError::UnterminatedName { index: 0 }.into());
    }

    Ok(scratch[..len].to_vec())
}

/// Write one name using the encoding of package `version`
///
/// `raw` is written as is, callers provide the terminator.
pub fn write_name<W: Write>(writer: &mut W, raw: &[u8], version: u16) -> Result<()> {
    if version >= LENGTH_PREFIXED_NAMES {
        let len = u8::try_from(raw.len()).map_err(|_| {
            Error::CustomError(format!("name of {} bytes needs a length above 255", raw.len()))
        })?;
        writer.write_u8(len)?;
    } else if raw.len() > MAX_NAME_LEN {
        return Err(Error::CustomError(format!(
            "name of {} bytes is longer than {MAX_NAME_LEN}",
            raw.len()
        )));
    }
    writer.write_all(raw)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use std::io::{Cursor, Read};

    use byteorder::WriteBytesExt;
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use crate::error::{Error, InvalidHeaderError, Result};
    use crate::names::{read_name, NameEntry, NameTable, MAX_NAME_LEN};
    use crate::types::PackageHeader;

    #[test]
    fn old_style_stops_after_terminator() -> Result<()> {
        let mut input = Cursor::new(b"abc\0def\0".to_vec());

        assert_eq!(read_name(&mut input, 61)?, b"abc\0".to_vec());
        assert_eq!(input.position(), 4);

        Ok(())
    }

    #[test]
    fn old_style_without_terminator_at_end_of_stream() -> Result<()> {
        let mut input = Cursor::new(b"abc".to_vec());

        assert_eq!(read_name(&mut input, 63)?, b"abc".to_vec());

        Ok(())
    }

    #[test]
    fn old_style_unterminated() {
        let mut input = Cursor::new(vec![b'a'; MAX_NAME_LEN + 10]);

        assert!(matches!(
            read_name(&mut input, 62),
            Err(Error::InvalidHeader(InvalidHeaderError::UnterminatedName { index: 0 }))
        ));
    }

    #[test]
    fn old_style_terminator_in_last_slot() -> Result<()> {
        let mut bytes = vec![b'a'; MAX_NAME_LEN - 1];
        bytes.push(0);
        let mut input = Cursor::new(bytes.clone());

        assert_eq!(read_name(&mut input, 62)?, bytes);

        Ok(())
    }

    #[test]
    fn new_style_reads_length() -> Result<()> {
        let mut input = Cursor::new(vec![0x03, b'x', b'y', 0x00, 0xAA]);

        assert_eq!(read_name(&mut input, 69)?, b"xy\0".to_vec());

        let mut rest = Vec::new();
        input.read_to_end(&mut rest)?;
        assert_eq!(rest, vec![0xAA]);

        Ok(())
    }

    #[test]
    fn new_style_keeps_content_as_is() -> Result<()> {
        let mut input = Cursor::new(vec![0x03, 0x00, 0xFF, b'q']);

        assert_eq!(read_name(&mut input, 64)?, vec![0x00, 0xFF, b'q']);

        Ok(())
    }

    #[test]
    fn new_style_truncated() {
        let mut input = Cursor::new(vec![0x05, b'a', b'b']);

        assert!(read_name(&mut input, 69).is_err());
    }

    #[test]
    fn entry_text() {
        let entry = NameEntry::new("Texture", 0);
        assert_eq!(entry.raw, b"Texture\0".to_vec());
        assert_eq!(entry.text(), b"Texture");
        assert_eq!(entry.name(), "Texture");
    }

    fn header(version: u16, name_count: u32) -> PackageHeader {
        PackageHeader {
            version,
            name_count,
            name_offset: 4,
            ..Default::default()
        }
    }

    #[traced_test]
    #[test]
    fn read_table_at_offset() -> Result<()> {
        let mut bytes = vec![0xEE; 4];
        for (name, flags) in [(&b"None\0"[..], 0x10u32), (&b"Texture\0"[..], 0x20)] {
            bytes.write_u8(name.len() as u8)?;
            bytes.extend_from_slice(name);
            bytes.extend_from_slice(&flags.to_le_bytes());
        }

        let table = NameTable::read(&mut Cursor::new(bytes), &header(69, 2))?;

        assert_eq!(table.len(), 2);
        assert_eq!(table[0].name(), "None");
        assert_eq!(table[0].flags, 0x10);
        assert_eq!(table[1].name(), "Texture");
        assert_eq!(table.position("Texture"), Some(1));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn read_table_fails_as_a_whole() {
        let mut bytes = vec![0xEE; 4];
        bytes.extend_from_slice(b"first\0");
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&[b'z'; MAX_NAME_LEN]);

        let result = NameTable::read(&mut Cursor::new(bytes), &header(62, 3));

        assert!(matches!(
            result,
            Err(Error::InvalidHeader(InvalidHeaderError::UnterminatedName { index: 1 }))
        ));
    }

    /// Fails with `Interrupted` once before every byte it hands out
    struct Interrupting<R> {
        inner: R,
        interrupt: bool,
    }

    impl<R: Read> Read for Interrupting<R> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(std::io::ErrorKind::Interrupted.into());
            }
            let len = buf.len().min(1);
            self.inner.read(&mut buf[..len])
        }
    }

    #[test]
    fn old_style_retries_interrupted_reads() -> Result<()> {
        let mut input = Interrupting {
            inner: Cursor::new(b"Rock1\0tail".to_vec()),
            interrupt: false,
        };

        assert_eq!(read_name(&mut input, 62)?, b"Rock1\0".to_vec());

        Ok(())
    }

    #[traced_test]
    #[test]
    fn read_table_truncated_flags() {
        let mut bytes = vec![0xEE; 4];
        bytes.extend_from_slice(&[0x02, b'a', 0x00, 0x01]);

        let result = NameTable::read(&mut Cursor::new(bytes), &header(69, 1));

        assert!(matches!(
            result,
            Err(Error::InvalidHeader(InvalidHeaderError::Stream(_)))
        ));
    }

    #[test]
    fn lookup_is_bounds_checked() -> Result<()> {
        let table = NameTable::from(vec![NameEntry::new("None", 0)]);

        assert_eq!(table.lookup(0)?.name(), "None");
        assert!(matches!(
            table.lookup(1),
            Err(Error::InvalidHeader(InvalidHeaderError::NameIndex { index: 1, len: 1 }))
        ));
        assert!(matches!(
            table.lookup(-1),
            Err(Error::InvalidHeader(InvalidHeaderError::NameIndex { index: -1, .. }))
        ));

        Ok(())
    }
}
