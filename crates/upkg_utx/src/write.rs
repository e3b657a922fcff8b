//! Types for writing UTX packages
//!

use binrw::BinWrite;
use bon::Builder;
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{Cursor, Seek, Write};
use tracing::instrument;

use crate::error::{Error, Result};
use crate::names::{write_name, NameEntry};
use crate::reference::ObjectRef;
use crate::types::{ExportEntry, ImportEntry, PackageHeader, HEADER_SIZE};

/// Options for how the package should be written
#[derive(Debug, Clone, Copy, Builder)]
pub struct PackageWriterOptions {
    /// The format version, which also selects how names are stored
    #[builder(default = 69)]
    pub version: u16,

    #[builder(default)]
    pub license_mode: u16,

    /// Package flags written as is
    #[builder(default)]
    pub flags: u32,
}

impl Default for PackageWriterOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// UTX package generator
///
/// Writes the header followed by the name, import and export tables. Object data is not written.
///
/// ```
/// # fn doit() -> upkg_utx::error::Result<()>
/// # {
/// use upkg_utx::write::{PackageWriter, PackageWriterOptions};
/// use upkg_utx::types::ExportEntry;
///
/// let mut package = PackageWriter::new(std::io::Cursor::new(Vec::new()), PackageWriterOptions::default());
///
/// let name = package.add_name("Texture", 0);
/// package.add_export(ExportEntry {
///     object_name: name,
///     ..Default::default()
/// });
///
/// let bytes = package.finish()?.into_inner();
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct PackageWriter<W: Write + Seek> {
    inner: W,
    options: PackageWriterOptions,
    names: Vec<NameEntry>,
    exports: Vec<ExportEntry>,
    imports: Vec<ImportEntry>,
}

impl<W: Write + Seek> PackageWriter<W> {
    pub fn new(inner: W, options: PackageWriterOptions) -> PackageWriter<W> {
        PackageWriter {
            inner,
            options,
            names: Vec::new(),
            exports: Vec::new(),
            imports: Vec::new(),
        }
    }

    /// Add `name` to the name table, returning its index.
    ///
    /// Adding a name twice returns the index of the first entry.
    pub fn add_name(&mut self, name: &str, flags: u32) -> i32 {
        let entry = NameEntry::new(name, flags);
        if let Some(index) = self.names.iter().position(|e| e.text() == entry.text()) {
            return index as i32;
        }
        self.names.push(entry);
        (self.names.len() - 1) as i32
    }

    /// Add a name entry exactly as given, without looking for duplicates
    pub fn add_raw_name(&mut self, entry: NameEntry) -> i32 {
        self.names.push(entry);
        (self.names.len() - 1) as i32
    }

    /// Add an export, returning a reference to it
    pub fn add_export(&mut self, export: ExportEntry) -> ObjectRef {
        self.exports.push(export);
        ObjectRef::Export((self.exports.len() - 1) as u32)
    }

    /// Add an import, returning a reference to it
    pub fn add_import(&mut self, import: ImportEntry) -> ObjectRef {
        self.imports.push(import);
        ObjectRef::Import((self.imports.len() - 1) as u32)
    }

    /// Write the header and all tables
    ///
    /// This will return the writer positioned after the last table.
    #[instrument(skip(self), err, fields(names = self.names.len(), exports = self.exports.len(), imports = self.imports.len()))]
    pub fn finish(mut self) -> Result<W> {
        let mut name_block = Vec::new();
        for entry in &self.names {
            write_name(&mut name_block, &entry.raw, self.options.version)?;
            name_block.write_u32::<LittleEndian>(entry.flags)?;
        }

        let mut import_block = Cursor::new(Vec::new());
        for import in &self.imports {
            import.write(&mut import_block)?;
        }
        let import_block = import_block.into_inner();

        let mut export_block = Cursor::new(Vec::new());
        for export in &self.exports {
            export.write(&mut export_block)?;
        }
        let export_block = export_block.into_inner();

        let name_offset = HEADER_SIZE as usize;
        let import_offset = name_offset + name_block.len();
        let export_offset = import_offset + import_block.len();

        let header = PackageHeader {
            version: self.options.version,
            license_mode: self.options.license_mode,
            flags: self.options.flags,
            name_count: count(self.names.len())?,
            name_offset: count(name_offset)?,
            export_count: count(self.exports.len())?,
            export_offset: count(export_offset)?,
            import_count: count(self.imports.len())?,
            import_offset: count(import_offset)?,
            ..Default::default()
        };

        header.write(&mut self.inner)?;
        self.inner.write_all(&name_block)?;
        self.inner.write_all(&import_block)?;
        self.inner.write_all(&export_block)?;

        Ok(self.inner)
    }
}

fn count(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::CustomError(format!("{value} does not fit in a package")))
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use crate::error::{Error, Result};
    use crate::read::Package;
    use crate::reference::ObjectRef;
    use crate::types::{ExportEntry, ImportEntry};
    use crate::write::{PackageWriter, PackageWriterOptions};
    use std::io::Cursor;

    #[traced_test]
    #[test]
    fn write_empty_package() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            0xC1, 0x83, 0x2A, 0x9E,
            0x45, 0x00,
            0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x24, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x24, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x24, 0x00, 0x00, 0x00,
        ];

        let package = PackageWriter::new(Cursor::new(Vec::new()), PackageWriterOptions::default());
        let actual = package.finish()?.into_inner();

        assert_eq!(actual, expected);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn write_old_style_names() -> Result<()> {
        let mut package = PackageWriter::new(
            Cursor::new(Vec::new()),
            PackageWriterOptions::builder().version(61).build(),
        );
        package.add_name("ab", 7);
        let actual = package.finish()?.into_inner();

        assert_eq!(&actual[36..], &[b'a', b'b', 0x00, 0x07, 0x00, 0x00, 0x00]);

        Ok(())
    }

    #[test]
    fn add_name_reuses_entries() {
        let mut package = PackageWriter::new(Cursor::new(Vec::new()), PackageWriterOptions::default());

        assert_eq!(package.add_name("None", 0), 0);
        assert_eq!(package.add_name("Texture", 0), 1);
        assert_eq!(package.add_name("None", 0), 0);
    }

    #[test]
    fn long_name_needs_old_style() {
        let mut package = PackageWriter::new(Cursor::new(Vec::new()), PackageWriterOptions::default());
        package.add_name(&"a".repeat(300), 0);

        assert!(matches!(package.finish(), Err(Error::CustomError(_))));
    }

    #[traced_test]
    #[test]
    fn unstorable_reference_fails_finish() {
        let mut package = PackageWriter::new(Cursor::new(Vec::new()), PackageWriterOptions::default());
        let none = package.add_name("None", 0);
        package.add_import(ImportEntry {
            package: ObjectRef::Import(u32::MAX),
            object_name: none,
            ..Default::default()
        });

        assert!(matches!(package.finish(), Err(Error::BinRWError(_))));
    }

    #[traced_test]
    #[test]
    fn written_package_reads_back() -> Result<()> {
        let mut writer = PackageWriter::new(Cursor::new(Vec::new()), PackageWriterOptions::default());
        let core = writer.add_name("Core", 0);
        let class = writer.add_name("Class", 0);
        let texture = writer.add_name("Texture", 0x0007_0010);
        let package_class = writer.add_name("Package", 0);
        let engine = writer.add_name("Engine", 0);

        let package_ref = writer.add_import(ImportEntry {
            class_package: core,
            class_name: package_class,
            package: ObjectRef::Null,
            object_name: engine,
        });
        let class_ref = writer.add_import(ImportEntry {
            class_package: core,
            class_name: class,
            package: package_ref,
            object_name: texture,
        });
        writer.add_export(ExportEntry {
            class: class_ref,
            object_name: texture,
            object_flags: 0x0007_0004,
            serial_size: 300,
            serial_offset: 100_000,
            ..Default::default()
        });

        let bytes = writer.finish()?.into_inner();
        let package = Package::read(&mut Cursor::new(bytes))?;

        assert_eq!(package.names().len(), 5);
        assert_eq!(package.imports().len(), 2);
        assert_eq!(package.imports()[1].package, ObjectRef::Import(0));
        assert_eq!(package.exports()[0].class, ObjectRef::Import(1));
        assert_eq!(package.exports()[0].serial_offset, 100_000);
        assert_eq!(package.texture_exports()?, vec![0]);

        Ok(())
    }
}
