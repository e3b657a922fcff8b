//! Types for reading UTX packages
//!

use std::{
    fs::File,
    io::{BufReader, Read, Seek, SeekFrom},
    path::Path,
};

use binrw::BinRead;
use derive_more::derive::{Deref, Index, IntoIterator};
use tracing::{debug, instrument, trace};

use crate::{
    error::{Error, Result},
    names::{NameEntry, NameTable},
    types::{ExportEntry, ImportEntry, PackageHeader},
};

/// Name of the class whose exports are reported by [`Package::texture_exports`]
pub const TEXTURE_NAME: &str = "Texture";

fn read_entries<R, T>(reader: &mut R, offset: u32, count: u32) -> Result<Vec<T>>
where
    R: Read + Seek,
    T: for<'a> BinRead<Args<'a> = ()>,
{
    reader.seek(SeekFrom::Start(offset.into()))?;

    let mut entries = Vec::new();
    entries.try_reserve_exact(count as usize)?;

    for _ in 0..count {
        entries.push(T::read_le(reader)?);
    }

    Ok(entries)
}

/// The objects defined by a package
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, Index, IntoIterator)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[into_iterator(owned, ref)]
pub struct ExportTable(Vec<ExportEntry>);

impl ExportTable {
    /// Read the export table declared by `header`
    #[instrument(skip_all, err, fields(count = header.export_count, offset = header.export_offset))]
    pub fn read<R: Read + Seek>(reader: &mut R, header: &PackageHeader) -> Result<ExportTable> {
        read_entries(reader, header.export_offset, header.export_count)
            .map(ExportTable)
            .map_err(Error::into_invalid_header)
    }
}

impl From<Vec<ExportEntry>> for ExportTable {
    fn from(value: Vec<ExportEntry>) -> Self {
        ExportTable(value)
    }
}

/// The objects a package uses from other packages
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, Index, IntoIterator)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[into_iterator(owned, ref)]
pub struct ImportTable(Vec<ImportEntry>);

impl ImportTable {
    /// Read the import table declared by `header`
    #[instrument(skip_all, err, fields(count = header.import_count, offset = header.import_offset))]
    pub fn read<R: Read + Seek>(reader: &mut R, header: &PackageHeader) -> Result<ImportTable> {
        read_entries(reader, header.import_offset, header.import_count)
            .map(ImportTable)
            .map_err(Error::into_invalid_header)
    }
}

impl From<Vec<ImportEntry>> for ImportTable {
    fn from(value: Vec<ImportEntry>) -> Self {
        ImportTable(value)
    }
}

/// UTX package reader
///
/// ```no_run
/// use std::io::prelude::*;
///
/// fn list_exports(mut reader: impl Read + Seek) -> upkg_utx::error::Result<()> {
///     let package = upkg_utx::Package::read(&mut reader)?;
///
///     for export in package.exports() {
///         println!("{} ({})", package.name_of(export.object_name)?.name(), export.class);
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Package {
    header: PackageHeader,
    names: NameTable,
    exports: ExportTable,
    imports: ImportTable,
}

impl Package {
    /// Read the header and the name, export and import tables of a package.
    ///
    /// The reader is left wherever the last table ended.
    #[instrument(skip_all, err)]
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Package> {
        let header = PackageHeader::read(reader).map_err(|e| Error::from(e).into_invalid_header())?;
        header.check()?;
        debug!(
            version = header.version,
            names = header.name_count,
            exports = header.export_count,
            imports = header.import_count,
            "read package header"
        );

        let names = NameTable::read(reader, &header)?;
        let exports = ExportTable::read(reader, &header)?;
        let imports = ImportTable::read(reader, &header)?;

        Ok(Package {
            header,
            names,
            exports,
            imports,
        })
    }

    pub fn header(&self) -> &PackageHeader {
        &self.header
    }

    pub fn names(&self) -> &NameTable {
        &self.names
    }

    pub fn exports(&self) -> &ExportTable {
        &self.exports
    }

    pub fn imports(&self) -> &ImportTable {
        &self.imports
    }

    /// Get the name stored at `index` of the name table
    pub fn name_of(&self, index: i32) -> Result<&NameEntry> {
        self.names.lookup(index)
    }

    /// Positions of the exports named [`TEXTURE_NAME`]
    pub fn texture_exports(&self) -> Result<Vec<usize>> {
        let mut found = Vec::new();
        for (i, export) in self.exports.iter().enumerate() {
            if self.name_of(export.object_name)?.text() == TEXTURE_NAME.as_bytes() {
                trace!(export = i, "found texture export");
                found.push(i);
            }
        }
        Ok(found)
    }
}

/// The asset a package is loaded into
pub trait LoadTarget {
    /// Called once after the package structure has been read completely
    fn finalize(&mut self) -> Result<()>;
}

impl<T: LoadTarget + ?Sized> LoadTarget for &mut T {
    fn finalize(&mut self) -> Result<()> {
        (**self).finalize()
    }
}

/// What a successful load found in the package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LoadSummary {
    pub version: u16,
    pub names: usize,
    pub exports: usize,
    pub imports: usize,
    /// Positions in the export table of texture exports
    pub texture_exports: Vec<usize>,
}

/// Load a package from `reader` into `target`.
///
/// The parsed tables are dropped before [`LoadTarget::finalize`] is called, which only happens if
/// the whole structure could be read. Without a target nothing is read and
/// [`Error::IllegalOperation`] is returned.
#[instrument(skip_all, err)]
pub fn load_utx<R, T>(reader: &mut R, target: Option<&mut T>) -> Result<LoadSummary>
where
    R: Read + Seek,
    T: LoadTarget + ?Sized,
{
    let Some(target) = target else {
        return Err(Error::IllegalOperation);
    };

    let package = Package::read(reader)?;
    let summary = LoadSummary {
        version: package.header.version,
        names: package.names.len(),
        exports: package.exports.len(),
        imports: package.imports.len(),
        texture_exports: package.texture_exports()?,
    };
    drop(package);

    target.finalize()?;
    Ok(summary)
}

/// Load a package from an already opened reader, restoring its position afterwards
pub fn load_utx_from<R, T>(reader: &mut R, target: Option<&mut T>) -> Result<LoadSummary>
where
    R: Read + Seek,
    T: LoadTarget + ?Sized,
{
    let start = reader.stream_position()?;
    let result = load_utx(reader, target);
    let restored = reader.seek(SeekFrom::Start(start));

    let summary = result?;
    restored?;
    Ok(summary)
}

/// Open the package at `path` and load it
pub fn load_utx_path<T>(path: impl AsRef<Path>, target: Option<&mut T>) -> Result<LoadSummary>
where
    T: LoadTarget + ?Sized,
{
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::CouldNotOpen {
        path: path.to_path_buf(),
        source,
    })?;

    load_utx(&mut BufReader::new(file), target)
}
