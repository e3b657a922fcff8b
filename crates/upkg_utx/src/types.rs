//! Base types for structure of UTX packages.

use std::ops::RangeInclusive;

use binrw::{BinRead, BinWrite};
#[cfg(feature = "serde")]
use serde::Serialize;
use tracing::warn;

use crate::compact::CompactIndex;
use crate::error::InvalidHeaderError;
use crate::reference::ObjectRef;

/// Signature every Unreal package starts with
pub const PACKAGE_SIGNATURE: u32 = 0x9E2A83C1;

/// Versions written by Unreal (61-63) and Unreal Tournament (67-69)
pub const SUPPORTED_VERSIONS: RangeInclusive<u16> = 61..=69;

/// First version storing names with a length prefix
pub const LENGTH_PREFIXED_NAMES: u16 = 64;

/// Size in bytes of [`PackageHeader`] on disk
pub const HEADER_SIZE: u64 = 36;

/// Package header
///
/// Holds where the three tables live in the file. All data is stored in little endian format.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[brw(little)]
pub struct PackageHeader {
    /// Always [`PACKAGE_SIGNATURE`] for a valid package
    pub signature: u32,

    /// Format version of the package
    pub version: u16,

    /// Licensee specific mode, not interpreted
    pub license_mode: u16,

    /// Package flags, not interpreted
    pub flags: u32,

    /// The number of entries in the name table
    pub name_count: u32,

    /// The offset from the beginning of the file where the name table starts
    pub name_offset: u32,

    /// The number of entries in the export table
    pub export_count: u32,

    /// The offset from the beginning of the file where the export table starts
    pub export_offset: u32,

    /// The number of entries in the import table
    pub import_count: u32,

    /// The offset from the beginning of the file where the import table starts
    pub import_offset: u32,
}

impl Default for PackageHeader {
    fn default() -> Self {
        Self {
            signature: PACKAGE_SIGNATURE,
            version: 69,
            license_mode: Default::default(),
            flags: Default::default(),
            name_count: Default::default(),
            name_offset: HEADER_SIZE as u32,
            export_count: Default::default(),
            export_offset: HEADER_SIZE as u32,
            import_count: Default::default(),
            import_offset: HEADER_SIZE as u32,
        }
    }
}

impl PackageHeader {
    /// Checks the signature and version of the header
    pub fn check(&self) -> Result<(), InvalidHeaderError> {
        if self.signature != PACKAGE_SIGNATURE {
            warn!(signature = self.signature, "not an unreal package");
            return Err(InvalidHeaderError::Signature(self.signature));
        }
        if !SUPPORTED_VERSIONS.contains(&self.version) {
            warn!(version = self.version, "unsupported package version");
            return Err(InvalidHeaderError::Version(self.version));
        }
        Ok(())
    }

    /// Whether [`PackageHeader::check`] accepts this header
    pub fn is_valid(&self) -> bool {
        self.signature == PACKAGE_SIGNATURE && SUPPORTED_VERSIONS.contains(&self.version)
    }

    /// Whether names are stored with a length prefix rather than only a terminator
    pub fn has_length_prefixed_names(&self) -> bool {
        self.version >= LENGTH_PREFIXED_NAMES
    }
}

fn stored(reference: &ObjectRef) -> Result<i32, String> {
    reference
        .to_raw()
        .ok_or_else(|| format!("reference {reference} cannot be stored in a package"))
}

/// Export table entry
///
/// Describes an object defined by the package itself
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[brw(little)]
pub struct ExportEntry {
    /// Class of the object, [`ObjectRef::Null`] for classes themselves
    #[br(map = |c: CompactIndex| ObjectRef::resolve(c.0))]
    #[bw(try_map = |r: &ObjectRef| stored(r).map(CompactIndex))]
    pub class: ObjectRef,

    /// Parent class or struct
    #[br(map = |c: CompactIndex| ObjectRef::resolve(c.0))]
    #[bw(try_map = |r: &ObjectRef| stored(r).map(CompactIndex))]
    pub super_ref: ObjectRef,

    /// Group the object belongs to, stored as a plain 32-bit value
    pub group: u32,

    /// Index of the object's name in the name table
    #[br(map = |c: CompactIndex| c.0)]
    #[bw(map = |v: &i32| CompactIndex(*v))]
    pub object_name: i32,

    /// Object flags, not interpreted
    pub object_flags: u32,

    /// Size in bytes of the serialized object
    #[br(map = |c: CompactIndex| c.0)]
    #[bw(map = |v: &i32| CompactIndex(*v))]
    pub serial_size: i32,

    /// Offset from the start of the file to the serialized object
    #[br(map = |c: CompactIndex| c.0)]
    #[bw(map = |v: &i32| CompactIndex(*v))]
    pub serial_offset: i32,
}

impl ExportEntry {
    /// Interprets [`ExportEntry::group`] as an object reference
    pub fn group_ref(&self) -> ObjectRef {
        ObjectRef::resolve(self.group as i32)
    }
}

/// Import table entry
///
/// Describes an object the package uses from another package
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[brw(little)]
pub struct ImportEntry {
    /// Name index of the package holding the class, stored unresolved
    #[br(map = |c: CompactIndex| c.0)]
    #[bw(map = |v: &i32| CompactIndex(*v))]
    pub class_package: i32,

    /// Name index of the object's class, stored unresolved
    #[br(map = |c: CompactIndex| c.0)]
    #[bw(map = |v: &i32| CompactIndex(*v))]
    pub class_name: i32,

    /// Package the object lives in
    #[br(map = |raw: u32| ObjectRef::resolve(raw as i32))]
    #[bw(try_map = |r: &ObjectRef| stored(r).map(|raw| raw as u32))]
    pub package: ObjectRef,

    /// Index of the object's name in the name table
    #[br(map = |c: CompactIndex| c.0)]
    #[bw(map = |v: &i32| CompactIndex(*v))]
    pub object_name: i32,
}
