//! This library handles reading the structure of **UTX** texture packages used by *Unreal* and
//! *Unreal Tournament*.
//!
//! # UTX Package Format Documentation
//!
//! A UTX file is an Unreal package: a header followed by a name table, an export table and an
//! import table, plus the serialized objects they describe. This crate reads the tables, which is
//! enough to locate the objects inside the package. Object data itself is not decoded.
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Signature              | 4 bytes: 0x9E2A83C1                                        |
//! | 0x0004         | Version                | 2 bytes: 61-63 for Unreal, 67-69 for Unreal Tournament     |
//! | 0x0006         | License Mode           | 2 bytes: Licensee specific                                 |
//! | 0x0008         | Flags                  | 4 bytes: Package flags                                     |
//! | 0x000C         | Name Count             | 4 bytes: Number of entries in the name table               |
//! | 0x0010         | Name Offset            | 4 bytes: Offset to the name table                          |
//! | 0x0014         | Export Count           | 4 bytes: Number of entries in the export table             |
//! | 0x0018         | Export Offset          | 4 bytes: Offset to the export table                        |
//! | 0x001C         | Import Count           | 4 bytes: Number of entries in the import table             |
//! | 0x0020         | Import Offset          | 4 bytes: Offset to the import table                        |
//!
//! All offsets are absolute. The tables may appear in any order and need not be adjacent.
//!
//! ### Compact Integers
//!
//! Most indices inside the tables are stored as compact integers, a signed encoding using 1 to 5
//! bytes. See [`compact`] for the bit layout.
//!
//! ### Object References
//!
//! A reference is a signed integer: `0` is null, `-n` is entry `n - 1` of the import table and `n`
//! is entry `n - 1` of the export table. See [`ObjectRef`].
//!
//! ### Name Table
//!
//! Each entry is a name followed by 4 bytes of flags. Before version 64 a name is a string ending
//! in a zero byte, at most 256 bytes long. From version 64 on it is prefixed by one length byte
//! which counts the terminator.
//!
//! ### Export Table
//!
//! | Field         | Encoding         | Description                                        |
//! |---------------|------------------|----------------------------------------------------|
//! | Class         | compact          | Reference to the object's class                    |
//! | Super         | compact          | Reference to the parent class or struct            |
//! | Group         | 4 bytes          | Group the object belongs to                        |
//! | Object Name   | compact          | Index into the name table                          |
//! | Object Flags  | 4 bytes          | Object flags                                       |
//! | Serial Size   | compact          | Size of the serialized object                      |
//! | Serial Offset | compact          | Offset to the serialized object                    |
//!
//! ### Import Table
//!
//! | Field         | Encoding         | Description                                        |
//! |---------------|------------------|----------------------------------------------------|
//! | Class Package | compact          | Name index of the class's package                  |
//! | Class Name    | compact          | Name index of the class                            |
//! | Package       | 4 bytes          | Reference to the package holding the object        |
//! | Object Name   | compact          | Index into the name table                          |
//!
//! ## Additional Information
//!
//! - **File Extension**: `.utx` (also `.u`, `.unr` and other packages share the layout)
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod compact;
pub mod error;
pub mod names;
pub mod read;
pub mod reference;
pub mod types;
pub mod write;

pub use read::{load_utx, load_utx_from, load_utx_path, LoadSummary, LoadTarget, Package};
pub use reference::ObjectRef;
pub use write::PackageWriter;
