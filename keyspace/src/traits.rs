//! Traits for reading and writing the JSON documents keyspace works with.

use std::{
    fs::File,
    io::{BufRead, BufWriter, Cursor, Read, Write},
    path::Path,
};

use serde::Serialize;

use crate::error::Error;

/// A trait for parsing and writing one JSON document from/to one file.
///
/// # Example
///
/// ```rust,no_run
/// use keyspace::{source::CategoryFile, traits::Parser};
/// let file = CategoryFile::read_from("locales/en/common.json")?;
/// file.write_to("locales/en/common.copy.json")?;
/// Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Parser {
    /// Parse from any reader.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error>
    where
        Self: Sized;

    /// Parse from file path. A UTF-8 or UTF-16 byte order mark is honoured and stripped.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let file = File::open(path).map_err(Error::Io)?;
        let mut decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
            .bom_override(true)
            .build(file);

        let mut decoded = String::new();
        decoder.read_to_string(&mut decoded).map_err(Error::Io)?;

        Self::from_str(&decoded)
    }

    /// Write to any writer (file, memory, etc.).
    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error>;

    /// Write to file path, creating missing parent directories.
    fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        self.to_writer(writer)
    }

    /// Parse from a string.
    fn from_str(s: &str) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_reader(Cursor::new(s))
    }
}

/// Writes `value` as two-space indented JSON followed by a newline.
pub(crate) fn write_pretty_json<W: Write, T: Serialize>(
    mut writer: W,
    value: &T,
) -> Result<(), Error> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Writes `value` as compact single-line JSON.
pub(crate) fn write_compact_json<W: Write, T: Serialize>(
    mut writer: W,
    value: &T,
) -> Result<(), Error> {
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}
