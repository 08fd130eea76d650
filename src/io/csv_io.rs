// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of writing analysis results into csv files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::analysis::gofr::GofrSet;
use crate::analysis::record::FrameRecord;
use crate::errors::WriteCsvError;

/// Streaming writer for per-frame result rows.
///
/// The header is emitted once, before the first row. Fields missing from a
/// record are written as empty cells; fields a record holds but the whitelist
/// does not name are dropped.
#[derive(Debug)]
pub struct FrameCsvWriter {
    writer: BufWriter<File>,
    path: Box<Path>,
    fields: Vec<&'static str>,
    with_filename: bool,
    header_written: bool,
}

impl FrameCsvWriter {
    /// Create the destination file, truncating any previous content.
    pub fn create(
        path: impl AsRef<Path>,
        fields: Vec<&'static str>,
        with_filename: bool,
    ) -> Result<Self, WriteCsvError> {
        let file = File::create(&path)
            .map_err(|_| WriteCsvError::CouldNotCreate(Box::from(path.as_ref())))?;

        Ok(FrameCsvWriter {
            writer: BufWriter::new(file),
            path: Box::from(path.as_ref()),
            fields,
            with_filename,
            header_written: false,
        })
    }

    /// Get the path of the destination file.
    pub fn get_path(&self) -> &Path {
        &self.path
    }

    fn write_header(&mut self) -> Result<(), std::io::Error> {
        if self.with_filename {
            write!(self.writer, "filename,")?;
        }
        write!(self.writer, "timestep")?;
        for field in &self.fields {
            write!(self.writer, ",{}", field)?;
        }
        writeln!(self.writer)
    }

    /// Append the given records and flush the underlying file.
    pub fn write_records(&mut self, records: &[FrameRecord]) -> Result<(), WriteCsvError> {
        self.write_records_inner(records)
            .map_err(|_| WriteCsvError::CouldNotWrite(self.path.clone()))
    }

    fn write_records_inner(&mut self, records: &[FrameRecord]) -> Result<(), std::io::Error> {
        if !self.header_written {
            self.write_header()?;
            self.header_written = true;
        }

        for record in records {
            if self.with_filename {
                write!(self.writer, "{},", record.get_source().unwrap_or(""))?;
            }
            write!(self.writer, "{}", record.get_timestep())?;

            for field in &self.fields {
                match record.get_value(field) {
                    Some(value) => write!(self.writer, ",{}", value)?,
                    None => write!(self.writer, ",")?,
                }
            }
            writeln!(self.writer)?;
        }

        self.writer.flush()
    }
}

/// Write the finalized radial distribution functions as a csv table,
/// overwriting any previous version of the file.
///
/// The first column holds the bin centres, followed by one column per
/// channel that has accumulated at least one frame. Returns the names of
/// the channels that were left out because they never accumulated a frame.
pub fn write_gofr_table(
    path: impl AsRef<Path>,
    set: &GofrSet,
) -> Result<Vec<&'static str>, WriteCsvError> {
    let file = File::create(&path)
        .map_err(|_| WriteCsvError::CouldNotCreate(Box::from(path.as_ref())))?;
    let mut writer = BufWriter::new(file);

    let mut finalized = Vec::new();
    let mut skipped = Vec::new();
    for channel in set.channels_iter() {
        match channel.finalize() {
            Some(g) => finalized.push((channel.get_name(), g)),
            None => skipped.push(channel.get_name()),
        }
    }

    write_gofr_inner(&mut writer, set, &finalized)
        .map_err(|_| WriteCsvError::CouldNotWrite(Box::from(path.as_ref())))?;

    Ok(skipped)
}

fn write_gofr_inner(
    writer: &mut impl Write,
    set: &GofrSet,
    finalized: &[(&'static str, ndarray::Array1<f64>)],
) -> Result<(), std::io::Error> {
    write!(writer, "gofr_r")?;
    for (name, _) in finalized {
        write!(writer, ",{}", name)?;
    }
    writeln!(writer)?;

    for (i, r) in set.bin_centres().iter().enumerate() {
        write!(writer, "{}", r)?;
        for (_, g) in finalized {
            write!(writer, ",{}", g[i])?;
        }
        writeln!(writer)?;
    }

    writer.flush()
}
