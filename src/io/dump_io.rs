// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of a streaming reader for LAMMPS dump files.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::errors::ParseDumpError;
use crate::structures::{atom::Atom, frame::Frame, simbox::SimBox};

/// Header prefix introducing the time step section of a frame.
const HEADER_TIMESTEP: &str = "ITEM: TIMESTEP";
/// Header prefix introducing the number-of-atoms section of a frame.
const HEADER_NUM_ATOMS: &str = "ITEM: NUMBER OF ATOMS";
/// Header prefix introducing the box bounds section of a frame.
const HEADER_BOX_BOUNDS: &str = "ITEM: BOX BOUNDS";
/// Header prefix introducing the atom table of a frame.
const HEADER_ATOMS: &str = "ITEM: ATOMS";
/// Prefix shared by all section headers.
const HEADER_ANY: &str = "ITEM:";

/// Streaming reader yielding the frames of a single LAMMPS dump file one at a time.
///
/// The reader is an iterator over `Result<Frame, ParseDumpError>`. At most one
/// frame is materialized at any moment; arbitrarily long trajectories can
/// therefore be processed without buffering.
///
/// ## Example
/// Iterating over the frames of a dump file and printing the time steps.
/// ```no_run
/// # use evban_rs::prelude::*;
/// # use evban_rs::errors::ParseDumpError;
/// # fn hidden_function() -> Result<(), ParseDumpError> {
/// let mut reader = DumpReader::open("trajectory.dump", None)?;
///
/// for frame in &mut reader {
///     let frame = frame?;
///     println!("{}", frame.get_timestep());
/// }
///
/// if reader.was_truncated() {
///     eprintln!("the last frame of the file was incomplete");
/// }
/// # Ok(())
/// # }
/// ```
///
/// ## Notes
/// - An incomplete final frame (fewer atom lines than declared) is discarded,
///   not yielded; the condition is reported via [`DumpReader::was_truncated`]
///   after the stream ends.
/// - After the first error, the iterator fuses: the rest of the file is
///   considered unreadable and `next` returns `None`.
#[derive(Debug)]
pub struct DumpReader {
    buffer: BufReader<File>,
    filename: Box<Path>,
    frames_read: usize,
    frame_cap: Option<usize>,
    truncated: bool,
    hit_cap: bool,
    finished: bool,
}

impl DumpReader {
    /// Open a dump file for streaming. `frame_cap` bounds the number of frames
    /// yielded from this file; `None` means no limit.
    pub fn open(
        filename: impl AsRef<Path>,
        frame_cap: Option<usize>,
    ) -> Result<Self, ParseDumpError> {
        let file = File::open(&filename)
            .map_err(|_| ParseDumpError::FileNotFound(Box::from(filename.as_ref())))?;

        Ok(DumpReader {
            buffer: BufReader::new(file),
            filename: Box::from(filename.as_ref()),
            frames_read: 0,
            frame_cap,
            truncated: false,
            hit_cap: false,
            finished: false,
        })
    }

    /// Returns `true` if the file ended in the middle of a frame.
    /// The incomplete frame was discarded.
    #[inline]
    pub fn was_truncated(&self) -> bool {
        self.truncated
    }

    /// Returns `true` if reading stopped because the per-file frame cap was reached.
    #[inline]
    pub fn hit_frame_cap(&self) -> bool {
        self.hit_cap
    }

    /// Get the number of frames yielded so far.
    #[inline]
    pub fn get_n_frames_read(&self) -> usize {
        self.frames_read
    }

    /// Get the path of the dump file this reader is attached to.
    #[inline]
    pub fn get_filename(&self) -> &Path {
        &self.filename
    }

    /// Read one line. Returns `None` on a clean end of file.
    fn read_line(&mut self) -> Result<Option<String>, ParseDumpError> {
        let mut line = String::new();
        match self.buffer.read_line(&mut line) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(line)),
            Err(_) => Err(ParseDumpError::LineNotFound(self.filename.clone())),
        }
    }

    /// Read the next section header, skipping blank lines.
    /// Returns `None` on a clean end of file before any header.
    fn read_header(&mut self, expected: &'static str) -> Result<Option<String>, ParseDumpError> {
        loop {
            let line = match self.read_line()? {
                Some(x) => x,
                None => return Ok(None),
            };

            if line.trim().is_empty() {
                continue;
            }

            if line.starts_with(expected) {
                return Ok(Some(line));
            }

            return Err(ParseDumpError::MalformedDump(line.trim_end().to_owned()));
        }
    }

    /// Parse one frame. Returns `Ok(None)` on a clean end of input
    /// or when the file turns out to be truncated.
    fn read_frame(&mut self) -> Result<Option<Frame>, ParseDumpError> {
        // TIMESTEP section; end of file here is a clean end of the trajectory
        if self.read_header(HEADER_TIMESTEP)?.is_none() {
            return Ok(None);
        }

        let timestep = match self.read_line()? {
            Some(line) => line
                .trim()
                .parse::<i64>()
                .map_err(|_| ParseDumpError::MalformedTimestep(line.trim_end().to_owned()))?,
            None => {
                self.truncated = true;
                return Ok(None);
            }
        };

        // NUMBER OF ATOMS section
        if self.read_header(HEADER_NUM_ATOMS)?.is_none() {
            self.truncated = true;
            return Ok(None);
        }

        let n_atoms = match self.read_line()? {
            Some(line) => line
                .trim()
                .parse::<usize>()
                .map_err(|_| ParseDumpError::MalformedNumAtoms(line.trim_end().to_owned()))?,
            None => {
                self.truncated = true;
                return Ok(None);
            }
        };

        // BOX BOUNDS section: three `lo hi` lines, side length is `hi - lo`
        if self.read_header(HEADER_BOX_BOUNDS)?.is_none() {
            self.truncated = true;
            return Ok(None);
        }

        let mut bounds = [(0.0f32, 0.0f32); 3];
        for bound in bounds.iter_mut() {
            match self.read_line()? {
                Some(line) => *bound = parse_bounds_line(&line)?,
                None => {
                    self.truncated = true;
                    return Ok(None);
                }
            }
        }

        // ATOMS section: exactly `n_atoms` lines with at least 7 fields each
        if self.read_header(HEADER_ATOMS)?.is_none() {
            self.truncated = true;
            return Ok(None);
        }

        let mut atoms = Vec::with_capacity(n_atoms);
        for _ in 0..n_atoms {
            let line = match self.read_line()? {
                Some(x) => x,
                None => {
                    self.truncated = true;
                    return Ok(None);
                }
            };

            // a stray header before `n_atoms` lines means the frame is incomplete
            if line.starts_with(HEADER_ANY) {
                self.truncated = true;
                return Ok(None);
            }

            atoms.push(Atom::from_dump_line(&line)?);
        }

        Ok(Some(Frame::new(
            timestep,
            SimBox::from_bounds(bounds),
            atoms,
        )))
    }
}

/// Parse a `lo hi` line of the box bounds section.
fn parse_bounds_line(line: &str) -> Result<(f32, f32), ParseDumpError> {
    let parse_err = || ParseDumpError::MalformedBoxLine(line.trim_end().to_owned());

    let mut split = line.split_whitespace();
    let lo = split
        .next()
        .and_then(|x| x.parse::<f32>().ok())
        .ok_or_else(parse_err)?;
    let hi = split
        .next()
        .and_then(|x| x.parse::<f32>().ok())
        .ok_or_else(parse_err)?;

    Ok((lo, hi))
}

impl Iterator for DumpReader {
    type Item = Result<Frame, ParseDumpError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        if let Some(cap) = self.frame_cap {
            if self.frames_read >= cap {
                self.finished = true;
                self.hit_cap = true;
                return None;
            }
        }

        match self.read_frame() {
            Ok(Some(frame)) => {
                self.frames_read += 1;
                Some(Ok(frame))
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
