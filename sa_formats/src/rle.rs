//! Run-length codec used by `real.bin` graphics with `major == 1`.
//!
//! Every record starts with a header byte whose range selects the run mode and
//! how many bytes encode the run length. Lengths are assembled as
//! `x * 65536 + y * 256 + z`, where the high component comes from the header
//! itself and the remaining components follow in the stream:
//!
//! | header    | mode       | length bytes after header |
//! |-----------|------------|---------------------------|
//! | 224..=255 | zero fill  | y, z                      |
//! | 208..=223 | zero fill  | z                         |
//! | 192..=207 | zero fill  | none                      |
//! | 160..=191 | byte fill  | value, y, z               |
//! | 144..=159 | byte fill  | value, z                  |
//! | 128..=143 | byte fill  | value                     |
//! | 32..=127  | copy       | y, z                      |
//! | 16..=31   | copy       | z                         |
//! | 0..=15    | copy       | none                      |
//!
//! Decoding never fails. Runs are clamped to the output capacity (and copy
//! runs to the input left), a truncated record ends the stream, and any output
//! not reached keeps its zero value.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Repeat zero.
    ZeroFill,
    /// Repeat the byte following the header.
    ByteFill,
    /// Copy literal bytes from the stream.
    Copy,
}

/// Which components of the run length are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthWidth {
    /// `z` only, carried in the header.
    One,
    /// `y` in the header, `z` from the stream.
    Two,
    /// `x` in the header, `y` and `z` from the stream.
    Three,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub mode: RunMode,
    pub width: LengthWidth,
    /// Length component carried by the header byte.
    pub high: u8,
}

impl Opcode {
    pub fn from_header(head: u8) -> Self {
        use LengthWidth::*;
        use RunMode::*;

        let (mode, width, base) = match head {
            224..=255 => (ZeroFill, Three, 224),
            208..=223 => (ZeroFill, Two, 208),
            192..=207 => (ZeroFill, One, 192),
            160..=191 => (ByteFill, Three, 160),
            144..=159 => (ByteFill, Two, 144),
            128..=143 => (ByteFill, One, 128),
            32..=127 => (Copy, Three, 32),
            16..=31 => (Copy, Two, 16),
            0..=15 => (Copy, One, 0),
        };

        Opcode {
            mode,
            width,
            high: head - base,
        }
    }

    /// Reads the fill value and length bytes that follow the header.
    /// Returns `None` when the stream ends inside the record.
    fn read_run(self, stream: &mut ByteStream<'_>) -> Option<Run> {
        let fill = match self.mode {
            RunMode::ZeroFill => Some(0),
            RunMode::ByteFill => Some(stream.next()?),
            RunMode::Copy => None,
        };

        let high = self.high as usize;
        let length = match self.width {
            LengthWidth::One => high,
            LengthWidth::Two => (high << 8) | stream.next()? as usize,
            LengthWidth::Three => {
                let y = stream.next()? as usize;
                let z = stream.next()? as usize;
                (high << 16) | (y << 8) | z
            }
        };

        Some(Run { fill, length })
    }
}

#[derive(Debug, Clone, Copy)]
struct Run {
    fill: Option<u8>,
    length: usize,
}

struct ByteStream<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteStream<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        ByteStream { bytes, pos: 0 }
    }

    fn next(&mut self) -> Option<u8> {
        let value = *self.bytes.get(self.pos)?;
        self.pos += 1;
        Some(value)
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, count: usize) -> &'a [u8] {
        let slice = &self.bytes[self.pos..self.pos + count];
        self.pos += count;
        slice
    }
}

/// Decodes `input` into a fresh buffer of exactly `output_len` bytes.
pub fn decode_run_length(input: &[u8], output_len: usize) -> Vec<u8> {
    let mut output = vec![0u8; output_len];
    decode_run_length_into(input, &mut output);
    output
}

/// Decodes `input` into `output`, returning how many bytes were written.
/// Bytes past that count are left untouched.
pub fn decode_run_length_into(input: &[u8], output: &mut [u8]) -> usize {
    let mut stream = ByteStream::new(input);
    let mut written = 0usize;

    while written < output.len() {
        let Some(head) = stream.next() else {
            break;
        };
        let Some(run) = Opcode::from_header(head).read_run(&mut stream) else {
            break;
        };

        let total = run.length.min(output.len() - written);
        let target = &mut output[written..];
        match run.fill {
            Some(value) => {
                target[..total].fill(value);
                written += total;
            }
            None => {
                let total = total.min(stream.remaining());
                target[..total].copy_from_slice(stream.take(total));
                written += total;
            }
        }
    }

    written
}
