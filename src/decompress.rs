use tracing::debug;

use crate::settings::{ConfigError, FieldWidths, Settings};
use crate::util::*;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum DecompressError {
    #[error("invalid settings: {0}")]
    InvalidSettings(#[from] ConfigError),
    #[error("input was truncated")]
    InputTruncated,
    #[error("invalid backreference")]
    InvalidBackreference,
    #[error("output buffer was insufficient")]
    OutputTooSmall,
    #[error("allocation failed: could not reserve {requested_bytes} bytes")]
    AllocationFailed { requested_bytes: usize },
}

/// One decoded unit of the compressed stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// A byte copied through as-is (never the marker)
    Literal(u8),
    /// Copy `length` bytes starting `offset` bytes back
    BackRef { offset: usize, length: usize },
}
impl Token {
    /// Number of output bytes this token produces
    pub fn decoded_len(&self) -> usize {
        match *self {
            Token::Literal(_) => 1,
            Token::BackRef { length, .. } => length,
        }
    }
}

/// Walks a compressed stream token by token
///
/// Stops after the first error. Invalid settings are reported as the first item.
pub struct Tokens<'a> {
    inp: &'a [u8],
    pos: usize,
    symbol: u8,
    widths: FieldWidths,
    invalid: Option<ConfigError>,
}
impl<'a> Tokens<'a> {
    pub fn new(inp: &'a [u8], settings: &Settings) -> Self {
        Self {
            inp,
            pos: 0,
            symbol: settings.symbol,
            widths: settings.backref,
            invalid: settings.validate().err(),
        }
    }

    /// Position of the next unread byte of the compressed stream
    pub fn pos(&self) -> usize {
        self.pos
    }

    fn read_backref(&mut self) -> Result<Token, DecompressError> {
        let fields_start = self.pos + 1;
        let fields_end = fields_start + self.widths.token_fields_len();
        if fields_end > self.inp.len() {
            return Err(DecompressError::InputTruncated);
        }

        let addr_end = fields_start + self.widths.nb_bytes_address as usize;
        let raw_offset = read_le_field(&self.inp[fields_start..addr_end]);
        let raw_length = read_le_field(&self.inp[addr_end..fields_end]);
        self.pos = fields_end;

        let field = |raw: u64| {
            raw.checked_add(1)
                .and_then(|x| usize::try_from(x).ok())
                .ok_or(DecompressError::InvalidBackreference)
        };
        Ok(Token::BackRef {
            offset: field(raw_offset)?,
            length: field(raw_length)?,
        })
    }
}
impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token, DecompressError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(e) = self.invalid.take() {
            self.pos = self.inp.len();
            return Some(Err(e.into()));
        }

        let b = *self.inp.get(self.pos)?;
        if b != self.symbol {
            self.pos += 1;
            return Some(Ok(Token::Literal(b)));
        }

        let ret = self.read_backref();
        if ret.is_err() {
            self.pos = self.inp.len();
        }
        Some(ret)
    }
}

impl<'a> OutputSink<DecompressError> for BufOutput<'a> {
    fn put_lits(&mut self, lits: &[u8]) -> Result<(), DecompressError> {
        let mut len = lits.len();
        let mut did_overflow = false;
        if len > self.buf.len() - self.pos {
            did_overflow = true;
            len = self.buf.len() - self.pos;
        }

        self.buf[self.pos..self.pos + len].copy_from_slice(&lits[..len]);
        self.pos += len;

        if did_overflow {
            Err(DecompressError::OutputTooSmall)
        } else {
            Ok(())
        }
    }

    fn put_backref(&mut self, disp: usize, mut len: usize) -> Result<(), DecompressError> {
        if disp + 1 > self.pos {
            return Err(DecompressError::InvalidBackreference);
        }

        let mut did_overflow = false;
        if len > self.buf.len() - self.pos {
            did_overflow = true;
            len = self.buf.len() - self.pos;
        }

        for i in 0..len {
            self.buf[self.pos + i] = self.buf[self.pos - disp - 1 + i];
        }
        self.pos += len;

        if did_overflow {
            Err(DecompressError::OutputTooSmall)
        } else {
            Ok(())
        }
    }
}

#[cfg(feature = "alloc")]
impl OutputSink<DecompressError> for VecOutput {
    fn put_lits(&mut self, lits: &[u8]) -> Result<(), DecompressError> {
        self.vec.extend_from_slice(lits);
        Ok(())
    }

    fn put_backref(&mut self, disp: usize, len: usize) -> Result<(), DecompressError> {
        let pos = self.vec.len();
        if disp + 1 > pos {
            return Err(DecompressError::InvalidBackreference);
        }
        let end = pos
            .checked_add(len)
            .ok_or(DecompressError::InvalidBackreference)?;

        self.reserve(len)?;
        self.vec.resize(end, 0);
        for i in 0..len {
            self.vec[pos + i] = self.vec[pos - disp - 1 + i];
        }

        Ok(())
    }

    fn reserve(&mut self, additional: usize) -> Result<(), DecompressError> {
        self.vec
            .try_reserve(additional)
            .map_err(|_| DecompressError::AllocationFailed {
                requested_bytes: additional,
            })
    }
}

/// Emit `n` copies of the marker, as read from the virtual prefix before the stream
fn put_markers(
    outp: &mut impl OutputSink<DecompressError>,
    symbol: u8,
    mut n: usize,
) -> Result<(), DecompressError> {
    let chunk = [symbol; 32];
    while n > 0 {
        let len = usize::min(n, chunk.len());
        outp.put_lits(&chunk[..len])?;
        n -= len;
    }
    Ok(())
}

fn decompress_impl(
    inp: &[u8],
    settings: &Settings,
    outp: &mut impl OutputSink<DecompressError>,
) -> Result<(), DecompressError> {
    settings.validate()?;

    let symbol = settings.symbol;
    let prefix_len = settings.marker_run.address_range();
    let mut out_len = 0usize;

    for tok in Tokens::new(inp, settings) {
        match tok? {
            Token::Literal(b) => {
                outp.put_lits(core::slice::from_ref(&b))?;
                out_len += 1;
            }
            Token::BackRef { offset, mut length } => {
                let end = out_len
                    .checked_add(length)
                    .ok_or(DecompressError::InvalidBackreference)?;
                outp.reserve(length)?;

                if offset > out_len {
                    // starts before the stream, in the run of markers assumed to precede it
                    let virt = offset - out_len;
                    if virt > prefix_len {
                        return Err(DecompressError::InvalidBackreference);
                    }
                    let n = usize::min(length, virt);
                    put_markers(outp, symbol, n)?;
                    length -= n;
                }
                if length > 0 {
                    outp.put_backref(offset - 1, length)?;
                }
                out_len = end;
            }
        }
    }

    debug!(input_len = inp.len(), output_len = out_len, "decompressed");
    Ok(())
}

/// Decompress the input into a preallocated buffer
///
/// Returns the decompressed size on success, or an error otherwise
pub fn decompress_to_buf(
    inp: &[u8],
    outp: &mut [u8],
    settings: &Settings,
) -> Result<usize, DecompressError> {
    let mut outp: BufOutput = outp.into();
    decompress_impl(inp, settings, &mut outp)?;
    Ok(outp.pos)
}

#[cfg(feature = "alloc")]
/// Decompress the input into a [Vec](alloc::vec::Vec)
///
/// Returns the result on success, or an error otherwise
pub fn decompress_to_vec(
    inp: &[u8],
    settings: &Settings,
    capacity_hint: Option<usize>,
) -> Result<alloc::vec::Vec<u8>, DecompressError> {
    let mut ret: VecOutput = if let Some(capacity_hint) = capacity_hint {
        alloc::vec::Vec::with_capacity(capacity_hint)
    } else {
        alloc::vec::Vec::new()
    }
    .into();
    decompress_impl(inp, settings, &mut ret)?;
    Ok(ret.vec)
}
