use tracing::{debug, trace};

use crate::cost::{CalldataGas, CostOracle};
use crate::search::{find_best_match, find_longest_marker_run};
use crate::settings::{ConfigError, FieldWidths, Settings};
use crate::util::*;

/// Compression errors
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CompressError {
    /// The settings were rejected before any input was processed
    #[error("invalid settings: {0}")]
    InvalidSettings(#[from] ConfigError),
    /// A run of the marker byte has nothing in range to reference
    #[error("no backreference found for marker run at {position}")]
    NoMarkerRunBackref { position: usize },
    /// A run of the marker byte would have to be pieced together from several shorter runs
    #[error("marker run of {run_len} at {position} needs splitting (longest prior run is {longest})")]
    MarkerRunSplitUnsupported {
        position: usize,
        run_len: usize,
        longest: usize,
    },
    /// The output buffer was too small to hold all the output.
    ///
    /// The output that has been written *is* valid, but has been truncated.
    #[error("output buffer was insufficient")]
    OutputTooSmall,
}

trait OutputHelper {
    fn putc(&mut self, c: u8) -> Result<(), CompressError>;
    fn put_buf(&mut self, buf: &[u8]) -> Result<(), CompressError>;
}
impl<'a> OutputHelper for BufOutput<'a> {
    fn putc(&mut self, c: u8) -> Result<(), CompressError> {
        if self.pos < self.buf.len() {
            self.buf[self.pos] = c;
            self.pos += 1;
            Ok(())
        } else {
            Err(CompressError::OutputTooSmall)
        }
    }
    fn put_buf(&mut self, buf: &[u8]) -> Result<(), CompressError> {
        let mut len = buf.len();
        let mut did_overflow = false;
        if self.pos + len > self.buf.len() {
            did_overflow = true;
            len = self.buf.len() - self.pos;
        }

        self.buf[self.pos..self.pos + len].copy_from_slice(&buf[..len]);
        self.pos += len;

        if did_overflow {
            Err(CompressError::OutputTooSmall)
        } else {
            Ok(())
        }
    }
}

#[cfg(feature = "alloc")]
impl OutputHelper for VecOutput {
    fn putc(&mut self, c: u8) -> Result<(), CompressError> {
        self.vec.push(c);
        Ok(())
    }
    fn put_buf(&mut self, buf: &[u8]) -> Result<(), CompressError> {
        self.vec.extend_from_slice(buf);
        Ok(())
    }
}

/// Writes tokens in the wire format
///
/// Every backreference is `symbol`, then the little-endian `disp`, then the
/// little-endian `len - 1`, using the general backreference widths.
struct TokenOutput<O> {
    out: O,
    symbol: u8,
    widths: FieldWidths,
}

impl<O: OutputHelper> OutputSink<CompressError> for TokenOutput<O> {
    fn put_lits(&mut self, lits: &[u8]) -> Result<(), CompressError> {
        debug_assert!(!lits.contains(&self.symbol));
        self.out.put_buf(lits)
    }

    fn put_backref(&mut self, disp: usize, len: usize) -> Result<(), CompressError> {
        debug_assert!(disp < self.widths.address_range());
        debug_assert!(len >= 1);
        debug_assert!(len <= self.widths.length_range());

        self.out.putc(self.symbol)?;
        let (b, n) = le_field(disp, self.widths.nb_bytes_address);
        self.out.put_buf(&b[..n])?;
        let (b, n) = le_field(len - 1, self.widths.nb_bytes_length);
        self.out.put_buf(&b[..n])?;

        Ok(())
    }
}

/// Greedy, cost-driven compressor
///
/// Holds the settings and the literal cost oracle for any number of calls.
pub struct Compressor<C> {
    settings: Settings,
    oracle: C,
}
impl Compressor<CalldataGas> {
    /// Compressor using calldata gas as the literal cost
    pub fn with_calldata_gas(settings: Settings) -> Self {
        Self::new(settings, CalldataGas)
    }
}
impl<C: CostOracle> Compressor<C> {
    pub fn new(settings: Settings, oracle: C) -> Self {
        Self { settings, oracle }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Fixed cost of a marker-prefixed general backreference
    pub fn backref_cost(&self) -> u64 {
        let w = &self.settings.backref;
        let fields = 8 + w.nb_bytes_address as u64 + w.nb_bytes_length as u64 - 2;
        self.oracle.cost(self.settings.symbol).saturating_add(fields)
    }

    /// Shortest backreference that would cost no more than the literals it replaces
    ///
    /// `rest` starts at the current (non-marker) byte. Marker bytes in the way
    /// are not charged themselves; instead, a length-sized penalty is added
    /// once the run of them ends. Returns `None` if the input runs out first.
    pub fn min_viable_backref_len(&self, rest: &[u8]) -> Option<usize> {
        let symbol = self.settings.symbol;
        let target = self.backref_cost();

        let mut literal_cost = self.oracle.cost(*rest.first()?);
        let mut mid_run = false;
        let mut len = 2;
        loop {
            let cur = *rest.get(len - 1)?;
            if cur == symbol {
                mid_run = true;
            } else {
                if mid_run {
                    literal_cost = literal_cost.saturating_add(len as u64);
                }
                mid_run = false;

                literal_cost = literal_cost.saturating_add(self.oracle.cost(cur));
                if literal_cost >= target {
                    return Some(len);
                }
            }
            len += 1;
        }
    }

    /// Re-express the run of marker bytes at `pos` as a single backreference
    ///
    /// Returns the number of input bytes covered.
    fn put_marker_run<L: OutputSink<CompressError>>(
        &self,
        inp: &[u8],
        pos: usize,
        outp: &mut L,
    ) -> Result<usize, CompressError> {
        let symbol = self.settings.symbol;
        let run = &self.settings.marker_run;

        let run_len = inp[pos..]
            .iter()
            .take(run.length_range())
            .take_while(|&&b| b == symbol)
            .count();
        debug_assert!(run_len >= 1);

        if pos == 0 {
            // nothing written yet: copy the previous (virtual) byte over and over
            trace!(run_len, "marker run bootstrap");
            outp.put_backref(0, run_len)?;
            return Ok(run_len);
        }

        let address_range = run.address_range();
        if pos < address_range {
            // copy entirely out of the virtual marker prefix before the stream
            let len = usize::min(run_len, address_range - pos);
            trace!(pos, len, "marker run from stream origin");
            outp.put_backref(pos + len - 1, len)?;
            return Ok(len);
        }

        let floor = pos - address_range;
        match find_longest_marker_run(inp, pos, symbol, floor, run_len) {
            None => Err(CompressError::NoMarkerRunBackref { position: pos }),
            Some(m) if m.length < run_len => Err(CompressError::MarkerRunSplitUnsupported {
                position: pos,
                run_len,
                longest: m.length,
            }),
            Some(m) => {
                trace!(pos, distance = m.distance, run_len, "marker run from prior run");
                outp.put_backref(m.distance - 1, run_len)?;
                Ok(run_len)
            }
        }
    }

    fn compress_impl<L: OutputSink<CompressError>>(
        &self,
        inp: &[u8],
        outp: &mut L,
    ) -> Result<(), CompressError> {
        self.settings.validate()?;

        let symbol = self.settings.symbol;
        let address_range = self.settings.backref.address_range();
        let length_range = self.settings.backref.length_range();

        let mut lits_start_anchor_pos = 0;
        let mut nbackrefs = 0usize;
        let mut pos = 0;

        while pos < inp.len() {
            if inp[pos] == symbol {
                let lits = &inp[lits_start_anchor_pos..pos];
                if !lits.is_empty() {
                    outp.put_lits(lits)?;
                }

                pos += self.put_marker_run(inp, pos, outp)?;
                lits_start_anchor_pos = pos;
                nbackrefs += 1;
                continue;
            }

            let found = self.min_viable_backref_len(&inp[pos..]).and_then(|min_len| {
                find_best_match(
                    inp,
                    pos,
                    min_len,
                    pos.saturating_sub(address_range),
                    length_range,
                )
            });

            if let Some(m) = found {
                // any accumulated lits?
                let lits = &inp[lits_start_anchor_pos..pos];
                if !lits.is_empty() {
                    outp.put_lits(lits)?;
                }

                trace!(pos, distance = m.distance, length = m.length, "backref");
                outp.put_backref(m.distance - 1, m.length)?;
                pos += m.length;
                lits_start_anchor_pos = pos;
                nbackrefs += 1;
            } else {
                pos += 1;
            }
        }

        // if there's anything leftover, output it
        let lits = &inp[lits_start_anchor_pos..];
        if !lits.is_empty() {
            outp.put_lits(lits)?;
        }

        debug!(input_len = inp.len(), nbackrefs, "compressed");

        Ok(())
    }

    fn token_output<O>(&self, out: O) -> TokenOutput<O> {
        TokenOutput {
            out,
            symbol: self.settings.symbol,
            widths: self.settings.backref,
        }
    }

    /// Compress the input into a preallocated buffer
    ///
    /// Returns the compressed size on success, or an error otherwise
    pub fn compress_to_buf(&self, inp: &[u8], outp: &mut [u8]) -> Result<usize, CompressError> {
        let mut outp = self.token_output(BufOutput::from(outp));
        self.compress_impl(inp, &mut outp)?;
        Ok(outp.out.pos)
    }

    #[cfg(feature = "alloc")]
    /// Compress the input into a [Vec](alloc::vec::Vec)
    ///
    /// Returns the result on success, or an error otherwise
    pub fn compress_to_vec(&self, inp: &[u8]) -> Result<alloc::vec::Vec<u8>, CompressError> {
        let mut ret = self.token_output(VecOutput::from(alloc::vec::Vec::new()));
        self.compress_impl(inp, &mut ret)?;
        Ok(ret.out.vec)
    }
}

#[cfg(feature = "alloc")]
/// Compress with calldata gas as the literal cost
pub fn compress_to_vec(
    inp: &[u8],
    settings: &Settings,
) -> Result<alloc::vec::Vec<u8>, CompressError> {
    Compressor::with_calldata_gas(*settings).compress_to_vec(inp)
}
