#![no_std]

#[cfg(feature = "alloc")]
extern crate alloc;

mod compress;
mod cost;
mod decompress;
mod search;
mod settings;
mod util;

#[cfg(feature = "alloc")]
pub use compress::compress_to_vec;
pub use compress::{CompressError, Compressor};
pub use cost::{CalldataGas, CostOracle};
#[cfg(feature = "alloc")]
pub use decompress::decompress_to_vec;
pub use decompress::{decompress_to_buf, DecompressError, Token, Tokens};
pub use search::{find_best_match, find_longest_marker_run, Match};
pub use settings::{AddressingMode, ConfigError, FieldWidths, ReferenceMode, Settings};
