/// Per-byte cost of emitting a literal
///
/// Must be pure and total over all 256 byte values.
pub trait CostOracle {
    fn cost(&self, byte: u8) -> u64;
}

impl<F: Fn(u8) -> u64> CostOracle for F {
    fn cost(&self, byte: u8) -> u64 {
        self(byte)
    }
}

/// Ethereum calldata gas: 4 per zero byte, 16 per nonzero byte
#[derive(Debug, Clone, Copy, Default)]
pub struct CalldataGas;
impl CostOracle for CalldataGas {
    fn cost(&self, byte: u8) -> u64 {
        if byte == 0 {
            4
        } else {
            16
        }
    }
}
