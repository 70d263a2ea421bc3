//! Application payload builders
//!
//! The relayer core treats transaction calldata as opaque bytes; these
//! builders are the seam where an application decides what a "transfer to
//! recipient for value" actually is on the wire.

use ethers::abi::{self, Token};
use ethers::types::{Address, Bytes, U256};

/// Destination, native value and calldata for one transaction.
#[derive(Debug, Clone)]
pub struct TxPayload {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

/// Produces the opaque payload for a (recipient, value) pair.
pub trait PayloadBuilder: Send + Sync {
    fn build(&self, recipient: Address, value: U256) -> TxPayload;
}

/// Plain native-currency transfer: value moves directly, no calldata.
pub struct NativeTransfer;

impl PayloadBuilder for NativeTransfer {
    fn build(&self, recipient: Address, value: U256) -> TxPayload {
        TxPayload {
            to: recipient,
            value,
            data: Bytes::default(),
        }
    }
}

/// ERC-20 `transfer(address,uint256)` selector.
const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

/// ERC-20 transfer: the transaction targets the token contract with zero
/// native value; recipient and amount travel in the calldata.
pub struct TokenTransfer {
    token: Address,
}

impl TokenTransfer {
    pub fn new(token: Address) -> Self {
        Self { token }
    }

    /// Convert a human-readable amount into token units, e.g. 1.5 USDT
    /// (6 decimals) -> 1_500_000. Truncates below the smallest unit.
    pub fn units(amount: f64, decimals: u32) -> U256 {
        let scaled = amount * 10f64.powi(decimals as i32);
        U256::from(scaled.floor().max(0.0) as u128)
    }
}

impl PayloadBuilder for TokenTransfer {
    fn build(&self, recipient: Address, value: U256) -> TxPayload {
        let mut data = TRANSFER_SELECTOR.to_vec();
        data.extend(abi::encode(&[
            Token::Address(recipient),
            Token::Uint(value),
        ]));

        TxPayload {
            to: self.token,
            value: U256::zero(),
            data: data.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipient() -> Address {
        "0x2222222222222222222222222222222222222222"
            .parse()
            .unwrap()
    }

    fn token() -> Address {
        "0xdAC17F958D2ee523a2206206994597C13D831ec7"
            .parse()
            .unwrap()
    }

    #[test]
    fn test_native_transfer_carries_value_no_data() {
        let payload = NativeTransfer.build(recipient(), U256::from(1000));
        assert_eq!(payload.to, recipient());
        assert_eq!(payload.value, U256::from(1000));
        assert!(payload.data.is_empty());
    }

    #[test]
    fn test_token_transfer_encoding() {
        let payload = TokenTransfer::new(token()).build(recipient(), U256::from(1_500_000));

        assert_eq!(payload.to, token());
        assert_eq!(payload.value, U256::zero());
        // selector + two 32-byte ABI words
        assert_eq!(payload.data.len(), 4 + 32 + 32);
        assert_eq!(&payload.data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        // recipient is right-aligned in the first word
        assert_eq!(&payload.data[16..36], recipient().as_bytes());
        // amount is the last word
        assert_eq!(
            U256::from_big_endian(&payload.data[36..68]),
            U256::from(1_500_000)
        );
    }

    #[test]
    fn test_unit_conversion() {
        assert_eq!(TokenTransfer::units(1.5, 6), U256::from(1_500_000));
        assert_eq!(TokenTransfer::units(0.000001, 6), U256::from(1));
        assert_eq!(TokenTransfer::units(0.0, 6), U256::zero());
    }
}
