//! Contract interfaces of the view calls the router issues.
//!
//! Call data and return data go through the `sol!` generated call types, so
//! selectors and word layouts come from the declared signatures.

use alloy::primitives::Address as EvmAddress;
use alloy::sol;
use dexroute_domain::value_objects::Address;

sol! {
    /// Read surface of venue-B pools. Each pool answers a subset.
    #[derive(Debug, PartialEq, Eq)]
    interface IVenuePool {
        function getNormalizedWeights() external view returns (uint256[] memory);
        function getAmplificationParameter() external view returns (uint256 value, bool isUpdating, uint256 precision);
        function name() external view returns (string memory);
    }
}

#[must_use]
pub fn evm_address(address: Address) -> EvmAddress {
    EvmAddress::from(*address.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;
    use alloy::sol_types::{SolCall, SolValue};

    #[test]
    fn test_call_data_is_the_bare_selector() {
        let data = IVenuePool::nameCall {}.abi_encode();
        assert_eq!(data, [0x06, 0xfd, 0xde, 0x03]);
        assert_eq!(IVenuePool::getNormalizedWeightsCall::SELECTOR, [0xf8, 0x9f, 0x27, 0xed]);
        assert_eq!(IVenuePool::getAmplificationParameterCall::SELECTOR, [0x6d, 0xac, 0xcf, 0xfa]);
    }

    #[test]
    fn test_decode_weights_array() {
        let wad = U256::from(10u64.pow(18));
        let weights = vec![wad / U256::from(5u64) * U256::from(4u64), wad / U256::from(5u64)];
        let data = weights.abi_encode();
        let decoded = IVenuePool::getNormalizedWeightsCall::abi_decode_returns(&data).unwrap();
        assert_eq!(decoded, weights);
    }

    #[test]
    fn test_decode_amplification_tuple() {
        let data = (U256::from(200_000u64), true, U256::from(1000u64)).abi_encode_params();
        let decoded = IVenuePool::getAmplificationParameterCall::abi_decode_returns(&data).unwrap();
        assert_eq!(decoded.value, U256::from(200_000u64));
        assert!(decoded.isUpdating);
        assert_eq!(decoded.precision, U256::from(1000u64));
        assert!(IVenuePool::getAmplificationParameterCall::abi_decode_returns(&data[..64]).is_err());
    }

    #[test]
    fn test_decode_name_and_truncation() {
        let data = "Balancer 80BAL-20WETH".to_string().abi_encode();
        assert_eq!(
            IVenuePool::nameCall::abi_decode_returns(&data).unwrap(),
            "Balancer 80BAL-20WETH"
        );
        assert!(IVenuePool::nameCall::abi_decode_returns(&data[..40]).is_err());
        assert!(IVenuePool::getNormalizedWeightsCall::abi_decode_returns(&[0u8; 10]).is_err());
    }

    #[test]
    fn test_evm_address_keeps_bytes() {
        let address = Address::from_bytes([0xab; 20]);
        assert_eq!(evm_address(address).as_slice(), &[0xab; 20]);
        assert_eq!(evm_address(Address::NATIVE), EvmAddress::ZERO);
    }
}
