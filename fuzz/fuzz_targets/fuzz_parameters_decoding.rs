#![no_main]

use libfuzzer_sys::fuzz_target;
use schnorr_zkp::ProtocolParameters;

fuzz_target!(|data: &[u8]| {
    if let Ok(params) = ProtocolParameters::from_bytes(data) {
        assert!(params.modulus() >= 3);
        assert_eq!(&params.to_bytes()[..], data);
        let _ = params.pow(params.exponent_modulus());
    }
});
