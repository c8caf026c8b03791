#![no_main]

use blind_drop::{
    decode_voucher, AuthMode, DropConfig, DropError, VoucherAuthority, VoucherIssuer, WalletId,
};
use ed25519_dalek::SigningKey;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(voucher) = decode_voucher(data) else {
        return;
    };
    let cfg = DropConfig::new(
        "Fuzz",
        "FZZ",
        10,
        1,
        0,
        WalletId([0xAA; 32]),
        "ph",
        [0; 32],
        AuthMode::Allowlist([0; 32]),
    );
    let issuer = VoucherIssuer::new(SigningKey::from_bytes(&[1u8; 32]), cfg.signing_domain());
    let authority = VoucherAuthority::new(&issuer.signer(), cfg.signing_domain()).unwrap();

    let caller = voucher.wallet;
    match authority.verify(&voucher, &caller, 0) {
        // Only the issuer's own signature may verify.
        Ok(()) => assert_eq!(voucher, issuer.issue(caller, voucher.data.clone(), 0)),
        Err(e) => assert_eq!(e, DropError::InvalidOrUnauthorizedVoucher),
    }
});
