use drop_primitives::{constants, h_tag};
use hex::ToHex;

#[test]
fn print_tag_hex() {
    for t in constants::ALL_TAGS {
        let h = h_tag(t, &[]);
        assert_ne!(h, [0u8; 32]);
        println!("{}:{}", t, h.encode_hex::<String>());
    }
}
