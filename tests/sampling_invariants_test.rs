//! Property tests for the sampling contract: every draw is either a
//! trained continuation or end-of-string, never anything else.

use proptest::prelude::*;
use tetragram::{Model, ModelConfig};

proptest! {
    #[test]
    fn sample_never_returns_an_untrained_character(
        ctx_char in 1u32..0x2FFF,
        conts in prop::collection::vec(1u32..0x2FFF, 1..8),
        seed: u32,
    ) {
        let mut model = Model::new(ModelConfig::default().with_bucket_bits(6).with_seed(seed)).unwrap();
        let ctx = [0, 0, 0, ctx_char];
        for &ch in &conts {
            model.associate(ctx, ch).unwrap();
        }
        let mut allowed: Vec<u32> = conts.clone();
        allowed.push(0);

        for _ in 0..200 {
            let drawn = model.sample(ctx);
            prop_assert!(allowed.contains(&drawn), "drew {} not in {:?}", drawn, allowed);
        }
    }

    #[test]
    fn unobserved_context_always_samples_end_of_string(
        ctx_char in 1u32..0x2FFF,
        other_char in 1u32..0x2FFF,
        seed: u32,
    ) {
        prop_assume!(ctx_char != other_char);
        let mut model = Model::new(ModelConfig::default().with_bucket_bits(6).with_seed(seed)).unwrap();
        model.associate([0, 0, 0, other_char], b'x' as u32).unwrap();

        for _ in 0..50 {
            prop_assert_eq!(model.sample([0, 0, 0, ctx_char]), 0);
        }
    }

    #[test]
    fn generate_into_output_is_always_valid_utf8(
        seed: u32,
        buf_len in 1usize..32,
    ) {
        let mut model = Model::new(ModelConfig::default().with_bucket_bits(8).with_seed(seed)).unwrap();
        model.train_str("日本語のテスト、café, naïve.").unwrap();
        let mut buf = vec![0xAAu8; buf_len];
        let n = model.generate_into(&mut buf);
        prop_assert!(n < buf.len());
        prop_assert_eq!(buf[n], 0);
        prop_assert!(std::str::from_utf8(&buf[..n]).is_ok());
    }
}
