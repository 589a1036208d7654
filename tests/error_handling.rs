use simhash::{
    BitExtension, ConfigLoadError, Fingerprint, HashAlgorithm, MAX_FINGERPRINT_BITS,
    ProjectionCache, SimHashConfig, SimHashError, aggregate, project, similarity, simhash_batch,
    simhash_terms, simhash_weighted, synthesize,
};

#[test]
fn comparing_128_and_64_bit_fingerprints_fails() {
    let long = simhash_terms(["a", "b"], &SimHashConfig::default()).unwrap();
    let short = simhash_terms(["a", "b"], &SimHashConfig::new().with_bits(64)).unwrap();

    let result = similarity(&long.fingerprint, &short.fingerprint);
    assert_eq!(
        result,
        Err(SimHashError::LengthMismatch {
            left: 128,
            right: 64
        })
    );
}

#[test]
fn zero_bits_is_invalid_everywhere() {
    let cfg = SimHashConfig::new().with_bits(0);
    let invalid = |r: Result<(), SimHashError>| {
        assert!(matches!(r, Err(SimHashError::InvalidConfiguration(_))));
    };

    invalid(cfg.validate());
    invalid(project("x", &cfg).map(|_| ()));
    invalid(synthesize(&aggregate(["x"]), &cfg).map(|_| ()));
    invalid(simhash_terms(["x"], &cfg).map(|_| ()));
    invalid(simhash_batch(&[vec!["x"]], &cfg).map(|_| ()));
    invalid(ProjectionCache::new(cfg).map(|_| ()));
}

#[test]
fn width_beyond_hash_needs_extension() {
    for hash in [HashAlgorithm::Md5, HashAlgorithm::Xxh3_128, HashAlgorithm::Sha256] {
        let width = hash.width_bits();
        let at_width = SimHashConfig::new().with_hash(hash).with_bits(width);
        assert!(simhash_terms(["t"], &at_width).is_ok());

        let beyond = at_width.with_bits(width + 1);
        assert!(matches!(
            simhash_terms(["t"], &beyond),
            Err(SimHashError::InvalidConfiguration(_))
        ));
        let padded = beyond.with_extension(BitExtension::ZeroPad);
        assert_eq!(
            simhash_terms(["t"], &padded).unwrap().fingerprint.len(),
            width + 1
        );
    }
}

#[test]
fn maximum_width_is_enforced() {
    let cfg = SimHashConfig::new()
        .with_extension(BitExtension::Rehash)
        .with_bits(MAX_FINGERPRINT_BITS + 1);
    assert!(cfg.validate().is_err());
}

#[test]
fn degenerate_inputs_are_not_errors() {
    let cfg = SimHashConfig::default();

    let empty = simhash_terms(Vec::<&str>::new(), &cfg).unwrap();
    assert_eq!(empty.fingerprint.to_string(), "0".repeat(128));

    let empty_term = simhash_terms([""], &cfg).unwrap();
    assert_eq!(empty_term.fingerprint.len(), 128);

    let zero_weights = simhash_weighted([("a", 0.0f64), ("b", 0.0)], &cfg).unwrap();
    assert_eq!(zero_weights.fingerprint.count_ones(), 0);
    assert_eq!(zero_weights.meta.term_count, 2);
}

#[test]
fn negative_weight_is_rejected() {
    let err = simhash_weighted([("fine", 1.0f32), ("broken", -1.0)], &SimHashConfig::default())
        .unwrap_err();
    assert!(err.to_string().contains("broken"));
}

#[test]
fn malformed_bit_string_is_rejected() {
    assert_eq!(
        "10a1".parse::<Fingerprint>(),
        Err(SimHashError::InvalidBitString {
            position: 2,
            found: 'a'
        })
    );
}

#[test]
fn yaml_errors_are_classified() {
    assert!(matches!(
        SimHashConfig::from_yaml("bits: [1, 2]"),
        Err(ConfigLoadError::Yaml(_))
    ));
    assert!(matches!(
        SimHashConfig::from_yaml("bits: 0"),
        Err(ConfigLoadError::Invalid(SimHashError::InvalidConfiguration(_)))
    ));
}
