//! BIP37 bloom filter behaviour

use anyhow::Result;
use spv_proof::wire::WireReader;
use spv_proof::*;

#[test]
fn test_reference_vectors() -> Result<()> {
    let mut filter = BloomFilter::new(10, 5, 99)?;
    filter.insert(b"Hello World");
    assert_eq!(hex::encode(filter.to_bytes()), "0000000a080000000140");
    filter.insert(b"Goodbye!");
    assert_eq!(hex::encode(filter.to_bytes()), "4000600a080000010940");
    assert_eq!(
        hex::encode(filter.filter_load_payload(BLOOM_UPDATE_ALL)),
        "0a4000600a080000010940050000006300000001"
    );
    Ok(())
}

#[test]
fn test_payload_layout() -> Result<()> {
    let config = FilterConfig::new(300, 11, 0xdead_beef)?.with_update_flag(BLOOM_UPDATE_P2PUBKEY_ONLY);
    let mut filter = BloomFilter::from_config(&config)?;
    filter.insert(b"payload layout");

    let payload = filter.filter_load();
    let mut reader = WireReader::new(&payload);
    let size = reader.read_count(1)?;
    assert_eq!(size, 300);
    assert_eq!(reader.read_bytes(size)?, filter.to_bytes().as_slice());
    assert_eq!(reader.read_u32_le()?, 11);
    assert_eq!(reader.read_u32_le()?, 0xdead_beef);
    assert_eq!(reader.read_u8()?, BLOOM_UPDATE_P2PUBKEY_ONLY);
    assert!(reader.is_empty());
    Ok(())
}

#[test]
fn test_no_false_negatives_for_many_items() -> Result<()> {
    let mut filter = BloomFilter::from_config(&FilterConfig::for_elements(500, 0.01, 7)?)?;
    let items: Vec<Vec<u8>> = (0u32..500).map(|i| i.to_le_bytes().to_vec()).collect();
    for item in &items {
        filter.insert(item);
    }
    assert_eq!(filter.inserted_count(), 500);
    assert!(items.iter().all(|item| filter.contains(item)));
    Ok(())
}

#[test]
fn test_false_positive_rate_is_bounded() -> Result<()> {
    let mut filter = BloomFilter::from_config(&FilterConfig::for_elements(200, 0.01, 3)?)?;
    for i in 0u32..200 {
        filter.insert(&i.to_be_bytes());
    }
    let false_positives = (1_000_000u32..1_010_000)
        .filter(|i| filter.contains(&i.to_be_bytes()))
        .count();
    // 1% target, generous margin
    assert!(false_positives < 500, "{} false positives", false_positives);
    Ok(())
}

#[test]
fn test_tweak_changes_bit_pattern() -> Result<()> {
    let mut a = BloomFilter::new(10, 5, 0)?;
    let mut b = BloomFilter::new(10, 5, 1)?;
    a.insert(b"Hello World");
    b.insert(b"Hello World");
    assert_ne!(a.to_bytes(), b.to_bytes());
    Ok(())
}

#[test]
fn test_empty_item() -> Result<()> {
    let mut filter = BloomFilter::new(10, 5, 99)?;
    filter.insert(b"");
    assert!(filter.contains(b""));
    assert!(!filter.is_empty());
    Ok(())
}

#[test]
fn test_rejects_oversized_filter() {
    assert!(matches!(
        BloomFilter::new(MAX_BLOOM_FILTER_SIZE + 1, 5, 0),
        Err(SpvError::InvalidFilterParameters(_))
    ));
    assert!(matches!(
        BloomFilter::new(10, MAX_HASH_FUNCS + 1, 0),
        Err(SpvError::InvalidFilterParameters(_))
    ));
}
