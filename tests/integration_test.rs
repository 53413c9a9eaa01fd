use quant_bridge::blocking::HubClient;
use quant_bridge::{HubDownload, OptimizedConfig, QuantizationConfig};

#[test]
#[ignore]
fn test_download_from_hub() {
    let _ = env_logger::builder().is_test(true).try_init();

    let cache = tempfile::tempdir().unwrap();
    let client = HubClient::new().unwrap();
    let path = client.download("bert-base-uncased", "config.json", None, Some(cache.path()));
    assert!(path.is_ok(), "{:?}", path.err());

    // second call is served from the cache
    let cached = client.download("bert-base-uncased", "config.json", None, Some(cache.path())).unwrap();
    assert_eq!(path.unwrap(), cached);
}

#[test]
#[ignore]
fn test_quantization_config_from_hub() {
    let _ = env_logger::builder().is_test(true).try_init();

    let cache = tempfile::tempdir().unwrap();
    let config = QuantizationConfig::from_pretrained(
        "echarlaix/distilbert-base-uncased-finetuned-sst-2-english-int8-dynamic",
        "quantization.yml",
        Some(cache.path()),
    );
    assert!(config.is_ok(), "{:?}", config.err());
}

#[test]
#[ignore]
fn test_optimized_config_from_hub() {
    let _ = env_logger::builder().is_test(true).try_init();

    let cache = tempfile::tempdir().unwrap();
    let config = OptimizedConfig::from_pretrained(
        "echarlaix/distilbert-base-uncased-finetuned-sst-2-english-int8-dynamic",
        Some(cache.path()),
    );
    assert!(config.is_ok(), "{:?}", config.err());
}
