#![no_main]

use libfuzzer_sys::fuzz_target;
use blockgz::{Pipeline, PipelineConfig};

fuzz_target!(|data: Vec<u8>| {
    // Arbitrary bytes must fail cleanly or decode, never panic
    let pipeline = Pipeline::new(PipelineConfig::new(64, 2).unwrap()).unwrap();
    if let Ok(restored) = pipeline.decompress_bytes(&data) {
        // Anything that decodes re-encodes to frames of the same raw content
        let again = pipeline.compress_bytes(&restored).unwrap();
        assert_eq!(pipeline.decompress_bytes(&again).unwrap(), restored);
    }
});
