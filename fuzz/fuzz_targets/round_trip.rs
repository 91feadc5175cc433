#![no_main]

use libfuzzer_sys::fuzz_target;
use blockgz::{FrameReader, Pipeline, PipelineConfig};
use std::io::Cursor;

fuzz_target!(|data: Vec<u8>| {
    // (max_chunk_size, workers)
    let configs = [(1, 1), (4, 2), (64, 4), (1024, 3)];

    for (max_chunk_size, workers) in configs {
        let pipeline = Pipeline::new(PipelineConfig::new(max_chunk_size, workers).unwrap()).unwrap();
        let compressed = pipeline.compress_bytes(&data).unwrap();

        // Verify: one frame per chunk, each chunk full except the last
        let frames: Vec<_> = FrameReader::new(Cursor::new(&compressed))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(frames.len(), data.len().div_ceil(max_chunk_size));
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.index(), i as u64);
            if i < frames.len() - 1 {
                assert_eq!(frame.raw_len(), max_chunk_size);
            }
        }

        // Verify: frame lengths tile the output exactly
        let total: usize = frames.iter().map(|f| f.compressed_len()).sum();
        assert_eq!(total, compressed.len());

        // Verify: round trip
        let restored = pipeline.decompress_bytes(&compressed).unwrap();
        assert_eq!(restored, data);
    }
});
