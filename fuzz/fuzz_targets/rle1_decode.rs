#![no_main]

use layercodec::rle::rle1::ToggleDecoder;
use layercodec::Decoder;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut pixels = vec![0u8; 4096];
    {
        let mut decoder = ToggleDecoder::new(data, &mut pixels);
        if let Ok((consumed, written)) = decoder.decode() {
            assert_eq!(consumed, data.len());
            assert_eq!(written, 4096);
        }
    }
});
