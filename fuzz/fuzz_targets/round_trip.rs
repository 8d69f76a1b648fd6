#![no_main]

use layercodec::{Context, Format, Raster};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let raster = Raster::from_pixels(data.len() as u32, 1, data.to_vec()).unwrap();
    for format in Format::ALL {
        let stream = format.encode(&raster, Context::default()).unwrap();
        let decoded = format.decode(&stream, raster.width(), 1).unwrap();
        assert_eq!(decoded, raster.map(|p| format.quantize(p)));
    }
});
