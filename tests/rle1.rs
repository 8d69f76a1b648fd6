use layercodec::rle::rle1::{self, ToggleDecoder, ToggleEncoder, RUN_LIMIT};
use layercodec::{Context, Decoder, Encoder, Error, Raster};
use rand_distr::{Distribution, Uniform};

fn row(pixels: &[u8]) -> Raster {
    Raster::from_pixels(pixels.len() as u32, 1, pixels.to_vec()).unwrap()
}

fn round_trip(raster: &Raster) {
    let ctx = Context::default();
    let mut compressed: Vec<u8> = Vec::new();
    {
        let mut encoder = ToggleEncoder::new(raster.pixels(), &mut compressed, ctx);
        let written = encoder.encode().unwrap();
        assert_eq!(written, compressed.len());
    }

    let mut decompressed = vec![0; raster.pixel_count()];
    {
        let mut decoder = ToggleDecoder::new(&compressed, &mut decompressed);
        let (consumed, written) = decoder.decode().unwrap();
        assert_eq!(consumed, compressed.len());
        assert_eq!(written, raster.pixel_count());
    }
    let expected = raster.map(|p| rle1::quantize(p, ctx.threshold()));
    assert_eq!(decompressed, expected.pixels());
}

#[test]
fn test_rle1_run_limit() {
    let white = row(&[255; RUN_LIMIT]);
    assert_eq!(rle1::encode(&white, Context::default()).unwrap(), [0xFD]);

    let white = row(&[255; RUN_LIMIT + 1]);
    assert_eq!(
        rle1::encode(&white, Context::default()).unwrap(),
        [0xFD, 0x81]
    );

    let black = row(&[0; RUN_LIMIT + 1]);
    assert_eq!(
        rle1::encode(&black, Context::default()).unwrap(),
        [0x7D, 0x01]
    );
}

#[test]
fn test_rle1_threshold() {
    // Only full white is on with the default context.
    let raster = row(&[254, 255, 0, 255, 255]);
    assert_eq!(
        rle1::encode(&raster, Context::default()).unwrap(),
        [0x01, 0x81, 0x01, 0x82]
    );

    // A leading on pixel does not emit an empty off record.
    assert_eq!(rle1::encode(&row(&[255]), Context::default()).unwrap(), [0x81]);

    assert_eq!(Context::default().threshold(), 255);
    assert_eq!(Context::new(2, 0).unwrap().threshold(), 255);
    assert_eq!(Context::new(2, 1).unwrap().threshold(), 127);
    assert_eq!(Context::new(4, 1).unwrap().threshold(), 63);
    assert_eq!(Context::new(4, 3).unwrap().threshold(), 191);
    assert_eq!(Context::new(8, 7).unwrap().threshold(), 223);
    assert!(matches!(Context::new(3, 0), Err(Error::InvalidParameter(_))));
    assert!(matches!(Context::new(2, 2), Err(Error::InvalidParameter(_))));
}

#[test]
fn test_rle1_uniform() {
    let raster = Raster::filled(100, 10, 255).unwrap();
    let stream = rle1::encode(&raster, Context::default()).unwrap();
    // 1000 pixels need eight records of at most 125.
    assert_eq!(stream, vec![0xFD; 8]);
    assert_eq!(rle1::decode(&stream, 100, 10).unwrap(), raster);
}

#[test]
fn test_rle1_empty_input() {
    let mut stream = Vec::new();
    let written = ToggleEncoder::new(&[], &mut stream, Context::default())
        .encode()
        .unwrap();
    assert_eq!(written, 0);
    assert!(stream.is_empty());

    let mut pixels: Vec<u8> = Vec::new();
    let res = ToggleDecoder::new(&[], &mut pixels).decode().unwrap();
    assert_eq!(res, (0, 0));
}

#[test]
fn test_rle1_round_trip() {
    round_trip(&row(&[0]));
    round_trip(&row(&[255, 255, 0, 0, 0, 255]));
    round_trip(&row(&[1, 2, 3, 250, 254, 255, 255, 128]));
    round_trip(&Raster::filled(64, 64, 0).unwrap());

    let mut rng = rand::thread_rng();
    let distr = Uniform::new_inclusive(0u8, 255u8);
    let lengths = Uniform::new_inclusive(1usize, 300);
    for _ in 0..20 {
        // Long runs of black and white, like a sliced layer.
        let mut pixels = Vec::new();
        while pixels.len() < 4096 {
            let value = if distr.sample(&mut rng) > 127 { 255 } else { 0 };
            pixels.extend(std::iter::repeat(value).take(lengths.sample(&mut rng)));
        }
        pixels.truncate(4096);
        let raster = Raster::from_pixels(64, 64, pixels).unwrap();
        round_trip(&raster);

        // Binary rasters survive the round trip unchanged.
        let stream = rle1::encode(&raster, Context::default()).unwrap();
        assert_eq!(rle1::decode(&stream, 64, 64).unwrap(), raster);
    }

    let noise: Vec<u8> = (0..4096).map(|_| distr.sample(&mut rng)).collect();
    round_trip(&Raster::from_pixels(64, 64, noise).unwrap());
}

#[test]
fn test_rle1_planes() {
    let raster = row(&[0, 100, 127, 200, 255]);
    let planes = rle1::encode_planes(&raster, 2).unwrap();
    assert_eq!(planes, vec![vec![0x04, 0x81], vec![0x02, 0x83]]);

    let decoded = rle1::decode_planes(&planes, 5, 1).unwrap();
    assert_eq!(decoded.pixels(), &[0, 0, 127, 127, 255]);

    let planes = rle1::encode_planes(&raster, 1).unwrap();
    let decoded = rle1::decode_planes(&planes, 5, 1).unwrap();
    assert_eq!(decoded.pixels(), &[0, 0, 0, 0, 255]);

    assert!(matches!(
        rle1::encode_planes(&raster, 3),
        Err(Error::InvalidParameter(_))
    ));
    let three = [vec![0x05], vec![0x05], vec![0x05]];
    assert!(matches!(
        rle1::decode_planes(&three, 5, 1),
        Err(Error::InvalidParameter(_))
    ));
}

#[test]
fn test_rle1_decoder_errors() {
    assert!(matches!(
        rle1::decode(&[0x85], 10, 1),
        Err(Error::TruncatedStream {
            decoded: 5,
            expected: 10
        })
    ));
    assert!(matches!(
        rle1::decode(&[0x8A], 5, 1),
        Err(Error::Overrun {
            offset: 0,
            expected: 5
        })
    ));
    assert!(matches!(
        rle1::decode(&[0x85, 0x01], 5, 1),
        Err(Error::Overrun {
            offset: 1,
            expected: 5
        })
    ));
    assert!(matches!(
        rle1::decode(&[0x80], 5, 1),
        Err(Error::CorruptRecord { offset: 0 })
    ));
    assert!(matches!(
        rle1::decode(&[], 0, 5),
        Err(Error::InvalidParameter(_))
    ));
}

#[test]
fn test_rle1_decoder_no_crash() {
    let mut rng = rand::thread_rng();
    let distr = Uniform::new_inclusive(0u8, 255u8);
    for i in 1..50 {
        let input: Vec<u8> = (0..i * 7).map(|_| distr.sample(&mut rng)).collect();
        let mut pixels = vec![0; 1000];
        if let Ok((read, written)) = ToggleDecoder::new(&input, &mut pixels).decode() {
            assert_eq!(read, input.len());
            assert_eq!(written, pixels.len());
        }
    }
}
