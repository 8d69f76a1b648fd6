use layercodec::utils::checksum::{crc16, CRC16_TABLE};
use layercodec::utils::crypt::LayerCipher;

#[test]
fn test_crc16() {
    assert_eq!(CRC16_TABLE[0x80], 0xA001);
    assert_eq!(crc16(&[]), 0);
    assert_eq!(crc16(&[0x00]), 0);
    assert_eq!(crc16(&[0x01]), 0x2D00);
    assert_eq!(crc16(&[0x0F, 0xFF, 0x7F, 0x7F]), 0x2D40);
    assert_eq!(crc16(b"123456789"), 0x3740);
}

#[test]
fn test_crc16_detects_bit_flips() {
    let data = [0x0F, 0xFF, 0x7F, 0x7F];
    let crc = crc16(&data);
    for i in 0..data.len() * 8 {
        let mut flipped = data;
        flipped[i / 8] ^= 1 << (i % 8);
        assert_ne!(crc16(&flipped), crc);
    }
}

#[test]
fn test_cipher_vectors() {
    let cipher = LayerCipher::new(0x1234_5678);
    assert!(cipher.is_enabled());

    let mut data: Vec<u8> = (0..10).collect();
    cipher.apply(0, &mut data);
    assert_eq!(
        data,
        [0x27, 0xC4, 0xD3, 0xCD, 0xEE, 0x2C, 0x4C, 0x24, 0xA5, 0x87]
    );

    let mut data = [0u8; 8];
    cipher.apply(7, &mut data);
    assert_eq!(data, [0x38, 0x86, 0xE7, 0x23, 0xFB, 0xEA, 0x5F, 0x78]);

    let mut data = [0u8; 8];
    LayerCipher::new(1).apply(0, &mut data);
    assert_eq!(data, [0xC3, 0xDB, 0x10, 0x68, 0x92, 0xDD, 0x3C, 0x6E]);
}

#[test]
fn test_cipher_is_involution() {
    let cipher = LayerCipher::new(0xDEAD_BEEF);
    let original: Vec<u8> = (0..1000).map(|x| (x * 31 % 251) as u8).collect();
    for layer in [0, 1, 99, u32::MAX] {
        let mut data = original.clone();
        cipher.apply(layer, &mut data);
        assert_ne!(data, original);
        cipher.apply(layer, &mut data);
        assert_eq!(data, original);
    }
}

#[test]
fn test_cipher_disabled() {
    let cipher = LayerCipher::new(0);
    assert!(!cipher.is_enabled());
    let mut data = [1, 2, 3, 4, 5];
    cipher.apply(3, &mut data);
    assert_eq!(data, [1, 2, 3, 4, 5]);

    let mut empty: [u8; 0] = [];
    LayerCipher::new(5).apply(0, &mut empty);
}
