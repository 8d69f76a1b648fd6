//! A collection of utilities for the encoded layer streams.

/// Implements the CRC-16 that Photon Workshop files store for PW0 layers.
pub mod checksum {
    /// The CRC-16/ARC lookup table (reflected polynomial 0xA001).
    pub const CRC16_TABLE: [u16; 256] = make_table();

    const fn make_table() -> [u16; 256] {
        let mut table = [0u16; 256];
        let mut i = 0;
        while i < 256 {
            let mut crc = i as u16;
            let mut bit = 0;
            while bit < 8 {
                crc = if crc & 1 != 0 {
                    (crc >> 1) ^ 0xA001
                } else {
                    crc >> 1
                };
                bit += 1;
            }
            table[i] = crc;
            i += 1;
        }
        table
    }

    /// Computes the layer checksum of 'data'. This is not a plain CRC-16/ARC:
    /// every byte goes through the table twice and the result is folded
    /// through the table once more.
    pub fn crc16(data: &[u8]) -> u16 {
        let mut crc: u16 = 0;
        for byte in data {
            let index = ((crc >> 8) ^ CRC16_TABLE[*byte as usize]) & 0xFF;
            crc = (crc << 8) ^ CRC16_TABLE[index as usize];
        }
        let low = CRC16_TABLE[(crc & 0xFF) as usize];
        let high = CRC16_TABLE[(crc >> 8) as usize];
        (low << 8).wrapping_add(high)
    }

    #[test]
    fn test_crc16_table() {
        assert_eq!(CRC16_TABLE[0], 0x0000);
        assert_eq!(CRC16_TABLE[1], 0xC0C1);
        assert_eq!(CRC16_TABLE[2], 0xC181);
        assert_eq!(CRC16_TABLE[255], 0x4040);
    }
}

/// Implements the XOR cipher that encrypted CTB files apply to every layer
/// stream. Applying the cipher twice restores the input.
pub mod crypt {
    #[derive(Copy, Clone, Debug)]
    pub struct LayerCipher {
        seed: u32,
    }

    impl LayerCipher {
        /// Creates a cipher for the file key 'seed'. A zero seed disables
        /// encryption.
        pub fn new(seed: u32) -> Self {
            Self { seed }
        }

        pub fn is_enabled(&self) -> bool {
            self.seed != 0
        }

        /// Encrypts or decrypts the stream of layer 'layer' in place.
        pub fn apply(&self, layer: u32, data: &mut [u8]) {
            if !self.is_enabled() {
                return;
            }
            let init = self.seed.wrapping_mul(0x2D83_CDAC).wrapping_add(0xD8A8_3423);
            let mut key = layer
                .wrapping_mul(0x1E15_30CD)
                .wrapping_add(0xEC3D_47CD)
                .wrapping_mul(init);

            for chunk in data.chunks_mut(4) {
                let bytes = key.to_le_bytes();
                for (byte, k) in chunk.iter_mut().zip(bytes) {
                    *byte ^= k;
                }
                key = key.wrapping_add(init);
            }
        }
    }
}
