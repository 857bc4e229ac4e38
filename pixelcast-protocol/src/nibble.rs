//! Payload byte encoding
//!
//! Each payload byte is carried by two bytes. The carriers keep one
//! nibble of the original byte in their high half and force their low
//! half to `0xF`, which is what keeps them distinct from the marker.
//!
//! Two arithmetic forms are provided. [`NibbleScheme::OrMasked`] is the
//! form deployed receivers were written against (`b | 0x0F`,
//! `(b << 4) | 0x0F`). [`NibbleScheme::ShiftMasked`] spells the nibble
//! split out with explicit masks. On 8-bit values they produce the same
//! carriers; both stay selectable so a change of either form is a
//! visible, deliberate wire change.

/// Low nibble every carrier byte must have
pub const CARRIER_FILL: u8 = 0x0F;

/// Carrier arithmetic for payload bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NibbleScheme {
    /// `high = b | 0x0F`, `low = (b << 4) | 0x0F`
    #[default]
    OrMasked,
    /// `high = (b & 0xF0) | 0x0F`, `low = ((b & 0x0F) << 4) | 0x0F`
    ShiftMasked,
}

impl NibbleScheme {
    /// Encode one payload byte into its `(high, low)` carriers
    #[inline]
    pub const fn encode(self, byte: u8) -> [u8; 2] {
        match self {
            NibbleScheme::OrMasked => [byte | CARRIER_FILL, (byte << 4) | CARRIER_FILL],
            NibbleScheme::ShiftMasked => [
                (byte & 0xF0) | CARRIER_FILL,
                ((byte & 0x0F) << 4) | CARRIER_FILL,
            ],
        }
    }

    /// Rebuild a payload byte from its carriers
    ///
    /// Returns `None` if either carrier's low nibble is not `0xF`.
    #[inline]
    pub const fn decode(self, high: u8, low: u8) -> Option<u8> {
        if !is_carrier(high) || !is_carrier(low) {
            return None;
        }
        // Both schemes keep the data in the carriers' high nibbles
        Some((high & 0xF0) | (low >> 4))
    }
}

/// Check that a byte has the carrier low nibble
#[inline]
pub const fn is_carrier(byte: u8) -> bool {
    byte & CARRIER_FILL == CARRIER_FILL
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::MARKER;

    #[test]
    fn test_reference_vectors() {
        let s = NibbleScheme::OrMasked;
        assert_eq!(s.encode(0x00), [0x0F, 0x0F]);
        assert_eq!(s.encode(0xFF), [0xFF, 0xFF]);
        assert_eq!(s.encode(0x0F), [0x0F, 0xFF]);
        assert_eq!(s.encode(0xF0), [0xFF, 0x0F]);
        assert_eq!(s.encode(0xA5), [0xAF, 0x5F]);
    }

    #[test]
    fn test_schemes_agree_on_every_byte() {
        for b in 0..=u8::MAX {
            assert_eq!(
                NibbleScheme::OrMasked.encode(b),
                NibbleScheme::ShiftMasked.encode(b),
                "schemes differ for {:#04x}",
                b
            );
        }
    }

    #[test]
    fn test_no_carrier_is_marker() {
        for scheme in [NibbleScheme::OrMasked, NibbleScheme::ShiftMasked] {
            for b in 0..=u8::MAX {
                let [high, low] = scheme.encode(b);
                assert_ne!(high, MARKER);
                assert_ne!(low, MARKER);
                assert!(is_carrier(high) && is_carrier(low));
            }
        }
    }

    #[test]
    fn test_decode_rebuilds_byte() {
        for b in 0..=u8::MAX {
            let [high, low] = NibbleScheme::OrMasked.encode(b);
            assert_eq!(NibbleScheme::OrMasked.decode(high, low), Some(b));
        }
    }

    #[test]
    fn test_decode_rejects_non_carrier() {
        assert_eq!(NibbleScheme::OrMasked.decode(0x00, 0x0F), None);
        assert_eq!(NibbleScheme::OrMasked.decode(0x0F, 0x1E), None);
    }
}
