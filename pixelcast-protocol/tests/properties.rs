//! Property tests for the transport encoding

use core::convert::Infallible;

use embedded_io::{ErrorType, Write};
use pixelcast_protocol::{
    encoded_len, send, FrameDecoder, FrameFormat, NibbleScheme, WordWidth, MARKER,
};
use proptest::prelude::*;

#[derive(Default)]
struct VecChannel(Vec<u8>);

impl ErrorType for VecChannel {
    type Error = Infallible;
}

impl Write for VecChannel {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Infallible> {
        self.0.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

fn scheme() -> impl Strategy<Value = NibbleScheme> {
    prop_oneof![Just(NibbleScheme::OrMasked), Just(NibbleScheme::ShiftMasked)]
}

proptest! {
    #[test]
    fn carriers_are_never_marker(b in any::<u8>(), scheme in scheme()) {
        let [high, low] = scheme.encode(b);
        prop_assert_ne!(high, MARKER);
        prop_assert_ne!(low, MARKER);
    }

    #[test]
    fn payload_doubles_on_the_wire(
        payload in prop::collection::vec(any::<u8>(), 0..512),
        scheme in scheme(),
    ) {
        let format = FrameFormat { scheme, word: WordWidth::W32 };
        let mut channel = VecChannel::default();
        send(&mut channel, &payload, payload.len(), 1, format).unwrap();

        let header = 1 + 3 * 4;
        prop_assert_eq!(channel.0.len(), encoded_len(format, payload.len()));
        prop_assert_eq!(channel.0.len() - header, 2 * payload.len());
        prop_assert!(channel.0[header..].iter().all(|&b| b != MARKER));
    }

    #[test]
    fn decoder_recovers_payload(
        payload in prop::collection::vec(any::<u8>(), 1..256),
        noise in prop::collection::vec(1u8..=255, 0..16),
    ) {
        let format = FrameFormat { scheme: NibbleScheme::OrMasked, word: WordWidth::W64 };
        let mut channel = VecChannel(noise);
        send(&mut channel, &payload, payload.len(), 1, format).unwrap();

        let mut decoder = FrameDecoder::<256>::new(format);
        let (frame, _) = decoder.feed_bytes(&channel.0).unwrap();
        let frame = frame.unwrap();
        prop_assert_eq!(&frame.payload[..], &payload[..]);
        prop_assert_eq!(frame.width, payload.len());
    }
}
