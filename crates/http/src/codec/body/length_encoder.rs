use crate::protocol::{PayloadItem, SendError};
use bytes::{Buf, BytesMut};
use tokio_util::codec::Encoder;
use tracing::warn;

/// Writes body chunks of a response framed by `Content-Length`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthEncoder {
    length: u64,
    received_eof: bool,
}

impl LengthEncoder {
    pub fn new(length: u64) -> Self {
        Self { length, received_eof: false }
    }

    pub fn is_finish(&self) -> bool {
        self.length == 0 && self.received_eof
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for LengthEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            PayloadItem::Chunk(bytes) => {
                if !bytes.has_remaining() {
                    return Ok(());
                }
                let remaining = bytes.remaining() as u64;
                if remaining > self.length {
                    warn!(remaining, expected = self.length, "payload chunk exceeds the declared length");
                    return Err(SendError::invalid_body("payload exceeds the declared content-length"));
                }
                dst.extend_from_slice(bytes.chunk());
                self.length -= remaining;
                Ok(())
            }
            PayloadItem::Eof => {
                self.received_eof = true;
                if self.length != 0 {
                    return Err(SendError::invalid_body(format!("payload ended {} bytes short", self.length)));
                }
                Ok(())
            }
        }
    }
}
