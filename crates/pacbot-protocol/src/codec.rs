//! 帧编解码
//!
//! 帧格式：`[msg_type: u16 BE][len: u16 BE][payload; len]`。
//! 负载格式见 [`MessageType`]。

use crate::message::{Message, MessageType};
use crate::types::{CellPosition, Command};
use crate::ProtocolError;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// 帧头长度（字节）
pub const HEADER_LEN: usize = 4;

/// 单帧最大负载长度（字节）
pub const MAX_PAYLOAD_LEN: usize = 1024;

/// 将消息编码追加到 `dst`
///
/// # 错误
/// - `ProtocolError::FrameTooLarge`: 订阅列表过长
pub fn encode(msg: &Message, dst: &mut BytesMut) -> Result<(), ProtocolError> {
    let payload_len = match msg {
        Message::PacmanCommand(_) => 1,
        Message::LightState(_) => 8,
        Message::Subscribe(types) => types.len() * 2,
    };
    if payload_len > MAX_PAYLOAD_LEN {
        return Err(ProtocolError::FrameTooLarge {
            len: payload_len,
            max: MAX_PAYLOAD_LEN,
        });
    }

    dst.reserve(HEADER_LEN + payload_len);
    dst.put_u16(u16::from(msg.msg_type()));
    dst.put_u16(payload_len as u16);
    match msg {
        Message::PacmanCommand(cmd) => dst.put_u8(u8::from(*cmd)),
        Message::LightState(pos) => {
            dst.put_i32(pos.x);
            dst.put_i32(pos.y);
        },
        Message::Subscribe(types) => {
            for t in types {
                dst.put_u16(u16::from(*t));
            }
        },
    }
    Ok(())
}

impl Message {
    /// 编码为独立的帧
    pub fn to_bytes(&self) -> Result<Bytes, ProtocolError> {
        let mut buf = BytesMut::new();
        encode(self, &mut buf)?;
        Ok(buf.freeze())
    }
}

/// 流式帧解码器
///
/// TCP 是字节流，一次 `read` 可能包含半帧或多帧。
/// 解码器缓存字节，直到凑齐完整帧才产出消息。
///
/// # Example
///
/// ```
/// use pacbot_protocol::{FrameDecoder, Message, Command};
///
/// let bytes = Message::PacmanCommand(Command::North).to_bytes().unwrap();
/// let mut decoder = FrameDecoder::new();
/// decoder.extend(&bytes[..3]);
/// assert!(decoder.next_message().is_none());
/// decoder.extend(&bytes[3..]);
/// assert_eq!(
///     decoder.next_message(),
///     Some(Ok(Message::PacmanCommand(Command::North)))
/// );
/// ```
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: BytesMut,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加从流中读到的字节
    pub fn extend(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// 当前缓存的字节数
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    /// 取出下一条完整消息
    ///
    /// - `None`: 数据不足一帧，等待更多字节
    /// - `Some(Err(_))`: 帧已被消费但内容无效（未知类型、长度或取值错误），
    ///   调用方可以继续读取后续帧
    /// - 声明长度超过 [`MAX_PAYLOAD_LEN`] 时无法重新同步，缓存被清空
    pub fn next_message(&mut self) -> Option<Result<Message, ProtocolError>> {
        if self.buf.len() < HEADER_LEN {
            return None;
        }

        let msg_type = u16::from_be_bytes([self.buf[0], self.buf[1]]);
        let len = u16::from_be_bytes([self.buf[2], self.buf[3]]) as usize;
        if len > MAX_PAYLOAD_LEN {
            self.buf.clear();
            return Some(Err(ProtocolError::FrameTooLarge {
                len,
                max: MAX_PAYLOAD_LEN,
            }));
        }
        if self.buf.len() < HEADER_LEN + len {
            return None;
        }

        self.buf.advance(HEADER_LEN);
        let payload = self.buf.split_to(len).freeze();
        Some(decode_payload(msg_type, payload))
    }
}

fn expect_len(payload: &Bytes, expected: usize) -> Result<(), ProtocolError> {
    if payload.len() != expected {
        return Err(ProtocolError::InvalidLength {
            expected,
            actual: payload.len(),
        });
    }
    Ok(())
}

fn decode_payload(msg_type: u16, mut payload: Bytes) -> Result<Message, ProtocolError> {
    match MessageType::from_wire(msg_type)? {
        MessageType::PacmanCommand => {
            expect_len(&payload, 1)?;
            Command::from_wire(payload.get_u8()).map(Message::PacmanCommand)
        },
        MessageType::LightState => {
            expect_len(&payload, 8)?;
            let x = payload.get_i32();
            let y = payload.get_i32();
            Ok(Message::LightState(CellPosition::new(x, y)))
        },
        MessageType::Subscribe => {
            if payload.len() % 2 != 0 {
                return Err(ProtocolError::ParseError(format!(
                    "subscribe payload has odd length {}",
                    payload.len()
                )));
            }
            let mut types = Vec::with_capacity(payload.len() / 2);
            while payload.has_remaining() {
                types.push(MessageType::from_wire(payload.get_u16())?);
            }
            Ok(Message::Subscribe(types))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_state_wire_layout() {
        let bytes = Message::LightState(CellPosition::new(-1, 258)).to_bytes().unwrap();
        assert_eq!(
            &bytes[..],
            &[0x00, 0x02, 0x00, 0x08, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x01, 0x02]
        );
    }

    #[test]
    fn test_decode_hand_built_command_frame() {
        let mut decoder = FrameDecoder::new();
        decoder.extend(&[0x00, 0x01, 0x00, 0x01, 0x04]);
        assert_eq!(
            decoder.next_message(),
            Some(Ok(Message::PacmanCommand(Command::West)))
        );
        assert_eq!(decoder.buffered_len(), 0);
        assert!(decoder.next_message().is_none());
    }

    #[test]
    fn test_decode_split_across_reads() {
        let bytes = Message::LightState(CellPosition::new(7, 9)).to_bytes().unwrap();
        let mut decoder = FrameDecoder::new();
        for chunk in bytes.chunks(3) {
            decoder.extend(chunk);
        }
        assert_eq!(
            decoder.next_message(),
            Some(Ok(Message::LightState(CellPosition::new(7, 9))))
        );
    }

    #[test]
    fn test_decode_back_to_back_frames() {
        let mut stream = BytesMut::new();
        encode(&Message::PacmanCommand(Command::East), &mut stream).unwrap();
        encode(&Message::LightState(CellPosition::new(1, 2)), &mut stream).unwrap();

        let mut decoder = FrameDecoder::new();
        decoder.extend(&stream);
        assert_eq!(
            decoder.next_message(),
            Some(Ok(Message::PacmanCommand(Command::East)))
        );
        assert_eq!(
            decoder.next_message(),
            Some(Ok(Message::LightState(CellPosition::new(1, 2))))
        );
        assert!(decoder.next_message().is_none());
    }

    #[test]
    fn test_invalid_frame_is_skipped() {
        let mut decoder = FrameDecoder::new();
        // 未知类型 0x0042，2 字节负载
        decoder.extend(&[0x00, 0x42, 0x00, 0x02, 0xAA, 0xBB]);
        // 越界的方向值
        decoder.extend(&[0x00, 0x01, 0x00, 0x01, 0x09]);
        decoder.extend(&Message::PacmanCommand(Command::Stop).to_bytes().unwrap());

        assert_eq!(
            decoder.next_message(),
            Some(Err(ProtocolError::UnknownMessageType { msg_type: 0x42 }))
        );
        assert!(matches!(
            decoder.next_message(),
            Some(Err(ProtocolError::InvalidValue { value: 9, .. }))
        ));
        assert_eq!(
            decoder.next_message(),
            Some(Ok(Message::PacmanCommand(Command::Stop)))
        );
    }

    #[test]
    fn test_wrong_payload_length() {
        let mut decoder = FrameDecoder::new();
        decoder.extend(&[0x00, 0x02, 0x00, 0x04, 0, 0, 0, 1]);
        assert_eq!(
            decoder.next_message(),
            Some(Err(ProtocolError::InvalidLength {
                expected: 8,
                actual: 4
            }))
        );
    }

    #[test]
    fn test_oversized_frame_clears_buffer() {
        let mut decoder = FrameDecoder::new();
        decoder.extend(&[0x00, 0x02, 0xFF, 0xFF, 1, 2, 3]);
        assert!(matches!(
            decoder.next_message(),
            Some(Err(ProtocolError::FrameTooLarge { len: 0xFFFF, .. }))
        ));
        assert_eq!(decoder.buffered_len(), 0);
    }

    #[test]
    fn test_subscribe_frame() {
        let msg = Message::Subscribe(vec![MessageType::PacmanCommand, MessageType::LightState]);
        let bytes = msg.to_bytes().unwrap();
        assert_eq!(&bytes[..], &[0x00, 0xFF, 0x00, 0x04, 0x00, 0x01, 0x00, 0x02]);

        let mut decoder = FrameDecoder::new();
        decoder.extend(&bytes);
        assert_eq!(decoder.next_message(), Some(Ok(msg)));
    }

    #[test]
    fn test_subscribe_too_large() {
        let msg = Message::Subscribe(vec![MessageType::LightState; MAX_PAYLOAD_LEN]);
        assert!(matches!(
            msg.to_bytes(),
            Err(ProtocolError::FrameTooLarge { .. })
        ));
    }

    #[test]
    fn test_message_into_event() {
        use crate::InboundEvent;

        assert_eq!(
            Message::PacmanCommand(Command::North).into_event(),
            Some(InboundEvent::Command(Command::North))
        );
        assert_eq!(
            Message::LightState(CellPosition::new(3, 4)).into_event(),
            Some(InboundEvent::Position(CellPosition::new(3, 4)))
        );
        assert_eq!(Message::Subscribe(vec![]).into_event(), None);
    }
}
