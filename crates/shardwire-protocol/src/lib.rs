pub mod buffer;
pub mod codec;
pub mod commands;
pub mod fragment;
pub mod message;
pub mod request;
pub mod response;
pub mod stream;

pub use buffer::{Buf, BufferChain};
pub use codec::{DecodedRequest, DecodedResponse, RespRequestCodec, RespResponseCodec};
pub use commands::{Arity, CommandTag};
pub use fragment::{Fragmenter, dispatch_fragments, split_request};
pub use message::{Classification, Message, Outcome, ReplyKind};
pub use request::parse_request;
pub use response::parse_response;
pub use stream::{RequestStream, ResponseStream};
