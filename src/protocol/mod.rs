//! The protocol module contains the transport-level pieces of the Heatmiser V3
//! protocol: the frame checksum, request/response framing, and the byte-stream
//! transports frames travel over.

pub mod checksum;
pub mod frame;
pub mod mock;
pub mod tcp;
pub mod transport;

pub use checksum::{checksum, Checksum};
pub use frame::{
    build_read_request, build_read_request_range, build_response, build_write_request,
    pack_request, parse_response, DcbResponse, HeatmiserRequest,
};
pub use mock::{MockReply, MockTransport};
pub use tcp::TcpTransport;
pub use transport::Transport;
