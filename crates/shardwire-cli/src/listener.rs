//! A thin TCP listener wired to [`RespRequestCodec`].
//!
//! One task per accepted socket, each driving its own `Framed<TcpStream,
//! _>`. The routing this proxy exists for — consistent hashing, shard
//! selection, response fan-in — stays out of scope; this listener only
//! proves the codec frames real client traffic end to end, logging every
//! request it sees.

use futures::StreamExt;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::Framed;
use tracing::{debug, error, info, warn};

use shardwire_core::Result;
use shardwire_protocol::RespRequestCodec;

use crate::config::ProxyConfig;

/// Bind `config.listen_addr` and spawn one task per accepted connection.
///
/// Runs until the listener itself errors; a single connection's framing
/// failure only tears down that connection.
pub async fn serve(config: ProxyConfig) -> Result<()> {
    let listener = TcpListener::bind(&config.listen_addr).await?;
    info!(addr = %config.listen_addr, "shardwire listening");

    loop {
        let (stream, addr) = listener.accept().await?;
        debug!(%addr, "accepted connection");
        let max_frame_size = config.max_frame_size;
        tokio::spawn(async move {
            handle_connection(stream, max_frame_size).await;
            debug!(%addr, "connection closed");
        });
    }
}

async fn handle_connection(stream: TcpStream, max_frame_size: usize) {
    if let Err(e) = stream.set_nodelay(true) {
        warn!(%e, "failed to set TCP_NODELAY");
    }

    let codec = RespRequestCodec::with_max_frame_size(max_frame_size);
    let mut framed = Framed::new(stream, codec);

    while let Some(result) = framed.next().await {
        match result {
            Ok(request) => {
                info!(
                    command = %request.command,
                    keys = request.keys.len(),
                    "framed request"
                );
            }
            Err(e) => {
                error!(%e, "framing error, closing connection");
                return;
            }
        }
    }
}
