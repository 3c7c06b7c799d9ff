//! TCP server the test runner connects to.

use std::net::SocketAddr;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use crate::error::Result;
use crate::hooks::{dispatch, Hooks};
use crate::protocol::HookMessage;

/// Serves hooks to the runner over TCP.
pub struct HooksServer<H> {
    listener: TcpListener,
    hooks: H,
}

impl<H: Hooks> HooksServer<H> {
    /// Binds the listen address.
    pub async fn bind(addr: &str, hooks: H) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, hooks })
    }

    /// Returns the bound address.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts the runner's connection and serves it until it disconnects.
    ///
    /// The runner opens a single connection per run, so this returns after the
    /// first session ends. A hook or protocol error ends the session with
    /// that error.
    pub async fn serve(self) -> Result<()> {
        tracing::info!(addr = %self.local_addr()?, "hooks server listening");

        let (stream, peer) = self.listener.accept().await?;
        let session_id = uuid::Uuid::new_v4().to_string();
        tracing::info!(session_id = %session_id, peer = %peer, "runner connected");

        let (reader, writer) = stream.into_split();
        let result = handle_session(&self.hooks, reader, writer).await;

        match &result {
            Ok(messages) => {
                tracing::info!(session_id = %session_id, messages, "runner disconnected")
            }
            Err(e) => tracing::error!(session_id = %session_id, error = %e, "session failed"),
        }
        result.map(|_| ())
    }
}

/// Reads delimited messages from `reader`, dispatches them to `hooks` and
/// writes each reply to `writer`. Returns the number of messages handled
/// once the reader reaches end of stream.
pub async fn handle_session<H, R, W>(hooks: &H, reader: R, mut writer: W) -> Result<usize>
where
    H: Hooks + ?Sized,
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut handled = 0;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let HookMessage { uuid, event, data } = HookMessage::decode(&line)?;
        tracing::debug!(uuid = %uuid, event = %event, "received");

        let data = dispatch(hooks, event, data).await?;
        let reply = HookMessage { uuid, event, data };
        writer.write_all(&reply.encode()?).await?;
        writer.flush().await?;
        handled += 1;
    }

    Ok(handled)
}
