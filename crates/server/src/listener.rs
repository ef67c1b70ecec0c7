use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use pool_http::connection::BoxIo;
use tokio::net::{TcpListener, UnixListener};
use tracing::{debug, info, warn};

use crate::cli::Listen;
use crate::error::ServerError;

const UNIX_PEER: &str = "UNIX socket";

/// The acceptor side: yields owned streams with their peer address text.
#[derive(Debug)]
pub enum Listener {
    Tcp(TcpListener),
    Unix { listener: UnixListener, path: PathBuf },
}

impl Listener {
    pub async fn bind(listen: &Listen) -> Result<Self, ServerError> {
        match listen {
            Listen::Tcp(port) => {
                let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, *port));
                let listener = TcpListener::bind(addr).await.map_err(|e| ServerError::bind(addr, e))?;
                info!(port = *port, "start listening on tcp");
                Ok(Self::Tcp(listener))
            }
            Listen::Uds(path) => {
                match std::fs::remove_file(path) {
                    Ok(()) => debug!(path = %path.display(), "removed stale socket file"),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(ServerError::bind(path.display(), e)),
                }
                let listener = UnixListener::bind(path).map_err(|e| ServerError::bind(path.display(), e))?;
                info!(path = %path.display(), "start listening on unix socket");
                Ok(Self::Unix { listener, path: path.clone() })
            }
        }
    }

    pub async fn accept(&self) -> io::Result<(BoxIo, String)> {
        match self {
            Self::Tcp(listener) => {
                let (stream, addr) = listener.accept().await?;
                if let Err(e) = stream.set_nodelay(true) {
                    debug!(cause = %e, "failed to set TCP_NODELAY");
                }
                Ok((Box::new(stream), addr.ip().to_string()))
            }
            Self::Unix { listener, .. } => {
                let (stream, _addr) = listener.accept().await?;
                Ok((Box::new(stream), UNIX_PEER.to_string()))
            }
        }
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        if let Self::Unix { path, .. } = self {
            if let Err(e) = std::fs::remove_file(path.as_path()) {
                warn!(path = %path.display(), cause = %e, "failed to remove socket file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpStream, UnixStream};

    #[tokio::test]
    async fn unix_listener_replaces_stale_socket_and_cleans_up() {
        let path = std::env::temp_dir().join(format!("pool-http-listener-{}.sock", std::process::id()));
        std::fs::write(&path, b"stale").unwrap();

        let listener = Listener::bind(&Listen::Uds(path.clone())).await.unwrap();
        let mut client = UnixStream::connect(&path).await.unwrap();
        let (mut server, addr) = listener.accept().await.unwrap();
        assert_eq!(addr, "UNIX socket");

        client.write_all(b"ping").await.unwrap();
        let mut buf = [0u8; 4];
        server.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"ping");

        drop(listener);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn tcp_listener_reports_peer_ip() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let listener = Listener::Tcp(listener);

        let _client = TcpStream::connect((Ipv4Addr::LOCALHOST, port)).await.unwrap();
        let (_server, addr) = listener.accept().await.unwrap();
        assert_eq!(addr, "127.0.0.1");
    }
}
